use super::calculator::{compute, finalize, CourseGradeState, GradeComputation};
use super::domain::{check_score, EvaluationSet, FinalGrade, GradeError, MAX_GRADE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Achieved,
    Needed,
    Impossible,
}

impl TargetStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Achieved => "Achieved",
            Self::Needed => "Needed",
            Self::Impossible => "Impossible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetProjection {
    pub target: f64,
    /// Average (0–5) required across the remaining weight, clamped for display.
    pub needed_average: f64,
    pub status: TargetStatus,
}

/// Average needed on the ungraded weight to finish the course at `target`.
///
/// Work happens in grade·weight points: the points already banked are
/// `current_grade * completed_weight` and the goal is `target` spread over
/// the completed plus remaining weight. Ungraded weight counts as zero until
/// it is graded, so a target is only `Achieved` once the banked points alone
/// reach it.
pub fn required_average(
    current_grade: f64,
    completed_weight: f64,
    remaining_weight: f64,
    target: f64,
) -> TargetProjection {
    if remaining_weight <= 0.0 {
        let status = if current_grade >= target {
            TargetStatus::Achieved
        } else {
            TargetStatus::Impossible
        };
        return TargetProjection {
            target,
            needed_average: 0.0,
            status,
        };
    }

    let banked_points = current_grade * completed_weight;
    let target_points = target * (completed_weight + remaining_weight);
    let needed = (target_points - banked_points) / remaining_weight;

    let status = if needed <= 0.0 {
        TargetStatus::Achieved
    } else if needed > MAX_GRADE {
        TargetStatus::Impossible
    } else {
        TargetStatus::Needed
    };

    TargetProjection {
        target,
        needed_average: needed.clamp(0.0, MAX_GRADE),
        status,
    }
}

/// Fixed-target cards ("what do I need for a 3.0 / 4.0").
pub fn target_cards(state: &CourseGradeState, targets: &[f64]) -> Vec<TargetProjection> {
    targets
        .iter()
        .map(|target| {
            required_average(
                state.current_grade(),
                state.completed_weight(),
                state.remaining_weight(),
                *target,
            )
        })
        .collect()
}

/// Legacy "projected grade": every pending evaluation is assumed to score
/// the current average. Whenever any weight is graded this equals the
/// current grade, so it is informational only and is not a substitute for
/// [`required_average`].
pub fn carry_forward_projection(computation: &GradeComputation) -> f64 {
    let defined = computation.completed_weight + computation.remaining_weight;
    if defined <= 0.0 {
        return 0.0;
    }
    let banked = computation.current_grade * computation.completed_weight;
    let assumed = computation.current_grade * computation.remaining_weight;
    (banked + assumed) / defined
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub baseline: GradeComputation,
    pub simulated: GradeComputation,
    pub final_simulated_grade: FinalGrade,
    /// Hypothetical scores supplied for evaluations that already had a grade.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<String>,
}

/// What-if simulator: substitutes hypothetical scores for pending
/// evaluations and recomputes the grade the usual way.
pub fn simulate(
    set: &EvaluationSet,
    hypothetical_scores: &BTreeMap<String, f64>,
) -> Result<Simulation, GradeError> {
    let mut ignored = Vec::new();
    let mut evaluations = set.evaluations().to_vec();

    for (id, score) in hypothetical_scores {
        let evaluation = evaluations
            .iter_mut()
            .find(|evaluation| &evaluation.id == id)
            .ok_or_else(|| GradeError::UnknownEvaluation(id.clone()))?;

        if evaluation.is_graded() {
            ignored.push(id.clone());
            continue;
        }

        check_score(id, *score, evaluation.max_score)?;
        evaluation.score = Some(*score);
        evaluation.is_submitted = true;
    }

    let simulated = compute(&EvaluationSet::new(evaluations)?);
    let final_simulated_grade = finalize(simulated.current_grade)?;

    Ok(Simulation {
        baseline: compute(set),
        simulated,
        final_simulated_grade,
        ignored,
    })
}
