use super::domain::{
    check_grade, Evaluation, EvaluationSet, FinalGrade, GradeError, LetterGrade, PASSING_GRADE,
};
use serde::Serialize;

/// Derived numbers for one evaluation set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeComputation {
    pub current_grade: f64,
    pub completed_weight: f64,
    pub remaining_weight: f64,
    pub total_weight: f64,
    pub completion_percentage: f64,
    pub graded_count: usize,
    pub pending_count: usize,
}

/// Weighted average of the graded evaluations on the 0–5 scale.
pub fn compute(set: &EvaluationSet) -> GradeComputation {
    let (graded, pending): (Vec<&Evaluation>, Vec<&Evaluation>) = set
        .evaluations()
        .iter()
        .partition(|evaluation| evaluation.is_graded());

    let mut completed_weight = 0.0;
    let mut weighted_points = 0.0;
    for evaluation in &graded {
        if let Some(normalized) = evaluation.normalized() {
            completed_weight += evaluation.weight;
            weighted_points += normalized * evaluation.weight;
        }
    }

    let current_grade = if completed_weight > 0.0 {
        round_to_hundredths(weighted_points / completed_weight)
    } else {
        0.0
    };

    let total_weight = set.total_weight();
    let remaining_weight = (total_weight - completed_weight).max(0.0);
    let completion_percentage = if total_weight > 0.0 {
        round_to_hundredths(completed_weight / total_weight * 100.0)
    } else {
        0.0
    };

    GradeComputation {
        current_grade,
        completed_weight,
        remaining_weight,
        total_weight,
        completion_percentage,
        graded_count: graded.len(),
        pending_count: pending.len(),
    }
}

/// Letter grade and approval for a numeric grade.
pub fn finalize(numeric_grade: f64) -> Result<FinalGrade, GradeError> {
    check_grade(numeric_grade)?;

    Ok(FinalGrade {
        numeric_grade,
        letter_grade: LetterGrade::from_grade(numeric_grade),
        is_approved: numeric_grade >= PASSING_GRADE,
    })
}

/// Aggregate grade state for one student/course/term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseGradeState {
    pub evaluations: EvaluationSet,
    #[serde(flatten)]
    pub computation: GradeComputation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_grade: Option<FinalGrade>,
}

impl CourseGradeState {
    pub fn current_grade(&self) -> f64 {
        self.computation.current_grade
    }

    pub fn completed_weight(&self) -> f64 {
        self.computation.completed_weight
    }

    pub fn remaining_weight(&self) -> f64 {
        self.computation.remaining_weight
    }

    /// Attaches the final grade derived from the current grade.
    pub fn close(self) -> Result<Self, GradeError> {
        let final_grade = finalize(self.computation.current_grade)?;
        Ok(Self {
            final_grade: Some(final_grade),
            ..self
        })
    }
}

/// Rebuilds the full state after any evaluation write.
pub fn recompute(evaluations: Vec<Evaluation>) -> Result<CourseGradeState, GradeError> {
    let evaluations = EvaluationSet::new(evaluations)?;
    Ok(state_for(evaluations))
}

pub(crate) fn state_for(evaluations: EvaluationSet) -> CourseGradeState {
    let computation = compute(&evaluations);
    CourseGradeState {
        evaluations,
        computation,
        final_grade: None,
    }
}

/// Round-half-up to two decimals. Grades are never negative.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
