use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Grades are reported on a 0–5 scale.
pub const MAX_GRADE: f64 = 5.0;

/// Minimum numeric grade that counts as a pass.
pub const PASSING_GRADE: f64 = 3.0;

/// Weights are percentage points of the final grade.
pub const FULL_WEIGHT: f64 = 100.0;

pub(crate) const WEIGHT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Exam,
    Quiz,
    Assignment,
    Project,
    Participation,
    Other,
}

impl EvaluationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exam => "Exam",
            Self::Quiz => "Quiz",
            Self::Assignment => "Assignment",
            Self::Project => "Project",
            Self::Participation => "Participation",
            Self::Other => "Other",
        }
    }

    /// Lenient parse used by imports; unknown kinds fall back to `Other`.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "exam" | "midterm" | "final" => Self::Exam,
            "quiz" => Self::Quiz,
            "assignment" | "homework" => Self::Assignment,
            "project" => Self::Project,
            "participation" => Self::Participation,
            _ => Self::Other,
        }
    }
}

/// One gradable item within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EvaluationRecord")]
pub struct Evaluation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EvaluationKind,
    pub weight: f64,
    pub max_score: f64,
    pub score: Option<f64>,
    pub is_submitted: bool,
    pub date: NaiveDateTime,
}

/// Wire shape of an evaluation. A missing `is_submitted` follows whether a
/// score was recorded, matching the CSV import.
#[derive(Deserialize)]
struct EvaluationRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: EvaluationKind,
    weight: f64,
    max_score: f64,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    is_submitted: Option<bool>,
    date: NaiveDateTime,
}

impl From<EvaluationRecord> for Evaluation {
    fn from(record: EvaluationRecord) -> Self {
        Self {
            is_submitted: record.is_submitted.unwrap_or(record.score.is_some()),
            id: record.id,
            name: record.name,
            kind: record.kind,
            weight: record.weight,
            max_score: record.max_score,
            score: record.score,
            date: record.date,
        }
    }
}

impl Evaluation {
    /// An evaluation only counts once it is submitted and carries a score.
    pub fn graded_score(&self) -> Option<f64> {
        if self.is_submitted {
            self.score
        } else {
            None
        }
    }

    pub fn is_graded(&self) -> bool {
        self.graded_score().is_some()
    }

    /// Score mapped onto the 0–5 grade scale.
    pub fn normalized(&self) -> Option<f64> {
        self.graded_score()
            .map(|score| (score / self.max_score) * MAX_GRADE)
    }

    fn validate(&self) -> Result<(), GradeError> {
        if !self.weight.is_finite() || !(0.0..=FULL_WEIGHT).contains(&self.weight) {
            return Err(GradeError::WeightOutOfRange {
                id: self.id.clone(),
                weight: self.weight,
            });
        }

        if !self.max_score.is_finite() || self.max_score <= 0.0 {
            return Err(GradeError::InvalidMaxScore {
                id: self.id.clone(),
                max_score: self.max_score,
            });
        }

        if let Some(score) = self.score {
            check_score(&self.id, score, self.max_score)?;
        }

        Ok(())
    }
}

pub(crate) fn check_score(id: &str, score: f64, max_score: f64) -> Result<(), GradeError> {
    if !score.is_finite() {
        return Err(GradeError::NonFiniteScore {
            id: id.to_string(),
            score,
        });
    }

    if score < 0.0 {
        return Err(GradeError::NegativeScore {
            id: id.to_string(),
            score,
        });
    }

    if score > max_score {
        return Err(GradeError::ScoreExceedsMax {
            id: id.to_string(),
            score,
            max_score,
        });
    }

    Ok(())
}

/// Accepts a grade or target only when it sits on the 0–5 scale.
pub fn check_grade(value: f64) -> Result<f64, GradeError> {
    if value.is_finite() && (0.0..=MAX_GRADE).contains(&value) {
        Ok(value)
    } else {
        Err(GradeError::GradeOutOfRange(value))
    }
}

/// Validated, insertion-ordered evaluations for one student/course/term.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EvaluationSet {
    evaluations: Vec<Evaluation>,
}

impl EvaluationSet {
    pub fn new(evaluations: Vec<Evaluation>) -> Result<Self, GradeError> {
        let mut seen = HashSet::new();
        let mut total_weight = 0.0;

        for evaluation in &evaluations {
            evaluation.validate()?;
            if !seen.insert(evaluation.id.as_str()) {
                return Err(GradeError::DuplicateEvaluation(evaluation.id.clone()));
            }
            total_weight += evaluation.weight;
        }

        if total_weight > FULL_WEIGHT + WEIGHT_TOLERANCE {
            return Err(GradeError::WeightOverflow { total_weight });
        }

        Ok(Self { evaluations })
    }

    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    pub fn get(&self, id: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|evaluation| evaluation.id == id)
    }

    pub fn total_weight(&self) -> f64 {
        self.evaluations.iter().map(|evaluation| evaluation.weight).sum()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Evaluation> {
        self.evaluations.iter().filter(|evaluation| !evaluation.is_graded())
    }

    pub fn into_inner(self) -> Vec<Evaluation> {
        self.evaluations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "D+")]
    DPlus,
    D,
    F,
}

impl LetterGrade {
    /// Lower bound of each band, highest first.
    const BANDS: [(f64, Self); 8] = [
        (4.6, Self::APlus),
        (4.0, Self::A),
        (3.5, Self::BPlus),
        (3.0, Self::B),
        (2.5, Self::CPlus),
        (2.0, Self::C),
        (1.5, Self::DPlus),
        (1.0, Self::D),
    ];

    pub fn from_grade(grade: f64) -> Self {
        Self::BANDS
            .iter()
            .find(|(threshold, _)| grade >= *threshold)
            .map(|(_, letter)| *letter)
            .unwrap_or(Self::F)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalGrade {
    pub numeric_grade: f64,
    pub letter_grade: LetterGrade,
    pub is_approved: bool,
}

/// Rejected grading input. Nothing is clamped or normalized silently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradeError {
    #[error("evaluation {id} has weight {weight}; weights must be between 0 and 100")]
    WeightOutOfRange { id: String, weight: f64 },
    #[error("evaluation weights add up to {total_weight}, which exceeds 100")]
    WeightOverflow { total_weight: f64 },
    #[error("evaluation {id} has max score {max_score}; it must be positive")]
    InvalidMaxScore { id: String, max_score: f64 },
    #[error("evaluation {id} has score {score}; scores cannot be negative")]
    NegativeScore { id: String, score: f64 },
    #[error("evaluation {id} has score {score}; scores must be finite numbers")]
    NonFiniteScore { id: String, score: f64 },
    #[error("evaluation {id} has score {score} above its max score {max_score}")]
    ScoreExceedsMax {
        id: String,
        score: f64,
        max_score: f64,
    },
    #[error("evaluation {0} appears more than once")]
    DuplicateEvaluation(String),
    #[error("evaluation {0} not found")]
    UnknownEvaluation(String),
    #[error("grade {0} is outside the 0-5 scale")]
    GradeOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_bands_use_closed_lower_bounds() {
        assert_eq!(LetterGrade::from_grade(5.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_grade(4.6), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_grade(4.59), LetterGrade::A);
        assert_eq!(LetterGrade::from_grade(3.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_grade(2.99), LetterGrade::CPlus);
        assert_eq!(LetterGrade::from_grade(1.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_grade(0.99), LetterGrade::F);
        assert_eq!(LetterGrade::from_grade(0.0), LetterGrade::F);
    }

    #[test]
    fn letter_grade_serializes_with_symbol() {
        let json = serde_json::to_string(&LetterGrade::BPlus).expect("serializes");
        assert_eq!(json, "\"B+\"");
        assert_eq!(LetterGrade::DPlus.label(), "D+");
    }

    #[test]
    fn missing_submitted_flag_follows_score() {
        let scored: Evaluation = serde_json::from_str(
            r#"{"id":"mid","name":"Midterm","type":"exam","weight":30,"max_score":100,"score":90,"date":"2025-09-24T10:00:00"}"#,
        )
        .expect("evaluation deserializes");
        assert!(scored.is_submitted);
        assert_eq!(scored.graded_score(), Some(90.0));

        let unscored: Evaluation = serde_json::from_str(
            r#"{"id":"fin","name":"Final","type":"exam","weight":70,"max_score":5,"date":"2025-12-05T10:00:00"}"#,
        )
        .expect("evaluation deserializes");
        assert!(!unscored.is_submitted);

        let draft: Evaluation = serde_json::from_str(
            r#"{"id":"q","name":"Quiz","type":"quiz","weight":10,"max_score":10,"score":7,"is_submitted":false,"date":"2025-09-01T10:00:00"}"#,
        )
        .expect("evaluation deserializes");
        assert!(!draft.is_graded());
    }

    #[test]
    fn non_finite_scores_are_not_reported_as_negative() {
        assert!(matches!(
            check_score("quiz", f64::NAN, 10.0),
            Err(GradeError::NonFiniteScore { .. })
        ));
        assert!(matches!(
            check_score("quiz", f64::INFINITY, 10.0),
            Err(GradeError::NonFiniteScore { .. })
        ));
        assert!(matches!(
            check_score("quiz", -1.0, 10.0),
            Err(GradeError::NegativeScore { .. })
        ));
    }

    #[test]
    fn grades_off_scale_are_rejected() {
        assert_eq!(check_grade(4.0), Ok(4.0));
        assert_eq!(check_grade(7.0), Err(GradeError::GradeOutOfRange(7.0)));
        assert!(check_grade(f64::NAN).is_err());
    }

    #[test]
    fn kind_labels_parse_leniently() {
        assert_eq!(EvaluationKind::from_label(" Midterm "), EvaluationKind::Exam);
        assert_eq!(EvaluationKind::from_label("homework"), EvaluationKind::Assignment);
        assert_eq!(EvaluationKind::from_label("lab"), EvaluationKind::Other);
    }
}
