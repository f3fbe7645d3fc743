use chrono::{NaiveDate, NaiveDateTime};

use crate::academics::grading::domain::{Evaluation, EvaluationKind, EvaluationSet};

pub(super) fn on(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, day)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .expect("valid evaluation date")
}

pub(super) fn graded(id: &str, weight: f64, max_score: f64, score: f64) -> Evaluation {
    Evaluation {
        id: id.to_string(),
        name: format!("{id} evaluation"),
        kind: EvaluationKind::Exam,
        weight,
        max_score,
        score: Some(score),
        is_submitted: true,
        date: on(1),
    }
}

pub(super) fn pending(id: &str, weight: f64, max_score: f64) -> Evaluation {
    Evaluation {
        id: id.to_string(),
        name: format!("{id} evaluation"),
        kind: EvaluationKind::Assignment,
        weight,
        max_score,
        score: None,
        is_submitted: false,
        date: on(20),
    }
}

/// 30% graded at 90/100, 70% still pending on a 0–5 scale.
pub(super) fn midterm_only() -> Vec<Evaluation> {
    vec![graded("midterm", 30.0, 100.0, 90.0), pending("final", 70.0, 5.0)]
}

pub(super) fn evaluation_set(evaluations: Vec<Evaluation>) -> EvaluationSet {
    EvaluationSet::new(evaluations).expect("valid evaluation set")
}
