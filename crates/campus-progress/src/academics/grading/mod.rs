//! Weighted grade calculation and target projections over one course's
//! evaluations.

mod calculator;
pub mod domain;
mod import;
mod projection;

#[cfg(test)]
mod tests;

pub use calculator::{compute, finalize, recompute, CourseGradeState, GradeComputation};
pub use domain::{
    check_grade, Evaluation, EvaluationKind, EvaluationSet, FinalGrade, GradeError, LetterGrade,
    MAX_GRADE, PASSING_GRADE,
};
pub use import::{EvaluationImportError, EvaluationImporter};
pub use projection::{
    carry_forward_projection, required_average, simulate, target_cards, Simulation,
    TargetProjection, TargetStatus,
};

/// Targets shown as cards when the caller does not configure its own.
pub const DEFAULT_TARGETS: [f64; 2] = [3.0, 4.0];
