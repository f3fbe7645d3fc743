pub mod grading;
pub mod schedule;
