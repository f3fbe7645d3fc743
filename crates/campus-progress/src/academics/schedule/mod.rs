//! Weekly class patterns: next-class lookup, conflict detection and load
//! metrics.

pub mod domain;
mod metrics;
mod temporal;

#[cfg(test)]
mod tests;

pub use domain::{
    parse_clock, ClassBlock, DayOfWeek, ScheduleError, TermWindow, TimeSlot, WeekSchedule,
};
pub use metrics::{summarize, DayLoadEntry, TimeDistribution, WeeklySummary};
pub use temporal::{
    classes_on, conflicts_with, find_conflicts, has_conflict, next_class, AgendaEntry,
    ScheduleConflict, UpcomingClass,
};
