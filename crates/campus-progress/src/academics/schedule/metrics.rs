use super::domain::{DayOfWeek, WeekSchedule};
use chrono::Timelike;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeDistribution {
    /// Slots starting in [06:00, 12:00).
    pub morning: usize,
    /// Slots starting in [12:00, 18:00).
    pub afternoon: usize,
    /// Slots starting in [18:00, 22:00).
    pub evening: usize,
}

impl TimeDistribution {
    fn record(&mut self, start_hour: u32) {
        match start_hour {
            6..=11 => self.morning += 1,
            12..=17 => self.afternoon += 1,
            18..=21 => self.evening += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayLoadEntry {
    pub day: DayOfWeek,
    pub day_label: &'static str,
    pub classes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub total_credits: u32,
    pub total_courses: usize,
    pub weekly_hours: f64,
    pub busiest_day: Option<DayOfWeek>,
    pub lightest_day: Option<DayOfWeek>,
    pub day_load: Vec<DayLoadEntry>,
    pub time_distribution: TimeDistribution,
    pub average_classes_per_day: f64,
}

pub fn summarize(schedule: &WeekSchedule) -> WeeklySummary {
    let blocks = schedule.blocks();
    let total_courses = blocks.len();
    let total_credits: u32 = blocks.iter().map(|block| block.credits).sum();

    let weekly_hours: f64 = blocks
        .iter()
        .map(|block| {
            let per_meeting: f64 = block.time_slots.iter().map(|slot| slot.duration_hours()).sum();
            per_meeting * block.days.len() as f64
        })
        .sum();

    let day_load: Vec<DayLoadEntry> = DayOfWeek::ordered()
        .into_iter()
        .map(|day| DayLoadEntry {
            day,
            day_label: day.label(),
            classes: blocks.iter().filter(|block| block.meets_on(day)).count(),
        })
        .collect();

    let (busiest_day, lightest_day) = if blocks.is_empty() {
        (None, None)
    } else {
        (
            first_extreme(&day_load, |candidate, best| candidate > best),
            first_extreme(&day_load, |candidate, best| candidate < best),
        )
    };

    let mut time_distribution = TimeDistribution::default();
    for slot in blocks.iter().flat_map(|block| block.time_slots.iter()) {
        time_distribution.record(slot.start_time.hour());
    }

    let active_days = day_load.iter().filter(|entry| entry.classes > 0).count();
    let average_classes_per_day = if active_days > 0 {
        total_courses as f64 / active_days as f64
    } else {
        0.0
    };

    WeeklySummary {
        total_credits,
        total_courses,
        weekly_hours,
        busiest_day,
        lightest_day,
        day_load,
        time_distribution,
        average_classes_per_day,
    }
}

/// Ties keep the earlier day in week order.
fn first_extreme<F>(day_load: &[DayLoadEntry], beats: F) -> Option<DayOfWeek>
where
    F: Fn(usize, usize) -> bool,
{
    let mut best: Option<&DayLoadEntry> = None;
    for entry in day_load {
        match best {
            Some(current) if !beats(entry.classes, current.classes) => {}
            _ => best = Some(entry),
        }
    }
    best.map(|entry| entry.day)
}
