use super::domain::{minutes_since_midnight, ClassBlock, DayOfWeek, TimeSlot, WeekSchedule};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingClass {
    pub class_block: ClassBlock,
    pub time_slot: TimeSlot,
    pub is_today: bool,
    pub day: DayOfWeek,
    pub minutes_until: i64,
}

/// Nearest class occurrence after `now`: today first, then the following
/// days in week order. The scan ends on the same weekday one week later so a
/// class that already met today is still found.
pub fn next_class(schedule: &WeekSchedule, now: NaiveDateTime) -> Option<UpcomingClass> {
    let today = DayOfWeek::of(now.date());
    // Compared at minute precision, like the HH:MM strings the slots come from.
    let current_time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)?;

    if let Some((block, slot)) = earliest_on(schedule, today, |slot| {
        slot.start_time > current_time
    }) {
        return Some(upcoming(block, slot, today, 0, current_time));
    }

    (1..=7).find_map(|offset| {
        let day = today.after(offset);
        earliest_on(schedule, day, |_| true)
            .map(|(block, slot)| upcoming(block, slot, day, offset as i64, current_time))
    })
}

/// Earliest matching slot on `day`. Inputs are not assumed to be sorted;
/// ties keep the first slot encountered.
fn earliest_on<'a, F>(
    schedule: &'a WeekSchedule,
    day: DayOfWeek,
    keep: F,
) -> Option<(&'a ClassBlock, &'a TimeSlot)>
where
    F: Fn(&TimeSlot) -> bool,
{
    schedule
        .blocks()
        .iter()
        .filter(|block| block.meets_on(day))
        .flat_map(|block| block.time_slots.iter().map(move |slot| (block, slot)))
        .filter(|&(_, slot)| keep(slot))
        .min_by_key(|(_, slot)| slot.start_time)
}

fn upcoming(
    block: &ClassBlock,
    slot: &TimeSlot,
    day: DayOfWeek,
    day_offset: i64,
    current_time: NaiveTime,
) -> UpcomingClass {
    let minutes_until = day_offset * MINUTES_PER_DAY + minutes_since_midnight(slot.start_time)
        - minutes_since_midnight(current_time);

    UpcomingClass {
        class_block: block.clone(),
        time_slot: slot.clone(),
        is_today: day_offset == 0,
        day,
        minutes_until,
    }
}

/// A pair of overlapping slots on a shared day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleConflict {
    pub existing_block_id: String,
    pub candidate_block_id: String,
    pub day: DayOfWeek,
    pub existing_slot: TimeSlot,
    pub candidate_slot: TimeSlot,
}

/// Whether `candidate` overlaps any existing block on a shared day.
pub fn has_conflict(existing: &[ClassBlock], candidate: &ClassBlock) -> bool {
    existing
        .iter()
        .any(|block| blocks_conflict(block, candidate))
}

fn blocks_conflict(existing: &ClassBlock, candidate: &ClassBlock) -> bool {
    if existing.days.is_disjoint(&candidate.days) {
        return false;
    }

    existing.time_slots.iter().any(|existing_slot| {
        candidate
            .time_slots
            .iter()
            .any(|candidate_slot| candidate_slot.overlaps(existing_slot))
    })
}

/// Every overlapping slot pair between `candidate` and the existing blocks,
/// listed per shared day in week order.
pub fn conflicts_with(existing: &[ClassBlock], candidate: &ClassBlock) -> Vec<ScheduleConflict> {
    let mut conflicts = Vec::new();

    for block in existing {
        for day in block.days.intersection(&candidate.days) {
            for existing_slot in &block.time_slots {
                for candidate_slot in &candidate.time_slots {
                    if candidate_slot.overlaps(existing_slot) {
                        conflicts.push(ScheduleConflict {
                            existing_block_id: block.id.clone(),
                            candidate_block_id: candidate.id.clone(),
                            day: *day,
                            existing_slot: existing_slot.clone(),
                            candidate_slot: candidate_slot.clone(),
                        });
                    }
                }
            }
        }
    }

    conflicts
}

/// Checks the whole schedule; each later block is treated as the candidate
/// against the blocks before it.
pub fn find_conflicts(schedule: &WeekSchedule) -> Vec<ScheduleConflict> {
    let blocks = schedule.blocks();
    blocks
        .iter()
        .enumerate()
        .flat_map(|(idx, candidate)| conflicts_with(&blocks[..idx], candidate))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaEntry {
    pub block_id: String,
    pub course_name: String,
    pub time_slot: TimeSlot,
}

/// A day's classes in start-time order.
pub fn classes_on(schedule: &WeekSchedule, day: DayOfWeek) -> Vec<AgendaEntry> {
    let mut agenda: Vec<AgendaEntry> = schedule
        .blocks()
        .iter()
        .filter(|block| block.meets_on(day))
        .flat_map(|block| {
            block.time_slots.iter().map(move |slot| AgendaEntry {
                block_id: block.id.clone(),
                course_name: block.course_name.clone(),
                time_slot: slot.clone(),
            })
        })
        .collect();

    agenda.sort_by_key(|entry| entry.time_slot.start_time);
    agenda
}
