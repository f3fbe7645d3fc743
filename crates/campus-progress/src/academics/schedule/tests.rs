use super::*;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

fn term() -> TermWindow {
    TermWindow {
        start: NaiveDate::from_ymd_opt(2025, 8, 4).expect("valid term start"),
        end: NaiveDate::from_ymd_opt(2025, 12, 5).expect("valid term end"),
    }
}

fn block(id: &str, days: &[DayOfWeek], slots: &[(&str, &str)]) -> ClassBlock {
    ClassBlock {
        id: id.to_string(),
        course_name: format!("Course {id}"),
        days: days.iter().copied().collect::<BTreeSet<_>>(),
        time_slots: slots
            .iter()
            .map(|(start, end)| TimeSlot::new(start, end, "Main 101").expect("valid slot"))
            .collect(),
        credits: 3,
        date_range: term(),
    }
}

fn schedule(blocks: Vec<ClassBlock>) -> WeekSchedule {
    WeekSchedule::new(blocks).expect("valid schedule")
}

/// 2025-10-15 is a Wednesday.
fn wednesday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 15)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid instant")
}

#[test]
fn next_class_moves_to_later_day_when_today_is_over() {
    let week = schedule(vec![
        block("chem", &[DayOfWeek::Wednesday], &[("08:00", "09:00")]),
        block("hist", &[DayOfWeek::Friday], &[("10:00", "11:00")]),
    ]);

    let next = next_class(&week, wednesday_at(9, 0)).expect("a class is upcoming");

    assert_eq!(next.class_block.id, "hist");
    assert_eq!(next.day, DayOfWeek::Friday);
    assert!(!next.is_today);
    assert_eq!(next.minutes_until, 2 * 24 * 60 + 60);
}

#[test]
fn next_class_picks_earliest_slot_regardless_of_input_order() {
    let week = schedule(vec![
        block("late", &[DayOfWeek::Wednesday], &[("15:00", "16:00")]),
        block(
            "split",
            &[DayOfWeek::Wednesday],
            &[("13:00", "14:00"), ("10:30", "11:30")],
        ),
    ]);

    let next = next_class(&week, wednesday_at(9, 15)).expect("a class is upcoming");

    assert!(next.is_today);
    assert_eq!(next.class_block.id, "split");
    assert_eq!(next.time_slot.start_time, parse_clock("10:30").expect("valid"));
    assert_eq!(next.minutes_until, 75);
}

#[test]
fn class_starting_now_is_not_next() {
    let week = schedule(vec![block(
        "math",
        &[DayOfWeek::Wednesday],
        &[("09:00", "10:00")],
    )]);

    let next = next_class(&week, wednesday_at(9, 0)).expect("wraps to next week");

    assert_eq!(next.day, DayOfWeek::Wednesday);
    assert!(!next.is_today);
    assert_eq!(next.minutes_until, 7 * 24 * 60);
}

#[test]
fn next_class_wraps_past_sunday() {
    let week = schedule(vec![
        block("lab", &[DayOfWeek::Tuesday], &[("14:00", "16:00")]),
        block("seminar", &[DayOfWeek::Monday], &[("18:00", "19:00")]),
    ]);
    let saturday = NaiveDate::from_ymd_opt(2025, 10, 18)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid instant");

    let next = next_class(&week, saturday).expect("a class is upcoming");

    assert_eq!(next.day, DayOfWeek::Monday);
    assert_eq!(next.class_block.id, "seminar");
}

#[test]
fn empty_schedule_has_no_next_class() {
    assert!(next_class(&WeekSchedule::default(), wednesday_at(8, 0)).is_none());
}

#[test]
fn touching_slots_do_not_conflict() {
    let existing = block("a", &[DayOfWeek::Monday], &[("09:00", "10:00")]);
    let candidate = block("b", &[DayOfWeek::Monday], &[("10:00", "11:00")]);

    assert!(!has_conflict(&[existing.clone()], &candidate));
    assert!(!has_conflict(&[candidate], &existing));
}

#[test]
fn overlapping_slots_conflict_from_either_side() {
    let existing = block("a", &[DayOfWeek::Monday], &[("09:00", "10:30")]);
    let candidate = block(
        "b",
        &[DayOfWeek::Monday, DayOfWeek::Thursday],
        &[("10:00", "11:00")],
    );

    assert!(has_conflict(&[existing.clone()], &candidate));
    assert!(has_conflict(&[candidate.clone()], &existing));

    let conflicts = conflicts_with(&[existing], &candidate);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].day, DayOfWeek::Monday);
    assert_eq!(conflicts[0].existing_block_id, "a");
}

#[test]
fn same_times_on_different_days_do_not_conflict() {
    let existing = block("a", &[DayOfWeek::Monday, DayOfWeek::Wednesday], &[("09:00", "11:00")]);
    let candidate = block("b", &[DayOfWeek::Tuesday], &[("09:00", "11:00")]);

    assert!(!has_conflict(&[existing], &candidate));
}

#[test]
fn contained_slot_conflicts() {
    let existing = block("a", &[DayOfWeek::Friday], &[("08:00", "12:00")]);
    let candidate = block("b", &[DayOfWeek::Friday], &[("09:00", "09:30")]);

    assert!(has_conflict(&[existing], &candidate));
}

#[test]
fn whole_schedule_check_reports_each_pair_once() {
    let week = schedule(vec![
        block("a", &[DayOfWeek::Monday], &[("09:00", "10:30")]),
        block("b", &[DayOfWeek::Monday], &[("10:00", "11:00")]),
        block("c", &[DayOfWeek::Monday], &[("11:00", "12:00")]),
    ]);

    let conflicts = find_conflicts(&week);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].existing_block_id, "a");
    assert_eq!(conflicts[0].candidate_block_id, "b");
}

#[test]
fn weekly_hours_multiply_by_meeting_days() {
    let week = schedule(vec![block(
        "bio",
        &[DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday],
        &[("08:00", "09:30")],
    )]);

    let summary = summarize(&week);

    assert_eq!(summary.weekly_hours, 4.5);
    assert_eq!(summary.total_courses, 1);
    assert_eq!(summary.total_credits, 3);
    assert_eq!(summary.average_classes_per_day, 1.0 / 3.0);
}

#[test]
fn busiest_and_lightest_days_break_ties_in_week_order() {
    let week = schedule(vec![
        block("a", &[DayOfWeek::Tuesday, DayOfWeek::Thursday], &[("09:00", "10:00")]),
        block("b", &[DayOfWeek::Thursday, DayOfWeek::Tuesday], &[("13:00", "14:00")]),
        block("c", &[DayOfWeek::Monday], &[("19:00", "20:00")]),
    ]);

    let summary = summarize(&week);

    assert_eq!(summary.busiest_day, Some(DayOfWeek::Tuesday));
    assert_eq!(summary.lightest_day, Some(DayOfWeek::Wednesday));
    assert_eq!(summary.day_load[1].classes, 2);
    assert_eq!(summary.average_classes_per_day, 1.0);
}

#[test]
fn time_distribution_skips_slots_outside_buckets() {
    let week = schedule(vec![
        block("dawn", &[DayOfWeek::Monday], &[("05:30", "06:30")]),
        block("am", &[DayOfWeek::Monday], &[("06:00", "07:00"), ("11:59", "12:30")]),
        block("pm", &[DayOfWeek::Tuesday], &[("12:00", "13:00"), ("17:45", "18:15")]),
        block("eve", &[DayOfWeek::Wednesday], &[("18:00", "19:00"), ("22:00", "23:00")]),
    ]);

    let distribution = summarize(&week).time_distribution;

    assert_eq!(distribution.morning, 2);
    assert_eq!(distribution.afternoon, 2);
    assert_eq!(distribution.evening, 1);
}

#[test]
fn empty_schedule_summary_is_zeroed() {
    let summary = summarize(&WeekSchedule::default());

    assert_eq!(summary.total_courses, 0);
    assert_eq!(summary.weekly_hours, 0.0);
    assert_eq!(summary.busiest_day, None);
    assert_eq!(summary.lightest_day, None);
    assert_eq!(summary.average_classes_per_day, 0.0);
}

#[test]
fn agenda_lists_day_in_start_order() {
    let week = schedule(vec![
        block("b", &[DayOfWeek::Thursday], &[("14:00", "15:00")]),
        block("a", &[DayOfWeek::Thursday, DayOfWeek::Friday], &[("08:00", "09:00")]),
    ]);

    let agenda = classes_on(&week, DayOfWeek::Thursday);

    let ids: Vec<&str> = agenda.iter().map(|entry| entry.block_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(classes_on(&week, DayOfWeek::Sunday).is_empty());
}

#[test]
fn term_window_filters_inactive_blocks() {
    let mut summer = block("summer", &[DayOfWeek::Monday], &[("09:00", "10:00")]);
    summer.date_range = TermWindow {
        start: NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"),
        end: NaiveDate::from_ymd_opt(2025, 7, 25).expect("valid date"),
    };
    let week = schedule(vec![summer, block("fall", &[DayOfWeek::Monday], &[("11:00", "12:00")])]);

    let active = week.active_on(NaiveDate::from_ymd_opt(2025, 10, 13).expect("valid date"));

    assert_eq!(active.blocks().len(), 1);
    assert_eq!(active.blocks()[0].id, "fall");
}

#[test]
fn invalid_blocks_are_rejected() {
    let mut no_days = block("a", &[DayOfWeek::Monday], &[("09:00", "10:00")]);
    no_days.days.clear();
    assert_eq!(
        WeekSchedule::new(vec![no_days]),
        Err(ScheduleError::NoMeetingDays("a".to_string()))
    );

    let mut inverted = block("b", &[DayOfWeek::Monday], &[("09:00", "10:00")]);
    inverted.time_slots[0].end_time = parse_clock("08:00").expect("valid");
    assert!(matches!(
        WeekSchedule::new(vec![inverted]),
        Err(ScheduleError::InvertedTimeSlot { .. })
    ));

    let mut closed_term = block("c", &[DayOfWeek::Monday], &[("09:00", "10:00")]);
    closed_term.date_range.end = closed_term.date_range.start;
    assert!(matches!(
        WeekSchedule::new(vec![closed_term]),
        Err(ScheduleError::InvertedTermWindow { .. })
    ));

    let duplicate = block("d", &[DayOfWeek::Monday], &[("09:00", "10:00")]);
    assert_eq!(
        WeekSchedule::new(vec![duplicate.clone(), duplicate]),
        Err(ScheduleError::DuplicateBlock("d".to_string()))
    );
}
