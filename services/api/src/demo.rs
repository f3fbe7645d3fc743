use crate::infra::{load_evaluations, load_schedule, parse_date, parse_instant};
use campus_progress::academics::grading::{
    carry_forward_projection, check_grade, finalize, recompute, simulate, target_cards,
    CourseGradeState, Evaluation, EvaluationKind, EvaluationSet, Simulation, TargetStatus,
};
use campus_progress::academics::schedule::{
    classes_on, conflicts_with, find_conflicts, next_class, summarize, ClassBlock, DayOfWeek,
    TermWindow, TimeSlot, WeekSchedule,
};
use campus_progress::config::{AppConfig, GradingConfig};
use campus_progress::error::AppError;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct GradeReportArgs {
    /// Evaluation export (.csv) or JSON array of evaluations
    #[arg(long)]
    pub(crate) evaluations: PathBuf,
    /// Target grade to project (repeatable, defaults to the configured targets)
    #[arg(long = "target")]
    pub(crate) targets: Vec<f64>,
    /// Attach the final letter grade and approval
    #[arg(long)]
    pub(crate) finalize: bool,
}

#[derive(Args, Debug)]
pub(crate) struct GradeSimulationArgs {
    /// Evaluation export (.csv) or JSON array of evaluations
    #[arg(long)]
    pub(crate) evaluations: PathBuf,
    /// Hypothetical score for a pending evaluation as ID=SCORE (repeatable)
    #[arg(long = "score", value_parser = crate::infra::parse_score_override)]
    pub(crate) scores: Vec<(String, f64)>,
}

#[derive(Args, Debug)]
pub(crate) struct ScheduleReportArgs {
    /// JSON array of class blocks
    #[arg(long)]
    pub(crate) schedule: PathBuf,
    /// Reference instant (YYYY-MM-DDTHH:MM, defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Only consider blocks whose term window includes this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) active_on: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ScheduleCheckArgs {
    /// JSON array of the class blocks already on the schedule
    #[arg(long)]
    pub(crate) schedule: PathBuf,
    /// JSON file holding the proposed class block
    #[arg(long)]
    pub(crate) candidate: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference instant for the schedule portion (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Skip the schedule portion of the demo.
    #[arg(long)]
    pub(crate) skip_schedule: bool,
}

fn resolve_targets(explicit: Vec<f64>) -> Result<Vec<f64>, AppError> {
    if explicit.is_empty() {
        return Ok(AppConfig::load()?.grading.target_grades);
    }

    explicit
        .into_iter()
        .map(|target| check_grade(target).map_err(AppError::from))
        .collect()
}

pub(crate) fn run_grade_report(args: GradeReportArgs) -> Result<(), AppError> {
    let GradeReportArgs {
        evaluations,
        targets,
        finalize: close_course,
    } = args;

    let set = load_evaluations(&evaluations)?;
    let mut course = recompute(set.into_inner())?;
    if close_course {
        course = course.close()?;
    }

    render_grade_report(&course, &resolve_targets(targets)?)
}

pub(crate) fn run_grade_simulation(args: GradeSimulationArgs) -> Result<(), AppError> {
    let set = load_evaluations(&args.evaluations)?;
    let scores: BTreeMap<String, f64> = args.scores.into_iter().collect();
    let outcome = simulate(&set, &scores)?;
    render_simulation(&set, &outcome);
    Ok(())
}

pub(crate) fn run_schedule_report(args: ScheduleReportArgs) -> Result<(), AppError> {
    let mut schedule = load_schedule(&args.schedule)?;
    if let Some(date) = args.active_on {
        schedule = schedule.active_on(date);
    }
    let now = args.now.unwrap_or_else(|| Local::now().naive_local());
    render_schedule_report(&schedule, now);
    Ok(())
}

pub(crate) fn run_schedule_check(args: ScheduleCheckArgs) -> Result<(), AppError> {
    let schedule = load_schedule(&args.schedule)?;
    let raw = std::fs::read_to_string(&args.candidate)?;
    let candidate: ClassBlock = serde_json::from_str(&raw)?;
    candidate.validate()?;

    let conflicts = conflicts_with(schedule.blocks(), &candidate);
    if conflicts.is_empty() {
        println!(
            "{} fits the schedule: no overlapping class blocks.",
            candidate.course_name
        );
        return Ok(());
    }

    println!("{} conflicts with the schedule", candidate.course_name);
    for conflict in &conflicts {
        println!(
            "- {} with {}: {}-{} overlaps {}-{}",
            conflict.day.label(),
            conflict.existing_block_id,
            conflict.candidate_slot.start_time.format("%H:%M"),
            conflict.candidate_slot.end_time.format("%H:%M"),
            conflict.existing_slot.start_time.format("%H:%M"),
            conflict.existing_slot.end_time.format("%H:%M"),
        );
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(|| Local::now().naive_local());

    println!("Academic progress demo");
    let set = EvaluationSet::new(sample_evaluations(now))?;
    let course = recompute(set.clone().into_inner())?;
    render_grade_report(&course, &GradingConfig::default().target_grades)?;

    let pending: BTreeMap<String, f64> = set
        .pending()
        .map(|evaluation| (evaluation.id.clone(), evaluation.max_score * 0.7))
        .collect();
    if !pending.is_empty() {
        println!("\nWhat-if: 70% on everything still pending");
        let outcome = simulate(&set, &pending)?;
        render_simulation(&set, &outcome);
    }

    if !args.skip_schedule {
        println!();
        let blocks = sample_blocks(now.date());
        let schedule = WeekSchedule::new(blocks)?;
        render_schedule_report(&schedule, now);
    }

    Ok(())
}

pub(crate) fn render_grade_report(
    course: &CourseGradeState,
    targets: &[f64],
) -> Result<(), AppError> {
    let computation = &course.computation;
    let standing = finalize(computation.current_grade)?;

    println!("Course grade");
    println!(
        "Current grade: {:.2} ({}) across {} graded evaluation(s)",
        computation.current_grade,
        standing.letter_grade.label(),
        computation.graded_count
    );
    println!(
        "Completed weight {:.1} | Remaining weight {:.1} | {:.2}% complete",
        computation.completed_weight, computation.remaining_weight, computation.completion_percentage
    );

    println!("\nEvaluations");
    for evaluation in course.evaluations.evaluations() {
        let score = match evaluation.graded_score() {
            Some(score) => format!("{score}/{}", evaluation.max_score),
            None => "pending".to_string(),
        };
        println!(
            "- {} ({}, {}%): {}",
            evaluation.name,
            evaluation.kind.label(),
            evaluation.weight,
            score
        );
    }

    println!("\nTargets");
    for projection in target_cards(course, targets) {
        match projection.status {
            TargetStatus::Achieved => println!("- {:.1}: already secured", projection.target),
            TargetStatus::Needed => println!(
                "- {:.1}: average {:.2} needed on the remaining weight",
                projection.target, projection.needed_average
            ),
            TargetStatus::Impossible => {
                println!("- {:.1}: out of reach", projection.target)
            }
        }
    }

    println!(
        "\nCarry-forward projection (informational): {:.2}",
        carry_forward_projection(computation)
    );

    if let Some(final_grade) = course.final_grade {
        println!(
            "Final grade: {:.2} {} ({})",
            final_grade.numeric_grade,
            final_grade.letter_grade.label(),
            if final_grade.is_approved {
                "approved"
            } else {
                "not approved"
            }
        );
    }

    Ok(())
}

pub(crate) fn render_simulation(set: &EvaluationSet, outcome: &Simulation) {
    println!(
        "Simulated grade: {:.2} -> {:.2} {} ({})",
        outcome.baseline.current_grade,
        outcome.simulated.current_grade,
        outcome.final_simulated_grade.letter_grade.label(),
        if outcome.final_simulated_grade.is_approved {
            "approved"
        } else {
            "not approved"
        }
    );
    if outcome.simulated.remaining_weight > 0.0 {
        println!(
            "{:.1} weight still without a score",
            outcome.simulated.remaining_weight
        );
    }
    for id in &outcome.ignored {
        let name = set
            .get(id)
            .map(|evaluation| evaluation.name.as_str())
            .unwrap_or(id.as_str());
        println!("- ignored {name}: already graded");
    }
}

pub(crate) fn render_schedule_report(schedule: &WeekSchedule, now: NaiveDateTime) {
    println!("Weekly schedule (as of {})", now.format("%Y-%m-%d %H:%M"));

    match next_class(schedule, now) {
        Some(next) => println!(
            "Next class: {} on {} at {} in {} ({} min away)",
            next.class_block.course_name,
            if next.is_today {
                "today"
            } else {
                next.day.label()
            },
            next.time_slot.start_time.format("%H:%M"),
            next.time_slot.location,
            next.minutes_until
        ),
        None => println!("Next class: none scheduled"),
    }

    let today = DayOfWeek::of(now.date());
    let agenda = classes_on(schedule, today);
    if agenda.is_empty() {
        println!("\n{}: no classes", today.label());
    } else {
        println!("\n{}", today.label());
        for entry in &agenda {
            println!(
                "- {}-{} {} ({})",
                entry.time_slot.start_time.format("%H:%M"),
                entry.time_slot.end_time.format("%H:%M"),
                entry.course_name,
                entry.time_slot.location
            );
        }
    }

    let summary = summarize(schedule);
    println!(
        "\nLoad: {} course(s), {} credit(s), {:.1} hours per week",
        summary.total_courses, summary.total_credits, summary.weekly_hours
    );
    for entry in &summary.day_load {
        println!("- {}: {} class(es)", entry.day_label, entry.classes);
    }
    if let (Some(busiest), Some(lightest)) = (summary.busiest_day, summary.lightest_day) {
        println!(
            "Busiest day {} | Lightest day {} | {:.1} classes per active day",
            busiest.label(),
            lightest.label(),
            summary.average_classes_per_day
        );
    }
    println!(
        "Morning {} | Afternoon {} | Evening {}",
        summary.time_distribution.morning,
        summary.time_distribution.afternoon,
        summary.time_distribution.evening
    );

    let conflicts = find_conflicts(schedule);
    if conflicts.is_empty() {
        println!("\nConflicts: none");
    } else {
        println!("\nConflicts");
        for conflict in &conflicts {
            println!(
                "- {}: {} overlaps {}",
                conflict.day.label(),
                conflict.candidate_block_id,
                conflict.existing_block_id
            );
        }
    }
}

fn sample_evaluations(now: NaiveDateTime) -> Vec<Evaluation> {
    let at = |days_ago: i64| now - chrono::Duration::days(days_ago);

    vec![
        Evaluation {
            id: "quiz-1".to_string(),
            name: "Quiz 1".to_string(),
            kind: EvaluationKind::Quiz,
            weight: 15.0,
            max_score: 10.0,
            score: Some(8.5),
            is_submitted: true,
            date: at(40),
        },
        Evaluation {
            id: "midterm".to_string(),
            name: "Midterm Exam".to_string(),
            kind: EvaluationKind::Exam,
            weight: 30.0,
            max_score: 5.0,
            score: Some(3.4),
            is_submitted: true,
            date: at(14),
        },
        Evaluation {
            id: "project".to_string(),
            name: "Team Project".to_string(),
            kind: EvaluationKind::Project,
            weight: 25.0,
            max_score: 100.0,
            score: None,
            is_submitted: false,
            date: at(-10),
        },
        Evaluation {
            id: "final".to_string(),
            name: "Final Exam".to_string(),
            kind: EvaluationKind::Exam,
            weight: 30.0,
            max_score: 5.0,
            score: None,
            is_submitted: false,
            date: at(-30),
        },
    ]
}

fn sample_blocks(today: NaiveDate) -> Vec<ClassBlock> {
    let term = TermWindow {
        start: today - chrono::Duration::days(60),
        end: today + chrono::Duration::days(60),
    };
    let slot = |start: &str, end: &str, location: &str| TimeSlot::new(start, end, location);

    let blocks = [
        (
            "algebra",
            "Linear Algebra",
            vec![DayOfWeek::Monday, DayOfWeek::Wednesday],
            slot("08:00", "09:30", "Science 101"),
            4,
        ),
        (
            "writing",
            "Academic Writing",
            vec![DayOfWeek::Tuesday, DayOfWeek::Thursday],
            slot("13:00", "14:30", "Humanities 3"),
            3,
        ),
        (
            "biology-lab",
            "Biology Lab",
            vec![DayOfWeek::Friday],
            slot("18:00", "21:00", "Lab C"),
            2,
        ),
    ];

    blocks
        .into_iter()
        .filter_map(|(id, name, days, slot, credits)| {
            slot.ok().map(|slot| ClassBlock {
                id: id.to_string(),
                course_name: name.to_string(),
                days: days.into_iter().collect(),
                time_slots: vec![slot],
                credits,
                date_range: term,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_progress::academics::grading::GradeError;

    #[test]
    fn sample_data_is_valid_for_the_engine() {
        let now = NaiveDate::from_ymd_opt(2025, 10, 15)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid instant");
        let course = recompute(sample_evaluations(now)).expect("sample evaluations valid");
        assert_eq!(course.completed_weight(), 45.0);
        assert_eq!(course.computation.pending_count, 2);

        let schedule = WeekSchedule::new(sample_blocks(now.date())).expect("sample blocks valid");
        assert_eq!(schedule.blocks().len(), 3);
        assert!(find_conflicts(&schedule).is_empty());
    }

    #[test]
    fn explicit_targets_must_sit_on_the_grade_scale() {
        let targets = resolve_targets(vec![3.5, 4.0]).expect("targets valid");
        assert_eq!(targets, vec![3.5, 4.0]);
        assert!(matches!(
            resolve_targets(vec![3.0, 7.0]),
            Err(AppError::Grading(GradeError::GradeOutOfRange(_)))
        ));
    }
}
