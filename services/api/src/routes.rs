use crate::infra::{deserialize_optional_instant, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use campus_progress::academics::grading::{
    carry_forward_projection, check_grade, finalize, recompute, required_average, simulate,
    target_cards, CourseGradeState, Evaluation, EvaluationSet, FinalGrade, GradeError, Simulation,
    TargetProjection,
};
use campus_progress::academics::schedule::{
    conflicts_with, find_conflicts, has_conflict, next_class, summarize, ClassBlock,
    ScheduleConflict, UpcomingClass, WeekSchedule, WeeklySummary,
};
use campus_progress::error::AppError;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct GradeSummaryRequest {
    pub(crate) evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub(crate) targets: Option<Vec<f64>>,
    #[serde(default)]
    pub(crate) finalize: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeSummaryResponse {
    pub(crate) state: CourseGradeState,
    pub(crate) standing: FinalGrade,
    pub(crate) targets: Vec<TargetProjection>,
    /// Assumes pending work scores the current average; not a target projection.
    pub(crate) carry_forward_projection: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimulationRequest {
    pub(crate) evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub(crate) hypothetical_scores: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequirementRequest {
    pub(crate) current_grade: f64,
    pub(crate) completed_weight: f64,
    pub(crate) remaining_weight: f64,
    pub(crate) target: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NextClassRequest {
    pub(crate) blocks: Vec<ClassBlock>,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub(crate) now: Option<NaiveDateTime>,
    #[serde(default)]
    pub(crate) active_only: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NextClassResponse {
    pub(crate) now: NaiveDateTime,
    pub(crate) next_class: Option<UpcomingClass>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConflictCheckRequest {
    pub(crate) existing: Vec<ClassBlock>,
    pub(crate) candidate: ClassBlock,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConflictCheckResponse {
    pub(crate) has_conflict: bool,
    pub(crate) conflicts: Vec<ScheduleConflict>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleSummaryRequest {
    pub(crate) blocks: Vec<ClassBlock>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScheduleSummaryResponse {
    pub(crate) summary: WeeklySummary,
    pub(crate) conflicts: Vec<ScheduleConflict>,
}

pub(crate) fn engine_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/grades/summary", post(grade_summary_endpoint))
        .route("/api/v1/grades/simulate", post(grade_simulation_endpoint))
        .route("/api/v1/grades/requirement", post(requirement_endpoint))
        .route("/api/v1/schedule/next-class", post(next_class_endpoint))
        .route("/api/v1/schedule/conflicts", post(conflict_check_endpoint))
        .route("/api/v1/schedule/summary", post(schedule_summary_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn rejected(context: &'static str) -> impl Fn(GradeError) -> AppError {
    move |err| {
        warn!(error = %err, "{context} rejected");
        AppError::from(err)
    }
}

pub(crate) async fn grade_summary_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<GradeSummaryRequest>,
) -> Result<Json<GradeSummaryResponse>, AppError> {
    let GradeSummaryRequest {
        evaluations,
        targets,
        finalize: close_course,
    } = payload;

    let targets = targets.unwrap_or_else(|| state.grading.target_grades.clone());
    for target in &targets {
        check_grade(*target).map_err(rejected("grade summary"))?;
    }

    let mut course = recompute(evaluations).map_err(rejected("grade summary"))?;
    if close_course {
        course = course.close().map_err(rejected("grade summary"))?;
    }
    let standing = finalize(course.current_grade()).map_err(rejected("grade summary"))?;

    debug!(
        current_grade = course.current_grade(),
        completed_weight = course.completed_weight(),
        targets = targets.len(),
        "grade summary computed"
    );

    Ok(Json(GradeSummaryResponse {
        targets: target_cards(&course, &targets),
        carry_forward_projection: carry_forward_projection(&course.computation),
        standing,
        state: course,
    }))
}

pub(crate) async fn grade_simulation_endpoint(
    Json(payload): Json<SimulationRequest>,
) -> Result<Json<Simulation>, AppError> {
    let set = EvaluationSet::new(payload.evaluations).map_err(rejected("grade simulation"))?;
    let outcome =
        simulate(&set, &payload.hypothetical_scores).map_err(rejected("grade simulation"))?;

    debug!(
        simulated_grade = outcome.simulated.current_grade,
        ignored = outcome.ignored.len(),
        "grade simulation computed"
    );

    Ok(Json(outcome))
}

pub(crate) async fn requirement_endpoint(
    Json(payload): Json<RequirementRequest>,
) -> Result<Json<TargetProjection>, AppError> {
    check_grade(payload.current_grade).map_err(rejected("grade requirement"))?;
    check_grade(payload.target).map_err(rejected("grade requirement"))?;
    for (label, weight) in [
        ("completed_weight", payload.completed_weight),
        ("remaining_weight", payload.remaining_weight),
    ] {
        if !weight.is_finite() || !(0.0..=100.0).contains(&weight) {
            return Err(rejected("grade requirement")(GradeError::WeightOutOfRange {
                id: label.to_string(),
                weight,
            }));
        }
    }
    let total_weight = payload.completed_weight + payload.remaining_weight;
    // Same tolerance the evaluation set applies to summed weights.
    if total_weight > 100.0 + 1e-9 {
        return Err(rejected("grade requirement")(GradeError::WeightOverflow {
            total_weight,
        }));
    }

    Ok(Json(required_average(
        payload.current_grade,
        payload.completed_weight,
        payload.remaining_weight,
        payload.target,
    )))
}

fn schedule_from(blocks: Vec<ClassBlock>) -> Result<WeekSchedule, AppError> {
    WeekSchedule::new(blocks).map_err(|err| {
        warn!(error = %err, "schedule rejected");
        AppError::from(err)
    })
}

pub(crate) async fn next_class_endpoint(
    Json(payload): Json<NextClassRequest>,
) -> Result<Json<NextClassResponse>, AppError> {
    let now = payload.now.unwrap_or_else(|| Local::now().naive_local());
    let mut schedule = schedule_from(payload.blocks)?;
    if payload.active_only {
        schedule = schedule.active_on(now.date());
    }

    let next_class = next_class(&schedule, now);
    debug!(found = next_class.is_some(), %now, "next class resolved");

    Ok(Json(NextClassResponse { now, next_class }))
}

pub(crate) async fn conflict_check_endpoint(
    Json(payload): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let existing = schedule_from(payload.existing)?;
    payload.candidate.validate().map_err(|err| {
        warn!(error = %err, "candidate class block rejected");
        AppError::from(err)
    })?;

    let has_conflict = has_conflict(existing.blocks(), &payload.candidate);
    let conflicts = conflicts_with(existing.blocks(), &payload.candidate);
    debug!(has_conflict, candidate = %payload.candidate.id, "conflict check computed");

    Ok(Json(ConflictCheckResponse {
        has_conflict,
        conflicts,
    }))
}

pub(crate) async fn schedule_summary_endpoint(
    Json(payload): Json<ScheduleSummaryRequest>,
) -> Result<Json<ScheduleSummaryResponse>, AppError> {
    let schedule = schedule_from(payload.blocks)?;
    let summary = summarize(&schedule);
    let conflicts = find_conflicts(&schedule);
    debug!(
        courses = summary.total_courses,
        weekly_hours = summary.weekly_hours,
        "schedule summary computed"
    );

    Ok(Json(ScheduleSummaryResponse { summary, conflicts }))
}
