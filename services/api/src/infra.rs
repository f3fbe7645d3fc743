use campus_progress::academics::grading::{Evaluation, EvaluationImporter, EvaluationSet};
use campus_progress::academics::schedule::{ClassBlock, WeekSchedule};
use campus_progress::config::GradingConfig;
use campus_progress::error::AppError;
use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) grading: Arc<GradingConfig>,
}

/// Accepts `YYYY-MM-DDTHH:MM`, with optional seconds.
pub(crate) fn parse_instant(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM ({err})"))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// `id=score` pairs given to the simulator on the command line.
pub(crate) fn parse_score_override(raw: &str) -> Result<(String, f64), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=SCORE, got '{raw}'"))?;
    let score = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid score in '{raw}' ({err})"))?;
    Ok((id.trim().to_string(), score))
}

pub(crate) fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_instant(&value).map_err(serde::de::Error::custom))
        .transpose()
}

/// Evaluations from a CSV export or a JSON array, picked by extension.
pub(crate) fn load_evaluations(path: &Path) -> Result<EvaluationSet, AppError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        return Ok(EvaluationImporter::from_path(path)?);
    }

    let raw = std::fs::read_to_string(path)?;
    let evaluations: Vec<Evaluation> = serde_json::from_str(&raw)?;
    Ok(EvaluationSet::new(evaluations)?)
}

pub(crate) fn load_blocks(path: &Path) -> Result<Vec<ClassBlock>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn load_schedule(path: &Path) -> Result<WeekSchedule, AppError> {
    Ok(WeekSchedule::new(load_blocks(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instants_accept_optional_seconds() {
        let with_seconds = parse_instant("2025-10-15T09:00:30").expect("parses");
        let without = parse_instant("2025-10-15T09:00").expect("parses");
        assert_eq!(with_seconds.date(), without.date());
        assert!(parse_instant("2025-10-15").is_err());
    }

    #[test]
    fn score_overrides_split_on_equals() {
        assert_eq!(
            parse_score_override("final = 4.2"),
            Ok(("final".to_string(), 4.2))
        );
        assert!(parse_score_override("final").is_err());
        assert!(parse_score_override("final=high").is_err());
    }
}
