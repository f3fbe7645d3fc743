use super::domain::{Evaluation, EvaluationKind, EvaluationSet, GradeError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum EvaluationImportError {
    #[error("failed to read evaluation export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid evaluation CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: could not parse date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: could not parse {field} '{value}'")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error(transparent)]
    Grade(#[from] GradeError),
}

/// Reads evaluation exports with the columns
/// `id,name,type,weight,max_score,score,submitted,date`.
pub struct EvaluationImporter;

impl EvaluationImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<EvaluationSet, EvaluationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<EvaluationSet, EvaluationImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut evaluations = Vec::new();

        for (index, record) in csv_reader.deserialize::<EvaluationRow>().enumerate() {
            let row = record?;
            evaluations.push(row.into_evaluation(index + 1)?);
        }

        Ok(EvaluationSet::new(evaluations)?)
    }
}

#[derive(Debug, Deserialize)]
struct EvaluationRow {
    id: String,
    name: String,
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    kind: Option<String>,
    weight: String,
    max_score: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    submitted: Option<String>,
    date: String,
}

impl EvaluationRow {
    fn into_evaluation(self, row: usize) -> Result<Evaluation, EvaluationImportError> {
        let weight = parse_number(row, "weight", &self.weight)?;
        let max_score = parse_number(row, "max_score", &self.max_score)?;
        let score = self
            .score
            .as_deref()
            .map(|value| parse_number(row, "score", value))
            .transpose()?;
        let is_submitted = match self.submitted.as_deref() {
            Some(flag) => parse_flag(flag),
            None => score.is_some(),
        };
        let date = parse_datetime(&self.date).ok_or_else(|| EvaluationImportError::InvalidDate {
            row,
            value: self.date.clone(),
        })?;

        Ok(Evaluation {
            id: self.id,
            name: self.name,
            kind: self
                .kind
                .as_deref()
                .map(EvaluationKind::from_label)
                .unwrap_or(EvaluationKind::Other),
            weight,
            max_score,
            score,
            is_submitted,
            date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_number(row: usize, field: &'static str, value: &str) -> Result<f64, EvaluationImportError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| EvaluationImportError::InvalidNumber {
            row,
            field,
            value: value.to_string(),
        })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
