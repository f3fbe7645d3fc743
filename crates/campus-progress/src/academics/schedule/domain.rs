use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Canonical week, monday first. Runtime weekday indexes are converted at
/// the boundary and never used internally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The day `offset` days later, wrapping around the week.
    pub fn after(self, offset: usize) -> Self {
        Self::ordered()[(self.index() + offset) % 7]
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(value: Weekday) -> Self {
        Self::ordered()[value.num_days_from_monday() as usize]
    }
}

impl FromStr for DayOfWeek {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|day| day.as_str() == normalized)
            .ok_or_else(|| ScheduleError::UnknownDay(value.to_string()))
    }
}

impl TryFrom<String> for DayOfWeek {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a zero-padded 24-hour `HH:MM` clock time.
pub fn parse_clock(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let trimmed = raw.trim();
    let well_formed = trimmed.len() == 5
        && trimmed.as_bytes()[2] == b':'
        && trimmed
            .bytes()
            .enumerate()
            .all(|(idx, byte)| idx == 2 || byte.is_ascii_digit());
    if !well_formed {
        return Err(ScheduleError::InvalidTime(raw.to_string()));
    }

    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}

pub(crate) fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

mod clock_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "clock_format")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_format")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location: String,
}

impl TimeSlot {
    pub fn new(start: &str, end: &str, location: impl Into<String>) -> Result<Self, ScheduleError> {
        let slot = Self {
            start_time: parse_clock(start)?,
            end_time: parse_clock(end)?,
            location: location.into(),
        };
        slot.validate()?;
        Ok(slot)
    }

    pub fn duration_minutes(&self) -> i64 {
        minutes_since_midnight(self.end_time) - minutes_since_midnight(self.start_time)
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    /// Half-open overlap; touching boundaries do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_time < other.end_time && self.end_time > other.start_time
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        if self.end_time <= self.start_time {
            return Err(ScheduleError::InvertedTimeSlot {
                start: self.start_time.format("%H:%M").to_string(),
                end: self.end_time.format("%H:%M").to_string(),
            });
        }
        Ok(())
    }
}

/// Term window a weekly pattern is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TermWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One weekly-recurring course meeting pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBlock {
    pub id: String,
    pub course_name: String,
    pub days: BTreeSet<DayOfWeek>,
    pub time_slots: Vec<TimeSlot>,
    pub credits: u32,
    pub date_range: TermWindow,
}

impl ClassBlock {
    pub fn meets_on(&self, day: DayOfWeek) -> bool {
        self.days.contains(&day)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.days.is_empty() {
            return Err(ScheduleError::NoMeetingDays(self.id.clone()));
        }
        if self.time_slots.is_empty() {
            return Err(ScheduleError::NoTimeSlots(self.id.clone()));
        }
        for slot in &self.time_slots {
            slot.validate()?;
        }
        if self.credits == 0 {
            return Err(ScheduleError::NoCredits(self.id.clone()));
        }
        if self.date_range.end <= self.date_range.start {
            return Err(ScheduleError::InvertedTermWindow {
                id: self.id.clone(),
                start: self.date_range.start,
                end: self.date_range.end,
            });
        }
        Ok(())
    }
}

/// Validated class blocks for one student/term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeekSchedule {
    blocks: Vec<ClassBlock>,
}

impl WeekSchedule {
    pub fn new(blocks: Vec<ClassBlock>) -> Result<Self, ScheduleError> {
        let mut seen = HashSet::new();
        for block in &blocks {
            block.validate()?;
            if !seen.insert(block.id.as_str()) {
                return Err(ScheduleError::DuplicateBlock(block.id.clone()));
            }
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[ClassBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks whose term window includes `date`.
    pub fn active_on(&self, date: NaiveDate) -> WeekSchedule {
        WeekSchedule {
            blocks: self
                .blocks
                .iter()
                .filter(|block| block.date_range.contains(date))
                .cloned()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("'{0}' is not a day of the week")]
    UnknownDay(String),
    #[error("'{0}' is not a valid HH:MM time")]
    InvalidTime(String),
    #[error("time slot ends at {end}, which is not after its start at {start}")]
    InvertedTimeSlot { start: String, end: String },
    #[error("class block {0} has no meeting days")]
    NoMeetingDays(String),
    #[error("class block {0} has no time slots")]
    NoTimeSlots(String),
    #[error("class block {0} must carry at least one credit")]
    NoCredits(String),
    #[error("class block {id} ends on {end}, which is not after its start on {start}")]
    InvertedTermWindow {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("class block {0} appears more than once")]
    DuplicateBlock(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrono_weekdays_map_onto_monday_first_week() {
        assert_eq!(DayOfWeek::from(Weekday::Mon), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::from(Weekday::Sun), DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::Saturday.after(3), DayOfWeek::Tuesday);
        assert_eq!(DayOfWeek::Monday.after(7), DayOfWeek::Monday);
    }

    #[test]
    fn day_names_parse_case_insensitively() {
        assert_eq!("Friday".parse::<DayOfWeek>(), Ok(DayOfWeek::Friday));
        assert_eq!(
            "funday".parse::<DayOfWeek>(),
            Err(ScheduleError::UnknownDay("funday".to_string()))
        );

        let days: Vec<DayOfWeek> =
            serde_json::from_str(r#"["monday", "WEDNESDAY"]"#).expect("days deserialize");
        assert_eq!(days, vec![DayOfWeek::Monday, DayOfWeek::Wednesday]);
        assert!(serde_json::from_str::<DayOfWeek>("\"mon\"").is_err());
        assert_eq!(
            serde_json::to_string(&DayOfWeek::Thursday).expect("serializes"),
            "\"thursday\""
        );
    }

    #[test]
    fn clock_times_must_be_zero_padded() {
        assert!(parse_clock("09:30").is_ok());
        assert!(parse_clock("9:30").is_err());
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("12:60").is_err());
    }

    #[test]
    fn slots_round_trip_as_hh_mm() {
        let slot: TimeSlot =
            serde_json::from_str(r#"{"start_time":"08:00","end_time":"09:30","location":"B-12"}"#)
                .expect("slot deserializes");
        assert_eq!(slot.duration_minutes(), 90);
        let json = serde_json::to_value(&slot).expect("slot serializes");
        assert_eq!(json["start_time"], "08:00");
    }

    #[test]
    fn inverted_slots_are_rejected() {
        assert!(matches!(
            TimeSlot::new("10:00", "10:00", "Lab"),
            Err(ScheduleError::InvertedTimeSlot { .. })
        ));
    }
}
