use crate::errors::AppError;
use chrono::NaiveTime;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// First schedule column. Depending on the row it holds a collection id,
/// the slot's clock time, or the live-stream sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CollectionOrTime {
    Collection(String),
    Time(NaiveTime),
    LiveMarker,
    None,
}

const LIVE_SENTINEL: &str = "LIVE";
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"];

fn time_like() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?\s*([AaPp][Mm])?$").unwrap())
}

/// Parses `HH:MM`, `HH:MM:SS` or 12-hour `H:MM AM` style clock times.
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if !time_like().is_match(s) {
        return None;
    }
    TIME_FORMATS.iter().find_map(|f| NaiveTime::parse_from_str(s, f).ok())
}

impl CollectionOrTime {
    pub fn from_cell(cell: &str) -> Self {
        let s = cell.trim();
        if s.is_empty() {
            return CollectionOrTime::None;
        }
        if s.eq_ignore_ascii_case(LIVE_SENTINEL) {
            return CollectionOrTime::LiveMarker;
        }
        if let Some(t) = parse_clock_time(s) {
            return CollectionOrTime::Time(t);
        }
        CollectionOrTime::Collection(s.to_string())
    }

    pub fn collection_id(&self) -> Option<&str> {
        match self {
            CollectionOrTime::Collection(id) => Some(id),
            _ => None,
        }
    }
}

/// One slot row of a day's schedule. Fields are kept as read; consumers
/// coerce through the accessors below.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleRecord {
    pub id: String,
    pub part_number: String,
    pub file_name: String,
    pub title: String,
    pub director: String,
    pub modal_text: String,
    pub duration: String,
    pub collection_or_time: CollectionOrTime,
}

impl ScheduleRecord {
    pub fn is_live(&self) -> bool {
        self.collection_or_time == CollectionOrTime::LiveMarker
    }

    /// Which 15-minute chunk of the file to seek to (1..=4).
    pub fn part_number(&self) -> Result<u8, AppError> {
        let raw = self.part_number.trim();
        match raw.parse::<u8>() {
            Ok(n @ 1..=4) => Ok(n),
            _ => Err(AppError::InvalidField { field: "part_number", value: raw.to_string() }),
        }
    }

    /// Length of the whole source file in minutes, not just this slot.
    pub fn duration_minutes(&self) -> Result<u32, AppError> {
        let raw = self.duration.trim();
        raw.parse::<u32>()
            .map_err(|_| AppError::InvalidField { field: "duration", value: raw.to_string() })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionRecord {
    pub id: String,
    pub name: String,
    pub details: String,
    pub duration: String,
}

impl CollectionRecord {
    /// Total running time of the collection's videos, in minutes.
    pub fn duration_minutes(&self) -> Result<u32, AppError> {
        let raw = self.duration.trim();
        raw.parse::<u32>()
            .map_err(|_| AppError::InvalidField { field: "duration", value: raw.to_string() })
    }
}
