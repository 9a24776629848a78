use crate::errors::AppError;
use crate::model::ScheduleRecord;
use crate::resolver::resolve_at;
use crate::slot::{elapsed_in_slot, SLOT_MINUTES};
use chrono::NaiveTime;
use log::{debug, warn};
use serde::Serialize;

pub const DEFAULT_BASE_URL: &str = "http://8balltv.club/content/";

#[derive(Clone, Debug)]
pub struct PlaybackConfig {
    pub base_url: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.into() }
    }
}

/// What the player should do for the current slot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlaybackAction {
    Clip {
        record: ScheduleRecord,
        src_url: String,
        playback_seconds: u32,
    },
    /// `record` is `None` when the slot could not be resolved and the
    /// player falls back to the live stream.
    Live { record: Option<ScheduleRecord> },
}

impl PlaybackAction {
    pub fn record(&self) -> Option<&ScheduleRecord> {
        match self {
            PlaybackAction::Clip { record, .. } => Some(record),
            PlaybackAction::Live { record } => record.as_ref(),
        }
    }

    pub fn metadata(&self) -> Option<Metadata> {
        self.record().map(Metadata::from_record)
    }
}

/// Title and modal contents shown alongside the player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub modal_text: String,
    pub duration_label: String,
}

impl Metadata {
    pub fn from_record(r: &ScheduleRecord) -> Self {
        // "m" for minutes
        Self {
            title: r.title.clone(),
            modal_text: r.modal_text.clone(),
            duration_label: format!("{}m", r.duration.trim()),
        }
    }
}

/// Start of the record's chunk within its file, in seconds.
pub fn chunk_offset_seconds(record: &ScheduleRecord) -> Result<u32, AppError> {
    let part = record.part_number()? as u32;
    Ok((part - 1) * SLOT_MINUTES * 60)
}

/// Seek position for a scheduled clip at wall-clock `now`: the chunk start
/// plus whatever has already elapsed in the current slot.
pub fn scheduled_offset_seconds(record: &ScheduleRecord, now: NaiveTime) -> Result<u32, AppError> {
    let (minutes, seconds) = elapsed_in_slot(now);
    Ok(chunk_offset_seconds(record)? + minutes * 60 + seconds)
}

pub fn src_url(cfg: &PlaybackConfig, file_name: &str, playback_seconds: u32) -> String {
    format!("{}{}#t={}", cfg.base_url, file_name, playback_seconds)
}

fn clip_action(cfg: &PlaybackConfig, record: &ScheduleRecord, playback_seconds: u32) -> PlaybackAction {
    PlaybackAction::Clip {
        record: record.clone(),
        src_url: src_url(cfg, &record.file_name, playback_seconds),
        playback_seconds,
    }
}

fn try_decide(cfg: &PlaybackConfig, table: &[ScheduleRecord], now: NaiveTime) -> Result<PlaybackAction, AppError> {
    let record = resolve_at(table, now)?;
    if record.is_live() {
        return Ok(PlaybackAction::Live { record: Some(record.clone()) });
    }
    let offset = scheduled_offset_seconds(record, now)?;
    Ok(clip_action(cfg, record, offset))
}

/// Picks the action for `now`. Resolution errors never escape: they are
/// logged and the player falls back to the live stream.
pub fn decide(cfg: &PlaybackConfig, table: &[ScheduleRecord], now: NaiveTime) -> PlaybackAction {
    match try_decide(cfg, table, now) {
        Ok(action) => {
            debug!("playback at {}: {:?}", now, action);
            action
        }
        Err(e) => {
            warn!("falling back to live at {}: {}", now, e);
            PlaybackAction::Live { record: None }
        }
    }
}

/// A clip picked from a collection plays from the start of its chunk,
/// independent of the wall clock.
pub fn collection_clip(cfg: &PlaybackConfig, record: &ScheduleRecord) -> Result<PlaybackAction, AppError> {
    let offset = chunk_offset_seconds(record)?;
    Ok(clip_action(cfg, record, offset))
}
