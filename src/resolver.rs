use crate::errors::AppError;
use crate::model::{CollectionRecord, ScheduleRecord};
use crate::slot::{minutes_past_midnight, slot_index};
use chrono::NaiveTime;
use log::trace;

/// Record on air `minutes_past_midnight` into the day. The index is also
/// the clip's position in the day: index 5 is the sixth video.
pub fn resolve_current_record(
    table: &[ScheduleRecord],
    minutes_past_midnight: u32,
) -> Result<&ScheduleRecord, AppError> {
    let index = slot_index(minutes_past_midnight);
    trace!("minute {} -> slot {}", minutes_past_midnight, index);
    table
        .get(index)
        .ok_or(AppError::SlotNotFound { index, len: table.len() })
}

pub fn resolve_at(table: &[ScheduleRecord], t: NaiveTime) -> Result<&ScheduleRecord, AppError> {
    resolve_current_record(table, minutes_past_midnight(t))
}

pub fn find_collection<'a>(collections: &'a [CollectionRecord], id: &str) -> Option<&'a CollectionRecord> {
    collections.iter().find(|c| c.id == id)
}
