use chrono::{NaiveTime, Timelike};

pub const SLOT_MINUTES: u32 = 15;
pub const SLOTS_PER_DAY: usize = 96;

/// Index of the 15-minute slot containing `minutes_past_midnight`.
/// No bounds checking; callers pass a value in `0..1440`.
#[inline]
pub fn slot_index(minutes_past_midnight: u32) -> usize {
    (minutes_past_midnight / SLOT_MINUTES) as usize
}

#[inline]
pub fn minutes_past_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Minutes and seconds already elapsed inside the slot that contains `t`.
pub fn elapsed_in_slot(t: NaiveTime) -> (u32, u32) {
    (minutes_past_midnight(t) % SLOT_MINUTES, t.second())
}

/// Start time of slot `index` as `HH:MM`.
pub fn slot_label(index: usize) -> String {
    let start = index as u32 * SLOT_MINUTES;
    format!("{:02}:{:02}", start / 60, start % 60)
}

/// True during the first minute of the day.
pub fn is_midnight(t: NaiveTime) -> bool {
    t.hour() == 0 && t.minute() == 0
}
