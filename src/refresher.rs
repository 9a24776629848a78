use crate::errors::AppError;
use crate::loader::ScheduleLoader;
use crate::model::ScheduleRecord;
use crate::now_indicator::{schedule_grid, NowIndicator};
use crate::playback::{decide, PlaybackAction, PlaybackConfig};
use crate::slot::{is_midnight, minutes_past_midnight, slot_index};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::sync::RwLock;

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock reading of `utc` in `tz`, or in local time. The zone's
/// offset is looked up per instant, so DST changes apply.
pub fn local_time(tz: Option<Tz>, utc: DateTime<Utc>) -> NaiveDateTime {
    match tz {
        Some(tz) => utc.with_timezone(&tz).naive_local(),
        None => utc.with_timezone(&Local).naive_local(),
    }
}

/// Wall clock, either in the given zone or in local time.
pub struct SystemClock {
    pub tz: Option<Tz>,
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        local_time(self.tz, Utc::now())
    }
}

/// Always reports the same instant.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// At most one refresh runs at a time; the permit clears the flag on drop.
#[derive(Debug, Default)]
pub struct RefreshGuard {
    in_flight: AtomicBool,
}

pub struct RefreshPermit<'a> {
    guard: &'a RefreshGuard,
}

impl RefreshGuard {
    pub fn try_begin(&self) -> Option<RefreshPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshPermit { guard: self })
    }
}

impl Drop for RefreshPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::Release);
    }
}

struct Loaded {
    day: NaiveDate,
    table: Arc<Vec<ScheduleRecord>>,
}

/// The day's table, swapped wholesale when a new day's schedule loads.
pub struct ScheduleStore {
    state: RwLock<Loaded>,
    guard: RefreshGuard,
}

impl ScheduleStore {
    pub fn new(day: NaiveDate, table: Vec<ScheduleRecord>) -> Self {
        Self {
            state: RwLock::new(Loaded { day, table: Arc::new(table) }),
            guard: RefreshGuard::default(),
        }
    }

    pub async fn table(&self) -> Arc<Vec<ScheduleRecord>> {
        Arc::clone(&self.state.read().await.table)
    }

    pub async fn loaded_day(&self) -> NaiveDate {
        self.state.read().await.day
    }

    #[cfg(test)]
    pub fn guard(&self) -> &RefreshGuard {
        &self.guard
    }

    /// Reloads the table for `day`. Returns `Ok(false)` without loading
    /// when another refresh is already running.
    pub async fn refresh(
        &self,
        loader: Arc<dyn ScheduleLoader>,
        day: NaiveDate,
    ) -> Result<bool, AppError> {
        let Some(_permit) = self.guard.try_begin() else {
            warn!("refresh for {} skipped: another refresh is in flight", day);
            return Ok(false);
        };

        let weekday = day.weekday();
        let table = tokio::task::spawn_blocking(move || loader.load(weekday))
            .await
            .map_err(|e| AppError::Other(format!("loader join: {e}")))??;

        info!("loaded {} slots for {} ({:?})", table.len(), day, weekday);
        *self.state.write().await = Loaded { day, table: Arc::new(table) };
        Ok(true)
    }
}

/// Emitted whenever the slot on air changes or a new day's table loads.
#[derive(Clone, Debug, Serialize)]
pub struct TickEvent {
    pub at: NaiveDateTime,
    pub slot: usize,
    pub action: PlaybackAction,
    /// Grid lines around the current slot, with the now marker applied.
    pub grid_window: Vec<String>,
}

pub struct TickConfig {
    pub period: Duration,
    pub max_ticks: Option<u64>,
    pub playback: PlaybackConfig,
}

fn grid_window(grid: &[String], slot: usize) -> Vec<String> {
    let start = slot.saturating_sub(1);
    let end = (slot + 2).min(grid.len());
    grid.get(start..end).map(|w| w.to_vec()).unwrap_or_default()
}

/// Drives playback on a fixed period until `max_ticks` or until the
/// receiver goes away.
pub async fn run_ticks(
    store: Arc<ScheduleStore>,
    loader: Arc<dyn ScheduleLoader>,
    clock: Arc<dyn Clock>,
    cfg: TickConfig,
    tx: Sender<TickEvent>,
) -> Result<(), AppError> {
    let mut interval = tokio::time::interval(cfg.period);
    let mut table = store.table().await;
    let mut grid = schedule_grid(&table);
    let mut indicator = NowIndicator::new();
    let mut last_slot: Option<usize> = None;
    let mut stale = false;
    let mut ticks: u64 = 0;

    loop {
        if cfg.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        interval.tick().await;
        ticks += 1;

        let now = clock.now();
        // Covers the midnight rollover and any ticks missed around it; the
        // old day's table must not keep playing.
        if store.loaded_day().await != now.date() {
            if is_midnight(now.time()) {
                info!("midnight: loading schedule for {}", now.date());
            } else {
                info!("day changed to {} since last tick; reloading schedule", now.date());
            }
            if let Err(e) = store.refresh(Arc::clone(&loader), now.date()).await {
                warn!("schedule reload failed: {}", e);
            }
        }

        let current = store.table().await;
        let reloaded = !Arc::ptr_eq(&current, &table);
        if reloaded {
            indicator.clear(&mut grid);
            table = current;
            grid = schedule_grid(&table);
        }

        // A failed reload leaves yesterday's table in place; it must not be
        // played. Retried on every tick until the load succeeds.
        let is_stale = store.loaded_day().await != now.date();
        let stale_changed = is_stale != stale;
        stale = is_stale;

        let slot = slot_index(minutes_past_midnight(now.time()));
        indicator.update(&mut grid, slot, true);
        if !reloaded && !stale_changed && last_slot == Some(slot) {
            trace!("tick {}: slot {} unchanged", ticks, slot);
            continue;
        }
        last_slot = Some(slot);

        let action = if stale {
            warn!("tick {}: no schedule for {}; playing live", ticks, now.date());
            PlaybackAction::Live { record: None }
        } else {
            decide(&cfg.playback, &table, now.time())
        };
        debug!("tick {}: slot {} -> {:?}", ticks, slot, action);
        let event = TickEvent { at: now, slot, action, grid_window: grid_window(&grid, slot) };
        if tx.send(event).await.is_err() {
            warn!("tick loop: receiver closed; stopping");
            break;
        }
    }
    Ok(())
}
