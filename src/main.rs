mod cli;
mod errors;
mod loader;
mod model;
mod now_indicator;
mod playback;
mod refresher;
mod resolver;
mod schedule;
mod slot;
mod sources;
mod tsv;

use crate::errors::AppError;
use crate::loader::{DirLoader, FileLoader, ScheduleLoader};
use crate::model::{parse_clock_time, CollectionRecord, ScheduleRecord};
use crate::playback::{PlaybackAction, PlaybackConfig};
use crate::refresher::{Clock, FixedClock, ScheduleStore, SystemClock, TickConfig, TickEvent};
use crate::schedule::{ParseMode, ParsedSchedule};
use crate::sources::ScheduleSource;
use chrono::{Datelike, NaiveDateTime, Weekday};
use chrono_tz::Tz;
use env_logger::Env;
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn setup_logging(level: &str) {
    let env = Env::default().filter_or("RUST_LOG", match level {
        "essential" => "info",
        "debug" => "debug",
        "trace" => "trace",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    });
    env_logger::Builder::from_env(env).init();
}

fn parse_tz(args_tz: &Option<String>) -> Option<Tz> {
    let tzname = args_tz.as_ref()?;
    match tzname.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            warn!("Timezone parse failed; falling back to local");
            None
        }
    }
}

fn build_clock(args: &cli::CliArgs, tz: Option<Tz>) -> Result<Arc<dyn Clock>, AppError> {
    let system = SystemClock { tz };
    match args.at.as_deref() {
        Some(at) => {
            let t = parse_clock_time(at)
                .ok_or_else(|| AppError::Parse(format!("--at '{}' is not a clock time", at)))?;
            Ok(Arc::new(FixedClock(system.now().date().and_time(t))))
        }
        None => Ok(Arc::new(system)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let s = serde_json::to_string_pretty(value).map_err(|e| AppError::Other(format!("json: {}", e)))?;
    println!("{}", s);
    Ok(())
}

fn describe(action: &PlaybackAction) -> String {
    match action {
        PlaybackAction::Clip { record, src_url, playback_seconds } => {
            format!("CLIP  {}  [{}] {} @ {}s", src_url, record.id, record.title, playback_seconds)
        }
        PlaybackAction::Live { record: Some(r) } => format!("LIVE  [{}] {}", r.id, r.title),
        PlaybackAction::Live { record: None } => "LIVE  (fallback: no schedule entry)".to_string(),
    }
}

fn readable_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Watch mode follows the wall clock, so it can only show today's schedule.
fn check_watch_day(watch: bool, day: Weekday, today: Weekday) -> Result<(), AppError> {
    if watch && day != today {
        return Err(AppError::Other(format!(
            "--watch follows today's schedule ({:?}); drop --day {:?}",
            today, day
        )));
    }
    Ok(())
}

fn collection_length(c: &CollectionRecord) -> String {
    match c.duration_minutes() {
        Ok(m) => readable_minutes(m),
        Err(_) => format!("{}m", c.duration.trim()),
    }
}

fn parse_weekday(s: &str) -> Result<Weekday, AppError> {
    s.parse::<Weekday>()
        .map_err(|_| AppError::Parse(format!("unknown weekday '{}'", s)))
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), AppError> {
    let args = cli::parse_cli();
    setup_logging(&args.log_level);

    let mode: ParseMode = args.mode.parse()?;
    let tz = parse_tz(&args.tz);
    let clock = build_clock(&args, tz)?;
    let now = clock.now();
    let source = args.dir.clone().map(ScheduleSource::new);
    let playback = PlaybackConfig { base_url: args.base_url.clone() };

    info!("Starting at {} ({:?})", now, now.weekday());

    match mode {
        ParseMode::Collection => run_collections(&args, source.as_ref()),
        ParseMode::Clip if args.collection.is_some() => {
            run_collection_clips(&args, source.as_ref(), &playback)
        }
        ParseMode::Clip => {
            let loader: Arc<dyn ScheduleLoader> = match (&source, &args.schedule) {
                (Some(src), _) => Arc::new(DirLoader::new(src.clone())),
                (None, Some(path)) => Arc::new(FileLoader::new(path)),
                (None, None) => {
                    return Err(AppError::Other("need a schedule file or --dir".into()));
                }
            };
            let day = match args.day.as_deref() {
                Some(d) => parse_weekday(d)?,
                None => now.weekday(),
            };
            check_watch_day(args.watch, day, now.weekday())?;
            if let Some(src) = &source {
                let available = src.discover()?;
                info!("schedules in {}: {:?}", src.dir.display(), available);
                if !available.contains(&day) {
                    warn!("no schedule file for {}", sources::day_name(day));
                }
            }
            let table = loader.load(day)?;
            info!("Loaded {} slots for {:?}", table.len(), day);

            if args.grid {
                print_grid(&table, now, day == now.weekday());
                Ok(())
            } else if args.watch {
                run_watch(&args, table, now, loader, clock, playback).await
            } else {
                let action = playback::decide(&playback, &table, now.time());
                if args.json { print_json(&action) } else {
                    println!("{}", describe(&action));
                    if let Some(m) = action.metadata() {
                        println!("      {} ({})", m.title, m.duration_label);
                        if !m.modal_text.is_empty() {
                            println!("      {}", m.modal_text);
                        }
                    }
                    Ok(())
                }
            }
        }
    }
}

fn print_grid(table: &[ScheduleRecord], now: NaiveDateTime, today_selected: bool) {
    let mut grid = now_indicator::schedule_grid(table);
    let mut indicator = now_indicator::NowIndicator::new();
    let current = slot::slot_index(slot::minutes_past_midnight(now.time()));
    indicator.update(&mut grid, current, today_selected);
    if let Some(marked) = indicator.marked_slot() {
        info!("now marker at slot {} ({})", marked, slot::slot_label(marked));
    }
    for line in &grid {
        println!("{}", line);
    }
}

fn collection_rows_path(args: &cli::CliArgs, source: Option<&ScheduleSource>) -> Result<PathBuf, AppError> {
    match (source, &args.schedule) {
        (Some(src), _) => Ok(src.collection_info_path()),
        (None, Some(path)) => Ok(path.clone()),
        (None, None) => Err(AppError::Other("need a collection file or --dir".into())),
    }
}

fn run_collections(args: &cli::CliArgs, source: Option<&ScheduleSource>) -> Result<(), AppError> {
    let path = collection_rows_path(args, source)?;
    let parsed = schedule::parse_schedule(&tsv::read_tsv_file(&path)?, ParseMode::Collection)?;
    info!("parsed {} collections from {}", parsed.len(), path.display());
    let ParsedSchedule::Collections(collections) = parsed else {
        return Err(AppError::Other("collection parse produced clip rows".into()));
    };

    if let Some(id) = args.collection.as_deref() {
        let found = resolver::find_collection(&collections, id)
            .ok_or_else(|| AppError::Other(format!("no collection '{}'", id)))?;
        return if args.json { print_json(found) } else {
            println!("{}  {}  {}  ({})", found.id, found.name, found.details, collection_length(found));
            Ok(())
        };
    }

    if args.json {
        return print_json(&collections);
    }
    for c in &collections {
        println!("{}  {}  ({})", c.id, c.name, collection_length(c));
    }
    Ok(())
}

/// Lists the playable clips of one collection, each starting at its chunk.
fn run_collection_clips(
    args: &cli::CliArgs,
    source: Option<&ScheduleSource>,
    playback: &PlaybackConfig,
) -> Result<(), AppError> {
    let src = source.ok_or_else(|| AppError::Other("--collection in clip mode needs --dir".into()))?;
    let id = args.collection.as_deref().unwrap_or_default();
    let videos = schedule::parse_clips(&tsv::read_tsv_file(&src.collection_videos_path())?)?;

    let mut actions = Vec::new();
    for rec in videos.iter().filter(|r| r.collection_or_time.collection_id() == Some(id)) {
        match playback::collection_clip(playback, rec) {
            Ok(a) => actions.push(a),
            Err(e) => warn!("skipping clip {} of collection {}: {}", rec.id, id, e),
        }
    }
    info!("collection {}: {} playable clips", id, actions.len());

    if args.json {
        return print_json(&actions);
    }
    for a in &actions {
        let length = a
            .record()
            .and_then(|r| r.duration_minutes().ok())
            .map(readable_minutes)
            .unwrap_or_default();
        println!("{}  {}", describe(a), length);
    }
    Ok(())
}

async fn run_watch(
    args: &cli::CliArgs,
    table: Vec<ScheduleRecord>,
    now: NaiveDateTime,
    loader: Arc<dyn ScheduleLoader>,
    clock: Arc<dyn Clock>,
    playback: PlaybackConfig,
) -> Result<(), AppError> {
    let store = Arc::new(ScheduleStore::new(now.date(), table));
    let cfg = TickConfig {
        period: Duration::from_secs(args.tick_secs.max(1)),
        max_ticks: args.ticks,
        playback,
    };

    let (tx, mut rx) = mpsc::channel::<TickEvent>(16);
    let ticker = tokio::spawn(refresher::run_ticks(store, loader, clock, cfg, tx));

    let json = args.json;
    let sink = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            if json {
                print_json(&ev)?;
            } else {
                println!("{}  slot {:>2}  {}", ev.at.format("%Y-%m-%d %H:%M:%S"), ev.slot, describe(&ev.action));
                for line in &ev.grid_window {
                    println!("    {}", line);
                }
            }
        }
        Ok::<_, AppError>(())
    });

    let t_res = ticker.await.unwrap_or_else(|e| Err(AppError::IO(format!("ticker join: {e}"))));
    let s_res = sink.await.unwrap_or_else(|e| Err(AppError::IO(format!("sink join: {e}"))));
    t_res?;
    s_res?;
    info!("Done.");
    Ok(())
}
