use crate::errors::AppError;
use chrono::Weekday;
use log::{debug, trace};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A directory holding one schedule per weekday (`monday.tsv`, ...) plus
/// the two collection tabs.
#[derive(Clone, Debug)]
pub struct ScheduleSource {
    pub dir: PathBuf,
}

impl ScheduleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for_day(&self, day: Weekday) -> PathBuf {
        self.dir.join(format!("{}.tsv", day_name(day)))
    }

    pub fn collection_info_path(&self) -> PathBuf {
        self.dir.join("collection_info.tsv")
    }

    pub fn collection_videos_path(&self) -> PathBuf {
        self.dir.join("collection_videos.tsv")
    }

    /// Weekdays that have a schedule file in the directory, Monday first.
    pub fn discover(&self) -> Result<Vec<Weekday>, AppError> {
        if !self.dir.is_dir() {
            return Err(AppError::IO(format!("schedule dir {} not found", self.dir.display())));
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let e = entry.map_err(|e| AppError::IO(format!("walkdir: {}", e)))?;
            if !e.file_type().is_file() { continue; }
            if let Some(day) = day_for_file(e.path()) {
                trace!("schedule for {:?}: {}", day, e.path().display());
                found.push(day);
            }
        }
        found.sort_by_key(|d| d.num_days_from_monday());
        debug!("discovered {} day schedules in {}", found.len(), self.dir.display());
        Ok(found)
    }
}

fn day_for_file(path: &Path) -> Option<Weekday> {
    if path.extension()?.to_str()? != "tsv" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
    DAYS.iter().copied().find(|d| day_name(*d) == stem)
}
