use crate::errors::AppError;
use crate::model::ScheduleRecord;
use crate::schedule::parse_clips;
use crate::sources::ScheduleSource;
use crate::tsv::read_tsv_file;
use chrono::Weekday;
use log::debug;
use std::path::PathBuf;

pub trait ScheduleLoader: Send + Sync {
    fn load(&self, day: Weekday) -> Result<Vec<ScheduleRecord>, AppError>;
}

/// Serves the same schedule file for every day of the week.
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileLoader { path: path.into() }
    }
}

impl ScheduleLoader for FileLoader {
    fn load(&self, day: Weekday) -> Result<Vec<ScheduleRecord>, AppError> {
        debug!("loading {} for {:?}", self.path.display(), day);
        parse_clips(&read_tsv_file(&self.path)?)
    }
}

/// Picks `<dir>/<weekday>.tsv` for the requested day.
pub struct DirLoader {
    source: ScheduleSource,
}

impl DirLoader {
    pub fn new(source: ScheduleSource) -> Self {
        DirLoader { source }
    }
}

impl ScheduleLoader for DirLoader {
    fn load(&self, day: Weekday) -> Result<Vec<ScheduleRecord>, AppError> {
        let path = self.source.path_for_day(day);
        debug!("loading {} for {:?}", path.display(), day);
        parse_clips(&read_tsv_file(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONDAY: &str = "time\tid\tpart\tfile\ttitle\tdirector\tmodal\tduration\n\
                          00:00\tm1\t1\tmon.mp4\tMon\tD\tM\t30\n";
    const TUESDAY: &str = "time\tid\tpart\tfile\ttitle\tdirector\tmodal\tduration\n\
                           LIVE\tt1\t\t\tTue\tD\tM\t15\n\
                           00:15\tt2\t1\ttue.mp4\tTue 2\tD\tM\t30\n";

    #[test]
    fn dir_loader_picks_weekday_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("monday.tsv"), MONDAY).unwrap();
        std::fs::write(dir.path().join("tuesday.tsv"), TUESDAY).unwrap();
        let loader = DirLoader::new(ScheduleSource::new(dir.path()));

        let mon = loader.load(Weekday::Mon).unwrap();
        assert_eq!(mon.len(), 1);
        assert_eq!(mon[0].file_name, "mon.mp4");

        let tue = loader.load(Weekday::Tue).unwrap();
        assert_eq!(tue.len(), 2);
        assert!(tue[0].is_live());

        assert!(matches!(loader.load(Weekday::Wed), Err(AppError::IO(_))));
    }

    #[test]
    fn blank_line_in_schedule_is_a_malformed_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gap.tsv");
        let doc = "time\tid\tpart\tfile\ttitle\tdirector\tmodal\tduration\n\
                   00:00\ta\t1\ta.mp4\tA\tD\tM\t30\n\
                   \n\
                   00:30\tc\t1\tc.mp4\tC\tD\tM\t30\n";
        std::fs::write(&path, doc).unwrap();
        match FileLoader::new(&path).load(Weekday::Mon) {
            Err(AppError::MalformedRow { row, expected, found }) => {
                assert_eq!(row, 2);
                assert_eq!(expected, crate::schedule::CLIP_COLUMNS);
                assert_eq!(found, 0);
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn file_loader_ignores_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("any.tsv");
        std::fs::write(&path, MONDAY).unwrap();
        let loader = FileLoader::new(&path);
        assert_eq!(loader.load(Weekday::Sat).unwrap(), loader.load(Weekday::Sun).unwrap());
    }
}
