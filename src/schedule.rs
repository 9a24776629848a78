use crate::errors::AppError;
use crate::model::{CollectionOrTime, CollectionRecord, ScheduleRecord};
use log::{debug, trace, warn};
use std::str::FromStr;

/// Column count of a clip row: collectionOrTime, id, partNumber, fileName,
/// title, director, modalText, duration.
pub const CLIP_COLUMNS: usize = 8;
/// Column count of a collection row: id, name, details, duration.
pub const COLLECTION_COLUMNS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseMode {
    Clip,
    Collection,
}

impl FromStr for ParseMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clip" | "clips" => Ok(ParseMode::Clip),
            "collection" | "collections" => Ok(ParseMode::Collection),
            other => Err(AppError::Parse(format!("unknown parse mode '{}'", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedSchedule {
    Clips(Vec<ScheduleRecord>),
    Collections(Vec<CollectionRecord>),
}

impl ParsedSchedule {
    pub fn len(&self) -> usize {
        match self {
            ParsedSchedule::Clips(v) => v.len(),
            ParsedSchedule::Collections(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn parse_schedule<R: AsRef<[String]>>(rows: &[R], mode: ParseMode) -> Result<ParsedSchedule, AppError> {
    match mode {
        ParseMode::Clip => parse_clips(rows).map(ParsedSchedule::Clips),
        ParseMode::Collection => parse_collections(rows).map(ParsedSchedule::Collections),
    }
}

fn data_rows<'a, R: AsRef<[String]>>(
    rows: &'a [R],
    expected: usize,
) -> impl Iterator<Item = Result<&'a [String], AppError>> + 'a {
    // Row 0 is the sheet's column titles.
    rows.iter().enumerate().skip(1).map(move |(i, r)| {
        let cols = r.as_ref();
        if cols.len() < expected {
            debug!("row {}: {} columns, need {}", i, cols.len(), expected);
            return Err(AppError::MalformedRow { row: i, expected, found: cols.len() });
        }
        Ok(cols)
    })
}

pub fn parse_clips<R: AsRef<[String]>>(rows: &[R]) -> Result<Vec<ScheduleRecord>, AppError> {
    let mut out = Vec::with_capacity(rows.len().saturating_sub(1));
    for cols in data_rows(rows, CLIP_COLUMNS) {
        let c = cols?;
        let rec = ScheduleRecord {
            id: c[1].clone(),
            part_number: c[2].clone(),
            file_name: c[3].clone(),
            title: c[4].clone(),
            director: c[5].clone(),
            modal_text: c[6].clone(),
            duration: c[7].clone(),
            collection_or_time: CollectionOrTime::from_cell(&c[0]),
        };
        trace!("clip slot {} -> id={} file={} first={:?}", out.len(), rec.id, rec.file_name, rec.collection_or_time);
        out.push(rec);
    }
    if out.is_empty() && !rows.is_empty() {
        warn!("schedule has a header but no clip rows");
    }
    Ok(out)
}

pub fn parse_collections<R: AsRef<[String]>>(rows: &[R]) -> Result<Vec<CollectionRecord>, AppError> {
    let mut out = Vec::with_capacity(rows.len().saturating_sub(1));
    for cols in data_rows(rows, COLLECTION_COLUMNS) {
        let c = cols?;
        out.push(CollectionRecord {
            id: c[0].clone(),
            name: c[1].clone(),
            details: c[2].clone(),
            duration: c[3].clone(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn header() -> Vec<String> {
        row(&["time", "id", "part", "file", "title", "director", "modal", "duration"])
    }

    #[test]
    fn drops_header_and_keeps_order() {
        let rows = vec![
            header(),
            row(&["00:00", "a1", "1", "a.mp4", "Alpha", "Dir A", "Modal A", "60"]),
            row(&["LIVE", "b2", "", "", "Beta", "Dir B", "Modal B", "15"]),
        ];
        let clips = parse_clips(&rows).unwrap();
        assert_eq!(clips.len(), 2);

        let a = &clips[0];
        assert_eq!(a.id, "a1");
        assert_eq!(a.part_number, "1");
        assert_eq!(a.file_name, "a.mp4");
        assert_eq!(a.title, "Alpha");
        assert_eq!(a.director, "Dir A");
        assert_eq!(a.modal_text, "Modal A");
        assert_eq!(a.duration, "60");
        assert!(matches!(a.collection_or_time, CollectionOrTime::Time(_)));

        assert_eq!(clips[1].id, "b2");
        assert!(clips[1].is_live());
    }

    #[test]
    fn header_only_is_empty() {
        let rows = vec![header()];
        assert!(parse_clips(&rows).unwrap().is_empty());
        let parsed = parse_schedule(&rows, ParseMode::Collection).unwrap();
        assert_eq!(parsed.len(), 0);
        assert!(parsed.is_empty());
        assert!(ParsedSchedule::Clips(vec![]).is_empty());
    }

    #[test]
    fn no_rows_is_empty() {
        let rows: Vec<Vec<String>> = vec![];
        assert!(parse_clips(&rows).unwrap().is_empty());
    }

    #[test]
    fn short_row_names_index_and_width() {
        let rows = vec![
            header(),
            row(&["00:00", "a1", "1", "a.mp4", "Alpha", "Dir A", "Modal A", "60"]),
            row(&["00:15", "a1", "2"]),
        ];
        match parse_clips(&rows) {
            Err(AppError::MalformedRow { row, expected, found }) => {
                assert_eq!(row, 2);
                assert_eq!(expected, CLIP_COLUMNS);
                assert_eq!(found, 3);
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn extra_columns_are_ignored() {
        let rows = vec![
            header(),
            row(&["noir", "a1", "1", "a.mp4", "Alpha", "Dir", "Modal", "60", "notes"]),
        ];
        let clips = parse_clips(&rows).unwrap();
        assert_eq!(clips[0].collection_or_time.collection_id(), Some("noir"));
    }

    #[test]
    fn collection_mode_layout() {
        let rows = vec![
            row(&["id", "name", "details", "duration"]),
            row(&["noir", "Film Noir", "Shadows", "240"]),
        ];
        match parse_schedule(&rows, ParseMode::Collection).unwrap() {
            ParsedSchedule::Collections(c) => {
                assert_eq!(c.len(), 1);
                assert_eq!(c[0].id, "noir");
                assert_eq!(c[0].name, "Film Noir");
                assert_eq!(c[0].details, "Shadows");
                assert_eq!(c[0].duration, "240");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!parse_schedule(&rows, ParseMode::Collection).unwrap().is_empty());
    }

    #[test]
    fn short_collection_row() {
        let rows = vec![row(&["id", "name", "details", "duration"]), row(&["noir", "Film Noir"])];
        assert!(matches!(
            parse_collections(&rows),
            Err(AppError::MalformedRow { row: 1, expected: COLLECTION_COLUMNS, found: 2 })
        ));
    }

    #[test]
    fn mode_names() {
        assert_eq!("clip".parse::<ParseMode>().unwrap(), ParseMode::Clip);
        assert_eq!("Collections".parse::<ParseMode>().unwrap(), ParseMode::Collection);
        assert!("grid".parse::<ParseMode>().is_err());
    }
}
