use crate::errors::AppError;
use csv::{ReaderBuilder, Terminator};
use log::{debug, info};
use std::io::Read;
use std::path::Path;

#[inline]
fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{FEFF}').unwrap_or(s)
}

pub fn read_tsv_file(path: &Path) -> Result<Vec<Vec<String>>, AppError> {
    let f = std::fs::File::open(path)
        .map_err(|e| AppError::IO(format!("open {}: {}", path.display(), e)))?;
    let rows = read_tsv(f)?;
    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Reads every row of a tab-separated document, header included. Rows may
/// have differing widths; width checks belong to the schedule parser.
/// Row N is line N + 1 of the input: a blank line inside the document comes
/// back as an empty row so later rows keep their slot positions. Blank lines
/// after the last record are dropped.
pub fn read_tsv<R: Read>(mut reader: R) -> Result<Vec<Vec<String>>, AppError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    let text = strip_bom(&raw);

    // Only '\n' ends a record; '\r' is trimmed per cell below.
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());
    let mut records = rdr.records();

    let mut out: Vec<Vec<String>> = Vec::new();
    for line in text.split('\n') {
        // csv skips empty lines without reporting them.
        if line.is_empty() {
            out.push(Vec::new());
            continue;
        }
        let rec = records
            .next()
            .ok_or_else(|| AppError::Parse(format!("tsv: no record for line {}", out.len() + 1)))??;
        let row: Vec<String> = rec.iter().map(|c| c.trim_end_matches('\r').to_string()).collect();
        debug!("tsv row {}: {} cells", out.len(), row.len());
        out.push(row);
    }
    while out.last().is_some_and(|r| r.iter().all(|c| c.is_empty())) {
        out.pop();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_ragged_rows() {
        let doc = "time\tid\tpart\n00:00\ta1\t1\n00:15\ta1\n";
        let rows = read_tsv(doc.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["time", "id", "part"]);
        assert_eq!(rows[2], vec!["00:15", "a1"]);
    }

    #[test]
    fn keeps_quotes_and_empty_cells() {
        let doc = "a\tb\tc\n\"quoted\" text\t\tlast\n";
        let rows = read_tsv(doc.as_bytes()).unwrap();
        assert_eq!(rows[1], vec!["\"quoted\" text", "", "last"]);
    }

    #[test]
    fn strips_bom_and_crlf() {
        let doc = "\u{FEFF}time\tid\r\n00:00\ta1\r\n";
        let rows = read_tsv(doc.as_bytes()).unwrap();
        assert_eq!(rows[0], vec!["time", "id"]);
        assert_eq!(rows[1], vec!["00:00", "a1"]);
    }

    #[test]
    fn blank_line_keeps_its_row() {
        let doc = "h1\th2\n00:00\ta\n\n00:30\tc\n";
        let rows = read_tsv(doc.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[2].is_empty());
        assert_eq!(rows[3], vec!["00:30", "c"]);
    }

    #[test]
    fn trailing_blank_lines_are_dropped() {
        let doc = "h1\th2\r\nx\ty\r\n\r\n\n";
        let rows = read_tsv(doc.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["x", "y"]);
    }

    #[test]
    fn reads_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "h1\th2").unwrap();
        writeln!(f, "x\ty").unwrap();
        let rows = read_tsv_file(f.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_tsv_file(Path::new("/definitely/not/here.tsv")).unwrap_err();
        assert!(matches!(err, AppError::IO(_)));
    }
}
