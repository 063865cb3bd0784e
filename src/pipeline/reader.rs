use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::domain::RawRow;
use crate::error::Result;

/// How much of the file to sample when guessing the delimiter.
const SNIFF_BYTES: usize = 1024;

/// Picks the delimiter by sampling the head of the file: comma wins over
/// tab wins over semicolon, defaulting to comma. Matches how the vendor
/// exports actually look; no need for full dialect detection.
pub fn sniff_delimiter(sample: &str) -> u8 {
    if sample.contains(',') {
        b','
    } else if sample.contains('\t') {
        b'\t'
    } else if sample.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Reads a delimited text file into raw rows, one (header, cell) pair list
/// per record in file order. Per-record read failures are returned inline
/// so the caller can skip a bad row without losing the rest of the file.
pub fn read_rows(path: &Path) -> Result<Vec<std::result::Result<RawRow, csv::Error>>> {
    let content = fs::read_to_string(path)?;
    let sample: String = content.chars().take(SNIFF_BYTES).collect();
    let delimiter = sniff_delimiter(&sample);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                let row: RawRow = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), v.to_string()))
                    .collect();
                rows.push(Ok(row));
            }
            Err(e) => rows.push(Err(e)),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(sniff_delimiter("a,b,c"), b',');
        assert_eq!(sniff_delimiter("a\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter("a;b;c"), b';');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn reads_semicolon_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Date;Likes").unwrap();
        writeln!(f, "2024-03-01;12").unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row[0], ("Date".to_string(), "2024-03-01".to_string()));
        assert_eq!(row[1], ("Likes".to_string(), "12".to_string()));
    }

    #[test]
    fn strips_bom_from_first_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "\u{feff}Date,Likes").unwrap();
        writeln!(f, "2024-03-01,12").unwrap();

        let rows = read_rows(&path).unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row[0].0, "Date");
    }

    #[test]
    fn tolerates_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Date,Likes,Comments").unwrap();
        writeln!(f, "2024-03-01,12").unwrap();

        let rows = read_rows(&path).unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.len(), 2);
    }
}
