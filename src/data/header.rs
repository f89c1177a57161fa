use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::error::{DataError, DataResult};
use super::model::Column;

/// Field delimiter of the source format.
pub const DELIMITER: u8 = b',';

/// Longest header line accepted, terminator included.
pub const MAX_HEADER_BYTES: u64 = 1024 * 1024;

/// Read the column catalog from the first line of `path`.
///
/// Only the first line is consumed, so the cost does not grow with the file.
pub fn read_header(path: &Path) -> DataResult<Vec<Column>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file).take(MAX_HEADER_BYTES);

    let mut bytes = Vec::new();
    reader.read_until(b'\n', &mut bytes)?;
    if !bytes.ends_with(b"\n") && bytes.len() as u64 == MAX_HEADER_BYTES {
        return Err(DataError::Format(format!(
            "header line longer than {MAX_HEADER_BYTES} bytes"
        )));
    }
    let line = String::from_utf8(bytes)
        .map_err(|_| DataError::Format("header line is not valid UTF-8".to_string()))?;

    let columns = parse_header_line(&line)?;
    log::info!("Read {} columns from {}", columns.len(), path.display());
    Ok(columns)
}

/// Split one header line into trimmed, indexed columns.
pub fn parse_header_line(line: &str) -> DataResult<Vec<Column>> {
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
        return Err(DataError::Format("header line is empty".to_string()));
    }

    let columns: Vec<Column> = line
        .split(DELIMITER as char)
        .enumerate()
        .map(|(index, name)| Column::new(name.trim(), index))
        .collect();

    if columns.is_empty() {
        return Err(DataError::Format("header has no fields".to_string()));
    }
    Ok(columns)
}
