//! Scratch CSV files for tests.

use std::fmt::Write as _;
use std::io::Write;

use csv_chart::data::loader::{run_load, CancelToken, LoadOutcome, LoadRequest};
use csv_chart::{Column, SeriesStore};
use tempfile::NamedTempFile;

/// Builds a comma-separated file with a header and generated rows.
pub struct CsvBuilder {
    header: Vec<String>,
    body: String,
}

impl CsvBuilder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            header: columns.iter().map(|c| c.to_string()).collect(),
            body: String::new(),
        }
    }

    /// `cols` numeric columns named `c0..`, `rows` rows where cell (r, c)
    /// holds `r * 10 + c`.
    pub fn numeric(cols: usize, rows: usize) -> Self {
        let names: Vec<String> = (0..cols).map(|c| format!("c{c}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut builder = Self::new(&refs);
        for r in 0..rows {
            let cells: Vec<String> = (0..cols).map(|c| (r * 10 + c).to_string()).collect();
            builder.body.push_str(&cells.join(","));
            builder.body.push('\n');
        }
        builder
    }

    pub fn row(mut self, cells: &[&str]) -> Self {
        let _ = writeln!(self.body, "{}", cells.join(","));
        self
    }

    pub fn write(&self) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        writeln!(file, "{}", self.header.join(",")).expect("write header");
        file.write_all(self.body.as_bytes()).expect("write body");
        file.flush().expect("flush");
        file
    }
}

pub fn columns(names: &[(&str, usize)]) -> Vec<Column> {
    names.iter().map(|&(n, i)| Column::new(n, i)).collect()
}

/// Run a load to completion on the calling thread.
pub fn load_now(request: &LoadRequest) -> SeriesStore {
    match run_load(request, &CancelToken::new(), |_| {}).expect("load succeeds") {
        LoadOutcome::Completed(store) => store,
        LoadOutcome::Cancelled => panic!("load unexpectedly cancelled"),
    }
}
