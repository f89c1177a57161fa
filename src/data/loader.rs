use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use csv::{ByteRecord, ReaderBuilder};

use super::downsample::{compute_stride, is_sampled, sample_count};
use super::error::{DataError, DataResult};
use super::header::DELIMITER;
use super::model::{Axis, Column, Point, Series, SeriesStore};

/// Default point budget per load.
pub const DEFAULT_MAX_POINTS: usize = 5000;

/// Block size of the counting pass; cancellation is checked once per block.
const COUNT_CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// Everything a load needs, copied from the foreground at job start.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub path: PathBuf,
    /// Selected columns in catalog order.
    pub columns: Vec<Column>,
    pub max_points: usize,
    /// Axis assignment per column index; missing entries are primary.
    pub axes: BTreeMap<usize, Axis>,
}

impl LoadRequest {
    pub fn new(path: impl Into<PathBuf>, columns: Vec<Column>) -> Self {
        Self {
            path: path.into(),
            columns,
            max_points: DEFAULT_MAX_POINTS,
            axes: BTreeMap::new(),
        }
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_axes(mut self, axes: BTreeMap<usize, Axis>) -> Self {
        self.axes = axes;
        self
    }
}

/// How a load that did not fail ended.
#[derive(Debug)]
pub enum LoadOutcome {
    Completed(SeriesStore),
    Cancelled,
}

/// Cooperative cancellation flag shared between the requester and the job.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Count, sample and parse the selected columns of a CSV file.
///
/// `progress` receives a non-decreasing percentage and always ends at 100 on
/// success. Nothing built here is visible to anyone until the returned store
/// is published by the caller.
pub fn run_load(
    request: &LoadRequest,
    cancel: &CancelToken,
    mut progress: impl FnMut(u8),
) -> DataResult<LoadOutcome> {
    if request.columns.is_empty() {
        return Err(DataError::NoSelection);
    }
    log::info!(
        "Loading {} column(s) from {} (budget {} points)",
        request.columns.len(),
        request.path.display(),
        request.max_points
    );

    let Some(total_rows) = count_rows(&request.path, cancel)? else {
        log::info!("Load cancelled while counting rows");
        return Ok(LoadOutcome::Cancelled);
    };
    let stride = compute_stride(total_rows, request.max_points);
    log::debug!("{total_rows} data rows, stride {stride}");

    let capacity = sample_count(total_rows, stride);
    let mut working: Vec<Series> = request
        .columns
        .iter()
        .map(|col| {
            let axis = request.axes.get(&col.index).copied().unwrap_or_default();
            let mut series = Series::new(col.clone(), axis);
            series.points.reserve(capacity);
            series
        })
        .collect();

    let mut reporter = ProgressReporter::new(total_rows);
    let mut lines = LineReader::open(&request.path)?;
    // Header line.
    lines.next_line()?;
    let mut record = ByteRecord::new();

    for index in 0..total_rows {
        let Some(line) = lines.next_line()? else {
            break;
        };
        if !is_sampled(index, stride) {
            continue;
        }
        if cancel.is_cancelled() {
            log::info!("Load cancelled at row {index} of {total_rows}");
            return Ok(LoadOutcome::Cancelled);
        }
        split_fields(line, &mut record)?;
        push_row(&record, index, &mut working);
        reporter.update(index + stride, &mut progress);
    }

    if cancel.is_cancelled() {
        log::info!("Load cancelled before publish");
        return Ok(LoadOutcome::Cancelled);
    }
    reporter.finish(&mut progress);

    let store = SeriesStore::new(working, total_rows, stride);
    log::info!(
        "Loaded {} series, {} points (stride {stride})",
        store.len(),
        store.point_count()
    );
    Ok(LoadOutcome::Completed(store))
}

/// Physical lines of `path` after the header, or `None` if the job was
/// cancelled while counting. Blank lines are rows; a last line without a
/// terminator counts when it is not empty.
fn count_rows(path: &Path, cancel: &CancelToken) -> DataResult<Option<usize>> {
    let mut reader = BufReader::with_capacity(COUNT_CHUNK_SIZE, File::open(path)?);
    let mut lines = 0usize;
    let mut open_line = false;

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        lines += chunk.iter().filter(|&&b| b == b'\n').count();
        open_line = chunk.last() != Some(&b'\n');
        let len = chunk.len();
        reader.consume(len);

        if cancel.is_cancelled() {
            return Ok(None);
        }
    }
    if open_line {
        lines += 1;
    }
    Ok(Some(lines.saturating_sub(1)))
}

/// Reads a file one physical line at a time into a reused buffer.
struct LineReader {
    reader: BufReader<File>,
    buf: Vec<u8>,
}

impl LineReader {
    fn open(path: &Path) -> DataResult<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
            buf: Vec::new(),
        })
    }

    /// The next line without its terminator, or `None` at end of file.
    fn next_line(&mut self) -> DataResult<Option<&[u8]>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let mut line = self.buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest;
        }
        if let Some(rest) = line.strip_suffix(b"\r") {
            line = rest;
        }
        Ok(Some(line))
    }
}

/// Split one line into fields with the header's dialect: comma separated,
/// no quoting, any number of fields. A blank line gives an empty record.
fn split_fields(line: &[u8], record: &mut ByteRecord) -> DataResult<()> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(line);
    if !reader.read_byte_record(record)? {
        record.clear();
    }
    Ok(())
}

/// Append one point per selected column whose cell parses.
fn push_row(record: &ByteRecord, index: usize, working: &mut [Series]) {
    let x = (index + 1) as f64;
    for series in working.iter_mut() {
        let Some(y) = record.get(series.column.index).and_then(parse_cell) else {
            continue;
        };
        series.points.push(Point::new(x, y));
    }
}

/// Parse a numeric cell. Anything that is not a finite number is skipped.
pub fn parse_cell(field: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(field).ok()?.trim();
    let value = text.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Integer percentage of `processed` over `total`, clamped to 100. An empty
/// file counts as fully processed.
pub fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = processed.saturating_mul(100) / total;
    pct.min(100) as u8
}

/// Forwards a percentage only when it increases.
struct ProgressReporter {
    total: usize,
    last: Option<u8>,
}

impl ProgressReporter {
    fn new(total: usize) -> Self {
        Self { total, last: None }
    }

    fn update(&mut self, processed: usize, sink: &mut impl FnMut(u8)) {
        self.emit(percent(processed, self.total), sink);
    }

    fn finish(&mut self, sink: &mut impl FnMut(u8)) {
        self.emit(100, sink);
    }

    fn emit(&mut self, pct: u8, sink: &mut impl FnMut(u8)) {
        if self.last.is_some_and(|last| pct <= last) {
            return;
        }
        self.last = Some(pct);
        sink(pct);
    }
}

// ---------------------------------------------------------------------------
// LoadJob – lifecycle of one invocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Cancelled | JobState::Failed)
    }
}

/// Foreground view of a load: `Idle -> Running -> terminal -> Idle`.
#[derive(Debug, Clone, Default)]
pub struct LoadJob {
    pub id: u64,
    pub state: JobState,
    pub progress_percent: u8,
    pub error_message: Option<String>,
}

impl LoadJob {
    /// Enter `Running`. Only valid from `Idle`.
    pub fn start(&mut self, id: u64) -> bool {
        if self.state != JobState::Idle {
            log::warn!("Job {id} cannot start from {:?}", self.state);
            return false;
        }
        *self = LoadJob {
            id,
            state: JobState::Running,
            progress_percent: 0,
            error_message: None,
        };
        true
    }

    /// Record progress; ignored unless running, and never moves backwards.
    pub fn advance(&mut self, percent: u8) {
        if self.state == JobState::Running {
            self.progress_percent = self.progress_percent.max(percent.min(100));
        }
    }

    pub fn complete(&mut self) {
        if self.transition(JobState::Completed) {
            self.progress_percent = 100;
        }
    }

    pub fn cancel(&mut self) {
        self.transition(JobState::Cancelled);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        if self.transition(JobState::Failed) {
            self.error_message = Some(message.into());
        }
    }

    /// Back to `Idle`, ready for the next invocation.
    pub fn reset(&mut self) {
        *self = LoadJob::default();
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    fn transition(&mut self, next: JobState) -> bool {
        if self.state != JobState::Running {
            log::warn!("Job {} ignoring {:?} while {:?}", self.id, next, self.state);
            return false;
        }
        self.state = next;
        true
    }
}
