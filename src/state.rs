use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::axis::{AxisManager, AxisScales};
use crate::config::ChartConfig;
use crate::data::error::{DataError, DataResult};
use crate::data::header::read_header;
use crate::data::loader::{LoadJob, LoadRequest};
use crate::data::model::{publish, shared_store, snapshot, Axis, Column, Point, SeriesStore, SharedStore};
use crate::data::nearest::{nearest_points, Debouncer};
use crate::data::selection::ColumnSelection;
use crate::viewport::ViewportState;
use crate::worker::{LoadEvent, LoadEventKind, LoadWorker};

/// File extensions accepted for drag-and-drop / open.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "logfile"];

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`] (case insensitive).
pub fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Events handed to whoever renders the chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ChartEvent {
    HeaderLoaded(Vec<Column>),
    LoadProgress(u8),
    LoadCompleted(Arc<SeriesStore>),
    LoadCancelled,
    LoadFailed(String),
    /// Nearest point per series, in series order.
    NearestPointResult(Vec<(String, Option<Point>)>),
}

// ---------------------------------------------------------------------------
// Chart state (the foreground lane)
// ---------------------------------------------------------------------------

/// Everything the interactive side owns, independent of rendering. Only the
/// published [`SeriesStore`] is shared with the loader thread.
pub struct ChartState {
    config: ChartConfig,

    /// Source file of the current catalog.
    path: Option<PathBuf>,

    /// Column catalog from the last successful header read.
    pub columns: Vec<Column>,

    /// Columns the next load will read.
    pub selection: ColumnSelection,

    store: SharedStore,
    worker: LoadWorker,

    /// Lifecycle of the current (or last) load.
    job: LoadJob,

    axes: AxisManager,
    scales: AxisScales,
    pub viewport: ViewportState,
    debounce: Debouncer,
}

impl Default for ChartState {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

impl ChartState {
    pub fn new(config: ChartConfig) -> Self {
        let store = shared_store();
        Self {
            debounce: Debouncer::new(config.debounce_interval()),
            config,
            path: None,
            columns: Vec::new(),
            selection: ColumnSelection::default(),
            worker: LoadWorker::new(Arc::clone(&store)),
            store,
            job: LoadJob::default(),
            axes: AxisManager::default(),
            scales: AxisScales::default(),
            viewport: ViewportState::default(),
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the header of `path` and make it the current catalog. On error
    /// the previous catalog is kept.
    ///
    /// Selection and axis assignments are keyed by column index, so both
    /// start over with the new catalog.
    pub fn open(&mut self, path: &Path) -> DataResult<ChartEvent> {
        let columns = read_header(path)?;
        self.path = Some(path.to_path_buf());
        self.columns = columns.clone();
        self.selection = ColumnSelection::default();
        if !self.axes.assignments().is_empty() {
            self.axes.reset();
            self.axes_changed();
        }
        Ok(ChartEvent::HeaderLoaded(columns))
    }

    /// Kick off a background load of the selected columns.
    pub fn start_load(&mut self) -> DataResult<u64> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| DataError::Format("no file opened".to_string()))?;
        let columns = self.selection.selected_columns(&self.columns);
        if columns.is_empty() {
            return Err(DataError::NoSelection);
        }

        let request = LoadRequest::new(path, columns)
            .with_max_points(self.config.max_points)
            .with_axes(self.axes.assignments());

        // A new job replaces whatever was in flight.
        if self.job.is_running() {
            self.job.cancel();
        }
        let id = self.worker.start(request)?;
        self.job.reset();
        self.job.start(id);
        Ok(id)
    }

    /// Request cancellation of the running load, if any.
    pub fn cancel_load(&self) {
        self.worker.cancel();
    }

    pub fn job(&self) -> &LoadJob {
        &self.job
    }

    /// Drain loader events and translate them for the consumer.
    pub fn poll(&mut self) -> Vec<ChartEvent> {
        let events = self.worker.try_recv_all();
        self.translate(events)
    }

    /// Block until the running load ends; returns its events.
    pub fn wait(&mut self) -> Vec<ChartEvent> {
        let events = self.worker.wait();
        self.translate(events)
    }

    fn translate(&mut self, events: Vec<LoadEvent>) -> Vec<ChartEvent> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            // Events of superseded jobs are still forwarded, but they do not
            // drive the current job's state.
            let current = event.job == self.job.id;
            match event.kind {
                LoadEventKind::Progress(pct) => {
                    if current {
                        self.job.advance(pct);
                    }
                    out.push(ChartEvent::LoadProgress(pct));
                }
                LoadEventKind::Completed(mut store) => {
                    if current {
                        self.job.complete();
                        self.viewport.reset();
                        // Assignments made while the job ran.
                        if let Some(synced) = self.sync_store_axes() {
                            store = synced;
                        }
                        self.scales = self.axes.recompute_scales(Some(&store));
                    }
                    out.push(ChartEvent::LoadCompleted(store));
                }
                LoadEventKind::Cancelled => {
                    if current {
                        self.job.cancel();
                    }
                    out.push(ChartEvent::LoadCancelled);
                }
                LoadEventKind::Failed(message) => {
                    if current {
                        self.job.fail(message.clone());
                    }
                    out.push(ChartEvent::LoadFailed(message));
                }
            }
        }
        out
    }

    /// The published snapshot, if a load has completed.
    pub fn store(&self) -> Option<Arc<SeriesStore>> {
        snapshot(&self.store)
    }

    /// Handle to the shared slot, for renderers on other threads.
    pub fn shared_store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    // ---- Cursor queries ----

    /// Nearest point per series to `x0`, using the current viewport for
    /// the threshold. `None` when nothing is loaded; a store without points
    /// gives a miss for every series.
    pub fn nearest_at(&self, x0: f64) -> Option<Vec<(String, Option<Point>)>> {
        let store = self.store()?;
        let threshold = self
            .viewport
            .visible_x(Some(&store))
            .map_or(0.0, |visible| self.config.threshold_for(visible.min, visible.max));
        Some(nearest_points(&store, x0, threshold))
    }

    /// Debounced pointer-move handler.
    pub fn pointer_moved(&mut self, x0: f64, now: Instant) -> Option<ChartEvent> {
        if !self.debounce.ready(now) {
            return None;
        }
        self.nearest_at(x0).map(ChartEvent::NearestPointResult)
    }

    // ---- Axes and viewport ----

    /// Move a series to an axis. Scales are rebuilt once per actual change,
    /// and the published snapshot is replaced by one carrying the new axis.
    pub fn assign_axis(&mut self, column: usize, axis: Axis) -> bool {
        if !self.axes.assign(column, axis) {
            return false;
        }
        self.axes_changed();
        true
    }

    fn axes_changed(&mut self) {
        let store = self.sync_store_axes().or_else(|| self.store());
        self.scales = self.axes.recompute_scales(store.as_deref());
    }

    /// Publish a copy of the snapshot whose series axes match the manager.
    /// Returns the new snapshot, or `None` if nothing had to change.
    fn sync_store_axes(&self) -> Option<Arc<SeriesStore>> {
        let current = self.store()?;
        let next = Arc::new(current.reassigned(|s| self.axes.axis_of(s.column.index))?);
        publish(&self.store, Some(Arc::clone(&next)));
        Some(next)
    }

    pub fn axes(&self) -> &AxisManager {
        &self.axes
    }

    pub fn scales(&self) -> AxisScales {
        self.scales
    }

    pub fn reset_viewport(&mut self) {
        log::debug!("Viewport reset to fit");
        self.viewport.reset();
    }

    /// Stop any load, deselect everything and drop the published data.
    ///
    /// Returns the events of the stopped job, so its final state is still
    /// reported once.
    pub fn clear(&mut self) -> Vec<ChartEvent> {
        self.worker.stop();
        let mut events = self.poll();
        if self.job.is_running() {
            // The thread ended without a final event.
            self.job.cancel();
            events.push(ChartEvent::LoadCancelled);
        }
        publish(&self.store, None);
        self.selection.select_none();
        self.axes.reset();
        self.scales = self.axes.recompute_scales(None);
        self.viewport.reset();
        self.debounce.reset();
        self.job.reset();
        log::info!("Chart cleared");
        events
    }
}
