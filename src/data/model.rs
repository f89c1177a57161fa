use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

// ---------------------------------------------------------------------------
// Column – one entry of the header catalog
// ---------------------------------------------------------------------------

/// A column of the source file. Names need not be unique; `index` is the
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    /// Zero-based field position in the header line.
    pub index: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.index)
    }
}

// ---------------------------------------------------------------------------
// Point / Axis
// ---------------------------------------------------------------------------

/// A single plotted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Source row number (header is row 0, first data row is row 1).
    pub x: f64,
    /// Parsed cell value.
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which numeric y-axis a series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    #[default]
    Primary,
    Secondary,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Primary => write!(f, "primary"),
            Axis::Secondary => write!(f, "secondary"),
        }
    }
}

// ---------------------------------------------------------------------------
// Series – the sampled values of one column
// ---------------------------------------------------------------------------

/// Points of one selected column, ascending by `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub column: Column,
    pub points: Vec<Point>,
    pub axis: Axis,
}

impl Series {
    pub fn new(column: Column, axis: Axis) -> Self {
        Self {
            column,
            points: Vec::new(),
            axis,
        }
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last `x` (points are sorted).
    pub fn x_range(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.x, self.points.last()?.x))
    }

    /// Smallest and largest `y`, ignoring non-finite values.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        min_max(self.points.iter().map(|p| p.y))
    }
}

pub(crate) fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// ---------------------------------------------------------------------------
// SeriesStore – the published, immutable snapshot
// ---------------------------------------------------------------------------

/// The result of one successful load. Never mutated after construction; a
/// new load builds a new store.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStore {
    series: Vec<Series>,
    total_rows: usize,
    stride: usize,
}

impl SeriesStore {
    pub fn new(series: Vec<Series>, total_rows: usize, stride: usize) -> Self {
        Self {
            series,
            total_rows,
            stride: stride.max(1),
        }
    }

    /// Series in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// First series with the given name.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name() == name)
    }

    pub fn get_by_column(&self, index: usize) -> Option<&Series> {
        self.series.iter().find(|s| s.column.index == index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.series.iter().map(Series::name).collect()
    }

    /// Number of data rows in the source (header excluded).
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total points across all series.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(Series::len).sum()
    }

    /// Extent of `x` over every series.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .filter_map(Series::x_range)
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))
    }

    /// Extent of `y` over the series drawn against `axis`, using `axis_of`
    /// to look up each series' current assignment.
    pub fn y_bounds(&self, axis: Axis, axis_of: impl Fn(&Series) -> Axis) -> Option<(f64, f64)> {
        self.series
            .iter()
            .filter(|s| axis_of(s) == axis)
            .filter_map(Series::y_range)
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))
    }

    /// A copy with each series' axis set by `axis_of`, or `None` when every
    /// series already matches.
    pub fn reassigned(&self, axis_of: impl Fn(&Series) -> Axis) -> Option<SeriesStore> {
        if self.series.iter().all(|s| s.axis == axis_of(s)) {
            return None;
        }
        let series = self
            .series
            .iter()
            .map(|s| Series {
                axis: axis_of(s),
                ..s.clone()
            })
            .collect();
        Some(SeriesStore {
            series,
            total_rows: self.total_rows,
            stride: self.stride,
        })
    }
}

/// The one piece of state shared between the foreground and the loader
/// thread. The inner `Arc` is swapped whole, never edited.
pub type SharedStore = Arc<RwLock<Option<Arc<SeriesStore>>>>;

pub fn shared_store() -> SharedStore {
    Arc::new(RwLock::new(None))
}

/// Clone the currently published snapshot, if any.
pub fn snapshot(store: &SharedStore) -> Option<Arc<SeriesStore>> {
    store.read().clone()
}

/// Replace the published snapshot in one step.
pub fn publish(store: &SharedStore, next: Option<Arc<SeriesStore>>) {
    *store.write() = next;
}
