//! Streaming CSV chart core: header catalog, cancellable downsampling load,
//! immutable series snapshots and nearest-point cursor queries.

pub mod axis;
pub mod config;
pub mod data;
pub mod state;
pub mod viewport;
pub mod worker;

pub use axis::{AxisManager, AxisScales};
pub use config::ChartConfig;
pub use data::error::{DataError, DataResult};
pub use data::model::{Axis, Column, Point, Series, SeriesStore, SharedStore};
pub use state::{ChartEvent, ChartState};
pub use viewport::{Bounds, ViewportState};
pub use worker::{LoadEvent, LoadEventKind, LoadWorker};
