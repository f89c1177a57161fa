/// Data layer: core types, loading, sampling and cursor queries.
///
/// Architecture:
/// ```text
///   file.csv
///      │
///      ├──────────────┐
///      ▼              ▼
///   ┌────────┐   ┌──────────┐
///   │ header │   │  loader  │  count rows → stride → parse sampled rows
///   └────────┘   └──────────┘
///      │              │ uses downsample
///      ▼              ▼
///   Vec<Column>   ┌─────────────┐
///   + selection   │ SeriesStore │  immutable, swapped in whole
///                 └─────────────┘
///                     │
///                     ▼
///                 ┌─────────┐
///                 │ nearest │  binary search per series
///                 └─────────┘
/// ```

pub mod downsample;
pub mod error;
pub mod header;
pub mod loader;
pub mod model;
pub mod nearest;
pub mod selection;
