//! Single integration-test binary.
//!
//! Structure:
//! - helpers: scratch CSV builders
//! - scenarios: end-to-end load and query scenarios
//! - properties: randomized and exhaustive checks of the core invariants
//! - lanes: foreground/background interaction through `ChartState`

mod helpers;
mod lanes;
mod properties;
