//! Cursor queries: which point of each series sits under a given `x`.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use super::model::{Point, SeriesStore};

/// Closest point to `x0` with `|x - x0| < threshold`.
///
/// `points` must be sorted ascending by `x`. Runs a binary search and then
/// looks only at the two neighbours of the insertion position. When both are
/// equally close the earlier one wins.
pub fn nearest_point(points: &[Point], x0: f64, threshold: f64) -> Option<Point> {
    if x0.is_nan() || threshold.is_nan() || threshold <= 0.0 {
        return None;
    }

    let idx = points.partition_point(|p| p.x < x0);
    let before = idx.checked_sub(1).and_then(|i| points.get(i));
    let after = points.get(idx);

    let best = match (before, after) {
        (Some(b), Some(a)) => {
            if (x0 - b.x).abs() <= (a.x - x0).abs() {
                b
            } else {
                a
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    ((best.x - x0).abs() < threshold).then_some(*best)
}

/// Nearest point of every series, in series order.
pub fn nearest_points(store: &SeriesStore, x0: f64, threshold: f64) -> Vec<(String, Option<Point>)> {
    store
        .iter()
        .map(|s| (s.name().to_string(), nearest_point(&s.points, x0, threshold)))
        .collect()
}

/// Query radius for a visible x range.
pub fn threshold_for(x_min: f64, x_max: f64, divisor: f64) -> f64 {
    (x_max - x_min) / divisor
}

/// One `name: value` line per series that has a hit.
pub fn format_readout(results: &[(String, Option<Point>)]) -> String {
    let mut out = String::new();
    for (name, point) in results {
        if let Some(p) = point {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "{name}: {:.2}", p.y);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Lets through at most one event per `interval`; the rest are dropped.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether an event arriving at `now` should be evaluated.
    pub fn ready(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
