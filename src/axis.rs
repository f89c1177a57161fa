use std::collections::BTreeMap;

use crate::data::model::{Axis, Series, SeriesStore};

// ---------------------------------------------------------------------------
// Axis assignment
// ---------------------------------------------------------------------------

/// Y ranges for the two numeric axes. `secondary` is `None` while no series
/// uses it, which is the signal to keep that axis hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisScales {
    pub primary: Option<(f64, f64)>,
    pub secondary: Option<(f64, f64)>,
}

/// Per-series axis assignment, keyed by column index.
#[derive(Debug, Clone, Default)]
pub struct AxisManager {
    assignments: BTreeMap<usize, Axis>,
    recomputes: u64,
}

impl AxisManager {
    /// Assign a series to an axis. Returns `true` if this changed anything.
    pub fn assign(&mut self, column: usize, axis: Axis) -> bool {
        if self.axis_of(column) == axis {
            return false;
        }
        match axis {
            Axis::Primary => self.assignments.remove(&column),
            Axis::Secondary => self.assignments.insert(column, axis),
        };
        log::debug!("Series #{column} moved to the {axis} axis");
        true
    }

    pub fn axis_of(&self, column: usize) -> Axis {
        self.assignments.get(&column).copied().unwrap_or_default()
    }

    pub fn secondary_in_use(&self) -> bool {
        self.assignments.values().any(|a| *a == Axis::Secondary)
    }

    /// Current non-default assignments, copied into the next load.
    pub fn assignments(&self) -> BTreeMap<usize, Axis> {
        self.assignments.clone()
    }

    pub fn reset(&mut self) {
        self.assignments.clear();
    }

    /// Rebuild axis ranges from a snapshot.
    pub fn recompute_scales(&mut self, store: Option<&SeriesStore>) -> AxisScales {
        self.recomputes += 1;
        let Some(store) = store else {
            return AxisScales::default();
        };
        let axis_of = |s: &Series| self.axis_of(s.column.index);
        AxisScales {
            primary: store.y_bounds(Axis::Primary, axis_of),
            secondary: if self.secondary_in_use() {
                store.y_bounds(Axis::Secondary, axis_of)
            } else {
                None
            },
        }
    }

    /// How many times scales have been rebuilt.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
