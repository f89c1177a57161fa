use crate::data::model::{Axis, SeriesStore};

/// Padding, in rows, around a fit extent that is a single x value.
const FIT_PADDING: f64 = 1.0;

/// A closed numeric interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Builds bounds with `min <= max` regardless of argument order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((a, b): (f64, f64)) -> Self {
        Bounds::new(a, b)
    }
}

/// Pan/zoom bounds per axis. `None` means "fit all data".
///
/// Gestures live outside the core and only write through the setters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
    pub x: Option<Bounds>,
    pub y_primary: Option<Bounds>,
    pub y_secondary: Option<Bounds>,
}

impl ViewportState {
    /// Back to fitting all data on every axis.
    pub fn reset(&mut self) {
        *self = ViewportState::default();
    }

    pub fn is_fit(&self) -> bool {
        self.x.is_none() && self.y_primary.is_none() && self.y_secondary.is_none()
    }

    pub fn set_x(&mut self, bounds: Option<Bounds>) {
        self.x = bounds;
    }

    pub fn set_y(&mut self, axis: Axis, bounds: Option<Bounds>) {
        match axis {
            Axis::Primary => self.y_primary = bounds,
            Axis::Secondary => self.y_secondary = bounds,
        }
    }

    /// The x range on screen: the zoomed range, or the data extent when fit.
    /// A fit extent of zero width is widened by one row on each side.
    pub fn visible_x(&self, store: Option<&SeriesStore>) -> Option<Bounds> {
        self.x.or_else(|| {
            let (min, max) = store?.x_bounds()?;
            if max > min {
                Some(Bounds::new(min, max))
            } else {
                Some(Bounds::new(min - FIT_PADDING, max + FIT_PADDING))
            }
        })
    }
}
