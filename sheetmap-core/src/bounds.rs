//! Viewport-bounds accumulation.

use geo::{Coord, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Running bounding box of drawn marker positions.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sheetmap_core::LatLngBounds;
///
/// let mut bounds = LatLngBounds::new();
/// bounds.extend(Coord { x: -0.1, y: 51.5 });
/// bounds.extend(Coord { x: 2.35, y: 48.85 });
/// let rect = bounds.rect().expect("two points");
/// assert_eq!(rect.min(), Coord { x: -0.1, y: 48.85 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatLngBounds {
    rect: Option<Rect<f64>>,
}

impl LatLngBounds {
    /// An empty accumulator.
    pub const fn new() -> Self {
        Self { rect: None }
    }

    /// Grow the bounds to include `position`.
    pub fn extend(&mut self, position: Coord<f64>) {
        self.include(Rect::new(position, position));
    }

    /// Grow the bounds to include another rectangle.
    pub fn include(&mut self, other: Rect<f64>) {
        match &mut self.rect {
            Some(existing) => {
                let min = Coord {
                    x: existing.min().x.min(other.min().x),
                    y: existing.min().y.min(other.min().y),
                };
                let max = Coord {
                    x: existing.max().x.max(other.max().x),
                    y: existing.max().y.max(other.max().y),
                };
                *existing = Rect::new(min, max);
            }
            None => self.rect = Some(other),
        }
    }

    /// Forget every accumulated position.
    pub fn reset(&mut self) {
        self.rect = None;
    }

    /// Return `true` when nothing has been accumulated.
    pub const fn is_empty(&self) -> bool {
        self.rect.is_none()
    }

    /// The accumulated rectangle, if any.
    pub const fn rect(&self) -> Option<Rect<f64>> {
        self.rect
    }

    /// Centre of the accumulated rectangle, if any.
    pub fn center(&self) -> Option<Coord<f64>> {
        self.rect.map(|rect| rect.center())
    }
}

impl FromIterator<Coord<f64>> for LatLngBounds {
    fn from_iter<T: IntoIterator<Item = Coord<f64>>>(iter: T) -> Self {
        let mut bounds = Self::new();
        for position in iter {
            bounds.extend(position);
        }
        bounds
    }
}
