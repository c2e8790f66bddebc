//! Building blocks shared by the backend scene models.

use geo::{Coord, Rect};
use sheetmap_core::MarkerId;

#[cfg(feature = "serde")]
use serde::Serialize;

/// An overlay placed on a map together with its identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Placed<T> {
    /// Identity assigned by the map.
    pub id: MarkerId,
    /// The overlay itself.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub item: T,
}

/// Ordered overlays on one map, with ids allocated by the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct Overlays<T> {
    placed: Vec<Placed<T>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    next_id: u64,
}

impl<T> Default for Overlays<T> {
    fn default() -> Self {
        Self {
            placed: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Overlays<T> {
    /// Place `item` and return its new id.
    pub fn add(&mut self, item: T) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.placed.push(Placed { id, item });
        id
    }

    /// Remove the overlays listed in `ids`, returning how many were found.
    pub fn remove(&mut self, ids: &[MarkerId]) -> usize {
        let before = self.placed.len();
        self.placed.retain(|placed| !ids.contains(&placed.id));
        before - self.placed.len()
    }

    /// Look up an overlay.
    pub fn get(&self, id: MarkerId) -> Option<&T> {
        self.placed
            .iter()
            .find(|placed| placed.id == id)
            .map(|placed| &placed.item)
    }

    /// Iterate in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Placed<T>> {
        self.placed.iter()
    }

    /// Number of overlays.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Return `true` when nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}

/// The visible region of a map.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Viewport {
    /// Centre as `x = longitude`, `y = latitude`.
    pub center: Coord<f64>,
    /// Zoom level.
    pub zoom: u8,
    /// Rectangle most recently fitted, if any.
    pub fitted: Option<Rect<f64>>,
    /// Number of fit requests received.
    pub fit_count: u32,
}

impl Viewport {
    /// A viewport looking at `center` from `zoom`.
    pub const fn new(center: Coord<f64>, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            fitted: None,
            fit_count: 0,
        }
    }

    /// Move to an explicit centre and zoom.
    pub fn set_view(&mut self, center: Coord<f64>, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    /// Fit the view to `rect`; an empty extent keeps the current view.
    pub fn fit(&mut self, rect: Option<Rect<f64>>) {
        self.fit_count += 1;
        if let Some(rect) = rect {
            self.center = rect.center();
            self.fitted = Some(rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ids_are_unique_across_removals() {
        let mut overlays = Overlays::default();
        let first = overlays.add("a");
        let second = overlays.add("b");
        assert_eq!(overlays.remove(&[first]), 1);
        let third = overlays.add("c");
        assert_ne!(second, third);
        assert_eq!(overlays.get(second), Some(&"b"));
        assert_eq!(overlays.get(first), None);
        assert_eq!(overlays.len(), 2);
    }

    #[rstest]
    fn empty_fit_counts_but_keeps_view() {
        let origin = Coord { x: 1.0, y: 2.0 };
        let mut viewport = Viewport::new(origin, 4);
        viewport.fit(None);
        assert_eq!(viewport.fit_count, 1);
        assert_eq!(viewport.center, origin);
        assert_eq!(viewport.fitted, None);
    }

    #[rstest]
    fn fit_recentres_on_rect() {
        let mut viewport = Viewport::new(Coord { x: 0.0, y: 0.0 }, 4);
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 4.0 });
        viewport.fit(Some(rect));
        assert_eq!(viewport.center, Coord { x: 1.0, y: 2.0 });
        assert_eq!(viewport.fitted, Some(rect));
    }
}
