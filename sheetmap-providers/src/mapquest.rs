//! Tile-service backend in the MapQuest style.
//!
//! Markers are points of interest with a rollover title and an info window.
//! The viewport is fitted with the service's best-fit call rather than a
//! bounds object.

use std::rc::Rc;

use geo::Coord;
use log::{debug, warn};
use sheetmap_core::{
    LatLngBounds, MapElement, MapOwnership, MapSlot, MarkerId, Point, Provider, SharedMap,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Overlays, Viewport};

/// Map construction options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MapQuestOptions {
    /// Tile set.
    pub map_type_id: String,
    /// Initial zoom.
    pub zoom: u8,
    /// Pixel margin kept around best-fit extents.
    pub best_fit_margin: u32,
    /// Whether double clicks zoom in.
    pub zoom_on_double_click: bool,
    /// Initial centre as `x = longitude`, `y = latitude`.
    pub center: Coord<f64>,
}

impl Default for MapQuestOptions {
    fn default() -> Self {
        Self {
            map_type_id: "osm".to_owned(),
            zoom: 13,
            best_fit_margin: 0,
            zoom_on_double_click: true,
            center: Coord {
                x: -73.984_655,
                y: 40.735_383,
            },
        }
    }
}

impl MapQuestOptions {
    /// Apply caller overrides; every `Some` value replaces the default.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &MapQuestOverrides) -> Self {
        if let Some(map_type_id) = &overrides.map_type_id {
            self.map_type_id.clone_from(map_type_id);
        }
        if let Some(zoom) = overrides.zoom {
            self.zoom = zoom;
        }
        if let Some(margin) = overrides.best_fit_margin {
            self.best_fit_margin = margin;
        }
        if let Some(enabled) = overrides.zoom_on_double_click {
            self.zoom_on_double_click = enabled;
        }
        if let Some(center) = overrides.center {
            self.center = center;
        }
        self
    }
}

/// Caller overrides for [`MapQuestOptions`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MapQuestOverrides {
    /// Tile set.
    pub map_type_id: Option<String>,
    /// Initial zoom.
    pub zoom: Option<u8>,
    /// Best-fit margin in pixels.
    pub best_fit_margin: Option<u32>,
    /// Double-click zoom.
    pub zoom_on_double_click: Option<bool>,
    /// Initial centre.
    pub center: Option<Coord<f64>>,
}

/// A point of interest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Poi {
    /// Position as `x = longitude`, `y = latitude`.
    pub position: Coord<f64>,
    /// Text shown on hover.
    pub rollover: Option<String>,
    /// HTML shown when the POI is clicked.
    pub info_html: String,
}

/// Scene model of one tile-service map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TileMap {
    element: MapElement,
    options: MapQuestOptions,
    shapes: Overlays<Poi>,
    viewport: Viewport,
}

impl TileMap {
    /// Create a map inside `element`.
    pub fn new(element: MapElement, options: MapQuestOptions) -> Self {
        let viewport = Viewport::new(options.center, options.zoom);
        Self {
            element,
            options,
            shapes: Overlays::default(),
            viewport,
        }
    }

    /// Host element.
    pub fn element(&self) -> &MapElement {
        &self.element
    }

    /// Construction options.
    pub fn options(&self) -> &MapQuestOptions {
        &self.options
    }

    /// Shapes on the map.
    pub fn shapes(&self) -> &Overlays<Poi> {
        &self.shapes
    }

    /// Add a shape.
    pub fn add_shape(&mut self, poi: Poi) -> MarkerId {
        self.shapes.add(poi)
    }

    /// Remove shapes by id.
    pub fn remove_shapes(&mut self, ids: &[MarkerId]) -> usize {
        self.shapes.remove(ids)
    }

    /// Zoom to show every listed shape.
    pub fn best_fit(&mut self, ids: &[MarkerId]) {
        let extent: LatLngBounds = ids
            .iter()
            .filter_map(|id| self.shapes.get(*id))
            .map(|poi| poi.position)
            .collect();
        self.viewport.fit(extent.rect());
    }

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

/// [`Provider`] for the tile-service backend.
#[derive(Debug)]
pub struct MapQuestProvider {
    map: MapSlot<TileMap>,
    options: MapQuestOptions,
    drawn: Vec<MarkerId>,
}

impl MapQuestProvider {
    /// A provider that creates its own map on first initialisation.
    pub fn new(options: MapQuestOptions) -> Self {
        Self::from_parts(None, options)
    }

    /// A provider drawing onto a caller-supplied map.
    pub fn with_map(map: SharedMap<TileMap>, options: MapQuestOptions) -> Self {
        Self::from_parts(Some(map), options)
    }

    /// A provider adopting `map` when supplied.
    pub fn from_parts(map: Option<SharedMap<TileMap>>, options: MapQuestOptions) -> Self {
        Self {
            map: MapSlot::from_option(map),
            options,
            drawn: Vec::new(),
        }
    }

    /// The map, once initialised or injected.
    pub fn map(&self) -> Option<&SharedMap<TileMap>> {
        self.map.get()
    }

    /// Who owns the map.
    pub const fn ownership(&self) -> Option<MapOwnership> {
        self.map.ownership()
    }
}

impl Provider for MapQuestProvider {
    fn backend_name(&self) -> &'static str {
        "mapquest"
    }

    fn initialize(&mut self, element: &MapElement) {
        let options = &self.options;
        self.map.get_or_create(|| {
            debug!("mapquest: creating map in #{element}");
            TileMap::new(element.clone(), options.clone())
        });
    }

    fn draw_points(&mut self, points: &[Point]) {
        let Some(shared) = self.map.get().map(Rc::clone) else {
            warn!("mapquest: draw_points called before initialize; nothing drawn");
            return;
        };
        let Ok(mut map) = shared.try_borrow_mut() else {
            warn!("mapquest: map is borrowed elsewhere; nothing drawn");
            return;
        };
        map.remove_shapes(&self.drawn);
        self.drawn.clear();
        for point in points {
            let Some(position) = point.location() else {
                debug!("mapquest: skipping point without valid coordinates");
                continue;
            };
            let id = map.add_shape(Poi {
                position,
                rollover: point.title_text(),
                info_html: point.content(),
            });
            self.drawn.push(id);
        }
        map.best_fit(&self.drawn);
        debug!(
            "mapquest: drew {} of {} points",
            self.drawn.len(),
            points.len()
        );
    }
}
