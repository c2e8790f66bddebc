//! Vector-layer backend in the MapBox style.
//!
//! Points become GeoJSON-like features on a marker layer. Every draw adds a
//! fresh interactive layer, so the provider removes its previous layer first.

use std::rc::Rc;

use geo::Coord;
use log::{debug, warn};
use sheetmap_core::{
    HexColor, LatLngBounds, MapElement, MapOwnership, MapSlot, MarkerId, Point, Provider,
    SharedMap,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Overlays, Viewport};

const DRAW_CENTER: Coord<f64> = Coord { x: -77.0, y: 37.0 };
const DRAW_ZOOM: u8 = 5;

/// Map construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MapBoxOptions {
    /// Tile set identifier for the base layer.
    pub map_id: String,
}

impl Default for MapBoxOptions {
    fn default() -> Self {
        Self {
            map_id: "examples.map-vyofok3q".to_owned(),
        }
    }
}

impl MapBoxOptions {
    /// Apply caller overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &MapBoxOverrides) -> Self {
        if let Some(map_id) = &overrides.map_id {
            self.map_id.clone_from(map_id);
        }
        self
    }
}

/// Caller overrides for [`MapBoxOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MapBoxOverrides {
    /// Tile set identifier.
    pub map_id: Option<String>,
}

/// Point geometry, `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Geometry {
    /// Always `"Point"`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: &'static str,
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
}

impl Geometry {
    /// Geometry at `position`.
    pub const fn point(position: Coord<f64>) -> Self {
        Self {
            kind: "Point",
            coordinates: [position.x, position.y],
        }
    }

    /// Position as `x = longitude`, `y = latitude`.
    pub const fn position(&self) -> Coord<f64> {
        Coord {
            x: self.coordinates[0],
            y: self.coordinates[1],
        }
    }
}

/// Styling and popup properties of a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FeatureProperties {
    /// Marker colour as `#rrggbb` or `#rgb`.
    #[cfg_attr(feature = "serde", serde(rename = "marker-color"))]
    pub marker_color: Option<String>,
    /// Feature title.
    pub title: Option<String>,
    /// Popup HTML.
    pub description: String,
}

/// One marker on a [`MarkerLayer`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Feature {
    /// Location.
    pub geometry: Geometry,
    /// Properties.
    pub properties: FeatureProperties,
}

/// A layer of marker features.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MarkerLayer {
    /// Whether clicking a feature shows its description.
    pub interactive: bool,
    features: Vec<Feature>,
}

impl MarkerLayer {
    /// An empty layer with click interaction enabled.
    pub fn interactive() -> Self {
        Self {
            interactive: true,
            features: Vec::new(),
        }
    }

    /// Add a feature.
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Features in insertion order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Bounds of every feature.
    pub fn extent(&self) -> LatLngBounds {
        self.features
            .iter()
            .map(|feature| feature.geometry.position())
            .collect()
    }
}

/// A map layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "kind", rename_all = "lowercase")
)]
pub enum Layer {
    /// Base tiles.
    Tiles {
        /// Tile set identifier.
        map_id: String,
    },
    /// Marker features.
    Markers(MarkerLayer),
}

/// UI control attached to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Control {
    /// Zoom in/out buttons.
    Zoomer,
    /// Shift-drag zoom box.
    Zoombox,
}

/// Scene model of one vector-layer map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VectorMap {
    element: MapElement,
    layers: Overlays<Layer>,
    controls: Vec<Control>,
    viewport: Viewport,
}

impl VectorMap {
    /// Create a bare map inside `element`.
    pub fn new(element: MapElement) -> Self {
        Self {
            element,
            layers: Overlays::default(),
            controls: Vec::new(),
            viewport: Viewport::new(DRAW_CENTER, DRAW_ZOOM),
        }
    }

    /// Host element.
    pub fn element(&self) -> &MapElement {
        &self.element
    }

    /// Add a layer.
    pub fn add_layer(&mut self, layer: Layer) -> MarkerId {
        self.layers.add(layer)
    }

    /// Remove a layer.
    pub fn remove_layer(&mut self, id: MarkerId) -> bool {
        self.layers.remove(&[id]) == 1
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> &Overlays<Layer> {
        &self.layers
    }

    /// Attach a control.
    pub fn add_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    /// Attached controls.
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Jump to `center` at `zoom`.
    pub fn set_view(&mut self, center: Coord<f64>, zoom: u8) {
        self.viewport.set_view(center, zoom);
    }

    /// Fit the viewport to `extent`.
    pub fn set_extent(&mut self, extent: &LatLngBounds) {
        self.viewport.fit(extent.rect());
    }

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

/// [`Provider`] for the vector-layer backend.
#[derive(Debug)]
pub struct MapBoxProvider {
    map: MapSlot<VectorMap>,
    options: MapBoxOptions,
    marker_layer: Option<MarkerId>,
}

impl MapBoxProvider {
    /// A provider that creates its own map on first initialisation.
    pub fn new(options: MapBoxOptions) -> Self {
        Self::from_parts(None, options)
    }

    /// A provider drawing onto a caller-supplied map.
    pub fn with_map(map: SharedMap<VectorMap>, options: MapBoxOptions) -> Self {
        Self::from_parts(Some(map), options)
    }

    /// A provider adopting `map` when supplied.
    pub fn from_parts(map: Option<SharedMap<VectorMap>>, options: MapBoxOptions) -> Self {
        Self {
            map: MapSlot::from_option(map),
            options,
            marker_layer: None,
        }
    }

    /// The map, once initialised or injected.
    pub fn map(&self) -> Option<&SharedMap<VectorMap>> {
        self.map.get()
    }

    /// Who owns the map.
    pub const fn ownership(&self) -> Option<MapOwnership> {
        self.map.ownership()
    }

    /// Id of the marker layer placed by the last draw.
    pub const fn marker_layer(&self) -> Option<MarkerId> {
        self.marker_layer
    }

    fn feature(point: &Point, position: Coord<f64>) -> Feature {
        let marker_color = point
            .get(sheetmap_core::icon::HEX_COLOR_FIELD)
            .filter(|value| !value.is_blank())
            .and_then(|raw| match HexColor::parse(&raw.to_string()) {
                Ok(color) => Some(format!("#{color}")),
                Err(err) => {
                    warn!("mapbox: {err}; using the layer default colour");
                    None
                }
            });
        Feature {
            geometry: Geometry::point(position),
            properties: FeatureProperties {
                marker_color,
                title: point.title_text(),
                description: point.content(),
            },
        }
    }
}

impl Provider for MapBoxProvider {
    fn backend_name(&self) -> &'static str {
        "mapbox"
    }

    fn initialize(&mut self, element: &MapElement) {
        let options = &self.options;
        self.map.get_or_create(|| {
            debug!("mapbox: creating map in #{element}");
            let mut map = VectorMap::new(element.clone());
            map.add_layer(Layer::Tiles {
                map_id: options.map_id.clone(),
            });
            map.add_control(Control::Zoomer);
            map.add_control(Control::Zoombox);
            map
        });
    }

    fn draw_points(&mut self, points: &[Point]) {
        let Some(shared) = self.map.get().map(Rc::clone) else {
            warn!("mapbox: draw_points called before initialize; nothing drawn");
            return;
        };
        let Ok(mut map) = shared.try_borrow_mut() else {
            warn!("mapbox: map is borrowed elsewhere; nothing drawn");
            return;
        };
        if let Some(previous) = self.marker_layer.take() {
            map.remove_layer(previous);
        }
        let mut layer = MarkerLayer::interactive();
        map.set_view(DRAW_CENTER, DRAW_ZOOM);
        for point in points {
            let Some(position) = point.location() else {
                debug!("mapbox: skipping point without valid coordinates");
                continue;
            };
            layer.add_feature(Self::feature(point, position));
        }
        let extent = layer.extent();
        let drawn = layer.features().len();
        self.marker_layer = Some(map.add_layer(Layer::Markers(layer)));
        map.set_extent(&extent);
        debug!("mapbox: drew {drawn} of {} points", points.len());
    }
}
