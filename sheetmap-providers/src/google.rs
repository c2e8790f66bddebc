//! Google-style backend.
//!
//! Markers are pins coloured through the chart image service unless a custom
//! icon applies. The backend allows a single info window on the page, so the
//! provider owns one shared [`InfoWindow`] and re-targets it whenever a marker
//! is activated.

use std::rc::Rc;

use geo::Coord;
use log::{debug, warn};
use sheetmap_core::{
    HexColor, IconChoice, LatLngBounds, MapElement, MapOwnership, MapSlot, MarkerId, Point,
    Provider, SharedMap, resolve_icon,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Overlays, Viewport};

/// Chart-service URL prefix for coloured pins; the colour is appended.
pub const PIN_IMAGE_BASE: &str = "http://chart.apis.google.com/chart?chst=d_map_pin_letter&chld=|";

/// Chart-service URL of the pin shadow.
pub const PIN_SHADOW_URL: &str = "http://chart.apis.google.com/chart?chst=d_map_pin_shadow";

const INFO_WINDOW_PLACEHOLDER: &str = "loading...";
const INFO_WINDOW_MAX_WIDTH: u32 = 300;

/// Base map imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MapTypeId {
    /// Street map.
    #[default]
    Roadmap,
    /// Satellite imagery.
    Satellite,
    /// Satellite imagery with labels.
    Hybrid,
    /// Terrain relief.
    Terrain,
}

/// Map construction options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GoogleMapOptions {
    /// Base imagery.
    pub map_type_id: MapTypeId,
    /// Initial zoom before any fit.
    pub zoom: u8,
    /// Initial centre before any fit.
    pub center: Coord<f64>,
}

impl Default for GoogleMapOptions {
    fn default() -> Self {
        Self {
            map_type_id: MapTypeId::Roadmap,
            zoom: 2,
            center: Coord { x: 0.0, y: 0.0 },
        }
    }
}

impl GoogleMapOptions {
    /// Apply caller overrides; every `Some` value replaces the default.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &GoogleMapOverrides) -> Self {
        if let Some(map_type_id) = overrides.map_type_id {
            self.map_type_id = map_type_id;
        }
        if let Some(zoom) = overrides.zoom {
            self.zoom = zoom;
        }
        if let Some(center) = overrides.center {
            self.center = center;
        }
        self
    }
}

/// Caller overrides for [`GoogleMapOptions`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct GoogleMapOverrides {
    /// Base imagery.
    pub map_type_id: Option<MapTypeId>,
    /// Initial zoom.
    pub zoom: Option<u8>,
    /// Initial centre.
    pub center: Option<Coord<f64>>,
}

/// A sprite-based marker image.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MarkerImage {
    /// Image URL.
    pub url: String,
    /// Displayed size in pixels.
    pub size: [u32; 2],
    /// Sprite origin in pixels.
    pub origin: [u32; 2],
    /// Anchor point in pixels.
    pub anchor: [u32; 2],
}

impl MarkerImage {
    /// Coloured pin for `color`.
    pub fn pin(color: &HexColor) -> Self {
        Self {
            url: format!("{PIN_IMAGE_BASE}{color}"),
            size: [21, 34],
            origin: [0, 0],
            anchor: [10, 34],
        }
    }

    /// Shadow drawn under coloured pins.
    pub fn pin_shadow() -> Self {
        Self {
            url: PIN_SHADOW_URL.to_owned(),
            size: [40, 37],
            origin: [0, 0],
            anchor: [12, 35],
        }
    }
}

/// Icon of a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "kind", rename_all = "lowercase")
)]
pub enum GoogleIcon {
    /// Plain image URL.
    Url {
        /// Image URL.
        url: String,
    },
    /// Sprite image.
    Image(MarkerImage),
}

/// A marker placed on a [`GoogleMap`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GoogleMarker {
    /// Position as `x = longitude`, `y = latitude`.
    pub position: Coord<f64>,
    /// Hover title.
    pub title: Option<String>,
    /// Marker icon.
    pub icon: GoogleIcon,
    /// Shadow image for coloured pins.
    pub shadow: Option<MarkerImage>,
}

/// Scene model of one Google-style map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GoogleMap {
    element: MapElement,
    options: GoogleMapOptions,
    markers: Overlays<GoogleMarker>,
    viewport: Viewport,
}

impl GoogleMap {
    /// Create a map inside `element`.
    pub fn new(element: MapElement, options: GoogleMapOptions) -> Self {
        let viewport = Viewport::new(options.center, options.zoom);
        Self {
            element,
            options,
            markers: Overlays::default(),
            viewport,
        }
    }

    /// Host element.
    pub fn element(&self) -> &MapElement {
        &self.element
    }

    /// Construction options.
    pub fn options(&self) -> &GoogleMapOptions {
        &self.options
    }

    /// Markers on the map.
    pub fn markers(&self) -> &Overlays<GoogleMarker> {
        &self.markers
    }

    /// Place a marker.
    pub fn add_marker(&mut self, marker: GoogleMarker) -> MarkerId {
        self.markers.add(marker)
    }

    /// Remove markers by id.
    pub fn remove_markers(&mut self, ids: &[MarkerId]) -> usize {
        self.markers.remove(ids)
    }

    /// Fit the viewport to `bounds`.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        self.viewport.fit(bounds.rect());
    }

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

/// The page-wide popup surface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct InfoWindow {
    content: String,
    max_width: u32,
    anchor: Option<MarkerId>,
    open: bool,
}

impl Default for InfoWindow {
    fn default() -> Self {
        Self {
            content: INFO_WINDOW_PLACEHOLDER.to_owned(),
            max_width: INFO_WINDOW_MAX_WIDTH,
            anchor: None,
            open: false,
        }
    }
}

impl InfoWindow {
    /// Return `true` when the window is open and anchored to `marker`.
    pub fn is_open_on(&self, marker: MarkerId) -> bool {
        self.open && self.anchor == Some(marker)
    }

    /// Anchor the window to `marker` with new content and open it.
    pub fn open(&mut self, marker: MarkerId, content: String) {
        self.content = content;
        self.anchor = Some(marker);
        self.open = true;
    }

    /// Close the window, keeping its last content.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Whether the window is showing.
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Marker the window was last anchored to.
    pub const fn anchor(&self) -> Option<MarkerId> {
        self.anchor
    }

    /// Maximum width in pixels.
    pub const fn max_width(&self) -> u32 {
        self.max_width
    }
}

/// Result of [`GoogleMapsProvider::activate_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The info window now shows this marker's content.
    Opened,
    /// The info window was already open on this marker; nothing changed.
    AlreadyOpen,
    /// The marker was not drawn by this provider.
    UnknownMarker,
}

/// [`Provider`] for the Google-style backend.
#[derive(Debug)]
pub struct GoogleMapsProvider {
    map: MapSlot<GoogleMap>,
    options: GoogleMapOptions,
    bounds: LatLngBounds,
    info_window: InfoWindow,
    drawn: Vec<(MarkerId, Point)>,
}

impl GoogleMapsProvider {
    /// A provider that creates its own map on first initialisation.
    pub fn new(options: GoogleMapOptions) -> Self {
        Self::from_parts(None, options)
    }

    /// A provider drawing onto a caller-supplied map.
    pub fn with_map(map: SharedMap<GoogleMap>, options: GoogleMapOptions) -> Self {
        Self::from_parts(Some(map), options)
    }

    /// A provider adopting `map` when supplied.
    pub fn from_parts(map: Option<SharedMap<GoogleMap>>, options: GoogleMapOptions) -> Self {
        Self {
            map: MapSlot::from_option(map),
            options,
            bounds: LatLngBounds::new(),
            info_window: InfoWindow::default(),
            drawn: Vec::new(),
        }
    }

    /// The map, once initialised or injected.
    pub fn map(&self) -> Option<&SharedMap<GoogleMap>> {
        self.map.get()
    }

    /// Who owns the map.
    pub const fn ownership(&self) -> Option<MapOwnership> {
        self.map.ownership()
    }

    /// Bounds accumulated by the last draw.
    pub const fn bounds(&self) -> &LatLngBounds {
        &self.bounds
    }

    /// The shared info window.
    pub const fn info_window(&self) -> &InfoWindow {
        &self.info_window
    }

    /// Ids of the markers placed by the last draw, in input order.
    pub fn drawn_markers(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.drawn.iter().map(|(id, _)| *id)
    }

    /// Handle a click on `marker` by re-targeting the shared info window.
    ///
    /// Content is only regenerated when the window is not already open on
    /// the same marker.
    pub fn activate_marker(&mut self, marker: MarkerId) -> Activation {
        if self.info_window.is_open_on(marker) {
            return Activation::AlreadyOpen;
        }
        let Some((_, point)) = self.drawn.iter().find(|(id, _)| *id == marker) else {
            return Activation::UnknownMarker;
        };
        self.info_window.open(marker, point.content());
        debug!("google: info window anchored to {marker}");
        Activation::Opened
    }

    /// Close the shared info window.
    pub fn close_info_window(&mut self) {
        self.info_window.close();
    }

    fn marker_icon(point: &Point) -> (GoogleIcon, Option<MarkerImage>) {
        match resolve_icon(point) {
            IconChoice::RowUrl(url) | IconChoice::ConfiguredUrl(url) => {
                (GoogleIcon::Url { url }, None)
            }
            IconChoice::Default { color } => {
                let color = HexColor::or_default(color.as_deref()).unwrap_or_else(|err| {
                    warn!("google: {err}; using the default pin colour");
                    HexColor::fallback()
                });
                (
                    GoogleIcon::Image(MarkerImage::pin(&color)),
                    Some(MarkerImage::pin_shadow()),
                )
            }
        }
    }
}

impl Provider for GoogleMapsProvider {
    fn backend_name(&self) -> &'static str {
        "google"
    }

    fn initialize(&mut self, element: &MapElement) {
        let options = &self.options;
        self.map.get_or_create(|| {
            debug!("google: creating map in #{element}");
            GoogleMap::new(element.clone(), options.clone())
        });
        self.bounds.reset();
        self.info_window = InfoWindow::default();
    }

    fn draw_points(&mut self, points: &[Point]) {
        let Some(shared) = self.map.get().map(Rc::clone) else {
            warn!("google: draw_points called before initialize; nothing drawn");
            return;
        };
        let Ok(mut map) = shared.try_borrow_mut() else {
            warn!("google: map is borrowed elsewhere; nothing drawn");
            return;
        };
        let previous: Vec<MarkerId> = self.drawn.drain(..).map(|(id, _)| id).collect();
        map.remove_markers(&previous);
        if self
            .info_window
            .anchor()
            .is_some_and(|anchor| previous.contains(&anchor))
        {
            self.info_window.close();
        }
        self.bounds.reset();
        for point in points {
            let Some(position) = point.location() else {
                debug!("google: skipping point without valid coordinates");
                continue;
            };
            let (icon, shadow) = Self::marker_icon(point);
            let id = map.add_marker(GoogleMarker {
                position,
                title: point.title_text(),
                icon,
                shadow,
            });
            self.bounds.extend(position);
            self.drawn.push((id, point.clone()));
        }
        map.fit_bounds(&self.bounds);
        debug!(
            "google: drew {} of {} points",
            self.drawn.len(),
            points.len()
        );
    }
}
