//! Leaflet-style backend.
//!
//! Owned maps start over London with one raster tile layer; every marker
//! carries its own popup.

use std::rc::Rc;

use geo::Coord;
use log::{debug, warn};
use sheetmap_core::{
    IconChoice, LatLngBounds, MapElement, MapOwnership, MapSlot, MarkerId, MarkerStyle, Point,
    Provider, SharedMap, resolve_icon,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Overlays, Viewport};

/// Default tile URL template. `{type}` is filled from the options; the
/// remaining placeholders are left for the tile client.
pub const DEFAULT_TILE_PATH: &str = "http://otile{s}.mqcdn.com/tiles/1.0.0/{type}/{z}/{x}/{y}.png";

/// Default tile attribution.
pub const DEFAULT_ATTRIBUTION: &str = concat!(
    r#"Map data &copy; <a href="http://openstreetmap.org">OpenStreetMap</a> contributors, "#,
    r#"<a href="http://creativecommons.org/licenses/by-sa/2.0/">CC-BY-SA</a>, "#,
    r#"tiles &copy; <a href="http://www.mapquest.com/" target="_blank">MapQuest</a> "#,
    r#"<img src="http://developer.mapquest.com/content/osm/mq_logo.png" />"#,
);

const INITIAL_CENTER: Coord<f64> = Coord {
    x: -0.09,
    y: 51.505,
};
const INITIAL_ZOOM: u8 = 13;

/// Tile layer settings for owned maps.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LeafletTileOptions {
    /// Subdomain characters substituted for `{s}`.
    pub subdomains: String,
    /// Tile set substituted for `{type}`.
    pub map_type: String,
    /// Tile URL template.
    pub tile_path: String,
    /// Attribution HTML.
    pub attribution: String,
}

impl Default for LeafletTileOptions {
    fn default() -> Self {
        Self {
            subdomains: "1234".to_owned(),
            map_type: "osm".to_owned(),
            tile_path: DEFAULT_TILE_PATH.to_owned(),
            attribution: DEFAULT_ATTRIBUTION.to_owned(),
        }
    }
}

impl LeafletTileOptions {
    /// Apply caller overrides; every `Some` value replaces the default.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &LeafletOverrides) -> Self {
        let LeafletOverrides {
            subdomains,
            map_type,
            tile_path,
            attribution,
        } = overrides;
        for (slot, value) in [
            (&mut self.subdomains, subdomains),
            (&mut self.map_type, map_type),
            (&mut self.tile_path, tile_path),
            (&mut self.attribution, attribution),
        ] {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
        self
    }

    /// Tile layer described by these options.
    pub fn tile_layer(&self) -> TileLayer {
        TileLayer {
            url_template: self.tile_path.replace("{type}", &self.map_type),
            subdomains: self.subdomains.clone(),
            attribution: self.attribution.clone(),
        }
    }
}

/// Caller overrides for [`LeafletTileOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LeafletOverrides {
    /// Subdomain characters.
    pub subdomains: Option<String>,
    /// Tile set name.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub map_type: Option<String>,
    /// Tile URL template.
    pub tile_path: Option<String>,
    /// Attribution HTML.
    pub attribution: Option<String>,
}

/// A raster tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    /// Subdomain characters.
    pub subdomains: String,
    /// Attribution HTML.
    pub attribution: String,
}

/// Icon of a Leaflet marker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "kind", content = "style", rename_all = "lowercase")
)]
pub enum LeafletIcon {
    /// The backend's stock marker.
    Default,
    /// A custom icon.
    Custom(MarkerStyle),
}

/// A marker with its bound popup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LeafletMarker {
    /// Position as `x = longitude`, `y = latitude`.
    pub position: Coord<f64>,
    /// Hover title.
    pub title: Option<String>,
    /// Marker icon.
    pub icon: LeafletIcon,
    /// Popup HTML.
    pub popup: String,
}

/// Scene model of one Leaflet-style map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LeafletMap {
    element: MapElement,
    viewport: Viewport,
    tile_layers: Vec<TileLayer>,
    markers: Overlays<LeafletMarker>,
}

impl LeafletMap {
    /// Create an empty map inside `element` with the stock initial view.
    pub fn new(element: MapElement) -> Self {
        Self {
            element,
            viewport: Viewport::new(INITIAL_CENTER, INITIAL_ZOOM),
            tile_layers: Vec::new(),
            markers: Overlays::default(),
        }
    }

    /// Host element.
    pub fn element(&self) -> &MapElement {
        &self.element
    }

    /// Add a tile layer.
    pub fn add_tile_layer(&mut self, layer: TileLayer) {
        self.tile_layers.push(layer);
    }

    /// Tile layers in insertion order.
    pub fn tile_layers(&self) -> &[TileLayer] {
        &self.tile_layers
    }

    /// Markers on the map.
    pub fn markers(&self) -> &Overlays<LeafletMarker> {
        &self.markers
    }

    /// Place a marker.
    pub fn add_marker(&mut self, marker: LeafletMarker) -> MarkerId {
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

/// [`Provider`] for the Leaflet-style backend.
#[derive(Debug)]
pub struct LeafletProvider {
    map: MapSlot<LeafletMap>,
    options: LeafletTileOptions,
    bounds: LatLngBounds,
    drawn: Vec<MarkerId>,
}

impl LeafletProvider {
    /// A provider that creates its own map on first initialisation.
    pub fn new(options: LeafletTileOptions) -> Self {
        Self::from_parts(None, options)
    }

    /// A provider drawing onto a caller-supplied map.
    pub fn with_map(map: SharedMap<LeafletMap>, options: LeafletTileOptions) -> Self {
        Self::from_parts(Some(map), options)
    }

    /// A provider adopting `map` when supplied.
    pub fn from_parts(map: Option<SharedMap<LeafletMap>>, options: LeafletTileOptions) -> Self {
        Self {
            map: MapSlot::from_option(map),
            options,
            bounds: LatLngBounds::new(),
            drawn: Vec::new(),
        }
    }

    /// The map, once initialised or injected.
    pub fn map(&self) -> Option<&SharedMap<LeafletMap>> {
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

    fn marker_icon(point: &Point) -> LeafletIcon {
        match resolve_icon(point) {
            IconChoice::RowUrl(url) => {
                LeafletIcon::Custom(point.marker_style().clone().with_icon_url(url))
            }
            IconChoice::ConfiguredUrl(_) => LeafletIcon::Custom(point.marker_style().clone()),
            IconChoice::Default { .. } => LeafletIcon::Default,
        }
    }
}

impl Provider for LeafletProvider {
    fn backend_name(&self) -> &'static str {
        "leaflet"
    }

    fn initialize(&mut self, element: &MapElement) {
        let options = &self.options;
        self.map.get_or_create(|| {
            debug!("leaflet: creating map in #{element}");
            let mut map = LeafletMap::new(element.clone());
            map.add_tile_layer(options.tile_layer());
            map
        });
        self.bounds.reset();
    }

    fn draw_points(&mut self, points: &[Point]) {
        let Some(shared) = self.map.get().map(Rc::clone) else {
            warn!("leaflet: draw_points called before initialize; nothing drawn");
            return;
        };
        let Ok(mut map) = shared.try_borrow_mut() else {
            warn!("leaflet: map is borrowed elsewhere; nothing drawn");
            return;
        };
        map.remove_markers(&self.drawn);
        self.drawn.clear();
        self.bounds.reset();
        for point in points {
            let Some(position) = point.location() else {
                debug!("leaflet: skipping point without valid coordinates");
                continue;
            };
            let id = map.add_marker(LeafletMarker {
                position,
                title: point.title_text(),
                icon: Self::marker_icon(point),
                popup: point.content(),
            });
            self.bounds.extend(position);
            self.drawn.push(id);
        }
        map.fit_bounds(&self.bounds);
        debug!(
            "leaflet: drew {} of {} points",
            self.drawn.len(),
            points.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use sheetmap_core::{PointOptions, Row, share_map};
    use std::sync::Arc;

    fn point(pairs: &[(&str, &str)], options: &Arc<PointOptions>) -> Point {
        Point::new(Row::normalized(pairs.iter().copied()), Arc::clone(options))
    }

    #[fixture]
    fn element() -> MapElement {
        MapElement::new("sheet-map")
    }

    #[fixture]
    fn styled() -> Arc<PointOptions> {
        Arc::new(PointOptions {
            fields: Some(vec!["name".into()]),
            marker_style: MarkerStyle {
                icon_url: Some("configured.png".into()),
                icon_size: Some([25, 41]),
                ..MarkerStyle::default()
            },
            ..PointOptions::default()
        })
    }

    #[rstest]
    fn tile_layer_fills_type_placeholder() {
        let layer = LeafletTileOptions::default().tile_layer();
        assert_eq!(
            layer.url_template,
            "http://otile{s}.mqcdn.com/tiles/1.0.0/osm/{z}/{x}/{y}.png"
        );
        assert_eq!(layer.subdomains, "1234");
        assert!(layer.attribution.contains(">CC-BY-SA</a>"));
        assert!(
            layer
                .attribution
                .ends_with(r#"<img src="http://developer.mapquest.com/content/osm/mq_logo.png" />"#)
        );
    }

    #[rstest]
    fn overrides_replace_only_given_values() {
        let options = LeafletTileOptions::default().with_overrides(&LeafletOverrides {
            map_type: Some("sat".into()),
            ..LeafletOverrides::default()
        });
        assert_eq!(options.map_type, "sat");
        assert_eq!(options.subdomains, "1234");
    }

    #[rstest]
    fn owned_map_gets_one_tile_layer(element: MapElement) {
        let mut provider = LeafletProvider::new(LeafletTileOptions::default());
        provider.initialize(&element);
        provider.initialize(&element);
        let map = Rc::clone(provider.map().expect("created"));
        let map = map.borrow();
        assert_eq!(map.tile_layers().len(), 1);
        assert_eq!(map.element(), &element);
        assert_eq!(map.viewport().zoom, 13);
        assert_eq!(map.viewport().center, Coord { x: -0.09, y: 51.505 });
        assert_eq!(provider.ownership(), Some(MapOwnership::Owned));
    }

    #[rstest]
    fn injected_map_is_left_without_tiles(element: MapElement) {
        let injected = share_map(LeafletMap::new(MapElement::new("host")));
        let mut provider =
            LeafletProvider::with_map(Rc::clone(&injected), LeafletTileOptions::default());
        provider.initialize(&element);
        assert!(injected.borrow().tile_layers().is_empty());
        assert!(Rc::ptr_eq(&injected, provider.map().expect("injected")));
    }

    #[rstest]
    #[case(&[("lat", "1"), ("lng", "1"), ("icon url", "row.png")], "row.png")]
    #[case(&[("lat", "1"), ("lng", "1")], "configured.png")]
    fn custom_icons_keep_configured_style(
        element: MapElement,
        styled: Arc<PointOptions>,
        #[case] pairs: &[(&str, &str)],
        #[case] expected_url: &str,
    ) {
        let mut provider = LeafletProvider::new(LeafletTileOptions::default());
        provider.initialize(&element);
        provider.draw_points(&[point(pairs, &styled)]);
        let map = Rc::clone(provider.map().expect("created"));
        let map = map.borrow();
        let marker = &map.markers().iter().next().expect("one marker").item;
        let LeafletIcon::Custom(style) = &marker.icon else {
            panic!("expected a custom icon, got {:?}", marker.icon);
        };
        assert_eq!(style.icon_url.as_deref(), Some(expected_url));
        assert_eq!(style.icon_size, Some([25, 41]));
    }

    #[rstest]
    fn plain_rows_use_stock_marker_with_popup(element: MapElement) {
        let options = Arc::new(PointOptions {
            fields: Some(vec!["name".into()]),
            title_field: Some("name".into()),
            ..PointOptions::default()
        });
        let mut provider = LeafletProvider::new(LeafletTileOptions::default());
        provider.initialize(&element);
        provider.draw_points(&[
            point(&[("lat", "10"), ("lng", "20"), ("name", "Cafe"), ("hexcolor", "#f00")], &options),
            point(&[("lat", ""), ("lng", "20"), ("name", "Nowhere")], &options),
        ]);
        let map = Rc::clone(provider.map().expect("created"));
        let map = map.borrow();
        assert_eq!(map.markers().len(), 1);
        let marker = &map.markers().iter().next().expect("one marker").item;
        assert_eq!(marker.icon, LeafletIcon::Default);
        assert_eq!(marker.title.as_deref(), Some("Cafe"));
        assert!(marker.popup.contains("<h3>Cafe</h3>"));
        assert_eq!(map.viewport().fit_count, 1);
        assert_eq!(map.viewport().center, Coord { x: 20.0, y: 10.0 });
    }

    #[rstest]
    fn all_invalid_still_fits_once(element: MapElement, styled: Arc<PointOptions>) {
        let mut provider = LeafletProvider::new(LeafletTileOptions::default());
        provider.initialize(&element);
        provider.draw_points(&[point(&[("lat", "north")], &styled)]);
        let map = Rc::clone(provider.map().expect("created"));
        let map = map.borrow();
        assert!(map.markers().is_empty());
        assert_eq!(map.viewport().fit_count, 1);
        assert_eq!(map.viewport().fitted, None);
        assert!(provider.bounds().is_empty());
    }

    #[rstest]
    fn redraw_leaves_only_latest_batch(element: MapElement, styled: Arc<PointOptions>) {
        let mut provider = LeafletProvider::new(LeafletTileOptions::default());
        provider.initialize(&element);
        provider.draw_points(&[
            point(&[("lat", "1"), ("lng", "1")], &styled),
            point(&[("lat", "2"), ("lng", "2")], &styled),
        ]);
        provider.initialize(&element);
        provider.draw_points(&[point(&[("lat", "5"), ("lng", "5")], &styled)]);
        let map = Rc::clone(provider.map().expect("created"));
        let map = map.borrow();
        let positions: Vec<_> = map.markers().iter().map(|placed| placed.item.position).collect();
        assert_eq!(positions, vec![Coord { x: 5.0, y: 5.0 }]);
    }
}
