//! Map backends implementing [`sheetmap_core::Provider`].
//!
//! Each backend keeps a retained scene model of the calls it made against its
//! mapping SDK: markers, popups, layers and the fitted viewport. A host
//! renderer turns that scene into pixels; this crate only decides what goes
//! on the map.
//!
//! | Backend | Feature | Markers | Popups | Viewport |
//! |---|---|---|---|---|
//! | [`google`] | `google` | coloured pins or custom icons | one shared info window | fit to bounds |
//! | [`leaflet`] | `leaflet` | default or custom icons | one popup per marker | fit to bounds |
//! | [`mapquest`] | `mapquest` | POIs | one popup per marker | best fit |
//! | [`mapbox`] | `mapbox` | coloured features | layer interaction | layer extent |

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "leaflet")]
pub mod leaflet;
#[cfg(feature = "mapbox")]
pub mod mapbox;
#[cfg(feature = "mapquest")]
pub mod mapquest;

mod overlay;

#[cfg(feature = "google")]
pub use google::{GoogleMap, GoogleMapOptions, GoogleMapOverrides, GoogleMapsProvider};
#[cfg(feature = "leaflet")]
pub use leaflet::{LeafletMap, LeafletOverrides, LeafletProvider, LeafletTileOptions};
#[cfg(feature = "mapbox")]
pub use mapbox::{MapBoxOptions, MapBoxOverrides, MapBoxProvider, VectorMap};
#[cfg(feature = "mapquest")]
pub use mapquest::{MapQuestOptions, MapQuestOverrides, MapQuestProvider, TileMap};
pub use overlay::{Overlays, Placed, Viewport};
