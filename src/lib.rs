//! Facade crate for sheetmap.
//!
//! This crate re-exports the row and point model, the render orchestration and
//! the map backends compiled in through feature flags.
//!
//! # Examples
//! ```
//! # #[cfg(feature = "backend-leaflet")]
//! # {
//! use sheetmap::{Dataset, MapElement, Row, Sheet, SheetConfig, SourceHandle};
//!
//! let mut sheet = Sheet::new(SheetConfig::new("cafes", MapElement::new("map")))?;
//! let dataset = Dataset::new().with_table(
//!     "Cafes",
//!     vec![Row::normalized([("lat", "51.5"), ("lng", "-0.12")])],
//! );
//! let handle = SourceHandle::describing("cafes", &dataset);
//! sheet.on_data_arrived(dataset, handle)?;
//! assert_eq!(sheet.valid_points().count(), 1);
//! # }
//! # Ok::<(), sheetmap::SheetError>(())
//! ```

#![forbid(unsafe_code)]

pub use sheetmap_core::{
    LatLngBounds, MapElement, MapOwnership, MarkerId, MarkerStyle, Point, PointOptions, PopupFn,
    Provider, Row, SharedMap, Value, popup_fn, share_map,
};

pub use sheetmap_sheet::{
    Backend, DataSource, Dataset, InjectedMap, MapOptionOverrides, PopupTemplate, Sheet,
    SheetConfig, SheetError, SourceHandle, StaticSource, Table, TemplateCompiler,
};

#[cfg(feature = "backend-google")]
pub use sheetmap_providers::{GoogleMap, GoogleMapsProvider};

#[cfg(feature = "backend-leaflet")]
pub use sheetmap_providers::{LeafletMap, LeafletProvider};

#[cfg(feature = "backend-mapquest")]
pub use sheetmap_providers::{MapQuestProvider, TileMap};

#[cfg(feature = "backend-mapbox")]
pub use sheetmap_providers::{MapBoxProvider, VectorMap};
