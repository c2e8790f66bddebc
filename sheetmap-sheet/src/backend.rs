//! Backend selection and provider construction.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sheetmap_core::Provider;
#[cfg(any(
    feature = "backend-google",
    feature = "backend-leaflet",
    feature = "backend-mapquest",
    feature = "backend-mapbox"
))]
use sheetmap_core::SharedMap;
#[cfg(feature = "backend-google")]
use sheetmap_providers::{GoogleMap, GoogleMapOptions, GoogleMapOverrides, GoogleMapsProvider};
#[cfg(feature = "backend-leaflet")]
use sheetmap_providers::{LeafletMap, LeafletOverrides, LeafletProvider, LeafletTileOptions};
#[cfg(feature = "backend-mapbox")]
use sheetmap_providers::{MapBoxOptions, MapBoxOverrides, MapBoxProvider, VectorMap};
#[cfg(feature = "backend-mapquest")]
use sheetmap_providers::{MapQuestOptions, MapQuestOverrides, MapQuestProvider, TileMap};
use thiserror::Error;

use crate::SheetError;

/// Map backend selector.
///
/// # Examples
/// ```
/// use sheetmap_sheet::Backend;
///
/// let backend: Backend = "Google".parse()?;
/// assert_eq!(backend, Backend::Google);
/// assert_eq!(backend.to_string(), "google");
/// assert_eq!(Backend::default(), Backend::Leaflet);
/// # Ok::<(), sheetmap_sheet::BackendParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Backend {
    /// Google-style pins with a shared info window.
    Google,
    /// Leaflet-style markers over raster tiles.
    #[default]
    Leaflet,
    /// Tile-service points of interest.
    #[cfg_attr(feature = "serde", serde(rename = "mapquest"))]
    MapQuest,
    /// Vector marker layers.
    #[cfg_attr(feature = "serde", serde(rename = "mapbox"))]
    MapBox,
}

impl Backend {
    /// Every backend, in selector order.
    pub const ALL: [Self; 4] = [Self::Google, Self::Leaflet, Self::MapQuest, Self::MapBox];

    /// Selector string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Leaflet => "leaflet",
            Self::MapQuest => "mapquest",
            Self::MapBox => "mapbox",
        }
    }

    /// Whether this build includes the backend.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Google => cfg!(feature = "backend-google"),
            Self::Leaflet => cfg!(feature = "backend-leaflet"),
            Self::MapQuest => cfg!(feature = "backend-mapquest"),
            Self::MapBox => cfg!(feature = "backend-mapbox"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown backend selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown map backend {raw:?}; expected one of google, leaflet, mapquest, mapbox")]
pub struct BackendParseError {
    /// Selector as supplied.
    pub raw: String,
}

impl FromStr for Backend {
    type Err = BackendParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|backend| backend.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BackendParseError { raw: s.to_owned() })
    }
}

impl From<BackendParseError> for SheetError {
    fn from(err: BackendParseError) -> Self {
        Self::UnknownBackend { name: err.raw }
    }
}

/// Per-backend option overrides; only the selected backend's section applies.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MapOptionOverrides {
    /// Google-style map options.
    #[cfg(feature = "backend-google")]
    pub google: GoogleMapOverrides,
    /// Leaflet-style tile options.
    #[cfg(feature = "backend-leaflet")]
    pub leaflet: LeafletOverrides,
    /// Tile-service map options.
    #[cfg(feature = "backend-mapquest")]
    pub mapquest: MapQuestOverrides,
    /// Vector-layer map options.
    #[cfg(feature = "backend-mapbox")]
    pub mapbox: MapBoxOverrides,
}

/// A pre-existing map for the provider to adopt.
#[derive(Debug, Clone)]
pub enum InjectedMap {
    /// Google-style map.
    #[cfg(feature = "backend-google")]
    Google(SharedMap<GoogleMap>),
    /// Leaflet-style map.
    #[cfg(feature = "backend-leaflet")]
    Leaflet(SharedMap<LeafletMap>),
    /// Tile-service map.
    #[cfg(feature = "backend-mapquest")]
    MapQuest(SharedMap<TileMap>),
    /// Vector-layer map.
    #[cfg(feature = "backend-mapbox")]
    MapBox(SharedMap<VectorMap>),
}

impl InjectedMap {
    /// Backend the map was built for.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match *self {
            #[cfg(feature = "backend-google")]
            Self::Google(_) => Backend::Google,
            #[cfg(feature = "backend-leaflet")]
            Self::Leaflet(_) => Backend::Leaflet,
            #[cfg(feature = "backend-mapquest")]
            Self::MapQuest(_) => Backend::MapQuest,
            #[cfg(feature = "backend-mapbox")]
            Self::MapBox(_) => Backend::MapBox,
        }
    }
}

/// Build the provider for `backend`, adopting `map` when supplied.
///
/// # Errors
/// Returns [`SheetError::MapBackendMismatch`] when `map` belongs to another
/// backend and [`SheetError::MissingBackend`] when `backend` was compiled out.
pub fn build_provider(
    backend: Backend,
    overrides: &MapOptionOverrides,
    map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    if let Some(injected) = &map
        && injected.backend() != backend
    {
        return Err(SheetError::MapBackendMismatch {
            backend,
            map: injected.backend(),
        });
    }
    match backend {
        Backend::Google => google(overrides, map),
        Backend::Leaflet => leaflet(overrides, map),
        Backend::MapQuest => mapquest(overrides, map),
        Backend::MapBox => mapbox(overrides, map),
    }
}

#[cfg(feature = "backend-google")]
fn google(
    overrides: &MapOptionOverrides,
    map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    let options = GoogleMapOptions::default().with_overrides(&overrides.google);
    let adopted = match map {
        Some(InjectedMap::Google(shared)) => Some(shared),
        _ => None,
    };
    Ok(Box::new(GoogleMapsProvider::from_parts(adopted, options)))
}

#[cfg(not(feature = "backend-google"))]
fn google(
    _overrides: &MapOptionOverrides,
    _map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    Err(SheetError::MissingBackend {
        backend: Backend::Google,
    })
}

#[cfg(feature = "backend-leaflet")]
fn leaflet(
    overrides: &MapOptionOverrides,
    map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    let options = LeafletTileOptions::default().with_overrides(&overrides.leaflet);
    let adopted = match map {
        Some(InjectedMap::Leaflet(shared)) => Some(shared),
        _ => None,
    };
    Ok(Box::new(LeafletProvider::from_parts(adopted, options)))
}

#[cfg(not(feature = "backend-leaflet"))]
fn leaflet(
    _overrides: &MapOptionOverrides,
    _map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    Err(SheetError::MissingBackend {
        backend: Backend::Leaflet,
    })
}

#[cfg(feature = "backend-mapquest")]
fn mapquest(
    overrides: &MapOptionOverrides,
    map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    let options = MapQuestOptions::default().with_overrides(&overrides.mapquest);
    let adopted = match map {
        Some(InjectedMap::MapQuest(shared)) => Some(shared),
        _ => None,
    };
    Ok(Box::new(MapQuestProvider::from_parts(adopted, options)))
}

#[cfg(not(feature = "backend-mapquest"))]
fn mapquest(
    _overrides: &MapOptionOverrides,
    _map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    Err(SheetError::MissingBackend {
        backend: Backend::MapQuest,
    })
}

#[cfg(feature = "backend-mapbox")]
fn mapbox(
    overrides: &MapOptionOverrides,
    map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    let options = MapBoxOptions::default().with_overrides(&overrides.mapbox);
    let adopted = match map {
        Some(InjectedMap::MapBox(shared)) => Some(shared),
        _ => None,
    };
    Ok(Box::new(MapBoxProvider::from_parts(adopted, options)))
}

#[cfg(not(feature = "backend-mapbox"))]
fn mapbox(
    _overrides: &MapOptionOverrides,
    _map: Option<InjectedMap>,
) -> Result<Box<dyn Provider>, SheetError> {
    Err(SheetError::MissingBackend {
        backend: Backend::MapBox,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("google", Backend::Google)]
    #[case(" Leaflet ", Backend::Leaflet)]
    #[case("MAPQUEST", Backend::MapQuest)]
    #[case("mapBox", Backend::MapBox)]
    fn parses_selectors_case_insensitively(#[case] raw: &str, #[case] expected: Backend) {
        assert_eq!(raw.parse::<Backend>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_selector() {
        let err = "openlayers".parse::<Backend>().expect_err("unknown");
        assert_eq!(err.raw, "openlayers");
        assert_eq!(
            SheetError::from(err),
            SheetError::UnknownBackend {
                name: "openlayers".to_owned()
            }
        );
    }

    #[rstest]
    fn display_round_trips() {
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>(), Ok(backend));
        }
    }

    #[cfg(all(feature = "backend-google", feature = "backend-leaflet"))]
    #[rstest]
    fn rejects_map_from_another_backend() {
        use sheetmap_core::{MapElement, share_map};

        let map = InjectedMap::Leaflet(share_map(LeafletMap::new(MapElement::new("map"))));
        let err = build_provider(Backend::Google, &MapOptionOverrides::default(), Some(map))
            .expect_err("mismatched map");
        assert_eq!(
            err,
            SheetError::MapBackendMismatch {
                backend: Backend::Google,
                map: Backend::Leaflet,
            }
        );
    }

    #[cfg(feature = "backend-mapquest")]
    #[rstest]
    fn builds_requested_backend_with_overrides() {
        use sheetmap_core::{MapElement, share_map};

        let map = share_map(TileMap::new(MapElement::new("map"), MapQuestOptions::default()));
        let overrides = MapOptionOverrides {
            mapquest: MapQuestOverrides {
                zoom: Some(3),
                ..MapQuestOverrides::default()
            },
            ..MapOptionOverrides::default()
        };
        let provider = build_provider(
            Backend::MapQuest,
            &overrides,
            Some(InjectedMap::MapQuest(map)),
        )
        .expect("provider");
        assert_eq!(provider.backend_name(), "mapquest");
    }

    #[cfg(not(feature = "backend-mapbox"))]
    #[rstest]
    fn compiled_out_backend_is_reported() {
        let err = build_provider(Backend::MapBox, &MapOptionOverrides::default(), None)
            .expect_err("backend disabled");
        assert_eq!(
            err,
            SheetError::MissingBackend {
                backend: Backend::MapBox
            }
        );
    }
}
