//! The contract every map backend implements.
//!
//! A [`Provider`] owns one map surface. The orchestrator calls
//! [`Provider::initialize`] and then [`Provider::draw_points`] once per render
//! cycle; nothing else is required to plug a new backend in.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MapElement, Point};

/// A map surface shared between a provider and the caller that injected it.
///
/// Rendering is single-threaded, so `Rc<RefCell<_>>` suffices.
pub type SharedMap<M> = Rc<RefCell<M>>;

/// Wrap a map so it can be injected into a provider.
pub fn share_map<M>(map: M) -> SharedMap<M> {
    Rc::new(RefCell::new(map))
}

/// Draw map markers for a set of points.
///
/// Implementations must:
/// - create their map at most once, and never replace an injected map;
/// - reset per-render state (bounds, shared popups) on every `initialize`;
/// - skip invalid points without aborting the batch;
/// - fit the viewport exactly once per `draw_points`, using only the
///   positions of points that were drawn.
///
/// # Examples
///
/// ```rust
/// use sheetmap_core::{MapElement, Point, Provider};
///
/// #[derive(Default)]
/// struct CountingProvider {
///     drawn: usize,
/// }
///
/// impl Provider for CountingProvider {
///     fn backend_name(&self) -> &'static str {
///         "counting"
///     }
///
///     fn initialize(&mut self, _element: &MapElement) {
///         self.drawn = 0;
///     }
///
///     fn draw_points(&mut self, points: &[Point]) {
///         self.drawn = points.iter().filter(|p| p.is_valid()).count();
///     }
/// }
///
/// let mut provider = CountingProvider::default();
/// provider.initialize(&MapElement::new("map"));
/// provider.draw_points(&[]);
/// assert_eq!(provider.drawn, 0);
/// ```
pub trait Provider {
    /// Short backend identifier used in logs.
    fn backend_name(&self) -> &'static str;

    /// Ensure a map exists and reset per-render state.
    fn initialize(&mut self, element: &MapElement);

    /// Place one marker per valid point and fit the viewport to them.
    fn draw_points(&mut self, points: &[Point]);
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("backend", &self.backend_name())
            .finish_non_exhaustive()
    }
}

/// Identity of a marker on one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// Who is responsible for a provider's map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOwnership {
    /// Supplied by the caller; the provider never replaces it.
    Injected,
    /// Created by the provider on first initialisation.
    Owned,
}

/// Holder for a provider's map, created lazily unless injected.
///
/// # Examples
/// ```
/// use sheetmap_core::{MapOwnership, MapSlot};
///
/// let mut slot: MapSlot<Vec<u8>> = MapSlot::empty();
/// let first = slot.get_or_create(Vec::new);
/// let second = slot.get_or_create(|| vec![1]);
/// assert!(std::rc::Rc::ptr_eq(&first, &second));
/// assert_eq!(slot.ownership(), Some(MapOwnership::Owned));
/// ```
pub struct MapSlot<M> {
    map: Option<SharedMap<M>>,
    ownership: Option<MapOwnership>,
}

impl<M> MapSlot<M> {
    /// A slot whose map will be created on first use.
    pub const fn empty() -> Self {
        Self {
            map: None,
            ownership: None,
        }
    }

    /// A slot adopting a caller-supplied map.
    pub const fn injected(map: SharedMap<M>) -> Self {
        Self {
            map: Some(map),
            ownership: Some(MapOwnership::Injected),
        }
    }

    /// Build a slot from an optional injected map.
    pub fn from_option(map: Option<SharedMap<M>>) -> Self {
        map.map_or_else(Self::empty, Self::injected)
    }

    /// Return the map, creating it with `create` if the slot is empty.
    pub fn get_or_create(&mut self, create: impl FnOnce() -> M) -> SharedMap<M> {
        if let Some(map) = &self.map {
            return Rc::clone(map);
        }
        let map = share_map(create());
        self.map = Some(Rc::clone(&map));
        self.ownership = Some(MapOwnership::Owned);
        map
    }

    /// The map, if one exists yet.
    pub fn get(&self) -> Option<&SharedMap<M>> {
        self.map.as_ref()
    }

    /// Ownership of the current map, if any.
    pub const fn ownership(&self) -> Option<MapOwnership> {
        self.ownership
    }
}

impl<M> Default for MapSlot<M> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<M> fmt::Debug for MapSlot<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapSlot")
            .field("present", &self.map.is_some())
            .field("ownership", &self.ownership)
            .finish()
    }
}
