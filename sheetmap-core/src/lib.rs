//! Core domain types for sheetmap.
//!
//! A spreadsheet row becomes a [`Point`]: coordinates, case-insensitive field
//! lookup, a title and popup content. Map backends implement [`Provider`] so a
//! single render flow can drive any of them.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod bounds;
mod element;
pub mod icon;
mod point;
pub mod provider;
mod row;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bounds::LatLngBounds;
pub use element::MapElement;
pub use icon::{DEFAULT_PIN_COLOR, HexColor, HexColorError, IconChoice, MarkerStyle, resolve_icon};
pub use point::{POPUP_CLASS, Point, PointOptions, PopupFn, popup_fn};
pub use provider::{MapOwnership, MapSlot, MarkerId, Provider, SharedMap, share_map};
pub use row::{Row, Value, normalize_field_name, parse_leading_float};
