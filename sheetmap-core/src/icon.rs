//! Marker styling shared by every backend.
//!
//! Backends that support custom icons pick one with [`resolve_icon`]:
//! a per-row `icon url` wins over the configured [`MarkerStyle::icon_url`],
//! which wins over the backend default (optionally tinted by the row's
//! `hexcolor`).

use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Point;

/// Row field holding a per-marker icon URL.
pub const ICON_URL_FIELD: &str = "icon url";

/// Row field holding a per-marker colour.
pub const HEX_COLOR_FIELD: &str = "hexcolor";

/// Pin colour used when a row supplies none.
pub const DEFAULT_PIN_COLOR: &str = "FE7569";

/// Caller-supplied marker style overrides.
///
/// Pixel sizes and anchors are `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MarkerStyle {
    /// Icon image URL applied to every marker without a per-row icon.
    pub icon_url: Option<String>,
    /// Icon size in pixels.
    pub icon_size: Option<[u32; 2]>,
    /// Pixel offset of the icon tip.
    pub icon_anchor: Option<[i32; 2]>,
    /// Pixel offset of the popup relative to the anchor.
    pub popup_anchor: Option<[i32; 2]>,
    /// Shadow image URL.
    pub shadow_url: Option<String>,
    /// Extra CSS class for the icon element.
    pub class_name: Option<String>,
}

impl MarkerStyle {
    /// Configured icon URL, ignoring empty strings.
    pub fn configured_icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Set the icon URL.
    #[must_use]
    pub fn with_icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }
}

/// Outcome of icon resolution for one point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconChoice {
    /// The row's own `icon url`.
    RowUrl(String),
    /// The configured [`MarkerStyle::icon_url`].
    ConfiguredUrl(String),
    /// The backend default, with the row's raw `hexcolor` if present.
    Default {
        /// Raw colour text from the row.
        color: Option<String>,
    },
}

/// Choose the icon for `point`.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use sheetmap_core::{IconChoice, MarkerStyle, Point, PointOptions, Row, resolve_icon};
///
/// let options = Arc::new(PointOptions {
///     marker_style: MarkerStyle::default().with_icon_url("configured.png"),
///     ..PointOptions::default()
/// });
/// let row = Row::normalized([("icon url", "row.png")]);
/// let point = Point::new(row, Arc::clone(&options));
/// assert_eq!(resolve_icon(&point), IconChoice::RowUrl("row.png".into()));
///
/// let plain = Point::new(Row::new(), options);
/// assert_eq!(resolve_icon(&plain), IconChoice::ConfiguredUrl("configured.png".into()));
/// ```
pub fn resolve_icon(point: &Point) -> IconChoice {
    if let Some(url) = point.get(ICON_URL_FIELD).filter(|value| !value.is_blank()) {
        return IconChoice::RowUrl(url.to_string());
    }
    if let Some(url) = point.marker_style().configured_icon_url() {
        return IconChoice::ConfiguredUrl(url.to_owned());
    }
    IconChoice::Default {
        color: point
            .get(HEX_COLOR_FIELD)
            .filter(|value| !value.is_blank())
            .map(ToString::to_string),
    }
}

/// Errors returned by [`HexColor::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexColorError {
    /// The colour was not three or six hexadecimal digits.
    #[error("colour {raw:?} is not a 3 or 6 digit hex value")]
    Malformed {
        /// Text as found in the row.
        raw: String,
    },
}

/// A validated hexadecimal colour without the leading `#`.
///
/// # Examples
/// ```
/// use sheetmap_core::HexColor;
///
/// let color = HexColor::parse("#00ff7f")?;
/// assert_eq!(color.as_str(), "00ff7f");
/// assert!(HexColor::parse("teal").is_err());
/// # Ok::<(), sheetmap_core::HexColorError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(String);

impl HexColor {
    /// Parse a colour, stripping one leading `#`.
    ///
    /// # Errors
    /// Returns [`HexColorError::Malformed`] unless the remaining text is three
    /// or six hexadecimal digits.
    pub fn parse(raw: &str) -> Result<Self, HexColorError> {
        let digits = raw.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(digits.to_owned()))
        } else {
            Err(HexColorError::Malformed { raw: raw.to_owned() })
        }
    }

    /// Resolve an optional row colour, falling back to [`DEFAULT_PIN_COLOR`]
    /// when none is supplied.
    ///
    /// # Errors
    /// Propagates [`HexColorError`] for a supplied but malformed colour.
    pub fn or_default(raw: Option<&str>) -> Result<Self, HexColorError> {
        raw.map_or_else(|| Ok(Self::fallback()), Self::parse)
    }

    /// The fallback pin colour.
    pub fn fallback() -> Self {
        Self(DEFAULT_PIN_COLOR.to_owned())
    }

    /// Digits without `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
