//! Rows normalised into renderable points.

use std::fmt;
use std::sync::Arc;

use geo::Coord;

use crate::{MarkerStyle, Row, Value};

/// CSS class on the element wrapping every popup body.
pub const POPUP_CLASS: &str = "sheetmap-popup";

const LATITUDE_FIELDS: [&str; 2] = ["latitude", "lat"];
const LONGITUDE_FIELDS: [&str; 3] = ["longitude", "lng", "long"];

/// Function turning a row into popup HTML.
pub type PopupFn = Arc<dyn Fn(&Row) -> String + Send + Sync>;

/// Wrap a closure as a [`PopupFn`].
///
/// # Examples
/// ```
/// use sheetmap_core::{Row, popup_fn};
///
/// let render = popup_fn(|row: &Row| format!("{} cells", row.len()));
/// assert_eq!(render(&Row::new()), "0 cells");
/// ```
pub fn popup_fn<F>(render: F) -> PopupFn
where
    F: Fn(&Row) -> String + Send + Sync + 'static,
{
    Arc::new(render)
}

/// Presentation settings shared by every point of a render cycle.
#[derive(Clone, Default)]
pub struct PointOptions {
    /// Fields listed in generated popups, in display order.
    pub fields: Option<Vec<String>>,
    /// Field used as the marker title and popup heading.
    pub title_field: Option<String>,
    /// Custom popup renderer; takes precedence over everything else.
    pub popup_content: Option<PopupFn>,
    /// Pre-compiled popup template; used when no custom renderer is set.
    pub popup_template: Option<PopupFn>,
    /// Marker style overrides.
    pub marker_style: MarkerStyle,
    /// HTML-escape titles, field names and cell values in generated popups.
    /// Off by default, so cells holding links or images render as markup.
    pub escape_cells: bool,
}

impl fmt::Debug for PointOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointOptions")
            .field("fields", &self.fields)
            .field("title_field", &self.title_field)
            .field("popup_content", &self.popup_content.as_ref().map(|_| "<fn>"))
            .field("popup_template", &self.popup_template.as_ref().map(|_| "<fn>"))
            .field("marker_style", &self.marker_style)
            .field("escape_cells", &self.escape_cells)
            .finish()
    }
}

/// One renderable entity derived from a source row.
///
/// Coordinates and content are derived from the row on every call; the row
/// never changes after construction.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use sheetmap_core::{Point, PointOptions, Row};
///
/// let row = Row::normalized([("lat", "51.5"), ("lng", "-0.12"), ("name", "London")]);
/// let point = Point::new(row, Arc::new(PointOptions::default()));
/// assert!(point.is_valid());
/// assert_eq!(point.coordinates(), (51.5, -0.12));
/// ```
#[derive(Debug, Clone)]
pub struct Point {
    row: Row,
    options: Arc<PointOptions>,
}

impl Point {
    /// Create a point over `row`.
    pub fn new(row: Row, options: Arc<PointOptions>) -> Self {
        Self { row, options }
    }

    /// The source row.
    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Shared presentation options.
    pub fn options(&self) -> &PointOptions {
        &self.options
    }

    /// Marker style overrides.
    pub fn marker_style(&self) -> &MarkerStyle {
        &self.options.marker_style
    }

    /// `(latitude, longitude)`; either may be `NaN`.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude(), self.longitude())
    }

    /// Latitude from `latitude`, falling back to `lat`.
    pub fn latitude(&self) -> f64 {
        self.first_present(&LATITUDE_FIELDS)
    }

    /// Longitude from `longitude`, falling back to `lng` then `long`.
    pub fn longitude(&self) -> f64 {
        self.first_present(&LONGITUDE_FIELDS)
    }

    fn first_present(&self, fields: &[&str]) -> f64 {
        fields
            .iter()
            .find_map(|field| self.row.get(field).filter(|value| !value.is_blank()))
            .map_or(f64::NAN, Value::to_f64)
    }

    /// Position as a [`Coord`] (`x = longitude`, `y = latitude`) when valid.
    pub fn location(&self) -> Option<Coord<f64>> {
        let (lat, lng) = self.coordinates();
        (!lat.is_nan() && !lng.is_nan()).then_some(Coord { x: lng, y: lat })
    }

    /// Look up a field case- and whitespace-insensitively.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.row.get(field)
    }

    /// Value of the configured title field.
    pub fn title(&self) -> Option<&Value> {
        self.options
            .title_field
            .as_deref()
            .and_then(|field| self.get(field))
    }

    /// Title as text, skipping blank values.
    pub fn title_text(&self) -> Option<String> {
        self.title()
            .filter(|value| !value.is_blank())
            .map(ToString::to_string)
    }

    /// Return `true` when both coordinates parse to numbers.
    pub fn is_valid(&self) -> bool {
        self.location().is_some()
    }

    /// Popup HTML for this point.
    ///
    /// The custom renderer wins, then the template, then a generated list of
    /// the configured fields. Without any of them the result is empty.
    /// Non-empty results are wrapped in a `div` carrying [`POPUP_CLASS`].
    pub fn content(&self) -> String {
        let body = if let Some(render) = &self.options.popup_content {
            render(&self.row)
        } else if let Some(template) = &self.options.popup_template {
            template(&self.row)
        } else if let Some(fields) = &self.options.fields {
            self.field_listing(fields)
        } else {
            return String::new();
        };
        format!("<div class=\"{POPUP_CLASS}\">{body}</div>")
    }

    fn field_listing(&self, fields: &[String]) -> String {
        let mut html = String::new();
        if let Some(title) = self.title_text() {
            html.push_str(&format!("<h3>{}</h3>", self.cell_text(&title)));
        }
        for field in fields {
            let value = self.get(field).map(ToString::to_string).unwrap_or_default();
            html.push_str(&format!(
                "<p><strong>{}</strong>: {}</p>",
                self.cell_text(field),
                self.cell_text(&value)
            ));
        }
        html
    }

    fn cell_text(&self, text: &str) -> String {
        if self.options.escape_cells {
            escape_html(text)
        } else {
            text.to_owned()
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
