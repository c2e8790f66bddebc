//! Typed configuration for a [`Sheet`](crate::Sheet).

use std::fmt;

use sheetmap_core::{MapElement, MarkerStyle, PopupFn};

use crate::{
    Backend, InjectedMap, MapOptionOverrides, PopupTemplate, Sheet, SharedCompiler, SheetError,
    SourceHandle,
};

/// Callback run after every render with the sheet and the source handle.
///
/// Whatever the closure captures is its invocation context.
pub type CompletionFn = Box<dyn FnMut(&Sheet, Option<&SourceHandle>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum BackendSelector {
    Typed(Backend),
    Named(String),
}

/// Everything a [`Sheet`](crate::Sheet) needs, set through `with_*` methods.
///
/// # Examples
/// ```
/// use sheetmap_core::MapElement;
/// use sheetmap_sheet::{Backend, SheetConfig};
///
/// let config = SheetConfig::new("cafes-2024", MapElement::new("map"))
///     .with_backend(Backend::Google)
///     .with_fields(["Name", "Opening hours"])
///     .with_title_field("Name");
/// assert_eq!(config.backend(), Ok(Backend::Google));
/// assert_eq!(config.key(), "cafes-2024");
/// ```
pub struct SheetConfig {
    pub(crate) key: String,
    pub(crate) element: MapElement,
    backend: BackendSelector,
    pub(crate) sheet_name: Option<String>,
    pub(crate) fields: Option<Vec<String>>,
    pub(crate) title_field: Option<String>,
    pub(crate) popup_content: Option<PopupFn>,
    pub(crate) popup_template: Option<PopupTemplate>,
    pub(crate) template_compiler: Option<SharedCompiler>,
    pub(crate) marker_style: MarkerStyle,
    pub(crate) escape_cells: bool,
    pub(crate) map_options: MapOptionOverrides,
    pub(crate) map: Option<InjectedMap>,
    pub(crate) on_complete: Option<CompletionFn>,
}

impl SheetConfig {
    /// Configuration for the source `key` drawn into `element`.
    pub fn new(key: impl Into<String>, element: MapElement) -> Self {
        Self {
            key: key.into(),
            element,
            backend: BackendSelector::Typed(Backend::default()),
            sheet_name: None,
            fields: None,
            title_field: None,
            popup_content: None,
            popup_template: None,
            template_compiler: None,
            marker_style: MarkerStyle::default(),
            escape_cells: false,
            map_options: MapOptionOverrides::default(),
            map: None,
            on_complete: None,
        }
    }

    /// Select the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = BackendSelector::Typed(backend);
        self
    }

    /// Select the backend by name; unknown names fail when the sheet is built.
    #[must_use]
    pub fn with_backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend = BackendSelector::Named(name.into());
        self
    }

    /// Draw the named table instead of the first one.
    #[must_use]
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Fields listed in generated popups, in order.
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Field used for marker titles and popup headings.
    #[must_use]
    pub fn with_title_field(mut self, field: impl Into<String>) -> Self {
        self.title_field = Some(field.into());
        self
    }

    /// Custom popup renderer.
    #[must_use]
    pub fn with_popup_content(mut self, render: PopupFn) -> Self {
        self.popup_content = Some(render);
        self
    }

    /// Popup template, compiled or named.
    #[must_use]
    pub fn with_popup_template(mut self, template: PopupTemplate) -> Self {
        self.popup_template = Some(template);
        self
    }

    /// Compiler for named popup templates.
    #[must_use]
    pub fn with_template_compiler(mut self, compiler: SharedCompiler) -> Self {
        self.template_compiler = Some(compiler);
        self
    }

    /// Marker style overrides.
    #[must_use]
    pub fn with_marker_style(mut self, style: MarkerStyle) -> Self {
        self.marker_style = style;
        self
    }

    /// HTML-escape cell text in generated popups.
    #[must_use]
    pub const fn with_escaped_cells(mut self) -> Self {
        self.escape_cells = true;
        self
    }

    /// Backend option overrides.
    #[must_use]
    pub fn with_map_options(mut self, overrides: MapOptionOverrides) -> Self {
        self.map_options = overrides;
        self
    }

    /// Adopt an existing map instead of creating one.
    #[must_use]
    pub fn with_map(mut self, map: InjectedMap) -> Self {
        self.map = Some(map);
        self
    }

    /// Run `callback` after every render.
    #[must_use]
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Sheet, Option<&SourceHandle>) + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Data source key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Host element.
    #[must_use]
    pub const fn element(&self) -> &MapElement {
        &self.element
    }

    /// Selected backend.
    ///
    /// # Errors
    /// Returns [`SheetError::UnknownBackend`] when the backend was selected by
    /// an unrecognised name.
    pub fn backend(&self) -> Result<Backend, SheetError> {
        match &self.backend {
            BackendSelector::Typed(backend) => Ok(*backend),
            BackendSelector::Named(name) => Ok(name.parse::<Backend>()?),
        }
    }
}

impl fmt::Debug for SheetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetConfig")
            .field("key", &self.key)
            .field("element", &self.element)
            .field("backend", &self.backend)
            .field("sheet_name", &self.sheet_name)
            .field("fields", &self.fields)
            .field("title_field", &self.title_field)
            .field("popup_content", &self.popup_content.as_ref().map(|_| "<fn>"))
            .field("popup_template", &self.popup_template)
            .field("template_compiler", &self.template_compiler.as_ref().map(|_| "<compiler>"))
            .field("marker_style", &self.marker_style)
            .field("escape_cells", &self.escape_cells)
            .field("map_options", &self.map_options)
            .field("map", &self.map.as_ref().map(InjectedMap::backend))
            .field("on_complete", &self.on_complete.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_to_leaflet_and_first_table() {
        let config = SheetConfig::new("key", MapElement::new("map"));
        assert_eq!(config.backend(), Ok(Backend::Leaflet));
        assert_eq!(config.sheet_name, None);
        assert!(config.on_complete.is_none());
    }

    #[rstest]
    fn named_backend_is_checked_lazily() {
        let config = SheetConfig::new("key", MapElement::new("map")).with_backend_name("bing");
        assert_eq!(
            config.backend(),
            Err(SheetError::UnknownBackend {
                name: "bing".to_owned()
            })
        );
        let known = config.with_backend_name("MapBox");
        assert_eq!(known.backend(), Ok(Backend::MapBox));
    }

    #[rstest]
    fn builder_collects_fields_in_order() {
        let config = SheetConfig::new("key", MapElement::new("map")).with_fields(["b", "a"]);
        assert_eq!(
            config.fields,
            Some(vec!["b".to_owned(), "a".to_owned()])
        );
    }
}
