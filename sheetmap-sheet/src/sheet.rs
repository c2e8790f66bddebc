//! The render lifecycle.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use log::{debug, error, warn};
use sheetmap_core::{MapElement, Point, PointOptions, Provider};

use crate::{
    CompletionFn, DataSource, Dataset, SheetConfig, SheetError, SourceHandle, build_provider,
};

/// A sheet shared with the data-source callback that feeds it.
pub type SharedSheet = Rc<RefCell<Sheet>>;

/// Turns a delivered table into markers on one map.
///
/// The provider is built eagerly, so configuration problems surface from
/// [`Sheet::new`]. Each delivery rebuilds the points and renders them.
///
/// # Examples
/// ```
/// use sheetmap_core::{MapElement, Row};
/// use sheetmap_sheet::{Dataset, Sheet, SheetConfig, StaticSource};
///
/// let dataset = Dataset::new().with_table(
///     "Cafes",
///     vec![Row::normalized([("lat", "51.5"), ("lng", "-0.1"), ("Name", "Nero")])],
/// );
/// let mut source = StaticSource::immediate(dataset);
/// let config = SheetConfig::new("cafes", MapElement::new("map")).with_title_field("name");
/// let sheet = Sheet::connect(config, &mut source)?;
/// assert_eq!(sheet.borrow().points().len(), 1);
/// # Ok::<(), sheetmap_sheet::SheetError>(())
/// ```
pub struct Sheet {
    key: String,
    element: MapElement,
    sheet_name: Option<String>,
    provider: Box<dyn Provider>,
    point_options: Arc<PointOptions>,
    points: Vec<Point>,
    handle: Option<SourceHandle>,
    on_complete: Option<CompletionFn>,
    render_count: usize,
}

impl Sheet {
    /// Build a sheet and its provider from `config`.
    ///
    /// # Errors
    /// Returns [`SheetError`] for an unknown or unavailable backend, an
    /// injected map of the wrong backend, or a popup template that cannot be
    /// compiled.
    pub fn new(mut config: SheetConfig) -> Result<Self, SheetError> {
        let backend = config.backend()?;
        let provider = build_provider(backend, &config.map_options, config.map.take())?;
        debug!("sheet {:?}: using the {backend} backend", config.key);
        Self::assemble(config, provider)
    }

    /// Build a sheet around a caller-supplied provider.
    ///
    /// The backend selector, injected map and backend overrides of `config`
    /// are ignored.
    ///
    /// # Errors
    /// Returns [`SheetError`] when a popup template cannot be compiled.
    pub fn with_provider(
        config: SheetConfig,
        provider: Box<dyn Provider>,
    ) -> Result<Self, SheetError> {
        if config.map.is_some() {
            warn!(
                "sheet {:?}: injected map ignored by custom {} provider",
                config.key,
                provider.backend_name()
            );
        }
        Self::assemble(config, provider)
    }

    /// Build a sheet and register it with `source`.
    ///
    /// # Errors
    /// Returns the same errors as [`Sheet::new`].
    pub fn connect(
        config: SheetConfig,
        source: &mut dyn DataSource,
    ) -> Result<SharedSheet, SheetError> {
        Ok(Self::new(config)?.register(source))
    }

    /// Share this sheet and ask `source` for its data.
    ///
    /// The callback holds a weak reference, so a delivery arriving after the
    /// sheet was dropped is ignored. The completion callback runs while the
    /// sheet is mutably borrowed and must not borrow the [`SharedSheet`].
    pub fn register(self, source: &mut dyn DataSource) -> SharedSheet {
        let key = self.key.clone();
        let shared = Rc::new(RefCell::new(self));
        let weak = Rc::downgrade(&shared);
        source.request(
            &key,
            Box::new(move |dataset, handle| deliver(&weak, dataset, handle)),
        );
        shared
    }

    fn assemble(config: SheetConfig, provider: Box<dyn Provider>) -> Result<Self, SheetError> {
        let SheetConfig {
            key,
            element,
            sheet_name,
            fields,
            title_field,
            popup_content,
            popup_template,
            template_compiler,
            marker_style,
            escape_cells,
            on_complete,
            ..
        } = config;
        let compiled_template = popup_template
            .map(|template| template.resolve(template_compiler.as_ref()))
            .transpose()?;
        Ok(Self {
            key,
            element,
            sheet_name,
            provider,
            point_options: Arc::new(PointOptions {
                fields,
                title_field,
                popup_content,
                popup_template: compiled_template,
                marker_style,
                escape_cells,
            }),
            points: Vec::new(),
            handle: None,
            on_complete,
            render_count: 0,
        })
    }

    /// Accept a delivery: pick the table, rebuild the points and render.
    ///
    /// The configured table name wins; otherwise the handle's first table is
    /// used.
    ///
    /// # Errors
    /// Returns [`SheetError::NoTables`] when no table name can be resolved and
    /// [`SheetError::UnknownTable`] when the resolved table is not in
    /// `dataset`. Nothing is rendered in either case.
    pub fn on_data_arrived(
        &mut self,
        mut dataset: Dataset,
        handle: SourceHandle,
    ) -> Result<(), SheetError> {
        let name = self
            .sheet_name
            .clone()
            .or_else(|| handle.first_table_name().map(str::to_owned))
            .ok_or_else(|| SheetError::NoTables {
                key: handle.key().to_owned(),
            })?;
        let table = dataset
            .take_table(&name)
            .ok_or_else(|| SheetError::UnknownTable {
                name: name.clone(),
                key: handle.key().to_owned(),
            })?;
        let options = &self.point_options;
        self.points = table
            .into_rows()
            .into_iter()
            .map(|row| Point::new(row, Arc::clone(options)))
            .collect();
        debug!(
            "sheet {:?}: table {name:?} delivered {} rows",
            self.key,
            self.points.len()
        );
        self.handle = Some(handle);
        self.render();
        Ok(())
    }

    /// Initialise the provider, draw every point and run the completion
    /// callback.
    pub fn render(&mut self) {
        self.provider.initialize(&self.element);
        self.provider.draw_points(&self.points);
        self.render_count += 1;
        if let Some(mut callback) = self.on_complete.take() {
            callback(&*self, self.handle.as_ref());
            self.on_complete = Some(callback);
        }
    }

    /// Every point built from the last delivery, valid or not.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Points with usable coordinates.
    pub fn valid_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|point| point.is_valid())
    }

    /// The provider drawing this sheet.
    #[must_use]
    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Handle from the last delivery.
    #[must_use]
    pub const fn handle(&self) -> Option<&SourceHandle> {
        self.handle.as_ref()
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

    /// Configured table name, if any.
    #[must_use]
    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    /// Number of completed renders.
    #[must_use]
    pub const fn render_count(&self) -> usize {
        self.render_count
    }
}

fn deliver(weak: &Weak<RefCell<Sheet>>, dataset: Dataset, handle: SourceHandle) {
    let Some(shared) = weak.upgrade() else {
        debug!("data for {:?} arrived after its sheet was dropped", handle.key());
        return;
    };
    let Ok(mut sheet) = shared.try_borrow_mut() else {
        error!("sheet {:?} is busy; delivery dropped", handle.key());
        return;
    };
    if let Err(err) = sheet.on_data_arrived(dataset, handle) {
        error!("sheet {:?}: {err}", sheet.key);
    }
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("key", &self.key)
            .field("element", &self.element)
            .field("sheet_name", &self.sheet_name)
            .field("provider", &self.provider)
            .field("points", &self.points.len())
            .field("handle", &self.handle)
            .field("render_count", &self.render_count)
            .finish_non_exhaustive()
    }
}
