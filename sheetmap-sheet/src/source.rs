//! The data-source contract.
//!
//! A source is asked once for the dataset behind a key and answers once,
//! whenever it is ready, by calling the [`OnReady`] callback it was given.
//! `FnOnce` makes a second delivery impossible.

use std::fmt;

use log::debug;
use sheetmap_core::Row;

/// One named table of rows in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table.
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

/// Every table delivered by a source, in source order.
///
/// # Examples
/// ```
/// use sheetmap_core::Row;
/// use sheetmap_sheet::Dataset;
///
/// let dataset = Dataset::new()
///     .with_table("Cafes", vec![Row::normalized([("Name", "Nero")])])
///     .with_table("Parks", Vec::new());
/// assert_eq!(dataset.table_names().collect::<Vec<_>>(), ["Cafes", "Parks"]);
/// assert_eq!(dataset.table("Cafes").map(|t| t.rows().len()), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    tables: Vec<Table>,
}

impl Dataset {
    /// An empty dataset.
    #[must_use]
    pub const fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Append a table. Lookups by name find the first match.
    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.push_table(Table::new(name, rows));
        self
    }

    /// Append a table.
    pub fn push_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Look a table up by exact name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Remove and return a table.
    pub fn take_table(&mut self, name: &str) -> Option<Table> {
        let index = self.tables.iter().position(|table| table.name == name)?;
        Some(self.tables.remove(index))
    }

    /// Table names in source order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(Table::name)
    }

    /// Tables in source order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Whether no tables were delivered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for Dataset {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

/// Metadata a source hands back alongside the data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceHandle {
    key: String,
    table_names: Vec<String>,
}

impl SourceHandle {
    /// Create a handle for `key` describing `table_names`.
    pub fn new(key: impl Into<String>, table_names: Vec<String>) -> Self {
        Self {
            key: key.into(),
            table_names,
        }
    }

    /// Handle describing every table of `dataset`.
    pub fn describing(key: impl Into<String>, dataset: &Dataset) -> Self {
        Self::new(key, dataset.table_names().map(str::to_owned).collect())
    }

    /// Source key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Available table names in source order.
    #[must_use]
    pub fn table_names(&self) -> &[String] {
        &self.table_names
    }

    /// First available table name.
    #[must_use]
    pub fn first_table_name(&self) -> Option<&str> {
        self.table_names.first().map(String::as_str)
    }
}

/// Single-fire delivery callback.
pub type OnReady = Box<dyn FnOnce(Dataset, SourceHandle)>;

/// Something that eventually delivers the dataset behind a key.
pub trait DataSource {
    /// Register `on_ready` for `key`. The source calls it at most once, either
    /// before returning or at some later point.
    fn request(&mut self, key: &str, on_ready: OnReady);
}

/// In-memory [`DataSource`].
///
/// By default the callback is held until [`StaticSource::deliver`] runs, the
/// way a network-backed source answers later. [`StaticSource::immediate`]
/// answers inside [`DataSource::request`].
pub struct StaticSource {
    dataset: Option<Dataset>,
    immediate: bool,
    pending: Option<(String, OnReady)>,
}

impl StaticSource {
    /// A source that answers when [`deliver`](Self::deliver) is called.
    #[must_use]
    pub const fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Some(dataset),
            immediate: false,
            pending: None,
        }
    }

    /// A source that answers as soon as it is asked.
    #[must_use]
    pub const fn immediate(dataset: Dataset) -> Self {
        Self {
            dataset: Some(dataset),
            immediate: true,
            pending: None,
        }
    }

    /// Whether a callback is waiting for delivery.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deliver the dataset to the waiting callback.
    ///
    /// Returns `false` when nothing was waiting or the dataset has already
    /// been handed out.
    pub fn deliver(&mut self) -> bool {
        let Some((key, on_ready)) = self.pending.take() else {
            return false;
        };
        let Some(dataset) = self.dataset.take() else {
            return false;
        };
        debug!("static source: delivering {key:?}");
        let handle = SourceHandle::describing(key, &dataset);
        on_ready(dataset, handle);
        true
    }
}

impl DataSource for StaticSource {
    fn request(&mut self, key: &str, on_ready: OnReady) {
        self.pending = Some((key.to_owned(), on_ready));
        if self.immediate {
            self.deliver();
        }
    }
}

impl fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSource")
            .field("dataset", &self.dataset)
            .field("immediate", &self.immediate)
            .field("pending", &self.pending.as_ref().map(|(key, _)| key))
            .finish()
    }
}
