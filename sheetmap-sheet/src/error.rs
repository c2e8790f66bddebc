//! Errors raised while configuring or feeding a [`Sheet`](crate::Sheet).

use thiserror::Error;

use crate::{Backend, TemplateError};

/// Errors surfaced by [`Sheet`](crate::Sheet) construction and data delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// The backend selector did not name a known backend.
    #[error("unknown map backend {name:?}")]
    UnknownBackend {
        /// Selector as supplied.
        name: String,
    },
    /// The selected backend was compiled out of this build.
    #[error("map backend {backend} is not available; enable the `backend-{backend}` feature")]
    MissingBackend {
        /// Selected backend.
        backend: Backend,
    },
    /// The injected map belongs to a different backend.
    #[error("injected {map} map cannot be drawn by the {backend} backend")]
    MapBackendMismatch {
        /// Selected backend.
        backend: Backend,
        /// Backend the injected map was built for.
        map: Backend,
    },
    /// A named popup template was configured without a compiler.
    #[error("popup template {name:?} needs a template compiler")]
    TemplateCompilerMissing {
        /// Template identifier.
        name: String,
    },
    /// The template compiler rejected the named template.
    #[error("failed to compile popup template")]
    Template(#[from] TemplateError),
    /// The configured table is not present in the delivered dataset.
    #[error("table {name:?} not found in data source {key:?}")]
    UnknownTable {
        /// Requested table.
        name: String,
        /// Data source key.
        key: String,
    },
    /// The delivered dataset has no tables to fall back on.
    #[error("data source {key:?} delivered no tables")]
    NoTables {
        /// Data source key.
        key: String,
    },
}
