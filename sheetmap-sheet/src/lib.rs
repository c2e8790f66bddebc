//! Orchestration from spreadsheet delivery to drawn map.
//!
//! Responsibilities:
//! - Hold the typed [`SheetConfig`] and build the selected [`Backend`]'s
//!   provider when a [`Sheet`] is created.
//! - Register a single-fire callback with a [`DataSource`] and turn the
//!   delivered table into [`Point`](sheetmap_core::Point)s.
//! - Run one render cycle per delivery: initialise, draw, then notify.
//!
//! Boundaries:
//! - Fetching data and compiling template syntax belong to collaborators
//!   behind [`DataSource`] and [`TemplateCompiler`].
//! - Drawing rules live in the providers.
//!
//! Invariants:
//! - Configuration errors surface from construction, never from rendering.
//! - Points are built before `initialize`, which runs before `draw_points`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod config;
mod error;
mod sheet;
mod source;
mod template;

pub use backend::{Backend, BackendParseError, InjectedMap, MapOptionOverrides, build_provider};
pub use config::{CompletionFn, SheetConfig};
pub use error::SheetError;
pub use sheet::{SharedSheet, Sheet};
pub use source::{DataSource, Dataset, OnReady, SourceHandle, StaticSource, Table};
pub use template::{PopupTemplate, SharedCompiler, TemplateCompiler, TemplateError};
