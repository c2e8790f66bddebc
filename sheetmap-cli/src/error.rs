//! Error types emitted by the sheetmap CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sheetmap_sheet::SheetError;
use thiserror::Error;

/// Errors emitted by the sheetmap CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading an input file failed.
    #[error("failed to read {field} at {path:?}: {source}")]
    ReadInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Dataset JSON could not be decoded.
    #[error("failed to parse dataset JSON at {path:?}: {source}")]
    ParseDataset {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Dataset JSON decoded but does not describe tables of rows.
    #[error("dataset at {path:?} is malformed: {reason}")]
    InvalidDataset { path: Utf8PathBuf, reason: String },
    /// Map option overrides could not be decoded.
    #[error("failed to parse map options at {path:?}: {source}")]
    ParseMapOptions {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Building or feeding the sheet failed.
    #[error(transparent)]
    Sheet(#[from] SheetError),
    /// Serialising the rendered scene failed.
    #[error("failed to serialise map scene: {0}")]
    SerialiseScene(#[source] serde_json::Error),
    /// Writing the scene to the output stream failed.
    #[error("failed to write map scene: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing the scene to the output file failed.
    #[error("failed to write map scene to {path:?}: {source}")]
    WriteOutputFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
