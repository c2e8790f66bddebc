//! Command-line interface for rendering spreadsheet datasets onto map scenes.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod render;

pub use error::CliError;
use render::RenderArgs;
#[cfg(test)]
use render::{RenderConfig, config_from_layers_for_test, load_dataset, run_render_with};

pub(crate) const ARG_RENDER_DATASET: &str = "dataset";
pub(crate) const ARG_RENDER_KEY: &str = "key";
pub(crate) const ARG_RENDER_BACKEND: &str = "backend";
pub(crate) const ARG_RENDER_SHEET: &str = "sheet";
pub(crate) const ARG_RENDER_FIELDS: &str = "fields";
pub(crate) const ARG_RENDER_TITLE_FIELD: &str = "title-field";
pub(crate) const ARG_RENDER_ICON_URL: &str = "icon-url";
pub(crate) const ARG_RENDER_ELEMENT: &str = "element";
pub(crate) const ARG_RENDER_MAP_OPTIONS: &str = "map-options";
pub(crate) const ARG_RENDER_OUTPUT: &str = "output";
pub(crate) const ENV_RENDER_DATASET: &str = "SHEETMAP_CMDS_RENDER_DATASET_PATH";

/// Run the sheetmap CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Render(args) => render::run_render(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sheetmap",
    about = "Render spreadsheet rows as markers on a map",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draw a dataset with one of the map backends and print the scene.
    Render(RenderArgs),
}

#[cfg(test)]
mod tests;
