//! Render command implementation for the sheetmap CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{debug, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sheetmap_core::{MapElement, MarkerStyle, Row, Value, share_map};
use sheetmap_providers::mapbox::{Control, Layer};
use sheetmap_providers::{
    GoogleMap, GoogleMapOptions, LeafletMap, LeafletTileOptions, MapBoxOptions, MapQuestOptions,
    TileMap, VectorMap,
};
use sheetmap_sheet::{
    Backend, Dataset, InjectedMap, MapOptionOverrides, Sheet, SheetConfig, SheetError,
    SourceHandle, Table,
};
use std::io::Write;

use crate::{
    ARG_RENDER_BACKEND, ARG_RENDER_DATASET, ARG_RENDER_ELEMENT, ARG_RENDER_FIELDS,
    ARG_RENDER_ICON_URL, ARG_RENDER_KEY, ARG_RENDER_MAP_OPTIONS, ARG_RENDER_OUTPUT,
    ARG_RENDER_SHEET, ARG_RENDER_TITLE_FIELD, CliError, ENV_RENDER_DATASET,
};

const DEFAULT_ELEMENT: &str = "map";
const DEFAULT_KEY: &str = "sheet";

/// CLI arguments for the `render` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a JSON dataset (an object mapping table names to \
                 arrays of row objects), draw one table with the selected \
                 map backend and print the resulting map scene as JSON.",
    about = "Render a dataset onto a map scene"
)]
#[ortho_config(prefix = "SHEETMAP")]
pub(crate) struct RenderArgs {
    /// Path to the JSON dataset.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) dataset_path: Option<Utf8PathBuf>,
    /// Data source key reported to completion handlers (defaults to the file stem).
    #[arg(long = ARG_RENDER_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) key: Option<String>,
    /// Map backend: google, leaflet, mapquest or mapbox.
    #[arg(long = ARG_RENDER_BACKEND, value_name = "name")]
    #[serde(default)]
    pub(crate) backend: Option<String>,
    /// Table to draw instead of the first one.
    #[arg(long = ARG_RENDER_SHEET, value_name = "name")]
    #[serde(default)]
    pub(crate) sheet: Option<String>,
    /// Comma-separated fields listed in generated popups.
    #[arg(long = ARG_RENDER_FIELDS, value_name = "list")]
    #[serde(default)]
    pub(crate) fields: Option<String>,
    /// Field used for marker titles.
    #[arg(long = ARG_RENDER_TITLE_FIELD, value_name = "field")]
    #[serde(default)]
    pub(crate) title_field: Option<String>,
    /// Icon URL applied to every marker without its own.
    #[arg(long = ARG_RENDER_ICON_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) icon_url: Option<String>,
    /// Host element identifier.
    #[arg(long = ARG_RENDER_ELEMENT, value_name = "id")]
    #[serde(default)]
    pub(crate) element: Option<String>,
    /// JSON file with per-backend map option overrides.
    #[arg(long = ARG_RENDER_MAP_OPTIONS, value_name = "path")]
    #[serde(default)]
    pub(crate) map_options: Option<Utf8PathBuf>,
    /// Write the scene here instead of stdout.
    #[arg(long = ARG_RENDER_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RenderArgs {
    pub(crate) fn into_config(self) -> Result<RenderConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RenderConfig::try_from(merged)
    }
}

/// Resolved `render` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderConfig {
    pub(crate) dataset_path: Utf8PathBuf,
    pub(crate) key: String,
    pub(crate) backend: Backend,
    pub(crate) sheet_name: Option<String>,
    pub(crate) fields: Option<Vec<String>>,
    pub(crate) title_field: Option<String>,
    pub(crate) icon_url: Option<String>,
    pub(crate) element: String,
    pub(crate) map_options: Option<Utf8PathBuf>,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RenderConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.dataset_path, ARG_RENDER_DATASET)?;
        if let Some(path) = &self.map_options {
            Self::require_existing(path, ARG_RENDER_MAP_OPTIONS)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match sheetmap_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn sheet_config(
        &self,
        element: MapElement,
        overrides: MapOptionOverrides,
        map: InjectedMap,
    ) -> SheetConfig {
        let mut config = SheetConfig::new(self.key.clone(), element)
            .with_backend(self.backend)
            .with_map_options(overrides)
            .with_map(map);
        if let Some(name) = &self.sheet_name {
            config = config.with_sheet_name(name.clone());
        }
        if let Some(fields) = &self.fields {
            config = config.with_fields(fields.iter().cloned());
        }
        if let Some(field) = &self.title_field {
            config = config.with_title_field(field.clone());
        }
        if let Some(url) = &self.icon_url {
            config = config.with_marker_style(MarkerStyle::default().with_icon_url(url.clone()));
        }
        config
    }
}

impl TryFrom<RenderArgs> for RenderConfig {
    type Error = CliError;

    fn try_from(args: RenderArgs) -> Result<Self, Self::Error> {
        let dataset_path = args.dataset_path.ok_or(CliError::MissingArgument {
            field: ARG_RENDER_DATASET,
            env: ENV_RENDER_DATASET,
        })?;

        let backend = args
            .backend
            .as_deref()
            .map(str::parse::<Backend>)
            .transpose()
            .map_err(|err| CliError::Sheet(SheetError::from(err)))?
            .unwrap_or_default();

        let key = args.key.unwrap_or_else(|| {
            dataset_path
                .file_stem()
                .unwrap_or(DEFAULT_KEY)
                .to_owned()
        });

        let fields = args.fields.map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_owned)
                .collect()
        });

        Ok(Self {
            dataset_path,
            key,
            backend,
            sheet_name: args.sheet,
            fields,
            title_field: args.title_field,
            icon_url: args.icon_url,
            element: args.element.unwrap_or_else(|| DEFAULT_ELEMENT.to_owned()),
            map_options: args.map_options,
            output: args.output,
        })
    }
}

/// Summary written by the `render` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RenderReport {
    /// Backend that drew the scene.
    pub(crate) backend: Backend,
    /// Data source key.
    pub(crate) key: String,
    /// Table that was drawn.
    pub(crate) table: Option<String>,
    /// Rows turned into points.
    pub(crate) points: usize,
    /// Points with usable coordinates.
    pub(crate) drawn: usize,
    /// The backend's map scene after drawing.
    pub(crate) map: JsonValue,
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_render_with(args, &mut stdout)
}

pub(crate) fn run_render_with(args: RenderArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_render_config(args)?;
    let report = execute_render(&config)?;
    let mut payload =
        serde_json::to_string_pretty(&report).map_err(CliError::SerialiseScene)?;
    payload.push('\n');
    match &config.output {
        Some(path) => {
            sheetmap_fs::write_file(path, payload.as_bytes()).map_err(|source| {
                CliError::WriteOutputFile {
                    path: path.clone(),
                    source,
                }
            })?;
            info!("wrote {} scene to {path}", report.backend);
            Ok(())
        }
        None => writer
            .write_all(payload.as_bytes())
            .map_err(CliError::WriteOutput),
    }
}

fn resolve_render_config(args: RenderArgs) -> Result<RenderConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_render(config: &RenderConfig) -> Result<RenderReport, CliError> {
    let dataset = load_dataset(&config.dataset_path)?;
    let overrides = match &config.map_options {
        Some(path) => load_map_options(path)?,
        None => MapOptionOverrides::default(),
    };
    let element = MapElement::new(config.element.clone());
    let map = host_map(config.backend, element.clone(), &overrides);

    let mut sheet = Sheet::new(config.sheet_config(element, overrides, map.clone()))?;
    let handle = SourceHandle::describing(config.key.clone(), &dataset);
    sheet.on_data_arrived(dataset, handle)?;

    let table = config.sheet_name.clone().or_else(|| {
        sheet
            .handle()
            .and_then(SourceHandle::first_table_name)
            .map(str::to_owned)
    });
    let drawn = sheet.valid_points().count();
    debug!(
        "render: {} of {} rows drawn with {}",
        drawn,
        sheet.points().len(),
        config.backend
    );
    Ok(RenderReport {
        backend: config.backend,
        key: config.key.clone(),
        table,
        points: sheet.points().len(),
        drawn,
        map: scene_json(&map).map_err(CliError::SerialiseScene)?,
    })
}

/// Loads a dataset: a JSON object mapping table names to arrays of row
/// objects. Table order follows the document.
pub(crate) fn load_dataset(path: &Utf8Path) -> Result<Dataset, CliError> {
    let text = sheetmap_fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        field: ARG_RENDER_DATASET,
        path: path.to_path_buf(),
        source,
    })?;
    let document: JsonValue =
        serde_json::from_str(&text).map_err(|source| CliError::ParseDataset {
            path: path.to_path_buf(),
            source,
        })?;
    let JsonValue::Object(tables) = document else {
        return Err(invalid_dataset(path, "top level is not an object".to_owned()));
    };
    tables
        .into_iter()
        .map(|(name, rows)| table_from_json(path, name, rows))
        .collect()
}

fn table_from_json(path: &Utf8Path, name: String, rows: JsonValue) -> Result<Table, CliError> {
    let JsonValue::Array(entries) = rows else {
        return Err(invalid_dataset(
            path,
            format!("table {name:?} is not an array of rows"),
        ));
    };
    let rows = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| row_from_json(path, &name, index, entry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table::new(name, rows))
}

fn row_from_json(
    path: &Utf8Path,
    table: &str,
    index: usize,
    entry: JsonValue,
) -> Result<Row, CliError> {
    let JsonValue::Object(cells) = entry else {
        return Err(invalid_dataset(
            path,
            format!("row {index} of table {table:?} is not an object"),
        ));
    };
    let mut pairs = Vec::with_capacity(cells.len());
    for (field, cell) in cells {
        let Some(value) = cell_from_json(cell) else {
            return Err(invalid_dataset(
                path,
                format!("field {field:?} in row {index} of table {table:?} is not a scalar"),
            ));
        };
        pairs.push((field, value));
    }
    Ok(Row::normalized(pairs))
}

fn cell_from_json(cell: JsonValue) -> Option<Value> {
    match cell {
        JsonValue::Null => Some(Value::Null),
        JsonValue::Bool(flag) => Some(Value::Bool(flag)),
        JsonValue::Number(number) => number.as_f64().map(Value::Number),
        JsonValue::String(text) => Some(Value::Text(text)),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn invalid_dataset(path: &Utf8Path, reason: String) -> CliError {
    CliError::InvalidDataset {
        path: path.to_path_buf(),
        reason,
    }
}

fn load_map_options(path: &Utf8Path) -> Result<MapOptionOverrides, CliError> {
    let text = sheetmap_fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        field: ARG_RENDER_MAP_OPTIONS,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseMapOptions {
        path: path.to_path_buf(),
        source,
    })
}

/// Prepare the map the way a host page would before handing it to a sheet:
/// base tiles and controls in place, no markers.
fn host_map(backend: Backend, element: MapElement, overrides: &MapOptionOverrides) -> InjectedMap {
    match backend {
        Backend::Google => {
            let options = GoogleMapOptions::default().with_overrides(&overrides.google);
            InjectedMap::Google(share_map(GoogleMap::new(element, options)))
        }
        Backend::Leaflet => {
            let options = LeafletTileOptions::default().with_overrides(&overrides.leaflet);
            let mut map = LeafletMap::new(element);
            map.add_tile_layer(options.tile_layer());
            InjectedMap::Leaflet(share_map(map))
        }
        Backend::MapQuest => {
            let options = MapQuestOptions::default().with_overrides(&overrides.mapquest);
            InjectedMap::MapQuest(share_map(TileMap::new(element, options)))
        }
        Backend::MapBox => {
            let options = MapBoxOptions::default().with_overrides(&overrides.mapbox);
            let mut map = VectorMap::new(element);
            map.add_layer(Layer::Tiles {
                map_id: options.map_id,
            });
            map.add_control(Control::Zoomer);
            map.add_control(Control::Zoombox);
            InjectedMap::MapBox(share_map(map))
        }
    }
}

fn scene_json(map: &InjectedMap) -> Result<JsonValue, serde_json::Error> {
    match map {
        InjectedMap::Google(shared) => serde_json::to_value(&*shared.borrow()),
        InjectedMap::Leaflet(shared) => serde_json::to_value(&*shared.borrow()),
        InjectedMap::MapQuest(shared) => serde_json::to_value(&*shared.borrow()),
        InjectedMap::MapBox(shared) => serde_json::to_value(&*shared.borrow()),
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RenderConfig, CliError> {
    let merged = RenderArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RenderConfig::try_from(merged)
}
