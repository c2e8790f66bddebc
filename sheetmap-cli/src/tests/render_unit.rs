//! Focused unit tests covering render CLI configuration and dataset loading.

use super::helpers::{CAFES_DATASET, Workspace, write_utf8};
use super::*;
use rstest::{fixture, rstest};
use serde_json::json;
use sheetmap_core::Value;
use sheetmap_sheet::{Backend, SheetError};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn args_for(dataset: &Workspace) -> RenderArgs {
    RenderArgs {
        dataset_path: Some(dataset.path("cafes.json")),
        ..RenderArgs::default()
    }
}

#[rstest]
fn converting_render_without_dataset_errors() {
    let err = RenderConfig::try_from(RenderArgs::default()).expect_err("dataset is required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_RENDER_DATASET);
            assert_eq!(env, ENV_RENDER_DATASET);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn render_config_applies_defaults(workspace: Workspace) {
    let config = RenderConfig::try_from(args_for(&workspace)).expect("config should build");
    assert_eq!(config.key, "cafes");
    assert_eq!(config.backend, Backend::Leaflet);
    assert_eq!(config.element, "map");
    assert_eq!(config.sheet_name, None);
    assert_eq!(config.fields, None);
    assert_eq!(config.output, None);
}

#[rstest]
fn render_config_parses_backend_and_field_list(workspace: Workspace) {
    let args = RenderArgs {
        backend: Some(" MapQuest ".to_owned()),
        fields: Some("Name, Opening hours,,".to_owned()),
        key: Some("cafes-2024".to_owned()),
        ..args_for(&workspace)
    };
    let config = RenderConfig::try_from(args).expect("config should build");
    assert_eq!(config.backend, Backend::MapQuest);
    assert_eq!(config.key, "cafes-2024");
    assert_eq!(
        config.fields,
        Some(vec!["Name".to_owned(), "Opening hours".to_owned()])
    );
}

#[rstest]
fn render_config_rejects_unknown_backend(workspace: Workspace) {
    let args = RenderArgs {
        backend: Some("bing".to_owned()),
        ..args_for(&workspace)
    };
    let err = RenderConfig::try_from(args).expect_err("unknown backend");
    match err {
        CliError::Sheet(SheetError::UnknownBackend { name }) => assert_eq!(name, "bing"),
        other => panic!("expected UnknownBackend, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_dataset(workspace: Workspace) {
    let config = RenderConfig::try_from(args_for(&workspace)).expect("config should build");
    let err = config.validate_sources().expect_err("dataset is absent");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_RENDER_DATASET);
            assert_eq!(path, workspace.path("cafes.json"));
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_directory_map_options(workspace: Workspace) {
    workspace.write("cafes.json", CAFES_DATASET);
    let options_dir = workspace.path("options");
    std::fs::create_dir(&options_dir).expect("options directory");
    let args = RenderArgs {
        map_options: Some(options_dir.clone()),
        ..args_for(&workspace)
    };
    let config = RenderConfig::try_from(args).expect("config should build");

    let err = config
        .validate_sources()
        .expect_err("directory should fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_RENDER_MAP_OPTIONS);
            assert_eq!(path, options_dir);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_dataset_keeps_table_order_and_normalises_headers(workspace: Workspace) {
    let path = workspace.write("cafes.json", CAFES_DATASET);
    let dataset = load_dataset(&path).expect("dataset should load");

    assert_eq!(dataset.table_names().collect::<Vec<_>>(), ["Cafes", "Parks"]);
    let cafes = dataset.table("Cafes").expect("cafes table");
    let first = cafes.rows().first().expect("first row");
    assert_eq!(first.get("name"), Some(&Value::from("Nero")));
    assert_eq!(first.get("latitude"), Some(&Value::Number(51.5)));
    assert_eq!(first.get("iconurl"), Some(&Value::from("")));
}

#[rstest]
#[case::top_level_array("[]")]
#[case::table_not_array(r#"{ "Cafes": { "Name": "Nero" } }"#)]
#[case::row_not_object(r#"{ "Cafes": [1] }"#)]
#[case::nested_cell(r#"{ "Cafes": [{ "Name": ["Nero"] }] }"#)]
fn load_dataset_rejects_malformed_shapes(workspace: Workspace, #[case] payload: &str) {
    let path = workspace.write("cafes.json", payload);
    let err = load_dataset(&path).expect_err("shape should be rejected");
    match err {
        CliError::InvalidDataset { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected InvalidDataset, found {other:?}"),
    }
}

#[rstest]
fn load_dataset_rejects_invalid_json(workspace: Workspace) {
    let path = workspace.path("cafes.json");
    write_utf8(&path, b"{ not valid json");
    let err = load_dataset(&path).expect_err("invalid json should error");
    match err {
        CliError::ParseDataset { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected ParseDataset, found {other:?}"),
    }
}

#[rstest]
fn render_writes_one_marker_per_valid_row(workspace: Workspace) {
    workspace.write("cafes.json", CAFES_DATASET);
    let args = RenderArgs {
        backend: Some("google".to_owned()),
        title_field: Some("Name".to_owned()),
        ..args_for(&workspace)
    };
    let mut stdout = Vec::new();
    run_render_with(args, &mut stdout).expect("render should succeed");

    let report: serde_json::Value =
        serde_json::from_slice(&stdout).expect("output should be JSON");
    assert_eq!(report["backend"], json!("google"));
    assert_eq!(report["table"], json!("Cafes"));
    assert_eq!(report["points"], json!(2));
    assert_eq!(report["drawn"], json!(1));
    let markers = report["map"]["markers"].as_array().expect("markers array");
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["title"], json!("Nero"));
}

#[rstest]
fn render_applies_map_options_and_writes_output_file(workspace: Workspace) {
    workspace.write("cafes.json", CAFES_DATASET);
    let options = workspace.write(
        "options.json",
        r#"{ "leaflet": { "type": "satellite" } }"#,
    );
    let output = workspace.path("out/scene.json");
    let args = RenderArgs {
        sheet: Some("Parks".to_owned()),
        map_options: Some(options),
        output: Some(output.clone()),
        ..args_for(&workspace)
    };
    let mut stdout = Vec::new();
    run_render_with(args, &mut stdout).expect("render should succeed");
    assert!(stdout.is_empty());

    let written = sheetmap_fs::read_to_string(&output).expect("scene written");
    let report: serde_json::Value = serde_json::from_str(&written).expect("scene JSON");
    assert_eq!(report["table"], json!("Parks"));
    assert_eq!(report["drawn"], json!(1));
    let template = report["map"]["tile_layers"][0]["url_template"]
        .as_str()
        .expect("tile template");
    assert!(template.contains("satellite"), "unexpected template {template}");
}

#[rstest]
fn render_reports_unknown_table(workspace: Workspace) {
    workspace.write("cafes.json", CAFES_DATASET);
    let args = RenderArgs {
        sheet: Some("Museums".to_owned()),
        ..args_for(&workspace)
    };
    let err = run_render_with(args, &mut Vec::new()).expect_err("table is absent");
    match err {
        CliError::Sheet(SheetError::UnknownTable { name, key }) => {
            assert_eq!(name, "Museums");
            assert_eq!(key, "cafes");
        }
        other => panic!("expected UnknownTable, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "dataset_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence(workspace: Workspace) {
    use ortho_config::MergeComposer;

    let env_dataset = workspace.path("from-env.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "backend": "mapbox",
            "element": "file-map",
        }),
        None,
    );
    composer.push_environment(json!({
        "dataset_path": env_dataset.as_str(),
        "element": "env-map",
    }));
    composer.push_cli(json!({
        "element": "cli-map",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.dataset_path, env_dataset);
    assert_eq!(config.backend, Backend::MapBox);
    assert_eq!(config.element, "cli-map");
    assert_eq!(config.key, "from-env");
}
