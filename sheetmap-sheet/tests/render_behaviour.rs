//! Behavioural coverage for the delivery and render lifecycle.
#![cfg(all(feature = "backend-google", feature = "backend-leaflet"))]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sheetmap_core::{MapElement, Row, SharedMap, share_map};
use sheetmap_providers::{GoogleMap, GoogleMapOptions, LeafletMap};
use sheetmap_sheet::{
    Backend, Dataset, InjectedMap, SharedSheet, Sheet, SheetConfig, SheetError, StaticSource,
};

#[derive(Default)]
struct RenderWorld {
    map: RefCell<Option<SharedMap<GoogleMap>>>,
    config: RefCell<Option<SheetConfig>>,
    source: RefCell<Option<StaticSource>>,
    sheet: RefCell<Option<SharedSheet>>,
    completions: Rc<Cell<usize>>,
    markers_at_completion: Rc<Cell<Option<usize>>>,
}

impl RenderWorld {
    fn google_config(&self) -> SheetConfig {
        let map = share_map(GoogleMap::new(
            MapElement::new("map"),
            GoogleMapOptions::default(),
        ));
        *self.map.borrow_mut() = Some(Rc::clone(&map));
        let completions = Rc::clone(&self.completions);
        let observed = Rc::clone(&self.markers_at_completion);
        let watched = Rc::clone(&map);
        SheetConfig::new("cafes", MapElement::new("map"))
            .with_backend(Backend::Google)
            .with_title_field("name")
            .with_map(InjectedMap::Google(map))
            .on_complete(move |_, _| {
                completions.set(completions.get() + 1);
                observed.set(Some(watched.borrow().markers().len()));
            })
    }

    fn map(&self) -> SharedMap<GoogleMap> {
        self.map
            .borrow()
            .as_ref()
            .map(Rc::clone)
            .unwrap_or_else(|| panic!("map must be injected"))
    }

    fn assert_single_marker(&self, title: &str) {
        let map = self.map();
        let scene = map.borrow();
        let titles: Vec<_> = scene
            .markers()
            .iter()
            .map(|placed| placed.item.title.as_deref())
            .collect();
        assert_eq!(titles, vec![Some(title)]);
        assert_eq!(scene.viewport().fit_count, 1);
    }

    fn sheet(&self) -> SharedSheet {
        self.sheet
            .borrow()
            .as_ref()
            .map(Rc::clone)
            .unwrap_or_else(|| panic!("sheet must be connected"))
    }
}

#[fixture]
fn world() -> RenderWorld {
    RenderWorld::default()
}

#[given("a google sheet drawing onto an injected map for the first table")]
fn google_sheet(#[from(world)] world: &RenderWorld) {
    let config = world.google_config();
    *world.config.borrow_mut() = Some(config);
}

#[given("a google sheet drawing onto an injected map for the table Parks")]
fn google_sheet_for_parks(#[from(world)] world: &RenderWorld) {
    let config = world.google_config().with_sheet_name("Parks");
    *world.config.borrow_mut() = Some(config);
}

#[given("a data source holding rows A at 1,2 and B at x,2")]
fn deferred_source(#[from(world)] world: &RenderWorld) {
    let dataset = Dataset::new()
        .with_table(
            "Cafes",
            vec![
                Row::normalized([("lat", "1"), ("lng", "2"), ("name", "A")]),
                Row::normalized([("lat", "x"), ("lng", "2"), ("name", "B")]),
            ],
        )
        .with_table(
            "Parks",
            vec![Row::normalized([("lat", "3"), ("lng", "4"), ("name", "P")])],
        );
    let mut source = StaticSource::new(dataset);
    let config = world
        .config
        .borrow_mut()
        .take()
        .unwrap_or_else(|| panic!("sheet must be configured first"));
    let sheet = Sheet::connect(config, &mut source)
        .unwrap_or_else(|err| panic!("sheet should build: {err}"));
    *world.sheet.borrow_mut() = Some(sheet);
    *world.source.borrow_mut() = Some(source);
}

#[when("the data source delivers")]
fn deliver(#[from(world)] world: &RenderWorld) {
    let delivered = world
        .source
        .borrow_mut()
        .as_mut()
        .is_some_and(StaticSource::deliver);
    assert!(delivered, "the source should have a pending request");
}

#[then("the sheet holds 2 points")]
fn both_rows_kept(#[from(world)] world: &RenderWorld) {
    assert_eq!(world.sheet().borrow().points().len(), 2);
}

#[then("the sheet holds 1 point")]
fn one_row_kept(#[from(world)] world: &RenderWorld) {
    assert_eq!(world.sheet().borrow().points().len(), 1);
}

#[then("the map shows exactly 1 marker titled A")]
fn marker_a(#[from(world)] world: &RenderWorld) {
    world.assert_single_marker("A");
}

#[then("the map shows exactly 1 marker titled P")]
fn marker_p(#[from(world)] world: &RenderWorld) {
    world.assert_single_marker("P");
}

#[then("the completion callback fired once after drawing")]
fn completed_once(#[from(world)] world: &RenderWorld) {
    assert_eq!(world.completions.get(), 1);
    assert_eq!(world.markers_at_completion.get(), Some(1));
    assert_eq!(world.sheet().borrow().render_count(), 1);
}

#[given("a leaflet map injected into a google sheet")]
fn mismatched_map(#[from(world)] world: &RenderWorld) {
    let map = share_map(LeafletMap::new(MapElement::new("map")));
    let config = SheetConfig::new("cafes", MapElement::new("map"))
        .with_backend(Backend::Google)
        .with_map(InjectedMap::Leaflet(map));
    *world.config.borrow_mut() = Some(config);
}

#[then("building the sheet fails with a backend mismatch")]
fn mismatch_fails(#[from(world)] world: &RenderWorld) {
    let config = world
        .config
        .borrow_mut()
        .take()
        .unwrap_or_else(|| panic!("sheet must be configured first"));
    match Sheet::new(config) {
        Err(SheetError::MapBackendMismatch { backend, map }) => {
            assert_eq!(backend, Backend::Google);
            assert_eq!(map, Backend::Leaflet);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("a mismatched map must be rejected"),
    }
}

#[scenario(path = "tests/features/render_lifecycle.feature", index = 0)]
fn renders_valid_rows(#[from(world)] world: RenderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/render_lifecycle.feature", index = 1)]
fn renders_named_table(#[from(world)] world: RenderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/render_lifecycle.feature", index = 2)]
fn rejects_mismatched_map(#[from(world)] world: RenderWorld) {
    let _ = world;
}
