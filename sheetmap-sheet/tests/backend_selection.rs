//! Every compiled-in backend renders the same delivery.

use std::cell::Cell;
use std::rc::Rc;

use rstest::rstest;
use sheetmap_core::{MapElement, Row};
use sheetmap_sheet::{Backend, Dataset, Sheet, SheetConfig, StaticSource};

fn dataset() -> Dataset {
    Dataset::new().with_table(
        "Sheet1",
        vec![
            Row::normalized([("Lat", "1"), ("Lng", "2"), ("Name", "A")]),
            Row::normalized([("Lat", "x"), ("Lng", "2"), ("Name", "B")]),
        ],
    )
}

#[rstest]
#[case(Backend::Google)]
#[case(Backend::Leaflet)]
#[case(Backend::MapQuest)]
#[case(Backend::MapBox)]
fn renders_through_selected_backend(#[case] backend: Backend) {
    if !backend.is_available() {
        return;
    }
    let completions = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&completions);
    let config = SheetConfig::new("sheet-key", MapElement::new("map"))
        .with_backend(backend)
        .with_fields(["Name"])
        .on_complete(move |_, handle| {
            assert_eq!(handle.map(|found| found.key()), Some("sheet-key"));
            counter.set(counter.get() + 1);
        });
    let mut source = StaticSource::immediate(dataset());
    let sheet = Sheet::connect(config, &mut source)
        .unwrap_or_else(|err| panic!("{backend} sheet should build: {err}"));

    let drawn = sheet.borrow();
    assert_eq!(drawn.provider().backend_name(), backend.as_str());
    assert_eq!(drawn.points().len(), 2);
    assert_eq!(drawn.valid_points().count(), 1);
    assert_eq!(completions.get(), 1);
}
