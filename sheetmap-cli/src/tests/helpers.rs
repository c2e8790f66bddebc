//! Test helpers for staging datasets on disk.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Two cafes; the second has no usable latitude.
pub(super) const CAFES_DATASET: &str = r#"{
  "Cafes": [
    { "Name": "Nero", "Latitude": 51.5, "Longitude": -0.12, "Icon URL": "" },
    { "Name": "Ghost", "Latitude": "n/a", "Longitude": -0.13 }
  ],
  "Parks": [
    { "Name": "Hyde", "Latitude": "51.507", "Longitude": "-0.165" }
  ]
}"#;

pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    sheetmap_fs::write_file(path, contents).expect("write fixture");
}
