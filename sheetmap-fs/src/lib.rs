//! Capability-scoped file access for the `sheetmap` command line.
//!
//! Paths given on the command line are resolved once against an ambient
//! directory capability; every read and write then goes through that
//! directory handle.
#![forbid(unsafe_code)]

use std::io;
use std::path::{Component, MAIN_SEPARATOR};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Read a whole UTF-8 text file.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent(path)?;
    dir.read_to_string(name.as_str())
}

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent(path)?;
    dir.write(name.as_str(), contents)
}

/// Return whether `path` names an existing regular file.
///
/// Directories yield `Ok(false)`. A missing file or parent directory is an
/// [`io::ErrorKind::NotFound`] error.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (base, relative) = anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Open the directory holding `path` and return it with the file name.
fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let (base, relative) = anchor(parent)?;
    let dir = if relative.as_str().is_empty() {
        base
    } else {
        base.open_dir(&relative)?
    };
    Ok((dir, name))
}

/// Split `dir_path` into an ambient root capability and the path below it.
///
/// Absolute paths anchor at their root (or Windows prefix); relative paths
/// anchor at the current directory.
fn anchor(dir_path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = dir_path.as_std_path();
    let root = match std_path.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(format!("{prefix_str}{MAIN_SEPARATOR}"))
        }
        Some(Component::RootDir) => Utf8PathBuf::from(MAIN_SEPARATOR.to_string()),
        _ => Utf8PathBuf::from("."),
    };
    let relative = if root.as_str() == "." {
        dir_path.to_path_buf()
    } else {
        dir_path
            .strip_prefix(&root)
            .map_err(|_| io::Error::other(format!("cannot split {dir_path} at {root}")))?
            .to_path_buf()
    };
    let base = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
    Ok((base, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temporary directory")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir")
    }

    #[rstest]
    fn writes_into_new_directories(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("out/nested/scene.json");
        write_file(&target, b"{}").expect("write");
        assert_eq!(read_to_string(&target).expect("read back"), "{}");
        assert!(file_is_file(&target).expect("metadata"));
    }

    #[rstest]
    fn missing_file_reports_not_found(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("absent.json");
        let err = file_is_file(&target).expect_err("file is absent");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn directory_is_not_a_file(temp_dir: TempDir) {
        let root = utf8(&temp_dir);
        std::fs::create_dir(root.join("data")).expect("mkdir");
        assert!(!file_is_file(&root.join("data")).expect("metadata"));
    }

    #[rstest]
    fn missing_parent_reports_not_found(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("nowhere/data.json");
        let err = file_is_file(&target).expect_err("parent is absent");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn bare_file_name_needs_no_parent() {
        ensure_parent_dir(Utf8Path::new("scene.json")).expect("nothing to create");
    }
}
