#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use stream_importer::{CsvCursor, NumberLocale};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Cursor over an in-memory string using the invariant locale with `;` as
/// list separator.
pub fn semicolon_cursor(data: &str) -> CsvCursor {
    locale_cursor(data, NumberLocale::invariant().with_list_separator(';'))
}

pub fn locale_cursor(data: &str, locale: NumberLocale) -> CsvCursor {
    let source = stream_importer::io_utils::LineSource::from_buf_read(Cursor::new(
        data.to_string().into_bytes(),
    ));
    CsvCursor::with_locale(source, locale)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}
