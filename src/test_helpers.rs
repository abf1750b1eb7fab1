//! Shared test utilities for the albummer test suite.
//!
//! Fixture builders create small media folders inside a [`TempDir`], and
//! lookup helpers pull blocks out of a parsed [`Document`] with a clear
//! panic message on a miss.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! media_folder(&tmp, "photos", &["a.jpg", "b.mp4"]);
//! let doc = Parser::new(&MediaConfig::default())
//!     .with_base_dir(tmp.path())
//!     .parse(":folder photos\na.jpg b.mp4\n")
//!     .unwrap();
//! assert_eq!(row_names(&doc), vec![vec!["a.jpg", "b.mp4"]]);
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::template::{BlockKind, Document, MediaRow};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `contents` to `rel` inside the temp dir, creating parent dirs.
pub fn write_file(tmp: &TempDir, rel: &str, contents: &str) -> PathBuf {
    let path = tmp.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Create `dir` inside the temp dir holding one small file per name.
///
/// Each file's content is its own name, so embedded payloads are
/// distinguishable in rendered output.
pub fn media_folder(tmp: &TempDir, dir: &str, names: &[&str]) -> PathBuf {
    let folder = tmp.path().join(dir);
    fs::create_dir_all(&folder).unwrap();
    for name in names {
        fs::write(folder.join(name), name.as_bytes()).unwrap();
    }
    folder
}

/// Create a media folder whose files have strictly increasing mtimes in the
/// order given, one minute apart.
pub fn dated_media_folder(tmp: &TempDir, dir: &str, names: &[&str]) -> PathBuf {
    let folder = media_folder(tmp, dir, names);
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    for (i, name) in names.iter().enumerate() {
        set_mtime(&folder.join(name), base + Duration::from_secs(60 * i as u64));
    }
    folder
}

pub fn set_mtime(path: &std::path::Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

// =========================================================================
// Document lookups
// =========================================================================

/// The `n`th media row (0-based). Panics if there are fewer rows.
pub fn find_row(doc: &Document, n: usize) -> &MediaRow {
    doc.media_rows().nth(n).unwrap_or_else(|| {
        panic!(
            "media row {n} not found; document has {} rows",
            doc.media_rows().count()
        )
    })
}

/// Filenames of every media row, in document order.
pub fn row_names(doc: &Document) -> Vec<Vec<&str>> {
    doc.media_rows()
        .map(|row| row.items.iter().map(|m| m.name.as_str()).collect())
        .collect()
}

/// Text of every narrative block, in document order.
pub fn narrative_texts(doc: &Document) -> Vec<&str> {
    doc.blocks
        .iter()
        .filter_map(|b| match &b.kind {
            BlockKind::Narrative(n) => Some(n.text.as_str()),
            _ => None,
        })
        .collect()
}
