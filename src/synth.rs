//! The `make-template` pipeline: media folder → editable album template.
//!
//! Scans a folder, orders its media by modification time, and lays the
//! files out into rows:
//!
//! - images fill a row up to the configured column count
//! - a video ends the current image row and gets a row of its own, with a
//!   blank line before and after it
//!
//! The written template starts with the three directives, a Markdown title
//! taken from the folder name, and then the media body:
//!
//! ```text
//! :folder photos/summer
//! :show_filenames
//! :use default.css
//!
//! # summer
//!
//! beach.jpg   dunes.jpg   pier.jpg
//! boat.jpg
//!
//! swim.mp4
//!
//! sunset.jpg
//! ```
//!
//! Every row's first token is a file of the scanned folder, so parsing the
//! template against the same, unchanged folder reads every row back as
//! media. Files whose names cannot be written as a row token (whitespace
//! anywhere, or a leading `:`) are left out and reported in
//! [`SynthResult::skipped`].

use crate::config::MediaConfig;
use crate::media::{self, MediaEntry, MediaError, MediaKind};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stylesheet bundled into the binary and used when none is given.
pub const DEFAULT_CSS: &str = include_str!("../static/default.css");

/// File name the bundled stylesheet is written under.
pub const DEFAULT_CSS_NAME: &str = "default.css";

#[derive(Error, Debug)]
pub enum SynthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("Column count must be at least 1")]
    ZeroColumns,
}

/// Order of media in the generated layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

impl SortOrder {
    /// `asc` means oldest first; every other token means newest first.
    pub fn from_token(token: &str) -> Self {
        if token == "asc" {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// Options for one `make-template` run.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub columns: usize,
    pub order: SortOrder,
    /// Stylesheet for the `:use` line. `None` writes the bundled stylesheet
    /// next to the template and points at it.
    pub stylesheet: Option<String>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            columns: 3,
            order: SortOrder::Ascending,
            stylesheet: None,
        }
    }
}

/// One line of the media body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    pub names: Vec<String>,
    pub kind: MediaKind,
}

/// What a run produced, for reporting.
#[derive(Debug)]
pub struct SynthResult {
    pub template: PathBuf,
    pub title: String,
    pub stylesheet: String,
    /// Set when the bundled stylesheet was written by this run.
    pub wrote_stylesheet: Option<PathBuf>,
    pub rows: Vec<LayoutRow>,
    /// Media files left out of the layout, see [`is_row_token`].
    pub skipped: Vec<String>,
}

/// Sort entries by modification time; ties fall back to the basename,
/// a to z in both orders.
pub fn sort_entries(entries: &mut [MediaEntry], order: SortOrder) {
    entries.sort_by(|a, b| {
        let by_time = match order {
            SortOrder::Ascending => a.modified.cmp(&b.modified),
            SortOrder::Descending => b.modified.cmp(&a.modified),
        };
        by_time.then_with(|| a.name.cmp(&b.name))
    });
}

/// Whether `name` reads back as a single media token on a row line: the
/// parser splits rows on whitespace and takes a leading `:` as a directive.
pub fn is_row_token(name: &str) -> bool {
    !name.starts_with(':') && !name.chars().any(char::is_whitespace)
}

/// Lay sorted entries out into rows.
pub fn layout_rows(entries: &[MediaEntry], columns: usize) -> Vec<LayoutRow> {
    let mut rows = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for entry in entries {
        match entry.kind {
            MediaKind::Video => {
                if !current.is_empty() {
                    rows.push(LayoutRow {
                        names: std::mem::take(&mut current),
                        kind: MediaKind::Image,
                    });
                }
                rows.push(LayoutRow {
                    names: vec![entry.name.clone()],
                    kind: MediaKind::Video,
                });
            }
            MediaKind::Image => {
                current.push(entry.name.clone());
                if current.len() == columns {
                    rows.push(LayoutRow {
                        names: std::mem::take(&mut current),
                        kind: MediaKind::Image,
                    });
                }
            }
        }
    }
    if !current.is_empty() {
        rows.push(LayoutRow {
            names: current,
            kind: MediaKind::Image,
        });
    }
    rows
}

/// Write the media body: image rows one per line with names separated by
/// three spaces, each video on its own line surrounded by blank lines.
pub fn format_body(rows: &[LayoutRow]) -> String {
    let mut body = String::new();
    for row in rows {
        match row.kind {
            MediaKind::Image => {
                body.push_str(&row.names.join("   "));
                body.push('\n');
            }
            MediaKind::Video => {
                body.push('\n');
                body.push_str(&row.names.join("   "));
                body.push_str("\n\n");
            }
        }
    }
    body
}

/// Assemble the full template text.
pub fn format_template(folder: &str, stylesheet: &str, title: &str, rows: &[LayoutRow]) -> String {
    format!(
        ":folder {folder}\n:show_filenames\n:use {stylesheet}\n\n# {title}\n\n{}\n",
        format_body(rows)
    )
}

/// Album title: the last component of the folder's absolute path, so that
/// `.` still yields a real name.
pub fn folder_title(folder: &Path) -> String {
    fs::canonicalize(folder)
        .or_else(|_| std::path::absolute(folder))
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| folder.display().to_string())
}

/// Scan `folder` and write a template to `output`.
pub fn make_template(
    folder: &Path,
    output: &Path,
    options: &SynthOptions,
    media: &MediaConfig,
) -> Result<SynthResult, SynthError> {
    if options.columns == 0 {
        return Err(SynthError::ZeroColumns);
    }

    let (mut entries, skipped): (Vec<MediaEntry>, Vec<MediaEntry>) =
        media::scan_folder(folder, media)?
            .into_iter()
            .partition(|e| is_row_token(&e.name));
    sort_entries(&mut entries, options.order);
    let rows = layout_rows(&entries, options.columns);
    let title = folder_title(folder);

    // The bundled stylesheet is only written once the template is in place.
    let (stylesheet, bundled) = match &options.stylesheet {
        Some(css) => (css.clone(), None),
        None => {
            let css_path = output.with_file_name(DEFAULT_CSS_NAME);
            (css_path.display().to_string(), Some(css_path))
        }
    };

    let text = format_template(&folder.display().to_string(), &stylesheet, &title, &rows);
    fs::write(output, text)?;

    let wrote_stylesheet = match bundled {
        Some(css_path) if !css_path.exists() => {
            fs::write(&css_path, DEFAULT_CSS)?;
            Some(css_path)
        }
        _ => None,
    };

    Ok(SynthResult {
        template: output.to_path_buf(),
        title,
        stylesheet,
        wrote_stylesheet,
        rows,
        skipped: skipped.into_iter().map(|e| e.name).collect(),
    })
}
