//! The parsed album template.
//!
//! An album template is a plain text file mixing three kinds of lines:
//!
//! ```text
//! :folder photos/summer         ← directive (starts with `:`)
//! :show_filenames
//! :use default.css
//!
//! # Summer 2024                 ← narrative, rendered as Markdown
//!
//! beach.jpg   dunes.jpg         ← media row (first token is a known file)
//! swim.mp4
//! We drove home the long way.   ← narrative again
//! ```
//!
//! Parsing produces a [`Document`]: the blocks in source order plus the
//! state that applies to the whole page (the last stylesheet and whether
//! `:show_filenames` was seen). Every block remembers its 1-indexed source
//! line for diagnostics.

use crate::media::MediaKind;
use serde::Serialize;
use std::path::PathBuf;

/// A parsed template, ready to render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub blocks: Vec<Block>,
    /// The last `:use` stylesheet, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<Stylesheet>,
    pub show_filenames: bool,
}

impl Document {
    /// All media rows, in document order.
    pub fn media_rows(&self) -> impl Iterator<Item = &MediaRow> {
        self.blocks.iter().filter_map(|b| match &b.kind {
            BlockKind::MediaRow(row) => Some(row),
            _ => None,
        })
    }

    /// Total number of media references (duplicates counted).
    pub fn media_count(&self) -> usize {
        self.media_rows().map(|r| r.items.len()).sum()
    }
}

/// Stylesheet loaded by a `:use` directive.
#[derive(Debug, Clone, Serialize)]
pub struct Stylesheet {
    pub path: PathBuf,
    #[serde(skip)]
    pub css: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// 1-indexed line where the block starts.
    pub line: usize,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// State change; renders nothing.
    Directive(Directive),
    /// One horizontal strip of media.
    MediaRow(MediaRow),
    /// A run of lines handed to the Markdown converter.
    Narrative(Narrative),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    /// `:folder <path>`, with the size of the media set it activated.
    Folder { path: PathBuf, media_count: usize },
    /// `:show_filenames`
    ShowFilenames,
    /// `:use <stylesheet>`
    Use { path: PathBuf },
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaRow {
    /// Folder that was active when the row was read.
    pub folder: PathBuf,
    pub items: Vec<MediaRef>,
    /// Whether `:show_filenames` had been seen when the row was read.
    pub show_filenames: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRef {
    pub name: String,
    pub kind: MediaKind,
}

impl MediaRow {
    /// Width of each cell as a whole percentage, `floor(100 / n)`.
    pub fn cell_percent(&self) -> usize {
        100 / self.items.len().max(1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Narrative {
    /// Raw lines joined by `\n`, blank lines kept.
    pub text: String,
}
