//! HTML rendering of a parsed [`Document`].
//!
//! Produces one self-contained HTML5 page:
//!
//! ```text
//! <!DOCTYPE html><html><head>[<style>…</style>]</head><body>…</body></html>
//! ```
//!
//! Blocks render in document order:
//!
//! - **Directive**: nothing.
//! - **Media row** of N files: a centred one-row table, every cell
//!   `floor(100 / N)` percent wide holding an `<img>` or `<video controls>`
//!   at 100% of the cell, each followed by a 10px spacer cell. When
//!   `:show_filenames` was active for the row, the filename is captioned
//!   under each item.
//! - **Narrative**: the raw text converted by [`markdown_to_html`], followed
//!   by a newline.
//!
//! Media bytes are not read here. The caller supplies a [`MediaLibrary`]
//! holding the `data:` URI of every file the document references, which
//! keeps rendering a pure function of its inputs.

use crate::media::MediaKind;
use crate::template::{BlockKind, Document, MediaRow};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No embedded data for media file {0}")]
    MissingMedia(PathBuf),
}

/// Encoded media, keyed by the file's path (folder joined with basename).
#[derive(Debug, Default)]
pub struct MediaLibrary {
    uris: HashMap<PathBuf, String>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.uris.get(path).map(String::as_str)
    }

    /// Fail with the first file of `row` that has no encoded data.
    fn covers(&self, row: &MediaRow) -> Result<(), RenderError> {
        match row
            .items
            .iter()
            .map(|item| row.folder.join(&item.name))
            .find(|path| !self.uris.contains_key(path))
        {
            Some(path) => Err(RenderError::MissingMedia(path)),
            None => Ok(()),
        }
    }
}

impl FromIterator<(PathBuf, String)> for MediaLibrary {
    fn from_iter<I: IntoIterator<Item = (PathBuf, String)>>(iter: I) -> Self {
        Self {
            uris: iter.into_iter().collect(),
        }
    }
}

/// Convert a narrative block to HTML.
pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new(text);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

/// Render the whole document.
///
/// Every block is written straight into the one output buffer, so each
/// media payload is copied once, from the library into the page.
pub fn render_document(doc: &Document, library: &MediaLibrary) -> Result<Markup, RenderError> {
    for row in doc.media_rows() {
        library.covers(row)?;
    }

    Ok(html! {
        (DOCTYPE)
        html {
            head {
                @if let Some(sheet) = &doc.stylesheet {
                    style { (PreEscaped(&sheet.css)) }
                }
            }
            body {
                @for block in &doc.blocks {
                    @match &block.kind {
                        BlockKind::Directive(_) => {}
                        BlockKind::MediaRow(row) => {
                            div align="center" {
                                table {
                                    tr {
                                        @for item in &row.items {
                                            @let uri = library
                                                .get(&row.folder.join(&item.name))
                                                .unwrap_or_default();
                                            td style={ "width:" (row.cell_percent()) "%;" } {
                                                @match item.kind {
                                                    MediaKind::Image => {
                                                        img width="100%" src=(uri) alt=(item.name);
                                                    }
                                                    MediaKind::Video => {
                                                        video width="100%" controls src=(uri) {}
                                                    }
                                                }
                                                @if row.show_filenames {
                                                    div.filename { (item.name) }
                                                }
                                            }
                                            td width="10px" {}
                                        }
                                    }
                                }
                            }
                        }
                        BlockKind::Narrative(narrative) => {
                            (PreEscaped(markdown_to_html(&narrative.text)))
                            "\n"
                        }
                    }
                }
            }
        }
    })
}
