//! The `generate` pipeline: template file → single HTML file.
//!
//! ```text
//! 1. Parse     album.alb  →  Document        (directives applied, rows resolved)
//! 2. Embed     Document   →  MediaLibrary    (every referenced file → data: URI)
//! 3. Render    Document   →  HTML            (blocks in document order)
//! 4. Write     HTML       →  album.html      (all or nothing)
//! ```
//!
//! ## Parallel Embedding
//!
//! Reading and base64-encoding media is the only expensive step and the only
//! one that is independent per file, so it runs on the [rayon] pool. Each
//! distinct file is encoded once even when several rows reference it; the
//! rendered rows still pick their data out of the library in document order.
//!
//! ## Failure
//!
//! Any error (bad directive, missing folder, unreadable stylesheet or media)
//! aborts the run before anything is written. The HTML is first written to a
//! hidden sibling file and then renamed over the destination, so a failed
//! write never leaves a truncated album behind.

use crate::config::AlbumConfig;
use crate::media::{self, MediaError, MediaKind};
use crate::parse::{self, ParseFileError};
use crate::render::{self, MediaLibrary, RenderError};
use crate::template::Document;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseFileError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Output {0} would overwrite the template")]
    OutputIsTemplate(PathBuf),
}

/// Progress reported while generating.
#[derive(Debug, Clone)]
pub enum GenerateEvent {
    /// Template parsed.
    Parsed { blocks: usize, media: usize },
    /// One media file read and encoded. `index` counts completions, so with
    /// several workers it does not follow document order.
    MediaEmbedded {
        index: usize,
        total: usize,
        path: PathBuf,
        kind: MediaKind,
        encoded_len: usize,
    },
    /// Output file in place.
    Written { path: PathBuf, bytes: usize },
}

/// Result of a successful run.
#[derive(Debug)]
pub struct GenerateResult {
    pub output: PathBuf,
    pub document: Document,
    pub bytes: usize,
}

/// Output path for a template: same path, extension replaced by `.html`.
pub fn output_path(template: &Path) -> PathBuf {
    template.with_extension("html")
}

/// Run the full pipeline for one template.
///
/// Relative paths inside the template resolve against `base_dir`.
pub fn generate(
    template: &Path,
    config: &AlbumConfig,
    base_dir: &Path,
    events: Option<Sender<GenerateEvent>>,
) -> Result<GenerateResult, GenerateError> {
    let output = output_path(template);
    if output == template {
        return Err(GenerateError::OutputIsTemplate(output));
    }

    let document = parse::parse_file(template, &config.media, base_dir)?;
    emit(
        events.as_ref(),
        GenerateEvent::Parsed {
            blocks: document.blocks.len(),
            media: document.media_count(),
        },
    );

    // The library is dropped as soon as the page holds its payloads.
    let html = {
        let library = embed_media(&document, events.as_ref())?;
        render::render_document(&document, &library)?.into_string()
    };

    write_atomic(&output, html.as_bytes())?;
    emit(
        events.as_ref(),
        GenerateEvent::Written {
            path: output.clone(),
            bytes: html.len(),
        },
    );

    Ok(GenerateResult {
        output,
        document,
        bytes: html.len(),
    })
}

/// Distinct media files referenced by the document, in first-use order.
pub fn referenced_media(document: &Document) -> Vec<(PathBuf, MediaKind)> {
    let mut seen = HashSet::new();
    document
        .media_rows()
        .flat_map(|row| {
            row.items
                .iter()
                .map(|item| (row.folder.join(&item.name), item.kind))
        })
        .filter(|(path, _)| seen.insert(path.clone()))
        .collect()
}

/// Read and encode every referenced media file on the rayon pool.
pub fn embed_media(
    document: &Document,
    events: Option<&Sender<GenerateEvent>>,
) -> Result<MediaLibrary, MediaError> {
    let jobs = referenced_media(document);
    let total = jobs.len();
    let done = AtomicUsize::new(0);

    let encoded = jobs
        .into_par_iter()
        .map(|(path, kind)| {
            let uri = media::data_uri(&path, kind)?;
            let index = done.fetch_add(1, Ordering::Relaxed) + 1;
            emit(
                events,
                GenerateEvent::MediaEmbedded {
                    index,
                    total,
                    path: path.clone(),
                    kind,
                    encoded_len: uri.len(),
                },
            );
            Ok((path, uri))
        })
        .collect::<Result<Vec<_>, MediaError>>()?;

    Ok(encoded.into_iter().collect())
}

/// Write `contents` to `path` through a sibling temporary file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let partial = path.with_file_name(format!(".{file_name}.partial"));

    if let Err(e) = fs::write(&partial, contents).and_then(|()| fs::rename(&partial, path)) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    Ok(())
}

fn emit(events: Option<&Sender<GenerateEvent>>, event: GenerateEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}
