//! Media classification, folder scanning, and inline embedding.
//!
//! A media file is identified by its basename alone; the extension decides
//! whether it is an image, a video, or not media at all. Matching is
//! case-insensitive, so `IMG_0042.JPG` is an image.
//!
//! ## Active Media Set
//!
//! A [`MediaFolder`] is the set of media basenames found directly inside one
//! directory. Subdirectories and non-media files are ignored. The parser asks
//! it one question, [`MediaFolder::contains`], to decide whether a line is a
//! row of media or narrative text.
//!
//! ## Embedding
//!
//! [`data_uri`] reads a file fully into memory and returns a `data:` URI with
//! a standard base64 payload. Images are labelled `image/png` or `image/jpeg`
//! by extension; videos are always labelled `video/mp4`, whatever their
//! container.

use crate::config::MediaConfig;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid folder {path}: {source}")]
    InvalidFolder {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read media file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Classify a filename by its extension.
///
/// Returns `None` for names without an extension or with an extension that
/// is in neither set.
pub fn classify(name: &str, config: &MediaConfig) -> Option<MediaKind> {
    let ext = Path::new(name).extension()?.to_string_lossy();
    let listed = |list: &[String]| list.iter().any(|e| e.eq_ignore_ascii_case(&ext));
    if listed(&config.image_extensions[..]) {
        Some(MediaKind::Image)
    } else if listed(&config.video_extensions[..]) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// A media file found by [`scan_folder`].
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub name: String,
    pub kind: MediaKind,
    pub modified: SystemTime,
}

/// List the media files directly inside `path`, sorted by basename.
///
/// Only regular files with a recognised extension are returned. A path that
/// cannot be listed (missing, not a directory, no permission) is an
/// [`MediaError::InvalidFolder`].
pub fn scan_folder(path: &Path, config: &MediaConfig) -> Result<Vec<MediaEntry>, MediaError> {
    let invalid = |source| MediaError::InvalidFolder {
        path: path.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(invalid)? {
        let entry = entry.map_err(invalid)?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(kind) = classify(&name, config) else {
            continue;
        };
        // Follows symlinks, so a linked photo still counts as a file and a
        // dangling link is skipped like any other non-file.
        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(invalid(e)),
        };
        entries.push(MediaEntry {
            name,
            kind,
            modified: metadata.modified().map_err(invalid)?,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// The active media set of one folder.
#[derive(Debug, Clone)]
pub struct MediaFolder {
    path: PathBuf,
    names: HashSet<String>,
}

impl MediaFolder {
    /// Scan `path` and build its media set.
    pub fn load(path: &Path, config: &MediaConfig) -> Result<Self, MediaError> {
        let entries = scan_folder(path, config)?;
        Ok(Self {
            path: path.to_path_buf(),
            names: entries.into_iter().map(|e| e.name).collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of media files in the set.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// MIME type used in the data URI.
pub fn mime_type(name: &str, kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "video/mp4",
        MediaKind::Image => {
            let is_png = Path::new(name)
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            if is_png { "image/png" } else { "image/jpeg" }
        }
    }
}

/// Encode raw bytes as a `data:` URI.
pub fn encode_data_uri(bytes: &[u8], mime: &str) -> String {
    let mut payload = STANDARD.encode(bytes);
    // The standard engine never wraps, but the payload must be a single line.
    payload.retain(|c| c != '\n');
    format!("data:{mime};base64,{payload}")
}

/// Read a media file and return it as a `data:` URI.
pub fn data_uri(path: &Path, kind: MediaKind) -> Result<String, MediaError> {
    let bytes = fs::read(path).map_err(|source| MediaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(encode_data_uri(&bytes, mime_type(&name, kind)))
}
