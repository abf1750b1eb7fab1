//! CLI output formatting for both commands.
//!
//! # Output Format
//!
//! ## Document tree (`check`, `generate -v`)
//!
//! One line per block, led by its source line number, with the page-wide
//! state at the end:
//!
//! ```text
//! Blocks
//! 001 folder photos (12 media)
//! 005 narrative "# Summer 2024 We drove down on a Friday..."
//! 009 row 3 × 33%
//!     beach.jpg, dunes.jpg, pier.jpg
//! 010 row 1 × 100%
//!     swim.mp4 (video)
//!
//! Stylesheet: default.css
//! Filenames: shown
//! ```
//!
//! ## Generate
//!
//! ```text
//! Parsed 6 blocks, 4 media references
//!     [1/3] image photos/beach.jpg (84.2 KB)
//!     [2/3] video photos/swim.mp4 (3.1 MB)
//! Wrote album.html (3.3 MB)
//! ```
//!
//! ## Make template
//!
//! ```text
//! Template summer.alb
//!     Title: summer
//!     Stylesheet: default.css (written)
//!     Rows: 4 (7 images, 1 video)
//!     Skipped: my photo.jpg (not usable as a row token)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::generate::GenerateEvent;
use crate::media::MediaKind;
use crate::synth::SynthResult;
use crate::template::{BlockKind, Directive, Document};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based line number as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Document tree
// ============================================================================

/// Format a parsed document as a block listing.
pub fn format_document(doc: &Document) -> Vec<String> {
    let mut lines = vec!["Blocks".to_string()];

    for block in &doc.blocks {
        let index = format_index(block.line);
        match &block.kind {
            BlockKind::Directive(Directive::Folder { path, media_count }) => {
                lines.push(format!(
                    "{} folder {} ({} media)",
                    index,
                    path.display(),
                    media_count
                ));
            }
            BlockKind::Directive(Directive::ShowFilenames) => {
                lines.push(format!("{} show_filenames", index));
            }
            BlockKind::Directive(Directive::Use { path }) => {
                lines.push(format!("{} use {}", index, path.display()));
            }
            BlockKind::MediaRow(row) => {
                lines.push(format!(
                    "{} row {} × {}%",
                    index,
                    row.items.len(),
                    row.cell_percent()
                ));
                let names: Vec<String> = row
                    .items
                    .iter()
                    .map(|item| match item.kind {
                        MediaKind::Image => item.name.clone(),
                        MediaKind::Video => format!("{} (video)", item.name),
                    })
                    .collect();
                lines.push(format!("{}{}", indent(1), names.join(", ")));
            }
            BlockKind::Narrative(narrative) => {
                let flat = narrative.text.split_whitespace().collect::<Vec<_>>().join(" ");
                lines.push(format!("{} narrative \"{}\"", index, truncate_desc(&flat, 40)));
            }
        }
    }

    lines.push(String::new());
    match &doc.stylesheet {
        Some(sheet) => lines.push(format!("Stylesheet: {}", sheet.path.display())),
        None => lines.push("Stylesheet: none".to_string()),
    }
    lines.push(format!(
        "Filenames: {}",
        if doc.show_filenames { "shown" } else { "hidden" }
    ));
    lines
}

pub fn print_document(doc: &Document) {
    for line in format_document(doc) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate events
// ============================================================================

/// Format one progress event from the generate pipeline.
pub fn format_generate_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::Parsed { blocks, media } => vec![format!(
            "Parsed {}, {}",
            plural(*blocks, "block"),
            plural(*media, "media reference")
        )],
        GenerateEvent::MediaEmbedded {
            index,
            total,
            path,
            kind,
            encoded_len,
        } => vec![format!(
            "{}[{}/{}] {} {} ({})",
            indent(1),
            index,
            total,
            kind.label(),
            path.display(),
            format_size(*encoded_len)
        )],
        GenerateEvent::Written { path, bytes } => {
            vec![format!("Wrote {} ({})", path.display(), format_size(*bytes))]
        }
    }
}

// ============================================================================
// Make template
// ============================================================================

/// Format the summary of a `make-template` run.
pub fn format_synth_output(result: &SynthResult) -> Vec<String> {
    let (images, videos) = result
        .rows
        .iter()
        .fold((0, 0), |(i, v), row| match row.kind {
            MediaKind::Image => (i + row.names.len(), v),
            MediaKind::Video => (i, v + row.names.len()),
        });

    let stylesheet = if result.wrote_stylesheet.is_some() {
        format!("{} (written)", result.stylesheet)
    } else {
        result.stylesheet.clone()
    };

    let mut lines = vec![
        format!("Template {}", result.template.display()),
        format!("{}Title: {}", indent(1), result.title),
        format!("{}Stylesheet: {}", indent(1), stylesheet),
        format!(
            "{}Rows: {} ({}, {})",
            indent(1),
            result.rows.len(),
            plural(images, "image"),
            plural(videos, "video")
        ),
    ];
    for name in &result.skipped {
        lines.push(format!("{}Skipped: {} (not usable as a row token)", indent(1), name));
    }
    lines
}

pub fn print_synth_output(result: &SynthResult) {
    for line in format_synth_output(result) {
        println!("{}", line);
    }
}
