//! # Albummer
//!
//! Turns a folder of photos and videos into a single, self-contained HTML
//! album. The page is described by a small plain-text template in which
//! media filenames, Markdown prose, and a handful of `:` directives are
//! interleaved line by line:
//!
//! ```text
//! :folder photos/summer
//! :use default.css
//!
//! # Summer 2024
//!
//! beach.jpg   dunes.jpg
//! swim.mp4
//! ```
//!
//! Two pipelines share the crate:
//!
//! ```text
//! make-template   folder     →  album.alb    (scan, sort by mtime, lay out rows)
//! generate        album.alb  →  album.html   (parse, embed media, render)
//! ```
//!
//! Every image, video, and the stylesheet is inlined into the output (media
//! as base64 `data:` URIs), so the HTML file can be mailed or copied around
//! on its own.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`media`] | Extension classification, folder scanning, `data:` URI encoding |
//! | [`template`] | The parsed document: blocks, directives, media rows, narrative |
//! | [`parse`] | Line classifier and state machine producing a [`template::Document`] |
//! | [`render`] | Maud rendering of a document into one HTML page |
//! | [`generate`] | The `generate` pipeline: parse → parallel embed → render → atomic write |
//! | [`synth`] | The `make-template` pipeline |
//! | [`config`] | `album.toml` loading, stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Membership Decides Media
//!
//! A line is a media row only if its first token is a file that actually
//! exists in the active folder. A sentence that happens to start with
//! `photo.jpg` stays prose when no such file is there, and a template keeps
//! working when files are added to the folder later.
//!
//! ## Maud for Markup
//!
//! HTML is built with [Maud](https://maud.lambda.xyz/), so markup errors are
//! compile errors and filenames shown as captions are escaped. Narrative
//! blocks go through `pulldown-cmark` and are inserted as already-rendered
//! HTML.

pub mod config;
pub mod generate;
pub mod media;
pub mod output;
pub mod parse;
pub mod render;
pub mod synth;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
