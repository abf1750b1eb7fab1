//! Template parser.
//!
//! A single forward pass over the template lines. Every line is stripped of
//! surrounding whitespace and classified:
//!
//! 1. **Blank**: skipped.
//! 2. **Directive**: starts with `:`. Updates the [`ParseContext`]:
//!    - `:folder <path>` rescans `<path>` and replaces the active media set
//!    - `:show_filenames` turns on filename captions for later rows
//!    - `:use <path>` reads a stylesheet; the last one wins
//! 3. **Media row**: the first whitespace-separated token is a file in the
//!    active media set. Every token must then carry an image or video
//!    extension.
//! 4. **Narrative**: anything else starts a Markdown block, which swallows
//!    the following lines (blank ones included) until a line whose first
//!    token is in the active media set. That line is left for the next
//!    iteration.
//!
//! Only media-set membership ends a narrative block. A `:` line met inside a
//! narrative run is narrative text, not a directive.
//!
//! ## Errors
//!
//! The first failure aborts the parse. It is reported as a [`ParseError`]
//! carrying the 1-indexed line and the cause, e.g.
//! `line 3: directive :use requires an argument`.

use crate::config::MediaConfig;
use crate::media::{self, MediaError, MediaFolder};
use crate::template::{
    Block, BlockKind, Directive, Document, MediaRef, MediaRow, Narrative, Stylesheet,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-indexed source line.
    pub line: usize,
    #[source]
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug)]
pub enum ParseErrorKind {
    #[error(transparent)]
    InvalidFolder(#[from] MediaError),
    #[error("unknown directive {0}")]
    UnknownDirective(String),
    #[error("directive {0} requires an argument")]
    MissingArgument(String),
    #[error("cannot read stylesheet {path}: {source}")]
    UnresolvedStylesheet {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} is on a media row but is not an image or video")]
    UnclassifiableMediaToken(String),
}

/// Mutable parser state, threaded through the scan.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// Active folder and its media set; `None` until the first `:folder`.
    pub folder: Option<MediaFolder>,
    pub stylesheet: Option<Stylesheet>,
    pub show_filenames: bool,
}

impl ParseContext {
    /// Whether `token` names a file in the active media set.
    pub fn is_media(&self, token: &str) -> bool {
        self.folder.as_ref().is_some_and(|f| f.contains(token))
    }

    fn folder_path(&self) -> PathBuf {
        self.folder
            .as_ref()
            .map(|f| f.path().to_path_buf())
            .unwrap_or_default()
    }
}

/// Index-based cursor over the stripped lines.
struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().map(str::trim).collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    /// 1-indexed number of the line most recently returned by `advance`.
    fn line_number(&self) -> usize {
        self.pos
    }
}

/// Template parser. Holds the settings that do not change during a parse.
#[derive(Debug, Clone)]
pub struct Parser<'c> {
    media: &'c MediaConfig,
    base_dir: PathBuf,
}

impl<'c> Parser<'c> {
    pub fn new(media: &'c MediaConfig) -> Self {
        Self {
            media,
            base_dir: PathBuf::new(),
        }
    }

    /// Directory that relative `:folder` and `:use` paths resolve against.
    /// Defaults to the process working directory.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn parse(&self, text: &str) -> Result<Document, ParseError> {
        let mut ctx = ParseContext::default();
        let mut cursor = Cursor::new(text);
        let mut blocks = Vec::new();

        while let Some(line) = cursor.advance() {
            let lc = cursor.line_number();
            let at_line = |kind| ParseError { line: lc, kind };

            if line.is_empty() {
                continue;
            }

            let kind = if line.starts_with(':') {
                BlockKind::Directive(self.apply_directive(&mut ctx, line).map_err(at_line)?)
            } else if ctx.is_media(first_token(line)) {
                BlockKind::MediaRow(self.media_row(&ctx, line).map_err(at_line)?)
            } else {
                BlockKind::Narrative(narrative(&ctx, line, &mut cursor))
            };
            blocks.push(Block { line: lc, kind });
        }

        Ok(Document {
            blocks,
            stylesheet: ctx.stylesheet,
            show_filenames: ctx.show_filenames,
        })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Apply one `:` line to the context.
    pub fn apply_directive(
        &self,
        ctx: &mut ParseContext,
        line: &str,
    ) -> Result<Directive, ParseErrorKind> {
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let required = || {
            if arg.is_empty() {
                Err(ParseErrorKind::MissingArgument(name.to_string()))
            } else {
                Ok(arg)
            }
        };

        match name {
            ":folder" => {
                let arg = required()?;
                let folder = MediaFolder::load(&self.resolve(arg), self.media)?;
                let media_count = folder.len();
                ctx.folder = Some(folder);
                Ok(Directive::Folder {
                    path: PathBuf::from(arg),
                    media_count,
                })
            }
            ":show_filenames" => {
                ctx.show_filenames = true;
                Ok(Directive::ShowFilenames)
            }
            ":use" => {
                let arg = required()?;
                let path = self.resolve(arg);
                let css = fs::read_to_string(&path).map_err(|source| {
                    ParseErrorKind::UnresolvedStylesheet {
                        path: path.clone(),
                        source,
                    }
                })?;
                ctx.stylesheet = Some(Stylesheet { path, css });
                Ok(Directive::Use {
                    path: PathBuf::from(arg),
                })
            }
            other => Err(ParseErrorKind::UnknownDirective(other.to_string())),
        }
    }

    /// Build a media row from a line whose first token is a known media file.
    pub fn media_row(&self, ctx: &ParseContext, line: &str) -> Result<MediaRow, ParseErrorKind> {
        let items = line
            .split_whitespace()
            .map(|token| {
                media::classify(token, self.media)
                    .map(|kind| MediaRef {
                        name: token.to_string(),
                        kind,
                    })
                    .ok_or_else(|| ParseErrorKind::UnclassifiableMediaToken(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MediaRow {
            folder: ctx.folder_path(),
            items,
            show_filenames: ctx.show_filenames,
        })
    }
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or_default()
}

/// Consume a narrative block that starts with `first`.
///
/// Stops before the first non-blank line whose leading token is in the
/// active media set; that line stays in the cursor.
fn narrative(ctx: &ParseContext, first: &str, cursor: &mut Cursor<'_>) -> Narrative {
    let mut lines = vec![first];
    while let Some(next) = cursor.peek() {
        if !next.is_empty() && ctx.is_media(first_token(next)) {
            break;
        }
        lines.push(next);
        cursor.advance();
    }
    Narrative {
        text: lines.join("\n"),
    }
}

/// Read and parse a template file.
///
/// Relative paths inside the template resolve against `base_dir`.
pub fn parse_file(
    path: &Path,
    media: &MediaConfig,
    base_dir: &Path,
) -> Result<Document, ParseFileError> {
    let text = fs::read_to_string(path).map_err(|source| ParseFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Parser::new(media).with_base_dir(base_dir).parse(&text)?)
}

#[derive(Error, Debug)]
pub enum ParseFileError {
    #[error("Cannot read template {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
