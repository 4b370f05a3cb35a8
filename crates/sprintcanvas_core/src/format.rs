//! Description text formatter.
//!
//! # Responsibility
//! - Convert free-text descriptions to/from tagged Bullet/Plain lines.
//! - Keep the dual scalar/lines encoding explicit instead of shape-probed.
//!
//! # Invariants
//! - `render_description(parse_description(x))` equals `x` up to
//!   line-trim normalization for inputs with at least one non-empty line.
//! - `parse_description(render_description(lines))` reproduces `lines`.
//! - A marker-only line (`-` or `•`) becomes an empty `Bullet`, never a
//!   discarded line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static BULLET_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-•]\s*").expect("valid bullet marker regex"));

/// Tag for one description line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Line rendered with a leading `- ` marker.
    Bullet,
    /// Line rendered as-is.
    Plain,
}

/// One tagged description line. `text` never carries the bullet marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescLine {
    pub kind: LineKind,
    pub text: String,
}

impl DescLine {
    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Bullet,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Plain,
            text: text.into(),
        }
    }
}

/// Explicit dual encoding for item descriptions.
///
/// Single-line content stays a raw scalar string; multi-line content is
/// held as tagged lines so bullets survive round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Scalar(String),
    Lines(Vec<DescLine>),
}

impl Description {
    /// Builds a description from raw edit text.
    ///
    /// At most one non-empty line keeps the raw text as a scalar;
    /// anything longer becomes tagged lines.
    pub fn from_raw(raw: &str) -> Self {
        let lines = parse_description(raw);
        if lines.len() > 1 {
            Self::Lines(lines)
        } else {
            Self::Scalar(raw.to_string())
        }
    }

    /// Renders the description back to raw edit text.
    pub fn to_raw(&self) -> String {
        match self {
            Self::Scalar(text) => text.clone(),
            Self::Lines(lines) => render_description(lines),
        }
    }

    /// Returns tagged lines regardless of encoding.
    pub fn lines(&self) -> Vec<DescLine> {
        match self {
            Self::Scalar(text) => parse_description(text),
            Self::Lines(lines) => lines.clone(),
        }
    }
}

/// Splits raw description text into tagged lines.
///
/// Empty lines are dropped after trimming. A leading `-` or `•`
/// (with any following whitespace) marks a bullet and is stripped from
/// the stored text.
pub fn parse_description(raw: &str) -> Vec<DescLine> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with('-') || line.starts_with('•') {
                DescLine::bullet(BULLET_MARKER_RE.replace(line, "").into_owned())
            } else {
                DescLine::plain(line)
            }
        })
        .collect()
}

/// Joins tagged lines back into raw description text.
pub fn render_description(lines: &[DescLine]) -> String {
    lines
        .iter()
        .map(|line| match line.kind {
            LineKind::Bullet => format!("- {}", line.text),
            LineKind::Plain => line.text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
