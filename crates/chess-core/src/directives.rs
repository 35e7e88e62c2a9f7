//! Embedded comment directives (`[%cal ...]`, `[%csl ...]` and friends).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%cal\s+([A-Za-z][a-h][1-8][a-h][1-8](?:\s*,\s*[A-Za-z][a-h][1-8][a-h][1-8])*)\s*\]")
        .expect("arrow directive pattern compiles")
});

static HIGHLIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%csl\s+([A-Za-z][a-h][1-8](?:\s*,\s*[A-Za-z][a-h][1-8])*)\s*\]")
        .expect("highlight directive pattern compiles")
});

// Engine/clock payloads are dropped, never parsed
static DISCARDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%(?:eval|emt|clk|mdl)\s+[^\]]*\]").expect("discard pattern compiles")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationColor {
    #[default]
    Green,
    Red,
    Yellow,
    Blue,
}

impl AnnotationColor {
    /// Unknown codes fall back to green.
    pub fn from_code(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'R' => Self::Red,
            'Y' => Self::Yellow,
            'B' => Self::Blue,
            _ => Self::Green,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    pub color: AnnotationColor,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub color: AnnotationColor,
    pub square: String,
}

/// A comment with its directives pulled out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDirectives {
    pub text: String,
    pub arrows: Vec<Arrow>,
    pub highlights: Vec<Highlight>,
}

pub fn extract_directives(raw: &str) -> CommentDirectives {
    let mut arrows = Vec::new();
    for cap in ARROW_RE.captures_iter(raw) {
        for arg in cap[1].split(',').map(str::trim) {
            let color = arg.chars().next().map(AnnotationColor::from_code).unwrap_or_default();
            arrows.push(Arrow {
                color,
                from: arg[1..3].to_string(),
                to: arg[3..5].to_string(),
            });
        }
    }

    let mut highlights = Vec::new();
    for cap in HIGHLIGHT_RE.captures_iter(raw) {
        for arg in cap[1].split(',').map(str::trim) {
            let color = arg.chars().next().map(AnnotationColor::from_code).unwrap_or_default();
            highlights.push(Highlight {
                color,
                square: arg[1..3].to_string(),
            });
        }
    }

    let text = ARROW_RE.replace_all(raw, " ");
    let text = HIGHLIGHT_RE.replace_all(&text, " ");
    let text = DISCARDED_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(text.trim(), " ").into_owned();

    CommentDirectives {
        text,
        arrows,
        highlights,
    }
}
