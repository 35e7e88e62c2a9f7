//! Recursive move tree builder.
//!
//! Walks the token stream of one game and produces the mainline as a list of
//! [`MoveNode`]s, each carrying its own alternative lines. The oracle is the
//! only source of truth for legality and side to move.

use std::ops::{Deref, DerefMut};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use shakmaty::Color;
use tracing::debug;

use crate::directives::{extract_directives, Arrow, CommentDirectives, Highlight};
use crate::error::{MoveRejected, PgnError};
use crate::oracle::{Oracle, ShakmatyOracle};
use crate::tokenizer::{tokenize, Token};

/// Variations nested deeper than this are skipped without being parsed.
pub const MAX_VARIATION_DEPTH: usize = 64;

/// One ply of a line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNode {
    #[serde(rename = "move")]
    pub mv: String,
    pub move_number: u32,
    pub is_white: bool,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub nags: Vec<u32>,
    #[serde(default)]
    pub arrows: Vec<Arrow>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    /// Alternative lines, each starting from the position before `mv`.
    #[serde(default)]
    pub variations: Vec<Vec<MoveNode>>,
}

impl MoveNode {
    pub fn new(mv: impl Into<String>, move_number: u32, is_white: bool) -> Self {
        Self {
            mv: mv.into(),
            move_number,
            is_white,
            comment: String::new(),
            nags: Vec::new(),
            arrows: Vec::new(),
            highlights: Vec::new(),
            variations: Vec::new(),
        }
    }

    /// First move of each variation, without repeats and without `mv` itself.
    pub fn alternatives(&self) -> Vec<&str> {
        let mut alternatives: Vec<&str> = Vec::new();
        for first in self.variations.iter().filter_map(|line| line.first()) {
            let candidate = first.mv.as_str();
            if candidate != self.mv && !alternatives.contains(&candidate) {
                alternatives.push(candidate);
            }
        }
        alternatives
    }

    /// Whether a player answering with `text` at this ply should be accepted.
    pub fn accepts(&self, text: &str) -> bool {
        self.mv == text || self.alternatives().contains(&text)
    }

    fn attach_comment(&mut self, directives: CommentDirectives) {
        if !directives.text.is_empty() {
            if !self.comment.is_empty() {
                self.comment.push(' ');
            }
            self.comment.push_str(&directives.text);
        }
        self.arrows.extend(directives.arrows);
        self.highlights.extend(directives.highlights);
    }
}

// Hand-written so `alternatives` is always derived from `variations`.
impl Serialize for MoveNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MoveNode", 9)?;
        state.serialize_field("move", &self.mv)?;
        state.serialize_field("moveNumber", &self.move_number)?;
        state.serialize_field("isWhite", &self.is_white)?;
        state.serialize_field("comment", &self.comment)?;
        state.serialize_field("nags", &self.nags)?;
        state.serialize_field("arrows", &self.arrows)?;
        state.serialize_field("highlights", &self.highlights)?;
        state.serialize_field("variations", &self.variations)?;
        state.serialize_field("alternatives", &self.alternatives())?;
        state.end()
    }
}

/// A move token the oracle refused, kept for whoever uploaded the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedMove {
    pub text: String,
    /// Position the move was tried in.
    pub fen: String,
    pub reason: MoveRejected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameTree {
    pub mainline: Vec<MoveNode>,
    pub skipped: Vec<SkippedMove>,
}

/// Build the move tree for one game's movetext. `oracle` must be set to the
/// game's starting position; it is left at the end of the mainline.
pub fn build_tree<O: Oracle>(movetext: &str, oracle: &mut O) -> GameTree {
    let tokens = tokenize(movetext);
    build_tree_from_tokens(&tokens, oracle)
}

pub fn build_tree_from_tokens<O: Oracle>(tokens: &[Token], oracle: &mut O) -> GameTree {
    let mut builder = LineBuilder {
        tokens,
        skipped: Vec::new(),
    };

    // A stray `)` at top level ends the mainline like any other line
    let (mainline, stop) = builder.parse_line(oracle, 0, 1, 0);
    if stop < tokens.len() {
        debug!(index = stop, remaining = tokens.len() - stop, "Mainline stopped before end of movetext");
    }

    GameTree {
        mainline,
        skipped: builder.skipped,
    }
}

/// Replay the `move` fields of a line with a fresh oracle and return the FEN
/// after each ply.
pub fn replay_mainline(start_fen: &str, line: &[MoveNode]) -> Result<Vec<String>, PgnError> {
    let mut oracle = ShakmatyOracle::from_fen(start_fen)?;
    line.iter()
        .map(|node| {
            oracle
                .play(&node.mv)
                .map_err(|_| PgnError::Replay(node.mv.clone()))?;
            Ok(oracle.fen())
        })
        .collect()
}

struct LineBuilder<'t> {
    tokens: &'t [Token],
    skipped: Vec<SkippedMove>,
}

impl<'t> LineBuilder<'t> {
    /// Parse one line starting at `start`, `depth` variations below the
    /// mainline. Returns the line and the index of the first token not
    /// consumed: a `VariationEnd`, or the end of input.
    fn parse_line<O: Oracle>(
        &mut self,
        oracle: &mut O,
        start: usize,
        first_move_number: u32,
        depth: usize,
    ) -> (Vec<MoveNode>, usize) {
        let tokens = self.tokens;
        let mut line: Vec<MoveNode> = Vec::new();
        let mut move_number = first_move_number;
        let mut i = start;

        while let Some(token) = tokens.get(i) {
            match token {
                Token::MoveNumber(n) => {
                    move_number = *n;
                    i += 1;
                }
                Token::Result(_) => {
                    i += 1;
                    break;
                }
                Token::VariationEnd => break,
                Token::Move(text) => {
                    i += 1;
                    let is_white = oracle.turn() == Color::White;
                    let applied = match oracle.play(text) {
                        Ok(applied) => applied,
                        Err(reason) => {
                            let fen = oracle.fen();
                            debug!(%text, %fen, "Dropping move token: {reason}");
                            self.skipped.push(SkippedMove {
                                text: text.clone(),
                                fen,
                                reason,
                            });
                            continue;
                        }
                    };

                    let mut node = MoveNode::new(applied.san, move_number, is_white);
                    if !is_white {
                        move_number += 1;
                    }

                    while let Some(token) = tokens.get(i) {
                        match token {
                            Token::Nag(nag) => node.nags.push(*nag),
                            Token::Comment(raw) => node.attach_comment(extract_directives(raw)),
                            _ => break,
                        }
                        i += 1;
                    }

                    while let Some(Token::VariationStart) = tokens.get(i) {
                        i = self.parse_variation(oracle, &mut node, i + 1, depth);
                    }

                    line.push(node);
                }
                Token::Comment(raw) => {
                    i += 1;
                    match line.last_mut() {
                        Some(previous) => previous.attach_comment(extract_directives(raw)),
                        None => debug!(comment = %raw, "Dropping comment before first move of line"),
                    }
                }
                Token::VariationStart => {
                    i += 1;
                    match line.last_mut() {
                        Some(previous) => i = self.parse_variation(oracle, previous, i, depth),
                        None => {
                            debug!(index = i - 1, "Skipping variation with no move to attach to");
                            i = skip_group(tokens, i);
                        }
                    }
                }
                Token::Nag(_) => i += 1,
            }
        }

        (line, i)
    }

    /// Parse the variation whose contents begin at `start` as an alternative
    /// to `owner`'s move, from a line `depth` levels deep. Returns the index
    /// after the closing `VariationEnd`.
    fn parse_variation<O: Oracle>(
        &mut self,
        oracle: &mut O,
        owner: &mut MoveNode,
        start: usize,
        depth: usize,
    ) -> usize {
        if depth >= MAX_VARIATION_DEPTH {
            debug!(index = start, depth, "Skipping variation nested too deeply");
            return skip_group(self.tokens, start);
        }

        let Some(mut scope) = VariationScope::enter(oracle) else {
            return skip_group(self.tokens, start);
        };

        let (variation, stop) = self.parse_line(&mut *scope, start, owner.move_number, depth + 1);
        drop(scope);

        // A result inside the group ends the line early; drop the remainder
        let next = match self.tokens.get(stop) {
            Some(Token::VariationEnd) => stop + 1,
            _ => skip_group(self.tokens, stop),
        };

        if !variation.is_empty() {
            owner.variations.push(variation);
        }
        next
    }
}

/// Skip a bracketed group whose contents begin at `start`, honouring nesting.
/// Returns the index after its closing `VariationEnd` (or the end of input).
fn skip_group(tokens: &[Token], start: usize) -> usize {
    let mut depth = 1usize;
    let mut i = start;
    while let Some(token) = tokens.get(i) {
        i += 1;
        match token {
            Token::VariationStart => depth += 1,
            Token::VariationEnd => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    i
}

/// Oracle rewound one ply for the duration of a variation. The position it
/// had on entry is restored when the scope is dropped, on every exit path.
struct VariationScope<'a, O: Oracle> {
    oracle: &'a mut O,
    saved: Option<O::Snapshot>,
}

impl<'a, O: Oracle> VariationScope<'a, O> {
    fn enter(oracle: &'a mut O) -> Option<Self> {
        let saved = oracle.snapshot();
        if !oracle.undo() {
            oracle.restore(saved);
            return None;
        }
        Some(Self {
            oracle,
            saved: Some(saved),
        })
    }
}

impl<O: Oracle> Deref for VariationScope<'_, O> {
    type Target = O;

    fn deref(&self) -> &O {
        &*self.oracle
    }
}

impl<O: Oracle> DerefMut for VariationScope<'_, O> {
    fn deref_mut(&mut self) -> &mut O {
        &mut *self.oracle
    }
}

impl<O: Oracle> Drop for VariationScope<'_, O> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.oracle.restore(saved);
        }
    }
}
