use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::move_tree::{MoveNode, SkippedMove};

/// The tag pairs an imported game uses; other tags are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameHeaders {
    pub event: Option<String>,
    pub fen: Option<String>,
    pub rating: Option<i32>,
}

/// Which side the board is shown from: the side to move at the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    White,
    Black,
}

impl From<Color> for Orientation {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Orientation::White,
            Color::Black => Orientation::Black,
        }
    }
}

/// One imported game, ready for storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleGame {
    pub fen: String,
    pub mainline: Vec<MoveNode>,
    pub orientation: Orientation,
    pub tag: Option<String>,
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_moves: Vec<SkippedMove>,
}
