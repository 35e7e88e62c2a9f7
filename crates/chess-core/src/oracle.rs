//! Chess rules oracle used by the tree builder.
//!
//! The builder never reasons about legality itself. It asks the oracle whose
//! turn it is, hands it move text, and snapshots it around variations.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position};

use crate::error::{MoveRejected, PgnError};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A move the oracle accepted and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Canonical SAN including check/mate suffix.
    pub san: String,
    pub from: Option<String>,
    pub to: String,
    pub is_capture: bool,
    pub is_check: bool,
}

pub trait Oracle: Sized {
    /// Opaque saved state, restored verbatim by [`Oracle::restore`].
    type Snapshot;

    fn from_fen(fen: &str) -> Result<Self, PgnError>;

    fn turn(&self) -> Color;

    /// Validate `text` in the current position and apply it.
    fn play(&mut self, text: &str) -> Result<AppliedMove, MoveRejected>;

    fn fen(&self) -> String;

    /// Take back the last applied move. Returns false if there is none.
    fn undo(&mut self) -> bool;

    /// Jump to an arbitrary position, forgetting the move history.
    fn reset(&mut self, fen: &str) -> Result<(), PgnError>;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot);
}

/// Oracle backed by `shakmaty`, keeping earlier positions for undo.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyOracle {
    pos: Chess,
    history: Vec<Chess>,
}

impl ShakmatyOracle {
    /// Number of plies that can currently be undone.
    pub fn depth(&self) -> usize {
        self.history.len()
    }
}

fn parse_position(fen: &str) -> Result<Chess, PgnError> {
    let invalid = |reason: String| PgnError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{e}")))
}

impl Oracle for ShakmatyOracle {
    type Snapshot = ShakmatyOracle;

    fn from_fen(fen: &str) -> Result<Self, PgnError> {
        Ok(Self {
            pos: parse_position(fen)?,
            history: Vec::new(),
        })
    }

    fn turn(&self) -> Color {
        self.pos.turn()
    }

    fn play(&mut self, text: &str) -> Result<AppliedMove, MoveRejected> {
        let san_plus: SanPlus = text
            .parse()
            .map_err(|_| MoveRejected::Unparseable(text.to_string()))?;

        let mv = san_plus
            .san
            .to_move(&self.pos)
            .map_err(|_| MoveRejected::Illegal(text.to_string()))?;

        let from = mv.from().map(|sq| sq.to_string());
        let to = mv.to().to_string();
        let is_capture = mv.is_capture();

        let before = self.pos.clone();
        let applied = SanPlus::from_move_and_play_unchecked(&mut self.pos, mv);
        self.history.push(before);

        Ok(AppliedMove {
            san: applied.to_string(),
            from,
            to,
            is_capture,
            is_check: self.pos.is_check(),
        })
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.pos = previous;
                true
            }
            None => false,
        }
    }

    fn reset(&mut self, fen: &str) -> Result<(), PgnError> {
        self.pos = parse_position(fen)?;
        self.history.clear();
        Ok(())
    }

    // Copies the whole undo history. The builder takes one per open
    // variation, so the cost is bounded by MAX_VARIATION_DEPTH times the
    // game length.
    fn snapshot(&self) -> Self::Snapshot {
        self.clone()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        *self = snapshot;
    }
}
