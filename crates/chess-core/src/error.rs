//! Error types for PGN import.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PgnError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Move '{0}' does not replay from the recorded position")]
    Replay(String),
}

/// Why the oracle refused a move token.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum MoveRejected {
    /// The text is not SAN at all.
    #[error("unparseable move: {0}")]
    Unparseable(String),

    /// Valid SAN, but no legal move matches it in the current position.
    #[error("illegal move: {0}")]
    Illegal(String),
}
