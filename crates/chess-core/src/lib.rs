//! PGN import for puzzle trees.
//!
//! `tokenizer` and `directives` are the leaves, `move_tree` builds the
//! recursive tree on top of an [`oracle::Oracle`], and `pgn` handles whole
//! uploads.

pub mod directives;
pub mod error;
pub mod game_data;
pub mod move_tree;
pub mod oracle;
pub mod pgn;
pub mod tokenizer;

pub use error::{MoveRejected, PgnError};
pub use game_data::{GameHeaders, Orientation, PuzzleGame};
pub use move_tree::{build_tree, replay_mainline, GameTree, MoveNode, SkippedMove};
pub use oracle::{AppliedMove, Oracle, ShakmatyOracle, STANDARD_START_FEN};
pub use pgn::{import_games, parse_game, split_games, ImportSummary, RawGame};
