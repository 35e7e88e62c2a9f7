//! PGN collection handling: splits a multi-game upload into games, reads
//! their headers and builds one [`PuzzleGame`] per game.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::PgnError;
use crate::game_data::{GameHeaders, PuzzleGame};
use crate::move_tree::build_tree;
use crate::oracle::{Oracle, ShakmatyOracle, STANDARD_START_FEN};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[(\w+)\s+"((?:[^"\\]|\\.)*)"\]"#).expect("header pattern compiles")
});

static HEADER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:\[\w+\s+"(?:[^"\\]|\\.)*"\]\s*)+$"#).expect("header line pattern compiles")
});

/// One game as found in the upload, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGame {
    pub headers: String,
    pub movetext: String,
}

impl RawGame {
    fn is_blank(&self) -> bool {
        self.headers.trim().is_empty() && self.movetext.trim().is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub games: Vec<PuzzleGame>,
    /// Games that parsed but produced no playable moves.
    pub discarded_empty: usize,
    /// Games rejected outright (bad FEN header and similar).
    pub failed: usize,
}

/// Split a PGN blob into games. A header line seen after movetext starts the
/// next game; text with no headers at all is a single game.
pub fn split_games(input: &str) -> Vec<RawGame> {
    let mut games = Vec::new();
    let mut current = RawGame::default();
    let mut in_movetext = false;

    for line in input.lines() {
        if HEADER_LINE_RE.is_match(line) {
            if in_movetext {
                games.push(std::mem::take(&mut current));
                in_movetext = false;
            }
            current.headers.push_str(line);
            current.headers.push('\n');
        } else {
            if !line.trim().is_empty() {
                in_movetext = true;
            }
            current.movetext.push_str(line);
            current.movetext.push('\n');
        }
    }
    games.push(current);

    games.retain(|game| !game.is_blank());
    games
}

/// Read the tag pairs of one game.
pub fn parse_headers(block: &str) -> GameHeaders {
    let mut headers = GameHeaders::default();

    for cap in HEADER_RE.captures_iter(block) {
        let key = &cap[1];
        let value = unescape(&cap[2]);
        match key {
            "Event" => headers.event = Some(value),
            "FEN" => headers.fen = Some(value),
            "Rating" => headers.rating = value.trim().parse().ok(),
            _ => {}
        }
    }

    headers
}

fn unescape(value: &str) -> String {
    value.replace("\\\"", "\"").replace("\\\\", "\\")
}

/// Build the output record for one game, using its own oracle.
pub fn parse_game(raw: &RawGame) -> Result<PuzzleGame, PgnError> {
    let headers = parse_headers(&raw.headers);
    let fen = headers
        .fen
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(STANDARD_START_FEN)
        .to_string();

    let mut oracle = ShakmatyOracle::from_fen(&fen)?;
    let orientation = oracle.turn().into();
    let tree = build_tree(&raw.movetext, &mut oracle);

    if !tree.skipped.is_empty() {
        debug!(
            skipped = tree.skipped.len(),
            event = headers.event.as_deref().unwrap_or("?"),
            "Game had move tokens the oracle rejected"
        );
    }

    let tag = headers.event.filter(|e| !e.trim().is_empty() && e != "?");

    Ok(PuzzleGame {
        fen,
        mainline: tree.mainline,
        orientation,
        tag,
        rating: headers.rating,
        skipped_moves: tree.skipped,
    })
}

/// Import every game in `input`, in file order. A game that fails or has
/// an empty mainline is counted and skipped; it never aborts the rest.
pub fn import_games(input: &str) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for (index, raw) in split_games(input).iter().enumerate() {
        match parse_game(raw) {
            Ok(game) if game.mainline.is_empty() => {
                warn!(game = index + 1, "Discarding game with empty mainline");
                summary.discarded_empty += 1;
            }
            Ok(game) => summary.games.push(game),
            Err(e) => {
                warn!(game = index + 1, error = %e, "Skipping game");
                summary.failed += 1;
            }
        }
    }

    info!(
        imported = summary.games.len(),
        discarded = summary.discarded_empty,
        failed = summary.failed,
        "PGN import finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::Orientation;

    #[test]
    fn test_parse_game_basic() {
        let pgn = r#"[Event "Fork practice"]
[White "Player1"]
[Black "Player2"]
[Result "1-0"]
[Rating "1500"]

1. e4 e5 2. Nf3 Nc6 1-0"#;

        let games = split_games(pgn);
        assert_eq!(games.len(), 1);

        let game = parse_game(&games[0]).unwrap();
        assert_eq!(game.fen, STANDARD_START_FEN);
        assert_eq!(game.orientation, Orientation::White);
        assert_eq!(game.tag.as_deref(), Some("Fork practice"));
        assert_eq!(game.rating, Some(1500));
        assert_eq!(game.mainline.len(), 4);
        assert_eq!(game.mainline[0].mv, "e4");
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(
            r#"[Event "The \"Immortal\" Game"]
[White "A"]
[Result "0-1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 b - - 0 1"]
[Rating "abc"]"#,
        );
        assert_eq!(headers.event.as_deref(), Some(r#"The "Immortal" Game"#));
        assert_eq!(headers.fen.as_deref(), Some("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1"));
        assert_eq!(headers.rating, None);
    }

    #[test]
    fn test_split_multiple_games() {
        let pgn = r#"[Event "One"]
[Result "*"]

1. e4 {[%cal Ge2e4]} e5 *

[Event "Two"]

1. d4 d5 *
"#;
        let games = split_games(pgn);
        assert_eq!(games.len(), 2);
        assert!(games[0].headers.contains("One"));
        assert!(games[0].movetext.contains("[%cal Ge2e4]"));
        assert!(games[1].movetext.contains("1. d4 d5"));
    }

    #[test]
    fn test_split_movetext_only() {
        let games = split_games("1. e4 e5\n2. Nf3\n");
        assert_eq!(games.len(), 1);
        assert!(games[0].headers.is_empty());
        assert!(split_games("   \n\n").is_empty());
    }

    #[test]
    fn test_orientation_from_fen() {
        let raw = RawGame {
            headers: r#"[FEN "4k3/8/8/8/8/8/4P3/4K3 b - - 0 1"]"#.to_string(),
            movetext: "1... Kd7 2. e4 *".to_string(),
        };
        let game = parse_game(&raw).unwrap();
        assert_eq!(game.orientation, Orientation::Black);
        assert_eq!(game.tag, None);
        assert_eq!(game.mainline.len(), 2);
    }

    #[test]
    fn test_import_skips_bad_and_empty_games() {
        let pgn = r#"[Event "Bad FEN"]
[FEN "not a position"]

1. e4 *

[Event "Empty"]

1. Ke2 *

[Event "Good"]

1. e4 e5 *
"#;
        let summary = import_games(pgn);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.discarded_empty, 1);
        assert_eq!(summary.games.len(), 1);
        assert_eq!(summary.games[0].tag.as_deref(), Some("Good"));
    }
}
