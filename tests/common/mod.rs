use chess_core::{AppliedMove, MoveNode, MoveRejected, Oracle, PgnError, ShakmatyOracle};
use shakmaty::Color;

/// Two short annotated studies in one upload, the second from a custom FEN.
pub const TWO_GAME_PGN: &str = r#"[Event "Italian ideas"]
[Rating "1420"]
[Result "*"]

1. e4 e5 2. Nf3 {Develops [%cal Gg1f3]} Nc6 (2... d6 3. d4) 3. Bc4! *

[Event "King and pawn"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"]
[Rating "900"]

1. e4 Kd7 2. Kd2 *
"#;

/// Oracle wrapper that records the FEN after every move it accepts, so tests
/// can compare the positions visited while parsing with a later replay.
pub struct RecordingOracle {
    inner: ShakmatyOracle,
    pub visited: Vec<String>,
}

impl Oracle for RecordingOracle {
    type Snapshot = ShakmatyOracle;

    fn from_fen(fen: &str) -> Result<Self, PgnError> {
        Ok(Self {
            inner: ShakmatyOracle::from_fen(fen)?,
            visited: Vec::new(),
        })
    }

    fn turn(&self) -> Color {
        self.inner.turn()
    }

    fn play(&mut self, text: &str) -> Result<AppliedMove, MoveRejected> {
        let applied = self.inner.play(text)?;
        self.visited.push(self.inner.fen());
        Ok(applied)
    }

    fn fen(&self) -> String {
        self.inner.fen()
    }

    fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    fn reset(&mut self, fen: &str) -> Result<(), PgnError> {
        self.inner.reset(fen)
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.inner.snapshot()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        self.inner.restore(snapshot)
    }
}

pub fn san_line(line: &[MoveNode]) -> Vec<&str> {
    line.iter().map(|node| node.mv.as_str()).collect()
}
