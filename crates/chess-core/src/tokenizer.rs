//! Movetext tokenizer.
//!
//! Turns the movetext of one game into a flat token stream. Scanning is
//! lenient: characters that fit no rule are skipped, so this never fails.

use std::sync::LazyLock;

use regex::Regex;

static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:O-O-O|O-O|[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=?[QRBN])?)[+#]?")
        .expect("move pattern compiles")
});

static ZERO_CASTLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0-0(?:-0)?[+#]?").expect("castle pattern compiles"));

/// Inline annotation marks and the NAG each one stands for.
/// Two-character marks come first so they win over their prefixes.
const ANNOTATION_MARKS: [(&str, u32); 6] = [
    ("!!", 3),
    ("??", 4),
    ("!?", 5),
    ("?!", 6),
    ("!", 1),
    ("?", 2),
];

const RESULTS: [(&str, GameResult); 4] = [
    ("1/2-1/2", GameResult::Draw),
    ("1-0", GameResult::WhiteWins),
    ("0-1", GameResult::BlackWins),
    ("*", GameResult::Unknown),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Move(String),
    MoveNumber(u32),
    Comment(String),
    VariationStart,
    VariationEnd,
    Nag(u32),
    Result(GameResult),
}

/// Tokenize one game's movetext.
pub fn tokenize(movetext: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut at_line_start = true;

    while pos < movetext.len() {
        let rest = &movetext[pos..];
        let Some(c) = rest.chars().next() else { break };

        if c.is_whitespace() {
            if c == '\n' {
                at_line_start = true;
            }
            pos += c.len_utf8();
            continue;
        }

        // `%` at the start of a line escapes the whole line
        if c == '%' && at_line_start {
            pos += line_length(rest);
            continue;
        }
        at_line_start = false;

        match c {
            '{' => {
                let (body, consumed) = read_brace_comment(rest);
                tokens.push(Token::Comment(body.to_string()));
                pos += consumed;
            }
            ';' => {
                let len = line_length(rest);
                tokens.push(Token::Comment(rest[1..len].trim_end().to_string()));
                pos += len;
            }
            '(' => {
                tokens.push(Token::VariationStart);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::VariationEnd);
                pos += 1;
            }
            '$' => {
                let digits = digit_run(&rest[1..]);
                if digits > 0 {
                    if let Ok(nag) = rest[1..1 + digits].parse() {
                        tokens.push(Token::Nag(nag));
                    }
                }
                pos += 1 + digits;
            }
            _ => {
                if let Some((literal, result)) = RESULTS.iter().find(|(lit, _)| rest.starts_with(lit)) {
                    tokens.push(Token::Result(*result));
                    pos += literal.len();
                } else if let Some(m) = ZERO_CASTLE_RE.find(rest) {
                    tokens.push(Token::Move(m.as_str().replace('0', "O")));
                    pos += m.end();
                    pos += read_annotation_mark(&movetext[pos..], &mut tokens);
                } else if c.is_ascii_digit() {
                    let digits = digit_run(rest);
                    let periods = rest[digits..].chars().take_while(|&ch| ch == '.').count();
                    if let Ok(number) = rest[..digits].parse() {
                        tokens.push(Token::MoveNumber(number));
                    }
                    pos += digits + periods;
                } else if c.is_ascii_alphabetic() {
                    match MOVE_RE.find(rest) {
                        Some(m) => {
                            tokens.push(Token::Move(normalize_promotion(m.as_str())));
                            pos += m.end();
                            pos += read_annotation_mark(&movetext[pos..], &mut tokens);
                        }
                        None => pos += word_length(rest),
                    }
                } else {
                    pos += c.len_utf8();
                }
            }
        }
    }

    tokens
}

/// Read a `{...}` comment starting at `rest[0]`. Returns the body and the
/// number of bytes consumed. Nested braces are kept in the body; an
/// unterminated comment runs to the end of input.
fn read_brace_comment(rest: &str) -> (&str, usize) {
    let mut depth = 0usize;
    for (i, ch) in rest.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return (&rest[1..i], i + 1);
                }
            }
            _ => {}
        }
    }
    (&rest[1..], rest.len())
}

/// Consume an annotation mark such as `!?` following a move, skipping
/// whitespace before it. Returns bytes consumed (0 if no mark).
fn read_annotation_mark(rest: &str, tokens: &mut Vec<Token>) -> usize {
    let trimmed = rest.trim_start();
    let skipped = rest.len() - trimmed.len();

    for (mark, nag) in ANNOTATION_MARKS {
        if trimmed.starts_with(mark) {
            tokens.push(Token::Nag(nag));
            return skipped + mark.len();
        }
    }
    0
}

/// `e8Q` -> `e8=Q`
fn normalize_promotion(san: &str) -> String {
    let bytes = san.as_bytes();
    let body_end = san.trim_end_matches(['+', '#']).len();
    if body_end >= 3 {
        let last = bytes[body_end - 1];
        let before = bytes[body_end - 2];
        if matches!(last, b'Q' | b'R' | b'B' | b'N') && before.is_ascii_digit() {
            return format!("{}={}", &san[..body_end - 1], &san[body_end - 1..]);
        }
    }
    san.to_string()
}

fn digit_run(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn line_length(s: &str) -> usize {
    s.find('\n').unwrap_or(s.len())
}

fn word_length(s: &str) -> usize {
    s.char_indices()
        .find(|&(_, ch)| ch.is_whitespace() || matches!(ch, '{' | '}' | '(' | ')' | '$' | ';'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
        .max(1)
}
