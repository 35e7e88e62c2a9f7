//! PGN puzzle importer
//!
//! Reads a PGN file with one or more games and writes the parsed move trees
//! as a JSON array, one record per playable game.
//!
//! Usage: cargo run --release --bin pgn-import -- <input.pgn> [--output <path>] [--pretty]

mod config;
mod error;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chess_core::PuzzleGame;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ImportConfig;
use crate::error::ImportError;

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    pretty: bool,
}

/// Parse `<input> [--output <path>] [--pretty]` from CLI args
fn parse_args() -> Result<Args, ImportError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut input = None;
    let mut output = None;
    let mut pretty = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                output = Some(PathBuf::from(args.get(i + 1).ok_or(ImportError::Usage)?));
                i += 1;
            }
            "--pretty" => pretty = true,
            arg if input.is_none() && !arg.starts_with('-') => input = Some(PathBuf::from(arg)),
            _ => return Err(ImportError::Usage),
        }
        i += 1;
    }

    Ok(Args {
        input: input.ok_or(ImportError::Usage)?,
        output,
        pretty,
    })
}

/// Read the upload, refusing files over `max_bytes` before loading them.
fn read_input(path: &Path, max_bytes: u64) -> Result<String, ImportError> {
    let size = fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ImportError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }
    Ok(fs::read_to_string(path)?)
}

fn strip_diagnostics(games: &mut [PuzzleGame]) {
    for game in games {
        game.skipped_moves.clear();
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let config = ImportConfig::from_env()?;
    let args = parse_args()?;

    info!(input = %args.input.display(), "Importing PGN");
    let pgn = read_input(&args.input, config.max_bytes)?;

    let mut summary = chess_core::import_games(&pgn);
    if !config.keep_diagnostics {
        strip_diagnostics(&mut summary.games);
    }

    let json = if args.pretty || config.pretty {
        serde_json::to_string_pretty(&summary.games)?
    } else {
        serde_json::to_string(&summary.games)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            info!(output = %path.display(), games = summary.games.len(), "Wrote puzzle trees");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
