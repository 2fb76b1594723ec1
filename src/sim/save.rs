/// Score persistence.
///
/// A terminal has no address bar, so the share URL that carries the board
/// is kept in a one-line text file. The file holds exactly what a player
/// would paste into a browser: `<base>?s=<encoded board>`.
///
/// Relative paths resolve against the save directory:
///   1. the executable's directory, when writable (portable installs)
///   2. `~/.local/share/checksnake`
///   3. the current working directory

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::scores::{ScoreBoard, ScoreError};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Encode(#[from] ScoreError),
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

pub fn save_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ won't be writable
            let test_path = parent.join(".write_test_checksnake");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/checksnake");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Absolute paths pass through; relative ones land in `save_dir()`.
pub fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        save_dir().join(path)
    }
}

// ══════════════════════════════════════════════════════════════
// Load / store
// ══════════════════════════════════════════════════════════════

/// Read the stored share URL. Missing or unreadable file -> empty board.
pub fn load_board(path: &Path, capacity: usize) -> ScoreBoard {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let url = text.lines().next().unwrap_or("");
            let board = ScoreBoard::from_url(url, capacity);
            debug!(path = %path.display(), entries = board.entries().len(), "score board loaded");
            board
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no score board yet");
            ScoreBoard::new(capacity)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read score board");
            ScoreBoard::new(capacity)
        }
    }
}

/// The stored URL line as-is, if any.
pub fn load_url(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| text.lines().next().map(str::to_string))
        .filter(|line| !line.trim().is_empty())
}

/// Write the board as a share URL built on `base_url`. Returns the URL.
pub fn save_board(path: &Path, board: &ScoreBoard, base_url: &str) -> Result<String, SaveError> {
    let url = board.to_url(base_url)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|source| SaveError::Io { path: parent.to_path_buf(), source })?;
    }
    std::fs::write(path, format!("{url}\n"))
        .map_err(|source| SaveError::Io { path: path.to_path_buf(), source })?;
    info!(path = %path.display(), entries = board.entries().len(), "score board saved");
    Ok(url)
}
