use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

const APP_DIR_NAME: &str = "coral";
const SCORE_FILE_NAME: &str = "highscore.bin";

/// Size of the on-disk record: one big-endian `u32`.
pub const SCORE_RECORD_LEN: usize = 4;

/// Reasons a stored high score could not be read or written.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("high score file {path} holds {len} bytes, expected {SCORE_RECORD_LEN}")]
    Truncated { path: PathBuf, len: usize },
}

/// Persists the best score across sessions.
///
/// Both operations are best-effort: failures are logged, never surfaced.
pub trait HighScoreStore {
    /// Returns the stored score, or 0 when none can be read.
    fn load(&self) -> u32;

    fn save(&mut self, score: u32);
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// High score kept in a 4-byte big-endian file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileHighScoreStore {
    fn default() -> Self {
        Self::new(scores_path())
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u32 {
        match read_score(&self.path) {
            Ok(score) => score,
            Err(ScoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => 0,
            Err(error) => {
                warn!("ignoring unreadable high score: {error}");
                0
            }
        }
    }

    fn save(&mut self, score: u32) {
        match write_score(&self.path, score) {
            Ok(()) => info!("saved high score {score} to {}", self.path.display()),
            Err(error) => warn!("could not save high score: {error}"),
        }
    }
}

/// In-memory store for tests and sessions without persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryHighScoreStore {
    pub score: u32,
    pub writes: u32,
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> u32 {
        self.score
    }

    fn save(&mut self, score: u32) {
        self.score = score;
        self.writes += 1;
    }
}

/// Reads the first four bytes of `path` as a big-endian score.
pub fn read_score(path: &Path) -> Result<u32, ScoreError> {
    let raw = fs::read(path).map_err(|source| ScoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let record: [u8; SCORE_RECORD_LEN] = raw
        .get(..SCORE_RECORD_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| ScoreError::Truncated {
            path: path.to_path_buf(),
            len: raw.len(),
        })?;

    Ok(u32::from_be_bytes(record))
}

/// Overwrites `path` with `score`, creating parent directories when needed.
pub fn write_score(path: &Path, score: u32) -> Result<(), ScoreError> {
    let io_error = |source| ScoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, score.to_be_bytes()).map_err(io_error)
}
