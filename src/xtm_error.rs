// Error types shared by the board model and the persistence layer

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised when a board is rebuilt from persisted cells that do not fit its dimensions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board dimensions must be non-zero")]
    EmptyDimensions,
    #[error("expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },
    #[error("cell #{index} claims position ({row}, {col})")]
    Misplaced { index: usize, row: usize, col: usize },
}

/// Failures of the save-game and rankings files
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no file at {}", .0.display())]
    NotFound(PathBuf),
    #[error("malformed data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("saved board is inconsistent: {0}")]
    Corrupt(#[from] BoardError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(path)
        } else {
            StoreError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
