// Save-game persistence
// Reads and writes the JSON snapshot of a game in progress

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::xtm_error::StoreError;
use crate::xtm_game::{Board, Cell, Difficulty};

pub const SAVE_FILE: &str = "savegame.json";
pub const RANKINGS_FILE: &str = "rankings.json";

/// Per-cell record of a save file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CellSaveState {
    pub row: usize,
    pub col: usize,
    pub is_mine: bool,
    pub is_opened: bool,
    pub is_flagged: bool,
    pub neighbor_mine_count: u8,
}

impl From<&Cell> for CellSaveState {
    fn from(cell: &Cell) -> Self {
        CellSaveState {
            row: cell.row(),
            col: cell.col(),
            is_mine: cell.is_mine(),
            is_opened: cell.is_opened(),
            is_flagged: cell.is_flagged(),
            neighbor_mine_count: cell.neighbor_mines(),
        }
    }
}

impl From<&CellSaveState> for Cell {
    fn from(s: &CellSaveState) -> Self {
        Cell::restored(
            s.row,
            s.col,
            s.is_mine,
            s.is_opened,
            s.is_flagged,
            s.neighbor_mine_count,
        )
    }
}

/// Snapshot of a game in progress
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SaveData {
    pub difficulty_name: Difficulty,
    pub rows: usize,
    pub cols: usize,
    pub mine_count: usize,
    pub current_time: u32, // Elapsed seconds
    pub nickname: String,
    pub cells: Vec<CellSaveState>,
}

impl SaveData {
    /// Rebuild the board described by this snapshot
    pub fn to_board(&self) -> Result<Board, StoreError> {
        let cells = self.cells.iter().map(Cell::from).collect();
        Ok(Board::from_cells(self.rows, self.cols, cells)?)
    }
}

/// Overwrite the save file with `data`
pub fn save_game(path: &Path, data: &SaveData) -> Result<(), StoreError> {
    let json = serde_json::to_string(data).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &json)?;
    info!(path = %path.display(), nickname = %data.nickname, "Game saved");
    Ok(())
}

/// Read a save file; NotFound when there is none
pub fn load_game(path: &Path) -> Result<SaveData, StoreError> {
    let json = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let data = serde_json::from_str(&json).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Save file loaded");
    Ok(data)
}

/// Remove the save file; a missing file is not an error
pub fn delete_save(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Save file removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove save file"),
    }
}

pub fn has_save(path: &Path) -> bool {
    path.is_file()
}

/// Write a whole file, creating its parent directory if needed
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }
    fs::write(path, contents).map_err(|e| StoreError::io(path, e))
}

/// Locations of the save and rankings files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    pub save_path: PathBuf,
    pub rankings_path: PathBuf,
}

impl Storage {
    pub fn in_dir(dir: &Path) -> Self {
        Storage {
            save_path: dir.join(SAVE_FILE),
            rankings_path: dir.join(RANKINGS_FILE),
        }
    }
}

/// Per-user data directory (e.g., ~/.local/share/xtmines on Linux)
/// Falls back to the current directory if ProjectDirs is unavailable
pub fn default_data_dir() -> PathBuf {
    if let Some(proj) = ProjectDirs::from("com", "xhbl", env!("CARGO_PKG_NAME")) {
        return proj.data_dir().to_path_buf();
    }
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
