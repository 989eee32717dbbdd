// Core board model
// Handles difficulty presets, mine placement, neighbor counting, flood-fill reveal and the win check

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::xtm_error::BoardError;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,    // 10x10, 5 mines
    Normal,  // 20x20, 40 mines
    Hard,    // 30x30, 150 mines
    Extreme, // 30x60, 400 mines
}

impl Serialize for Difficulty {
    /// Serialize difficulty as its stable name (also used as a map key in the rankings file)
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Difficulty, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Difficulty::from_name(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown difficulty `{}`", s)))
    }
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    /// Board dimensions and mine count: (rows, cols, mines)
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Easy => (10, 10, 5),
            Difficulty::Normal => (20, 20, 40),
            Difficulty::Hard => (30, 30, 150),
            Difficulty::Extreme => (30, 60, 400),
        }
    }

    /// Identifier written to the save and rankings files
    /// Must remain stable across versions
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Extreme => "Extreme",
        }
    }

    /// Parse a persisted name; the Korean names of older files are accepted too
    pub fn from_name(name: &str) -> Option<Difficulty> {
        match name.trim() {
            "Easy" | "쉬움" => Some(Difficulty::Easy),
            "Normal" | "보통" => Some(Difficulty::Normal),
            "Hard" | "어려움" => Some(Difficulty::Hard),
            "Extreme" | "극한" => Some(Difficulty::Extreme),
            _ => None,
        }
    }

    pub fn to_index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Normal => 1,
            Difficulty::Hard => 2,
            Difficulty::Extreme => 3,
        }
    }

    pub fn from_index(i: usize) -> Difficulty {
        Difficulty::ALL[i.min(Difficulty::ALL.len() - 1)]
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Easy
    }
}

/// A single grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    row: usize,
    col: usize,
    mine: bool,
    opened: bool,
    flagged: bool,
    adj: u8, // Adjacent mine count (0-8)
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Cell {
            row,
            col,
            mine: false,
            opened: false,
            flagged: false,
            adj: 0,
        }
    }

    /// Rebuild a cell with every field given, as read back from a save file
    pub fn restored(row: usize, col: usize, mine: bool, opened: bool, flagged: bool, adj: u8) -> Self {
        Cell {
            row,
            col,
            mine,
            opened,
            flagged,
            adj,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn neighbor_mines(&self) -> u8 {
        self.adj
    }
}

/// Result of a reveal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Opened(usize), // number of cells opened, flood fill included
    HitMine,
}

impl RevealOutcome {
    pub fn is_loss(self) -> bool {
        matches!(self, RevealOutcome::HitMine)
    }
}

// Row-major neighbor offsets (row delta, col delta)
const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// The minefield: rows x cols cells stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board; mines are placed later, on the first reveal
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::new(row, col));
            }
        }
        Board { rows, cols, cells }
    }

    /// Rebuild a board from persisted cells
    /// Cells must be listed row-major and carry their own position
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyDimensions);
        }
        if cells.len() != rows * cols {
            return Err(BoardError::CellCount {
                expected: rows * cols,
                found: cells.len(),
            });
        }
        for (index, cell) in cells.iter().enumerate() {
            if cell.row >= rows || cell.col >= cols || cell.row * cols + cell.col != index {
                return Err(BoardError::Misplaced {
                    index,
                    row: cell.row,
                    col: cell.col,
                });
            }
        }
        Ok(Board { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Flat index of (row, col), or None when outside the grid
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    /// Up to 8 neighbors of (row, col), clipped at the edges, in row-major order
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (rows, cols) = (self.rows, self.cols);
        DISPLACEMENTS.into_iter().filter_map(move |(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < rows && c < cols).then_some((r, c))
        })
    }

    /// Place mines anywhere except the first cell and its neighbors, then recount adjacency
    /// When the grid cannot hold that many mines outside the safe zone, every candidate
    /// becomes a mine and fewer than requested are placed
    /// Returns the number of mines actually placed
    pub fn place_mines<R: Rng + ?Sized>(
        &mut self,
        first: (usize, usize),
        mine_count: usize,
        rng: &mut R,
    ) -> usize {
        let Some(first_idx) = self.index(first.0, first.1) else {
            return 0;
        };
        let cols = self.cols;
        let mut safe_zone: Vec<usize> = self
            .neighbors(first.0, first.1)
            .map(|(r, c)| r * cols + c)
            .collect();
        safe_zone.push(first_idx);

        for cell in &mut self.cells {
            cell.mine = false;
        }
        let candidates: Vec<usize> = (0..self.cells.len())
            .filter(|i| !safe_zone.contains(i))
            .collect();
        if mine_count > candidates.len() {
            warn!(
                requested = mine_count,
                available = candidates.len(),
                "Board too small for requested mines outside the safe zone, placing fewer"
            );
        }

        let mut placed = 0;
        for &i in candidates.choose_multiple(rng, mine_count) {
            self.cells[i].mine = true;
            placed += 1;
        }
        self.recount_neighbors();
        debug!(placed, rows = self.rows, cols = self.cols, ?first, "Mines placed");
        placed
    }

    fn recount_neighbors(&mut self) {
        let counts: Vec<u8> = self
            .cells
            .iter()
            .map(|cell| {
                self.neighbors(cell.row, cell.col)
                    .filter(|&(r, c)| self.cells[r * self.cols + c].mine)
                    .count() as u8
            })
            .collect();
        for (cell, adj) in self.cells.iter_mut().zip(counts) {
            cell.adj = adj;
        }
    }

    /// Open a cell
    /// - Opened or flagged cells are left alone
    /// - A mine ends the game (HitMine)
    /// - A zero cell opens its unflagged neighbors, transitively (explicit-stack flood fill)
    pub fn reveal(&mut self, row: usize, col: usize) -> RevealOutcome {
        let Some(idx) = self.index(row, col) else {
            return RevealOutcome::NoChange;
        };
        let cell = &mut self.cells[idx];
        if cell.opened || cell.flagged {
            return RevealOutcome::NoChange;
        }
        cell.opened = true;
        if cell.mine {
            return RevealOutcome::HitMine;
        }

        let mut opened = 1;
        if cell.adj == 0 {
            let mut stack = vec![(row, col)];
            while let Some((r, c)) = stack.pop() {
                for (nr, nc) in self.neighbors(r, c) {
                    let next = &mut self.cells[nr * self.cols + nc];
                    if next.opened || next.flagged || next.mine {
                        continue;
                    }
                    next.opened = true;
                    opened += 1;
                    if next.adj == 0 {
                        stack.push((nr, nc));
                    }
                }
            }
        }
        RevealOutcome::Opened(opened)
    }

    /// Toggle the flag on a closed cell; returns whether anything changed
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> bool {
        let Some(idx) = self.index(row, col) else {
            return false;
        };
        let cell = &mut self.cells[idx];
        if cell.opened {
            return false;
        }
        cell.flagged = !cell.flagged;
        true
    }

    /// All non-mine cells have been opened
    pub fn is_won(&self) -> bool {
        self.cells.iter().all(|c| c.mine || c.opened)
    }

    pub fn mines_placed(&self) -> usize {
        self.cells.iter().filter(|c| c.mine).count()
    }

    pub fn flag_count(&self) -> usize {
        self.cells.iter().filter(|c| c.flagged).count()
    }

    pub fn opened_count(&self) -> usize {
        self.cells.iter().filter(|c| c.opened).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board_with_mines(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Board {
        let mut board = Board::new(rows, cols);
        for &(r, c) in mines {
            let i = board.index(r, c).unwrap();
            board.cells[i].mine = true;
        }
        board.recount_neighbors();
        board
    }

    fn opened(board: &Board) -> Vec<(usize, usize)> {
        board
            .cells()
            .iter()
            .filter(|c| c.is_opened())
            .map(|c| (c.row(), c.col()))
            .collect()
    }

    #[test]
    fn first_click_area_stays_clear() {
        let mut board = Board::new(10, 10);
        let mut rng = StdRng::seed_from_u64(7);

        let placed = board.place_mines((5, 5), 5, &mut rng);

        assert_eq!(placed, 5);
        assert_eq!(board.mines_placed(), 5);
        for r in 4..=6 {
            for c in 4..=6 {
                assert!(!board.cell(r, c).unwrap().is_mine(), "mine at ({}, {})", r, c);
            }
        }
    }

    #[test]
    fn placement_is_reproducible_with_the_same_seed() {
        let mut a = Board::new(20, 20);
        let mut b = Board::new(20, 20);
        a.place_mines((0, 0), 40, &mut StdRng::seed_from_u64(99));
        b.place_mines((0, 0), 40, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn too_many_mines_fill_every_candidate() {
        // corner click: safe zone is 4 cells, leaving 12 candidates
        let mut board = Board::new(4, 4);
        let placed = board.place_mines((0, 0), 20, &mut StdRng::seed_from_u64(1));
        assert_eq!(placed, 12);
        assert_eq!(board.mines_placed(), 12);

        // center click on 3x3: the safe zone is the whole board
        let mut board = Board::new(3, 3);
        let placed = board.place_mines((1, 1), 5, &mut StdRng::seed_from_u64(1));
        assert_eq!(placed, 0);
        assert_eq!(board.mines_placed(), 0);
    }

    #[test]
    fn neighbor_counts_match_mines_around() {
        for seed in 0..20 {
            let mut board = Board::new(16, 30);
            board.place_mines((3, 17), 99, &mut StdRng::seed_from_u64(seed));
            for cell in board.cells() {
                let expected = board
                    .neighbors(cell.row(), cell.col())
                    .filter(|&(r, c)| board.cell(r, c).unwrap().is_mine())
                    .count();
                assert_eq!(cell.neighbor_mines() as usize, expected);
            }
        }
    }

    #[test]
    fn neighbors_are_clipped_and_row_major() {
        let board = Board::new(3, 4);
        let corner: Vec<_> = board.neighbors(0, 0).collect();
        assert_eq!(corner, vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(board.neighbors(0, 2).count(), 5);
        assert_eq!(
            board.neighbors(1, 1).collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
        assert_eq!(board.neighbors(2, 3).count(), 3);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_its_border() {
        // 4x4 with one mine in the bottom-right corner
        let mut board = board_with_mines(4, 4, &[(3, 3)]);

        let outcome = board.reveal(0, 0);

        assert_eq!(outcome, RevealOutcome::Opened(15));
        assert!(!board.cell(3, 3).unwrap().is_opened());
        assert_eq!(board.cell(2, 2).unwrap().neighbor_mines(), 1);
        assert!(board.is_won());
    }

    #[test]
    fn flood_fill_stops_at_numbers() {
        // a wall of mines on column 2 splits the board
        let mut board = board_with_mines(3, 5, &[(0, 2), (1, 2), (2, 2)]);

        board.reveal(1, 0);

        assert_eq!(
            opened(&board),
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]
        );
        assert!(!board.is_won());
    }

    #[test]
    fn flood_fill_region_is_maximal_and_mine_free() {
        for seed in 0..30 {
            let mut board = Board::new(12, 12);
            let mut rng = StdRng::seed_from_u64(seed);
            board.place_mines((6, 6), 20, &mut rng);
            board.toggle_flag(0, 0);
            board.toggle_flag(11, 11);

            board.reveal(6, 6);

            for cell in board.cells().iter().filter(|c| c.is_opened()) {
                assert!(!cell.is_mine());
                assert!(!cell.is_flagged());
                let around: Vec<&Cell> = board
                    .neighbors(cell.row(), cell.col())
                    .map(|(r, c)| board.cell(r, c).unwrap())
                    .collect();
                if cell.neighbor_mines() == 0 {
                    assert!(around.iter().all(|n| n.is_opened() || n.is_flagged()));
                }
                if (cell.row(), cell.col()) != (6, 6) {
                    assert!(around.iter().any(|n| n.is_opened() && n.neighbor_mines() == 0));
                }
            }
        }
    }

    #[test]
    fn flags_block_reveal_and_flood_fill() {
        let mut board = board_with_mines(1, 5, &[]);
        assert!(board.toggle_flag(0, 2));

        assert_eq!(board.reveal(0, 2), RevealOutcome::NoChange);
        assert_eq!(board.reveal(0, 0), RevealOutcome::Opened(2));
        assert_eq!(opened(&board), vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn opening_a_mine_is_a_loss() {
        let mut board = board_with_mines(2, 2, &[(0, 0)]);
        board.reveal(1, 1);
        board.reveal(0, 1);

        let outcome = board.reveal(0, 0);

        assert!(outcome.is_loss());
        assert!(board.cell(0, 0).unwrap().is_opened());
    }

    #[test]
    fn repeated_and_invalid_reveals_change_nothing() {
        let mut board = board_with_mines(2, 2, &[(0, 0)]);
        assert_eq!(board.reveal(1, 1), RevealOutcome::Opened(1));
        assert_eq!(board.reveal(1, 1), RevealOutcome::NoChange);
        assert_eq!(board.reveal(2, 0), RevealOutcome::NoChange);
        assert!(!board.toggle_flag(0, 9));
    }

    #[test]
    fn opened_cells_cannot_be_flagged() {
        let mut board = board_with_mines(2, 2, &[(0, 0)]);
        board.reveal(1, 1);
        assert!(!board.toggle_flag(1, 1));
        assert!(board.toggle_flag(0, 0));
        assert!(board.toggle_flag(0, 0));
        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn won_only_when_every_safe_cell_is_open() {
        let mut board = board_with_mines(2, 2, &[(0, 0)]);
        assert!(!board.is_won());
        board.reveal(0, 1);
        board.reveal(1, 0);
        assert!(!board.is_won());
        board.toggle_flag(0, 0);
        board.reveal(1, 1);
        assert!(board.is_won());
    }

    #[test]
    fn from_cells_rejects_bad_shapes() {
        let board = board_with_mines(2, 3, &[(1, 1)]);
        let mut cells = board.cells().to_vec();

        assert_eq!(
            Board::from_cells(2, 3, cells.clone()),
            Ok(board.clone())
        );
        assert_eq!(
            Board::from_cells(3, 3, cells.clone()),
            Err(BoardError::CellCount { expected: 9, found: 6 })
        );
        assert_eq!(Board::from_cells(0, 3, vec![]), Err(BoardError::EmptyDimensions));

        cells.swap(0, 1);
        assert_eq!(
            Board::from_cells(2, 3, cells),
            Err(BoardError::Misplaced { index: 0, row: 0, col: 1 })
        );
    }

    #[test]
    fn difficulty_names_round_trip_and_accept_korean() {
        let json = serde_json::to_string(&Difficulty::Extreme).unwrap();
        assert_eq!(json, "\"Extreme\"");
        let d: Difficulty = serde_json::from_str("\"어려움\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
        assert!(serde_json::from_str::<Difficulty>("\"Custom\"").is_err());
        assert_eq!(Difficulty::Normal.params(), (20, 20, 40));
        assert_eq!(Difficulty::from_index(9), Difficulty::Extreme);
    }
}
