// A running game: first-click mine placement, timer, win/loss resolution, save/restore

use rand::rngs::StdRng;
use tracing::{error, info, warn};

use crate::xtm_error::StoreError;
use crate::xtm_game::{Board, Difficulty, RevealOutcome};
use crate::xtm_rank::{self, format_clock};
use crate::xtm_store::{self, CellSaveState, SaveData, Storage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub fn is_finished(self) -> bool {
        matches!(self, GameState::Won | GameState::Lost)
    }
}

/// What a finished game reports to the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub difficulty: Difficulty,
    pub nickname: String,
    pub elapsed: u32,
    pub ranked: bool, // Result made it into the rankings file
}

/// Callbacks fired by a session; the front end implements these
pub trait GameEvents {
    fn on_game_won(&mut self, summary: &GameSummary);
    fn on_game_lost(&mut self, summary: &GameSummary);
    fn on_return_to_menu(&mut self);
}

pub struct GameSession<E: GameEvents> {
    difficulty: Difficulty,
    mine_count: usize,
    nickname: String,
    board: Board,
    state: GameState,
    elapsed: u32,
    timer_running: bool,
    storage: Storage,
    events: E,
    rng: StdRng,
}

impl<E: GameEvents> GameSession<E> {
    /// A fresh game; mines are placed on the first open
    pub fn new(difficulty: Difficulty, nickname: &str, storage: Storage, events: E, rng: StdRng) -> Self {
        let (rows, cols, mines) = difficulty.params();
        info!(difficulty = difficulty.name(), nickname, "New game");
        GameSession {
            difficulty,
            mine_count: mines,
            nickname: nickname.to_string(),
            board: Board::new(rows, cols),
            state: GameState::NotStarted,
            elapsed: 0,
            timer_running: false,
            storage,
            events,
            rng,
        }
    }

    /// Resume a saved game on behalf of `nickname`, the player now logged in
    /// A snapshot taken before the first click resumes as NotStarted so mines still get placed
    pub fn restore(
        data: &SaveData,
        nickname: &str,
        storage: Storage,
        events: E,
        rng: StdRng,
    ) -> Result<Self, StoreError> {
        let board = data.to_board()?;
        let untouched = board.mines_placed() == 0 && board.opened_count() == 0;
        let state = if untouched {
            GameState::NotStarted
        } else {
            GameState::Playing
        };
        info!(
            difficulty = data.difficulty_name.name(),
            nickname,
            saved_by = %data.nickname,
            elapsed = data.current_time,
            "Game restored"
        );
        Ok(GameSession {
            difficulty: data.difficulty_name,
            mine_count: data.mine_count,
            nickname: nickname.to_string(),
            board,
            state,
            elapsed: data.current_time,
            timer_running: state == GameState::Playing,
            storage,
            events,
            rng,
        })
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    #[cfg(test)]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    /// MM:SS
    pub fn time_display(&self) -> String {
        format_clock(self.elapsed)
    }

    /// Mine counter for the status line; negative when over-flagged
    pub fn remaining_mines(&self) -> isize {
        self.mine_count as isize - self.board.flag_count() as isize
    }

    #[cfg(test)]
    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// One-second timer tick
    pub fn tick(&mut self) {
        if self.state == GameState::Playing && self.timer_running {
            self.elapsed = self.elapsed.saturating_add(1);
        }
    }

    fn stop_timer(&mut self) {
        self.timer_running = false;
    }

    /// Open a cell
    /// - Ignored once the game is over, or for invalid, opened or flagged cells
    /// - The first open places mines around a safe zone and starts the timer
    pub fn open_cell(&mut self, row: usize, col: usize) -> RevealOutcome {
        if self.state.is_finished() {
            return RevealOutcome::NoChange;
        }
        match self.board.cell(row, col) {
            Some(cell) if !cell.is_opened() && !cell.is_flagged() => {}
            _ => return RevealOutcome::NoChange,
        }

        if self.state == GameState::NotStarted {
            self.board.place_mines((row, col), self.mine_count, &mut self.rng);
            self.state = GameState::Playing;
            self.timer_running = true;
        }

        let outcome = self.board.reveal(row, col);
        if outcome.is_loss() {
            self.stop_timer();
            self.state = GameState::Lost;
            info!(row, col, elapsed = self.elapsed, "Mine hit, game lost");
            let summary = self.summary(false);
            self.events.on_game_lost(&summary);
            self.events.on_return_to_menu();
        } else if self.board.is_won() {
            self.stop_timer();
            self.state = GameState::Won;
            self.finish_won();
        }
        outcome
    }

    fn finish_won(&mut self) {
        info!(
            difficulty = self.difficulty.name(),
            nickname = %self.nickname,
            elapsed = self.elapsed,
            "Game won"
        );
        let ranked = match xtm_rank::record_result(
            &self.storage.rankings_path,
            self.difficulty,
            &self.nickname,
            self.elapsed,
        ) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Could not record ranking");
                false
            }
        };
        xtm_store::delete_save(&self.storage.save_path);
        let summary = self.summary(ranked);
        self.events.on_game_won(&summary);
        self.events.on_return_to_menu();
    }

    fn summary(&self, ranked: bool) -> GameSummary {
        GameSummary {
            difficulty: self.difficulty,
            nickname: self.nickname.clone(),
            elapsed: self.elapsed,
            ranked,
        }
    }

    /// Toggle a flag; only while playing
    pub fn flag_cell(&mut self, row: usize, col: usize) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.board.toggle_flag(row, col)
    }

    pub fn snapshot(&self) -> SaveData {
        SaveData {
            difficulty_name: self.difficulty,
            rows: self.board.rows(),
            cols: self.board.cols(),
            mine_count: self.mine_count,
            current_time: self.elapsed,
            nickname: self.nickname.clone(),
            cells: self.board.cells().iter().map(CellSaveState::from).collect(),
        }
    }

    /// Write the current game to the save file
    pub fn save(&self) -> Result<(), StoreError> {
        xtm_store::save_game(&self.storage.save_path, &self.snapshot())
    }

    /// Leave the game, optionally saving first
    /// The menu is notified even when saving fails; the error is returned for display
    pub fn return_to_menu(&mut self, save: bool) -> Result<(), StoreError> {
        self.stop_timer();
        let result = if save { self.save() } else { Ok(()) };
        if let Err(e) = &result {
            warn!(error = %e, "Save before leaving failed");
        }
        self.events.on_return_to_menu();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xtm_rank::RankingData;
    use crate::xtm_store::tests::scratch_dir;
    use rand::SeedableRng;
    use std::fs;

    #[derive(Debug, Default, PartialEq)]
    struct Recorder {
        won: Vec<GameSummary>,
        lost: Vec<GameSummary>,
        menu: usize,
    }

    impl GameEvents for Recorder {
        fn on_game_won(&mut self, summary: &GameSummary) {
            self.won.push(summary.clone());
        }

        fn on_game_lost(&mut self, summary: &GameSummary) {
            self.lost.push(summary.clone());
        }

        fn on_return_to_menu(&mut self) {
            self.menu += 1;
        }
    }

    fn session(tag: &str, seed: u64) -> GameSession<Recorder> {
        let storage = Storage::in_dir(&scratch_dir(tag));
        // Hard boards are dense enough that a single click never clears them
        GameSession::new(
            Difficulty::Hard,
            "tester",
            storage,
            Recorder::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn cleanup<E: GameEvents>(s: &GameSession<E>) {
        if let Some(dir) = s.storage.save_path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    fn first_cell(s: &GameSession<Recorder>, mine: bool) -> (usize, usize) {
        let cell = s
            .board()
            .cells()
            .iter()
            .find(|c| c.is_mine() == mine && !c.is_opened())
            .unwrap();
        (cell.row(), cell.col())
    }

    #[test]
    fn first_open_places_mines_and_starts_timer() {
        let mut s = session("first", 3);
        assert_eq!(s.state(), GameState::NotStarted);
        s.tick();
        assert_eq!(s.elapsed(), 0);

        let outcome = s.open_cell(5, 5);

        assert!(matches!(outcome, RevealOutcome::Opened(_)));
        assert_eq!(s.board().mines_placed(), 150);
        assert_eq!(s.state(), GameState::Playing);
        assert!(s.timer_running());
        s.tick();
        s.tick();
        assert_eq!(s.elapsed(), 2);
        assert_eq!(s.time_display(), "00:02");
    }

    #[test]
    fn flags_are_ignored_before_the_first_open() {
        let mut s = session("flag-early", 1);
        assert!(!s.flag_cell(0, 0));
        s.open_cell(5, 5);
        let (r, c) = first_cell(&s, true);
        assert!(s.flag_cell(r, c));
        assert_eq!(s.remaining_mines(), 149);
        assert_eq!(s.open_cell(r, c), RevealOutcome::NoChange);
    }

    #[test]
    fn invalid_cells_are_ignored() {
        let mut s = session("invalid", 1);
        assert_eq!(s.open_cell(30, 0), RevealOutcome::NoChange);
        assert_eq!(s.open_cell(0, 30), RevealOutcome::NoChange);
        assert_eq!(s.state(), GameState::NotStarted);
        assert_eq!(s.board().mines_placed(), 0);
        assert!(!s.timer_running());

        s.open_cell(5, 5);
        assert_eq!(s.open_cell(30, 30), RevealOutcome::NoChange);
        assert!(!s.flag_cell(0, 99));
        assert_eq!(s.state(), GameState::Playing);
    }

    #[test]
    fn hitting_a_mine_loses_and_returns_to_menu() {
        let mut s = session("lose", 11);
        s.open_cell(0, 0);
        s.tick();
        let (r, c) = first_cell(&s, true);

        let outcome = s.open_cell(r, c);

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(s.state(), GameState::Lost);
        assert!(!s.timer_running());
        assert_eq!(s.events().lost.len(), 1);
        assert_eq!(s.events().lost[0].elapsed, 1);
        assert!(s.events().won.is_empty());
        assert_eq!(s.events().menu, 1);

        // nothing more happens after the game is over
        s.tick();
        assert_eq!(s.elapsed(), 1);
        let (r, c) = first_cell(&s, false);
        assert_eq!(s.open_cell(r, c), RevealOutcome::NoChange);
        assert!(!s.flag_cell(r, c));
        assert!(!s.storage.rankings_path.exists());
        cleanup(&s);
    }

    #[test]
    fn clearing_the_board_wins_records_and_deletes_the_save() {
        let mut s = session("win", 5);
        s.open_cell(5, 5);
        s.tick();
        s.save().unwrap();
        assert!(s.storage.save_path.exists());

        while s.state() == GameState::Playing {
            let (r, c) = first_cell(&s, false);
            s.open_cell(r, c);
        }

        assert_eq!(s.state(), GameState::Won);
        assert!(!s.timer_running());
        assert!(!s.storage.save_path.exists());
        let expected = GameSummary {
            difficulty: Difficulty::Hard,
            nickname: "tester".to_string(),
            elapsed: 1,
            ranked: true,
        };
        assert_eq!(s.events().won, vec![expected]);
        assert_eq!(s.events().menu, 1);

        let rankings = RankingData::load(&s.storage.rankings_path).unwrap();
        let top = rankings.top_n(Difficulty::Hard, 3);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].nickname, "tester");
        assert_eq!(top[0].time, 1);
        cleanup(&s);
    }

    #[test]
    fn save_and_restore_round_trip() {
        let mut s = session("roundtrip", 8);
        s.open_cell(2, 2);
        let (r, c) = first_cell(&s, true);
        s.flag_cell(r, c);
        for _ in 0..75 {
            s.tick();
        }
        s.save().unwrap();

        let data = xtm_store::load_game(&s.storage.save_path).unwrap();
        let restored = GameSession::restore(
            &data,
            "tester",
            s.storage.clone(),
            Recorder::default(),
            StdRng::seed_from_u64(0),
        )
        .unwrap();

        assert_eq!(restored.board(), s.board());
        assert_eq!(restored.elapsed(), 75);
        assert_eq!(restored.time_display(), "01:15");
        assert_eq!(restored.state(), GameState::Playing);
        assert!(restored.timer_running());
        assert_eq!(restored.nickname(), "tester");
        assert_eq!(restored.remaining_mines(), s.remaining_mines());
        cleanup(&s);
    }

    #[test]
    fn resumed_game_is_credited_to_the_current_player() {
        let mut saved = session("resume-other", 6);
        saved.open_cell(5, 5);
        saved.tick();
        saved.save().unwrap();

        let data = xtm_store::load_game(&saved.storage.save_path).unwrap();
        assert_eq!(data.nickname, "tester");
        let mut s = GameSession::restore(
            &data,
            "bob",
            saved.storage.clone(),
            Recorder::default(),
            StdRng::seed_from_u64(6),
        )
        .unwrap();
        assert_eq!(s.nickname(), "bob");
        assert_eq!(s.snapshot().nickname, "bob");

        while s.state() == GameState::Playing {
            let (r, c) = first_cell(&s, false);
            s.open_cell(r, c);
        }

        assert_eq!(s.state(), GameState::Won);
        assert_eq!(s.events().won[0].nickname, "bob");
        let rankings = RankingData::load(&s.storage.rankings_path).unwrap();
        let top = rankings.top_n(Difficulty::Hard, 3);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].nickname, "bob");
        assert_eq!(top[0].time, 1);
        cleanup(&s);
    }

    #[test]
    fn snapshot_before_first_click_resumes_not_started() {
        let s = session("untouched", 2);
        let mut restored = GameSession::restore(
            &s.snapshot(),
            "tester",
            s.storage.clone(),
            Recorder::default(),
            StdRng::seed_from_u64(2),
        )
        .unwrap();

        assert_eq!(restored.state(), GameState::NotStarted);
        restored.open_cell(0, 0);
        assert_eq!(restored.board().mines_placed(), 150);
    }

    #[test]
    fn return_to_menu_saves_on_request() {
        let mut s = session("menu", 4);
        s.open_cell(5, 5);

        s.return_to_menu(false).unwrap();
        assert!(!s.storage.save_path.exists());
        assert_eq!(s.events().menu, 1);

        s.return_to_menu(true).unwrap();
        assert!(s.storage.save_path.exists());
        assert_eq!(s.events().menu, 2);
        assert!(!s.timer_running());
        cleanup(&s);
    }
}
