use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

use crate::xtm_color::{Depth, Palette};
use crate::xtm_config::{Config, save_config};
use crate::xtm_game::{Cell, Difficulty};
use crate::xtm_lang::Lang;
use crate::xtm_rank::{RankingData, format_clock};
use crate::xtm_session::{GameEvents, GameSession, GameState, GameSummary};
use crate::xtm_store::{self, Storage};

const NICKNAME_MAX: usize = 16;

/// Session callbacks, queued until the event loop picks them up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Won(GameSummary),
    Lost(GameSummary),
    ReturnToMenu,
}

#[derive(Debug, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }
}

impl GameEvents for Notices {
    fn on_game_won(&mut self, summary: &GameSummary) {
        self.pending.push(Notice::Won(summary.clone()));
    }

    fn on_game_lost(&mut self, summary: &GameSummary) {
        self.pending.push(Notice::Lost(summary.clone()));
    }

    fn on_return_to_menu(&mut self) {
        self.pending.push(Notice::ReturnToMenu);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Login,
    Menu,
    Game,
    Ranking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    NewGame(Difficulty),
    Continue,
    Rankings,
    Language,
    Logout,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmSave { focus: usize }, // 0=yes, 1=no, 2=cancel
    Won(GameSummary),
    Lost,
    Message { title: &'static str, body: String },
}

/// What a board cell looks like on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Closed,
    Flag,
    Mine,
    Blank,
    Number(u8),
}

fn cell_face(cell: &Cell, show_mines: bool) -> Face {
    if cell.is_opened() || (show_mines && cell.is_mine()) {
        if cell.is_mine() {
            Face::Mine
        } else if cell.neighbor_mines() > 0 {
            Face::Number(cell.neighbor_mines())
        } else {
            Face::Blank
        }
    } else if cell.is_flagged() {
        Face::Flag
    } else {
        Face::Closed
    }
}

/// Map a terminal position to a board cell (row, col); each cell is two columns wide
fn board_hit(area: Rect, column: u16, row: u16, rows: usize, cols: usize) -> Option<(usize, usize)> {
    let inner = Rect::new(
        area.x + 1,
        area.y + 1,
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    if column < inner.x || row < inner.y || column >= inner.x + inner.width || row >= inner.y + inner.height {
        return None;
    }
    let c = ((column - inner.x) / 2) as usize;
    let r = (row - inner.y) as usize;
    (r < rows && c < cols).then_some((r, c))
}

struct App {
    cfg: Config,
    lang: Lang,
    palette: Palette,
    storage: Storage,
    view: View,
    nickname_input: String,
    login_error: bool,
    menu_index: usize,
    save_exists: bool,
    session: Option<GameSession<Notices>>,
    cursor: (usize, usize), // (row, col)
    modal: Option<Modal>,
    back_to_menu: bool, // leave the game view once the current modal closes
    rankings: Result<RankingData, String>,
    board_rect: Option<Rect>,
    quit: bool,
}

impl App {
    fn new(cfg: Config) -> Self {
        let lang = Lang::new(&cfg.language);
        let storage = cfg.storage();
        App {
            nickname_input: cfg.nickname.clone(),
            menu_index: cfg.difficulty.to_index(),
            lang,
            palette: Palette::new(Depth::detect()),
            storage,
            view: View::Login,
            login_error: false,
            save_exists: false,
            session: None,
            cursor: (0, 0),
            modal: None,
            back_to_menu: false,
            rankings: Ok(RankingData::default()),
            board_rect: None,
            quit: false,
            cfg,
        }
    }

    fn menu_items(&self) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = Difficulty::ALL.iter().map(|&d| MenuItem::NewGame(d)).collect();
        if self.save_exists {
            items.push(MenuItem::Continue);
        }
        items.extend([MenuItem::Rankings, MenuItem::Language, MenuItem::Logout, MenuItem::Quit]);
        items
    }

    fn enter_menu(&mut self) {
        self.view = View::Menu;
        self.session = None;
        self.back_to_menu = false;
        self.board_rect = None;
        self.save_exists = xtm_store::has_save(&self.storage.save_path);
        let last = self.menu_items().len().saturating_sub(1);
        self.menu_index = self.menu_index.min(last);
    }

    fn start_game(&mut self, difficulty: Difficulty) {
        self.cfg.difficulty = difficulty;
        save_config(&self.cfg);
        let session = GameSession::new(
            difficulty,
            &self.cfg.nickname,
            self.storage.clone(),
            Notices::default(),
            StdRng::from_entropy(),
        );
        self.open_session(session);
    }

    fn continue_game(&mut self) {
        let restored = xtm_store::load_game(&self.storage.save_path).and_then(|data| {
            GameSession::restore(
                &data,
                &self.cfg.nickname,
                self.storage.clone(),
                Notices::default(),
                StdRng::from_entropy(),
            )
        });
        match restored {
            Ok(session) => self.open_session(session),
            // save vanished since the menu was drawn; just drop the Continue entry
            Err(e) if e.is_not_found() => {
                info!("Saved game no longer exists");
                self.enter_menu();
            }
            Err(e) => {
                warn!(error = %e, "Saved game could not be resumed");
                self.modal = Some(Modal::Message {
                    title: self.lang.assets.err_title,
                    body: format!("{}\n{}", self.lang.assets.err_load, e),
                });
            }
        }
    }

    fn open_session(&mut self, session: GameSession<Notices>) {
        let board = session.board();
        self.cursor = (board.rows() / 2, board.cols() / 2);
        self.session = Some(session);
        self.view = View::Game;
    }

    fn show_rankings(&mut self) {
        self.rankings = RankingData::load(&self.storage.rankings_path).map_err(|e| {
            warn!(error = %e, "Rankings could not be loaded");
            e.to_string()
        });
        self.view = View::Ranking;
    }

    fn activate_menu_item(&mut self, item: MenuItem) {
        match item {
            MenuItem::NewGame(d) => self.start_game(d),
            MenuItem::Continue => self.continue_game(),
            MenuItem::Rankings => self.show_rankings(),
            MenuItem::Language => {
                self.cfg.language = self.lang.toggle().to_string();
                save_config(&self.cfg);
            }
            MenuItem::Logout => {
                self.nickname_input = self.cfg.nickname.clone();
                self.view = View::Login;
            }
            MenuItem::Quit => self.quit = true,
        }
    }

    /// Route queued session callbacks to dialogs and navigation
    fn process_notices(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for notice in session.events_mut().drain() {
            match notice {
                Notice::Won(summary) => self.modal = Some(Modal::Won(summary)),
                Notice::Lost(_) => self.modal = Some(Modal::Lost),
                Notice::ReturnToMenu => self.back_to_menu = true,
            }
        }
        if self.back_to_menu && self.modal.is_none() {
            self.enter_menu();
        }
    }

    fn leave_game(&mut self, save: bool) {
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.return_to_menu(save) {
                self.modal = Some(Modal::Message {
                    title: self.lang.assets.err_title,
                    body: format!("{}\n{}", self.lang.assets.err_save, e),
                });
            }
        }
        self.process_notices();
    }

    fn on_tick(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.tick();
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.modal.is_some() {
            self.on_modal_key(key.code);
            return;
        }
        match self.view {
            View::Login => self.on_login_key(key.code),
            View::Menu => self.on_menu_key(key.code),
            View::Game => self.on_game_key(key.code),
            View::Ranking => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.enter_menu();
                }
            }
        }
    }

    fn on_login_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Enter => {
                let name = self.nickname_input.trim();
                if name.is_empty() {
                    self.login_error = true;
                    return;
                }
                info!(nickname = name, "Logged in");
                self.cfg.nickname = name.to_string();
                save_config(&self.cfg);
                self.login_error = false;
                self.enter_menu();
            }
            KeyCode::Backspace => {
                self.nickname_input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => {
                if self.nickname_input.chars().count() < NICKNAME_MAX {
                    self.nickname_input.push(c);
                    self.login_error = false;
                }
            }
            _ => {}
        }
    }

    fn on_menu_key(&mut self, code: KeyCode) {
        let items = self.menu_items();
        match code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Up => self.menu_index = (self.menu_index + items.len() - 1) % items.len(),
            KeyCode::Down => self.menu_index = (self.menu_index + 1) % items.len(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(&item) = items.get(self.menu_index) {
                    self.activate_menu_item(item);
                }
            }
            KeyCode::Char(c @ '1'..='4') => {
                let i = c as usize - '1' as usize;
                self.menu_index = i;
                self.start_game(Difficulty::from_index(i));
            }
            _ => {}
        }
    }

    fn on_game_key(&mut self, code: KeyCode) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let (rows, cols) = (session.board().rows(), session.board().cols());
        let (r, c) = self.cursor;
        match code {
            KeyCode::Esc => {
                if session.state().is_finished() {
                    self.enter_menu();
                } else {
                    self.modal = Some(Modal::ConfirmSave { focus: 0 });
                }
                return;
            }
            KeyCode::Left => self.cursor.1 = c.saturating_sub(1),
            KeyCode::Right => self.cursor.1 = (c + 1).min(cols - 1),
            KeyCode::Up => self.cursor.0 = r.saturating_sub(1),
            KeyCode::Down => self.cursor.0 = (r + 1).min(rows - 1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                session.open_cell(r, c);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                session.flag_cell(r, c);
            }
            _ => {}
        }
        self.process_notices();
    }

    fn on_modal_key(&mut self, code: KeyCode) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        match modal {
            Modal::ConfirmSave { focus } => match code {
                KeyCode::Left | KeyCode::BackTab => {
                    self.modal = Some(Modal::ConfirmSave { focus: (focus + 2) % 3 })
                }
                KeyCode::Right | KeyCode::Tab => {
                    self.modal = Some(Modal::ConfirmSave { focus: (focus + 1) % 3 })
                }
                KeyCode::Char('y') | KeyCode::Char('Y') => self.leave_game(true),
                KeyCode::Char('n') | KeyCode::Char('N') => self.leave_game(false),
                KeyCode::Esc => {}
                KeyCode::Enter | KeyCode::Char(' ') => match focus {
                    0 => self.leave_game(true),
                    1 => self.leave_game(false),
                    _ => {}
                },
                _ => self.modal = Some(Modal::ConfirmSave { focus }),
            },
            Modal::Won(_) | Modal::Lost | Modal::Message { .. } => match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                    if self.back_to_menu {
                        self.enter_menu();
                    }
                }
                _ => self.modal = Some(modal),
            },
        }
    }

    fn on_mouse(&mut self, me: MouseEvent) {
        if self.view != View::Game || self.modal.is_some() {
            return;
        }
        let (Some(area), Some(session)) = (self.board_rect, self.session.as_mut()) else {
            return;
        };
        let (rows, cols) = (session.board().rows(), session.board().cols());
        let Some((r, c)) = board_hit(area, me.column, me.row, rows, cols) else {
            return;
        };
        match me.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.cursor = (r, c);
                session.open_cell(r, c);
            }
            MouseEventKind::Down(MouseButton::Right) => {
                self.cursor = (r, c);
                session.flag_cell(r, c);
            }
            MouseEventKind::Moved => self.cursor = (r, c),
            _ => return,
        }
        self.process_notices();
    }

    fn draw<B: Backend>(&mut self, f: &mut Frame<B>) {
        let size = f.size();
        match self.view {
            View::Login => self.draw_login(f, size),
            View::Menu => self.draw_menu(f, size),
            View::Game => self.draw_game(f, size),
            View::Ranking => self.draw_ranking(f, size),
        }
        if let Some(modal) = &self.modal {
            self.draw_modal(f, size, modal);
        }
    }

    fn draw_login<B: Backend>(&self, f: &mut Frame<B>, size: Rect) {
        let a = &self.lang.assets;
        let accent = Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Spans::from(Span::raw("")),
            Spans::from(Span::raw(format!(" {}", a.login_prompt))),
            Spans::from(vec![
                Span::styled(" > ", accent),
                Span::raw(self.nickname_input.clone()),
                Span::styled("_", accent),
            ]),
            Spans::from(Span::raw("")),
        ];
        if self.login_error {
            lines.push(Spans::from(Span::styled(
                format!(" {}", a.login_empty),
                Style::default().fg(self.palette.flag_fg),
            )));
        } else {
            lines.push(Spans::from(Span::raw("")));
        }
        lines.push(Spans::from(Span::raw(format!(" {}", a.login_hint))));

        let area = center_rect(44, lines.len() as u16 + 2, size);
        f.render_widget(Clear, area);
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(a.login_title).title_alignment(Alignment::Center));
        f.render_widget(p, area);
    }

    fn draw_menu<B: Backend>(&self, f: &mut Frame<B>, size: Rect) {
        let a = &self.lang.assets;
        let focus = Style::default().bg(self.palette.cursor_bg).add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Spans::from(Span::raw("")),
            Spans::from(Span::raw(format!(" {}", a.menu_welcome_fmt.replace("{}", &self.cfg.nickname)))),
            Spans::from(Span::raw("")),
        ];
        for (i, item) in self.menu_items().into_iter().enumerate() {
            let label = match item {
                MenuItem::NewGame(d) => format!(
                    "{} ({})",
                    a.menu_new_game_fmt.replace("{}", self.lang.diff_name(d)),
                    self.lang.diff_detail(d)
                ),
                MenuItem::Continue => a.menu_continue.to_string(),
                MenuItem::Rankings => a.menu_rankings.to_string(),
                MenuItem::Language => format!("{}: {}", a.menu_language, a.lang_name),
                MenuItem::Logout => a.menu_logout.to_string(),
                MenuItem::Quit => a.menu_quit.to_string(),
            };
            if i == self.menu_index {
                lines.push(Spans::from(vec![Span::raw(" "), Span::styled(format!("▸ {}", label), focus)]));
            } else {
                lines.push(Spans::from(Span::raw(format!("   {}", label))));
            }
        }
        lines.push(Spans::from(Span::raw("")));
        lines.push(Spans::from(Span::raw(format!(" {}", a.menu_hint))));

        let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 4;
        let area = center_rect(width.max(40), lines.len() as u16 + 2, size);
        f.render_widget(Clear, area);
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(a.menu_title).title_alignment(Alignment::Center));
        f.render_widget(p, area);
    }

    fn draw_game<B: Backend>(&mut self, f: &mut Frame<B>, size: Rect) {
        let a = &self.lang.assets;
        let Some(session) = &self.session else {
            return;
        };
        let board = session.board();
        let board_w = (board.cols() * 2) as u16 + 3;
        let board_h = board.rows() as u16 + 2;
        let min_w = board_w.max(62);
        let min_h = board_h + 6;

        // If terminal too small, render a centered warning and skip normal UI
        if size.width < min_w || size.height < min_h {
            let warn_lines = vec![
                Spans::from(Span::raw(a.tsmsg_line1)),
                Spans::from(Span::raw(format!("{} {} x {}", a.tsmsg_line2, min_w, min_h))),
            ];
            let warn = Paragraph::new(Text::from(warn_lines))
                .block(Block::default().borders(Borders::ALL).title(a.tsmsg_title))
                .alignment(Alignment::Center);
            f.render_widget(Clear, size);
            let w = 40u16.min(size.width.saturating_sub(2));
            let h = 5u16.min(size.height.saturating_sub(2));
            f.render_widget(warn, center_rect(w, h, size));
            self.board_rect = None;
            return;
        }

        // layout: top status row, center board, bottom hint
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(board_h), Constraint::Length(3)].as_ref())
            .split(size);

        // clock is dimmed while stopped (before the first open, after the game ends)
        let clock_style = if session.timer_running() {
            Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let status = Spans::from(vec![
            Span::raw(format!(" {}: {}   {}: ", a.status_mines, session.remaining_mines(), a.status_time)),
            Span::styled(session.time_display(), clock_style),
            Span::raw(format!("   {}: {}", a.status_player, session.nickname())),
        ]);
        f.render_widget(
            Paragraph::new(status).block(Block::default().borders(Borders::ALL)),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new(Spans::from(Span::raw(format!(" {}", a.game_hint)))).block(Block::default().borders(Borders::ALL)),
            chunks[2],
        );

        let pal = &self.palette;
        let ascii = self.cfg.ascii_icons;
        let (glyph_closed, glyph_mine, glyph_flag) = if ascii { ("▪", "*", "F") } else { ("■", "☼", "⚑") };
        let show_mines = session.state() == GameState::Lost;
        let mut lines = Vec::with_capacity(board.rows());
        for r in 0..board.rows() {
            let mut spans = Vec::with_capacity(board.cols() + 1);
            for c in 0..board.cols() {
                let Some(cell) = board.cell(r, c) else { continue };
                let mut style = Style::default().bg(pal.board_bg);
                let glyph = match cell_face(cell, show_mines) {
                    Face::Closed => {
                        style = style.fg(pal.closed_fg);
                        glyph_closed.to_string()
                    }
                    Face::Flag => {
                        style = style.fg(pal.flag_fg);
                        glyph_flag.to_string()
                    }
                    Face::Mine => {
                        style = style.fg(pal.mine_fg);
                        glyph_mine.to_string()
                    }
                    Face::Blank => " ".to_string(),
                    Face::Number(n) => {
                        style = style.fg(pal.number(n)).add_modifier(Modifier::BOLD);
                        n.to_string()
                    }
                };
                if self.cursor == (r, c) {
                    style = style.bg(pal.cursor_bg);
                }
                spans.push(Span::styled(format!(" {}", glyph), style));
            }
            // one-character padding column so the right edge uses the board background
            spans.push(Span::styled(" ", Style::default().bg(pal.board_bg)));
            lines.push(Spans::from(spans));
        }
        let title = format!("{} ({})", self.lang.diff_name(session.difficulty()), self.lang.diff_detail(session.difficulty()));
        let board_area = center_rect(board_w, board_h, chunks[1]);
        let paragraph = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(title).title_alignment(Alignment::Center));
        f.render_widget(paragraph, board_area);
        self.board_rect = Some(board_area);
    }

    fn draw_ranking<B: Backend>(&self, f: &mut Frame<B>, size: Rect) {
        let a = &self.lang.assets;
        let mut lines = vec![Spans::from(Span::raw(""))];
        match &self.rankings {
            Err(detail) => {
                lines.push(Spans::from(Span::styled(
                    format!(" {}", a.rank_error),
                    Style::default().fg(self.palette.flag_fg),
                )));
                lines.push(Spans::from(Span::raw(format!(" {}", detail))));
            }
            Ok(data) => {
                let podium = data.podium();
                if podium.is_empty() {
                    lines.push(Spans::from(Span::raw(format!(" {}", a.rank_empty))));
                }
                let medals: [&str; 3] = if self.cfg.ascii_icons { ["1.", "2.", "3."] } else { ["🥇", "🥈", "🥉"] };
                let name_w = podium
                    .iter()
                    .flat_map(|(_, top)| top.iter().map(|e| e.nickname.width()))
                    .max()
                    .unwrap_or(0)
                    .max(8);
                for (difficulty, top) in podium {
                    lines.push(Spans::from(Span::styled(
                        format!(" {}", self.lang.diff_name(difficulty)),
                        Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD),
                    )));
                    for (i, entry) in top.iter().enumerate() {
                        // pad by display width so wide (e.g., Hangul) nicknames align
                        let pad = name_w.saturating_sub(entry.nickname.width());
                        let date = entry.date.as_deref().map(|d| self.lang.format_date(d)).unwrap_or_default();
                        lines.push(Spans::from(Span::raw(format!(
                            "   {} {}{}  {}  {}",
                            medals[i],
                            entry.nickname,
                            " ".repeat(pad),
                            entry.time_display(),
                            date
                        ))));
                    }
                    lines.push(Spans::from(Span::raw("")));
                }
            }
        }
        lines.push(Spans::from(Span::raw(format!(" {}", a.rank_hint))));

        let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 4;
        let height = (lines.len() as u16 + 2).min(size.height);
        let area = center_rect(width.max(40).min(size.width), height, size);
        f.render_widget(Clear, area);
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(a.rank_title).title_alignment(Alignment::Center));
        f.render_widget(p, area);
    }

    fn draw_modal<B: Backend>(&self, f: &mut Frame<B>, size: Rect, modal: &Modal) {
        let a = &self.lang.assets;
        let (title, body, buttons, focus): (&str, Vec<String>, Vec<&str>, usize) = match modal {
            Modal::ConfirmSave { focus } => (
                a.confirm_save_title,
                vec![a.confirm_save.to_string()],
                vec![a.btn_yes, a.btn_no, a.btn_cancel],
                *focus,
            ),
            Modal::Won(summary) => {
                let outcome = if summary.ranked { a.win_ranked } else { a.win_unranked };
                (
                    a.win_title,
                    vec![a.win_message_fmt.replace("{}", &format_clock(summary.elapsed)), outcome.to_string()],
                    vec![a.btn_ok],
                    0,
                )
            }
            Modal::Lost => (a.loss_title, vec![a.loss_message.to_string()], vec![a.btn_ok], 0),
            Modal::Message { title, body } => (*title, body.lines().map(str::to_string).collect(), vec![a.btn_ok], 0),
        };

        let width = (body.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 6).clamp(30, size.width.max(30));
        let mut lines: Vec<Spans> = vec![Spans::from(Span::raw(""))];
        lines.extend(body.into_iter().map(|l| Spans::from(Span::raw(l))));
        lines.push(Spans::from(Span::raw("")));

        let mut button_spans = Vec::new();
        for (i, label) in buttons.iter().enumerate() {
            if i > 0 {
                button_spans.push(Span::raw("   "));
            }
            let style = if i == focus {
                Style::default().bg(self.palette.cursor_bg).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            button_spans.push(Span::styled(format!(" {} ", label), style));
        }
        lines.push(Spans::from(button_spans));

        let area = center_rect(width, lines.len() as u16 + 2, size);
        f.render_widget(Clear, area);
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(p, area);
    }
}

pub fn run(cfg: Config) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cfg);
    let result = event_loop(&mut terminal, &mut app);

    // Remember language and last difficulty before exiting
    save_config(&app.cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let tick_rate = Duration::from_secs(1);
    let mut last_tick = Instant::now();

    while !app.quit {
        terminal.draw(|f| app.draw(f))?;

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                // Windows reports releases too; act on presses only
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(me) => app.on_mouse(me),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
    Ok(())
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xtm_game::Board;

    #[test]
    fn faces_follow_cell_state() {
        let closed = Cell::restored(0, 0, true, false, false, 0);
        assert_eq!(cell_face(&closed, false), Face::Closed);
        assert_eq!(cell_face(&closed, true), Face::Mine);

        let flagged = Cell::restored(0, 0, false, false, true, 2);
        assert_eq!(cell_face(&flagged, true), Face::Flag);

        assert_eq!(cell_face(&Cell::restored(0, 0, false, true, false, 3), false), Face::Number(3));
        assert_eq!(cell_face(&Cell::restored(0, 0, false, true, false, 0), false), Face::Blank);
    }

    #[test]
    fn clicks_map_to_two_column_cells() {
        let board = Board::new(3, 4);
        let area = Rect::new(10, 5, 4 * 2 + 3, 3 + 2);

        assert_eq!(board_hit(area, 11, 6, board.rows(), board.cols()), Some((0, 0)));
        assert_eq!(board_hit(area, 12, 6, board.rows(), board.cols()), Some((0, 0)));
        assert_eq!(board_hit(area, 13, 8, board.rows(), board.cols()), Some((2, 1)));
        // border and right padding column
        assert_eq!(board_hit(area, 10, 6, board.rows(), board.cols()), None);
        assert_eq!(board_hit(area, 19, 6, board.rows(), board.cols()), None);
        assert_eq!(board_hit(area, 11, 9, board.rows(), board.cols()), None);
    }

    #[test]
    fn notices_queue_in_order() {
        let mut notices = Notices::default();
        let summary = GameSummary {
            difficulty: Difficulty::Easy,
            nickname: "a".to_string(),
            elapsed: 3,
            ranked: true,
        };
        notices.on_game_won(&summary);
        notices.on_return_to_menu();

        assert_eq!(notices.drain(), vec![Notice::Won(summary), Notice::ReturnToMenu]);
        assert!(notices.drain().is_empty());
    }
}
