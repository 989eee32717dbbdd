// Multi-language support module
// Provides localized UI strings for English and Korean

use crate::xtm_game::Difficulty;

#[derive(Clone)]
pub struct Assets {
    // Login view
    pub login_title: &'static str,
    pub login_prompt: &'static str,
    pub login_hint: &'static str,
    pub login_empty: &'static str,

    // Menu view
    pub menu_title: &'static str,
    pub menu_welcome_fmt: &'static str, // "Welcome, {}!"
    pub menu_new_game_fmt: &'static str, // "New game: {}"
    pub menu_continue: &'static str,
    pub menu_rankings: &'static str,
    pub menu_language: &'static str,
    pub menu_logout: &'static str,
    pub menu_quit: &'static str,
    pub menu_hint: &'static str,

    // Difficulty names
    pub diff_easy: &'static str,
    pub diff_normal: &'static str,
    pub diff_hard: &'static str,
    pub diff_extreme: &'static str,
    pub diff_detail_fmt: &'static str, // "{rows}x{cols}, {mines} mines"

    // Game view
    pub status_mines: &'static str,
    pub status_time: &'static str,
    pub status_player: &'static str,
    pub game_hint: &'static str,

    // Dialogs
    pub confirm_save_title: &'static str,
    pub confirm_save: &'static str,
    pub win_title: &'static str,
    pub win_message_fmt: &'static str, // "Cleared in {}!"
    pub win_ranked: &'static str,
    pub win_unranked: &'static str,
    pub loss_title: &'static str,
    pub loss_message: &'static str,
    pub err_title: &'static str,
    pub err_load: &'static str,
    pub err_save: &'static str,

    // Ranking view
    pub rank_title: &'static str,
    pub rank_empty: &'static str,
    pub rank_error: &'static str,
    pub rank_hint: &'static str,

    // Buttons
    pub btn_ok: &'static str,
    pub btn_yes: &'static str,
    pub btn_no: &'static str,
    pub btn_cancel: &'static str,

    // Terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2: &'static str,
    pub tsmsg_title: &'static str,

    // Name of this language, shown on the menu toggle
    pub lang_name: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        login_title: "Login",
        login_prompt: "Enter your nickname:",
        login_hint: "Enter: continue   Esc: quit",
        login_empty: "Nickname cannot be empty",

        menu_title: "Main Menu",
        menu_welcome_fmt: "Welcome, {}!",
        menu_new_game_fmt: "New game: {}",
        menu_continue: "Continue saved game",
        menu_rankings: "Rankings",
        menu_language: "Language",
        menu_logout: "Log out",
        menu_quit: "Quit",
        menu_hint: "Up/Down: select   Enter: confirm   Esc: quit",

        diff_easy: "Easy",
        diff_normal: "Normal",
        diff_hard: "Hard",
        diff_extreme: "Extreme",
        diff_detail_fmt: "{rows}x{cols}, {mines} mines",

        status_mines: "Mines",
        status_time: "Time",
        status_player: "Player",
        game_hint: "Space/L-Click: open   F/R-Click: flag   Esc: menu",

        confirm_save_title: "Save",
        confirm_save: "Save your progress before leaving?",
        win_title: "Victory",
        win_message_fmt: "Cleared in {}!",
        win_ranked: "Your time was added to the rankings.",
        win_unranked: "Your time could not be added to the rankings.",
        loss_title: "Game Over",
        loss_message: "You stepped on a mine!",
        err_title: "Error",
        err_load: "Could not load the saved game.",
        err_save: "Could not save the game.",

        rank_title: "Rankings",
        rank_empty: "No rankings yet.",
        rank_error: "Could not load the rankings.",
        rank_hint: "Esc: back",

        btn_ok: "OK",
        btn_yes: "Yes",
        btn_no: "No",
        btn_cancel: "Cancel",

        tsmsg_line1: "Terminal size too small.",
        tsmsg_line2: "Minimum required:",
        tsmsg_title: "Resize Terminal",

        lang_name: "English",
    }
}

/// Returns Korean language assets
pub fn korean_assets() -> Assets {
    Assets {
        login_title: "로그인",
        login_prompt: "닉네임을 입력하세요:",
        login_hint: "Enter: 계속   Esc: 종료",
        login_empty: "닉네임을 입력해야 합니다",

        menu_title: "메인 메뉴",
        menu_welcome_fmt: "{}님, 환영합니다!",
        menu_new_game_fmt: "새 게임: {}",
        menu_continue: "저장된 게임 이어하기",
        menu_rankings: "랭킹",
        menu_language: "언어",
        menu_logout: "로그아웃",
        menu_quit: "종료",
        menu_hint: "↑/↓: 선택   Enter: 확인   Esc: 종료",

        diff_easy: "쉬움",
        diff_normal: "보통",
        diff_hard: "어려움",
        diff_extreme: "극한",
        diff_detail_fmt: "{rows}x{cols}, 지뢰 {mines}개",

        status_mines: "지뢰",
        status_time: "시간",
        status_player: "플레이어",
        game_hint: "Space/좌클릭: 열기   F/우클릭: 깃발   Esc: 메뉴",

        confirm_save_title: "저장 확인",
        confirm_save: "현재 진행 상황을 저장하고 나갈까요?",
        win_title: "승리",
        win_message_fmt: "축하합니다! {} 만에 클리어했습니다!",
        win_ranked: "랭킹에 등록되었습니다.",
        win_unranked: "랭킹을 저장하지 못했습니다.",
        loss_title: "게임 오버",
        loss_message: "지뢰를 밟았습니다!",
        err_title: "오류",
        err_load: "저장된 게임을 불러오지 못했습니다.",
        err_save: "게임을 저장하지 못했습니다.",

        rank_title: "랭킹",
        rank_empty: "아직 랭킹이 없습니다.",
        rank_error: "랭킹을 불러오는 중 오류 발생.",
        rank_hint: "Esc: 뒤로",

        btn_ok: "확인",
        btn_yes: "예",
        btn_no: "아니요",
        btn_cancel: "취소",

        tsmsg_line1: "터미널 크기가 너무 작습니다.",
        tsmsg_line2: "최소 크기:",
        tsmsg_title: "터미널 크기 조정",

        lang_name: "한국어",
    }
}

/// Main language manager struct
/// Holds the current language code and active string assets
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code
    /// Normalizes input (e.g., "ko-KR" → "ko") and defaults to English for unsupported languages
    pub fn new(lang_code: &str) -> Self {
        let mut lang = Lang {
            current_lang: String::new(),
            assets: english_assets(),
        };
        lang.switch_to(lang_code);
        lang
    }

    /// Switches the current language and reloads all string assets
    pub fn switch_to(&mut self, lang_code: &str) {
        let code = if lang_code.to_lowercase().starts_with("ko") {
            "ko"
        } else {
            "en"
        };
        self.current_lang = code.to_string();
        self.assets = if code == "ko" {
            korean_assets()
        } else {
            english_assets()
        };
    }

    /// Flip between English and Korean; returns the new language code
    pub fn toggle(&mut self) -> &str {
        let next = if self.current_lang == "ko" { "en" } else { "ko" };
        self.switch_to(next);
        &self.current_lang
    }

    pub fn diff_name(&self, d: Difficulty) -> &'static str {
        match d {
            Difficulty::Easy => self.assets.diff_easy,
            Difficulty::Normal => self.assets.diff_normal,
            Difficulty::Hard => self.assets.diff_hard,
            Difficulty::Extreme => self.assets.diff_extreme,
        }
    }

    /// "10x10, 5 mines" in the current language
    pub fn diff_detail(&self, d: Difficulty) -> String {
        let (rows, cols, mines) = d.params();
        self.assets
            .diff_detail_fmt
            .replace("{rows}", &rows.to_string())
            .replace("{cols}", &cols.to_string())
            .replace("{mines}", &mines.to_string())
    }

    /// Format an ISO date (YYYY-MM-DD) according to the current language
    /// English: MM/DD/YYYY (e.g., "01/22/2026")
    /// Korean: YYYY년 MM월 DD일 (e.g., "2026년 01월 22일")
    pub fn format_date(&self, iso_date: &str) -> String {
        let parts: Vec<&str> = iso_date.split('-').collect();
        if parts.len() != 3 {
            return iso_date.to_string();
        }

        if self.current_lang == "ko" {
            format!("{}년 {}월 {}일", parts[0], parts[1], parts[2])
        } else {
            format!("{}/{}/{}", parts[1], parts[2], parts[0])
        }
    }
}
