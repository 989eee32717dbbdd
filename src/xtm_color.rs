use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Terminal color depth, detected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    TrueColor,
    Indexed256,
    Basic,
}

impl Depth {
    pub fn detect() -> Self {
        let support = ColorSupport::stdout();
        if support.has_16m {
            Depth::TrueColor
        } else if support.has_256 {
            Depth::Indexed256
        } else {
            Depth::Basic
        }
    }
}

// Windows Terminal "Campbell" values: ((R, G, B), ANSI 256 index)
fn campbell(color: Color) -> Option<((u8, u8, u8), u8)> {
    match color {
        Color::Black => Some(((12, 12, 12), 232)),
        Color::Red => Some(((197, 15, 31), 160)),
        Color::Green => Some(((19, 161, 14), 28)),
        Color::Yellow => Some(((193, 156, 0), 178)),
        Color::Blue => Some(((0, 55, 218), 20)),
        Color::Magenta => Some(((136, 23, 152), 90)),
        Color::Cyan => Some(((58, 150, 221), 38)),
        Color::Gray => Some(((204, 204, 204), 250)),
        Color::DarkGray => Some(((118, 118, 118), 243)),
        Color::LightRed => Some(((231, 72, 86), 203)),
        Color::LightGreen => Some(((22, 198, 12), 46)),
        Color::LightYellow => Some(((249, 241, 165), 229)),
        Color::LightBlue => Some(((59, 120, 255), 63)),
        Color::LightMagenta => Some(((180, 0, 158), 163)),
        Color::LightCyan => Some(((97, 214, 214), 116)),
        Color::White => Some(((242, 242, 242), 255)),
        _ => None,
    }
}

/// Colors used by the board, adjusted so they look the same across terminals
#[derive(Debug, Clone)]
pub struct Palette {
    depth: Depth,
    pub board_bg: Color,
    pub cursor_bg: Color,
    pub closed_fg: Color,
    pub mine_fg: Color,
    pub flag_fg: Color,
    pub accent: Color,
    pub numbers: [Color; 8], // 1..=8
}

impl Palette {
    pub fn new(depth: Depth) -> Self {
        let mut p = Palette {
            depth,
            board_bg: Color::DarkGray,
            cursor_bg: Color::LightBlue,
            closed_fg: Color::Gray,
            mine_fg: Color::Black,
            flag_fg: Color::Red,
            accent: Color::Yellow,
            numbers: [
                Color::LightBlue,
                Color::LightGreen,
                Color::LightRed,
                Color::Blue,
                Color::Red,
                Color::Cyan,
                Color::Black,
                Color::Gray,
            ],
        };
        p.board_bg = p.resolve(p.board_bg);
        p.cursor_bg = p.resolve(p.cursor_bg);
        p.closed_fg = p.resolve(p.closed_fg);
        p.mine_fg = p.resolve(p.mine_fg);
        p.flag_fg = p.resolve(p.flag_fg);
        p.accent = p.resolve(p.accent);
        p.numbers = p.numbers.map(|c| p.resolve(c));
        p
    }

    /// Map a basic ANSI color to the Campbell look at this terminal's depth
    /// Custom RGB or indexed colors are returned as-is
    pub fn resolve(&self, color: Color) -> Color {
        match (campbell(color), self.depth) {
            (Some((rgb, _)), Depth::TrueColor) => Color::Rgb(rgb.0, rgb.1, rgb.2),
            (Some((_, index)), Depth::Indexed256) => Color::Indexed(index),
            _ => color,
        }
    }

    /// Foreground for an opened cell showing `n` adjacent mines
    pub fn number(&self, n: u8) -> Color {
        self.numbers[(n.clamp(1, 8) - 1) as usize]
    }
}
