use ratatui::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub yellow: Color,
    pub cyan: Color,
    pub selection_bg: Color,
    /// Rows of nodes marked advanced
    pub advanced: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            advanced: Color::Rgb(0xCC, 0x66, 0xFF),
        }
    }
}
