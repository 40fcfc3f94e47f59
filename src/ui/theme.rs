//! Theme definitions for codebuddy
//!
//! Provides built-in dark themes plus a transparent one that reuses
//! the terminal colors. One theme instance – applied globally to
//! every view.

use crate::config::ThemeName;
use ratatui::style::{Color, Modifier, Style};

/// Complete theme with all required colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,

    // Accent colors
    pub accent: Color,
    pub accent_dim: Color,

    // Status colors
    pub success: Color,
    pub error: Color,

    // UI element colors
    pub border: Color,
    pub border_focused: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,

    // Code block background
    pub code_bg: Color,

    // Internal flag for transparent mode
    is_transparent: bool,
}

impl Theme {
    /// Create a theme from a theme name
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Gruvbox => Self::gruvbox(),
            ThemeName::Nord => Self::nord(),
            ThemeName::Catppuccin => Self::catppuccin(),
            ThemeName::Dracula => Self::dracula(),
            ThemeName::OneDark => Self::one_dark(),
            ThemeName::Transparent => Self::transparent(),
        }
    }

    /// Gruvbox dark theme (default)
    pub fn gruvbox() -> Self {
        Self {
            bg: Color::Rgb(40, 40, 40),
            fg: Color::Rgb(235, 219, 178),
            fg_dim: Color::Rgb(146, 131, 116),
            accent: Color::Rgb(254, 128, 25),
            accent_dim: Color::Rgb(214, 93, 14),
            success: Color::Rgb(184, 187, 38),
            error: Color::Rgb(251, 73, 52),
            border: Color::Rgb(80, 73, 69),
            border_focused: Color::Rgb(168, 153, 132),
            selection_bg: Color::Rgb(80, 73, 69),
            selection_fg: Color::Rgb(235, 219, 178),
            code_bg: Color::Rgb(29, 32, 33),
            is_transparent: false,
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(236, 239, 244),
            fg_dim: Color::Rgb(76, 86, 106),
            accent: Color::Rgb(136, 192, 208),
            accent_dim: Color::Rgb(94, 129, 172),
            success: Color::Rgb(163, 190, 140),
            error: Color::Rgb(191, 97, 106),
            border: Color::Rgb(59, 66, 82),
            border_focused: Color::Rgb(136, 192, 208),
            selection_bg: Color::Rgb(76, 86, 106),
            selection_fg: Color::Rgb(236, 239, 244),
            code_bg: Color::Rgb(36, 41, 51),
            is_transparent: false,
        }
    }

    /// Catppuccin Mocha theme
    pub fn catppuccin() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 46),
            fg: Color::Rgb(205, 214, 244),
            fg_dim: Color::Rgb(108, 112, 134),
            accent: Color::Rgb(137, 180, 250),     // blue
            accent_dim: Color::Rgb(116, 199, 236), // sapphire
            success: Color::Rgb(166, 227, 161),    // green
            error: Color::Rgb(243, 139, 168),      // red
            border: Color::Rgb(69, 71, 90),        // surface1
            border_focused: Color::Rgb(137, 180, 250),
            selection_bg: Color::Rgb(69, 71, 90),
            selection_fg: Color::Rgb(205, 214, 244),
            code_bg: Color::Rgb(17, 17, 27), // crust
            is_transparent: false,
        }
    }

    /// Dracula theme
    pub fn dracula() -> Self {
        Self {
            bg: Color::Rgb(40, 42, 54),
            fg: Color::Rgb(248, 248, 242),
            fg_dim: Color::Rgb(98, 114, 164),      // comment
            accent: Color::Rgb(189, 147, 249),     // purple
            accent_dim: Color::Rgb(139, 233, 253), // cyan
            success: Color::Rgb(80, 250, 123),     // green
            error: Color::Rgb(255, 85, 85),        // red
            border: Color::Rgb(68, 71, 90),        // current line
            border_focused: Color::Rgb(189, 147, 249),
            selection_bg: Color::Rgb(68, 71, 90),
            selection_fg: Color::Rgb(248, 248, 242),
            code_bg: Color::Rgb(33, 34, 44),
            is_transparent: false,
        }
    }

    /// One Dark theme (Atom/VS Code)
    pub fn one_dark() -> Self {
        Self {
            bg: Color::Rgb(40, 44, 52),
            fg: Color::Rgb(171, 178, 191),
            fg_dim: Color::Rgb(92, 99, 112),
            accent: Color::Rgb(97, 175, 239),     // blue
            accent_dim: Color::Rgb(86, 182, 194), // cyan
            success: Color::Rgb(152, 195, 121),   // green
            error: Color::Rgb(224, 108, 117),     // red
            border: Color::Rgb(62, 68, 81),
            border_focused: Color::Rgb(97, 175, 239),
            selection_bg: Color::Rgb(62, 68, 81),
            selection_fg: Color::Rgb(171, 178, 191),
            code_bg: Color::Rgb(33, 37, 43),
            is_transparent: false,
        }
    }

    /// Transparent theme (uses terminal colors)
    pub fn transparent() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            fg_dim: Color::Gray,
            accent: Color::Cyan,
            accent_dim: Color::Blue,
            success: Color::Green,
            error: Color::Red,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            selection_bg: Color::Reset,
            selection_fg: Color::White,
            code_bg: Color::Reset,
            is_transparent: true,
        }
    }

    // === STYLE HELPERS ===

    pub fn text(&self) -> Style {
        if self.is_transparent {
            Style::default().fg(self.fg)
        } else {
            Style::default().fg(self.fg).bg(self.bg)
        }
    }

    pub fn text_dim(&self) -> Style {
        if self.is_transparent {
            Style::default().fg(self.fg_dim)
        } else {
            Style::default().fg(self.fg_dim).bg(self.bg)
        }
    }

    pub fn title(&self) -> Style {
        if self.is_transparent {
            Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.accent)
                .bg(self.bg)
                .add_modifier(Modifier::BOLD)
        }
    }

    pub fn selected(&self) -> Style {
        if self.is_transparent {
            Style::default()
                .fg(self.selection_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.selection_fg)
                .bg(self.selection_bg)
                .add_modifier(Modifier::BOLD)
        }
    }

    pub fn border(&self) -> Style {
        if self.is_transparent {
            Style::default().fg(self.border)
        } else {
            Style::default().fg(self.border).bg(self.bg)
        }
    }

    pub fn border_focused(&self) -> Style {
        if self.is_transparent {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border_focused).bg(self.bg)
        }
    }

    pub fn success(&self) -> Style {
        if self.is_transparent {
            Style::default().fg(self.success)
        } else {
            Style::default().fg(self.success).bg(self.bg)
        }
    }

    pub fn error(&self) -> Style {
        if self.is_transparent {
            Style::default().fg(self.error)
        } else {
            Style::default().fg(self.error).bg(self.bg)
        }
    }

    /// Plain code text, used when syntax highlighting is switched off
    pub fn code(&self) -> Style {
        if self.is_transparent {
            Style::default().fg(self.fg_dim)
        } else {
            Style::default().fg(self.fg_dim).bg(self.code_bg)
        }
    }

    /// The language chip above a code block
    pub fn code_label(&self) -> Style {
        if self.is_transparent {
            Style::default()
                .fg(self.accent_dim)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.accent_dim)
                .bg(self.code_bg)
                .add_modifier(Modifier::BOLD)
        }
    }

    pub fn block_style(&self) -> Style {
        if self.is_transparent {
            Style::default()
        } else {
            Style::default().bg(self.bg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        let gruvbox = Theme::from_name(ThemeName::Gruvbox);
        assert_eq!(gruvbox.bg, Color::Rgb(40, 40, 40));
        assert!(!gruvbox.is_transparent);

        let nord = Theme::from_name(ThemeName::Nord);
        assert_eq!(nord.bg, Color::Rgb(46, 52, 64));

        let transparent = Theme::from_name(ThemeName::Transparent);
        assert!(transparent.is_transparent);
    }

    #[test]
    fn test_code_styles_keep_their_own_background() {
        let theme = Theme::catppuccin();
        assert_eq!(theme.code().bg, Some(theme.code_bg));
        assert_eq!(theme.code_label().bg, Some(theme.code_bg));

        let transparent = Theme::transparent();
        assert_eq!(transparent.code().bg, None);
    }
}
