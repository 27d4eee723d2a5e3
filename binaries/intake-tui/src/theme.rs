//! Color schemes for the intake TUI.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn palette(&self) -> ThemePalette {
        match self {
            Self::Dark => ThemePalette::dark(),
            Self::Light => ThemePalette::light(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemePalette {
    pub bg: Color,
    pub fg: Color,

    pub primary: Color,
    pub accent: Color,

    pub success: Color,
    pub error: Color,

    pub border: Color,
    pub border_active: Color,

    pub text_muted: Color,
    pub text_highlight: Color,

    pub selection_bg: Color,
    pub selection_fg: Color,
}

impl ThemePalette {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(18, 18, 24),
            fg: Color::Rgb(220, 220, 230),

            primary: Color::Rgb(100, 149, 237),
            accent: Color::Rgb(255, 193, 7),

            success: Color::Rgb(46, 204, 113),
            error: Color::Rgb(231, 76, 60),

            border: Color::Rgb(60, 60, 80),
            border_active: Color::Rgb(100, 149, 237),

            text_muted: Color::Rgb(120, 120, 140),
            text_highlight: Color::Rgb(255, 215, 0),

            selection_bg: Color::Rgb(60, 80, 120),
            selection_fg: Color::Rgb(255, 255, 255),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 252),
            fg: Color::Rgb(30, 30, 40),

            primary: Color::Rgb(33, 150, 243),
            accent: Color::Rgb(255, 152, 0),

            success: Color::Rgb(76, 175, 80),
            error: Color::Rgb(244, 67, 54),

            border: Color::Rgb(200, 200, 210),
            border_active: Color::Rgb(33, 150, 243),

            text_muted: Color::Rgb(140, 140, 160),
            text_highlight: Color::Rgb(255, 152, 0),

            selection_bg: Color::Rgb(33, 150, 243),
            selection_fg: Color::Rgb(255, 255, 255),
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn primary_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.text_highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.selection_fg)
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// A choice flashing after its shortcut was pressed
    pub fn pressed_style(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, active: bool, invalid: bool) -> Style {
        if invalid {
            Style::default().fg(self.error)
        } else if active {
            Style::default().fg(self.border_active)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn button_style(&self, enabled: bool, focused: bool) -> Style {
        match (enabled, focused) {
            (false, _) => self.muted_style(),
            (true, true) => self.selection_style(),
            (true, false) => Style::default()
                .fg(self.primary)
                .add_modifier(Modifier::BOLD),
        }
    }
}
