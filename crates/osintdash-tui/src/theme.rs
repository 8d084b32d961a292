use ratatui::style::{Color, Modifier, Style};

use osintdash_core::Severity;

/// Color theme for the TUI.
pub struct Theme {
    pub success: Color,
    pub info: Color,
    pub warning: Color,
    pub danger: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub focus_border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            success: Color::Green,
            info: Color::Cyan,
            warning: Color::Yellow,
            danger: Color::Red,

            header_fg: Color::Black,
            header_bg: Color::Green,
            border: Color::DarkGray,
            focus_border: Color::Green,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            active: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Success => self.success,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Danger => self.danger,
        }
    }

    pub fn diagnostic_color(&self, level: log::Level) -> Color {
        match level {
            log::Level::Error => self.danger,
            log::Level::Warn => self.warning,
            _ => self.dim,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default().fg(self.header_fg).bg(self.header_bg).add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().bg(self.highlight_bg).add_modifier(Modifier::BOLD)
    }

    pub fn selected_column_style(&self) -> Style {
        Style::default().fg(self.active).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
