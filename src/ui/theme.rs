use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub struct Theme;

impl Theme {
    pub const ACCENT_TEAL: Color = Color::Rgb(0x2e, 0xc4, 0xb6);

    pub fn border() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn border_type() -> BorderType {
        BorderType::Plain
    }

    pub fn border_type_focused() -> BorderType {
        BorderType::Rounded
    }

    pub fn panel_bg() -> Style {
        Style::default()
    }

    pub fn panel_bg_focused() -> Style {
        Style::default().bg(Color::Rgb(0x1c, 0x1f, 0x26))
    }

    pub fn title() -> Style {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    }

    pub fn value() -> Style {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub fn flash() -> Style {
        Style::default().fg(Color::Black).bg(Self::ACCENT_TEAL)
    }

    pub fn hint() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn button() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn input_text() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    pub fn error_message() -> Style {
        Style::default().fg(Color::Red).bg(Color::DarkGray)
    }
}
