use crate::app::state::*;
use crate::ui::theme::Theme;
use crate::ui::Panels;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, panels: &Panels) {
    let mut parts: Vec<Span> = Vec::new();

    let status_style = if state.status_message.is_some() {
        Theme::error_message()
    } else {
        Theme::status_bar()
    };
    parts.push(Span::styled(format!(" {} ", state.status_line()), status_style));

    if state.config.ui.show_refresh_counts {
        parts.push(Span::styled(
            format!(
                " | refreshes counter:{} name:{} | writes:{} ",
                panels.counter.refresh_count(),
                panels.name.refresh_count(),
                panels.store.version()
            ),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        ));
    }

    // Mode indicator
    let mode_name = match state.mode {
        Mode::Normal => "NORMAL",
        Mode::Rename => "RENAME",
    };
    // Pad to fill remaining space
    let used: usize = parts.iter().map(|s| s.width()).sum();
    let remaining = (area.width as usize).saturating_sub(used + mode_name.len() + 3);
    parts.push(Span::styled(" ".repeat(remaining), Theme::status_bar()));
    parts.push(Span::styled(
        format!(" [{}] ", mode_name),
        Style::default().fg(Color::Cyan).bg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
