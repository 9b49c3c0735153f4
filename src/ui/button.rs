use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// The Button only writes to the store, so it holds a setter and no binding.
pub fn render(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Button ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let lines = vec![
        Line::from(Span::styled(" update ", Theme::button())),
        Line::from(Span::styled("u / Enter", Theme::hint())),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}
