use crate::ui::theme::Theme;
use crate::ui::Panels;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Shows `val`. Reads only through its own binding, so name changes do not
/// count as refreshes here.
pub fn render(frame: &mut Frame, area: Rect, panels: &Panels, flash: bool) {
    let block = Block::default()
        .title(" Counter ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_style(if flash {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let val = panels.counter.value();
    let style = if flash { Theme::flash() } else { Theme::value() };
    let paragraph = Paragraph::new(Line::from(Span::styled(format!("{:.2}", val), style)))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}
