use crate::app::state::*;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::block::Padding;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.mode == Mode::Rename;
    let (border_style, border_type, bg) = if focused {
        (
            Theme::border_focused(),
            Theme::border_type_focused(),
            Theme::panel_bg_focused(),
        )
    } else {
        (Theme::border(), Theme::border_type(), Theme::panel_bg())
    };

    let block = Block::default()
        .title(" Rename ")
        .title_style(if focused {
            Theme::title()
        } else {
            Theme::border()
        })
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .padding(Padding::horizontal(1))
        .style(bg);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if focused {
        // Prompt chevron + input text
        let line = Line::from(vec![
            Span::styled("❯ ", Style::default().fg(Theme::ACCENT_TEAL)),
            Span::styled(state.input.text.as_str(), Theme::input_text()),
        ]);
        frame.render_widget(Paragraph::new(line), inner);

        // Cursor offset: chevron "❯ " (2 cells) + display width before cursor
        let prompt_offset = 2u16;
        let before = state.input.text[..state.input.cursor].width() as u16;
        let cursor_x = inner.x + prompt_offset + before;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    } else {
        let hint = Paragraph::new("press n to rename").style(Theme::hint());
        frame.render_widget(hint, inner);
    }
}
