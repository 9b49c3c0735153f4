use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub title: Rect,
    pub counter: Rect,
    pub name: Rect,
    pub button: Rect,
    pub input_box: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    // Main vertical split: title | panels | input | filler | status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(5), // Panels
            Constraint::Length(3), // Input box
            Constraint::Min(0),    // Filler
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    // Horizontal: counter | name | button
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .spacing(1)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(main_chunks[1]);

    AppLayout {
        title: main_chunks[0],
        counter: panels[0],
        name: panels[1],
        button: panels[2],
        input_box: main_chunks[2],
        status_bar: main_chunks[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fills_width() {
        let layout = compute_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.title.height, 1);
        assert_eq!(layout.counter.height, 5);
        assert_eq!(layout.input_box.height, 3);
        assert_eq!(layout.status_bar.y, 23);
        assert!(layout.counter.right() <= layout.name.x);
        assert!(layout.name.right() <= layout.button.x);
        assert!(layout.button.right() <= 80);
    }
}
