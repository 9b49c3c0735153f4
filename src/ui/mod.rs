mod button;
mod counter;
mod input_box;
mod layout;
mod name;
mod status_bar;
mod theme;

use crate::app::state::{AppState, CounterState};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::cell::Cell;
use tinystore::{Binding, Setter, Store};
use theme::Theme;

/// Ticks a panel stays highlighted after it refreshed.
const FLASH_TICKS: u64 = 6;

/// The mounted panels. Each reading panel holds its own selector binding;
/// dropping `Panels` unmounts them all.
pub struct Panels {
    pub store: Store<CounterState>,
    pub counter: Binding<CounterState, f64>,
    pub name: Binding<CounterState, String>,
    pub button: Setter<CounterState>,
    counter_flash_until: Cell<u64>,
    name_flash_until: Cell<u64>,
}

impl Panels {
    pub fn mount(store: &Store<CounterState>) -> Self {
        let counter = store.use_store(|s| s.val);
        let name = store.use_store(|s| s.name.clone());
        let button = counter.setter();
        Self {
            store: store.clone(),
            counter,
            name,
            button,
            counter_flash_until: Cell::new(0),
            name_flash_until: Cell::new(0),
        }
    }

    /// Consume refresh requests raised since the last frame. Both bindings
    /// are drained; returns whether anything needs a redraw.
    pub fn take_refresh(&self, tick: u64) -> bool {
        let counter = self.counter.take_refresh();
        let name = self.name.take_refresh();
        if counter {
            self.counter_flash_until.set(tick + FLASH_TICKS);
        }
        if name {
            self.name_flash_until.set(tick + FLASH_TICKS);
        }
        counter || name
    }

    /// Whether a highlight ends on this tick and the panel must be redrawn.
    pub fn flash_ends(&self, tick: u64) -> bool {
        self.counter_flash_until.get() == tick || self.name_flash_until.get() == tick
    }

    fn flashing(&self, tick: u64) -> (bool, bool) {
        (
            self.counter_flash_until.get() > tick,
            self.name_flash_until.get() > tick,
        )
    }
}

pub fn render(frame: &mut Frame, state: &AppState, panels: &Panels) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area);
    let (counter_flash, name_flash) = panels.flashing(state.tick_count);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" tinystore ", Theme::title()),
        Span::styled("shared store demo", Theme::hint()),
    ]));
    frame.render_widget(title, app_layout.title);

    counter::render(frame, app_layout.counter, panels, counter_flash);
    name::render(frame, app_layout.name, panels, name_flash);
    button::render(frame, app_layout.button);
    input_box::render(frame, app_layout.input_box, state);
    status_bar::render(frame, app_layout.status_bar, state, panels);
}
