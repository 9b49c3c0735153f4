use crate::config::AppConfig;
use tinystore::{Merge, MergeError};

/// Shared state of the demo store: what the Counter, Name and Button
/// panels read and write.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterState {
    pub val: f64,
    pub name: String,
}

impl CounterState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            val: config.store.initial_val,
            name: config.store.initial_name.clone(),
        }
    }
}

/// Partial update of [`CounterState`]. `None` fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterPatch {
    pub val: Option<f64>,
    pub name: Option<String>,
}

impl CounterPatch {
    pub fn val(val: f64) -> Self {
        Self {
            val: Some(val),
            ..Default::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl Merge for CounterState {
    type Patch = CounterPatch;

    fn merge(&self, patch: CounterPatch) -> Result<Self, MergeError> {
        if let Some(val) = patch.val {
            if !val.is_finite() {
                return Err(MergeError::new(format!("val must be finite, got {}", val)));
            }
        }
        if let Some(ref name) = patch.name {
            if name.trim().is_empty() {
                return Err(MergeError::new("name must not be empty"));
            }
        }
        Ok(Self {
            val: patch.val.unwrap_or(self.val),
            name: patch.name.unwrap_or_else(|| self.name.clone()),
        })
    }
}

#[derive(Debug)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn take_text(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Normal,
    Rename,
}

/// UI-local state. Everything shared between panels lives in the store;
/// this only tracks input handling and the status line.
pub struct AppState {
    pub config: AppConfig,
    pub mode: Mode,
    pub input: InputState,
    pub should_quit: bool,
    pub dirty: bool,
    pub status_message: Option<String>,
    pub tick_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            mode: Mode::Normal,
            input: InputState::new(),
            should_quit: false,
            dirty: true,
            status_message: None,
            tick_count: 0,
        }
    }

    pub fn enter_rename(&mut self, current_name: &str) {
        self.mode = Mode::Rename;
        self.input.clear();
        for c in current_name.chars() {
            self.input.insert_char(c);
        }
        self.dirty = true;
    }

    pub fn leave_rename(&mut self) {
        self.mode = Mode::Normal;
        self.input.clear();
        self.dirty = true;
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(text.into());
        self.dirty = true;
    }

    pub fn status_line(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }
        match self.mode {
            Mode::Normal => "u: update  +/-: step  n: rename  q: quit".to_string(),
            Mode::Rename => "Enter: apply  Esc: cancel".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> CounterState {
        CounterState {
            val: 0.0,
            name: "a".into(),
        }
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let next = state().merge(CounterPatch::val(1.0)).unwrap();
        assert_eq!(
            next,
            CounterState {
                val: 1.0,
                name: "a".into()
            }
        );
        let next = next.merge(CounterPatch::name("b")).unwrap();
        assert_eq!(next.val, 1.0);
        assert_eq!(next.name, "b");
    }

    #[test]
    fn test_merge_rejects_blank_name() {
        let err = state().merge(CounterPatch::name("   ")).unwrap_err();
        assert_eq!(err.message(), "name must not be empty");
    }

    #[test]
    fn test_merge_rejects_non_finite_val() {
        assert!(state().merge(CounterPatch::val(f64::NAN)).is_err());
        assert!(state().merge(CounterPatch::val(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig::default();
        let s = CounterState::from_config(&config);
        assert_eq!(s.val, 0.0);
        assert_eq!(s.name, "vamshi");
    }

    #[test]
    fn test_input_editing() {
        let mut input = InputState::new();
        for c in "héllo".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.delete_back();
        assert_eq!(input.text, "hélo");
        input.move_home();
        input.insert_char('>');
        input.move_end();
        input.move_right();
        assert_eq!(input.cursor, input.text.len());
        assert_eq!(input.take_text(), ">hélo");
        assert!(input.text.is_empty());
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_enter_rename_prefills_input() {
        let mut app = AppState::new(AppConfig::default());
        app.enter_rename("vamshi");
        assert_eq!(app.mode, Mode::Rename);
        assert_eq!(app.input.text, "vamshi");
        assert_eq!(app.input.cursor, 6);
        app.leave_rename();
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.input.text.is_empty());
    }
}
