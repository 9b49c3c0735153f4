use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::state::*;
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::RngExt;
use tinystore::{Setter, StoreError};
use tracing::debug;

pub fn handle_event(state: &mut AppState, event: AppEvent, current_name: &str) -> Vec<Action> {
    match event {
        AppEvent::Terminal(CEvent::Key(key)) if key.kind != KeyEventKind::Release => {
            handle_key(state, key, current_name)
        }
        AppEvent::Terminal(CEvent::Resize(_, _)) => {
            state.dirty = true;
            vec![]
        }
        AppEvent::Terminal(_) => vec![],
        AppEvent::Tick => {
            state.tick_count = state.tick_count.wrapping_add(1);
            vec![]
        }
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent, current_name: &str) -> Vec<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }
    match state.mode {
        Mode::Normal => handle_normal_key(state, key, current_name),
        Mode::Rename => handle_rename_key(state, key),
    }
}

fn handle_normal_key(state: &mut AppState, key: KeyEvent, current_name: &str) -> Vec<Action> {
    // Any keypress clears a stale status message
    if state.status_message.take().is_some() {
        state.dirty = true;
    }
    match key.code {
        KeyCode::Char('q') => vec![Action::Quit],
        KeyCode::Char('u') | KeyCode::Enter => vec![Action::Randomize],
        KeyCode::Char('+') | KeyCode::Char('=') => vec![Action::Step { delta: 1.0 }],
        KeyCode::Char('-') => vec![Action::Step { delta: -1.0 }],
        KeyCode::Char('n') => {
            state.enter_rename(current_name);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_rename_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    state.dirty = true;
    match key.code {
        KeyCode::Esc => {
            state.leave_rename();
            vec![]
        }
        KeyCode::Enter => {
            let name = state.input.take_text();
            state.leave_rename();
            vec![Action::Rename { name }]
        }
        KeyCode::Backspace => {
            state.input.delete_back();
            vec![]
        }
        KeyCode::Left => {
            state.input.move_left();
            vec![]
        }
        KeyCode::Right => {
            state.input.move_right();
            vec![]
        }
        KeyCode::Home => {
            state.input.move_home();
            vec![]
        }
        KeyCode::End => {
            state.input.move_end();
            vec![]
        }
        KeyCode::Char(c) => {
            state.input.insert_char(c);
            vec![]
        }
        _ => vec![],
    }
}

/// A random value in `0.00..1.00`, rounded to two decimals.
pub fn random_val() -> f64 {
    let mut rng = rand::rng();
    let cents: u32 = rng.random_range(0..100);
    f64::from(cents) / 100.0
}

/// Apply one action to the store. Rejected writes become a status message;
/// the store itself is left untouched in that case.
pub fn apply_action(state: &mut AppState, setter: &Setter<CounterState>, action: Action) {
    debug!(?action, "applying action");
    let result = match action {
        Action::Randomize => setter.set(CounterPatch::val(random_val())),
        Action::Step { delta } => setter.update(|s| CounterPatch::val(s.val + delta)),
        Action::Rename { name } => setter.set(CounterPatch::name(name)),
        Action::Quit => {
            state.should_quit = true;
            Ok(())
        }
    };
    if let Err(e) = result {
        report_error(state, &e);
    }
}

fn report_error(state: &mut AppState, err: &StoreError) {
    match err {
        StoreError::InvalidPatch(_) => state.set_status(format!("Rejected: {}", err)),
        StoreError::Listener { .. } | StoreError::Selector(_) => {
            state.set_status(format!("Error: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crossterm::event::KeyEventState;
    use tinystore::create;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    fn app() -> AppState {
        AppState::new(AppConfig::default())
    }

    #[test]
    fn test_normal_mode_keys() {
        let mut state = app();
        assert_eq!(handle_event(&mut state, key(KeyCode::Char('u')), "a"), vec![Action::Randomize]);
        assert_eq!(
            handle_event(&mut state, key(KeyCode::Char('+')), "a"),
            vec![Action::Step { delta: 1.0 }]
        );
        assert_eq!(
            handle_event(&mut state, key(KeyCode::Char('-')), "a"),
            vec![Action::Step { delta: -1.0 }]
        );
        assert_eq!(handle_event(&mut state, key(KeyCode::Char('q')), "a"), vec![Action::Quit]);
    }

    #[test]
    fn test_ctrl_c_quits_in_any_mode() {
        let mut state = app();
        state.enter_rename("a");
        let event = AppEvent::Terminal(CEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(handle_event(&mut state, event, "a"), vec![Action::Quit]);
    }

    #[test]
    fn test_rename_flow() {
        let mut state = app();
        assert!(handle_event(&mut state, key(KeyCode::Char('n')), "ab").is_empty());
        assert_eq!(state.mode, Mode::Rename);

        handle_event(&mut state, key(KeyCode::Backspace), "ab");
        handle_event(&mut state, key(KeyCode::Char('z')), "ab");
        // 'q' is text while renaming
        handle_event(&mut state, key(KeyCode::Char('q')), "ab");
        let actions = handle_event(&mut state, key(KeyCode::Enter), "ab");
        assert_eq!(actions, vec![Action::Rename { name: "azq".into() }]);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_rename_cancel() {
        let mut state = app();
        handle_event(&mut state, key(KeyCode::Char('n')), "ab");
        let actions = handle_event(&mut state, key(KeyCode::Esc), "ab");
        assert!(actions.is_empty());
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_random_val_range() {
        for _ in 0..200 {
            let v = random_val();
            assert!((0.0..1.0).contains(&v));
            assert_eq!((v * 100.0).round() / 100.0, v);
        }
    }

    #[test]
    fn test_apply_step_and_rename() {
        let store = create(CounterState {
            val: 1.0,
            name: "a".into(),
        });
        let setter = store.use_store(|s| s.val).setter();
        let mut state = app();

        apply_action(&mut state, &setter, Action::Step { delta: 1.0 });
        apply_action(&mut state, &setter, Action::Step { delta: 1.0 });
        assert_eq!(store.get().val, 3.0);

        apply_action(&mut state, &setter, Action::Rename { name: "b".into() });
        assert_eq!(store.get().name, "b");
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_apply_rejected_rename_sets_status() {
        let store = create(CounterState {
            val: 1.0,
            name: "a".into(),
        });
        let setter = store.use_store_all().setter();
        let mut state = app();

        apply_action(&mut state, &setter, Action::Rename { name: "".into() });
        assert_eq!(store.get().name, "a");
        assert_eq!(store.version(), 0);
        let status = state.status_message.expect("status set");
        assert!(status.contains("name must not be empty"));
    }

    #[test]
    fn test_apply_quit() {
        let store = create(CounterState {
            val: 0.0,
            name: "a".into(),
        });
        let binding = store.use_store_all();
        let mut state = app();
        apply_action(&mut state, &binding.setter(), Action::Quit);
        assert!(state.should_quit);
    }
}
