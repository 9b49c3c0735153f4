mod app;
mod config;
mod logging;
mod ui;

use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::*;
use crate::logging::StateChangeLog;
use crate::ui::Panels;
use anyhow::Result;
use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io;
use tinystore::Store;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|a| a == "--write-config") {
        let path = config::write_default_config()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Load config
    let cfg = config::load_config()?;

    if let Some(path) = logging::init(&cfg.logging)? {
        tracing::info!(path = %path.display(), "logging started");
    }

    // Install panic hook to restore terminal. Listener panics are caught by
    // the store and the UI keeps running, so those only get logged.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if tinystore::panic_is_isolated() {
            tracing::error!(panic = %info, "listener panicked");
            return;
        }
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, cfg).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let store = Store::with_label("demo", CounterState::from_config(&cfg));
    let panels = Panels::mount(&store);
    let change_log = StateChangeLog::attach(&store);
    let mut state = AppState::new(cfg.clone());

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    if term_tx.send(AppEvent::Terminal(event)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
            }
        }
    });

    // Spawn tick task
    let tick_tx = event_tx.clone();
    let tick_rate = std::time::Duration::from_millis(cfg.ui.tick_rate_ms.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_rate);
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    // Initial render
    terminal.draw(|f| ui::render(f, &state, &panels))?;

    // Main event loop
    loop {
        let event = event_rx.recv().await;
        let Some(event) = event else { break };

        let current_name = panels.name.value();
        let actions = handler::handle_event(&mut state, event, &current_name);
        for action in actions {
            handler::apply_action(&mut state, &panels.button, action);
        }

        if state.should_quit {
            break;
        }

        // Bindings raise refreshes only when their slice changed
        let refreshed = panels.take_refresh(state.tick_count);
        if refreshed || state.dirty || panels.flash_ends(state.tick_count) {
            terminal.draw(|f| ui::render(f, &state, &panels))?;
            state.dirty = false;
        }
    }

    tracing::info!(
        writes = store.version(),
        logged = change_log.recorded(),
        "shutting down"
    );
    Ok(())
}
