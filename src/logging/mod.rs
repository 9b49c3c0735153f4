//! Diagnostic logging to disk.
//!
//! The terminal UI owns stdout, so tracing output goes to a daily log file
//! named `tinystore_<date>.log` in the configured log directory (default:
//! `~/.local/share/tinystore/logs/`). Nothing is installed when logging is
//! disabled.

use crate::app::state::CounterState;
use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Mutex;
use tinystore::{Store, Unsubscribe};
use tracing::Level;

/// Install the global tracing subscriber. Returns the log file path when
/// logging is enabled.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let level = Level::from_str(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;
    let log_dir = expand_home(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let path = log_dir.join(log_file_name(&chrono::Local::now().date_naive()));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")?;

    Ok(Some(path))
}

fn log_file_name(date: &chrono::NaiveDate) -> String {
    format!("tinystore_{}.log", date.format("%Y-%m-%d"))
}

/// Expand a leading `~/` to the home directory.
fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(dir),
        },
        None => Path::new(dir).to_path_buf(),
    }
}

/// Records every committed state of the demo store as a tracing event.
///
/// Unsubscribes when dropped.
pub struct StateChangeLog {
    unsubscribe: Unsubscribe,
    recorded: Rc<Cell<u64>>,
}

impl StateChangeLog {
    pub fn attach(store: &Store<CounterState>) -> Self {
        let recorded = Rc::new(Cell::new(0u64));
        let counter = Rc::clone(&recorded);
        let label = store.label();
        let unsubscribe = store.subscribe_fn(move |state: &CounterState| {
            counter.set(counter.get() + 1);
            tracing::info!(
                store = %label,
                at = %chrono::Local::now().format("%H:%M:%S%.3f"),
                val = state.val,
                name = %state.name,
                "state changed"
            );
        });
        Self {
            unsubscribe,
            recorded,
        }
    }

    pub fn recorded(&self) -> u64 {
        self.recorded.get()
    }
}

impl Drop for StateChangeLog {
    fn drop(&mut self) {
        self.unsubscribe.unsubscribe();
    }
}
