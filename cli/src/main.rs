//! cordon demo binary - terminal session management and the event loop.
//!
//! # Architecture
//!
//! The binary bridges [`cordon_engine`] (retained tree, boundaries) and
//! [`cordon_tui`] (rendering), providing RAII-based terminal management
//! with guaranteed cleanup.
//!
//! ```text
//! main() -> TerminalSession::new() -> run_app() -> DemoApp + draw()
//! ```
//!
//! # Event Loop
//!
//! 1. Drive the runtime if anything marked it dirty
//! 2. Draw the committed tree
//! 3. Block on input until the next tick is due
//! 4. Advance the demo clock

mod config;
mod demo;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::CordonConfig;
use demo::DemoApp;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_cordon_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_cordon_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let candidates = cordon_log_file_candidates();
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn cordon_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.cordon/logs/cordon.log
    if let Some(config_path) = CordonConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("cordon.log"));
    }

    // Fallback: ./.cordon/logs/cordon.log (useful in constrained environments)
    candidates.push(PathBuf::from(".cordon").join("logs").join("cordon.log"));

    candidates
}

// While the alternate screen is up, stderr panic reports are invisible,
// and with panic capture on a component panic is a recoverable event.
// Reports go to the log instead; if a panic does unwind all the way out,
// TerminalSession's drop still restores the screen.
fn install_panic_logging() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored even when a component
/// panic unwinds out of the event loop with panic capture disabled.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<()> {
    init_tracing();
    install_panic_logging();

    let config = CordonConfig::load().ok().flatten().unwrap_or_default();
    let mut app = DemoApp::new(&config);

    // The session's drop restores the terminal before main's error (if any)
    // reaches stderr.
    let mut session = TerminalSession::new()?;
    run_app(&mut session.terminal, &mut app)
}

const TICK_INTERVAL: Duration = Duration::from_millis(250);

fn run_app<B>(terminal: &mut Terminal<B>, app: &mut DemoApp) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut last_tick = Instant::now();

    loop {
        app.advance()?;
        terminal.draw(|frame| app.draw(frame))?;

        let timeout = TICK_INTERVAL.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && app.handle_key(key.code)
        {
            return Ok(());
        }

        if last_tick.elapsed() >= TICK_INTERVAL {
            app.tick();
            last_tick = Instant::now();
        }
    }
}
