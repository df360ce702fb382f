mod config;
mod dispatch;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::sync::mpsc;

use fleetscope_api::Backends;
use fleetscope_tui::{
    Action, AppState, Event, EventHandler, FormDialog, HelpOverlay, InputMode, KeyBindings,
    KeyContext, LogsScreen, MetricsScreen, Picker, RobotsScreen, Screen, Tui,
};

use crate::config::{Config, Overrides};
use crate::dispatch::{Dispatcher, InternalAction};

/// Fleetscope - A terminal console for a robot fleet
#[derive(Parser, Debug)]
#[command(name = "fleetscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to <config dir>/fleetscope/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Robot registry upstream URL
    #[arg(long, value_name = "URL")]
    robot_url: Option<String>,

    /// Prometheus-compatible metrics upstream URL
    #[arg(long, value_name = "URL")]
    metrics_url: Option<String>,

    /// Loki-compatible logs upstream URL
    #[arg(long, value_name = "URL")]
    logs_url: Option<String>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// UI tick interval in milliseconds
    #[arg(long, default_value = "250")]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref())?;

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn init_tracing(log_file: Option<&std::path::Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run_app(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply(Overrides {
        robot_url: args.robot_url,
        metrics_url: args.metrics_url,
        logs_url: args.logs_url,
    });

    let backends = Backends::new(&config.routes, config.request_timeout())
        .context("Failed to build HTTP client")?;
    tracing::info!(
        robots = backends.robots.base_url(),
        metrics = backends.metrics.base_url(),
        logs = backends.logs.base_url(),
        "backends configured"
    );

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();

    let mut state = AppState::new(config.refresh_intervals());
    let mut dispatcher = Dispatcher::new(backends, internal_tx);

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(args.tick_ms.max(10)));
    let keybindings = KeyBindings::new();

    state.start();
    dispatcher.run(state.take_effects());
    render(&mut tui, &mut state)?;

    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        if let Some(action) = keybindings.get_action(key_context(&state), &key) {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Tick => state.on_tick(Instant::now()),
                    Event::Resize(_, _) => {}
                    Event::Error(e) => state.show_error(e),
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                state.dispatch(action, Instant::now());
            }

            // Handle backend results
            Some(internal) = internal_rx.recv() => {
                match internal {
                    InternalAction::Fetched { generation, outcome } => {
                        state.apply_fetch(generation, outcome, Utc::now());
                    }
                    InternalAction::Mutated { form, result } => {
                        state.apply_mutation(form, result);
                    }
                }
            }
        }

        dispatcher.run(state.take_effects());

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    // Cleanup
    dispatcher.shutdown();
    events.shutdown().await;
    tui.restore()?;

    Ok(())
}

/// Overlays capture keys before the screen underneath
fn key_context(state: &AppState) -> KeyContext {
    if state.ui_state.picker.is_some() {
        KeyContext::Picker
    } else if state.ui_state.form.is_some() {
        KeyContext::Form
    } else if state.ui_state.input_mode != InputMode::Normal {
        KeyContext::TextInput
    } else {
        state.current_screen.into()
    }
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal().draw(|frame| {
        match state.current_screen {
            Screen::Robots => RobotsScreen::render(frame, state),
            Screen::Logs => LogsScreen::render(frame, state),
            Screen::Metrics => MetricsScreen::render(frame, state),
        }

        if let Some(picker) = state.ui_state.picker.as_mut() {
            Picker::render(frame, picker);
        }

        if let Some(form) = &state.ui_state.form {
            FormDialog::render(frame, form);
        }

        if state.ui_state.help_visible {
            HelpOverlay::render(frame, state.current_screen);
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetscope_tui::{PickerKind, PickerState, RefreshIntervals, RobotForm};

    #[test]
    fn test_key_context_prefers_overlays() {
        let mut state = AppState::new(RefreshIntervals::default());
        assert_eq!(key_context(&state), KeyContext::Robots);

        state.current_screen = Screen::Logs;
        state.ui_state.input_mode = InputMode::Search;
        assert_eq!(key_context(&state), KeyContext::TextInput);

        state.ui_state.form = Some(RobotForm::add());
        assert_eq!(key_context(&state), KeyContext::Form);

        state.ui_state.picker = Some(PickerState::open(PickerKind::Metric, &[], ""));
        assert_eq!(key_context(&state), KeyContext::Picker);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["fleetscope", "--logs-url", "http://loki:3100"]);
        assert_eq!(args.tick_ms, 250);
        assert_eq!(args.logs_url.as_deref(), Some("http://loki:3100"));
        assert!(args.config.is_none());
    }
}
