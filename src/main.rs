use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use crossterm::event::{Event, KeyEventKind};
use ratatui::DefaultTerminal;

use pulse_levels::config::Config;
use pulse_levels::engine::Engine;
use pulse_levels::error::AppError;
use pulse_levels::event::AppEvent;
use pulse_levels::input::{parse_key_event, UiCommand};
use pulse_levels::market::rest::TickerClient;
use pulse_levels::session::run_tick;
use pulse_levels::state_store;
use pulse_levels::trial::{FileTimestampStore, LockOrigin, SystemClock, TrialLock};
use pulse_levels::ui::{self, format::format_remaining, AppState};

enum LoopExit {
    UserQuit,
    TrialExpired,
}

struct Runtime<'a> {
    engine: Engine,
    client: TickerClient,
    trial: TrialLock<SystemClock>,
    app_state: AppState,
    state_path: &'a Path,
    tick_interval: Duration,
}

impl Runtime<'_> {
    fn save_state(&mut self, announce: bool) {
        match state_store::persist_state_to_path(self.state_path, &self.engine.to_persisted()) {
            Ok(()) if announce => self.app_state.apply(AppEvent::StateSaved {
                path: self.state_path.display().to_string(),
            }),
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(error = format!("{:#}", e), "failed to persist engine state");
                self.app_state
                    .apply(AppEvent::Error(format!("save failed: {:#}", e)));
            }
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.app_state.now = Local::now();
        terminal.draw(|frame| ui::render(frame, &self.app_state))?;
        Ok(())
    }

    async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<LoopExit> {
        loop {
            if let Err(e) = self.trial.check() {
                tracing::warn!(error = %e, "trial duration reached, stopping");
                return Ok(LoopExit::TrialExpired);
            }

            let outcome = run_tick(&mut self.engine, &self.client, Utc::now()).await;
            let updated = outcome.is_updated();
            self.app_state.apply(AppEvent::TickOutcome(outcome));
            if updated {
                self.app_state.prices = self.engine.buffer().prices();
                self.app_state
                    .apply(AppEvent::Snapshot(self.engine.snapshot()));
            }

            self.draw(terminal)?;
            self.save_state(false);

            // Inter-tick wait doubles as the input window.
            let deadline = Instant::now() + self.tick_interval;
            loop {
                let timeout = deadline.saturating_duration_since(Instant::now());
                if timeout.is_zero() {
                    break;
                }
                if !crossterm::event::poll(timeout)? {
                    continue;
                }
                let Event::Key(key) = crossterm::event::read()? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match parse_key_event(&key) {
                    Some(UiCommand::Quit) => {
                        tracing::info!("User quit");
                        return Ok(LoopExit::UserQuit);
                    }
                    Some(UiCommand::SaveNow) => {
                        self.save_state(true);
                        self.draw(terminal)?;
                    }
                    Some(UiCommand::ClearLog) => {
                        self.app_state.log_messages.clear();
                        self.draw(terminal)?;
                    }
                    None => {}
                }
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create {}", config.logging.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        asset = %config.market.asset_label,
        url = %config.market.ticker_url,
        "Starting pulse-levels"
    );

    let trial_duration = config.session.trial_duration()?;
    let lock_store = FileTimestampStore::new(&config.session.lock_path);
    let trial = match TrialLock::acquire(&lock_store, SystemClock, trial_duration) {
        Ok(lock) => lock,
        Err(e @ AppError::TrialExpired { .. }) => {
            tracing::warn!(error = %e, "trial expired at startup");
            eprintln!("[TRIAL EXPIRED] {}", e);
            eprintln!(
                "The demo runs for {} in total from its first start.",
                config.session.trial_duration
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("failed to acquire trial lock"),
    };
    match trial.origin() {
        LockOrigin::Existing => println!(
            "Trial active. Remaining: {}",
            format_remaining(trial.remaining())
        ),
        _ => println!(
            "First run of the demo. Duration: {}",
            config.session.trial_duration
        ),
    }

    let tolerance = config.engine.cluster_tolerance()?;
    let mut engine = Engine::from_config(&config.engine, tolerance);
    let state_path = state_store::state_path(&config.session.state_path);
    if let Some(persisted) = state_store::load_state_or_empty(&state_path) {
        engine.restore(persisted);
    }

    let client = TickerClient::new(&config.market)?;
    let tick_interval = config.session.tick_interval()?;

    let mut app_state = AppState::new(
        &config.ui.title,
        &config.market.asset_label,
        engine.min_data_points(),
    );
    app_state.max_log_messages = config.ui.max_log_lines.max(1);
    app_state.set_trial(trial.first_start(), trial.limit());
    if engine.buffer().len() < engine.min_data_points() {
        app_state.data_start = Some(Utc::now());
    }
    app_state.prices = engine.buffer().prices();
    app_state.apply(AppEvent::Snapshot(engine.snapshot()));
    app_state.push_log(format!(
        "pulse-levels started | {} | {} points restored | first start {}",
        config.market.asset_label,
        engine.buffer().len(),
        trial.first_start().with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    ));
    tracing::info!(url = %client.url(), "polling ticker");

    let mut runtime = Runtime {
        engine,
        client,
        trial,
        app_state,
        state_path: &state_path,
        tick_interval,
    };

    let mut terminal = ratatui::init();
    let exit = runtime.run(&mut terminal).await;
    ratatui::restore();

    runtime.save_state(false);
    println!("State saved to {}", state_path.display());
    tracing::info!("Shutdown complete");

    match exit? {
        LoopExit::UserQuit => {
            println!("Goodbye! Check {} for details.", config.logging.file);
            Ok(())
        }
        LoopExit::TrialExpired => {
            println!(
                "Demo finished: {} total elapsed since first start.",
                config.session.trial_duration
            );
            std::process::exit(1);
        }
    }
}
