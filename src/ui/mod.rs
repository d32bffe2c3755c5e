pub mod chart;
pub mod dashboard;
pub mod format;

use chrono::{DateTime, Local, TimeDelta, Utc};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::engine::EngineState;
use crate::event::AppEvent;
use crate::session::TickOutcome;

use chart::PriceChart;
use dashboard::{FooterBar, HeaderBar, KeybindBar, LogPanel, SignalTable};

const DEFAULT_MAX_LOG_MESSAGES: usize = 50;

pub struct AppState {
    pub title: String,
    pub asset_label: String,
    pub snapshot: EngineState,
    pub prices: Vec<f64>,
    pub min_data_points: usize,
    pub session_start: DateTime<Local>,
    pub now: DateTime<Local>,
    pub trial_first_start: Option<DateTime<Utc>>,
    pub trial_limit: Option<TimeDelta>,
    /// Set when collection starts from fewer than `min_data_points` samples.
    pub data_start: Option<DateTime<Utc>>,
    pub tick_count: u64,
    pub failed_fetches: u64,
    pub log_messages: Vec<String>,
    pub max_log_messages: usize,
}

impl AppState {
    pub fn new(title: &str, asset_label: &str, min_data_points: usize) -> Self {
        let now = Local::now();
        Self {
            title: title.to_string(),
            asset_label: asset_label.to_string(),
            snapshot: EngineState::default(),
            prices: Vec::new(),
            min_data_points,
            session_start: now,
            now,
            trial_first_start: None,
            trial_limit: None,
            data_start: None,
            tick_count: 0,
            failed_fetches: 0,
            log_messages: Vec::new(),
            max_log_messages: DEFAULT_MAX_LOG_MESSAGES,
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > self.max_log_messages {
            let excess = self.log_messages.len() - self.max_log_messages;
            self.log_messages.drain(..excess);
        }
    }

    pub fn set_trial(&mut self, first_start: DateTime<Utc>, limit: TimeDelta) {
        self.trial_first_start = Some(first_start);
        self.trial_limit = Some(limit);
    }

    pub fn remaining(&self) -> Option<TimeDelta> {
        let first = self.trial_first_start?;
        let limit = self.trial_limit?;
        Some(limit - (self.now.with_timezone(&Utc) - first))
    }

    pub fn collecting_for(&self) -> Option<TimeDelta> {
        self.data_start
            .map(|start| self.now.with_timezone(&Utc) - start)
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Snapshot(snapshot) => {
                let became_ready = !self.snapshot.status.data_ready && snapshot.status.data_ready;
                self.snapshot = snapshot;
                if became_ready && self.tick_count > 0 {
                    let took = self
                        .collecting_for()
                        .map(|d| format!(" in {}", format::format_elapsed(d)))
                        .unwrap_or_default();
                    self.push_log(format!(
                        "Data ready: collected {} points{}",
                        self.min_data_points, took
                    ));
                }
            }
            AppEvent::TickOutcome(outcome) => {
                self.tick_count += 1;
                if let TickOutcome::Skipped { reason } = outcome {
                    self.failed_fetches += 1;
                    self.push_log(format!("[WARN] Fetch failed: {}", reason));
                }
            }
            AppEvent::StateSaved { path } => {
                self.push_log(format!("State saved to {}", path));
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(5), // signal table
            Constraint::Min(6),    // price chart
            Constraint::Length(6), // events
            Constraint::Length(3), // footer
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    let status = &state.snapshot.status;
    frame.render_widget(
        HeaderBar {
            title: &state.title,
            data_ready: status.data_ready,
            points: status.data_progress,
            required: state.min_data_points,
            collecting_for: state.collecting_for(),
        },
        outer[0],
    );

    frame.render_widget(
        SignalTable {
            asset_label: &state.asset_label,
            state: &state.snapshot,
        },
        outer[1],
    );

    let range = state.snapshot.levels.current_range.unwrap_or_default();
    frame.render_widget(
        PriceChart::new(&state.prices, &state.asset_label)
            .resistance(range.resistance)
            .support(range.support),
        outer[2],
    );

    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);

    frame.render_widget(
        FooterBar {
            session_start: state.session_start,
            now: state.now,
            remaining: state.remaining(),
            points: status.data_progress,
            collecting_for: state.collecting_for(),
        },
        outer[4],
    );

    frame.render_widget(KeybindBar, outer[5]);
}
