use crate::engine::EngineState;
use crate::session::TickOutcome;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Engine snapshot after a tick (or after restoring persisted state).
    Snapshot(EngineState),
    TickOutcome(TickOutcome),
    StateSaved { path: String },
    LogMessage(String),
    Error(String),
}
