pub mod buffer;
pub mod levels;
pub mod signal;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::model::levels::LevelAnalysis;
use crate::model::sample::Sample;
use crate::model::signal::SignalStatus;
use crate::state_store::PersistedState;

use buffer::TimeSeriesBuffer;
use levels::{ClusterTolerance, LevelDetector};
use signal::{Readiness, SignalConfig, SignalEngine};

/// What presentation and persistence see after each tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub status: SignalStatus,
    pub levels: LevelAnalysis,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Engine {
    buffer: TimeSeriesBuffer,
    signal: SignalEngine,
    detector: LevelDetector,
    state: EngineState,
}

impl Engine {
    pub fn new(capacity: usize, signal: SignalConfig, detector: LevelDetector) -> Self {
        let signal = SignalEngine::new(signal);
        let state = EngineState {
            status: SignalStatus::loading(0, signal.config().min_data_points),
            ..EngineState::default()
        };
        Self {
            buffer: TimeSeriesBuffer::new(capacity),
            signal,
            detector,
            state,
        }
    }

    pub fn from_config(config: &EngineConfig, tolerance: ClusterTolerance) -> Self {
        Self::new(
            config.buffer_capacity,
            SignalConfig {
                min_data_points: config.min_data_points,
                lookback: config.lookback,
                calm_below: config.calm_below,
                volatile_above: config.volatile_above,
            },
            LevelDetector::new(config.level_min_points, tolerance),
        )
    }

    /// Append one sample and recompute status and levels as a unit.
    pub fn ingest(&mut self, sample: Sample, now: DateTime<Utc>) -> &EngineState {
        self.buffer.append(sample);

        let mut status = self.signal.evaluate(&self.buffer);
        status.price = sample.price;
        status.data_progress = self.buffer.len();
        let levels = self.detector.detect(&self.buffer.prices()).into_analysis();

        self.state = EngineState {
            status,
            levels,
            last_update: Some(now),
        };
        tracing::debug!(
            price = sample.price,
            volume = sample.volume,
            points = self.buffer.len(),
            signal = %self.state.status.signal,
            "tick ingested"
        );
        &self.state
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn snapshot(&self) -> EngineState {
        self.state.clone()
    }

    pub fn buffer(&self) -> &TimeSeriesBuffer {
        &self.buffer
    }

    pub fn readiness(&self) -> Readiness {
        self.signal.readiness()
    }

    pub fn min_data_points(&self) -> usize {
        self.signal.config().min_data_points
    }

    pub fn is_ready(&self) -> bool {
        self.signal.readiness() == Readiness::Ready
    }

    /// Rebuild from a persisted snapshot. Status and levels are recomputed
    /// from the restored samples; only `last_update` is taken as saved.
    pub fn restore(&mut self, persisted: PersistedState) {
        let PersistedState {
            samples,
            last_update,
            ..
        } = persisted;
        self.buffer = TimeSeriesBuffer::from_samples(self.buffer.capacity(), samples);

        let status = self.signal.evaluate(&self.buffer);
        let levels = self.detector.detect(&self.buffer.prices()).into_analysis();
        self.state = EngineState {
            status,
            levels,
            last_update,
        };
        tracing::info!(
            points = self.buffer.len(),
            ready = self.is_ready(),
            signal = %self.state.status.signal,
            "engine state restored"
        );
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState::new(
            self.buffer.iter().copied().collect(),
            self.state.status.clone(),
            self.state.levels.clone(),
            self.state.last_update,
        )
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(
            buffer::DEFAULT_CAPACITY,
            SignalConfig::default(),
            LevelDetector::default(),
        )
    }
}
