use crate::engine::buffer::TimeSeriesBuffer;
use crate::indicator::stats::{percent_change, population_std_dev};
use crate::model::signal::{Confidence, Regime, Signal, SignalStatus};

pub const MIN_DATA_POINTS: usize = 20;
pub const LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    pub min_data_points: usize,
    pub lookback: usize,
    /// Volatility strictly below this is CALM.
    pub calm_below: f64,
    /// Volatility strictly above this is VOLATILE.
    pub volatile_above: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_data_points: MIN_DATA_POINTS,
            lookback: LOOKBACK,
            calm_below: 50.0,
            volatile_above: 200.0,
        }
    }
}

/// One-way latch: data collection finishes once and never restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Collecting,
    Ready,
}

#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: SignalConfig,
    readiness: Readiness,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config: SignalConfig {
                lookback: config.lookback.clamp(1, config.min_data_points.max(1)),
                ..config
            },
            readiness: Readiness::Collecting,
        }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Returns true on the Collecting -> Ready transition only.
    pub fn mark_ready(&mut self) -> bool {
        let flipped = self.readiness == Readiness::Collecting;
        self.readiness = Readiness::Ready;
        flipped
    }

    pub fn evaluate(&mut self, buffer: &TimeSeriesBuffer) -> SignalStatus {
        let len = buffer.len();
        let price = buffer.latest().map(|s| s.price).unwrap_or(0.0);
        if len < self.config.min_data_points {
            return SignalStatus {
                price,
                ..SignalStatus::loading(len, self.config.min_data_points)
            };
        }

        if self.mark_ready() {
            tracing::info!(
                points = self.config.min_data_points,
                "data ready, signal analysis enabled"
            );
        }

        let window: Vec<f64> = match buffer.window(self.config.lookback) {
            Ok(iter) => iter.map(|s| s.price).collect(),
            Err(e) => {
                // Unreachable while lookback <= min_data_points.
                tracing::warn!(error = %e, "signal window unavailable");
                return SignalStatus {
                    price,
                    data_ready: true,
                    ..SignalStatus::loading(len, self.config.min_data_points)
                };
            }
        };

        let price_ago = window[0];
        let score = percent_change(price_ago, price);
        if score.is_nan() {
            tracing::warn!(price_ago, price, "momentum undefined for zero reference price");
        }
        let volatility = population_std_dev(&window).unwrap_or(0.0);
        let regime = self.classify_regime(volatility);
        let confidence = classify_confidence(score, regime);
        let signal = classify_signal(score);

        SignalStatus {
            price,
            signal,
            score,
            volatility,
            regime,
            confidence,
            stability: if regime == Regime::Calm { 1.0 } else { 0.5 },
            data_progress: len,
            data_ready: true,
        }
    }

    pub fn classify_regime(&self, volatility: f64) -> Regime {
        if volatility > self.config.volatile_above {
            Regime::Volatile
        } else if volatility < self.config.calm_below {
            Regime::Calm
        } else {
            Regime::Mixed
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

pub fn classify_confidence(score: f64, regime: Regime) -> Confidence {
    if score.abs() > 2.0 && regime == Regime::Calm {
        Confidence::High
    } else if score.abs() > 1.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn classify_signal(score: f64) -> Signal {
    if score > 1.0 {
        Signal::Buy
    } else if score < -1.0 {
        Signal::Sell
    } else {
        Signal::Hold
    }
}
