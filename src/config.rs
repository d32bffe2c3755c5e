use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::engine::levels::ClusterTolerance;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub asset_label: String,
    pub ticker_url: String,
    pub price_key: String,
    pub volume_key: String,
    pub request_timeout_ms: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            asset_label: "BTC".to_string(),
            ticker_url: "https://api.binance.com/api/v3/ticker/24hr?symbol=BTCUSDT".to_string(),
            price_key: "lastPrice".to_string(),
            volume_key: "volume".to_string(),
            request_timeout_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub buffer_capacity: usize,
    pub min_data_points: usize,
    pub lookback: usize,
    pub calm_below: f64,
    pub volatile_above: f64,
    pub level_min_points: usize,
    pub cluster_tolerance: f64,
    /// "absolute" (price units) or "relative" (fraction of the level).
    pub cluster_mode: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1_000,
            min_data_points: 20,
            lookback: 20,
            calm_below: 50.0,
            volatile_above: 200.0,
            level_min_points: 10,
            cluster_tolerance: 0.005,
            cluster_mode: "absolute".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn cluster_tolerance(&self) -> Result<ClusterTolerance> {
        if !self.cluster_tolerance.is_finite() || self.cluster_tolerance < 0.0 {
            bail!(
                "invalid cluster_tolerance {}: must be a non-negative number",
                self.cluster_tolerance
            );
        }
        match self.cluster_mode.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(ClusterTolerance::Absolute(self.cluster_tolerance)),
            "relative" => Ok(ClusterTolerance::Relative(self.cluster_tolerance)),
            other => bail!(
                "invalid cluster_mode '{}': expected 'absolute' or 'relative'",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tick_interval: String,
    pub trial_duration: String,
    pub state_path: String,
    pub lock_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: "1s".to_string(),
            trial_duration: "24h".to_string(),
            state_path: "data/pulse_state.json".to_string(),
            lock_path: ".pulse_levels.lock".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Result<Duration> {
        parse_duration(&self.tick_interval)
    }

    pub fn trial_duration(&self) -> Result<Duration> {
        parse_duration(&self.trial_duration)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub max_log_lines: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "BTC INTELLIGENCE DEMO - 24H".to_string(),
            max_log_lines: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "pulse-levels.log".to_string(),
        }
    }
}

/// Parse a duration string such as "500ms", "1s", "5m", "24h" or "2d".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let split_at = s
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("invalid duration '{}': missing unit suffix", s))?;
    let (num_str, suffix) = s.split_at(split_at);
    if num_str.is_empty() {
        bail!("invalid duration '{}': expected format like '1s'", s);
    }
    let n: u64 = num_str
        .parse()
        .with_context(|| format!("invalid duration '{}': quantity must be an integer", s))?;
    if n == 0 {
        bail!("invalid duration '{}': quantity must be > 0", s);
    }

    let unit_ms: u64 = match suffix {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => bail!(
            "invalid duration '{}': unsupported suffix '{}', expected one of ms/s/m/h/d",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .map(Duration::from_millis)
        .with_context(|| format!("invalid duration '{}': value is too large", s))
}

fn config_path() -> PathBuf {
    std::env::var("PULSE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/default.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from_path(&config_path())
    }

    /// Missing file means defaults; a present but malformed file is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let config_str = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Self::from_toml_str(&config_str)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid configuration toml")
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.market.ticker_url)
            .with_context(|| format!("market.ticker_url '{}' is not a URL", self.market.ticker_url))?;
        if self.engine.buffer_capacity < self.engine.min_data_points {
            bail!(
                "engine.buffer_capacity ({}) must be >= engine.min_data_points ({})",
                self.engine.buffer_capacity,
                self.engine.min_data_points
            );
        }
        if self.engine.lookback == 0 || self.engine.lookback > self.engine.min_data_points {
            bail!(
                "engine.lookback ({}) must be in 1..=min_data_points ({})",
                self.engine.lookback,
                self.engine.min_data_points
            );
        }
        if self.engine.level_min_points < 3 {
            bail!("engine.level_min_points must be >= 3");
        }
        self.engine
            .cluster_tolerance()
            .context("engine cluster settings are invalid")?;
        self.session
            .tick_interval()
            .context("session.tick_interval is invalid")?;
        self.session
            .trial_duration()
            .context("session.trial_duration is invalid")?;
        Ok(())
    }
}
