use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Loading { collected: usize, required: usize },
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading {
                collected,
                required,
            } => write!(f, "LOADING ({}/{})", collected, required),
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Regime {
    #[default]
    Unknown,
    Calm,
    Mixed,
    Volatile,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "UNKNOWN",
            Self::Calm => "CALM",
            Self::Mixed => "MIXED",
            Self::Volatile => "VOLATILE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// Output of one signal evaluation, plus the latest price and collection progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStatus {
    pub price: f64,
    pub signal: Signal,
    /// Percent momentum over the lookback. NaN when the reference price was zero.
    #[serde(with = "non_finite_score")]
    pub score: f64,
    pub volatility: f64,
    pub regime: Regime,
    pub confidence: Confidence,
    pub stability: f64,
    pub data_progress: usize,
    pub data_ready: bool,
}

impl SignalStatus {
    pub fn loading(collected: usize, required: usize) -> Self {
        Self {
            price: 0.0,
            signal: Signal::Loading {
                collected,
                required,
            },
            score: 0.0,
            volatility: 0.0,
            regime: Regime::Unknown,
            confidence: Confidence::Low,
            stability: 0.5,
            data_progress: collected,
            data_ready: false,
        }
    }
}

impl Default for SignalStatus {
    fn default() -> Self {
        Self::loading(0, 20)
    }
}

// JSON has no NaN or infinity. NaN is written as null, infinities as the
// strings "inf" / "-inf". A NaN score never compares equal after reload.
mod non_finite_score {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_nan() {
            serializer.serialize_none()
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Encoded>::deserialize(deserializer)? {
            None => Ok(f64::NAN),
            Some(Encoded::Number(v)) => Ok(v),
            Some(Encoded::Text(s)) => match s.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(serde::de::Error::custom(format!(
                    "invalid score {:?}",
                    other
                ))),
            },
        }
    }
}
