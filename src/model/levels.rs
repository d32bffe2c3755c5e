use serde::{Deserialize, Serialize};

/// Clustered local extrema, each list ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub resistance: Vec<f64>,
    pub support: Vec<f64>,
}

/// Nearest resistance strictly above and support strictly below the latest price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentRange {
    pub resistance: Option<f64>,
    pub support: Option<f64>,
    pub range_size: Option<f64>,
}

impl CurrentRange {
    pub fn new(resistance: Option<f64>, support: Option<f64>) -> Self {
        let range_size = match (resistance, support) {
            (Some(r), Some(s)) => Some(r - s),
            _ => None,
        };
        Self {
            resistance,
            support,
            range_size,
        }
    }
}

/// Level detection result as stored in the engine snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelAnalysis {
    pub resistance: Vec<f64>,
    pub support: Vec<f64>,
    pub current_range: Option<CurrentRange>,
}

impl LevelAnalysis {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.resistance.is_empty() && self.support.is_empty() && self.current_range.is_none()
    }
}
