//! Support/resistance estimation from local extrema of the price series.
//!
//! A peak is an interior price strictly above both neighbours, a valley one
//! strictly below both. Candidates are sorted and greedily clustered, each
//! cluster collapsing to its mean; the current range is the nearest cluster
//! strictly above (resistance) and strictly below (support) the last price.

use crate::model::levels::{CurrentRange, LevelAnalysis, LevelSet};

pub const DEFAULT_MIN_POINTS: usize = 10;
pub const DEFAULT_TOLERANCE: f64 = 0.005;

/// How close a candidate must be to the last value admitted to a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterTolerance {
    /// Raw price units.
    Absolute(f64),
    /// Fraction of the last admitted value.
    Relative(f64),
}

impl ClusterTolerance {
    fn admits(&self, last: f64, candidate: f64) -> bool {
        let delta = (candidate - last).abs();
        match *self {
            Self::Absolute(tol) => delta <= tol,
            Self::Relative(frac) => delta <= frac * last.abs(),
        }
    }
}

impl Default for ClusterTolerance {
    fn default() -> Self {
        Self::Absolute(DEFAULT_TOLERANCE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegenerateReason {
    TooFewPrices { len: usize, required: usize },
    NonFinitePrice { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelDetection {
    Detected {
        levels: LevelSet,
        current_range: CurrentRange,
    },
    Degenerate(DegenerateReason),
}

impl LevelDetection {
    /// Degenerate detections become the empty analysis.
    pub fn into_analysis(self) -> LevelAnalysis {
        match self {
            Self::Detected {
                levels,
                current_range,
            } => LevelAnalysis {
                resistance: levels.resistance,
                support: levels.support,
                current_range: Some(current_range),
            },
            Self::Degenerate(_) => LevelAnalysis::empty(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }
}

#[derive(Debug, Clone)]
pub struct LevelDetector {
    min_points: usize,
    tolerance: ClusterTolerance,
}

impl LevelDetector {
    pub fn new(min_points: usize, tolerance: ClusterTolerance) -> Self {
        Self {
            // Need at least one interior point.
            min_points: min_points.max(3),
            tolerance,
        }
    }

    pub fn detect(&self, prices: &[f64]) -> LevelDetection {
        if prices.len() < self.min_points {
            return LevelDetection::Degenerate(DegenerateReason::TooFewPrices {
                len: prices.len(),
                required: self.min_points,
            });
        }
        if let Some(index) = prices.iter().position(|p| !p.is_finite()) {
            tracing::debug!(index, "non-finite price in level window");
            return LevelDetection::Degenerate(DegenerateReason::NonFinitePrice { index });
        }

        let (peaks, valleys) = local_extrema(prices);
        let levels = LevelSet {
            resistance: cluster_levels(peaks, self.tolerance),
            support: cluster_levels(valleys, self.tolerance),
        };
        // Non-empty was checked above.
        let current_price = prices[prices.len() - 1];
        let current_range = find_current_range(current_price, &levels);

        LevelDetection::Detected {
            levels,
            current_range,
        }
    }
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_POINTS, ClusterTolerance::default())
    }
}

/// Returns (peaks, valleys) in series order.
pub fn local_extrema(prices: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut peaks = Vec::new();
    let mut valleys = Vec::new();
    for w in prices.windows(3) {
        let (prev, cur, next) = (w[0], w[1], w[2]);
        if cur > prev && cur > next {
            peaks.push(cur);
        } else if cur < prev && cur < next {
            valleys.push(cur);
        }
    }
    (peaks, valleys)
}

/// Sort ascending and greedily merge neighbours; each cluster becomes its mean.
pub fn cluster_levels(mut candidates: Vec<f64>, tolerance: ClusterTolerance) -> Vec<f64> {
    candidates.sort_by(f64::total_cmp);

    let mut clusters = Vec::new();
    let mut current: Vec<f64> = Vec::new();
    for level in candidates {
        match current.last() {
            Some(&last) if !tolerance.admits(last, level) => {
                clusters.push(cluster_mean(&current));
                current.clear();
            }
            _ => {}
        }
        current.push(level);
    }
    if !current.is_empty() {
        clusters.push(cluster_mean(&current));
    }
    clusters
}

fn cluster_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn find_current_range(current_price: f64, levels: &LevelSet) -> CurrentRange {
    let resistance = levels
        .resistance
        .iter()
        .copied()
        .filter(|level| *level > current_price)
        .min_by(f64::total_cmp);
    let support = levels
        .support
        .iter()
        .copied()
        .filter(|level| *level < current_price)
        .max_by(f64::total_cmp);
    CurrentRange::new(resistance, support)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrema_use_strict_comparisons() {
        let (peaks, valleys) = local_extrema(&[1.0, 2.0, 2.0, 1.0, 0.5, 1.0]);
        assert!(peaks.is_empty());
        assert_eq!(valleys, vec![0.5]);
    }

    #[test]
    fn absolute_tolerance_compares_against_last_admitted() {
        // 100.0 -> 100.004 -> 100.008 chains even though the ends are 0.008 apart.
        let clusters = cluster_levels(
            vec![100.008, 100.0, 100.004],
            ClusterTolerance::Absolute(0.005),
        );
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0] - 100.004).abs() < 1e-9);
    }

    #[test]
    fn empty_candidates_give_no_clusters() {
        assert!(cluster_levels(Vec::new(), ClusterTolerance::default()).is_empty());
    }

    #[test]
    fn non_finite_price_is_degenerate() {
        let mut prices = vec![1.0; 12];
        prices[4] = f64::NAN;
        let detection = LevelDetector::default().detect(&prices);
        assert_eq!(
            detection,
            LevelDetection::Degenerate(DegenerateReason::NonFinitePrice { index: 4 })
        );
        assert!(detection.into_analysis().is_empty());
    }
}
