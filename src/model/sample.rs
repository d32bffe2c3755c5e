use serde::{Deserialize, Serialize};

/// One observation of the polled ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub price: f64,
    pub volume: f64,
}

impl Sample {
    pub fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }

    /// Sample with zero volume, handy when only the price series matters.
    pub fn from_price(price: f64) -> Self {
        Self { price, volume: 0.0 }
    }
}
