use serde::Deserialize;

use crate::error::AppError;
use crate::model::sample::Sample;

/// Price and volume read from one ticker response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub volume: f64,
}

impl From<Quote> for Sample {
    fn from(q: Quote) -> Self {
        Sample::new(q.price, q.volume)
    }
}

/// Binance encodes most numbers as strings; accept either form.
fn value_to_f64(key: &str, v: &serde_json::Value) -> Result<f64, AppError> {
    match v {
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| AppError::Quote(format!("field '{}' is not numeric ({}): {}", key, s, e))),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| AppError::Quote(format!("field '{}' is out of range", key))),
        other => Err(AppError::Quote(format!(
            "field '{}' has unsupported type: {}",
            key, other
        ))),
    }
}

fn field(body: &serde_json::Value, key: &str) -> Result<f64, AppError> {
    let v = body
        .get(key)
        .ok_or_else(|| AppError::Quote(format!("missing field '{}'", key)))?;
    value_to_f64(key, v)
}

/// Extract a quote from a ticker body using the configured field names.
pub fn parse_quote(
    body: &serde_json::Value,
    price_key: &str,
    volume_key: &str,
) -> Result<Quote, AppError> {
    let price = field(body, price_key)?;
    let volume = field(body, volume_key)?;
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::Quote(format!("unusable price {}", price)));
    }
    if !volume.is_finite() {
        return Err(AppError::Quote(format!("unusable volume {}", volume)));
    }
    Ok(Quote { price, volume })
}

/// Binance error body, e.g. `{"code":-1121,"msg":"Invalid symbol."}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}
