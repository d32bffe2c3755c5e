//! Small numeric helpers over price windows.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by n, not n - 1).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let variance = values
        .iter()
        .map(|v| {
            let d = *v - m;
            d * d
        })
        .sum::<f64>()
        / n;
    Some(variance.sqrt())
}

/// Percent change from `base` to `current`. NaN when `base` is zero.
pub fn percent_change(base: f64, current: f64) -> f64 {
    if base == 0.0 {
        return f64::NAN;
    }
    (current - base) / base * 100.0
}
