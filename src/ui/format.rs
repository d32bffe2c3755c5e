use chrono::TimeDelta;

/// Insert `,` every three digits of the integer part: `67012.5` -> `67,012.50` at 2 decimals.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && value != 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// `$67,012.34`, or `-` before the first quote.
pub fn format_price_usd(price: f64) -> String {
    if price == 0.0 || !price.is_finite() {
        return "-".to_string();
    }
    format!("${}", group_thousands(price, 2))
}

/// Levels above 1000 drop the decimals.
pub fn format_level(level: f64) -> String {
    if level > 1000.0 {
        group_thousands(level, 0)
    } else {
        format!("{:.2}", level)
    }
}

/// How close the price sits to a level, as a fraction of the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    VeryNear,
    Near,
    Far,
}

pub fn proximity(price: f64, level: f64) -> Proximity {
    let distance = (price - level).abs() / level;
    if distance < 0.005 {
        Proximity::VeryNear
    } else if distance < 0.01 {
        Proximity::Near
    } else {
        Proximity::Far
    }
}

/// `H:MM:SS`, hours unbounded.
pub fn format_elapsed(delta: TimeDelta) -> String {
    let secs = delta.num_seconds().max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `Nd Nh Nm`.
pub fn format_remaining(delta: TimeDelta) -> String {
    let secs = delta.num_seconds().max(0);
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{}d {}h {}m", days, hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(67_012.346, 2), "67,012.35");
        assert_eq!(group_thousands(1_234_567.0, 0), "1,234,567");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(-1_500.0, 1), "-1,500.0");
    }

    #[test]
    fn price_and_level_formats() {
        assert_eq!(format_price_usd(0.0), "-");
        assert_eq!(format_price_usd(67_012.34), "$67,012.34");
        assert_eq!(format_level(67_012.6), "67,013");
        assert_eq!(format_level(950.5), "950.50");
    }

    #[test]
    fn proximity_bands_are_relative() {
        assert_eq!(proximity(100.0, 100.4), Proximity::VeryNear);
        assert_eq!(proximity(100.0, 100.8), Proximity::Near);
        assert_eq!(proximity(100.0, 102.0), Proximity::Far);
    }

    #[test]
    fn durations() {
        assert_eq!(format_elapsed(TimeDelta::seconds(3_725)), "1:02:05");
        assert_eq!(format_remaining(TimeDelta::seconds(90_061)), "1d 1h 1m");
        assert_eq!(format_remaining(TimeDelta::seconds(-5)), "0d 0h 0m");
    }
}
