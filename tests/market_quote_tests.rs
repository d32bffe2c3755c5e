use pulse_levels::market::types::{parse_quote, Quote};
use pulse_levels::model::sample::Sample;

#[test]
/// Verifies configurable field names:
/// the same decoder serves endpoints that name price/volume differently.
fn custom_keys_are_honoured() {
    let body = serde_json::json!({"price": "2450.10", "baseVolume": "12.5"});
    let quote = parse_quote(&body, "price", "baseVolume").unwrap();
    assert_eq!(
        quote,
        Quote {
            price: 2450.10,
            volume: 12.5
        }
    );
    let sample: Sample = quote.into();
    assert_eq!(sample, Sample::new(2450.10, 12.5));
}

#[test]
fn negative_price_or_bad_volume_is_rejected() {
    let body = serde_json::json!({"lastPrice": "-1", "volume": "1"});
    assert!(parse_quote(&body, "lastPrice", "volume").is_err());
    let body = serde_json::json!({"lastPrice": "1", "volume": [1, 2]});
    assert!(parse_quote(&body, "lastPrice", "volume").is_err());
}
