use pulse_levels::engine::buffer::TimeSeriesBuffer;
use pulse_levels::error::AppError;
use pulse_levels::model::sample::Sample;

#[test]
/// Verifies FIFO eviction:
/// appending capacity+1 samples keeps length at capacity and drops exactly the oldest.
fn append_past_capacity_evicts_oldest() {
    let mut buffer = TimeSeriesBuffer::new(1_000);
    for i in 0..=1_000 {
        buffer.append(Sample::new(i as f64, 1.0));
    }
    assert_eq!(buffer.len(), 1_000);
    assert_eq!(buffer.iter().next().map(|s| s.price), Some(1.0));
    assert_eq!(buffer.latest().map(|s| s.price), Some(1_000.0));
}

#[test]
fn window_needs_enough_samples() {
    let mut buffer = TimeSeriesBuffer::new(10);
    for p in [10.0, 11.0, 12.0] {
        buffer.append(Sample::from_price(p));
    }
    assert!(matches!(
        buffer.window(4),
        Err(AppError::InsufficientData {
            requested: 4,
            available: 3
        })
    ));
    let prices: Vec<f64> = buffer.window(3).unwrap().map(|s| s.price).collect();
    assert_eq!(prices, vec![10.0, 11.0, 12.0]);
}

#[test]
fn insertion_order_is_chronological() {
    let mut buffer = TimeSeriesBuffer::new(3);
    for p in [5.0, 4.0, 3.0, 2.0] {
        buffer.append(Sample::from_price(p));
    }
    assert_eq!(buffer.prices(), vec![4.0, 3.0, 2.0]);
    assert_eq!(buffer.capacity(), 3);
    assert!(!buffer.is_empty());
}
