use std::collections::vec_deque::{self, VecDeque};

use crate::error::AppError;
use crate::model::sample::Sample;

pub const DEFAULT_CAPACITY: usize = 1_000;

/// Bounded FIFO of samples in arrival order; the oldest sample is evicted on overflow.
#[derive(Debug, Clone)]
pub struct TimeSeriesBuffer {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl TimeSeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be > 0");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuild from persisted samples, keeping only the newest `capacity` of them.
    pub fn from_samples(capacity: usize, samples: impl IntoIterator<Item = Sample>) -> Self {
        let mut buffer = Self::new(capacity);
        for sample in samples {
            buffer.append(sample);
        }
        buffer
    }

    pub fn append(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            let _ = self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Last `n` samples, oldest first.
    pub fn window(&self, n: usize) -> Result<vec_deque::Iter<'_, Sample>, AppError> {
        let available = self.samples.len();
        if n > available {
            return Err(AppError::InsufficientData {
                requested: n,
                available,
            });
        }
        Ok(self.samples.range(available - n..))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }
}

impl Default for TimeSeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_returns_tail_in_order() {
        let mut buffer = TimeSeriesBuffer::new(5);
        for p in [1.0, 2.0, 3.0, 4.0] {
            buffer.append(Sample::from_price(p));
        }
        let tail: Vec<f64> = buffer.window(2).unwrap().map(|s| s.price).collect();
        assert_eq!(tail, vec![3.0, 4.0]);
        assert_eq!(buffer.window(0).unwrap().count(), 0);
    }

    #[test]
    fn window_larger_than_len_is_insufficient_data() {
        let mut buffer = TimeSeriesBuffer::new(5);
        buffer.append(Sample::from_price(1.0));
        match buffer.window(3) {
            Err(AppError::InsufficientData {
                requested,
                available,
            }) => {
                assert_eq!(requested, 3);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|it| it.count())),
        }
    }

    #[test]
    fn from_samples_keeps_newest() {
        let samples = (0..8).map(|i| Sample::from_price(i as f64));
        let buffer = TimeSeriesBuffer::from_samples(3, samples);
        assert_eq!(buffer.prices(), vec![5.0, 6.0, 7.0]);
    }

    #[test]
    #[should_panic(expected = "buffer capacity must be > 0")]
    fn zero_capacity_panics() {
        TimeSeriesBuffer::new(0);
    }
}
