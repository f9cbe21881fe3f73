//! Bounded sample history

use crate::types::Sample;
use std::collections::VecDeque;

/// Number of samples kept on screen
pub const MAX_LENGTH: usize = 50;

/// Ring buffer of the most recent samples
///
/// Samples are kept in insertion order, which is also ascending `x` order.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    data: VecDeque<Sample>,
    capacity: usize,
}

impl SeriesBuffer {
    /// Create new buffer with specified capacity
    ///
    /// A zero capacity is raised to one so the latest sample is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, removing the oldest if at capacity
    pub fn append(&mut self, sample: Sample) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(sample);
    }

    /// Current samples, oldest first
    pub fn snapshot(&self) -> &VecDeque<Sample> {
        &self.data
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&Sample> {
        self.data.back()
    }

    /// Oldest sample still held
    pub fn first(&self) -> Option<&Sample> {
        self.data.front()
    }

    /// Get current number of stored samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if buffer is at capacity
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(MAX_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn xs(buffer: &SeriesBuffer) -> Vec<u64> {
        buffer.snapshot().iter().map(|s| s.x).collect()
    }

    #[test]
    fn test_new_buffer() {
        let buffer = SeriesBuffer::new(10);
        assert_eq!(buffer.capacity(), 10);
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert!(buffer.last().is_none());
    }

    #[test]
    fn test_append() {
        let mut buffer = SeriesBuffer::new(3);
        buffer.append(Sample::new(0, 1.0));
        buffer.append(Sample::new(1, 2.0));
        buffer.append(Sample::new(2, 3.0));

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());
        assert_eq!(xs(&buffer), vec![0, 1, 2]);
        assert_eq!(buffer.last(), Some(&Sample::new(2, 3.0)));
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut buffer = SeriesBuffer::new(3);
        for x in 0..4 {
            buffer.append(Sample::new(x, x as f64));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(xs(&buffer), vec![1, 2, 3]);
        assert_eq!(buffer.first().map(|s| s.x), Some(1));
    }

    #[test]
    fn test_default_capacity() {
        let buffer = SeriesBuffer::default();
        assert_eq!(buffer.capacity(), MAX_LENGTH);
        assert_eq!(buffer.capacity(), 50);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut buffer = SeriesBuffer::new(0);
        buffer.append(Sample::new(0, 0.5));
        buffer.append(Sample::new(1, 1.5));

        assert_eq!(buffer.capacity(), 1);
        assert_eq!(xs(&buffer), vec![1]);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut buffer = SeriesBuffer::default();
        buffer.append(Sample::new(0, 4.2));

        let first: Vec<Sample> = buffer.snapshot().iter().copied().collect();
        let second: Vec<Sample> = buffer.snapshot().iter().copied().collect();
        assert_eq!(first, second);
        assert_eq!(buffer.len(), 1);
    }

    proptest! {
        #[test]
        fn capacity_holds_for_any_append_count(appends in 0usize..200) {
            let mut buffer = SeriesBuffer::default();
            for x in 0..appends as u64 {
                buffer.append(Sample::new(x, 0.0));
                prop_assert!(buffer.len() <= MAX_LENGTH);
            }

            if appends > MAX_LENGTH {
                prop_assert_eq!(buffer.snapshot()[0].x, (appends - MAX_LENGTH) as u64);
            }

            let snapshot = buffer.snapshot();
            for pair in snapshot.iter().zip(snapshot.iter().skip(1)) {
                prop_assert_eq!(pair.1.x, pair.0.x + 1);
            }
        }
    }
}
