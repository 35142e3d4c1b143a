//! Sliding-window flow average.
//!
//! Fixed-capacity FIFO of recent flow samples backed by a
//! [`heapless::Deque`]; no heap, no reallocation.  The storage is sized
//! for the largest supported window ([`WINDOW_MAX`]); the *logical*
//! capacity is a runtime value so the production and bench profiles share
//! one code path.
//!
//! Once `len == capacity`, appending evicts the oldest sample.  The mean
//! only ever covers valid samples.

use heapless::Deque;

/// Storage limit for the window (production profile uses all of it).
pub const WINDOW_MAX: usize = 256;

/// Ring buffer of flow samples (L/hour).
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: Deque<f32, WINDOW_MAX>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` samples.
    ///
    /// `capacity` is clamped to `1..=WINDOW_MAX`; configs are validated
    /// before they reach here.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(
            (1..=WINDOW_MAX).contains(&capacity),
            "window capacity {capacity} out of range"
        );
        Self {
            samples: Deque::new(),
            capacity: capacity.clamp(1, WINDOW_MAX),
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn append(&mut self, sample: f32) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        // Cannot fail: len < capacity <= WINDOW_MAX after the eviction.
        let pushed = self.samples.push_back(sample);
        debug_assert!(pushed.is_ok());
    }

    /// Arithmetic mean of the valid samples, `None` when empty.
    pub fn mean(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f32 = self.samples.iter().sum();
        Some(sum / self.samples.len() as f32)
    }

    /// Discard all history.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// True once at least `min_samples` (and never fewer than one) samples
    /// are held.
    pub fn is_full_enough(&self, min_samples: usize) -> bool {
        self.samples.len() >= min_samples.max(1)
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

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.samples.iter()
    }
}
