//! Arrival-rate estimation over a bounded trailing window.
//!
//! Network arrivals are bursty: a whole batch of tokens lands at one instant.
//! Feeding those raw timestamps into a rate estimator would make it see
//! artificial bursts, so each token in a batch is assigned an *interpolated*
//! timestamp spread evenly across the gap since the previous batch. The
//! estimator itself is a deliberately simple trailing moving average —
//! predictable and easy to test, at the cost of taking up to `capacity`
//! tokens to reflect a sudden rate change.

use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

use itertools::Itertools;

/// Spreads `count` arrivals evenly across `(prev, now]`.
///
/// Token `i` of `count` (0-indexed) gets `prev + (now - prev) * i / count`,
/// so the first token of a batch sits at the previous batch boundary and the
/// last sits just short of `now`.
pub(crate) fn interpolate_batch(prev: Instant, now: Instant, count: usize) -> Vec<Instant> {
    let gap = now.saturating_duration_since(prev);
    (0..count)
        .map(|i| prev + gap.mul_f64(i as f64 / count as f64))
        .collect()
}

/// Bounded FIFO of recent token arrival timestamps.
#[derive(Debug)]
pub struct PacingWindow {
    timestamps: VecDeque<Instant>,
    capacity: usize,
}

impl PacingWindow {
    /// Creates an empty window holding at most `capacity` timestamps.
    pub fn new(capacity: usize) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Drops all recorded timestamps.
    pub fn clear(&mut self) {
        self.timestamps.clear();
    }

    /// Records one arrival timestamp, evicting the oldest entry when full.
    pub fn observe(&mut self, at: Instant) {
        if self.capacity == 0 {
            return;
        }
        if self.timestamps.len() == self.capacity {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(at);
    }

    /// Number of timestamps currently recorded.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns whether the window holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Mean interval between consecutive recorded timestamps.
    ///
    /// Zero when fewer than two timestamps are recorded (including the
    /// `capacity < 2` configurations), meaning "do not delay".
    pub fn average_interval(&self) -> Duration {
        if self.timestamps.len() < 2 {
            return Duration::ZERO;
        }
        let total: Duration = self
            .timestamps
            .iter()
            .tuple_windows()
            .map(|(earlier, later)| later.saturating_duration_since(*earlier))
            .sum();
        total / (self.timestamps.len() - 1) as u32
    }
}
