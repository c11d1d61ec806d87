//! Velocity estimation for one-dimensional drag gestures.
//!
//! Platform velocity readings are unreliable at small time deltas, so the
//! tracker derives its own estimate from position/time pairs and keeps a short
//! bounded history for rolling statistics.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;

/// Source of monotonic milliseconds for `VelocityTracker::add_sample`.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall-clock time measured from when the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

/// Settable clock for replaying recorded gestures.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(now_ms: f64) -> Self {
        Self { now_ms }
    }

    pub fn set(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn advance(&mut self, delta_ms: f64) {
        self.now_ms += delta_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// One observation of vertical displacement since the gesture started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    pub position: f64,
    pub timestamp_ms: f64,
}

/// A sample that produced a velocity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityRecord {
    pub position: f64,
    pub timestamp_ms: f64,
    /// Position units per second
    pub velocity: f64,
}

/// Smoothed velocity estimator with a bounded history.
///
/// Call `reset()` once at gesture start, then feed samples in temporal order.
#[derive(Debug, Clone)]
pub struct VelocityTracker<C: Clock = SystemClock> {
    clock: C,
    history: VecDeque<VelocityRecord>,
    history_size: usize,
    min_time_delta_ms: f64,
    start_time: Option<f64>,
    last_position: Option<f64>,
    last_timestamp: Option<f64>,
    /// Signed; the sign of the sample with the largest magnitude
    max_velocity: f64,
}

impl VelocityTracker<SystemClock> {
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl Default for VelocityTracker<SystemClock> {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}

impl<C: Clock> VelocityTracker<C> {
    pub fn with_clock(config: &TrackerConfig, clock: C) -> Self {
        let history_size = config.history_size.max(1);
        Self {
            clock,
            history: VecDeque::with_capacity(history_size),
            history_size,
            min_time_delta_ms: config.min_time_delta_ms,
            start_time: None,
            last_position: None,
            last_timestamp: None,
            max_velocity: 0.0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Record a position at the clock's current time.
    pub fn add_sample(&mut self, position: f64) {
        let timestamp_ms = self.clock.now_ms();
        self.record(TouchSample {
            position,
            timestamp_ms,
        });
    }

    /// Record a sample carrying its own timestamp.
    ///
    /// The first sample of a session only initializes timing. Later samples
    /// closer than `min_time_delta_ms` to their predecessor update the last
    /// position without producing a velocity record.
    pub fn record(&mut self, sample: TouchSample) {
        let TouchSample {
            position,
            timestamp_ms,
        } = sample;

        let (Some(last_position), Some(last_timestamp)) = (self.last_position, self.last_timestamp)
        else {
            self.start_time = Some(timestamp_ms);
            self.last_position = Some(position);
            self.last_timestamp = Some(timestamp_ms);
            return;
        };

        if timestamp_ms < last_timestamp {
            tracing::warn!(
                timestamp_ms,
                last_timestamp,
                "ignoring touch sample earlier than the previous one"
            );
            return;
        }

        let time_delta = timestamp_ms - last_timestamp;
        self.last_position = Some(position);
        self.last_timestamp = Some(timestamp_ms);

        if time_delta < self.min_time_delta_ms {
            tracing::trace!(time_delta, "sample below min time delta, skipping velocity");
            return;
        }

        let velocity = velocity_between(last_position, position, time_delta);

        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(VelocityRecord {
            position,
            timestamp_ms,
            velocity,
        });

        if velocity.abs() > self.max_velocity.abs() {
            self.max_velocity = velocity;
        }
    }

    /// Clear all per-gesture state
    pub fn reset(&mut self) {
        self.history.clear();
        self.start_time = None;
        self.last_position = None;
        self.last_timestamp = None;
        self.max_velocity = 0.0;
    }

    /// Largest velocity magnitude seen this session
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity.abs()
    }

    /// Signed velocity of the sample with the largest magnitude
    pub fn signed_max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Milliseconds since the first sample of the session
    pub fn total_time_ms(&self) -> f64 {
        match self.start_time {
            Some(start) => (self.clock.now_ms() - start).max(0.0),
            None => 0.0,
        }
    }

    /// Whether at least `percentage` of recorded samples exceed `threshold` in magnitude.
    pub fn has_consistent_high_velocity(&self, threshold: f64, percentage: f64) -> bool {
        if self.history.is_empty() {
            return false;
        }
        let fast = self
            .history
            .iter()
            .filter(|record| record.velocity.abs() > threshold)
            .count();
        fast as f64 / self.history.len() as f64 >= percentage
    }

    pub fn latest_velocity(&self) -> f64 {
        self.history.back().map(|r| r.velocity).unwrap_or(0.0)
    }

    pub fn average_velocity(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().map(|r| r.velocity).sum::<f64>() / self.history.len() as f64
    }

    pub fn last_position(&self) -> Option<f64> {
        self.last_position
    }

    pub fn history(&self) -> impl Iterator<Item = &VelocityRecord> {
        self.history.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }
}

/// Velocity in units per second; degenerate time deltas yield 0.0.
#[inline]
pub fn velocity_between(from: f64, to: f64, time_delta_ms: f64) -> f64 {
    if time_delta_ms <= 0.0 {
        return 0.0;
    }
    (to - from) / time_delta_ms * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> VelocityTracker<ManualClock> {
        VelocityTracker::with_clock(&TrackerConfig::default(), ManualClock::default())
    }

    fn sample(position: f64, timestamp_ms: f64) -> TouchSample {
        TouchSample {
            position,
            timestamp_ms,
        }
    }

    #[test]
    fn test_first_sample_only_initializes() {
        let mut tracker = tracker();
        tracker.record(sample(5.0, 0.0));
        assert!(tracker.is_empty());
        assert_eq!(tracker.last_position(), Some(5.0));
        assert_eq!(tracker.max_velocity(), 0.0);
    }

    #[test]
    fn test_velocity_per_second() {
        let mut tracker = tracker();
        tracker.record(sample(0.0, 0.0));
        tracker.record(sample(20.0, 20.0));
        assert_eq!(tracker.len(), 1);
        assert!((tracker.latest_velocity() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_sample_skipped() {
        let mut tracker = tracker();
        tracker.record(sample(0.0, 0.0));
        tracker.record(sample(30.0, 5.0));
        assert!(tracker.is_empty());
        assert_eq!(tracker.last_position(), Some(30.0));

        // The next delta is measured from the skipped sample
        tracker.record(sample(40.0, 25.0));
        assert_eq!(tracker.len(), 1);
        assert!((tracker.latest_velocity() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut tracker = tracker();
        for i in 0..50 {
            tracker.record(sample(i as f64 * 10.0, i as f64 * 16.0));
            assert!(tracker.len() <= tracker.history_size());
        }
        assert_eq!(tracker.len(), 6);
        // Oldest records were evicted
        let first = tracker.history().next().unwrap();
        assert_eq!(first.timestamp_ms, 44.0 * 16.0);
    }

    #[test]
    fn test_max_velocity_keeps_sign() {
        let mut tracker = tracker();
        tracker.record(sample(0.0, 0.0));
        tracker.record(sample(10.0, 20.0));
        tracker.record(sample(-30.0, 40.0));
        tracker.record(sample(-25.0, 60.0));
        assert!((tracker.max_velocity() - 2000.0).abs() < 1e-9);
        assert!(tracker.signed_max_velocity() < 0.0);
    }

    #[test]
    fn test_consistent_high_velocity() {
        let mut tracker = tracker();
        assert!(!tracker.has_consistent_high_velocity(100.0, 0.8));

        tracker.record(sample(0.0, 0.0));
        for i in 1..=5 {
            tracker.record(sample(i as f64 * 20.0, i as f64 * 10.0));
        }
        // Every sample moves at 2000 px/s
        assert!(tracker.has_consistent_high_velocity(1000.0, 0.8));
        assert!(!tracker.has_consistent_high_velocity(3000.0, 0.8));

        // One slow sample out of six still clears 80%
        tracker.record(sample(101.0, 60.0));
        assert!(!tracker.has_consistent_high_velocity(1000.0, 0.9));
        assert!(tracker.has_consistent_high_velocity(1000.0, 0.8));
    }

    #[test]
    fn test_average_velocity() {
        let mut tracker = tracker();
        assert_eq!(tracker.average_velocity(), 0.0);
        tracker.record(sample(0.0, 0.0));
        tracker.record(sample(10.0, 10.0));
        tracker.record(sample(15.0, 20.0));
        assert!((tracker.average_velocity() - 750.0).abs() < 1e-9);

        // Direction carries through
        tracker.record(sample(5.0, 30.0));
        assert!((tracker.average_velocity() - 500.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_time_and_reset() {
        let mut tracker = tracker();
        tracker.clock_mut().set(100.0);
        tracker.add_sample(0.0);
        tracker.clock_mut().advance(40.0);
        tracker.add_sample(12.0);
        assert!((tracker.total_time_ms() - 40.0).abs() < 1e-9);
        assert_eq!(tracker.len(), 1);

        tracker.reset();
        assert!(tracker.is_empty());
        assert_eq!(tracker.total_time_ms(), 0.0);
        assert_eq!(tracker.last_position(), None);
        assert_eq!(tracker.max_velocity(), 0.0);
    }

    #[test]
    fn test_out_of_order_sample_ignored() {
        let mut tracker = tracker();
        tracker.record(sample(0.0, 50.0));
        tracker.record(sample(10.0, 20.0));
        assert_eq!(tracker.last_position(), Some(0.0));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_system_clock_tracker() {
        let mut tracker = VelocityTracker::default();
        tracker.add_sample(0.0);
        tracker.add_sample(1.0);
        assert_eq!(tracker.last_position(), Some(1.0));
        assert!(tracker.total_time_ms() >= 0.0);
        assert!(tracker.len() <= 1);
    }

    #[test]
    fn test_degenerate_time_delta() {
        assert_eq!(velocity_between(0.0, 100.0, 0.0), 0.0);
        assert_eq!(velocity_between(0.0, 100.0, -5.0), 0.0);
    }
}
