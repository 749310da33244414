//! Rolling 24-Hour Energy Window
//!
//! Hourly buckets keyed on the reference-timezone hour. A new bucket opens
//! whenever the hour key changes; the oldest bucket is dropped once the
//! configured count is reached.
//!
//! ```text
//! hour keys:  …  h-2   h-1   h     ← current bucket receives this tick's Wh
//!            ┌─────┬─────┬─────┐
//!            │ in  │ in  │ in  │
//!            │ out │ out │ out │
//!            └─────┴─────┴─────┘
//!            front             back
//! ```
//!
//! The in/out/net sums are recomputed from the retained buckets every tick
//! instead of maintained incrementally. With at most a few dozen buckets the
//! cost is trivial and floating-point drift cannot accumulate.
//!
//! Storage is a fixed `heapless::Deque` sized by
//! [`MAX_ROLLING_BUCKETS`]; the configured count is capped to it.

use heapless::Deque;

use crate::{constants::power::MAX_ROLLING_BUCKETS, traits::HourKey};

/// Energy accumulated during one reference-timezone hour
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HourBucket {
    /// Reference-timezone hour this bucket covers
    pub hour_key: HourKey,
    /// Energy in during the hour (Wh)
    pub wh_in: f32,
    /// Energy out during the hour (Wh)
    pub wh_out: f32,
}

/// FIFO of hourly buckets with cached sums
#[derive(Debug, Clone)]
pub struct RollingWindow {
    last_hour_key: Option<HourKey>,
    buckets: Deque<HourBucket, MAX_ROLLING_BUCKETS>,
    capacity: usize,
    wh_in: f32,
    wh_out: f32,
}

impl RollingWindow {
    /// Window retaining `capacity` buckets (capped to storage, at least 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            last_hour_key: None,
            buckets: Deque::new(),
            capacity: capacity.clamp(1, MAX_ROLLING_BUCKETS),
            wh_in: 0.0,
            wh_out: 0.0,
        }
    }

    /// Add one tick's energy to the bucket for `hour_key`
    pub fn record(&mut self, hour_key: HourKey, wh_in: f32, wh_out: f32) {
        if self.last_hour_key != Some(hour_key) || self.buckets.is_empty() {
            self.open_bucket(hour_key);
        }

        if let Some(bucket) = self.buckets.back_mut() {
            bucket.wh_in += wh_in;
            bucket.wh_out += wh_out;
        }

        self.recompute();
    }

    fn open_bucket(&mut self, hour_key: HourKey) {
        while self.buckets.len() >= self.capacity {
            self.buckets.pop_front();
        }
        // Cannot fail: the loop above leaves room
        let _ = self.buckets.push_back(HourBucket { hour_key, wh_in: 0.0, wh_out: 0.0 });
        self.last_hour_key = Some(hour_key);
    }

    fn recompute(&mut self) {
        let (wh_in, wh_out) = self
            .buckets
            .iter()
            .fold((0.0, 0.0), |(i, o), b| (i + b.wh_in, o + b.wh_out));
        self.wh_in = wh_in;
        self.wh_out = wh_out;
    }

    /// Rolling energy in (Wh)
    pub fn wh_in(&self) -> f32 {
        self.wh_in
    }

    /// Rolling energy out (Wh)
    pub fn wh_out(&self) -> f32 {
        self.wh_out
    }

    /// Rolling net energy (Wh)
    pub fn wh_net(&self) -> f32 {
        self.wh_in - self.wh_out
    }

    /// Number of retained buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no tick has been recorded
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Configured bucket count
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hour key of the newest bucket
    pub fn last_hour_key(&self) -> Option<HourKey> {
        self.last_hour_key
    }

    /// Buckets from oldest to newest
    pub fn buckets(&self) -> impl Iterator<Item = &HourBucket> {
        self.buckets.iter()
    }
}
