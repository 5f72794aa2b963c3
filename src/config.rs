use std::time::Duration;

use crate::mapping::MAX_SEQNO_TIME_PAIRS_PER_FAMILY;

/// Configuration for the process-wide seqno-time tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Mapping entries budgeted per tracking column family (default: 100).
    pub pairs_per_family: usize,

    /// Floor for the recommended sampling interval (default: 1s).
    pub min_sample_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            pairs_per_family: MAX_SEQNO_TIME_PAIRS_PER_FAMILY,
            min_sample_interval: Duration::from_secs(1),
        }
    }
}

impl TrackerConfig {
    /// Set the per-family entry budget.
    pub fn pairs_per_family(mut self, pairs: usize) -> Self {
        self.pairs_per_family = pairs;
        self
    }

    /// Set the sampling interval floor.
    pub fn min_sample_interval(mut self, interval: Duration) -> Self {
        self.min_sample_interval = interval;
        self
    }
}

/// Per-column-family time-tracking preferences.
///
/// Either duration being non-zero enables tracking for the family; the
/// family's requested retention window is the larger of the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FamilyOptions {
    /// Keep data off the coldest tier until it is at least this old, in
    /// seconds (0 = disabled).
    pub preclude_last_level_seconds: u64,

    /// Retain seqno-to-time information covering at least this window, in
    /// seconds (0 = disabled).
    pub preserve_internal_time_seconds: u64,
}

impl FamilyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preclude-last-level age threshold.
    pub fn preclude_last_level_seconds(mut self, seconds: u64) -> Self {
        self.preclude_last_level_seconds = seconds;
        self
    }

    /// Set the preserve-internal-time window.
    pub fn preserve_internal_time_seconds(mut self, seconds: u64) -> Self {
        self.preserve_internal_time_seconds = seconds;
        self
    }

    /// Whether this family asks for time tracking at all.
    pub fn tracking_enabled(&self) -> bool {
        self.tracked_duration() > 0
    }

    /// The retention window this family needs, in seconds.
    pub fn tracked_duration(&self) -> u64 {
        self.preclude_last_level_seconds
            .max(self.preserve_internal_time_seconds)
    }
}
