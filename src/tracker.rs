//! Process-wide aggregation of per-family time tracking.
//!
//! Each column family asks for time tracking through its [`FamilyOptions`];
//! the engine owns one [`SeqnoTimeTracker`] that folds those requests into a
//! single mapping. Seqnos are process-wide, so one mapping serves every
//! family: its retention window is the smallest window any tracking family
//! needs, and its capacity grows with the number of tracking families.
//!
//! The tracker is the single writer (via [`sample`](SeqnoTimeTracker::sample),
//! normally driven by [`SampleTask`](crate::sampler::SampleTask)); readers
//! take [`snapshot`](SeqnoTimeTracker::snapshot) clones.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use crate::config::{FamilyOptions, TrackerConfig};
use crate::mapping::{SeqnoTimeMapping, SequenceNumber};

/// Engine-owned aggregator for seqno-to-time tracking.
pub struct SeqnoTimeTracker {
    config: TrackerConfig,
    state: RwLock<TrackerState>,
}

struct TrackerState {
    families: HashMap<String, FamilyOptions>,
    mapping: SeqnoTimeMapping,
}

impl SeqnoTimeTracker {
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(TrackerState {
                families: HashMap::new(),
                mapping: SeqnoTimeMapping::new(0, 0),
            }),
        }
    }

    /// Registers a column family (or replaces its options) and recomputes
    /// the mapping parameters.
    pub fn register_family(&self, name: impl Into<String>, options: FamilyOptions) {
        let name = name.into();
        let mut state = self.state.write().unwrap();
        state.families.insert(name.clone(), options);
        let (duration, capacity) = self.refresh_mapping(&mut state);
        tracing::info!(
            family = %name,
            tracked_duration = duration,
            capacity = capacity,
            "registered column family"
        );
    }

    /// Removes a column family and recomputes the mapping parameters.
    pub fn deregister_family(&self, name: &str) {
        let mut state = self.state.write().unwrap();
        if state.families.remove(name).is_none() {
            return;
        }
        let (duration, capacity) = self.refresh_mapping(&mut state);
        tracing::info!(
            family = %name,
            tracked_duration = duration,
            capacity = capacity,
            "deregistered column family"
        );
    }

    /// Re-derives the mapping caps from the registered families: the
    /// retention window is the minimum across tracking families and the
    /// capacity scales with their count. Returns `(duration, capacity)`.
    fn refresh_mapping(&self, state: &mut TrackerState) -> (u64, usize) {
        let tracking = state
            .families
            .values()
            .filter(|options| options.tracking_enabled());
        let duration = tracking
            .clone()
            .map(FamilyOptions::tracked_duration)
            .min()
            .unwrap_or(0);
        let capacity = self.config.pairs_per_family * tracking.count();
        if duration == 0 {
            // Nobody is tracking; stale samples would only mislead a family
            // that enables tracking later.
            state.mapping.clear();
        }
        state.mapping.set_max_time_duration(duration);
        state.mapping.set_capacity(capacity);
        (duration, capacity)
    }

    /// Whether any registered family currently asks for tracking.
    pub fn tracking_enabled(&self) -> bool {
        self.tracked_duration() > 0
    }

    /// The effective retention window in seconds (0 when disabled).
    pub fn tracked_duration(&self) -> u64 {
        self.state.read().unwrap().mapping.max_time_duration()
    }

    /// Sampling cadence that fills the per-family budget across the tracked
    /// window, floored at the configured minimum. `None` when tracking is
    /// disabled.
    pub fn recommended_sample_interval(&self) -> Option<Duration> {
        let duration = self.tracked_duration();
        if duration == 0 {
            return None;
        }
        let per_family = self.config.pairs_per_family.max(1) as u64;
        let interval = Duration::from_secs(duration / per_family);
        Some(interval.max(self.config.min_sample_interval))
    }

    /// Records one `(latest_seqno, now)` sample and ages out entries that
    /// fell off the tracked window. Returns true iff the mapping changed.
    /// No-op when tracking is disabled.
    pub fn sample(&self, seqno: SequenceNumber, now: u64) -> bool {
        let mut state = self.state.write().unwrap();
        if state.mapping.max_time_duration() == 0 {
            return false;
        }
        let appended = state.mapping.append(seqno, now);
        state.mapping.truncate_old_entries(now);
        tracing::trace!(seqno, now, appended, size = state.mapping.len(), "time sample");
        appended
    }

    /// A point-in-time copy of the mapping for queries and SST encoding.
    pub fn snapshot(&self) -> SeqnoTimeMapping {
        self.state.read().unwrap().mapping.clone()
    }
}

impl Default for SeqnoTimeTracker {
    fn default() -> Self {
        Self::new()
    }
}
