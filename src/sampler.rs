//! The periodic sampler that feeds the tracker.
//!
//! The mapping never reads a clock. Instead the engine supplies a source
//! closure returning `(latest_committed_seqno, now_seconds)`, and this task
//! polls it on a fixed cadence. Tests swap in a mock source backed by
//! atomics; production wires the engine's version counter and system clock.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::mapping::SequenceNumber;
use crate::scheduler::{PeriodicTask, TaskContext};
use crate::tracker::SeqnoTimeTracker;

/// Produces the latest committed seqno and current wall-clock seconds.
pub type SampleSource = dyn Fn() -> (SequenceNumber, u64) + Send + Sync;

/// Periodic task recording `(seqno, time)` samples into a tracker.
pub struct SampleTask {
    tracker: Arc<SeqnoTimeTracker>,
    source: Box<SampleSource>,
    period: Duration,
}

impl SampleTask {
    /// Uses the tracker's recommended cadence, or one second until a family
    /// with tracking enabled is registered.
    pub fn new(
        tracker: Arc<SeqnoTimeTracker>,
        source: impl Fn() -> (SequenceNumber, u64) + Send + Sync + 'static,
    ) -> Self {
        let period = tracker
            .recommended_sample_interval()
            .unwrap_or(Duration::from_secs(1));
        Self::with_period(tracker, source, period)
    }

    pub fn with_period(
        tracker: Arc<SeqnoTimeTracker>,
        source: impl Fn() -> (SequenceNumber, u64) + Send + Sync + 'static,
        period: Duration,
    ) -> Self {
        Self {
            tracker,
            source: Box::new(source),
            period,
        }
    }
}

#[async_trait::async_trait]
impl PeriodicTask for SampleTask {
    fn name(&self) -> &'static str {
        "seqno-time-sample"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn run(&self, _ctx: TaskContext) -> Result<()> {
        if !self.tracker.tracking_enabled() {
            return Ok(());
        }
        let (seqno, now) = (self.source)();
        let appended = self.tracker.sample(seqno, now);
        tracing::debug!(seqno, now, appended, "recorded seqno-time sample");
        Ok(())
    }
}
