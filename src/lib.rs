//! Seqno-to-time tracking for LSM storage engines.
//!
//! An LSM engine that tiers data by age needs to answer one question during
//! compaction: which keys are old enough for the cold tier? Sequence numbers
//! order writes but say nothing about when they happened, so the engine
//! periodically samples `(latest_seqno, wall_clock_seconds)` into a
//! [`SeqnoTimeMapping`] and asks it two proximal queries:
//!
//! - [`proximal_seqno_before_time`](mapping::SeqnoTimeMapping::proximal_seqno_before_time)
//!   drives tier placement ("every seqno at or below this committed before
//!   the age cutoff"), and
//! - [`proximal_time_before_seqno`](mapping::SeqnoTimeMapping::proximal_time_before_seqno)
//!   recovers an approximate write time for a seqno.
//!
//! # Data flow
//!
//! ```text
//!  engine clock + version ──▶ SampleTask ──▶ SeqnoTimeTracker ──▶ SeqnoTimeMapping
//!                             (periodic)     (per-family caps)        │
//!                                                                     ├─ queries (compaction)
//!                                                                     └─ encode ──▶ SST properties block
//!                                                                                     │
//!                                            add_encoded + sort ◀── SST open ◀────────┘
//! ```
//!
//! The mapping is single-writer, many-reader under the engine's own
//! synchronization; readers clone a snapshot. The per-SST block is a compact
//! varint-delta encoding capped at
//! [`MAX_SEQNO_TIME_PAIRS_PER_SST`](mapping::MAX_SEQNO_TIME_PAIRS_PER_SST)
//! pairs, and blocks from multiple files merge through the bulk-ingest path
//! followed by a sort.

pub mod codec;
pub mod config;
pub mod error;
pub mod mapping;
pub mod sampler;
pub mod scheduler;
pub mod tracker;

pub use config::{FamilyOptions, TrackerConfig};
pub use error::{Error, Result};
pub use mapping::{
    SeqnoTimeMapping, SeqnoTimePair, SequenceNumber, MAX_SEQNO_TIME_PAIRS_PER_FAMILY,
    MAX_SEQNO_TIME_PAIRS_PER_SST, UNKNOWN_SEQNO_BEFORE_ALL, UNKNOWN_TIME_BEFORE_ALL,
};
pub use sampler::SampleTask;
pub use scheduler::{PeriodicTask, TaskContext, TaskScheduler};
pub use tracker::SeqnoTimeTracker;
