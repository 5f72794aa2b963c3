//! The seqno-to-time mapping: a bounded, append-only, monotonically ordered
//! index from sequence numbers to wall-clock seconds.
//!
//! The engine samples `(latest_seqno, now)` at a fixed cadence and appends
//! the samples here. Compaction asks the two proximal queries to decide which
//! keys are old enough for the cold tier, and the SST build path encodes a
//! capped slice of the mapping into each file's properties block.
//!
//! A pair `(s, t)` means: at some instant at or before `t`, the latest
//! committed seqno was exactly `s`. So `t` is known to be *after* the commit
//! of `s` and *before* the commit of `s + 1`. That asymmetry drives every
//! accept/reject rule in [`SeqnoTimeMapping::append`] and the strict/non-strict
//! bounds in the two queries.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::errdata;
use crate::error::Result;

/// Monotonic 64-bit write counter assigned by the LSM engine to every
/// mutation.
pub type SequenceNumber = u64;

/// Query sentinel: no seqno is known to be committed before the queried time.
pub const UNKNOWN_SEQNO_BEFORE_ALL: SequenceNumber = 0;

/// Query sentinel: no time is known to be before the queried seqno.
pub const UNKNOWN_TIME_BEFORE_ALL: u64 = 0;

/// Most pairs written into a single SST properties block.
pub const MAX_SEQNO_TIME_PAIRS_PER_SST: usize = 100;

/// Pairs budgeted per tracking column family in the process-wide mapping.
pub const MAX_SEQNO_TIME_PAIRS_PER_FAMILY: usize = 100;

/// One sample of the engine's write clock against the wall clock.
///
/// Ordering is `(seqno, time)` lexicographic, which is what the sort-merge
/// path relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeqnoTimePair {
    pub seqno: SequenceNumber,
    pub time: u64,
}

impl SeqnoTimePair {
    pub fn new(seqno: SequenceNumber, time: u64) -> Self {
        Self { seqno, time }
    }
}

/// An ordered sequence of [`SeqnoTimePair`]s with capacity and duration caps.
///
/// Invariants while in the sorted state: strictly increasing seqno,
/// non-decreasing time, no zero seqno, at most `max_capacity` entries when
/// the cap is set. The bulk-ingest paths ([`add`](Self::add),
/// [`add_encoded`](Self::add_encoded)) suspend the invariants until
/// [`sort`](Self::sort) re-establishes them; queries and encoding expect a
/// sorted mapping.
///
/// Single-writer, many-reader under external synchronization: the engine
/// serializes mutation and hands readers a [`Clone`] snapshot. No method
/// blocks or performs I/O.
#[derive(Clone, Debug)]
pub struct SeqnoTimeMapping {
    /// Soft cap on the retained time span in seconds. 0 disables
    /// age-based truncation.
    max_time_duration: u64,
    /// Hard cap on the entry count. 0 leaves the count unbounded here;
    /// the per-SST cap still applies when encoding.
    max_capacity: usize,
    pairs: VecDeque<SeqnoTimePair>,
    /// Cleared by the bulk-ingest paths, restored by `sort`.
    sorted: bool,
}

impl Default for SeqnoTimeMapping {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl SeqnoTimeMapping {
    /// Creates an empty mapping with the given caps (0 disables either).
    pub fn new(max_time_duration: u64, max_capacity: usize) -> Self {
        Self {
            max_time_duration,
            max_capacity,
            pairs: VecDeque::new(),
            sorted: true,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn max_time_duration(&self) -> u64 {
        self.max_time_duration
    }

    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    /// The stored pairs, oldest first.
    pub fn pairs(&self) -> impl Iterator<Item = &SeqnoTimePair> {
        self.pairs.iter()
    }

    /// Removes all entries. The caps are kept.
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.sorted = true;
    }

    /// Replaces the duration cap. Takes effect on the next
    /// [`truncate_old_entries`](Self::truncate_old_entries).
    pub fn set_max_time_duration(&mut self, max_time_duration: u64) {
        self.max_time_duration = max_time_duration;
    }

    /// Replaces the capacity cap, evicting oldest entries immediately if the
    /// new cap is exceeded.
    pub fn set_capacity(&mut self, max_capacity: usize) {
        self.max_capacity = max_capacity;
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        if self.max_capacity > 0 {
            while self.pairs.len() > self.max_capacity {
                self.pairs.pop_front();
            }
        }
    }

    /// Extends the mapping with a new sample. Returns true iff the mapping
    /// changed, including the in-place replacement case.
    ///
    /// The sample is rejected when it is out of order on either axis, and
    /// when it repeats the last seqno: keeping the oldest time for a seqno
    /// and the largest seqno for a time both sharpen
    /// [`proximal_seqno_before_time`](Self::proximal_seqno_before_time),
    /// which is the query the tiering decision rides on.
    pub fn append(&mut self, seqno: SequenceNumber, time: u64) -> bool {
        if seqno == 0 {
            // Zeroed-out seqnos carry no ordering information.
            return false;
        }
        let Some(last) = self.pairs.back_mut() else {
            self.pairs.push_back(SeqnoTimePair::new(seqno, time));
            return true;
        };
        if seqno < last.seqno || time < last.time {
            // Out of order.
            return false;
        }
        if seqno == last.seqno {
            // A newer time for the same seqno would only degrade
            // proximal_seqno_before_time answers.
            return false;
        }
        if time == last.time {
            // Same time, larger seqno: replace in place at no size cost.
            last.seqno = seqno;
            return true;
        }
        self.pairs.push_back(SeqnoTimePair::new(seqno, time));
        self.enforce_capacity();
        true
    }

    /// Appends one pair without enforcing ordering, for merging entries from
    /// multiple SST blocks. Call [`sort`](Self::sort) before querying.
    pub fn add(&mut self, seqno: SequenceNumber, time: u64) {
        self.pairs.push_back(SeqnoTimePair::new(seqno, time));
        self.sorted = false;
    }

    /// Decodes one encoded block and appends its pairs, without enforcing
    /// ordering. On a corrupt block the mapping is left unchanged. Call
    /// [`sort`](Self::sort) before querying.
    pub fn add_encoded(&mut self, bytes: &[u8]) -> Result<()> {
        let decoded = codec::read_block(bytes)?;
        if !decoded.is_empty() {
            self.pairs.extend(decoded);
            self.sorted = false;
        }
        Ok(())
    }

    /// Re-establishes the mapping invariants after bulk ingest: sorts by
    /// `(seqno, time)`, then keeps an entry only if it strictly increases
    /// both axes over the previously kept one. Zero-seqno entries and
    /// entries that tie on either axis are dropped; capacity is enforced at
    /// the end.
    pub fn sort(&mut self) -> Result<()> {
        if self.sorted {
            return Ok(());
        }
        let mut merged: Vec<SeqnoTimePair> = self.pairs.drain(..).collect();
        merged.sort_unstable();
        for pair in merged {
            if pair.seqno == 0 {
                continue;
            }
            match self.pairs.back() {
                None => self.pairs.push_back(pair),
                Some(last) => {
                    if pair.seqno > last.seqno && pair.time > last.time {
                        self.pairs.push_back(pair);
                    }
                }
            }
        }
        self.enforce_capacity();
        self.sorted = true;
        Ok(())
    }

    /// Evicts entries older than `now - max_time_duration` from the old end.
    ///
    /// The greatest entry at or before that cutoff is retained: it is the
    /// entry that answers `proximal_seqno_before_time(cutoff)`, so dropping
    /// it would lose information still inside the tracked window. The last
    /// entry is therefore never removed. No-op when the duration cap is 0.
    pub fn truncate_old_entries(&mut self, now: u64) {
        if self.max_time_duration == 0 {
            return;
        }
        let cutoff = now.saturating_sub(self.max_time_duration);
        let first_after = self.pairs.partition_point(|p| p.time <= cutoff);
        if first_after == 0 {
            return;
        }
        self.pairs.drain(..first_after - 1);
    }

    /// Returns the largest known time strictly before the commit of `seqno`,
    /// or [`UNKNOWN_TIME_BEFORE_ALL`] if none.
    ///
    /// A stored pair for `seqno` itself does not answer this query: it only
    /// says its time is *after* that seqno committed.
    pub fn proximal_time_before_seqno(&self, seqno: SequenceNumber) -> u64 {
        let idx = self.pairs.partition_point(|p| p.seqno < seqno);
        if idx == 0 {
            UNKNOWN_TIME_BEFORE_ALL
        } else {
            self.pairs[idx - 1].time
        }
    }

    /// Returns the largest seqno known to be committed at or before `time`,
    /// or [`UNKNOWN_SEQNO_BEFORE_ALL`] if none.
    ///
    /// Equal time matches: a pair `(s, t)` says the latest seqno was `s` at
    /// some instant no later than `t`.
    pub fn proximal_seqno_before_time(&self, time: u64) -> SequenceNumber {
        let idx = self.pairs.partition_point(|p| p.time <= time);
        if idx == 0 {
            UNKNOWN_SEQNO_BEFORE_ALL
        } else {
            self.pairs[idx - 1].seqno
        }
    }

    /// Encodes at most [`MAX_SEQNO_TIME_PAIRS_PER_SST`] pairs covering the
    /// seqno range `[start, end]` into `dest`. See
    /// [`encode_limited`](Self::encode_limited).
    pub fn encode(
        &self,
        dest: &mut Vec<u8>,
        start: SequenceNumber,
        end: SequenceNumber,
        now_hint: u64,
    ) -> Result<()> {
        self.encode_limited(dest, start, end, now_hint, MAX_SEQNO_TIME_PAIRS_PER_SST)
    }

    /// Encodes at most `max_entries` pairs covering the seqno range
    /// `[start, end]` into `dest`, leaving `dest` untouched when nothing
    /// qualifies.
    ///
    /// The greatest entry with seqno at or before `start` is included when
    /// one exists, so a decoded block can still answer queries at `start`.
    /// When the range holds more than `max_entries` pairs, a time-stride
    /// walk picks the survivors, anchored on the oldest entry and biased
    /// toward the newest ones.
    ///
    /// `now_hint` is accepted for interface compatibility with the SST build
    /// path and is currently unused. Errors if the mapping has unsorted
    /// bulk-ingested entries.
    pub fn encode_limited(
        &self,
        dest: &mut Vec<u8>,
        start: SequenceNumber,
        end: SequenceNumber,
        now_hint: u64,
        max_entries: usize,
    ) -> Result<()> {
        let _ = now_hint;
        if !self.sorted {
            return errdata!("cannot encode an unsorted mapping; sort() it first");
        }
        if start > end || max_entries == 0 {
            return Ok(());
        }
        let hi = self.pairs.partition_point(|p| p.seqno <= end);
        if hi == 0 {
            return Ok(());
        }
        // Step back to the proximal predecessor of `start` when there is one.
        let lo = self.pairs.partition_point(|p| p.seqno <= start).saturating_sub(1);

        let in_range: Vec<SeqnoTimePair> =
            self.pairs.iter().skip(lo).take(hi - lo).copied().collect();
        if in_range.len() > max_entries {
            codec::write_block(dest, &codec::select_capped(&in_range, max_entries));
        } else {
            codec::write_block(dest, &in_range);
        }
        Ok(())
    }
}
