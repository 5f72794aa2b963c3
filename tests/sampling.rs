//! End-to-end flow: a mock engine feeds the sampler through the scheduler,
//! compaction-style queries read a snapshot, and the snapshot round-trips
//! through the per-SST block encoding.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use seqtime::{
    FamilyOptions, SampleTask, SeqnoTimeMapping, SeqnoTimeTracker, TaskScheduler,
};

#[tokio::test(flavor = "multi_thread")]
async fn test_sample_query_encode_roundtrip() {
    let tracker = Arc::new(SeqnoTimeTracker::new());
    tracker.register_family(
        "default",
        FamilyOptions::new()
            .preclude_last_level_seconds(1_000_000)
            .preserve_internal_time_seconds(500_000),
    );

    // Mock engine state: 100 writes commit per polled second.
    let seqno = Arc::new(AtomicU64::new(0));
    let clock = Arc::new(AtomicU64::new(5_000));
    let source = {
        let (seqno, clock) = (seqno.clone(), clock.clone());
        move || {
            (
                seqno.fetch_add(100, Ordering::SeqCst) + 100,
                clock.fetch_add(1, Ordering::SeqCst) + 1,
            )
        }
    };

    let scheduler = TaskScheduler::new();
    scheduler.register(Arc::new(SampleTask::with_period(
        tracker.clone(),
        source,
        Duration::from_millis(5),
    )));
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.shutdown().await.unwrap();

    let snapshot = tracker.snapshot();
    assert!(snapshot.len() >= 2, "sampler should have recorded samples");

    // Compaction-style checks against the known write pattern: seqno
    // 100 * k commits at clock 5_000 + k.
    let newest = snapshot.pairs().last().copied().unwrap();
    assert_eq!(newest.time - 5_000, newest.seqno / 100);
    assert_eq!(snapshot.proximal_seqno_before_time(newest.time), newest.seqno);
    assert_eq!(
        snapshot.proximal_seqno_before_time(4_999),
        seqtime::UNKNOWN_SEQNO_BEFORE_ALL
    );
    assert_eq!(
        snapshot.proximal_time_before_seqno(newest.seqno + 1),
        newest.time
    );

    // SST build path: encode the sampled seqno range into a block, reopen it
    // into a fresh mapping, and compare answers across the whole range.
    let mut block = Vec::new();
    snapshot
        .encode(&mut block, 0, newest.seqno, newest.time)
        .unwrap();
    assert!(!block.is_empty());

    let mut reopened = SeqnoTimeMapping::default();
    reopened.add_encoded(&block).unwrap();
    reopened.sort().unwrap();
    assert_eq!(reopened.len(), snapshot.len());

    for query in 0..=newest.seqno {
        assert_eq!(
            reopened.proximal_time_before_seqno(query),
            snapshot.proximal_time_before_seqno(query)
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deregistration_stops_sampling() {
    let tracker = Arc::new(SeqnoTimeTracker::new());
    tracker.register_family(
        "default",
        FamilyOptions::new().preserve_internal_time_seconds(1_000_000),
    );

    let seqno = Arc::new(AtomicU64::new(0));
    let source = {
        let seqno = seqno.clone();
        move || (seqno.fetch_add(1, Ordering::SeqCst) + 1, 10_000)
    };

    let scheduler = TaskScheduler::new();
    scheduler.register(Arc::new(SampleTask::with_period(
        tracker.clone(),
        source,
        Duration::from_millis(5),
    )));
    tokio::time::sleep(Duration::from_millis(50)).await;

    tracker.deregister_family("default");
    tokio::time::sleep(Duration::from_millis(50)).await;
    scheduler.shutdown().await.unwrap();

    assert!(!tracker.tracking_enabled());
    assert!(tracker.snapshot().is_empty());
}
