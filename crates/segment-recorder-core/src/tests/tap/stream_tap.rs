use crate::{
    Connection, Connections, MediaKind, StreamTap,
    tests::support::{Harness, audio_format, eventually, sample, video_format},
};

use std::time::Duration;

fn fresh_connections() -> Connections {
    Connections {
        video: Connection::new(MediaKind::Video),
        audio: Connection::new(MediaKind::Audio),
    }
}

fn tap_for(harness: &Harness, capacity: usize) -> StreamTap {
    StreamTap::new(
        harness.formats.clone(),
        harness.coordinator.clone(),
        capacity,
    )
    .unwrap()
}

/// WHAT: The first video frame after connecting only teaches the format
/// WHY: Writers must see a stable frame format before the first append
#[tokio::test]
async fn given_fresh_connection_when_frames_arrive_then_first_video_frame_skipped() {
    // Given: A recording session and a freshly connected tap
    let mut harness = Harness::new();
    harness.begin().await;
    let tap = tap_for(&harness, 8);
    let connections = fresh_connections();
    tap.reconnect(connections);
    assert_eq!(harness.formats.snapshot(), (None, None));

    // When: Two video frames arrive
    let video = tap.sink(MediaKind::Video);
    assert!(video.deliver(sample(connections.video.id(), video_format(), 0, &[1])));
    assert!(video.deliver(sample(connections.video.id(), video_format(), 33, &[2])));

    // Then: Only the second one reaches the writer, and the format is known
    eventually(|| harness.writers.appended.lock().unwrap().len() == 1).await;
    assert_eq!(
        harness.writers.appended_timestamps(),
        vec![Duration::from_millis(33)]
    );
    assert_eq!(harness.formats.get(MediaKind::Video), Some(video_format()));
}

/// WHAT: Audio buffers are forwarded from the first one
#[tokio::test]
async fn given_fresh_connection_when_audio_arrives_then_forwarded_immediately() {
    let mut harness = Harness::new();
    harness.begin().await;
    let tap = tap_for(&harness, 8);
    let connections = fresh_connections();
    tap.reconnect(connections);

    tap.sink(MediaKind::Audio)
        .deliver(sample(connections.audio.id(), audio_format(), 7, &[3]));

    eventually(|| harness.writers.appended.lock().unwrap().len() == 1).await;
    assert_eq!(harness.formats.get(MediaKind::Audio), Some(audio_format()));
}

/// WHAT: Writers append off the async runtime thread
/// WHY: File writes block; they must not stall the tasks sharing the runtime
#[tokio::test]
async fn given_recording_tap_when_samples_arrive_then_appended_off_runtime_thread() {
    // Given: A recording tap on a single-threaded runtime
    let mut harness = Harness::new();
    harness.begin().await;
    let tap = tap_for(&harness, 8);
    let connections = fresh_connections();
    tap.reconnect(connections);
    let runtime_thread = std::thread::current().id();

    // When: Audio and video samples arrive
    let audio = tap.sink(MediaKind::Audio);
    let video = tap.sink(MediaKind::Video);
    audio.deliver(sample(connections.audio.id(), audio_format(), 0, &[1]));
    video.deliver(sample(connections.video.id(), video_format(), 0, &[2]));
    video.deliver(sample(connections.video.id(), video_format(), 33, &[3]));

    // Then: Every append ran on another thread
    eventually(|| harness.writers.appended.lock().unwrap().len() == 2).await;
    let threads = harness.writers.append_threads.lock().unwrap().clone();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|id| *id != runtime_thread));
}

/// WHAT: Samples from unknown connections are dropped
/// WHY: Frames still in flight from a swapped-out device must not be recorded
#[tokio::test]
async fn given_stale_connection_when_sample_arrives_then_dropped() {
    // Given: A recording tap bound to one set of connections
    let mut harness = Harness::new();
    harness.begin().await;
    let tap = tap_for(&harness, 8);
    let connections = fresh_connections();
    tap.reconnect(connections);
    let stale = Connection::new(MediaKind::Video);

    // When: A stale frame arrives, followed by a warm-up and a real frame
    let video = tap.sink(MediaKind::Video);
    video.deliver(sample(stale.id(), video_format(), 1, &[0]));
    video.deliver(sample(connections.video.id(), video_format(), 2, &[0]));
    video.deliver(sample(connections.video.id(), video_format(), 3, &[0]));

    // Then: Only the real frame is recorded
    eventually(|| harness.writers.appended.lock().unwrap().len() == 1).await;
    assert_eq!(
        harness.writers.appended_timestamps(),
        vec![Duration::from_millis(3)]
    );
}

/// WHAT: Reconnecting switches connections and forgets learned formats
/// WHY: A swapped camera may deliver a different resolution
#[tokio::test]
async fn given_learned_formats_when_reconnecting_then_formats_reset_and_old_connection_ignored() {
    // Given: A tap that has learned the audio format from its first connection
    let mut harness = Harness::new();
    harness.begin().await;
    let tap = tap_for(&harness, 8);
    let old = fresh_connections();
    tap.reconnect(old);
    let audio = tap.sink(MediaKind::Audio);
    audio.deliver(sample(old.audio.id(), audio_format(), 0, &[1]));
    eventually(|| harness.formats.get(MediaKind::Audio).is_some()).await;

    // When: Reconnecting to new connections
    let new = fresh_connections();
    tap.reconnect(new);

    // Then: Formats are gone and only the new connection is accepted
    assert_eq!(harness.formats.snapshot(), (None, None));
    assert_eq!(tap.connections(), Some(new));
    audio.deliver(sample(old.audio.id(), audio_format(), 10, &[2]));
    audio.deliver(sample(new.audio.id(), audio_format(), 20, &[3]));
    eventually(|| harness.writers.appended.lock().unwrap().len() == 2).await;
    assert_eq!(
        harness.writers.appended_timestamps(),
        vec![Duration::from_millis(0), Duration::from_millis(20)]
    );
}

/// WHAT: Formats are learned while idle but nothing is written
/// WHY: Starting a recording needs formats before any writer exists
#[tokio::test]
async fn given_idle_coordinator_when_samples_arrive_then_formats_learned_only() {
    let harness = Harness::without_formats();
    let tap = tap_for(&harness, 8);
    let connections = fresh_connections();
    tap.reconnect(connections);

    tap.sink(MediaKind::Video)
        .deliver(sample(connections.video.id(), video_format(), 0, &[1]));
    tap.sink(MediaKind::Audio)
        .deliver(sample(connections.audio.id(), audio_format(), 0, &[1]));

    eventually(|| {
        let (video, audio) = harness.formats.snapshot();
        video.is_some() && audio.is_some()
    })
    .await;
    assert!(harness.writers.appended.lock().unwrap().is_empty());
}

/// WHAT: A full queue drops samples instead of blocking the producer
/// WHY: Capture callbacks must never stall on a slow writer
#[tokio::test]
async fn given_full_queue_when_delivering_then_sample_dropped_and_counted() {
    // Given: A tap with a one-slot queue whose task has not run yet
    let harness = Harness::new();
    let tap = tap_for(&harness, 1);
    let connections = fresh_connections();
    tap.reconnect(connections);
    let video = tap.sink(MediaKind::Video);

    // When: Delivering two frames without yielding
    let first = video.deliver(sample(connections.video.id(), video_format(), 0, &[1]));
    let second = video.deliver(sample(connections.video.id(), video_format(), 33, &[2]));

    // Then: The second one is dropped and counted
    assert!(first);
    assert!(!second);
    assert_eq!(video.dropped(), 1);
}

/// WHAT: Samples before the first reconnect are discarded
#[tokio::test]
async fn given_unconnected_tap_when_sample_arrives_then_ignored() {
    let harness = Harness::without_formats();
    let tap = tap_for(&harness, 8);
    assert_eq!(tap.connections(), None);

    let stray = Connection::new(MediaKind::Audio);
    tap.sink(MediaKind::Audio)
        .deliver(sample(stray.id(), audio_format(), 0, &[1]));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(harness.formats.get(MediaKind::Audio), None);
}
