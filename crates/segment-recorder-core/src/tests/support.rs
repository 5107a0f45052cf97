//! Shared fixtures: an instrumented writer, a recording merger and a
//! coordinator harness listening to its own notifications.

use crate::{
    Attributes, ChannelDelegate, ConcatMerger, Connection, ConnectionId, CoreResult,
    FormatDescription, FormatRegistry, MediaFormat, MediaKind, MediaSample, RecorderError,
    RecordingCoordinator, RecordingNotification, RecordingStatus, Segment, SegmentMerger,
    SegmentWriter, StreamFileWriter, TrackConfiguration, VideoCodec, WriterFactory,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::ThreadId,
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tempfile::TempDir;
use tokio::sync::{Semaphore, mpsc::UnboundedReceiver};

pub(crate) const TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn video_format() -> FormatDescription {
    FormatDescription::Video {
        width: 1920,
        height: 1080,
        codec: VideoCodec::Bgra,
    }
}

pub(crate) fn audio_format() -> FormatDescription {
    FormatDescription::Audio {
        sample_rate: 44_100,
        channels: 1,
    }
}

pub(crate) fn sample(
    connection: ConnectionId,
    format: FormatDescription,
    millis: u64,
    data: &[u8],
) -> MediaSample {
    MediaSample {
        connection,
        timestamp: Duration::from_millis(millis),
        format,
        data: data.to_vec(),
    }
}

fn injected(reason: &str) -> RecorderError {
    RecorderError::WriterFailed {
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Counters and captured inputs shared by every writer of one factory.
#[derive(Default)]
pub(crate) struct WriterLog {
    pub created: Mutex<Vec<PathBuf>>,
    pub prepared: AtomicUsize,
    pub finished: AtomicUsize,
    pub appended: Mutex<Vec<MediaSample>>,
    /// Thread each `append` ran on.
    pub append_threads: Mutex<Vec<ThreadId>>,
    pub tracks: Mutex<Vec<TrackConfiguration>>,
}

impl WriterLog {
    pub(crate) fn appended_timestamps(&self) -> Vec<Duration> {
        self.appended
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.timestamp)
            .collect()
    }
}

/// Knobs for making the next writers misbehave.
#[derive(Default)]
pub(crate) struct WriterFaults {
    pub fail_prepare: AtomicBool,
    pub fail_append: AtomicBool,
    /// When set, `finish` waits for a permit before closing the file.
    pub finish_gate: Mutex<Option<Arc<Semaphore>>>,
}

/// Writes real files through [`StreamFileWriter`] while recording calls.
pub(crate) struct InstrumentedWriter {
    inner: StreamFileWriter,
    log: Arc<WriterLog>,
    faults: Arc<WriterFaults>,
}

#[async_trait]
impl SegmentWriter for InstrumentedWriter {
    async fn prepare(&self, tracks: &TrackConfiguration) -> CoreResult<()> {
        self.log.prepared.fetch_add(1, Ordering::SeqCst);
        self.log.tracks.lock().unwrap().push(tracks.clone());
        if self.faults.fail_prepare.load(Ordering::SeqCst) {
            return Err(injected("injected prepare failure"));
        }
        self.inner.prepare(tracks).await
    }

    fn append(&self, sample: &MediaSample) -> CoreResult<()> {
        if self.faults.fail_append.load(Ordering::SeqCst) {
            return Err(injected("injected append failure"));
        }
        self.log
            .append_threads
            .lock()
            .unwrap()
            .push(std::thread::current().id());
        self.log.appended.lock().unwrap().push(sample.clone());
        self.inner.append(sample)
    }

    async fn finish(&self) -> CoreResult<()> {
        self.log.finished.fetch_add(1, Ordering::SeqCst);
        let gate = self.faults.finish_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        self.inner.finish().await
    }
}

#[derive(Default)]
pub(crate) struct InstrumentedFactory {
    pub log: Arc<WriterLog>,
    pub faults: Arc<WriterFaults>,
}

impl WriterFactory for InstrumentedFactory {
    fn create(&self, path: &Path, _format: MediaFormat) -> CoreResult<Arc<dyn SegmentWriter>> {
        self.log.created.lock().unwrap().push(path.to_path_buf());
        Ok(Arc::new(InstrumentedWriter {
            inner: StreamFileWriter::new(path),
            log: Arc::clone(&self.log),
            faults: Arc::clone(&self.faults),
        }))
    }
}

/// Concatenates segments like [`ConcatMerger`] and remembers each call.
#[derive(Default)]
pub(crate) struct RecordingMerger {
    pub calls: Mutex<Vec<Vec<Segment>>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl SegmentMerger for RecordingMerger {
    async fn merge(
        &self,
        segments: &[Segment],
        destination: &Path,
        format: MediaFormat,
    ) -> CoreResult<()> {
        self.calls.lock().unwrap().push(segments.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            return Err(RecorderError::MergeFailed {
                segment_count: segments.len(),
                destination: destination.to_path_buf(),
                reason: "injected merge failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        ConcatMerger.merge(segments, destination, format).await
    }
}

/// A coordinator recording into a temporary directory.
pub(crate) struct Harness {
    pub coordinator: RecordingCoordinator,
    pub formats: FormatRegistry,
    pub writers: Arc<WriterLog>,
    pub faults: Arc<WriterFaults>,
    pub merger: Arc<RecordingMerger>,
    pub destination: PathBuf,
    notifications: UnboundedReceiver<RecordingNotification>,
    _dir: TempDir,
}

impl Harness {
    /// Coordinator with both formats already known. Must run inside a
    /// Tokio runtime.
    pub(crate) fn new() -> Self {
        let harness = Self::without_formats();
        harness.formats.update(video_format());
        harness.formats.update(audio_format());
        harness
    }

    pub(crate) fn without_formats() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("movie.raw");
        let factory = InstrumentedFactory::default();
        let writers = Arc::clone(&factory.log);
        let faults = Arc::clone(&factory.faults);
        let merger = Arc::new(RecordingMerger::default());
        let formats = FormatRegistry::new();
        let (delegate, notifications) = ChannelDelegate::new();

        let coordinator = RecordingCoordinator::new(
            Attributes::new(&destination, MediaFormat::Raw),
            formats.clone(),
            Arc::new(factory),
            Arc::clone(&merger) as Arc<dyn SegmentMerger>,
            Arc::new(delegate),
        )
        .unwrap();

        Self {
            coordinator,
            formats,
            writers,
            faults,
            merger,
            destination,
            notifications,
            _dir: dir,
        }
    }

    pub(crate) async fn next(&mut self) -> RecordingNotification {
        next_notification(&mut self.notifications).await
    }

    /// Asserts nothing is delivered for a short while.
    pub(crate) async fn assert_quiet(&mut self) {
        let pending =
            tokio::time::timeout(Duration::from_millis(100), self.notifications.recv()).await;
        assert!(pending.is_err(), "unexpected notification: {:?}", pending);
    }

    /// Asserts the next notifications are exactly `expected`, by variant.
    pub(crate) async fn expect(&mut self, expected: &[&str]) -> Vec<RecordingNotification> {
        let mut received = Vec::with_capacity(expected.len());
        for name in expected {
            let notification = self.next().await;
            assert_eq!(&notification_name(&notification), name, "{:?}", notification);
            received.push(notification);
        }
        received
    }

    /// Starts and waits until the writer is prepared.
    pub(crate) async fn begin(&mut self) {
        assert!(self.coordinator.start_recording());
        self.expect(&["will_begin", "did_begin"]).await;
        assert_eq!(self.coordinator.status(), RecordingStatus::Recording);
    }

    /// Pauses and waits until the segment is on disk.
    pub(crate) async fn pause(&mut self) {
        assert!(self.coordinator.pause());
        self.expect(&["will_pause", "did_pause"]).await;
        assert!(self.coordinator.status().is_idle());
    }

    pub(crate) fn append(&self, kind: MediaKind, millis: u64, data: &[u8]) {
        let format = match kind {
            MediaKind::Video => video_format(),
            MediaKind::Audio => audio_format(),
        };
        let connection = Connection::new(kind).id();
        self.coordinator
            .append_sample(&sample(connection, format, millis, data));
    }
}

pub(crate) async fn next_notification(
    notifications: &mut UnboundedReceiver<RecordingNotification>,
) -> RecordingNotification {
    tokio::time::timeout(TIMEOUT, notifications.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("notification channel closed")
}

pub(crate) fn notification_name(notification: &RecordingNotification) -> &'static str {
    match notification {
        RecordingNotification::WillBeginRecording => "will_begin",
        RecordingNotification::DidBeginRecording => "did_begin",
        RecordingNotification::WillFinishRecording => "will_finish",
        RecordingNotification::WillPauseRecording => "will_pause",
        RecordingNotification::DidPauseRecording => "did_pause",
        RecordingNotification::DidFinishRecording(_) => "did_finish",
    }
}

/// Polls `condition` until it holds or the timeout elapses.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
