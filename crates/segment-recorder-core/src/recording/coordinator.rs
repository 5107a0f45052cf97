use crate::{
    CoreResult, RecorderError,
    media::MediaSample,
    merge::SegmentMerger,
    recording::{
        Attributes, RecordingDelegate, RecordingEvent, RecordingNotification, RecordingOutcome,
        RecordingStatus, Segment, Transition, delegate::Notifier, segment::SegmentBook, transition,
    },
    tap::FormatRegistry,
    writer::{AudioTrack, SegmentWriter, TrackConfiguration, VideoTrack, WriterFactory},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use tokio::runtime::Handle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

struct Session {
    id: Uuid,
    book: SegmentBook,
    writer: Option<Arc<dyn SegmentWriter>>,
    /// Bumped for every writer so that completions of a discarded writer
    /// can be recognized and ignored.
    generation: u64,
}

struct Inner {
    status: Mutex<RecordingStatus>,
    session: Mutex<Session>,
    attributes: Attributes,
    formats: FormatRegistry,
    factory: Arc<dyn WriterFactory>,
    merger: Arc<dyn SegmentMerger>,
    notifier: Notifier,
    runtime: Handle,
}

/// Recording state machine.
///
/// Owns the recording status, the segment bookkeeping of the current
/// session and the active writer. Public operations never block: they
/// perform the status check-and-set and spawn the writer or merge work on
/// the Tokio runtime the coordinator was created in. Completions are fed
/// back through the same transition function.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct RecordingCoordinator {
    inner: Arc<Inner>,
}

impl RecordingCoordinator {
    /// Creates an idle coordinator.
    ///
    /// # Errors
    ///
    /// Returns error if called outside of a Tokio runtime.
    #[track_caller]
    #[instrument(skip(formats, factory, merger, delegate))]
    pub fn new(
        attributes: Attributes,
        formats: FormatRegistry,
        factory: Arc<dyn WriterFactory>,
        merger: Arc<dyn SegmentMerger>,
        delegate: Arc<dyn RecordingDelegate>,
    ) -> CoreResult<Self> {
        let runtime = Handle::try_current().map_err(|e| RecorderError::RuntimeUnavailable {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let notifier = Notifier::spawn(&runtime, delegate);
        let book = SegmentBook::new(attributes.destination.clone(), attributes.format);

        info!(destination = ?attributes.destination, format = %attributes.format, "RecordingCoordinator initialized");

        Ok(Self {
            inner: Arc::new(Inner {
                status: Mutex::new(RecordingStatus::idle()),
                session: Mutex::new(Session {
                    id: Uuid::new_v4(),
                    book,
                    writer: None,
                    generation: 0,
                }),
                attributes,
                formats,
                factory,
                merger,
                notifier,
                runtime,
            }),
        })
    }

    /// Current status.
    pub fn status(&self) -> RecordingStatus {
        self.inner.lock_status().clone()
    }

    /// Returns true while samples are forwarded to the writer.
    pub fn is_recording(&self) -> bool {
        *self.inner.lock_status() == RecordingStatus::Recording
    }

    /// Segments accumulated by pauses in the current session.
    pub fn segments(&self) -> Vec<Segment> {
        self.inner.lock_session().book.segments().to_vec()
    }

    /// File the active (or next) writer targets.
    pub fn current_destination(&self) -> PathBuf {
        self.inner
            .lock_session()
            .book
            .current_destination()
            .to_path_buf()
    }

    /// Output configuration.
    pub fn attributes(&self) -> &Attributes {
        &self.inner.attributes
    }

    /// Formats the next recording configures its tracks from.
    pub fn formats(&self) -> &FormatRegistry {
        &self.inner.formats
    }

    /// Starts a recording, or resumes one after a pause.
    ///
    /// Only legal while idle; otherwise a no-op. Returns whether the start
    /// was accepted. The writer is prepared in the background and
    /// `did_begin_recording` fires once it is ready.
    #[instrument(skip(self))]
    pub fn start_recording(&self) -> bool {
        let accepted = self.inner.apply_and_notify(RecordingEvent::Start, |_| {
            Some(RecordingNotification::WillBeginRecording)
        });
        if accepted.is_none() {
            return false;
        }

        let (session_id, path) = {
            let mut session = self.inner.lock_session();
            if session.book.is_empty() {
                session.id = Uuid::new_v4();
                (session.id, session.book.current_destination().to_path_buf())
            } else {
                let path = session.book.open_segment();
                debug!(path = ?path, segment_count = session.book.segments().len(), "Opened resume segment");
                (session.id, path)
            }
        };

        let tracks = self.inner.track_configuration();
        info!(session_id = %session_id, path = ?path, video = tracks.video.is_some(), audio = tracks.audio.is_some(), "Starting recording");

        let inner = Arc::clone(&self.inner);
        self.inner
            .runtime
            .spawn(async move { inner.prepare_writer(path, tracks).await });

        true
    }

    /// Stops the recording and produces the final movie.
    ///
    /// Legal while recording, or while idle with segments left by a pause
    /// (those are merged). A stop while idle with nothing recorded collapses
    /// straight back to idle. Any other status makes this a no-op.
    #[instrument(skip(self))]
    pub fn stop_recording(&self) -> bool {
        let Some(transition) = self.inner.apply_and_notify(RecordingEvent::Stop, |t| {
            (t.from == RecordingStatus::Recording)
                .then_some(RecordingNotification::WillFinishRecording)
        }) else {
            return false;
        };

        let inner = Arc::clone(&self.inner);
        match self.inner.active_writer() {
            Some((writer, generation)) if transition.from == RecordingStatus::Recording => {
                self.inner
                    .runtime
                    .spawn(async move { inner.finish_writer(writer, generation).await });
            }
            _ => {
                self.inner
                    .runtime
                    .spawn(async move { inner.finalize_session(false).await });
            }
        }

        true
    }

    /// Pauses the recording, closing the current segment.
    ///
    /// Only legal while recording; otherwise a no-op.
    #[instrument(skip(self))]
    pub fn pause(&self) -> bool {
        let accepted = self.inner.apply_and_notify(RecordingEvent::Pause, |_| {
            Some(RecordingNotification::WillPauseRecording)
        });
        if accepted.is_none() {
            return false;
        }

        match self.inner.active_writer() {
            Some((writer, generation)) => {
                let inner = Arc::clone(&self.inner);
                self.inner
                    .runtime
                    .spawn(async move { inner.finish_writer(writer, generation).await });
            }
            None => self.inner.fail(RecorderError::WriterFailed {
                reason: "no active writer to pause".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }

        true
    }

    /// Hands a sample to the writer if, and only if, recording.
    pub(crate) fn append_sample(&self, sample: &MediaSample) {
        if !self.is_recording() {
            return;
        }

        let Some((writer, generation)) = self.inner.active_writer() else {
            return;
        };

        if let Err(e) = writer.append(sample) {
            if self.inner.is_current(generation) {
                self.inner.fail(e);
            }
        }
    }
}

impl Inner {
    fn lock_status(&self) -> MutexGuard<'_, RecordingStatus> {
        self.status.lock().unwrap_or_else(|e| {
            error!("Status lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| {
            error!("Session lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    /// Check-and-set of the status. The lock covers only the transition.
    fn apply(&self, event: RecordingEvent) -> Option<Transition> {
        self.apply_and_notify(event, |_| None)
    }

    /// Like [`apply`](Self::apply), but queues the notification chosen by
    /// `notification` before the status lock is released, so the delegate
    /// observes notifications in transition order.
    fn apply_and_notify(
        &self,
        event: RecordingEvent,
        notification: impl FnOnce(&Transition) -> Option<RecordingNotification>,
    ) -> Option<Transition> {
        let result = {
            let mut status = self.lock_status();
            transition(&status, &event).inspect(|t| {
                *status = t.to.clone();
                if let Some(notification) = notification(t) {
                    self.notifier.notify(notification);
                }
            })
        };

        match result {
            Ok(t) => {
                debug!(from = %t.from, to = %t.to, %event, "Recording status changed");
                Some(t)
            }
            Err(illegal) => {
                warn!(status = %illegal.status, event = %illegal.event, "Ignoring illegal recording transition");
                None
            }
        }
    }

    fn active_writer(&self) -> Option<(Arc<dyn SegmentWriter>, u64)> {
        let session = self.lock_session();
        session
            .writer
            .as_ref()
            .map(|writer| (Arc::clone(writer), session.generation))
    }

    fn is_current(&self, generation: u64) -> bool {
        let session = self.lock_session();
        session.writer.is_some() && session.generation == generation
    }

    fn discard_writer(&self) {
        self.lock_session().writer = None;
    }

    fn track_configuration(&self) -> TrackConfiguration {
        let (video, audio) = self.formats.snapshot();
        TrackConfiguration {
            video: video.map(|source_format| VideoTrack {
                source_format,
                settings: self.attributes.video.clone(),
            }),
            audio: audio.map(|source_format| AudioTrack {
                source_format,
                settings: self.attributes.audio.clone(),
            }),
        }
    }

    /// Forces the session to `Idle(error)` and reports it.
    ///
    /// A failure ends the session: the writer is discarded and the segment
    /// book cleared, so the next start begins a fresh recording. Segment
    /// files already on disk are left in place.
    fn fail(&self, error: RecorderError) {
        let error = Arc::new(error);
        let mut abandoned = Vec::new();

        let transition = self.apply_and_notify(
            RecordingEvent::WriterFailed(Arc::clone(&error)),
            |t| {
                let mut session = self.lock_session();
                session.writer = None;
                abandoned = session.book.reset();

                // A second failure racing the first (e.g. both sample queues)
                // is not reported again.
                t.from.error().is_none().then(|| {
                    RecordingNotification::DidFinishRecording(RecordingOutcome::Failed {
                        error: Arc::clone(&error),
                    })
                })
            },
        );

        let Some(transition) = transition else {
            return;
        };

        if transition.from.error().is_some() {
            debug!(error = %error, "Session already failed");
            return;
        }

        if !abandoned.is_empty() {
            warn!(segment_count = abandoned.len(), "Session abandoned, segment files kept on disk");
        }
        error!(error = %error, from = %transition.from, "Recording failed");
    }

    async fn prepare_writer(self: Arc<Self>, path: PathBuf, tracks: TrackConfiguration) {
        let writer = match self.factory.create(&path, self.attributes.format) {
            Ok(writer) => writer,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        let generation = {
            let mut session = self.lock_session();
            session.generation += 1;
            session.writer = Some(Arc::clone(&writer));
            session.generation
        };

        let result = writer.prepare(&tracks).await;

        if !self.is_current(generation) {
            debug!(generation, "Ignoring completion of discarded writer");
            return;
        }

        match result {
            Ok(()) => {
                if self
                    .apply_and_notify(RecordingEvent::WriterPrepared, |_| {
                        Some(RecordingNotification::DidBeginRecording)
                    })
                    .is_some()
                {
                    info!(path = ?path, "Recording started");
                }
            }
            Err(e) => self.fail(e),
        }
    }

    async fn finish_writer(self: Arc<Self>, writer: Arc<dyn SegmentWriter>, generation: u64) {
        let result = writer.finish().await;

        if !self.is_current(generation) {
            debug!(generation, "Ignoring completion of discarded writer");
            return;
        }

        match result {
            Ok(()) => self.on_writer_finished().await,
            Err(e) => self.fail(e),
        }
    }

    async fn on_writer_finished(self: Arc<Self>) {
        let status = self.lock_status().clone();

        match status {
            RecordingStatus::StoppingRecording => {
                if self.apply(RecordingEvent::WriterFinished).is_some() {
                    self.discard_writer();
                    self.finalize_session(true).await;
                }
            }
            RecordingStatus::Paused => {
                if let Err(e) = self.record_first_segment().await {
                    self.fail(e);
                    return;
                }
                self.discard_writer();
                if self
                    .apply_and_notify(RecordingEvent::WriterFinished, |_| {
                        Some(RecordingNotification::DidPauseRecording)
                    })
                    .is_some()
                {
                    info!(segment_count = self.lock_session().book.segments().len(), "Recording paused");
                }
            }
            other => debug!(status = %other, "Writer finished outside of pause or stop, ignoring"),
        }
    }

    /// On the first pause, moves the output out of the destination so the
    /// final merge can be written there.
    async fn record_first_segment(&self) -> CoreResult<()> {
        let (from, to) = {
            let session = self.lock_session();
            if !session.book.is_empty() {
                return Ok(());
            }
            (
                session.book.current_destination().to_path_buf(),
                session.book.next_segment_path(),
            )
        };

        tokio::fs::rename(&from, &to)
            .await
            .map_err(|source| RecorderError::Io {
                path: from.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(from = ?from, to = ?to, "Moved first segment");
        self.lock_session().book.push(Segment::new(to));

        Ok(())
    }

    /// Merges accumulated segments into the destination, cleans them up and
    /// returns to idle.
    ///
    /// `writer_finished` is false when the stop came from idle: with no
    /// segments there is nothing to deliver and the stop just collapses.
    async fn finalize_session(self: Arc<Self>, writer_finished: bool) {
        let (session_id, segments) = {
            let session = self.lock_session();
            (session.id, session.book.segments().to_vec())
        };
        let destination = self.attributes.destination.clone();

        if segments.is_empty() && !writer_finished {
            if self.apply(RecordingEvent::SessionFinalized).is_some() {
                debug!("Redundant stop while idle");
            }
            return;
        }

        if !segments.is_empty() {
            info!(session_id = %session_id, segment_count = segments.len(), destination = ?destination, "Merging segments");

            if let Err(e) = self
                .merger
                .merge(&segments, &destination, self.attributes.format)
                .await
            {
                self.fail(e);
                return;
            }

            remove_segments(&segments).await;
        }

        self.lock_session().book.reset();

        let finalized = self.apply_and_notify(RecordingEvent::SessionFinalized, |_| {
            Some(RecordingNotification::DidFinishRecording(
                RecordingOutcome::Completed {
                    output: destination.clone(),
                },
            ))
        });
        if finalized.is_some() {
            info!(session_id = %session_id, output = ?destination, "Recording finished");
        }
    }
}

async fn remove_segments(segments: &[Segment]) {
    for segment in segments {
        remove_file(segment.path()).await;
    }
}

async fn remove_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = ?path, "Removed segment file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?path, error = %e, "Failed to remove segment file"),
    }
}
