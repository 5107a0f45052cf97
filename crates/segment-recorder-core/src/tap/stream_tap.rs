//! Delivery of capture samples to the recording coordinator.
//!
//! Each media kind has its own bounded queue drained by its own task, so
//! video and audio are processed concurrently while samples of one kind
//! stay in order.

use crate::{
    CoreResult, MediaKind, RecorderError,
    media::{Connection, MediaSample},
    recording::RecordingCoordinator,
    tap::FormatRegistry,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use error_location::ErrorLocation;
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, error, info, instrument, trace};

/// The pair of connections samples are accepted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connections {
    /// Camera output connection.
    pub video: Connection,
    /// Microphone output connection.
    pub audio: Connection,
}

impl Connections {
    fn get(&self, kind: MediaKind) -> Connection {
        match kind {
            MediaKind::Video => self.video,
            MediaKind::Audio => self.audio,
        }
    }
}

/// Entry point handed to a capture backend for one media kind.
///
/// `deliver` never blocks: when the queue is full the sample is dropped.
#[derive(Debug, Clone)]
pub struct SampleSink {
    kind: MediaKind,
    tx: mpsc::Sender<MediaSample>,
    dropped: Arc<AtomicU64>,
}

impl SampleSink {
    /// Media kind this sink queues.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Queues `sample` for its media kind's task.
    ///
    /// Returns false if the sample was dropped because the queue was full
    /// or the tap is gone.
    pub fn deliver(&self, sample: MediaSample) -> bool {
        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(kind = %self.kind, dropped, "Sample queue full, dropping late sample");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Number of samples dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

struct TapShared {
    connections: Mutex<Option<Connections>>,
    formats: FormatRegistry,
    coordinator: RecordingCoordinator,
}

impl TapShared {
    fn lock_connections(&self) -> MutexGuard<'_, Option<Connections>> {
        self.connections.lock().unwrap_or_else(|e| {
            error!("Connection lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn process(&self, kind: MediaKind, sample: MediaSample) {
        let previous = {
            // Held while updating the format so a reconnect cannot interleave.
            let connections = self.lock_connections();
            let expected = connections.as_ref().map(|c| c.get(kind).id());
            if expected != Some(sample.connection) || sample.kind() != kind {
                trace!(%kind, "Dropping sample from stale connection");
                return;
            }
            self.formats.update(sample.format)
        };

        // The first frame after a (re)connection only teaches us the format.
        if kind == MediaKind::Video && previous.is_none() {
            debug!(format = ?sample.format, "Learned video format from warm-up frame");
            return;
        }

        self.coordinator.append_sample(&sample);
    }
}

/// Routes samples from capture connections into the coordinator.
pub struct StreamTap {
    video: SampleSink,
    audio: SampleSink,
    shared: Arc<TapShared>,
}

impl StreamTap {
    /// Spawns the video and audio queue tasks.
    ///
    /// Samples are dropped until [`reconnect`](Self::reconnect) installs the
    /// first connections. `capacity` bounds each queue.
    ///
    /// # Errors
    ///
    /// Returns error if called outside of a Tokio runtime.
    #[track_caller]
    #[instrument(skip(formats, coordinator))]
    pub fn new(
        formats: FormatRegistry,
        coordinator: RecordingCoordinator,
        capacity: usize,
    ) -> CoreResult<Self> {
        let runtime = Handle::try_current().map_err(|e| RecorderError::RuntimeUnavailable {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let shared = Arc::new(TapShared {
            connections: Mutex::new(None),
            formats,
            coordinator,
        });

        let video = Self::spawn_queue(&runtime, MediaKind::Video, capacity, Arc::clone(&shared));
        let audio = Self::spawn_queue(&runtime, MediaKind::Audio, capacity, Arc::clone(&shared));

        info!(capacity, "StreamTap initialized");

        Ok(Self {
            video,
            audio,
            shared,
        })
    }

    fn spawn_queue(
        runtime: &Handle,
        kind: MediaKind,
        capacity: usize,
        shared: Arc<TapShared>,
    ) -> SampleSink {
        let (tx, mut rx) = mpsc::channel::<MediaSample>(capacity.max(1));

        runtime.spawn(async move {
            while let Some(sample) = rx.recv().await {
                // Writers append with blocking file I/O. Awaiting each sample
                // keeps the queue serial.
                let shared = Arc::clone(&shared);
                if let Err(e) =
                    tokio::task::spawn_blocking(move || shared.process(kind, sample)).await
                {
                    error!(%kind, error = %e, "Sample processing task failed");
                }
            }
            debug!(%kind, "Sample queue closed");
        });

        SampleSink {
            kind,
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sink for samples of `kind`.
    pub fn sink(&self, kind: MediaKind) -> SampleSink {
        match kind {
            MediaKind::Video => self.video.clone(),
            MediaKind::Audio => self.audio.clone(),
        }
    }

    /// Connections samples are currently accepted from.
    pub fn connections(&self) -> Option<Connections> {
        *self.shared.lock_connections()
    }

    /// Accepts samples from new connections only and forgets the learned
    /// formats, since the new device may differ in resolution or
    /// orientation.
    #[instrument(skip(self))]
    pub fn reconnect(&self, connections: Connections) {
        let mut current = self.shared.lock_connections();
        *current = Some(connections);
        self.shared.formats.invalidate();
        drop(current);
        info!("StreamTap reconnected");
    }
}
