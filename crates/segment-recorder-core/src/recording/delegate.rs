use crate::RecorderError;

use std::{path::PathBuf, sync::Arc};

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// How a recording session ended.
#[derive(Debug, Clone)]
pub enum RecordingOutcome {
    /// The movie was written to `output`.
    Completed {
        /// Final movie location.
        output: PathBuf,
    },
    /// The session was aborted; no output was produced.
    Failed {
        /// Cause of the abort.
        error: Arc<RecorderError>,
    },
}

impl RecordingOutcome {
    /// Final movie location, absent when the session failed.
    pub fn output(&self) -> Option<&PathBuf> {
        match self {
            RecordingOutcome::Completed { output } => Some(output),
            RecordingOutcome::Failed { .. } => None,
        }
    }

    /// Failure cause, absent when the session completed.
    pub fn error(&self) -> Option<&Arc<RecorderError>> {
        match self {
            RecordingOutcome::Completed { .. } => None,
            RecordingOutcome::Failed { error } => Some(error),
        }
    }
}

/// Receiver of recording lifecycle notifications.
///
/// Called from a dedicated delegate task, never from the thread that
/// changed the status. Calls arrive in the order the transitions happened.
pub trait RecordingDelegate: Send + Sync {
    /// A start was accepted and the writer is being prepared.
    fn will_begin_recording(&self);

    /// The writer is prepared; samples are now recorded.
    fn did_begin_recording(&self);

    /// A stop was accepted while recording.
    fn will_finish_recording(&self);

    /// A pause was accepted; the current segment is being finalized.
    fn will_pause_recording(&self);

    /// The paused segment is on disk; the recorder is idle and resumable.
    fn did_pause_recording(&self);

    /// The session ended, either with a movie or with an error.
    fn did_finish_recording(&self, outcome: RecordingOutcome);
}

/// A single lifecycle notification, as queued for the delegate.
#[derive(Debug, Clone)]
pub enum RecordingNotification {
    /// See [`RecordingDelegate::will_begin_recording`].
    WillBeginRecording,
    /// See [`RecordingDelegate::did_begin_recording`].
    DidBeginRecording,
    /// See [`RecordingDelegate::will_finish_recording`].
    WillFinishRecording,
    /// See [`RecordingDelegate::will_pause_recording`].
    WillPauseRecording,
    /// See [`RecordingDelegate::did_pause_recording`].
    DidPauseRecording,
    /// See [`RecordingDelegate::did_finish_recording`].
    DidFinishRecording(RecordingOutcome),
}

impl RecordingNotification {
    fn deliver(self, delegate: &dyn RecordingDelegate) {
        match self {
            RecordingNotification::WillBeginRecording => delegate.will_begin_recording(),
            RecordingNotification::DidBeginRecording => delegate.did_begin_recording(),
            RecordingNotification::WillFinishRecording => delegate.will_finish_recording(),
            RecordingNotification::WillPauseRecording => delegate.will_pause_recording(),
            RecordingNotification::DidPauseRecording => delegate.did_pause_recording(),
            RecordingNotification::DidFinishRecording(outcome) => {
                delegate.did_finish_recording(outcome)
            }
        }
    }
}

/// Delegate that forwards every notification onto a channel.
///
/// Useful when the consumer is itself an async event loop.
#[derive(Debug, Clone)]
pub struct ChannelDelegate {
    tx: mpsc::UnboundedSender<RecordingNotification>,
}

impl ChannelDelegate {
    /// Creates the delegate and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RecordingNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, notification: RecordingNotification) {
        if self.tx.send(notification).is_err() {
            debug!("Notification receiver dropped");
        }
    }
}

impl RecordingDelegate for ChannelDelegate {
    fn will_begin_recording(&self) {
        self.forward(RecordingNotification::WillBeginRecording);
    }

    fn did_begin_recording(&self) {
        self.forward(RecordingNotification::DidBeginRecording);
    }

    fn will_finish_recording(&self) {
        self.forward(RecordingNotification::WillFinishRecording);
    }

    fn will_pause_recording(&self) {
        self.forward(RecordingNotification::WillPauseRecording);
    }

    fn did_pause_recording(&self) {
        self.forward(RecordingNotification::DidPauseRecording);
    }

    fn did_finish_recording(&self, outcome: RecordingOutcome) {
        self.forward(RecordingNotification::DidFinishRecording(outcome));
    }
}

/// Sending half of the delegate callback queue.
///
/// Notifications are pushed from whichever context changed the status and
/// delivered in FIFO order by a single task owning the delegate.
#[derive(Clone)]
pub(crate) struct Notifier {
    tx: mpsc::UnboundedSender<RecordingNotification>,
}

impl Notifier {
    /// Spawns the delegate task on `runtime`.
    pub(crate) fn spawn(
        runtime: &tokio::runtime::Handle,
        delegate: Arc<dyn RecordingDelegate>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<RecordingNotification>();

        runtime.spawn(async move {
            while let Some(notification) = rx.recv().await {
                notification.deliver(delegate.as_ref());
            }
            debug!("Delegate queue closed");
        });

        Self { tx }
    }

    pub(crate) fn notify(&self, notification: RecordingNotification) {
        if self.tx.send(notification).is_err() {
            warn!("Delegate queue closed, dropping notification");
        }
    }
}
