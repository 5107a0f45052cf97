use crate::RecorderError;

use std::{fmt, sync::Arc};

/// Lifecycle state of a recording session.
///
/// Equality compares the variant only: two `Idle` values are equal whether
/// or not they carry an error.
#[derive(Debug, Clone)]
pub enum RecordingStatus {
    /// Not recording. Carries the error that ended the last session, if any.
    Idle {
        /// Failure that returned the session to idle.
        error: Option<Arc<RecorderError>>,
    },
    /// Writer is preparing its tracks.
    StartingRecording,
    /// Samples are being appended to the current segment.
    Recording,
    /// Current segment is being finalized for a pause.
    Paused,
    /// Current segment is being finalized and merged for a stop.
    StoppingRecording,
}

impl RecordingStatus {
    /// Idle without an error.
    pub fn idle() -> Self {
        RecordingStatus::Idle { error: None }
    }

    /// Returns true for any `Idle` value.
    pub fn is_idle(&self) -> bool {
        matches!(self, RecordingStatus::Idle { .. })
    }

    /// Error carried by an `Idle` status.
    pub fn error(&self) -> Option<&Arc<RecorderError>> {
        match self {
            RecordingStatus::Idle { error } => error.as_ref(),
            _ => None,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            RecordingStatus::Idle { .. } => 0,
            RecordingStatus::StartingRecording => 1,
            RecordingStatus::Recording => 2,
            RecordingStatus::Paused => 3,
            RecordingStatus::StoppingRecording => 4,
        }
    }
}

impl Default for RecordingStatus {
    fn default() -> Self {
        Self::idle()
    }
}

impl PartialEq for RecordingStatus {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for RecordingStatus {}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingStatus::Idle { error: None } => f.write_str("idle"),
            RecordingStatus::Idle { error: Some(_) } => f.write_str("idle (failed)"),
            RecordingStatus::StartingRecording => f.write_str("starting"),
            RecordingStatus::Recording => f.write_str("recording"),
            RecordingStatus::Paused => f.write_str("paused"),
            RecordingStatus::StoppingRecording => f.write_str("stopping"),
        }
    }
}
