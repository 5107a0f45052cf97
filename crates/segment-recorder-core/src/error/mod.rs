use crate::MediaKind;

use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// No camera found at the requested position.
    #[error("No camera available at position {position} {location}")]
    CaptureDeviceUnavailable {
        /// Requested camera position.
        position: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No microphone found.
    #[error("No microphone available {location}")]
    AudioDeviceUnavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture session refused a device input.
    #[error("Capture session rejected input {device}: {reason} {location}")]
    InputRejected {
        /// Name of the device whose input was rejected.
        device: String,
        /// Description of the rejection.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture session refused a data output.
    #[error("Capture session rejected {kind} output {location}")]
    OutputRejected {
        /// Media kind of the rejected output.
        kind: MediaKind,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No connection exists for an attached output.
    #[error("No {kind} connection available {location}")]
    ConnectionUnavailable {
        /// Media kind of the missing connection.
        kind: MediaKind,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The segment writer failed to prepare, append or finish.
    #[error("Segment writer failed: {reason} {location}")]
    WriterFailed {
        /// Description of the writer failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Segments could not be merged into the destination.
    #[error("Merging {segment_count} segments into {destination:?} failed: {reason} {location}")]
    MergeFailed {
        /// Number of segments involved in the merge.
        segment_count: usize,
        /// Merge destination.
        destination: PathBuf,
        /// Description of the merge failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Filesystem operation on a recording file failed.
    #[error("IO error on {path:?}: {source} {location}")]
    Io {
        /// File the operation targeted.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The session control thread is gone.
    #[error("Capture session control queue unavailable {location}")]
    SessionUnavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recorder was constructed outside of a Tokio runtime.
    #[error("Tokio runtime unavailable: {reason} {location}")]
    RuntimeUnavailable {
        /// Description of the runtime error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
