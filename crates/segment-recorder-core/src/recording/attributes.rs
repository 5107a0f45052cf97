use crate::media::{AudioSettings, MediaFormat, VideoSettings};

use std::path::PathBuf;

/// Output configuration for one recorder.
///
/// Fixed for the lifetime of a session. Segment files are named after
/// `destination` (see [`segment_path`](crate::segment_path)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Final movie location.
    pub destination: PathBuf,
    /// Container written to `destination` and to every segment.
    pub format: MediaFormat,
    /// Video track compression parameters.
    pub video: VideoSettings,
    /// Audio track compression parameters.
    pub audio: AudioSettings,
}

impl Attributes {
    /// Attributes with default compression settings.
    pub fn new(destination: impl Into<PathBuf>, format: MediaFormat) -> Self {
        Self {
            destination: destination.into(),
            format,
            video: VideoSettings::default(),
            audio: AudioSettings::default(),
        }
    }
}
