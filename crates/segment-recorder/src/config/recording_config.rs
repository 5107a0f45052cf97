use std::path::PathBuf;

use segment_recorder_core::MediaFormat;
use serde::{Deserialize, Serialize};

/// Output file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Final movie location. Segments are written next to it.
    pub destination: PathBuf,
    /// Container of the movie and its segments.
    #[serde(default = "default_format")]
    pub format: MediaFormat,
}

// The bundled merger only joins raw streams.
fn default_format() -> MediaFormat {
    MediaFormat::Raw
}
