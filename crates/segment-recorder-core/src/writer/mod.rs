//! Segment writer service.
//!
//! The recorder treats the writer as opaque: it hands over the track
//! configuration, appends samples while recording, and asks it to finish.
//! Each async operation resolves exactly once and its result is fed back
//! into the state machine.

mod stream_file;

pub use stream_file::{StreamFileWriter, StreamFileWriterFactory};

use crate::{
    CoreResult,
    media::{AudioSettings, FormatDescription, MediaFormat, MediaSample, VideoSettings},
};

use std::{path::Path, sync::Arc};

use async_trait::async_trait;

/// Source format and compression settings of a video track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTrack {
    /// Format of the frames that will be appended.
    pub source_format: FormatDescription,
    /// Output compression.
    pub settings: VideoSettings,
}

/// Source format and compression settings of an audio track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    /// Format of the buffers that will be appended.
    pub source_format: FormatDescription,
    /// Output compression.
    pub settings: AudioSettings,
}

/// Tracks to create before writing. A track is present only if its source
/// format was known when recording started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackConfiguration {
    /// Video track, if a video format was known.
    pub video: Option<VideoTrack>,
    /// Audio track, if an audio format was known.
    pub audio: Option<AudioTrack>,
}

impl TrackConfiguration {
    /// Returns true if no track is configured.
    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none()
    }
}

/// Writes samples to one segment file.
#[async_trait]
pub trait SegmentWriter: Send + Sync {
    /// Creates the configured tracks and opens the output file.
    async fn prepare(&self, tracks: &TrackConfiguration) -> CoreResult<()>;

    /// Appends one sample. Called from the per-kind sample queues on a
    /// blocking thread, one sample at a time per kind.
    fn append(&self, sample: &MediaSample) -> CoreResult<()>;

    /// Flushes and closes the output file.
    async fn finish(&self) -> CoreResult<()>;
}

/// Creates one writer per segment.
pub trait WriterFactory: Send + Sync {
    /// Creates a writer targeting `path`.
    fn create(&self, path: &Path, format: MediaFormat) -> CoreResult<Arc<dyn SegmentWriter>>;
}
