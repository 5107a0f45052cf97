use crate::media::VideoCodec;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of media carried by a connection or sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Camera frames.
    Video,
    /// Microphone buffers.
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Audio => f.write_str("audio"),
        }
    }
}

/// Container the writer produces and the merger consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// MPEG-4 movie.
    #[default]
    Mp4,
    /// QuickTime movie.
    QuickTime,
    /// iTunes video.
    M4v,
    /// Headerless byte stream of sample payloads.
    Raw,
}

impl MediaFormat {
    /// Filename extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::QuickTime => "mov",
            MediaFormat::M4v => "m4v",
            MediaFormat::Raw => "raw",
        }
    }

    /// Uniform type identifier handed to platform writers.
    pub fn file_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "public.mpeg-4",
            MediaFormat::QuickTime => "com.apple.quicktime-movie",
            MediaFormat::M4v => "com.apple.m4v-video",
            MediaFormat::Raw => "public.data",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Format of the samples flowing through one connection.
///
/// Changes whenever the active camera changes resolution or orientation,
/// which is why the stream tap relearns it after every reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatDescription {
    /// Uncompressed camera frames.
    Video {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
        /// Codec the frames are delivered in.
        codec: VideoCodec,
    },
    /// Linear PCM microphone buffers.
    Audio {
        /// Sample rate in Hz.
        sample_rate: u32,
        /// Number of interleaved channels.
        channels: u16,
    },
}

impl FormatDescription {
    /// Media kind described by this format.
    pub fn kind(&self) -> MediaKind {
        match self {
            FormatDescription::Video { .. } => MediaKind::Video,
            FormatDescription::Audio { .. } => MediaKind::Audio,
        }
    }
}
