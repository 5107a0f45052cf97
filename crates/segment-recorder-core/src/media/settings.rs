use serde::{Deserialize, Serialize};

/// Video codec for captured or encoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264 / AVC.
    #[default]
    H264,
    /// H.265 / HEVC.
    Hevc,
    /// Uncompressed BGRA frames.
    Bgra,
}

/// Audio codec for encoded tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// MPEG-4 AAC.
    #[default]
    Aac,
    /// Linear PCM.
    Pcm,
}

/// Video track compression parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Output codec.
    #[serde(default)]
    pub codec: VideoCodec,
    /// Average bitrate in bits per second.
    #[serde(default = "default_video_bitrate")]
    pub bitrate: u32,
    /// Maximum frames between keyframes.
    #[serde(default = "default_keyframe_interval")]
    pub keyframe_interval: u32,
    /// Output width; `None` keeps the source width.
    #[serde(default)]
    pub width: Option<u32>,
    /// Output height; `None` keeps the source height.
    #[serde(default)]
    pub height: Option<u32>,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            codec: VideoCodec::default(),
            bitrate: default_video_bitrate(),
            keyframe_interval: default_keyframe_interval(),
            width: None,
            height: None,
        }
    }
}

/// Audio track compression parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Output codec.
    #[serde(default)]
    pub codec: AudioCodec,
    /// Output sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Output channel count.
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Average bitrate in bits per second.
    #[serde(default = "default_audio_bitrate")]
    pub bitrate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            codec: AudioCodec::default(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            bitrate: default_audio_bitrate(),
        }
    }
}

fn default_video_bitrate() -> u32 {
    6_000_000
}

fn default_keyframe_interval() -> u32 {
    30
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_channels() -> u16 {
    1
}

fn default_audio_bitrate() -> u32 {
    64_000
}
