mod format;
mod sample;
mod settings;

pub use {
    format::{FormatDescription, MediaFormat, MediaKind},
    sample::{Connection, ConnectionId, MediaSample},
    settings::{AudioCodec, AudioSettings, VideoCodec, VideoSettings},
};
