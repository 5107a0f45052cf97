mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod recording_config;

pub(crate) use {
    capture_config::CaptureConfig, config::Config, logging_config::LoggingConfig,
    recording_config::RecordingConfig,
};

pub(crate) const DEFAULT_PRESET: &str = "high";
pub(crate) const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;
pub(crate) const DEFAULT_LOG_FILTER: &str = "segment_recorder=info,segment_recorder_core=info";
pub(crate) const DEFAULT_FILE_NAME: &str = "recording.raw";

pub(crate) fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

pub(crate) fn default_queue_capacity() -> usize {
    segment_recorder_core::DEFAULT_QUEUE_CAPACITY
}

pub(crate) fn default_frame_interval_ms() -> Option<u64> {
    Some(DEFAULT_FRAME_INTERVAL_MS)
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
