use crate::config::{default_frame_interval_ms, default_preset, default_queue_capacity};

use std::time::Duration;

use segment_recorder_core::{DevicePosition, SimulatedDevices};
use serde::{Deserialize, Serialize};

/// Capture session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera to open at startup.
    #[serde(default)]
    pub position: DevicePosition,
    /// Session quality preset.
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Bound of each sample queue; late samples beyond it are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Interval between simulated frames (None = no generator).
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            position: DevicePosition::default(),
            preset: default_preset(),
            queue_capacity: default_queue_capacity(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl CaptureConfig {
    /// Devices of the simulated capture platform.
    pub fn simulated_devices(&self) -> SimulatedDevices {
        SimulatedDevices {
            frame_interval: self.frame_interval_ms.map(Duration::from_millis),
            ..SimulatedDevices::default()
        }
    }
}
