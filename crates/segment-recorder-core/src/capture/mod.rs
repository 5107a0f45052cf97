//! Capture session management.
//!
//! [`CaptureBackend`] is the contract a platform capture framework has to
//! fulfil; [`CaptureSession`] drives it from a serial control thread.

mod session;
mod simulated;

pub use {
    session::CaptureSession,
    simulated::{SimulatedBackend, SimulatedDevices, SimulatedFeed},
};

use crate::{CoreResult, MediaKind, media::Connection, tap::SampleSink};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the device a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    /// Facing the user.
    Front,
    /// Facing away from the user.
    #[default]
    Back,
}

impl DevicePosition {
    /// The other camera.
    pub fn opposite(&self) -> Self {
        match self {
            DevicePosition::Front => DevicePosition::Back,
            DevicePosition::Back => DevicePosition::Front,
        }
    }
}

impl fmt::Display for DevicePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevicePosition::Front => f.write_str("front"),
            DevicePosition::Back => f.write_str("back"),
        }
    }
}

/// An acquired camera or microphone, ready to attach to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInput {
    /// Backend-specific unique identifier.
    pub id: String,
    /// Human-readable device name.
    pub name: String,
    /// Media the device produces.
    pub kind: MediaKind,
    /// Camera position; `None` for microphones.
    pub position: Option<DevicePosition>,
}

/// Operations a platform capture framework must provide.
///
/// All methods are invoked from the session control thread only.
pub trait CaptureBackend: Send + 'static {
    /// Acquires the camera at `position`.
    fn camera_input(&mut self, position: DevicePosition) -> CoreResult<DeviceInput>;

    /// Acquires the default microphone.
    fn microphone_input(&mut self) -> CoreResult<DeviceInput>;

    /// Applies a quality preset, e.g. `"high"` or `"1280x720"`.
    fn set_preset(&mut self, preset: &str);

    /// Opens a configuration transaction. Changes take effect on commit.
    fn begin_configuration(&mut self);

    /// Applies the changes made since `begin_configuration`.
    fn commit_configuration(&mut self);

    /// Attaches an input.
    fn add_input(&mut self, input: &DeviceInput) -> CoreResult<()>;

    /// Detaches an input. Unknown inputs are ignored.
    fn remove_input(&mut self, input: &DeviceInput);

    /// Attaches a data output delivering into `sink`.
    fn add_output(&mut self, sink: SampleSink) -> CoreResult<()>;

    /// Connection currently feeding the output of `kind`.
    fn connection(&self, kind: MediaKind) -> Option<Connection>;

    /// Starts the flow of samples.
    fn start_running(&mut self);

    /// Stops the flow of samples.
    fn stop_running(&mut self);

    /// Returns true while samples flow.
    fn is_running(&self) -> bool;
}
