//! Capture backend producing synthetic samples, for tests and demos
//! without camera hardware.

use crate::{
    CoreResult, MediaKind, RecorderError,
    capture::{CaptureBackend, DeviceInput, DevicePosition},
    media::{Connection, FormatDescription, MediaSample, VideoCodec},
    tap::SampleSink,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, warn};

const VIDEO_PAYLOAD_BYTES: usize = 64;
const AUDIO_PAYLOAD_BYTES: usize = 1024;
const AUDIO_SAMPLE_RATE: u32 = 44_100;
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);
// 512 mono 16-bit frames per buffer.
const AUDIO_BUFFER_DURATION: Duration = Duration::from_micros(11_610);

/// Devices the simulated platform pretends to have.
#[derive(Debug, Clone)]
pub struct SimulatedDevices {
    /// A user-facing camera exists.
    pub front_camera: bool,
    /// A rear camera exists.
    pub back_camera: bool,
    /// A microphone exists.
    pub microphone: bool,
    /// Generate samples on a background thread at this interval while
    /// running. `None` leaves sample emission to [`SimulatedFeed`].
    pub frame_interval: Option<Duration>,
}

impl Default for SimulatedDevices {
    fn default() -> Self {
        Self {
            front_camera: true,
            back_camera: true,
            microphone: true,
            frame_interval: None,
        }
    }
}

#[derive(Debug, Default)]
struct FeedState {
    running: bool,
    video_sink: Option<SampleSink>,
    audio_sink: Option<SampleSink>,
    video_connection: Option<Connection>,
    audio_connection: Option<Connection>,
    camera_position: Option<DevicePosition>,
    frame_interval: Option<Duration>,
    video_frames: u64,
    audio_buffers: u64,
}

/// Handle for pushing synthetic samples through a [`SimulatedBackend`].
///
/// Samples are only emitted while the backend is running and the
/// corresponding output is connected, as real hardware would.
#[derive(Debug, Clone, Default)]
pub struct SimulatedFeed {
    state: Arc<Mutex<FeedState>>,
}

impl SimulatedFeed {
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|e| {
            error!("Simulated feed lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    /// Emits one camera frame. Returns true if it was queued.
    pub fn emit_video(&self) -> bool {
        let (sink, sample) = {
            let mut state = self.lock();
            if !state.running {
                return false;
            }
            let (Some(sink), Some(connection), Some(position)) = (
                state.video_sink.clone(),
                state.video_connection,
                state.camera_position,
            ) else {
                return false;
            };

            let index = state.video_frames;
            state.video_frames += 1;
            let interval = state.frame_interval.unwrap_or(DEFAULT_FRAME_INTERVAL);

            let (width, height) = match position {
                DevicePosition::Back => (1920, 1080),
                DevicePosition::Front => (1280, 720),
            };

            let sample = MediaSample {
                connection: connection.id(),
                timestamp: interval.saturating_mul(index as u32),
                format: FormatDescription::Video {
                    width,
                    height,
                    codec: VideoCodec::Bgra,
                },
                data: vec![(index % 256) as u8; VIDEO_PAYLOAD_BYTES],
            };
            (sink, sample)
        };

        sink.deliver(sample)
    }

    /// Emits one microphone buffer. Returns true if it was queued.
    pub fn emit_audio(&self) -> bool {
        let (sink, sample) = {
            let mut state = self.lock();
            if !state.running {
                return false;
            }
            let (Some(sink), Some(connection)) =
                (state.audio_sink.clone(), state.audio_connection)
            else {
                return false;
            };

            let index = state.audio_buffers;
            state.audio_buffers += 1;

            let sample = MediaSample {
                connection: connection.id(),
                timestamp: AUDIO_BUFFER_DURATION.saturating_mul(index as u32),
                format: FormatDescription::Audio {
                    sample_rate: AUDIO_SAMPLE_RATE,
                    channels: 1,
                },
                data: vec![(index % 256) as u8; AUDIO_PAYLOAD_BYTES],
            };
            (sink, sample)
        };

        sink.deliver(sample)
    }

    /// Connection currently feeding the video output.
    pub fn video_connection(&self) -> Option<Connection> {
        self.lock().video_connection
    }

    /// Connection currently feeding the audio output.
    pub fn audio_connection(&self) -> Option<Connection> {
        self.lock().audio_connection
    }
}

struct Generator {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// In-memory [`CaptureBackend`].
///
/// Enforces the same rules a real session does: one input per media kind,
/// one output per media kind, and new connections whenever the inputs
/// change.
pub struct SimulatedBackend {
    devices: SimulatedDevices,
    feed: SimulatedFeed,
    inputs: Vec<DeviceInput>,
    configuring: bool,
    preset: String,
    generator: Option<Generator>,
}

impl SimulatedBackend {
    /// Creates a backend with the given devices.
    pub fn new(devices: SimulatedDevices) -> Self {
        let feed = SimulatedFeed::default();
        feed.lock().frame_interval = devices.frame_interval;

        Self {
            devices,
            feed,
            inputs: Vec::new(),
            configuring: false,
            preset: String::new(),
            generator: None,
        }
    }

    /// Handle for emitting samples manually.
    pub fn feed(&self) -> SimulatedFeed {
        self.feed.clone()
    }

    fn has_input(&self, kind: MediaKind) -> bool {
        self.inputs.iter().any(|input| input.kind == kind)
    }

    fn rebuild_connections(&mut self) {
        if self.configuring {
            return;
        }

        let video = self.has_input(MediaKind::Video);
        let audio = self.has_input(MediaKind::Audio);
        let camera_position = self
            .inputs
            .iter()
            .find(|input| input.kind == MediaKind::Video)
            .and_then(|input| input.position);

        let mut state = self.feed.lock();
        state.video_connection = (video && state.video_sink.is_some())
            .then(|| Connection::new(MediaKind::Video));
        state.audio_connection = (audio && state.audio_sink.is_some())
            .then(|| Connection::new(MediaKind::Audio));
        state.camera_position = camera_position;

        debug!(
            video = state.video_connection.is_some(),
            audio = state.audio_connection.is_some(),
            "Simulated connections rebuilt"
        );
    }
}

impl CaptureBackend for SimulatedBackend {
    #[track_caller]
    fn camera_input(&mut self, position: DevicePosition) -> CoreResult<DeviceInput> {
        let available = match position {
            DevicePosition::Front => self.devices.front_camera,
            DevicePosition::Back => self.devices.back_camera,
        };

        if !available {
            return Err(RecorderError::CaptureDeviceUnavailable {
                position: position.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(DeviceInput {
            id: format!("simulated-camera-{position}"),
            name: format!("Simulated {position} camera"),
            kind: MediaKind::Video,
            position: Some(position),
        })
    }

    #[track_caller]
    fn microphone_input(&mut self) -> CoreResult<DeviceInput> {
        if !self.devices.microphone {
            return Err(RecorderError::AudioDeviceUnavailable {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(DeviceInput {
            id: "simulated-microphone".to_string(),
            name: "Simulated microphone".to_string(),
            kind: MediaKind::Audio,
            position: None,
        })
    }

    fn set_preset(&mut self, preset: &str) {
        self.preset = preset.to_string();
    }

    fn begin_configuration(&mut self) {
        self.configuring = true;
    }

    fn commit_configuration(&mut self) {
        self.configuring = false;
        self.rebuild_connections();
    }

    #[track_caller]
    fn add_input(&mut self, input: &DeviceInput) -> CoreResult<()> {
        if self.has_input(input.kind) {
            return Err(RecorderError::InputRejected {
                device: input.name.clone(),
                reason: format!("a {} input is already attached", input.kind),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.inputs.push(input.clone());
        self.rebuild_connections();
        Ok(())
    }

    fn remove_input(&mut self, input: &DeviceInput) {
        self.inputs.retain(|attached| attached.id != input.id);
        self.rebuild_connections();
    }

    #[track_caller]
    fn add_output(&mut self, sink: SampleSink) -> CoreResult<()> {
        {
            let mut state = self.feed.lock();
            let slot = match sink.kind() {
                MediaKind::Video => &mut state.video_sink,
                MediaKind::Audio => &mut state.audio_sink,
            };
            if slot.is_some() {
                return Err(RecorderError::OutputRejected {
                    kind: sink.kind(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            *slot = Some(sink);
        }

        self.rebuild_connections();
        Ok(())
    }

    fn connection(&self, kind: MediaKind) -> Option<Connection> {
        match kind {
            MediaKind::Video => self.feed.video_connection(),
            MediaKind::Audio => self.feed.audio_connection(),
        }
    }

    fn start_running(&mut self) {
        if self.feed.lock().running {
            return;
        }
        self.feed.lock().running = true;

        if let Some(interval) = self.devices.frame_interval {
            let stop = Arc::new(AtomicBool::new(false));
            let feed = self.feed.clone();
            let thread_stop = Arc::clone(&stop);

            let spawned = thread::Builder::new()
                .name("simulated-capture".to_string())
                .spawn(move || {
                    while !thread_stop.load(Ordering::Acquire) {
                        feed.emit_video();
                        feed.emit_audio();
                        thread::sleep(interval);
                    }
                });

            match spawned {
                Ok(thread) => self.generator = Some(Generator { stop, thread }),
                Err(e) => warn!(error = %e, "Failed to spawn sample generator"),
            }
        }

        info!(preset = %self.preset, "Simulated capture running");
    }

    fn stop_running(&mut self) {
        self.feed.lock().running = false;

        if let Some(generator) = self.generator.take() {
            generator.stop.store(true, Ordering::Release);
            if generator.thread.join().is_err() {
                error!("Sample generator thread panicked");
            }
        }

        info!("Simulated capture stopped");
    }

    fn is_running(&self) -> bool {
        self.feed.lock().running
    }
}
