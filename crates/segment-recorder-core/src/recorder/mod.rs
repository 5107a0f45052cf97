use crate::{
    CoreResult, MediaKind,
    capture::{CaptureBackend, CaptureSession, DevicePosition},
    merge::SegmentMerger,
    recording::{Attributes, RecordingCoordinator, RecordingDelegate, RecordingStatus, Segment},
    tap::{FormatRegistry, StreamTap},
    writer::WriterFactory,
};

use std::sync::Arc;

use tracing::{info, instrument};

/// Default bound of each sample queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Everything needed to build a [`CameraRecorder`] besides its services.
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    /// Output configuration.
    pub attributes: Attributes,
    /// Capture quality preset handed to the backend.
    pub preset: String,
    /// Camera to start with.
    pub position: DevicePosition,
    /// Bound of each sample queue.
    pub queue_capacity: usize,
}

impl RecorderOptions {
    /// Options with the rear camera, the `"high"` preset and the default
    /// queue capacity.
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            preset: "high".to_string(),
            position: DevicePosition::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Camera-to-file recorder.
///
/// Wires a [`CaptureSession`] to a [`RecordingCoordinator`] through a
/// [`StreamTap`].
///
/// # Example
///
/// ```no_run
/// use segment_recorder_core::{
///     Attributes, CameraRecorder, ChannelDelegate, ConcatMerger, CoreResult, MediaFormat,
///     RecorderOptions, SimulatedBackend, SimulatedDevices, StreamFileWriterFactory,
/// };
///
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> CoreResult<()> {
///     let (delegate, mut notifications) = ChannelDelegate::new();
///     let attributes = Attributes::new("/tmp/movie.raw", MediaFormat::Raw);
///
///     let recorder = CameraRecorder::new(
///         SimulatedBackend::new(SimulatedDevices::default()),
///         RecorderOptions::new(attributes),
///         Arc::new(StreamFileWriterFactory),
///         Arc::new(ConcatMerger),
///         Arc::new(delegate),
///     )?;
///
///     recorder.start_running()?;
///     recorder.start_recording();
///     // ...
///     recorder.stop_recording();
///
///     while let Some(notification) = notifications.recv().await {
///         println!("{:?}", notification);
///     }
///     Ok(())
/// }
/// ```
pub struct CameraRecorder<B: CaptureBackend> {
    session: CaptureSession<B>,
    tap: StreamTap,
    coordinator: RecordingCoordinator,
}

impl<B: CaptureBackend> CameraRecorder<B> {
    /// Acquires the devices, attaches video and audio outputs and binds
    /// their connections to a new stream tap.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if a device is missing, the backend rejects an input or
    /// output, or no runtime is available.
    #[track_caller]
    #[instrument(skip_all, fields(destination = ?options.attributes.destination))]
    pub fn new(
        backend: B,
        options: RecorderOptions,
        factory: Arc<dyn WriterFactory>,
        merger: Arc<dyn SegmentMerger>,
        delegate: Arc<dyn RecordingDelegate>,
    ) -> CoreResult<Self> {
        let session = CaptureSession::new(backend, &options.preset, options.position)?;

        let formats = FormatRegistry::new();
        let coordinator = RecordingCoordinator::new(
            options.attributes,
            formats.clone(),
            factory,
            merger,
            delegate,
        )?;
        let tap = StreamTap::new(formats, coordinator.clone(), options.queue_capacity)?;

        session.add_output(tap.sink(MediaKind::Video))?;
        session.add_output(tap.sink(MediaKind::Audio))?;
        tap.reconnect(session.connections()?);

        info!("CameraRecorder initialized");

        Ok(Self {
            session,
            tap,
            coordinator,
        })
    }

    /// Starts capture. Blocks until the backend runs.
    #[track_caller]
    pub fn start_running(&self) -> CoreResult<()> {
        self.session.start_running()
    }

    /// Stops any recording, then stops capture. Blocks until the backend
    /// has stopped.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_running(&self) -> CoreResult<()> {
        self.coordinator.stop_recording();
        self.session.stop_running()
    }

    /// Returns true while capture runs.
    #[track_caller]
    pub fn is_running(&self) -> CoreResult<bool> {
        self.session.is_running()
    }

    /// Switches between front and rear camera and rebinds the stream tap.
    ///
    /// The next video frame is treated as a warm-up frame, and the formats
    /// learned from the previous device are forgotten.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn swap_capture_device_position(&mut self) -> CoreResult<DevicePosition> {
        let position = self.session.swap_capture_device_position()?;
        self.tap.reconnect(self.session.connections()?);
        Ok(position)
    }

    /// Position of the active camera.
    pub fn position(&self) -> DevicePosition {
        self.session.position()
    }

    /// See [`RecordingCoordinator::start_recording`].
    pub fn start_recording(&self) -> bool {
        self.coordinator.start_recording()
    }

    /// See [`RecordingCoordinator::pause`].
    pub fn pause(&self) -> bool {
        self.coordinator.pause()
    }

    /// See [`RecordingCoordinator::stop_recording`].
    pub fn stop_recording(&self) -> bool {
        self.coordinator.stop_recording()
    }

    /// Current recording status.
    pub fn status(&self) -> RecordingStatus {
        self.coordinator.status()
    }

    /// Segments accumulated in the current session.
    pub fn segments(&self) -> Vec<Segment> {
        self.coordinator.segments()
    }

    /// The underlying state machine.
    pub fn coordinator(&self) -> &RecordingCoordinator {
        &self.coordinator
    }

    /// The capture session.
    pub fn session(&self) -> &CaptureSession<B> {
        &self.session
    }
}
