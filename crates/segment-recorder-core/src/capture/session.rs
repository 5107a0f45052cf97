use crate::{
    CoreResult, MediaKind, RecorderError,
    capture::{CaptureBackend, DeviceInput, DevicePosition},
    tap::{Connections, SampleSink},
};

use std::{
    panic::Location,
    sync::mpsc,
    thread::{self, JoinHandle},
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

type Job<B> = Box<dyn FnOnce(&mut B) + Send>;

/// Serial queue owning the backend. Every backend call runs on its thread.
struct SessionQueue<B: CaptureBackend> {
    tx: Option<mpsc::Sender<Job<B>>>,
    thread: Option<JoinHandle<()>>,
}

impl<B: CaptureBackend> SessionQueue<B> {
    #[track_caller]
    fn spawn(mut backend: B) -> CoreResult<Self> {
        let (tx, rx) = mpsc::channel::<Job<B>>();

        let thread = thread::Builder::new()
            .name("capture-session".to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job(&mut backend);
                }
                if backend.is_running() {
                    backend.stop_running();
                }
                debug!("Capture session queue closed");
            })
            .map_err(|e| {
                error!(error = %e, "Failed to spawn capture session thread");
                RecorderError::SessionUnavailable {
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }

    /// Runs `job` on the queue and waits for its result.
    #[track_caller]
    fn run_sync<T, F>(&self, job: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut B) -> T + Send + 'static,
    {
        let unavailable = || RecorderError::SessionUnavailable {
            location: ErrorLocation::from(Location::caller()),
        };

        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        let task: Job<B> = Box::new(move |backend| {
            let _ = reply_tx.send(job(backend));
        });

        self.tx
            .as_ref()
            .ok_or_else(unavailable)?
            .send(task)
            .map_err(|_| unavailable())?;

        reply_rx.recv().map_err(|_| unavailable())
    }
}

impl<B: CaptureBackend> Drop for SessionQueue<B> {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Capture session thread panicked");
            }
        }
    }
}

/// Owns the camera and microphone inputs of a capture backend.
///
/// Backend calls are serialized on a dedicated control thread. Only
/// [`start_running`](Self::start_running) and
/// [`stop_running`](Self::stop_running) are meant to be called from a
/// thread that may wait for the hardware.
pub struct CaptureSession<B: CaptureBackend> {
    queue: SessionQueue<B>,
    position: DevicePosition,
    camera: DeviceInput,
    microphone: DeviceInput,
    preset: String,
}

impl<B: CaptureBackend> CaptureSession<B> {
    /// Acquires the camera at `position` and the microphone and attaches
    /// both to the backend.
    ///
    /// # Errors
    ///
    /// Returns error if a device is missing or the backend rejects an input.
    #[track_caller]
    #[instrument(skip(backend))]
    pub fn new(backend: B, preset: &str, position: DevicePosition) -> CoreResult<Self> {
        let queue = SessionQueue::spawn(backend)?;

        let preset_owned = preset.to_string();
        let (camera, microphone) = queue.run_sync(
            move |backend: &mut B| -> CoreResult<(DeviceInput, DeviceInput)> {
                backend.set_preset(&preset_owned);
                let camera = backend.camera_input(position)?;
                let microphone = backend.microphone_input()?;
                backend.add_input(&camera)?;
                backend.add_input(&microphone)?;
                Ok((camera, microphone))
            },
        )??;

        info!(
            camera = %camera.name,
            microphone = %microphone.name,
            %position,
            "CaptureSession initialized"
        );

        Ok(Self {
            queue,
            position,
            camera,
            microphone,
            preset: preset.to_string(),
        })
    }

    /// Position of the active camera.
    pub fn position(&self) -> DevicePosition {
        self.position
    }

    /// Active camera input.
    pub fn camera(&self) -> &DeviceInput {
        &self.camera
    }

    /// Active microphone input.
    pub fn microphone(&self) -> &DeviceInput {
        &self.microphone
    }

    /// Quality preset the session was configured with.
    pub fn preset(&self) -> &str {
        &self.preset
    }

    /// Attaches a data output that delivers into `sink`.
    #[track_caller]
    #[instrument(skip(self, sink), fields(kind = %sink.kind()))]
    pub fn add_output(&self, sink: SampleSink) -> CoreResult<()> {
        self.queue.run_sync(move |backend| backend.add_output(sink))?
    }

    /// Current video and audio connections.
    ///
    /// # Errors
    ///
    /// Returns error if an output is not attached or has no input feeding it.
    #[track_caller]
    pub fn connections(&self) -> CoreResult<Connections> {
        let (video, audio) = self.queue.run_sync(|backend| {
            (
                backend.connection(MediaKind::Video),
                backend.connection(MediaKind::Audio),
            )
        })?;

        let missing = |kind| RecorderError::ConnectionUnavailable {
            kind,
            location: ErrorLocation::from(Location::caller()),
        };

        Ok(Connections {
            video: video.ok_or_else(|| missing(MediaKind::Video))?,
            audio: audio.ok_or_else(|| missing(MediaKind::Audio))?,
        })
    }

    /// Starts capture and waits until the backend is running.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_running(&self) -> CoreResult<()> {
        self.queue.run_sync(|backend| backend.start_running())?;
        info!("Capture session running");
        Ok(())
    }

    /// Stops capture and waits until the backend has stopped.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_running(&self) -> CoreResult<()> {
        self.queue.run_sync(|backend| backend.stop_running())?;
        info!("Capture session stopped");
        Ok(())
    }

    /// Returns true while the backend delivers samples.
    #[track_caller]
    pub fn is_running(&self) -> CoreResult<bool> {
        self.queue.run_sync(|backend| backend.is_running())
    }

    /// Replaces camera and microphone with the opposite camera and a fresh
    /// microphone inside one configuration transaction.
    ///
    /// Connections change as a result; callers must rebuild whatever was
    /// bound to the old ones. If the new inputs cannot be attached the old
    /// ones are restored and the error returned.
    #[track_caller]
    #[instrument(skip(self), fields(from = %self.position))]
    pub fn swap_capture_device_position(&mut self) -> CoreResult<DevicePosition> {
        let position = self.position.opposite();
        let old_camera = self.camera.clone();
        let old_microphone = self.microphone.clone();

        let (camera, microphone) = self.queue.run_sync(
            move |backend: &mut B| -> CoreResult<(DeviceInput, DeviceInput)> {
                let camera = backend.camera_input(position)?;
                let microphone = backend.microphone_input()?;

                backend.begin_configuration();
                backend.remove_input(&old_camera);
                backend.remove_input(&old_microphone);

                let attached = backend
                    .add_input(&camera)
                    .and_then(|()| backend.add_input(&microphone));

                if let Err(e) = attached {
                    backend.remove_input(&camera);
                    backend.remove_input(&microphone);
                    if let Err(restore) = backend
                        .add_input(&old_camera)
                        .and_then(|()| backend.add_input(&old_microphone))
                    {
                        error!(error = %restore, "Failed to restore previous inputs");
                    }
                    backend.commit_configuration();
                    return Err(e);
                }

                backend.commit_configuration();
                Ok((camera, microphone))
            },
        )??;

        info!(camera = %camera.name, %position, "Capture device swapped");

        self.position = position;
        self.camera = camera;
        self.microphone = microphone;

        Ok(position)
    }
}
