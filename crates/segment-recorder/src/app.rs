use crate::{AppCommand, AppError, AppResult, config::Config};

use std::{io::BufRead, panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use segment_recorder_core::{
    CameraRecorder, ChannelDelegate, ConcatMerger, RecordingNotification, RecordingOutcome,
    RecordingStatus, SimulatedBackend, StreamFileWriterFactory,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};

const FINISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Main application state.
///
/// Owns the recorder and reacts to terminal commands and recorder
/// notifications from a single event loop.
pub struct App {
    pub(crate) recorder: CameraRecorder<SimulatedBackend>,
    pub(crate) notifications: mpsc::UnboundedReceiver<RecordingNotification>,
}

impl App {
    /// Builds the recorder described by `config`. Must be called inside the
    /// Tokio runtime.
    #[track_caller]
    #[instrument(skip(config), fields(destination = ?config.recording.destination))]
    pub(crate) fn new(config: &Config) -> AppResult<Self> {
        if let Some(dir) = config.recording.destination.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let (delegate, notifications) = ChannelDelegate::new();
        let recorder = CameraRecorder::new(
            SimulatedBackend::new(config.capture.simulated_devices()),
            config.recorder_options(),
            Arc::new(StreamFileWriterFactory),
            Arc::new(ConcatMerger),
            Arc::new(delegate),
        )?;

        Ok(Self {
            recorder,
            notifications,
        })
    }

    /// Run the main application event loop until `Shutdown` arrives or the
    /// command channel closes.
    ///
    /// Requires the multi-thread runtime: starting, stopping and swapping
    /// capture wait on the session thread through `block_in_place`.
    #[instrument(skip_all)]
    pub(crate) async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<AppCommand>,
    ) -> AppResult<()> {
        info!("Segment recorder starting");
        tokio::task::block_in_place(|| self.recorder.start_running())?;

        loop {
            tokio::select! {
                Some(notification) = self.notifications.recv() => {
                    Self::report(&notification);
                }

                command = command_rx.recv() => {
                    match command {
                        Some(AppCommand::Shutdown) | None => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(cmd) => {
                            if let Err(e) = self.handle_command(cmd) {
                                error!(command = ?cmd, error = ?e, "Command failed");
                            }
                        }
                    }
                }
            }
        }

        self.shutdown().await
    }

    #[instrument(skip(self))]
    fn handle_command(&mut self, cmd: AppCommand) -> AppResult<()> {
        let accepted = match cmd {
            AppCommand::StartRecording => self.recorder.start_recording(),
            AppCommand::PauseRecording => self.recorder.pause(),
            AppCommand::StopRecording => self.recorder.stop_recording(),
            AppCommand::SwapCamera => {
                let position =
                    tokio::task::block_in_place(|| self.recorder.swap_capture_device_position())?;
                println!("camera: {position}");
                true
            }
            AppCommand::Status => {
                println!(
                    "status: {} ({} segment(s), camera {})",
                    self.recorder.status(),
                    self.recorder.segments().len(),
                    self.recorder.position()
                );
                true
            }
            AppCommand::Shutdown => true,
        };

        if !accepted {
            warn!(
                command = ?cmd,
                status = %self.recorder.status(),
                "Command ignored in current status"
            );
            println!("ignored: {:?} while {}", cmd, self.recorder.status());
        }

        Ok(())
    }

    fn report(notification: &RecordingNotification) {
        debug!(notification = ?notification, "Recorder notification");
        match notification {
            RecordingNotification::WillBeginRecording => {}
            RecordingNotification::DidBeginRecording => println!("recording"),
            RecordingNotification::WillFinishRecording => println!("finishing"),
            RecordingNotification::WillPauseRecording => {}
            RecordingNotification::DidPauseRecording => println!("paused"),
            RecordingNotification::DidFinishRecording(RecordingOutcome::Completed { output }) => {
                info!(output = ?output, "Movie written");
                println!("saved: {}", output.display());
            }
            RecordingNotification::DidFinishRecording(RecordingOutcome::Failed { error }) => {
                error!(error = %error, "Recording failed");
                println!("failed: {error}");
            }
        }
    }

    /// Stops capture, finishing any recording first and waiting for its
    /// movie to be written.
    async fn shutdown(mut self) -> AppResult<()> {
        let status = self.recorder.status();
        let expect_finish = match status {
            RecordingStatus::Recording | RecordingStatus::StoppingRecording => true,
            RecordingStatus::Idle { .. } => !self.recorder.segments().is_empty(),
            RecordingStatus::StartingRecording | RecordingStatus::Paused => {
                warn!(%status, "Shutting down during a transition, recording is abandoned");
                false
            }
        };

        tokio::task::block_in_place(|| self.recorder.stop_running())?;

        if expect_finish {
            let waited = tokio::time::timeout(FINISH_TIMEOUT, async {
                while let Some(notification) = self.notifications.recv().await {
                    Self::report(&notification);
                    if matches!(notification, RecordingNotification::DidFinishRecording(_)) {
                        break;
                    }
                }
            })
            .await;

            if waited.is_err() {
                warn!(
                    timeout_secs = FINISH_TIMEOUT.as_secs(),
                    "Recording did not finish before shutdown"
                );
            }
        }

        info!("Segment recorder shut down successfully");
        Ok(())
    }
}

/// Forwards parsed stdin lines to the application on a blocking task.
///
/// End of input is forwarded as [`AppCommand::Shutdown`]. The loop ends when
/// the receiver is dropped.
pub(crate) fn spawn_stdin_reader(
    command_tx: mpsc::Sender<AppCommand>,
) -> JoinHandle<AppResult<()>> {
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match AppCommand::parse(&line) {
                Some(cmd) => {
                    if command_tx.blocking_send(cmd).is_err() {
                        return Ok(());
                    }
                }
                None => println!(
                    "unknown command: {} (start, pause, stop, swap, status, quit)",
                    line.trim()
                ),
            }
        }

        command_tx
            .blocking_send(AppCommand::Shutdown)
            .map_err(|e| AppError::ChannelSendFailed {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    })
}
