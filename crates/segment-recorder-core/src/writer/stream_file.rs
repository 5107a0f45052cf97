use crate::{
    CoreResult, MediaKind, RecorderError,
    media::{MediaFormat, MediaSample},
    writer::{SegmentWriter, TrackConfiguration, WriterFactory},
};

use std::{
    fs::File,
    io::{BufWriter, Write},
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

#[derive(Default)]
struct WriterState {
    file: Option<BufWriter<File>>,
    video: bool,
    audio: bool,
    samples_written: u64,
    bytes_written: u64,
}

/// Writes the payload of every appended sample, back to back, to a file.
///
/// Produces a headerless stream, so segments it writes can be joined with
/// [`ConcatMerger`](crate::ConcatMerger).
pub struct StreamFileWriter {
    path: PathBuf,
    state: Mutex<WriterState>,
}

impl StreamFileWriter {
    /// Creates a writer for `path`. Nothing is opened until `prepare`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(WriterState::default()),
        }
    }

    /// Output location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WriterState> {
        self.state.lock().unwrap_or_else(|e| {
            error!("Writer state lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

#[async_trait]
impl SegmentWriter for StreamFileWriter {
    #[instrument(skip(self, tracks), fields(path = ?self.path))]
    async fn prepare(&self, tracks: &TrackConfiguration) -> CoreResult<()> {
        if tracks.is_empty() {
            return Err(RecorderError::WriterFailed {
                reason: "no track source format known yet".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let file = tokio::fs::File::create(&self.path)
            .await
            .map_err(|source| RecorderError::Io {
                path: self.path.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?
            .into_std()
            .await;

        let mut state = self.lock();
        state.file = Some(BufWriter::new(file));
        state.video = tracks.video.is_some();
        state.audio = tracks.audio.is_some();

        info!(video = state.video, audio = state.audio, "Stream file writer prepared");

        Ok(())
    }

    #[track_caller]
    fn append(&self, sample: &MediaSample) -> CoreResult<()> {
        let mut state = self.lock();

        let accepted = match sample.kind() {
            MediaKind::Video => state.video,
            MediaKind::Audio => state.audio,
        };
        if !accepted {
            return Ok(());
        }

        // Samples racing a pause or stop may arrive after the file closed.
        let Some(file) = state.file.as_mut() else {
            debug!(kind = %sample.kind(), "Dropping sample appended after finish");
            return Ok(());
        };

        file.write_all(&sample.data)
            .map_err(|source| RecorderError::Io {
                path: self.path.clone(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        state.samples_written += 1;
        state.bytes_written += sample.data.len() as u64;

        Ok(())
    }

    #[instrument(skip(self), fields(path = ?self.path))]
    async fn finish(&self) -> CoreResult<()> {
        let (file, samples_written, bytes_written) = {
            let mut state = self.lock();
            (state.file.take(), state.samples_written, state.bytes_written)
        };

        let Some(file) = file else {
            debug!("Writer already finished");
            return Ok(());
        };

        let path = self.path.clone();
        let location = ErrorLocation::from(Location::caller());

        tokio::task::spawn_blocking(move || {
            file.into_inner()
                .map_err(|e| e.into_error())
                .and_then(|file| file.sync_all())
                .map_err(|source| RecorderError::Io {
                    path,
                    source,
                    location,
                })
        })
        .await
        .map_err(|e| RecorderError::WriterFailed {
            reason: format!("Finish task panicked: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })??;

        info!(samples_written, bytes_written, "Stream file writer finished");

        Ok(())
    }
}

/// Creates a [`StreamFileWriter`] per segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamFileWriterFactory;

impl WriterFactory for StreamFileWriterFactory {
    fn create(&self, path: &Path, format: MediaFormat) -> CoreResult<Arc<dyn SegmentWriter>> {
        debug!(path = ?path, %format, file_type = format.file_type(), "Creating stream file writer");
        Ok(Arc::new(StreamFileWriter::new(path)))
    }
}
