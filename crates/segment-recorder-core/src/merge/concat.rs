use crate::{
    CoreResult, RecorderError, merge::SegmentMerger, media::MediaFormat, recording::Segment,
};

use std::{panic::Location, path::Path};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, instrument};

/// Merges headerless streams by appending segment bytes in order.
///
/// Only [`MediaFormat::Raw`] can be merged this way; movie containers need a
/// format-aware merger.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatMerger;

#[async_trait]
impl SegmentMerger for ConcatMerger {
    #[instrument(skip(self, segments), fields(segment_count = segments.len()))]
    async fn merge(
        &self,
        segments: &[Segment],
        destination: &Path,
        format: MediaFormat,
    ) -> CoreResult<()> {
        if format != MediaFormat::Raw {
            return Err(RecorderError::MergeFailed {
                segment_count: segments.len(),
                destination: destination.to_path_buf(),
                reason: format!("{} containers cannot be merged by concatenation", format),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let io_error = |path: &Path, source: std::io::Error| RecorderError::Io {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        };

        let mut output = fs::File::create(destination)
            .await
            .map_err(|e| io_error(destination, e))?;

        let mut total_bytes = 0u64;
        for segment in segments {
            let mut input = fs::File::open(segment.path())
                .await
                .map_err(|e| io_error(segment.path(), e))?;

            let copied = tokio::io::copy(&mut input, &mut output)
                .await
                .map_err(|e| io_error(destination, e))?;

            debug!(path = ?segment.path(), bytes = copied, "Segment appended");
            total_bytes += copied;
        }

        output.flush().await.map_err(|e| io_error(destination, e))?;
        output
            .sync_all()
            .await
            .map_err(|e| io_error(destination, e))?;

        info!(destination = ?destination, total_bytes, "Segments merged");

        Ok(())
    }
}
