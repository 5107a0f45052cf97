//! Segment merge service.

mod concat;

pub use concat::ConcatMerger;

use crate::{CoreResult, media::MediaFormat, recording::Segment};

use std::path::Path;

use async_trait::async_trait;

/// Joins finished segment files, in order, into one deliverable file.
#[async_trait]
pub trait SegmentMerger: Send + Sync {
    /// Writes the concatenation of `segments` to `destination`.
    ///
    /// Must not delete the segments; the recorder does that after a
    /// successful merge.
    async fn merge(
        &self,
        segments: &[Segment],
        destination: &Path,
        format: MediaFormat,
    ) -> CoreResult<()>;
}
