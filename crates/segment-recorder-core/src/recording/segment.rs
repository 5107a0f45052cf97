use crate::media::MediaFormat;

use std::path::{Path, PathBuf};

/// One recorded file fragment, identified by where it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    path: PathBuf,
}

impl Segment {
    /// Wraps a segment file location.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the segment file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Derives the file name of segment `index` from the base destination.
///
/// `movie.mp4` with index 2 becomes `movie-segment2.mp4`. A destination
/// without the format's extension gets the suffix and extension appended.
pub fn segment_path(destination: &Path, format: MediaFormat, index: usize) -> PathBuf {
    let extension = format.extension();
    let file_name = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let dotted = format!(".{extension}");
    let stem = file_name.strip_suffix(&dotted).unwrap_or(&file_name);

    destination.with_file_name(format!("{stem}-segment{index}{dotted}"))
}

/// Ordered segments of the current session plus the path the writer
/// targets next.
#[derive(Debug, Clone)]
pub(crate) struct SegmentBook {
    destination: PathBuf,
    format: MediaFormat,
    current_destination: PathBuf,
    segments: Vec<Segment>,
}

impl SegmentBook {
    pub(crate) fn new(destination: PathBuf, format: MediaFormat) -> Self {
        Self {
            current_destination: destination.clone(),
            destination,
            format,
            segments: Vec::new(),
        }
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn current_destination(&self) -> &Path {
        &self.current_destination
    }

    /// Path the next segment will be stored at.
    pub(crate) fn next_segment_path(&self) -> PathBuf {
        segment_path(&self.destination, self.format, self.segments.len())
    }

    /// Opens a new segment for a resumed recording and points the writer
    /// at it.
    pub(crate) fn open_segment(&mut self) -> PathBuf {
        let path = self.next_segment_path();
        self.segments.push(Segment::new(path.clone()));
        self.current_destination = path.clone();
        path
    }

    /// Records an already written file as the next segment.
    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Empties the book and returns the segments that were in it.
    pub(crate) fn reset(&mut self) -> Vec<Segment> {
        self.current_destination = self.destination.clone();
        std::mem::take(&mut self.segments)
    }
}
