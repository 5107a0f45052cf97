//! Segment Recorder Core Library
//!
//! Camera-to-file recording with pause and resume. A recording state
//! machine drives an opaque segment writer; each pause closes a segment
//! file, and stopping merges all segments into the destination.
//!
//! # Example
//!
//! ```no_run
//! use segment_recorder_core::{
//!     Attributes, ChannelDelegate, ConcatMerger, CoreResult, FormatRegistry, MediaFormat,
//!     RecordingCoordinator, StreamFileWriterFactory,
//! };
//!
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let (delegate, mut notifications) = ChannelDelegate::new();
//!
//!     let coordinator = RecordingCoordinator::new(
//!         Attributes::new("/tmp/movie.raw", MediaFormat::Raw),
//!         FormatRegistry::new(),
//!         Arc::new(StreamFileWriterFactory),
//!         Arc::new(ConcatMerger),
//!         Arc::new(delegate),
//!     )?;
//!
//!     coordinator.start_recording();
//!     let first = notifications.recv().await;
//!     println!("{:?}", first);
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod media;
mod merge;
mod recorder;
mod recording;
mod tap;
mod writer;

pub use {
    capture::{
        CaptureBackend, CaptureSession, DeviceInput, DevicePosition, SimulatedBackend,
        SimulatedDevices, SimulatedFeed,
    },
    error::RecorderError,
    error::Result as CoreResult,
    media::{
        AudioCodec, AudioSettings, Connection, ConnectionId, FormatDescription, MediaFormat,
        MediaKind, MediaSample, VideoCodec, VideoSettings,
    },
    merge::{ConcatMerger, SegmentMerger},
    recorder::{CameraRecorder, DEFAULT_QUEUE_CAPACITY, RecorderOptions},
    recording::{
        Attributes, ChannelDelegate, IllegalTransition, RecordingCoordinator, RecordingDelegate,
        RecordingEvent, RecordingNotification, RecordingOutcome, RecordingStatus, Segment,
        Transition, segment_path, transition,
    },
    tap::{Connections, FormatRegistry, SampleSink, StreamTap},
    writer::{
        AudioTrack, SegmentWriter, StreamFileWriter, StreamFileWriterFactory, TrackConfiguration,
        VideoTrack, WriterFactory,
    },
};
