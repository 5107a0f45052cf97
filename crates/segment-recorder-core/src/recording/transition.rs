//! Transition table of the recording state machine.
//!
//! [`transition`] is the only place that decides whether an event is legal
//! in a given status. It is pure: side effects are derived by the caller
//! from the returned [`Transition`].

use crate::{RecorderError, recording::RecordingStatus};

use std::{fmt, sync::Arc};

use thiserror::Error;

/// Inputs that drive the state machine.
#[derive(Debug, Clone)]
pub enum RecordingEvent {
    /// User asked to start or resume.
    Start,
    /// User asked to stop.
    Stop,
    /// User asked to pause.
    Pause,
    /// The writer finished preparing its tracks.
    WriterPrepared,
    /// The writer, or a step finalizing its output, failed.
    WriterFailed(Arc<RecorderError>),
    /// The writer flushed and closed its current file.
    WriterFinished,
    /// Segments were merged (or there were none) and cleaned up.
    SessionFinalized,
}

impl fmt::Display for RecordingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordingEvent::Start => "start",
            RecordingEvent::Stop => "stop",
            RecordingEvent::Pause => "pause",
            RecordingEvent::WriterPrepared => "writer prepared",
            RecordingEvent::WriterFailed(_) => "writer failed",
            RecordingEvent::WriterFinished => "writer finished",
            RecordingEvent::SessionFinalized => "session finalized",
        };
        f.write_str(name)
    }
}

/// A legal status change.
///
/// `from` and `to` may be the same variant: a writer finishing while
/// stopping keeps the session in `StoppingRecording` until the merge ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Status before the event.
    pub from: RecordingStatus,
    /// Status after the event.
    pub to: RecordingStatus,
}

/// An event that is not legal in the current status.
#[derive(Debug, Clone, Error)]
#[error("illegal recording transition: {event} while {status}")]
pub struct IllegalTransition {
    /// Status the event was rejected in.
    pub status: RecordingStatus,
    /// Name of the rejected event.
    pub event: String,
}

/// Computes the status that `event` leads to from `current`.
pub fn transition(
    current: &RecordingStatus,
    event: &RecordingEvent,
) -> Result<Transition, IllegalTransition> {
    use RecordingStatus::{Idle, Paused, Recording, StartingRecording, StoppingRecording};

    let to = match (current, event) {
        (_, RecordingEvent::WriterFailed(error)) => Idle {
            error: Some(Arc::clone(error)),
        },
        (Idle { .. }, RecordingEvent::Start) => StartingRecording,
        (Idle { .. } | Recording, RecordingEvent::Stop) => StoppingRecording,
        (Recording, RecordingEvent::Pause) => Paused,
        (StartingRecording, RecordingEvent::WriterPrepared) => Recording,
        (StoppingRecording, RecordingEvent::WriterFinished) => StoppingRecording,
        (Paused, RecordingEvent::WriterFinished) => RecordingStatus::idle(),
        (StoppingRecording, RecordingEvent::SessionFinalized) => RecordingStatus::idle(),
        _ => {
            return Err(IllegalTransition {
                status: current.clone(),
                event: event.to_string(),
            });
        }
    };

    Ok(Transition {
        from: current.clone(),
        to,
    })
}
