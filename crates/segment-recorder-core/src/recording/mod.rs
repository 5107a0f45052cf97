mod attributes;
mod coordinator;
pub(crate) mod delegate;
pub(crate) mod segment;
mod status;
mod transition;

pub use {
    attributes::Attributes,
    coordinator::RecordingCoordinator,
    delegate::{ChannelDelegate, RecordingDelegate, RecordingNotification, RecordingOutcome},
    segment::{Segment, segment_path},
    status::RecordingStatus,
    transition::{IllegalTransition, RecordingEvent, Transition, transition},
};
