use crate::{
    FormatDescription, FormatRegistry, MediaKind, VideoCodec,
    tests::support::{audio_format, video_format},
};

/// WHAT: Updating a kind returns the format it replaced
/// WHY: The first video frame is recognized by the absence of a previous format
#[test]
fn given_empty_registry_when_updating_twice_then_previous_returned() {
    // Given: An empty registry
    let registry = FormatRegistry::new();

    // When: Storing two video formats
    let first = registry.update(video_format());
    let second = registry.update(FormatDescription::Video {
        width: 1280,
        height: 720,
        codec: VideoCodec::Bgra,
    });

    // Then: None the first time, the older format the second time
    assert_eq!(first, None);
    assert_eq!(second, Some(video_format()));
    assert_eq!(registry.get(MediaKind::Audio), None);
}

/// WHAT: Invalidate forgets both kinds, visible through clones
#[test]
fn given_known_formats_when_invalidating_through_clone_then_both_cleared() {
    let registry = FormatRegistry::new();
    registry.update(video_format());
    registry.update(audio_format());
    let clone = registry.clone();

    clone.invalidate();

    assert_eq!(registry.snapshot(), (None, None));
}
