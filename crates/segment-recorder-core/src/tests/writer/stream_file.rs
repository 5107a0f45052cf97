use crate::{
    AudioSettings, AudioTrack, Connection, MediaKind, RecorderError, SegmentWriter,
    StreamFileWriter, TrackConfiguration,
    tests::support::{audio_format, sample, video_format},
};

fn audio_only() -> TrackConfiguration {
    TrackConfiguration {
        video: None,
        audio: Some(AudioTrack {
            source_format: audio_format(),
            settings: AudioSettings::default(),
        }),
    }
}

/// WHAT: Prepare refuses a configuration without tracks
/// WHY: A file with no tracks cannot be played back
#[tokio::test]
async fn given_no_tracks_when_preparing_then_writer_failed() {
    let dir = tempfile::tempdir().unwrap();
    let writer = StreamFileWriter::new(dir.path().join("out.raw"));

    let result = writer.prepare(&TrackConfiguration::default()).await;

    assert!(matches!(result, Err(RecorderError::WriterFailed { .. })));
    assert!(!writer.path().exists());
}

/// WHAT: Only samples of configured tracks are written
/// WHY: Media without a track in the file has nowhere to go
#[tokio::test]
async fn given_audio_only_tracks_when_appending_both_kinds_then_only_audio_written() {
    // Given: A prepared writer with an audio track only
    let dir = tempfile::tempdir().unwrap();
    let writer = StreamFileWriter::new(dir.path().join("out.raw"));
    writer.prepare(&audio_only()).await.unwrap();
    let video = Connection::new(MediaKind::Video).id();
    let audio = Connection::new(MediaKind::Audio).id();

    // When: Appending a frame and two audio buffers, then finishing
    writer
        .append(&sample(audio, audio_format(), 0, &[1, 2]))
        .unwrap();
    writer
        .append(&sample(video, video_format(), 0, &[9, 9, 9]))
        .unwrap();
    writer
        .append(&sample(audio, audio_format(), 10, &[3]))
        .unwrap();
    writer.finish().await.unwrap();

    // Then: The file holds the audio payloads in order
    assert_eq!(std::fs::read(writer.path()).unwrap(), vec![1, 2, 3]);
}

/// WHAT: Appends after finish are ignored and finish is idempotent
/// WHY: Samples racing a pause may arrive after the segment closed
#[tokio::test]
async fn given_finished_writer_when_appending_and_finishing_again_then_ok() {
    let dir = tempfile::tempdir().unwrap();
    let writer = StreamFileWriter::new(dir.path().join("out.raw"));
    writer.prepare(&audio_only()).await.unwrap();
    writer.finish().await.unwrap();

    let audio = Connection::new(MediaKind::Audio).id();
    let appended = writer.append(&sample(audio, audio_format(), 0, &[1]));
    let finished = writer.finish().await;

    assert!(appended.is_ok());
    assert!(finished.is_ok());
    assert!(std::fs::read(writer.path()).unwrap().is_empty());
}

/// WHAT: Preparing in a missing directory surfaces an IO error
#[tokio::test]
async fn given_missing_directory_when_preparing_then_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let writer = StreamFileWriter::new(dir.path().join("missing").join("out.raw"));

    let result = writer.prepare(&audio_only()).await;

    assert!(matches!(result, Err(RecorderError::Io { .. })));
}
