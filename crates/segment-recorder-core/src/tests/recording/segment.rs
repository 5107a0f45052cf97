use crate::{MediaFormat, Segment, recording::segment::SegmentBook, segment_path};

use std::path::{Path, PathBuf};

/// WHAT: Segment names insert the index before the extension
/// WHY: Segments must sit next to the destination and keep its container type
#[test]
fn given_mp4_destination_when_deriving_segment_two_then_suffix_before_extension() {
    // Given: A movie destination
    let destination = Path::new("/videos/movie.mp4");

    // When: Deriving the path of segment 2
    let path = segment_path(destination, MediaFormat::Mp4, 2);

    // Then: The index is inserted before the extension
    assert_eq!(path, PathBuf::from("/videos/movie-segment2.mp4"));
}

/// WHAT: A destination lacking the format's extension gets one appended
#[test]
fn given_destination_without_extension_when_deriving_then_extension_appended() {
    let path = segment_path(Path::new("/videos/take"), MediaFormat::QuickTime, 0);

    assert_eq!(path, PathBuf::from("/videos/take-segment0.mov"));
}

/// WHAT: Only the format's own extension is stripped
/// WHY: A `.mp4` destination recorded as QuickTime must not lose part of its name
#[test]
fn given_mismatched_extension_when_deriving_then_name_kept_whole() {
    let path = segment_path(Path::new("/videos/movie.mp4"), MediaFormat::QuickTime, 1);

    assert_eq!(path, PathBuf::from("/videos/movie.mp4-segment1.mov"));
}

/// WHAT: Opening segments advances indices and retargets the writer
/// WHY: Each resume must write to a fresh file in order
#[test]
fn given_book_with_first_segment_when_opening_more_then_indices_follow() {
    // Given: A book whose first segment was recorded at index 0
    let destination = PathBuf::from("/videos/movie.raw");
    let mut book = SegmentBook::new(destination.clone(), MediaFormat::Raw);
    assert_eq!(book.current_destination(), destination);
    book.push(Segment::new(book.next_segment_path()));

    // When: Opening two resume segments
    let first = book.open_segment();
    let second = book.open_segment();

    // Then: Indices 1 and 2, in order, with the writer on the latest
    assert_eq!(first, PathBuf::from("/videos/movie-segment1.raw"));
    assert_eq!(second, PathBuf::from("/videos/movie-segment2.raw"));
    assert_eq!(book.current_destination(), second);
    let paths: Vec<_> = book.segments().iter().map(|s| s.path().to_path_buf()).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("/videos/movie-segment0.raw"), first, second]
    );
}

/// WHAT: Reset empties the book and points back at the destination
#[test]
fn given_filled_book_when_resetting_then_segments_returned_and_cleared() {
    let destination = PathBuf::from("/videos/movie.raw");
    let mut book = SegmentBook::new(destination.clone(), MediaFormat::Raw);
    book.push(Segment::new("/videos/movie-segment0.raw"));
    book.open_segment();

    let taken = book.reset();

    assert_eq!(taken.len(), 2);
    assert!(book.is_empty());
    assert_eq!(book.current_destination(), destination);
}
