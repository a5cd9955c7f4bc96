use image::{Rgb, RgbImage};
use occupancy_mapper::config::SyntheticConfig;
use occupancy_mapper::{DirectorySource, FrameSource, MapperError, SyntheticSource};
use tempfile::tempdir;

#[test]
fn synthetic_room_starts_empty_then_shows_person() {
    let mut source = SyntheticSource::new(SyntheticConfig::default());
    let empty = source.next_frame().unwrap().unwrap();
    assert_eq!(empty.dimensions(), (640, 480));
    assert!(empty.pixels().all(|p| p.0 == [0, 0, 0]));

    let frame = source.next_frame().unwrap().unwrap();
    assert_eq!(frame.get_pixel(300, 200).0, [255, 255, 255]);
    assert_eq!(frame.get_pixel(340, 240).0, [255, 255, 255]);
    assert_eq!(frame.get_pixel(341, 240).0, [0, 0, 0]);
    assert_eq!(frame.get_pixel(299, 200).0, [0, 0, 0]);
    let white = frame.pixels().filter(|p| p.0 == [255, 255, 255]).count();
    assert_eq!(white, 41 * 41);
}

#[test]
fn synthetic_person_moves_and_clips() {
    let cfg = SyntheticConfig {
        width: 20,
        height: 10,
        person: [0, 0, 3, 3],
        velocity: [10, 0],
        empty_frames: 0,
    };
    let mut source = SyntheticSource::new(cfg);
    source.next_frame().unwrap();
    let second = source.next_frame().unwrap().unwrap();
    assert_eq!(second.get_pixel(10, 0).0, [255, 255, 255]);
    assert_eq!(second.get_pixel(0, 0).0, [0, 0, 0]);

    let third = source.next_frame().unwrap().unwrap();
    assert!(third.pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn synthetic_step_saturates_on_long_runs() {
    let cfg = SyntheticConfig {
        width: 20,
        height: 10,
        person: [0, 0, 3, 3],
        velocity: [1, 0],
        empty_frames: 0,
    };
    let source = SyntheticSource::new(cfg);
    let frame = source.frame_at(u32::MAX);
    assert!(frame.pixels().all(|p| p.0 == [0, 0, 0]));
    assert_eq!(source.frame_at(2).get_pixel(2, 0).0, [255, 255, 255]);
}

#[test]
fn directory_source_replays_sorted_frames_once() {
    let dir = tempdir().unwrap();
    RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]))
        .save(dir.path().join("b.png"))
        .unwrap();
    RgbImage::from_pixel(4, 4, Rgb([1, 1, 1]))
        .save(dir.path().join("a.png"))
        .unwrap();

    let mut source = DirectorySource::new(dir.path()).unwrap();
    assert_eq!(source.len(), 2);
    assert_eq!(source.next_frame().unwrap().unwrap().get_pixel(0, 0).0, [1, 1, 1]);
    assert_eq!(source.next_frame().unwrap().unwrap().get_pixel(0, 0).0, [9, 9, 9]);
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn directory_source_empty_directory() {
    let dir = tempdir().unwrap();
    let mut source = DirectorySource::new(dir.path()).unwrap();
    assert!(source.is_empty());
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn directory_source_missing_directory() {
    let dir = tempdir().unwrap();
    let err = DirectorySource::new(&dir.path().join("missing")).err().unwrap();
    assert!(matches!(err, MapperError::Io(_)));
}

#[test]
fn directory_source_reports_undecodable_frame() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
    let mut source = DirectorySource::new(dir.path()).unwrap();
    let err = source.next_frame().unwrap_err();
    assert!(matches!(err, MapperError::Frame { .. }));
}
