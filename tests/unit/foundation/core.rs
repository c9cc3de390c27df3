use super::*;

#[test]
fn default_range_is_one_to_forty_two() {
    let r = FrameRange::default();
    assert_eq!(r.start, FrameNumber(1));
    assert_eq!(r.end, FrameNumber(42));
    assert_eq!(r.len_frames(), 42);
}

#[test]
fn range_rejects_zero_and_inverted_bounds() {
    assert!(FrameRange::new(FrameNumber(0), FrameNumber(4)).is_err());
    assert!(FrameRange::new(FrameNumber(5), FrameNumber(4)).is_err());
    assert!(FrameRange::new(FrameNumber(4), FrameNumber(4)).is_ok());
}

#[test]
fn iter_is_ascending_and_inclusive() {
    let r = FrameRange::new(FrameNumber(3), FrameNumber(6)).unwrap();
    let frames: Vec<u64> = r.iter().map(|f| f.0).collect();
    assert_eq!(frames, vec![3, 4, 5, 6]);
    assert!(r.contains(FrameNumber(6)));
    assert!(!r.contains(FrameNumber(7)));
}

#[test]
fn slot_is_zero_based() {
    assert_eq!(FrameNumber(1).slot(), 0);
    assert_eq!(FrameNumber(3).slot(), 2);
}

#[test]
fn background_alpha_is_168() {
    assert_eq!(BACKGROUND_RGBA[..3], [0.0, 0.0, 0.0]);
    assert!((BACKGROUND_RGBA[3] * 255.0 - 168.0).abs() < 1e-4);
}
