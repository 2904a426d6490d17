// Unit tests for domain models

use super::*;

#[test]
fn test_interval_new_valid() {
    let interval = Interval::new(10.0, 20.5).unwrap();
    assert_eq!(interval.start, 10.0);
    assert_eq!(interval.end, 20.5);
    assert_eq!(interval.duration(), 10.5);
}

#[test]
fn test_interval_new_invalid() {
    assert!(Interval::new(-1.0, 5.0).is_err()); // Negative start
    assert!(Interval::new(5.0, 5.0).is_err()); // Empty
    assert!(Interval::new(6.0, 5.0).is_err()); // Reversed
    assert!(Interval::new(0.0, f64::NAN).is_err());
    assert!(Interval::new(0.0, f64::INFINITY).is_err());
}

#[test]
fn test_interval_clamp() {
    let interval = Interval::new(40.0, 60.0).unwrap();
    assert_eq!(interval.clamp_to(50.0), Some(Interval { start: 40.0, end: 50.0 }));

    let past_end = Interval::new(60.0, 70.0).unwrap();
    assert_eq!(past_end.clamp_to(50.0), None);
}

#[test]
fn test_interval_display() {
    let interval = Interval::new(1.5, 2.25).unwrap();
    assert_eq!(format!("{}", interval), "[1.500s, 2.250s)");
}

#[test]
fn test_media_descriptor_tracks() {
    let both = MediaDescriptor::new(true, true, 100.0).unwrap();
    assert_eq!(both.tracks(), vec![TrackKind::Video, TrackKind::Audio]);
    assert_eq!(both.media_type(), "video+audio");

    let audio_only = MediaDescriptor::new(false, true, 100.0).unwrap();
    assert_eq!(audio_only.tracks(), vec![TrackKind::Audio]);
    assert_eq!(audio_only.media_type(), "audio");

    let video_only = MediaDescriptor::new(true, false, 100.0).unwrap();
    assert_eq!(video_only.media_type(), "video");
}

#[test]
fn test_media_descriptor_rejects_bad_duration() {
    assert!(matches!(
        MediaDescriptor::new(true, true, 0.0),
        Err(DomainError::ProbeError(_))
    ));
    assert!(MediaDescriptor::new(true, true, -3.0).is_err());
}

#[test]
fn test_segment_plan_validation() {
    let ok = SegmentPlan::new(
        vec![Interval::new(0.0, 10.0).unwrap(), Interval::new(20.0, 30.0).unwrap()],
        0.1,
    )
    .unwrap();
    assert_eq!(ok.len(), 2);
    assert_eq!(ok.total_duration(), 20.0);

    let overlapping = SegmentPlan::new(
        vec![Interval::new(0.0, 10.0).unwrap(), Interval::new(5.0, 30.0).unwrap()],
        0.1,
    );
    assert!(overlapping.is_err());

    let too_short = SegmentPlan::new(vec![Interval::new(0.0, 0.05).unwrap()], 0.1);
    assert!(too_short.is_err());
}

#[test]
fn test_time_unit_conversion() {
    assert_eq!(TimeUnit::Seconds.to_seconds(12.5), 12.5);
    assert_eq!(TimeUnit::Milliseconds.to_seconds(1500.0), 1.5);

    let unit: TimeUnit = serde_json::from_str("\"ms\"").unwrap();
    assert_eq!(unit, TimeUnit::Milliseconds);
    let unit: TimeUnit = serde_json::from_str("\"seconds\"").unwrap();
    assert_eq!(unit, TimeUnit::Seconds);
}

#[test]
fn test_upload_session_advance() {
    let mut session = UploadSession::new("abc".to_string(), 4, 4);
    session.advance(4);
    session.advance(2);
    assert_eq!(session.offset, 10);
}

#[test]
fn test_destination_name_path() {
    let name = DestinationName::new("/processed_videos/", "clip.mp4");
    assert_eq!(name.path(), "/processed_videos/clip.mp4");
    assert_eq!(name.to_string(), "/processed_videos/clip.mp4");
}
