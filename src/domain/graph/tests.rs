// Unit tests for processing graph construction

use std::path::Path;

use super::*;

fn iv(start: f64, end: f64) -> Interval {
    Interval::new(start, end).unwrap()
}

fn media(has_video: bool, has_audio: bool) -> MediaDescriptor {
    MediaDescriptor::new(has_video, has_audio, 100.0).unwrap()
}

fn graph_of(plan: &GraphPlan) -> &FilterGraph {
    match &plan.spec {
        ProcessingSpec::Filtered { graph } => graph,
        other => panic!("expected a filter graph, got {:?}", other),
    }
}

#[test]
fn test_single_interval_is_direct_trim() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder.build(&[iv(20.0, 100.0)], &media(true, true)).unwrap();

    assert!(plan.spec.is_stream_copy());
    assert!(!plan.spec.uses_concat());
    assert_eq!(plan.segments_kept, 1);
    assert_eq!(plan.total_duration_kept, 80.0);

    let args = plan
        .spec
        .to_args(Path::new("in.mp4"), Path::new("out.mp4"), &EncoderSettings::default());
    assert!(!args.iter().any(|a| a == "-filter_complex"));
    assert!(args.windows(2).any(|w| w[0] == "-ss" && w[1] == "20.000"));
    assert!(args.windows(2).any(|w| w[0] == "-to" && w[1] == "100.000"));
    assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    assert_eq!(args.last().unwrap(), "out.mp4");
}

#[test]
fn test_direct_trim_arguments_in_order() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder.build(&[iv(20.0, 100.0)], &media(true, true)).unwrap();
    let args = plan
        .spec
        .to_args(Path::new("in.mp4"), Path::new("out.mp4"), &EncoderSettings::default());
    assert_eq!(
        args,
        [
            "-hide_banner", "-loglevel", "error", "-y", "-i", "in.mp4", "-ss", "20.000", "-to",
            "100.000", "-map", "0:v:0", "-map", "0:a:0", "-c", "copy", "-avoid_negative_ts",
            "make_zero", "out.mp4",
        ]
    );

    // Only probed tracks are mapped
    let plan = builder.build(&[iv(20.0, 100.0)], &media(false, true)).unwrap();
    let args = plan
        .spec
        .to_args(Path::new("in.mp4"), Path::new("out.mp4"), &EncoderSettings::default());
    assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a:0"));
    assert!(!args.iter().any(|a| a.starts_with("0:v")));
}

#[test]
fn test_two_intervals_with_both_tracks() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder
        .build(&[iv(0.0, 10.0), iv(20.0, 100.0)], &media(true, true))
        .unwrap();

    assert!(plan.spec.uses_concat());
    assert_eq!(plan.segments_kept, 2);
    assert_eq!(plan.total_duration_kept, 90.0);

    let graph = graph_of(&plan);
    assert_eq!(
        graph.render(),
        "[0:v]trim=start=0.000:end=10.000,setpts=PTS-STARTPTS[v0];\
         [0:a]atrim=start=0.000:end=10.000,asetpts=PTS-STARTPTS[a0];\
         [0:v]trim=start=20.000:end=100.000,setpts=PTS-STARTPTS[v1];\
         [0:a]atrim=start=20.000:end=100.000,asetpts=PTS-STARTPTS[a1];\
         [v0][v1]concat=n=2:v=1:a=0[outv];\
         [a0][a1]concat=n=2:v=0:a=1[outa]"
    );
    assert_eq!(
        graph.outputs,
        vec![(TrackKind::Video, "outv".to_string()), (TrackKind::Audio, "outa".to_string())]
    );
}

#[test]
fn test_audio_only_omits_video_chain() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder
        .build(&[iv(0.0, 10.0), iv(20.0, 30.0)], &media(false, true))
        .unwrap();
    let graph = graph_of(&plan);

    assert!(graph.trims.iter().all(|t| t.track == TrackKind::Audio));
    assert_eq!(graph.concats.len(), 1);
    assert!(!graph.render().contains("[0:v]"));

    let args = plan
        .spec
        .to_args(Path::new("in.m4a"), Path::new("out.mp4"), &EncoderSettings::default());
    assert!(args.iter().any(|a| a == "-c:a"));
    assert!(!args.iter().any(|a| a == "-c:v"));
    assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[outa]"));
}

#[test]
fn test_video_only_omits_audio_chain() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder
        .build(&[iv(0.0, 10.0), iv(20.0, 30.0)], &media(true, false))
        .unwrap();
    let graph = graph_of(&plan);

    assert!(graph.trims.iter().all(|t| t.track == TrackKind::Video));
    assert!(!graph.render().contains("atrim"));
}

#[test]
fn test_no_tracks_is_fatal() {
    let builder = FilterGraphBuilder::new(0.1);
    let result = builder.build(&[iv(0.0, 10.0)], &media(false, false));
    assert!(matches!(result, Err(DomainError::GraphEmpty(_))));
}

#[test]
fn test_all_short_intervals_is_fatal() {
    let builder = FilterGraphBuilder::new(0.1);
    let result = builder.build(&[iv(0.0, 0.05), iv(10.0, 10.0004)], &media(true, true));
    assert!(matches!(result, Err(DomainError::GraphEmpty(_))));
}

#[test]
fn test_interval_below_tolerance_after_rounding_is_dropped() {
    // 30.0006..30.0994 renders as 30.001..30.099
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder
        .build(&[iv(0.0, 20.0), iv(30.0006, 30.0994), iv(40.0, 60.0)], &media(true, true))
        .unwrap();
    assert_eq!(plan.segments_kept, 2);
    assert_eq!(plan.kept, vec![iv(0.0, 20.0), iv(40.0, 60.0)]);
}

#[test]
fn test_drops_renumber_labels_in_chronological_order() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder
        .build(
            &[iv(0.0, 5.0), iv(6.0, 6.05), iv(10.0, 15.0), iv(20.0, 20.02), iv(30.0, 35.0)],
            &media(true, true),
        )
        .unwrap();
    assert_eq!(plan.segments_kept, 3);

    let graph = graph_of(&plan);
    let video: Vec<&TrimNode> = graph.trims.iter().filter(|t| t.track == TrackKind::Video).collect();
    assert_eq!(
        video.iter().map(|t| t.output.as_str()).collect::<Vec<_>>(),
        vec!["v0", "v1", "v2"]
    );
    assert_eq!(
        video.iter().map(|t| t.interval.start).collect::<Vec<_>>(),
        vec![0.0, 10.0, 30.0]
    );

    let video_concat = graph.concats.iter().find(|c| c.track == TrackKind::Video).unwrap();
    assert_eq!(video_concat.inputs, vec!["v0", "v1", "v2"]);
    assert!(graph.render().contains("[v0][v1][v2]concat=n=3:v=1:a=0[outv]"));
    assert!(graph.render().contains("[a0][a1][a2]concat=n=3:v=0:a=1[outa]"));
}

#[test]
fn test_single_survivor_skips_concat() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder
        .build(&[iv(0.0, 0.04), iv(10.0, 30.0)], &media(true, true))
        .unwrap();
    assert_eq!(plan.segments_kept, 1);
    assert!(!plan.spec.uses_concat());

    let graph = graph_of(&plan);
    assert!(graph.concats.is_empty());
    assert!(!graph.render().contains("concat"));
    assert_eq!(
        graph.outputs,
        vec![(TrackKind::Video, "v0".to_string()), (TrackKind::Audio, "a0".to_string())]
    );

    let args = plan
        .spec
        .to_args(Path::new("in.mp4"), Path::new("out.mp4"), &EncoderSettings::default());
    assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[v0]"));
    assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[a0]"));
}

#[test]
fn test_reencode_args_use_encoder_settings() {
    let builder = FilterGraphBuilder::new(0.1);
    let plan = builder
        .build(&[iv(0.0, 10.0), iv(20.0, 30.0)], &media(true, true))
        .unwrap();
    let encoder = EncoderSettings {
        video_codec: "libx265".to_string(),
        preset: "slow".to_string(),
        crf: 20,
        audio_codec: "libopus".to_string(),
        audio_bitrate: "96k".to_string(),
    };
    let args = plan.spec.to_args(Path::new("in.mp4"), Path::new("out.mp4"), &encoder);

    assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx265"));
    assert!(args.windows(2).any(|w| w[0] == "-preset" && w[1] == "slow"));
    assert!(args.windows(2).any(|w| w[0] == "-crf" && w[1] == "20"));
    assert!(args.windows(2).any(|w| w[0] == "-b:a" && w[1] == "96k"));
    assert!(args.windows(2).any(|w| w[0] == "-movflags" && w[1] == "+faststart"));
}
