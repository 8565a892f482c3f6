//! Integration tests for the timeline-to-encoder handoff.
//!
//! Builds export jobs from real timeline state and checks the FFmpeg
//! argument lists without spawning an encoder.

use herdlog_core::{FrameRate, HerdlogError};
use herdlog_media::{ExportJob, ExportSettings, Resolution, Segment, VideoCodec};
use herdlog_timeline::{Source, Timeline};
use std::path::{Path, PathBuf};

// ── Helpers ────────────────────────────────────────────────────

/// Mirror of the app's handoff: one segment per clip, in order.
fn segments(timeline: &Timeline) -> Vec<Segment> {
    timeline
        .clips()
        .iter()
        .map(|clip| {
            Segment::new(
                clip.source.clone(),
                clip.in_point(),
                clip.out_point(),
                clip.frame_rate,
            )
        })
        .collect()
}

fn settings(output: &str) -> ExportSettings {
    ExportSettings {
        output: PathBuf::from(output),
        ..ExportSettings::default()
    }
}

// ── Frame accounting ───────────────────────────────────────────

#[test]
fn job_renders_exactly_the_timeline_frames() {
    let mut timeline = Timeline::new();
    timeline.add_source(Source::new("/stage/barn/north_01.mp4", 250, FrameRate::FPS_25));
    timeline.add_source(Source::new("/stage/barn/east_01.mp4", 300, FrameRate::FPS_25));
    timeline.load_source(0, None);
    timeline.load_source(1, None);
    timeline.split_at_position(100).unwrap();

    let job = ExportJob::new(settings("/tmp/day.mp4"), segments(&timeline)).unwrap();
    assert_eq!(job.segments.len(), 3);
    assert_eq!(job.total_frames(), timeline.total_frames());
    assert_eq!(job.total_frames(), 550);
}

#[test]
fn splitting_does_not_change_the_rendered_output() {
    let mut timeline = Timeline::new();
    timeline.add_source(Source::new("/stage/yard/gate_01.mp4", 500, FrameRate::FPS_25));
    timeline.load_source(0, None);

    let whole = ExportJob::new(settings("/tmp/day.mp4"), segments(&timeline)).unwrap();
    timeline.split_at_position(200).unwrap();
    let split = ExportJob::new(settings("/tmp/day.mp4"), segments(&timeline)).unwrap();

    assert_eq!(whole.total_frames(), split.total_frames());

    // The halves seek to the cut boundary in both directions.
    let args = split.video_args(None);
    assert_eq!(args.iter().filter(|a| *a == "-ss").count(), 2);
    assert!(args.contains(&"00:00:08.000".to_string())); // frame 200 at 25 fps
    assert!(args.contains(&"00:00:20.000".to_string()));
}

#[test]
fn an_empty_timeline_cannot_start_an_export() {
    let timeline = Timeline::new();
    let err = ExportJob::new(settings("/tmp/day.mp4"), segments(&timeline)).unwrap_err();
    assert!(matches!(err, HerdlogError::EmptyTimeline));
}

// ── Argument lists ─────────────────────────────────────────────

#[test]
fn cut_boundaries_become_input_seeks_in_each_source_clock() {
    let mut timeline = Timeline::new();
    timeline.add_source(Source::new("/stage/barn/north_01.mp4", 250, FrameRate::FPS_25));
    timeline.add_source(Source::new("/stage/yard/gate_01.mp4", 500, FrameRate::FPS_50));
    timeline.load_source(0, None);
    timeline.load_source(1, None);
    timeline.set_trim(0, 50, 250);
    timeline.set_trim(1, 25, 400);

    let job = ExportJob::new(settings("/tmp/day.mp4"), segments(&timeline)).unwrap();
    let args = job.video_args(None);

    assert!(args.contains(&"00:00:02.000".to_string())); // frame 50 at 25 fps
    assert!(args.contains(&"00:00:10.000".to_string()));
    assert!(args.contains(&"00:00:00.500".to_string())); // frame 25 at 50 fps
    assert!(args.contains(&"00:00:08.000".to_string()));

    let filter = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];
    assert!(filter.contains("concat=n=2:v=1:a=0[outv]"));
}

#[test]
fn chosen_encoder_settings_reach_the_command_line() {
    let mut timeline = Timeline::new();
    timeline.add_source(Source::new("/stage/barn/north_01.mp4", 250, FrameRate::FPS_25));
    timeline.load_source(0, None);

    let settings = ExportSettings {
        output: PathBuf::from("/tmp/pasture.mp4"),
        codec: VideoCodec::Libx264,
        resolution: Resolution::new(1280, 720),
        bitrate_kbps: 400,
        ..ExportSettings::default()
    };
    let job = ExportJob::new(settings, segments(&timeline)).unwrap();
    let args = job.video_args(None);

    assert!(args.contains(&"libx264".to_string()));
    assert!(args.contains(&"400k".to_string()));
    let filter = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];
    assert!(filter.contains("scale=1280:720"));
    assert_eq!(args.last().unwrap(), "/tmp/pasture.mp4");
}

#[test]
fn rebound_clips_export_from_their_new_source() {
    let mut timeline = Timeline::new();
    timeline.add_source(Source::new("/stage/barn/north_01.mp4", 250, FrameRate::FPS_25));
    timeline.add_source(Source::new("/stage/barn/east_01.mp4", 300, FrameRate::FPS_25));
    timeline.load_source(0, None);
    assert!(timeline.replace_clip_source(0, 1));

    let cuts = segments(&timeline);
    assert_eq!(cuts[0].source, Path::new("/stage/barn/east_01.mp4"));
    assert_eq!(cuts[0].len(), 250);
}
