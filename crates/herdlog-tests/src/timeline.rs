//! Integration tests for the edit model.
//!
//! Exercises cross-crate interactions between herdlog-core,
//! herdlog-timeline and the camera adjacency map.

use herdlog_core::FrameRate;
use herdlog_timeline::{relative_source, AdjacencyMap, Direction, Source, Timeline};
use std::path::Path;

// ── Helpers ────────────────────────────────────────────────────

fn source(path: &str, frames: i64) -> Source {
    Source::new(path, frames, FrameRate::default())
}

/// Three recordings loaded end to end: 250 + 300 + 500 frames.
fn barn_timeline() -> Timeline {
    let mut timeline = Timeline::new();
    timeline.add_source(source("/stage/barn/north_01.mp4", 250));
    timeline.add_source(source("/stage/barn/east_01.mp4", 300));
    timeline.add_source(source("/stage/yard/gate_01.mp4", 500));
    for index in 0..3 {
        timeline.load_source(index, None);
    }
    timeline
}

// ── Sequencing ─────────────────────────────────────────────────

#[test]
fn loaded_sources_line_up_end_to_end() {
    let timeline = barn_timeline();
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline.total_frames(), 1050);
    assert_eq!(timeline.start_of(0), Some(0));
    assert_eq!(timeline.start_of(1), Some(250));
    assert_eq!(timeline.start_of(2), Some(550));
    assert_eq!(timeline.clip(1).unwrap().name, "east_01.mp4");
}

#[test]
fn cursor_maps_through_trims_to_source_frames() {
    let mut timeline = barn_timeline();
    assert!(timeline.set_trim(0, 50, 200));
    assert_eq!(timeline.total_frames(), 950); // 150 + 300 + 500

    let hit = timeline.clip_at(0).unwrap();
    assert_eq!((hit.index, hit.source_frame), (0, 50));

    let hit = timeline.clip_at(149).unwrap();
    assert_eq!((hit.index, hit.source_frame), (0, 199));

    let hit = timeline.clip_at(150).unwrap();
    assert_eq!((hit.index, hit.offset, hit.source_frame), (1, 0, 0));

    assert!(timeline.clip_at(950).is_none());
}

// ── Split and ripple ───────────────────────────────────────────

#[test]
fn split_at_the_cursor_is_frame_exact() {
    let mut timeline = barn_timeline();
    timeline.set_position(100);
    timeline.split_at_position(timeline.position()).unwrap();

    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline.total_frames(), 1050);
    assert_eq!(timeline.clip(0).unwrap().out_point(), 100);
    assert_eq!(timeline.clip(1).unwrap().in_point(), 100);
    assert_eq!(
        timeline.clip(0).unwrap().source,
        timeline.clip(1).unwrap().source
    );

    // The cursor now sits on the first frame of the right half.
    let hit = timeline.clip_at(100).unwrap();
    assert_eq!((hit.index, hit.source_frame), (1, 100));
}

#[test]
fn ripple_trim_moves_both_sides_of_the_cut() {
    let mut timeline = barn_timeline();
    timeline.split_at_position(100).unwrap();

    assert!(timeline.set_in_point(1, 120));
    assert_eq!(timeline.clip(0).unwrap().out_point(), 120);
    assert_eq!(timeline.clip(1).unwrap().in_point(), 120);

    // Same-source halves trade frames, so nothing downstream moves.
    assert_eq!(timeline.total_frames(), 1050);
    assert_eq!(timeline.start_of(1), Some(120));
    assert_eq!(timeline.start_of(2), Some(250));
}

#[test]
fn ripple_is_rejected_when_a_neighbor_would_collapse() {
    let mut timeline = barn_timeline();
    timeline.split_at_position(100).unwrap();

    // Pulling the right half's in point to 0 would empty the left half.
    assert!(!timeline.set_in_point(1, 0));
    assert_eq!(timeline.clip(0).unwrap().out_point(), 100);
    assert_eq!(timeline.clip(1).unwrap().in_point(), 100);
    assert_eq!(timeline.total_frames(), 1050);
}

#[test]
fn split_boundaries_are_rejected() {
    let mut timeline = barn_timeline();
    assert!(timeline.split_at_position(0).is_err());
    assert_eq!(timeline.len(), 3);
}

// ── Camera jumps ───────────────────────────────────────────────

#[test]
fn camera_jump_follows_the_adjacency_map() {
    let media_root = Path::new("/stage");
    let mut timeline = barn_timeline();
    let mut adjacency = AdjacencyMap::default();

    // Wrapper stripping turns barn/north_01.mp4 into barn/north.
    let key = adjacency.key_for("barn/north_01.mp4");
    assert_eq!(key, "barn/north");
    adjacency.set_neighbor(&key, Direction::East, Some("barn/east".into()));

    timeline.set_position(0);
    let clip = timeline.current_clip().unwrap();
    let key = adjacency.key_for(&relative_source(&clip.source, media_root));
    let relatives: Vec<String> = timeline
        .sources()
        .iter()
        .map(|source| relative_source(&source.path, media_root))
        .collect();
    let target = adjacency
        .resolve(&key, Direction::East, relatives.iter().map(String::as_str))
        .unwrap();
    assert_eq!(target, "barn/east_01.mp4");

    let source_index = timeline
        .index_of_source(Path::new("/stage/barn/east_01.mp4"))
        .unwrap();
    assert!(timeline.replace_clip_source(0, source_index));

    let clip = timeline.clip(0).unwrap();
    assert_eq!(clip.source, Path::new("/stage/barn/east_01.mp4"));
    // The 250-frame window fits the 300-frame neighbor, so the cut holds.
    assert_eq!(clip.out_point(), 250);
    assert_eq!(timeline.total_frames(), 1050);
}

#[test]
fn jump_with_no_matching_footage_resolves_to_nothing() {
    let mut adjacency = AdjacencyMap::default();
    adjacency.set_neighbor("barn/north", Direction::West, Some("barn/west".into()));

    let relatives = ["barn/north_01.mp4", "barn/east_01.mp4"];
    assert!(adjacency
        .resolve("barn/north", Direction::West, relatives)
        .is_none());
    assert!(adjacency
        .resolve("barn/north", Direction::South, relatives)
        .is_none());
}

#[test]
fn rebinding_to_shorter_footage_rescales_the_window() {
    let mut timeline = Timeline::new();
    timeline.add_source(source("/stage/yard/gate_01.mp4", 500));
    timeline.add_source(source("/stage/barn/north_01.mp4", 250));
    timeline.load_source(0, None);
    assert!(timeline.set_trim(0, 100, 500));

    assert!(timeline.replace_clip_source(0, 1));
    let clip = timeline.clip(0).unwrap();
    assert_eq!(clip.in_point(), 50); // 100 × 250/500
    assert_eq!(clip.out_point(), 250);
    assert!(clip.is_valid());
    assert_eq!(timeline.total_frames(), 200);
}

// ── Selection ──────────────────────────────────────────────────

#[test]
fn removing_a_clip_repairs_the_selection() {
    let mut timeline = barn_timeline();
    assert!(timeline.select(Some(2)));

    timeline.remove_clip(1);
    assert_eq!(timeline.selected_index(), Some(1));
    assert_eq!(timeline.total_frames(), 750);

    timeline.remove_clip(1);
    assert_eq!(timeline.selected_index(), None);
    assert_eq!(timeline.total_frames(), 250);
}
