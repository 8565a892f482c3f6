//! Integration tests for project persistence.
//!
//! Walks full save and load cycles through real directories: the JSON
//! sidecars, the copied media tree and the rebuilt edit state.

use herdlog_core::FrameRate;
use herdlog_timeline::{
    copy_media, load_sidecars, media_files, save_sidecars, AdjacencyMap, ClipRecord, Direction,
    Source, Timeline, ADJACENCY_FILE,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

/// A staging tree with two camera folders, one loose recording and a
/// stray sidecar that listing must skip.
fn staged_footage() -> TempDir {
    let staging = TempDir::new().unwrap();
    let root = staging.path();
    write_file(&root.join("barn/north_01.mp4"), b"north");
    write_file(&root.join("barn/east_01.mp4"), b"east");
    write_file(&root.join("barn/note.json"), b"{}");
    write_file(&root.join("yard/gate_01.mp4"), b"gate");
    write_file(&root.join("walkway_01.mp4"), b"walkway");
    staging
}

fn barn_records() -> Vec<ClipRecord> {
    vec![
        ClipRecord {
            source: "barn/north_01.mp4".into(),
            name: "morning feed".into(),
            play_rate: 1.0,
            in_point: 40,
            out_point: 200,
        },
        ClipRecord {
            source: "yard/gate_01.mp4".into(),
            name: "gate check".into(),
            play_rate: 2.0,
            in_point: 0,
            out_point: 500,
        },
    ]
}

fn barn_adjacency() -> AdjacencyMap {
    let mut adjacency = AdjacencyMap::default();
    adjacency.set_neighbor("barn/north", Direction::East, Some("barn/east".into()));
    adjacency.set_neighbor("barn/east", Direction::West, Some("barn/north".into()));
    adjacency
}

// ── Media tree ─────────────────────────────────────────────────

#[test]
fn media_listing_orders_folders_before_loose_files() {
    let staging = staged_footage();
    let files = media_files(staging.path()).unwrap();
    assert_eq!(
        files,
        vec![
            PathBuf::from("barn/east_01.mp4"),
            PathBuf::from("barn/north_01.mp4"),
            PathBuf::from("yard/gate_01.mp4"),
            PathBuf::from("walkway_01.mp4"),
        ]
    );
}

#[test]
fn copying_preserves_the_one_level_layout() {
    let staging = staged_footage();
    let dest = TempDir::new().unwrap();

    let copied = copy_media(staging.path(), dest.path()).unwrap();
    assert_eq!(copied.len(), 4);

    assert_eq!(
        fs::read(dest.path().join("barn/north_01.mp4")).unwrap(),
        b"north"
    );
    assert_eq!(
        fs::read(dest.path().join("walkway_01.mp4")).unwrap(),
        b"walkway"
    );
    assert!(!dest.path().join("barn/note.json").exists());
}

// ── Sidecars ───────────────────────────────────────────────────

#[test]
fn sidecars_round_trip() {
    let dir = TempDir::new().unwrap();
    let records = barn_records();
    let adjacency = barn_adjacency();
    save_sidecars(dir.path(), &records, &adjacency).unwrap();

    let (loaded, layout) = load_sidecars(dir.path()).unwrap();
    assert_eq!(loaded, records);
    assert_eq!(layout.pattern(), adjacency.pattern());
    assert_eq!(
        layout.neighbor("barn/north", Direction::East),
        Some("barn/east")
    );
    assert_eq!(
        layout.neighbor("barn/east", Direction::West),
        Some("barn/north")
    );
    assert_eq!(layout.neighbor("barn/north", Direction::South), None);
}

#[test]
fn loading_rejects_a_folder_missing_a_sidecar() {
    let dir = TempDir::new().unwrap();
    AdjacencyMap::default()
        .save_to_file(&dir.path().join(ADJACENCY_FILE))
        .unwrap();

    let err = load_sidecars(dir.path()).unwrap_err();
    assert!(err.to_string().contains("clips.json"));
}

// ── Full cycle ─────────────────────────────────────────────────

#[test]
fn saved_project_rebuilds_the_timeline() {
    let staging = staged_footage();
    let root = staging.path();

    let mut timeline = Timeline::new();
    timeline.add_source(Source::new(
        root.join("barn/north_01.mp4"),
        250,
        FrameRate::default(),
    ));
    timeline.add_source(Source::new(
        root.join("yard/gate_01.mp4"),
        500,
        FrameRate::FPS_50,
    ));
    timeline.load_source(0, None);
    timeline.load_source(1, None);
    timeline.set_clip_name(0, "morning feed");
    timeline.set_trim(0, 40, 200);

    let records: Vec<ClipRecord> = timeline
        .clips()
        .iter()
        .map(|clip| ClipRecord::from_clip(clip, root))
        .collect();

    let project = TempDir::new().unwrap();
    save_sidecars(project.path(), &records, &barn_adjacency()).unwrap();
    copy_media(root, project.path()).unwrap();

    // Reload into a fresh staging area, registering sources with the
    // known frame counts in place of probe results.
    let fresh = TempDir::new().unwrap();
    let (loaded, layout) = load_sidecars(project.path()).unwrap();
    copy_media(project.path(), fresh.path()).unwrap();

    let mut rebuilt = Timeline::new();
    rebuilt.add_source(Source::new(
        fresh.path().join("barn/north_01.mp4"),
        250,
        FrameRate::default(),
    ));
    rebuilt.add_source(Source::new(
        fresh.path().join("yard/gate_01.mp4"),
        500,
        FrameRate::FPS_50,
    ));
    for record in loaded {
        let path = fresh.path().join(&record.source);
        let source_index = rebuilt.index_of_source(&path).unwrap();
        let index = rebuilt.load_source(source_index, None).unwrap();
        rebuilt.set_clip_name(index, record.name.clone());
        rebuilt.set_play_rate(index, record.play_rate);
        assert!(rebuilt.set_trim(index, record.in_point, record.out_point));
    }

    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt.clip(0).unwrap().name, "morning feed");
    assert_eq!(rebuilt.clip(0).unwrap().in_point(), 40);
    assert_eq!(rebuilt.clip(0).unwrap().out_point(), 200);
    assert_eq!(rebuilt.clip(1).unwrap().play_rate, 1.0);
    assert_eq!(rebuilt.total_frames(), 660); // 160 + 500
    assert_eq!(
        layout.neighbor("barn/north", Direction::East),
        Some("barn/east")
    );
}
