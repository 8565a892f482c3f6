//! Project persistence.
//!
//! A saved project is a folder holding two JSON sidecars plus the media
//! files, copied over with their relative layout intact:
//!
//! - [`ADJACENCY_FILE`] with the camera layout and wrapper pattern
//! - [`CLIPS_FILE`] with one record per timeline clip
//!
//! Loading requires both sidecars; a folder missing either is rejected
//! before any state changes.

use herdlog_core::{HerdlogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::adjacency::AdjacencyMap;
use crate::clip::Clip;

/// Sidecar holding the camera layout.
pub const ADJACENCY_FILE: &str = "adjacent.json";

/// Sidecar holding the clip list.
pub const CLIPS_FILE: &str = "clips.json";

/// Persisted form of one timeline clip. Sources are stored relative to
/// the media root so a project folder can be moved freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    pub source: String,
    pub name: String,
    pub play_rate: f64,
    pub in_point: i64,
    pub out_point: i64,
}

impl ClipRecord {
    /// Build a record from a live clip, relativizing its source path.
    pub fn from_clip(clip: &Clip, media_root: &Path) -> Self {
        Self {
            source: relative_source(&clip.source, media_root),
            name: clip.name.clone(),
            play_rate: clip.play_rate,
            in_point: clip.in_point(),
            out_point: clip.out_point(),
        }
    }
}

/// Express a source path relative to the media root, with forward
/// slashes. Paths outside the root reduce to their file name.
pub fn relative_source(source: &Path, media_root: &Path) -> String {
    let relative = source
        .strip_prefix(media_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write both sidecars into `dir`, creating it if needed.
pub fn save_sidecars(dir: &Path, records: &[ClipRecord], adjacency: &AdjacencyMap) -> Result<()> {
    fs::create_dir_all(dir)?;
    adjacency.save_to_file(&dir.join(ADJACENCY_FILE))?;
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| HerdlogError::Serialization(e.to_string()))?;
    fs::write(dir.join(CLIPS_FILE), json)?;
    info!(dir = %dir.display(), clips = records.len(), "saved project sidecars");
    Ok(())
}

/// Read both sidecars from `dir`. Fails with the missing file's path if
/// either is absent.
pub fn load_sidecars(dir: &Path) -> Result<(Vec<ClipRecord>, AdjacencyMap)> {
    let adjacency_path = dir.join(ADJACENCY_FILE);
    let clips_path = dir.join(CLIPS_FILE);
    for path in [&adjacency_path, &clips_path] {
        if !path.exists() {
            return Err(HerdlogError::MissingProjectFile(path.clone()));
        }
    }
    let adjacency = AdjacencyMap::load_from_file(&adjacency_path)?;
    let text = fs::read_to_string(&clips_path)?;
    let records: Vec<ClipRecord> =
        serde_json::from_str(&text).map_err(|e| HerdlogError::Serialization(e.to_string()))?;
    info!(dir = %dir.display(), clips = records.len(), "loaded project sidecars");
    Ok((records, adjacency))
}

/// List media files under `root` as relative paths: files inside
/// first-level subfolders (folders sorted by name, then files by name),
/// then files at the root, also sorted. JSON sidecars and anything
/// nested deeper are skipped.
pub fn media_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    let mut loose = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            folders.push(entry.path());
        } else if file_type.is_file() && !is_sidecar(&entry.path()) {
            loose.push(PathBuf::from(entry.file_name()));
        }
    }
    folders.sort();
    loose.sort();

    let mut files = Vec::new();
    for folder in folders {
        let folder_name = match folder.file_name() {
            Some(name) => PathBuf::from(name),
            None => continue,
        };
        let mut nested = Vec::new();
        for entry in fs::read_dir(&folder)? {
            let entry = entry?;
            if entry.file_type()?.is_file() && !is_sidecar(&entry.path()) {
                nested.push(folder_name.join(entry.file_name()));
            }
        }
        nested.sort();
        files.extend(nested);
    }
    files.extend(loose);
    Ok(files)
}

/// Copy every media file from one root to another, preserving the
/// relative layout. Returns the destination paths in copy order.
pub fn copy_media(from_root: &Path, to_root: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for relative in media_files(from_root)? {
        let destination = to_root.join(&relative);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from_root.join(&relative), &destination)?;
        copied.push(destination);
    }
    info!(
        from = %from_root.display(),
        to = %to_root.display(),
        files = copied.len(),
        "copied project media"
    );
    Ok(copied)
}

fn is_sidecar(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
