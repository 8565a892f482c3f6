//! Import staging for recordings.
//!
//! Footage is copied (or remuxed out of DAV containers) into a
//! temporary staging directory and only ever referenced from there, so
//! the original files on the camera card are never touched.

use ffmpeg_sidecar::command::FfmpegCommand;
use herdlog_core::{HerdlogError, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// Container extensions accepted by the importer.
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "webm", "dav"];

/// True when the path carries one of the accepted extensions.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

fn needs_remux(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dav"))
}

/// List the video files directly inside `folder`, sorted by name.
/// Subfolders are not descended into.
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_video_file(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(HerdlogError::NoVideoFiles(folder.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Temporary staging directory holding all footage the app works on.
/// The directory and everything in it is removed on drop.
#[derive(Debug)]
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    /// Create a fresh staging directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("herdlog-").tempdir()?;
        info!(root = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    /// Root of the staging directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Stage a whole camera folder under a subdirectory named after it.
    /// Fails if the folder holds no video files.
    pub fn stage_folder(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let name = folder.file_name().unwrap_or_else(|| OsStr::new("footage"));
        let files = scan_folder(folder)?;

        let destination = self.root().join(name);
        fs::create_dir_all(&destination)?;

        let mut staged = Vec::with_capacity(files.len());
        for file in files {
            staged.push(stage_into(&file, &destination)?);
        }
        info!(folder = %folder.display(), files = staged.len(), "staged camera folder");
        Ok(staged)
    }

    /// Stage individually picked files into the staging root. Paths
    /// without an accepted extension are skipped.
    pub fn stage_files(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut staged = Vec::new();
        for file in files.iter().filter(|file| is_video_file(file)) {
            staged.push(stage_into(file, self.root())?);
        }
        info!(files = staged.len(), "staged picked files");
        Ok(staged)
    }
}

fn stage_into(source: &Path, destination_dir: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("path has no file name: {}", source.display()),
        )
    })?;

    if needs_remux(source) {
        let destination = destination_dir.join(file_name).with_extension("mp4");
        remux_dav(source, &destination)?;
        Ok(destination)
    } else {
        let destination = destination_dir.join(file_name);
        fs::copy(source, &destination)?;
        Ok(destination)
    }
}

/// Rewrap a DAV recording into MP4 without re-encoding.
fn remux_dav(source: &Path, destination: &Path) -> Result<()> {
    crate::require_ffmpeg()?;
    info!(source = %source.display(), "remuxing DAV recording");

    let mut cmd = FfmpegCommand::new();
    cmd.input(source.display().to_string());
    cmd.args(["-c", "copy"]);
    let mut child = cmd
        .overwrite()
        .output(destination.display().to_string())
        .spawn()
        .map_err(|e| HerdlogError::Encoder(format!("ffmpeg spawn failed: {e}")))?;

    let status = child.wait()?;
    if !status.success() {
        return Err(HerdlogError::Encoder(format!(
            "DAV remux failed for {} ({status})",
            source.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        assert!(is_video_file(Path::new("cam_01.mp4")));
        assert!(is_video_file(Path::new("cam_01.WEBM")));
        assert!(is_video_file(Path::new("barn/cam_01.dav")));
        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("cam_01")));
    }

    #[test]
    fn test_scan_folder_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_02.mp4"), b"x").unwrap();
        fs::write(dir.path().join("a_01.webm"), b"x").unwrap();
        fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c_03.mp4"), b"x").unwrap();

        let files = scan_folder(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a_01.webm", "b_02.mp4"]);
    }

    #[test]
    fn test_scan_folder_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        assert!(matches!(
            scan_folder(dir.path()),
            Err(HerdlogError::NoVideoFiles(_))
        ));
    }

    #[test]
    fn test_stage_files_copies_into_root() {
        let source_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("cam_01.mp4");
        fs::write(&source, b"footage").unwrap();

        let staging = Staging::new().unwrap();
        let staged = staging
            .stage_files(&[source, source_dir.path().join("skip.txt")])
            .unwrap();

        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0], staging.root().join("cam_01.mp4"));
        assert_eq!(fs::read(&staged[0]).unwrap(), b"footage");
    }

    #[test]
    fn test_stage_folder_keeps_folder_name() {
        let source_dir = tempfile::tempdir().unwrap();
        let folder = source_dir.path().join("barn");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("cam_01.mp4"), b"x").unwrap();
        fs::write(folder.join("cam_02.mp4"), b"x").unwrap();

        let staging = Staging::new().unwrap();
        let staged = staging.stage_folder(&folder).unwrap();

        assert_eq!(staged.len(), 2);
        assert!(staged[0].starts_with(staging.root().join("barn")));
        assert!(staged.iter().all(|path| path.exists()));
    }
}
