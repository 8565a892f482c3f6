//! Herdlog Media - FFmpeg integration for footage I/O
//!
//! This crate handles:
//! - Probing recordings for frame rate, frame count and audio
//! - Import staging (copying footage, remuxing DAV containers)
//! - Exporting the timeline with progress and cancellation

pub mod export;
pub mod import;
pub mod probe;

pub use export::{
    available_threads, default_threads, ExportCancel, ExportEvent, ExportHandle, ExportJob,
    ExportPhase, ExportProgress, ExportSettings, Resolution, Segment, VideoCodec,
    MAX_BITRATE_KBPS, MIN_BITRATE_KBPS,
};
pub use import::{is_video_file, scan_folder, Staging, VIDEO_EXTENSIONS};
pub use probe::{probe_file, MediaInfo};

/// True when the FFmpeg CLI can be executed.
pub fn ffmpeg_available() -> bool {
    ffmpeg_sidecar::command::ffmpeg_is_installed()
}

pub(crate) fn require_ffmpeg() -> herdlog_core::Result<()> {
    if ffmpeg_available() {
        Ok(())
    } else {
        Err(herdlog_core::HerdlogError::ToolNotFound("ffmpeg".into()))
    }
}

/// Check tool availability and log it (call once at startup).
pub fn init() {
    if ffmpeg_available() {
        tracing::info!("Herdlog media initialized");
    } else {
        tracing::warn!("ffmpeg not found on PATH; import and export will fail");
    }
}
