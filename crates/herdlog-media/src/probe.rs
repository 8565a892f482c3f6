//! Media file probing to get metadata without a full decode.

use herdlog_core::{FrameRate, HerdlogError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Metadata of one recording, read from `ffprobe`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// File path
    pub path: PathBuf,
    /// Container duration in seconds
    pub duration_seconds: f64,
    /// Frame rate of the primary video stream
    pub frame_rate: FrameRate,
    /// Frame size of the primary video stream
    pub width: u32,
    pub height: u32,
    /// Frame count, from the stream header or derived from the duration
    pub total_frames: i64,
    /// Whether any audio stream is present
    pub has_audio: bool,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

// ffprobe reports nb_frames and duration as JSON strings.
#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe a media file via `ffprobe`.
pub fn probe_file(path: impl AsRef<Path>) -> Result<MediaInfo> {
    let path = path.as_ref();

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "stream=codec_type,width,height,r_frame_rate,nb_frames:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => HerdlogError::ToolNotFound("ffprobe".into()),
            _ => HerdlogError::Io(e),
        })?;

    if !output.status.success() {
        return Err(HerdlogError::Probe {
            path: path.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    let info = parse_probe_output(path, &String::from_utf8_lossy(&output.stdout))?;
    debug!(
        path = %path.display(),
        frames = info.total_frames,
        rate = %info.frame_rate,
        "probed media file"
    );
    Ok(info)
}

/// Parse `ffprobe -of json` output into a [`MediaInfo`]. Split out so
/// the parsing can be exercised without running ffprobe.
fn parse_probe_output(path: &Path, json: &str) -> Result<MediaInfo> {
    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| HerdlogError::Probe {
        path: path.to_path_buf(),
        message: format!("unreadable ffprobe output: {e}"),
    })?;

    let video = parsed
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| HerdlogError::Probe {
            path: path.to_path_buf(),
            message: "no video stream".into(),
        })?;

    let frame_rate = video
        .r_frame_rate
        .as_deref()
        .and_then(|raw| FrameRate::from_fraction(raw).ok())
        .unwrap_or_default();

    let duration_seconds = parsed
        .format
        .and_then(|format| format.duration)
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(0.0);

    // Stream headers often omit nb_frames; fall back to duration x rate.
    let total_frames = video
        .nb_frames
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|&frames| frames > 0)
        .unwrap_or_else(|| (duration_seconds * frame_rate.to_fps_f64()).round() as i64);

    if total_frames <= 0 {
        return Err(HerdlogError::Probe {
            path: path.to_path_buf(),
            message: "could not determine frame count".into(),
        });
    }

    let has_audio = parsed
        .streams
        .iter()
        .any(|stream| stream.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        path: path.to_path_buf(),
        duration_seconds,
        frame_rate,
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        total_frames,
        has_audio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_report() {
        let json = r#"{
            "streams": [
                {"codec_type": "video", "width": 1920, "height": 1080,
                 "r_frame_rate": "25/1", "nb_frames": "250"},
                {"codec_type": "audio", "r_frame_rate": "0/0"}
            ],
            "format": {"duration": "10.000000"}
        }"#;
        let info = parse_probe_output(Path::new("cam_01.mp4"), json).unwrap();
        assert_eq!(info.total_frames, 250);
        assert_eq!(info.frame_rate, FrameRate::FPS_25);
        assert_eq!((info.width, info.height), (1920, 1080));
        assert!(info.has_audio);
        assert!((info.duration_seconds - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_nb_frames_falls_back_to_duration() {
        let json = r#"{
            "streams": [{"codec_type": "video", "r_frame_rate": "30000/1001"}],
            "format": {"duration": "2.002"}
        }"#;
        let info = parse_probe_output(Path::new("cam_02.mp4"), json).unwrap();
        assert_eq!(info.total_frames, 60);
        assert!(!info.has_audio);
    }

    #[test]
    fn test_unparsable_rate_defaults() {
        let json = r#"{
            "streams": [{"codec_type": "video", "r_frame_rate": "0/0", "nb_frames": "100"}],
            "format": {}
        }"#;
        let info = parse_probe_output(Path::new("cam_03.mp4"), json).unwrap();
        assert_eq!(info.frame_rate, FrameRate::default());
        assert_eq!(info.total_frames, 100);
    }

    #[test]
    fn test_rejects_audio_only_files() {
        let json = r#"{
            "streams": [{"codec_type": "audio"}],
            "format": {"duration": "3.0"}
        }"#;
        let err = parse_probe_output(Path::new("radio.mp3"), json).unwrap_err();
        assert!(matches!(err, HerdlogError::Probe { .. }));
    }

    #[test]
    fn test_rejects_zero_frames() {
        let json = r#"{
            "streams": [{"codec_type": "video", "r_frame_rate": "25/1"}],
            "format": {"duration": "0.0"}
        }"#;
        assert!(parse_probe_output(Path::new("empty.mp4"), json).is_err());
    }
}
