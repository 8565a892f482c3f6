//! Export pipeline for rendering the timeline to a video file.
//!
//! Uses FFmpeg via the sidecar process for encoding. Each clip is cut
//! with input-side seeking, the cuts are concatenated through a filter
//! graph and encoded in one or two passes (audio first when it is
//! kept), with progress reporting and cancellation.

use crossbeam_channel::{unbounded, Receiver};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use herdlog_core::{frames_to_time_string, FrameRate, HerdlogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};

// ── Encoder presets ──────────────────────────────────────────────

/// Video encoder offered in the export dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodec {
    H264Nvenc,
    HevcNvenc,
    Mpeg4,
    Libx264,
}

impl VideoCodec {
    /// Encoders in dialog order, hardware encoders first.
    pub const ALL: [VideoCodec; 4] = [
        VideoCodec::H264Nvenc,
        VideoCodec::HevcNvenc,
        VideoCodec::Mpeg4,
        VideoCodec::Libx264,
    ];

    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264Nvenc => "h264_nvenc",
            Self::HevcNvenc => "hevc_nvenc",
            Self::Mpeg4 => "mpeg4",
            Self::Libx264 => "libx264",
        }
    }
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ffmpeg_encoder())
    }
}

/// Output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Sizes offered in the export dialog, largest first.
    pub const PRESETS: [Resolution; 8] = [
        Resolution::new(1920, 1080),
        Resolution::new(1600, 900),
        Resolution::new(1440, 900),
        Resolution::new(1360, 768),
        Resolution::new(1280, 720),
        Resolution::new(1024, 768),
        Resolution::new(800, 600),
        Resolution::new(640, 360),
    ];

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Lowest selectable video bitrate in kbit/s.
pub const MIN_BITRATE_KBPS: u32 = 5;
/// Highest selectable video bitrate in kbit/s.
pub const MAX_BITRATE_KBPS: u32 = 5000;

/// Default encoder thread count for this machine.
pub fn default_threads() -> usize {
    if num_cpus::get() >= 4 {
        2
    } else {
        1
    }
}

/// Upper bound for the thread setting.
pub fn available_threads() -> usize {
    num_cpus::get()
}

/// Everything the export dialog collects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output file path
    pub output: PathBuf,
    /// Video encoder
    pub codec: VideoCodec,
    /// Output frame size
    pub resolution: Resolution,
    /// Video bitrate in kbit/s
    pub bitrate_kbps: u32,
    /// Encoder thread count (0 lets FFmpeg decide)
    pub threads: usize,
    /// Whether to carry the audio track
    pub include_audio: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::new(),
            codec: VideoCodec::H264Nvenc,
            resolution: Resolution::PRESETS[0],
            bitrate_kbps: 50,
            threads: default_threads(),
            include_audio: true,
        }
    }
}

// ── Export job ───────────────────────────────────────────────────

/// One trimmed piece of a recording, in timeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub source: PathBuf,
    pub in_point: i64,
    pub out_point: i64,
    pub frame_rate: FrameRate,
}

impl Segment {
    pub fn new(
        source: impl Into<PathBuf>,
        in_point: i64,
        out_point: i64,
        frame_rate: FrameRate,
    ) -> Self {
        Self {
            source: source.into(),
            in_point,
            out_point,
            frame_rate,
        }
    }

    /// Length of the cut in frames.
    pub fn len(&self) -> i64 {
        self.out_point - self.in_point
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

/// Encoding phase currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Audio,
    Video,
}

/// Export progress information.
#[derive(Debug, Clone, Copy)]
pub struct ExportProgress {
    /// Phase the numbers belong to
    pub phase: ExportPhase,
    /// Frames encoded so far in this phase
    pub frame: i64,
    /// Total frames of the final video
    pub total_frames: i64,
}

impl ExportProgress {
    /// Completion fraction (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.frame as f64 / self.total_frames as f64).clamp(0.0, 1.0)
    }
}

/// A validated export job: settings plus the timeline cuts to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub settings: ExportSettings,
    pub segments: Vec<Segment>,
}

impl ExportJob {
    /// Build a job, rejecting empty timelines and missing output paths
    /// before any encoder is spawned.
    pub fn new(settings: ExportSettings, segments: Vec<Segment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(HerdlogError::EmptyTimeline);
        }
        if settings.output.as_os_str().is_empty() {
            return Err(HerdlogError::NoOutputSelected);
        }
        Ok(Self { settings, segments })
    }

    /// Total frames of the final video.
    pub fn total_frames(&self) -> i64 {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Companion file carrying the concatenated audio between passes.
    pub fn temp_audio_path(&self) -> PathBuf {
        let stem = self
            .settings
            .output
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        self.settings
            .output
            .with_file_name(format!("{stem}_temp_audio.mp3"))
    }

    /// FFmpeg arguments for the video pass. With `audio_input` the
    /// prepared audio track is muxed in; without it audio is dropped.
    pub fn video_args(&self, audio_input: Option<&Path>) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into()];
        self.push_segment_inputs(&mut args);
        if let Some(audio) = audio_input {
            args.extend_from_slice(&["-i".into(), audio.to_string_lossy().into_owned()]);
        }

        let mut filter = String::new();
        for i in 0..self.segments.len() {
            filter.push_str(&format!(
                "[{i}:v:0]scale={}:{},setsar=1,setpts=PTS-STARTPTS[v{i}];",
                self.settings.resolution.width, self.settings.resolution.height
            ));
        }
        for i in 0..self.segments.len() {
            filter.push_str(&format!("[v{i}]"));
        }
        filter.push_str(&format!("concat=n={}:v=1:a=0[outv]", self.segments.len()));

        args.extend_from_slice(&[
            "-filter_complex".into(),
            filter,
            "-map".into(),
            "[outv]".into(),
        ]);

        if audio_input.is_some() {
            args.extend_from_slice(&[
                "-map".into(),
                format!("{}:a:0", self.segments.len()),
                "-c:a".into(),
                "aac".into(),
            ]);
        } else {
            args.push("-an".into());
        }

        args.extend_from_slice(&[
            "-c:v".into(),
            self.settings.codec.ffmpeg_encoder().into(),
            "-b:v".into(),
            format!("{}k", self.settings.bitrate_kbps),
            "-threads".into(),
            self.settings.threads.to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ]);

        args.push(self.settings.output.to_string_lossy().into_owned());
        args
    }

    /// FFmpeg arguments for the audio pass, concatenating every cut's
    /// audio into the temp file.
    pub fn audio_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into()];
        self.push_segment_inputs(&mut args);

        let mut filter = String::new();
        for i in 0..self.segments.len() {
            filter.push_str(&format!("[{i}:a:0]asetpts=PTS-STARTPTS[a{i}];"));
        }
        for i in 0..self.segments.len() {
            filter.push_str(&format!("[a{i}]"));
        }
        filter.push_str(&format!("concat=n={}:v=0:a=1[outa]", self.segments.len()));

        args.extend_from_slice(&[
            "-filter_complex".into(),
            filter,
            "-map".into(),
            "[outa]".into(),
            "-vn".into(),
        ]);
        args.push(self.temp_audio_path().to_string_lossy().into_owned());
        args
    }

    /// Each cut becomes one input, seeked and bounded on the input side
    /// so only the trimmed window is read.
    fn push_segment_inputs(&self, args: &mut Vec<String>) {
        for segment in &self.segments {
            args.extend_from_slice(&[
                "-ss".into(),
                frames_to_time_string(segment.in_point, segment.frame_rate),
                "-to".into(),
                frames_to_time_string(segment.out_point, segment.frame_rate),
                "-i".into(),
                segment.source.to_string_lossy().into_owned(),
            ]);
        }
    }

    /// Run the export on the calling thread.
    ///
    /// * `on_progress` – called for every FFmpeg progress report.
    /// * `cancel` – checked between events; cancelling kills the
    ///   encoder and removes the partial output and temp audio.
    pub fn run(&self, on_progress: impl Fn(ExportProgress), cancel: &ExportCancel) -> Result<()> {
        crate::require_ffmpeg()?;
        let total_frames = self.total_frames();
        let temp_audio = self.temp_audio_path();
        info!(
            output = %self.settings.output.display(),
            cuts = self.segments.len(),
            frames = total_frames,
            "starting export"
        );

        let result = if self.settings.include_audio {
            self.run_pass(
                &self.audio_args(),
                ExportPhase::Audio,
                total_frames,
                &on_progress,
                cancel,
            )
            .and_then(|()| {
                self.run_pass(
                    &self.video_args(Some(&temp_audio)),
                    ExportPhase::Video,
                    total_frames,
                    &on_progress,
                    cancel,
                )
            })
        } else {
            self.run_pass(
                &self.video_args(None),
                ExportPhase::Video,
                total_frames,
                &on_progress,
                cancel,
            )
        };

        if self.settings.include_audio && temp_audio.exists() {
            if let Err(e) = fs::remove_file(&temp_audio) {
                warn!(path = %temp_audio.display(), error = %e, "could not remove temp audio");
            }
        }
        if matches!(result, Err(HerdlogError::Cancelled)) {
            let _ = fs::remove_file(&self.settings.output);
        }
        match &result {
            Ok(()) => info!(output = %self.settings.output.display(), "export finished"),
            Err(e) => warn!(error = %e, "export did not complete"),
        }
        result
    }

    fn run_pass(
        &self,
        args: &[String],
        phase: ExportPhase,
        total_frames: i64,
        on_progress: &impl Fn(ExportProgress),
        cancel: &ExportCancel,
    ) -> Result<()> {
        let mut cmd = FfmpegCommand::new();
        cmd.args(args);
        let mut child = cmd
            .spawn()
            .map_err(|e| HerdlogError::Encoder(format!("ffmpeg spawn failed: {e}")))?;

        let events = child
            .iter()
            .map_err(|e| HerdlogError::Encoder(format!("ffmpeg event stream failed: {e}")))?;

        let mut error_lines: Vec<String> = Vec::new();
        for event in events {
            if cancel.is_cancelled() {
                if let Err(e) = child.kill() {
                    warn!(error = %e, "could not kill ffmpeg after cancel");
                }
                let _ = child.wait();
                return Err(HerdlogError::Cancelled);
            }
            match event {
                FfmpegEvent::Progress(progress) => on_progress(ExportProgress {
                    phase,
                    frame: i64::from(progress.frame),
                    total_frames,
                }),
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                    warn!(%line, "ffmpeg");
                    error_lines.push(line);
                }
                _ => {}
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(HerdlogError::Encoder(if error_lines.is_empty() {
                format!("ffmpeg exited with {status}")
            } else {
                error_lines.join("\n")
            }));
        }
        Ok(())
    }
}

// ── Worker thread ────────────────────────────────────────────────

/// Handle for cancelling an in-progress export.
#[derive(Debug, Clone)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for ExportCancel {
    fn default() -> Self {
        Self::new()
    }
}

/// Events an export worker sends back to the UI thread.
#[derive(Debug)]
pub enum ExportEvent {
    Progress(ExportProgress),
    Finished(PathBuf),
    Failed(String),
    Cancelled,
}

/// A running export on its own worker thread. Dropping the handle
/// cancels the job and waits for the worker to stop.
#[derive(Debug)]
pub struct ExportHandle {
    cancel: ExportCancel,
    events: Receiver<ExportEvent>,
    thread: Option<JoinHandle<()>>,
}

impl ExportHandle {
    /// Start the job on a worker thread and return immediately.
    pub fn start(job: ExportJob) -> Self {
        let cancel = ExportCancel::new();
        let (sender, events) = unbounded();
        let worker_cancel = cancel.clone();
        let thread = std::thread::spawn(move || {
            let progress_sender = sender.clone();
            let result = job.run(
                move |progress| {
                    let _ = progress_sender.send(ExportEvent::Progress(progress));
                },
                &worker_cancel,
            );
            let event = match result {
                Ok(()) => ExportEvent::Finished(job.settings.output.clone()),
                Err(HerdlogError::Cancelled) => ExportEvent::Cancelled,
                Err(e) => ExportEvent::Failed(e.to_string()),
            };
            let _ = sender.send(event);
        });
        Self {
            cancel,
            events,
            thread: Some(thread),
        }
    }

    /// Channel of progress and completion events.
    pub fn events(&self) -> &Receiver<ExportEvent> {
        &self.events
    }

    /// Ask the worker to stop at the next opportunity.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ExportHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
