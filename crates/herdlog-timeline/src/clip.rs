//! Clip entity for the timeline.

use herdlog_core::FrameRate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A trimmed segment of a source recording.
///
/// Trim points are a half-open frame range `[in_point, out_point)` into
/// the source file. Every clip the model hands out satisfies
/// `0 <= in_point < out_point <= total_frames`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Path to the staged source file
    pub source: PathBuf,
    /// Name shown on the timeline strip
    pub name: String,
    /// Number of frames in the source file
    pub total_frames: i64,
    /// Frame rate of the source file
    pub frame_rate: FrameRate,
    /// Playback speed (1.0 = normal; persisted, reserved for speed control)
    pub play_rate: f64,
    in_point: i64,
    out_point: i64,
}

impl Clip {
    /// Create a clip spanning the whole source file.
    pub fn from_source(
        source: impl Into<PathBuf>,
        total_frames: i64,
        frame_rate: FrameRate,
    ) -> Self {
        let source = source.into();
        let name = display_name(&source);
        Self {
            source,
            name,
            total_frames,
            frame_rate,
            play_rate: 1.0,
            in_point: 0,
            out_point: total_frames,
        }
    }

    /// First source frame of the trim range (inclusive).
    #[inline]
    pub fn in_point(&self) -> i64 {
        self.in_point
    }

    /// Frame one past the trim range.
    #[inline]
    pub fn out_point(&self) -> i64 {
        self.out_point
    }

    /// Trimmed length in frames.
    #[inline]
    pub fn len(&self) -> i64 {
        self.out_point - self.in_point
    }

    /// True when the trim range has no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Check the trim invariant against the source length.
    pub fn is_valid(&self) -> bool {
        0 <= self.in_point && self.in_point < self.out_point && self.out_point <= self.total_frames
    }

    /// Move the in point. Values that would break the invariant are
    /// rejected and leave the clip untouched.
    pub fn set_in_point(&mut self, value: i64) -> bool {
        if 0 <= value && value < self.out_point {
            self.in_point = value;
            true
        } else {
            false
        }
    }

    /// Move the out point. Values that would break the invariant are
    /// rejected and leave the clip untouched.
    pub fn set_out_point(&mut self, value: i64) -> bool {
        if self.in_point < value && value <= self.total_frames {
            self.out_point = value;
            true
        } else {
            false
        }
    }

    /// Set both trim points at once, validated as a pair. Used when
    /// restoring a persisted window that need not overlap the current one.
    pub(crate) fn set_window(&mut self, in_point: i64, out_point: i64) -> bool {
        if 0 <= in_point && in_point < out_point && out_point <= self.total_frames {
            self.in_point = in_point;
            self.out_point = out_point;
            true
        } else {
            false
        }
    }

    /// Swap the underlying source while keeping the trim window.
    ///
    /// The window is kept verbatim when it fits the new source and
    /// rescaled proportionally when the new source is shorter, so the
    /// invariant holds either way.
    pub fn rebind_source(
        &mut self,
        source: impl Into<PathBuf>,
        total_frames: i64,
        frame_rate: FrameRate,
    ) {
        let source = source.into();
        self.name = display_name(&source);
        self.source = source;
        self.frame_rate = frame_rate;
        if self.out_point > total_frames {
            let old_total = self.total_frames.max(1);
            let scaled_out = (self.out_point * total_frames / old_total).clamp(1, total_frames);
            let scaled_in = (self.in_point * total_frames / old_total).clamp(0, scaled_out - 1);
            self.in_point = scaled_in;
            self.out_point = scaled_out;
        }
        self.total_frames = total_frames;
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(total: i64) -> Clip {
        Clip::from_source("barn/cam_01.mp4", total, FrameRate::FPS_25)
    }

    #[test]
    fn test_full_range_on_creation() {
        let clip = clip(500);
        assert_eq!(clip.in_point(), 0);
        assert_eq!(clip.out_point(), 500);
        assert_eq!(clip.len(), 500);
        assert_eq!(clip.name, "cam_01.mp4");
        assert!(clip.is_valid());
    }

    #[test]
    fn test_setters_guard_invariant() {
        let mut clip = clip(500);
        assert!(clip.set_in_point(100));
        assert!(clip.set_out_point(400));
        assert_eq!((clip.in_point(), clip.out_point()), (100, 400));

        assert!(!clip.set_in_point(-1));
        assert!(!clip.set_in_point(400));
        assert!(!clip.set_out_point(100));
        assert!(!clip.set_out_point(501));
        assert_eq!((clip.in_point(), clip.out_point()), (100, 400));
        assert!(clip.is_valid());
    }

    #[test]
    fn test_rebind_keeps_fitting_window() {
        let mut clip = clip(500);
        clip.set_in_point(100);
        clip.set_out_point(400);
        clip.rebind_source("barn/cam_02.mp4", 450, FrameRate::FPS_25);
        assert_eq!((clip.in_point(), clip.out_point()), (100, 400));
        assert_eq!(clip.total_frames, 450);
        assert_eq!(clip.name, "cam_02.mp4");
    }

    #[test]
    fn test_rebind_rescales_into_shorter_source() {
        let mut clip = clip(1000);
        clip.set_in_point(200);
        clip.set_out_point(800);
        clip.rebind_source("barn/cam_03.mp4", 100, FrameRate::FPS_25);
        assert_eq!((clip.in_point(), clip.out_point()), (20, 80));
        assert!(clip.is_valid());
    }

    #[test]
    fn test_rebind_never_collapses_to_zero() {
        let mut clip = clip(1000);
        clip.set_in_point(998);
        clip.set_out_point(1000);
        clip.rebind_source("barn/cam_04.mp4", 10, FrameRate::FPS_25);
        assert!(clip.is_valid());
        assert!(clip.len() >= 1);
    }
}
