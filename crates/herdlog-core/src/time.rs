//! Frame counts and wall-clock timecodes
//!
//! Trim points and the timeline cursor are integer frame counts; the UI
//! and the encoder speak `HH:MM:SS.mmm` strings. Rational arithmetic
//! keeps the conversions exact for fractional rates such as 30000/1001.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HerdlogError, Result};

/// Frame rate as a rational number (e.g. 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g. 30000)
    pub numerator: u32,
    /// Denominator (e.g. 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Parse an ffprobe fraction string such as `"25/1"`, `"30000/1001"`
    /// or a bare `"25"`.
    pub fn from_fraction(text: &str) -> Result<Self> {
        let (numerator, denominator) = match text.trim().split_once('/') {
            Some((n, d)) => (n.parse::<u32>(), d.parse::<u32>()),
            None => (text.trim().parse::<u32>(), Ok(1)),
        };
        match (numerator, denominator) {
            (Ok(n), Ok(d)) if n > 0 && d > 0 => Ok(Self::new(n, d)),
            _ => Err(HerdlogError::InvalidFrameRate(text.to_string())),
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Frames per second as an exact ratio.
    #[inline]
    fn as_ratio(self) -> Rational64 {
        Rational64::new(self.numerator as i64, self.denominator as i64)
    }

    /// Common frame rates
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_25
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// Total milliseconds for a frame count, rounded to the nearest millisecond.
fn frames_to_millis(frames: i64, rate: FrameRate) -> i64 {
    let millis = Rational64::new(frames * 1000, 1) / rate.as_ratio();
    millis.round().to_integer()
}

/// Frame count for total milliseconds, rounded to the nearest frame.
fn millis_to_frames(millis: i64, rate: FrameRate) -> i64 {
    let frames = Rational64::new(millis, 1000) * rate.as_ratio();
    frames.round().to_integer()
}

/// Format a frame count as `HH:MM:SS.mmm` wall-clock text.
///
/// Round-trips exactly through [`time_string_to_frames`] for every rate
/// below 1000 fps: rounding to the nearest millisecond displaces the value
/// by at most half a frame, and the inverse rounds back to the frame.
pub fn frames_to_time_string(frames: i64, rate: FrameRate) -> String {
    let total_ms = frames_to_millis(frames.max(0), rate);
    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let seconds = total_ms / 1000 % 60;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Parse `HH:MM:SS.mmm` text back into a frame count at the given rate.
pub fn time_string_to_frames(text: &str, rate: FrameRate) -> Result<i64> {
    let invalid = || HerdlogError::InvalidTimecode(text.to_string());
    let parts: Vec<&str> = text.trim().split(|c| c == ':' || c == '.').collect();
    if parts.len() != 4 {
        return Err(invalid());
    }
    let hours = parts[0].parse::<i64>().map_err(|_| invalid())?;
    let minutes = parts[1].parse::<i64>().map_err(|_| invalid())?;
    let seconds = parts[2].parse::<i64>().map_err(|_| invalid())?;
    let millis = parts[3].parse::<i64>().map_err(|_| invalid())?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) || !(0..1000).contains(&millis)
    {
        return Err(invalid());
    }
    let total_ms = ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis;
    Ok(millis_to_frames(total_ms, rate))
}
