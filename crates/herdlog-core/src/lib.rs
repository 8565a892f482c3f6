//! Herdlog Core - Foundation types for the footage logger
//!
//! This crate provides the fundamental types used throughout Herdlog:
//! - Frame-rate fractions and frame/timecode conversions
//! - The shared error and result types

pub mod error;
pub mod time;

pub use error::{HerdlogError, Result};
pub use time::{frames_to_time_string, time_string_to_frames, FrameRate};
