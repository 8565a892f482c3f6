//! Herdlog Timeline - Edit model for barn camera footage
//!
//! Implements the single-track edit model:
//! - Clips with frame-accurate trim windows
//! - Timeline with cursor, selection, split and ripple edits
//! - Camera adjacency map for directional jumps
//! - Project sidecar persistence

pub mod adjacency;
pub mod clip;
pub mod project;
pub mod timeline;

pub use adjacency::{AdjacencyMap, Direction, Neighbors, DEFAULT_WRAPPER};
pub use clip::Clip;
pub use project::{
    copy_media, load_sidecars, media_files, relative_source, save_sidecars, ClipRecord,
    ADJACENCY_FILE, CLIPS_FILE,
};
pub use timeline::{PositionHit, Source, Timeline};
