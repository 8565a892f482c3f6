//! Ordered clip sequence with cursor, selection and cached offsets.

use herdlog_core::{FrameRate, HerdlogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::clip::Clip;

/// An imported recording available for clip creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Path to the staged file
    pub path: PathBuf,
    /// Probed frame count (at least 1)
    pub total_frames: i64,
    /// Probed frame rate
    pub frame_rate: FrameRate,
}

impl Source {
    /// Create a new source entry.
    pub fn new(path: impl Into<PathBuf>, total_frames: i64, frame_rate: FrameRate) -> Self {
        Self {
            path: path.into(),
            total_frames,
            frame_rate,
        }
    }
}

/// Result of mapping a global timeline position onto a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionHit {
    /// Index of the clip covering the position
    pub index: usize,
    /// Offset from the clip's first timeline frame
    pub offset: i64,
    /// The same position expressed as a frame of the clip's source
    pub source_frame: i64,
}

/// Single-track edit model: ordered clips, the stored-source table, a
/// cursor and a selection.
///
/// Clip start offsets are a prefix sum over clip lengths, cached in
/// `offsets` (`offsets[i]` = first timeline frame of clip `i`, final
/// entry = total length) and rebuilt after every mutation.
#[derive(Debug, Default)]
pub struct Timeline {
    clips: Vec<Clip>,
    sources: Vec<Source>,
    position: i64,
    current: Option<usize>,
    selected: Option<usize>,
    offsets: Vec<i64>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Clips ──────────────────────────────────────────────────

    /// All clips in timeline order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// The clip at `index`.
    pub fn clip(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// True when the timeline holds no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Insert a clip at the given index (clamped to the end).
    pub fn insert_clip(&mut self, index: usize, clip: Clip) {
        let index = index.min(self.clips.len());
        self.clips.insert(index, clip);
        self.bump_indices_at(index);
        self.reindex();
    }

    /// Remove the clip at the given index. Returns the removed clip.
    pub fn remove_clip(&mut self, index: usize) -> Option<Clip> {
        if index >= self.clips.len() {
            return None;
        }
        let clip = self.clips.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        debug!(index, name = %clip.name, "removed clip");
        self.reindex();
        Some(clip)
    }

    /// Create a full-range clip from the stored source at `source_index`
    /// and insert it at `insert_at` (append by default). Returns the new
    /// clip's index.
    pub fn load_source(&mut self, source_index: usize, insert_at: Option<usize>) -> Option<usize> {
        let source = self.sources.get(source_index)?;
        let clip = Clip::from_source(&source.path, source.total_frames, source.frame_rate);
        let index = insert_at.unwrap_or(self.clips.len()).min(self.clips.len());
        debug!(source = %source.path.display(), index, "loaded source as clip");
        self.clips.insert(index, clip);
        self.bump_indices_at(index);
        self.reindex();
        Some(index)
    }

    /// Split the clip at `index` at a source frame strictly inside its
    /// trim range, producing two contiguous clips sharing the source.
    /// Boundary positions are rejected so no zero-length clip can arise.
    pub fn split_clip(&mut self, index: usize, frame: i64) -> Result<()> {
        let clip = self
            .clips
            .get(index)
            .ok_or_else(|| HerdlogError::Timeline(format!("no clip at index {index}")))?;
        if frame <= clip.in_point() || frame >= clip.out_point() {
            return Err(HerdlogError::Timeline(format!(
                "split frame {frame} is not inside ({}, {})",
                clip.in_point(),
                clip.out_point()
            )));
        }
        let mut right = self.clips[index].clone();
        right.set_in_point(frame);
        self.clips[index].set_out_point(frame);
        self.clips.insert(index + 1, right);
        debug!(index, frame, "split clip");
        self.bump_indices_at(index + 1);
        self.reindex();
        Ok(())
    }

    /// Split whichever clip covers the global `position`.
    pub fn split_at_position(&mut self, position: i64) -> Result<()> {
        let hit = self.clip_at(position).ok_or_else(|| {
            HerdlogError::Timeline(format!("no clip at position {position}"))
        })?;
        self.split_clip(hit.index, hit.source_frame)
    }

    /// Rename the clip at `index`.
    pub fn set_clip_name(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.clips.get_mut(index) {
            Some(clip) => {
                clip.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Set the play rate of the clip at `index`.
    pub fn set_play_rate(&mut self, index: usize, play_rate: f64) -> bool {
        match self.clips.get_mut(index) {
            Some(clip) => {
                clip.play_rate = play_rate;
                true
            }
            None => false,
        }
    }

    /// Set both trim points of one clip without touching its neighbours.
    /// Project restore path; ordinary edits go through the rippling
    /// setters instead.
    pub fn set_trim(&mut self, index: usize, in_point: i64, out_point: i64) -> bool {
        let Some(clip) = self.clips.get_mut(index) else {
            return false;
        };
        if !clip.set_window(in_point, out_point) {
            return false;
        }
        self.reindex();
        true
    }

    /// Move a clip's in point, rippling the previous clip's out point to
    /// the same boundary frame. The edit applies only if both touched
    /// clips stay valid; otherwise nothing changes.
    pub fn set_in_point(&mut self, index: usize, value: i64) -> bool {
        let Some(clip) = self.clips.get(index) else {
            return false;
        };
        let fits_here = 0 <= value && value < clip.out_point();
        let fits_prev = match index.checked_sub(1).and_then(|prev| self.clips.get(prev)) {
            Some(prev) => prev.in_point() < value && value <= prev.total_frames,
            None => true,
        };
        if !fits_here || !fits_prev {
            return false;
        }
        self.clips[index].set_in_point(value);
        if index > 0 {
            self.clips[index - 1].set_out_point(value);
        }
        self.reindex();
        true
    }

    /// Move a clip's out point, rippling the next clip's in point to the
    /// same boundary frame. The edit applies only if both touched clips
    /// stay valid; otherwise nothing changes.
    pub fn set_out_point(&mut self, index: usize, value: i64) -> bool {
        let Some(clip) = self.clips.get(index) else {
            return false;
        };
        let fits_here = clip.in_point() < value && value <= clip.total_frames;
        let fits_next = match self.clips.get(index + 1) {
            Some(next) => value < next.out_point(),
            None => true,
        };
        if !fits_here || !fits_next {
            return false;
        }
        self.clips[index].set_out_point(value);
        if let Some(next) = self.clips.get_mut(index + 1) {
            next.set_in_point(value);
        }
        self.reindex();
        true
    }

    /// Rebind the clip at `index` to the stored source at `source_index`
    /// (camera jump and the inspector's source combo).
    pub fn replace_clip_source(&mut self, index: usize, source_index: usize) -> bool {
        let Some(source) = self.sources.get(source_index).cloned() else {
            return false;
        };
        let Some(clip) = self.clips.get_mut(index) else {
            return false;
        };
        clip.rebind_source(&source.path, source.total_frames, source.frame_rate);
        debug!(index, source = %source.path.display(), "rebound clip source");
        self.reindex();
        true
    }

    // ── Sources ────────────────────────────────────────────────

    /// Stored sources in import order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The stored source at `index`.
    pub fn source(&self, index: usize) -> Option<&Source> {
        self.sources.get(index)
    }

    /// Store a source, deduplicating by path. Returns its index.
    pub fn add_source(&mut self, source: Source) -> usize {
        if let Some(index) = self.index_of_source(&source.path) {
            return index;
        }
        debug!(path = %source.path.display(), frames = source.total_frames, "stored source");
        self.sources.push(source);
        self.sources.len() - 1
    }

    /// Remove the stored source at `index`.
    pub fn remove_source(&mut self, index: usize) -> Option<Source> {
        if index >= self.sources.len() {
            return None;
        }
        Some(self.sources.remove(index))
    }

    /// Index of the stored source with the given path.
    pub fn index_of_source(&self, path: &Path) -> Option<usize> {
        self.sources.iter().position(|source| source.path == path)
    }

    // ── Cursor and selection ───────────────────────────────────

    /// Global cursor position in frames.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Move the cursor. Negative positions are rejected; positions past
    /// the end are allowed and yield no current clip.
    pub fn set_position(&mut self, value: i64) -> bool {
        if value < 0 {
            return false;
        }
        self.position = value;
        self.refresh_current();
        true
    }

    /// Index of the clip under the cursor, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The clip under the cursor, if any.
    pub fn current_clip(&self) -> Option<&Clip> {
        self.current.and_then(|index| self.clips.get(index))
    }

    /// Select a clip (or clear the selection with `None`).
    pub fn select(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= self.clips.len() => false,
            other => {
                self.selected = other;
                true
            }
        }
    }

    /// Index of the selected clip, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The selected clip, if any.
    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selected.and_then(|index| self.clips.get(index))
    }

    // ── Offsets ────────────────────────────────────────────────

    /// First timeline frame of the clip at `index` (sum of the lengths of
    /// clips `[0, index)`).
    pub fn start_of(&self, index: usize) -> Option<i64> {
        if index < self.clips.len() {
            Some(self.offsets[index])
        } else {
            None
        }
    }

    /// Total timeline length in frames.
    pub fn total_frames(&self) -> i64 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Map a global position to the clip covering it, by linear scan of
    /// the cached offsets.
    pub fn clip_at(&self, position: i64) -> Option<PositionHit> {
        if position < 0 {
            return None;
        }
        for (index, clip) in self.clips.iter().enumerate() {
            let start = self.offsets[index];
            let end = self.offsets[index + 1];
            if position >= start && position < end {
                let offset = position - start;
                return Some(PositionHit {
                    index,
                    offset,
                    source_frame: clip.in_point() + offset,
                });
            }
        }
        None
    }

    /// Drop every clip, source and selection and reset the cursor.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.sources.clear();
        self.position = 0;
        self.selected = None;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.offsets.clear();
        self.offsets.push(0);
        let mut total = 0;
        for clip in &self.clips {
            total += clip.len();
            self.offsets.push(total);
        }
        self.refresh_current();
    }

    fn refresh_current(&mut self) {
        self.current = self.clip_at(self.position).map(|hit| hit.index);
    }

    fn bump_indices_at(&mut self, inserted: usize) {
        if let Some(selected) = self.selected {
            if selected >= inserted {
                self.selected = Some(selected + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline_with(frames: &[i64]) -> Timeline {
        let mut timeline = Timeline::new();
        for (i, &total) in frames.iter().enumerate() {
            let source = Source::new(format!("barn/cam_{i:02}.mp4"), total, FrameRate::FPS_25);
            let index = timeline.add_source(source);
            timeline.load_source(index, None);
        }
        timeline
    }

    #[test]
    fn test_load_source_appends_full_range_clip() {
        let timeline = timeline_with(&[100, 50]);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.clip(0).unwrap().len(), 100);
        assert_eq!(timeline.clip(1).unwrap().len(), 50);
        assert_eq!(timeline.total_frames(), 150);
        assert_eq!(timeline.start_of(0), Some(0));
        assert_eq!(timeline.start_of(1), Some(100));
        assert_eq!(timeline.start_of(2), None);
    }

    #[test]
    fn test_add_source_dedups_by_path() {
        let mut timeline = Timeline::new();
        let a = timeline.add_source(Source::new("cam_01.mp4", 100, FrameRate::FPS_25));
        let b = timeline.add_source(Source::new("cam_01.mp4", 100, FrameRate::FPS_25));
        assert_eq!(a, b);
        assert_eq!(timeline.sources().len(), 1);

        assert!(timeline.remove_source(0).is_some());
        assert!(timeline.remove_source(0).is_none());
    }

    #[test]
    fn test_clip_at_maps_global_position() {
        let timeline = timeline_with(&[100, 50]);

        let first = timeline.clip_at(0).unwrap();
        assert_eq!((first.index, first.offset, first.source_frame), (0, 0, 0));

        let boundary = timeline.clip_at(100).unwrap();
        assert_eq!(boundary.index, 1);
        assert_eq!(boundary.source_frame, 0);

        assert!(timeline.clip_at(150).is_none());
        assert!(timeline.clip_at(-1).is_none());
    }

    #[test]
    fn test_clip_at_accounts_for_trim() {
        let mut timeline = timeline_with(&[100]);
        assert!(timeline.set_trim(0, 30, 80));
        assert_eq!(timeline.total_frames(), 50);

        let hit = timeline.clip_at(10).unwrap();
        assert_eq!(hit.source_frame, 40);
    }

    #[test]
    fn test_split_produces_contiguous_halves() {
        let mut timeline = timeline_with(&[100]);
        timeline.split_clip(0, 40).unwrap();

        assert_eq!(timeline.len(), 2);
        let left = timeline.clip(0).unwrap();
        let right = timeline.clip(1).unwrap();
        assert_eq!((left.in_point(), left.out_point()), (0, 40));
        assert_eq!((right.in_point(), right.out_point()), (40, 100));
        assert_eq!(left.source, right.source);
        assert_eq!(timeline.total_frames(), 100);
    }

    #[test]
    fn test_split_rejects_boundaries() {
        let mut timeline = timeline_with(&[100]);
        assert!(timeline.split_clip(0, 0).is_err());
        assert!(timeline.split_clip(0, 100).is_err());
        assert!(timeline.split_clip(1, 50).is_err());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_split_at_position_uses_source_frames() {
        let mut timeline = timeline_with(&[100, 100]);
        assert!(timeline.set_trim(1, 20, 90));

        // Global 110 lands 10 frames into the second clip.
        timeline.split_at_position(110).unwrap();
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.clip(1).unwrap().out_point(), 30);
        assert_eq!(timeline.clip(2).unwrap().in_point(), 30);
    }

    #[test]
    fn test_set_in_point_ripples_previous_out() {
        let mut timeline = timeline_with(&[100, 100]);
        assert!(timeline.set_in_point(1, 40));
        assert_eq!(timeline.clip(0).unwrap().out_point(), 40);
        assert_eq!(timeline.clip(1).unwrap().in_point(), 40);
        assert_eq!(timeline.total_frames(), 140);
    }

    #[test]
    fn test_ripple_rejected_when_either_side_breaks() {
        let mut timeline = timeline_with(&[100, 100]);

        // Would leave the previous clip zero-length.
        assert!(!timeline.set_in_point(1, 0));
        // Would push the previous clip past its source.
        assert!(!timeline.set_in_point(1, 101));
        // Would leave the next clip zero-length.
        assert!(timeline.set_in_point(1, 40));
        assert!(!timeline.set_out_point(0, 100));

        assert_eq!(timeline.clip(0).unwrap().out_point(), 40);
        assert_eq!(timeline.clip(1).unwrap().in_point(), 40);
    }

    #[test]
    fn test_set_out_point_ripples_next_in() {
        let mut timeline = timeline_with(&[100, 100]);
        assert!(timeline.set_out_point(0, 99));
        assert_eq!(timeline.clip(0).unwrap().out_point(), 99);
        assert_eq!(timeline.clip(1).unwrap().in_point(), 99);
        assert_eq!(timeline.total_frames(), 100);
    }

    #[test]
    fn test_trim_at_sequence_edges_has_no_neighbour_gate() {
        let mut timeline = timeline_with(&[100, 100]);
        assert!(timeline.set_in_point(0, 10));
        assert!(timeline.set_out_point(1, 90));
        assert_eq!(timeline.total_frames(), 180);
    }

    #[test]
    fn test_cursor_rejects_negative_allows_past_end() {
        let mut timeline = timeline_with(&[100]);
        assert!(!timeline.set_position(-1));
        assert_eq!(timeline.position(), 0);

        assert!(timeline.set_position(50));
        assert_eq!(timeline.current_index(), Some(0));

        assert!(timeline.set_position(500));
        assert_eq!(timeline.current_index(), None);
    }

    #[test]
    fn test_current_follows_edits() {
        let mut timeline = timeline_with(&[100, 100]);
        timeline.set_position(149);
        assert_eq!(timeline.current_index(), Some(1));

        timeline.split_clip(0, 50).unwrap();
        assert_eq!(timeline.current_index(), Some(2));

        timeline.remove_clip(0);
        assert_eq!(timeline.current_index(), Some(1));
    }

    #[test]
    fn test_selection_tracks_removals_and_inserts() {
        let mut timeline = timeline_with(&[100, 100, 100]);
        assert!(!timeline.select(Some(3)));
        assert!(timeline.select(Some(2)));

        timeline.remove_clip(0);
        assert_eq!(timeline.selected_index(), Some(1));

        timeline.load_source(0, Some(0));
        assert_eq!(timeline.selected_index(), Some(2));

        timeline.remove_clip(2);
        assert_eq!(timeline.selected_index(), None);
    }

    #[test]
    fn test_replace_clip_source_rebinds() {
        let mut timeline = timeline_with(&[100]);
        let short = timeline.add_source(Source::new("barn/cam_09.mp4", 10, FrameRate::FPS_25));
        assert!(timeline.set_trim(0, 20, 80));

        assert!(timeline.replace_clip_source(0, short));
        let clip = timeline.clip(0).unwrap();
        assert_eq!(clip.source, Path::new("barn/cam_09.mp4"));
        assert!(clip.is_valid());
        assert_eq!((clip.in_point(), clip.out_point()), (2, 8));
        assert_eq!(timeline.total_frames(), 6);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut timeline = timeline_with(&[100, 100]);
        timeline.set_position(120);
        timeline.select(Some(1));
        timeline.clear();

        assert!(timeline.is_empty());
        assert!(timeline.sources().is_empty());
        assert_eq!(timeline.position(), 0);
        assert_eq!(timeline.current_index(), None);
        assert_eq!(timeline.selected_index(), None);
        assert_eq!(timeline.total_frames(), 0);
    }
}
