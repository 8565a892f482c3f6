//! Spatial camera layout.
//!
//! Maps each recording to up to eight neighbouring cameras, one per
//! compass direction. Entries are keyed by the recording's relative
//! path with the wrapper pattern stripped, so every clip cut from the
//! same camera resolves to the same entry.

use herdlog_core::{HerdlogError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Pattern stripped from file names to form adjacency keys: a
/// separator, a numbered suffix and the container extension.
pub const DEFAULT_WRAPPER: &str = r"(_|\.|-)[\d_]+.(mp4|webm|dav)";

/// Compass direction from one camera to a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Short key used in the persisted map.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }

    /// Human-readable name for labels.
    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::NorthEast => "North-East",
            Direction::East => "East",
            Direction::SouthEast => "South-East",
            Direction::South => "South",
            Direction::SouthWest => "South-West",
            Direction::West => "West",
            Direction::NorthWest => "North-West",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Neighbour keys of a single camera. Unset directions persist as
/// `null` so a saved entry always shows all eight slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Neighbors {
    #[serde(rename = "N")]
    pub n: Option<String>,
    #[serde(rename = "NE")]
    pub ne: Option<String>,
    #[serde(rename = "E")]
    pub e: Option<String>,
    #[serde(rename = "SE")]
    pub se: Option<String>,
    #[serde(rename = "S")]
    pub s: Option<String>,
    #[serde(rename = "SW")]
    pub sw: Option<String>,
    #[serde(rename = "W")]
    pub w: Option<String>,
    #[serde(rename = "NW")]
    pub nw: Option<String>,
}

impl Neighbors {
    /// The neighbour key in the given direction.
    pub fn get(&self, direction: Direction) -> Option<&str> {
        let slot = match direction {
            Direction::North => &self.n,
            Direction::NorthEast => &self.ne,
            Direction::East => &self.e,
            Direction::SouthEast => &self.se,
            Direction::South => &self.s,
            Direction::SouthWest => &self.sw,
            Direction::West => &self.w,
            Direction::NorthWest => &self.nw,
        };
        slot.as_deref()
    }

    /// Assign (or clear) the neighbour key in the given direction.
    pub fn set(&mut self, direction: Direction, key: Option<String>) {
        let slot = match direction {
            Direction::North => &mut self.n,
            Direction::NorthEast => &mut self.ne,
            Direction::East => &mut self.e,
            Direction::SouthEast => &mut self.se,
            Direction::South => &mut self.s,
            Direction::SouthWest => &mut self.sw,
            Direction::West => &mut self.w,
            Direction::NorthWest => &mut self.nw,
        };
        *slot = key;
    }

    /// True when all eight directions are unset.
    pub fn is_empty(&self) -> bool {
        Direction::ALL.iter().all(|&d| self.get(d).is_none())
    }
}

/// Serialized shape: the wrapper pattern under `"WRAPPER"` plus one
/// entry per camera key.
#[derive(Serialize, Deserialize)]
struct AdjacencyFile {
    #[serde(rename = "WRAPPER")]
    wrapper: String,
    #[serde(flatten)]
    entries: BTreeMap<String, Neighbors>,
}

/// Camera layout keyed by wrapper-stripped relative source paths.
#[derive(Debug, Clone)]
pub struct AdjacencyMap {
    pattern: String,
    wrapper: Regex,
    entries: BTreeMap<String, Neighbors>,
}

impl Default for AdjacencyMap {
    fn default() -> Self {
        Self::with_pattern(DEFAULT_WRAPPER).expect("default wrapper pattern compiles")
    }
}

impl AdjacencyMap {
    /// Create an empty map with a custom wrapper pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let wrapper =
            Regex::new(pattern).map_err(|e| HerdlogError::InvalidWrapper(e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_owned(),
            wrapper,
            entries: BTreeMap::new(),
        })
    }

    /// The wrapper pattern currently in force.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Replace the wrapper pattern. Existing entry keys are untouched.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<()> {
        let wrapper =
            Regex::new(pattern).map_err(|e| HerdlogError::InvalidWrapper(e.to_string()))?;
        self.pattern = pattern.to_owned();
        self.wrapper = wrapper;
        Ok(())
    }

    /// Strip the wrapper from a relative source path to form its entry
    /// key. Already-stripped keys pass through unchanged.
    pub fn key_for(&self, relative_source: &str) -> String {
        self.wrapper.replace_all(relative_source, "").into_owned()
    }

    /// The full neighbour record for a key, if an entry exists.
    pub fn neighbors(&self, key: &str) -> Option<&Neighbors> {
        self.entries.get(key)
    }

    /// The neighbour key of `key` in the given direction.
    pub fn neighbor(&self, key: &str, direction: Direction) -> Option<&str> {
        self.entries.get(key)?.get(direction)
    }

    /// Assign (or clear) a neighbour, creating the entry on first touch.
    /// Entries persist even when every direction is later cleared.
    pub fn set_neighbor(&mut self, key: &str, direction: Direction, neighbor: Option<String>) {
        self.entries
            .entry(key.to_owned())
            .or_default()
            .set(direction, neighbor);
    }

    /// All entries, ordered by key.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Neighbors)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow `direction` from `key` and pick the first of `sources`
    /// (relative paths) belonging to the neighbouring camera. Neighbour
    /// keys are wrapper-stripped, so matching is by prefix.
    pub fn resolve<'a>(
        &self,
        key: &str,
        direction: Direction,
        sources: impl IntoIterator<Item = &'a str>,
    ) -> Option<&'a str> {
        let neighbor = self.neighbor(key, direction)?;
        sources
            .into_iter()
            .find(|source| source.starts_with(neighbor))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let file = AdjacencyFile {
            wrapper: self.pattern.clone(),
            entries: self.entries.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| HerdlogError::Serialization(e.to_string()))
    }

    /// Parse a map from JSON produced by [`AdjacencyMap::to_json`].
    pub fn from_json(text: &str) -> Result<Self> {
        let file: AdjacencyFile =
            serde_json::from_str(text).map_err(|e| HerdlogError::Serialization(e.to_string()))?;
        let mut map = Self::with_pattern(&file.wrapper)?;
        map.entries = file.entries;
        Ok(map)
    }

    /// Write the map to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a map from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
