//! Core types for mood-harmony
//!
//! This module defines the data structures shared by every stage: mood sectors,
//! mood samples, per-sector distribution buckets, chord transition graphs, and
//! the culture catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::HarmonyError;

/// Number of sectors on the mood wheel
pub const SECTOR_COUNT: u8 = 8;

/// Canonical sector labels, counter-clockwise from 0 rad
pub const SECTOR_LABELS: [&str; SECTOR_COUNT as usize] = [
    "Energetic/Joyful",
    "Excited/Surprised",
    "Agitated/Angry",
    "Heavy/Majestic",
    "Dark/Depressed",
    "Tragic/Yearning",
    "Dreamy/Sentimental",
    "Calm/Relaxed",
];

/// Canonical sector colors, index-aligned with [`SECTOR_LABELS`]
pub const SECTOR_COLORS: [&str; SECTOR_COUNT as usize] = [
    "#FCD34D", "#FB923C", "#EF4444", "#B91C1C", "#3B82F6", "#6B7280", "#10B981", "#A855F7",
];

/// One of the eight equal angular partitions of the mood wheel.
///
/// Sector `i` covers `[i·45°, (i+1)·45°)`, measured counter-clockwise from the
/// positive x axis. Always holds a value in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Sector(u8);

impl Sector {
    /// All sectors in index order
    pub const ALL: [Sector; SECTOR_COUNT as usize] = [
        Sector(0),
        Sector(1),
        Sector(2),
        Sector(3),
        Sector(4),
        Sector(5),
        Sector(6),
        Sector(7),
    ];

    /// Create a sector, rejecting indices outside `0..8`
    pub fn new(index: u8) -> Result<Self, HarmonyError> {
        if index < SECTOR_COUNT {
            Ok(Self(index))
        } else {
            Err(HarmonyError::InvalidSector(index))
        }
    }

    /// Create a sector from any integer, wrapping modulo 8
    pub fn wrapping(index: i64) -> Self {
        Self(index.rem_euclid(SECTOR_COUNT as i64) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        SECTOR_LABELS[self.0 as usize]
    }

    pub fn color(self) -> &'static str {
        SECTOR_COLORS[self.0 as usize]
    }

    /// Next sector counter-clockwise
    pub fn next(self) -> Self {
        Self::wrapping(self.0 as i64 + 1)
    }

    /// Next sector clockwise
    pub fn prev(self) -> Self {
        Self::wrapping(self.0 as i64 - 1)
    }

    /// Key used by the cluster data files, e.g. `"0-45 deg (e.g., Energetic/Joyful)"`
    pub fn data_key(self) -> String {
        let lo = self.0 as u32 * 45;
        format!("{}-{} deg (e.g., {})", lo, lo + 45, self.label())
    }

    /// PascalCase name used for output files, e.g. `EnergeticJoyful`
    pub fn slug(self) -> String {
        self.label()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// Resolve a data key, bare label, or slug to a sector.
    ///
    /// `"0-45 deg (e.g., Energetic/Joyful)"`, `"Energetic / Joyful"` and
    /// `"EnergeticJoyful"` all resolve to sector 0.
    pub fn from_key(key: &str) -> Option<Self> {
        let inner = match (key.find('('), key.rfind(')')) {
            (Some(open), Some(close)) if open < close => &key[open + 1..close],
            _ => key,
        };
        let inner = inner.trim();
        let inner = inner.strip_prefix("e.g.,").unwrap_or(inner);
        let wanted = fold_key(inner);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|s| fold_key(s.label()) == wanted)
    }
}

/// Lowercase alphanumerics only, so spacing and separators never matter
fn fold_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

impl TryFrom<u8> for Sector {
    type Error = HarmonyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Sector::new(value)
    }
}

impl From<Sector> for u8 {
    fn from(sector: Sector) -> Self {
        sector.0
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// Point on the unit circle derived from a single wheel angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodSample {
    /// cos(angle)
    pub x: f64,
    /// sin(angle)
    pub y: f64,
    pub sector: Sector,
    /// Angle in degrees, within `[0, 360)`
    #[serde(rename = "angle")]
    pub angle_degrees: f64,
}

/// Pre-aggregated distributions for one sector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    #[serde(default)]
    pub gain: Vec<f64>,
    #[serde(default)]
    pub bpm: Vec<f64>,
    /// Song counts per key name, e.g. `"C major" -> 22`
    #[serde(default)]
    pub key_counts: BTreeMap<String, u32>,
}

impl DistributionBucket {
    pub fn is_empty(&self) -> bool {
        self.gain.is_empty() && self.bpm.is_empty() && self.key_counts.is_empty()
    }
}

/// A chord in a culture's transition graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordNode {
    pub id: String,
    pub root: String,
    pub quality: String,
    pub count: u32,
}

/// A weighted transition between two chords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordLink {
    pub source: String,
    pub target: String,
    pub count: u32,
    /// Share of the source chord's outgoing transitions
    pub prob: f64,
}

/// Chord transition graph for one culture or genre
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChordGraph {
    #[serde(default)]
    pub nodes: Vec<ChordNode>,
    #[serde(default)]
    pub links: Vec<ChordLink>,
}

impl ChordGraph {
    pub fn node(&self, id: &str) -> Option<&ChordNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// A musical tradition with its own chord dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Culture {
    pub id: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

/// Cultures offered by the gallery
pub const CULTURES: [Culture; 14] = [
    Culture { id: "france", name: "France", flag: "🇫🇷" },
    Culture { id: "usa-south", name: "USA (South)", flag: "🇺🇸" },
    Culture { id: "argentina-latin-america", name: "Argentina & Latin America", flag: "🇦🇷" },
    Culture { id: "caribbean", name: "Caribbean", flag: "🇯🇲" },
    Culture { id: "brazil", name: "Brazil", flag: "🇧🇷" },
    Culture { id: "uk-scotland-ireland", name: "Scotland & Ireland", flag: "🏴" },
    Culture { id: "germany", name: "Germany", flag: "🇩🇪" },
    Culture { id: "uk-england", name: "England", flag: "🇬🇧" },
    Culture { id: "mexico", name: "Mexico", flag: "🇲🇽" },
    Culture { id: "spain", name: "Spain", flag: "🇪🇸" },
    Culture { id: "nordic", name: "Nordic", flag: "🇳🇴" },
    Culture { id: "portugal", name: "Portugal", flag: "🇵🇹" },
    Culture { id: "italy", name: "Italy", flag: "🇮🇹" },
    Culture { id: "japan", name: "Japan", flag: "🇯🇵" },
];

/// Look up a culture by id
pub fn culture(id: &str) -> Option<&'static Culture> {
    CULTURES.iter().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_bounds() {
        assert!(Sector::new(7).is_ok());
        assert!(matches!(Sector::new(8), Err(HarmonyError::InvalidSector(8))));
        assert_eq!(Sector::wrapping(-1).index(), 7);
        assert_eq!(Sector::wrapping(17).index(), 1);
    }

    #[test]
    fn test_sector_neighbours_wrap() {
        assert_eq!(Sector::ALL[7].next(), Sector::ALL[0]);
        assert_eq!(Sector::ALL[0].prev(), Sector::ALL[7]);
    }

    #[test]
    fn test_data_key_and_slug() {
        let calm = Sector::ALL[7];
        assert_eq!(calm.data_key(), "315-360 deg (e.g., Calm/Relaxed)");
        assert_eq!(calm.slug(), "CalmRelaxed");
        assert_eq!(Sector::ALL[0].slug(), "EnergeticJoyful");
    }

    #[test]
    fn test_from_key_variants() {
        let joyful = Some(Sector::ALL[0]);
        assert_eq!(Sector::from_key("0-45 deg (e.g., Energetic/Joyful)"), joyful);
        assert_eq!(Sector::from_key("Energetic / Joyful"), joyful);
        assert_eq!(Sector::from_key("EnergeticJoyful"), joyful);
        assert_eq!(Sector::from_key("Tragic/Yearning"), Some(Sector::ALL[5]));
        assert_eq!(Sector::from_key("Bored"), None);
        assert_eq!(Sector::from_key("()"), None);
    }

    #[test]
    fn test_sector_serde_validates() {
        let sector: Sector = serde_json::from_str("3").unwrap();
        assert_eq!(sector.index(), 3);
        assert!(serde_json::from_str::<Sector>("9").is_err());
        assert_eq!(serde_json::to_string(&sector).unwrap(), "3");
    }

    #[test]
    fn test_mood_sample_serializes_angle_field() {
        let sample = MoodSample {
            x: 1.0,
            y: 0.0,
            sector: Sector::ALL[0],
            angle_degrees: 0.0,
        };
        let value = serde_json::to_value(sample).unwrap();
        assert_eq!(value["angle"], 0.0);
        assert_eq!(value["sector"], 0);
    }

    #[test]
    fn test_culture_lookup() {
        assert_eq!(culture("japan").map(|c| c.name), Some("Japan"));
        assert!(culture("atlantis").is_none());
    }
}
