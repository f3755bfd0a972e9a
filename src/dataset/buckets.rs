//! Sector-to-dataset index
//!
//! Maps each mood sector to its pre-aggregated gain, BPM and key-count
//! distributions. Lookups never fail: a sector without data resolves to an
//! explicit empty bucket so charts fall back to their "no data" state.

use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

use crate::dataset::loader::{load_or_fallback, DataStatus};
use crate::error::HarmonyError;
use crate::types::{DistributionBucket, Sector};

/// One entry of the emotion cluster file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmotionCluster {
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub gain: Vec<f64>,
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub bpm: Vec<f64>,
}

/// Emotion cluster file: data key → gain/BPM arrays
pub type EmotionClusterFile = HashMap<String, EmotionCluster>;

/// Counts per key name for one sector.
///
/// Entries that are not non-negative integers are skipped on their own, so one
/// bad count does not discard the rest of the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyCounts(pub BTreeMap<String, u32>);

impl<'de> Deserialize<'de> for KeyCounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let counts = raw
            .into_iter()
            .filter_map(|(key, value)| match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(count) => Some((key, count)),
                None => {
                    debug!(key = %key, value = %value, "skipping unusable key count");
                    None
                }
            })
            .collect();
        Ok(KeyCounts(counts))
    }
}

/// Key-count file: data key → key name → count
pub type KeyCountFile = HashMap<String, KeyCounts>;

/// Accept a numeric array, skipping null or non-numeric entries
fn lenient_numbers<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.iter().filter_map(serde_json::Value::as_f64).collect())
}

/// Constant-time sector → bucket lookup
#[derive(Debug, Clone)]
pub struct SectorDatasetIndex {
    buckets: HashMap<Sector, DistributionBucket>,
    empty: DistributionBucket,
    status: DataStatus,
}

impl Default for SectorDatasetIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SectorDatasetIndex {
    /// Create an index with no data
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            empty: DistributionBucket::default(),
            status: DataStatus::Loaded,
        }
    }

    /// Build from parsed cluster and key-count files.
    ///
    /// Keys that do not name a sector are logged and skipped.
    pub fn from_files(emotion: EmotionClusterFile, key_counts: KeyCountFile) -> Self {
        let mut index = Self::new();

        for (key, cluster) in emotion {
            match Sector::from_key(&key) {
                Some(sector) => {
                    let bucket = index.buckets.entry(sector).or_default();
                    bucket.gain = cluster.gain;
                    bucket.bpm = cluster.bpm;
                }
                None => warn!(key = %key, "emotion cluster key names no sector, skipping"),
            }
        }

        for (key, counts) in key_counts {
            match Sector::from_key(&key) {
                Some(sector) => {
                    index.buckets.entry(sector).or_default().key_counts = counts.0;
                }
                None => warn!(key = %key, "key-count entry names no sector, skipping"),
            }
        }

        debug!(sectors = index.buckets.len(), "sector dataset index built");
        index
    }

    /// Parse both files from JSON text
    pub fn from_json(emotion_json: &str, key_counts_json: Option<&str>) -> Result<Self, HarmonyError> {
        let emotion: EmotionClusterFile = serde_json::from_str(emotion_json)?;
        let key_counts: KeyCountFile = match key_counts_json {
            Some(json) => serde_json::from_str(json)?,
            None => KeyCountFile::new(),
        };
        Ok(Self::from_files(emotion, key_counts))
    }

    /// Load both files from disk, one attempt each.
    ///
    /// A missing or malformed file contributes no data and marks the index
    /// degraded; the index itself is always usable.
    pub fn load(emotion_path: &Path, key_counts_path: Option<&Path>) -> Self {
        let emotion = load_or_fallback(emotion_path, "emotion clusters", EmotionClusterFile::new);
        let key_counts = match key_counts_path {
            Some(path) => load_or_fallback(path, "key counts", KeyCountFile::new),
            None => crate::dataset::Loaded {
                data: KeyCountFile::new(),
                status: DataStatus::Loaded,
            },
        };

        let status = match (emotion.status, key_counts.status) {
            (DataStatus::Loaded, DataStatus::Loaded) => DataStatus::Loaded,
            (DataStatus::Fallback { reason }, _) | (_, DataStatus::Fallback { reason }) => {
                DataStatus::Fallback { reason }
            }
        };

        let mut index = Self::from_files(emotion.data, key_counts.data);
        index.status = status;
        index
    }

    /// Bucket for a sector, or the empty bucket when none was loaded
    pub fn lookup(&self, sector: Sector) -> &DistributionBucket {
        self.buckets.get(&sector).unwrap_or(&self.empty)
    }

    /// Replace a sector's bucket
    pub fn insert(&mut self, sector: Sector, bucket: DistributionBucket) {
        self.buckets.insert(sector, bucket);
    }

    /// Sectors that have a non-empty bucket, in index order
    pub fn populated_sectors(&self) -> Vec<Sector> {
        Sector::ALL
            .into_iter()
            .filter(|s| self.buckets.get(s).is_some_and(|b| !b.is_empty()))
            .collect()
    }

    pub fn status(&self) -> &DataStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn sample_emotion_json() -> &'static str {
        r#"{
            "0-45 deg (e.g., Energetic/Joyful)": { "gain": [0.5, 0.7, 0.9], "bpm": [120, 128] },
            "315-360 deg (e.g., Calm/Relaxed)": { "gain": [0.1, null, 0.2], "bpm": [] },
            "400-450 deg (e.g., Bored)": { "gain": [1.0], "bpm": [1.0] }
        }"#
    }

    fn sample_key_json() -> &'static str {
        r#"{
            "315-360 deg (e.g., Calm/Relaxed)": { "A major": 23, "A minor": 16 }
        }"#
    }

    #[test]
    fn test_lookup_populated_sector() {
        let index = SectorDatasetIndex::from_json(sample_emotion_json(), Some(sample_key_json())).unwrap();

        let joyful = index.lookup(Sector::ALL[0]);
        assert_eq!(joyful.gain, vec![0.5, 0.7, 0.9]);
        assert_eq!(joyful.bpm, vec![120.0, 128.0]);
        assert!(joyful.key_counts.is_empty());

        let calm = index.lookup(Sector::ALL[7]);
        assert_eq!(calm.gain, vec![0.1, 0.2]);
        assert_eq!(calm.key_counts.get("A major"), Some(&23));
    }

    #[test]
    fn test_lookup_missing_sector_returns_empty_bucket() {
        let index = SectorDatasetIndex::from_json(sample_emotion_json(), None).unwrap();
        let bucket = index.lookup(Sector::ALL[3]);
        assert!(bucket.gain.is_empty());
        assert!(bucket.bpm.is_empty());
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let index = SectorDatasetIndex::from_json(sample_emotion_json(), None).unwrap();
        assert_eq!(index.populated_sectors(), vec![Sector::ALL[0], Sector::ALL[7]]);
    }

    #[test]
    fn test_bad_key_counts_are_skipped_per_entry() {
        let keys = r#"{
            "315-360 deg (e.g., Calm/Relaxed)": { "A major": 23, "A minor": 1.5, "E minor": -2, "D major": "x" },
            "0-45 deg (e.g., Energetic/Joyful)": { "C major": 7 }
        }"#;
        let index = SectorDatasetIndex::from_json(sample_emotion_json(), Some(keys)).unwrap();

        let calm = &index.lookup(Sector::ALL[7]).key_counts;
        assert_eq!(calm.len(), 1);
        assert_eq!(calm.get("A major"), Some(&23));
        assert_eq!(index.lookup(Sector::ALL[0]).key_counts.get("C major"), Some(&7));
        assert!(!index.status().is_degraded());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(SectorDatasetIndex::from_json("[1, 2]", None).is_err());
    }

    #[test]
    fn test_load_degrades_on_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let emotion_path = dir.path().join("cluster_data_emotion.json");
        let mut file = std::fs::File::create(&emotion_path).unwrap();
        write!(file, "{}", sample_emotion_json()).unwrap();

        let index = SectorDatasetIndex::load(&emotion_path, Some(&dir.path().join("absent.json")));
        assert!(index.status().is_degraded());
        assert_eq!(index.lookup(Sector::ALL[0]).gain.len(), 3);
    }

    #[test]
    fn test_load_missing_everything_still_usable() {
        let dir = tempfile::tempdir().unwrap();
        let index = SectorDatasetIndex::load(&dir.path().join("none.json"), None);
        assert!(index.status().is_degraded());
        for sector in Sector::ALL {
            assert!(index.lookup(sector).is_empty());
        }
    }
}
