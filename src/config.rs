//! Gallery configuration
//!
//! Loaded from a TOML file; every field has a default so a partial (or
//! missing) file is fine. CLI flags override individual fields afterwards.
//!
//! ```toml
//! [data]
//! emotion_clusters = "data/cluster_data_emotion.json"
//! key_counts = "data/cluster_key_counts_distribution.json"
//! chords_dir = "data/chords"
//!
//! [wheel]
//! size = 340.0
//! hover_debounce_ms = 60
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HarmonyError;
use crate::types::{SECTOR_COLORS, SECTOR_COUNT, SECTOR_LABELS};
use crate::wheel::hover::MAX_HOVER_DEBOUNCE_MS;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub data: DataConfig,
    pub wheel: WheelConfig,
    pub charts: ChartConfig,
}

/// Where the static datasets live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Per-sector gain/BPM arrays
    pub emotion_clusters: PathBuf,
    /// Per-sector key counts
    pub key_counts: Option<PathBuf>,
    /// Directory of `<culture>.json` chord graphs
    pub chords_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            emotion_clusters: PathBuf::from("data/cluster_data_emotion.json"),
            key_counts: Some(PathBuf::from("data/cluster_key_counts_distribution.json")),
            chords_dir: PathBuf::from("data/chords"),
        }
    }
}

/// Mood wheel geometry, look and interaction tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Square canvas edge in pixels
    pub size: f64,
    pub inner_radius: f64,
    /// Outer radius as a fraction of `size`
    pub outer_ratio: f64,
    /// Max pointer distance from the indicator that starts a drag (pixels)
    pub drag_tolerance: f64,
    pub hover_debounce_ms: i64,
    /// One color per sector
    pub palette: Vec<String>,
    /// One label per sector
    pub labels: Vec<String>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            size: 340.0,
            inner_radius: 22.0,
            outer_ratio: 0.38,
            drag_tolerance: 18.0,
            hover_debounce_ms: crate::wheel::hover::DEFAULT_HOVER_DEBOUNCE_MS,
            palette: SECTOR_COLORS.iter().map(|c| c.to_string()).collect(),
            labels: SECTOR_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl WheelConfig {
    /// `(inner, outer)` ring radii in pixels
    pub fn radius_range(&self) -> (f64, f64) {
        (self.inner_radius, self.size * self.outer_ratio)
    }
}

/// Histogram canvas size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
        }
    }
}

impl GalleryConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self, HarmonyError> {
        let config: GalleryConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file
    pub fn load(path: &Path) -> Result<Self, HarmonyError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Read `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, HarmonyError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), HarmonyError> {
        let wheel = &self.wheel;
        let expected = SECTOR_COUNT as usize;
        if wheel.palette.len() != expected {
            return Err(HarmonyError::ConfigError(format!(
                "wheel.palette needs {} colors, got {}",
                expected,
                wheel.palette.len()
            )));
        }
        if wheel.labels.len() != expected {
            return Err(HarmonyError::ConfigError(format!(
                "wheel.labels needs {} entries, got {}",
                expected,
                wheel.labels.len()
            )));
        }
        let (inner, outer) = wheel.radius_range();
        if !(wheel.size > 0.0) || !(inner >= 0.0) || !(outer > inner) {
            return Err(HarmonyError::ConfigError(format!(
                "wheel radii must satisfy 0 <= inner < outer (got {} / {})",
                inner, outer
            )));
        }
        if !(0..=MAX_HOVER_DEBOUNCE_MS).contains(&wheel.hover_debounce_ms) {
            return Err(HarmonyError::ConfigError(format!(
                "wheel.hover_debounce_ms must be within 0..={} (got {})",
                MAX_HOVER_DEBOUNCE_MS, wheel.hover_debounce_ms
            )));
        }
        if wheel.drag_tolerance < 0.0 {
            return Err(HarmonyError::ConfigError(
                "wheel.drag_tolerance must not be negative".to_string(),
            ));
        }
        if !(self.charts.width > 0.0) || !(self.charts.height > 0.0) {
            return Err(HarmonyError::ConfigError(
                "charts.width and charts.height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = GalleryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wheel.radius_range(), (22.0, 340.0 * 0.38));
        assert_eq!(config.wheel.labels[7], "Calm/Relaxed");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GalleryConfig::from_toml_str(
            r#"
            [wheel]
            size = 500.0
            hover_debounce_ms = 25

            [data]
            chords_dir = "assets/chords"
            "#,
        )
        .unwrap();

        assert_eq!(config.wheel.size, 500.0);
        assert_eq!(config.wheel.hover_debounce_ms, 25);
        assert_eq!(config.wheel.inner_radius, 22.0);
        assert_eq!(config.data.chords_dir, PathBuf::from("assets/chords"));
        assert_eq!(
            config.data.emotion_clusters,
            PathBuf::from("data/cluster_data_emotion.json")
        );
        assert_eq!(config.charts, ChartConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(GalleryConfig::from_toml_str("").unwrap(), GalleryConfig::default());
    }

    #[test]
    fn test_rejects_short_palette() {
        let result = GalleryConfig::from_toml_str(
            r##"
            [wheel]
            palette = ["#000000"]
            "##,
        );
        assert!(matches!(result, Err(HarmonyError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_inverted_radii() {
        let result = GalleryConfig::from_toml_str(
            r#"
            [wheel]
            inner_radius = 200.0
            "#,
        );
        assert!(matches!(result, Err(HarmonyError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_out_of_range_debounce() {
        for raw in ["[wheel]\nhover_debounce_ms = -1", "[wheel]\nhover_debounce_ms = 9000000000000000"] {
            assert!(matches!(
                GalleryConfig::from_toml_str(raw),
                Err(HarmonyError::ConfigError(_))
            ));
        }
        let config = GalleryConfig::from_toml_str("[wheel]\nhover_debounce_ms = 10000").unwrap();
        assert_eq!(config.wheel.hover_debounce_ms, MAX_HOVER_DEBOUNCE_MS);
    }

    #[test]
    fn test_chart_defaults_match_histogram_presets() {
        let charts = ChartConfig::default();
        let gain = crate::views::HistogramSpec::gain();
        assert_eq!((charts.width, charts.height), (gain.width, gain.height));
        assert_eq!((charts.width, charts.height), (400.0, 300.0));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            GalleryConfig::from_toml_str("[wheel"),
            Err(HarmonyError::TomlError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harmony.toml");
        std::fs::write(&path, "[charts]\nwidth = 640.0\n").unwrap();
        let config = GalleryConfig::load(&path).unwrap();
        assert_eq!(config.charts.width, 640.0);
        assert!(GalleryConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
