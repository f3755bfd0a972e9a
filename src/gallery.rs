//! Mood gallery
//!
//! Ties one mood wheel to the sector dataset index and the chart views. Each
//! sector gets one parameterized panel (gain, BPM, key puzzle); the gallery can
//! build a single panel for the sector the wheel shows or write every panel to
//! disk.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::GalleryConfig;
use crate::dataset::{ChordLibrary, DataStatus, SectorDatasetIndex};
use crate::error::HarmonyError;
use crate::types::{culture, Sector};
use crate::views::chord_network::ChordNetworkSpec;
use crate::views::histogram::{HistogramLayout, HistogramSpec};
use crate::views::key_puzzle::{KeyPuzzleLayout, KeyPuzzleSpec};
use crate::views::mood_wheel::{WheelStyle, WheelView};
use crate::views::ChartState;
use crate::wheel::{MoodWheel, PointerEvent, WheelNotification};

/// Charts for one sector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorPanel {
    pub sector: Sector,
    pub label: String,
    pub slug: String,
    pub color: String,
    pub gain: HistogramLayout,
    pub bpm: HistogramLayout,
    pub keys: KeyPuzzleLayout,
}

/// Serialized charts of a panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSvgs {
    pub gain: String,
    pub bpm: String,
    pub key_hex: String,
    pub key_rose: String,
}

/// Per-sector line of the render manifest
#[derive(Debug, Clone, Serialize)]
struct ManifestEntry<'a> {
    sector: Sector,
    label: &'a str,
    slug: &'a str,
    gain: ChartState,
    bpm: ChartState,
    keys: ChartState,
    gain_mean: Option<f64>,
    bpm_mean: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct Manifest<'a> {
    producer: &'a str,
    version: &'a str,
    data: &'a DataStatus,
    panels: Vec<ManifestEntry<'a>>,
}

pub struct MoodGallery {
    config: GalleryConfig,
    index: SectorDatasetIndex,
    chords: ChordLibrary,
    wheel: MoodWheel,
    gain_spec: HistogramSpec,
    bpm_spec: HistogramSpec,
    key_spec: KeyPuzzleSpec,
    wheel_view: WheelView,
}

impl MoodGallery {
    pub fn new(config: GalleryConfig, index: SectorDatasetIndex, chords: ChordLibrary) -> Self {
        let charts = &config.charts;
        Self {
            gain_spec: HistogramSpec::gain().with_size(charts.width, charts.height),
            bpm_spec: HistogramSpec::bpm().with_size(charts.width, charts.height),
            key_spec: KeyPuzzleSpec::default(),
            wheel_view: WheelView::new(WheelStyle::from_config(&config.wheel)),
            wheel: MoodWheel::from_config(&config.wheel),
            config,
            index,
            chords,
        }
    }

    /// Load every dataset named by `config.data`, one attempt each
    pub fn load(config: GalleryConfig) -> Self {
        let index = SectorDatasetIndex::load(
            &config.data.emotion_clusters,
            config.data.key_counts.as_deref(),
        );
        let chords = ChordLibrary::load_dir(&config.data.chords_dir);
        info!(
            sectors = index.populated_sectors().len(),
            degraded = index.status().is_degraded(),
            "gallery data loaded"
        );
        Self::new(config, index, chords)
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn index(&self) -> &SectorDatasetIndex {
        &self.index
    }

    pub fn chords(&self) -> &ChordLibrary {
        &self.chords
    }

    pub fn wheel(&self) -> &MoodWheel {
        &self.wheel
    }

    pub fn wheel_mut(&mut self) -> &mut MoodWheel {
        &mut self.wheel
    }

    /// Forward a pointer event to the wheel
    pub fn handle(&mut self, event: &PointerEvent) -> Vec<WheelNotification> {
        self.wheel.handle(event)
    }

    /// Build the panel for one sector
    pub fn panel(&self, sector: Sector) -> SectorPanel {
        let bucket = self.index.lookup(sector);
        let degraded = self.index.status().is_degraded();
        let i = sector.index() as usize;
        SectorPanel {
            sector,
            label: self
                .config
                .wheel
                .labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| sector.label().to_string()),
            slug: sector.slug(),
            color: self
                .config
                .wheel
                .palette
                .get(i)
                .cloned()
                .unwrap_or_else(|| sector.color().to_string()),
            gain: self.gain_spec.layout(&bucket.gain, degraded),
            bpm: self.bpm_spec.layout(&bucket.bpm, degraded),
            keys: self.key_spec.layout(&bucket.key_counts, degraded),
        }
    }

    /// Panel for whatever the wheel currently shows (hover preview first)
    pub fn current_panel(&self) -> SectorPanel {
        self.panel(self.wheel.display_sector())
    }

    pub fn panel_svgs(&self, panel: &SectorPanel) -> PanelSvgs {
        PanelSvgs {
            gain: self.gain_spec.to_svg(&panel.gain),
            bpm: self.bpm_spec.to_svg(&panel.bpm),
            key_hex: self.key_spec.hex_svg(&panel.keys),
            key_rose: self.key_spec.rose_svg(&panel.keys),
        }
    }

    pub fn wheel_svg(&self) -> String {
        self.wheel_view.render(&self.wheel)
    }

    /// Chord network for a culture; unknown ids render the fallback graph
    pub fn chord_chart(&self, culture_id: &str) -> String {
        let graph = self.chords.graph(culture_id);
        let degraded = self.chords.status(culture_id).is_degraded();
        let title = culture(culture_id)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| culture_id.to_string());
        ChordNetworkSpec::default()
            .with_title(&title)
            .render(graph, degraded)
    }

    /// Write every panel, the wheel and a manifest into `out_dir`.
    ///
    /// Returns the written paths in order.
    pub fn render_all(&self, out_dir: &Path) -> Result<Vec<PathBuf>, HarmonyError> {
        fs::create_dir_all(out_dir)?;
        let mut written = Vec::new();
        let panels: Vec<SectorPanel> = Sector::ALL.iter().map(|&s| self.panel(s)).collect();

        for panel in &panels {
            let svgs = self.panel_svgs(panel);
            for (suffix, content) in [
                ("gain", &svgs.gain),
                ("bpm", &svgs.bpm),
                ("key-hex", &svgs.key_hex),
                ("key-rose", &svgs.key_rose),
            ] {
                let path = out_dir.join(format!("{}-{}.svg", panel.slug, suffix));
                fs::write(&path, content)?;
                written.push(path);
            }
            debug!(sector = panel.sector.index(), slug = %panel.slug, "panel rendered");
        }

        let wheel_path = out_dir.join("wheel.svg");
        fs::write(&wheel_path, self.wheel_svg())?;
        written.push(wheel_path);

        let manifest = Manifest {
            producer: crate::PRODUCER_NAME,
            version: crate::HARMONY_VERSION,
            data: self.index.status(),
            panels: panels
                .iter()
                .map(|p| ManifestEntry {
                    sector: p.sector,
                    label: &p.label,
                    slug: &p.slug,
                    gain: p.gain.state,
                    bpm: p.bpm.state,
                    keys: p.keys.state,
                    gain_mean: p.gain.mean,
                    bpm_mean: p.bpm.mean,
                })
                .collect(),
        };
        let manifest_path = out_dir.join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
        written.push(manifest_path);

        info!(files = written.len(), dir = %out_dir.display(), "gallery rendered");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point_on_wheel;
    use crate::types::DistributionBucket;
    use crate::wheel::PointerKind;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn sector(i: u8) -> Sector {
        Sector::new(i).unwrap()
    }

    fn sample_gallery() -> MoodGallery {
        let mut index = SectorDatasetIndex::new();
        index.insert(
            sector(0),
            DistributionBucket {
                gain: vec![-8.0, -6.5, -7.2, -5.9],
                bpm: vec![118.0, 124.0, 131.0, 140.0],
                key_counts: BTreeMap::from([("C major".to_string(), 12), ("A minor".to_string(), 4)]),
            },
        );
        MoodGallery::new(GalleryConfig::default(), index, ChordLibrary::builtin())
    }

    #[test]
    fn test_panel_for_populated_sector() {
        let gallery = sample_gallery();
        let panel = gallery.panel(sector(0));
        assert_eq!(panel.slug, "EnergeticJoyful");
        assert_eq!(panel.label, "Energetic/Joyful");
        assert_eq!(panel.gain.state, ChartState::Ready);
        assert_eq!(panel.bpm.sample_count, 4);
        assert_eq!(panel.keys.max_count, 12);
    }

    #[test]
    fn test_panel_for_missing_sector_is_empty() {
        let gallery = sample_gallery();
        let panel = gallery.panel(sector(6));
        assert_eq!(panel.gain.state, ChartState::Empty);
        assert_eq!(panel.bpm.state, ChartState::Empty);
        assert_eq!(panel.keys.state, ChartState::Empty);

        let svgs = gallery.panel_svgs(&panel);
        for svg in [&svgs.gain, &svgs.bpm, &svgs.key_hex, &svgs.key_rose] {
            assert!(!svg.contains("NaN"));
        }
    }

    #[test]
    fn test_current_panel_follows_wheel() {
        let mut gallery = sample_gallery();
        assert_eq!(gallery.current_panel().sector, sector(0));

        let g = *gallery.wheel().geometry();
        let at: DateTime<Utc> = "2024-01-15T14:00:00Z".parse().unwrap();
        let click = PointerEvent::new(
            PointerKind::Click,
            point_on_wheel(g.center, g.indicator_radius, 200f64.to_radians()),
            at,
        );
        let notes = gallery.handle(&click);
        assert_eq!(notes.len(), 1);
        assert_eq!(gallery.current_panel().sector, sector(4));
    }

    #[test]
    fn test_render_all_writes_every_panel() {
        let gallery = sample_gallery();
        let dir = tempfile::tempdir().unwrap();
        let written = gallery.render_all(dir.path()).unwrap();

        assert_eq!(written.len(), 8 * 4 + 2);
        for name in [
            "EnergeticJoyful-gain.svg",
            "CalmRelaxed-bpm.svg",
            "DarkDepressed-key-hex.svg",
            "TragicYearning-key-rose.svg",
            "wheel.svg",
        ] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("manifest.json")).unwrap()).unwrap();
        assert_eq!(manifest["panels"].as_array().unwrap().len(), 8);
        assert_eq!(manifest["panels"][0]["gain"], "ready");
        assert_eq!(manifest["panels"][1]["gain"], "empty");
        assert_eq!(manifest["data"]["status"], "loaded");
    }

    #[test]
    fn test_load_with_missing_files_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GalleryConfig::default();
        config.data.emotion_clusters = dir.path().join("nope.json");
        config.data.key_counts = None;
        config.data.chords_dir = dir.path().join("chords");

        let gallery = MoodGallery::load(config);
        assert!(gallery.index().status().is_degraded());
        assert!(gallery.index().populated_sectors().is_empty());
        assert!(gallery.chords().status("brazil").is_degraded());

        let svg = gallery.chord_chart("brazil");
        assert!(svg.contains(">Brazil</text>"));
        assert!(svg.contains("fallback data"));
    }

    #[test]
    fn test_chord_chart_unknown_culture_uses_fallback() {
        let gallery = sample_gallery();
        let svg = gallery.chord_chart("atlantis");
        assert!(svg.contains(">atlantis</text>"));
        assert!(svg.contains("data-chord="));
    }
}
