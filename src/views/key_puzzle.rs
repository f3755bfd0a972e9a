//! Key distribution puzzle
//!
//! Twenty-four keys in circle-of-fifths order drawn two ways: an offset
//! hexagon grid whose cell size follows √(count/max), and a rose chart whose
//! petal length is linear in the count. Counts are merged by pitch class, so
//! `"A# major"` and `"Bb major"` land in the same cell.

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

use serde::Serialize;
use tracing::debug;

use crate::views::svg::{self, SvgDocument};
use crate::views::{degraded_badge, placeholder, ChartState, Margin};

/// Display order: 12 major keys round the circle of fifths, then their
/// relative minors
pub const KEY_ORDER: [&str; 24] = [
    "C major", "G major", "D major", "A major", "E major", "B major",
    "F# major", "C# major", "Ab major", "Eb major", "Bb major", "F major",
    "A minor", "E minor", "B minor", "F# minor", "C# minor", "G# minor",
    "D# minor", "A# minor", "F minor", "C minor", "G minor", "D minor",
];

const WARM: [(u8, u8, u8); 5] = [
    (110, 64, 170),
    (210, 62, 167),
    (255, 94, 99),
    (239, 167, 47),
    (175, 240, 91),
];
const COOL: [(u8, u8, u8); 5] = [
    (110, 64, 170),
    (65, 125, 224),
    (26, 199, 194),
    (52, 241, 123),
    (175, 240, 91),
];

/// Pitch class (0 = C) of a note name such as `"F#"`, `"Bb"` or `"Cb"`
pub fn pitch_class(note: &str) -> Option<u8> {
    let mut chars = note.trim().chars();
    let base: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let mut offset = 0;
    for c in chars {
        match c {
            '#' | '♯' => offset += 1,
            'b' | '♭' => offset -= 1,
            _ => return None,
        }
    }
    Some((base + offset).rem_euclid(12) as u8)
}

/// `(pitch class, is_major)` for names like `"C# minor"`
pub fn parse_key(name: &str) -> Option<(u8, bool)> {
    let mut parts = name.split_whitespace();
    let note = parts.next()?;
    let mode = parts.next()?.to_ascii_lowercase();
    if parts.next().is_some() {
        return None;
    }
    let major = match mode.as_str() {
        "major" | "maj" => true,
        "minor" | "min" => false,
        _ => return None,
    };
    Some((pitch_class(note)?, major))
}

/// `"F# major"` → `"F#"`, `"F# minor"` → `"F#m"`
pub fn short_label(key: &str) -> String {
    key.replace(" major", "").replace(" minor", "m")
}

/// Fold raw key counts onto [`KEY_ORDER`]; unparseable names are dropped
pub fn merge_counts(counts: &BTreeMap<String, u32>) -> [u32; 24] {
    let mut merged = [0u32; 24];
    for (name, &count) in counts {
        let slot = parse_key(name).and_then(|key| {
            KEY_ORDER
                .iter()
                .position(|k| parse_key(k) == Some(key))
        });
        match slot {
            Some(i) => merged[i] = merged[i].saturating_add(count),
            None => debug!(key = %name, count, "ignoring unrecognized key name"),
        }
    }
    merged
}

/// Fill color for a key given its share of the maximum count
pub fn key_color(major: bool, count: u32, max_count: u32) -> String {
    let intensity = if max_count == 0 {
        0.0
    } else {
        count as f64 / max_count as f64
    };
    let t = 0.3 + intensity * 0.6;
    if major {
        svg::interpolate_stops(&WARM, t)
    } else {
        svg::interpolate_stops(&COOL, t)
    }
}

/// One of the 24 keys with its merged count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyCell {
    pub key: &'static str,
    pub label: String,
    pub count: u32,
    pub major: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexCell {
    pub key: &'static str,
    pub x: f64,
    pub y: f64,
    /// Circumradius of the drawn hexagon
    pub size: f64,
    pub font_size: f64,
}

/// Rose petal; angles are clockwise from 12 o'clock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosePetal {
    pub key: &'static str,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPuzzleLayout {
    pub state: ChartState,
    pub cells: Vec<KeyCell>,
    pub max_count: u32,
    pub hexes: Vec<HexCell>,
    pub petals: Vec<RosePetal>,
    /// Center of the rose inside the plot area
    pub rose_center: (f64, f64),
}

/// Chart parameters shared by the hexagon and rose renderings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPuzzleSpec {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub cols: usize,
    pub rows: usize,
    pub rose_inner_radius: f64,
    pub rose_min_radius: f64,
}

impl Default for KeyPuzzleSpec {
    fn default() -> Self {
        Self {
            width: 420.0,
            height: 350.0,
            margin: Margin::uniform(15.0),
            cols: 6,
            rows: 4,
            rose_inner_radius: 20.0,
            rose_min_radius: 30.0,
        }
    }
}

impl KeyPuzzleSpec {
    pub fn layout(&self, counts: &BTreeMap<String, u32>, degraded: bool) -> KeyPuzzleLayout {
        let merged = merge_counts(counts);
        let max_count = merged.iter().copied().max().unwrap_or(0);
        let (inner_w, inner_h) = self.margin.inner(self.width, self.height);
        let rose_center = (inner_w / 2.0, inner_h / 2.0);

        if max_count == 0 {
            return KeyPuzzleLayout {
                state: ChartState::Empty,
                cells: Vec::new(),
                max_count,
                hexes: Vec::new(),
                petals: Vec::new(),
                rose_center,
            };
        }

        let cells: Vec<KeyCell> = KEY_ORDER
            .iter()
            .zip(merged.iter())
            .enumerate()
            .map(|(i, (&key, &count))| {
                let major = i < 12;
                KeyCell {
                    key,
                    label: short_label(key),
                    count,
                    major,
                    color: key_color(major, count, max_count),
                }
            })
            .collect();

        KeyPuzzleLayout {
            state: ChartState::for_data(degraded),
            hexes: self.hex_grid(&cells, max_count, inner_w, inner_h),
            petals: self.rose(&cells, max_count, inner_w, inner_h),
            cells,
            max_count,
            rose_center,
        }
    }

    fn hex_grid(&self, cells: &[KeyCell], max_count: u32, inner_w: f64, inner_h: f64) -> Vec<HexCell> {
        let radius = (inner_w / 11.0).min(inner_h / 7.0);
        let hex_w = radius * 3f64.sqrt();
        let hex_h = radius * 2.0;
        let cols = self.cols.max(1);

        let grid_w = (cols as f64 - 1.0) * hex_w * 0.75 + hex_w;
        let grid_h = self.rows as f64 * hex_h * 0.87;
        let offset_x = (inner_w - grid_w) / 2.0;
        let offset_y = (inner_h - grid_h) / 2.0;

        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let col = i % cols;
                let row = i / cols;
                let x = col as f64 * hex_w * 0.75 + hex_w / 2.0 + offset_x;
                let y = row as f64 * hex_h * 0.87
                    + hex_h / 2.0
                    + (col % 2) as f64 * hex_h * 0.43
                    + offset_y;
                let size = (radius * 0.4).max(radius * (cell.count as f64 / max_count as f64).sqrt());
                HexCell {
                    key: cell.key,
                    x,
                    y,
                    size,
                    font_size: (size * 0.25).max(8.0),
                }
            })
            .collect()
    }

    fn rose(&self, cells: &[KeyCell], max_count: u32, inner_w: f64, inner_h: f64) -> Vec<RosePetal> {
        let (cx, cy) = (inner_w / 2.0, inner_h / 2.0);
        let max_radius = inner_w.min(inner_h) / 2.5;
        let n = cells.len().max(1) as f64;
        let width = TAU / n;

        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let angle = i as f64 / n * TAU;
                let radius = self.rose_min_radius
                    + cell.count as f64 / max_count as f64 * (max_radius - self.rose_min_radius);
                let label_radius = radius + 25.0;
                RosePetal {
                    key: cell.key,
                    start_angle: angle - width / 2.0,
                    end_angle: angle + width / 2.0,
                    inner_radius: self.rose_inner_radius,
                    outer_radius: radius,
                    label_x: cx + label_radius * (angle - PI / 2.0).cos(),
                    label_y: cy + label_radius * (angle - PI / 2.0).sin(),
                }
            })
            .collect()
    }

    /// Hexagon grid SVG
    pub fn hex_svg(&self, layout: &KeyPuzzleLayout) -> String {
        let mut doc = SvgDocument::new(self.width, self.height);
        if layout.state == ChartState::Empty {
            placeholder(&mut doc, self.width, self.height, "No key data for this mood");
            return doc.finish();
        }
        doc.open_group(Some(&svg::translate(self.margin.left, self.margin.top)));
        for (hex, cell) in layout.hexes.iter().zip(&layout.cells) {
            doc.push(
                svg::path(hexagon_path(hex.size))
                    .attr("transform", svg::translate(hex.x, hex.y))
                    .attr("fill", cell.color.as_str())
                    .attr("stroke", "#ffffff")
                    .attr("stroke-width", "2")
                    .attr("opacity", "0.9"),
            );
            doc.push(
                svg::text(hex.x, hex.y + 4.0, cell.label.as_str())
                    .attr("text-anchor", "middle")
                    .num("font-size", hex.font_size)
                    .attr("fill", "white")
                    .attr("font-weight", "600"),
            );
        }
        doc.close_group();
        if layout.state == ChartState::Degraded {
            degraded_badge(&mut doc, self.width);
        }
        doc.finish()
    }

    /// Rose chart SVG
    pub fn rose_svg(&self, layout: &KeyPuzzleLayout) -> String {
        let mut doc = SvgDocument::new(self.width, self.height);
        if layout.state == ChartState::Empty {
            placeholder(&mut doc, self.width, self.height, "No key data for this mood");
            return doc.finish();
        }
        let (cx, cy) = layout.rose_center;
        doc.open_group(Some(&svg::translate(self.margin.left, self.margin.top)));
        for (petal, cell) in layout.petals.iter().zip(&layout.cells) {
            doc.push(
                svg::path(annular_sector_path(
                    petal.inner_radius,
                    petal.outer_radius,
                    petal.start_angle,
                    petal.end_angle,
                ))
                .attr("transform", svg::translate(cx, cy))
                .attr("fill", cell.color.as_str())
                .attr("stroke", "#ffffff")
                .attr("stroke-width", "1.5")
                .attr("opacity", "0.85"),
            );
            doc.push(
                svg::text(petal.label_x, petal.label_y + 4.0, cell.label.as_str())
                    .attr("text-anchor", "middle")
                    .attr("font-size", "10")
                    .attr("fill", "#374151")
                    .attr("font-weight", "500"),
            );
        }
        doc.close_group();
        if layout.state == ChartState::Degraded {
            degraded_badge(&mut doc, self.width);
        }
        doc.finish()
    }
}

/// Pointy-top hexagon of circumradius `size` centered on the origin
fn hexagon_path(size: f64) -> String {
    let half = 3f64.sqrt() / 2.0;
    let points = [
        (0.0, -1.0),
        (half, -0.5),
        (half, 0.5),
        (0.0, 1.0),
        (-half, 0.5),
        (-half, -0.5),
    ];
    let scaled: Vec<(f64, f64)> = points.iter().map(|(x, y)| (x * size, y * size)).collect();
    format!("{} Z", svg::polyline_path(&scaled))
}

/// Annular sector around the origin with angles clockwise from 12 o'clock
pub(crate) fn annular_sector_path(inner: f64, outer: f64, start: f64, end: f64) -> String {
    let at = |r: f64, a: f64| (r * a.sin(), -r * a.cos());
    let large = if (end - start).abs() > PI { 1 } else { 0 };
    let (ox0, oy0) = at(outer, start);
    let (ox1, oy1) = at(outer, end);
    let (ix1, iy1) = at(inner, end);
    let (ix0, iy0) = at(inner, start);
    format!(
        "M{},{} A{},{} 0 {},1 {},{} L{},{} A{},{} 0 {},0 {},{} Z",
        svg::num(ox0),
        svg::num(oy0),
        svg::num(outer),
        svg::num(outer),
        large,
        svg::num(ox1),
        svg::num(oy1),
        svg::num(ix1),
        svg::num(iy1),
        svg::num(inner),
        svg::num(inner),
        large,
        svg::num(ix0),
        svg::num(iy0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_key_order_covers_every_key_once() {
        let mut seen: Vec<(u8, bool)> = KEY_ORDER.iter().filter_map(|k| parse_key(k)).collect();
        assert_eq!(seen.len(), 24);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn test_pitch_classes() {
        assert_eq!(pitch_class("C"), Some(0));
        assert_eq!(pitch_class("A#"), pitch_class("Bb"));
        assert_eq!(pitch_class("Cb"), Some(11));
        assert_eq!(pitch_class("E#"), Some(5));
        assert_eq!(pitch_class("H"), None);
        assert_eq!(parse_key("G# minor"), Some((8, false)));
        assert_eq!(parse_key("G#"), None);
        assert_eq!(parse_key("G# dorian"), None);
    }

    #[test]
    fn test_enharmonic_spellings_are_merged() {
        let merged = merge_counts(&counts(&[
            ("C major", 10),
            ("A# major", 3),
            ("Bb major", 2),
            ("Eb minor", 4),
            ("A minor", 5),
            ("not a key", 99),
        ]));
        let at = |key: &str| merged[KEY_ORDER.iter().position(|k| *k == key).unwrap()];
        assert_eq!(at("C major"), 10);
        assert_eq!(at("Bb major"), 5);
        assert_eq!(at("D# minor"), 4);
        assert_eq!(at("A minor"), 5);
        assert_eq!(merged.iter().sum::<u32>(), 24);
    }

    #[test]
    fn test_short_labels() {
        assert_eq!(short_label("F# major"), "F#");
        assert_eq!(short_label("C# minor"), "C#m");
    }

    #[test]
    fn test_empty_counts_render_placeholder() {
        let spec = KeyPuzzleSpec::default();
        let layout = spec.layout(&BTreeMap::new(), false);
        assert_eq!(layout.state, ChartState::Empty);
        let svg = spec.hex_svg(&layout);
        assert!(svg.contains("No key data"));
        assert!(!svg.contains("NaN"));

        // Only zero counts is still empty
        let layout = spec.layout(&counts(&[("C major", 0)]), false);
        assert_eq!(layout.state, ChartState::Empty);
    }

    #[test]
    fn test_hex_sizes_follow_sqrt_share() {
        let spec = KeyPuzzleSpec::default();
        let layout = spec.layout(&counts(&[("C major", 100), ("G major", 25)]), false);
        assert_eq!(layout.hexes.len(), 24);

        let radius = (390.0f64 / 11.0).min(320.0 / 7.0);
        assert!((layout.hexes[0].size - radius).abs() < 1e-9);
        assert!((layout.hexes[1].size - radius * 0.5).abs() < 1e-9);
        // Empty keys keep a minimum size
        assert!((layout.hexes[5].size - radius * 0.4).abs() < 1e-9);
        assert_eq!(layout.hexes[5].font_size, 8.0);
    }

    #[test]
    fn test_hex_grid_positions() {
        let spec = KeyPuzzleSpec::default();
        let layout = spec.layout(&counts(&[("C major", 1)]), false);
        let radius = (390.0f64 / 11.0).min(320.0 / 7.0);
        let hex_w = radius * 3f64.sqrt();
        let hex_h = radius * 2.0;

        let (c0, c1, c6) = (&layout.hexes[0], &layout.hexes[1], &layout.hexes[6]);
        assert!((c1.x - c0.x - hex_w * 0.75).abs() < 1e-9);
        // Odd columns are shifted down
        assert!((c1.y - c0.y - hex_h * 0.43).abs() < 1e-9);
        // Next row
        assert!((c6.x - c0.x).abs() < 1e-9);
        assert!((c6.y - c0.y - hex_h * 0.87).abs() < 1e-9);
    }

    #[test]
    fn test_rose_radii_are_linear() {
        let spec = KeyPuzzleSpec::default();
        let layout = spec.layout(&counts(&[("C major", 40), ("A minor", 20)]), false);
        let max_radius = 320.0 / 2.5;

        assert!((layout.petals[0].outer_radius - max_radius).abs() < 1e-9);
        assert!((layout.petals[12].outer_radius - (30.0 + 0.5 * (max_radius - 30.0))).abs() < 1e-9);
        assert!((layout.petals[1].outer_radius - 30.0).abs() < 1e-9);

        // First petal is centered at 12 o'clock, label straight above
        let first = &layout.petals[0];
        assert!((first.start_angle + first.end_angle).abs() < 1e-9);
        assert!((first.label_x - layout.rose_center.0).abs() < 1e-9);
        assert!(first.label_y < layout.rose_center.1);
    }

    #[test]
    fn test_major_warm_minor_cool() {
        let spec = KeyPuzzleSpec::default();
        let layout = spec.layout(&counts(&[("C major", 10), ("A minor", 10)]), false);
        assert_ne!(layout.cells[0].color, layout.cells[12].color);
        assert_eq!(layout.cells[0].color, key_color(true, 10, 10));
        // Same intensity floor for both ramps' empty keys
        assert_eq!(key_color(true, 0, 10), svg::interpolate_stops(&WARM, 0.3));
        assert_eq!(key_color(false, 0, 10), svg::interpolate_stops(&COOL, 0.3));
    }

    #[test]
    fn test_svgs_carry_labels() {
        let spec = KeyPuzzleSpec::default();
        let layout = spec.layout(&counts(&[("C major", 3), ("A minor", 2)]), true);
        let hex = spec.hex_svg(&layout);
        let rose = spec.rose_svg(&layout);
        for svg in [&hex, &rose] {
            assert!(svg.contains(">C</text>"));
            assert!(svg.contains(">Am</text>"));
            assert!(svg.contains(">F#m</text>"));
            assert!(svg.contains("fallback data"));
            assert!(!svg.contains("NaN"));
        }
        assert_eq!(hex.matches(" Z\"").count(), 24);
    }
}
