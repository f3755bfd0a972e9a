//! Radial chord transition network
//!
//! Nodes sit on a polar grid: the angle comes from the chord root (C at the
//! top, then clockwise by semitone) and the ring from the chord quality.
//! Links are drawn as arcs whose width and opacity follow the transition
//! probability.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::Serialize;
use tracing::debug;

use crate::stats::{LinearScale, SqrtScale};
use crate::types::ChordGraph;
use crate::views::key_puzzle::pitch_class;
use crate::views::svg::{self, SvgDocument};
use crate::views::{degraded_badge, placeholder, ChartState};

/// Labels for the 12 spokes, flats for black keys
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Ring order from the center outwards
pub const QUALITY_ORDER: [&str; 10] = [
    "maj", "min", "7", "maj7", "min7", "6", "dim", "aug", "sus4", "sus2",
];

const MAJOR_COLOR: &str = "#4A90E2";
const MINOR_COLOR: &str = "#E74C3C";
const SEVENTH_COLOR: &str = "#F39C12";
const OTHER_COLOR: &str = "#9B59B6";

/// Spoke index for a chord root; `"Cs"` style sharps are accepted
pub fn root_index(root: &str) -> Option<usize> {
    let root = root.trim();
    let normalized = match root.strip_suffix('s') {
        Some(base) if base.len() == 1 => format!("{}#", base),
        _ => root.to_string(),
    };
    pitch_class(&normalized).map(usize::from)
}

/// Fill color by quality family
pub fn quality_color(quality: &str) -> &'static str {
    if quality.contains("min") {
        MINOR_COLOR
    } else if quality.contains('7') {
        SEVENTH_COLOR
    } else if quality == "maj" {
        MAJOR_COLOR
    } else {
        OTHER_COLOR
    }
}

/// Ring radius for a quality; unknown qualities go to an outer ring
pub fn quality_radius(quality: &str, max_radius: f64) -> f64 {
    match QUALITY_ORDER.iter().position(|q| *q == quality) {
        Some(i) => {
            (i as f64 + 1.0) / QUALITY_ORDER.len() as f64 * max_radius * 0.8 + max_radius * 0.2
        }
        None => max_radius * 0.9,
    }
}

fn short_id(id: &str) -> String {
    if id.chars().count() > 5 {
        format!("{}...", id.chars().take(4).collect::<String>())
    } else {
        id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub root: String,
    pub quality: String,
    pub count: u32,
    /// Screen angle in radians, `-π/2` is straight up
    pub angle: f64,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    /// Circle radius
    pub size: f64,
    pub opacity: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedLink {
    /// Index into `nodes`
    pub source: usize,
    pub target: usize,
    pub prob: f64,
    pub path: String,
    pub width: f64,
    pub opacity: f64,
}

/// Opacities while one node is hovered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub node_opacity: Vec<f64>,
    pub link_opacity: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordNetworkLayout {
    pub state: ChartState,
    pub center: (f64, f64),
    pub max_radius: f64,
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<PositionedLink>,
    /// Links dropped because an endpoint was missing
    pub skipped_links: usize,
}

impl ChordNetworkLayout {
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Focus opacities for hovering `id`; `None` for an unknown node
    pub fn highlight(&self, id: &str) -> Option<Highlight> {
        let focus = self.node_index(id)?;
        let touches = |link: &PositionedLink| link.source == focus || link.target == focus;

        let mut connected = vec![false; self.nodes.len()];
        for link in self.links.iter().filter(|l| touches(l)) {
            connected[link.source] = true;
            connected[link.target] = true;
        }

        let node_opacity = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                if i == focus {
                    1.0
                } else if connected[i] {
                    node.opacity
                } else {
                    0.2
                }
            })
            .collect();
        let link_opacity = self
            .links
            .iter()
            .map(|link| if touches(link) { link.opacity.max(0.6) } else { 0.1 })
            .collect();

        Some(Highlight {
            node_opacity,
            link_opacity,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordNetworkSpec {
    pub width: f64,
    pub height: f64,
    /// Room left around the outermost ring for labels
    pub label_margin: f64,
    pub title: Option<String>,
}

impl Default for ChordNetworkSpec {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            label_margin: 80.0,
            title: None,
        }
    }
}

impl ChordNetworkSpec {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn layout(&self, graph: &ChordGraph, degraded: bool) -> ChordNetworkLayout {
        let center = (self.width / 2.0, self.height / 2.0);
        let max_radius = (self.width.min(self.height) / 2.0 - self.label_margin).max(0.0);

        let max_count = graph.nodes.iter().map(|n| n.count).max().unwrap_or(0).max(1) as f64;
        let size_scale = SqrtScale::new(max_count, (3.0, 15.0));
        let opacity_scale = LinearScale::new((0.0, max_count), (0.3, 1.0));

        let nodes: Vec<PositionedNode> = graph
            .nodes
            .iter()
            .filter_map(|node| {
                let Some(index) = root_index(&node.root) else {
                    debug!(chord = %node.id, root = %node.root, "skipping chord with unknown root");
                    return None;
                };
                let angle = index as f64 / PITCH_CLASSES.len() as f64 * TAU - FRAC_PI_2;
                let radius = quality_radius(&node.quality, max_radius);
                Some(PositionedNode {
                    id: node.id.clone(),
                    root: node.root.clone(),
                    quality: node.quality.clone(),
                    count: node.count,
                    angle,
                    radius,
                    x: center.0 + angle.cos() * radius,
                    y: center.1 + angle.sin() * radius,
                    size: size_scale.apply(node.count as f64),
                    opacity: opacity_scale.apply(node.count as f64),
                    color: quality_color(&node.quality),
                })
            })
            .collect();

        let max_prob = graph
            .links
            .iter()
            .map(|l| l.prob)
            .filter(|p| p.is_finite())
            .fold(0.0, f64::max);
        let max_prob = if max_prob > 0.0 { max_prob } else { 1.0 };
        let width_scale = LinearScale::new((0.0, max_prob), (0.5, 4.0));
        let link_opacity_scale = LinearScale::new((0.0, max_prob), (0.1, 0.8));

        let mut skipped_links = 0;
        let mut links = Vec::new();
        for link in &graph.links {
            let source = nodes.iter().position(|n| n.id == link.source);
            let target = nodes.iter().position(|n| n.id == link.target);
            let (Some(source), Some(target)) = (source, target) else {
                skipped_links += 1;
                continue;
            };
            let prob = if link.prob.is_finite() { link.prob } else { 0.0 };
            let (s, t) = (&nodes[source], &nodes[target]);
            let dr = ((t.x - s.x).powi(2) + (t.y - s.y).powi(2)).sqrt() * 0.3;
            links.push(PositionedLink {
                source,
                target,
                prob,
                path: format!(
                    "M{},{}A{},{} 0 0,1 {},{}",
                    svg::num(s.x),
                    svg::num(s.y),
                    svg::num(dr),
                    svg::num(dr),
                    svg::num(t.x),
                    svg::num(t.y)
                ),
                width: width_scale.apply(prob),
                opacity: link_opacity_scale.apply(prob),
            });
        }
        if skipped_links > 0 {
            debug!(skipped = skipped_links, "dropped links with missing endpoints");
        }

        let state = if nodes.is_empty() {
            ChartState::Empty
        } else {
            ChartState::for_data(degraded)
        };

        ChordNetworkLayout {
            state,
            center,
            max_radius,
            nodes,
            links,
            skipped_links,
        }
    }

    pub fn to_svg(&self, layout: &ChordNetworkLayout) -> String {
        let mut doc = SvgDocument::new(self.width, self.height);
        if layout.state == ChartState::Empty {
            placeholder(&mut doc, self.width, self.height, "No chord data");
            return doc.finish();
        }
        let (cx, cy) = layout.center;
        let r = layout.max_radius;

        doc.raw(&format!(
            "<defs><marker id=\"arrowhead\" viewBox=\"0 -5 10 10\" refX=\"8\" refY=\"0\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto\"><path d=\"M0,-5L10,0L0,5\" fill=\"{}\"/></marker></defs>",
            MAJOR_COLOR
        ));

        for (i, label) in PITCH_CLASSES.iter().enumerate() {
            let angle = i as f64 / PITCH_CLASSES.len() as f64 * TAU - FRAC_PI_2;
            doc.push(
                svg::line(cx, cy, cx + angle.cos() * r, cy + angle.sin() * r)
                    .attr("stroke", "#e0e0e0")
                    .attr("stroke-width", "1")
                    .attr("stroke-dasharray", "2,2"),
            );
            doc.push(
                svg::text(cx + angle.cos() * (r + 25.0), cy + angle.sin() * (r + 25.0), *label)
                    .attr("text-anchor", "middle")
                    .attr("dy", "0.35em")
                    .attr("font-size", "16px")
                    .attr("font-weight", "bold")
                    .attr("fill", "#333"),
            );
        }

        for i in 0..5 {
            doc.push(
                svg::circle(cx, cy, (i as f64 + 1.0) / 5.0 * r * 0.8 + r * 0.2)
                    .attr("fill", "none")
                    .attr("stroke", "#f0f0f0")
                    .attr("stroke-width", "1")
                    .attr("stroke-dasharray", "1,3"),
            );
        }

        for link in &layout.links {
            doc.push(
                svg::path(link.path.as_str())
                    .attr("stroke", MAJOR_COLOR)
                    .num("stroke-width", link.width)
                    .num("stroke-opacity", link.opacity)
                    .attr("fill", "none")
                    .attr("marker-end", "url(#arrowhead)"),
            );
        }

        for node in &layout.nodes {
            doc.push(
                svg::circle(node.x, node.y, node.size)
                    .attr("fill", node.color)
                    .attr("stroke", "#fff")
                    .attr("stroke-width", "2")
                    .num("opacity", node.opacity)
                    .attr("data-chord", node.id.as_str()),
            );
        }
        for node in &layout.nodes {
            doc.push(
                svg::text(node.x, node.y, short_id(&node.id))
                    .attr("text-anchor", "middle")
                    .attr("dy", "0.35em")
                    .attr("font-size", "9px")
                    .attr("font-weight", "bold")
                    .attr("fill", "white"),
            );
        }

        doc.open_group(Some(&svg::translate(20.0, 20.0)));
        let legend = [
            ("Major", MAJOR_COLOR),
            ("Minor", MINOR_COLOR),
            ("7th", SEVENTH_COLOR),
            ("Other", OTHER_COLOR),
        ];
        for (i, (name, color)) in legend.iter().enumerate() {
            let row = i as f64 * 20.0;
            doc.push(svg::circle(0.0, row, 6.0).attr("fill", *color));
            doc.push(
                svg::text(15.0, row, *name)
                    .attr("dy", "0.35em")
                    .attr("font-size", "12px")
                    .attr("fill", "#333"),
            );
        }
        doc.close_group();

        if let Some(title) = &self.title {
            doc.push(
                svg::text(self.width - 20.0, 24.0, title.as_str())
                    .attr("text-anchor", "end")
                    .attr("font-size", "14px")
                    .attr("font-weight", "600")
                    .attr("fill", "#1E293B"),
            );
        }
        if layout.state == ChartState::Degraded {
            degraded_badge(&mut doc, self.width);
        }
        doc.finish()
    }

    pub fn render(&self, graph: &ChordGraph, degraded: bool) -> String {
        self.to_svg(&self.layout(graph, degraded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChordLink, ChordNode};
    use pretty_assertions::assert_eq;

    fn node(id: &str, root: &str, quality: &str, count: u32) -> ChordNode {
        ChordNode {
            id: id.to_string(),
            root: root.to_string(),
            quality: quality.to_string(),
            count,
        }
    }

    fn link(source: &str, target: &str, prob: f64) -> ChordLink {
        ChordLink {
            source: source.to_string(),
            target: target.to_string(),
            count: 1,
            prob,
        }
    }

    fn sample_graph() -> ChordGraph {
        ChordGraph {
            nodes: vec![
                node("C", "C", "maj", 100),
                node("Am", "A", "min", 25),
                node("G7", "G", "7", 50),
                node("F#dim", "F#", "dim", 0),
            ],
            links: vec![
                link("C", "Am", 0.5),
                link("Am", "G7", 0.25),
                link("G7", "Missing", 0.9),
            ],
        }
    }

    #[test]
    fn test_root_index_merges_enharmonics() {
        assert_eq!(root_index("C"), Some(0));
        assert_eq!(root_index("C#"), Some(1));
        assert_eq!(root_index("Db"), Some(1));
        assert_eq!(root_index("Fs"), Some(6));
        assert_eq!(root_index("X"), None);
    }

    #[test]
    fn test_quality_rings() {
        assert!((quality_radius("maj", 100.0) - 28.0).abs() < 1e-9);
        assert!((quality_radius("sus2", 100.0) - 100.0).abs() < 1e-9);
        assert!((quality_radius("9", 100.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_ids() {
        assert_eq!(short_id("Cmaj7"), "Cmaj7");
        assert_eq!(short_id("Cmaj7b5"), "Cmaj...");
    }

    #[test]
    fn test_quality_colors() {
        assert_eq!(quality_color("maj"), MAJOR_COLOR);
        assert_eq!(quality_color("min7"), MINOR_COLOR);
        assert_eq!(quality_color("maj7"), SEVENTH_COLOR);
        assert_eq!(quality_color("sus4"), OTHER_COLOR);
    }

    #[test]
    fn test_layout_positions() {
        let spec = ChordNetworkSpec::default();
        let layout = spec.layout(&sample_graph(), false);
        assert_eq!(layout.max_radius, 220.0);
        assert_eq!(layout.center, (400.0, 300.0));

        // C sits straight up on the innermost ring
        let c = &layout.nodes[0];
        assert!((c.x - 400.0).abs() < 1e-9);
        assert!((c.y - (300.0 - quality_radius("maj", 220.0))).abs() < 1e-9);
        assert!((c.size - 15.0).abs() < 1e-9);
        assert!((c.opacity - 1.0).abs() < 1e-9);

        // A is at nine o'clock
        let am = &layout.nodes[1];
        assert!(am.x < 400.0);
        assert!((am.y - 300.0).abs() < 1e-9);
        assert!((am.size - 9.0).abs() < 1e-9);

        let dim = &layout.nodes[3];
        assert!((dim.size - 3.0).abs() < 1e-9);
        assert!((dim.opacity - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_dangling_links_are_skipped() {
        let layout = ChordNetworkSpec::default().layout(&sample_graph(), false);
        assert_eq!(layout.links.len(), 2);
        assert_eq!(layout.skipped_links, 1);

        // Scales normalize to the largest drawn-or-not probability
        let first = &layout.links[0];
        assert!((first.width - (0.5 + 0.5 / 0.9 * 3.5)).abs() < 1e-9);
        assert!(first.path.starts_with("M400,"));
        assert!(first.path.contains(" 0 0,1 "));
    }

    #[test]
    fn test_unknown_root_is_dropped() {
        let graph = ChordGraph {
            nodes: vec![node("C", "C", "maj", 3), node("??", "H", "maj", 3)],
            links: vec![link("C", "??", 1.0)],
        };
        let layout = ChordNetworkSpec::default().layout(&graph, false);
        assert_eq!(layout.nodes.len(), 1);
        assert_eq!(layout.skipped_links, 1);
    }

    #[test]
    fn test_highlight() {
        let layout = ChordNetworkSpec::default().layout(&sample_graph(), false);
        let focus = layout.highlight("Am").unwrap();

        assert_eq!(focus.node_opacity[1], 1.0);
        assert_eq!(focus.node_opacity[0], layout.nodes[0].opacity);
        assert_eq!(focus.node_opacity[2], layout.nodes[2].opacity);
        assert_eq!(focus.node_opacity[3], 0.2);
        assert!(focus.link_opacity.iter().all(|&o| o >= 0.6));

        let focus = layout.highlight("F#dim").unwrap();
        assert_eq!(focus.link_opacity, vec![0.1, 0.1]);
        assert!(layout.highlight("nope").is_none());
    }

    #[test]
    fn test_empty_graph() {
        let spec = ChordNetworkSpec::default();
        let layout = spec.layout(&ChordGraph::default(), false);
        assert_eq!(layout.state, ChartState::Empty);
        let svg = spec.to_svg(&layout);
        assert!(svg.contains("No chord data"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_svg_output() {
        let spec = ChordNetworkSpec::default().with_title("Brazil");
        let svg = spec.render(&sample_graph(), true);
        assert_eq!(svg.matches("marker-end=\"url(#arrowhead)\"").count(), 2);
        assert_eq!(svg.matches("data-chord=").count(), 4);
        assert!(svg.contains(">F#dim</text>"));
        assert!(svg.contains(">Brazil</text>"));
        assert!(svg.contains(">Gb</text>"));
        assert!(svg.contains("fallback data"));
        assert!(!svg.contains("NaN"));
    }
}
