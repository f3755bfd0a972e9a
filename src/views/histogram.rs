//! Distribution histogram (gain and BPM)
//!
//! One parameterized chart: bars, a kernel density curve scaled to counts,
//! mean and median markers, optional reference lines and an optional y cap
//! with overflow arrows for bins that exceed it.

use serde::Serialize;

use crate::stats::{self, Bin, LinearScale};
use crate::views::svg::{self, SvgDocument};
use crate::views::{degraded_badge, placeholder, ChartState, Margin};

const MEAN_COLOR: &str = "#dc2626";
const MEDIAN_COLOR: &str = "#16a34a";
const DENSITY_COLOR: &str = "#dc2626";
const REFERENCE_COLOR: &str = "#6b7280";
const OVERFLOW_ARROW: &str = "M-4,-8 L0,0 L4,-8 Z";
/// Points at which the density curve is evaluated
const DENSITY_SAMPLES: usize = 101;

/// How the x domain is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Domain {
    /// Min/max of the data (a single distinct value is widened by ±0.5)
    Extent,
    Fixed(f64, f64),
}

/// A labelled vertical marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub value: f64,
    pub label: String,
}

impl ReferenceLine {
    pub fn new(value: f64, label: &str) -> Self {
        Self {
            value,
            label: label.to_string(),
        }
    }
}

/// Chart parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub axis_label: String,
    pub domain: Domain,
    pub bins: usize,
    /// Epanechnikov bandwidth in data units
    pub bandwidth: f64,
    /// Fixed y maximum; taller bins get an overflow arrow
    pub y_cap: Option<f64>,
    pub reference_lines: Vec<ReferenceLine>,
    pub fill: String,
    pub stroke: String,
    /// Decimals shown in the mean/median legend
    pub decimals: usize,
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl HistogramSpec {
    /// Loudness histogram: domain follows the data
    pub fn gain() -> Self {
        Self {
            axis_label: "Gain".to_string(),
            domain: Domain::Extent,
            bins: 20,
            bandwidth: 0.5,
            y_cap: None,
            reference_lines: Vec::new(),
            fill: "#3b82f6".to_string(),
            stroke: "#1e40af".to_string(),
            decimals: 2,
            width: 400.0,
            height: 300.0,
            margin: Margin {
                top: 20.0,
                right: 30.0,
                bottom: 40.0,
                left: 50.0,
            },
        }
    }

    /// Tempo histogram: fixed 80-200 domain so sectors compare directly
    pub fn bpm() -> Self {
        Self {
            axis_label: "BPM (Beats Per Minute)".to_string(),
            domain: Domain::Fixed(80.0, 200.0),
            bins: 25,
            bandwidth: 2.0,
            y_cap: Some(180.0),
            reference_lines: vec![
                ReferenceLine::new(60.0, "Slow"),
                ReferenceLine::new(120.0, "Moderate"),
                ReferenceLine::new(180.0, "Fast"),
            ],
            fill: "#059669".to_string(),
            stroke: "#047857".to_string(),
            decimals: 1,
            ..Self::gain()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Use `color` for the bars with a darker outline
    pub fn with_color(mut self, color: &str) -> Self {
        self.fill = color.to_string();
        self.stroke = svg::darker(color, 0.5);
        self
    }

    /// Stage 1: bins, statistics and density
    pub fn layout(&self, values: &[f64], degraded: bool) -> HistogramLayout {
        let finite = stats::finite_values(values);
        let domain = match self.domain {
            Domain::Fixed(lo, hi) => (lo, hi),
            Domain::Extent => match stats::extent(&finite) {
                Some((lo, hi)) if hi > lo => (lo, hi),
                Some((v, _)) => (v - 0.5, v + 0.5),
                None => (0.0, 1.0),
            },
        };

        if finite.is_empty() {
            return HistogramLayout {
                state: ChartState::Empty,
                sample_count: 0,
                domain,
                bins: Vec::new(),
                y_max: self.y_cap.unwrap_or(1.0),
                mean: None,
                median: None,
                density: Vec::new(),
                overflow: Vec::new(),
                reference_lines: Vec::new(),
            };
        }

        let bins = stats::bin_counts(&finite, domain, self.bins);
        let tallest = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
        let y_max = self.y_cap.unwrap_or_else(|| tallest.max(1.0));
        let overflow = match self.y_cap {
            Some(cap) => bins
                .iter()
                .enumerate()
                .filter(|(_, b)| b.count as f64 > cap)
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };

        let n = finite.len() as f64;
        let scale = n * (domain.1 - domain.0) / self.bins.max(1) as f64;
        let xs = stats::linspace(domain.0, domain.1, DENSITY_SAMPLES);
        let density = stats::kernel_density(&finite, self.bandwidth, &xs)
            .into_iter()
            .map(|(x, d)| (x, d * scale))
            .collect();

        let reference_lines = self
            .reference_lines
            .iter()
            .filter(|r| r.value >= domain.0 && r.value <= domain.1)
            .cloned()
            .collect();

        HistogramLayout {
            state: ChartState::for_data(degraded),
            sample_count: finite.len(),
            domain,
            bins,
            y_max,
            mean: stats::mean(&finite),
            median: stats::median(&finite),
            density,
            overflow,
            reference_lines,
        }
    }

    /// Stage 2: serialize a layout
    pub fn to_svg(&self, layout: &HistogramLayout) -> String {
        let mut doc = SvgDocument::new(self.width, self.height);
        if layout.state == ChartState::Empty {
            placeholder(&mut doc, self.width, self.height, "No data for this mood");
            return doc.finish();
        }

        let (inner_w, inner_h) = self.margin.inner(self.width, self.height);
        let x = LinearScale::new(layout.domain, (0.0, inner_w));
        let y = LinearScale::new((0.0, layout.y_max), (inner_h, 0.0));

        doc.open_group(Some(&svg::translate(self.margin.left, self.margin.top)));

        for bin in &layout.bins {
            let shown = (bin.count as f64).min(layout.y_max);
            doc.push(
                svg::rect(
                    x.apply(bin.x0),
                    y.apply(shown),
                    x.apply(bin.x1) - x.apply(bin.x0) - 1.0,
                    inner_h - y.apply(shown),
                )
                .attr("fill", self.fill.as_str())
                .attr("fill-opacity", "0.7")
                .attr("stroke", self.stroke.as_str())
                .attr("stroke-width", "1"),
            );
        }

        for &i in &layout.overflow {
            if let Some(bin) = layout.bins.get(i) {
                let cx = x.apply((bin.x0 + bin.x1) / 2.0);
                doc.push(
                    svg::path(OVERFLOW_ARROW)
                        .attr("transform", svg::translate(cx, y.apply(layout.y_max) - 3.0))
                        .attr("fill", "#dc2626")
                        .attr("stroke", "#991b1b")
                        .attr("stroke-width", "1"),
                );
            }
        }

        let curve: Vec<(f64, f64)> = layout
            .density
            .iter()
            .map(|&(dx, dy)| (x.apply(dx), y.apply(dy.min(layout.y_max))))
            .collect();
        doc.push(
            svg::path(svg::polyline_path(&curve))
                .attr("fill", "none")
                .attr("stroke", DENSITY_COLOR)
                .attr("stroke-width", "2"),
        );

        for (value, color) in [(layout.mean, MEAN_COLOR), (layout.median, MEDIAN_COLOR)] {
            if let Some(v) = value {
                doc.push(
                    svg::line(x.apply(v), 0.0, x.apply(v), inner_h)
                        .attr("stroke", color)
                        .attr("stroke-width", "2")
                        .attr("stroke-dasharray", "4,4"),
                );
            }
        }

        for reference in &layout.reference_lines {
            let rx = x.apply(reference.value);
            doc.push(
                svg::line(rx, 0.0, rx, inner_h)
                    .attr("stroke", REFERENCE_COLOR)
                    .attr("stroke-width", "1")
                    .attr("stroke-dasharray", "2,2")
                    .attr("opacity", "0.5"),
            );
            doc.push(
                svg::text(rx, -5.0, reference.label.as_str())
                    .attr("text-anchor", "middle")
                    .attr("font-size", "10px")
                    .attr("fill", REFERENCE_COLOR),
            );
        }

        self.axes(&mut doc, layout, &x, &y, inner_w, inner_h);
        self.legend(&mut doc, layout, inner_w);

        doc.close_group();
        if layout.state == ChartState::Degraded {
            degraded_badge(&mut doc, self.width);
        }
        doc.finish()
    }

    /// Layout and serialize in one go
    pub fn render(&self, values: &[f64], degraded: bool) -> String {
        self.to_svg(&self.layout(values, degraded))
    }

    fn axes(
        &self,
        doc: &mut SvgDocument,
        layout: &HistogramLayout,
        x: &LinearScale,
        y: &LinearScale,
        inner_w: f64,
        inner_h: f64,
    ) {
        doc.push(svg::line(0.0, inner_h, inner_w, inner_h).attr("stroke", "#000"));
        for tick in stats::linspace(layout.domain.0, layout.domain.1, 6) {
            let tx = x.apply(tick);
            doc.push(svg::line(tx, inner_h, tx, inner_h + 6.0).attr("stroke", "#000"));
            doc.push(
                svg::text(tx, inner_h + 18.0, svg::num(tick))
                    .attr("text-anchor", "middle")
                    .attr("font-size", "10px"),
            );
        }
        doc.push(
            svg::text(inner_w / 2.0, inner_h + 35.0, self.axis_label.as_str())
                .attr("text-anchor", "middle")
                .attr("fill", "black"),
        );

        doc.push(svg::line(0.0, 0.0, 0.0, inner_h).attr("stroke", "#000"));
        for tick in stats::linspace(0.0, layout.y_max, 5) {
            let ty = y.apply(tick);
            doc.push(svg::line(-6.0, ty, 0.0, ty).attr("stroke", "#000"));
            doc.push(
                svg::text(-9.0, ty + 3.0, svg::num(tick.round()))
                    .attr("text-anchor", "end")
                    .attr("font-size", "10px"),
            );
        }
        doc.push(
            svg::text(-inner_h / 2.0, -35.0, "Frequency")
                .attr("transform", "rotate(-90)")
                .attr("text-anchor", "middle")
                .attr("fill", "black"),
        );
    }

    fn legend(&self, doc: &mut SvgDocument, layout: &HistogramLayout, inner_w: f64) {
        doc.open_group(Some(&svg::translate(inner_w - 120.0, 20.0)));
        let entries = [
            ("Mean", layout.mean, MEAN_COLOR, 0.0),
            ("Median", layout.median, MEDIAN_COLOR, 15.0),
        ];
        for (name, value, color, row) in entries {
            let Some(value) = value else { continue };
            doc.push(
                svg::line(0.0, row, 15.0, row)
                    .attr("stroke", color)
                    .attr("stroke-width", "2")
                    .attr("stroke-dasharray", "4,4"),
            );
            doc.push(
                svg::text(20.0, row, format!("{}: {:.*}", name, self.decimals, value))
                    .attr("dy", "0.35em")
                    .attr("font-size", "12px"),
            );
        }
        doc.close_group();
    }
}

/// Output of [`HistogramSpec::layout`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramLayout {
    pub state: ChartState,
    /// Finite input values
    pub sample_count: usize,
    pub domain: (f64, f64),
    #[serde(skip)]
    pub bins: Vec<Bin>,
    pub y_max: f64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// `(x, estimated count)` pairs
    pub density: Vec<(f64, f64)>,
    /// Indices of bins taller than the y cap
    pub overflow: Vec<usize>,
    /// Reference lines inside the domain
    pub reference_lines: Vec<ReferenceLine>,
}

impl HistogramLayout {
    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|b| b.count).collect()
    }
}
