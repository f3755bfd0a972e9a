//! Mood wheel rendering
//!
//! Eight annular sectors drawn counter-clockwise from 3 o'clock. The
//! committed sector is opaque with a drop shadow, the hover preview is
//! slightly dimmed and the rest fade back.

use serde::Serialize;

use crate::config::WheelConfig;
use crate::geometry::{point_on_wheel, sector_range, Point};
use crate::types::Sector;
use crate::views::svg::{self, SvgDocument};
use crate::wheel::MoodWheel;

const COMMITTED_OPACITY: f64 = 1.0;
const PREVIEW_OPACITY: f64 = 0.9;
const IDLE_OPACITY: f64 = 0.72;
const GUIDE_COLOR: &str = "#CBD5E1";

/// Look of a wheel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelStyle {
    pub size: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub palette: Vec<String>,
    pub labels: Vec<String>,
}

impl WheelStyle {
    pub fn from_config(config: &WheelConfig) -> Self {
        let (inner, outer) = config.radius_range();
        Self {
            size: config.size,
            inner_radius: inner,
            outer_radius: outer,
            palette: config.palette.clone(),
            labels: config.labels.clone(),
        }
    }

    fn color(&self, sector: Sector) -> &str {
        self.palette
            .get(sector.index() as usize)
            .map(String::as_str)
            .unwrap_or_else(|| sector.color())
    }

    fn label(&self, sector: Sector) -> &str {
        self.labels
            .get(sector.index() as usize)
            .map(String::as_str)
            .unwrap_or_else(|| sector.label())
    }
}

impl Default for WheelStyle {
    fn default() -> Self {
        Self::from_config(&WheelConfig::default())
    }
}

/// One drawn sector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorShape {
    pub sector: Sector,
    pub label: String,
    pub color: String,
    /// Path relative to the wheel center
    pub path: String,
    pub opacity: f64,
    pub shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelLayout {
    pub sectors: Vec<SectorShape>,
    /// Drag handle, relative to the canvas
    pub indicator: Option<Point>,
}

/// Stateless renderer for a wheel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelView {
    pub style: WheelStyle,
}

impl WheelView {
    pub fn new(style: WheelStyle) -> Self {
        Self { style }
    }

    pub fn layout(&self, committed: Sector, preview: Option<Sector>, indicator: Option<Point>) -> WheelLayout {
        let sectors = Sector::ALL
            .iter()
            .map(|&sector| {
                let opacity = if sector == committed {
                    COMMITTED_OPACITY
                } else if Some(sector) == preview {
                    PREVIEW_OPACITY
                } else {
                    IDLE_OPACITY
                };
                SectorShape {
                    sector,
                    label: self.style.label(sector).to_string(),
                    color: self.style.color(sector).to_string(),
                    path: self.sector_path(sector),
                    opacity,
                    shadow: sector == committed,
                }
            })
            .collect();
        WheelLayout { sectors, indicator }
    }

    /// Layout for the current state of a live wheel
    pub fn layout_for(&self, wheel: &MoodWheel) -> WheelLayout {
        self.layout(wheel.committed(), wheel.preview(), Some(wheel.indicator_position()))
    }

    fn sector_path(&self, sector: Sector) -> String {
        let origin = Point::new(0.0, 0.0);
        let (start, end) = sector_range(sector);
        let (inner, outer) = (self.style.inner_radius, self.style.outer_radius);
        let o0 = point_on_wheel(origin, outer, start);
        let o1 = point_on_wheel(origin, outer, end);
        let i1 = point_on_wheel(origin, inner, end);
        let i0 = point_on_wheel(origin, inner, start);
        // y grows downward, so counter-clockwise on screen is sweep-flag 0
        format!(
            "M{},{} A{},{} 0 0,0 {},{} L{},{} A{},{} 0 0,1 {},{} Z",
            svg::num(o0.x),
            svg::num(o0.y),
            svg::num(outer),
            svg::num(outer),
            svg::num(o1.x),
            svg::num(o1.y),
            svg::num(i1.x),
            svg::num(i1.y),
            svg::num(inner),
            svg::num(inner),
            svg::num(i0.x),
            svg::num(i0.y),
        )
    }

    pub fn to_svg(&self, layout: &WheelLayout) -> String {
        let size = self.style.size;
        let center = size / 2.0;
        let outer = self.style.outer_radius;
        let mut doc = SvgDocument::new(size, size);

        let mut defs = String::from("<defs>");
        for shape in &layout.sectors {
            defs.push_str(&format!(
                "<radialGradient id=\"grad-{i}\" cx=\"50%\" cy=\"50%\" r=\"70%\"><stop offset=\"0%\" stop-color=\"{c}\" stop-opacity=\"0.9\"/><stop offset=\"100%\" stop-color=\"{d}\" stop-opacity=\"0.7\"/></radialGradient>",
                i = shape.sector.index(),
                c = svg::escape(&shape.color),
                d = svg::escape(&svg::darker(&shape.color, 0.4)),
            ));
        }
        defs.push_str("<filter id=\"shadow\"><feDropShadow dx=\"0\" dy=\"2\" stdDeviation=\"4\" flood-color=\"#000\" flood-opacity=\"0.15\"/></filter></defs>");
        doc.raw(&defs);

        doc.open_group(Some(&svg::translate(center, center)));
        for shape in &layout.sectors {
            doc.push(
                svg::path(shape.path.as_str())
                    .attr("fill", format!("url(#grad-{})", shape.sector.index()))
                    .attr("stroke", "#fff")
                    .attr("stroke-width", "2")
                    .num("opacity", shape.opacity)
                    .attr("filter", if shape.shadow { "url(#shadow)" } else { "none" })
                    .attr("data-sector", shape.sector.index().to_string())
                    .attr("aria-label", shape.label.as_str()),
            );
        }
        doc.push(
            svg::circle(0.0, 0.0, outer)
                .attr("fill", "none")
                .attr("stroke", GUIDE_COLOR)
                .attr("stroke-width", "1.2"),
        );
        doc.push(svg::line(-outer, 0.0, outer, 0.0).attr("stroke", GUIDE_COLOR));
        doc.push(svg::line(0.0, -outer, 0.0, outer).attr("stroke", GUIDE_COLOR));
        doc.push(
            svg::circle(0.0, 0.0, 18.0)
                .attr("fill", "#fff")
                .attr("stroke", "#64748B")
                .attr("stroke-width", "2")
                .attr("filter", "url(#shadow)"),
        );
        doc.close_group();

        if let Some(handle) = layout.indicator {
            doc.push(
                svg::circle(handle.x, handle.y, 7.0)
                    .attr("fill", "#fff")
                    .attr("stroke", "#1E293B")
                    .attr("stroke-width", "2")
                    .attr("class", "drag-indicator"),
            );
        }
        doc.finish()
    }

    pub fn render(&self, wheel: &MoodWheel) -> String {
        self.to_svg(&self.layout_for(wheel))
    }
}
