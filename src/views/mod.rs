//! Presentation views
//!
//! Every view is split into a layout stage (plain data, unit-tested) and an
//! SVG stage that only serializes the layout.

pub mod chord_network;
pub mod histogram;
pub mod key_puzzle;
pub mod mood_wheel;
pub mod svg;

use serde::{Deserialize, Serialize};

pub use chord_network::{ChordNetworkLayout, ChordNetworkSpec};
pub use histogram::{HistogramLayout, HistogramSpec};
pub use key_puzzle::{KeyPuzzleLayout, KeyPuzzleSpec};
pub use mood_wheel::{WheelStyle, WheelView};

/// What a chart is able to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartState {
    Ready,
    /// No usable data; a placeholder is drawn
    Empty,
    /// Drawn from fallback data
    Degraded,
}

impl ChartState {
    /// `Ready` or `Degraded` depending on where the data came from
    pub fn for_data(degraded: bool) -> Self {
        if degraded {
            ChartState::Degraded
        } else {
            ChartState::Ready
        }
    }
}

/// Plot-area margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn inner(&self, width: f64, height: f64) -> (f64, f64) {
        (
            (width - self.left - self.right).max(0.0),
            (height - self.top - self.bottom).max(0.0),
        )
    }
}

/// Centered placeholder text used by every empty chart
pub(crate) fn placeholder(doc: &mut svg::SvgDocument, width: f64, height: f64, message: &str) {
    doc.push(
        svg::text(width / 2.0, height / 2.0, message)
            .attr("text-anchor", "middle")
            .attr("font-size", "12px")
            .attr("fill", "#6b7280"),
    );
}

/// Small corner badge marking fallback data
pub(crate) fn degraded_badge(doc: &mut svg::SvgDocument, width: f64) {
    doc.push(
        svg::text(width - 6.0, 12.0, "fallback data")
            .attr("text-anchor", "end")
            .attr("font-size", "10px")
            .attr("fill", "#b45309"),
    );
}
