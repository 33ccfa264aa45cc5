use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 30.0,
            right: 30.0,
            bottom: 70.0,
            left: 30.0,
        }
    }
}

/// Pixel geometry and animation timing shared by the scatter plot and the bar chart. All
/// positions computed by the engine are in this layout space; the window scales it to fit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin: Margins,
    pub mds_width: f64,
    pub mds_height: f64,
    pub bar_width: f64,
    pub bar_height: f64,
    /// Gap between the two panels where the term labels sit.
    pub term_width: f64,
    pub max_radius: f64,
    /// Fraction of the scatter area covered by all marginal circles together.
    pub circle_proportion: f64,
    /// Same constant for circles conditioned on a highlighted term.
    pub term_proportion: f64,
    pub band_padding: f64,
    pub axis_ticks: usize,
    pub transition_ms: u64,
    pub circle_transition_ms: u64,
    pub label_font_size: f32,
    pub base_opacity: f32,
    pub highlight_opacity: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: Margins::default(),
            mds_width: 530.0,
            mds_height: 530.0,
            bar_width: 530.0,
            bar_height: 530.0,
            term_width: 90.0,
            max_radius: 60.0,
            circle_proportion: 0.25,
            term_proportion: 0.25,
            band_padding: 0.15,
            axis_ticks: 6,
            transition_ms: 750,
            circle_transition_ms: 250,
            label_font_size: 11.0,
            base_opacity: 0.2,
            highlight_opacity: 0.6,
        }
    }
}

impl LayoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid layout config {}", path.display()))
    }

    pub fn mds_area(&self) -> f64 {
        self.mds_width * self.mds_height
    }

    pub fn total_width(&self) -> f64 {
        self.mds_width + self.bar_width + self.margin.left + self.term_width + self.margin.right
    }

    pub fn total_height(&self) -> f64 {
        self.mds_height + 2.0 * self.margin.top + self.margin.bottom + 2.0 * self.max_radius
    }

    /// Vertical offset below the chart where entering bars start and exiting bars end up.
    pub fn offscreen_offset(&self) -> f64 {
        self.bar_height + self.margin.bottom + 2.0 * self.max_radius
    }

    pub fn transition_secs(&self) -> f64 {
        self.transition_ms as f64 / 1000.0
    }

    pub fn circle_transition_secs(&self) -> f64 {
        self.circle_transition_ms as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "transition_ms": 200, "margin": { "top": 10 } }"#)
                .expect("config parses");

        assert_eq!(config.transition_ms, 200);
        assert_eq!(config.margin.top, 10.0);
        assert_eq!(config.margin.bottom, 70.0);
        assert_eq!(config.mds_width, 530.0);
    }

    #[test]
    fn canvas_size_matches_panel_geometry() {
        let config = LayoutConfig::default();
        assert_eq!(config.total_width(), 530.0 + 530.0 + 30.0 + 90.0 + 30.0);
        assert_eq!(config.total_height(), 530.0 + 60.0 + 70.0 + 120.0);
    }
}
