use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ViewMode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeParams {
    pub min_font: f32,
    pub max_font: f32,
    /// Ceiling on the max font as a fraction of the viewport's shorter side.
    pub max_font_fraction: f32,
    pub center_strength: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub default_word_limit: usize,
    pub word_limit_slider_max: usize,
}

impl ModeParams {
    pub fn compact() -> Self {
        Self {
            min_font: 10.0,
            max_font: 35.0,
            max_font_fraction: 0.1,
            center_strength: 0.06,
            padding_x: 25.0,
            padding_y: 30.0,
            default_word_limit: 20,
            word_limit_slider_max: 40,
        }
    }

    pub fn expanded() -> Self {
        Self {
            min_font: 18.0,
            max_font: 90.0,
            max_font_fraction: 0.15,
            center_strength: 0.04,
            padding_x: 60.0,
            padding_y: 80.0,
            default_word_limit: 60,
            word_limit_slider_max: 100,
        }
    }

    fn sanitized(mut self) -> Self {
        self.min_font = finite_or(self.min_font, 1.0).max(1.0);
        self.max_font = finite_or(self.max_font, self.min_font).max(self.min_font);
        self.max_font_fraction = finite_or(self.max_font_fraction, 0.1).clamp(0.01, 1.0);
        self.center_strength = finite_or(self.center_strength, 0.05).clamp(0.0, 1.0);
        self.padding_x = finite_or(self.padding_x, 0.0).max(0.0);
        self.padding_y = finite_or(self.padding_y, 0.0).max(0.0);
        self.word_limit_slider_max = self.word_limit_slider_max.max(1);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub compact: ModeParams,
    pub expanded: ModeParams,
    pub repulsion_factor: f32,
    pub repulsion_exponent: f32,
    pub repulsion_min_distance_sq: f32,
    pub barnes_hut_theta: f32,
    pub collision_scale: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub collision_passes: usize,
    /// Collision-only passes allowed once a solve settles with labels still overlapping.
    pub settle_relaxation_passes: usize,
    pub overlap_tolerance: f32,
    pub velocity_decay: f32,
    pub settle_threshold: f32,
    pub max_ticks: u32,
    pub jitter_radius: f32,
    pub glyph_factor: f32,
    pub line_factor: f32,
    pub hover_scale: f32,
    pub opacity_floor: f32,
    pub word_limit_cap: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            compact: ModeParams::compact(),
            expanded: ModeParams::expanded(),
            repulsion_factor: 3.5,
            repulsion_exponent: 0.9,
            repulsion_min_distance_sq: 1.0,
            barnes_hut_theta: 0.9,
            collision_scale: 0.6,
            collision_padding: 10.0,
            collision_strength: 1.0,
            collision_passes: 4,
            settle_relaxation_passes: 200,
            overlap_tolerance: 0.5,
            velocity_decay: 0.4,
            settle_threshold: 0.001,
            max_ticks: 300,
            jitter_radius: 25.0,
            glyph_factor: 0.55,
            line_factor: 1.1,
            hover_scale: 1.1,
            opacity_floor: 0.6,
            word_limit_cap: 100,
        }
    }
}

impl LayoutParams {
    pub fn mode(&self, mode: ViewMode) -> &ModeParams {
        match mode {
            ViewMode::Compact => &self.compact,
            ViewMode::Expanded => &self.expanded,
        }
    }

    /// Per-tick multiplicative decay that brings activity from 1 down to the
    /// settle threshold in exactly `max_ticks` ticks.
    pub fn activity_decay(&self) -> f32 {
        let ticks = self.max_ticks.max(1) as f32;
        1.0 - self.settle_threshold.powf(1.0 / ticks)
    }

    pub fn sanitized(mut self) -> Self {
        self.compact = self.compact.sanitized();
        self.expanded = self.expanded.sanitized();
        self.repulsion_factor = finite_or(self.repulsion_factor, 3.5).max(0.0);
        self.repulsion_exponent = finite_or(self.repulsion_exponent, 0.9).clamp(0.0, 2.0);
        self.repulsion_min_distance_sq = finite_or(self.repulsion_min_distance_sq, 1.0).max(0.01);
        self.barnes_hut_theta = finite_or(self.barnes_hut_theta, 0.9).clamp(0.0, 2.0);
        self.collision_scale = finite_or(self.collision_scale, 0.6).max(0.0);
        self.collision_padding = finite_or(self.collision_padding, 10.0).max(0.0);
        self.collision_strength = finite_or(self.collision_strength, 1.0).clamp(0.0, 1.0);
        self.collision_passes = self.collision_passes.max(4);
        self.overlap_tolerance = finite_or(self.overlap_tolerance, 0.5).max(0.0);
        self.velocity_decay = finite_or(self.velocity_decay, 0.4).clamp(0.0, 0.99);
        self.settle_threshold = finite_or(self.settle_threshold, 0.001).clamp(1.0e-6, 0.5);
        self.max_ticks = self.max_ticks.max(1);
        self.jitter_radius = finite_or(self.jitter_radius, 25.0).max(0.0);
        self.glyph_factor = finite_or(self.glyph_factor, 0.55).max(0.01);
        self.line_factor = finite_or(self.line_factor, 1.1).max(0.01);
        self.hover_scale = finite_or(self.hover_scale, 1.1).max(1.0);
        self.opacity_floor = finite_or(self.opacity_floor, 0.6).clamp(0.0, 1.0);
        self.word_limit_cap = self.word_limit_cap.max(1);
        self
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

pub fn load_layout_params(path: &Path) -> Result<LayoutParams> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout params {}", path.display()))?;
    parse_layout_params(&raw)
        .with_context(|| format!("failed to parse layout params {}", path.display()))
}

/// Overlays a partial JSON object onto the defaults, so a file only needs the
/// keys it changes, including keys nested inside `compact`/`expanded`.
pub fn parse_layout_params(raw: &str) -> Result<LayoutParams> {
    let overrides: Value = serde_json::from_str(raw).context("invalid JSON in layout params")?;
    if !overrides.is_object() {
        return Err(anyhow!("layout params must be a JSON object"));
    }

    let mut merged =
        serde_json::to_value(LayoutParams::default()).context("failed to encode defaults")?;
    merge_json(&mut merged, overrides);

    let params: LayoutParams =
        serde_json::from_value(merged).context("layout params have the wrong shape")?;
    Ok(params.sanitized())
}

fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        tracing::warn!(key = key.as_str(), "ignoring unknown layout param");
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
