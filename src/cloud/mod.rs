//! Label layout engine for weighted term clouds.
//!
//! Terms flow through [`select_terms`] and the [`MetricMapper`] into
//! [`LayoutNode`]s, which the [`ForceSolver`] settles inside the viewport one
//! host-driven tick at a time. [`LayoutSession`] owns a running solve and
//! restarts it on every reconfiguration; [`HoverTracker`] handles pointer
//! emphasis without touching the solver.

mod build;
mod clamp;
mod interaction;
mod metric;
mod params;
mod physics;
mod session;

use eframe::egui::{Vec2, vec2};

pub use build::{LayoutNode, build_nodes, collision_radius, estimate_box, select_terms};
pub use clamp::{ViewportBounds, clamp_to_viewport};
pub use interaction::{
    HoverChange, HoverTracker, InspectedTerm, Presentation, baseline_opacity, hit_test,
};
pub use metric::{FontRange, MetricMapper, WeightClass, sanitize_weight};
pub use params::{LayoutParams, ModeParams, load_layout_params, parse_layout_params};
pub use physics::{ForceSolver, QuadtreeCell, StepOutcome};
pub use session::{
    LayoutFrame, LayoutSession, NodeSnapshot, RebuildReason, SessionEvent, SessionPhase,
    TickOutcome,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    Compact,
    Expanded,
}

impl ViewMode {
    pub fn is_expanded(self) -> bool {
        self == Self::Expanded
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Compact => Self::Expanded,
            Self::Expanded => Self::Compact,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
    pub mode: ViewMode,
}

impl ViewportConfig {
    pub fn new(width: f32, height: f32, mode: ViewMode) -> Self {
        Self {
            width,
            height,
            mode,
        }
    }

    /// A viewport with a zero, negative or non-finite side cannot host a layout.
    pub fn is_ready(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub fn shorter_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn is_expanded(&self) -> bool {
        self.mode.is_expanded()
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::new(0.0, 0.0, ViewMode::Compact)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionConfig {
    pub word_limit: usize,
    /// Case-insensitive substring; empty keeps every term.
    pub filter: String,
}

impl SelectionConfig {
    pub fn new(word_limit: usize, filter: impl Into<String>) -> Self {
        Self {
            word_limit,
            filter: filter.into(),
        }
    }

    pub fn for_mode(mode: ViewMode, params: &LayoutParams) -> Self {
        Self::new(params.mode(mode).default_word_limit, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_readiness_rejects_degenerate_sizes() {
        assert!(ViewportConfig::new(800.0, 400.0, ViewMode::Compact).is_ready());
        assert!(!ViewportConfig::new(0.0, 400.0, ViewMode::Compact).is_ready());
        assert!(!ViewportConfig::new(800.0, -1.0, ViewMode::Compact).is_ready());
        assert!(!ViewportConfig::new(f32::NAN, 400.0, ViewMode::Expanded).is_ready());
        assert!(!ViewportConfig::default().is_ready());
    }

    #[test]
    fn selection_defaults_follow_view_mode() {
        let params = LayoutParams::default();
        assert_eq!(
            SelectionConfig::for_mode(ViewMode::Compact, &params).word_limit,
            20
        );
        assert_eq!(
            SelectionConfig::for_mode(ViewMode::Expanded, &params).word_limit,
            60
        );
        assert_eq!(ViewMode::Compact.toggled(), ViewMode::Expanded);
    }
}
