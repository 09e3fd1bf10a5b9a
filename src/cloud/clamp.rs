use super::{LayoutNode, LayoutParams, ViewportConfig};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportBounds {
    pub width: f32,
    pub height: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl ViewportBounds {
    pub fn new(viewport: &ViewportConfig, params: &LayoutParams) -> Self {
        let mode = params.mode(viewport.mode);
        Self {
            width: viewport.width.max(0.0),
            height: viewport.height.max(0.0),
            pad_x: mode.padding_x,
            pad_y: mode.padding_y,
        }
    }

    fn axis_range(extent: f32, half: f32, pad: f32) -> (f32, f32) {
        let low = half + pad;
        let high = extent - half - pad;
        if low <= high {
            (low, high)
        } else {
            let middle = extent * 0.5;
            (middle, middle)
        }
    }

    pub fn x_range(&self, node: &LayoutNode) -> (f32, f32) {
        Self::axis_range(self.width, node.box_width * 0.5, self.pad_x)
    }

    pub fn y_range(&self, node: &LayoutNode) -> (f32, f32) {
        Self::axis_range(self.height, node.box_height * 0.5, self.pad_y)
    }

    pub fn contains(&self, node: &LayoutNode, tolerance: f32) -> bool {
        let (x_low, x_high) = self.x_range(node);
        let (y_low, y_high) = self.y_range(node);
        node.pos.x >= x_low - tolerance
            && node.pos.x <= x_high + tolerance
            && node.pos.y >= y_low - tolerance
            && node.pos.y <= y_high + tolerance
    }
}

/// Hard min/max on the center. Velocity is left alone so a node against a
/// wall keeps responding to forces on the next tick.
pub(super) fn clamp_node(node: &mut LayoutNode, bounds: &ViewportBounds) {
    let (x_low, x_high) = bounds.x_range(node);
    let (y_low, y_high) = bounds.y_range(node);
    node.pos.x = node.pos.x.clamp(x_low, x_high);
    node.pos.y = node.pos.y.clamp(y_low, y_high);
}

pub fn clamp_to_viewport(nodes: &mut [LayoutNode], viewport: &ViewportConfig, params: &LayoutParams) {
    let bounds = ViewportBounds::new(viewport, params);
    for node in nodes {
        clamp_node(node, &bounds);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cloud::{MetricMapper, SelectionConfig, ViewMode, build_nodes, select_terms};
    use crate::terms::{Category, Term};

    fn single_node(text: &str, viewport: &ViewportConfig) -> LayoutNode {
        let params = LayoutParams::default();
        let terms = vec![Term::new(text, 50.0, Category::Neutral)];
        let picked = select_terms(&terms, &SelectionConfig::new(1, ""), &params);
        let mapper = MetricMapper::new([50.0], viewport, &params);
        let mut rng = StdRng::seed_from_u64(0);
        build_nodes(&picked, &mapper, viewport, &params, &mut rng).remove(0)
    }

    #[test]
    fn clamps_into_padded_box_without_touching_velocity() {
        let params = LayoutParams::default();
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let mut nodes = vec![single_node("Pizza", &viewport)];
        nodes[0].pos = vec2(-100.0, 900.0);
        nodes[0].velocity = vec2(-3.0, 4.0);

        clamp_to_viewport(&mut nodes, &viewport, &params);

        let node = &nodes[0];
        let half = node.half_extents();
        assert!((node.pos.x - (half.x + 25.0)).abs() < 1.0e-4);
        assert!((node.pos.y - (400.0 - half.y - 30.0)).abs() < 1.0e-4);
        assert_eq!(node.velocity, vec2(-3.0, 4.0));
        assert!(ViewportBounds::new(&viewport, &params).contains(node, 0.0));
    }

    #[test]
    fn expanded_view_uses_larger_padding() {
        let params = LayoutParams::default();
        let viewport = ViewportConfig::new(1200.0, 800.0, ViewMode::Expanded);
        let mut nodes = vec![single_node("Tasty", &viewport)];
        nodes[0].pos = vec2(0.0, 0.0);

        clamp_to_viewport(&mut nodes, &viewport, &params);

        let half = nodes[0].half_extents();
        assert!((nodes[0].pos.x - (half.x + 60.0)).abs() < 1.0e-4);
        assert!((nodes[0].pos.y - (half.y + 80.0)).abs() < 1.0e-4);
    }

    #[test]
    fn oversized_label_is_pinned_to_middle() {
        let params = LayoutParams::default();
        let viewport = ViewportConfig::new(120.0, 90.0, ViewMode::Compact);
        let mut nodes = vec![single_node("extraordinarily-long-label", &viewport)];
        nodes[0].pos = vec2(5.0, 5.0);

        clamp_to_viewport(&mut nodes, &viewport, &params);

        assert_eq!(nodes[0].pos.x, 60.0);
    }
}
