use eframe::egui::Pos2;

use super::{LayoutNode, LayoutParams};

#[derive(Clone, Debug, PartialEq)]
pub struct InspectedTerm {
    pub text: String,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoverChange {
    pub inspected: Option<InspectedTerm>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Presentation {
    pub scale: f32,
    pub opacity: f32,
    pub shadow: bool,
}

pub fn baseline_opacity(rank: usize, count: usize, floor: f32) -> f32 {
    if count == 0 {
        return 1.0;
    }
    let from_lowest = count.saturating_sub(rank.min(count)) as f32;
    floor + (1.0 - floor) * (from_lowest / count as f32)
}

/// Index of the node whose label box contains `pointer`. Overlapping hits go
/// to the nearest center.
pub fn hit_test(pointer: Pos2, nodes: &[LayoutNode]) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.contains(pointer))
        .map(|(index, node)| (index, (node.pos - pointer.to_vec2()).length_sq()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

#[derive(Clone, Debug)]
pub struct HoverTracker {
    hovered: Option<usize>,
    generation: u64,
    hover_scale: f32,
    opacity_floor: f32,
}

impl HoverTracker {
    pub fn new(params: &LayoutParams) -> Self {
        Self {
            hovered: None,
            generation: 0,
            hover_scale: params.hover_scale,
            opacity_floor: params.opacity_floor,
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn update(
        &mut self,
        pointer: Option<Pos2>,
        nodes: &[LayoutNode],
        generation: u64,
    ) -> Option<HoverChange> {
        let stale = generation != self.generation;
        self.generation = generation;

        let previous = self.hovered;
        let next = pointer.and_then(|pointer| hit_test(pointer, nodes));
        self.hovered = next;

        if next == previous && !(stale && previous.is_some()) {
            return None;
        }

        Some(HoverChange {
            inspected: next.and_then(|index| nodes.get(index)).map(|node| InspectedTerm {
                text: node.text.clone(),
                weight: node.weight,
            }),
        })
    }

    pub fn presentation(&self, index: usize, count: usize) -> Presentation {
        if self.hovered == Some(index) {
            Presentation {
                scale: self.hover_scale,
                opacity: 1.0,
                shadow: true,
            }
        } else {
            Presentation {
                scale: 1.0,
                opacity: baseline_opacity(index, count, self.opacity_floor),
                shadow: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cloud::{
        MetricMapper, SelectionConfig, ViewMode, ViewportConfig, build_nodes, select_terms,
    };
    use crate::terms::{Category, Term};

    fn placed_nodes() -> Vec<LayoutNode> {
        let params = LayoutParams::default();
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let terms = vec![
            Term::new("Pizza", 80.0, Category::Positive),
            Term::new("Tasty", 75.0, Category::Positive),
            Term::new("Cold", 10.0, Category::Positive),
        ];
        let picked = select_terms(&terms, &SelectionConfig::new(3, ""), &params);
        let mapper = MetricMapper::new(picked.iter().map(|t| t.weight), &viewport, &params);
        let mut rng = StdRng::seed_from_u64(0);
        let mut nodes = build_nodes(&picked, &mapper, &viewport, &params, &mut rng);
        nodes[0].pos = vec2(200.0, 200.0);
        nodes[1].pos = vec2(400.0, 200.0);
        nodes[2].pos = vec2(600.0, 200.0);
        nodes
    }

    #[test]
    fn baseline_opacity_rises_with_rank() {
        assert!((baseline_opacity(0, 4, 0.6) - 1.0).abs() < 1.0e-6);
        assert!((baseline_opacity(3, 4, 0.6) - 0.7).abs() < 1.0e-6);
        assert!(baseline_opacity(1, 4, 0.6) > baseline_opacity(2, 4, 0.6));
        assert_eq!(baseline_opacity(0, 0, 0.6), 1.0);
    }

    #[test]
    fn hit_test_uses_label_boxes() {
        let nodes = placed_nodes();
        assert_eq!(hit_test(pos2(200.0, 200.0), &nodes), Some(0));
        assert_eq!(hit_test(pos2(605.0, 201.0), &nodes), Some(2));
        assert_eq!(hit_test(pos2(300.0, 200.0), &nodes), None);
    }

    #[test]
    fn hover_in_and_out_emit_changes_once() {
        let nodes = placed_nodes();
        let mut tracker = HoverTracker::new(&LayoutParams::default());

        let change = tracker.update(Some(pos2(400.0, 200.0)), &nodes, 1);
        let inspected = change.and_then(|change| change.inspected).expect("hover-in");
        assert_eq!(inspected.text, "Tasty");
        assert_eq!(inspected.weight, 75.0);

        assert!(tracker.update(Some(pos2(402.0, 199.0)), &nodes, 1).is_none());
        assert_eq!(
            tracker.update(None, &nodes, 1),
            Some(HoverChange { inspected: None })
        );
        assert!(tracker.update(None, &nodes, 1).is_none());
    }

    #[test]
    fn hovered_node_gets_emphasis_others_keep_baseline() {
        let nodes = placed_nodes();
        let mut tracker = HoverTracker::new(&LayoutParams::default());
        tracker.update(Some(pos2(600.0, 200.0)), &nodes, 1);

        let hovered = tracker.presentation(2, nodes.len());
        assert_eq!(hovered.opacity, 1.0);
        assert!(hovered.scale > 1.0);
        assert!(hovered.shadow);

        let resting = tracker.presentation(0, nodes.len());
        assert_eq!(resting.scale, 1.0);
        assert!(!resting.shadow);
        assert_eq!(resting.opacity, baseline_opacity(0, 3, 0.6));
    }

    #[test]
    fn rebuild_under_pointer_reports_new_term() {
        let nodes = placed_nodes();
        let mut tracker = HoverTracker::new(&LayoutParams::default());
        tracker.update(Some(pos2(200.0, 200.0)), &nodes, 1);

        let change = tracker.update(Some(pos2(200.0, 200.0)), &nodes, 2);
        assert!(change.is_some());
    }

    #[test]
    fn hovering_leaves_positions_untouched() {
        let nodes = placed_nodes();
        let before = nodes.iter().map(|node| node.pos).collect::<Vec<_>>();
        let mut tracker = HoverTracker::new(&LayoutParams::default());
        tracker.update(Some(pos2(200.0, 200.0)), &nodes, 1);
        tracker.presentation(0, nodes.len());
        assert!(nodes.iter().zip(&before).all(|(node, pos)| node.pos == *pos));
    }
}
