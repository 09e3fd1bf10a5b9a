mod forces;
mod quadtree;

use eframe::egui::Vec2;

use super::LayoutNode;
use super::clamp::{ViewportBounds, clamp_node};
use super::{LayoutParams, ViewportConfig};
use forces::{
    CollisionParams, RepulsionParams, accumulate_repulsion_for_node, apply_centering,
    resolve_collision_pairs,
};
pub use quadtree::QuadtreeCell;
use quadtree::{QuadNode, collect_quadtree_cells};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    pub tick: u32,
    pub activity: f32,
    pub settled: bool,
    pub repaired: usize,
    /// Deepest remaining circle overlap once settled; zero while ticking.
    pub overlap: f32,
}

fn label_charge(box_width: f32, factor: f32, exponent: f32) -> f32 {
    let charge = factor * box_width.max(0.0).powf(exponent);
    if charge.is_finite() { charge } else { 0.0 }
}

// Settle relaxation aims just past contact.
const RELAXATION_SLACK: f32 = 0.25;

fn worst_overlap(nodes: &[LayoutNode]) -> f32 {
    let mut worst = 0.0_f32;
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[(i + 1)..] {
            let required = a.collision_radius.max(1.0) + b.collision_radius.max(1.0);
            worst = worst.max(required - (a.pos - b.pos).length());
        }
    }
    worst
}

#[derive(Default)]
struct SolverScratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    predicted: Vec<Vec2>,
    charges: Vec<f32>,
    radii: Vec<f32>,
}

pub struct ForceSolver {
    center: Vec2,
    center_strength: f32,
    bounds: ViewportBounds,
    repulsion_factor: f32,
    repulsion_exponent: f32,
    repulsion_min_distance_sq: f32,
    theta_sq: f32,
    collision_strength: f32,
    collision_passes: usize,
    relaxation_passes: usize,
    overlap_tolerance: f32,
    overlap: f32,
    velocity_retention: f32,
    activity: f32,
    activity_decay: f32,
    settle_threshold: f32,
    max_ticks: u32,
    ticks: u32,
    scratch: SolverScratch,
}

impl ForceSolver {
    pub fn new(viewport: &ViewportConfig, params: &LayoutParams) -> Self {
        let mode = params.mode(viewport.mode);
        Self {
            center: viewport.center(),
            center_strength: mode.center_strength,
            bounds: ViewportBounds::new(viewport, params),
            repulsion_factor: params.repulsion_factor,
            repulsion_exponent: params.repulsion_exponent,
            repulsion_min_distance_sq: params.repulsion_min_distance_sq,
            theta_sq: params.barnes_hut_theta * params.barnes_hut_theta,
            collision_strength: params.collision_strength,
            collision_passes: params.collision_passes.max(4),
            relaxation_passes: params.settle_relaxation_passes,
            overlap_tolerance: params.overlap_tolerance.max(0.0),
            overlap: 0.0,
            velocity_retention: 1.0 - params.velocity_decay,
            activity: 1.0,
            activity_decay: params.activity_decay(),
            settle_threshold: params.settle_threshold,
            max_ticks: params.max_ticks.max(1),
            ticks: 0,
            scratch: SolverScratch::default(),
        }
    }

    pub fn activity(&self) -> f32 {
        self.activity
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn bounds(&self) -> ViewportBounds {
        self.bounds
    }

    pub fn is_settled(&self) -> bool {
        self.activity < self.settle_threshold || self.ticks >= self.max_ticks
    }

    pub fn step(&mut self, nodes: &mut [LayoutNode]) -> StepOutcome {
        if self.is_settled() {
            return self.outcome(0);
        }

        self.activity += (0.0 - self.activity) * self.activity_decay;
        self.ticks += 1;

        let node_count = nodes.len();
        let mut repaired = self.load_scratch(nodes);

        let scratch = &mut self.scratch;
        apply_centering(
            &scratch.positions,
            &mut scratch.velocities,
            self.center,
            self.center_strength * self.activity,
        );

        if node_count > 1
            && let Some(tree) = QuadNode::build(&scratch.positions, &scratch.charges, &[])
        {
            let params = RepulsionParams {
                activity: self.activity,
                min_distance_sq: self.repulsion_min_distance_sq,
                theta_sq: self.theta_sq,
            };
            for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
                accumulate_repulsion_for_node(
                    &tree,
                    index,
                    &scratch.positions,
                    &scratch.charges,
                    params,
                    velocity,
                );
            }
        }

        if node_count > 1 {
            let params = CollisionParams {
                strength: self.collision_strength,
            };
            for _ in 0..self.collision_passes {
                scratch.predicted.clear();
                scratch.predicted.extend(
                    scratch
                        .positions
                        .iter()
                        .zip(&scratch.velocities)
                        .map(|(position, velocity)| *position + *velocity),
                );
                let Some(tree) = QuadNode::build(&scratch.predicted, &[], &scratch.radii) else {
                    break;
                };
                resolve_collision_pairs(
                    &tree,
                    &tree,
                    true,
                    &scratch.radii,
                    params,
                    &mut scratch.predicted,
                    &mut scratch.velocities,
                );
            }
        }

        for (node, velocity) in nodes.iter_mut().zip(&scratch.velocities) {
            node.velocity = *velocity * self.velocity_retention;
            node.pos += node.velocity;

            if !node.pos.is_finite() || !node.velocity.is_finite() {
                node.pos = self.center;
                node.velocity = Vec2::ZERO;
                repaired += 1;
            }

            clamp_node(node, &self.bounds);
        }

        if repaired > 0 {
            tracing::warn!(repaired, tick = self.ticks, "reset non-finite label positions");
        }

        if self.is_settled() {
            self.overlap = self.relax_overlaps(nodes);
        }

        self.outcome(repaired)
    }

    /// Collision-only passes on resting positions, clamped after each pass,
    /// until no pair overlaps past the tolerance or the pass budget runs out.
    /// Returns the overlap left behind.
    fn relax_overlaps(&mut self, nodes: &mut [LayoutNode]) -> f32 {
        for node in nodes.iter_mut() {
            node.velocity = Vec2::ZERO;
        }

        let mut overlap = worst_overlap(nodes);
        if nodes.len() < 2 || overlap <= self.overlap_tolerance {
            return overlap.max(0.0);
        }

        let scratch = &mut self.scratch;
        scratch.radii.clear();
        scratch
            .radii
            .extend(nodes.iter().map(|node| node.collision_radius.max(1.0) + RELAXATION_SLACK));
        let params = CollisionParams { strength: 1.0 };

        let mut passes = 0;
        while overlap > self.overlap_tolerance && passes < self.relaxation_passes {
            scratch.predicted.clear();
            scratch.predicted.extend(nodes.iter().map(|node| node.pos));
            scratch.velocities.clear();
            scratch.velocities.resize(nodes.len(), Vec2::ZERO);

            let Some(tree) = QuadNode::build(&scratch.predicted, &[], &scratch.radii) else {
                break;
            };
            resolve_collision_pairs(
                &tree,
                &tree,
                true,
                &scratch.radii,
                params,
                &mut scratch.predicted,
                &mut scratch.velocities,
            );

            for (node, position) in nodes.iter_mut().zip(&scratch.predicted) {
                if position.is_finite() {
                    node.pos = *position;
                }
                clamp_node(node, &self.bounds);
            }

            overlap = worst_overlap(nodes);
            passes += 1;
        }

        if overlap > self.overlap_tolerance {
            // Circles cover more than the padded viewport can hold; bounds win.
            tracing::debug!(overlap, passes, labels = nodes.len(), "labels still overlap after settling");
        } else {
            tracing::trace!(passes, "settle relaxation cleared overlaps");
        }
        overlap.max(0.0)
    }

    fn load_scratch(&mut self, nodes: &mut [LayoutNode]) -> usize {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.charges.clear();
        scratch.radii.clear();

        let mut repaired = 0;
        for node in nodes.iter_mut() {
            if !node.pos.is_finite() || !node.velocity.is_finite() {
                node.pos = self.center;
                node.velocity = Vec2::ZERO;
                repaired += 1;
            }
            scratch.positions.push(node.pos);
            scratch.velocities.push(node.velocity);
            scratch.radii.push(node.collision_radius.max(1.0));
            scratch.charges.push(label_charge(
                node.box_width,
                self.repulsion_factor,
                self.repulsion_exponent,
            ));
        }
        repaired
    }

    fn outcome(&self, repaired: usize) -> StepOutcome {
        StepOutcome {
            tick: self.ticks,
            activity: self.activity,
            settled: self.is_settled(),
            repaired,
            overlap: if self.is_settled() { self.overlap } else { 0.0 },
        }
    }

    pub fn quadtree_cells(nodes: &[LayoutNode], cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let positions = nodes.iter().map(|node| node.pos).collect::<Vec<_>>();
        if let Some(tree) = QuadNode::build(&positions, &[], &[]) {
            collect_quadtree_cells(&tree, 0, cells);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cloud::{MetricMapper, SelectionConfig, ViewMode, build_nodes, select_terms};
    use crate::terms::{Category, Term, generate_category_terms};

    fn nodes_for(terms: &[Term], viewport: &ViewportConfig, seed: u64) -> Vec<LayoutNode> {
        let params = LayoutParams::default();
        let picked = select_terms(terms, &SelectionConfig::new(terms.len(), ""), &params);
        let mapper = MetricMapper::new(picked.iter().map(|t| t.weight), viewport, &params);
        let mut rng = StdRng::seed_from_u64(seed);
        build_nodes(&picked, &mapper, viewport, &params, &mut rng)
    }

    fn pizza_terms() -> Vec<Term> {
        vec![
            Term::new("Pizza", 80.0, Category::Positive),
            Term::new("Tasty", 75.0, Category::Positive),
            Term::new("Cold", 10.0, Category::Positive),
        ]
    }

    #[test]
    fn settles_within_tick_budget() {
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let mut nodes = nodes_for(&pizza_terms(), &viewport, 1);
        let mut solver = ForceSolver::new(&viewport, &LayoutParams::default());

        let mut last = None;
        for _ in 0..400 {
            let outcome = solver.step(&mut nodes);
            last = Some(outcome);
            if outcome.settled {
                break;
            }
        }

        let last = last.expect("stepped at least once");
        assert!(last.settled);
        assert!(last.tick <= 300);
    }

    #[test]
    fn settled_solver_no_longer_moves_nodes() {
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let mut nodes = nodes_for(&pizza_terms(), &viewport, 2);
        let mut solver = ForceSolver::new(&viewport, &LayoutParams::default());
        while !solver.step(&mut nodes).settled {}

        let before = nodes.iter().map(|node| node.pos).collect::<Vec<_>>();
        let outcome = solver.step(&mut nodes);
        assert!(outcome.settled);
        assert_eq!(outcome.tick, solver.ticks());
        assert!(nodes.iter().zip(&before).all(|(node, pos)| node.pos == *pos));
    }

    #[test]
    fn settled_labels_do_not_overlap() {
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let mut nodes = nodes_for(&pizza_terms(), &viewport, 5);
        let mut solver = ForceSolver::new(&viewport, &LayoutParams::default());
        while !solver.step(&mut nodes).settled {}

        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[(i + 1)..] {
                let gap = (a.pos - b.pos).length();
                assert!(
                    gap >= a.collision_radius + b.collision_radius - 1.0,
                    "{} and {} overlap: {gap}",
                    a.text,
                    b.text
                );
            }
        }
    }

    #[test]
    fn settle_relaxation_separates_a_crowded_cloud() {
        let viewport = ViewportConfig::new(1600.0, 900.0, ViewMode::Expanded);
        let mut rng = StdRng::seed_from_u64(0);
        let mut terms = generate_category_terms(Category::Positive, &mut rng);
        terms.truncate(30);
        let mut nodes = nodes_for(&terms, &viewport, 0);
        let mut solver = ForceSolver::new(&viewport, &LayoutParams::default());

        let mut outcome = solver.step(&mut nodes);
        while !outcome.settled {
            outcome = solver.step(&mut nodes);
        }

        assert!(outcome.overlap <= 1.0, "overlap left: {}", outcome.overlap);
        assert!(worst_overlap(&nodes) <= 1.0);
        let bounds = solver.bounds();
        assert!(nodes.iter().all(|node| bounds.contains(node, 1.0e-3)));
        assert!(nodes.iter().all(|node| node.velocity == Vec2::ZERO));
    }

    #[test]
    fn overfull_viewport_still_settles_inside_bounds() {
        let viewport = ViewportConfig::new(400.0, 200.0, ViewMode::Expanded);
        let mut rng = StdRng::seed_from_u64(3);
        let terms = generate_category_terms(Category::Negative, &mut rng);
        let mut nodes = nodes_for(&terms, &viewport, 3);
        let mut solver = ForceSolver::new(&viewport, &LayoutParams::default());

        let mut outcome = solver.step(&mut nodes);
        while !outcome.settled {
            outcome = solver.step(&mut nodes);
        }

        assert!(outcome.tick <= 300);
        assert!(outcome.overlap > 0.0);
        let bounds = solver.bounds();
        assert!(nodes.iter().all(|node| bounds.contains(node, 1.0e-3)));
    }

    #[test]
    fn single_node_drifts_to_center() {
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let terms = vec![Term::new("Pizza", 80.0, Category::Positive)];
        let mut nodes = nodes_for(&terms, &viewport, 9);
        let mut solver = ForceSolver::new(&viewport, &LayoutParams::default());
        while !solver.step(&mut nodes).settled {}

        assert!((nodes[0].pos - viewport.center()).length() < 25.0);
    }

    #[test]
    fn non_finite_positions_are_repaired() {
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let mut nodes = nodes_for(&pizza_terms(), &viewport, 4);
        nodes[1].pos.x = f32::NAN;
        let mut solver = ForceSolver::new(&viewport, &LayoutParams::default());
        solver.step(&mut nodes);
        assert!(nodes.iter().all(|node| node.pos.is_finite()));
    }

    #[test]
    fn quadtree_overlay_covers_nodes() {
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Expanded);
        let nodes = nodes_for(&pizza_terms(), &viewport, 6);
        let mut cells = Vec::new();
        ForceSolver::quadtree_cells(&nodes, &mut cells);
        assert!(!cells.is_empty());
        assert_eq!(cells[0].depth, 0);
    }
}
