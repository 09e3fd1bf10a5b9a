use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) activity: f32,
    pub(super) min_distance_sq: f32,
    pub(super) theta_sq: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
}

fn coincident_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

pub(super) fn apply_centering(
    positions: &[Vec2],
    velocities: &mut [Vec2],
    center: Vec2,
    strength: f32,
) {
    for (position, velocity) in positions.iter().zip(velocities.iter_mut()) {
        *velocity += (center - *position) * strength;
    }
}

fn repulsion_between(point: Vec2, source: Vec2, charge: f32, params: RepulsionParams) -> Vec2 {
    let delta = point - source;
    let mut distance_sq = delta.length_sq();
    if distance_sq < params.min_distance_sq {
        distance_sq = (params.min_distance_sq * distance_sq).sqrt();
    }
    delta * (charge * params.activity / distance_sq)
}

pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: RepulsionParams,
    velocity: &mut Vec2,
) {
    if node.charge <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }

            let source = positions[other_index];
            let charge = charges[other_index];
            if (point - source).length_sq() <= 1.0e-8 {
                *velocity += coincident_direction(index, other_index) * (charge * params.activity);
                continue;
            }
            *velocity += repulsion_between(point, source, charge, params);
        }
        return;
    }

    let delta = point - node.center_of_charge;
    let distance_sq = delta.length_sq().max(1.0e-4);
    let side = node.bounds.side_length();
    let can_approximate =
        !node.bounds.contains(point) && (side * side) < params.theta_sq * distance_sq;

    if can_approximate {
        *velocity += repulsion_between(point, node.center_of_charge, node.charge, params);
        return;
    }

    for child in &node.children {
        if let Some(child) = child.as_ref() {
            accumulate_repulsion_for_node(child, index, positions, charges, params, velocity);
        }
    }
}

/// Pushes one overlapping pair apart along the line between their predicted
/// centers. The larger circle moves less.
fn separate_pair(
    from: usize,
    to: usize,
    radii: &[f32],
    params: CollisionParams,
    predicted: &mut [Vec2],
    velocities: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    let delta = predicted[from] - predicted[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        coincident_direction(from, to)
    };

    let correction = direction * ((min_distance - distance) * params.strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let from_share = if from_sq + to_sq > 0.0 {
        to_sq / (from_sq + to_sq)
    } else {
        0.5
    };

    let from_push = correction * from_share;
    let to_push = correction * (1.0 - from_share);
    velocities[from] += from_push;
    predicted[from] += from_push;
    velocities[to] -= to_push;
    predicted[to] -= to_push;
}

pub(super) fn resolve_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    radii: &[f32],
    params: CollisionParams,
    predicted: &mut [Vec2],
    velocities: &mut [Vec2],
) {
    let reach = node_a.max_radius + node_b.max_radius;
    if node_a.bounds.distance_sq_to(node_b.bounds) > reach * reach {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                let from = node_a.indices[i];
                for &to in &node_a.indices[(i + 1)..] {
                    separate_pair(from, to, radii, params, predicted, velocities);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    separate_pair(from, to, radii, params, predicted, velocities);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            resolve_collision_pairs(child_a, child_a, true, radii, params, predicted, velocities);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                resolve_collision_pairs(
                    child_a, child_b, false, radii, params, predicted, velocities,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in &node_a.children {
            let Some(child) = child.as_ref() else {
                continue;
            };
            resolve_collision_pairs(child, node_b, false, radii, params, predicted, velocities);
        }
    } else {
        for child in &node_b.children {
            let Some(child) = child.as_ref() else {
                continue;
            };
            resolve_collision_pairs(node_a, child, false, radii, params, predicted, velocities);
        }
    }
}
