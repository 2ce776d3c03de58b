use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::{CellKind, SpatialTree};

/// Share of `|push| * (side / distance)^2` counted as the error of one
/// point-mass approximation.
const APPROXIMATION_MARGIN_SCALE: f32 = 0.1;

#[derive(Clone, Copy, Debug)]
pub(super) struct ForceParams {
    pub(super) repulsion_strength: f32,
    pub(super) spring_strength: f32,
    pub(super) rest_length: f32,
    pub(super) min_distance: f32,
    pub(super) theta: f32,
}

/// Fixed direction for a coincident pair, pointing from `other` to `index`.
/// Swapping the pair flips it, so the two pushes cancel exactly.
fn separation_direction(index: usize, other: usize) -> Vec2 {
    let (low, high) = if index < other {
        (index, other)
    } else {
        (other, index)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if index < other { direction } else { -direction }
}

/// Inverse-distance push on a body at `delta` from a point mass.
fn repulsion(delta: Vec2, mass_product: f32, params: ForceParams, fallback: Vec2) -> Vec2 {
    let distance = delta.length();
    if distance < params.min_distance {
        return fallback * (params.repulsion_strength * mass_product / params.min_distance);
    }
    (delta / distance) * (params.repulsion_strength * mass_product / distance)
}

/// Sums the repulsion felt by body `index` from every other body, opening
/// tree regions until they look small enough from the body to count as
/// one point mass. Also returns the estimated error of those point-mass
/// stand-ins, which is zero for an exact traversal.
pub(super) fn repulsion_for_node(
    tree: &SpatialTree,
    index: usize,
    positions: &[Vec2],
    masses: &[f32],
    params: ForceParams,
    stack: &mut Vec<usize>,
) -> (Vec2, f32) {
    let mut force = Vec2::ZERO;
    let mut margin = 0.0;
    let Some(root) = tree.root_index() else {
        return (force, margin);
    };

    let point = positions[index];
    let mass = masses[index];
    stack.clear();
    stack.push(root);

    while let Some(cell_index) = stack.pop() {
        let cell = tree.cell(cell_index);
        if cell.mass <= 0.0 {
            continue;
        }

        match &cell.kind {
            CellKind::Empty => {}
            CellKind::Leaf(bodies) => {
                for &other in bodies {
                    if other == index {
                        continue;
                    }
                    force += repulsion(
                        point - positions[other],
                        mass * masses[other],
                        params,
                        separation_direction(index, other),
                    );
                }
            }
            CellKind::Internal(children) => {
                let delta = point - cell.center_of_mass;
                let distance = delta.length();
                let ratio = if distance > 0.0 {
                    cell.bounds.side_length() / distance
                } else {
                    f32::INFINITY
                };

                if !cell.bounds.contains(point) && ratio < params.theta {
                    let push = repulsion(delta, mass * cell.mass, params, delta / distance);
                    force += push;
                    margin += push.length() * ratio * ratio * APPROXIMATION_MARGIN_SCALE;
                } else {
                    stack.extend(children.iter().copied());
                }
            }
        }
    }

    (force, margin)
}

/// Hooke springs along links, applied once per link with opposite signs.
pub(super) fn accumulate_springs(
    edges: &[(usize, usize)],
    positions: &[Vec2],
    params: ForceParams,
    forces: &mut [Vec2],
) {
    for &(from, to) in edges {
        if from == to || from >= positions.len() || to >= positions.len() {
            continue;
        }

        let delta = positions[to] - positions[from];
        let distance = delta.length();
        if distance < params.min_distance {
            continue;
        }

        let pull = (delta / distance) * ((distance - params.rest_length) * params.spring_strength);
        forces[from] += pull;
        forces[to] -= pull;
    }
}

/// Removes the net force and the net torque about the centroid.
///
/// Exact pairwise pushes and springs cancel in both, so whatever remains
/// comes from point-mass approximations and would otherwise drift or spin
/// the whole layout.
pub(super) fn remove_net_drift(positions: &[Vec2], masses: &[f32], forces: &mut [Vec2]) {
    let mut total_mass = 0.0;
    let mut weighted = Vec2::ZERO;
    let mut net = Vec2::ZERO;
    for ((position, mass), force) in positions.iter().zip(masses).zip(forces.iter()) {
        total_mass += mass;
        weighted += *position * *mass;
        net += *force;
    }
    if total_mass <= 0.0 || !net.is_finite() {
        return;
    }

    let centroid = weighted / total_mass;
    let shift = net / total_mass;
    let mut torque = 0.0;
    let mut inertia = 0.0;
    for ((position, mass), force) in positions.iter().zip(masses).zip(forces.iter_mut()) {
        *force -= shift * *mass;
        let arm = *position - centroid;
        torque += arm.x * force.y - arm.y * force.x;
        inertia += mass * arm.length_sq();
    }
    if inertia <= 0.0 || !torque.is_finite() {
        return;
    }

    let spin = torque / inertia;
    for ((position, mass), force) in positions.iter().zip(masses).zip(forces.iter_mut()) {
        let arm = *position - centroid;
        *force -= vec2(-arm.y, arm.x) * (spin * mass);
    }
}
