use eframe::egui::Vec2;

use crate::model::Node;

#[derive(Clone, Copy, Debug)]
pub(super) struct StepParams {
    pub(super) time_step: f32,
    pub(super) damping: f32,
    pub(super) max_speed: f32,
    pub(super) rest_speed: f32,
}

/// Advances one body by a single semi-implicit Euler step. Pure, so equal
/// inputs always give equal outputs.
///
/// A force no larger than `margin`, the error bound of the approximation
/// that produced it, is treated as zero.
pub(super) fn step_body(
    position: Vec2,
    velocity: Vec2,
    force: Vec2,
    margin: f32,
    mass: f32,
    params: StepParams,
) -> (Vec2, Vec2) {
    let mass = if mass > 0.0 { mass } else { 1.0 };
    let force = if force.is_finite() && force.length() > margin {
        force
    } else {
        Vec2::ZERO
    };

    let impulse = force / mass * params.time_step;
    let mut velocity = (velocity + impulse) * params.damping;

    let speed_sq = velocity.length_sq();
    if speed_sq > params.max_speed * params.max_speed {
        velocity *= params.max_speed / speed_sq.sqrt();
    }

    let rest_sq = params.rest_speed * params.rest_speed;
    if velocity.length_sq() < rest_sq && impulse.length_sq() < rest_sq {
        velocity = Vec2::ZERO;
    }

    (position + velocity * params.time_step, velocity)
}

/// Applies each node's accumulated force. `margins` holds per-node force
/// error bounds; missing entries count as exact. Returns whether anything
/// moved.
pub(super) fn integrate(nodes: &mut [Node], margins: &[f32], params: StepParams) -> bool {
    let mut any_motion = false;
    for (index, node) in nodes.iter_mut().enumerate() {
        let margin = margins.get(index).copied().unwrap_or(0.0);
        let (position, velocity) =
            step_body(node.position, node.velocity, node.force, margin, node.mass, params);
        node.position = position;
        node.velocity = velocity;
        any_motion |= velocity != Vec2::ZERO;
    }
    any_motion
}
