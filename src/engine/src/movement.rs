use crate::geometry::is_between;
use crate::player::Player;
use crate::state::PitchSize;
use nalgebra::Vector3;

pub const WALK_SPEED: f64 = 2.0;
pub const SPRINT_SPEED: f64 = 4.0;

const FITNESS_COST_PER_TICK: f64 = 0.01;

/// Applies a single-tick displacement. An axis whose proposed value would
/// leave the pitch is rejected in full and keeps its previous value; there is
/// no partial clamping to the boundary.
pub fn apply_displacement(
    position: Vector3<f64>,
    delta: Vector3<f64>,
    pitch: &PitchSize,
) -> Vector3<f64> {
    let mut next = position;

    let x = position.x + delta.x;
    if is_between(x, 0.0, pitch.width) {
        next.x = x;
    }

    let y = position.y + delta.y;
    if is_between(y, 0.0, pitch.height) {
        next.y = y;
    }

    next
}

/// Absolute placement honoring the same per-axis rejection contract.
pub fn place_at(position: Vector3<f64>, target: Vector3<f64>, pitch: &PitchSize) -> Vector3<f64> {
    apply_displacement(position, target - position, pitch)
}

/// Steps a player toward a target at most `speed` units per axis, paying the
/// movement fitness cost when any ground was covered.
pub fn move_towards(player: &mut Player, target: Vector3<f64>, speed: f64, pitch: &PitchSize) {
    let delta = Vector3::new(
        (target.x - player.current_pos.x).clamp(-speed, speed),
        (target.y - player.current_pos.y).clamp(-speed, speed),
        0.0,
    );

    if delta.x == 0.0 && delta.y == 0.0 {
        return;
    }

    player.current_pos = apply_displacement(player.current_pos, delta, pitch);
    player.fitness = (player.fitness - FITNESS_COST_PER_TICK).max(0.0);
}
