pub mod actions;
pub mod tables;

pub use actions::{select_action, Action, ACTIONS, ACTION_COUNT};
pub use tables::{
    zone_table, IntentVector, WeightSet, ATTACKING_THIRD, CLOSING_DOWN, DEFENSIVE_THIRD,
    GOALKEEPER, MIDFIELD,
};

use crate::geometry;
use crate::state::{MatchState, TeamSide};
use nalgebra::Vector3;

/// Ground distance from a point to the nearest player of the given side. The
/// shared proximity probe behind every table's pressure bands.
pub fn nearest_opponent_distance(
    state: &MatchState,
    opponents: TeamSide,
    point: &Vector3<f64>,
) -> Option<f64> {
    state
        .team(opponents)
        .players
        .iter()
        .map(|p| geometry::ground_distance(&p.current_pos, point))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}
