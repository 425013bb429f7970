use super::actions::{select_action, Action, ACTION_COUNT};
use crate::state::{MatchState, TeamSide};
use nalgebra::Vector3;
use rand::Rng;

/// An 11-slot relative-weight vector over the action enumeration. Entries do
/// not need to sum to 100.
pub type IntentVector = [u32; ACTION_COUNT];

/// One situational weight table. `shot` answers a tight press, `half` a loose
/// press and `fallback` an unpressured carrier; the two radii are tuned per
/// table and must be preserved as they stand.
#[derive(Debug, Clone, Copy)]
pub struct WeightSet {
    pub name: &'static str,
    pub shot: IntentVector,
    pub half: IntentVector,
    pub fallback: IntentVector,
    pub tight: f64,
    pub loose: f64,
}

impl WeightSet {
    pub fn vector_for(&self, nearest_opponent: Option<f64>) -> &IntentVector {
        match nearest_opponent {
            Some(distance) if distance <= self.tight => &self.shot,
            Some(distance) if distance <= self.loose => &self.half,
            _ => &self.fallback,
        }
    }

    pub fn draw(&self, nearest_opponent: Option<f64>, rng: &mut impl Rng) -> Action {
        select_action(self.vector_for(nearest_opponent), rng)
    }
}

// slot order: shoot, throughBall, pass, cross, tackle, intercept, slide,
//             run, sprint, cleared, boot

pub static GOALKEEPER: WeightSet = WeightSet {
    name: "goalkeeper",
    shot: [0, 0, 0, 0, 0, 0, 0, 0, 0, 30, 70],
    half: [0, 0, 30, 0, 0, 0, 0, 0, 0, 30, 40],
    fallback: [0, 10, 60, 0, 0, 0, 0, 10, 0, 10, 10],
    tight: 4.0,
    loose: 10.0,
};

pub static DEFENSIVE_THIRD: WeightSet = WeightSet {
    name: "defensive third",
    shot: [0, 0, 10, 0, 0, 0, 0, 0, 10, 40, 40],
    half: [0, 10, 40, 10, 0, 0, 0, 10, 10, 10, 10],
    fallback: [0, 15, 50, 10, 0, 0, 0, 15, 10, 0, 0],
    tight: 6.0,
    loose: 20.0,
};

pub static MIDFIELD: WeightSet = WeightSet {
    name: "midfield",
    shot: [0, 10, 50, 10, 0, 0, 0, 10, 10, 5, 5],
    half: [5, 15, 40, 10, 0, 0, 0, 15, 15, 0, 0],
    fallback: [5, 20, 30, 10, 0, 0, 0, 20, 15, 0, 0],
    tight: 6.0,
    loose: 30.0,
};

pub static ATTACKING_THIRD: WeightSet = WeightSet {
    name: "attacking third",
    shot: [50, 10, 15, 10, 0, 0, 0, 10, 5, 0, 0],
    half: [35, 15, 20, 15, 0, 0, 0, 10, 5, 0, 0],
    fallback: [25, 20, 20, 15, 0, 0, 0, 15, 5, 0, 0],
    tight: 4.0,
    loose: 20.0,
};

/// Off-ball defender pressing the carrier; distances are to the carrier.
pub static CLOSING_DOWN: WeightSet = WeightSet {
    name: "closing down",
    shot: [0, 0, 0, 0, 50, 20, 30, 0, 0, 0, 0],
    half: [0, 0, 0, 0, 25, 35, 10, 15, 15, 0, 0],
    fallback: [0, 0, 0, 0, 0, 20, 0, 40, 40, 0, 0],
    tight: 2.0,
    loose: 15.0,
};

/// Table for a ball carrier, keyed by the carrier's depth relative to the
/// goal they are attacking.
pub fn zone_table(
    state: &MatchState,
    side: TeamSide,
    position: &Vector3<f64>,
    is_goalkeeper: bool,
) -> &'static WeightSet {
    if is_goalkeeper {
        return &GOALKEEPER;
    }

    let pitch = &state.pitch_size;
    let goal_line = pitch.goal_line(state.attacking_half(side));
    let depth = (position.y - goal_line).abs();

    if depth <= pitch.height / 3.0 {
        &ATTACKING_THIRD
    } else if depth <= pitch.height * 2.0 / 3.0 {
        &MIDFIELD
    } else {
        &DEFENSIVE_THIRD
    }
}
