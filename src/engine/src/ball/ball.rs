use crate::error::{EngineError, Result};
use crate::geometry;
use crate::setpieces;
use crate::state::{MatchState, PitchHalf};
use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Wait,
}

/// One in-flight sample of a kicked ball. Kept as a raw coordinate array so
/// externally persisted state round-trips; a popped entry with fewer than two
/// coordinates is a fatal input error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Waypoint(pub Vec<f64>);

impl Waypoint {
    pub fn new(x: f64, y: f64, height: f64) -> Self {
        Waypoint(vec![x, y, height])
    }

    pub fn coords(&self) -> Result<(f64, f64)> {
        match self.0.as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            short => Err(EngineError::MalformedWaypoint(short.len())),
        }
    }

    /// Third slot of the legacy array: written as flight height, read back as
    /// the movement resolver's power argument.
    pub fn height(&self) -> f64 {
        self.0.get(2).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTouch {
    pub player_name: String,
    pub player_id: u32,
    pub team_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vector3<f64>,
    pub direction: Direction,
    pub with_player: Option<u32>,
    pub with_team: Option<u32>,
    pub last_touch: Option<LastTouch>,
    /// Pending trajectory samples, drained one per tick.
    pub over_iterations: VecDeque<Waypoint>,
}

impl Ball {
    pub fn at(position: Vector3<f64>) -> Self {
        Ball {
            position,
            direction: Direction::Wait,
            with_player: None,
            with_team: None,
            last_touch: None,
            over_iterations: VecDeque::new(),
        }
    }

    pub fn is_loose(&self) -> bool {
        self.with_player.is_none()
    }
}

/// Classifies the compass direction of travel toward the next waypoint and
/// writes it onto the ball.
pub fn derive_direction(state: &mut MatchState, next: &Vector3<f64>) {
    let dx = (next.x - state.ball.position.x).round();
    let dy = (next.y - state.ball.position.y).round();
    state.ball.direction = classify(dx, dy);
}

fn classify(dx: f64, dy: f64) -> Direction {
    let horizontal = if dx > 0.0 {
        1
    } else if dx < 0.0 {
        -1
    } else {
        0
    };
    let vertical = if dy > 0.0 {
        1
    } else if dy < 0.0 {
        -1
    } else {
        0
    };

    match (horizontal, vertical) {
        (0, -1) => Direction::North,
        (1, -1) => Direction::NorthEast,
        (1, 0) => Direction::East,
        (1, 1) => Direction::SouthEast,
        (0, 1) => Direction::South,
        (-1, 1) => Direction::SouthWest,
        (-1, 0) => Direction::West,
        (-1, -1) => Direction::NorthWest,
        _ => Direction::Wait,
    }
}

/// Scores a goal when the ball sits on or past a goal line inside the mouth.
/// The conceding side restarts with a kickoff.
pub fn check_goal_scored(state: &mut MatchState) {
    let crossed = if state.ball.position.y <= 0.0 {
        Some(PitchHalf::Top)
    } else if state.ball.position.y >= state.pitch_size.height {
        Some(PitchHalf::Bottom)
    } else {
        None
    };

    let Some(end) = crossed else {
        return;
    };
    if !geometry::within_goal_mouth(&state.pitch_size, state.ball.position.x) {
        return;
    }

    let conceding_side = state.side_defending(end);
    let scoring_side = conceding_side.opposite();
    state.team_mut(scoring_side).stats.goals += 1;

    let scoring_team_id = state.team(scoring_side).team_id;
    let scoring_team_name = state.team(scoring_side).name.clone();

    if let Some(touch) = state.ball.last_touch.clone() {
        if touch.team_id == scoring_team_id {
            if let Some(scorer) = state.player_mut(touch.player_id) {
                scorer.stats.goals += 1;
            }
            state.log(format!("goal scored by {}", touch.player_name));
            info!("{} score through {}", scoring_team_name, touch.player_name);
        } else {
            // credited to the attack, conceded off a defender's touch
            state.log(format!("own goal off {}", touch.player_name));
            info!("{} score an own goal gift", scoring_team_name);
        }
    } else {
        state.log(format!("goal for {}", scoring_team_name));
    }

    state.ball.over_iterations.clear();
    setpieces::set_kickoff(state, conceding_side);
    state.end_iteration = true;
}
