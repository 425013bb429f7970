pub mod actions;
pub mod ball;
pub mod decision;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod movement;
pub mod player;
pub mod setpieces;
pub mod setup;
pub mod state;
pub mod team;

pub use ball::{
    check_goal_scored, derive_direction, generate_trajectory, resolve_ball_movement, Ball,
    Direction, LastTouch, Waypoint,
};
pub use decision::{select_action, Action, IntentVector, WeightSet, ACTIONS, ACTION_COUNT};
pub use engine::{BallDrain, MatchEngine};
pub use error::{EngineError, Result};
pub use movement::{apply_displacement, place_at};
pub use player::{Player, PlayerStatistics, Skill};
pub use setpieces::start_second_half;
pub use state::{MatchState, PitchHalf, PitchSize, TeamSide};
pub use team::{Team, TeamIntent, TeamStatistics};
