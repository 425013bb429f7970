pub mod ball;
pub mod movement;
pub mod trajectory;

pub use ball::*;
pub use movement::resolve_ball_movement;
pub use trajectory::generate_trajectory;
