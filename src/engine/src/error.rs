use thiserror::Error;

/// Invariant violations coming from upstream callers. These abort the tick;
/// expected conditions (empty trajectory queue, off-target shots, nobody in
/// range) are ordinary control flow and never surface here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("malformed waypoint: expected at least 2 coordinates, got {0}")]
    MalformedWaypoint(usize),

    #[error("player {0} has no origin position")]
    MissingOrigin(String),

    #[error("invalid half value: {0}")]
    InvalidHalf(u8),
}

pub type Result<T> = std::result::Result<T, EngineError>;
