use crate::error::{EngineError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// The eight 0-100 attributes feeding power and behavior formulas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Skill {
    pub passing: u8,
    pub shooting: u8,
    pub tackling: u8,
    pub saving: u8,
    pub agility: u8,
    pub strength: u8,
    pub penalty_taking: u8,
    pub jumping: u8,
}

impl Skill {
    pub fn uniform(value: u8) -> Self {
        Skill {
            passing: value,
            shooting: value,
            tackling: value,
            saving: value,
            agility: value,
            strength: value,
            penalty_taking: value,
            jumping: value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotCounts {
    pub total: u32,
    pub on_target: u32,
    pub off_target: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TackleCounts {
    pub total: u32,
    pub won: u32,
    pub fouls: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CardCounts {
    pub yellow: u32,
    pub red: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub goals: u32,
    pub shots: ShotCounts,
    pub passes: u32,
    pub tackles: TackleCounts,
    pub cards: CardCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub current_pos: Vector3<f64>,
    /// Formation slot, reused as the repositioning anchor for restarts.
    pub origin_pos: Option<Vector3<f64>>,
    pub intent_pos: Option<Vector3<f64>>,
    pub skill: Skill,
    pub fitness: f64,
    pub injured: bool,
    pub has_ball: bool,
    pub offside: bool,
    pub stats: PlayerStatistics,
}

impl Player {
    pub fn new(id: u32, name: String, position: Vector3<f64>, skill: Skill) -> Self {
        Player {
            id,
            name,
            current_pos: position,
            origin_pos: Some(position),
            intent_pos: None,
            skill,
            fitness: 100.0,
            injured: false,
            has_ball: false,
            offside: false,
            stats: PlayerStatistics::default(),
        }
    }

    /// Origin slot, required for half-time mirroring.
    pub fn origin(&self) -> Result<Vector3<f64>> {
        self.origin_pos
            .ok_or_else(|| EngineError::MissingOrigin(self.name.clone()))
    }

    /// Repositioning anchor: the origin slot when present, otherwise the
    /// current position.
    pub fn anchor(&self) -> Vector3<f64> {
        self.origin_pos.unwrap_or(self.current_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_required() {
        let mut player = Player::new(7, "nine".into(), Vector3::new(1.0, 2.0, 0.0), Skill::uniform(50));
        assert!(player.origin().is_ok());

        player.origin_pos = None;
        assert_eq!(player.origin(), Err(EngineError::MissingOrigin("nine".into())));
        assert_eq!(player.anchor(), Vector3::new(1.0, 2.0, 0.0));
    }
}
