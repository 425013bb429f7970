use crate::geometry;
use crate::player::{Player, ShotCounts};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamIntent {
    Attack,
    Defend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub goals: u32,
    pub shots: ShotCounts,
    pub fouls: u32,
    pub corners: u32,
    pub free_kicks: u32,
    pub penalties: u32,
}

/// Roster convention: index 0 is always the goalkeeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: u32,
    pub name: String,
    pub intent: TeamIntent,
    pub players: Vec<Player>,
    pub stats: TeamStatistics,
}

impl Team {
    pub fn new(team_id: u32, name: String, players: Vec<Player>) -> Self {
        Team {
            team_id,
            name,
            intent: TeamIntent::Defend,
            players,
            stats: TeamStatistics::default(),
        }
    }

    pub fn goalkeeper(&self) -> Option<&Player> {
        self.players.first()
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn nearest_to(&self, point: &Vector3<f64>) -> Option<&Player> {
        self.players.iter().min_by(|a, b| {
            let da = geometry::ground_distance(&a.current_pos, point);
            let db = geometry::ground_distance(&b.current_pos, point);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Skill;

    #[test]
    fn test_nearest_to() {
        let team = Team::new(
            1,
            "testers".into(),
            vec![
                Player::new(1, "far".into(), Vector3::new(0.0, 0.0, 0.0), Skill::uniform(50)),
                Player::new(2, "near".into(), Vector3::new(90.0, 90.0, 0.0), Skill::uniform(50)),
            ],
        );

        let nearest = team.nearest_to(&Vector3::new(100.0, 100.0, 0.0)).unwrap();
        assert_eq!(nearest.id, 2);
    }
}
