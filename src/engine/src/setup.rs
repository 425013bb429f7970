use crate::player::{Player, Skill};
use crate::setpieces;
use crate::state::{MatchState, PitchSize, TeamSide};
use crate::team::Team;
use nalgebra::Vector3;

/// 4-4-2 formation slots as pitch fractions, goalkeeper first.
const FORMATION: [(f64, f64); 11] = [
    (0.50, 0.02),
    (0.16, 0.12),
    (0.37, 0.11),
    (0.63, 0.11),
    (0.84, 0.12),
    (0.13, 0.30),
    (0.38, 0.28),
    (0.62, 0.28),
    (0.87, 0.30),
    (0.37, 0.45),
    (0.63, 0.45),
];

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub pitch_width: f64,
    pub pitch_height: f64,
    pub seed: u64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            pitch_width: 680.0,
            pitch_height: 1050.0,
            seed: 1337,
        }
    }
}

fn slot_skill(index: usize) -> Skill {
    let jitter = ((index * 3) % 7) as u8;
    match index {
        0 => Skill {
            passing: 55 + jitter,
            shooting: 25,
            tackling: 40,
            saving: 85,
            agility: 70 + jitter,
            strength: 70,
            penalty_taking: 30,
            jumping: 80,
        },
        1..=4 => Skill {
            passing: 60 + jitter,
            shooting: 30,
            tackling: 78,
            saving: 10,
            agility: 60,
            strength: 75 + jitter,
            penalty_taking: 35,
            jumping: 72,
        },
        5..=8 => Skill {
            passing: 78 + jitter,
            shooting: 60,
            tackling: 62,
            saving: 10,
            agility: 72 + jitter,
            strength: 65,
            penalty_taking: 55,
            jumping: 60,
        },
        _ => Skill {
            passing: 68,
            shooting: 82 + jitter,
            tackling: 35,
            saving: 10,
            agility: 78,
            strength: 70 + jitter,
            penalty_taking: 75,
            jumping: 68,
        },
    }
}

/// Builds a full roster anchored to the formation grid. `mirrored` flips the
/// slots onto the bottom half.
pub fn build_team(
    team_id: u32,
    name: &str,
    first_player_id: u32,
    pitch: &PitchSize,
    mirrored: bool,
) -> Team {
    let players = FORMATION
        .iter()
        .enumerate()
        .map(|(index, (fx, fy))| {
            let y = if mirrored { 1.0 - fy } else { *fy };
            let position = Vector3::new(fx * pitch.width, y * pitch.height, 0.0);
            Player::new(
                first_player_id + index as u32,
                format!("{} {}", name, index + 1),
                position,
                slot_skill(index),
            )
        })
        .collect();

    Team::new(team_id, name.to_string(), players)
}

/// A ready-to-run match: two default squads, the kickoff side in the top
/// half and on the ball.
pub fn build_match(options: MatchOptions) -> MatchState {
    let pitch = PitchSize::new(options.pitch_width, options.pitch_height);
    let kickoff_team = build_team(1, "Albion", 1, &pitch, false);
    let second_team = build_team(2, "Rovers", 12, &pitch, true);

    let mut state = MatchState::new(pitch, kickoff_team, second_team);
    setpieces::set_kickoff(&mut state, TeamSide::KickOff);
    state
}
