use crate::ball::{Ball, Direction, LastTouch};
use crate::error::{EngineError, Result};
use crate::team::{Team, TeamStatistics};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchHalf {
    Top,
    Bottom,
}

impl PitchHalf {
    pub fn opposite(&self) -> PitchHalf {
        match self {
            PitchHalf::Top => PitchHalf::Bottom,
            PitchHalf::Bottom => PitchHalf::Top,
        }
    }

    /// Unit y step moving away from this half's goal line.
    pub fn downfield(&self) -> f64 {
        match self {
            PitchHalf::Top => 1.0,
            PitchHalf::Bottom => -1.0,
        }
    }

    pub fn contains(&self, y: f64, pitch: &PitchSize) -> bool {
        match self {
            PitchHalf::Top => y <= pitch.halfway_line(),
            PitchHalf::Bottom => y > pitch.halfway_line(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PitchSize {
    pub width: f64,
    pub height: f64,
}

impl PitchSize {
    pub fn new(width: f64, height: f64) -> Self {
        PitchSize { width, height }
    }

    pub fn center(&self) -> Vector3<f64> {
        Vector3::new(self.width / 2.0, self.height / 2.0, 0.0)
    }

    pub fn halfway_line(&self) -> f64 {
        self.height / 2.0
    }

    pub fn goal_line(&self, end: PitchHalf) -> f64 {
        match end {
            PitchHalf::Top => 0.0,
            PitchHalf::Bottom => self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    KickOff,
    Second,
}

impl TeamSide {
    pub fn opposite(&self) -> TeamSide {
        match self {
            TeamSide::KickOff => TeamSide::Second,
            TeamSide::Second => TeamSide::KickOff,
        }
    }
}

pub const SIDES: [TeamSide; 2] = [TeamSide::KickOff, TeamSide::Second];

/// The single mutable aggregate threaded through every tick. The engine never
/// allocates a fresh state, it mutates the passed instance and returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub half: u8,
    pub pitch_size: PitchSize,
    pub ball: Ball,
    pub kickoff_team: Team,
    pub second_team: Team,
    pub iteration_log: Vec<String>,
    /// A terminal event already occurred this tick; skip further live play.
    pub end_iteration: bool,
}

impl MatchState {
    pub fn new(pitch_size: PitchSize, kickoff_team: Team, second_team: Team) -> Self {
        MatchState {
            half: 1,
            pitch_size,
            ball: Ball::at(pitch_size.center()),
            kickoff_team,
            second_team,
            iteration_log: Vec::new(),
            end_iteration: false,
        }
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::KickOff => &self.kickoff_team,
            TeamSide::Second => &self.second_team,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        match side {
            TeamSide::KickOff => &mut self.kickoff_team,
            TeamSide::Second => &mut self.second_team,
        }
    }

    pub fn side_of_team(&self, team_id: u32) -> Option<TeamSide> {
        SIDES.into_iter().find(|side| self.team(*side).team_id == team_id)
    }

    pub fn player(&self, id: u32) -> Option<&crate::player::Player> {
        self.kickoff_team
            .players
            .iter()
            .chain(self.second_team.players.iter())
            .find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut crate::player::Player> {
        self.kickoff_team
            .players
            .iter_mut()
            .chain(self.second_team.players.iter_mut())
            .find(|p| p.id == id)
    }

    /// Pitch half a side defends in the current half of the match. The
    /// kickoff team starts in the top half and the sides swap at half-time.
    pub fn defending_half(&self, side: TeamSide) -> PitchHalf {
        let kickoff_defends = if self.half % 2 == 1 {
            PitchHalf::Top
        } else {
            PitchHalf::Bottom
        };
        match side {
            TeamSide::KickOff => kickoff_defends,
            TeamSide::Second => kickoff_defends.opposite(),
        }
    }

    pub fn attacking_half(&self, side: TeamSide) -> PitchHalf {
        self.defending_half(side).opposite()
    }

    pub fn side_defending(&self, end: PitchHalf) -> TeamSide {
        if self.defending_half(TeamSide::KickOff) == end {
            TeamSide::KickOff
        } else {
            TeamSide::Second
        }
    }

    /// Team statistics bucket selected by the legacy half-parity rule. A half
    /// value of 0 is an upstream invariant violation.
    pub fn shot_bucket_mut(&mut self, half: u8) -> Result<&mut TeamStatistics> {
        match half {
            0 => Err(EngineError::InvalidHalf(0)),
            h if h % 2 == 1 => Ok(&mut self.kickoff_team.stats),
            _ => Ok(&mut self.second_team.stats),
        }
    }

    pub fn log(&mut self, entry: impl Into<String>) {
        self.iteration_log.push(entry.into());
    }

    /// Hands the ball to a player, clearing every other possession flag and
    /// recording the touch.
    pub fn give_possession(&mut self, side: TeamSide, player_id: u32) {
        self.release_possession();

        let team_id = self.team(side).team_id;
        let info = self.team_mut(side).player_mut(player_id).map(|player| {
            player.has_ball = true;
            (player.name.clone(), player.current_pos)
        });

        let Some((name, position)) = info else {
            return;
        };

        self.ball.with_player = Some(player_id);
        self.ball.with_team = Some(team_id);
        self.ball.last_touch = Some(LastTouch {
            player_name: name,
            player_id,
            team_id,
        });
        self.ball.position = Vector3::new(position.x, position.y, 0.0);
        self.ball.direction = Direction::Wait;
    }

    pub fn release_possession(&mut self) {
        for team in [&mut self.kickoff_team, &mut self.second_team] {
            for player in &mut team.players {
                player.has_ball = false;
            }
        }
        self.ball.with_player = None;
        self.ball.with_team = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Player, Skill};

    fn state() -> MatchState {
        let home = Team::new(
            1,
            "home".into(),
            vec![Player::new(1, "home keeper".into(), Vector3::new(340.0, 20.0, 0.0), Skill::uniform(50))],
        );
        let away = Team::new(
            2,
            "away".into(),
            vec![Player::new(12, "away keeper".into(), Vector3::new(340.0, 1030.0, 0.0), Skill::uniform(50))],
        );
        MatchState::new(PitchSize::new(680.0, 1050.0), home, away)
    }

    #[test]
    fn test_shot_bucket_parity() {
        let mut state = state();
        assert_eq!(state.shot_bucket_mut(0), Err(EngineError::InvalidHalf(0)));

        state.shot_bucket_mut(1).unwrap().shots.total += 1;
        assert_eq!(state.kickoff_team.stats.shots.total, 1);

        state.shot_bucket_mut(2).unwrap().shots.total += 1;
        assert_eq!(state.second_team.stats.shots.total, 1);
    }

    #[test]
    fn test_defending_half_swaps_with_parity() {
        let mut state = state();
        assert_eq!(state.defending_half(TeamSide::KickOff), PitchHalf::Top);
        assert_eq!(state.defending_half(TeamSide::Second), PitchHalf::Bottom);

        state.half = 2;
        assert_eq!(state.defending_half(TeamSide::KickOff), PitchHalf::Bottom);
        assert_eq!(state.side_defending(PitchHalf::Top), TeamSide::Second);
    }

    #[test]
    fn test_possession_transitions() {
        let mut state = state();
        assert!(state.ball.with_player.is_none());

        state.give_possession(TeamSide::KickOff, 1);
        assert_eq!(state.ball.with_player, Some(1));
        assert_eq!(state.ball.with_team, Some(1));
        assert!(state.kickoff_team.players[0].has_ball);
        assert_eq!(state.ball.last_touch.as_ref().unwrap().player_id, 1);

        state.release_possession();
        assert!(state.ball.with_player.is_none());
        assert!(state.ball.with_team.is_none());
        assert!(!state.kickoff_team.players[0].has_ball);
        // the touch trail survives a release
        assert_eq!(state.ball.last_touch.as_ref().unwrap().player_id, 1);
    }
}
