use crate::actions;
use crate::ball::{check_goal_scored, derive_direction, resolve_ball_movement, Direction};
use crate::decision::{nearest_opponent_distance, zone_table, Action, CLOSING_DOWN};
use crate::error::Result;
use crate::movement::{self, SPRINT_SPEED, WALK_SPEED};
use crate::setpieces;
use crate::state::{MatchState, TeamSide, SIDES};
use crate::team::TeamIntent;
use log::debug;
use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// What one iteration-engine call did with the waypoint queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallDrain {
    /// Queue was empty, live play may run this tick.
    Idle,
    /// A waypoint step resolved and the tick is spent.
    Consumed,
}

/// A ball can be claimed from this distance once it sits loose.
const CLAIM_RADIUS: f64 = 3.0;
/// Depth to push on past the formation slot when the team attacks.
const ATTACK_PUSH: f64 = 100.0;
/// Depth to drop off behind the slot when defending.
const DEFEND_DROP: f64 = 50.0;

/// The per-tick orchestrator. Owns the match rng so a seed reproduces an
/// entire match; every call mutates the passed state and nothing else.
pub struct MatchEngine {
    rng: ChaCha8Rng,
}

impl MatchEngine {
    pub fn new(seed: u64) -> Self {
        MatchEngine {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One simulation tick: drain the trajectory first, fall through to live
    /// play when the ball is not in flight.
    pub fn process_tick(&mut self, state: &mut MatchState) -> Result<()> {
        state.end_iteration = false;

        let drain = self.move_ball(state)?;
        if state.end_iteration || drain == BallDrain::Consumed {
            return Ok(());
        }

        self.resolve_live_play(state)
    }

    pub fn play_half(&mut self, state: &mut MatchState, ticks: u32) -> Result<()> {
        for _ in 0..ticks {
            self.process_tick(state)?;
        }
        Ok(())
    }

    /// Drains one waypoint off the active trajectory. An empty queue parks
    /// the ball; a sub-resolution that ends the iteration leaves the queue
    /// exactly as it left it, with nothing dequeued here.
    pub fn move_ball(&mut self, state: &mut MatchState) -> Result<BallDrain> {
        let Some(waypoint) = state.ball.over_iterations.front().cloned() else {
            state.ball.direction = Direction::Wait;
            return Ok(BallDrain::Idle);
        };

        let (x, y) = waypoint.coords()?;
        let height = waypoint.height();
        let target = Vector3::new(x, y, height);

        derive_direction(state, &target);

        let start = state.ball.position;
        let end = resolve_ball_movement(state, start, target, height, &mut self.rng)?;
        if state.end_iteration {
            return Ok(BallDrain::Consumed);
        }

        state.ball.over_iterations.pop_front();
        state.log(format!(
            "ball travelled with momentum to ({:.0}, {:.0})",
            end.x, end.y
        ));
        state.ball.position = Vector3::new(end.x, end.y, height);
        check_goal_scored(state);

        Ok(BallDrain::Consumed)
    }

    fn resolve_live_play(&mut self, state: &mut MatchState) -> Result<()> {
        let mut engaged: Vec<u32> = Vec::new();

        let holder = state
            .ball
            .with_player
            .zip(state.ball.with_team.and_then(|id| state.side_of_team(id)));

        if let Some((holder_id, holder_side)) = holder {
            Self::set_intents(state, holder_side);
            engaged.push(holder_id);

            // the defense reacts first, then the carrier if still in control
            if let Some(defender_id) =
                self.resolve_closing_down(state, holder_side.opposite(), holder_id)?
            {
                engaged.push(defender_id);
            }
            if state.end_iteration {
                return Ok(());
            }
            if state.ball.with_player == Some(holder_id) {
                self.resolve_holder_action(state, holder_side, holder_id)?;
            }
        } else {
            self.resolve_loose_ball(state, &mut engaged)?;
            if state.end_iteration {
                return Ok(());
            }
        }

        self.advance_off_ball_players(state, &engaged);
        Ok(())
    }

    fn set_intents(state: &mut MatchState, attacking: TeamSide) {
        state.team_mut(attacking).intent = TeamIntent::Attack;
        state.team_mut(attacking.opposite()).intent = TeamIntent::Defend;
    }

    fn resolve_holder_action(
        &mut self,
        state: &mut MatchState,
        side: TeamSide,
        holder_id: u32,
    ) -> Result<()> {
        let Some((position, is_goalkeeper, name)) = state.team(side).player(holder_id).map(|p| {
            let is_goalkeeper = state.team(side).goalkeeper().map(|gk| gk.id) == Some(p.id);
            (p.current_pos, is_goalkeeper, p.name.clone())
        }) else {
            return Ok(());
        };

        let table = zone_table(state, side, &position, is_goalkeeper);
        let pressure = nearest_opponent_distance(state, side.opposite(), &position);
        let action = table.draw(pressure, &mut self.rng);
        debug!("{} ({}) chooses {:?}", name, table.name, action);

        match action {
            Action::Shoot => actions::resolve_shot(state, side, holder_id, &mut self.rng)?,
            Action::ThroughBall => {
                actions::resolve_through_ball(state, side, holder_id, &mut self.rng)?
            }
            Action::Pass => actions::resolve_pass(state, side, holder_id, &mut self.rng)?,
            Action::Cross => actions::resolve_cross(state, side, holder_id, &mut self.rng)?,
            Action::Cleared => actions::resolve_clearance(state, side, holder_id, &mut self.rng)?,
            Action::Boot => actions::resolve_boot(state, side, holder_id)?,
            Action::Run => actions::dribble(state, side, holder_id, false),
            Action::Sprint => actions::dribble(state, side, holder_id, true),
            // carrier tables carry no weight on the defensive slots
            Action::Tackle | Action::Intercept | Action::Slide => {}
        }
        Ok(())
    }

    fn resolve_closing_down(
        &mut self,
        state: &mut MatchState,
        defending_side: TeamSide,
        holder_id: u32,
    ) -> Result<Option<u32>> {
        let Some(holder_pos) = state
            .team(defending_side.opposite())
            .player(holder_id)
            .map(|p| p.current_pos)
        else {
            return Ok(None);
        };

        let Some((defender_id, distance)) = state
            .team(defending_side)
            .nearest_to(&holder_pos)
            .map(|p| {
                (
                    p.id,
                    crate::geometry::ground_distance(&p.current_pos, &holder_pos),
                )
            })
        else {
            return Ok(None);
        };

        let action = CLOSING_DOWN.draw(Some(distance), &mut self.rng);
        match action {
            Action::Tackle => {
                actions::resolve_tackle(state, defending_side, defender_id, false, &mut self.rng)?
            }
            Action::Slide => {
                actions::resolve_tackle(state, defending_side, defender_id, true, &mut self.rng)?
            }
            Action::Intercept => actions::resolve_intercept(state, defending_side, defender_id),
            Action::Run | Action::Sprint => {
                let speed = if action == Action::Sprint {
                    SPRINT_SPEED
                } else {
                    WALK_SPEED
                };
                let pitch = state.pitch_size;
                if let Some(defender) = state.team_mut(defending_side).player_mut(defender_id) {
                    movement::move_towards(defender, holder_pos, speed, &pitch);
                }
            }
            _ => {}
        }
        Ok(Some(defender_id))
    }

    /// Both sides chase a grounded loose ball; the overall nearest player
    /// claims it inside the claim radius, offside flags permitting.
    fn resolve_loose_ball(&mut self, state: &mut MatchState, engaged: &mut Vec<u32>) -> Result<()> {
        let ball_pos = state.ball.position;
        let pitch = state.pitch_size;

        let mut claim: Option<(TeamSide, u32, f64)> = None;
        for side in SIDES {
            let Some((chaser_id, distance)) = state.team(side).nearest_to(&ball_pos).map(|p| {
                (
                    p.id,
                    crate::geometry::ground_distance(&p.current_pos, &ball_pos),
                )
            }) else {
                continue;
            };
            engaged.push(chaser_id);

            if distance <= CLAIM_RADIUS {
                let closer = claim.map(|(_, _, d)| distance < d).unwrap_or(true);
                if closer {
                    claim = Some((side, chaser_id, distance));
                }
            } else if let Some(chaser) = state.team_mut(side).player_mut(chaser_id) {
                movement::move_towards(chaser, ball_pos, SPRINT_SPEED, &pitch);
            }
        }

        let Some((side, claimer_id, _)) = claim else {
            return Ok(());
        };

        let flagged = state
            .team(side)
            .player(claimer_id)
            .map(|p| p.offside)
            .unwrap_or(false);
        if flagged {
            let name = state
                .team(side)
                .player(claimer_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            state.log(format!("{} flagged offside", name));
            let kicking_half = state.defending_half(side.opposite());
            setpieces::set_freekick(state, ball_pos, kicking_half);
        } else {
            state.give_possession(side, claimer_id);
            let name = state
                .team(side)
                .player(claimer_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            state.log(format!("{} picks up the loose ball", name));
        }
        Ok(())
    }

    /// Everyone not on the ball drifts toward their formation intent, pushed
    /// up or dropped off with the team's posture.
    fn advance_off_ball_players(&mut self, state: &mut MatchState, engaged: &[u32]) {
        let pitch = state.pitch_size;
        for side in SIDES {
            let attacked = state.attacking_half(side);
            let travel = attacked.opposite().downfield();
            let push = match state.team(side).intent {
                TeamIntent::Attack => ATTACK_PUSH,
                TeamIntent::Defend => -DEFEND_DROP,
            };

            let team = state.team_mut(side);
            for (index, player) in team.players.iter_mut().enumerate() {
                if player.has_ball || engaged.contains(&player.id) {
                    continue;
                }
                let anchor = player.anchor();
                let offset = if index == 0 { 0.0 } else { travel * push };
                let target = Vector3::new(anchor.x, anchor.y + offset, 0.0);
                player.intent_pos = Some(target);
                movement::move_towards(player, target, WALK_SPEED, &pitch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::Waypoint;
    use crate::setup::{build_match, MatchOptions};
    use crate::state::PitchSize;
    use crate::team::Team;

    fn empty_state() -> MatchState {
        MatchState::new(
            PitchSize::new(680.0, 1050.0),
            Team::new(1, "home".into(), Vec::new()),
            Team::new(2, "away".into(), Vec::new()),
        )
    }

    #[test]
    fn test_empty_queue_is_idle() {
        let mut engine = MatchEngine::new(1);
        let mut state = empty_state();
        state.ball.direction = Direction::South;

        let drain = engine.move_ball(&mut state).unwrap();

        assert_eq!(drain, BallDrain::Idle);
        assert_eq!(state.ball.direction, Direction::Wait);
        assert!(state.ball.over_iterations.is_empty());
    }

    #[test]
    fn test_malformed_waypoint_is_fatal() {
        let mut engine = MatchEngine::new(1);
        let mut state = empty_state();
        state.ball.over_iterations.push_back(Waypoint(vec![42.0]));

        let result = engine.move_ball(&mut state);
        assert_eq!(
            result,
            Err(crate::error::EngineError::MalformedWaypoint(1))
        );
    }

    #[test]
    fn test_one_waypoint_per_call() {
        let mut engine = MatchEngine::new(1);
        let mut state = empty_state();
        state.ball.position = Vector3::new(300.0, 500.0, 0.0);
        for step in 1..=3 {
            state
                .ball
                .over_iterations
                .push_back(Waypoint::new(300.0, 500.0 + step as f64, 2.0));
        }

        let drain = engine.move_ball(&mut state).unwrap();
        assert_eq!(drain, BallDrain::Consumed);
        assert_eq!(state.ball.over_iterations.len(), 2);
        assert_eq!(state.ball.position, Vector3::new(300.0, 501.0, 2.0));
        assert_eq!(state.ball.direction, Direction::South);

        engine.move_ball(&mut state).unwrap();
        assert_eq!(state.ball.over_iterations.len(), 1);
    }

    #[test]
    fn test_terminal_sub_resolution_keeps_queue_ownership() {
        let mut engine = MatchEngine::new(1);
        let mut state = build_match(MatchOptions::default());

        // the last touch came from the second-team keeper, so a second-team
        // receiver takes the ball down cleanly
        let keeper = state.second_team.players[0].id;
        state.give_possession(crate::state::TeamSide::Second, keeper);
        state.release_possession();

        // next step lands on a second-team player, low enough to take
        let receiver_pos = state.second_team.players[6].current_pos;
        state.ball.position = receiver_pos + Vector3::new(0.0, -4.0, 0.0);
        state
            .ball
            .over_iterations
            .push_back(Waypoint::new(receiver_pos.x, receiver_pos.y, 1.0));
        state
            .ball
            .over_iterations
            .push_back(Waypoint::new(receiver_pos.x, receiver_pos.y + 1.0, 0.5));

        let drain = engine.move_ball(&mut state).unwrap();

        assert_eq!(drain, BallDrain::Consumed);
        assert!(state.end_iteration);
        // the sub-resolution cleared the queue and the engine left it alone
        assert!(state.ball.over_iterations.is_empty());
        assert_eq!(state.ball.with_player, Some(state.second_team.players[6].id));
    }

    #[test]
    fn test_goal_is_scored_from_drained_waypoint() {
        let mut engine = MatchEngine::new(1);
        let mut state = build_match(MatchOptions::default());
        // process_tick clears end_iteration before each move_ball; mirror that here
        state.end_iteration = false;
        state.release_possession();
        // flight sample inside the top goal mouth, over everyone's head
        state.ball.position = Vector3::new(340.0, 4.0, 0.0);
        state
            .ball
            .over_iterations
            .push_back(Waypoint::new(340.0, -2.0, 30.0));
        let striker = state.second_team.players[10].id;
        state.give_possession(crate::state::TeamSide::Second, striker);
        state.release_possession();
        state.ball.position = Vector3::new(340.0, 4.0, 0.0);

        engine.move_ball(&mut state).unwrap();

        assert_eq!(state.second_team.stats.goals, 1);
        assert!(state.end_iteration);
        assert_eq!(
            state.second_team.player(striker).unwrap().stats.goals,
            1
        );
    }

    #[test]
    fn test_same_seed_reproduces_the_match() {
        let transcript = |seed: u64| {
            let mut state = build_match(MatchOptions::default());
            let mut engine = MatchEngine::new(seed);
            engine.play_half(&mut state, 400).unwrap();
            state.iteration_log
        };

        assert_eq!(transcript(77), transcript(77));
        // a different seed diverges somewhere
        assert_ne!(transcript(77), transcript(78));
    }

    #[test]
    fn test_live_play_assigns_intents() {
        let mut engine = MatchEngine::new(5);
        let mut state = build_match(MatchOptions::default());
        // kickoff taker holds the ball after build
        engine.process_tick(&mut state).unwrap();

        assert_eq!(state.kickoff_team.intent, TeamIntent::Attack);
        assert_eq!(state.second_team.intent, TeamIntent::Defend);
    }
}
