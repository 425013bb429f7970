use crate::error::Result;
use crate::geometry;
use crate::setpieces;
use crate::state::{MatchState, PitchHalf, TeamSide, SIDES};
use log::debug;
use nalgebra::Vector3;
use rand::Rng;

/// How close a player must be to a flight sample to get a touch on it.
const TOUCH_RADIUS: f64 = 2.0;
/// A ball sailing above this height is over everyone's head.
const JUMP_REACH: f64 = 5.0;

/// Moves the in-flight ball one waypoint step. Out-of-play exits route to the
/// matching restart, a player on the step point may take the ball down, and
/// both outcomes mark the tick as terminal. Goal-mouth crossings pass through
/// untouched so the goal check can score them.
pub fn resolve_ball_movement(
    state: &mut MatchState,
    start: Vector3<f64>,
    target: Vector3<f64>,
    flight_height: f64,
    rng: &mut impl Rng,
) -> Result<Vector3<f64>> {
    let pitch = state.pitch_size;
    debug!(
        "ball step ({:.1}, {:.1}) -> ({:.1}, {:.1}) at height {:.1}",
        start.x, start.y, target.x, target.y, flight_height
    );

    // over a goal line: a goal, a corner or a goal kick
    if target.y < 0.0 || target.y > pitch.height {
        if geometry::within_goal_mouth(&pitch, target.x) {
            return Ok(geometry::clamp_to_pitch(target, &pitch));
        }

        let end = if target.y < 0.0 {
            PitchHalf::Top
        } else {
            PitchHalf::Bottom
        };
        state.ball.over_iterations.clear();
        goal_line_restart(state, end, target);
        state.end_iteration = true;
        return Ok(state.ball.position);
    }

    // over a side line: throw-in against the side that touched it last
    if target.x < 0.0 || target.x > pitch.width {
        state.ball.over_iterations.clear();
        setpieces::set_throw_in(state, target);
        state.end_iteration = true;
        return Ok(state.ball.position);
    }

    if flight_height <= JUMP_REACH {
        if let Some((side, player_id)) = touch_candidate(state, &target, rng) {
            state.ball.over_iterations.clear();
            let flagged = state
                .team(side)
                .player(player_id)
                .map(|p| p.offside)
                .unwrap_or(false);

            if flagged {
                let name = state
                    .team(side)
                    .player(player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                state.log(format!("{} flagged offside", name));
                let kicking_half = state.defending_half(side.opposite());
                setpieces::set_freekick(state, target, kicking_half);
            } else {
                state.give_possession(side, player_id);
                let name = state
                    .team(side)
                    .player(player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                state.log(format!("{} brings the ball down", name));
            }

            state.end_iteration = true;
            return Ok(state.ball.position);
        }
    }

    Ok(geometry::clamp_to_pitch(target, &pitch))
}

/// Corner or goal kick, keyed off which team put the ball out.
fn goal_line_restart(state: &mut MatchState, end: PitchHalf, exit: Vector3<f64>) {
    let defending_side = state.side_defending(end);
    let attacking_touch = state
        .ball
        .last_touch
        .as_ref()
        .and_then(|touch| state.side_of_team(touch.team_id))
        .map(|side| side != defending_side)
        .unwrap_or(false);

    if attacking_touch {
        setpieces::set_goal_kick(state, end);
    } else {
        setpieces::set_corner(state, end, exit);
    }
}

/// The closest player with a reachable touch on the step point. The kicker
/// never deflects their own ball; teammates of the last touch receive it
/// cleanly while opponents must win a tackling roll.
fn touch_candidate(
    state: &MatchState,
    target: &Vector3<f64>,
    rng: &mut impl Rng,
) -> Option<(TeamSide, u32)> {
    let last_touch_player = state.ball.last_touch.as_ref().map(|t| t.player_id);
    let last_touch_team = state.ball.last_touch.as_ref().map(|t| t.team_id);

    let mut best: Option<(TeamSide, u32, f64, bool)> = None;
    for side in SIDES {
        let team = state.team(side);
        for player in &team.players {
            if Some(player.id) == last_touch_player {
                continue;
            }
            let distance = geometry::ground_distance(&player.current_pos, target);
            if distance > TOUCH_RADIUS {
                continue;
            }
            let closer = best.map(|(_, _, d, _)| distance < d).unwrap_or(true);
            if closer {
                let same_team = Some(team.team_id) == last_touch_team;
                best = Some((side, player.id, distance, same_team));
            }
        }
    }

    let (side, player_id, _, same_team) = best?;
    if same_team {
        return Some((side, player_id));
    }

    let tackling = state.team(side).player(player_id)?.skill.tackling;
    if rng.random_range(0..100) < tackling as i32 {
        Some((side, player_id))
    } else {
        None
    }
}
