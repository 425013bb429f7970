use crate::ball::Direction;
use crate::error::Result;
use crate::geometry;
use crate::movement;
use crate::state::{MatchState, PitchHalf, TeamSide, SIDES};
use log::info;
use nalgebra::Vector3;

/// Depth of the forward line inside the attacking half at a deep free kick.
const FREEKICK_DEPTH: f64 = 100.0;
/// Roster index where the forward line starts in the default shape.
const FORWARD_LINE: usize = 9;
/// How far outside the wide box everyone but taker and keeper is pushed
/// while a penalty is taken.
const PENALTY_CLEARANCE: f64 = 10.0;

/// Dead-ball restart for a free kick. `side` is the pitch half the kicking
/// team defends; their goalkeeper always takes it, the forwards push up to
/// the fixed depth line and everyone else falls back onto their anchors.
/// A restart consumes the whole tick.
pub fn set_freekick(state: &mut MatchState, spot: Vector3<f64>, side: PitchHalf) {
    let kicking_side = state.side_defending(side);
    let pitch = state.pitch_size;
    let spot = Vector3::new(spot.x, spot.y, 0.0);

    state.ball.over_iterations.clear();
    state.ball.position = movement::place_at(state.ball.position, spot, &pitch);
    let ball_pos = state.ball.position;

    let depth_line = pitch.halfway_line() + side.downfield() * FREEKICK_DEPTH;
    let keeper_id = {
        let team = state.team_mut(kicking_side);
        team.stats.free_kicks += 1;
        for (index, player) in team.players.iter_mut().enumerate() {
            player.offside = false;
            player.has_ball = false;
            if index == 0 {
                player.current_pos = movement::place_at(player.current_pos, ball_pos, &pitch);
            } else if index >= FORWARD_LINE {
                let hold = Vector3::new(player.current_pos.x, depth_line, 0.0);
                player.current_pos = movement::place_at(player.current_pos, hold, &pitch);
                player.intent_pos = Some(hold);
            } else {
                let anchor = player.anchor();
                player.current_pos = movement::place_at(player.current_pos, anchor, &pitch);
                player.intent_pos = Some(anchor);
            }
        }
        team.players.first().map(|p| p.id)
    };

    let opposition = state.team_mut(kicking_side.opposite());
    for player in opposition.players.iter_mut() {
        player.offside = false;
        player.has_ball = false;
        let anchor = player.anchor();
        player.current_pos = movement::place_at(player.current_pos, anchor, &pitch);
        player.intent_pos = Some(anchor);
    }

    if let Some(id) = keeper_id {
        state.give_possession(kicking_side, id);
    }
    state.ball.direction = if side.downfield() > 0.0 {
        Direction::South
    } else {
        Direction::North
    };
    state.end_iteration = true;

    let name = state.team(kicking_side).name.clone();
    state.log(format!(
        "free kick to {} at ({:.0}, {:.0})",
        name, ball_pos.x, ball_pos.y
    ));
    info!("free kick to {}", name);
}

/// Penalty against the team defending `end`. The best penalty taker steps up,
/// the keeper drops onto the line and the boxes are cleared.
pub fn setup_penalty(state: &mut MatchState, end: PitchHalf) {
    let defending_side = state.side_defending(end);
    let attacking_side = defending_side.opposite();
    let pitch = state.pitch_size;

    let spot = Vector3::new(
        pitch.width / 2.0,
        pitch.goal_line(end) + end.downfield() * pitch.height / 12.0,
        0.0,
    );

    state.ball.over_iterations.clear();
    state.ball.position = movement::place_at(state.ball.position, spot, &pitch);

    let taker_id = state
        .team(attacking_side)
        .players
        .iter()
        .max_by_key(|p| p.skill.penalty_taking)
        .map(|p| p.id);

    // clear both boxes before placing taker and keeper
    let box_exit = pitch.goal_line(end) + end.downfield() * (pitch.height / 6.0 + PENALTY_CLEARANCE);
    for side in SIDES {
        let team = state.team_mut(side);
        for player in team.players.iter_mut() {
            player.offside = false;
            player.has_ball = false;
            if geometry::in_penalty_box(&pitch, &player.current_pos, end) {
                let hold = Vector3::new(player.current_pos.x, box_exit, 0.0);
                player.current_pos = movement::place_at(player.current_pos, hold, &pitch);
                player.intent_pos = Some(hold);
            }
        }
    }

    let keeper_spot = Vector3::new(pitch.width / 2.0, pitch.goal_line(end), 0.0);
    if let Some(keeper) = state.team_mut(defending_side).players.first_mut() {
        keeper.current_pos = movement::place_at(keeper.current_pos, keeper_spot, &pitch);
    }

    let Some(taker_id) = taker_id else {
        return;
    };
    let behind_spot = Vector3::new(spot.x, spot.y + end.downfield() * 2.0, 0.0);
    if let Some(taker) = state.team_mut(attacking_side).player_mut(taker_id) {
        taker.current_pos = movement::place_at(taker.current_pos, behind_spot, &pitch);
    }

    state.team_mut(attacking_side).stats.penalties += 1;
    state.give_possession(attacking_side, taker_id);
    state.ball.position = movement::place_at(state.ball.position, spot, &pitch);
    state.ball.direction = if end == PitchHalf::Top {
        Direction::North
    } else {
        Direction::South
    };
    state.end_iteration = true;

    let name = state.team(attacking_side).name.clone();
    state.log(format!("penalty to {}", name));
    info!("penalty to {}", name);
}

/// Kickoff restart: everyone back on their anchors, the restarting side's
/// most advanced player on the spot.
pub fn set_kickoff(state: &mut MatchState, side: TeamSide) {
    let pitch = state.pitch_size;
    let center = pitch.center();

    for s in SIDES {
        let team = state.team_mut(s);
        for player in team.players.iter_mut() {
            player.has_ball = false;
            player.offside = false;
            player.intent_pos = None;
            let anchor = player.anchor();
            player.current_pos = movement::place_at(player.current_pos, anchor, &pitch);
        }
    }

    state.ball.over_iterations.clear();
    state.ball.position = center;

    let taker_id = state.team(side).players.last().map(|p| p.id);
    if let Some(id) = taker_id {
        if let Some(taker) = state.team_mut(side).player_mut(id) {
            taker.current_pos = movement::place_at(taker.current_pos, center, &pitch);
        }
        state.give_possession(side, id);
    }

    state.ball.direction = if state.attacking_half(side) == PitchHalf::Top {
        Direction::North
    } else {
        Direction::South
    };
    state.end_iteration = true;

    let name = state.team(side).name.clone();
    state.log(format!("{} kick off", name));
}

/// Throw-in at the side-line exit point, to the team that did not touch the
/// ball last.
pub fn set_throw_in(state: &mut MatchState, exit: Vector3<f64>) {
    let pitch = state.pitch_size;
    let side = state
        .ball
        .last_touch
        .as_ref()
        .and_then(|touch| state.side_of_team(touch.team_id))
        .map(|side| side.opposite())
        .unwrap_or(TeamSide::KickOff);

    let line_x = if exit.x <= 0.0 { 0.0 } else { pitch.width };
    let spot = Vector3::new(line_x, exit.y.clamp(0.0, pitch.height), 0.0);

    state.ball.over_iterations.clear();
    state.ball.position = spot;

    let thrower_id = state.team(side).nearest_to(&spot).map(|p| p.id);
    if let Some(id) = thrower_id {
        if let Some(thrower) = state.team_mut(side).player_mut(id) {
            thrower.current_pos = movement::place_at(thrower.current_pos, spot, &pitch);
        }
        state.give_possession(side, id);
    }
    state.end_iteration = true;

    let name = state.team(side).name.clone();
    state.log(format!("throw in to {} at ({:.0}, {:.0})", name, spot.x, spot.y));
}

/// Corner to the team attacking `end`, from the corner nearest the exit.
pub fn set_corner(state: &mut MatchState, end: PitchHalf, exit: Vector3<f64>) {
    let pitch = state.pitch_size;
    let attacking_side = state.side_defending(end).opposite();

    let corner_x = if exit.x < pitch.width / 2.0 { 0.0 } else { pitch.width };
    let corner = Vector3::new(corner_x, pitch.goal_line(end), 0.0);

    state.ball.over_iterations.clear();
    state.ball.position = corner;

    state.team_mut(attacking_side).stats.corners += 1;
    let taker_id = state.team(attacking_side).nearest_to(&corner).map(|p| p.id);
    if let Some(id) = taker_id {
        if let Some(taker) = state.team_mut(attacking_side).player_mut(id) {
            taker.current_pos = movement::place_at(taker.current_pos, corner, &pitch);
        }
        state.give_possession(attacking_side, id);
    }
    state.end_iteration = true;

    let name = state.team(attacking_side).name.clone();
    state.log(format!("corner to {}", name));
    info!("corner to {}", name);
}

/// Goal kick for the team defending `end`, taken from the close-box center.
pub fn set_goal_kick(state: &mut MatchState, end: PitchHalf) {
    let pitch = state.pitch_size;
    let side = state.side_defending(end);
    let spot = Vector3::new(
        pitch.width / 2.0,
        pitch.goal_line(end) + end.downfield() * pitch.height / 12.0,
        0.0,
    );

    state.ball.over_iterations.clear();
    state.ball.position = spot;

    let keeper_id = state.team(side).goalkeeper().map(|p| p.id);
    if let Some(id) = keeper_id {
        if let Some(keeper) = state.team_mut(side).player_mut(id) {
            keeper.current_pos = movement::place_at(keeper.current_pos, spot, &pitch);
        }
        state.give_possession(side, id);
    }
    state.end_iteration = true;

    let name = state.team(side).name.clone();
    state.log(format!("goal kick for {}", name));
}

pub fn mirror_position(position: Vector3<f64>, pitch_height: f64) -> Vector3<f64> {
    Vector3::new(position.x, pitch_height - position.y, position.z)
}

/// Half-time transition: both teams swap ends via the y mirror, fitness
/// recovers by the break step function and the second side kicks off.
/// Mirroring is applied exactly once per transition.
pub fn start_second_half(state: &mut MatchState) -> Result<()> {
    let height = state.pitch_size.height;

    // validate before mutating so a bad roster cannot leave a half-mirrored state
    for side in SIDES {
        for player in &state.team(side).players {
            player.origin()?;
        }
    }

    for side in SIDES {
        let team = state.team_mut(side);
        for player in team.players.iter_mut() {
            let origin = player.origin()?;
            player.origin_pos = Some(mirror_position(origin, height));
            player.current_pos = mirror_position(player.current_pos, height);
            player.intent_pos = player.intent_pos.map(|intent| mirror_position(intent, height));

            if player.fitness < 51.0 {
                player.fitness = (player.fitness + 50.0).min(100.0);
            } else {
                player.fitness = 100.0;
            }

            player.has_ball = false;
            player.offside = false;
        }
    }

    state.half = 2;
    state.ball.over_iterations.clear();
    state.ball.position = state.pitch_size.center();
    state.ball.direction = Direction::Wait;
    state.release_possession();

    set_kickoff(state, TeamSide::Second);
    state.log("second half under way".to_string());
    info!("second half under way");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::geometry::in_top_penalty_box;
    use crate::setup::{build_match, MatchOptions};

    #[test]
    fn test_freekick_top_side() {
        let mut state = build_match(MatchOptions::default());
        state.end_iteration = false;

        set_freekick(&mut state, Vector3::new(340.0, 80.0, 0.0), PitchHalf::Top);

        let keeper = state.kickoff_team.players[0].id;
        assert_eq!(state.ball.with_player, Some(keeper));
        assert_eq!(state.ball.direction, Direction::South);
        assert!(state.end_iteration);
        assert_eq!(state.kickoff_team.stats.free_kicks, 1);

        // forwards hold the fixed depth line inside the attacking half
        let line = 1050.0 / 2.0 + FREEKICK_DEPTH;
        for forward in &state.kickoff_team.players[FORWARD_LINE..] {
            assert_eq!(forward.current_pos.y, line);
        }
    }

    #[test]
    fn test_freekick_bottom_side_mirrors() {
        let mut state = build_match(MatchOptions::default());
        set_freekick(&mut state, Vector3::new(100.0, 900.0, 0.0), PitchHalf::Bottom);

        let keeper = state.second_team.players[0].id;
        assert_eq!(state.ball.with_player, Some(keeper));
        assert_eq!(state.ball.direction, Direction::North);
    }

    #[test]
    fn test_penalty_clears_the_box() {
        let mut state = build_match(MatchOptions::default());
        setup_penalty(&mut state, PitchHalf::Top);

        let pitch = state.pitch_size;
        let taker = state.ball.with_player.unwrap();
        for player in state
            .kickoff_team
            .players
            .iter()
            .chain(state.second_team.players.iter())
        {
            if player.id == taker || player.id == state.kickoff_team.players[0].id {
                continue;
            }
            assert!(
                !in_top_penalty_box(&pitch, &player.current_pos),
                "{} left inside the box",
                player.name
            );
        }

        assert_eq!(state.second_team.stats.penalties, 1);
        assert_eq!(state.ball.position.y, 1050.0 / 12.0);
        assert!(state.end_iteration);
    }

    #[test]
    fn test_second_half_mirror_is_an_involution() {
        let mut state = build_match(MatchOptions::default());
        let height = state.pitch_size.height;
        let before: Vec<_> = state
            .kickoff_team
            .players
            .iter()
            .map(|p| p.origin_pos.unwrap())
            .collect();

        start_second_half(&mut state).unwrap();
        assert_eq!(state.half, 2);

        for (player, original) in state.kickoff_team.players.iter().zip(&before) {
            let mirrored = player.origin_pos.unwrap();
            assert_eq!(mirrored.y, height - original.y);
            assert_eq!(mirror_position(mirrored, height).y, original.y);
        }
    }

    #[test]
    fn test_half_time_fitness_step() {
        let mut state = build_match(MatchOptions::default());
        state.kickoff_team.players[1].fitness = 30.0;
        state.kickoff_team.players[2].fitness = 50.9;
        state.kickoff_team.players[3].fitness = 51.0;
        state.kickoff_team.players[4].fitness = 80.0;

        start_second_half(&mut state).unwrap();

        assert_eq!(state.kickoff_team.players[1].fitness, 80.0);
        assert_eq!(state.kickoff_team.players[2].fitness, 100.0);
        assert_eq!(state.kickoff_team.players[3].fitness, 100.0);
        assert_eq!(state.kickoff_team.players[4].fitness, 100.0);
    }

    #[test]
    fn test_missing_origin_is_fatal_and_leaves_state_untouched() {
        let mut state = build_match(MatchOptions::default());
        state.second_team.players[7].origin_pos = None;
        let positions_before: Vec<_> = state
            .kickoff_team
            .players
            .iter()
            .map(|p| p.current_pos)
            .collect();

        let result = start_second_half(&mut state);
        assert!(matches!(result, Err(EngineError::MissingOrigin(_))));
        assert_eq!(state.half, 1);

        let positions_after: Vec<_> = state
            .kickoff_team
            .players
            .iter()
            .map(|p| p.current_pos)
            .collect();
        assert_eq!(positions_before, positions_after);
    }

    #[test]
    fn test_throw_in_goes_against_last_touch() {
        let mut state = build_match(MatchOptions::default());
        let midfielder = state.kickoff_team.players[6].id;
        state.give_possession(TeamSide::KickOff, midfielder);
        state.release_possession();

        set_throw_in(&mut state, Vector3::new(700.0, 400.0, 0.0));

        assert_eq!(state.ball.with_team, Some(state.second_team.team_id));
        assert_eq!(state.ball.position.x, 680.0);
        assert_eq!(state.ball.position.y, 400.0);
        assert!(state.end_iteration);
    }
}
