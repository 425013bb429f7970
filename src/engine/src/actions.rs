use crate::ball::{generate_trajectory, LastTouch};
use crate::error::Result;
use crate::geometry::{self, GOAL_MOUTH_HALF_WIDTH};
use crate::movement::{self, SPRINT_SPEED, WALK_SPEED};
use crate::player::Skill;
use crate::setpieces;
use crate::state::{MatchState, PitchHalf, TeamSide};
use itertools::Itertools;
use log::debug;
use nalgebra::Vector3;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::cmp::Ordering;

const TACKLE_REACH: f64 = 2.0;
const SLIDE_REACH: f64 = 4.0;
const TACKLE_SHIFT: f64 = 3.0;
const SLIDE_SHIFT: f64 = 6.0;
const PENALTY_CENTER_BIAS: f64 = 50.0;
const THROUGH_BALL_LEAD: f64 = 30.0;
const CLEARANCE_ADVANCE: f64 = 150.0;

/// Kick power comes out of the striker's strength with a live multiplier.
pub fn kick_power(strength: u8, rng: &mut impl Rng) -> f64 {
    strength as f64 * rng.random_range(1..=5) as f64
}

struct Kicker {
    position: Vector3<f64>,
    skill: Skill,
    anchor: Vector3<f64>,
    name: String,
}

fn kicker_snapshot(state: &MatchState, side: TeamSide, id: u32) -> Option<Kicker> {
    state.team(side).player(id).map(|p| Kicker {
        position: p.current_pos,
        skill: p.skill,
        anchor: p.anchor(),
        name: p.name.clone(),
    })
}

/// Releases the ball onto a generated trajectory, leaving the kicker as the
/// last touch.
fn queue_kick(
    state: &mut MatchState,
    side: TeamSide,
    kicker_id: u32,
    target: Vector3<f64>,
    power: f64,
) {
    let Some(name) = state.team(side).player(kicker_id).map(|p| p.name.clone()) else {
        return;
    };
    let team_id = state.team(side).team_id;

    state.release_possession();
    state.ball.last_touch = Some(LastTouch {
        player_name: name,
        player_id: kicker_id,
        team_id,
    });

    let from = state.ball.position;
    state.ball.over_iterations = generate_trajectory(from, target, power).into();
}

/// The single shot-stat hook: the team bucket comes from the half-parity
/// selector, the shooter's own ledger is mirrored alongside.
pub fn record_shot(state: &mut MatchState, shooter_id: u32, on_target: bool) -> Result<()> {
    let half = state.half;
    let bucket = state.shot_bucket_mut(half)?;
    bucket.shots.total += 1;
    if on_target {
        bucket.shots.on_target += 1;
    } else {
        bucket.shots.off_target += 1;
    }

    if let Some(shooter) = state.player_mut(shooter_id) {
        shooter.stats.shots.total += 1;
        if on_target {
            shooter.stats.shots.on_target += 1;
        } else {
            shooter.stats.shots.off_target += 1;
        }
    }
    Ok(())
}

/// Writes offside flags for the kicking team at the moment of release.
pub fn mark_offside(state: &mut MatchState, side: TeamSide, kicker_id: u32) {
    let attacked = state.attacking_half(side);
    let pitch = state.pitch_size;
    let line = geometry::offside_line(
        state
            .team(side.opposite())
            .players
            .iter()
            .skip(1)
            .map(|p| p.current_pos.y),
        attacked,
    );
    let ball_y = state.ball.position.y;

    for player in state.team_mut(side).players.iter_mut() {
        if player.id == kicker_id {
            player.offside = false;
            continue;
        }
        let y = player.current_pos.y;
        let (beyond_defender, beyond_ball, in_opposition_half) = match attacked {
            PitchHalf::Top => (y < line, y < ball_y, y < pitch.halfway_line()),
            PitchHalf::Bottom => (y > line, y > ball_y, y > pitch.halfway_line()),
        };
        player.offside = beyond_defender && beyond_ball && in_opposition_half;
    }
}

pub fn resolve_shot(
    state: &mut MatchState,
    side: TeamSide,
    shooter_id: u32,
    rng: &mut impl Rng,
) -> Result<()> {
    let Some(shooter) = kicker_snapshot(state, side, shooter_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;

    let power = kick_power(shooter.skill.strength, rng);
    let spread = (110 - shooter.skill.shooting) as f64;
    let x = pitch.width / 2.0 + rng.random_range(-spread..=spread);
    let on_target = (x - pitch.width / 2.0).abs() <= GOAL_MOUTH_HALF_WIDTH;

    // overshoot the goal line by the shot power, signed by the half the
    // shooter's formation slot lies in
    let origin_half = if shooter.anchor.y <= pitch.halfway_line() {
        PitchHalf::Top
    } else {
        PitchHalf::Bottom
    };
    let attacked = origin_half.opposite();
    let y = pitch.goal_line(attacked) - attacked.downfield() * power;

    record_shot(state, shooter_id, on_target)?;
    queue_kick(state, side, shooter_id, Vector3::new(x, y, 0.0), power);
    state.log(format!("{} shoots", shooter.name));
    debug!("{} shoots towards x {:.0} (on target: {})", shooter.name, x, on_target);
    Ok(())
}

pub fn resolve_pass(
    state: &mut MatchState,
    side: TeamSide,
    passer_id: u32,
    rng: &mut impl Rng,
) -> Result<()> {
    let Some(passer) = kicker_snapshot(state, side, passer_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;
    let goal_line = pitch.goal_line(state.attacking_half(side));

    // rank the most advanced options, tie-broken by proximity, pick from the
    // best three
    let candidates: Vec<(u32, Vector3<f64>)> = state
        .team(side)
        .players
        .iter()
        .filter(|p| p.id != passer_id)
        .sorted_by(|a, b| {
            let depth_a = (a.current_pos.y - goal_line).abs();
            let depth_b = (b.current_pos.y - goal_line).abs();
            let near_a = geometry::ground_distance(&a.current_pos, &passer.position);
            let near_b = geometry::ground_distance(&b.current_pos, &passer.position);
            depth_a
                .partial_cmp(&depth_b)
                .unwrap_or(Ordering::Equal)
                .then(near_a.partial_cmp(&near_b).unwrap_or(Ordering::Equal))
        })
        .take(3)
        .map(|p| (p.id, p.current_pos))
        .collect();

    let Some(&(_, target)) = candidates.as_slice().choose(rng) else {
        return Ok(());
    };

    let distance = geometry::ground_distance(&passer.position, &target);
    let power = passer.skill.strength as f64 * 2.0 + distance / 10.0;

    mark_offside(state, side, passer_id);
    if let Some(p) = state.team_mut(side).player_mut(passer_id) {
        p.stats.passes += 1;
    }
    queue_kick(state, side, passer_id, Vector3::new(target.x, target.y, 0.0), power);
    state.log(format!("{} plays a pass", passer.name));
    Ok(())
}

pub fn resolve_through_ball(
    state: &mut MatchState,
    side: TeamSide,
    passer_id: u32,
    rng: &mut impl Rng,
) -> Result<()> {
    let Some(passer) = kicker_snapshot(state, side, passer_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;
    let goal_line = pitch.goal_line(state.attacking_half(side));

    let runner = state
        .team(side)
        .players
        .iter()
        .filter(|p| p.id != passer_id && !p.offside)
        .min_by(|a, b| {
            let depth_a = (a.current_pos.y - goal_line).abs();
            let depth_b = (b.current_pos.y - goal_line).abs();
            depth_a.partial_cmp(&depth_b).unwrap_or(Ordering::Equal)
        })
        .map(|p| p.current_pos);

    let Some(runner_pos) = runner else {
        // nobody onside to slip in, keep it simple
        return resolve_pass(state, side, passer_id, rng);
    };

    let lead = (goal_line - runner_pos.y).signum() * THROUGH_BALL_LEAD;
    let target = Vector3::new(runner_pos.x, runner_pos.y + lead, 0.0);
    let power = passer.skill.strength as f64 * 3.0;

    mark_offside(state, side, passer_id);
    if let Some(p) = state.team_mut(side).player_mut(passer_id) {
        p.stats.passes += 1;
    }
    queue_kick(state, side, passer_id, target, power);
    state.log(format!("{} slides a through ball", passer.name));
    Ok(())
}

pub fn resolve_cross(
    state: &mut MatchState,
    side: TeamSide,
    crosser_id: u32,
    rng: &mut impl Rng,
) -> Result<()> {
    let Some(crosser) = kicker_snapshot(state, side, crosser_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;
    let attacked = state.attacking_half(side);

    // far post relative to the crosser's flank
    let x = if crosser.position.x < pitch.width / 2.0 {
        pitch.width / 2.0 + pitch.width / 8.0
    } else {
        pitch.width / 2.0 - pitch.width / 8.0
    };
    let y = pitch.goal_line(attacked) + attacked.downfield() * pitch.height / 12.0;
    let power = kick_power(crosser.skill.strength, rng);

    mark_offside(state, side, crosser_id);
    if let Some(p) = state.team_mut(side).player_mut(crosser_id) {
        p.stats.passes += 1;
    }
    queue_kick(state, side, crosser_id, Vector3::new(x, y, 0.0), power);
    state.log(format!("{} swings in a cross", crosser.name));
    Ok(())
}

pub fn resolve_clearance(
    state: &mut MatchState,
    side: TeamSide,
    kicker_id: u32,
    rng: &mut impl Rng,
) -> Result<()> {
    let Some(kicker) = kicker_snapshot(state, side, kicker_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;
    let goal_line = pitch.goal_line(state.attacking_half(side));

    let x = if rng.random_bool(0.5) {
        pitch.width / 6.0
    } else {
        pitch.width * 5.0 / 6.0
    };
    let upfield = (goal_line - kicker.position.y).signum() * CLEARANCE_ADVANCE;
    let power = kick_power(kicker.skill.strength, rng);

    queue_kick(
        state,
        side,
        kicker_id,
        Vector3::new(x, kicker.position.y + upfield, 0.0),
        power,
    );
    state.log(format!("{} hooks it clear", kicker.name));
    Ok(())
}

pub fn resolve_boot(state: &mut MatchState, side: TeamSide, kicker_id: u32) -> Result<()> {
    let Some(kicker) = kicker_snapshot(state, side, kicker_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;
    let goal_line = pitch.goal_line(state.attacking_half(side));

    let power = kicker.skill.strength as f64 * 5.0;
    let upfield = (goal_line - kicker.position.y).signum() * power;
    let target = Vector3::new(kicker.position.x, kicker.position.y + upfield, 0.0);

    queue_kick(state, side, kicker_id, target, power);
    state.log(format!("{} boots it long", kicker.name));
    Ok(())
}

/// The penalty kick itself, taken after `setup_penalty` has staged the box.
pub fn resolve_penalty(state: &mut MatchState, end: PitchHalf, rng: &mut impl Rng) -> Result<()> {
    let Some(taker_id) = state.ball.with_player else {
        return Ok(());
    };
    let side = state.side_defending(end).opposite();
    let Some(taker) = kicker_snapshot(state, side, taker_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;

    let power = kick_power(taker.skill.strength, rng);
    let on_target = rng.random_range(0..100) < taker.skill.penalty_taking as i32;
    let x = if on_target {
        pitch.width / 2.0 + rng.random_range(-PENALTY_CENTER_BIAS..=PENALTY_CENTER_BIAS)
    } else if rng.random_bool(0.5) {
        rng.random_range(0.0..pitch.width / 3.0)
    } else {
        rng.random_range(pitch.width * 2.0 / 3.0..pitch.width)
    };
    let y = pitch.goal_line(end) - end.downfield() * power;

    record_shot(state, taker_id, on_target)?;
    queue_kick(state, side, taker_id, Vector3::new(x, y, 0.0), power);
    state.log(format!("{} steps up for the penalty", taker.name));
    Ok(())
}

/// A challenge on the ball carrier. The winner keeps or takes the ball and
/// both players are displaced symmetrically around a shared increment whose
/// direction follows the loser's formation half.
pub fn resolve_tackle(
    state: &mut MatchState,
    tackler_side: TeamSide,
    tackler_id: u32,
    slide: bool,
    rng: &mut impl Rng,
) -> Result<()> {
    let Some(holder_id) = state.ball.with_player else {
        return Ok(());
    };
    let holder_side = tackler_side.opposite();

    let Some(tackler) = kicker_snapshot(state, tackler_side, tackler_id) else {
        return Ok(());
    };
    let Some(holder) = kicker_snapshot(state, holder_side, holder_id) else {
        return Ok(());
    };
    let pitch = state.pitch_size;
    let halfway = pitch.halfway_line();

    let reach = if slide { SLIDE_REACH } else { TACKLE_REACH };
    if geometry::ground_distance(&tackler.position, &holder.position) > reach {
        // out of range, close the gap instead
        if let Some(chaser) = state.team_mut(tackler_side).player_mut(tackler_id) {
            movement::move_towards(chaser, holder.position, SPRINT_SPEED, &pitch);
        }
        return Ok(());
    }

    if let Some(p) = state.team_mut(tackler_side).player_mut(tackler_id) {
        p.stats.tackles.total += 1;
    }

    let foul_chance = (100 - tackler.skill.tackling) as f64 / 200.0 * if slide { 2.0 } else { 1.0 };
    if rng.random_bool(foul_chance.clamp(0.0, 1.0)) {
        return resolve_foul(state, tackler_side, tackler_id, holder.position, slide, rng);
    }

    let challenge = tackler.skill.tackling as f64 + rng.random_range(0.0..50.0);
    let composure = holder.skill.agility as f64 / 2.0
        + holder.skill.strength as f64 / 2.0
        + rng.random_range(0.0..50.0);
    let increment = if slide { SLIDE_SHIFT } else { TACKLE_SHIFT };

    if challenge > composure {
        let sign = if holder.anchor.y <= halfway { 1.0 } else { -1.0 };
        if let Some(loser) = state.team_mut(holder_side).player_mut(holder_id) {
            loser.current_pos = movement::apply_displacement(
                loser.current_pos,
                Vector3::new(0.0, -increment * sign, 0.0),
                &pitch,
            );
        }
        if let Some(winner) = state.team_mut(tackler_side).player_mut(tackler_id) {
            winner.current_pos = movement::apply_displacement(
                winner.current_pos,
                Vector3::new(0.0, increment * sign, 0.0),
                &pitch,
            );
            winner.stats.tackles.won += 1;
        }
        state.give_possession(tackler_side, tackler_id);
        state.log(format!("{} wins the ball off {}", tackler.name, holder.name));
    } else {
        let sign = if tackler.anchor.y <= halfway { 1.0 } else { -1.0 };
        if let Some(loser) = state.team_mut(tackler_side).player_mut(tackler_id) {
            loser.current_pos = movement::apply_displacement(
                loser.current_pos,
                Vector3::new(0.0, -increment * sign, 0.0),
                &pitch,
            );
        }
        state.log(format!("{} rides the challenge", holder.name));
    }
    Ok(())
}

/// Foul outcome: stats, a card roll, then the restart. Inside the offender's
/// own box it is a penalty, anywhere else a free kick to the fouled side.
fn resolve_foul(
    state: &mut MatchState,
    tackler_side: TeamSide,
    tackler_id: u32,
    spot: Vector3<f64>,
    slide: bool,
    rng: &mut impl Rng,
) -> Result<()> {
    let pitch = state.pitch_size;
    state.team_mut(tackler_side).stats.fouls += 1;

    let card_chance = if slide { 0.4 } else { 0.25 };
    let booked = rng.random_bool(card_chance);
    let name = state
        .team_mut(tackler_side)
        .player_mut(tackler_id)
        .map(|p| {
            p.stats.tackles.fouls += 1;
            if booked {
                p.stats.cards.yellow += 1;
            }
            p.name.clone()
        })
        .unwrap_or_default();

    state.log(format!("foul by {}", name));
    if booked {
        state.log(format!("{} goes into the book", name));
    }

    let defended = state.defending_half(tackler_side);
    if geometry::in_penalty_box(&pitch, &spot, defended) {
        setpieces::setup_penalty(state, defended);
        resolve_penalty(state, defended, rng)?;
    } else {
        let kicking_half = state.defending_half(tackler_side.opposite());
        setpieces::set_freekick(state, spot, kicking_half);
    }
    Ok(())
}

/// Moves an interceptor onto the ball's path.
pub fn resolve_intercept(state: &mut MatchState, side: TeamSide, defender_id: u32) {
    let pitch = state.pitch_size;
    let target = state
        .ball
        .over_iterations
        .front()
        .and_then(|w| w.coords().ok())
        .map(|(x, y)| Vector3::new(x, y, 0.0))
        .unwrap_or(state.ball.position);

    if let Some(defender) = state.team_mut(side).player_mut(defender_id) {
        defender.intent_pos = Some(target);
        movement::move_towards(defender, target, SPRINT_SPEED, &pitch);
    }
}

/// A carrier running the ball forward; the ball travels on the dribbler's
/// feet.
pub fn dribble(state: &mut MatchState, side: TeamSide, holder_id: u32, sprint: bool) {
    let pitch = state.pitch_size;
    let goal_line = pitch.goal_line(state.attacking_half(side));
    let speed = if sprint { SPRINT_SPEED } else { WALK_SPEED };

    let carried_to = {
        let Some(holder) = state.team_mut(side).player_mut(holder_id) else {
            return;
        };
        let target = Vector3::new(holder.current_pos.x, goal_line, 0.0);
        holder.intent_pos = Some(target);
        movement::move_towards(holder, target, speed, &pitch);
        holder.current_pos
    };

    state.ball.position = Vector3::new(carried_to.x, carried_to.y, 0.0);
}
