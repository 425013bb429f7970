use std::env;

use engine::setup::{build_match, MatchOptions};
use engine::{start_second_half, MatchEngine};
use env_logger::Env;
use log::info;
use rand::Rng;

const TICKS_PER_HALF: u32 = 5000;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let seed = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| rand::rng().random());
    info!("simulating match with seed {}", seed);

    let mut state = build_match(MatchOptions {
        seed,
        ..MatchOptions::default()
    });
    let mut engine = MatchEngine::new(seed);

    engine.play_half(&mut state, TICKS_PER_HALF)?;
    info!(
        "half time: {} {} - {} {}",
        state.kickoff_team.name,
        state.kickoff_team.stats.goals,
        state.second_team.stats.goals,
        state.second_team.name,
    );

    start_second_half(&mut state)?;
    engine.play_half(&mut state, TICKS_PER_HALF)?;

    info!(
        "full time: {} {} - {} {}",
        state.kickoff_team.name,
        state.kickoff_team.stats.goals,
        state.second_team.stats.goals,
        state.second_team.name,
    );
    info!(
        "shots {}-{}, corners {}-{}, fouls {}-{}, log entries {}",
        state.kickoff_team.stats.shots.total,
        state.second_team.stats.shots.total,
        state.kickoff_team.stats.corners,
        state.second_team.stats.corners,
        state.kickoff_team.stats.fouls,
        state.second_team.stats.fouls,
        state.iteration_log.len(),
    );

    if env::args().any(|arg| arg == "--dump-state") {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    Ok(())
}
