//! Headless demo round
//!
//! Usage: `mazerunner [config.ron|config.json]`. Runs one round with a
//! scripted player at 60 ticks per second and logs what happens. Set
//! `RUST_LOG=debug` to see state changes and paths.

use mazerunner::prelude::*;

const TICK: f32 = 1.0 / 60.0;

/// Square loop around the maze, repeated
fn patrol_script() -> ScriptedController {
    let leg = 1.5;
    let square = [Vec3::X, Vec3::Z, Vec3::NEG_X, Vec3::NEG_Z];
    ScriptedController::new(
        square
            .iter()
            .cycle()
            .take(square.len() * 40)
            .map(|&direction| (leg, direction))
            .collect(),
    )
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::LifeLost { lives } => log::info!("Caught! {lives} lives left"),
        GameEvent::LifeGained { lives } => log::info!("Extra life, now {lives}"),
        GameEvent::ScoreIncremented { score } => log::info!("Score: {score}"),
        GameEvent::PowerUpActivated => log::info!("Power-up! NPCs are fleeing"),
        GameEvent::GameOver { outcome } => log::info!("Game over: {outcome:?}"),
        other => log::debug!("{other:?}"),
    }
}

fn run(config: SimConfig) -> Result<Outcome, ConfigError> {
    let mut sim = Simulation::new(config)?;
    let mut controller = patrol_script();

    // One extra tick past the limit so the final events rotate out
    let max_ticks = (sim.config().game.time_limit / TICK).ceil() as usize + 1;
    for _ in 0..max_ticks {
        sim.tick(TICK, &controller);
        controller.advance(TICK);
        sim.events().iter().for_each(log_event);
        if sim.is_over() {
            sim.tick(TICK, &controller);
            sim.events().iter().for_each(log_event);
            break;
        }
    }

    let player = sim.player();
    log::info!(
        "Finished after {:.1}s with score {} and {} lives",
        sim.elapsed(),
        player.score(),
        player.lives()
    );
    Ok(sim.outcome().unwrap_or(Outcome::TimeUp))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    match run(config) {
        Ok(outcome) => println!("{outcome:?}"),
        Err(e) => {
            eprintln!("Simulation error: {e}");
            std::process::exit(1);
        }
    }
}
