mod config;

use crate::config::Config;
use database::{CharacterPoolLoader, DemoLeagueGenerator, JsonFileStore};
use env_logger::Env;
use farm_core::utils::TimeEstimation;
use farm_core::{SeasonSimulator, SeasonStore, SeasonTickResult};
use log::{error, info};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    let (store, estimated) = TimeEstimation::estimate(|| JsonFileStore::open(config.data_dir.clone()));
    let store = Arc::new(store?);

    info!("store opened at {}: {} ms", config.data_dir.display(), estimated);

    if let Some(players) = config.demo_players {
        seed_demo_league(&*store, players, config.demo_matchdays)?;
    }

    let simulator = match config.seed {
        Some(seed) => SeasonSimulator::seeded(seed),
        None => SeasonSimulator::new(),
    };

    if config.is_one_shot {
        info!("one shot matchday started");

        let result = simulator.advance_season(&*store);
        report(&result);

        return Ok(());
    }

    info!("matchday every {} s", config.interval.as_secs());

    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let store = Arc::clone(&store);
                let simulator = simulator.clone();

                match tokio::task::spawn_blocking(move || simulator.advance_season(&*store)).await {
                    Ok(result) => report(&result),
                    Err(e) => error!("matchday task failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn seed_demo_league(store: &dyn SeasonStore, players: usize, matchdays: u32) -> color_eyre::Result<()> {
    if !store.list_leagues()?.is_empty() {
        return Ok(());
    }

    let generator = DemoLeagueGenerator::with_pool(CharacterPoolLoader::load()?);
    generator.generate(store, players, matchdays, &mut rand::rng())?;

    Ok(())
}

fn report(result: &SeasonTickResult) {
    for outcome in &result.finished {
        info!(
            "league {} closed, winner: {}",
            outcome.code,
            outcome.winner.as_deref().unwrap_or("-")
        );

        for (place, standing) in outcome.standings.iter().enumerate() {
            match standing.record {
                Some(record) => info!(
                    "  {}. {} {} pts ({}-{}-{})",
                    place + 1,
                    standing.player,
                    standing.points,
                    record.wins,
                    record.losses,
                    record.ties
                ),
                None => info!("  {}. {} {} pts", place + 1, standing.player, standing.points),
            }
        }
    }
}
