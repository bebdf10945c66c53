//! Retro Racer entry point
//!
//! The browser build is driven through `retro_racer::web`. Natively this runs
//! a headless demo race with the autopilot at the wheel.
//!
//! Usage: `retro-racer [seed] [config.json]`

/// Give up on a demo race after five simulated minutes
#[cfg(not(target_arch = "wasm32"))]
const MAX_DEMO_TICKS: u32 = 5 * 60 * 60;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use retro_racer::RaceConfig;
    use retro_racer::consts::SIM_DT;
    use retro_racer::highscores::{HighScores, format_race_time};
    use retro_racer::sim::{Race, RaceEvent, TickInput, tick};

    env_logger::init();
    log::info!("Retro Racer (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345_u64);

    let config = match args.next() {
        Some(path) => match RaceConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Bad config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => RaceConfig::load(),
    };

    let mut race = match Race::new(config, seed) {
        Ok(race) => race,
        Err(e) => {
            log::error!("Cannot build track: {}", e);
            std::process::exit(1);
        }
    };

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut ticks = 0;
    while !race.is_finished() && ticks < MAX_DEMO_TICKS {
        tick(&mut race, &input, SIM_DT);
        ticks += 1;

        for event in &race.events {
            match event {
                RaceEvent::Countdown | RaceEvent::RaceStart | RaceEvent::Collision => {
                    log::debug!("{:?}", event)
                }
                other => log::info!("[{}] {:?}", format_race_time(race.race_time), other),
            }
        }
    }

    let Some(result) = race.result else {
        println!(
            "Demo race stopped after {} without finishing (lap {}, score {})",
            format_race_time(race.race_time),
            race.player_progress.lap,
            race.score
        );
        return;
    };

    println!(
        "Finished in {} at position {} with {} pts",
        format_race_time(result.race_time),
        result.final_rank,
        result.score
    );

    let mut scores = HighScores::load();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    scores.add_score("Autopilot", &result, timestamp);
    scores.save();

    for (i, entry) in scores.entries.iter().enumerate() {
        println!(
            "{:>2}. {:<12} {:>8} pts  {}  P{}",
            i + 1,
            entry.name,
            entry.score,
            format_race_time(entry.race_time),
            entry.final_rank
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is retro_racer::web::start, this is just to satisfy the compiler
}
