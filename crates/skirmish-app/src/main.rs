//! Headless runner. Plays the demo mission with the autopilot and prints
//! the final snapshot as JSON.
//!
//! Usage: `skirmish-app [CONFIG.json] [SECONDS]`

use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use skirmish_app::autopilot::Autopilot;
use skirmish_app::game_loop::{self, log_event, ChannelSink};
use skirmish_core::enums::GamePhase;
use skirmish_core::state::GameStateSnapshot;
use skirmish_sim::level::{LevelMap, LevelSource};
use skirmish_sim::SimConfig;

const DEFAULT_BUDGET_SECS: f64 = 300.0;
const MAX_RESTARTS: u32 = 3;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = SimConfig::default();
    let mut budget_secs = DEFAULT_BUDGET_SECS;
    for arg in std::env::args().skip(1) {
        if let Ok(secs) = arg.parse::<f64>() {
            budget_secs = secs;
            continue;
        }
        match SimConfig::from_file(&arg) {
            Ok(loaded) => config = loaded,
            Err(e) => {
                error!("Failed to load config {arg}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let zone = LevelMap::demo().cutscene_zone();
    let mut pilot = Autopilot::new(zone.center(), MAX_RESTARTS);

    let (snap_tx, snap_rx) = mpsc::channel::<GameStateSnapshot>();
    let engine = game_loop::start(config, ChannelSink(snap_tx));
    info!("Simulation started, budget {budget_secs}s");

    let deadline = Instant::now() + Duration::from_secs_f64(budget_secs.max(0.0));
    let mut last: Option<GameStateSnapshot> = None;
    while Instant::now() < deadline {
        let snap = match snap_rx.recv_timeout(Duration::from_millis(250)) {
            Ok(snap) => snap,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Game loop hung up");
                break;
            }
        };
        for event in &snap.events {
            log_event(event);
        }
        for cmd in pilot.decide(&snap) {
            engine.send_player(cmd);
        }
        let done = snap.phase == GamePhase::MissionComplete;
        last = Some(snap);
        if done {
            break;
        }
    }
    engine.shutdown();

    let Some(last) = last else {
        error!("No snapshot received");
        return ExitCode::FAILURE;
    };
    info!(
        "Finished in phase {:?} at tick {} (wave {}/{})",
        last.phase, last.time.tick, last.waves.current_wave, last.waves.total_waves
    );
    match serde_json::to_string_pretty(&last) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize snapshot: {e}"),
    }
    if last.phase == GamePhase::MissionComplete {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
