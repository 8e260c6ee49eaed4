//! Background game loop: owns the simulation, drains host commands, feeds
//! measured frame time into the fixed-step driver and publishes snapshots.

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use skirmish_core::commands::PlayerCommand;
use skirmish_core::constants::TICK_RATE;
use skirmish_core::events::SimEvent;
use skirmish_core::state::GameStateSnapshot;
use skirmish_sim::{SimConfig, SimulationEngine};

/// Receives every snapshot the loop produces.
pub trait SnapshotSink: Send + 'static {
    fn emit(&mut self, snapshot: &GameStateSnapshot);
}

/// Forwards snapshots to another thread. Sends after the receiver hung up
/// are dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub mpsc::Sender<GameStateSnapshot>);

impl SnapshotSink for ChannelSink {
    fn emit(&mut self, snapshot: &GameStateSnapshot) {
        self.0.send(snapshot.clone()).ok();
    }
}

/// Log one simulation event at a level matching its weight.
pub fn log_event(event: &SimEvent) {
    match event {
        SimEvent::PhaseChanged { phase } => info!("Phase: {phase:?}"),
        SimEvent::WaveDispatched { wave, hostiles } => {
            info!("Wave {wave} inbound with {hostiles} hostiles")
        }
        SimEvent::HostileDied { id, wave, .. } => info!("Hostile {id} down (wave {wave:?})"),
        SimEvent::PlayerDied { .. } => warn!("Agent down"),
        SimEvent::AllWavesComplete => info!("All waves cleared"),
        SimEvent::MissionComplete => info!("Mission complete"),
        other => debug!("{other:?}"),
    }
}

#[derive(Debug)]
pub enum EngineCommand {
    Player(PlayerCommand),
    Shutdown,
}

/// Shared handle for sending commands to the game loop.
pub struct GameEngine {
    command_tx: Mutex<mpsc::Sender<EngineCommand>>,
    thread: Option<JoinHandle<()>>,
}

impl GameEngine {
    pub fn send_command(&self, cmd: EngineCommand) {
        if let Ok(tx) = self.command_tx.lock() {
            tx.send(cmd).ok();
        }
    }

    pub fn send_player(&self, cmd: PlayerCommand) {
        self.send_command(EngineCommand::Player(cmd));
    }

    /// Stop the loop and wait for its thread to exit.
    pub fn shutdown(mut self) {
        self.send_command(EngineCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("Game loop thread panicked");
            }
        }
    }
}

/// Start the game loop on a background thread.
/// Returns a GameEngine handle for sending commands.
pub fn start(config: SimConfig, sink: impl SnapshotSink) -> GameEngine {
    let (tx, rx) = mpsc::channel();

    let thread = thread::spawn(move || {
        run_loop(rx, SimulationEngine::new(config), sink);
    });

    GameEngine {
        command_tx: Mutex::new(tx),
        thread: Some(thread),
    }
}

fn run_loop(rx: mpsc::Receiver<EngineCommand>, mut sim: SimulationEngine, mut sink: impl SnapshotSink) {
    let frame_duration = Duration::from_secs_f64(1.0 / TICK_RATE as f64);
    let mut last_frame = Instant::now();

    sink.emit(&sim.tick());

    loop {
        let start = Instant::now();

        // Drain all pending commands
        loop {
            match rx.try_recv() {
                Ok(EngineCommand::Player(cmd)) => sim.queue_command(cmd),
                Ok(EngineCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    info!("Game loop stopped at tick {}", sim.time().tick);
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        let now = Instant::now();
        let frame_secs = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        let snapshot = sim.advance(frame_secs);
        sink.emit(&snapshot);

        let elapsed = start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::enums::GamePhase;
    use std::sync::mpsc::RecvTimeoutError;

    #[test]
    fn loop_starts_mission_and_stops() {
        let (snap_tx, snap_rx) = mpsc::channel::<GameStateSnapshot>();
        let engine = start(SimConfig::default(), ChannelSink(snap_tx));

        let first = snap_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.phase, GamePhase::Ready);

        engine.send_player(PlayerCommand::StartMission);
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut started = false;
        while Instant::now() < deadline {
            match snap_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(snap) if snap.phase == GamePhase::Exploring && snap.player.is_some() => {
                    started = true;
                    break;
                }
                Ok(_) | Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        assert!(started);
        engine.shutdown();
    }
}
