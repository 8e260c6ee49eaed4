//! Wave scheduling: dispatches vehicles from the wave table on a fixed
//! interval and tracks living wave hostiles until the table is exhausted.

use hecs::World;
use log::{info, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::constants::{DEFAULT_WAVE_TABLE, WAVE_INTERVAL_SECS};
use skirmish_core::events::SimEvent;
use skirmish_core::state::WaveView;
use skirmish_core::types::Rect;

use crate::physics::PhysicsWorld;
use crate::world_setup::spawn_vehicle;

/// A wave that is due: how many hostiles, and which bay the vehicle parks in.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveOrder {
    /// 1-based wave number.
    pub wave: u32,
    pub hostiles: u32,
    pub spawn_rect: Rect,
}

#[derive(Debug, Clone)]
pub struct WaveScheduler {
    table: Vec<u32>,
    interval_secs: f32,
    /// Waves dispatched so far.
    dispatched: usize,
    active_hostiles: u32,
    /// Vehicles dispatched whose hostiles have not spawned yet.
    pending_vehicles: u32,
    running: bool,
    until_next: f32,
    completion_fired: bool,
    spawn_points: Vec<Rect>,
    /// Spawn points not used since the last refill.
    unused_points: Vec<Rect>,
}

impl Default for WaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_WAVE_TABLE.to_vec(), WAVE_INTERVAL_SECS, Vec::new())
    }
}

impl WaveScheduler {
    pub fn new(table: Vec<u32>, interval_secs: f32, spawn_points: Vec<Rect>) -> Self {
        Self {
            table,
            interval_secs,
            dispatched: 0,
            active_hostiles: 0,
            pending_vehicles: 0,
            running: false,
            until_next: 0.0,
            completion_fired: false,
            unused_points: spawn_points.clone(),
            spawn_points,
        }
    }

    /// Arm the scheduler. The first wave is dispatched on the next tick,
    /// later ones every `interval_secs`. Repeated calls are no-ops.
    pub fn start_waves(&mut self) {
        if self.running || self.dispatched > 0 {
            return;
        }
        self.running = true;
        self.until_next = 0.0;
    }

    /// Advance the wave timer. Returns the wave to dispatch, if one is due.
    /// The timer holds while the controlled agent is dead.
    pub fn tick(&mut self, dt: f32, player_alive: bool, rng: &mut ChaCha8Rng) -> Option<WaveOrder> {
        if !self.running || !player_alive {
            return None;
        }
        if self.dispatched >= self.table.len() {
            self.running = false;
            return None;
        }
        self.until_next -= dt;
        if self.until_next > 0.0 {
            return None;
        }
        self.until_next += self.interval_secs;

        let Some(spawn_rect) = self.take_spawn_point(rng) else {
            warn!("No vehicle spawn points, wave table abandoned");
            self.running = false;
            return None;
        };
        let hostiles = self.table[self.dispatched];
        self.dispatched += 1;
        self.pending_vehicles += 1;
        if self.dispatched >= self.table.len() {
            self.running = false;
        }
        Some(WaveOrder {
            wave: self.dispatched as u32,
            hostiles,
            spawn_rect,
        })
    }

    /// Random unused spawn point, refilling the pool once every point has
    /// been used.
    fn take_spawn_point(&mut self, rng: &mut ChaCha8Rng) -> Option<Rect> {
        if self.unused_points.is_empty() {
            self.unused_points = self.spawn_points.clone();
        }
        if self.unused_points.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.unused_points.len());
        Some(self.unused_points.swap_remove(index))
    }

    /// A vehicle finished unloading `count` hostiles.
    pub fn on_hostiles_spawned(&mut self, count: u32) {
        self.active_hostiles += count;
        self.pending_vehicles = self.pending_vehicles.saturating_sub(1);
    }

    /// A wave hostile died.
    pub fn on_hostile_death(&mut self) {
        self.active_hostiles = self.active_hostiles.saturating_sub(1);
    }

    /// True exactly once per mission attempt: the first time every wave has
    /// been dispatched and unloaded and no wave hostile is alive.
    pub fn check_completion(&mut self) -> bool {
        if self.completion_fired || !self.is_complete() {
            return false;
        }
        self.completion_fired = true;
        true
    }

    pub fn is_complete(&self) -> bool {
        !self.table.is_empty()
            && self.dispatched >= self.table.len()
            && self.pending_vehicles == 0
            && self.active_hostiles == 0
    }

    /// Restore the initial state for a mission restart.
    pub fn reset(&mut self) {
        self.dispatched = 0;
        self.active_hostiles = 0;
        self.pending_vehicles = 0;
        self.running = false;
        self.until_next = 0.0;
        self.completion_fired = false;
        self.unused_points = self.spawn_points.clone();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn view(&self) -> WaveView {
        WaveView {
            current_wave: self.dispatched as u32,
            total_waves: self.table.len() as u32,
            active_hostiles: self.active_hostiles,
            complete: self.completion_fired,
        }
    }
}

/// Advance the scheduler and dispatch a vehicle for any wave that is due.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    scheduler: &mut WaveScheduler,
    rng: &mut ChaCha8Rng,
    map_height: f32,
    events: &mut Vec<SimEvent>,
    player_alive: bool,
    dt: f32,
) {
    let Some(order) = scheduler.tick(dt, player_alive, rng) else {
        return;
    };
    spawn_vehicle(
        world,
        physics,
        order.spawn_rect,
        map_height,
        order.hostiles,
        order.wave,
    );
    info!(
        "Wave {} dispatched: {} hostiles to bay at {}",
        order.wave,
        order.hostiles,
        order.spawn_rect.center()
    );
    events.push(SimEvent::WaveDispatched {
        wave: order.wave,
        hostiles: order.hostiles,
    });
}
