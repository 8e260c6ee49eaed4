//! Simulation engine, the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, the physics arena, the
//! obstacle set and the projectile pool, processes player commands, runs
//! all systems at a fixed step, and produces `GameStateSnapshot`s.
//! Completely headless, enabling deterministic testing.

use std::collections::VecDeque;
use std::path::Path;

use hecs::{Entity, World};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use skirmish_ai::profiles::HostileProfile;
use skirmish_core::commands::PlayerCommand;
use skirmish_core::components::{PlayerControl, Position};
use skirmish_core::constants::*;
use skirmish_core::enums::{CutsceneKind, GamePhase};
use skirmish_core::error::ConfigError;
use skirmish_core::events::SimEvent;
use skirmish_core::state::{GameStateSnapshot, WaveView};
use skirmish_core::types::SimTime;

use crate::collision::CollisionManager;
use crate::hooks::{EventHooks, HookKind};
use crate::level::{LevelMap, LevelSource, LAYER_CAR_SPAWN_POINTS};
use crate::physics::{ArenaPhysics, PhysicsWorld};
use crate::projectile::ProjectilePool;
use crate::systems;
use crate::systems::cutscene::CutsceneDirector;
use crate::systems::snapshot::SnapshotContext;
use crate::systems::vehicles::VehicleContext;
use crate::systems::wave_scheduler::WaveScheduler;
use crate::world_setup::{self, combatant_bounds};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    /// Hostiles per wave, in dispatch order.
    pub waves: Vec<u32>,
    pub wave_interval_secs: f32,
    /// Recycle projectiles older than this. `None` lets them fly forever.
    pub projectile_lifetime_secs: Option<f32>,
    pub hostile: HostileProfile,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            waves: DEFAULT_WAVE_TABLE.to_vec(),
            wave_interval_secs: WAVE_INTERVAL_SECS,
            projectile_lifetime_secs: None,
            hostile: HostileProfile::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.waves.iter().sum::<u32>() == 0 {
            return Err(ConfigError::EmptyWaveTable);
        }
        if !self.time_scale.is_finite() || !(0.0..=4.0).contains(&self.time_scale) {
            return Err(ConfigError::InvalidValue(format!(
                "time_scale {} outside [0, 4]",
                self.time_scale
            )));
        }
        if !(self.wave_interval_secs.is_finite() && self.wave_interval_secs > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "wave_interval_secs {} must be positive",
                self.wave_interval_secs
            )));
        }
        if let Some(lifetime) = self.projectile_lifetime_secs {
            if !(lifetime.is_finite() && lifetime > 0.0) {
                return Err(ConfigError::InvalidValue(format!(
                    "projectile_lifetime_secs {lifetime} must be positive"
                )));
            }
        }
        self.hostile.validate().map_err(ConfigError::InvalidValue)
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    physics: Box<dyn PhysicsWorld>,
    level: Box<dyn LevelSource>,
    collision: CollisionManager,
    pool: ProjectilePool,
    scheduler: WaveScheduler,
    director: CutsceneDirector,
    hooks: EventHooks,
    config: SimConfig,
    time: SimTime,
    phase: GamePhase,
    paused: bool,
    time_scale: f64,
    accumulator: f64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create an engine on the built-in demo level.
    pub fn new(config: SimConfig) -> Self {
        Self::with_level(config, Box::new(LevelMap::demo()))
    }

    pub fn with_level(config: SimConfig, level: Box<dyn LevelSource>) -> Self {
        Self::with_parts(config, level, Box::new(ArenaPhysics::new()))
    }

    /// Create an engine with a caller-supplied level and physics world.
    pub fn with_parts(
        config: SimConfig,
        level: Box<dyn LevelSource>,
        physics: Box<dyn PhysicsWorld>,
    ) -> Self {
        let mut collision = CollisionManager::new();
        collision.load_level(level.as_ref());
        let scheduler = WaveScheduler::new(
            config.waves.clone(),
            config.wave_interval_secs,
            level.layer(LAYER_CAR_SPAWN_POINTS).to_vec(),
        );
        Self {
            world: World::new(),
            physics,
            level,
            collision,
            pool: ProjectilePool::new(),
            scheduler,
            director: CutsceneDirector::default(),
            hooks: EventHooks::default(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            paused: false,
            time_scale: config.time_scale,
            accumulator: 0.0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            config,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Register a one-shot callback for the next event of `kind`.
    pub fn register_hook(
        &mut self,
        kind: HookKind,
        hook: impl FnOnce(&SimEvent) + Send + 'static,
    ) {
        self.hooks.register(kind, hook);
    }

    /// Advance the simulation by exactly one step and return the snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();
        if self.is_running() {
            self.run_step();
        }
        self.snapshot()
    }

    /// Feed a variable frame delta (seconds). Runs as many fixed steps as
    /// the time-scaled accumulator allows and carries the remainder.
    pub fn advance(&mut self, frame_secs: f64) -> GameStateSnapshot {
        self.process_commands();
        if self.is_running() && frame_secs.is_finite() {
            let step = DT as f64;
            self.accumulator += frame_secs.max(0.0) * self.time_scale;
            let mut steps = 0;
            while self.accumulator >= step && steps < MAX_STEPS_PER_FRAME && self.is_running() {
                self.run_step();
                self.accumulator -= step;
                steps += 1;
            }
            if self.accumulator >= step {
                debug!(
                    "Frame overran {MAX_STEPS_PER_FRAME} steps, dropping {:.3}s",
                    self.accumulator - self.accumulator % step
                );
                self.accumulator %= step;
            }
        }
        self.snapshot()
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Time banked toward the next fixed step.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn collision(&self) -> &CollisionManager {
        &self.collision
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    pub fn waves(&self) -> WaveView {
        self.scheduler.view()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn is_running(&self) -> bool {
        self.phase != GamePhase::Ready && !self.paused
    }

    fn controls_locked(&self) -> bool {
        matches!(self.phase, GamePhase::CutsceneStart | GamePhase::CutsceneEnd)
    }

    fn map_size(&self) -> glam::Vec2 {
        self.level.size()
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        info!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.events.push(SimEvent::PhaseChanged { phase });
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Move { x, y } => {
                systems::player::set_input(&mut self.world, x, y);
            }
            PlayerCommand::AttackPressed => {
                if !self.controls_locked() {
                    systems::player::press_attack(&mut self.world);
                }
            }
            PlayerCommand::AttackReleased => {
                systems::player::release_attack(&mut self.world);
            }
            PlayerCommand::SwitchWeapon { weapon } => {
                if !self.controls_locked() {
                    systems::player::switch_weapon(&mut self.world, weapon);
                }
            }
            PlayerCommand::AdvanceDialog => {
                systems::cutscene::request_advance(&mut self.world);
            }
            PlayerCommand::StartMission => {
                if self.phase == GamePhase::Ready {
                    self.start_mission();
                }
            }
            PlayerCommand::RestartMission => {
                self.restart_mission();
            }
            PlayerCommand::Pause => {
                if self.phase != GamePhase::Ready {
                    self.paused = true;
                }
            }
            PlayerCommand::Resume => {
                self.paused = false;
            }
            PlayerCommand::SetTimeScale { scale } => {
                if scale.is_finite() {
                    self.time_scale = (scale as f64).clamp(0.0, 4.0);
                }
            }
        }
    }

    /// Build the mission world from the level and start exploring.
    fn start_mission(&mut self) {
        let zone = self.level.cutscene_zone();
        let spawn = world_setup::find_player_spawn(zone, &self.collision, &mut self.rng);
        world_setup::spawn_player(&mut self.world, self.physics.as_mut(), spawn);
        info!("Mission started, agent at {spawn}");
        self.set_phase(GamePhase::Exploring);
    }

    /// Tear everything down to the initial-load state and start again.
    fn restart_mission(&mut self) {
        self.world.clear();
        self.physics.reset();
        self.pool.reset();
        self.collision.rebuild_from_source();
        self.scheduler.reset();
        self.director.reset();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.time = SimTime::default();
        self.accumulator = 0.0;
        self.time_scale = self.config.time_scale;
        self.paused = false;
        self.despawn_buffer.clear();
        info!("Mission restarted");
        self.phase = GamePhase::Ready;
        self.start_mission();
    }

    /// Run all systems in order.
    fn run_step(&mut self) {
        let dt = DT;
        let first_event = self.events.len();

        // 1. Physics
        self.physics.step(dt);

        // 2. Mission triggers
        self.check_intro_trigger();

        // 3. Controlled agent
        let locked = self.controls_locked();
        systems::player::run(
            &mut self.world,
            self.physics.as_mut(),
            &self.collision,
            &mut self.pool,
            &mut self.events,
            locked,
            dt,
        );

        // 4. Hostile AI
        systems::hostile_ai::run(
            &mut self.world,
            self.physics.as_mut(),
            &self.collision,
            &mut self.pool,
            &mut self.rng,
            &self.config.hostile,
            &mut self.events,
            dt,
        );

        // 5. Projectiles
        systems::projectiles::run(
            &mut self.world,
            self.physics.as_mut(),
            &self.collision,
            &mut self.pool,
            &mut self.events,
            self.config.projectile_lifetime_secs,
            dt,
        );

        // 6. Vehicles and encounter stages
        let map_size = self.map_size();
        let mut vehicle_ctx = VehicleContext {
            physics: self.physics.as_mut(),
            collision: &mut self.collision,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            profile: &self.config.hostile,
            map_size,
            events: &mut self.events,
        };
        systems::vehicles::run(&mut self.world, &mut vehicle_ctx, dt);

        // 7. Scripted actor
        if let Some(kind) = systems::cutscene::run(&mut self.world, &mut self.events, map_size, dt)
        {
            self.on_dialog_complete(kind);
        }

        // 8. Wave timers
        let player_alive = systems::player::player_status(&self.world)
            .is_some_and(|(_, _, alive)| alive);
        systems::wave_scheduler::run(
            &mut self.world,
            self.physics.as_mut(),
            &mut self.scheduler,
            &mut self.rng,
            map_size.y,
            &mut self.events,
            player_alive,
            dt,
        );

        // 9. Death bookkeeping
        self.process_deaths(first_event);

        // 10. Cleanup
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer, dt);

        self.time.advance();
    }

    /// Start the intro once the agent stands fully inside the cutscene zone.
    fn check_intro_trigger(&mut self) {
        if self.phase != GamePhase::Exploring || self.director.intro_triggered() {
            return;
        }
        let zone = self.level.cutscene_zone();
        let inside = self
            .world
            .query::<(&Position, &PlayerControl)>()
            .iter()
            .any(|(_, (pos, _))| zone.contains_rect(&combatant_bounds(pos.0, PLAYER_BODY_RADIUS)));
        if inside {
            let map_size = self.map_size();
            self.director
                .trigger(&mut self.world, &mut self.rng, CutsceneKind::Intro, map_size);
            self.set_phase(GamePhase::CutsceneStart);
        }
    }

    fn on_dialog_complete(&mut self, kind: CutsceneKind) {
        match kind {
            CutsceneKind::Intro if self.phase == GamePhase::CutsceneStart => {
                self.set_phase(GamePhase::Combat);
                self.scheduler.start_waves();
            }
            CutsceneKind::Outro if self.phase == GamePhase::CutsceneEnd => {
                self.events.push(SimEvent::MissionComplete);
                self.set_phase(GamePhase::MissionComplete);
            }
            _ => {}
        }
    }

    /// Feed this step's deaths to the scheduler and react to mission-level
    /// outcomes.
    fn process_deaths(&mut self, first_event: usize) {
        let mut wave_deaths = 0;
        let mut player_died = false;
        for event in &self.events[first_event..] {
            match event {
                SimEvent::HostileDied { wave: Some(_), .. } => wave_deaths += 1,
                SimEvent::PlayerDied { .. } => player_died = true,
                _ => {}
            }
        }
        for _ in 0..wave_deaths {
            self.scheduler.on_hostile_death();
        }

        if player_died {
            self.set_phase(GamePhase::GameOver);
        }

        if self.scheduler.check_completion() {
            info!("All waves complete");
            self.events.push(SimEvent::AllWavesComplete);
            if self.phase == GamePhase::Combat {
                let map_size = self.map_size();
                self.director
                    .trigger(&mut self.world, &mut self.rng, CutsceneKind::Outro, map_size);
                self.set_phase(GamePhase::CutsceneEnd);
            }
        }
    }

    fn snapshot(&mut self) -> GameStateSnapshot {
        self.hooks.dispatch(&self.events);
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            SnapshotContext {
                time: self.time,
                phase: self.phase,
                paused: self.paused,
                pool: &self.pool,
                waves: self.scheduler.view(),
                obstacle_count: self.collision.len(),
            },
            events,
        )
    }

    // --- Test helpers ---

    #[cfg(test)]
    pub fn player_entity(&self) -> Option<Entity> {
        systems::player::find_player(&self.world)
    }

    /// Spawn a hostile outside the wave table.
    #[cfg(test)]
    pub fn spawn_test_hostile(&mut self, position: glam::Vec2) -> Entity {
        world_setup::spawn_hostile(
            &mut self.world,
            self.physics.as_mut(),
            position,
            &self.config.hostile,
            None,
        )
    }

    /// Place the agent at `position`.
    #[cfg(test)]
    pub fn teleport_player(&mut self, position: glam::Vec2) {
        use skirmish_core::components::BodyBinding;
        let Some(entity) = self.player_entity() else {
            return;
        };
        if let Ok((pos, binding)) = self.world.query_one_mut::<(&mut Position, &BodyBinding)>(entity) {
            pos.0 = position;
            self.physics.set_transform(binding.handle, position);
        }
    }

    /// Damage an entity the way a hit inside a step would.
    #[cfg(test)]
    pub fn damage(&mut self, target: Entity, amount: i32) -> systems::combat::DamageOutcome {
        let first_event = self.events.len();
        let outcome = systems::combat::apply_damage(
            &mut self.world,
            self.physics.as_mut(),
            &mut self.events,
            target,
            amount,
            glam::Vec2::X,
        );
        self.process_deaths(first_event);
        outcome
    }

    /// Skip the intro and start the waves.
    #[cfg(test)]
    pub fn begin_combat(&mut self) {
        self.set_phase(GamePhase::Combat);
        self.scheduler.start_waves();
    }
}
