//! Scripted dialog actor: walks up to the agent, talks, walks away.

use glam::Vec2;
use hecs::{Entity, World};
use log::{debug, info};
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::events::SimEvent;

use crate::systems::player::{face_toward, player_status};
use crate::world_setup::{entity_id, spawn_cutscene_actor};

/// Dialog lines spoken in a cutscene.
pub fn lines(kind: CutsceneKind) -> &'static [&'static str] {
    match kind {
        CutsceneKind::Intro => &INTRO_LINES,
        CutsceneKind::Outro => &OUTRO_LINES,
    }
}

/// Remembers which cutscenes have played this mission attempt.
#[derive(Debug, Clone, Default)]
pub struct CutsceneDirector {
    intro_triggered: bool,
    outro_triggered: bool,
}

impl CutsceneDirector {
    /// Spawn the actor for `kind` unless that cutscene already played.
    pub fn trigger(
        &mut self,
        world: &mut World,
        rng: &mut ChaCha8Rng,
        kind: CutsceneKind,
        map_size: Vec2,
    ) -> bool {
        let flag = match kind {
            CutsceneKind::Intro => &mut self.intro_triggered,
            CutsceneKind::Outro => &mut self.outro_triggered,
        };
        if *flag {
            return false;
        }
        *flag = true;
        spawn_cutscene_actor(world, rng, kind, map_size);
        info!("{kind:?} cutscene started");
        true
    }

    pub fn intro_triggered(&self) -> bool {
        self.intro_triggered
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Ask every talking actor to show its next line.
pub fn request_advance(world: &mut World) {
    for (_entity, actor) in world.query_mut::<&mut CutsceneActor>() {
        if actor.stage == CutsceneStage::Dialog {
            actor.advance_requested = true;
        }
    }
}

/// Advance the scripted actors. Returns the cutscene whose dialog finished
/// this tick, if any.
pub fn run(
    world: &mut World,
    events: &mut Vec<SimEvent>,
    map_size: Vec2,
    dt: f32,
) -> Option<CutsceneKind> {
    let player_pos = player_status(world).map(|(_, pos, _)| pos);
    let mut completed = None;
    let mut finished: Vec<Entity> = Vec::new();
    let mut face_player_to: Option<Vec2> = None;

    for (entity, (pos, vel, actor)) in
        world.query_mut::<(&mut Position, &mut Velocity, &mut CutsceneActor)>()
    {
        match actor.stage {
            CutsceneStage::Approaching => {
                let Some(target) = player_pos else {
                    vel.0 = Vec2::ZERO;
                    continue;
                };
                let offset = target - pos.0;
                if offset.length() <= CUTSCENE_DIALOG_DISTANCE {
                    vel.0 = Vec2::ZERO;
                    actor.stage = CutsceneStage::Dialog;
                    actor.line = 0;
                    events.push(SimEvent::DialogLine {
                        cutscene: actor.kind,
                        line: 0,
                    });
                } else {
                    vel.0 = offset.normalize_or_zero() * CUTSCENE_APPROACH_SPEED;
                }
                if let Some(octant) = Octant::from_vector(offset) {
                    actor.facing = octant;
                }
            }
            CutsceneStage::Dialog => {
                face_player_to = Some(pos.0);
                if !std::mem::take(&mut actor.advance_requested) {
                    continue;
                }
                actor.line += 1;
                if actor.line < lines(actor.kind).len() {
                    events.push(SimEvent::DialogLine {
                        cutscene: actor.kind,
                        line: actor.line,
                    });
                } else {
                    actor.stage = CutsceneStage::Departing;
                    completed = Some(actor.kind);
                    events.push(SimEvent::DialogComplete {
                        cutscene: actor.kind,
                    });
                }
            }
            CutsceneStage::Departing => {
                let heading = match actor.kind {
                    CutsceneKind::Intro => -1.0,
                    CutsceneKind::Outro => 1.0,
                };
                vel.0 = Vec2::new(heading * CUTSCENE_DEPART_SPEED, 0.0);
                if let Some(octant) = Octant::from_vector(vel.0) {
                    actor.facing = octant;
                }
                let off_map = pos.0.x < -CUTSCENE_BODY_RADIUS
                    || pos.0.x > map_size.x + CUTSCENE_BODY_RADIUS;
                if off_map {
                    vel.0 = Vec2::ZERO;
                    actor.stage = CutsceneStage::Done;
                    events.push(SimEvent::CutsceneFinished {
                        cutscene: actor.kind,
                    });
                    finished.push(entity);
                }
            }
            CutsceneStage::Done => finished.push(entity),
        }
        pos.0 += vel.0 * dt;
    }

    if let Some(actor_pos) = face_player_to {
        face_toward(world, actor_pos);
    }
    for entity in finished {
        if let Err(err) = world.despawn(entity) {
            debug!("Cutscene actor {}: {err}", entity_id(entity));
        }
    }
    completed
}
