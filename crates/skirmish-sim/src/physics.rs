//! Physics seam.
//!
//! The simulation needs only a narrow slice of a rigid-body engine: body
//! creation and teardown, transforms, and a first-hit ray cast. `PhysicsWorld`
//! is that slice. `ArenaPhysics` is the bundled kinematic implementation:
//! a generational slot arena whose transforms are written by game logic.

use glam::Vec2;

use skirmish_core::error::{PhysicsError, PhysicsResult};
use skirmish_core::types::{BodyHandle, Rect};

/// Collision shape of a body, centred on its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

/// Everything needed to create a body.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub position: Vec2,
    pub shape: BodyShape,
    /// Non-solid bodies are ignored by ray casts.
    pub solid: bool,
    /// Whether the body occludes line of sight when solid.
    pub blocks_sight: bool,
}

/// First blocking hit of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub handle: BodyHandle,
    pub point: Vec2,
    /// Fraction along the ray, in `[0, 1]`.
    pub fraction: f32,
}

/// Rigid-body world the simulation drives.
pub trait PhysicsWorld: Send {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn destroy_body(&mut self, handle: BodyHandle) -> PhysicsResult<()>;
    fn position(&self, handle: BodyHandle) -> Option<Vec2>;
    fn set_transform(&mut self, handle: BodyHandle, position: Vec2);
    fn set_solid(&mut self, handle: BodyHandle, solid: bool);
    /// True if `point` lies inside the body's shape.
    fn contains_point(&self, handle: BodyHandle, point: Vec2) -> bool;
    /// First solid, sight-blocking body hit between `from` and `to`.
    fn ray_cast(&self, from: Vec2, to: Vec2) -> Option<RayHit>;
    fn step(&mut self, dt: f32);
    fn body_count(&self) -> usize;
    /// Destroy every body.
    fn reset(&mut self);
}

#[derive(Debug, Clone)]
struct Body {
    position: Vec2,
    shape: BodyShape,
    solid: bool,
    blocks_sight: bool,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Kinematic arena. Handles are invalidated by bumping the slot generation.
#[derive(Debug, Default)]
pub struct ArenaPhysics {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    elapsed_secs: f64,
}

impl ArenaPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time stepped through this world.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_ref()
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_mut()
    }
}

fn ray_vs_circle(from: Vec2, to: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = to - from;
    let f = from - center;
    if f.length_squared() <= radius * radius {
        return Some(0.0);
    }
    let a = d.length_squared();
    if a < f32::EPSILON {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let c = f.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&t).then_some(t)
}

fn ray_vs_shape(from: Vec2, to: Vec2, body: &Body) -> Option<f32> {
    match body.shape {
        BodyShape::Circle { radius } => ray_vs_circle(from, to, body.position, radius),
        BodyShape::Box { half_extents } => {
            Rect::from_center(body.position, half_extents * 2.0).segment_entry(from, to)
        }
    }
}

impl PhysicsWorld for ArenaPhysics {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let body = Body {
            position: desc.position,
            shape: desc.shape,
            solid: desc.solid,
            blocks_sight: desc.blocks_sight,
        };
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle {
            index,
            generation: 0,
        }
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        if slot.generation != handle.generation || slot.body.is_none() {
            return Err(PhysicsError::StaleHandle(handle));
        }
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Ok(())
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.position)
    }

    fn set_transform(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.position = position;
        }
    }

    fn set_solid(&mut self, handle: BodyHandle, solid: bool) {
        if let Some(body) = self.body_mut(handle) {
            body.solid = solid;
        }
    }

    fn contains_point(&self, handle: BodyHandle, point: Vec2) -> bool {
        match self.body(handle) {
            Some(body) => match body.shape {
                BodyShape::Circle { radius } => body.position.distance(point) <= radius,
                BodyShape::Box { half_extents } => {
                    Rect::from_center(body.position, half_extents * 2.0).contains_point(point)
                }
            },
            None => false,
        }
    }

    fn ray_cast(&self, from: Vec2, to: Vec2) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(body) = &slot.body else { continue };
            if !body.solid || !body.blocks_sight {
                continue;
            }
            if let Some(fraction) = ray_vs_shape(from, to, body) {
                if best.map_or(true, |b| fraction < b.fraction) {
                    best = Some(RayHit {
                        handle: BodyHandle {
                            index: index as u32,
                            generation: slot.generation,
                        },
                        point: from + (to - from) * fraction,
                        fraction,
                    });
                }
            }
        }
        best
    }

    fn step(&mut self, dt: f32) {
        self.elapsed_secs += dt as f64;
    }

    fn body_count(&self) -> usize {
        self.live
    }

    fn reset(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.body.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.live = 0;
    }
}
