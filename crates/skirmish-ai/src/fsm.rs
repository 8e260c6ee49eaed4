//! Hostile behavior finite state machine.
//!
//! Pure functions that compute state transitions, movement intent and
//! attack timing for a hostile from a snapshot of its situation.
//! No ECS dependency, operates on plain data.

use skirmish_core::enums::HostileState;

use crate::profiles::HostileProfile;

/// Input to the hostile FSM for a single entity.
#[derive(Debug, Clone, Copy)]
pub struct HostileContext {
    pub state: HostileState,
    /// Straight-line distance to the target agent.
    pub distance: f32,
    /// Sight after the point-blank override.
    pub sighted: bool,
    /// Target within adjacency range.
    pub adjacent: bool,
    pub moving: bool,
    pub has_last_known: bool,
    /// Seconds into the attack cycle, already advanced for this tick.
    pub attack_elapsed: f32,
    pub last_attack_frame: i32,
}

/// Where the hostile wants to go this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    /// Stand still.
    Hold,
    SeekTarget,
    SeekLastKnown,
    Wander,
}

/// Output from the hostile FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostileUpdate {
    pub new_state: HostileState,
    pub intent: MoveIntent,
    /// Fire one projectile at the target this tick.
    pub fire: bool,
    pub attack_elapsed: f32,
    pub last_attack_frame: i32,
    pub state_changed: bool,
}

/// Evaluate the FSM for one hostile.
pub fn evaluate(ctx: &HostileContext, profile: &HostileProfile) -> HostileUpdate {
    match ctx.state {
        HostileState::Idle => evaluate_idle(ctx, profile),
        HostileState::Walk => evaluate_walk(ctx, profile),
        HostileState::Attack => evaluate_attack(ctx, profile),
        HostileState::Death => hold(ctx, HostileState::Death),
    }
}

fn can_engage(ctx: &HostileContext, profile: &HostileProfile) -> bool {
    ctx.distance < profile.attack_range && (ctx.sighted || ctx.adjacent)
}

fn hold(ctx: &HostileContext, state: HostileState) -> HostileUpdate {
    transition(ctx, state, MoveIntent::Hold)
}

fn transition(ctx: &HostileContext, state: HostileState, intent: MoveIntent) -> HostileUpdate {
    HostileUpdate {
        new_state: state,
        intent,
        fire: false,
        attack_elapsed: ctx.attack_elapsed,
        last_attack_frame: ctx.last_attack_frame,
        state_changed: state != ctx.state,
    }
}

fn begin_attack() -> HostileUpdate {
    HostileUpdate {
        new_state: HostileState::Attack,
        intent: MoveIntent::Hold,
        fire: false,
        attack_elapsed: 0.0,
        last_attack_frame: -1,
        state_changed: true,
    }
}

fn evaluate_idle(ctx: &HostileContext, profile: &HostileProfile) -> HostileUpdate {
    if can_engage(ctx, profile) {
        return begin_attack();
    }
    if ctx.distance < profile.chase_range {
        return transition(ctx, HostileState::Walk, MoveIntent::SeekTarget);
    }
    transition(ctx, HostileState::Idle, MoveIntent::Wander)
}

fn evaluate_walk(ctx: &HostileContext, profile: &HostileProfile) -> HostileUpdate {
    if can_engage(ctx, profile) {
        return begin_attack();
    }
    if ctx.distance > profile.chase_range {
        return hold(ctx, HostileState::Idle);
    }
    if !ctx.sighted {
        // Lost track: head for where the target was last seen.
        if ctx.has_last_known {
            return transition(ctx, HostileState::Walk, MoveIntent::SeekLastKnown);
        }
        return hold(ctx, HostileState::Walk);
    }
    transition(ctx, HostileState::Walk, MoveIntent::SeekTarget)
}

fn evaluate_attack(ctx: &HostileContext, profile: &HostileProfile) -> HostileUpdate {
    if ctx.distance > profile.stop_attack_range || (!ctx.sighted && !ctx.adjacent) {
        let intent = if ctx.sighted || !ctx.has_last_known {
            MoveIntent::SeekTarget
        } else {
            MoveIntent::SeekLastKnown
        };
        return transition(ctx, HostileState::Walk, intent);
    }

    let cycle = profile.attack_cycle_secs();
    let (elapsed, last_frame) = if ctx.attack_elapsed >= cycle {
        (ctx.attack_elapsed - cycle, -1)
    } else {
        (ctx.attack_elapsed, ctx.last_attack_frame)
    };
    let frame = (elapsed / profile.attack_frame_secs) as i32;
    let fire = frame != last_frame && ctx.sighted && !ctx.moving;

    HostileUpdate {
        new_state: HostileState::Attack,
        intent: MoveIntent::Hold,
        fire,
        attack_elapsed: elapsed,
        last_attack_frame: frame,
        state_changed: false,
    }
}
