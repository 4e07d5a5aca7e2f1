//! Local prediction.
//!
//! Moves the local player and creates bullets ahead of the authority. Each
//! held axis contributes `move_speed * dt` on its own, so diagonal movement
//! is `sqrt(2)` times faster than straight movement. The authority expects
//! exactly that, so do not normalize.

use std::time::{Duration, Instant};

use arena_shared::{config::Tuning, math::Vec2, net::BulletState};
use tracing::trace;

use crate::{
    input::{InputSampler, Intent},
    state::GameState,
};

/// Monotonic fire-rate limiter with no backlog.
///
/// A shot is allowed only when strictly more than one interval has passed
/// since the previous shot. Holding fire through a stall yields one shot, not
/// a burst.
#[derive(Debug, Clone)]
pub struct FireLimiter {
    interval: Duration,
    last_fired: Instant,
}

impl FireLimiter {
    /// `epoch` counts as the previous shot, so the first one waits a full
    /// interval.
    pub fn new(interval: Duration, epoch: Instant) -> Self {
        Self {
            interval,
            last_fired: epoch,
        }
    }

    /// Consumes a shot if one is available at `now`.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_fired) > self.interval {
            self.last_fired = now;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalSimulator {
    tuning: Tuning,
    limiter: FireLimiter,
}

impl LocalSimulator {
    pub fn new(tuning: Tuning, epoch: Instant) -> Self {
        Self {
            limiter: FireLimiter::new(tuning.fire_interval(), epoch),
            tuning,
        }
    }

    /// Advances the local player by `dt` seconds of held input and fires if
    /// allowed at `now`.
    pub fn step(&mut self, state: &mut GameState, input: &InputSampler, dt: f32, now: Instant) {
        let held = input.intents();
        let pos = state.player.position() + movement(held, self.tuning.move_speed, dt);
        state.player.set_position(pos);

        if held.contains(Intent::FIRE) {
            self.fire(state, input.pointer(), now);
        }
    }

    fn fire(&mut self, state: &mut GameState, target: Vec2, now: Instant) {
        // No owner to stamp until the authority has told us who we are.
        let Some(owner) = state.my_address().cloned() else {
            return;
        };
        if !self.limiter.try_fire(now) {
            return;
        }

        let origin = state.player.position();
        let vel = Vec2::from_angle(origin.angle_to(target)) * self.tuning.bullet_speed;
        trace!(x = origin.x, y = origin.y, velx = vel.x, vely = vel.y, "Bullet fired");
        state.bullets.push_unfired(BulletState {
            x: origin.x,
            y: origin.y,
            velx: vel.x,
            vely: vel.y,
            life: 1.0,
            owner: Some(owner),
        });
    }
}

/// Displacement for one step: every held axis adds `speed * dt` independently.
pub fn movement(held: Intent, speed: f32, dt: f32) -> Vec2 {
    let mut delta = Vec2::ZERO;
    for (axis, dir) in Intent::AXES {
        if held.contains(axis) {
            delta += dir * (speed * dt);
        }
    }
    delta
}
