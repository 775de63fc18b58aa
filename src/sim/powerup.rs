//! Power-up director
//!
//! At most one falling pickup and at most one active effect. All timers are
//! pause-aware: a pause shifts the stored timestamps forward instead of letting
//! them expire against the clock.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::projectile::{PlayerWeapon, ProjectileStore};
use super::state::{GameEvent, Player};
use crate::consts::*;
use crate::{elapsed_at_least, elapsed_beyond, rect_contains};
use crate::tuning::PowerUpTuning;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Laser,
    Shield,
    TripleShot,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Laser, PowerUpKind::Shield, PowerUpKind::TripleShot];
}

/// The effect currently applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub activated_at: f64,
}

/// Clock and world flags the director reads each tick
#[derive(Debug, Clone, Copy)]
pub struct PowerUpClock {
    pub now: f64,
    pub paused: bool,
    pub level: u32,
    pub boss_fight: bool,
}

/// Things a power-up effect is allowed to touch
pub struct PowerUpTargets<'a> {
    pub projectiles: &'a mut ProjectileStore,
    pub player: &'a mut Player,
}

#[derive(Debug, Clone)]
pub struct PowerUpDirector {
    /// Falling pickup position, if one is on the field
    pub pickup: Option<Vec2>,
    pub active: Option<ActivePowerUp>,
    /// When the spawn timer last restarted
    pub spawn_time: f64,
    /// Set while the simulation is paused
    pub paused_at: Option<f64>,
    pub first_level: bool,
    pub last_level: u32,
    tuning: PowerUpTuning,
}

impl PowerUpDirector {
    pub fn new(tuning: &PowerUpTuning) -> Self {
        Self {
            pickup: None,
            active: None,
            spawn_time: 0.0,
            paused_at: None,
            first_level: true,
            last_level: 1,
            tuning: tuning.clone(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.tuning.duration
    }

    pub fn score_bonus(&self) -> i64 {
        self.tuning.score_bonus
    }

    /// Seconds of effect left (frozen while paused)
    pub fn remaining(&self, now: f64) -> Option<f64> {
        let reference = self.paused_at.unwrap_or(now);
        self.active
            .map(|a| (self.tuning.duration - (reference - a.activated_at)).max(0.0))
    }

    /// Run one tick. Returns the kind collected this tick, if any.
    pub fn update(
        &mut self,
        clock: PowerUpClock,
        targets: PowerUpTargets<'_>,
        rng: &mut Pcg32,
        events: &mut Vec<GameEvent>,
    ) -> Option<PowerUpKind> {
        let now = clock.now;
        if clock.paused {
            if self.paused_at.is_none() {
                self.paused_at = Some(now);
            }
            return None;
        }
        self.resume(now);

        if !clock.boss_fight {
            if self.first_level {
                if self.pickup.is_none() {
                    self.spawn(rng, events);
                }
                self.first_level = false;
                self.last_level = clock.level;
            } else if clock.level != self.last_level {
                self.pickup = None;
                self.spawn(rng, events);
                self.spawn_time = now;
                self.last_level = clock.level;
            }

            if self.active.is_none()
                && self.pickup.is_none()
                && elapsed_at_least(now, self.spawn_time, self.tuning.spawn_interval)
            {
                self.spawn(rng, events);
                self.spawn_time = now;
            }
        }

        let mut collected = None;
        if let Some(pos) = self.pickup.as_mut() {
            pos.y += self.tuning.fall_speed;
            let pos = *pos;
            if pos.y > SCREEN_HEIGHT {
                self.pickup = None;
            } else if rect_contains(targets.player.pos, targets.player.size, pos) {
                self.pickup = None;
                let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
                self.activate(kind, now, targets.projectiles, targets.player);
                events.push(GameEvent::PowerUpCollected { kind });
                collected = Some(kind);
            }
        }

        if collected.is_none() {
            if let Some(active) = self.active {
                if elapsed_beyond(now, active.activated_at, self.tuning.duration) {
                    log::debug!("Power-up {:?} expired", active.kind);
                    self.reset(now, targets.projectiles, targets.player);
                    events.push(GameEvent::PowerUpExpired { kind: active.kind });
                }
            }
        }

        collected
    }

    /// Close a pause window by shifting every timer forward by its length
    fn resume(&mut self, now: f64) {
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = now - paused_at;
            self.spawn_time += paused_for;
            if let Some(active) = self.active.as_mut() {
                active.activated_at += paused_for;
            }
        }
    }

    fn spawn(&mut self, rng: &mut Pcg32, events: &mut Vec<GameEvent>) {
        if self.pickup.is_some() {
            return;
        }
        let x = rng.random_range(0.0..=SCREEN_WIDTH - self.tuning.pickup_size).floor();
        self.pickup = Some(Vec2::new(x, 0.0));
        log::debug!("Power-up pickup spawned at x={x}");
        events.push(GameEvent::PowerUpSpawned);
    }

    /// Apply an effect, replacing whatever was active
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        now: f64,
        projectiles: &mut ProjectileStore,
        player: &mut Player,
    ) {
        if self.active.is_some() {
            revert_effects(projectiles, player);
        }
        self.active = Some(ActivePowerUp {
            kind,
            activated_at: now,
        });
        apply_effect(kind, projectiles, player);
        log::debug!("Power-up {:?} active", kind);
    }

    /// Drop the pickup and active effect, restart the spawn timer
    pub fn reset(&mut self, now: f64, projectiles: &mut ProjectileStore, player: &mut Player) {
        self.active = None;
        self.pickup = None;
        self.spawn_time = now;
        revert_effects(projectiles, player);
    }
}

fn apply_effect(kind: PowerUpKind, projectiles: &mut ProjectileStore, player: &mut Player) {
    match kind {
        PowerUpKind::Laser => {
            let t = projectiles.tuning();
            projectiles.weapon = PlayerWeapon {
                length: t.laser_length,
                speed: t.laser_speed,
                shoot_interval: t.laser_shoot_interval,
                triple_shot: projectiles.weapon.triple_shot,
            };
        }
        PowerUpKind::Shield => player.invulnerable = true,
        PowerUpKind::TripleShot => projectiles.weapon.triple_shot = true,
    }
}

fn revert_effects(projectiles: &mut ProjectileStore, player: &mut Player) {
    projectiles.weapon = PlayerWeapon::standard(projectiles.tuning());
    player.invulnerable = false;
}
