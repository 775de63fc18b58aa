//! Boss controller
//!
//! A five-phase state machine. The phase is a pure function of the health
//! fraction and is recomputed every tick; a policy table maps each phase to
//! one movement function and one attack function.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hooks::GameHooks;
use super::projectile::{ProjectileStore, Virus};
use super::state::GameEvent;
use crate::consts::*;
use crate::tuning::BossTuning;
use crate::{dir_from_down, direction_or_down, elapsed_at_least, elapsed_beyond};

/// Boss behaviour phase, keyed to remaining health
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Phase {
    /// Phase for a health value. Breakpoints at 80/60/40/20 percent belong
    /// to the lower band (exactly 80% is phase two).
    pub fn from_health(health: i32, max_health: i32) -> Self {
        let scaled = i64::from(health) * 100;
        let max = i64::from(max_health.max(1));
        if scaled > 80 * max {
            Phase::One
        } else if scaled > 60 * max {
            Phase::Two
        } else if scaled > 40 * max {
            Phase::Three
        } else if scaled > 20 * max {
            Phase::Four
        } else {
            Phase::Five
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// Everything a policy may read or write during one boss update
pub struct BossContext<'a> {
    pub now: f64,
    pub player_center: Vec2,
    pub rng: &'a mut Pcg32,
    pub projectiles: &'a mut ProjectileStore,
    pub events: &'a mut Vec<GameEvent>,
}

type MoveFn = fn(&mut Boss, &mut BossContext<'_>);
type AttackFn = fn(&Boss, &mut BossContext<'_>);

struct PhasePolicy {
    movement: MoveFn,
    attack: AttackFn,
}

static POLICIES: [PhasePolicy; 5] = [
    PhasePolicy {
        movement: move_bounce,
        attack: attack_straight_down,
    },
    PhasePolicy {
        movement: move_bounce_oscillate,
        attack: attack_random_cone,
    },
    PhasePolicy {
        movement: move_homing,
        attack: attack_aimed,
    },
    PhasePolicy {
        movement: move_zigzag,
        attack: attack_radial,
    },
    PhasePolicy {
        movement: move_erratic,
        attack: attack_virus,
    },
];

#[derive(Debug, Clone)]
pub struct Boss {
    /// Top-left corner
    pub pos: Vec2,
    pub health: i32,
    /// Horizontal bounce direction (+1 right, -1 left)
    pub direction: f32,
    pub rage: bool,
    pub minigame_triggered: bool,
    pub defeated: bool,
    /// Erratic-movement destination and when it was picked
    pub target: Vec2,
    pub last_target_update: Option<f64>,
    /// Last shot time per phase
    pub last_shots: [Option<f64>; 5],
    /// Current per-phase shot intervals (halved by rage)
    pub shoot_intervals: [f64; 5],
    pub speed_scale: f32,
    tuning: BossTuning,
}

impl Boss {
    pub fn new(tuning: &BossTuning) -> Self {
        let pos = Vec2::new((SCREEN_WIDTH - tuning.width) / 2.0, tuning.start_y);
        Self {
            pos,
            health: tuning.max_health,
            direction: 1.0,
            rage: false,
            minigame_triggered: false,
            defeated: false,
            target: pos,
            last_target_update: None,
            last_shots: [None; 5],
            shoot_intervals: tuning.shoot_intervals,
            speed_scale: 1.0,
            tuning: tuning.clone(),
        }
    }

    /// Back to the construction state (the only way to leave rage)
    pub fn reset(&mut self) {
        *self = Self::new(&self.tuning);
    }

    pub fn tuning(&self) -> &BossTuning {
        &self.tuning
    }

    pub fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.tuning.width, self.tuning.height)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }

    /// Bottom-centre muzzle
    pub fn muzzle(&self) -> Vec2 {
        self.pos + Vec2::new(self.tuning.width / 2.0, self.tuning.height)
    }

    pub fn phase(&self) -> Phase {
        Phase::from_health(self.health, self.tuning.max_health)
    }

    fn speed(&self, phase: Phase) -> f32 {
        self.tuning.phase_speeds[phase.index()] * self.speed_scale
    }

    fn x_bounds(&self) -> (f32, f32) {
        (
            self.tuning.margin,
            SCREEN_WIDTH - self.tuning.width - self.tuning.margin,
        )
    }

    /// Speed up and halve every shot interval; idempotent
    pub fn enable_rage_mode(&mut self) {
        if self.rage {
            return;
        }
        self.rage = true;
        self.speed_scale = self.tuning.rage_speed_mult;
        for (interval, base) in self.shoot_intervals.iter_mut().zip(self.tuning.shoot_intervals) {
            *interval = base * self.tuning.rage_interval_mult;
        }
        log::info!("Boss enraged");
    }

    /// Run the minigame the first time health falls to half
    fn check_minigame(&mut self, events: &mut Vec<GameEvent>, hooks: &mut dyn GameHooks) {
        if self.minigame_triggered || self.health * 2 > self.tuning.max_health {
            return;
        }
        self.minigame_triggered = true;
        events.push(GameEvent::MinigameTriggered);
        log::info!("Minigame triggered at boss health {}", self.health);
        if !hooks.run_minigame() {
            self.enable_rage_mode();
            events.push(GameEvent::BossEnraged);
        }
    }

    /// One tick of movement and (cooldown permitting) attack
    pub fn update(&mut self, ctx: &mut BossContext<'_>, hooks: &mut dyn GameHooks) {
        if self.defeated {
            return;
        }
        self.check_minigame(ctx.events, hooks);

        let phase = self.phase();
        let policy = &POLICIES[phase.index()];
        (policy.movement)(self, ctx);

        let i = phase.index();
        let interval = self.shoot_intervals[i];
        if self.last_shots[i].is_none_or(|last| elapsed_at_least(ctx.now, last, interval)) {
            (policy.attack)(self, ctx);
            self.last_shots[i] = Some(ctx.now);
        }
    }

    /// Take `damage` hits. Emits damage, phase change and (once) defeat.
    pub fn apply_hit(&mut self, damage: i32, events: &mut Vec<GameEvent>) {
        if self.defeated || damage <= 0 {
            return;
        }
        let before = self.phase();
        self.health -= damage;
        events.push(GameEvent::BossDamaged {
            health: self.health,
        });
        let after = self.phase();
        if after != before {
            log::info!("Boss entered phase {}", after.number());
            events.push(GameEvent::BossPhaseChanged {
                phase: after.number(),
            });
        }
        if self.health <= 0 {
            self.defeated = true;
            log::info!("Boss defeated");
            events.push(GameEvent::BossDefeated);
        }
    }
}

fn move_bounce(boss: &mut Boss, _ctx: &mut BossContext<'_>) {
    let speed = boss.speed(boss.phase());
    let (min_x, max_x) = boss.x_bounds();
    boss.pos.x += speed * boss.direction;
    if boss.pos.x <= min_x {
        boss.pos.x = min_x;
        boss.direction = 1.0;
    } else if boss.pos.x >= max_x {
        boss.pos.x = max_x;
        boss.direction = -1.0;
    }
}

fn oscillate(boss: &mut Boss, now: f64) {
    boss.pos.y =
        boss.tuning.oscillation_base_y + boss.tuning.oscillation_amplitude * (now.sin() as f32);
}

fn move_bounce_oscillate(boss: &mut Boss, ctx: &mut BossContext<'_>) {
    move_bounce(boss, ctx);
    oscillate(boss, ctx.now);
}

fn move_homing(boss: &mut Boss, ctx: &mut BossContext<'_>) {
    let speed = boss.speed(Phase::Three);
    let target_x = ctx.player_center.x - boss.tuning.width / 2.0;
    let step = (boss.tuning.homing_gain * (target_x - boss.pos.x)).clamp(-speed, speed);
    let (min_x, max_x) = boss.x_bounds();
    boss.pos.x = (boss.pos.x + step).clamp(min_x, max_x);
    oscillate(boss, ctx.now);
}

fn move_zigzag(boss: &mut Boss, ctx: &mut BossContext<'_>) {
    let t = &boss.tuning;
    let period = t.zigzag_period.max(f64::EPSILON);
    let s = (std::f64::consts::TAU * ctx.now.rem_euclid(period) / period) as f32;
    let (min_x, max_x) = boss.x_bounds();
    boss.pos.x = min_x + (max_x - min_x) * (s.sin() + 1.0) / 2.0;
    boss.pos.y = t.zigzag_min_y + (t.zigzag_max_y - t.zigzag_min_y) * ((s + FRAC_PI_4).sin() + 1.0) / 2.0;
}

fn move_erratic(boss: &mut Boss, ctx: &mut BossContext<'_>) {
    let due = boss
        .last_target_update
        .is_none_or(|last| elapsed_beyond(ctx.now, last, boss.tuning.retarget_interval));
    if due {
        let (min_x, max_x) = boss.x_bounds();
        boss.target = Vec2::new(
            ctx.rng.random_range(min_x..=max_x),
            ctx.rng.random_range(boss.tuning.margin..=SCREEN_HEIGHT / 3.0),
        );
        boss.last_target_update = Some(ctx.now);
    }
    let speed = boss.speed(Phase::Five);
    boss.pos += (boss.target - boss.pos).normalize_or_zero() * speed;
}

fn attack_straight_down(boss: &Boss, ctx: &mut BossContext<'_>) {
    let muzzle = boss.muzzle();
    ctx.projectiles
        .spawn_boss(muzzle.x, muzzle.y, 0.0, boss.tuning.shot_speed);
}

fn attack_random_cone(boss: &Boss, ctx: &mut BossContext<'_>) {
    let angle = ctx.rng.random_range(-FRAC_PI_2..=FRAC_PI_2);
    let vel = dir_from_down(angle) * boss.tuning.shot_speed;
    let muzzle = boss.muzzle();
    ctx.projectiles.spawn_boss(muzzle.x, muzzle.y, vel.x, vel.y);
}

fn attack_aimed(boss: &Boss, ctx: &mut BossContext<'_>) {
    let t = &boss.tuning;
    let delta = (ctx.player_center - boss.center()) / t.aim_divisor;
    let vel = if delta.length_squared() > 0.0 {
        let jx = 1.0 + ctx.rng.random_range(-t.aim_jitter..=t.aim_jitter);
        let jy = 1.0 + ctx.rng.random_range(-t.aim_jitter..=t.aim_jitter);
        Vec2::new(delta.x * jx, delta.y * jy)
    } else {
        direction_or_down(delta) * t.shot_speed
    };
    let muzzle = boss.muzzle();
    ctx.projectiles.spawn_boss(muzzle.x, muzzle.y, vel.x, vel.y);
}

fn attack_radial(boss: &Boss, ctx: &mut BossContext<'_>) {
    let angle = ctx.rng.random_range(0.0..TAU);
    let vel = Vec2::new(angle.cos(), angle.sin()) * boss.tuning.shot_speed;
    let muzzle = boss.muzzle();
    ctx.projectiles.spawn_boss(muzzle.x, muzzle.y, vel.x, vel.y);
}

fn attack_virus(boss: &Boss, ctx: &mut BossContext<'_>) {
    let t = &boss.tuning;
    let muzzle = boss.muzzle();
    let vel = direction_or_down(ctx.player_center - muzzle) * t.virus_speed;
    let explode_dist = ctx
        .rng
        .random_range(t.virus_min_explode_dist..t.virus_max_explode_dist);
    if ctx.projectiles.spawn_virus(Virus {
        pos: muzzle,
        vel,
        origin: muzzle,
        explode_dist,
    }) {
        log::debug!("Virus launched, detonates after {explode_dist:.0}px");
    }
}
