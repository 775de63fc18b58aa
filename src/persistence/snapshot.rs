//! Snapshot of a running fight
//!
//! Captures everything needed to resume bit-for-bit: every manager's
//! collections, every cooldown timestamp and the RNG stream. Timestamps are
//! stored as read at `captured_at`; restoring at a later clock reading shifts
//! them all by the same amount, so restoring at the capture time is exact.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::LoadError;
use crate::sim::formation::Enemy;
use crate::sim::powerup::ActivePowerUp;
use crate::sim::projectile::{PlayerWeapon, Projectile};
use crate::sim::state::{GameState, Player};
use crate::consts::SCREEN_WIDTH;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileRecord {
    pub player: Vec<Projectile>,
    pub enemy: Vec<Projectile>,
    pub boss: Vec<Projectile>,
    pub weapon: PlayerWeapon,
    pub last_player_shot: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationRecord {
    pub enemies: Vec<Vec2>,
    pub direction: f32,
    pub speed: f32,
    pub shoot_prob: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossRecord {
    pub health: i32,
    pub rage: bool,
    pub minigame_triggered: bool,
    pub defeated: bool,
    pub pos: Vec2,
    pub direction: f32,
    pub target: Vec2,
    pub last_target_update: Option<f64>,
    pub last_shots: [Option<f64>; 5],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpRecord {
    pub active: Option<ActivePowerUp>,
    /// Seconds of effect left at capture (for display; restore uses `active`)
    pub remaining: Option<f64>,
    pub pickup: Option<Vec2>,
    pub spawn_time: f64,
    pub first_level: bool,
    pub last_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Clock reading the timestamps below were taken against
    pub captured_at: f64,
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub level: u32,
    pub boss_fight: bool,
    pub game_over: bool,
    pub victory: bool,
    pub score: i64,
    pub last_score_drain: Option<f64>,
    pub time_ticks: u64,
    pub player: Player,
    pub projectiles: ProjectileRecord,
    pub formation: FormationRecord,
    pub barricades: Vec<Vec<Vec2>>,
    pub boss: BossRecord,
    pub powerup: PowerUpRecord,
}

impl Snapshot {
    /// Capture `state` at clock reading `now`. A paused game is captured as
    /// if it had been resumed at `now`.
    pub fn capture(state: &GameState, now: f64) -> Self {
        let score_shift = state.paused_since.map_or(0.0, |since| now - since);
        let powerup_shift = state.powerups.paused_at.map_or(0.0, |at| now - at);

        let powerups = &state.powerups;
        let active = powerups.active.map(|a| ActivePowerUp {
            activated_at: a.activated_at + powerup_shift,
            ..a
        });

        Self {
            captured_at: now,
            seed: state.seed,
            rng: state.rng.clone(),
            tuning: state.tuning.clone(),
            level: state.level,
            boss_fight: state.boss_fight,
            game_over: state.game_over,
            victory: state.victory,
            score: state.score,
            last_score_drain: state.last_score_drain.map(|t| t + score_shift),
            time_ticks: state.time_ticks,
            player: state.player.clone(),
            projectiles: ProjectileRecord {
                player: state.projectiles.player.clone(),
                enemy: state.projectiles.enemy.clone(),
                boss: state.projectiles.boss.clone(),
                weapon: state.projectiles.weapon.clone(),
                last_player_shot: state.projectiles.last_player_shot,
            },
            formation: FormationRecord {
                enemies: state.formation.enemies.iter().map(|e| e.pos).collect(),
                direction: state.formation.direction,
                speed: state.formation.speed,
                shoot_prob: state.formation.shoot_prob,
            },
            barricades: state.barricades.block_positions(),
            boss: BossRecord {
                health: state.boss.health,
                rage: state.boss.rage,
                minigame_triggered: state.boss.minigame_triggered,
                defeated: state.boss.defeated,
                pos: state.boss.pos,
                direction: state.boss.direction,
                target: state.boss.target,
                last_target_update: state.boss.last_target_update,
                last_shots: state.boss.last_shots,
            },
            powerup: PowerUpRecord {
                active,
                remaining: powerups.remaining(now),
                pickup: powerups.pickup,
                spawn_time: powerups.spawn_time + powerup_shift,
                first_level: powerups.first_level,
                last_level: powerups.last_level,
            },
        }
    }

    /// Reject anything the simulation could never have produced
    pub fn validate(&self) -> Result<(), LoadError> {
        let invalid = |msg: String| Err(LoadError::Invalid(msg));
        let t = &self.tuning;
        t.validate().map_err(|err| LoadError::Invalid(err.to_string()))?;

        if self.level == 0 || self.level > t.formation.total_levels {
            return invalid(format!("level {} out of range", self.level));
        }
        if self.boss.health > t.boss.max_health {
            return invalid(format!(
                "boss health {} exceeds max {}",
                self.boss.health, t.boss.max_health
            ));
        }
        if self.barricades.len() != t.barricade.count {
            return invalid(format!(
                "expected {} barricades, found {}",
                t.barricade.count,
                self.barricades.len()
            ));
        }
        if self.formation.direction.abs() != 1.0 {
            return invalid(format!(
                "formation direction {} is not +/-1",
                self.formation.direction
            ));
        }
        let player = &self.player;
        if !(player.size.x > 0.0 && player.size.x <= SCREEN_WIDTH && player.size.y > 0.0)
            || !player.speed.is_finite()
        {
            return invalid("player ship does not fit the field".to_string());
        }
        let weapon = &self.projectiles.weapon;
        if !(weapon.shoot_interval.is_finite() && weapon.shoot_interval > 0.0)
            || !weapon.speed.is_finite()
            || !weapon.length.is_finite()
        {
            return invalid("player weapon record".to_string());
        }
        if self.score < 0 {
            return invalid(format!("negative score {}", self.score));
        }

        let projectiles = &self.projectiles;
        let mut all = projectiles
            .player
            .iter()
            .chain(&projectiles.enemy)
            .chain(&projectiles.boss);
        if !all.all(Projectile::is_well_formed) {
            return invalid("non-finite projectile record".to_string());
        }
        if projectiles.player.iter().chain(&projectiles.enemy).any(Projectile::is_virus) {
            return invalid("virus outside the boss collection".to_string());
        }

        let mut points = self
            .formation
            .enemies
            .iter()
            .chain(self.barricades.iter().flatten())
            .chain(self.powerup.pickup.iter())
            .chain([&self.player.pos, &self.boss.pos, &self.boss.target]);
        if !points.all(|p| p.is_finite()) {
            return invalid("non-finite position".to_string());
        }

        let mut times = self
            .boss
            .last_shots
            .iter()
            .flatten()
            .chain(self.boss.last_target_update.iter())
            .chain(self.last_score_drain.iter())
            .chain(projectiles.last_player_shot.iter())
            .chain(self.powerup.active.iter().map(|a| &a.activated_at))
            .chain([&self.captured_at, &self.powerup.spawn_time]);
        if !times.all(|v| v.is_finite()) {
            return invalid("non-finite timestamp".to_string());
        }

        Ok(())
    }

    /// Rebuild a state that resumes at clock reading `now`
    pub fn restore(&self, now: f64) -> Result<GameState, LoadError> {
        self.validate()?;
        let shift = now - self.captured_at;
        let rebase = |t: Option<f64>| t.map(|t| t + shift);

        let mut state = GameState::with_tuning(self.seed, self.tuning.clone());
        state
            .barricades
            .restore(&self.barricades)
            .map_err(LoadError::Invalid)?;

        state.rng = self.rng.clone();
        state.level = self.level;
        state.boss_fight = self.boss_fight;
        state.game_over = self.game_over;
        state.victory = self.victory;
        state.score = self.score;
        state.last_score_drain = rebase(self.last_score_drain);
        state.time_ticks = self.time_ticks;
        state.player = self.player.clone();

        let p = &self.projectiles;
        state.projectiles.player = p.player.clone();
        state.projectiles.enemy = p.enemy.clone();
        state.projectiles.boss = p.boss.clone();
        state.projectiles.weapon = p.weapon.clone();
        state.projectiles.last_player_shot = rebase(p.last_player_shot);

        let f = &self.formation;
        state.formation.enemies = f.enemies.iter().map(|&pos| Enemy { pos }).collect();
        state.formation.direction = f.direction;
        state.formation.speed = f.speed;
        state.formation.shoot_prob = f.shoot_prob;

        let b = &self.boss;
        let boss = &mut state.boss;
        boss.health = b.health;
        boss.minigame_triggered = b.minigame_triggered;
        boss.defeated = b.defeated;
        boss.pos = b.pos;
        boss.direction = b.direction;
        boss.target = b.target;
        boss.last_target_update = rebase(b.last_target_update);
        boss.last_shots = b.last_shots.map(rebase);
        if b.rage {
            boss.enable_rage_mode();
        }

        let pu = &self.powerup;
        let director = &mut state.powerups;
        director.active = pu.active.map(|a| ActivePowerUp {
            activated_at: a.activated_at + shift,
            ..a
        });
        director.pickup = pu.pickup;
        director.spawn_time = pu.spawn_time + shift;
        director.first_level = pu.first_level;
        director.last_level = pu.last_level;

        log::info!(
            "Restored level {} (boss fight: {}) with score {}",
            state.level,
            state.boss_fight,
            state.score
        );
        Ok(state)
    }
}
