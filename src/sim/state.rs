//! World state and core simulation types
//!
//! Every manager owns its own collection; `GameState` owns the managers plus
//! the seeded RNG, so cloning or snapshotting it captures the whole fight.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::barricade::BarricadeField;
use super::boss::Boss;
use super::formation::EnemyFormation;
use super::powerup::{PowerUpDirector, PowerUpKind};
use super::projectile::ProjectileStore;
use crate::consts::*;
use crate::tuning::{PlayerTuning, Tuning};

/// Signals for the surrounding game (audio, UI, music), drained after each tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerHit,
    GameOver,
    LevelComplete { level: u32 },
    BossFightStarted,
    BossDamaged { health: i32 },
    BossPhaseChanged { phase: u8 },
    MinigameTriggered,
    BossEnraged,
    BossDefeated,
    EnemyDestroyed { pos: Vec2 },
    PowerUpSpawned,
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    VirusDetonated { pos: Vec2 },
    ScoreChanged { score: i64 },
    PauseToggled { paused: bool },
}

/// The player ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per tick
    pub speed: f32,
    pub lives: u8,
    pub invulnerable: bool,
}

impl Player {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            pos: Vec2::new(
                (SCREEN_WIDTH - tuning.width) / 2.0,
                SCREEN_HEIGHT - tuning.height - tuning.bottom_margin,
            ),
            size: Vec2::new(tuning.width, tuning.height),
            speed: tuning.speed,
            lives: tuning.lives,
            invulnerable: false,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Where shots leave the ship (top centre)
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y)
    }

    /// Move horizontally by `dir` steps, clamped to the field
    pub fn move_by(&mut self, dir: f32) {
        if !dir.is_finite() {
            return;
        }
        let max_x = SCREEN_WIDTH - self.size.x;
        self.pos.x = (self.pos.x + dir.clamp(-1.0, 1.0) * self.speed).clamp(0.0, max_x);
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the run was started with
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,

    /// Current level (1-based)
    pub level: u32,
    pub boss_fight: bool,
    pub paused: bool,
    /// When the current pause began
    pub paused_since: Option<f64>,
    pub game_over: bool,
    pub victory: bool,

    pub score: i64,
    /// Last time the score drain was applied
    pub last_score_drain: Option<f64>,
    pub time_ticks: u64,

    pub player: Player,
    pub projectiles: ProjectileStore,
    pub formation: EnemyFormation,
    pub barricades: BarricadeField,
    pub powerups: PowerUpDirector,
    pub boss: Boss,

    /// Events generated since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        log::info!(
            "New run: seed={seed} difficulty={}",
            tuning.difficulty.as_str()
        );
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            boss_fight: false,
            paused: false,
            paused_since: None,
            game_over: false,
            victory: false,
            score: tuning.score.start,
            last_score_drain: None,
            time_ticks: 0,
            player: Player::new(&tuning.player),
            projectiles: ProjectileStore::new(&tuning.projectile),
            formation: EnemyFormation::new(&tuning.formation),
            barricades: BarricadeField::new(&tuning.barricade),
            powerups: PowerUpDirector::new(&tuning.powerup),
            boss: Boss::new(&tuning.boss),
            events: Vec::new(),
            tuning,
        }
    }

    /// Take every event generated since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add `delta` points (clamped at zero) and announce the new score
    pub fn adjust_score(&mut self, delta: i64) {
        let score = (self.score + delta).max(0);
        if score != self.score {
            self.score = score;
            self.events.push(GameEvent::ScoreChanged { score });
        }
    }

    /// Reset the field between levels: no projectiles, no power-up effect,
    /// fresh barricades
    pub fn clear_level(&mut self, now: f64) {
        self.projectiles.clear();
        self.powerups
            .reset(now, &mut self.projectiles, &mut self.player);
        self.barricades.rebuild();
    }

    /// Whether the simulation has stopped for good
    pub fn is_finished(&self) -> bool {
        self.game_over || self.victory
    }
}
