//! Enemy formation
//!
//! A rectangular grid that sweeps sideways in lockstep, dropping one step and
//! reversing whenever any member touches a screen edge.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::projectile::ProjectileStore;
use crate::consts::*;
use crate::tuning::FormationTuning;

/// A single formation enemy (top-left corner; size comes from tuning)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
}

/// Result of one formation update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationStatus {
    /// Enemies still on the field
    Advancing,
    /// Every enemy destroyed
    Cleared,
    /// An enemy reached the bottom of the field
    Breached,
}

#[derive(Debug, Clone)]
pub struct EnemyFormation {
    pub enemies: Vec<Enemy>,
    /// +1 moving right, -1 moving left
    pub direction: f32,
    pub speed: f32,
    pub shoot_prob: f32,
    tuning: FormationTuning,
}

impl EnemyFormation {
    pub fn new(tuning: &FormationTuning) -> Self {
        let mut formation = Self {
            enemies: Vec::new(),
            direction: 1.0,
            speed: tuning.speed,
            shoot_prob: tuning.shoot_prob,
            tuning: tuning.clone(),
        };
        formation.reset_grid();
        formation
    }

    pub fn enemy_size(&self) -> Vec2 {
        Vec2::splat(self.tuning.enemy_size)
    }

    /// Fill the grid with fresh enemies (direction and difficulty are kept)
    pub fn reset_grid(&mut self) {
        let t = &self.tuning;
        let pitch = t.enemy_size + t.spacing;
        self.enemies = (0..t.rows)
            .flat_map(|row| {
                (0..t.cols).map(move |col| Enemy {
                    pos: Vec2::new(
                        col as f32 * pitch + t.origin,
                        row as f32 * pitch + t.origin,
                    ),
                })
            })
            .collect();
    }

    /// Restore the difficulty curve to level one
    pub fn reset_difficulty(&mut self) {
        self.speed = self.tuning.speed;
        self.shoot_prob = self.tuning.shoot_prob;
        self.direction = 1.0;
    }

    pub fn increase_difficulty(&mut self) {
        self.speed += self.tuning.speed_step;
        self.shoot_prob += self.tuning.shoot_prob_step;
        log::info!(
            "Formation difficulty: speed={} shoot_prob={:.4}",
            self.speed,
            self.shoot_prob
        );
    }

    pub fn is_cleared(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Move the formation one tick, rolling each enemy's chance to fire
    pub fn update(&mut self, rng: &mut Pcg32, projectiles: &mut ProjectileStore) -> FormationStatus {
        if self.enemies.is_empty() {
            return FormationStatus::Cleared;
        }

        let size = self.tuning.enemy_size;
        let step = self.speed * self.direction;
        let mut edge_reached = false;
        let mut breached = false;

        for enemy in &mut self.enemies {
            enemy.pos.x += step;
            if enemy.pos.x <= 0.0 || enemy.pos.x + size >= SCREEN_WIDTH {
                edge_reached = true;
            }

            if rng.random::<f32>() < self.shoot_prob {
                projectiles.spawn_enemy(enemy.pos.x + size / 2.0, enemy.pos.y + size);
            }

            if enemy.pos.y + size >= SCREEN_HEIGHT {
                breached = true;
            }
        }

        if edge_reached {
            for enemy in &mut self.enemies {
                enemy.pos.y += self.tuning.descend_step;
            }
            self.direction = -self.direction;
        }

        if breached {
            log::info!("Formation reached the bottom of the field");
            FormationStatus::Breached
        } else {
            FormationStatus::Advancing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::ProjectileTuning;
    use rand::SeedableRng;

    fn quiet_formation() -> EnemyFormation {
        let tuning = FormationTuning {
            shoot_prob: 0.0,
            ..Default::default()
        };
        EnemyFormation::new(&tuning)
    }

    #[test]
    fn test_grid_layout() {
        let f = quiet_formation();
        assert_eq!(f.enemies.len(), 50);
        assert_eq!(f.enemies[0].pos, Vec2::new(50.0, 50.0));
        assert_eq!(f.enemies[1].pos, Vec2::new(100.0, 50.0));
        assert_eq!(f.enemies[10].pos, Vec2::new(50.0, 100.0));
    }

    #[test]
    fn test_bounce_descends_once_and_reverses() {
        let mut f = quiet_formation();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut store = ProjectileStore::new(&ProjectileTuning::default());

        // Put one enemy right at the bound
        f.enemies[9].pos.x = SCREEN_WIDTH - 40.0 - f.speed;
        let before: Vec<f32> = f.enemies.iter().map(|e| e.pos.y).collect();

        assert_eq!(f.update(&mut rng, &mut store), FormationStatus::Advancing);
        assert_eq!(f.direction, -1.0);
        for (e, y) in f.enemies.iter().zip(before) {
            assert_eq!(e.pos.y, y + 20.0);
        }

        // Next tick moves left without another descent
        let before: Vec<f32> = f.enemies.iter().map(|e| e.pos.y).collect();
        f.update(&mut rng, &mut store);
        assert_eq!(f.direction, -1.0);
        for (e, y) in f.enemies.iter().zip(before) {
            assert_eq!(e.pos.y, y);
        }
    }

    #[test]
    fn test_breach_and_clear() {
        let mut f = quiet_formation();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut store = ProjectileStore::new(&ProjectileTuning::default());

        f.enemies[0].pos.y = SCREEN_HEIGHT - 40.0;
        assert_eq!(f.update(&mut rng, &mut store), FormationStatus::Breached);

        f.enemies.clear();
        assert_eq!(f.update(&mut rng, &mut store), FormationStatus::Cleared);
    }

    #[test]
    fn test_firing_probability() {
        let tuning = FormationTuning {
            shoot_prob: 1.0,
            ..Default::default()
        };
        let mut f = EnemyFormation::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut store = ProjectileStore::new(&ProjectileTuning::default());
        f.update(&mut rng, &mut store);
        assert_eq!(store.enemy.len(), 50);
        assert_eq!(store.enemy[0].pos(), Vec2::new(50.0 + 2.0 + 20.0, 90.0));
    }

    #[test]
    fn test_difficulty_step() {
        let mut f = quiet_formation();
        f.shoot_prob = 0.003;
        f.increase_difficulty();
        assert_eq!(f.speed, 2.5);
        assert!((f.shoot_prob - 0.004).abs() < 1e-6);
    }
}
