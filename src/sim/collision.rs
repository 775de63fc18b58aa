//! Collision resolution
//!
//! One pass per tick over every interaction category, in a fixed order. Hits
//! are recorded in removal masks while iterating, and the collections are only
//! compacted once the whole pass is done, so no projectile or enemy can be
//! resolved twice or skipped when several are removed in the same tick.

use glam::Vec2;

use super::barricade::BarricadeField;
use super::boss::Boss;
use super::formation::Enemy;
use super::projectile::{Projectile, ProjectileStore};
use super::state::Player;
use crate::rect_contains;

/// Handles to everything the resolver reads or mutates
pub struct CollisionScene<'a> {
    /// Sampled once at the start of the tick
    pub boss_fight: bool,
    pub player: &'a Player,
    pub boss: &'a Boss,
    pub enemy_size: Vec2,
    pub projectiles: &'a mut ProjectileStore,
    pub enemies: &'a mut Vec<Enemy>,
    pub barricades: &'a mut BarricadeField,
    /// Speed of the ring released by a virus hit
    pub burst_speed: f32,
}

/// What happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// A hostile projectile reached a vulnerable player
    pub player_hit: bool,
    /// Hostile projectiles absorbed by the shield
    pub shielded_hits: usize,
    /// Positions of enemies destroyed this tick
    pub enemies_destroyed: Vec<Vec2>,
    pub boss_hits: i32,
    pub blocks_destroyed: usize,
    /// Virus projectiles that exploded because they were hit
    pub detonations: Vec<Vec2>,
}

/// Either end of the projectile strictly inside the rectangle
fn touches(projectile: &Projectile, origin: Vec2, size: Vec2) -> bool {
    match projectile {
        Projectile::Kinetic(k) => {
            rect_contains(origin, size, k.pos) || rect_contains(origin, size, k.tip())
        }
        Projectile::Virus(v) => rect_contains(origin, size, v.pos),
    }
}

/// Centre of a projectile's body (its head for a virus)
fn body_center(projectile: &Projectile) -> Vec2 {
    match projectile {
        Projectile::Kinetic(k) => k.pos + Vec2::new(k.width, k.length) / 2.0,
        Projectile::Virus(v) => v.pos,
    }
}

/// Closest live projectile strictly within `radius` of `pos` (earliest on ties)
fn nearest(list: &[Projectile], spent: &[bool], pos: Vec2, radius: f32) -> Option<usize> {
    list.iter()
        .enumerate()
        .filter(|(j, _)| !spent[*j])
        .map(|(j, q)| (j, q.pos().distance(pos)))
        .filter(|&(_, d)| d < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(j, _)| j)
}

fn compact<T>(items: &mut Vec<T>, spent: &[bool]) {
    let mut i = 0;
    items.retain(|_| {
        let keep = !spent[i];
        i += 1;
        keep
    });
}

/// Resolve every collision category for this tick
pub fn resolve_collisions(scene: CollisionScene<'_>) -> CollisionReport {
    let CollisionScene {
        boss_fight,
        player,
        boss,
        enemy_size,
        projectiles,
        enemies,
        barricades,
        burst_speed,
    } = scene;
    let radius = projectiles.tuning().collision_radius;
    let mut report = CollisionReport::default();

    let mut player_spent = vec![false; projectiles.player.len()];
    let mut enemy_spent = vec![false; projectiles.enemy.len()];
    let mut boss_spent = vec![false; projectiles.boss.len()];
    let mut enemy_dead = vec![false; enemies.len()];

    // (a) Hostile projectiles vs the player. Only one collection is live
    // depending on the fight; a hit projectile is consumed either way.
    let (hostile, hostile_spent) = if boss_fight {
        (&projectiles.boss, &mut boss_spent)
    } else {
        (&projectiles.enemy, &mut enemy_spent)
    };
    for (i, p) in hostile.iter().enumerate() {
        if !touches(p, player.pos, player.size) {
            continue;
        }
        hostile_spent[i] = true;
        if let Projectile::Virus(v) = p {
            report.detonations.push(v.pos);
        }
        if player.invulnerable {
            report.shielded_hits += 1;
        } else {
            report.player_hit = true;
        }
    }

    // (b) Player projectiles vs the boss or the formation
    for (i, p) in projectiles.player.iter().enumerate() {
        if boss_fight {
            if !boss.defeated && touches(p, boss.pos, boss.size()) {
                player_spent[i] = true;
                report.boss_hits += 1;
            }
            continue;
        }
        let target = enemies
            .iter()
            .enumerate()
            .find(|(e, enemy)| !enemy_dead[*e] && touches(p, enemy.pos, enemy_size));
        if let Some((e, enemy)) = target {
            enemy_dead[e] = true;
            player_spent[i] = true;
            report.enemies_destroyed.push(enemy.pos);
        }
    }

    // (c) Player projectiles vs hostile projectiles, by proximity
    for (i, p) in projectiles.player.iter().enumerate() {
        if player_spent[i] {
            continue;
        }
        let pos = p.pos();
        if let Some(j) = nearest(&projectiles.enemy, &enemy_spent, pos, radius) {
            enemy_spent[j] = true;
            player_spent[i] = true;
        } else if let Some(j) = nearest(&projectiles.boss, &boss_spent, pos, radius) {
            boss_spent[j] = true;
            player_spent[i] = true;
            if let Projectile::Virus(v) = &projectiles.boss[j] {
                report.detonations.push(v.pos);
            }
        }
    }

    if !boss_fight {
        // (d) Enemy projectiles vs barricade blocks (both destroyed)
        for (i, p) in projectiles.enemy.iter().enumerate() {
            if enemy_spent[i] {
                continue;
            }
            if let Some((b, block)) = barricades.hit_test(body_center(p)) {
                barricades.remove_block(b, block);
                enemy_spent[i] = true;
                report.blocks_destroyed += 1;
            }
        }

        // (e) Player projectiles are absorbed by blocks without damaging them
        for (i, p) in projectiles.player.iter().enumerate() {
            if !player_spent[i] && barricades.hit_test(p.pos()).is_some() {
                player_spent[i] = true;
            }
        }
    }

    compact(&mut projectiles.player, &player_spent);
    compact(&mut projectiles.enemy, &enemy_spent);
    compact(&mut projectiles.boss, &boss_spent);
    compact(enemies, &enemy_dead);

    for &pos in &report.detonations {
        projectiles.detonate(pos, burst_speed);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::projectile::{BURST_COUNT, Virus};
    use crate::sim::state::GameState;

    fn resolve(state: &mut GameState) -> CollisionReport {
        resolve_collisions(CollisionScene {
            boss_fight: state.boss_fight,
            player: &state.player,
            boss: &state.boss,
            enemy_size: state.formation.enemy_size(),
            projectiles: &mut state.projectiles,
            enemies: &mut state.formation.enemies,
            barricades: &mut state.barricades,
            burst_speed: 4.0,
        })
    }

    fn empty_field() -> GameState {
        let mut state = GameState::new(3);
        state.formation.enemies.clear();
        state
    }

    #[test]
    fn test_proximity_pair_removed_once() {
        let mut state = empty_field();
        state.projectiles.spawn_player(100.0, 100.0);
        state.projectiles.spawn_enemy(104.0, 103.0);
        let report = resolve(&mut state);
        assert!(state.projectiles.player.is_empty());
        assert!(state.projectiles.enemy.is_empty());
        assert_eq!(report.blocks_destroyed, 0);
        assert_eq!(state.barricades.block_count(), 80);
        assert!(!report.player_hit);
    }

    #[test]
    fn test_proximity_radius_is_strict() {
        let mut state = empty_field();
        state.projectiles.spawn_player(100.0, 100.0);
        state.projectiles.spawn_enemy(110.0, 100.0);
        resolve(&mut state);
        assert_eq!(state.projectiles.player.len(), 1);
        assert_eq!(state.projectiles.enemy.len(), 1);
    }

    #[test]
    fn test_proximity_picks_closest_shot() {
        let mut state = empty_field();
        state.projectiles.spawn_player(100.0, 100.0);
        state.projectiles.spawn_enemy(108.0, 100.0);
        state.projectiles.spawn_enemy(102.0, 100.0);
        resolve(&mut state);
        assert!(state.projectiles.player.is_empty());
        assert_eq!(state.projectiles.enemy.len(), 1);
        assert_eq!(state.projectiles.enemy[0].pos(), Vec2::new(108.0, 100.0));
    }

    #[test]
    fn test_virus_reaching_player_hits_and_detonates() {
        let mut state = empty_field();
        state.boss_fight = true;
        let center = state.player.center();
        state.projectiles.spawn_virus(Virus {
            pos: center,
            vel: Vec2::new(0.0, 4.0),
            origin: center - Vec2::new(0.0, 100.0),
            explode_dist: 600.0,
        });
        let report = resolve(&mut state);
        assert!(report.player_hit);
        assert_eq!(report.detonations, vec![center]);
        assert_eq!(state.projectiles.boss.len(), BURST_COUNT);
        assert!(
            state
                .projectiles
                .boss
                .iter()
                .all(|p| !p.is_virus() && p.pos() == center)
        );
    }

    #[test]
    fn test_enemy_shot_hits_player() {
        let mut state = empty_field();
        let center = state.player.center();
        state.projectiles.spawn_enemy(center.x, center.y);
        let report = resolve(&mut state);
        assert!(report.player_hit);
        assert!(state.projectiles.enemy.is_empty());
    }

    #[test]
    fn test_shield_consumes_projectile_without_hit() {
        let mut state = empty_field();
        state.player.invulnerable = true;
        let center = state.player.center();
        state.projectiles.spawn_enemy(center.x, center.y);
        let report = resolve(&mut state);
        assert!(!report.player_hit);
        assert_eq!(report.shielded_hits, 1);
        assert!(state.projectiles.enemy.is_empty());
    }

    #[test]
    fn test_boss_shots_ignored_outside_boss_fight() {
        let mut state = empty_field();
        let center = state.player.center();
        state.projectiles.spawn_boss(center.x, center.y, 0.0, 3.0);
        let report = resolve(&mut state);
        assert!(!report.player_hit);
        assert_eq!(state.projectiles.boss.len(), 1);

        state.boss_fight = true;
        let report = resolve(&mut state);
        assert!(report.player_hit);
        assert!(state.projectiles.boss.is_empty());
    }

    #[test]
    fn test_player_shot_destroys_one_enemy() {
        let mut state = GameState::new(3);
        let before = state.formation.enemies.len();
        // Two shots inside the same enemy: only one may claim it
        state.projectiles.spawn_player(70.0, 70.0);
        state.projectiles.spawn_player(72.0, 70.0);
        let report = resolve(&mut state);
        assert_eq!(report.enemies_destroyed, vec![Vec2::new(50.0, 50.0)]);
        assert_eq!(state.formation.enemies.len(), before - 1);
        assert_eq!(state.projectiles.player.len(), 1);
    }

    #[test]
    fn test_player_shot_damages_boss() {
        let mut state = empty_field();
        state.boss_fight = true;
        let center = state.boss.center();
        state.projectiles.spawn_player(center.x, center.y);
        let report = resolve(&mut state);
        assert_eq!(report.boss_hits, 1);
        assert!(state.projectiles.player.is_empty());

        state.boss.defeated = true;
        state.projectiles.spawn_player(center.x, center.y);
        assert_eq!(resolve(&mut state).boss_hits, 0);
    }

    #[test]
    fn test_barricade_rules() {
        let mut state = empty_field();
        // Enemy shot centre lands inside block (325, 480)
        state.projectiles.spawn_enemy(327.0, 481.0);
        // Player shot is absorbed by block (340, 480) without breaking it
        state.projectiles.spawn_player(345.0, 485.0);
        let report = resolve(&mut state);
        assert_eq!(report.blocks_destroyed, 1);
        assert_eq!(state.barricades.block_count(), 79);
        assert!(state.projectiles.enemy.is_empty());
        assert!(state.projectiles.player.is_empty());
        assert!(state.barricades.hit_test(Vec2::new(345.0, 485.0)).is_some());
    }

    #[test]
    fn test_hit_virus_detonates() {
        let mut state = empty_field();
        state.boss_fight = true;
        state.projectiles.spawn_virus(Virus {
            pos: Vec2::new(300.0, 300.0),
            vel: Vec2::new(0.0, 4.0),
            origin: Vec2::new(300.0, 250.0),
            explode_dist: 600.0,
        });
        state.projectiles.spawn_player(303.0, 303.0);
        let report = resolve(&mut state);
        assert_eq!(report.detonations, vec![Vec2::new(300.0, 300.0)]);
        assert!(state.projectiles.player.is_empty());
        assert_eq!(state.projectiles.boss.len(), BURST_COUNT);
        assert!(state.projectiles.boss.iter().all(|p| !p.is_virus()));
    }
}
