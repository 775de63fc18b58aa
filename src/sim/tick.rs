//! Simulation tick
//!
//! Advances the world by one step in a fixed order: player, boss or
//! formation, power-ups, projectiles, collisions. Time is injected as `now`
//! (seconds) so a run is reproducible from its seed, inputs and clock readings.

use super::boss::BossContext;
use super::collision::{CollisionScene, resolve_collisions};
use super::formation::FormationStatus;
use super::hooks::GameHooks;
use super::powerup::{PowerUpClock, PowerUpTargets};
use super::projectile::VirusRules;
use super::state::{GameEvent, GameState};
use crate::consts::TIME_EPSILON;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Horizontal movement, -1 (left) to 1 (right)
    pub move_dir: f32,
    /// Fire held this tick
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput, now: f64, hooks: &mut dyn GameHooks) {
    if input.pause && !state.is_finished() {
        toggle_pause(state, now);
    }

    if state.is_finished() {
        return;
    }

    if state.paused {
        // Only the power-up timers care about the pause window
        state.powerups.update(
            PowerUpClock {
                now,
                paused: true,
                level: state.level,
                boss_fight: state.boss_fight,
            },
            PowerUpTargets {
                projectiles: &mut state.projectiles,
                player: &mut state.player,
            },
            &mut state.rng,
            &mut state.events,
        );
        return;
    }

    state.time_ticks += 1;
    drain_score(state, now);

    // Player
    state.player.move_by(input.move_dir);
    if input.fire {
        let muzzle = state.player.muzzle();
        state.projectiles.try_fire_player(now, muzzle);
    }

    // Authoritative for the rest of the tick, even if the fight starts below
    let boss_fight = state.boss_fight;

    if boss_fight {
        let mut ctx = BossContext {
            now,
            player_center: state.player.center(),
            rng: &mut state.rng,
            projectiles: &mut state.projectiles,
            events: &mut state.events,
        };
        state.boss.update(&mut ctx, hooks);
    } else {
        match state.formation.update(&mut state.rng, &mut state.projectiles) {
            FormationStatus::Advancing => {}
            FormationStatus::Cleared => advance_level(state, now),
            FormationStatus::Breached => {
                end_run(state);
                return;
            }
        }
    }

    // Power-ups
    let collected = state.powerups.update(
        PowerUpClock {
            now,
            paused: false,
            level: state.level,
            boss_fight: state.boss_fight,
        },
        PowerUpTargets {
            projectiles: &mut state.projectiles,
            player: &mut state.player,
        },
        &mut state.rng,
        &mut state.events,
    );
    if collected.is_some() {
        state.adjust_score(state.powerups.score_bonus());
    }

    // Projectiles
    let rules = VirusRules::new(state.boss.tuning(), state.player.center());
    for pos in state.projectiles.advance_all(&rules) {
        log::debug!("Virus detonated at ({:.0}, {:.0})", pos.x, pos.y);
        state.events.push(GameEvent::VirusDetonated { pos });
    }

    // Collisions
    let report = resolve_collisions(CollisionScene {
        boss_fight,
        player: &state.player,
        boss: &state.boss,
        enemy_size: state.formation.enemy_size(),
        projectiles: &mut state.projectiles,
        enemies: &mut state.formation.enemies,
        barricades: &mut state.barricades,
        burst_speed: rules.burst_speed,
    });
    for &pos in &report.enemies_destroyed {
        state.events.push(GameEvent::EnemyDestroyed { pos });
    }
    for &pos in &report.detonations {
        state.events.push(GameEvent::VirusDetonated { pos });
    }
    if report.boss_hits > 0 {
        state.boss.apply_hit(report.boss_hits, &mut state.events);
    }
    if report.player_hit {
        hit_player(state);
    }

    if state.boss.defeated && !state.victory {
        state.victory = true;
        log::info!("Victory with score {}", state.score);
    }
}

fn toggle_pause(state: &mut GameState, now: f64) {
    state.paused = !state.paused;
    if state.paused {
        state.paused_since = Some(now);
    } else if let Some(since) = state.paused_since.take() {
        if let Some(last) = state.last_score_drain.as_mut() {
            *last += now - since;
        }
    }
    log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    state.events.push(GameEvent::PauseToggled {
        paused: state.paused,
    });
}

/// Take the per-second score drain for every full second since the last one
fn drain_score(state: &mut GameState, now: f64) {
    let Some(last) = state.last_score_drain else {
        state.last_score_drain = Some(now);
        return;
    };
    let seconds = (now - last + TIME_EPSILON).floor();
    if seconds >= 1.0 {
        state.last_score_drain = Some(last + seconds);
        state.adjust_score(-(seconds as i64) * state.tuning.score.drain_per_second);
    }
}

fn advance_level(state: &mut GameState, now: f64) {
    let cleared = state.level;
    state.events.push(GameEvent::LevelComplete { level: cleared });
    state.clear_level(now);

    if cleared >= state.tuning.formation.total_levels {
        state.boss_fight = true;
        state.boss.reset();
        log::info!("Level {cleared} cleared, boss fight started");
        state.events.push(GameEvent::BossFightStarted);
    } else {
        state.level += 1;
        state.formation.increase_difficulty();
        state.formation.reset_grid();
        log::info!("Level {cleared} cleared, starting level {}", state.level);
    }
}

fn hit_player(state: &mut GameState) {
    state.player.lives = state.player.lives.saturating_sub(1);
    state.events.push(GameEvent::PlayerHit);
    state.adjust_score(-state.tuning.score.hit_penalty);
    log::debug!("Player hit, {} lives left", state.player.lives);
    if state.player.lives == 0 {
        end_run(state);
    }
}

fn end_run(state: &mut GameState) {
    state.game_over = true;
    log::info!("Game over at level {} with score {}", state.level, state.score);
    state.events.push(GameEvent::GameOver);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.formation.shoot_prob = 0.0;
        tuning
    }

    fn run(state: &mut GameState, ticks: u64, start: f64, input: TickInput) -> f64 {
        let mut now = start;
        for _ in 0..ticks {
            tick(state, &input, now, &mut || true);
            now += SIM_DT;
        }
        now
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        let input = TickInput {
            move_dir: 0.5,
            fire: true,
            pause: false,
        };
        run(&mut a, 900, 0.0, input);
        run(&mut b, 900, 0.0, input);

        assert_eq!(a.projectiles.player, b.projectiles.player);
        assert_eq!(a.projectiles.enemy, b.projectiles.enemy);
        assert_eq!(a.formation.enemies, b.formation.enemies);
        assert_eq!(a.barricades.barricades, b.barricades.barricades);
        assert_eq!(a.score, b.score);
        assert_eq!(a.rng, b.rng);
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        let now = run(&mut state, 10, 0.0, TickInput::default());
        let enemies = state.formation.enemies.clone();
        let ticks = state.time_ticks;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, now, &mut || true);
        assert!(state.paused);
        let later = run(&mut state, 300, now, TickInput::default());
        assert_eq!(state.formation.enemies, enemies);
        assert_eq!(state.time_ticks, ticks);

        tick(&mut state, &pause, later, &mut || true);
        assert!(!state.paused);
        assert_eq!(state.time_ticks, ticks + 1);
        let toggles: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PauseToggled { .. }))
            .collect();
        assert_eq!(
            toggles,
            vec![
                GameEvent::PauseToggled { paused: true },
                GameEvent::PauseToggled { paused: false }
            ]
        );
    }

    #[test]
    fn test_score_drains_per_second() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        tick(&mut state, &TickInput::default(), 0.0, &mut || true);
        tick(&mut state, &TickInput::default(), 0.5, &mut || true);
        assert_eq!(state.score, 5000);
        tick(&mut state, &TickInput::default(), 2.25, &mut || true);
        assert_eq!(state.score, 4950);
        assert_eq!(state.last_score_drain, Some(2.0));
    }

    #[test]
    fn test_level_advance() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        state.formation.enemies.clear();
        tick(&mut state, &TickInput::default(), 0.0, &mut || true);
        assert_eq!(state.level, 2);
        assert_eq!(state.formation.enemies.len(), 50);
        assert_eq!(state.formation.speed, 2.5);
        assert!(state
            .drain_events()
            .contains(&GameEvent::LevelComplete { level: 1 }));
    }

    #[test]
    fn test_final_level_starts_boss_fight() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        state.level = 4;
        state.formation.enemies.clear();
        tick(&mut state, &TickInput::default(), 0.0, &mut || true);
        assert!(state.boss_fight);
        assert!(state.formation.enemies.is_empty());
        assert!(state.drain_events().contains(&GameEvent::BossFightStarted));

        // The boss acts from the next tick on
        tick(&mut state, &TickInput::default(), SIM_DT, &mut || true);
        assert_eq!(state.projectiles.boss.len(), 1);
    }

    #[test]
    fn test_breach_ends_run() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        state.formation.enemies[0].pos.y = SCREEN_HEIGHT - 40.0;
        tick(&mut state, &TickInput::default(), 0.0, &mut || true);
        assert!(state.game_over);
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), 1.0, &mut || true);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_player_hit_costs_life_and_score() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        state.powerups.first_level = false;
        let center = state.player.center();
        state.projectiles.spawn_enemy(center.x, center.y - 5.0);
        tick(&mut state, &TickInput::default(), 0.0, &mut || true);
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.score, 4750);
        assert!(state.drain_events().contains(&GameEvent::PlayerHit));
    }

    #[test]
    fn test_last_life_is_game_over() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        state.player.lives = 1;
        let center = state.player.center();
        state.projectiles.spawn_enemy(center.x, center.y - 5.0);
        tick(&mut state, &TickInput::default(), 0.0, &mut || true);
        assert!(state.game_over);
        assert!(state.drain_events().contains(&GameEvent::GameOver));
    }

    #[test]
    fn test_boss_defeat_is_victory() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        state.boss_fight = true;
        state.formation.enemies.clear();
        state.boss.health = 1;
        state.boss.minigame_triggered = true;
        // Shot placed so that after one step it sits inside the boss
        let center = state.boss.center();
        state.projectiles.spawn_player(center.x, center.y + 7.0);
        tick(&mut state, &TickInput::default(), 0.0, &mut || true);
        assert!(state.victory);
        let defeated = state
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::BossDefeated)
            .count();
        assert_eq!(defeated, 1);

        run(&mut state, 30, 1.0, TickInput::default());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_fire_input_spawns_from_muzzle() {
        let mut state = GameState::with_tuning(1, quiet_tuning());
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire, 0.0, &mut || true);
        assert_eq!(state.projectiles.player.len(), 1);
        // Spawned at the muzzle, then advanced once
        assert_eq!(state.projectiles.player[0].pos(), Vec2::new(600.0, 533.0));
    }
}
