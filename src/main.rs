//! Firewall Siege entry point
//!
//! Headless runner: plays a seeded fight with a simple autopilot, saves it
//! mid-run, restores the save and checks both copies stay in lockstep.
//!
//! Usage: `firewall-siege [seed] [easy|normal|hard] [ticks] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
use firewall_siege::{
    Difficulty, Tuning,
    consts::SIM_DT,
    persistence::{SaveSlots, load_game, save_game},
    sim::{GameEvent, GameState, TickInput, tick},
};

/// Steer toward the closest target overhead and keep firing
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &GameState) -> TickInput {
    let me = state.player.center().x;
    let target = if state.boss_fight {
        Some(state.boss.center().x)
    } else {
        let size = state.formation.enemy_size().x;
        state
            .formation
            .enemies
            .iter()
            .map(|e| e.pos.x + size / 2.0)
            .min_by(|a, b| (a - me).abs().total_cmp(&(b - me).abs()))
    };
    let move_dir = target.map_or(0.0, |x| ((x - me) / state.player.speed).clamp(-1.0, 1.0));
    TickInput {
        move_dir,
        fire: true,
        pause: false,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(difficulty: Difficulty, path: Option<&String>) -> Tuning {
    let Some(path) = path else {
        return Tuning::from_preset(difficulty);
    };
    match std::fs::read_to_string(path).map(|json| Tuning::from_json(&json)) {
        Ok(Ok(mut tuning)) => {
            tuning.apply_preset(difficulty);
            tuning
        }
        Ok(Err(e)) => {
            log::warn!("Ignoring tuning file {}: {}", path, e);
            Tuning::from_preset(difficulty)
        }
        Err(e) => {
            log::warn!("Cannot read tuning file {}: {}", path, e);
            Tuning::from_preset(difficulty)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args.first().and_then(|s| s.parse().ok()).unwrap_or(42);
    let difficulty = args
        .get(1)
        .and_then(|s| Difficulty::parse(s))
        .unwrap_or_default();
    let ticks: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(60 * 120);
    let tuning = load_tuning(difficulty, args.get(3));

    log::info!("Firewall Siege (headless) starting...");
    let mut state = GameState::with_tuning(seed, tuning);
    let mut minigame = || {
        // Headless hosts cannot play the minigame
        log::info!("Minigame skipped, boss enrages");
        false
    };

    let save_at = ticks / 2;
    let mut slots = SaveSlots::new();
    let mut mirror: Option<GameState> = None;
    let mut destroyed = 0usize;

    for i in 0..ticks {
        let now = i as f64 * SIM_DT;
        if i == save_at {
            let saved = save_game(&state, now, "halfway");
            match saved.to_json() {
                Ok(json) => {
                    log::info!("Snapshot at tick {} is {} bytes", i, json.len());
                    mirror = load_game(Some(&json), now).ok();
                }
                Err(e) => log::warn!("Could not serialize snapshot: {}", e),
            }
            if let Err(e) = slots.store(1, saved) {
                log::warn!("{}", e);
            }
        }

        let input = autopilot(&state);
        tick(&mut state, &input, now, &mut minigame);
        if let Some(mirror) = mirror.as_mut() {
            tick(mirror, &input, now, &mut minigame);
            mirror.drain_events();
        }

        for event in state.drain_events() {
            match event {
                GameEvent::EnemyDestroyed { .. } => destroyed += 1,
                GameEvent::LevelComplete { level } => println!("Level {} complete", level),
                GameEvent::BossFightStarted => println!("Boss fight!"),
                GameEvent::BossPhaseChanged { phase } => println!("Boss phase {}", phase),
                GameEvent::PlayerHit => println!("Hit! {} lives left", state.player.lives),
                GameEvent::BossDefeated => println!("Boss defeated"),
                GameEvent::GameOver => println!("Game over"),
                _ => {}
            }
        }
        if state.is_finished() {
            break;
        }
    }

    println!(
        "Finished: level {}, boss fight {}, score {}, enemies destroyed {}, ticks {}",
        state.level, state.boss_fight, state.score, destroyed, state.time_ticks
    );
    for summary in slots.summaries() {
        println!(
            "Slot {}: '{}' level {} score {}",
            summary.slot, summary.name, summary.level, summary.score
        );
    }
    if let Some(mirror) = mirror {
        let in_step = mirror.projectiles.player == state.projectiles.player
            && mirror.formation.enemies == state.formation.enemies
            && mirror.score == state.score
            && mirror.rng == state.rng;
        println!("Restored copy in lockstep: {}", in_step);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on the web; the host page drives `tick`
}
