//! Projectile store
//!
//! Three independently addressed collections (player, enemy, boss). Boss
//! projectiles mix plain kinetic shots with virus shots that detonate into a
//! ring of kinetic shots.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::elapsed_at_least;
use crate::tuning::{BossTuning, ProjectileTuning};

/// Number of kinetic shots released by a virus detonation
pub const BURST_COUNT: usize = 8;

/// Which collection a projectile lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
    Boss,
}

/// A plain projectile moving at constant velocity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kinetic {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Extent along the direction of travel
    pub length: f32,
    pub width: f32,
    pub owner: Owner,
}

impl Kinetic {
    /// Leading point of the projectile (tail is `pos`)
    pub fn tip(&self) -> Vec2 {
        let dir = self.vel.normalize_or_zero();
        self.pos + dir * self.length
    }
}

/// A boss projectile that detonates after travelling a sampled distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Virus {
    pub pos: Vec2,
    pub vel: Vec2,
    pub origin: Vec2,
    /// Distance from `origin` at which the virus detonates (sampled at spawn)
    pub explode_dist: f32,
}

impl Virus {
    pub fn traveled(&self) -> f32 {
        self.pos.distance(self.origin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projectile {
    Kinetic(Kinetic),
    Virus(Virus),
}

impl Projectile {
    pub fn pos(&self) -> Vec2 {
        match self {
            Projectile::Kinetic(k) => k.pos,
            Projectile::Virus(v) => v.pos,
        }
    }

    pub fn vel(&self) -> Vec2 {
        match self {
            Projectile::Kinetic(k) => k.vel,
            Projectile::Virus(v) => v.vel,
        }
    }

    pub fn owner(&self) -> Owner {
        match self {
            Projectile::Kinetic(k) => k.owner,
            Projectile::Virus(_) => Owner::Boss,
        }
    }

    pub fn is_virus(&self) -> bool {
        matches!(self, Projectile::Virus(_))
    }

    /// All numeric fields are finite (anything else is a malformed record)
    pub fn is_well_formed(&self) -> bool {
        match self {
            Projectile::Kinetic(k) => {
                k.pos.is_finite() && k.vel.is_finite() && k.length.is_finite() && k.width.is_finite()
            }
            Projectile::Virus(v) => {
                v.pos.is_finite()
                    && v.vel.is_finite()
                    && v.origin.is_finite()
                    && v.explode_dist.is_finite()
            }
        }
    }

    fn step(&mut self) {
        match self {
            Projectile::Kinetic(k) => k.pos += k.vel,
            Projectile::Virus(v) => v.pos += v.vel,
        }
    }
}

/// Ring of kinetic boss shots at 45° increments around `pos`
pub fn virus_burst(pos: Vec2, speed: f32, length: f32, width: f32) -> Vec<Projectile> {
    (0..BURST_COUNT)
        .map(|i| {
            let angle = (i as f32) * std::f32::consts::TAU / BURST_COUNT as f32;
            Projectile::Kinetic(Kinetic {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                length,
                width,
                owner: Owner::Boss,
            })
        })
        .collect()
}

/// Player weapon parameters (modified by power-ups)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWeapon {
    pub length: f32,
    pub speed: f32,
    pub shoot_interval: f64,
    pub triple_shot: bool,
}

impl PlayerWeapon {
    pub fn standard(tuning: &ProjectileTuning) -> Self {
        Self {
            length: tuning.player_length,
            speed: tuning.player_speed,
            shoot_interval: tuning.player_shoot_interval,
            triple_shot: false,
        }
    }
}

/// Virus detonation rules, evaluated every tick while advancing boss shots
#[derive(Debug, Clone, Copy)]
pub struct VirusRules {
    pub player_center: Vec2,
    pub player_threshold: f32,
    pub floor_y: f32,
    pub burst_speed: f32,
}

impl VirusRules {
    pub fn new(tuning: &BossTuning, player_center: Vec2) -> Self {
        Self {
            player_center,
            player_threshold: tuning.virus_player_threshold,
            floor_y: tuning.virus_floor_y,
            burst_speed: tuning.virus_burst_speed,
        }
    }

    fn should_detonate(&self, virus: &Virus) -> bool {
        virus.traveled() >= virus.explode_dist
            || virus.pos.distance(self.player_center) < self.player_threshold
            || virus.pos.y >= self.floor_y
    }
}

/// Read-only view of a projectile for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileView {
    pub owner: Owner,
    pub virus: bool,
    pub pos: Vec2,
    /// Heading in radians (atan2 of velocity)
    pub angle: f32,
    pub length: f32,
    pub width: f32,
}

/// Owns every live projectile
#[derive(Debug, Clone)]
pub struct ProjectileStore {
    pub player: Vec<Projectile>,
    pub enemy: Vec<Projectile>,
    pub boss: Vec<Projectile>,
    pub weapon: PlayerWeapon,
    /// Time of the last accepted player shot
    pub last_player_shot: Option<f64>,
    tuning: ProjectileTuning,
}

impl ProjectileStore {
    pub fn new(tuning: &ProjectileTuning) -> Self {
        Self {
            player: Vec::new(),
            enemy: Vec::new(),
            boss: Vec::new(),
            weapon: PlayerWeapon::standard(tuning),
            last_player_shot: None,
            tuning: tuning.clone(),
        }
    }

    pub fn tuning(&self) -> &ProjectileTuning {
        &self.tuning
    }

    pub fn collection(&self, owner: Owner) -> &Vec<Projectile> {
        match owner {
            Owner::Player => &self.player,
            Owner::Enemy => &self.enemy,
            Owner::Boss => &self.boss,
        }
    }

    pub fn collection_mut(&mut self, owner: Owner) -> &mut Vec<Projectile> {
        match owner {
            Owner::Player => &mut self.player,
            Owner::Enemy => &mut self.enemy,
            Owner::Boss => &mut self.boss,
        }
    }

    pub fn len(&self) -> usize {
        self.player.len() + self.enemy.len() + self.boss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.player.clear();
        self.enemy.clear();
        self.boss.clear();
    }

    /// Spawn player shots at the muzzle; returns how many were created
    pub fn spawn_player(&mut self, x: f32, y: f32) -> usize {
        if !x.is_finite() || !y.is_finite() {
            log::debug!("Rejected player spawn at ({x}, {y})");
            return 0;
        }
        let spread = self.tuning.spread_deg.to_radians();
        let offset = self.tuning.spread_offset;
        let shots = if self.weapon.triple_shot {
            vec![(0.0, 0.0), (-offset, -spread), (offset, spread)]
        } else {
            vec![(0.0, 0.0)]
        };
        for &(dx, angle) in &shots {
            // Angle is measured from straight up
            let vel = Vec2::new(angle.sin(), -angle.cos()) * self.weapon.speed;
            self.player.push(Projectile::Kinetic(Kinetic {
                pos: Vec2::new(x + dx, y),
                vel,
                length: self.weapon.length,
                width: self.tuning.width,
                owner: Owner::Player,
            }));
        }
        shots.len()
    }

    /// Fire if the weapon cooldown has elapsed
    pub fn try_fire_player(&mut self, now: f64, muzzle: Vec2) -> usize {
        if let Some(last) = self.last_player_shot {
            if !elapsed_at_least(now, last, self.weapon.shoot_interval) {
                return 0;
            }
        }
        let fired = self.spawn_player(muzzle.x, muzzle.y);
        if fired > 0 {
            self.last_player_shot = Some(now);
        }
        fired
    }

    pub fn spawn_enemy(&mut self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            log::debug!("Rejected enemy spawn at ({x}, {y})");
            return false;
        }
        self.enemy.push(Projectile::Kinetic(Kinetic {
            pos: Vec2::new(x, y),
            vel: Vec2::new(0.0, self.tuning.enemy_speed),
            length: self.tuning.enemy_length,
            width: self.tuning.width,
            owner: Owner::Enemy,
        }));
        true
    }

    /// Spawn a kinetic boss shot; non-finite components are rejected silently
    pub fn spawn_boss(&mut self, x: f32, y: f32, dx: f32, dy: f32) -> bool {
        if ![x, y, dx, dy].iter().all(|v| v.is_finite()) {
            log::debug!("Rejected boss spawn ({x}, {y}, {dx}, {dy})");
            return false;
        }
        self.boss.push(Projectile::Kinetic(Kinetic {
            pos: Vec2::new(x, y),
            vel: Vec2::new(dx, dy),
            length: self.tuning.enemy_length,
            width: self.tuning.width,
            owner: Owner::Boss,
        }));
        true
    }

    pub fn spawn_virus(&mut self, virus: Virus) -> bool {
        let projectile = Projectile::Virus(virus);
        if !projectile.is_well_formed() {
            log::debug!("Rejected malformed virus spawn");
            return false;
        }
        self.boss.push(projectile);
        true
    }

    /// Replace a virus with its kinetic ring (appended to the boss collection)
    pub fn detonate(&mut self, pos: Vec2, speed: f32) {
        let burst = virus_burst(pos, speed, self.tuning.enemy_length, self.tuning.width);
        self.boss.extend(burst);
    }

    /// Move one collection and cull what left the field.
    ///
    /// Boss virus shots that meet a detonation condition are removed and their
    /// positions returned; the caller is told where bursts were spawned.
    pub fn advance(&mut self, owner: Owner, rules: &VirusRules) -> Vec<Vec2> {
        let mut detonations = Vec::new();
        let collection = self.collection_mut(owner);
        collection.retain_mut(|p| {
            if !p.is_well_formed() {
                log::warn!("Dropping malformed {:?} projectile", owner);
                return false;
            }
            p.step();
            match p {
                Projectile::Kinetic(k) => match owner {
                    Owner::Player => k.pos.y >= 0.0 && k.pos.x >= 0.0 && k.pos.x <= SCREEN_WIDTH,
                    Owner::Enemy => k.pos.y <= SCREEN_HEIGHT,
                    Owner::Boss => {
                        let center = k.pos + Vec2::new(k.length, k.width) / 2.0;
                        center.x >= 0.0
                            && center.x <= SCREEN_WIDTH
                            && center.y >= 0.0
                            && center.y <= SCREEN_HEIGHT
                    }
                },
                Projectile::Virus(v) => {
                    if owner != Owner::Boss {
                        log::warn!("Dropping virus found in {:?} collection", owner);
                        return false;
                    }
                    if rules.should_detonate(v) {
                        detonations.push(v.pos);
                        return false;
                    }
                    true
                }
            }
        });
        for &pos in &detonations {
            self.detonate(pos, rules.burst_speed);
        }
        detonations
    }

    /// Advance all three collections in player, enemy, boss order
    pub fn advance_all(&mut self, rules: &VirusRules) -> Vec<Vec2> {
        let mut detonations = self.advance(Owner::Player, rules);
        detonations.extend(self.advance(Owner::Enemy, rules));
        detonations.extend(self.advance(Owner::Boss, rules));
        detonations
    }

    /// Everything the renderer needs to draw the projectiles
    pub fn views(&self) -> Vec<ProjectileView> {
        self.player
            .iter()
            .chain(self.enemy.iter())
            .chain(self.boss.iter())
            .map(|p| {
                let vel = p.vel();
                let (length, width) = match p {
                    Projectile::Kinetic(k) => (k.length, k.width),
                    Projectile::Virus(_) => (20.0, 20.0),
                };
                ProjectileView {
                    owner: p.owner(),
                    virus: p.is_virus(),
                    pos: p.pos(),
                    angle: vel.y.atan2(vel.x),
                    length,
                    width,
                }
            })
            .collect()
    }
}
