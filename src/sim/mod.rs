//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clock injected by the caller, never read from the system
//! - Seeded RNG only
//! - Stable iteration order (collection order, removals applied after each pass)
//! - No rendering, audio or platform dependencies

pub mod barricade;
pub mod boss;
pub mod collision;
pub mod formation;
pub mod hooks;
pub mod powerup;
pub mod projectile;
pub mod state;
pub mod tick;

pub use barricade::{Barricade, BarricadeField, Block};
pub use boss::{Boss, BossContext, Phase};
pub use collision::{CollisionReport, CollisionScene, resolve_collisions};
pub use formation::{Enemy, EnemyFormation, FormationStatus};
pub use hooks::GameHooks;
pub use powerup::{ActivePowerUp, PowerUpDirector, PowerUpKind};
pub use projectile::{
    BURST_COUNT, Kinetic, Owner, PlayerWeapon, Projectile, ProjectileStore, ProjectileView, Virus,
};
pub use state::{GameEvent, GameState, Player};
pub use tick::{TickInput, tick};
