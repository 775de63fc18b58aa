//! Save/load persistence
//!
//! Features:
//! - Snapshot of the full simulation (collections, cooldowns, RNG stream)
//! - Versioned JSON envelope
//! - Three named save slots
//! - Missing, corrupt, outdated and impossible saves reported distinctly
//!
//! Where the text is stored (file, browser storage) belongs to the caller.

pub mod envelope;
pub mod error;
pub mod snapshot;

pub use envelope::{SAVE_SLOT_COUNT, SAVE_VERSION, SaveEnvelope, SaveSlots, SlotSummary};
pub use error::LoadError;
pub use snapshot::Snapshot;

use crate::sim::GameState;

/// Capture `state` into a named envelope ready to serialize
pub fn save_game(state: &GameState, now: f64, name: &str) -> SaveEnvelope {
    SaveEnvelope::new(name, Snapshot::capture(state, now))
}

/// Parse stored save text and rebuild the game at clock reading `now`
pub fn load_game(json: Option<&str>, now: f64) -> Result<GameState, LoadError> {
    let result = SaveEnvelope::from_json(json).and_then(|envelope| envelope.snapshot.restore(now));
    if let Err(err) = &result {
        match err {
            LoadError::NoSave => log::info!("No saved game to load"),
            _ => log::warn!("Failed to load saved game: {}", err),
        }
    }
    result
}
