//! Versioned JSON envelope and save slots

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::LoadError;
use super::snapshot::Snapshot;

/// Envelope format this build writes and reads
pub const SAVE_VERSION: u32 = 1;

/// Number of save slots offered to the player
pub const SAVE_SLOT_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    /// Player-facing label
    pub name: String,
    pub snapshot: Snapshot,
}

impl SaveEnvelope {
    pub fn new(name: impl Into<String>, snapshot: Snapshot) -> Self {
        Self {
            version: SAVE_VERSION,
            name: name.into(),
            snapshot,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse stored save text. `None` (or blank text) means nothing was saved.
    pub fn from_json(json: Option<&str>) -> Result<Self, LoadError> {
        let json = match json {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(LoadError::NoSave),
        };
        let value: Value = serde_json::from_str(json)?;
        let found = value
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| LoadError::Corrupt("save version is missing or invalid".to_string()))?;
        if found != u64::from(SAVE_VERSION) {
            return Err(LoadError::UnsupportedVersion {
                found,
                expected: SAVE_VERSION,
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Summary of one slot for a load menu
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSummary {
    pub slot: usize,
    pub name: String,
    pub level: u32,
    pub boss_fight: bool,
    pub score: i64,
}

/// Fixed set of named save slots (1-based)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveSlots {
    slots: [Option<SaveEnvelope>; SAVE_SLOT_COUNT],
}

impl SaveSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(slot: usize) -> Result<usize, LoadError> {
        if (1..=SAVE_SLOT_COUNT).contains(&slot) {
            Ok(slot - 1)
        } else {
            Err(LoadError::Invalid(format!(
                "slot {} outside 1..={}",
                slot, SAVE_SLOT_COUNT
            )))
        }
    }

    pub fn store(&mut self, slot: usize, envelope: SaveEnvelope) -> Result<(), LoadError> {
        let i = Self::index(slot)?;
        log::info!("Saved '{}' to slot {}", envelope.name, slot);
        self.slots[i] = Some(envelope);
        Ok(())
    }

    pub fn load(&self, slot: usize) -> Result<&SaveEnvelope, LoadError> {
        self.slots[Self::index(slot)?]
            .as_ref()
            .ok_or(LoadError::NoSave)
    }

    pub fn clear(&mut self, slot: usize) -> Result<(), LoadError> {
        let i = Self::index(slot)?;
        self.slots[i] = None;
        Ok(())
    }

    pub fn summaries(&self) -> Vec<SlotSummary> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, envelope)| {
                envelope.as_ref().map(|e| SlotSummary {
                    slot: i + 1,
                    name: e.name.clone(),
                    level: e.snapshot.level,
                    boss_fight: e.snapshot.boss_fight,
                    score: e.snapshot.score,
                })
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameState;

    fn envelope(name: &str) -> SaveEnvelope {
        let state = GameState::new(11);
        SaveEnvelope::new(name, Snapshot::capture(&state, 0.0))
    }

    #[test]
    fn test_missing_and_corrupt_are_distinct() {
        assert_eq!(SaveEnvelope::from_json(None).unwrap_err(), LoadError::NoSave);
        assert_eq!(
            SaveEnvelope::from_json(Some("  ")).unwrap_err(),
            LoadError::NoSave
        );
        assert!(matches!(
            SaveEnvelope::from_json(Some("{not json")),
            Err(LoadError::Corrupt(_))
        ));
        assert!(matches!(
            SaveEnvelope::from_json(Some(r#"{"name": "x"}"#)),
            Err(LoadError::Corrupt(_))
        ));
        assert!(matches!(
            SaveEnvelope::from_json(Some(r#"{"version": 1, "name": "x"}"#)),
            Err(LoadError::Corrupt(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let err = SaveEnvelope::from_json(Some(r#"{"version": 9}"#)).unwrap_err();
        assert_eq!(
            err,
            LoadError::UnsupportedVersion {
                found: 9,
                expected: SAVE_VERSION
            }
        );
    }

    #[test]
    fn test_json_round_trip() {
        let json = envelope("first").to_json().unwrap();
        let parsed = SaveEnvelope::from_json(Some(&json)).unwrap();
        assert_eq!(parsed.name, "first");
        assert_eq!(parsed.to_json().unwrap(), json);
    }

    #[test]
    fn test_slots() {
        let mut slots = SaveSlots::new();
        assert_eq!(slots.load(2).unwrap_err(), LoadError::NoSave);
        slots.store(2, envelope("mid")).unwrap();
        assert!(slots.store(4, envelope("nope")).is_err());
        assert_eq!(slots.load(2).unwrap().name, "mid");

        let parsed = SaveSlots::from_json(&slots.to_json().unwrap()).unwrap();
        let summaries = parsed.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].slot, 2);
        assert_eq!(summaries[0].score, 5000);

        slots.clear(2).unwrap();
        assert!(slots.summaries().is_empty());
    }
}
