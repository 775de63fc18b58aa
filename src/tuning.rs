//! Game balance tuning
//!
//! Every gameplay constant lives here so balance can be tweaked from JSON
//! without touching simulation code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Why a tuning sheet was rejected
#[derive(Debug)]
pub enum TuningError {
    /// Not valid JSON for the tuning schema
    Parse(serde_json::Error),
    /// Parsed, but a value would break the simulation
    Invalid(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(err) => write!(f, "tuning is not valid JSON: {}", err),
            TuningError::Invalid(reason) => write!(f, "tuning is invalid: {}", reason),
        }
    }
}

impl std::error::Error for TuningError {}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        TuningError::Parse(err)
    }
}

fn positive(v: impl Into<f64>) -> bool {
    let v = v.into();
    v.is_finite() && v > 0.0
}

fn non_negative(v: impl Into<f64>) -> bool {
    let v = v.into();
    v.is_finite() && v >= 0.0
}

fn finite(v: impl Into<f64>) -> bool {
    v.into().is_finite()
}

fn require(ok: bool, what: &str) -> Result<(), TuningError> {
    if ok {
        Ok(())
    } else {
        Err(TuningError::Invalid(what.to_string()))
    }
}

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier applied to enemy firing probability
    pub fn fire_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    /// Starting lives for this preset
    pub fn lives(&self) -> u8 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 3,
            Difficulty::Hard => 2,
        }
    }
}

/// Player ship tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    /// Pixels per tick
    pub speed: f32,
    pub lives: u8,
    /// Gap between ship bottom and screen bottom
    pub bottom_margin: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            speed: 5.0,
            lives: 3,
            bottom_margin: 10.0,
        }
    }
}

/// Projectile tuning (speeds in pixels per tick, times in seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub width: f32,
    pub player_length: f32,
    pub player_speed: f32,
    pub player_shoot_interval: f64,
    pub enemy_length: f32,
    pub enemy_speed: f32,
    /// Triple shot side angle (degrees from vertical)
    pub spread_deg: f32,
    /// Triple shot side horizontal offset
    pub spread_offset: f32,
    /// Proximity radius for projectile-vs-projectile hits
    pub collision_radius: f32,
    pub laser_length: f32,
    pub laser_speed: f32,
    pub laser_shoot_interval: f64,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            width: 5.0,
            player_length: 10.0,
            player_speed: 7.0,
            player_shoot_interval: 0.2,
            enemy_length: 10.0,
            enemy_speed: 5.0,
            spread_deg: 20.0,
            spread_offset: 10.0,
            collision_radius: 10.0,
            laser_length: 30.0,
            laser_speed: 35.0,
            laser_shoot_interval: 0.005,
        }
    }
}

/// Enemy formation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationTuning {
    pub rows: u32,
    pub cols: u32,
    pub enemy_size: f32,
    pub spacing: f32,
    pub origin: f32,
    pub speed: f32,
    pub shoot_prob: f32,
    pub descend_step: f32,
    pub speed_step: f32,
    pub shoot_prob_step: f32,
    /// Levels before the boss fight
    pub total_levels: u32,
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 10,
            enemy_size: 40.0,
            spacing: 10.0,
            origin: 50.0,
            speed: 2.0,
            shoot_prob: 0.003,
            descend_step: 20.0,
            speed_step: 0.5,
            shoot_prob_step: 0.001,
            total_levels: 4,
        }
    }
}

/// Barricade tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarricadeTuning {
    pub count: usize,
    pub rows: u32,
    pub cols: u32,
    pub block_width: f32,
    pub block_height: f32,
    /// Distance from screen bottom to the barricade top edge
    pub bottom_offset: f32,
}

impl Default for BarricadeTuning {
    fn default() -> Self {
        Self {
            count: 2,
            rows: 4,
            cols: 10,
            block_width: 15.0,
            block_height: 10.0,
            bottom_offset: 120.0,
        }
    }
}

/// Power-up tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub spawn_interval: f64,
    pub duration: f64,
    /// Pixels per tick
    pub fall_speed: f32,
    /// Pickup diameter (spawn x range is shrunk by this)
    pub pickup_size: f32,
    pub score_bonus: i64,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            spawn_interval: 15.0,
            duration: 5.0,
            fall_speed: 2.0,
            pickup_size: 20.0,
            score_bonus: 250,
        }
    }
}

/// Boss tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub width: f32,
    pub height: f32,
    pub start_y: f32,
    pub max_health: i32,
    pub margin: f32,
    /// Base movement speed per phase (P4 is time-parameterized and ignores it)
    pub phase_speeds: [f32; 5],
    /// Seconds between shots per phase
    pub shoot_intervals: [f64; 5],
    pub shot_speed: f32,
    /// P3 aim divisor: velocity = (player - boss) / divisor
    pub aim_divisor: f32,
    pub aim_jitter: f32,
    pub oscillation_base_y: f32,
    pub oscillation_amplitude: f32,
    pub zigzag_period: f64,
    pub zigzag_min_y: f32,
    pub zigzag_max_y: f32,
    pub homing_gain: f32,
    pub retarget_interval: f64,
    pub virus_speed: f32,
    pub virus_min_explode_dist: f32,
    pub virus_max_explode_dist: f32,
    pub virus_player_threshold: f32,
    pub virus_floor_y: f32,
    pub virus_burst_speed: f32,
    pub rage_speed_mult: f32,
    pub rage_interval_mult: f64,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 150.0,
            start_y: 100.0,
            max_health: 100,
            margin: 50.0,
            phase_speeds: [6.0, 3.0, 5.0, 3.0, 3.0],
            shoot_intervals: [0.15, 0.1, 0.5, 0.07, 1.0],
            shot_speed: 3.0,
            aim_divisor: 50.0,
            aim_jitter: 0.02,
            oscillation_base_y: 100.0,
            oscillation_amplitude: 20.0,
            zigzag_period: 3.0,
            zigzag_min_y: 50.0,
            zigzag_max_y: 150.0,
            homing_gain: 0.05,
            retarget_interval: 2.0,
            virus_speed: 4.0,
            virus_min_explode_dist: 300.0,
            virus_max_explode_dist: 700.0,
            virus_player_threshold: 250.0,
            virus_floor_y: 500.0,
            virus_burst_speed: 4.0,
            rage_speed_mult: 1.5,
            rage_interval_mult: 0.5,
        }
    }
}

/// Score tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTuning {
    pub start: i64,
    /// Points lost per full second of play
    pub drain_per_second: i64,
    pub hit_penalty: i64,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            start: 5000,
            drain_per_second: 25,
            hit_penalty: 250,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub formation: FormationTuning,
    pub barricade: BarricadeTuning,
    pub powerup: PowerUpTuning,
    pub boss: BossTuning,
    pub score: ScoreTuning,
}

impl Tuning {
    /// Create tuning from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Apply a difficulty preset on top of the current values
    pub fn apply_preset(&mut self, preset: Difficulty) {
        self.difficulty = preset;
        self.player.lives = preset.lives();
        self.formation.shoot_prob = FormationTuning::default().shoot_prob * preset.fire_scale();
    }

    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning ({} preset)", tuning.difficulty.as_str());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with (empty sampling
    /// ranges, inverted bounds, zero counts or durations)
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.player;
        require(positive(p.width) && p.width <= SCREEN_WIDTH, "player width")?;
        require(positive(p.height) && p.height <= SCREEN_HEIGHT, "player height")?;
        require(non_negative(p.speed), "player speed")?;
        require(p.lives > 0, "player lives")?;
        require(finite(p.bottom_margin), "player bottom margin")?;

        let pr = &self.projectile;
        require(
            [pr.width, pr.player_length, pr.enemy_length, pr.laser_length]
                .iter()
                .all(|&v| positive(v)),
            "projectile size",
        )?;
        require(
            [pr.player_speed, pr.enemy_speed, pr.laser_speed]
                .iter()
                .all(|&v| positive(v)),
            "projectile speed",
        )?;
        require(
            positive(pr.player_shoot_interval) && positive(pr.laser_shoot_interval),
            "player shoot interval",
        )?;
        require(
            finite(pr.spread_deg) && finite(pr.spread_offset),
            "triple shot spread",
        )?;
        require(non_negative(pr.collision_radius), "collision radius")?;

        let f = &self.formation;
        require(f.rows > 0 && f.cols > 0, "formation grid")?;
        require(f.total_levels > 0, "total levels")?;
        require(positive(f.enemy_size), "enemy size")?;
        require(
            [f.spacing, f.origin, f.speed, f.descend_step, f.speed_step, f.shoot_prob_step]
                .iter()
                .all(|&v| finite(v)),
            "formation motion",
        )?;
        require((0.0..=1.0).contains(&f.shoot_prob), "formation shoot probability")?;

        let b = &self.barricade;
        require(b.rows > 0 && b.cols > 0, "barricade grid")?;
        require(
            positive(b.block_width) && positive(b.block_height),
            "barricade block size",
        )?;
        require(finite(b.bottom_offset), "barricade offset")?;

        let pu = &self.powerup;
        require(positive(pu.spawn_interval), "power-up spawn interval")?;
        require(positive(pu.duration), "power-up duration")?;
        require(finite(pu.fall_speed), "power-up fall speed")?;
        require(
            non_negative(pu.pickup_size) && pu.pickup_size <= SCREEN_WIDTH,
            "power-up pickup size",
        )?;

        let boss = &self.boss;
        require(positive(boss.width) && positive(boss.height), "boss size")?;
        require(boss.max_health > 0, "boss max health")?;
        require(
            non_negative(boss.margin)
                && boss.margin <= SCREEN_WIDTH - boss.width - boss.margin
                && boss.margin <= SCREEN_HEIGHT / 3.0,
            "boss margin leaves no room to move",
        )?;
        require(finite(boss.start_y), "boss start y")?;
        require(
            boss.phase_speeds.iter().all(|&v| non_negative(v)),
            "boss phase speeds",
        )?;
        require(
            boss.shoot_intervals.iter().all(|&v| positive(v)),
            "boss shoot intervals",
        )?;
        require(positive(boss.shot_speed), "boss shot speed")?;
        require(positive(boss.aim_divisor), "boss aim divisor")?;
        require(non_negative(boss.aim_jitter), "boss aim jitter")?;
        require(
            finite(boss.oscillation_base_y) && finite(boss.oscillation_amplitude),
            "boss oscillation",
        )?;
        require(positive(boss.zigzag_period), "boss zigzag period")?;
        require(
            finite(boss.zigzag_min_y)
                && finite(boss.zigzag_max_y)
                && boss.zigzag_min_y <= boss.zigzag_max_y,
            "boss zigzag band",
        )?;
        require(finite(boss.homing_gain), "boss homing gain")?;
        require(non_negative(boss.retarget_interval), "boss retarget interval")?;
        require(positive(boss.virus_speed), "virus speed")?;
        require(
            positive(boss.virus_min_explode_dist)
                && finite(boss.virus_max_explode_dist)
                && boss.virus_min_explode_dist < boss.virus_max_explode_dist,
            "virus explode distance range",
        )?;
        require(
            non_negative(boss.virus_player_threshold)
                && finite(boss.virus_floor_y)
                && positive(boss.virus_burst_speed),
            "virus detonation",
        )?;
        require(
            positive(boss.rage_speed_mult) && positive(boss.rage_interval_mult),
            "boss rage multipliers",
        )?;

        let sc = &self.score;
        require(
            sc.start >= 0 && sc.drain_per_second >= 0 && sc.hit_penalty >= 0,
            "score values",
        )?;
        Ok(())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "boss": { "max_health": 40 } }"#).unwrap();
        assert_eq!(tuning.boss.max_health, 40);
        assert_eq!(tuning.boss.shoot_intervals, [0.15, 0.1, 0.5, 0.07, 1.0]);
        assert_eq!(tuning.formation.rows, 5);
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert!(Tuning::from_preset(preset).validate().is_ok());
        }
    }

    #[test]
    fn test_rejects_unusable_values() {
        let collapsed = r#"{ "boss": { "virus_min_explode_dist": 500, "virus_max_explode_dist": 500 } }"#;
        assert!(matches!(
            Tuning::from_json(collapsed),
            Err(TuningError::Invalid(_))
        ));

        let mut tuning = Tuning::default();
        tuning.boss.margin = 600.0;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.powerup.pickup_size = SCREEN_WIDTH + 1.0;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.boss.shoot_intervals[3] = 0.0;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.formation.rows = 0;
        assert!(tuning.validate().is_err());

        assert!(matches!(
            Tuning::from_json("{ nope"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_preset_round_trip() {
        let tuning = Tuning::from_preset(Difficulty::Hard);
        assert_eq!(tuning.player.lives, 2);
        let parsed = Tuning::from_json(&tuning.to_json()).unwrap();
        assert_eq!(parsed.difficulty, Difficulty::Hard);
        assert_eq!(Difficulty::parse("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("nightmare"), None);
    }
}
