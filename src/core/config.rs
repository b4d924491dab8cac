//! Combat tuning with documented constants
//!
//! Every magic number used by the turn, movement, resolution and threat
//! systems lives here. Systems receive a `CombatConfig` (or the pieces they
//! need) through their constructors.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CombatError, Result};

/// Configuration for the combat engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === ACTION ECONOMY ===
    /// Movement budget used when a squad has no living unit to derive it from
    pub default_movement_speed: u32,

    /// Attack range used when a squad has no living unit to derive it from
    pub default_attack_range: u32,

    // === FACTIONS ===
    /// Mana every faction starts a combat with
    pub starting_mana: u32,

    /// Mana ceiling for restore operations
    pub max_mana: u32,

    // === ATTACK RESOLUTION ===
    /// Hit chance (d100 threshold) before accuracy and armor are applied
    pub base_hit_chance: i32,

    /// Floor of the hit threshold after modifiers
    ///
    /// Keeps a heavily armored target from becoming unhittable.
    pub min_hit_chance: i32,

    /// Ceiling of the hit threshold after modifiers
    pub max_hit_chance: i32,

    /// Damage multiplier applied on a critical hit. Must not be 1.0.
    pub crit_multiplier: f32,

    /// Largest share of post-resistance damage that stacked cover may absorb
    pub max_cover: f32,

    // === THREAT OVERLAY ===
    /// Upper bounds of the first three severity tiers; anything above the
    /// last one lands in the top tier
    pub danger_thresholds: [f32; 3],

    /// Overlay opacity per severity tier, lowest first
    pub overlay_opacities: [f32; 4],

    /// Side length of the square viewport the overlay recomputes
    pub viewport_size: u32,

    pub threat: ThreatTuning,
}

/// Weights used by the danger heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatTuning {
    pub dps_multiplier: f32,
    pub tank_multiplier: f32,
    pub support_multiplier: f32,

    /// Applied to units flagged as squad leaders
    pub leader_bonus: f32,

    /// Indexed by number of distinct attack patterns in the squad, minus one
    ///
    /// Mono-pattern squads are easy to counter, mixed squads are not.
    pub composition_multipliers: [f32; 4],
}

impl Default for ThreatTuning {
    fn default() -> Self {
        Self {
            dps_multiplier: 1.5,
            tank_multiplier: 1.2,
            support_multiplier: 1.0,
            leader_bonus: 1.3,
            composition_multipliers: [0.8, 1.1, 1.2, 1.3],
        }
    }
}

impl ThreatTuning {
    pub fn composition_multiplier(&self, distinct_patterns: usize) -> f32 {
        match distinct_patterns {
            0 => 1.0,
            n => self.composition_multipliers[(n - 1).min(3)],
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            default_movement_speed: 3,
            default_attack_range: 1,
            starting_mana: 100,
            max_mana: 100,
            base_hit_chance: 75,
            min_hit_chance: 5,
            max_hit_chance: 95,
            crit_multiplier: 1.5,
            max_cover: 1.0,
            danger_thresholds: [50.0, 100.0, 150.0],
            overlay_opacities: [0.2, 0.5, 0.7, 0.9],
            viewport_size: 30,
            threat: ThreatTuning::default(),
        }
    }
}

impl CombatConfig {
    /// Create config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML file; missing keys fall back to defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: CombatConfig = toml::from_str(&contents)?;
        config.validate().map_err(CombatError::Config)?;
        Ok(config)
    }

    /// Validate that configuration values are internally consistent
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_hit_chance > self.max_hit_chance {
            return Err(format!(
                "min_hit_chance ({}) should be <= max_hit_chance ({})",
                self.min_hit_chance, self.max_hit_chance
            ));
        }

        if (self.crit_multiplier - 1.0).abs() < f32::EPSILON || self.crit_multiplier <= 0.0 {
            return Err(format!(
                "crit_multiplier ({}) must be positive and not 1.0",
                self.crit_multiplier
            ));
        }

        if self.max_cover <= 0.0 || self.max_cover > 1.0 {
            return Err(format!("max_cover ({}) must be in (0, 1]", self.max_cover));
        }

        // Thresholds should be ordered
        let [low, mid, high] = self.danger_thresholds;
        if !(low < mid && mid < high) {
            return Err(format!(
                "danger_thresholds must be strictly increasing, got {:?}",
                self.danger_thresholds
            ));
        }

        if self.starting_mana > self.max_mana {
            return Err(format!(
                "starting_mana ({}) should be <= max_mana ({})",
                self.starting_mana, self.max_mana
            ));
        }

        if self.default_movement_speed == 0 || self.viewport_size == 0 {
            return Err("default_movement_speed and viewport_size must be positive".into());
        }

        Ok(())
    }
}
