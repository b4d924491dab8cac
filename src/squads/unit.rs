//! Individual squad members and their combat stats

use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;

/// Rows in a squad formation; row 0 faces the enemy
pub const FORMATION_ROWS: u8 = 3;
/// Columns in a squad formation
pub const FORMATION_COLS: u8 = 3;

/// Battlefield role, used for threat weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    Tank,
    Dps,
    Support,
}

/// Which defending cells a unit strikes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Every unit in the front-most occupied row
    MeleeRow,
    /// Every unit in the column across from the attacker, wrapping to the
    /// next occupied column
    MeleeColumn,
    /// Every unit in the attacker's own row, else the softest single target
    Ranged,
    /// Fixed cells, no pierce-through; resisted by magic resistance
    Magic { cells: Vec<FormationSlot> },
}

impl AttackPattern {
    pub fn label(&self) -> &'static str {
        match self {
            AttackPattern::MeleeRow => "melee-row",
            AttackPattern::MeleeColumn => "melee-column",
            AttackPattern::Ranged => "ranged",
            AttackPattern::Magic { .. } => "magic",
        }
    }

    pub fn is_magic(&self) -> bool {
        matches!(self, AttackPattern::Magic { .. })
    }
}

/// Cell inside the 3x3 squad formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormationSlot {
    pub row: u8,
    pub col: u8,
}

impl FormationSlot {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Static combat numbers for a unit
///
/// Chances are d100 thresholds (0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitStats {
    pub max_hp: u32,
    pub accuracy: i32,
    pub armor: i32,
    pub dodge_chance: u32,
    pub crit_chance: u32,
    pub damage_min: u32,
    pub damage_max: u32,
    pub resistance: u32,
    pub magic_resistance: u32,
    pub attack_range: u32,
    pub movement_speed: u32,
}

impl UnitStats {
    pub fn average_damage(&self) -> f32 {
        (self.damage_min + self.damage_max.max(self.damage_min)) as f32 / 2.0
    }
}

/// Damage mitigation a unit grants to squad-mates standing behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverProfile {
    /// Fraction of remaining damage removed (0.0..=1.0)
    pub value: f32,
    /// How many rows back the cover reaches
    pub range: u8,
    /// Only living providers grant cover
    pub requires_active: bool,
}

/// Everything needed to create a unit except its id and slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub name: String,
    pub role: UnitRole,
    pub attack_pattern: AttackPattern,
    pub stats: UnitStats,
    pub is_leader: bool,
    pub cover: Option<CoverProfile>,
}

impl UnitTemplate {
    pub fn as_leader(mut self) -> Self {
        self.is_leader = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub role: UnitRole,
    pub attack_pattern: AttackPattern,
    pub slot: FormationSlot,
    pub stats: UnitStats,
    pub current_hp: u32,
    /// Cleared while a unit sits out of an attack or is otherwise disabled
    pub can_act: bool,
    pub is_leader: bool,
    pub cover: Option<CoverProfile>,
}

impl Unit {
    pub fn from_template(id: UnitId, template: &UnitTemplate, slot: FormationSlot) -> Self {
        Self {
            id,
            name: template.name.clone(),
            role: template.role,
            attack_pattern: template.attack_pattern.clone(),
            slot,
            stats: template.stats,
            current_hp: template.stats.max_hp,
            can_act: true,
            is_leader: template.is_leader,
            cover: template.cover,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Alive and not disabled
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.is_alive() && self.can_act
    }

    /// Applies damage and returns true if this blow killed the unit
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.is_alive();
        self.current_hp = self.current_hp.saturating_sub(amount);
        was_alive && !self.is_alive()
    }

    pub fn resistance_against(&self, pattern: &AttackPattern) -> u32 {
        if pattern.is_magic() {
            self.stats.magic_resistance
        } else {
            self.stats.resistance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> UnitTemplate {
        UnitTemplate {
            name: "Pikeman".into(),
            role: UnitRole::Tank,
            attack_pattern: AttackPattern::MeleeColumn,
            stats: UnitStats {
                max_hp: 20,
                damage_min: 3,
                damage_max: 5,
                resistance: 2,
                magic_resistance: 7,
                ..Default::default()
            },
            is_leader: false,
            cover: None,
        }
    }

    #[test]
    fn test_take_damage_reports_kill_once() {
        let mut unit = Unit::from_template(UnitId(1), &template(), FormationSlot::new(0, 1));
        assert!(!unit.take_damage(15));
        assert_eq!(unit.current_hp, 5);
        assert!(unit.take_damage(10));
        assert_eq!(unit.current_hp, 0);
        assert!(!unit.take_damage(10));
    }

    #[test]
    fn test_resistance_by_pattern() {
        let unit = Unit::from_template(UnitId(1), &template(), FormationSlot::new(0, 0));
        assert_eq!(unit.resistance_against(&AttackPattern::Ranged), 2);
        assert_eq!(unit.resistance_against(&AttackPattern::Magic { cells: vec![] }), 7);
        assert_eq!(unit.stats.average_damage(), 4.0);
    }
}
