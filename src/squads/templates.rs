//! Preset unit archetypes and squad layouts

use crate::core::error::Result;
use crate::core::types::SquadId;
use crate::squads::roster::SquadRoster;
use crate::squads::unit::{
    AttackPattern, CoverProfile, FormationSlot, UnitRole, UnitStats, UnitTemplate,
};

fn template(name: &str, role: UnitRole, attack_pattern: AttackPattern, stats: UnitStats) -> UnitTemplate {
    UnitTemplate {
        name: name.to_string(),
        role,
        attack_pattern,
        stats,
        is_leader: false,
        cover: None,
    }
}

pub fn infantry() -> UnitTemplate {
    template(
        "Infantry",
        UnitRole::Dps,
        AttackPattern::MeleeRow,
        UnitStats {
            max_hp: 30,
            accuracy: 0,
            armor: 5,
            dodge_chance: 10,
            crit_chance: 10,
            damage_min: 6,
            damage_max: 10,
            resistance: 2,
            magic_resistance: 1,
            attack_range: 1,
            movement_speed: 3,
        },
    )
}

pub fn knight() -> UnitTemplate {
    UnitTemplate {
        cover: Some(CoverProfile {
            value: 0.25,
            range: 1,
            requires_active: true,
        }),
        ..template(
            "Knight",
            UnitRole::Tank,
            AttackPattern::MeleeColumn,
            UnitStats {
                max_hp: 45,
                accuracy: 5,
                armor: 15,
                dodge_chance: 5,
                crit_chance: 5,
                damage_min: 7,
                damage_max: 11,
                resistance: 5,
                magic_resistance: 2,
                attack_range: 1,
                movement_speed: 2,
            },
        )
    }
}

pub fn shield_bearer() -> UnitTemplate {
    UnitTemplate {
        cover: Some(CoverProfile {
            value: 0.4,
            range: 2,
            requires_active: true,
        }),
        ..template(
            "Shield Bearer",
            UnitRole::Tank,
            AttackPattern::MeleeRow,
            UnitStats {
                max_hp: 40,
                accuracy: -5,
                armor: 20,
                dodge_chance: 0,
                crit_chance: 0,
                damage_min: 3,
                damage_max: 5,
                resistance: 6,
                magic_resistance: 3,
                attack_range: 1,
                movement_speed: 3,
            },
        )
    }
}

pub fn archer() -> UnitTemplate {
    template(
        "Archer",
        UnitRole::Dps,
        AttackPattern::Ranged,
        UnitStats {
            max_hp: 20,
            accuracy: 10,
            armor: 0,
            dodge_chance: 15,
            crit_chance: 15,
            damage_min: 5,
            damage_max: 8,
            resistance: 0,
            magic_resistance: 1,
            attack_range: 3,
            movement_speed: 3,
        },
    )
}

pub fn mage() -> UnitTemplate {
    template(
        "Mage",
        UnitRole::Support,
        AttackPattern::Magic {
            cells: vec![
                FormationSlot::new(0, 1),
                FormationSlot::new(1, 1),
                FormationSlot::new(1, 0),
                FormationSlot::new(1, 2),
            ],
        },
        UnitStats {
            max_hp: 18,
            accuracy: 5,
            armor: 0,
            dodge_chance: 10,
            crit_chance: 5,
            damage_min: 4,
            damage_max: 7,
            resistance: 0,
            magic_resistance: 6,
            attack_range: 4,
            movement_speed: 2,
        },
    )
}

/// Standard mixed line: knight leader flanked by infantry, archers behind,
/// a mage in the back
pub fn line_squad(roster: &mut SquadRoster, name: &str) -> Result<SquadId> {
    roster.spawn_squad(
        name,
        &[
            (infantry(), FormationSlot::new(0, 0)),
            (knight().as_leader(), FormationSlot::new(0, 1)),
            (infantry(), FormationSlot::new(0, 2)),
            (archer(), FormationSlot::new(1, 0)),
            (archer(), FormationSlot::new(1, 2)),
            (mage(), FormationSlot::new(2, 1)),
        ],
    )
}

/// Fast skirmishers: archers screened by a shield bearer
pub fn skirmish_squad(roster: &mut SquadRoster, name: &str) -> Result<SquadId> {
    roster.spawn_squad(
        name,
        &[
            (shield_bearer(), FormationSlot::new(0, 1)),
            (archer().as_leader(), FormationSlot::new(1, 1)),
            (archer(), FormationSlot::new(2, 0)),
            (archer(), FormationSlot::new(2, 2)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_squad_layout() {
        let mut roster = SquadRoster::new();
        let squad = line_squad(&mut roster, "Vanguard").unwrap();
        assert_eq!(roster.unit_ids_in_squad(squad).len(), 6);
        assert_eq!(roster.alive_units(squad).filter(|u| u.is_leader).count(), 1);
        // Mage and knight share the slowest pace
        assert_eq!(roster.movement_speed(squad), Some(2));
        assert_eq!(roster.max_attack_range(squad), Some(4));
    }

    #[test]
    fn test_templates_have_sane_damage_ranges() {
        for t in [infantry(), knight(), shield_bearer(), archer(), mage()] {
            assert!(t.stats.damage_min <= t.stats.damage_max, "{}", t.name);
            assert!(t.stats.max_hp > 0);
        }
    }
}
