//! Target selection inside the defending formation
//!
//! Only living defenders are ever selected, so a unit killed earlier in the
//! same attack pass drops out of every later selection.

use crate::core::types::{SquadId, UnitId};
use crate::squads::{AttackPattern, FormationSlot, SquadRoster, Unit, FORMATION_COLS, FORMATION_ROWS};

pub fn select_targets(roster: &SquadRoster, attacker: &Unit, defender_squad: SquadId) -> Vec<UnitId> {
    match &attacker.attack_pattern {
        AttackPattern::MeleeRow => (0..FORMATION_ROWS)
            .map(|row| units_in_row(roster, defender_squad, row))
            .find(|units| !units.is_empty())
            .unwrap_or_default(),
        AttackPattern::MeleeColumn => (0..FORMATION_COLS)
            .map(|offset| (attacker.slot.col + offset) % FORMATION_COLS)
            .map(|col| units_in_column(roster, defender_squad, col))
            .find(|units| !units.is_empty())
            .unwrap_or_default(),
        AttackPattern::Ranged => {
            let same_row = units_in_row(roster, defender_squad, attacker.slot.row);
            if !same_row.is_empty() {
                return same_row;
            }
            softest_target(roster, defender_squad).into_iter().collect()
        }
        AttackPattern::Magic { cells } => {
            let mut targets = Vec::new();
            for cell in cells {
                for id in units_at(roster, defender_squad, *cell) {
                    if !targets.contains(&id) {
                        targets.push(id);
                    }
                }
            }
            targets
        }
    }
}

fn living_sorted(roster: &SquadRoster, squad: SquadId, keep: impl Fn(&Unit) -> bool) -> Vec<UnitId> {
    let mut units: Vec<&Unit> = roster.alive_units(squad).filter(|&u| keep(u)).collect();
    units.sort_by_key(|u| u.slot);
    units.into_iter().map(|u| u.id).collect()
}

fn units_in_row(roster: &SquadRoster, squad: SquadId, row: u8) -> Vec<UnitId> {
    living_sorted(roster, squad, |u| u.slot.row == row)
}

fn units_in_column(roster: &SquadRoster, squad: SquadId, col: u8) -> Vec<UnitId> {
    living_sorted(roster, squad, |u| u.slot.col == col)
}

fn units_at(roster: &SquadRoster, squad: SquadId, slot: FormationSlot) -> Vec<UnitId> {
    living_sorted(roster, squad, |u| u.slot == slot)
}

/// Lowest physical resistance; ties go to the furthest row, then the leftmost column
fn softest_target(roster: &SquadRoster, squad: SquadId) -> Option<UnitId> {
    roster
        .alive_units(squad)
        .min_by_key(|u| (u.stats.resistance, std::cmp::Reverse(u.slot.row), u.slot.col))
        .map(|u| u.id)
}
