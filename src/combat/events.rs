//! Structured record of one squad-vs-squad attack

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{SquadId, UnitId};
use crate::squads::{FormationSlot, SquadRoster, Unit, UnitRole};

/// Outcome class of a single unit-vs-unit strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    Miss,
    Dodge,
    Hit,
    Critical,
}

impl HitKind {
    pub fn landed(&self) -> bool {
        matches!(self, HitKind::Hit | HitKind::Critical)
    }
}

/// A d100 check; succeeds when `roll <= threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub roll: u32,
    pub threshold: u32,
}

impl Roll {
    #[inline]
    pub fn succeeded(&self) -> bool {
        self.roll <= self.threshold
    }
}

/// Hit roll plus the follow-up dodge and crit rolls that were actually made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    pub kind: HitKind,
    pub roll: u32,
    pub threshold: u32,
    pub dodge: Option<Roll>,
    pub crit: Option<Roll>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverContribution {
    pub provider: UnitId,
    pub provider_name: String,
    /// Share of the remaining damage this provider absorbed, 0..=100
    pub percentage: f32,
    pub reduction: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// 1-based position in the log
    pub index: usize,
    pub attacker: UnitId,
    pub attacker_name: String,
    pub defender: UnitId,
    pub defender_name: String,
    pub target_slot: FormationSlot,
    pub target_mode: String,
    pub hit: HitResult,
    pub base_damage: u32,
    pub crit_multiplier: f32,
    pub resistance: u32,
    pub cover: Vec<CoverContribution>,
    pub final_damage: u32,
    pub killed: bool,
    pub defender_hp_before: u32,
    pub defender_hp_after: u32,
}

impl AttackEvent {
    pub fn cover_reduction(&self) -> u32 {
        self.cover.iter().map(|c| c.reduction).sum()
    }
}

/// Unit state captured when the log is opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub name: String,
    pub slot: FormationSlot,
    pub role: UnitRole,
    pub attack_range: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub is_leader: bool,
}

impl From<&Unit> for UnitSnapshot {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.name.clone(),
            slot: unit.slot,
            role: unit.role,
            attack_range: unit.stats.attack_range,
            hp: unit.current_hp,
            max_hp: unit.stats.max_hp,
            is_leader: unit.is_leader,
        }
    }
}

/// Post-battle health of a squad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadStatus {
    pub alive_units: usize,
    pub total_units: usize,
    /// Remaining HP of living members as a percentage of their max HP
    pub average_hp_percent: u32,
}

impl SquadStatus {
    pub fn of(roster: &SquadRoster, squad: SquadId) -> Self {
        let mut status = SquadStatus {
            total_units: roster.unit_ids_in_squad(squad).len(),
            ..Default::default()
        };
        let (mut hp, mut max_hp) = (0u64, 0u64);
        for unit in roster.alive_units(squad) {
            status.alive_units += 1;
            hp += unit.current_hp as u64;
            max_hp += unit.stats.max_hp as u64;
        }
        if max_hp > 0 {
            status.average_hp_percent = (hp * 100 / max_hp) as u32;
        }
        status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLog {
    pub attacker_squad: SquadId,
    pub attacker_name: String,
    pub defender_squad: SquadId,
    pub defender_name: String,
    pub squad_distance: u32,
    pub attacking_units: Vec<UnitSnapshot>,
    pub defending_units: Vec<UnitSnapshot>,
    pub events: Vec<AttackEvent>,
    pub total_damage: u32,
    pub units_killed: u32,
    pub defender_status: SquadStatus,
}

impl CombatLog {
    pub fn open(roster: &SquadRoster, attacker: SquadId, defender: SquadId, distance: u32) -> Self {
        Self {
            attacker_squad: attacker,
            attacker_name: roster.squad_name(attacker).to_string(),
            defender_squad: defender,
            defender_name: roster.squad_name(defender).to_string(),
            squad_distance: distance,
            attacking_units: Vec::new(),
            defending_units: roster.alive_units(defender).map(UnitSnapshot::from).collect(),
            events: Vec::new(),
            total_damage: 0,
            units_killed: 0,
            defender_status: SquadStatus::default(),
        }
    }

    pub fn next_index(&self) -> usize {
        self.events.len() + 1
    }

    pub fn record(&mut self, event: AttackEvent) {
        self.total_damage += event.final_damage;
        if event.killed {
            self.units_killed += 1;
        }
        self.events.push(event);
    }

    pub fn finalize(&mut self, roster: &SquadRoster) {
        self.defender_status = SquadStatus::of(roster, self.defender_squad);
    }

    pub fn participant_count(&self) -> usize {
        self.attacking_units.len()
    }
}

impl fmt::Display for CombatLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== {} attacks {} (distance {}) ===",
            self.attacker_name, self.defender_name, self.squad_distance
        )?;
        let names: Vec<&str> = self.attacking_units.iter().map(|u| u.name.as_str()).collect();
        writeln!(f, "Attacking units ({}): {}", names.len(), names.join(", "))?;

        for event in &self.events {
            write!(
                f,
                "  #{} {} -> {} [{},{}]: ",
                event.index,
                event.attacker_name,
                event.defender_name,
                event.target_slot.row,
                event.target_slot.col
            )?;
            match event.hit.kind {
                HitKind::Miss => {
                    writeln!(f, "MISS (rolled {} vs {})", event.hit.roll, event.hit.threshold)?
                }
                HitKind::Dodge => {
                    let dodge = event.hit.dodge.map(|d| (d.roll, d.threshold)).unwrap_or((0, 0));
                    writeln!(f, "DODGED (rolled {} vs {})", dodge.0, dodge.1)?
                }
                HitKind::Hit | HitKind::Critical => {
                    let label = if event.hit.kind == HitKind::Critical { "CRIT" } else { "HIT" };
                    write!(
                        f,
                        "{} {} x{:.1} - {} resist",
                        label, event.base_damage, event.crit_multiplier, event.resistance
                    )?;
                    for cover in &event.cover {
                        write!(
                            f,
                            " - {} cover {:.0}% ({})",
                            cover.provider_name, cover.percentage, cover.reduction
                        )?;
                    }
                    write!(f, " = {} dmg", event.final_damage)?;
                    if event.killed {
                        write!(f, " KILLED")?;
                    }
                    writeln!(f)?
                }
            }
        }

        write!(
            f,
            "Total damage {}, killed {}; {} has {}/{} alive at {}% HP",
            self.total_damage,
            self.units_killed,
            self.defender_name,
            self.defender_status.alive_units,
            self.defender_status.total_units,
            self.defender_status.average_hp_percent
        )
    }
}
