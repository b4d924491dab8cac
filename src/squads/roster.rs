//! Squad/unit registry
//!
//! Typed storage for squads and their members. Ids are handed out
//! sequentially so seeded runs are reproducible.

use ahash::AHashMap;

use crate::core::error::{CombatError, Result};
use crate::core::types::{GridPos, SquadId, UnitId};
use crate::squads::squad::Squad;
use crate::squads::unit::{FormationSlot, Unit, UnitStats, UnitTemplate};

#[derive(Debug, Default, Clone)]
pub struct SquadRoster {
    squads: AHashMap<SquadId, Squad>,
    units: AHashMap<UnitId, Unit>,
    unit_squad: AHashMap<UnitId, SquadId>,
    order: Vec<SquadId>,
    next_squad: u32,
    next_unit: u32,
}

impl SquadRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_squad(&mut self, name: impl Into<String>) -> SquadId {
        self.next_squad += 1;
        let id = SquadId(self.next_squad);
        self.squads.insert(id, Squad::new(id, name));
        self.order.push(id);
        id
    }

    pub fn add_unit(
        &mut self,
        squad: SquadId,
        template: &UnitTemplate,
        slot: FormationSlot,
    ) -> Result<UnitId> {
        let entry = self
            .squads
            .get_mut(&squad)
            .ok_or(CombatError::SquadNotFound(squad))?;

        self.next_unit += 1;
        let id = UnitId(self.next_unit);
        entry.units.push(id);
        entry.destroyed = false;
        self.units.insert(id, Unit::from_template(id, template, slot));
        self.unit_squad.insert(id, squad);
        Ok(id)
    }

    /// Create a squad and fill it in one go
    pub fn spawn_squad(
        &mut self,
        name: impl Into<String>,
        members: &[(UnitTemplate, FormationSlot)],
    ) -> Result<SquadId> {
        let squad = self.create_squad(name);
        for (template, slot) in members {
            self.add_unit(squad, template, *slot)?;
        }
        Ok(squad)
    }

    pub fn contains(&self, squad: SquadId) -> bool {
        self.squads.contains_key(&squad)
    }

    pub fn squad(&self, squad: SquadId) -> Option<&Squad> {
        self.squads.get(&squad)
    }

    pub fn squad_mut(&mut self, squad: SquadId) -> Option<&mut Squad> {
        self.squads.get_mut(&squad)
    }

    /// Squad ids in creation order
    pub fn squad_ids(&self) -> &[SquadId] {
        &self.order
    }

    pub fn squad_name(&self, squad: SquadId) -> &str {
        self.squads
            .get(&squad)
            .map(|s| s.name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn unit(&self, unit: UnitId) -> Option<&Unit> {
        self.units.get(&unit)
    }

    pub fn unit_mut(&mut self, unit: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&unit)
    }

    pub fn squad_of_unit(&self, unit: UnitId) -> Option<SquadId> {
        self.unit_squad.get(&unit).copied()
    }

    pub fn unit_ids_in_squad(&self, squad: SquadId) -> &[UnitId] {
        self.squads
            .get(&squad)
            .map(|s| s.units.as_slice())
            .unwrap_or(&[])
    }

    /// Members in insertion order
    pub fn units_in_squad(&self, squad: SquadId) -> impl Iterator<Item = &Unit> + '_ {
        self.unit_ids_in_squad(squad)
            .iter()
            .filter_map(move |id| self.units.get(id))
    }

    pub fn alive_units(&self, squad: SquadId) -> impl Iterator<Item = &Unit> + '_ {
        self.units_in_squad(squad).filter(|u| u.is_alive())
    }

    /// True when no member is alive (or the squad does not exist)
    pub fn is_squad_destroyed(&self, squad: SquadId) -> bool {
        self.alive_units(squad).next().is_none()
    }

    /// Refresh the cached destroyed flag; returns the new value
    pub fn update_destroyed_status(&mut self, squad: SquadId) -> bool {
        let destroyed = self.is_squad_destroyed(squad);
        if let Some(entry) = self.squads.get_mut(&squad) {
            entry.destroyed = destroyed;
        }
        destroyed
    }

    /// Bottleneck speed: the slowest living member sets the pace
    pub fn movement_speed(&self, squad: SquadId) -> Option<u32> {
        self.alive_units(squad).map(|u| u.stats.movement_speed).min()
    }

    /// Reach of the longest-ranged living member
    pub fn max_attack_range(&self, squad: SquadId) -> Option<u32> {
        self.alive_units(squad).map(|u| u.stats.attack_range).max()
    }

    pub fn squad_position(&self, squad: SquadId) -> Option<GridPos> {
        self.squads.get(&squad).and_then(|s| s.position)
    }

    pub fn set_squad_position(&mut self, squad: SquadId, pos: Option<GridPos>) -> bool {
        match self.squads.get_mut(&squad) {
            Some(entry) => {
                entry.position = pos;
                true
            }
            None => false,
        }
    }

    /// Mean stats over every living unit in the roster
    ///
    /// Serves as the reference defender for expected-damage projection.
    pub fn average_stats(&self) -> Option<UnitStats> {
        let alive: Vec<&UnitStats> = self
            .order
            .iter()
            .flat_map(|id| self.alive_units(*id))
            .map(|u| &u.stats)
            .collect();
        if alive.is_empty() {
            return None;
        }

        let n = alive.len() as i64;
        let avg_u = |f: fn(&UnitStats) -> u32| -> u32 {
            (alive.iter().map(|s| f(s) as i64).sum::<i64>() / n) as u32
        };
        let avg_i = |f: fn(&UnitStats) -> i32| -> i32 {
            (alive.iter().map(|s| f(s) as i64).sum::<i64>() / n) as i32
        };

        Some(UnitStats {
            max_hp: avg_u(|s| s.max_hp),
            accuracy: avg_i(|s| s.accuracy),
            armor: avg_i(|s| s.armor),
            dodge_chance: avg_u(|s| s.dodge_chance),
            crit_chance: avg_u(|s| s.crit_chance),
            damage_min: avg_u(|s| s.damage_min),
            damage_max: avg_u(|s| s.damage_max),
            resistance: avg_u(|s| s.resistance),
            magic_resistance: avg_u(|s| s.magic_resistance),
            attack_range: avg_u(|s| s.attack_range),
            movement_speed: avg_u(|s| s.movement_speed),
        })
    }
}
