//! Per-squad threat projection by distance
//!
//! Each squad gets two curves keyed by distance 1..=max(movement + range):
//! a heuristic danger value and a probability-weighted expected damage
//! against an average defender.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::world::CombatWorld;
use crate::combat::ResolutionRules;
use crate::core::config::{CombatConfig, ThreatTuning};
use crate::core::types::{FactionId, SquadId};
use crate::squads::{Unit, UnitRole, UnitStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadThreatLevel {
    pub squad: SquadId,
    pub movement_range: u32,
    /// Index 0 holds distance 1
    pub danger_by_range: Vec<f32>,
    pub expected_damage_by_range: Vec<f32>,
}

impl SquadThreatLevel {
    pub fn max_threat_range(&self) -> u32 {
        self.danger_by_range.len() as u32
    }

    /// Distance 0 reads the distance-1 bucket; beyond reach is 0
    pub fn danger_at(&self, distance: u32) -> f32 {
        bucket(&self.danger_by_range, distance)
    }

    pub fn expected_damage_at(&self, distance: u32) -> f32 {
        bucket(&self.expected_damage_by_range, distance)
    }
}

fn bucket(values: &[f32], distance: u32) -> f32 {
    let idx = distance.max(1) as usize - 1;
    values.get(idx).copied().unwrap_or(0.0)
}

/// Inputs shared by every squad calculation
struct ThreatContext<'a> {
    tuning: &'a ThreatTuning,
    rules: &'a ResolutionRules,
    reference: UnitStats,
}

impl ThreatContext<'_> {
    fn role_multiplier(&self, role: UnitRole) -> f32 {
        match role {
            UnitRole::Dps => self.tuning.dps_multiplier,
            UnitRole::Tank => self.tuning.tank_multiplier,
            UnitRole::Support => self.tuning.support_multiplier,
        }
    }

    fn leader_bonus(&self, unit: &Unit) -> f32 {
        if unit.is_leader {
            self.tuning.leader_bonus
        } else {
            1.0
        }
    }

    fn danger(&self, unit: &Unit) -> f32 {
        let power = unit.stats.average_damage() + (unit.stats.accuracy.max(0) as f32 / 2.0);
        power * self.role_multiplier(unit.role) * self.leader_bonus(unit)
    }

    /// Same pipeline as the resolver, in expectation, without cover
    fn expected_damage(&self, unit: &Unit) -> f32 {
        let p_hit = self.rules.hit_threshold(&unit.stats, &self.reference) as f32 / 100.0;
        let p_dodge = (self.reference.dodge_chance.min(100)) as f32 / 100.0;
        let p_crit = (unit.stats.crit_chance.min(100)) as f32 / 100.0;

        let resistance = if unit.attack_pattern.is_magic() {
            self.reference.magic_resistance
        } else {
            self.reference.resistance
        };
        let after_resist = (unit.stats.average_damage() - resistance as f32).max(1.0);
        let crit_factor = 1.0 + p_crit * (self.rules.crit_multiplier - 1.0);

        after_resist * p_hit * (1.0 - p_dodge) * crit_factor * self.leader_bonus(unit)
    }
}

fn calculate_squad(
    world: &CombatWorld,
    squad: SquadId,
    context: &ThreatContext<'_>,
    default_speed: u32,
) -> SquadThreatLevel {
    let units: Vec<&Unit> = world.roster.alive_units(squad).collect();

    let movement_range = match world.action_state(squad) {
        Some(state) => state.movement_remaining,
        None => world.roster.movement_speed(squad).unwrap_or(default_speed),
    };
    let max_range = units
        .iter()
        .map(|u| movement_range + u.stats.attack_range)
        .max()
        .unwrap_or(0);

    let mut patterns: Vec<&'static str> = units.iter().map(|u| u.attack_pattern.label()).collect();
    patterns.sort_unstable();
    patterns.dedup();
    let composition = context.tuning.composition_multiplier(patterns.len());

    let mut danger_by_range = Vec::with_capacity(max_range as usize);
    let mut expected_damage_by_range = Vec::with_capacity(max_range as usize);
    for range in 1..=max_range {
        let reaching = units
            .iter()
            .filter(|u| movement_range + u.stats.attack_range >= range);
        let (danger, expected) = reaching.fold((0.0, 0.0), |(d, e), u| {
            (d + context.danger(u), e + context.expected_damage(u))
        });
        danger_by_range.push(danger * composition);
        expected_damage_by_range.push(expected);
    }

    SquadThreatLevel {
        squad,
        movement_range,
        danger_by_range,
        expected_damage_by_range,
    }
}

#[derive(Debug, Clone)]
pub struct FactionThreatLevel {
    pub faction: FactionId,
    squads: AHashMap<SquadId, SquadThreatLevel>,
}

impl FactionThreatLevel {
    pub fn squad(&self, squad: SquadId) -> Option<&SquadThreatLevel> {
        self.squads.get(&squad)
    }

    pub fn len(&self) -> usize {
        self.squads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }
}

/// Threat curves for every tracked faction
pub struct FactionThreatLevelManager {
    factions: AHashMap<FactionId, FactionThreatLevel>,
    tuning: ThreatTuning,
    rules: ResolutionRules,
    default_speed: u32,
}

impl FactionThreatLevelManager {
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            factions: AHashMap::new(),
            tuning: config.threat.clone(),
            rules: ResolutionRules::from(config),
            default_speed: config.default_movement_speed,
        }
    }

    /// Start tracking a faction and compute its curves
    pub fn add_faction(&mut self, world: &CombatWorld, faction: FactionId) {
        self.factions.entry(faction).or_insert_with(|| FactionThreatLevel {
            faction,
            squads: AHashMap::new(),
        });
        self.update_faction(world, faction);
    }

    /// Recompute a tracked faction; squads that left combat are dropped
    pub fn update_faction(&mut self, world: &CombatWorld, faction: FactionId) {
        let context = ThreatContext {
            tuning: &self.tuning,
            rules: &self.rules,
            reference: world.roster.average_stats().unwrap_or_default(),
        };
        let default_speed = self.default_speed;
        let Some(entry) = self.factions.get_mut(&faction) else {
            return;
        };
        entry.squads = world
            .squads_for_faction(faction)
            .iter()
            .map(|s| (*s, calculate_squad(world, *s, &context, default_speed)))
            .collect();
        tracing::debug!("Threat updated for faction {} ({} squads)", faction, entry.squads.len());
    }

    pub fn update_all_factions(&mut self, world: &CombatWorld) {
        let ids: Vec<FactionId> = self.factions.keys().copied().collect();
        for faction in ids {
            self.update_faction(world, faction);
        }
    }

    pub fn faction(&self, faction: FactionId) -> Option<&FactionThreatLevel> {
        self.factions.get(&faction)
    }

    pub fn squad_threat(&self, faction: FactionId, squad: SquadId) -> Option<&SquadThreatLevel> {
        self.factions.get(&faction).and_then(|f| f.squad(squad))
    }
}
