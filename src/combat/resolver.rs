//! Squad-vs-squad attack resolution
//!
//! Each participating unit selects its targets, then every strike runs the
//! same pipeline: hit -> dodge -> base damage -> crit -> resistance ->
//! cover -> floor at 1. HP is applied immediately.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::combat::cover::{apply_cover, cover_providers};
use crate::combat::events::{AttackEvent, CombatLog, HitKind, HitResult, Roll, UnitSnapshot};
use crate::combat::targeting::select_targets;
use crate::core::config::CombatConfig;
use crate::core::types::{SquadId, UnitId};
use crate::squads::{SquadRoster, Unit, UnitStats};

/// Who attacks whom, and which attacker units take part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackRequest {
    pub attacker: SquadId,
    pub defender: SquadId,
    pub distance: u32,
    pub participants: Vec<UnitId>,
}

/// Resolves an attack for an explicit participant subset
pub trait AttackResolver {
    fn resolve_attack(&mut self, roster: &mut SquadRoster, request: &AttackRequest) -> CombatLog;
}

/// Random source for combat rolls
pub trait Dice {
    /// Uniform in 1..=100
    fn d100(&mut self) -> u32;
    /// Uniform in min..=max; `min` when the range is empty
    fn between(&mut self, min: u32, max: u32) -> u32;
}

impl Dice for ChaCha8Rng {
    fn d100(&mut self) -> u32 {
        self.gen_range(1..=100)
    }

    fn between(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            min
        } else {
            self.gen_range(min..=max)
        }
    }
}

/// The subset of `CombatConfig` the resolver reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionRules {
    pub base_hit_chance: i32,
    pub min_hit_chance: i32,
    pub max_hit_chance: i32,
    pub crit_multiplier: f32,
    pub max_cover: f32,
}

impl From<&CombatConfig> for ResolutionRules {
    fn from(config: &CombatConfig) -> Self {
        Self {
            base_hit_chance: config.base_hit_chance,
            min_hit_chance: config.min_hit_chance,
            max_hit_chance: config.max_hit_chance,
            crit_multiplier: config.crit_multiplier,
            max_cover: config.max_cover,
        }
    }
}

impl ResolutionRules {
    /// d100 threshold: base + accuracy - armor, clamped
    pub fn hit_threshold(&self, attacker: &UnitStats, defender: &UnitStats) -> u32 {
        (self.base_hit_chance + attacker.accuracy - defender.armor)
            .clamp(self.min_hit_chance, self.max_hit_chance)
            .max(0) as u32
    }
}

pub struct SquadCombatResolver<D: Dice = ChaCha8Rng> {
    dice: D,
    rules: ResolutionRules,
}

impl SquadCombatResolver<ChaCha8Rng> {
    pub fn new(config: &CombatConfig, seed: u64) -> Self {
        Self::with_dice(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<D: Dice> SquadCombatResolver<D> {
    pub fn with_dice(config: &CombatConfig, dice: D) -> Self {
        Self {
            dice,
            rules: ResolutionRules::from(config),
        }
    }

    pub fn rules(&self) -> &ResolutionRules {
        &self.rules
    }

    /// One strike of `attacker` against `target`; None if the target is gone
    fn strike(
        &mut self,
        roster: &mut SquadRoster,
        attacker: &Unit,
        defender_squad: SquadId,
        target: UnitId,
        index: usize,
    ) -> Option<AttackEvent> {
        let defender = roster.unit(target).filter(|u| u.is_alive())?;
        let threshold = self.rules.hit_threshold(&attacker.stats, &defender.stats);
        let roll = self.dice.d100();

        let mut event = AttackEvent {
            index,
            attacker: attacker.id,
            attacker_name: attacker.name.clone(),
            defender: defender.id,
            defender_name: defender.name.clone(),
            target_slot: defender.slot,
            target_mode: attacker.attack_pattern.label().to_string(),
            hit: HitResult {
                kind: HitKind::Miss,
                roll,
                threshold,
                dodge: None,
                crit: None,
            },
            base_damage: 0,
            crit_multiplier: 1.0,
            resistance: 0,
            cover: Vec::new(),
            final_damage: 0,
            killed: false,
            defender_hp_before: defender.current_hp,
            defender_hp_after: defender.current_hp,
        };

        if roll > threshold {
            return Some(event);
        }

        let dodge = Roll {
            roll: self.dice.d100(),
            threshold: defender.stats.dodge_chance,
        };
        event.hit.dodge = Some(dodge);
        if dodge.succeeded() {
            event.hit.kind = HitKind::Dodge;
            return Some(event);
        }

        let base = self
            .dice
            .between(attacker.stats.damage_min, attacker.stats.damage_max);
        event.base_damage = base;

        let crit = Roll {
            roll: self.dice.d100(),
            threshold: attacker.stats.crit_chance,
        };
        event.hit.crit = Some(crit);
        let mut damage = if crit.succeeded() {
            event.hit.kind = HitKind::Critical;
            event.crit_multiplier = self.rules.crit_multiplier;
            (base as f32 * self.rules.crit_multiplier) as u32
        } else {
            event.hit.kind = HitKind::Hit;
            base
        };

        event.resistance = defender.resistance_against(&attacker.attack_pattern);
        damage = damage.saturating_sub(event.resistance);

        let providers = cover_providers(roster, defender_squad, defender);
        let (covered, contributions) = apply_cover(damage, &providers, self.rules.max_cover);
        event.cover = contributions;
        event.final_damage = covered.max(1);

        let unit = roster.unit_mut(target)?;
        event.killed = unit.take_damage(event.final_damage);
        event.defender_hp_after = unit.current_hp;
        Some(event)
    }
}

impl<D: Dice> AttackResolver for SquadCombatResolver<D> {
    fn resolve_attack(&mut self, roster: &mut SquadRoster, request: &AttackRequest) -> CombatLog {
        let mut log = CombatLog::open(roster, request.attacker, request.defender, request.distance);

        let participants: Vec<Unit> = request
            .participants
            .iter()
            .filter(|id| roster.squad_of_unit(**id) == Some(request.attacker))
            .filter_map(|id| roster.unit(*id))
            .filter(|u| u.is_ready())
            .cloned()
            .collect();
        log.attacking_units = participants.iter().map(UnitSnapshot::from).collect();

        for attacker in &participants {
            for target in select_targets(roster, attacker, request.defender) {
                let index = log.next_index();
                if let Some(event) = self.strike(roster, attacker, request.defender, target, index) {
                    log.record(event);
                }
            }
        }

        log.finalize(roster);
        log
    }
}
