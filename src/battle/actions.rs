//! Attack validation and execution
//!
//! Only units whose own range covers the squad distance take part; the
//! resolver is handed that subset explicitly.

use crate::battle::world::CombatWorld;
use crate::combat::{AttackRequest, AttackResolver, CombatLog, SquadCombatResolver};
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{SquadId, UnitId};

pub struct CombatActionSystem<R: AttackResolver = SquadCombatResolver> {
    resolver: R,
    default_range: u32,
}

impl<R: AttackResolver> CombatActionSystem<R> {
    pub fn new(config: &CombatConfig, resolver: R) -> Self {
        Self {
            resolver,
            default_range: config.default_attack_range,
        }
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Longest reach among living members
    pub fn squad_attack_range(&self, world: &CombatWorld, squad: SquadId) -> u32 {
        world.roster.max_attack_range(squad).unwrap_or(self.default_range)
    }

    /// Ready members whose own range covers the distance to `target`
    pub fn attacking_units(&self, world: &CombatWorld, squad: SquadId, target: SquadId) -> Vec<UnitId> {
        let (Some(from), Some(to)) = (world.squad_position(squad), world.squad_position(target)) else {
            return Vec::new();
        };
        let distance = from.chebyshev_distance(&to);
        world
            .roster
            .units_in_squad(squad)
            .filter(|u| u.is_ready() && u.stats.attack_range >= distance)
            .map(|u| u.id)
            .collect()
    }

    pub fn can_squad_attack(&self, world: &CombatWorld, squad: SquadId, target: SquadId) -> bool {
        self.can_squad_attack_with_reason(world, squad, target).is_ok()
    }

    /// First failing check, in order: acted, on map, factions, range
    pub fn can_squad_attack_with_reason(&self, world: &CombatWorld, squad: SquadId, target: SquadId) -> Result<()> {
        let state = world
            .action_state(squad)
            .ok_or(CombatError::NoActionState(squad))?;
        if state.has_acted {
            return Err(CombatError::AlreadyActed);
        }

        let from = world.squad_position(squad).ok_or(CombatError::AttackerNotOnMap)?;
        let to = world.squad_position(target).ok_or(CombatError::TargetNotOnMap)?;

        let (Some(own), Some(theirs)) = (world.squad_faction(squad), world.squad_faction(target)) else {
            return Err(CombatError::MissingFaction);
        };
        if own == theirs {
            return Err(CombatError::SameFaction);
        }

        let distance = from.chebyshev_distance(&to);
        let max_range = self.squad_attack_range(world, squad);
        if distance > max_range {
            return Err(CombatError::TargetOutOfRange { distance, max_range });
        }
        Ok(())
    }

    /// Validate everything, resolve with the in-range subset, then book-keep
    pub fn execute_attack_action(
        &mut self,
        world: &mut CombatWorld,
        attacker: SquadId,
        defender: SquadId,
    ) -> Result<CombatLog> {
        let from = world.squad_position(attacker).ok_or(CombatError::AttackerNotOnMap)?;
        let to = world.squad_position(defender).ok_or(CombatError::TargetNotOnMap)?;

        let distance = from.chebyshev_distance(&to);
        let max_range = self.squad_attack_range(world, attacker);
        if distance > max_range {
            return Err(CombatError::TargetOutOfRange { distance, max_range });
        }

        let state = world
            .action_state(attacker)
            .ok_or(CombatError::NoActionState(attacker))?;
        if state.has_acted {
            return Err(CombatError::AlreadyActed);
        }

        match (world.squad_faction(attacker), world.squad_faction(defender)) {
            (Some(own), Some(theirs)) if own == theirs => return Err(CombatError::SameFaction),
            (Some(_), Some(_)) => {}
            _ => return Err(CombatError::MissingFaction),
        }

        let request = AttackRequest {
            attacker,
            defender,
            distance,
            participants: self.attacking_units(world, attacker, defender),
        };
        let log = self.resolver.resolve_attack(&mut world.roster, &request);

        if let Some(state) = world.cache.action_state_mut(attacker) {
            state.has_acted = true;
        }

        if world.roster.update_destroyed_status(defender) {
            world.remove_squad_from_map(defender);
            tracing::info!("Squad {} '{}' destroyed", defender, log.defender_name);
        }

        tracing::debug!(
            "{} -> {}: {} participants, {} damage, {} killed",
            log.attacker_name,
            log.defender_name,
            log.participant_count(),
            log.total_damage,
            log.units_killed
        );
        Ok(log)
    }

    /// Non-friendly squads within this squad's max range, in map-entry order
    pub fn squads_in_range(&self, world: &CombatWorld, squad: SquadId) -> Vec<SquadId> {
        let Some(origin) = world.squad_position(squad) else {
            return Vec::new();
        };
        let own = world.squad_faction(squad);
        let range = self.squad_attack_range(world, squad);
        world
            .cache
            .links()
            .filter(|l| l.squad != squad && Some(l.faction) != own)
            .filter(|l| origin.chebyshev_distance(&l.position) <= range)
            .map(|l| l.squad)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::faction::FactionManager;
    use crate::battle::turns::TurnManager;
    use crate::combat::ParticipationFilter;
    use crate::core::types::{FactionId, GridPos, MapDimensions};
    use crate::squads::{templates, FormationSlot, SquadRoster};

    struct Fixture {
        world: CombatWorld,
        red: FactionId,
        blue: FactionId,
        archers: SquadId,
        brawlers: SquadId,
        target: SquadId,
    }

    /// archers (red, range 3) at (0,0); brawlers (red, range 1) at (1,0);
    /// target (blue) at (2,0)
    fn fixture() -> Fixture {
        let config = CombatConfig::default();
        let mut roster = SquadRoster::new();
        let archers = templates::skirmish_squad(&mut roster, "Archers").unwrap();
        let brawlers = roster
            .spawn_squad("Brawlers", &[(templates::infantry(), FormationSlot::new(0, 0))])
            .unwrap();
        let target = templates::line_squad(&mut roster, "Target").unwrap();
        let mut world = CombatWorld::new(MapDimensions::new(10, 10), roster);

        let mut factions = FactionManager::new(&config);
        let red = factions.create_faction(&mut world, "Red", false);
        let blue = factions.create_faction(&mut world, "Blue", false);
        factions.add_squad_to_faction(&mut world, red, archers, GridPos::new(0, 0)).unwrap();
        factions.add_squad_to_faction(&mut world, red, brawlers, GridPos::new(1, 0)).unwrap();
        factions.add_squad_to_faction(&mut world, blue, target, GridPos::new(2, 0)).unwrap();

        let mut turns = TurnManager::new(&config, 0);
        turns.initialize_combat(&mut world, &[red, blue]).unwrap();
        turns.reset_squad_actions(&mut world, red);
        turns.reset_squad_actions(&mut world, blue);

        Fixture {
            world,
            red,
            blue,
            archers,
            brawlers,
            target,
        }
    }

    fn system() -> CombatActionSystem {
        let config = CombatConfig::default();
        CombatActionSystem::new(&config, SquadCombatResolver::new(&config, 11))
    }

    #[test]
    fn test_attack_range_and_in_range_units() {
        let fx = fixture();
        let actions = system();
        assert_eq!(actions.squad_attack_range(&fx.world, fx.archers), 3);
        assert_eq!(actions.squad_attack_range(&fx.world, SquadId(99)), 1);

        // Distance 2: the shield bearer (range 1) sits out
        let units = actions.attacking_units(&fx.world, fx.archers, fx.target);
        assert_eq!(units.len(), 3);
        assert!(units
            .iter()
            .all(|id| fx.world.roster.unit(*id).unwrap().name == "Archer"));
    }

    #[test]
    fn test_reason_ordering() {
        let mut fx = fixture();
        let actions = system();

        assert!(actions.can_squad_attack(&fx.world, fx.archers, fx.target));
        assert!(matches!(
            actions.can_squad_attack_with_reason(&fx.world, fx.archers, fx.brawlers),
            Err(CombatError::SameFaction)
        ));

        // Out of range for the brawlers? distance 1, range 1: fine
        assert!(actions.can_squad_attack(&fx.world, fx.brawlers, fx.target));

        fx.world.cache.action_state_mut(fx.archers).unwrap().has_acted = true;
        let err = actions
            .can_squad_attack_with_reason(&fx.world, fx.archers, fx.brawlers)
            .unwrap_err();
        assert_eq!(err.to_string(), "squad has already acted this turn");
    }

    #[test]
    fn test_out_of_range_changes_nothing() {
        let mut fx = fixture();
        let mut actions = system();
        fx.world.relocate_squad(fx.brawlers, GridPos::new(0, 1)).unwrap();
        let hp_before: Vec<u32> = fx
            .world
            .roster
            .units_in_squad(fx.target)
            .map(|u| u.current_hp)
            .collect();

        let err = actions
            .execute_attack_action(&mut fx.world, fx.brawlers, fx.target)
            .unwrap_err();
        assert_eq!(err.to_string(), "target out of range: 2 tiles away (max range 1)");
        assert!(!fx.world.action_state(fx.brawlers).unwrap().has_acted);
        let hp_after: Vec<u32> = fx
            .world
            .roster
            .units_in_squad(fx.target)
            .map(|u| u.current_hp)
            .collect();
        assert_eq!(hp_before, hp_after);
    }

    #[test]
    fn test_execute_marks_acted_and_restores_flags() {
        let mut fx = fixture();
        let mut actions = system();
        let log = actions
            .execute_attack_action(&mut fx.world, fx.archers, fx.target)
            .unwrap();

        assert_eq!(log.participant_count(), 3);
        assert!(fx.world.action_state(fx.archers).unwrap().has_acted);
        assert!(fx.world.roster.units_in_squad(fx.archers).all(|u| u.can_act));

        assert!(matches!(
            actions.execute_attack_action(&mut fx.world, fx.archers, fx.target),
            Err(CombatError::AlreadyActed)
        ));
    }

    #[test]
    fn test_legacy_resolver_through_filter() {
        let mut fx = fixture();
        let config = CombatConfig::default();
        let mut actions = CombatActionSystem::new(
            &config,
            ParticipationFilter::new(SquadCombatResolver::new(&config, 5)),
        );
        let log = actions
            .execute_attack_action(&mut fx.world, fx.archers, fx.target)
            .unwrap();
        assert_eq!(log.participant_count(), 3);
        assert!(fx.world.roster.units_in_squad(fx.archers).all(|u| u.can_act));
    }

    #[test]
    fn test_destroyed_defender_leaves_map() {
        let mut fx = fixture();
        let mut actions = system();
        // Leave a single 1-HP unit in the target squad
        let ids = fx.world.roster.unit_ids_in_squad(fx.target).to_vec();
        for (i, id) in ids.iter().enumerate() {
            let unit = fx.world.roster.unit_mut(*id).unwrap();
            unit.current_hp = if i == 0 { 1 } else { 0 };
        }

        let mut killed = false;
        for seed in 0..20 {
            *actions.resolver_mut() = SquadCombatResolver::new(&CombatConfig::default(), seed);
            fx.world.cache.action_state_mut(fx.brawlers).unwrap().has_acted = false;
            let log = actions
                .execute_attack_action(&mut fx.world, fx.brawlers, fx.target)
                .unwrap();
            if log.units_killed > 0 {
                killed = true;
                break;
            }
        }

        assert!(killed, "one of twenty seeded attacks should land");
        assert!(!fx.world.is_in_combat(fx.target));
        assert_eq!(fx.world.squad_at_position(GridPos::new(2, 0)), None);
        assert!(fx.world.roster.squad(fx.target).unwrap().destroyed);
        assert!(fx.world.squads_for_faction(fx.blue).is_empty());
    }

    #[test]
    fn test_squads_in_range_skips_friends() {
        let fx = fixture();
        let actions = system();
        assert_eq!(actions.squads_in_range(&fx.world, fx.archers), vec![fx.target]);
        assert_eq!(actions.squads_in_range(&fx.world, fx.brawlers), vec![fx.target]);
        assert!(actions.squads_in_range(&fx.world, fx.target).contains(&fx.brawlers));
        assert_eq!(fx.world.squad_faction(fx.archers), Some(fx.red));
    }
}
