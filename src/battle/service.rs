//! Upstream facade: the operations an orchestration or UI layer calls
//!
//! Engine errors are flattened into result records here; everything below
//! this layer speaks `Result<T, CombatError>`.

use serde::{Deserialize, Serialize};

use crate::battle::actions::CombatActionSystem;
use crate::battle::faction::FactionManager;
use crate::battle::log::{BattleEventLog, BattleEventType};
use crate::battle::movement::MovementSystem;
use crate::battle::turns::TurnManager;
use crate::battle::victory::{check_victory_condition, VictoryCheckResult};
use crate::battle::world::CombatWorld;
use crate::combat::{AttackResolver, CombatLog, SquadCombatResolver};
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{FactionId, GridPos, SquadId};
use crate::threat::{DangerVisualizer, FactionThreatLevelManager};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    pub success: bool,
    pub reason: Option<String>,
    pub attacker_name: String,
    pub target_name: String,
    pub target_destroyed: bool,
    pub damage_dealt: u32,
    pub combat_log: Option<CombatLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub success: bool,
    pub reason: Option<String>,
    pub squad_name: String,
    pub new_position: Option<GridPos>,
    pub movement_cost: u32,
    pub remaining_budget: u32,
}

pub struct CombatService<R: AttackResolver = SquadCombatResolver> {
    world: CombatWorld,
    turns: TurnManager,
    factions: FactionManager,
    movement: MovementSystem,
    actions: CombatActionSystem<R>,
    threats: FactionThreatLevelManager,
    events: BattleEventLog,
}

impl CombatService<SquadCombatResolver> {
    /// Turn order and dice draw from separate streams derived from `seed`
    pub fn new(config: &CombatConfig, world: CombatWorld, seed: u64) -> Self {
        let resolver = SquadCombatResolver::new(config, seed.wrapping_add(1));
        Self::with_resolver(config, world, seed, resolver)
    }
}

impl<R: AttackResolver> CombatService<R> {
    pub fn with_resolver(config: &CombatConfig, world: CombatWorld, seed: u64, resolver: R) -> Self {
        Self {
            world,
            turns: TurnManager::new(config, seed),
            factions: FactionManager::new(config),
            movement: MovementSystem::new(config),
            actions: CombatActionSystem::new(config, resolver),
            threats: FactionThreatLevelManager::new(config),
            events: BattleEventLog::new(),
        }
    }

    pub fn world(&self) -> &CombatWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut CombatWorld {
        &mut self.world
    }

    pub fn turns(&self) -> &TurnManager {
        &self.turns
    }

    pub fn faction_manager(&self) -> &FactionManager {
        &self.factions
    }

    pub fn actions(&self) -> &CombatActionSystem<R> {
        &self.actions
    }

    pub fn threats(&self) -> &FactionThreatLevelManager {
        &self.threats
    }

    pub fn events(&self) -> &BattleEventLog {
        &self.events
    }

    pub fn create_faction(&mut self, name: &str, is_player: bool) -> FactionId {
        self.factions.create_faction(&mut self.world, name, is_player)
    }

    pub fn create_faction_with_player(&mut self, name: &str, player_id: u32, player_name: &str) -> FactionId {
        self.factions
            .create_faction_with_player(&mut self.world, name, player_id, player_name)
    }

    pub fn add_squad_to_faction(&mut self, faction: FactionId, squad: SquadId, pos: GridPos) -> Result<()> {
        self.factions.add_squad_to_faction(&mut self.world, faction, squad, pos)
    }

    pub fn initialize_combat(&mut self, factions: &[FactionId]) -> Result<()> {
        self.turns.initialize_combat(&mut self.world, factions)?;
        for faction in factions {
            self.threats.add_faction(&self.world, *faction);
        }

        let round = self.turns.current_round();
        self.events
            .push(round, BattleEventType::CombatStarted, format!("Combat started with {} factions", factions.len()));
        if let Some(first) = self.turns.current_faction() {
            self.push_turn_started(first);
        }
        Ok(())
    }

    /// Advance the turn and refresh threat curves for the new movement budgets
    pub fn end_turn(&mut self) -> Result<FactionId> {
        let next = self.turns.end_turn(&mut self.world)?;
        self.threats.update_all_factions(&self.world);
        self.push_turn_started(next);
        Ok(next)
    }

    pub fn end_combat(&mut self) -> VictoryCheckResult {
        let result = self.check_victory_condition();
        let round = self.turns.current_round();
        self.turns.end_combat();
        let description = match result.victor_faction {
            Some(_) => format!("Combat ended; {} is victorious", result.victor_name),
            None => "Combat ended without a victor".to_string(),
        };
        self.events.push(
            round,
            BattleEventType::CombatEnded {
                victor: result.victor_faction,
            },
            description,
        );
        result
    }

    fn push_turn_started(&mut self, faction: FactionId) {
        let name = self.factions.faction_name(&self.world, faction);
        self.events.push(
            self.turns.current_round(),
            BattleEventType::TurnStarted { faction },
            format!("{}'s turn", name),
        );
    }

    /// Combat is active and `squad` belongs to the faction whose turn it is
    fn ensure_squads_turn(&self, squad: SquadId) -> Result<()> {
        let current = self
            .turns
            .current_faction()
            .ok_or(CombatError::NoActiveCombat)?;
        if !self.world.roster.contains(squad) {
            return Err(CombatError::SquadNotFound(squad));
        }
        let faction = self
            .world
            .squad_faction(squad)
            .ok_or(CombatError::SquadNotInCombat(squad))?;
        if faction != current {
            return Err(CombatError::NotFactionTurn(squad));
        }
        Ok(())
    }

    pub fn execute_squad_attack(&mut self, attacker: SquadId, target: SquadId) -> AttackResult {
        let attacker_name = self.world.roster.squad_name(attacker).to_string();
        let target_name = self.world.roster.squad_name(target).to_string();

        match self.try_attack(attacker, target) {
            Ok(log) => {
                let target_destroyed = self.world.roster.is_squad_destroyed(target);
                AttackResult {
                    success: true,
                    reason: None,
                    attacker_name,
                    target_name,
                    target_destroyed,
                    damage_dealt: log.total_damage,
                    combat_log: Some(log),
                }
            }
            Err(err) => {
                tracing::debug!("Attack {} -> {} rejected: {}", attacker, target, err);
                AttackResult {
                    success: false,
                    reason: Some(err.to_string()),
                    attacker_name,
                    target_name,
                    target_destroyed: false,
                    damage_dealt: 0,
                    combat_log: None,
                }
            }
        }
    }

    fn try_attack(&mut self, attacker: SquadId, target: SquadId) -> Result<CombatLog> {
        self.ensure_squads_turn(attacker)?;
        if !self.world.roster.contains(target) {
            return Err(CombatError::SquadNotFound(target));
        }
        let target_faction = self.world.squad_faction(target);

        let log = self
            .actions
            .execute_attack_action(&mut self.world, attacker, target)?;

        let round = self.turns.current_round();
        self.events.push(
            round,
            BattleEventType::SquadAttacked {
                attacker,
                target,
                damage: log.total_damage,
            },
            format!(
                "{} attacked {} for {} damage ({} killed)",
                log.attacker_name, log.defender_name, log.total_damage, log.units_killed
            ),
        );
        if self.world.roster.is_squad_destroyed(target) {
            self.events.push(
                round,
                BattleEventType::SquadDestroyed { squad: target },
                format!("{} was destroyed", log.defender_name),
            );
        }

        if let Some(faction) = target_faction {
            self.threats.update_faction(&self.world, faction);
        }
        Ok(log)
    }

    pub fn move_squad(&mut self, squad: SquadId, target: GridPos) -> MoveResult {
        let squad_name = self.world.roster.squad_name(squad).to_string();

        let outcome = self.ensure_squads_turn(squad).and_then(|()| {
            self.movement.move_squad(&mut self.world, squad, target)
        });
        match outcome {
            Ok(moved) => {
                self.events.push(
                    self.turns.current_round(),
                    BattleEventType::SquadMoved { squad, to: moved.to },
                    format!("{} moved {} -> {}", squad_name, moved.from, moved.to),
                );
                if let Some(faction) = self.world.squad_faction(squad) {
                    self.threats.update_faction(&self.world, faction);
                }
                MoveResult {
                    success: true,
                    reason: None,
                    squad_name,
                    new_position: Some(moved.to),
                    movement_cost: moved.cost,
                    remaining_budget: moved.remaining,
                }
            }
            Err(err) => {
                tracing::debug!("Move of {} to {} rejected: {}", squad, target, err);
                let remaining_budget = self
                    .world
                    .action_state(squad)
                    .map(|s| s.movement_remaining)
                    .unwrap_or(0);
                MoveResult {
                    success: false,
                    reason: Some(err.to_string()),
                    squad_name,
                    new_position: None,
                    movement_cost: 0,
                    remaining_budget,
                }
            }
        }
    }

    pub fn valid_movement_tiles(&self, squad: SquadId) -> Vec<GridPos> {
        self.movement.valid_movement_tiles(&self.world, squad)
    }

    pub fn squads_in_range(&self, squad: SquadId) -> Vec<SquadId> {
        self.actions.squads_in_range(&self.world, squad)
    }

    pub fn can_squad_attack_with_reason(&self, squad: SquadId, target: SquadId) -> Result<()> {
        self.actions.can_squad_attack_with_reason(&self.world, squad, target)
    }

    pub fn is_squad_activatable(&self, squad: SquadId) -> bool {
        self.turns.is_squad_activatable(&self.world, squad)
    }

    /// Rounds come from the turn record, which survives `end_combat`
    pub fn check_victory_condition(&self) -> VictoryCheckResult {
        let rounds = self.turns.turn_state().map(|s| s.current_round).unwrap_or(0);
        check_victory_condition(&self.world, rounds)
    }

    /// Repaint the overlay for the acting faction; false outside combat
    pub fn refresh_visualizer(&self, visualizer: &mut DangerVisualizer, center: GridPos) -> bool {
        let Some(faction) = self.turns.current_faction() else {
            return false;
        };
        visualizer.update(&self.world, &self.threats, faction, self.turns.current_round(), center)
    }
}
