//! Turn order, round counting and per-turn action resets
//!
//! NoCombat -> FactionTurn(0) on `initialize_combat`; each `end_turn` moves
//! FactionTurn(i) -> FactionTurn((i + 1) mod n) and bumps the round on
//! wraparound. `end_combat` only deactivates the record.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::query_cache::ActionState;
use crate::battle::world::CombatWorld;
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{FactionId, SquadId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub current_round: u32,
    pub turn_order: Vec<FactionId>,
    pub current_turn_index: usize,
    pub combat_active: bool,
}

impl TurnState {
    pub fn current_faction(&self) -> Option<FactionId> {
        self.turn_order.get(self.current_turn_index).copied()
    }
}

pub struct TurnManager {
    state: Option<TurnState>,
    rng: ChaCha8Rng,
    default_speed: u32,
}

impl TurnManager {
    pub fn new(config: &CombatConfig, seed: u64) -> Self {
        Self {
            state: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            default_speed: config.default_movement_speed,
        }
    }

    /// Shuffle the turn order, create action states and open the first turn
    pub fn initialize_combat(&mut self, world: &mut CombatWorld, factions: &[FactionId]) -> Result<()> {
        if factions.is_empty() {
            return Err(CombatError::NoFactions);
        }
        if let Some(missing) = factions.iter().find(|f| world.cache.faction(**f).is_none()) {
            return Err(CombatError::FactionNotFound(*missing));
        }

        let mut turn_order = factions.to_vec();
        turn_order.shuffle(&mut self.rng);

        world.cache.clear_action_states();
        for faction in &turn_order {
            for squad in world.squads_for_faction(*faction).to_vec() {
                let speed = self.squad_speed(world, squad);
                world.create_action_state(squad, speed);
            }
        }

        let first = turn_order[0];
        self.state = Some(TurnState {
            current_round: 1,
            turn_order,
            current_turn_index: 0,
            combat_active: true,
        });
        self.reset_squad_actions(world, first);

        tracing::info!(
            "Combat started with {} factions; {} acts first",
            factions.len(),
            first
        );
        Ok(())
    }

    /// Advance to the next faction; returns the faction whose turn it now is
    pub fn end_turn(&mut self, world: &mut CombatWorld) -> Result<FactionId> {
        let state = self
            .state
            .as_mut()
            .filter(|s| s.combat_active)
            .ok_or(CombatError::NoActiveCombat)?;

        state.current_turn_index += 1;
        if state.current_turn_index >= state.turn_order.len() {
            state.current_turn_index = 0;
            state.current_round += 1;
            tracing::info!("Round {} begins", state.current_round);
        }
        let next = state
            .current_faction()
            .ok_or(CombatError::NoActiveCombat)?;

        self.reset_squad_actions(world, next);
        tracing::debug!("Turn passes to faction {}", next);
        Ok(next)
    }

    pub fn end_combat(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.combat_active = false;
            tracing::info!("Combat ended after {} rounds", state.current_round);
        }
    }

    fn active_state(&self) -> Option<&TurnState> {
        self.state.as_ref().filter(|s| s.combat_active)
    }

    pub fn is_combat_active(&self) -> bool {
        self.active_state().is_some()
    }

    /// None when no combat is active
    pub fn current_faction(&self) -> Option<FactionId> {
        self.active_state().and_then(TurnState::current_faction)
    }

    /// 0 when no combat is active
    pub fn current_round(&self) -> u32 {
        self.active_state().map(|s| s.current_round).unwrap_or(0)
    }

    /// Record kept after `end_combat`
    pub fn turn_state(&self) -> Option<&TurnState> {
        self.state.as_ref()
    }

    /// Owned by the acting faction and not yet acted this turn
    pub fn is_squad_activatable(&self, world: &CombatWorld, squad: SquadId) -> bool {
        let Some(current) = self.current_faction() else {
            return false;
        };
        if world.squad_faction(squad) != Some(current) {
            return false;
        }
        world
            .action_state(squad)
            .map(|s| !s.has_acted)
            .unwrap_or(false)
    }

    fn squad_speed(&self, world: &CombatWorld, squad: SquadId) -> u32 {
        world.roster.movement_speed(squad).unwrap_or(self.default_speed)
    }

    /// Fresh action state for every squad of `faction`
    pub fn reset_squad_actions(&self, world: &mut CombatWorld, faction: FactionId) {
        for squad in world.squads_for_faction(faction).to_vec() {
            let speed = self.squad_speed(world, squad);
            world.cache.set_action_state(ActionState::fresh(squad, speed));
        }
    }
}
