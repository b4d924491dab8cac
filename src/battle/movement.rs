//! Squad repositioning against a per-turn movement budget
//!
//! Costs use Chebyshev distance, so the grid is 8-directional.

use serde::{Deserialize, Serialize};

use crate::battle::world::CombatWorld;
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{GridPos, SquadId};
use crate::spatial::Occupant;

/// What a successful move cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub from: GridPos,
    pub to: GridPos,
    pub cost: u32,
    pub remaining: u32,
}

pub struct MovementSystem {
    default_speed: u32,
}

impl MovementSystem {
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            default_speed: config.default_movement_speed,
        }
    }

    /// Slowest living member's speed
    pub fn squad_movement_speed(&self, world: &CombatWorld, squad: SquadId) -> u32 {
        world.roster.movement_speed(squad).unwrap_or(self.default_speed)
    }

    /// Empty tiles and tiles held only by friendly squads are enterable
    pub fn can_move_to(&self, world: &CombatWorld, squad: SquadId, target: GridPos) -> bool {
        if !world.dimensions.contains(target) {
            return false;
        }
        let own_faction = world.squad_faction(squad);
        world.spatial.entities_at(target).iter().all(|occupant| match occupant {
            Occupant::Squad(other) => {
                *other == squad || (own_faction.is_some() && world.squad_faction(*other) == own_faction)
            }
            Occupant::Obstacle(_) => false,
        })
    }

    /// Validate budget and destination, then move atomically
    pub fn move_squad(&self, world: &mut CombatWorld, squad: SquadId, target: GridPos) -> Result<MoveOutcome> {
        let remaining = world
            .action_state(squad)
            .map(|s| s.movement_remaining)
            .ok_or(CombatError::NoActionState(squad))?;
        if remaining == 0 {
            return Err(CombatError::NoMovementRemaining);
        }

        let from = world
            .squad_position(squad)
            .ok_or(CombatError::SquadNotInCombat(squad))?;
        let cost = from.chebyshev_distance(&target);
        if cost > remaining {
            return Err(CombatError::InsufficientMovement {
                need: cost,
                have: remaining,
            });
        }
        if !self.can_move_to(world, squad, target) {
            return Err(CombatError::CannotMoveTo(target));
        }

        world.relocate_squad(squad, target)?;
        let state = world
            .cache
            .action_state_mut(squad)
            .ok_or(CombatError::NoActionState(squad))?;
        state.movement_remaining = state.movement_remaining.saturating_sub(cost);
        state.has_moved = true;

        tracing::debug!("Squad {} moved {} -> {} (cost {})", squad, from, target, cost);
        Ok(MoveOutcome {
            from,
            to: target,
            cost,
            remaining: state.movement_remaining,
        })
    }

    /// Every tile the squad could legally enter with its remaining budget
    ///
    /// The squad's own tile is not listed.
    pub fn valid_movement_tiles(&self, world: &CombatWorld, squad: SquadId) -> Vec<GridPos> {
        let remaining = world
            .action_state(squad)
            .map(|s| s.movement_remaining)
            .unwrap_or(0);
        let Some(origin) = world.squad_position(squad) else {
            return Vec::new();
        };
        if remaining == 0 {
            return Vec::new();
        }

        let range = remaining as i32;
        let mut tiles = Vec::new();
        for dy in -range..=range {
            for dx in -range..=range {
                let tile = origin.offset(dx, dy);
                if tile == origin || origin.chebyshev_distance(&tile) > remaining {
                    continue;
                }
                if self.can_move_to(world, squad, tile) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }
}
