//! Elimination victory check

use serde::{Deserialize, Serialize};

use crate::battle::world::CombatWorld;
use crate::core::types::FactionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryCheckResult {
    pub battle_over: bool,
    /// None while the battle continues, and on a draw
    pub victor_faction: Option<FactionId>,
    pub victor_name: String,
    pub defeated_factions: Vec<FactionId>,
    pub rounds_completed: u32,
}

/// The battle ends when at most one faction still fields a living squad
pub fn check_victory_condition(world: &CombatWorld, rounds_completed: u32) -> VictoryCheckResult {
    let (standing, defeated): (Vec<FactionId>, Vec<FactionId>) = world
        .all_factions()
        .iter()
        .copied()
        .partition(|f| !world.active_squads_for_faction(*f).is_empty());

    let battle_over = standing.len() <= 1;
    let victor_faction = if battle_over { standing.first().copied() } else { None };
    let victor_name = victor_faction
        .and_then(|f| world.cache.faction(f))
        .map(|f| f.display_name())
        .unwrap_or_default();

    if battle_over {
        match victor_faction {
            Some(f) => tracing::info!("Faction {} '{}' is victorious", f, victor_name),
            None => tracing::info!("Battle ended in a draw"),
        }
    }

    VictoryCheckResult {
        battle_over,
        victor_faction,
        victor_name,
        defeated_factions: defeated,
        rounds_completed,
    }
}
