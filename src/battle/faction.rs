//! Faction records and squad membership

use serde::{Deserialize, Serialize};

use crate::battle::world::CombatWorld;
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{FactionId, GridPos, SquadId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub mana: u32,
    pub max_mana: u32,
    pub is_player_controlled: bool,
    pub player_id: Option<u32>,
    pub player_name: Option<String>,
}

impl Faction {
    /// Name with the controlling player appended when there is one
    pub fn display_name(&self) -> String {
        match &self.player_name {
            Some(player) => format!("{} ({})", self.name, player),
            None => self.name.clone(),
        }
    }
}

pub struct FactionManager {
    next_id: u32,
    starting_mana: u32,
    max_mana: u32,
}

impl FactionManager {
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            next_id: 0,
            starting_mana: config.starting_mana,
            max_mana: config.max_mana,
        }
    }

    pub fn create_faction(&mut self, world: &mut CombatWorld, name: &str, is_player: bool) -> FactionId {
        self.next_id += 1;
        let id = FactionId(self.next_id);
        world.cache.insert_faction(Faction {
            id,
            name: name.to_string(),
            mana: self.starting_mana,
            max_mana: self.max_mana,
            is_player_controlled: is_player,
            player_id: None,
            player_name: None,
        });
        tracing::debug!("Created faction {} '{}'", id, name);
        id
    }

    pub fn create_faction_with_player(
        &mut self,
        world: &mut CombatWorld,
        name: &str,
        player_id: u32,
        player_name: &str,
    ) -> FactionId {
        let id = self.create_faction(world, name, true);
        if let Some(faction) = world.cache.faction_mut(id) {
            faction.player_id = Some(player_id);
            faction.player_name = Some(player_name.to_string());
        }
        id
    }

    /// Put a squad into combat for `faction` at `pos`
    ///
    /// A squad already on the map is moved and, if needed, reassigned.
    pub fn add_squad_to_faction(
        &self,
        world: &mut CombatWorld,
        faction: FactionId,
        squad: SquadId,
        pos: GridPos,
    ) -> Result<()> {
        if world.cache.faction(faction).is_none() {
            return Err(CombatError::FactionNotFound(faction));
        }
        if !world.roster.contains(squad) {
            return Err(CombatError::SquadNotFound(squad));
        }

        match world.cache.link(squad).copied() {
            Some(mut link) => {
                world.relocate_squad(squad, pos)?;
                if link.faction != faction {
                    link.faction = faction;
                    link.position = pos;
                    world.cache.insert_link(link);
                }
            }
            None => world.place_squad(squad, faction, pos),
        }
        Ok(())
    }

    pub fn remove_squad_from_faction(
        &self,
        world: &mut CombatWorld,
        faction: FactionId,
        squad: SquadId,
    ) -> Result<()> {
        if !world.roster.contains(squad) {
            return Err(CombatError::SquadNotFound(squad));
        }
        let link = world
            .cache
            .link(squad)
            .ok_or(CombatError::SquadNotInCombat(squad))?;
        if link.faction != faction {
            return Err(CombatError::SquadNotOwnedByFaction { squad, faction });
        }
        world.remove_squad_from_map(squad);
        Ok(())
    }

    pub fn faction_squads(&self, world: &CombatWorld, faction: FactionId) -> Vec<SquadId> {
        world.squads_for_faction(faction).to_vec()
    }

    /// (current, max) mana
    pub fn faction_mana(&self, world: &CombatWorld, faction: FactionId) -> Option<(u32, u32)> {
        world.cache.faction(faction).map(|f| (f.mana, f.max_mana))
    }

    pub fn faction_name(&self, world: &CombatWorld, faction: FactionId) -> String {
        world
            .cache
            .faction(faction)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn player_factions(&self, world: &CombatWorld) -> Vec<FactionId> {
        world
            .cache
            .factions()
            .filter(|f| f.is_player_controlled)
            .map(|f| f.id)
            .collect()
    }

    /// Returns false (and spends nothing) when the pool is too small
    pub fn spend_mana(&self, world: &mut CombatWorld, faction: FactionId, amount: u32) -> Result<bool> {
        let entry = world
            .cache
            .faction_mut(faction)
            .ok_or(CombatError::FactionNotFound(faction))?;
        if entry.mana < amount {
            return Ok(false);
        }
        entry.mana -= amount;
        Ok(true)
    }

    pub fn restore_mana(&self, world: &mut CombatWorld, faction: FactionId, amount: u32) -> Result<u32> {
        let entry = world
            .cache
            .faction_mut(faction)
            .ok_or(CombatError::FactionNotFound(faction))?;
        entry.mana = entry.mana.saturating_add(amount).min(entry.max_mana);
        Ok(entry.mana)
    }
}
