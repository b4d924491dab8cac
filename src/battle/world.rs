//! Shared stores every combat system operates on

use crate::battle::query_cache::{ActionState, CombatQueryCache, MapLink};
use crate::core::error::{CombatError, Result};
use crate::core::types::{FactionId, GridPos, MapDimensions, SquadId};
use crate::spatial::{Occupant, PositionIndex};
use crate::squads::SquadRoster;

/// Roster, occupancy and cached combat records for one tactical map
#[derive(Debug, Clone)]
pub struct CombatWorld {
    pub roster: SquadRoster,
    pub spatial: PositionIndex,
    pub cache: CombatQueryCache,
    pub dimensions: MapDimensions,
}

impl CombatWorld {
    pub fn new(dimensions: MapDimensions, roster: SquadRoster) -> Self {
        Self {
            roster,
            spatial: PositionIndex::new(),
            cache: CombatQueryCache::new(),
            dimensions,
        }
    }

    pub fn squad_faction(&self, squad: SquadId) -> Option<FactionId> {
        self.cache.faction_of(squad)
    }

    /// Position of a squad that is in combat
    pub fn squad_position(&self, squad: SquadId) -> Option<GridPos> {
        self.cache.link(squad).map(|l| l.position)
    }

    pub fn is_in_combat(&self, squad: SquadId) -> bool {
        self.cache.link(squad).is_some()
    }

    pub fn squad_at_position(&self, pos: GridPos) -> Option<SquadId> {
        self.spatial.squad_at(pos)
    }

    pub fn squads_for_faction(&self, faction: FactionId) -> &[SquadId] {
        self.cache.squads_for_faction(faction)
    }

    /// Squads of `faction` with at least one living unit
    pub fn active_squads_for_faction(&self, faction: FactionId) -> Vec<SquadId> {
        self.squads_for_faction(faction)
            .iter()
            .copied()
            .filter(|s| !self.roster.is_squad_destroyed(*s))
            .collect()
    }

    pub fn all_factions(&self) -> &[FactionId] {
        self.cache.faction_ids()
    }

    pub fn action_state(&self, squad: SquadId) -> Option<&ActionState> {
        self.cache.action_state(squad)
    }

    pub fn create_action_state(&mut self, squad: SquadId, movement: u32) {
        self.cache.set_action_state(ActionState::fresh(squad, movement));
    }

    /// Place a squad on the map for the first time
    pub fn place_squad(&mut self, squad: SquadId, faction: FactionId, pos: GridPos) {
        self.spatial.add_entity(Occupant::Squad(squad), pos);
        self.roster.set_squad_position(squad, Some(pos));
        self.cache.insert_link(MapLink {
            squad,
            faction,
            position: pos,
        });
    }

    /// Move a linked squad; position record, spatial index and link change together
    pub fn relocate_squad(&mut self, squad: SquadId, to: GridPos) -> Result<()> {
        let from = self
            .squad_position(squad)
            .ok_or(CombatError::SquadNotInCombat(squad))?;
        self.spatial.move_entity(Occupant::Squad(squad), from, to)?;
        self.roster.set_squad_position(squad, Some(to));
        self.cache.set_link_position(squad, to);
        Ok(())
    }

    /// Drop the link, the action state and the spatial registration
    pub fn remove_squad_from_map(&mut self, squad: SquadId) -> Option<MapLink> {
        let link = self.cache.remove_link(squad)?;
        self.spatial.remove_entity(Occupant::Squad(squad), link.position);
        self.roster.set_squad_position(squad, None);
        Some(link)
    }
}
