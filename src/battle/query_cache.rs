//! Maintained indices over combat records
//!
//! Every mutation goes through this type and updates all affected indices in
//! the same call, so lookups never scan the whole world. Ordered views are
//! kept in insertion order for deterministic iteration.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::faction::Faction;
use crate::core::types::{FactionId, GridPos, SquadId};

/// Per-squad, per-turn action economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    pub squad: SquadId,
    pub has_moved: bool,
    pub has_acted: bool,
    pub movement_remaining: u32,
}

impl ActionState {
    pub fn fresh(squad: SquadId, movement: u32) -> Self {
        Self {
            squad,
            has_moved: false,
            has_acted: false,
            movement_remaining: movement,
        }
    }
}

/// A squad is in combat iff it has one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLink {
    pub squad: SquadId,
    pub faction: FactionId,
    pub position: GridPos,
}

#[derive(Debug, Default, Clone)]
pub struct CombatQueryCache {
    factions: AHashMap<FactionId, Faction>,
    faction_order: Vec<FactionId>,
    links: AHashMap<SquadId, MapLink>,
    link_order: Vec<SquadId>,
    squads_by_faction: AHashMap<FactionId, Vec<SquadId>>,
    action_states: AHashMap<SquadId, ActionState>,
}

impl CombatQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // === FACTIONS ===

    pub fn insert_faction(&mut self, faction: Faction) {
        let id = faction.id;
        if self.factions.insert(id, faction).is_none() {
            self.faction_order.push(id);
            self.squads_by_faction.entry(id).or_default();
        }
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(&id)
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.get_mut(&id)
    }

    /// Faction ids in creation order
    pub fn faction_ids(&self) -> &[FactionId] {
        &self.faction_order
    }

    pub fn factions(&self) -> impl Iterator<Item = &Faction> + '_ {
        self.faction_order.iter().filter_map(|id| self.factions.get(id))
    }

    // === MAP LINKS ===

    /// Create or replace the link for `squad`, keeping the per-faction index in step
    pub fn insert_link(&mut self, link: MapLink) {
        match self.links.insert(link.squad, link) {
            Some(previous) if previous.faction != link.faction => {
                self.unindex_squad(previous.faction, link.squad);
                self.squads_by_faction.entry(link.faction).or_default().push(link.squad);
            }
            Some(_) => {}
            None => {
                self.link_order.push(link.squad);
                self.squads_by_faction.entry(link.faction).or_default().push(link.squad);
            }
        }
    }

    /// Drop the link and the squad's action state
    pub fn remove_link(&mut self, squad: SquadId) -> Option<MapLink> {
        let link = self.links.remove(&squad)?;
        self.link_order.retain(|s| *s != squad);
        self.unindex_squad(link.faction, squad);
        self.action_states.remove(&squad);
        Some(link)
    }

    fn unindex_squad(&mut self, faction: FactionId, squad: SquadId) {
        if let Some(squads) = self.squads_by_faction.get_mut(&faction) {
            squads.retain(|s| *s != squad);
        }
    }

    pub fn link(&self, squad: SquadId) -> Option<&MapLink> {
        self.links.get(&squad)
    }

    pub fn set_link_position(&mut self, squad: SquadId, position: GridPos) -> bool {
        match self.links.get_mut(&squad) {
            Some(link) => {
                link.position = position;
                true
            }
            None => false,
        }
    }

    /// Links in the order squads entered combat
    pub fn links(&self) -> impl Iterator<Item = &MapLink> + '_ {
        self.link_order.iter().filter_map(|id| self.links.get(id))
    }

    pub fn squads_for_faction(&self, faction: FactionId) -> &[SquadId] {
        self.squads_by_faction
            .get(&faction)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn faction_of(&self, squad: SquadId) -> Option<FactionId> {
        self.links.get(&squad).map(|l| l.faction)
    }

    // === ACTION STATES ===

    pub fn set_action_state(&mut self, state: ActionState) {
        self.action_states.insert(state.squad, state);
    }

    pub fn action_state(&self, squad: SquadId) -> Option<&ActionState> {
        self.action_states.get(&squad)
    }

    pub fn action_state_mut(&mut self, squad: SquadId) -> Option<&mut ActionState> {
        self.action_states.get_mut(&squad)
    }

    pub fn action_state_count(&self) -> usize {
        self.action_states.len()
    }

    pub fn clear_action_states(&mut self) {
        self.action_states.clear();
    }
}
