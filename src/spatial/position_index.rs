//! Sparse tile-occupancy index

use ahash::AHashMap;

use crate::core::error::{CombatError, Result};
use crate::core::types::{GridPos, ObstacleId, SquadId};

/// Anything that can stand on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Squad(SquadId),
    Obstacle(ObstacleId),
}

impl Occupant {
    pub fn squad(&self) -> Option<SquadId> {
        match self {
            Occupant::Squad(id) => Some(*id),
            Occupant::Obstacle(_) => None,
        }
    }
}

/// O(1) occupancy lookup keyed by tile
///
/// A tile may hold several occupants: friendly squads are allowed to share.
#[derive(Debug, Default, Clone)]
pub struct PositionIndex {
    cells: AHashMap<GridPos, Vec<Occupant>>,
    count: usize,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.count = 0;
    }

    pub fn add_entity(&mut self, occupant: Occupant, pos: GridPos) {
        self.cells.entry(pos).or_default().push(occupant);
        self.count += 1;
    }

    /// Returns false when the occupant was not registered at `pos`
    pub fn remove_entity(&mut self, occupant: Occupant, pos: GridPos) -> bool {
        let Some(cell) = self.cells.get_mut(&pos) else {
            return false;
        };
        let Some(idx) = cell.iter().position(|o| *o == occupant) else {
            return false;
        };
        cell.remove(idx);
        if cell.is_empty() {
            self.cells.remove(&pos);
        }
        self.count -= 1;
        true
    }

    /// Move an occupant between tiles; nothing changes if it is not at `from`
    pub fn move_entity(&mut self, occupant: Occupant, from: GridPos, to: GridPos) -> Result<()> {
        if from == to {
            return if self.entities_at(from).contains(&occupant) {
                Ok(())
            } else {
                Err(CombatError::NotAtPosition(from))
            };
        }
        if !self.remove_entity(occupant, from) {
            return Err(CombatError::NotAtPosition(from));
        }
        self.add_entity(occupant, to);
        Ok(())
    }

    /// First occupant registered at `pos`
    #[inline]
    pub fn entity_at(&self, pos: GridPos) -> Option<Occupant> {
        self.cells.get(&pos).and_then(|cell| cell.first().copied())
    }

    pub fn entities_at(&self, pos: GridPos) -> &[Occupant] {
        self.cells.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First squad registered at `pos`, skipping obstacles
    pub fn squad_at(&self, pos: GridPos) -> Option<SquadId> {
        self.entities_at(pos).iter().find_map(Occupant::squad)
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.cells.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut index = PositionIndex::new();
        let pos = GridPos::new(3, 4);
        index.add_entity(Occupant::Squad(SquadId(1)), pos);

        assert_eq!(index.entity_at(pos), Some(Occupant::Squad(SquadId(1))));
        assert_eq!(index.squad_at(pos), Some(SquadId(1)));
        assert_eq!(index.entity_at(GridPos::new(0, 0)), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_shared_tile_and_removal() {
        let mut index = PositionIndex::new();
        let pos = GridPos::new(1, 1);
        index.add_entity(Occupant::Obstacle(ObstacleId(9)), pos);
        index.add_entity(Occupant::Squad(SquadId(2)), pos);

        assert_eq!(index.entities_at(pos).len(), 2);
        assert_eq!(index.squad_at(pos), Some(SquadId(2)));

        assert!(index.remove_entity(Occupant::Obstacle(ObstacleId(9)), pos));
        assert!(!index.remove_entity(Occupant::Obstacle(ObstacleId(9)), pos));
        assert_eq!(index.entity_at(pos), Some(Occupant::Squad(SquadId(2))));

        assert!(index.remove_entity(Occupant::Squad(SquadId(2)), pos));
        assert!(!index.is_occupied(pos));
        assert!(index.is_empty());
    }

    #[test]
    fn test_move_requires_source() {
        let mut index = PositionIndex::new();
        let squad = Occupant::Squad(SquadId(5));
        let from = GridPos::new(0, 0);
        let to = GridPos::new(2, 1);

        assert!(index.move_entity(squad, from, to).is_err());
        assert!(index.is_empty());

        index.add_entity(squad, from);
        index.move_entity(squad, from, to).unwrap();
        assert_eq!(index.entity_at(from), None);
        assert_eq!(index.entity_at(to), Some(squad));
        assert_eq!(index.len(), 1);
    }
}
