//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for factions taking part in a combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for squads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SquadId(pub u32);

impl SquadId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for individual units inside squads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier for static map blockers (walls, rubble)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_id!(FactionId, SquadId, UnitId, ObstacleId);

/// Tile coordinate on the tactical map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// max(|dx|, |dy|): diagonal steps cost the same as orthogonal ones
    pub fn chebyshev_distance(&self, other: &Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    pub fn manhattan_distance(&self, other: &Self) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// One step toward `target` along both axes
    pub fn step_toward(&self, target: &Self) -> Self {
        self.offset((target.x - self.x).signum(), (target.y - self.y).signum())
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Bounds of the tactical map in tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_counts_diagonals_as_one() {
        let a = GridPos::new(0, 0);
        assert_eq!(a.chebyshev_distance(&GridPos::new(3, 3)), 3);
        assert_eq!(a.chebyshev_distance(&GridPos::new(-2, 5)), 5);
        assert_eq!(a.manhattan_distance(&GridPos::new(3, 3)), 6);
    }

    #[test]
    fn test_step_toward() {
        let a = GridPos::new(2, 2);
        assert_eq!(a.step_toward(&GridPos::new(5, 2)), GridPos::new(3, 2));
        assert_eq!(a.step_toward(&GridPos::new(0, 0)), GridPos::new(1, 1));
        assert_eq!(a.step_toward(&a), a);
    }

    #[test]
    fn test_map_bounds() {
        let dims = MapDimensions::new(10, 5);
        assert!(dims.contains(GridPos::new(0, 0)));
        assert!(dims.contains(GridPos::new(9, 4)));
        assert!(!dims.contains(GridPos::new(10, 0)));
        assert!(!dims.contains(GridPos::new(-1, 2)));
        assert_eq!(dims.tile_count(), 50);
    }
}
