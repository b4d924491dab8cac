//! Dense per-tile storage

use crate::core::types::{GridPos, MapDimensions};

/// Row-major grid covering the whole tactical map
#[derive(Debug, Clone)]
pub struct TileGrid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> TileGrid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    pub fn for_map(dimensions: MapDimensions) -> Self {
        Self::new(dimensions.width as usize, dimensions.height as usize)
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<&T> {
        self.index(pos).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut T> {
        self.index(pos).map(move |i| &mut self.data[i])
    }

    /// Out-of-bounds writes are ignored
    #[inline]
    pub fn set(&mut self, pos: GridPos, value: T) {
        if let Some(i) = self.index(pos) {
            self.data[i] = value;
        }
    }

    /// Reset every tile to `T::default()`
    pub fn reset(&mut self) {
        self.data.fill(T::default());
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &T)> + '_ {
        let width = self.width;
        self.data.iter().enumerate().map(move |(i, value)| {
            (GridPos::new((i % width) as i32, (i / width) as i32), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_bounds() {
        let mut grid: TileGrid<u8> = TileGrid::new(4, 3);
        grid.set(GridPos::new(3, 2), 7);
        grid.set(GridPos::new(4, 0), 9);
        grid.set(GridPos::new(-1, 0), 9);

        assert_eq!(grid.get(GridPos::new(3, 2)), Some(&7));
        assert_eq!(grid.get(GridPos::new(4, 0)), None);
        assert_eq!(grid.iter().filter(|(_, v)| **v != 0).count(), 1);
    }

    #[test]
    fn test_reset_clears_all() {
        let mut grid: TileGrid<Option<u8>> = TileGrid::new(2, 2);
        grid.set(GridPos::new(0, 0), Some(1));
        grid.set(GridPos::new(1, 1), Some(2));
        grid.reset();
        assert!(grid.iter().all(|(_, v)| v.is_none()));
    }
}
