//! Fixed-size bitset over the 25 grid cells

use serde::{Deserialize, Serialize};

use crate::grid::{CELL_COUNT, Position};

/// Set of grid positions, one bit per cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellSet(u32);

impl CellSet {
    const MASK: u32 = (1u32 << CELL_COUNT) - 1;

    pub const fn new() -> Self {
        Self(0)
    }

    /// Every cell of the grid
    pub const fn full() -> Self {
        Self(Self::MASK)
    }

    #[inline(always)]
    pub fn insert(&mut self, pos: Position) -> bool {
        let bit = 1u32 << pos.index();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    #[inline(always)]
    pub fn remove(&mut self, pos: Position) -> bool {
        let bit = 1u32 << pos.index();
        let present = self.0 & bit != 0;
        self.0 &= !bit;
        present
    }

    #[inline(always)]
    pub fn contains(&self, pos: Position) -> bool {
        self.0 & (1u32 << pos.index()) != 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn union(self, other: CellSet) -> CellSet {
        CellSet(self.0 | other.0)
    }

    pub fn intersection(self, other: CellSet) -> CellSet {
        CellSet(self.0 & other.0)
    }

    pub fn difference(self, other: CellSet) -> CellSet {
        CellSet(self.0 & !other.0)
    }

    /// Raw bit pattern (bit i = cell index i)
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Positions in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let idx = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Position::from_index(idx)
        })
    }

    pub fn to_vec(&self) -> Vec<Position> {
        self.iter().collect()
    }
}

impl FromIterator<Position> for CellSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut set = CellSet::new();
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

impl Extend<Position> for CellSet {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        for pos in iter {
            self.insert(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    #[test]
    fn test_insert_remove_contains() {
        let mut set = CellSet::new();
        assert!(set.insert(pos(0, 0)));
        assert!(!set.insert(pos(0, 0)));
        assert!(set.insert(pos(4, 4)));
        assert!(set.contains(pos(4, 4)));
        assert_eq!(set.len(), 2);
        assert!(set.remove(pos(0, 0)));
        assert!(!set.remove(pos(0, 0)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_iter_ascending() {
        let set: CellSet = [pos(3, 1), pos(0, 2), pos(1, 0)].into_iter().collect();
        assert_eq!(set.to_vec(), vec![pos(0, 2), pos(1, 0), pos(3, 1)]);
    }

    #[test]
    fn test_set_algebra() {
        let a: CellSet = [pos(0, 0), pos(1, 1)].into_iter().collect();
        let b: CellSet = [pos(1, 1), pos(2, 2)].into_iter().collect();
        assert_eq!(a.union(b).len(), 3);
        assert_eq!(a.intersection(b).to_vec(), vec![pos(1, 1)]);
        assert_eq!(a.difference(b).to_vec(), vec![pos(0, 0)]);
        assert_eq!(CellSet::full().len(), CELL_COUNT);
    }
}
