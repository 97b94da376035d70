//! Disjoint-set forest with path compression and union by rank

use crate::grid::{CELL_COUNT, Position};

/// Disjoint sets over `0..len`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    num_sets: usize,
}

impl UnionFind {
    /// `len` singleton sets
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
            num_sets: len,
        }
    }

    /// One element per grid cell
    pub fn for_grid() -> Self {
        Self::new(CELL_COUNT)
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `x`'s set. Flattens the path it walks.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets of `x` and `y`. Returns `false` if already joined.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return false;
        }
        match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => self.parent[rx] = ry,
            std::cmp::Ordering::Greater => self.parent[ry] = rx,
            std::cmp::Ordering::Equal => {
                self.parent[ry] = rx;
                self.rank[rx] += 1;
            }
        }
        self.num_sets -= 1;
        true
    }

    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    /// Back to all singletons, keeping the allocation
    pub fn reset(&mut self) {
        for (i, p) in self.parent.iter_mut().enumerate() {
            *p = i;
        }
        self.rank.fill(0);
        self.num_sets = self.parent.len();
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Every set, members ascending. Sets are ordered by their smallest
    /// member, so the output does not depend on union order.
    pub fn sets(&mut self) -> Vec<Vec<usize>> {
        let len = self.len();
        let mut slot_of_root = vec![usize::MAX; len];
        let mut sets: Vec<Vec<usize>> = Vec::with_capacity(self.num_sets);
        for i in 0..len {
            let root = self.find(i);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = sets.len();
                sets.push(Vec::new());
            }
            sets[slot_of_root[root]].push(i);
        }
        sets
    }

    /// Members of `x`'s set, ascending
    pub fn set_members(&mut self, x: usize) -> Vec<usize> {
        let root = self.find(x);
        (0..self.len()).filter(|&i| self.find(i) == root).collect()
    }

    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        (0..self.len()).filter(|&i| self.find(i) == root).count()
    }

    // ─── Grid helpers ───────────────────────────────────────────────────────────

    pub fn union_positions(&mut self, a: Position, b: Position) -> bool {
        self.union(a.index(), b.index())
    }

    pub fn find_position(&mut self, pos: Position) -> usize {
        self.find(pos.index())
    }

    /// Positions sharing a set with `pos`, row-major
    pub fn cluster_positions(&mut self, pos: Position) -> Vec<Position> {
        self.set_members(pos.index())
            .into_iter()
            .filter_map(Position::from_index)
            .collect()
    }
}
