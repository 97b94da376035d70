//! Cluster detection
//!
//! Each paying symbol type present on the grid gets its own connectivity
//! pass over that type's cells plus every wild. A wild can therefore end up
//! in several clusters of different types at once.

use serde::{Deserialize, Serialize};

use crate::cellset::CellSet;
use crate::config::GameConfig;
use crate::grid::{Grid, Position};
use crate::paytable::{MAX_PAY_SIZE, MIN_PAY_SIZE};
use crate::symbols::Symbol;
use crate::union_find::UnionFind;

/// A winning connected group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Paying symbol the cluster pays as (never a wild)
    pub symbol: Symbol,
    /// Every member, row-major, wilds included. May exceed the pay cap.
    pub positions: Vec<Position>,
    /// Member count clipped to the pay cap
    pub size: usize,
}

impl Cluster {
    /// Unclipped member count
    pub fn member_count(&self) -> usize {
        self.positions.len()
    }

    pub fn cells(&self) -> CellSet {
        self.positions.iter().copied().collect()
    }
}

/// Finds winning clusters on a grid
#[derive(Debug, Clone)]
pub struct ClusterDetector {
    min_size: usize,
    pay_cap: usize,
    uf: UnionFind,
}

impl ClusterDetector {
    pub fn new(min_size: usize, pay_cap: usize) -> Self {
        Self {
            min_size,
            pay_cap,
            uf: UnionFind::for_grid(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.min_cluster_size, config.cluster_pay_cap)
    }

    /// All clusters on `grid`.
    ///
    /// Ordered by symbol id descending, then clipped size descending; ties
    /// keep discovery order (symbol types by first appearance, groups by
    /// lowest cell).
    pub fn find_clusters(&mut self, grid: &Grid) -> Vec<Cluster> {
        let wilds = grid.select(Symbol::is_wild);

        // Paying types in order of first appearance
        let mut types: Vec<Symbol> = Vec::with_capacity(Symbol::PAYING.len());
        for &symbol in grid.cells() {
            if symbol.is_paying() && !types.contains(&symbol) {
                types.push(symbol);
            }
        }

        let mut clusters = Vec::new();
        for symbol in types {
            self.collect_for_type(grid, symbol, wilds, &mut clusters);
        }

        clusters.sort_by(|a, b| {
            b.symbol
                .id()
                .cmp(a.symbol.id())
                .then(b.size.cmp(&a.size))
        });
        clusters
    }

    fn collect_for_type(
        &mut self,
        grid: &Grid,
        symbol: Symbol,
        wilds: CellSet,
        out: &mut Vec<Cluster>,
    ) {
        let own = grid.select(|s| s == symbol);
        let relevant = own.union(wilds);

        self.uf.reset();
        for pos in relevant.iter() {
            for adj in pos.neighbors() {
                // Within `relevant` every pair connects except two
                // differently typed paying cells, which cannot occur here
                if relevant.contains(adj) {
                    self.uf.union_positions(pos, adj);
                }
            }
        }

        for members in self.uf.sets() {
            let positions: Vec<Position> = members
                .into_iter()
                .filter_map(Position::from_index)
                .filter(|&p| relevant.contains(p))
                .collect();
            if positions.len() < self.min_size {
                continue;
            }
            if !positions.iter().any(|&p| own.contains(p)) {
                continue;
            }
            out.push(Cluster {
                symbol,
                size: positions.len().min(self.pay_cap),
                positions,
            });
        }
    }

    /// Union of every cluster's cells
    pub fn winning_positions(clusters: &[Cluster]) -> CellSet {
        clusters
            .iter()
            .fold(CellSet::new(), |acc, c| acc.union(c.cells()))
    }

    /// Cells wild spawning may use; same as the winning positions
    pub fn footprint(clusters: &[Cluster]) -> CellSet {
        Self::winning_positions(clusters)
    }
}

impl Default for ClusterDetector {
    fn default() -> Self {
        Self::new(MIN_PAY_SIZE, MAX_PAY_SIZE)
    }
}
