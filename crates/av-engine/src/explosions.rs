//! Explosive wild eligibility and detonation
//!
//! Eligibility is tracked per cascade in three cell sets. A cell may detonate
//! iff it holds an explosive wild, is in `landed` or `in_clusters`, and is
//! not in `spawned`. All eligible wilds detonate in one batch; destruction is
//! computed before anything is cleared, so there are no chain reactions.

use serde::{Deserialize, Serialize};

use crate::cellset::CellSet;
use crate::clusters::Cluster;
use crate::config::{CollectionPolicy, GameConfig};
use crate::grid::{Grid, Position};
use crate::symbols::Symbol;

/// Per-cascade eligibility ledger plus the spin-wide collection counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EwTracker {
    /// Explosive wilds on the grid after the latest drop
    pub landed: CellSet,
    /// Explosive wild cells of the latest winning clusters
    pub in_clusters: CellSet,
    /// Cells where the spawning system placed explosive wilds
    pub spawned: CellSet,
    /// Explosive wilds collected (cluster wins and detonations)
    pub collected: u32,
}

impl EwTracker {
    /// Clear the per-cascade sets, keep the counter
    pub fn reset_cascade(&mut self) {
        self.landed.clear();
        self.in_clusters.clear();
        self.spawned.clear();
    }

    pub fn is_eligible(&self, pos: Position) -> bool {
        if self.spawned.contains(pos) {
            return false;
        }
        self.landed.contains(pos) || self.in_clusters.contains(pos)
    }
}

/// One detonation in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosionEvent {
    /// The exploding wild
    pub origin: Position,
    /// Blast area clipped to the grid, row-major
    pub area: Vec<Position>,
    /// Low-pay cells inside `area` at detonation time. Overlapping blasts
    /// list a shared cell in each event but it is cleared once.
    pub destroyed: Vec<Position>,
    /// Origin was in the cluster-collected set
    pub from_cluster: bool,
}

#[derive(Debug, Clone)]
pub struct ExplosionSystem {
    tracker: EwTracker,
    radius: usize,
    policy: CollectionPolicy,
}

impl ExplosionSystem {
    pub fn new(radius: usize, policy: CollectionPolicy) -> Self {
        Self {
            tracker: EwTracker::default(),
            radius,
            policy,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.explosion_radius, config.collection_policy)
    }

    pub fn tracker(&self) -> &EwTracker {
        &self.tracker
    }

    // ─── Tracking ───────────────────────────────────────────────────────────────

    /// Replace `landed` with every explosive wild currently on the grid
    pub fn track_landed(&mut self, grid: &Grid) -> usize {
        self.tracker.landed = grid.select(Symbol::is_explosive_wild);
        log::debug!("tracked {} landed explosive wilds", self.tracker.landed.len());
        self.tracker.landed.len()
    }

    /// Replace `in_clusters` with the explosive wilds of `clusters` (read
    /// before removal) and count them as collected. Returns how many were
    /// added to the counter.
    pub fn track_cluster_ews(&mut self, clusters: &[Cluster], grid: &Grid) -> u32 {
        self.tracker.in_clusters.clear();
        let mut memberships = 0u32;
        for cluster in clusters {
            for &pos in &cluster.positions {
                if grid.at(pos).is_explosive_wild() {
                    self.tracker.in_clusters.insert(pos);
                    memberships += 1;
                }
            }
        }

        let added = match self.policy {
            CollectionPolicy::SourceCompatible => memberships,
            CollectionPolicy::CountEveryDetonation => self.tracker.in_clusters.len() as u32,
        };
        self.tracker.collected += added;
        if added > 0 {
            log::debug!(
                "collected {added} explosive wilds from clusters (total {})",
                self.tracker.collected
            );
        }
        added
    }

    /// Mark a freshly spawned explosive wild as ineligible
    pub fn track_spawned(&mut self, pos: Position) {
        self.tracker.spawned.insert(pos);
        log::debug!("tracked spawned explosive wild at {pos}");
    }

    // ─── Detonation ─────────────────────────────────────────────────────────────

    /// Blast area around `origin`, clipped to the grid
    pub fn explosion_area(&self, origin: Position) -> Vec<Position> {
        origin.area(self.radius)
    }

    /// Eligible explosive wilds, row-major
    pub fn find_eligible(&self, grid: &Grid) -> Vec<Position> {
        grid.select(Symbol::is_explosive_wild)
            .iter()
            .filter(|&pos| self.tracker.is_eligible(pos))
            .collect()
    }

    /// Detonate every eligible explosive wild at once.
    ///
    /// Returns one event per detonation; an empty list means nothing was
    /// eligible and the grid is untouched.
    pub fn execute(&mut self, grid: &mut Grid) -> Vec<ExplosionEvent> {
        let eligible = self.find_eligible(grid);
        self.execute_at(grid, &eligible)
    }

    /// Detonate the given origins (which must hold explosive wilds)
    pub fn execute_at(&mut self, grid: &mut Grid, origins: &[Position]) -> Vec<ExplosionEvent> {
        if origins.is_empty() {
            log::debug!("no eligible explosive wilds");
            return Vec::new();
        }

        let mut doomed = CellSet::new();
        let mut events = Vec::with_capacity(origins.len());
        for &origin in origins {
            let area = self.explosion_area(origin);
            let destroyed: Vec<Position> = area
                .iter()
                .copied()
                .filter(|&p| grid.at(p).is_destructible())
                .collect();
            doomed.extend(destroyed.iter().copied());
            events.push(ExplosionEvent {
                origin,
                area,
                destroyed,
                from_cluster: self.tracker.in_clusters.contains(origin),
            });
        }

        grid.remove_positions(doomed.iter());
        for &origin in origins {
            grid.put(origin, Symbol::Empty);
            let counts = match self.policy {
                CollectionPolicy::SourceCompatible => !self.tracker.in_clusters.contains(origin),
                CollectionPolicy::CountEveryDetonation => true,
            };
            if counts {
                self.tracker.collected += 1;
            }
        }

        log::info!(
            "{} explosive wilds detonated, {} symbols destroyed",
            origins.len(),
            doomed.len()
        );
        events
    }

    pub fn reset_cascade(&mut self) {
        self.tracker.reset_cascade();
    }

    pub fn collected_count(&self) -> u32 {
        self.tracker.collected
    }

    /// Zero the collection counter (e.g. on entering free spins)
    pub fn reset_collected_count(&mut self) {
        self.tracker.collected = 0;
    }
}

impl Default for ExplosionSystem {
    fn default() -> Self {
        Self::new(1, CollectionPolicy::default())
    }
}
