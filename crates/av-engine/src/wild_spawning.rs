//! Wild spawning after cluster wins
//!
//! Every winning cluster gets one spawn attempt inside its own footprint,
//! processed in detection order. A cell claimed by an earlier cluster in the
//! same batch is off limits to later ones.

use serde::{Deserialize, Serialize};

use crate::cellset::CellSet;
use crate::clusters::Cluster;
use crate::config::GameConfig;
use crate::error::{EngineError, EngineResult};
use crate::grid::{Grid, Position};
use crate::rng::RandomSource;
use crate::symbols::Symbol;

/// One spawn attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildSpawn {
    /// Index of the cluster in detection order
    pub cluster_index: usize,
    /// `Wild` or `ExplosiveWild`
    pub wild: Symbol,
    /// Cluster cells before removal
    pub footprint: Vec<Position>,
    /// Where the wild went; `None` when the footprint had no free cell
    pub placed: Option<Position>,
}

impl WildSpawn {
    pub fn succeeded(&self) -> bool {
        self.placed.is_some()
    }
}

/// Aggregate counts over spawn attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnStats {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub wilds: u64,
    pub explosive_wilds: u64,
}

impl SpawnStats {
    pub fn from_spawns(spawns: &[WildSpawn]) -> Self {
        let mut stats = Self::default();
        stats.record(spawns);
        stats
    }

    pub fn record(&mut self, spawns: &[WildSpawn]) {
        for spawn in spawns {
            self.attempts += 1;
            if spawn.succeeded() {
                self.successes += 1;
                if spawn.wild.is_explosive_wild() {
                    self.explosive_wilds += 1;
                } else {
                    self.wilds += 1;
                }
            } else {
                self.failures += 1;
            }
        }
    }

    pub fn merge(&mut self, other: &SpawnStats) {
        self.attempts += other.attempts;
        self.successes += other.successes;
        self.failures += other.failures;
        self.wilds += other.wilds;
        self.explosive_wilds += other.explosive_wilds;
    }
}

#[derive(Debug, Clone)]
pub struct WildSpawningSystem {
    explosive_probability: f64,
}

impl WildSpawningSystem {
    /// `explosive_probability` is the chance a spawn is an explosive wild
    pub fn new(explosive_probability: f64) -> EngineResult<Self> {
        if !(0.0..=1.0).contains(&explosive_probability) {
            return Err(EngineError::InvalidConfig(format!(
                "explosive spawn probability must be in [0, 1], got {explosive_probability}"
            )));
        }
        Ok(Self {
            explosive_probability,
        })
    }

    pub fn from_config(config: &GameConfig) -> EngineResult<Self> {
        Self::new(config.explosive_spawn_probability)
    }

    pub fn explosive_probability(&self) -> f64 {
        self.explosive_probability
    }

    /// Place one wild per cluster into the emptied footprints.
    ///
    /// Call after the cluster cells were cleared and before gravity. Each
    /// attempt draws the wild variant first, then (if any cell is free) the
    /// placement.
    pub fn spawn_for_clusters<R: RandomSource>(
        &self,
        grid: &mut Grid,
        clusters: &[Cluster],
        rng: &mut R,
    ) -> EngineResult<Vec<WildSpawn>> {
        let mut claimed = CellSet::new();
        let mut spawns = Vec::with_capacity(clusters.len());

        for (cluster_index, cluster) in clusters.iter().enumerate() {
            let wild = self.pick_variant(rng);
            let candidates: Vec<Position> = cluster
                .positions
                .iter()
                .copied()
                .filter(|&p| grid.at(p).is_empty() && !claimed.contains(p))
                .collect();

            let placed = if candidates.is_empty() {
                log::debug!("cluster {cluster_index}: footprint exhausted, no wild spawned");
                None
            } else {
                let pos = *rng.choose(&candidates)?;
                grid.put(pos, wild);
                claimed.insert(pos);
                log::debug!("cluster {cluster_index}: spawned {wild} at {pos}");
                Some(pos)
            };

            spawns.push(WildSpawn {
                cluster_index,
                wild,
                footprint: cluster.positions.clone(),
                placed,
            });
        }

        Ok(spawns)
    }

    fn pick_variant<R: RandomSource>(&self, rng: &mut R) -> Symbol {
        if rng.next_f64() < 1.0 - self.explosive_probability {
            Symbol::Wild
        } else {
            Symbol::ExplosiveWild
        }
    }
}

impl Default for WildSpawningSystem {
    fn default() -> Self {
        Self {
            explosive_probability: 0.5,
        }
    }
}
