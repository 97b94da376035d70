//! Avalanche orchestrator
//!
//! Drives one spin through the state machine
//!
//! ```text
//! REEL_DROP → CHECK_SCATTERS → CHECK_CLUSTERS ──win──→ REEL_DROP
//!                                   │
//!                                   └─none─→ CHECK_EXPLOSIONS ──detonation──→ REEL_DROP
//!                                                  │
//!                                                  └─none─→ SEQUENCE_COMPLETE
//! ```
//!
//! The max-win cap is checked after every state and overrides any pending
//! cascade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cellset::CellSet;
use crate::clusters::{Cluster, ClusterDetector};
use crate::config::{GameConfig, SpinParams};
use crate::error::{EngineError, EngineResult};
use crate::explosions::ExplosionSystem;
use crate::grid::{COLS, Grid, Position, ROWS};
use crate::rng::RandomSource;
use crate::symbols::Symbol;
use crate::wild_spawning::{SpawnStats, WildSpawningSystem};

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    ReelDrop,
    CheckScatters,
    CheckClusters,
    CheckExplosions,
    SequenceComplete,
}

/// Standard multiplier ladder
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum MultiplierLevel {
    #[default]
    X1 = 1,
    X2 = 2,
    X4 = 4,
    X8 = 8,
    X16 = 16,
    X32 = 32,
}

impl MultiplierLevel {
    pub const LADDER: [MultiplierLevel; 6] = [
        MultiplierLevel::X1,
        MultiplierLevel::X2,
        MultiplierLevel::X4,
        MultiplierLevel::X8,
        MultiplierLevel::X16,
        MultiplierLevel::X32,
    ];

    pub const fn value(self) -> u32 {
        self as u32
    }

    /// Next rung, saturating at X32
    pub const fn next_level(self) -> Self {
        match self {
            MultiplierLevel::X1 => MultiplierLevel::X2,
            MultiplierLevel::X2 => MultiplierLevel::X4,
            MultiplierLevel::X4 => MultiplierLevel::X8,
            MultiplierLevel::X8 => MultiplierLevel::X16,
            MultiplierLevel::X16 | MultiplierLevel::X32 => MultiplierLevel::X32,
        }
    }

    /// Ladder values as stored in configuration
    pub fn ladder_values() -> Vec<u32> {
        Self::LADDER.iter().map(|m| m.value()).collect()
    }
}

/// Mutable per-spin state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvalancheState {
    pub current: GameState,
    /// Index into the configured multiplier ladder
    pub multiplier_step: usize,
    pub cascade_count: u32,
    pub total_win: f64,
    /// Highest scatter count seen this spin
    pub scatters_found: usize,
    pub free_spins_triggered: bool,
    pub is_initial_drop: bool,
    pub is_free_spins: bool,
    pub force_explosive_wild: bool,
    pub bet: f64,
}

impl AvalancheState {
    pub fn new(params: SpinParams) -> Self {
        Self {
            current: GameState::ReelDrop,
            multiplier_step: 0,
            cascade_count: 0,
            total_win: 0.0,
            scatters_found: 0,
            free_spins_triggered: false,
            is_initial_drop: true,
            is_free_spins: params.free_spins,
            force_explosive_wild: params.force_explosive_wild,
            bet: params.bet,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// A single paid cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinDetail {
    /// Cascade index the win was paid in
    pub cascade: u32,
    pub symbol: Symbol,
    /// Clipped size used for the paytable lookup
    pub size: usize,
    /// Full member count
    pub members: usize,
    /// Paytable entry (bet multiple)
    pub base_pay: f64,
    pub multiplier: u32,
    /// `base_pay × bet × multiplier`
    pub win: f64,
}

/// Time-ordered spin trace entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpinEvent {
    ClusterWin(WinDetail),
    Explosion {
        cascade: u32,
        origins: Vec<Position>,
        destroyed: usize,
    },
    WildsSpawned {
        cascade: u32,
        placed: Vec<(Symbol, Position)>,
        failed: usize,
    },
    FreeSpinsTriggered {
        scatters: usize,
    },
    MaxWinReached {
        total_win: f64,
    },
}

/// Outcome of one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeResult {
    /// Total win, clamped to the max-win cap
    pub total_win: f64,
    /// Multiplier at the end of the spin
    pub max_multiplier: u32,
    /// Cluster and explosion cascades
    pub cascades: u32,
    /// Highest scatter count seen
    pub scatters_found: usize,
    pub free_spins_triggered: bool,
    pub max_win_reached: bool,
    /// Explosive wilds collected during this spin
    pub explosive_wilds_collected: u32,
    pub spawn_stats: SpawnStats,
    pub events: Vec<SpinEvent>,
    /// Every state visited, in order
    pub state_history: Vec<GameState>,
    /// Grid at the end of the spin
    pub final_grid: Vec<String>,
}

impl Default for CascadeResult {
    fn default() -> Self {
        Self {
            total_win: 0.0,
            max_multiplier: 1,
            cascades: 0,
            scatters_found: 0,
            free_spins_triggered: false,
            max_win_reached: false,
            explosive_wilds_collected: 0,
            spawn_stats: SpawnStats::default(),
            events: Vec::new(),
            state_history: Vec::new(),
            final_grid: Vec::new(),
        }
    }
}

impl CascadeResult {
    /// Paid clusters in order
    pub fn wins(&self) -> impl Iterator<Item = &WinDetail> {
        self.events.iter().filter_map(|e| match e {
            SpinEvent::ClusterWin(w) => Some(w),
            _ => None,
        })
    }

    /// Win as a multiple of `bet`
    pub fn win_multiple(&self, bet: f64) -> f64 {
        self.total_win / bet
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYSTEM
// ═══════════════════════════════════════════════════════════════════════════════

/// Owns one grid and the subsystems driving it
#[derive(Debug, Clone)]
pub struct AvalancheSystem {
    config: Arc<GameConfig>,
    grid: Grid,
    detector: ClusterDetector,
    spawner: WildSpawningSystem,
    explosions: ExplosionSystem,
    state: AvalancheState,
}

impl AvalancheSystem {
    /// Validates `config` once; spins never revalidate it
    pub fn new(config: Arc<GameConfig>) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            detector: ClusterDetector::from_config(&config),
            spawner: WildSpawningSystem::from_config(&config)?,
            explosions: ExplosionSystem::from_config(&config),
            grid: Grid::new(),
            state: AvalancheState::new(SpinParams::default()),
            config,
        })
    }

    /// System with the shipped configuration
    pub fn standard() -> Self {
        let config = GameConfig::standard();
        Self {
            detector: ClusterDetector::from_config(&config),
            spawner: WildSpawningSystem::default(),
            explosions: ExplosionSystem::from_config(&config),
            grid: Grid::new(),
            state: AvalancheState::new(SpinParams::default()),
            config: Arc::new(config),
        }
    }

    /// Prepare for a new spin. The explosive wild collection counter is
    /// kept, so it can span a free spins session.
    pub fn reset(&mut self, params: SpinParams) -> EngineResult<()> {
        if !params.bet.is_finite() || params.bet <= 0.0 {
            return Err(EngineError::InvalidBet(params.bet));
        }
        self.grid.clear();
        self.explosions.reset_cascade();
        self.state = AvalancheState::new(params);
        log::debug!(
            "avalanche reset: bet {}, free spins {}",
            params.bet,
            params.free_spins
        );
        Ok(())
    }

    /// Reset and play a full spin
    pub fn play<R: RandomSource>(
        &mut self,
        params: SpinParams,
        rng: &mut R,
    ) -> EngineResult<CascadeResult> {
        self.reset(params)?;
        self.play_spin(rng)
    }

    /// Run the state machine from the current state to completion
    pub fn play_spin<R: RandomSource>(&mut self, rng: &mut R) -> EngineResult<CascadeResult> {
        let mut result = CascadeResult::default();
        let collected_before = self.explosions.collected_count();

        while self.state.current != GameState::SequenceComplete {
            self.step(rng, &mut result)?;
        }

        result.total_win = self.state.total_win;
        result.max_multiplier = self.multiplier();
        result.cascades = self.state.cascade_count;
        result.scatters_found = self.state.scatters_found;
        result.free_spins_triggered = self.state.free_spins_triggered;
        result.explosive_wilds_collected = self.explosions.collected_count() - collected_before;
        result.final_grid = self.grid.to_state();
        Ok(result)
    }

    /// Execute the current state once and apply the max-win check
    pub fn step<R: RandomSource>(
        &mut self,
        rng: &mut R,
        result: &mut CascadeResult,
    ) -> EngineResult<GameState> {
        result.state_history.push(self.state.current);

        match self.state.current {
            GameState::ReelDrop => self.handle_reel_drop(rng)?,
            GameState::CheckScatters => self.handle_scatter_check(result),
            GameState::CheckClusters => self.handle_cluster_check(rng, result)?,
            GameState::CheckExplosions => self.handle_explosion_check(result),
            GameState::SequenceComplete => {}
        }

        let cap = self.config.max_win_multiplier * self.state.bet;
        if self.state.total_win >= cap {
            self.state.total_win = cap;
            if !result.max_win_reached {
                log::info!("max win reached: {}x bet", self.config.max_win_multiplier);
                result.max_win_reached = true;
                result.events.push(SpinEvent::MaxWinReached { total_win: cap });
            }
            self.state.current = GameState::SequenceComplete;
        }

        Ok(self.state.current)
    }

    // ─── State handlers ─────────────────────────────────────────────────────────

    fn handle_reel_drop<R: RandomSource>(&mut self, rng: &mut R) -> EngineResult<()> {
        log::debug!("REEL_DROP (cascade {})", self.state.cascade_count);
        let weights = self.config.weights(self.state.is_free_spins);

        if self.state.is_initial_drop {
            self.grid.fill_all(weights, rng)?;
            if self.state.force_explosive_wild && !self.state.is_free_spins {
                let row = rng.range_inclusive(0, ROWS - 1);
                let col = rng.range_inclusive(0, COLS - 1);
                self.grid.set(row, col, Symbol::ExplosiveWild)?;
                log::info!("forced explosive wild at ({row}, {col})");
            }
            self.state.is_initial_drop = false;
        } else {
            let dropped = self.grid.fill_empty(weights, rng)?;
            log::debug!("dropped {dropped} symbols");
        }

        self.explosions.track_landed(&self.grid);
        self.state.current = GameState::CheckScatters;
        Ok(())
    }

    fn handle_scatter_check(&mut self, result: &mut CascadeResult) {
        let scatters = self.grid.count(Symbol::Scatter);
        log::debug!("CHECK_SCATTERS: {scatters} visible");
        self.state.scatters_found = self.state.scatters_found.max(scatters);

        if scatters >= self.config.scatter_trigger && !self.state.free_spins_triggered {
            self.state.free_spins_triggered = true;
            log::info!("free spins triggered with {scatters} scatters");
            result.events.push(SpinEvent::FreeSpinsTriggered { scatters });
        }
        self.state.current = GameState::CheckClusters;
    }

    fn handle_cluster_check<R: RandomSource>(
        &mut self,
        rng: &mut R,
        result: &mut CascadeResult,
    ) -> EngineResult<()> {
        let clusters = self.detector.find_clusters(&self.grid);
        log::debug!("CHECK_CLUSTERS: {} found", clusters.len());

        if !clusters.is_empty() {
            let cascade_win = self.pay_clusters(&clusters, result);
            self.state.total_win += cascade_win;

            self.explosions.track_cluster_ews(&clusters, &self.grid);
            self.grid
                .remove_positions(ClusterDetector::winning_positions(&clusters).iter());

            let spawns = self
                .spawner
                .spawn_for_clusters(&mut self.grid, &clusters, rng)?;
            let mut placed = Vec::with_capacity(spawns.len());
            for spawn in &spawns {
                if let Some(pos) = spawn.placed {
                    if spawn.wild.is_explosive_wild() {
                        self.explosions.track_spawned(pos);
                    }
                    placed.push((spawn.wild, pos));
                }
            }
            result.spawn_stats.record(&spawns);
            result.events.push(SpinEvent::WildsSpawned {
                cascade: self.state.cascade_count,
                failed: spawns.len() - placed.len(),
                placed,
            });

            self.grid.apply_gravity();
            self.advance_cascade();
            self.state.current = GameState::ReelDrop;
        } else {
            self.state.current = GameState::CheckExplosions;
        }
        Ok(())
    }

    fn handle_explosion_check(&mut self, result: &mut CascadeResult) {
        log::debug!("CHECK_EXPLOSIONS");
        let events = self.explosions.execute(&mut self.grid);

        if events.is_empty() {
            self.state.current = GameState::SequenceComplete;
            return;
        }

        let destroyed = events
            .iter()
            .flat_map(|e| e.destroyed.iter().copied())
            .collect::<CellSet>()
            .len();
        result.events.push(SpinEvent::Explosion {
            cascade: self.state.cascade_count,
            origins: events.iter().map(|e| e.origin).collect(),
            destroyed,
        });

        self.grid.apply_gravity();
        self.advance_cascade();
        self.explosions.reset_cascade();
        self.state.current = GameState::ReelDrop;
    }

    fn pay_clusters(&self, clusters: &[Cluster], result: &mut CascadeResult) -> f64 {
        let multiplier = self.multiplier();
        let mut cascade_win = 0.0;
        for cluster in clusters {
            let base_pay = self.config.paytable.pay(cluster.symbol, cluster.size);
            let win = base_pay * self.state.bet * multiplier as f64;
            cascade_win += win;
            log::info!(
                "cluster win: {} x{} = {} x {}x = {}",
                cluster.symbol,
                cluster.size,
                base_pay,
                multiplier,
                win
            );
            result.events.push(SpinEvent::ClusterWin(WinDetail {
                cascade: self.state.cascade_count,
                symbol: cluster.symbol,
                size: cluster.size,
                members: cluster.member_count(),
                base_pay,
                multiplier,
                win,
            }));
        }
        cascade_win
    }

    /// Cluster wins and detonations both count as a cascade
    fn advance_cascade(&mut self) {
        let last = self.config.multiplier_ladder.len() - 1;
        self.state.multiplier_step = (self.state.multiplier_step + 1).min(last);
        self.state.cascade_count += 1;
    }

    // ─── Accessors ──────────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid, for scripted scenarios before `play_spin`
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn state(&self) -> &AvalancheState {
        &self.state
    }

    /// Current win multiplier
    pub fn multiplier(&self) -> u32 {
        self.config.multiplier_ladder[self.state.multiplier_step]
    }

    pub fn total_win(&self) -> f64 {
        self.state.total_win
    }

    pub fn collected_explosive_wilds(&self) -> u32 {
        self.explosions.collected_count()
    }

    pub fn reset_collected_explosive_wilds(&mut self) {
        self.explosions.reset_collected_count();
    }

    pub fn explosions(&self) -> &ExplosionSystem {
        &self.explosions
    }

    /// Skip the initial full drop and resolve the current grid contents
    /// instead (empty cells are filled as a cascade drop)
    pub fn resume_from_grid(&mut self) {
        self.state.is_initial_drop = false;
        self.state.current = GameState::ReelDrop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SpinRng;

    #[test]
    fn test_multiplier_ladder_saturates() {
        let mut level = MultiplierLevel::X1;
        let mut seen = vec![level.value()];
        for _ in 0..8 {
            level = level.next_level();
            seen.push(level.value());
        }
        assert_eq!(seen, vec![1, 2, 4, 8, 16, 32, 32, 32, 32]);
        assert_eq!(MultiplierLevel::ladder_values(), GameConfig::standard().multiplier_ladder);
    }

    #[test]
    fn test_invalid_bet_rejected() {
        let mut system = AvalancheSystem::standard();
        let mut rng = SpinRng::new(1);
        for bet in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                system.play(SpinParams::base(bet), &mut rng),
                Err(EngineError::InvalidBet(_))
            ));
        }
    }

    #[test]
    fn test_spin_terminates_in_complete_state() {
        let mut system = AvalancheSystem::standard();
        let mut rng = SpinRng::new(77);
        for _ in 0..200 {
            let result = system.play(SpinParams::base(1.0), &mut rng).unwrap();
            assert_eq!(system.state().current, GameState::SequenceComplete);
            assert_eq!(result.state_history.first(), Some(&GameState::ReelDrop));
            assert_eq!(result.final_grid.len(), 25);
            if !result.max_win_reached {
                assert!(system.grid().is_full());
            }
            assert!(result.total_win <= 7500.0);
        }
    }

    #[test]
    fn test_state_history_shape() {
        let mut system = AvalancheSystem::standard();
        let mut rng = SpinRng::new(5);
        let result = system.play(SpinParams::base(2.0), &mut rng).unwrap();
        let h = &result.state_history;
        for pair in h.windows(2) {
            let ok = matches!(
                pair,
                [GameState::ReelDrop, GameState::CheckScatters]
                    | [GameState::CheckScatters, GameState::CheckClusters]
                    | [GameState::CheckClusters, GameState::ReelDrop]
                    | [GameState::CheckClusters, GameState::CheckExplosions]
                    | [GameState::CheckExplosions, GameState::ReelDrop]
            );
            assert!(ok, "unexpected transition {pair:?}");
        }
    }

    #[test]
    fn test_wins_use_current_multiplier() {
        let mut system = AvalancheSystem::standard();
        let mut rng = SpinRng::new(123);
        let mut checked = 0;
        for _ in 0..300 {
            let result = system.play(SpinParams::base(1.0), &mut rng).unwrap();
            for win in result.wins() {
                let expected = GameConfig::standard().multiplier_ladder
                    [(win.cascade as usize).min(5)];
                assert_eq!(win.multiplier, expected);
                assert!((win.win - win.base_pay * win.multiplier as f64).abs() < 1e-9);
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_forced_explosive_wild_is_base_game_only() {
        let config = Arc::new(GameConfig::standard());
        let mut a = AvalancheSystem::new(config.clone()).unwrap();
        let mut b = AvalancheSystem::new(config).unwrap();
        // free spins ignore the forced explosive wild, so the draws line up
        let plain = a
            .play(SpinParams::free_spins(1.0), &mut SpinRng::new(9))
            .unwrap();
        let forced = b
            .play(
                SpinParams::free_spins(1.0).with_forced_explosive_wild(),
                &mut SpinRng::new(9),
            )
            .unwrap();
        assert_eq!(plain, forced);
    }

    #[test]
    fn test_collected_counter_spans_spins() {
        let mut system = AvalancheSystem::standard();
        let mut rng = SpinRng::new(31);
        let mut sum = 0;
        for _ in 0..100 {
            let result = system.play(SpinParams::base(1.0), &mut rng).unwrap();
            sum += result.explosive_wilds_collected;
        }
        assert_eq!(system.collected_explosive_wilds(), sum);
        system.reset_collected_explosive_wilds();
        assert_eq!(system.collected_explosive_wilds(), 0);
    }
}
