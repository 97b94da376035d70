//! Parallel batch runner
//!
//! Spins are split into one contiguous share per worker. Every worker owns
//! its own [`AvalancheSystem`] and a generator from
//! [`SpinRng::for_worker`], so a worker's share depends only on
//! `(base_seed, worker index, share size)`. Shares are reduced in worker
//! order, which makes the report independent of the rayon thread count.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use av_engine::{AvalancheSystem, GameConfig, SpinParams, SpinRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::report::{BatchReport, BatchStats};

/// Inputs of one batch run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub spins: u64,
    pub base_seed: u64,
    pub bet: f64,
    pub free_spins: bool,
    pub force_explosive_wild: bool,
    /// Number of logical workers (seed streams), not threads
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            spins: 100_000,
            base_seed: 42,
            bet: 1.0,
            free_spins: false,
            force_explosive_wild: false,
            workers: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.workers == 0 {
            return Err(SimError::InvalidBatch("workers must be at least 1".into()));
        }
        if !self.bet.is_finite() || self.bet <= 0.0 {
            return Err(SimError::InvalidBatch(format!(
                "bet must be positive, got {}",
                self.bet
            )));
        }
        Ok(())
    }

    /// Spin parameters every spin of the batch uses
    pub fn spin_params(&self) -> SpinParams {
        let params = if self.free_spins {
            SpinParams::free_spins(self.bet)
        } else {
            SpinParams::base(self.bet)
        };
        if self.force_explosive_wild {
            params.with_forced_explosive_wild()
        } else {
            params
        }
    }

    /// Number of spins assigned to `worker`
    pub fn share(&self, worker: usize) -> u64 {
        let workers = self.workers as u64;
        let index = worker as u64;
        self.spins / workers + u64::from(index < self.spins % workers)
    }
}

/// Runs batches against one shared configuration
#[derive(Debug, Clone)]
pub struct BatchRunner {
    config: Arc<GameConfig>,
}

impl BatchRunner {
    pub fn new(config: Arc<GameConfig>) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn standard() -> Self {
        Self {
            config: Arc::new(GameConfig::standard()),
        }
    }

    /// Load a JSON or YAML game configuration, chosen by file extension
    pub fn from_path(path: &Path) -> SimResult<Self> {
        Self::new(Arc::new(load_config(path)?))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Run one worker's share sequentially
    pub fn run_worker(&self, batch: &BatchConfig, worker: usize) -> SimResult<BatchStats> {
        let mut system = AvalancheSystem::new(self.config.clone())?;
        let mut rng = SpinRng::for_worker(batch.base_seed, worker as u64);
        let params = batch.spin_params();
        let spins = batch.share(worker);

        let mut stats = BatchStats::default();
        for _ in 0..spins {
            let result = system.play(params, &mut rng)?;
            stats.record(&result, batch.bet);
        }
        log::debug!(
            "Worker {worker}: {spins} spins, {} draws, rtp {:.4}",
            rng.call_count(),
            stats.rtp()
        );
        Ok(stats)
    }

    /// Run the whole batch across the rayon pool
    pub fn run(&self, batch: &BatchConfig) -> SimResult<BatchReport> {
        batch.validate()?;
        log::info!(
            "Running {} spins on {} workers (seed {})",
            batch.spins,
            batch.workers,
            batch.base_seed
        );
        let started = Instant::now();

        let shares = (0..batch.workers)
            .into_par_iter()
            .map(|worker| self.run_worker(batch, worker))
            .collect::<SimResult<Vec<_>>>()?;

        let mut stats = BatchStats::default();
        for share in &shares {
            stats.merge(share);
        }

        log::info!(
            "Batch finished in {:.2?}: rtp {:.4}, hit rate {:.4}",
            started.elapsed(),
            stats.rtp(),
            stats.hit_rate()
        );
        Ok(BatchReport::new(
            batch.base_seed,
            batch.workers,
            batch.free_spins,
            &stats,
        ))
    }
}

/// Read a [`GameConfig`] from a `.json`, `.yaml` or `.yml` file
pub fn load_config(path: &Path) -> SimResult<GameConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let config = match extension.as_str() {
        "json" => GameConfig::from_json(&text)?,
        "yaml" | "yml" => GameConfig::from_yaml(&text)?,
        other => return Err(SimError::UnsupportedFormat(other.to_string())),
    };
    log::info!("Loaded game config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(spins: u64, workers: usize) -> BatchConfig {
        BatchConfig {
            spins,
            base_seed: 11,
            workers,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_shares_cover_every_spin() {
        let b = batch(103, 4);
        let shares: Vec<u64> = (0..4).map(|w| b.share(w)).collect();
        assert_eq!(shares, vec![26, 26, 26, 25]);
        assert_eq!(shares.iter().sum::<u64>(), 103);

        let small = batch(2, 5);
        assert_eq!((0..5).map(|w| small.share(w)).sum::<u64>(), 2);
        assert_eq!(small.share(4), 0);
    }

    #[test]
    fn test_validate_rejects_bad_batches() {
        assert!(batch(10, 0).validate().is_err());
        let mut b = batch(10, 2);
        b.bet = 0.0;
        assert!(matches!(b.validate(), Err(SimError::InvalidBatch(_))));
        b.bet = f64::NAN;
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_spin_params_follow_mode() {
        let mut b = batch(1, 1);
        b.free_spins = true;
        b.force_explosive_wild = true;
        let params = b.spin_params();
        assert!(params.free_spins);
        assert!(params.force_explosive_wild);
        assert_eq!(params.bet, b.bet);
    }

    #[test]
    fn test_worker_share_is_reproducible() {
        let runner = BatchRunner::standard();
        let b = batch(40, 3);
        let first = runner.run_worker(&b, 1).unwrap();
        let second = runner.run_worker(&b, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.spins, b.share(1));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let path = std::env::temp_dir().join("av_sim_config_test.toml");
        std::fs::write(&path, "x = 1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedFormat(ext) if ext == "toml"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("av_sim_definitely_missing.json");
        assert!(matches!(load_config(&path), Err(SimError::Io { .. })));
    }
}
