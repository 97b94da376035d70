//! Game configuration
//!
//! A [`GameConfig`] is built once, validated, and then shared read-only with
//! every spin. Nothing in the engine mutates it.

use serde::{Deserialize, Serialize};

use crate::avalanche::MultiplierLevel;
use crate::error::{EngineError, EngineResult};
use crate::grid::{COLS, ROWS};
use crate::paytable::{MAX_PAY_SIZE, MIN_PAY_SIZE, PayTable};
use crate::symbols::Symbol;
use crate::weights::WeightTable;

/// How collected explosive wilds are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPolicy {
    /// Count once on cluster collection, and once per detonation whose
    /// position was not in this cascade's cluster-collected set
    #[default]
    SourceCompatible,
    /// Count once on cluster collection and once per detonation
    CountEveryDetonation,
}

/// Immutable game rules and tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Base game symbol weights
    pub base_weights: WeightTable,
    /// Free spins symbol weights
    pub free_spins_weights: WeightTable,
    pub paytable: PayTable,
    /// Minimum connected members for a cluster
    pub min_cluster_size: usize,
    /// Cluster size used for payout is clipped to this
    pub cluster_pay_cap: usize,
    /// Maximum total win per spin, in bet multiples
    pub max_win_multiplier: f64,
    /// Win multiplier per cascade, saturating at the last entry
    pub multiplier_ladder: Vec<u32>,
    /// Scatters needed to trigger free spins
    pub scatter_trigger: usize,
    /// Probability that a spawned wild is explosive
    pub explosive_spawn_probability: f64,
    /// Blast radius (1 = 3×3)
    pub explosion_radius: usize,
    pub collection_policy: CollectionPolicy,
}

impl GameConfig {
    /// The shipped game
    pub fn standard() -> Self {
        let base_weights = WeightTable::base_game();
        let free_spins_weights = WeightTable::free_spins_from(&base_weights);
        Self {
            base_weights,
            free_spins_weights,
            paytable: PayTable::standard(),
            min_cluster_size: MIN_PAY_SIZE,
            cluster_pay_cap: MAX_PAY_SIZE,
            max_win_multiplier: 7500.0,
            multiplier_ladder: MultiplierLevel::ladder_values(),
            scatter_trigger: 3,
            explosive_spawn_probability: 0.5,
            explosion_radius: 1,
            collection_policy: CollectionPolicy::SourceCompatible,
        }
    }

    /// Builder: change collection policy
    pub fn with_collection_policy(mut self, policy: CollectionPolicy) -> Self {
        self.collection_policy = policy;
        self
    }

    /// Weights for the given mode
    pub fn weights(&self, free_spins: bool) -> &WeightTable {
        if free_spins {
            &self.free_spins_weights
        } else {
            &self.base_weights
        }
    }

    /// Validate cross-field rules. Individual weight tables are already
    /// checked on construction.
    pub fn validate(&self) -> EngineResult<()> {
        if self.base_weights.symbols() != self.free_spins_weights.symbols() {
            return Err(EngineError::InvalidWeights(
                "base and free spins tables list different symbols".into(),
            ));
        }
        if self.free_spins_weights.generates(Symbol::ExplosiveWild) {
            return Err(EngineError::InvalidWeights(
                "free spins table must not generate explosive wilds".into(),
            ));
        }

        self.paytable.validate()?;

        if self.min_cluster_size < MIN_PAY_SIZE {
            return Err(EngineError::InvalidConfig(format!(
                "min_cluster_size {} below the smallest paying size {MIN_PAY_SIZE}",
                self.min_cluster_size
            )));
        }
        if self.cluster_pay_cap > MAX_PAY_SIZE {
            return Err(EngineError::InvalidConfig(format!(
                "cluster_pay_cap {} above the largest paying size {MAX_PAY_SIZE}",
                self.cluster_pay_cap
            )));
        }
        if self.cluster_pay_cap < self.min_cluster_size {
            return Err(EngineError::InvalidConfig(format!(
                "cluster_pay_cap {} below min_cluster_size {}",
                self.cluster_pay_cap, self.min_cluster_size
            )));
        }
        if !self.max_win_multiplier.is_finite() || self.max_win_multiplier <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "max_win_multiplier must be positive, got {}",
                self.max_win_multiplier
            )));
        }
        if self.multiplier_ladder.is_empty() {
            return Err(EngineError::InvalidConfig(
                "multiplier_ladder is empty".into(),
            ));
        }
        if self.multiplier_ladder[0] == 0
            || self.multiplier_ladder.windows(2).any(|w| w[1] < w[0])
        {
            return Err(EngineError::InvalidConfig(
                "multiplier_ladder must be positive and non-decreasing".into(),
            ));
        }
        if self.scatter_trigger == 0 {
            return Err(EngineError::InvalidConfig(
                "scatter_trigger must be at least 1".into(),
            ));
        }
        if self.explosion_radius == 0 || self.explosion_radius > ROWS.max(COLS) {
            return Err(EngineError::InvalidConfig(format!(
                "explosion_radius must be in 1..={}, got {}",
                ROWS.max(COLS),
                self.explosion_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.explosive_spawn_probability) {
            return Err(EngineError::InvalidConfig(format!(
                "explosive_spawn_probability must be in [0, 1], got {}",
                self.explosive_spawn_probability
            )));
        }
        Ok(())
    }

    /// Parse and validate JSON
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml(yaml: &str) -> EngineResult<Self> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| EngineError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Parse(e.to_string()))
    }

    pub fn to_yaml(&self) -> EngineResult<String> {
        serde_yml::to_string(self).map_err(|e| EngineError::Parse(e.to_string()))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-spin inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinParams {
    /// Stake, must be positive and finite
    pub bet: f64,
    /// Play with free spins weights
    pub free_spins: bool,
    /// Plant one explosive wild on the first drop (base game only)
    pub force_explosive_wild: bool,
}

impl SpinParams {
    pub fn base(bet: f64) -> Self {
        Self {
            bet,
            free_spins: false,
            force_explosive_wild: false,
        }
    }

    pub fn free_spins(bet: f64) -> Self {
        Self {
            bet,
            free_spins: true,
            force_explosive_wild: false,
        }
    }

    pub fn with_forced_explosive_wild(mut self) -> Self {
        self.force_explosive_wild = true;
        self
    }
}

impl Default for SpinParams {
    fn default() -> Self {
        Self::base(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_valid() {
        let config = GameConfig::standard();
        config.validate().unwrap();
        assert_eq!(config.free_spins_weights.weight(Symbol::Wild), 20.0);
        assert_eq!(config.weights(true), &config.free_spins_weights);
    }

    #[test]
    fn test_free_spins_generating_ew_rejected() {
        let mut config = GameConfig::standard();
        config.free_spins_weights = WeightTable::base_game();
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_mismatched_symbol_sets_rejected() {
        let mut config = GameConfig::standard();
        config.free_spins_weights =
            WeightTable::new([(Symbol::CyanSkull, 1.0), (Symbol::Wild, 1.0)]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_scalars_rejected() {
        let mut c = GameConfig::standard();
        c.multiplier_ladder = vec![1, 4, 2];
        assert!(c.validate().is_err());

        let mut c = GameConfig::standard();
        c.explosive_spawn_probability = 1.5;
        assert!(c.validate().is_err());

        let mut c = GameConfig::standard();
        c.max_win_multiplier = 0.0;
        assert!(c.validate().is_err());

        let mut c = GameConfig::standard();
        c.multiplier_ladder.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_cluster_sizes_must_stay_in_paying_range() {
        let mut c = GameConfig::standard();
        c.min_cluster_size = MIN_PAY_SIZE - 1;
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));

        let mut c = GameConfig::standard();
        c.cluster_pay_cap = MAX_PAY_SIZE + 1;
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));

        let mut c = GameConfig::standard();
        c.min_cluster_size = 8;
        c.cluster_pay_cap = 10;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_explosion_radius_bounds() {
        for radius in [0, ROWS.max(COLS) + 1, usize::MAX] {
            let mut c = GameConfig::standard();
            c.explosion_radius = radius;
            assert!(
                matches!(c.validate(), Err(EngineError::InvalidConfig(_))),
                "radius {radius}"
            );
        }
        let mut c = GameConfig::standard();
        c.explosion_radius = ROWS.max(COLS);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_huge_radius_rejected_on_load() {
        let json = format!(r#"{{"explosion_radius": {}}}"#, u64::MAX);
        assert!(matches!(
            GameConfig::from_json(&json),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_standard_ladder_matches_multiplier_levels() {
        assert_eq!(
            GameConfig::standard().multiplier_ladder,
            vec![1, 2, 4, 8, 16, 32]
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::standard()
            .with_collection_policy(CollectionPolicy::CountEveryDetonation);
        let json = config.to_json().unwrap();
        assert!(json.contains("count_every_detonation"));
        let back = GameConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = GameConfig::standard();
        let yaml = config.to_yaml().unwrap();
        let back = GameConfig::from_yaml(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{"max_win_multiplier": 5000.0}"#).unwrap();
        assert_eq!(config.max_win_multiplier, 5000.0);
        assert_eq!(config.multiplier_ladder, vec![1, 2, 4, 8, 16, 32]);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            GameConfig::from_json("{not json"),
            Err(EngineError::Parse(_))
        ));
        assert!(GameConfig::from_json(r#"{"scatter_trigger": 0}"#).is_err());
    }
}
