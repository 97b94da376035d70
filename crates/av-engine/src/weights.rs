//! Symbol generation weight tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::rng::RandomSource;
use crate::symbols::Symbol;

/// Weighted symbol distribution used when dropping new symbols
///
/// Entries are kept in canonical symbol order regardless of input order, so
/// a given table always maps a draw to the same symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Symbol, f64>",
    into = "BTreeMap<Symbol, f64>"
)]
pub struct WeightTable {
    symbols: Vec<Symbol>,
    weights: Vec<f64>,
    /// Normalized running sum, last entry 1.0
    cumulative: Vec<f64>,
}

impl WeightTable {
    /// Build and validate a table from raw (unnormalized) weights
    pub fn new(entries: impl IntoIterator<Item = (Symbol, f64)>) -> EngineResult<Self> {
        let map: BTreeMap<Symbol, f64> = entries.into_iter().collect();
        if map.is_empty() {
            return Err(EngineError::InvalidWeights("table is empty".into()));
        }

        let mut symbols = Vec::with_capacity(map.len());
        let mut weights = Vec::with_capacity(map.len());
        for (symbol, weight) in map {
            if symbol.is_empty() {
                return Err(EngineError::InvalidWeights(
                    "EMPTY cannot be generated".into(),
                ));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::InvalidWeights(format!(
                    "weight for {symbol} must be finite and non-negative, got {weight}"
                )));
            }
            symbols.push(symbol);
            weights.push(weight);
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(EngineError::InvalidWeights(format!(
                "weight sum must be positive, got {total}"
            )));
        }

        let mut running = 0.0;
        let mut cumulative: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w;
                running / total
            })
            .collect();
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(Self {
            symbols,
            weights,
            cumulative,
        })
    }

    /// Base game distribution
    pub fn base_game() -> Self {
        Self::from_static(&[
            (Symbol::LadySkull, 3.0),
            (Symbol::PinkSkull, 14.0),
            (Symbol::GreenSkull, 16.0),
            (Symbol::BlueSkull, 18.0),
            (Symbol::OrangeSkull, 20.0),
            (Symbol::CyanSkull, 22.0),
            (Symbol::Wild, 12.0),
            (Symbol::ExplosiveWild, 8.0),
            (Symbol::Scatter, 7.0),
        ])
    }

    /// Free spins distribution (explosive wild weight folded into wild)
    pub fn free_spins() -> Self {
        Self::free_spins_from(&Self::base_game())
    }

    /// Derive a free spins table: the explosive wild keeps its entry at zero
    /// weight and its base weight moves to the regular wild.
    pub fn free_spins_from(base: &WeightTable) -> Self {
        let ew = base.weight(Symbol::ExplosiveWild);
        let mut map: BTreeMap<Symbol, f64> = base.clone().into();
        if let Some(w) = map.get_mut(&Symbol::ExplosiveWild) {
            *w = 0.0;
        }
        if ew > 0.0 {
            *map.entry(Symbol::Wild).or_insert(0.0) += ew;
        }
        let entries: Vec<(Symbol, f64)> = map.into_iter().collect();
        Self::from_static(&entries)
    }

    fn from_static(entries: &[(Symbol, f64)]) -> Self {
        // Only called with positive-sum tables derived from validated input
        match Self::new(entries.iter().copied()) {
            Ok(table) => table,
            Err(e) => unreachable!("static weight table rejected: {e}"),
        }
    }

    /// Draw one symbol
    pub fn sample<R: RandomSource>(&self, rng: &mut R) -> EngineResult<Symbol> {
        let idx = rng.weighted_index(&self.cumulative)?;
        // A draw rounded up to the total can land on a trailing zero-weight entry
        let idx = self.last_live_at_or_before(idx);
        Ok(self.symbols[idx])
    }

    fn last_live_at_or_before(&self, idx: usize) -> usize {
        (0..=idx)
            .rev()
            .find(|&i| self.weights[i] > 0.0)
            .unwrap_or(idx)
    }

    /// Raw weight (0.0 when absent)
    pub fn weight(&self, symbol: Symbol) -> f64 {
        self.symbols
            .iter()
            .position(|&s| s == symbol)
            .map(|i| self.weights[i])
            .unwrap_or(0.0)
    }

    /// Normalized probability
    pub fn probability(&self, symbol: Symbol) -> f64 {
        self.weight(symbol) / self.total()
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Whether the table can produce `symbol`
    pub fn generates(&self, symbol: Symbol) -> bool {
        self.weight(symbol) > 0.0
    }

    /// Symbols listed in the table (including zero-weight entries)
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Normalized cumulative distribution
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }
}

impl TryFrom<BTreeMap<Symbol, f64>> for WeightTable {
    type Error = EngineError;

    fn try_from(map: BTreeMap<Symbol, f64>) -> EngineResult<Self> {
        Self::new(map)
    }
}

impl From<WeightTable> for BTreeMap<Symbol, f64> {
    fn from(table: WeightTable) -> Self {
        table.symbols.into_iter().zip(table.weights).collect()
    }
}
