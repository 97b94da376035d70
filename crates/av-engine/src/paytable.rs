//! Cluster paytable

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::symbols::Symbol;

/// Smallest cluster size with a payout
pub const MIN_PAY_SIZE: usize = 5;
/// Largest cluster size with its own payout; bigger clusters pay this entry
pub const MAX_PAY_SIZE: usize = 15;

const SIZES: usize = MAX_PAY_SIZE - MIN_PAY_SIZE + 1;

/// Base pay (bet multiples) per paying symbol and cluster size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Symbol, BTreeMap<usize, f64>>",
    into = "BTreeMap<Symbol, BTreeMap<usize, f64>>"
)]
pub struct PayTable {
    rows: BTreeMap<Symbol, [f64; SIZES]>,
}

impl PayTable {
    /// Build from per-symbol rows covering sizes 5..=15 in order
    pub fn from_rows(rows: impl IntoIterator<Item = (Symbol, [f64; SIZES])>) -> EngineResult<Self> {
        let table = Self {
            rows: rows.into_iter().collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// The shipped paytable
    pub fn standard() -> Self {
        let rows = [
            (
                Symbol::LadySkull,
                [1.0, 1.5, 2.5, 5.0, 5.0, 7.5, 7.5, 25.0, 25.0, 25.0, 150.0],
            ),
            (
                Symbol::PinkSkull,
                [0.5, 0.7, 1.0, 1.7, 1.7, 2.5, 2.5, 7.5, 7.5, 7.5, 50.0],
            ),
            (
                Symbol::GreenSkull,
                [0.4, 0.7, 0.8, 1.4, 1.4, 2.0, 2.0, 6.0, 6.0, 6.0, 40.0],
            ),
            (
                Symbol::BlueSkull,
                [0.3, 0.5, 0.6, 1.0, 1.0, 1.5, 1.5, 5.0, 5.0, 5.0, 30.0],
            ),
            (
                Symbol::OrangeSkull,
                [0.3, 0.4, 0.5, 0.8, 0.8, 1.2, 1.2, 4.0, 4.0, 4.0, 25.0],
            ),
            (
                Symbol::CyanSkull,
                [0.2, 0.3, 0.4, 0.6, 0.6, 1.0, 1.0, 3.0, 3.0, 3.0, 20.0],
            ),
        ];
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Base pay for a cluster. Sizes below 5 pay nothing, sizes above 15
    /// use the size-15 entry, non-paying symbols pay nothing.
    pub fn pay(&self, symbol: Symbol, size: usize) -> f64 {
        if size < MIN_PAY_SIZE {
            return 0.0;
        }
        let idx = size.min(MAX_PAY_SIZE) - MIN_PAY_SIZE;
        self.rows.get(&symbol).map(|row| row[idx]).unwrap_or(0.0)
    }

    /// Check every paying symbol has a finite, non-negative row
    pub fn validate(&self) -> EngineResult<()> {
        for symbol in Symbol::PAYING {
            let Some(row) = self.rows.get(&symbol) else {
                return Err(EngineError::IncompletePaytable(format!(
                    "missing row for {symbol}"
                )));
            };
            if let Some((i, v)) = row
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(EngineError::IncompletePaytable(format!(
                    "{symbol} size {}: invalid pay {v}",
                    i + MIN_PAY_SIZE
                )));
            }
        }
        if let Some(extra) = self.rows.keys().find(|s| !s.is_paying()) {
            return Err(EngineError::IncompletePaytable(format!(
                "{extra} is not a paying symbol"
            )));
        }
        Ok(())
    }
}

impl Default for PayTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<BTreeMap<Symbol, BTreeMap<usize, f64>>> for PayTable {
    type Error = EngineError;

    fn try_from(map: BTreeMap<Symbol, BTreeMap<usize, f64>>) -> EngineResult<Self> {
        let mut rows = BTreeMap::new();
        for (symbol, sizes) in map {
            let mut row = [0.0; SIZES];
            for (i, slot) in row.iter_mut().enumerate() {
                let size = i + MIN_PAY_SIZE;
                *slot = *sizes.get(&size).ok_or_else(|| {
                    EngineError::IncompletePaytable(format!("{symbol} missing size {size}"))
                })?;
            }
            if let Some(size) = sizes
                .keys()
                .find(|&&s| !(MIN_PAY_SIZE..=MAX_PAY_SIZE).contains(&s))
            {
                return Err(EngineError::IncompletePaytable(format!(
                    "{symbol} has out-of-range size {size}"
                )));
            }
            rows.insert(symbol, row);
        }
        Self::from_rows(rows)
    }
}

impl From<PayTable> for BTreeMap<Symbol, BTreeMap<usize, f64>> {
    fn from(table: PayTable) -> Self {
        table
            .rows
            .into_iter()
            .map(|(symbol, row)| {
                let sizes = row
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i + MIN_PAY_SIZE, v))
                    .collect();
                (symbol, sizes)
            })
            .collect()
    }
}
