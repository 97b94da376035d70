//! Symbol definitions and classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Symbol category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolCategory {
    /// Empty cell
    Empty,
    /// High-pay symbol, immune to explosions
    HighPay,
    /// Low-pay symbol, destructible by explosive wilds
    LowPay,
    /// Wild - substitutes for every paying symbol
    Wild,
    /// Scatter - counts toward the free spins trigger, never clusters
    Scatter,
}

/// A grid symbol
///
/// The discriminant order is the canonical index used by weight tables,
/// symbol counts and serialized state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Symbol {
    #[default]
    #[serde(rename = "EMPTY")]
    Empty = 0,
    #[serde(rename = "LADY_SK")]
    LadySkull = 1,
    #[serde(rename = "PINK_SK")]
    PinkSkull = 2,
    #[serde(rename = "GREEN_SK")]
    GreenSkull = 3,
    #[serde(rename = "BLUE_SK")]
    BlueSkull = 4,
    #[serde(rename = "ORANGE_SK")]
    OrangeSkull = 5,
    #[serde(rename = "CYAN_SK")]
    CyanSkull = 6,
    #[serde(rename = "WILD")]
    Wild = 7,
    #[serde(rename = "E_WILD")]
    ExplosiveWild = 8,
    #[serde(rename = "SCATTER")]
    Scatter = 9,
}

impl Symbol {
    /// Number of symbol variants, including `Empty`
    pub const COUNT: usize = 10;

    /// Every variant in discriminant order
    pub const ALL: [Symbol; Self::COUNT] = [
        Symbol::Empty,
        Symbol::LadySkull,
        Symbol::PinkSkull,
        Symbol::GreenSkull,
        Symbol::BlueSkull,
        Symbol::OrangeSkull,
        Symbol::CyanSkull,
        Symbol::Wild,
        Symbol::ExplosiveWild,
        Symbol::Scatter,
    ];

    /// Symbols that symbol generation can produce
    pub const GENERATED: [Symbol; 9] = [
        Symbol::LadySkull,
        Symbol::PinkSkull,
        Symbol::GreenSkull,
        Symbol::BlueSkull,
        Symbol::OrangeSkull,
        Symbol::CyanSkull,
        Symbol::Wild,
        Symbol::ExplosiveWild,
        Symbol::Scatter,
    ];

    /// Paying symbols (high pay first)
    pub const PAYING: [Symbol; 6] = [
        Symbol::LadySkull,
        Symbol::PinkSkull,
        Symbol::GreenSkull,
        Symbol::BlueSkull,
        Symbol::OrangeSkull,
        Symbol::CyanSkull,
    ];

    /// Low-pay symbols
    pub const LOW_PAY: [Symbol; 5] = [
        Symbol::PinkSkull,
        Symbol::GreenSkull,
        Symbol::BlueSkull,
        Symbol::OrangeSkull,
        Symbol::CyanSkull,
    ];

    /// Canonical index (0..COUNT)
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Symbol from canonical index
    pub fn from_index(index: usize) -> Option<Symbol> {
        Self::ALL.get(index).copied()
    }

    /// Category membership
    pub const fn category(self) -> SymbolCategory {
        match self {
            Symbol::Empty => SymbolCategory::Empty,
            Symbol::LadySkull => SymbolCategory::HighPay,
            Symbol::PinkSkull
            | Symbol::GreenSkull
            | Symbol::BlueSkull
            | Symbol::OrangeSkull
            | Symbol::CyanSkull => SymbolCategory::LowPay,
            Symbol::Wild | Symbol::ExplosiveWild => SymbolCategory::Wild,
            Symbol::Scatter => SymbolCategory::Scatter,
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Symbol::Empty)
    }

    #[inline]
    pub const fn is_high_pay(self) -> bool {
        matches!(self.category(), SymbolCategory::HighPay)
    }

    #[inline]
    pub const fn is_low_pay(self) -> bool {
        matches!(self.category(), SymbolCategory::LowPay)
    }

    /// High or low pay
    #[inline]
    pub const fn is_paying(self) -> bool {
        matches!(
            self.category(),
            SymbolCategory::HighPay | SymbolCategory::LowPay
        )
    }

    /// Regular or explosive wild
    #[inline]
    pub const fn is_wild(self) -> bool {
        matches!(self.category(), SymbolCategory::Wild)
    }

    #[inline]
    pub const fn is_regular_wild(self) -> bool {
        matches!(self, Symbol::Wild)
    }

    #[inline]
    pub const fn is_explosive_wild(self) -> bool {
        matches!(self, Symbol::ExplosiveWild)
    }

    #[inline]
    pub const fn is_scatter(self) -> bool {
        matches!(self, Symbol::Scatter)
    }

    /// Only low-pay symbols are destroyed by explosions
    #[inline]
    pub const fn is_destructible(self) -> bool {
        self.is_low_pay()
    }

    /// Whether `self` (a wild) can stand in for `target`
    pub const fn can_substitute(self, target: Symbol) -> bool {
        self.is_wild() && target.is_paying()
    }

    /// Whether two adjacent cells can belong to the same cluster.
    ///
    /// Same paying type, wild with paying, or wild with wild. Empty cells and
    /// scatters never match.
    pub fn matches_for_cluster(self, other: Symbol) -> bool {
        if self.is_empty() || other.is_empty() || self.is_scatter() || other.is_scatter() {
            return false;
        }
        match (self.is_wild(), other.is_wild()) {
            (true, true) => true,
            (true, false) => other.is_paying(),
            (false, true) => self.is_paying(),
            (false, false) => self == other,
        }
    }

    /// Configuration identifier (`"LADY_SK"`, `"WILD"`, ...). Empty has none.
    pub const fn id(self) -> &'static str {
        match self {
            Symbol::Empty => "",
            Symbol::LadySkull => "LADY_SK",
            Symbol::PinkSkull => "PINK_SK",
            Symbol::GreenSkull => "GREEN_SK",
            Symbol::BlueSkull => "BLUE_SK",
            Symbol::OrangeSkull => "ORANGE_SK",
            Symbol::CyanSkull => "CYAN_SK",
            Symbol::Wild => "WILD",
            Symbol::ExplosiveWild => "E_WILD",
            Symbol::Scatter => "SCATTER",
        }
    }

    /// Symbol from configuration identifier
    pub fn from_id(id: &str) -> Option<Symbol> {
        Self::GENERATED.iter().copied().find(|s| s.id() == id)
    }

    /// Three-character display code
    pub const fn short_code(self) -> &'static str {
        match self {
            Symbol::Empty => "   ",
            Symbol::LadySkull => "LDY",
            Symbol::PinkSkull => "PNK",
            Symbol::GreenSkull => "GRN",
            Symbol::BlueSkull => "BLU",
            Symbol::OrangeSkull => "ORG",
            Symbol::CyanSkull => "CYN",
            Symbol::Wild => "WLD",
            Symbol::ExplosiveWild => "EW ",
            Symbol::Scatter => "SCR",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "EMPTY")
        } else {
            write!(f, "{}", self.id())
        }
    }
}

impl FromStr for Symbol {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        Symbol::from_id(s).ok_or_else(|| EngineError::UnknownSymbol(s.to_string()))
    }
}
