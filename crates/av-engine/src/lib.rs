//! # av-engine — Cluster-Pays Avalanche Engine
//!
//! Resolves single spins of a 5×5 cluster-pays slot with cascading drops,
//! spawning wilds and explosive wilds. Every draw goes through a
//! [`RandomSource`], so a spin is fully reproducible from its seed.
//!
//! ## Features
//!
//! - **Cluster Detection**: Per-symbol union-find passes, wilds shared across clusters
//! - **Avalanches**: Gravity refills with a doubling multiplier ladder
//! - **Wild Spawning**: One wild per winning cluster inside its footprint
//! - **Explosive Wilds**: Simultaneous 3×3 blasts that destroy low-pay symbols
//! - **Max-Win Cap**: Hard clamp on the spin total
//!
//! ## Architecture
//!
//! ```text
//! AvalancheSystem (state machine)
//!     │
//!     ├── Grid (5×5 cells, gravity, drops)
//!     ├── ClusterDetector ── UnionFind
//!     ├── WildSpawningSystem
//!     └── ExplosionSystem (EwTracker)
//!           │
//!           v
//!     CascadeResult → Vec<SpinEvent>
//! ```
//!
//! Configuration lives in an immutable [`GameConfig`] shared through an
//! `Arc`; nothing the engine does mutates it.

pub mod avalanche;
pub mod cellset;
pub mod clusters;
pub mod config;
pub mod error;
pub mod explosions;
pub mod grid;
pub mod paytable;
pub mod rng;
pub mod symbols;
pub mod union_find;
pub mod weights;
pub mod wild_spawning;

pub use avalanche::*;
pub use cellset::*;
pub use clusters::*;
pub use config::*;
pub use error::*;
pub use explosions::*;
pub use grid::*;
pub use paytable::*;
pub use rng::*;
pub use symbols::*;
pub use union_find::*;
pub use weights::*;
pub use wild_spawning::*;
