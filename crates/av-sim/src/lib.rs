//! # av-sim — Avalanche Batch Simulator
//!
//! Runs large numbers of independent spins in parallel and aggregates the
//! statistics an RTP certification run needs.
//!
//! ## Features
//!
//! - **Deterministic Parallelism**: One ChaCha stream per worker, reduced in worker order
//! - **Aggregation**: RTP, hit rate, cascade depth, max-win hits, multiplier histogram
//! - **Config Loading**: JSON or YAML game configurations
//!
//! ## Architecture
//!
//! ```text
//! BatchConfig ──> BatchRunner ──(rayon)──> worker 0..N
//!                                            │  AvalancheSystem + SpinRng::for_worker
//!                                            v
//!                                        BatchStats ──merge──> BatchReport
//! ```

pub mod batch;
pub mod error;
pub mod report;

pub use batch::*;
pub use error::*;
pub use report::*;
