//! Batch statistics
//!
//! [`BatchStats`] is the per-worker accumulator; workers merge theirs in
//! index order and the result is finalized into a [`BatchReport`].

use std::collections::BTreeMap;
use std::fmt;

use av_engine::{CascadeResult, SpawnStats};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// ACCUMULATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Running totals over a sequence of spins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    /// Spins with a non-zero win
    pub hits: u64,
    pub max_win_hits: u64,
    pub free_spins_triggers: u64,
    pub total_cascades: u64,
    pub max_cascades: u32,
    /// Largest single-spin win, in bet multiples
    pub best_win_multiple: f64,
    pub explosive_wilds_collected: u64,
    pub spawn_stats: SpawnStats,
    /// Spins per final multiplier value
    pub multiplier_histogram: BTreeMap<u32, u64>,
}

impl BatchStats {
    /// Fold one finished spin into the totals
    pub fn record(&mut self, result: &CascadeResult, bet: f64) {
        self.spins += 1;
        self.total_bet += bet;
        self.total_win += result.total_win;
        if result.total_win > 0.0 {
            self.hits += 1;
        }
        if result.max_win_reached {
            self.max_win_hits += 1;
        }
        if result.free_spins_triggered {
            self.free_spins_triggers += 1;
        }
        self.total_cascades += u64::from(result.cascades);
        self.max_cascades = self.max_cascades.max(result.cascades);
        self.best_win_multiple = self.best_win_multiple.max(result.win_multiple(bet));
        self.explosive_wilds_collected += u64::from(result.explosive_wilds_collected);
        self.spawn_stats.merge(&result.spawn_stats);
        *self
            .multiplier_histogram
            .entry(result.max_multiplier)
            .or_insert(0) += 1;
    }

    /// Append another worker's totals
    pub fn merge(&mut self, other: &BatchStats) {
        self.spins += other.spins;
        self.total_bet += other.total_bet;
        self.total_win += other.total_win;
        self.hits += other.hits;
        self.max_win_hits += other.max_win_hits;
        self.free_spins_triggers += other.free_spins_triggers;
        self.total_cascades += other.total_cascades;
        self.max_cascades = self.max_cascades.max(other.max_cascades);
        self.best_win_multiple = self.best_win_multiple.max(other.best_win_multiple);
        self.explosive_wilds_collected += other.explosive_wilds_collected;
        self.spawn_stats.merge(&other.spawn_stats);
        for (&multiplier, &count) in &other.multiplier_histogram {
            *self.multiplier_histogram.entry(multiplier).or_insert(0) += count;
        }
    }

    /// Return to player as a fraction of total bet
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.total_win / self.total_bet
        } else {
            0.0
        }
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.spins)
    }

    pub fn mean_cascades(&self) -> f64 {
        ratio(self.total_cascades, self.spins)
    }

    pub fn free_spins_frequency(&self) -> f64 {
        ratio(self.free_spins_triggers, self.spins)
    }
}

fn ratio(count: u64, spins: u64) -> f64 {
    if spins == 0 {
        0.0
    } else {
        count as f64 / spins as f64
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Final batch summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub base_seed: u64,
    pub workers: usize,
    pub free_spins: bool,
    pub spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub rtp: f64,
    pub hit_rate: f64,
    pub max_win_hits: u64,
    pub free_spins_triggers: u64,
    pub free_spins_frequency: f64,
    pub mean_cascades: f64,
    pub max_cascades: u32,
    pub best_win_multiple: f64,
    pub explosive_wilds_collected: u64,
    pub spawn_stats: SpawnStats,
    pub multiplier_histogram: BTreeMap<u32, u64>,
}

impl BatchReport {
    pub fn new(base_seed: u64, workers: usize, free_spins: bool, stats: &BatchStats) -> Self {
        Self {
            base_seed,
            workers,
            free_spins,
            spins: stats.spins,
            total_bet: stats.total_bet,
            total_win: stats.total_win,
            rtp: stats.rtp(),
            hit_rate: stats.hit_rate(),
            max_win_hits: stats.max_win_hits,
            free_spins_triggers: stats.free_spins_triggers,
            free_spins_frequency: stats.free_spins_frequency(),
            mean_cascades: stats.mean_cascades(),
            max_cascades: stats.max_cascades,
            best_win_multiple: stats.best_win_multiple,
            explosive_wilds_collected: stats.explosive_wilds_collected,
            spawn_stats: stats.spawn_stats,
            multiplier_histogram: stats.multiplier_histogram.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.free_spins { "free spins" } else { "base game" };
        writeln!(f, "═══ Avalanche batch ({mode}) ═══")?;
        writeln!(f, "  Seed:               {}", self.base_seed)?;
        writeln!(f, "  Workers:            {}", self.workers)?;
        writeln!(f, "  Spins:              {}", self.spins)?;
        writeln!(f, "  Total bet:          {:.2}", self.total_bet)?;
        writeln!(f, "  Total win:          {:.2}", self.total_win)?;
        writeln!(f, "  RTP:                {:.4}%", self.rtp * 100.0)?;
        writeln!(f, "  Hit rate:           {:.4}%", self.hit_rate * 100.0)?;
        writeln!(f, "  Mean cascades:      {:.3}", self.mean_cascades)?;
        writeln!(f, "  Max cascades:       {}", self.max_cascades)?;
        writeln!(f, "  Best win:           {:.2}x", self.best_win_multiple)?;
        writeln!(f, "  Max-win hits:       {}", self.max_win_hits)?;
        writeln!(
            f,
            "  Free spins trigger: {} ({:.4}%)",
            self.free_spins_triggers,
            self.free_spins_frequency * 100.0
        )?;
        writeln!(f, "  EW collected:       {}", self.explosive_wilds_collected)?;
        writeln!(
            f,
            "  Wild spawns:        {}/{} placed ({} wild, {} explosive)",
            self.spawn_stats.successes,
            self.spawn_stats.attempts,
            self.spawn_stats.wilds,
            self.spawn_stats.explosive_wilds
        )?;
        writeln!(f, "  Final multiplier:")?;
        for (multiplier, count) in &self.multiplier_histogram {
            let share = if self.spins == 0 {
                0.0
            } else {
                *count as f64 / self.spins as f64 * 100.0
            };
            writeln!(f, "    x{multiplier:<4} {count:>10} ({share:.3}%)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result(win: f64, cascades: u32, multiplier: u32) -> CascadeResult {
        CascadeResult {
            total_win: win,
            cascades,
            max_multiplier: multiplier,
            ..CascadeResult::default()
        }
    }

    #[test]
    fn test_record_and_ratios() {
        let mut stats = BatchStats::default();
        stats.record(&result(0.0, 0, 1), 1.0);
        stats.record(&result(3.0, 2, 4), 1.0);
        stats.record(&result(0.5, 1, 2), 1.0);
        stats.record(&result(0.0, 0, 1), 1.0);

        assert_eq!(stats.spins, 4);
        assert_eq!(stats.hits, 2);
        assert_relative_eq!(stats.rtp(), 3.5 / 4.0);
        assert_relative_eq!(stats.hit_rate(), 0.5);
        assert_relative_eq!(stats.mean_cascades(), 0.75);
        assert_eq!(stats.max_cascades, 2);
        assert_relative_eq!(stats.best_win_multiple, 3.0);
        assert_eq!(stats.multiplier_histogram.get(&1), Some(&2));
        assert_eq!(stats.multiplier_histogram.get(&4), Some(&1));
    }

    #[test]
    fn test_merge_equals_sequential_record() {
        let spins = [result(1.0, 1, 2), result(0.0, 0, 1), result(8.0, 3, 8)];

        let mut all = BatchStats::default();
        for r in &spins {
            all.record(r, 2.0);
        }

        let mut left = BatchStats::default();
        left.record(&spins[0], 2.0);
        let mut right = BatchStats::default();
        right.record(&spins[1], 2.0);
        right.record(&spins[2], 2.0);
        left.merge(&right);

        assert_eq!(left, all);
    }

    #[test]
    fn test_empty_stats_have_zero_ratios() {
        let stats = BatchStats::default();
        assert_eq!(stats.rtp(), 0.0);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.mean_cascades(), 0.0);
    }

    #[test]
    fn test_report_renders_and_serializes() {
        let mut stats = BatchStats::default();
        stats.record(&result(2.0, 1, 2), 1.0);
        let report = BatchReport::new(7, 2, false, &stats);

        let text = report.to_string();
        assert!(text.contains("RTP"));
        assert!(text.contains("x2"));

        let json = report.to_json().unwrap();
        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
