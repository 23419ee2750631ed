//! Partitioning module: ownership ranges, gap detection and balance scoring.
//!
//! A ring is described by ownership entries (node, token). This module turns
//! them into the ranges each node owns and the statistics that describe how
//! evenly the ring is split.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RingAnalysis                           │
//! │                                                             │
//! │  entries ──► RangeCalculator ──► ranges                     │
//! │                                    │                        │
//! │                                    ▼                        │
//! │                               GapDetector ──► is_gap flags  │
//! │                                    │                        │
//! │                                    ▼                        │
//! │                              BalanceScorer ──► statistics   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use ringscope::{AnalyzerConfig, OwnershipEntry, RingAnalysis};
//!
//! let entries = vec![
//!     OwnershipEntry::new("10.0.0.1", -4611686018427387904),
//!     OwnershipEntry::new("10.0.0.2", 0),
//!     OwnershipEntry::new("10.0.0.3", 4611686018427387904),
//! ];
//!
//! let analysis = RingAnalysis::analyze(entries, &AnalyzerConfig::default()).unwrap();
//! assert_eq!(analysis.ranges.len(), 3);
//! assert_eq!(analysis.statistics.gap_count, 0);
//! ```

mod gaps;
mod ranges;
mod statistics;

pub use gaps::GapDetector;
pub use ranges::{range_size, token_in_open_range, OwnershipRange, RangeCalculator};
pub use statistics::{balance_score, BalanceScorer, NodeStatistics, RingStatistics};

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::types::OwnershipEntry;
use serde::Serialize;
use tracing::info;

/// The result of one analysis pass over a ring.
#[derive(Debug, Clone, Serialize)]
pub struct RingAnalysis {
    /// Entries as supplied by the caller.
    pub entries: Vec<OwnershipEntry>,
    /// Ranges in ascending token order, with gap flags set.
    pub ranges: Vec<OwnershipRange>,
    /// Coverage and balance statistics.
    pub statistics: RingStatistics,
}

impl RingAnalysis {
    /// Run range calculation, gap detection and scoring.
    pub fn analyze(entries: Vec<OwnershipEntry>, config: &AnalyzerConfig) -> Result<Self> {
        let ranges = RangeCalculator::new(&entries)?.calculate();
        let ranges = GapDetector::new(&entries, config)?.detect(ranges);
        let statistics = BalanceScorer::new(&entries)?.score(&ranges)?;

        info!(
            entries = entries.len(),
            nodes = statistics.node_count(),
            gaps = statistics.gap_count,
            balance_score = statistics.balance_score,
            "Analyzed token ring"
        );

        Ok(Self {
            entries,
            ranges,
            statistics,
        })
    }

    /// Same as [`RingAnalysis::analyze`], tagging the statistics with a
    /// datacenter name.
    pub fn analyze_datacenter(
        datacenter: impl Into<String>,
        entries: Vec<OwnershipEntry>,
        config: &AnalyzerConfig,
    ) -> Result<Self> {
        let mut analysis = Self::analyze(entries, config)?;
        analysis.statistics.datacenter = Some(datacenter.into());
        Ok(analysis)
    }

    /// Ranges flagged as gaps.
    pub fn gaps(&self) -> impl Iterator<Item = &OwnershipRange> {
        self.ranges.iter().filter(|r| r.is_gap)
    }
}
