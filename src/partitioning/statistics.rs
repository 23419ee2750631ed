//! Per-node coverage and ring-wide balance scoring.

use super::ranges::OwnershipRange;
use crate::error::{Error, Result};
use crate::types::{ring_percentage, NodeId, OwnershipEntry, TOKEN_SPACE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coverage figures for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatistics {
    /// The node.
    pub node: NodeId,
    /// Number of entries (tokens) the node holds.
    pub token_count: usize,
    /// Load string from the node's first entry.
    pub load: String,
    /// Sum of the node's non-gap range sizes.
    pub total_owned_size: u128,
    /// `total_owned_size` as a percentage of the ring.
    pub coverage_percentage: f64,
}

/// Ring-wide statistics for one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingStatistics {
    /// Datacenter the ring belongs to, when known.
    pub datacenter: Option<String>,
    /// Number of ownership entries.
    pub total_entries: usize,
    /// Number of ranges.
    pub total_ranges: usize,
    /// Per-node figures in first-appearance order.
    pub nodes: Vec<NodeStatistics>,
    /// Number of ranges flagged as gaps.
    pub gap_count: usize,
    /// Gap ranges as a percentage of the ring.
    pub gap_percentage: f64,
    /// 1.0 for perfectly even non-gap ranges, towards 0.0 as they spread.
    pub balance_score: f64,
    /// Largest gap range size, 0 without gaps.
    pub largest_gap: u128,
    /// Smallest non-gap range size, `None` when every range is a gap.
    pub smallest_non_gap_range: Option<u128>,
    /// Mean non-gap range size, 0 when every range is a gap.
    pub average_non_gap_range: f64,
}

impl RingStatistics {
    /// Look up a node's figures.
    pub fn node(&self, node: &str) -> Option<&NodeStatistics> {
        self.nodes.iter().find(|n| n.node == node)
    }

    /// Number of distinct nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ring percentage covered by non-gap ranges.
    pub fn owned_percentage(&self) -> f64 {
        self.nodes.iter().map(|n| n.coverage_percentage).sum()
    }
}

/// Aggregates range sizes into node coverage and a balance score.
#[derive(Debug, Clone)]
pub struct BalanceScorer<'a> {
    entries: &'a [OwnershipEntry],
}

impl<'a> BalanceScorer<'a> {
    /// Create a scorer for the given entries.
    pub fn new(entries: &'a [OwnershipEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::invalid_input("cannot score an empty ring"));
        }
        Ok(Self { entries })
    }

    /// Compute statistics over gap-annotated ranges.
    ///
    /// Gap ranges count towards nobody's coverage.
    pub fn score(&self, ranges: &[OwnershipRange]) -> Result<RingStatistics> {
        let mut nodes: Vec<NodeStatistics> = Vec::new();
        for entry in self.entries {
            match nodes.iter_mut().find(|n| n.node == entry.node) {
                Some(stats) => stats.token_count += 1,
                None => nodes.push(NodeStatistics {
                    node: entry.node.clone(),
                    token_count: 1,
                    load: entry.load.clone(),
                    total_owned_size: 0,
                    coverage_percentage: 0.0,
                }),
            }
        }

        let mut gap_count = 0;
        let mut gap_space: u128 = 0;
        let mut largest_gap: u128 = 0;
        let mut sizes: Vec<u128> = Vec::with_capacity(ranges.len());

        for range in ranges {
            if range.is_gap {
                gap_count += 1;
                gap_space += range.size;
                largest_gap = largest_gap.max(range.size);
            } else {
                let owner = nodes
                    .iter_mut()
                    .find(|n| n.node == range.owner)
                    .ok_or_else(|| {
                        Error::invalid_input(format!("range owner {} has no entries", range.owner))
                    })?;
                owner.total_owned_size += range.size;
                sizes.push(range.size);
            }
        }

        for stats in nodes.iter_mut() {
            stats.coverage_percentage = ring_percentage(stats.total_owned_size);
        }

        let balance_score = balance_score(&sizes);
        debug!(
            ranges = ranges.len(),
            gap_count,
            balance_score,
            "Computed ring statistics"
        );

        Ok(RingStatistics {
            datacenter: None,
            total_entries: self.entries.len(),
            total_ranges: ranges.len(),
            nodes,
            gap_count,
            gap_percentage: gap_space as f64 / TOKEN_SPACE as f64 * 100.0,
            balance_score,
            largest_gap,
            smallest_non_gap_range: sizes.iter().copied().min(),
            average_non_gap_range: exact_mean(&sizes),
        })
    }
}

/// Mean of integer sizes, split into quotient and remainder so that equal
/// sizes reproduce their value exactly.
fn exact_mean(sizes: &[u128]) -> f64 {
    if sizes.is_empty() {
        return 0.0;
    }
    let len = sizes.len() as u128;
    let sum: u128 = sizes.iter().sum();
    (sum / len) as f64 + (sum % len) as f64 / len as f64
}

/// Balance score of a set of range sizes: `max(0, 1 - cv)` where `cv` is the
/// coefficient of variation (population standard deviation over mean).
///
/// Fewer than two sizes score 1.0.
pub fn balance_score(sizes: &[u128]) -> f64 {
    if sizes.len() < 2 {
        return 1.0;
    }

    let mean = exact_mean(sizes);
    let variance = sizes
        .iter()
        .map(|&s| {
            let diff = s as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / sizes.len() as f64;
    let std_dev = variance.sqrt();
    let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };

    (1.0 - cv).max(0.0)
}
