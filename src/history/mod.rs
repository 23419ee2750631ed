//! Ring history: comparing snapshots and spotting trends over time.
//!
//! Each [`RingSnapshot`] is an independent analysis of one listing taken at
//! a point in time. The [`HistoricalAnalyzer`] keeps them ordered by
//! timestamp and compares any two of them, or the whole series.
//!
//! # Example
//!
//! ```rust
//! use ringscope::history::{HistoricalAnalyzer, RingSnapshot, Trend};
//! use ringscope::{AnalyzerConfig, OwnershipEntry, RingAnalysis};
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! let config = AnalyzerConfig::default();
//! let before = RingAnalysis::analyze(vec![OwnershipEntry::new("a", 0)], &config).unwrap();
//! let after = RingAnalysis::analyze(
//!     vec![OwnershipEntry::new("a", 0), OwnershipEntry::new("b", i64::MIN)],
//!     &config,
//! )
//! .unwrap();
//!
//! let mut history = HistoricalAnalyzer::new();
//! history.add_snapshot(RingSnapshot::new(UNIX_EPOCH + Duration::from_secs(60), "after", after));
//! history.add_snapshot(RingSnapshot::new(UNIX_EPOCH, "before", before));
//!
//! let comparison = history.compare_snapshots(0, 1).unwrap();
//! assert_eq!(comparison.nodes_added, vec!["b".to_string()]);
//! assert_eq!(comparison.time_delta_secs, 60.0);
//! assert_eq!(history.detect_trends().unwrap().token_trend, Trend::Increasing);
//! ```

use crate::cluster::nodetool;
use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::partitioning::RingAnalysis;
use crate::types::NodeId;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info};

/// One analyzed ring listing at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct RingSnapshot {
    pub timestamp: SystemTime,
    /// Where the listing came from, usually a file path.
    pub source: String,
    pub datacenter: Option<String>,
    pub analysis: RingAnalysis,
}

impl RingSnapshot {
    /// Wrap an existing analysis.
    pub fn new(timestamp: SystemTime, source: impl Into<String>, analysis: RingAnalysis) -> Self {
        Self {
            timestamp,
            source: source.into(),
            datacenter: analysis.statistics.datacenter.clone(),
            analysis,
        }
    }

    /// Parse and analyze listing text.
    pub fn from_listing(
        text: &str,
        source: impl Into<String>,
        timestamp: SystemTime,
        config: &AnalyzerConfig,
    ) -> Result<Self> {
        let ring = nodetool::parse_ring(text)?;
        let analysis = match ring.datacenter {
            Some(dc) => RingAnalysis::analyze_datacenter(dc, ring.entries, config)?,
            None => RingAnalysis::analyze(ring.entries, config)?,
        };
        Ok(Self::new(timestamp, source, analysis))
    }

    /// Parse and analyze a listing file. Without an explicit timestamp the
    /// file's modification time is used.
    pub fn from_file(
        path: impl AsRef<Path>,
        timestamp: Option<SystemTime>,
        config: &AnalyzerConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let timestamp = match timestamp {
            Some(ts) => ts,
            None => std::fs::metadata(path)?.modified()?,
        };
        Self::from_listing(&text, path.display().to_string(), timestamp, config)
    }

    pub fn total_tokens(&self) -> usize {
        self.analysis.entries.len()
    }

    fn node_token_count(&self, node: &str) -> usize {
        self.analysis
            .statistics
            .node(node)
            .map(|n| n.token_count)
            .unwrap_or(0)
    }

    fn node_set(&self) -> BTreeSet<&str> {
        self.analysis
            .statistics
            .nodes
            .iter()
            .map(|n| n.node.as_str())
            .collect()
    }
}

/// Direction of a count over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    fn between<T: PartialOrd>(first: T, last: T) -> Self {
        match last.partial_cmp(&first) {
            Some(Ordering::Greater) => Trend::Increasing,
            Some(Ordering::Less) => Trend::Decreasing,
            _ => Trend::Stable,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

/// Direction of the balance score over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceTrend {
    Improving,
    Degrading,
    Stable,
}

impl From<Trend> for BalanceTrend {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Increasing => BalanceTrend::Improving,
            Trend::Decreasing => BalanceTrend::Degrading,
            Trend::Stable => BalanceTrend::Stable,
        }
    }
}

impl fmt::Display for BalanceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceTrend::Improving => write!(f, "improving"),
            BalanceTrend::Degrading => write!(f, "degrading"),
            BalanceTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Token count change for a node present in both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCountChange {
    pub node: NodeId,
    pub before: usize,
    pub after: usize,
    pub change: i64,
}

/// Differences between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotComparison {
    pub from_timestamp: SystemTime,
    pub to_timestamp: SystemTime,
    /// Seconds from the first snapshot to the second, negative when the
    /// first is the later one.
    pub time_delta_secs: f64,
    pub nodes_added: Vec<NodeId>,
    pub nodes_removed: Vec<NodeId>,
    pub nodes_unchanged: Vec<NodeId>,
    /// Only nodes whose count changed, sorted by node.
    pub token_changes: Vec<TokenCountChange>,
    pub total_tokens_before: usize,
    pub total_tokens_after: usize,
    pub balance_score_before: f64,
    pub balance_score_after: f64,
    pub balance_change: f64,
    pub gaps_before: usize,
    pub gaps_after: usize,
    pub gap_change: i64,
    pub gap_percentage_change: f64,
}

/// Per-snapshot series plus first-versus-last trends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub timestamps: Vec<SystemTime>,
    pub total_tokens: Vec<usize>,
    pub node_counts: Vec<usize>,
    pub balance_scores: Vec<f64>,
    pub gap_counts: Vec<usize>,
    pub gap_percentages: Vec<f64>,
    pub token_trend: Trend,
    pub balance_trend: BalanceTrend,
    pub gap_trend: Trend,
}

/// Snapshots ordered by timestamp.
#[derive(Debug, Clone, Default)]
pub struct HistoricalAnalyzer {
    snapshots: Vec<RingSnapshot>,
}

impl HistoricalAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot, keeping timestamp order. Equal timestamps keep
    /// insertion order.
    pub fn add_snapshot(&mut self, snapshot: RingSnapshot) {
        let idx = self
            .snapshots
            .partition_point(|s| s.timestamp <= snapshot.timestamp);
        debug!(source = %snapshot.source, position = idx, "Added ring snapshot");
        self.snapshots.insert(idx, snapshot);
    }

    pub fn snapshots(&self) -> &[RingSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at `index` in timestamp order.
    pub fn snapshot(&self, index: usize) -> Result<&RingSnapshot> {
        self.snapshots.get(index).ok_or(Error::SnapshotIndexOutOfRange {
            index,
            len: self.snapshots.len(),
        })
    }

    /// Compare snapshot `first` against snapshot `second`.
    pub fn compare_snapshots(&self, first: usize, second: usize) -> Result<SnapshotComparison> {
        let before = self.snapshot(first)?;
        let after = self.snapshot(second)?;

        let nodes_before = before.node_set();
        let nodes_after = after.node_set();

        let nodes_added: Vec<NodeId> = nodes_after
            .difference(&nodes_before)
            .map(|n| n.to_string())
            .collect();
        let nodes_removed: Vec<NodeId> = nodes_before
            .difference(&nodes_after)
            .map(|n| n.to_string())
            .collect();
        let nodes_unchanged: Vec<NodeId> = nodes_before
            .intersection(&nodes_after)
            .map(|n| n.to_string())
            .collect();

        let token_changes: Vec<TokenCountChange> = nodes_unchanged
            .iter()
            .filter_map(|node| {
                let b = before.node_token_count(node);
                let a = after.node_token_count(node);
                (a != b).then(|| TokenCountChange {
                    node: node.clone(),
                    before: b,
                    after: a,
                    change: a as i64 - b as i64,
                })
            })
            .collect();

        let stats_before = &before.analysis.statistics;
        let stats_after = &after.analysis.statistics;

        let comparison = SnapshotComparison {
            from_timestamp: before.timestamp,
            to_timestamp: after.timestamp,
            time_delta_secs: signed_seconds(before.timestamp, after.timestamp),
            nodes_added,
            nodes_removed,
            nodes_unchanged,
            token_changes,
            total_tokens_before: before.total_tokens(),
            total_tokens_after: after.total_tokens(),
            balance_score_before: stats_before.balance_score,
            balance_score_after: stats_after.balance_score,
            balance_change: stats_after.balance_score - stats_before.balance_score,
            gaps_before: stats_before.gap_count,
            gaps_after: stats_after.gap_count,
            gap_change: stats_after.gap_count as i64 - stats_before.gap_count as i64,
            gap_percentage_change: stats_after.gap_percentage - stats_before.gap_percentage,
        };

        info!(
            first,
            second,
            added = comparison.nodes_added.len(),
            removed = comparison.nodes_removed.len(),
            balance_change = comparison.balance_change,
            "Compared ring snapshots"
        );
        Ok(comparison)
    }

    /// Compare the earliest snapshot against the latest.
    pub fn compare_first_last(&self) -> Result<SnapshotComparison> {
        if self.snapshots.len() < 2 {
            return Err(Error::invalid_input("need at least 2 snapshots to compare"));
        }
        self.compare_snapshots(0, self.snapshots.len() - 1)
    }

    /// Series over every snapshot and first-versus-last trends.
    pub fn detect_trends(&self) -> Result<TrendReport> {
        if self.snapshots.len() < 2 {
            return Err(Error::invalid_input("need at least 2 snapshots for trend analysis"));
        }

        let stats = || self.snapshots.iter().map(|s| &s.analysis.statistics);
        let total_tokens: Vec<usize> = self.snapshots.iter().map(|s| s.total_tokens()).collect();
        let balance_scores: Vec<f64> = stats().map(|s| s.balance_score).collect();
        let gap_counts: Vec<usize> = stats().map(|s| s.gap_count).collect();

        let last = self.snapshots.len() - 1;
        let report = TrendReport {
            timestamps: self.snapshots.iter().map(|s| s.timestamp).collect(),
            node_counts: stats().map(|s| s.node_count()).collect(),
            gap_percentages: stats().map(|s| s.gap_percentage).collect(),
            token_trend: Trend::between(total_tokens[0], total_tokens[last]),
            balance_trend: Trend::between(balance_scores[0], balance_scores[last]).into(),
            gap_trend: Trend::between(gap_counts[0], gap_counts[last]),
            total_tokens,
            balance_scores,
            gap_counts,
        };

        info!(
            snapshots = self.snapshots.len(),
            token_trend = %report.token_trend,
            balance_trend = %report.balance_trend,
            gap_trend = %report.gap_trend,
            "Detected ring trends"
        );
        Ok(report)
    }
}

fn signed_seconds(from: SystemTime, to: SystemTime) -> f64 {
    match to.duration_since(from) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}
