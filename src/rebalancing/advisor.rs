//! Balance analysis and per-node rebalancing recommendations.
//!
//! The advisor reasons about token *counts*: each node should hold
//! `total_entries / node_count` tokens, and deviation from that ideal drives
//! both the per-node status and the recommendations.

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::partitioning::{OwnershipRange, RingAnalysis, RingStatistics};
use crate::types::{NodeId, OwnershipEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// How far a node's token count is from the ideal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeBalanceStatus {
    Balanced,
    SlightlyImbalanced,
    Imbalanced,
    SeverelyImbalanced,
}

impl fmt::Display for NodeBalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeBalanceStatus::Balanced => write!(f, "balanced"),
            NodeBalanceStatus::SlightlyImbalanced => write!(f, "slightly_imbalanced"),
            NodeBalanceStatus::Imbalanced => write!(f, "imbalanced"),
            NodeBalanceStatus::SeverelyImbalanced => write!(f, "severely_imbalanced"),
        }
    }
}

/// Overall label for a balance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImbalanceSeverity {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl fmt::Display for ImbalanceSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImbalanceSeverity::Excellent => write!(f, "excellent"),
            ImbalanceSeverity::Good => write!(f, "good"),
            ImbalanceSeverity::Fair => write!(f, "fair"),
            ImbalanceSeverity::Poor => write!(f, "poor"),
            ImbalanceSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Urgency of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank used when ordering recommendations: high 0, medium 1,
    /// low 2.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Token-count balance of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBalance {
    pub node: NodeId,
    pub current_tokens: usize,
    pub ideal_tokens: f64,
    /// `current_tokens - ideal_tokens`; positive means over-allocated.
    pub deviation: f64,
    pub deviation_percentage: f64,
    pub status: NodeBalanceStatus,
}

/// Result of [`RebalancingAdvisor::analyze_balance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAnalysis {
    pub balance_score: f64,
    pub is_balanced: bool,
    pub imbalance_severity: ImbalanceSeverity,
    /// Per-node balance in first-appearance order.
    pub nodes: Vec<NodeBalance>,
}

impl BalanceAnalysis {
    /// Look up one node's balance.
    pub fn node(&self, node: &str) -> Option<&NodeBalance> {
        self.nodes.iter().find(|n| n.node == node)
    }
}

/// Advice to change one node's token count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancingRecommendation {
    pub node: NodeId,
    pub current_token_count: usize,
    pub recommended_token_count: usize,
    /// Tokens to add (positive) or remove (negative).
    pub change: i64,
    pub priority: Priority,
    pub reason: String,
}

/// Turns ring statistics into recommendations, movements and cost estimates.
#[derive(Debug, Clone)]
pub struct RebalancingAdvisor<'a> {
    pub(super) entries: &'a [OwnershipEntry],
    pub(super) ranges: &'a [OwnershipRange],
    pub(super) statistics: &'a RingStatistics,
    pub(super) config: &'a AnalyzerConfig,
    pub(super) ideal_tokens_per_node: f64,
}

impl<'a> RebalancingAdvisor<'a> {
    /// Create an advisor over a completed analysis pass.
    pub fn new(analysis: &'a RingAnalysis, config: &'a AnalyzerConfig) -> Result<Self> {
        Self::from_parts(
            &analysis.entries,
            &analysis.ranges,
            &analysis.statistics,
            config,
        )
    }

    /// Create an advisor from separately computed entries, ranges and
    /// statistics.
    pub fn from_parts(
        entries: &'a [OwnershipEntry],
        ranges: &'a [OwnershipRange],
        statistics: &'a RingStatistics,
        config: &'a AnalyzerConfig,
    ) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::invalid_input("cannot advise on an empty ring"));
        }
        if statistics.nodes.is_empty() {
            return Err(Error::invalid_input("cannot advise on a ring with zero nodes"));
        }

        let ideal_tokens_per_node = entries.len() as f64 / statistics.node_count() as f64;
        debug!(
            entries = entries.len(),
            nodes = statistics.node_count(),
            ideal_tokens_per_node,
            "Created rebalancing advisor"
        );

        Ok(Self {
            entries,
            ranges,
            statistics,
            config,
            ideal_tokens_per_node,
        })
    }

    /// Tokens each node would hold in a perfectly even ring.
    pub fn ideal_tokens_per_node(&self) -> f64 {
        self.ideal_tokens_per_node
    }

    /// Distinct nodes in first-appearance order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.statistics.nodes.iter().map(|n| &n.node)
    }

    /// Whether the balance score clears the configured threshold.
    pub fn is_balanced(&self) -> bool {
        self.statistics.balance_score >= self.config.balanced_threshold
    }

    /// Label the overall balance score.
    pub fn imbalance_severity(&self) -> ImbalanceSeverity {
        let score = self.statistics.balance_score;
        let bands = &self.config.severity_bands;
        if score >= bands.excellent {
            ImbalanceSeverity::Excellent
        } else if score >= bands.good {
            ImbalanceSeverity::Good
        } else if score >= bands.fair {
            ImbalanceSeverity::Fair
        } else if score >= bands.poor {
            ImbalanceSeverity::Poor
        } else {
            ImbalanceSeverity::Critical
        }
    }

    /// Classify a node by its absolute deviation percentage.
    pub fn classify_node(&self, deviation_pct: f64) -> NodeBalanceStatus {
        let abs_dev = deviation_pct.abs();
        let bands = &self.config.deviation_bands;
        if abs_dev <= bands.balanced_pct {
            NodeBalanceStatus::Balanced
        } else if abs_dev <= bands.slightly_imbalanced_pct {
            NodeBalanceStatus::SlightlyImbalanced
        } else if abs_dev <= bands.imbalanced_pct {
            NodeBalanceStatus::Imbalanced
        } else {
            NodeBalanceStatus::SeverelyImbalanced
        }
    }

    fn priority_for(&self, deviation_pct: f64) -> Priority {
        let abs_dev = deviation_pct.abs();
        if abs_dev > self.config.priority_bands.high_pct {
            Priority::High
        } else if abs_dev > self.config.priority_bands.medium_pct {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// Per-node deviation from the ideal token count.
    pub fn analyze_balance(&self) -> BalanceAnalysis {
        let ideal = self.ideal_tokens_per_node;
        let nodes = self
            .statistics
            .nodes
            .iter()
            .map(|stats| {
                let deviation = stats.token_count as f64 - ideal;
                let deviation_percentage = deviation / ideal * 100.0;
                NodeBalance {
                    node: stats.node.clone(),
                    current_tokens: stats.token_count,
                    ideal_tokens: ideal,
                    deviation,
                    deviation_percentage,
                    status: self.classify_node(deviation_percentage),
                }
            })
            .collect();

        BalanceAnalysis {
            balance_score: self.statistics.balance_score,
            is_balanced: self.is_balanced(),
            imbalance_severity: self.imbalance_severity(),
            nodes,
        }
    }

    /// Recommend a token count for every node that is not balanced.
    ///
    /// Returns nothing when the ring as a whole is balanced. The result is
    /// sorted descending on `(priority rank, |change|)`, and since high
    /// priority has the lowest rank, low-priority advice comes first. That
    /// ordering is kept as-is for report compatibility; callers wanting
    /// high-first should re-sort.
    pub fn generate_recommendations(&self) -> Vec<RebalancingRecommendation> {
        let analysis = self.analyze_balance();
        if analysis.is_balanced {
            return Vec::new();
        }

        let ideal = self.ideal_tokens_per_node;
        let mut recommendations: Vec<RebalancingRecommendation> = analysis
            .nodes
            .iter()
            .filter(|n| n.status != NodeBalanceStatus::Balanced)
            .map(|n| {
                let reason = if n.deviation > 0.0 {
                    format!(
                        "Node has {:.1} more tokens than ideal ({:.1}% over). Consider removing tokens.",
                        n.deviation.abs(),
                        n.deviation_percentage.abs()
                    )
                } else {
                    format!(
                        "Node has {:.1} fewer tokens than ideal ({:.1}% under). Consider adding tokens.",
                        n.deviation.abs(),
                        n.deviation_percentage.abs()
                    )
                };

                RebalancingRecommendation {
                    node: n.node.clone(),
                    current_token_count: n.current_tokens,
                    recommended_token_count: ideal.round_ties_even() as usize,
                    change: (ideal - n.current_tokens as f64).round_ties_even() as i64,
                    priority: self.priority_for(n.deviation_percentage),
                    reason,
                }
            })
            .collect();

        recommendations.sort_by(|a, b| {
            (b.priority.rank(), b.change.unsigned_abs()).cmp(&(a.priority.rank(), a.change.unsigned_abs()))
        });

        info!(
            recommendations = recommendations.len(),
            severity = %analysis.imbalance_severity,
            "Generated rebalancing recommendations"
        );
        recommendations
    }
}
