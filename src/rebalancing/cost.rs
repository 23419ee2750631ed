//! Cost and benefit estimate for a set of token movements.
//!
//! The data volume comes from a fixed proportionality constant, not from the
//! loads the nodes report, and the projected balance is computed from
//! simulated token counts. It is therefore not on the same scale as the
//! range-size balance score it is compared against.

use super::advisor::RebalancingAdvisor;
use super::movement::TokenMovement;
use crate::error::{Error, Result};
use crate::types::{ring_fraction, NodeId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Token count of one node before and after the simulated movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedTokenCount {
    pub node: NodeId,
    pub before: usize,
    pub after: i64,
}

/// Result of [`RebalancingAdvisor::estimate_rebalancing_cost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub number_of_movements: usize,
    /// Sum of ring fractions of the ranges touched by the movements.
    pub total_data_fraction: f64,
    pub estimated_data_movement_gb: f64,
    pub estimated_time_minutes: f64,
    pub current_balance_score: f64,
    pub estimated_new_balance_score: f64,
    /// `estimated_new_balance_score - current_balance_score`.
    pub balance_improvement: f64,
    /// Improvement relative to the current score, 0 when that score is 0.
    pub improvement_percentage: f64,
    /// Per-node counts after applying every movement.
    pub simulated_token_counts: Vec<SimulatedTokenCount>,
}

impl<'a> RebalancingAdvisor<'a> {
    /// Estimate data moved, time taken and the resulting balance.
    ///
    /// Movements naming nodes outside the ring are rejected. Range lookup
    /// here only matches `start <= token < end`, so a token inside a range
    /// that crosses the origin contributes no data.
    pub fn estimate_rebalancing_cost(&self, movements: &[TokenMovement]) -> Result<CostEstimate> {
        let mut simulated: Vec<SimulatedTokenCount> = self
            .statistics
            .nodes
            .iter()
            .map(|n| SimulatedTokenCount {
                node: n.node.clone(),
                before: n.token_count,
                after: n.token_count as i64,
            })
            .collect();

        let mut total_data_fraction = 0.0;
        for movement in movements {
            if let Some(range) = self
                .ranges
                .iter()
                .find(|r| r.start_token <= movement.token && movement.token < r.end_token)
            {
                total_data_fraction += ring_fraction(range.size);
            }

            simulated_count(&mut simulated, &movement.from_node)?.after -= 1;
            simulated_count(&mut simulated, &movement.to_node)?.after += 1;
        }

        let estimated_data_movement_gb = total_data_fraction * self.config.cost.data_gb_per_ring;
        let estimated_time_minutes = self.config.cost.transfer_minutes(estimated_data_movement_gb);

        let ideal = self.ideal_tokens_per_node;
        let deviations: Vec<f64> = simulated
            .iter()
            .map(|c| (c.after as f64 - ideal).abs())
            .collect();
        let mean_deviation = deviations.iter().sum::<f64>() / deviations.len() as f64;
        let variance = deviations
            .iter()
            .map(|d| (d - mean_deviation) * (d - mean_deviation))
            .sum::<f64>()
            / deviations.len() as f64;
        let cv = if ideal > 0.0 { variance.sqrt() / ideal } else { 0.0 };
        let estimated_new_balance_score = (1.0 - cv).max(0.0);

        let current_balance_score = self.statistics.balance_score;
        let balance_improvement = estimated_new_balance_score - current_balance_score;
        let improvement_percentage = if current_balance_score > 0.0 {
            balance_improvement / current_balance_score * 100.0
        } else {
            0.0
        };

        info!(
            movements = movements.len(),
            estimated_data_movement_gb,
            estimated_time_minutes,
            current_balance_score,
            estimated_new_balance_score,
            "Estimated rebalancing cost"
        );

        Ok(CostEstimate {
            number_of_movements: movements.len(),
            total_data_fraction,
            estimated_data_movement_gb,
            estimated_time_minutes,
            current_balance_score,
            estimated_new_balance_score,
            balance_improvement,
            improvement_percentage,
            simulated_token_counts: simulated,
        })
    }
}

fn simulated_count<'s>(
    counts: &'s mut [SimulatedTokenCount],
    node: &str,
) -> Result<&'s mut SimulatedTokenCount> {
    counts
        .iter_mut()
        .find(|c| c.node == node)
        .ok_or_else(|| Error::invalid_input(format!("movement names unknown node {}", node)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyzerConfig, CostModel};
    use crate::partitioning::RingAnalysis;
    use crate::testing::fixtures::skewed_ring;
    use crate::types::{OwnershipEntry, TOKEN_SPACE};

    #[test]
    fn test_empty_plan() {
        let config = AnalyzerConfig::default();
        let analysis = skewed_ring(&[6, 3, 3]);
        let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
        let cost = advisor.estimate_rebalancing_cost(&[]).unwrap();

        assert_eq!(cost.number_of_movements, 0);
        assert_eq!(cost.estimated_data_movement_gb, 0.0);
        assert_eq!(cost.estimated_time_minutes, 0.0);
        assert!(cost
            .simulated_token_counts
            .iter()
            .all(|c| c.before as i64 == c.after));
    }

    #[test]
    fn test_balance_projection() {
        let config = AnalyzerConfig::default();
        let analysis = skewed_ring(&[6, 3, 3]);
        let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
        let movements = advisor.suggest_token_movements(10);
        let cost = advisor.estimate_rebalancing_cost(&movements).unwrap();

        // n0 gives one token each to n1 and n2: every node ends at the ideal
        assert_eq!(cost.estimated_new_balance_score, 1.0);
        let after: Vec<_> = cost.simulated_token_counts.iter().map(|c| c.after).collect();
        assert_eq!(after, vec![4, 4, 4]);
        assert!(
            (cost.estimated_new_balance_score - cost.current_balance_score - cost.balance_improvement)
                .abs()
                < 1e-12
        );
        assert!(cost.balance_improvement > 0.0);
        assert!(
            (cost.improvement_percentage
                - cost.balance_improvement / cost.current_balance_score * 100.0)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_data_volume_from_range_sizes() {
        let config = AnalyzerConfig::default();
        let quarter: i64 = 1 << 62;
        let entries = vec![
            OwnershipEntry::new("a", -quarter),
            OwnershipEntry::new("b", 0),
            OwnershipEntry::new("c", quarter),
            OwnershipEntry::new("a", 2 * (quarter - 1)),
        ];
        let analysis = RingAnalysis::analyze(entries, &config).unwrap();
        let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();

        // range 0 -> quarter is exactly a quarter of the ring
        let movements = vec![TokenMovement::new(0, "a", "b")];
        let cost = advisor.estimate_rebalancing_cost(&movements).unwrap();
        assert_eq!(cost.total_data_fraction, 0.25);
        assert_eq!(cost.estimated_data_movement_gb, 250.0);
        assert!((cost.estimated_time_minutes - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_wrapping_range_contributes_nothing() {
        let config = AnalyzerConfig::default();
        let entries = vec![OwnershipEntry::new("a", -100), OwnershipEntry::new("b", 100)];
        let analysis = RingAnalysis::analyze(entries, &config).unwrap();
        let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();

        // 100 only falls in the wrapping range 100 -> -100
        let cost = advisor
            .estimate_rebalancing_cost(&[TokenMovement::new(100, "b", "a")])
            .unwrap();
        assert_eq!(cost.total_data_fraction, 0.0);

        let cost = advisor
            .estimate_rebalancing_cost(&[TokenMovement::new(-100, "a", "b")])
            .unwrap();
        assert_eq!(cost.total_data_fraction, 200.0 / TOKEN_SPACE as f64);
    }

    #[test]
    fn test_custom_cost_model() {
        let config = AnalyzerConfig::default().with_cost_model(CostModel {
            data_gb_per_ring: 2000.0,
            transfer_rate_mb_per_sec: 50.0,
        });
        let quarter: i64 = 1 << 62;
        let entries = vec![
            OwnershipEntry::new("a", -quarter),
            OwnershipEntry::new("b", 0),
            OwnershipEntry::new("c", quarter),
            OwnershipEntry::new("a", i64::MAX),
        ];
        let analysis = RingAnalysis::analyze(entries, &config).unwrap();
        let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();

        let cost = advisor
            .estimate_rebalancing_cost(&[TokenMovement::new(0, "a", "b")])
            .unwrap();
        assert_eq!(cost.estimated_data_movement_gb, 500.0);
        assert!((cost.estimated_time_minutes - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let config = AnalyzerConfig::default();
        let analysis = skewed_ring(&[6, 3, 3]);
        let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();

        let result = advisor.estimate_rebalancing_cost(&[TokenMovement::new(0, "n0", "ghost")]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
