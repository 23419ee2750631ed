//! Concrete token movement suggestions.
//!
//! Over-allocated nodes give up tokens to under-allocated ones. Each
//! candidate gets an impact score combining how much the move reduces total
//! deviation from the ideal count with the size of the range around the
//! moved token.

use super::advisor::RebalancingAdvisor;
use crate::error::{Error, Result};
use crate::partitioning::OwnershipRange;
use crate::types::{NodeId, Token};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A suggested reassignment of one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMovement {
    /// Token to reassign.
    pub token: Token,
    /// Node currently holding it.
    pub from_node: NodeId,
    /// Node that should take it.
    pub to_node: NodeId,
    /// Higher is more beneficial.
    pub impact_score: f64,
}

impl TokenMovement {
    /// Create a movement with a zero impact score.
    pub fn new(token: Token, from_node: impl Into<NodeId>, to_node: impl Into<NodeId>) -> Self {
        Self {
            token,
            from_node: from_node.into(),
            to_node: to_node.into(),
            impact_score: 0.0,
        }
    }

    /// Set the impact score.
    pub fn with_impact(mut self, impact_score: f64) -> Self {
        self.impact_score = impact_score;
        self
    }
}

impl<'a> RebalancingAdvisor<'a> {
    /// Suggest up to `max_movements` token moves, best first.
    ///
    /// Every over-allocated node (largest surplus first) is paired in turn
    /// with every under-allocated node (largest deficit first). Each pairing
    /// takes the middle token of the over-allocated node's remaining sorted
    /// tokens, so no token is offered twice.
    pub fn suggest_token_movements(&self, max_movements: usize) -> Vec<TokenMovement> {
        let analysis = self.analyze_balance();

        let mut over_allocated: Vec<(&NodeId, f64, usize)> = analysis
            .nodes
            .iter()
            .filter(|n| n.deviation > 0.0)
            .map(|n| (&n.node, n.deviation, n.current_tokens))
            .collect();
        let mut under_allocated: Vec<(&NodeId, f64, usize)> = analysis
            .nodes
            .iter()
            .filter(|n| n.deviation < 0.0)
            .map(|n| (&n.node, n.deviation.abs(), n.current_tokens))
            .collect();

        over_allocated.sort_by(|a, b| b.1.total_cmp(&a.1));
        under_allocated.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut movements = Vec::new();

        'outer: for &(from_node, _, from_count) in &over_allocated {
            let mut node_tokens: Vec<Token> = self
                .entries
                .iter()
                .filter(|e| &e.node == from_node)
                .map(|e| e.token)
                .collect();
            node_tokens.sort_unstable();

            for &(to_node, _, to_count) in &under_allocated {
                if movements.len() >= max_movements {
                    break 'outer;
                }
                if node_tokens.is_empty() {
                    continue;
                }

                let token = node_tokens.remove(node_tokens.len() / 2);
                let impact_score = self.impact_for_counts(token, from_count, to_count);
                movements.push(
                    TokenMovement::new(token, from_node.clone(), to_node.clone())
                        .with_impact(impact_score),
                );
            }

            if movements.len() >= max_movements {
                break;
            }
        }

        movements.sort_by(|a, b| b.impact_score.total_cmp(&a.impact_score));
        movements.truncate(max_movements);

        debug!(
            over_allocated = over_allocated.len(),
            under_allocated = under_allocated.len(),
            movements = movements.len(),
            "Suggested token movements"
        );
        movements
    }

    /// Suggest movements using the configured default limit.
    pub fn suggest_default_token_movements(&self) -> Vec<TokenMovement> {
        self.suggest_token_movements(self.config.default_max_movements)
    }

    /// Impact score of moving `token` from `from_node` to `to_node`.
    pub fn movement_impact(&self, token: Token, from_node: &str, to_node: &str) -> Result<f64> {
        let from_count = self.token_count(from_node)?;
        let to_count = self.token_count(to_node)?;
        Ok(self.impact_for_counts(token, from_count, to_count))
    }

    fn token_count(&self, node: &str) -> Result<usize> {
        self.statistics
            .node(node)
            .map(|n| n.token_count)
            .ok_or_else(|| Error::invalid_input(format!("unknown node {}", node)))
    }

    fn impact_for_counts(&self, token: Token, from_count: usize, to_count: usize) -> f64 {
        let range = match self.impact_range(token) {
            Some(range) => range,
            None => return 0.0,
        };

        let range_size_factor = range.fraction();
        let ideal = self.ideal_tokens_per_node;
        let from = from_count as f64;
        let to = to_count as f64;

        let before = (from - ideal).abs() + (to - ideal).abs();
        let after = (from - 1.0 - ideal).abs() + (to + 1.0 - ideal).abs();
        let improvement = before - after;

        improvement * (1.0 + self.config.impact_range_weight * range_size_factor)
    }

    /// First range whose half-open span `[start, end)` holds the token,
    /// following the wrap for ranges that cross the origin.
    fn impact_range(&self, token: Token) -> Option<&OwnershipRange> {
        self.ranges.iter().find(|r| {
            (r.start_token <= token && token < r.end_token)
                || (r.end_token < r.start_token && (token >= r.start_token || token < r.end_token))
        })
    }
}
