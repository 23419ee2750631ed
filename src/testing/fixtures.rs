//! Rings with a known shape.

use crate::config::AnalyzerConfig;
use crate::partitioning::{NodeStatistics, RingAnalysis, RingStatistics};
use crate::types::{OwnershipEntry, MIN_TOKEN, TOKEN_SPACE};

fn node_name(i: usize) -> String {
    format!("n{}", i)
}

fn token_at(offset: u128) -> i64 {
    (MIN_TOKEN as i128 + offset as i128) as i64
}

/// Entries for `node_count` nodes holding `tokens_per_node` evenly spaced
/// tokens each, owners assigned round-robin.
pub(crate) fn even_entries(node_count: usize, tokens_per_node: usize) -> Vec<OwnershipEntry> {
    let total = (node_count * tokens_per_node) as u128;
    (0..total)
        .map(|k| {
            OwnershipEntry::new(
                node_name(k as usize % node_count),
                token_at(TOKEN_SPACE * k / total),
            )
        })
        .collect()
}

/// Analysis of [`even_entries`] with the default configuration.
pub(crate) fn even_ring(node_count: usize, tokens_per_node: usize) -> RingAnalysis {
    RingAnalysis::analyze(
        even_entries(node_count, tokens_per_node),
        &AnalyzerConfig::default(),
    )
    .unwrap()
}

/// Entries where node `n{i}` holds `counts[i]` tokens.
///
/// Token `k` of `T` sits at `TOKEN_SPACE * k² / T²`, so range sizes grow
/// linearly around the ring: the balance score lands near 0.42 while no
/// range is large enough to be a gap. Owners rotate over the nodes that
/// still need tokens, so first appearance follows `counts` order.
pub(crate) fn skewed_entries(counts: &[usize]) -> Vec<OwnershipEntry> {
    let total: usize = counts.iter().sum();
    let total_sq = (total * total) as u128;
    let mut remaining = counts.to_vec();
    let mut entries = Vec::with_capacity(total);
    let mut cursor = 0;

    for k in 0..total {
        while remaining[cursor % counts.len()] == 0 {
            cursor += 1;
        }
        let node = cursor % counts.len();
        remaining[node] -= 1;
        cursor += 1;

        let k = k as u128;
        entries.push(OwnershipEntry::new(
            node_name(node),
            token_at(TOKEN_SPACE * k * k / total_sq),
        ));
    }
    entries
}

/// Analysis of [`skewed_entries`] with the default configuration.
pub(crate) fn skewed_ring(counts: &[usize]) -> RingAnalysis {
    RingAnalysis::analyze(skewed_entries(counts), &AnalyzerConfig::default()).unwrap()
}

/// Statistics carrying only token counts and a balance score.
pub(crate) fn statistics_with_score(nodes: &[(&str, usize)], balance_score: f64) -> RingStatistics {
    RingStatistics {
        datacenter: None,
        total_entries: nodes.iter().map(|(_, count)| count).sum(),
        total_ranges: 0,
        nodes: nodes
            .iter()
            .map(|(node, count)| NodeStatistics {
                node: node.to_string(),
                token_count: *count,
                load: String::new(),
                total_owned_size: 0,
                coverage_percentage: 0.0,
            })
            .collect(),
        gap_count: 0,
        gap_percentage: 0.0,
        balance_score,
        largest_gap: 0,
        smallest_non_gap_range: None,
        average_non_gap_range: 0.0,
    }
}

#[test]
fn test_fixture_shapes() {
    let even = even_ring(4, 3);
    assert_eq!(even.entries.len(), 12);
    assert_eq!(even.statistics.gap_count, 0);
    assert!(even.statistics.balance_score > 0.999);

    let skewed = skewed_ring(&[6, 3, 3]);
    let counts: Vec<_> = skewed
        .statistics
        .nodes
        .iter()
        .map(|n| (n.node.as_str(), n.token_count))
        .collect();
    assert_eq!(counts, vec![("n0", 6), ("n1", 3), ("n2", 3)]);
    assert_eq!(skewed.statistics.gap_count, 0);
    assert!(skewed.statistics.balance_score > 0.3);
    assert!(skewed.statistics.balance_score < 0.5);
}
