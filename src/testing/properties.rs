//! Property-based tests for the ring invariants.

use crate::config::AnalyzerConfig;
use crate::partitioning::{balance_score, RangeCalculator, RingAnalysis};
use crate::types::{OwnershipEntry, Token, TOKEN_SPACE};
use proptest::prelude::*;

/// Between 1 and 64 distinct tokens anywhere on the ring.
fn distinct_tokens() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::btree_set(any::<i64>(), 1..64).prop_map(|set| set.into_iter().collect())
}

/// Tokens spread over up to 8 nodes, in caller order.
fn ring_entries() -> impl Strategy<Value = Vec<OwnershipEntry>> {
    (distinct_tokens(), 1..8usize).prop_map(|(tokens, nodes)| {
        tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| OwnershipEntry::new(format!("10.0.0.{}", i % nodes), token))
            .collect()
    })
}

proptest! {
    /// Property: ranges partition the ring exactly.
    #[test]
    fn ranges_partition_ring(entries in ring_entries()) {
        let ranges = RangeCalculator::new(&entries).unwrap().calculate();

        prop_assert_eq!(ranges.len(), entries.len());
        prop_assert_eq!(ranges.iter().map(|r| r.size).sum::<u128>(), TOKEN_SPACE);
        for (i, range) in ranges.iter().enumerate() {
            let next = &ranges[(i + 1) % ranges.len()];
            prop_assert_eq!(range.end_token, next.start_token);
        }
    }

    /// Property: each range is owned by the node holding its end token.
    #[test]
    fn range_owner_holds_end_token(entries in ring_entries()) {
        let ranges = RangeCalculator::new(&entries).unwrap().calculate();
        for range in &ranges {
            prop_assert!(entries
                .iter()
                .any(|e| e.token == range.end_token && e.node == range.owner));
        }
    }

    /// Property: balance score is within [0, 1].
    #[test]
    fn balance_score_bounded(sizes in prop::collection::vec(any::<u64>(), 1..50)) {
        let sizes: Vec<u128> = sizes.into_iter().map(u128::from).collect();
        let score = balance_score(&sizes);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    /// Property: uniform sizes score exactly 1.0.
    #[test]
    fn uniform_sizes_score_one(size in any::<u64>(), count in 1..50usize) {
        let sizes = vec![u128::from(size); count];
        prop_assert_eq!(balance_score(&sizes), 1.0);
    }

    /// Property: owned coverage and gaps account for the whole ring.
    #[test]
    fn coverage_accounts_for_ring(entries in ring_entries()) {
        let analysis = RingAnalysis::analyze(entries, &AnalyzerConfig::default()).unwrap();
        let stats = &analysis.statistics;

        prop_assert!((stats.owned_percentage() + stats.gap_percentage - 100.0).abs() < 1e-6);
        prop_assert_eq!(stats.gap_count, analysis.gaps().count());
        prop_assert!((0.0..=1.0).contains(&stats.balance_score));
        prop_assert_eq!(
            stats.nodes.iter().map(|n| n.token_count).sum::<usize>(),
            stats.total_entries
        );
    }
}
