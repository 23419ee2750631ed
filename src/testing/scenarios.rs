//! End-to-end scenarios: listing text through analysis, advice and reports.

use crate::cluster::nodetool::{parse_ring, SAMPLE_RING};
use crate::config::AnalyzerConfig;
use crate::partitioning::{GapDetector, RangeCalculator, RingAnalysis};
use crate::rebalancing::RebalancingAdvisor;
use crate::report::{self, RebalancingExport};
use crate::testing::fixtures::{skewed_entries, skewed_ring};
use crate::types::{OwnershipEntry, Token, TOKEN_SPACE};
use test_log::test;

const STEP: Token = 1 << 60;

#[test]
fn wraparound_sizes() {
    let config = AnalyzerConfig::default();
    let entries = vec![OwnershipEntry::new("a", -100), OwnershipEntry::new("b", 100)];
    let analysis = RingAnalysis::analyze(entries, &config).unwrap();

    let forward = analysis.ranges.iter().find(|r| r.start_token == -100).unwrap();
    let wrapping = analysis.ranges.iter().find(|r| r.start_token == 100).unwrap();
    assert_eq!(forward.size, 200);
    assert_eq!(wrapping.size, TOKEN_SPACE - 200);
    assert_eq!(forward.owner, "b");
    assert_eq!(wrapping.owner, "a");
}

#[test]
fn single_node_ring_ignores_threshold() {
    for multiplier in [0.1, 0.5, 2.0] {
        let config = AnalyzerConfig::default().with_gap_threshold_multiplier(multiplier);
        let analysis =
            RingAnalysis::analyze(vec![OwnershipEntry::new("solo", 0)], &config).unwrap();

        assert_eq!(analysis.ranges.len(), 1);
        assert_eq!(analysis.ranges[0].size, TOKEN_SPACE);
        assert!(!analysis.ranges[0].is_gap);
        assert_eq!(analysis.statistics.node("solo").unwrap().coverage_percentage, 100.0);
    }
}

#[test]
fn gap_flag_follows_foreign_tokens() {
    let config = AnalyzerConfig::default();
    // three nodes a sixteenth apart, the fourth leaves 13/16 of the ring
    let entries = vec![
        OwnershipEntry::new("n1", 0),
        OwnershipEntry::new("n2", STEP),
        OwnershipEntry::new("n3", 2 * STEP),
        OwnershipEntry::new("n4", 3 * STEP),
    ];
    let analysis = RingAnalysis::analyze(entries.clone(), &config).unwrap();
    let gaps: Vec<_> = analysis.gaps().collect();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].start_token, 3 * STEP);
    assert_eq!(gaps[0].end_token, 0);

    // re-run detection over the same ranges with a foreign token inside
    let mut with_foreign = entries.clone();
    with_foreign.push(OwnershipEntry::new("n2", -4 * STEP));
    let ranges = RangeCalculator::new(&entries).unwrap().calculate();
    let ranges = GapDetector::new(&entries, &config).unwrap().detect(ranges);
    assert!(ranges[3].is_gap);
    let ranges = GapDetector::new(&with_foreign, &config)
        .unwrap()
        .detect(ranges);
    assert!(ranges.iter().all(|r| !r.is_gap));
}

#[test]
fn balanced_score_suppresses_recommendations() {
    // a 3:1 token split over even ranges scores 1.0
    let quarter: Token = 1 << 62;
    let entries = vec![
        OwnershipEntry::new("a", i64::MIN),
        OwnershipEntry::new("a", -quarter),
        OwnershipEntry::new("a", 0),
        OwnershipEntry::new("b", quarter),
    ];
    let config = AnalyzerConfig::default();
    let analysis = RingAnalysis::analyze(entries, &config).unwrap();
    let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();

    let balance = advisor.analyze_balance();
    assert!(balance.is_balanced);
    assert_eq!(balance.node("a").unwrap().deviation_percentage, 50.0);
    assert!(advisor.generate_recommendations().is_empty());
}

#[test]
fn balanced_nodes_never_move() {
    let config = AnalyzerConfig::default();
    // ideal 4: n0 over, n1 under, n2 exactly at the ideal
    let analysis = skewed_ring(&[5, 3, 4]);
    let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
    let movements = advisor.suggest_token_movements(10);

    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].from_node, "n0");
    assert_eq!(movements[0].to_node, "n1");
    assert!(movements[0].impact_score > 0.0);
    assert!(movements
        .iter()
        .all(|m| m.from_node != "n2" && m.to_node != "n2"));
}

#[test]
fn cost_estimate_is_consistent() {
    let config = AnalyzerConfig::default();
    for counts in [&[6, 3, 3][..], &[8, 8, 2, 2, 4][..], &[13, 8, 9, 10][..]] {
        let analysis = RingAnalysis::analyze(skewed_entries(counts), &config).unwrap();
        let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
        let movements = advisor.suggest_default_token_movements();
        let cost = advisor.estimate_rebalancing_cost(&movements).unwrap();

        assert_eq!(cost.number_of_movements, movements.len());
        assert!(
            (cost.estimated_new_balance_score - cost.current_balance_score
                - cost.balance_improvement)
                .abs()
                < 1e-12
        );
        assert!((0.0..=1.0).contains(&cost.estimated_new_balance_score));
        let moved: i64 = cost
            .simulated_token_counts
            .iter()
            .map(|c| c.after - c.before as i64)
            .sum();
        assert_eq!(moved, 0);
    }
}

#[test]
fn listing_to_report() {
    let config = AnalyzerConfig::default();
    let ring = parse_ring(SAMPLE_RING).unwrap();
    let analysis =
        RingAnalysis::analyze_datacenter(ring.datacenter.unwrap(), ring.entries, &config).unwrap();
    assert_eq!(analysis.statistics.node_count(), 5);

    let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
    let export = RebalancingExport::build(&advisor, 3).unwrap();
    assert!(export.suggested_movements.len() <= 3);

    let mut buf = Vec::new();
    report::write_statistics(&mut buf, &analysis.statistics).unwrap();
    report::write_rebalancing_report(&mut buf, &export).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("Datacenter: dc1"));
    assert!(text.contains("Total Tokens: 5"));
    assert!(text.contains("REBALANCING ANALYSIS REPORT"));

    let json = serde_json::to_string(&export).unwrap();
    assert!(json.contains("\"cost_estimate\""));
}

#[test]
fn config_file_changes_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ringscope.toml");
    std::fs::write(&path, "balanced_threshold = 0.3\n").unwrap();
    let config = AnalyzerConfig::from_toml_file(&path).unwrap();

    let analysis = RingAnalysis::analyze(skewed_entries(&[6, 3, 3]), &config).unwrap();
    let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
    // ~0.42 clears the relaxed threshold
    assert!(advisor.is_balanced());
    assert!(advisor.generate_recommendations().is_empty());
}
