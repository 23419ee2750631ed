//! Plain-text reports and JSON export documents.
//!
//! Renderers write to any [`io::Write`] so the binary can target stdout and
//! tests can target a buffer.

use crate::cluster::MultiDatacenterAnalysis;
use crate::error::Result;
use crate::history::{SnapshotComparison, TrendReport};
use crate::partitioning::RingStatistics;
use crate::rebalancing::{
    BalanceAnalysis, CostEstimate, RebalancingAdvisor, RebalancingRecommendation, TokenMovement,
};
use crate::types::{ring_percentage, TOKEN_SPACE};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

const WIDE_RULE: usize = 70;
const RULE: usize = 60;

/// Everything the advisor produces for one ring, as exported to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RebalancingExport {
    pub analysis: BalanceAnalysis,
    pub recommendations: Vec<RebalancingRecommendation>,
    pub suggested_movements: Vec<TokenMovement>,
    pub cost_estimate: CostEstimate,
}

impl RebalancingExport {
    /// Run every advisor stage with the given movement limit.
    pub fn build(advisor: &RebalancingAdvisor<'_>, max_movements: usize) -> Result<Self> {
        let suggested_movements = advisor.suggest_token_movements(max_movements);
        let cost_estimate = advisor.estimate_rebalancing_cost(&suggested_movements)?;
        Ok(Self {
            analysis: advisor.analyze_balance(),
            recommendations: advisor.generate_recommendations(),
            suggested_movements,
            cost_estimate,
        })
    }
}

/// Write `value` as pretty-printed JSON to `path`.
pub fn write_json_file<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    info!(path = %path.display(), "Exported JSON report");
    Ok(())
}

fn rule(w: &mut impl Write, width: usize) -> io::Result<()> {
    writeln!(w, "{}", "=".repeat(width))
}

fn title_case(label: &str) -> String {
    label
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn unix_seconds(ts: SystemTime) -> u64 {
    ts.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn write_statistics_body(w: &mut impl Write, stats: &RingStatistics) -> io::Result<()> {
    writeln!(w, "Total Nodes: {}", stats.node_count())?;
    writeln!(w, "Total Tokens: {}", stats.total_entries)?;

    writeln!(w)?;
    writeln!(w, "Node Distribution:")?;
    let mut nodes: Vec<_> = stats.nodes.iter().collect();
    nodes.sort_by(|a, b| a.node.cmp(&b.node));
    for node in nodes {
        writeln!(
            w,
            "  {}: {} tokens ({:.2}% coverage, load {})",
            node.node, node.token_count, node.coverage_percentage, node.load
        )?;
    }

    writeln!(w)?;
    writeln!(w, "Token Space Coverage:")?;
    writeln!(w, "  Owned: {:.2}%", stats.owned_percentage())?;
    writeln!(
        w,
        "  Gaps: {:.2}% ({} gaps detected)",
        stats.gap_percentage, stats.gap_count
    )?;
    if stats.gap_count > 0 {
        writeln!(
            w,
            "Largest Gap: {:.2}% of token space",
            ring_percentage(stats.largest_gap)
        )?;
    }
    if let Some(smallest) = stats.smallest_non_gap_range {
        writeln!(w, "Smallest Range: {:.2}% of token space", ring_percentage(smallest))?;
    }
    writeln!(
        w,
        "Average Range: {:.2}% of token space",
        stats.average_non_gap_range / TOKEN_SPACE as f64 * 100.0
    )?;

    writeln!(w)?;
    writeln!(w, "Balance Score: {:.3} (1.0 = perfect balance)", stats.balance_score)?;
    Ok(())
}

/// Summary of one ring's statistics.
pub fn write_statistics(w: &mut impl Write, stats: &RingStatistics) -> Result<()> {
    rule(w, RULE)?;
    writeln!(w, "Ring Analysis Summary")?;
    rule(w, RULE)?;
    writeln!(w, "Datacenter: {}", stats.datacenter.as_deref().unwrap_or("Unknown"))?;
    write_statistics_body(w, stats)?;
    rule(w, RULE)?;
    Ok(())
}

/// Balance analysis, recommendations, movements and cost.
pub fn write_rebalancing_report(w: &mut impl Write, export: &RebalancingExport) -> Result<()> {
    let analysis = &export.analysis;

    rule(w, WIDE_RULE)?;
    writeln!(w, "REBALANCING ANALYSIS REPORT")?;
    rule(w, WIDE_RULE)?;

    writeln!(w)?;
    writeln!(w, "OVERALL BALANCE:")?;
    writeln!(w, "  Balance Score: {:.3}", analysis.balance_score)?;
    writeln!(
        w,
        "  Status: {}",
        analysis.imbalance_severity.to_string().to_uppercase()
    )?;
    writeln!(w, "  Balanced: {}", if analysis.is_balanced { "YES" } else { "NO" })?;

    writeln!(w)?;
    writeln!(w, "NODE ANALYSIS:")?;
    for node in &analysis.nodes {
        writeln!(w, "  {}:", node.node)?;
        writeln!(w, "      Current: {} tokens", node.current_tokens)?;
        writeln!(w, "      Ideal: {:.1} tokens", node.ideal_tokens)?;
        writeln!(
            w,
            "      Deviation: {:+.1} ({:+.1}%)",
            node.deviation, node.deviation_percentage
        )?;
        writeln!(w, "      Status: {}", title_case(&node.status.to_string()))?;
    }

    writeln!(w)?;
    if export.recommendations.is_empty() {
        writeln!(w, "No rebalancing needed - cluster is well balanced.")?;
    } else {
        writeln!(w, "RECOMMENDATIONS ({}):", export.recommendations.len())?;
        for (i, rec) in export.recommendations.iter().enumerate() {
            writeln!(w)?;
            writeln!(
                w,
                "  {}. {} [{} PRIORITY]",
                i + 1,
                rec.node,
                rec.priority.to_string().to_uppercase()
            )?;
            writeln!(w, "      Current: {} tokens", rec.current_token_count)?;
            writeln!(w, "      Recommended: {} tokens", rec.recommended_token_count)?;
            writeln!(w, "      Change: {:+} tokens", rec.change)?;
            writeln!(w, "      Reason: {}", rec.reason)?;
        }
    }

    if !export.suggested_movements.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "SUGGESTED TOKEN MOVEMENTS (Top {}):",
            export.suggested_movements.len()
        )?;
        for (i, movement) in export.suggested_movements.iter().enumerate() {
            writeln!(w)?;
            writeln!(w, "  {}. Move token {}", i + 1, movement.token)?;
            writeln!(w, "      From: {}", movement.from_node)?;
            writeln!(w, "      To: {}", movement.to_node)?;
            writeln!(w, "      Impact Score: {:.2}", movement.impact_score)?;
        }

        let cost = &export.cost_estimate;
        writeln!(w)?;
        writeln!(w, "ESTIMATED REBALANCING COST:")?;
        writeln!(w, "  Movements: {}", cost.number_of_movements)?;
        writeln!(w, "  Data Movement: ~{:.1} GB", cost.estimated_data_movement_gb)?;
        writeln!(w, "  Estimated Time: ~{:.1} minutes", cost.estimated_time_minutes)?;
        writeln!(w, "  Current Balance: {:.3}", cost.current_balance_score)?;
        writeln!(w, "  Expected Balance: {:.3}", cost.estimated_new_balance_score)?;
        writeln!(
            w,
            "  Improvement: {:+.3} ({:+.1}%)",
            cost.balance_improvement, cost.improvement_percentage
        )?;
    }

    writeln!(w)?;
    rule(w, WIDE_RULE)?;
    Ok(())
}

/// Per-datacenter statistics followed by cross-datacenter node totals.
pub fn write_multi_datacenter_summary(
    w: &mut impl Write,
    multi: &MultiDatacenterAnalysis,
) -> Result<()> {
    rule(w, WIDE_RULE)?;
    writeln!(w, "MULTI-DATACENTER RING ANALYSIS")?;
    rule(w, WIDE_RULE)?;
    writeln!(w, "Total Datacenters: {}", multi.datacenters.len())?;

    for dc in &multi.datacenters {
        writeln!(w)?;
        writeln!(w, "{}", "-".repeat(WIDE_RULE))?;
        writeln!(w, "Datacenter: {}", dc.name)?;
        writeln!(w, "{}", "-".repeat(WIDE_RULE))?;
        match &dc.analysis {
            Some(analysis) => write_statistics_body(w, &analysis.statistics)?,
            None => writeln!(w, "No tokens")?,
        }
    }

    writeln!(w)?;
    writeln!(w, "NODES ACROSS DATACENTERS:")?;
    let mut totals = multi.node_totals();
    totals.sort_by(|a, b| a.node.cmp(&b.node));
    for total in totals {
        writeln!(
            w,
            "  {} ({}): {} tokens",
            total.node,
            total.datacenters.join(", "),
            total.token_count
        )?;
    }
    rule(w, WIDE_RULE)?;
    Ok(())
}

/// Differences between two snapshots.
pub fn write_comparison(w: &mut impl Write, cmp: &SnapshotComparison) -> Result<()> {
    rule(w, WIDE_RULE)?;
    writeln!(w, "RING COMPARISON REPORT")?;
    rule(w, WIDE_RULE)?;
    writeln!(
        w,
        "Time Period: {} -> {} (unix seconds)",
        unix_seconds(cmp.from_timestamp),
        unix_seconds(cmp.to_timestamp)
    )?;
    writeln!(w, "Duration: {:.0}s", cmp.time_delta_secs)?;

    writeln!(w)?;
    writeln!(w, "NODE CHANGES:")?;
    writeln!(w, "  Added: {} nodes", cmp.nodes_added.len())?;
    for node in &cmp.nodes_added {
        writeln!(w, "    + {}", node)?;
    }
    writeln!(w, "  Removed: {} nodes", cmp.nodes_removed.len())?;
    for node in &cmp.nodes_removed {
        writeln!(w, "    - {}", node)?;
    }
    writeln!(w, "  Unchanged: {} nodes", cmp.nodes_unchanged.len())?;

    writeln!(w)?;
    writeln!(w, "TOKEN CHANGES:")?;
    writeln!(w, "  Before: {} tokens", cmp.total_tokens_before)?;
    writeln!(w, "  After: {} tokens", cmp.total_tokens_after)?;
    writeln!(
        w,
        "  Change: {:+}",
        cmp.total_tokens_after as i64 - cmp.total_tokens_before as i64
    )?;
    if !cmp.token_changes.is_empty() {
        writeln!(w, "  Per-node changes:")?;
        for change in &cmp.token_changes {
            writeln!(
                w,
                "    {}: {} -> {} ({:+})",
                change.node, change.before, change.after, change.change
            )?;
        }
    }

    writeln!(w)?;
    writeln!(w, "BALANCE CHANGES:")?;
    writeln!(w, "  Balance Score Before: {:.3}", cmp.balance_score_before)?;
    writeln!(w, "  Balance Score After: {:.3}", cmp.balance_score_after)?;
    writeln!(w, "  Change: {:+.3}", cmp.balance_change)?;

    writeln!(w)?;
    writeln!(w, "GAP CHANGES:")?;
    writeln!(w, "  Gaps Before: {}", cmp.gaps_before)?;
    writeln!(w, "  Gaps After: {}", cmp.gaps_after)?;
    writeln!(w, "  Change: {:+}", cmp.gap_change)?;
    writeln!(w, "  Gap % Change: {:+.2}%", cmp.gap_percentage_change)?;
    rule(w, WIDE_RULE)?;
    Ok(())
}

/// Per-snapshot series and overall trends.
pub fn write_trends(w: &mut impl Write, trends: &TrendReport) -> Result<()> {
    rule(w, WIDE_RULE)?;
    writeln!(w, "RING TRENDS ({} snapshots)", trends.timestamps.len())?;
    rule(w, WIDE_RULE)?;
    writeln!(
        w,
        "{:>12} {:>8} {:>6} {:>8} {:>5} {:>7}",
        "timestamp", "tokens", "nodes", "balance", "gaps", "gap %"
    )?;
    for i in 0..trends.timestamps.len() {
        writeln!(
            w,
            "{:>12} {:>8} {:>6} {:>8.3} {:>5} {:>7.2}",
            unix_seconds(trends.timestamps[i]),
            trends.total_tokens[i],
            trends.node_counts[i],
            trends.balance_scores[i],
            trends.gap_counts[i],
            trends.gap_percentages[i]
        )?;
    }

    writeln!(w)?;
    writeln!(w, "Trend Analysis:")?;
    writeln!(w, "  Token Trend: {}", trends.token_trend)?;
    writeln!(w, "  Balance Trend: {}", trends.balance_trend)?;
    writeln!(w, "  Gap Trend: {}", trends.gap_trend)?;
    rule(w, WIDE_RULE)?;
    Ok(())
}
