//! Token ring analysis and rebalancing advice for consistent-hashing clusters.
//!
//! Given the tokens each node owns on the signed 64-bit ring, this crate
//! computes ownership ranges, flags probable coverage gaps, scores balance,
//! and suggests how to even the ring out:
//! - **Partitioning** turns entries into ranges, gap flags and statistics
//! - **Rebalancing** turns statistics into recommendations, token movements
//!   and a cost estimate
//! - **Cluster** reads `nodetool ring` listings and fans analysis out per
//!   datacenter
//! - **History** compares snapshots of the same ring over time
//!
//! Nothing here touches a live cluster; every result is advice computed
//! from a listing.
//!
//! # Example
//!
//! ```rust
//! use ringscope::{AnalyzerConfig, OwnershipEntry, RebalancingAdvisor, RingAnalysis};
//!
//! let quarter: i64 = 1 << 62;
//! let entries = vec![
//!     OwnershipEntry::new("10.0.0.1", i64::MIN),
//!     OwnershipEntry::new("10.0.0.1", -quarter),
//!     OwnershipEntry::new("10.0.0.1", 0),
//!     OwnershipEntry::new("10.0.0.2", quarter),
//! ];
//!
//! let config = AnalyzerConfig::default();
//! let analysis = RingAnalysis::analyze(entries, &config).unwrap();
//! assert_eq!(analysis.statistics.balance_score, 1.0);
//!
//! let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
//! // even ranges, so no recommendations despite the 3:1 token split
//! assert!(advisor.generate_recommendations().is_empty());
//! assert_eq!(advisor.suggest_token_movements(10).len(), 1);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │         nodetool ring listing(s)             │
//! └─────────────────────────────────────────────┘
//!                     │  cluster::nodetool
//!                     ▼
//! ┌─────────────────────────────────────────────┐
//! │           Vec<OwnershipEntry>               │
//! └─────────────────────────────────────────────┘
//!                     │  partitioning
//!                     ▼
//! ┌─────────────────────────────────────────────┐
//! │  RingAnalysis                               │
//! │  • ranges (with gap flags)                  │
//! │  • statistics (coverage, balance score)     │
//! └─────────────────────────────────────────────┘
//!     │               │               │
//!     ▼               ▼               ▼
//! ┌──────────┐  ┌────────────┐  ┌──────────┐
//! │Rebalancing│ │ Datacenter │  │ History  │
//! │ Advisor  │  │  fan-out   │  │ compare  │
//! └──────────┘  └────────────┘  └──────────┘
//! ```
//!
//! # Configuration
//!
//! Every heuristic threshold lives in [`AnalyzerConfig`], which can be
//! built in code or loaded from TOML.

pub mod cluster;
pub mod config;
pub mod error;
pub mod history;
pub mod partitioning;
pub mod rebalancing;
pub mod report;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types
pub use config::{AnalyzerConfig, CostModel, DeviationBands, PriorityBands, SeverityBands};
pub use error::{Error, ParseError, Result};
pub use types::{NodeId, OwnershipEntry, Token, MAX_TOKEN, MIN_TOKEN, TOKEN_SPACE};

// Re-export analysis types
pub use partitioning::{NodeStatistics, OwnershipRange, RingAnalysis, RingStatistics};

// Re-export rebalancing types
pub use rebalancing::{
    BalanceAnalysis, CostEstimate, ImbalanceSeverity, NodeBalanceStatus, Priority,
    RebalancingAdvisor, RebalancingRecommendation, TokenMovement,
};

// Re-export ingestion and history types
pub use cluster::{MultiDatacenterAnalysis, ParsedRing};
pub use history::{HistoricalAnalyzer, RingSnapshot, SnapshotComparison, TrendReport};
pub use report::RebalancingExport;
