//! Rebalancing module: token-count analysis, movement planning and cost.
//!
//! The advisor works from a finished [`RingAnalysis`](crate::partitioning::RingAnalysis)
//! and never mutates it. Everything here is advice; applying a plan is left
//! to the operator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RebalancingAdvisor                        │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  Step 1: Analyze Balance                              │  │
//! │  │  - Ideal tokens per node                              │  │
//! │  │  - Per-node deviation and status                      │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                          ↓                                   │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  Step 2: Recommend and Plan                           │  │
//! │  │  - Add/remove recommendations with priority           │  │
//! │  │  - Concrete token movements ranked by impact          │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                          ↓                                   │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  Step 3: Estimate Cost                                │  │
//! │  │  - Data volume and transfer time                      │  │
//! │  │  - Projected balance after the plan                   │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use ringscope::{AnalyzerConfig, OwnershipEntry, RebalancingAdvisor, RingAnalysis};
//!
//! let step: i64 = 1 << 61;
//! let entries = (0..8i64)
//!     .map(|i| {
//!         let node = if i < 6 { "10.0.0.1" } else if i == 6 { "10.0.0.2" } else { "10.0.0.3" };
//!         OwnershipEntry::new(node, i64::MIN.wrapping_add(i.wrapping_mul(step)))
//!     })
//!     .collect();
//!
//! let config = AnalyzerConfig::default();
//! let analysis = RingAnalysis::analyze(entries, &config).unwrap();
//! let advisor = RebalancingAdvisor::new(&analysis, &config).unwrap();
//!
//! let movements = advisor.suggest_token_movements(5);
//! assert!(movements.iter().all(|m| m.from_node == "10.0.0.1"));
//!
//! let cost = advisor.estimate_rebalancing_cost(&movements).unwrap();
//! assert_eq!(cost.number_of_movements, movements.len());
//! ```

mod advisor;
mod cost;
mod movement;

pub use advisor::{
    BalanceAnalysis, ImbalanceSeverity, NodeBalance, NodeBalanceStatus, Priority,
    RebalancingAdvisor, RebalancingRecommendation,
};
pub use cost::{CostEstimate, SimulatedTokenCount};
pub use movement::TokenMovement;
