//! Testing utilities for the ring analyzer.
//!
//! Provides ring fixtures with known shape, end-to-end scenario tests
//! across analysis, advice and history, and property-based tests for the
//! ring invariants.
//!
//! # Fixtures
//!
//! - `even_ring(nodes, tokens_per_node)` - evenly spaced tokens, round-robin owners
//! - `skewed_ring(counts)` - fixed token counts per node over uneven but gap-free ranges
//! - `statistics_with_score(nodes, score)` - hand-built statistics for advisor tests

pub(crate) mod fixtures;

mod properties;
mod scenarios;
