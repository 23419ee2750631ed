//! Core types used throughout the ring analyzer.
//!
//! The ring is the signed 64-bit token space `[MIN_TOKEN, MAX_TOKEN]` closed
//! into a circle of circumference [`TOKEN_SPACE`]. Every component reads its
//! ring constants from here.

use serde::{Deserialize, Serialize};

/// A point on the ring.
pub type Token = i64;

/// Node identifier (the address column of a ring listing).
pub type NodeId = String;

/// Circumference of the token ring, 2^64.
///
/// Held as `u128` because a ring with a single token owns exactly this much.
pub const TOKEN_SPACE: u128 = 1 << 64;

/// Smallest token on the ring.
pub const MIN_TOKEN: Token = i64::MIN;

/// Largest token on the ring.
pub const MAX_TOKEN: Token = i64::MAX;

/// Express a ring distance as a fraction of the whole ring.
pub fn ring_fraction(size: u128) -> f64 {
    size as f64 / TOKEN_SPACE as f64
}

/// Express a ring distance as a percentage of the whole ring.
pub fn ring_percentage(size: u128) -> f64 {
    ring_fraction(size) * 100.0
}

/// A single token ownership fact for one node.
///
/// Several entries may share a node identifier when the node runs
/// virtual nodes. Load and ownership are carried for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipEntry {
    /// Owning node.
    pub node: NodeId,
    /// Rack the node lives in.
    pub rack: String,
    /// Up/down status column.
    pub status: String,
    /// Normal/joining/leaving state column.
    pub state: String,
    /// Load as reported, e.g. `"1.46 TiB"`.
    pub load: String,
    /// Effective ownership as reported, e.g. `"33.33%"`.
    pub owns: String,
    /// The token itself.
    pub token: Token,
}

impl OwnershipEntry {
    /// Create an entry with empty display columns.
    pub fn new(node: impl Into<NodeId>, token: Token) -> Self {
        Self {
            node: node.into(),
            rack: String::new(),
            status: String::new(),
            state: String::new(),
            load: String::new(),
            owns: String::new(),
            token,
        }
    }

    /// Set the rack.
    pub fn with_rack(mut self, rack: impl Into<String>) -> Self {
        self.rack = rack.into();
        self
    }

    /// Set the status and state columns.
    pub fn with_status(mut self, status: impl Into<String>, state: impl Into<String>) -> Self {
        self.status = status.into();
        self.state = state.into();
        self
    }

    /// Set the load column.
    pub fn with_load(mut self, load: impl Into<String>) -> Self {
        self.load = load.into();
        self
    }

    /// Set the ownership column.
    pub fn with_owns(mut self, owns: impl Into<String>) -> Self {
        self.owns = owns.into();
        self
    }
}

/// Distinct node identifiers in first-appearance order.
pub fn distinct_nodes(entries: &[OwnershipEntry]) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = Vec::new();
    for entry in entries {
        if !nodes.contains(&entry.node) {
            nodes.push(entry.node.clone());
        }
    }
    nodes
}
