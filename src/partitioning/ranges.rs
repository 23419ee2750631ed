//! Ownership range computation over the wraparound token space.
//!
//! A node owns the arc that ends at its own token, so the range between two
//! consecutive tokens belongs to the node holding the second one.

use crate::error::{Error, Result};
use crate::types::{NodeId, OwnershipEntry, Token, TOKEN_SPACE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The arc of the ring owned by a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRange {
    /// Exclusive start of the arc (the previous token on the ring).
    pub start_token: Token,
    /// Inclusive end of the arc (the owner's token).
    pub end_token: Token,
    /// Node holding `end_token`.
    pub owner: NodeId,
    /// Arc length in tokens.
    pub size: u128,
    /// Set by gap detection when nobody appears to cover this arc.
    pub is_gap: bool,
}

impl OwnershipRange {
    /// Create a range between two tokens, computing its size.
    pub fn new(start_token: Token, end_token: Token, owner: impl Into<NodeId>) -> Self {
        Self {
            start_token,
            end_token,
            owner: owner.into(),
            size: range_size(start_token, end_token),
            is_gap: false,
        }
    }

    /// Whether this range crosses the origin (end before start).
    pub fn wraps(&self) -> bool {
        self.end_token < self.start_token
    }

    /// Whether `token` lies strictly inside the arc.
    pub fn contains_strictly(&self, token: Token) -> bool {
        token_in_open_range(token, self.start_token, self.end_token)
    }

    /// Size as a fraction of the whole ring.
    pub fn fraction(&self) -> f64 {
        crate::types::ring_fraction(self.size)
    }
}

/// Distance travelled clockwise from `start` to `end`.
///
/// Equal tokens give 0; callers handle the single-token ring separately.
pub fn range_size(start: Token, end: Token) -> u128 {
    if end >= start {
        (end as i128 - start as i128) as u128
    } else {
        (TOKEN_SPACE as i128 + end as i128 - start as i128) as u128
    }
}

/// Open-interval containment on the circle.
pub fn token_in_open_range(token: Token, start: Token, end: Token) -> bool {
    if end >= start {
        start < token && token < end
    } else {
        token > start || token < end
    }
}

/// Derives the ordered set of ownership ranges covering the ring.
#[derive(Debug, Clone)]
pub struct RangeCalculator {
    sorted: Vec<OwnershipEntry>,
}

impl RangeCalculator {
    /// Sort entries by token. Callers need not pre-sort.
    ///
    /// Entries with equal tokens keep their input order.
    pub fn new(entries: &[OwnershipEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::invalid_input("cannot build ranges from an empty ring"));
        }

        let mut sorted = entries.to_vec();
        sorted.sort_by_key(|e| e.token);

        for pair in sorted.windows(2) {
            if pair[0].token == pair[1].token {
                warn!(
                    token = pair[0].token,
                    first = %pair[0].node,
                    second = %pair[1].node,
                    "Duplicate token on ring, producing an empty range"
                );
            }
        }

        Ok(Self { sorted })
    }

    /// Entries in ascending token order.
    pub fn sorted_entries(&self) -> &[OwnershipEntry] {
        &self.sorted
    }

    /// Build one range per entry, wrapping from the last token to the first.
    pub fn calculate(&self) -> Vec<OwnershipRange> {
        let n = self.sorted.len();
        if n == 1 {
            let only = &self.sorted[0];
            return vec![OwnershipRange {
                start_token: only.token,
                end_token: only.token,
                owner: only.node.clone(),
                size: TOKEN_SPACE,
                is_gap: false,
            }];
        }

        let ranges: Vec<OwnershipRange> = (0..n)
            .map(|i| {
                let current = &self.sorted[i];
                let next = &self.sorted[(i + 1) % n];
                OwnershipRange::new(current.token, next.token, next.node.clone())
            })
            .collect();

        debug!(ranges = ranges.len(), "Calculated ownership ranges");
        ranges
    }
}
