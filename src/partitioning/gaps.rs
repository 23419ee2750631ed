//! Heuristic coverage gap detection.
//!
//! Ownership data never says "nobody owns this", so a gap is inferred: a
//! range much larger than average with no other node's token inside it is
//! flagged. A single owner that legitimately holds a huge slice looks the
//! same and will be flagged too; the flag is best-effort.

use super::ranges::OwnershipRange;
use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::types::{OwnershipEntry, TOKEN_SPACE};
use tracing::debug;

/// Flags ranges that look like coverage gaps.
#[derive(Debug, Clone)]
pub struct GapDetector<'a> {
    entries: &'a [OwnershipEntry],
    multiplier: f64,
}

impl<'a> GapDetector<'a> {
    /// Create a detector over the full entry set of the ring.
    pub fn new(entries: &'a [OwnershipEntry], config: &AnalyzerConfig) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::invalid_input("cannot detect gaps without entries"));
        }
        Ok(Self {
            entries,
            multiplier: config.gap_threshold_multiplier,
        })
    }

    /// Mean range size implied by the entry count.
    pub fn average_range_size(&self) -> f64 {
        TOKEN_SPACE as f64 / self.entries.len() as f64
    }

    /// Ranges strictly larger than this are gap candidates.
    pub fn gap_threshold(&self) -> f64 {
        self.average_range_size() * self.multiplier
    }

    /// Whether any node other than `range.owner` holds a token strictly
    /// inside the range.
    fn has_foreign_token(&self, range: &OwnershipRange) -> bool {
        self.entries
            .iter()
            .filter(|e| e.node != range.owner)
            .any(|e| range.contains_strictly(e.token))
    }

    /// Decide the gap flag for a single range.
    pub fn is_gap(&self, range: &OwnershipRange) -> bool {
        // A range spanning the whole ring has exactly one owner and nothing
        // to be missing from.
        if range.size >= TOKEN_SPACE {
            return false;
        }
        exceeds(range.size, self.gap_threshold()) && !self.has_foreign_token(range)
    }

    /// Assign `is_gap` on every range.
    ///
    /// Flags are recomputed, not accumulated, so re-running against a
    /// different entry set may clear a flag set earlier.
    pub fn detect(&self, mut ranges: Vec<OwnershipRange>) -> Vec<OwnershipRange> {
        let threshold = self.gap_threshold();
        for range in ranges.iter_mut() {
            range.is_gap = self.is_gap(range);
            if range.is_gap {
                debug!(
                    start = range.start_token,
                    end = range.end_token,
                    owner = %range.owner,
                    size = %range.size,
                    threshold,
                    "Flagged range as probable gap"
                );
            }
        }
        ranges
    }
}

/// Exact `size > threshold` for an integer size.
///
/// Casting the size to `f64` would round sizes past 2^53, so the threshold
/// is floored into the integer domain instead.
fn exceeds(size: u128, threshold: f64) -> bool {
    if threshold.is_nan() {
        return false;
    }
    if threshold < 0.0 {
        return true;
    }
    if threshold >= u128::MAX as f64 {
        return false;
    }
    size > threshold.floor() as u128
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioning::ranges::RangeCalculator;
    use crate::types::Token;

    const STEP: Token = 1 << 60;

    fn lopsided_ring() -> Vec<OwnershipEntry> {
        // Three nodes packed into a quarter of the ring; the arc from the
        // last of them back around to the first is 13/16 of the ring.
        vec![
            OwnershipEntry::new("n1", 0),
            OwnershipEntry::new("n2", STEP),
            OwnershipEntry::new("n3", 2 * STEP),
            OwnershipEntry::new("n4", 3 * STEP),
        ]
    }

    fn detect(entries: &[OwnershipEntry], ranges: Vec<OwnershipRange>) -> Vec<OwnershipRange> {
        GapDetector::new(entries, &AnalyzerConfig::default())
            .unwrap()
            .detect(ranges)
    }

    #[test]
    fn test_empty_entries_rejected() {
        let result = GapDetector::new(&[], &AnalyzerConfig::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_threshold() {
        let entries = lopsided_ring();
        let detector = GapDetector::new(&entries, &AnalyzerConfig::default()).unwrap();
        assert_eq!(detector.average_range_size(), (1u128 << 62) as f64);
        assert_eq!(detector.gap_threshold(), (1u128 << 63) as f64);
    }

    #[test]
    fn test_large_range_flagged() {
        let entries = lopsided_ring();
        let ranges = RangeCalculator::new(&entries).unwrap().calculate();
        let ranges = detect(&entries, ranges);

        let gaps: Vec<_> = ranges.iter().filter(|r| r.is_gap).collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start_token, 3 * STEP);
        assert_eq!(gaps[0].end_token, 0);
        assert_eq!(gaps[0].owner, "n1");
    }

    #[test]
    fn test_foreign_token_clears_flag() {
        let entries = lopsided_ring();
        let ranges = RangeCalculator::new(&entries).unwrap().calculate();
        let ranges = detect(&entries, ranges);
        assert!(ranges[3].is_gap);

        // Same ranges, but another node now claims a token inside the arc.
        let mut with_foreign = entries.clone();
        with_foreign.push(OwnershipEntry::new("n2", -STEP));
        let ranges = detect(&with_foreign, ranges);
        assert!(ranges.iter().all(|r| !r.is_gap));
    }

    #[test]
    fn test_owner_tokens_inside_do_not_count() {
        let entries = lopsided_ring();
        let ranges = RangeCalculator::new(&entries).unwrap().calculate();

        let mut with_own = entries.clone();
        with_own.push(OwnershipEntry::new("n1", -STEP));
        let ranges = detect(&with_own, ranges);
        assert!(ranges[3].is_gap);
    }

    #[test]
    fn test_single_node_never_gap() {
        let entries = vec![OwnershipEntry::new("solo", 0)];
        let ranges = RangeCalculator::new(&entries).unwrap().calculate();
        let config = AnalyzerConfig::default().with_gap_threshold_multiplier(0.5);
        let ranges = GapDetector::new(&entries, &config).unwrap().detect(ranges);

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].size, TOKEN_SPACE);
        assert!(!ranges[0].is_gap);
    }

    #[test]
    fn test_even_ring_has_no_gaps() {
        let entries: Vec<_> = (0..8)
            .map(|i: i64| {
                OwnershipEntry::new(format!("n{}", i % 4), i64::MIN.wrapping_add(i << 61))
            })
            .collect();
        let ranges = RangeCalculator::new(&entries).unwrap().calculate();
        let ranges = detect(&entries, ranges);
        assert!(ranges.iter().all(|r| !r.is_gap));
    }

    #[test]
    fn test_threshold_compared_exactly() {
        // the n1 -> n2 arc is 2^63 + 1 against a threshold of exactly 2^63
        let quarter: Token = 1 << 62;
        let eighth: Token = 1 << 61;
        let entries = vec![
            OwnershipEntry::new("n1", -quarter),
            OwnershipEntry::new("n2", quarter + 1),
            OwnershipEntry::new("n3", quarter + eighth),
            OwnershipEntry::new("n4", -quarter - eighth),
        ];
        let detector = GapDetector::new(&entries, &AnalyzerConfig::default()).unwrap();
        assert_eq!(detector.gap_threshold(), (1u128 << 63) as f64);

        let ranges = detector.detect(RangeCalculator::new(&entries).unwrap().calculate());
        let arc = ranges.iter().find(|r| r.start_token == -quarter).unwrap();
        assert_eq!(arc.size, (1u128 << 63) + 1);
        assert_eq!(arc.owner, "n2");
        assert!(arc.is_gap);
        assert_eq!(ranges.iter().filter(|r| r.is_gap).count(), 1);
    }

    #[test]
    fn test_exceeds_edges() {
        assert!(exceeds((1 << 63) + 1, (1u128 << 63) as f64));
        assert!(!exceeds(1 << 63, (1u128 << 63) as f64));
        assert!(exceeds(11, 10.5));
        assert!(!exceeds(10, 10.5));
        assert!(exceeds(0, -1.0));
        assert!(!exceeds(u128::MAX, f64::INFINITY));
        assert!(!exceeds(u128::MAX, f64::NAN));
    }
}
