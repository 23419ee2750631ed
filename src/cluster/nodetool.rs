//! Reader for `nodetool ring` listings.
//!
//! ```text
//! Datacenter: dc1
//! ==========
//! Address     Rack   Status State   Load       Owns    Token
//!                                                      3074457345618258602
//! 10.0.0.1    rack1  Up     Normal  1.46 TiB   33.33%  -9223372036854775808
//! ```
//!
//! Data rows split on whitespace into address, rack, status, state, a
//! two-word load, owns and token. The lone token printed under the header
//! has no owner and is skipped.

use crate::error::{ParseError, Result};
use crate::types::OwnershipEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const DATACENTER_PREFIX: &str = "Datacenter:";
const ADDRESS_PREFIX: &str = "Address";

/// Entries from a single-ring listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRing {
    /// First datacenter named in the listing, if any.
    pub datacenter: Option<String>,
    pub entries: Vec<OwnershipEntry>,
}

/// Entries belonging to one `Datacenter:` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatacenterSection {
    pub name: String,
    pub entries: Vec<OwnershipEntry>,
}

/// What a single listing line turned out to be.
#[derive(Debug)]
enum RingLine<'a> {
    Blank,
    Datacenter(&'a str),
    AddressHeader,
    Entry(OwnershipEntry),
    Skipped,
}

fn classify(line_no: usize, raw: &str) -> RingLine<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return RingLine::Blank;
    }
    if line.starts_with(DATACENTER_PREFIX) {
        let name = line.split(':').nth(1).unwrap_or_default().trim();
        return RingLine::Datacenter(name);
    }
    if line.starts_with(ADDRESS_PREFIX) {
        return RingLine::AddressHeader;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.len() {
        // orphaned token or separator
        1 => RingLine::Skipped,
        2..=6 => {
            debug!(line = line_no, "Ignoring short ring line");
            RingLine::Skipped
        }
        7 => {
            warn!(line = line_no, content = line, "Skipping ring line without a token");
            RingLine::Skipped
        }
        _ => match parts[7].parse::<i64>() {
            Ok(token) => RingLine::Entry(
                OwnershipEntry::new(parts[0], token)
                    .with_rack(parts[1])
                    .with_status(parts[2], parts[3])
                    .with_load(format!("{} {}", parts[4], parts[5]))
                    .with_owns(parts[6]),
            ),
            Err(e) => {
                warn!(line = line_no, content = line, error = %e, "Skipping malformed ring line");
                RingLine::Skipped
            }
        },
    }
}

/// Parse a listing as one ring.
///
/// Every data row after the first `Address` header is taken, whatever
/// section it sits in.
pub fn parse_ring(text: &str) -> Result<ParsedRing> {
    let mut datacenter = None;
    let mut entries = Vec::new();
    let mut in_rows = false;

    for (i, raw) in text.lines().enumerate() {
        match classify(i + 1, raw) {
            RingLine::Datacenter(name) => {
                if datacenter.is_none() {
                    datacenter = Some(name.to_string());
                }
            }
            RingLine::AddressHeader => in_rows = true,
            RingLine::Entry(entry) if in_rows => entries.push(entry),
            _ => {}
        }
    }

    if !in_rows {
        return Err(ParseError::MissingHeader.into());
    }
    if entries.is_empty() {
        return Err(ParseError::NoTokens.into());
    }

    info!(
        tokens = entries.len(),
        datacenter = datacenter.as_deref().unwrap_or("unknown"),
        "Parsed ring listing"
    );
    Ok(ParsedRing {
        datacenter,
        entries,
    })
}

/// Parse a listing into its datacenter sections, in listing order.
///
/// A section's rows run from its `Address` header to the next blank line
/// or `Datacenter:` header. A datacenter named twice collects both runs.
pub fn parse_datacenters(text: &str) -> Result<Vec<DatacenterSection>> {
    let mut sections: Vec<DatacenterSection> = Vec::new();
    let mut current: Option<usize> = None;
    let mut in_rows = false;

    for (i, raw) in text.lines().enumerate() {
        let line = classify(i + 1, raw);

        if let RingLine::Datacenter(name) = line {
            let idx = match sections.iter().position(|s| s.name == name) {
                Some(idx) => idx,
                None => {
                    sections.push(DatacenterSection {
                        name: name.to_string(),
                        entries: Vec::new(),
                    });
                    sections.len() - 1
                }
            };
            current = Some(idx);
            in_rows = false;
            continue;
        }

        let Some(idx) = current else {
            continue;
        };

        if !in_rows {
            if let RingLine::AddressHeader = line {
                in_rows = true;
            }
            continue;
        }

        match line {
            RingLine::Blank => {
                current = None;
                in_rows = false;
            }
            RingLine::Entry(entry) => sections[idx].entries.push(entry),
            _ => {}
        }
    }

    if sections.is_empty() {
        return Err(ParseError::NoDatacenters.into());
    }

    for section in &sections {
        debug!(datacenter = %section.name, tokens = section.entries.len(), "Parsed datacenter section");
    }
    info!(datacenters = sections.len(), "Parsed multi-datacenter ring listing");
    Ok(sections)
}

/// [`parse_ring`] over a file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedRing> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_ring(&text)
}

/// [`parse_datacenters`] over a file.
pub fn parse_datacenters_file(path: impl AsRef<Path>) -> Result<Vec<DatacenterSection>> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_datacenters(&text)
}

#[cfg(test)]
pub(crate) const SAMPLE_RING: &str = "\
Datacenter: dc1
==========
Address     Rack        Status State   Load            Owns                Token
                                                                           3074457345618258602
10.0.0.1    rack1       Up     Normal  1.46 TiB        33.33%              -9223372036854775808
10.0.0.2    rack1       Up     Normal  1.52 TiB        33.33%              -3074457345618258603
10.0.0.9    rack1       Up     Normal  1.00 TiB        0.00%
10.0.0.3    rack2       Up     Normal  1.49 TiB        33.33%              3074457345618258602

Datacenter: dc2
==========
Address     Rack        Status State   Load            Owns                Token
                                                                           4611686018427387904
10.1.0.1    rack1       Up     Normal  980.12 GiB      50.00%              -4611686018427387904
10.1.0.2    rack1       Down   Normal  1.01 TiB        50.00%              not-a-token
10.1.0.2    rack1       Down   Normal  1.01 TiB        50.00%              4611686018427387904
";
