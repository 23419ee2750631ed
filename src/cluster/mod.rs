//! Cluster ingestion: reading ring listings and fanning analysis out per
//! datacenter.
//!
//! The analysis engine itself only consumes [`OwnershipEntry`](crate::types::OwnershipEntry)
//! lists; this module turns `nodetool ring` text into those lists and runs
//! one independent [`RingAnalysis`](crate::partitioning::RingAnalysis) per
//! datacenter.

pub mod datacenter;
pub mod nodetool;

pub use datacenter::{DatacenterAnalysis, MultiDatacenterAnalysis, NodeTotal};
pub use nodetool::{
    parse_datacenters, parse_datacenters_file, parse_file, parse_ring, DatacenterSection,
    ParsedRing,
};
