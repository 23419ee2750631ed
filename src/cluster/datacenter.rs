//! Per-datacenter analysis of a multi-datacenter listing.

use super::nodetool::DatacenterSection;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::partitioning::RingAnalysis;
use crate::types::{NodeId, OwnershipEntry};
use serde::Serialize;
use tracing::{debug, info};

/// One datacenter and its analysis.
#[derive(Debug, Clone, Serialize)]
pub struct DatacenterAnalysis {
    pub name: String,
    pub entries: Vec<OwnershipEntry>,
    /// `None` for a section without tokens.
    pub analysis: Option<RingAnalysis>,
}

impl DatacenterAnalysis {
    pub fn token_count(&self) -> usize {
        self.entries.len()
    }
}

/// Token totals for one node across every datacenter it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTotal {
    pub node: NodeId,
    pub token_count: usize,
    /// Load from the node's first occurrence.
    pub load: String,
    pub datacenters: Vec<String>,
}

/// Independent ring analyses, one per datacenter.
#[derive(Debug, Clone, Serialize)]
pub struct MultiDatacenterAnalysis {
    pub datacenters: Vec<DatacenterAnalysis>,
}

impl MultiDatacenterAnalysis {
    /// Analyze every non-empty section. Empty sections are kept without an
    /// analysis.
    pub fn analyze(sections: Vec<DatacenterSection>, config: &AnalyzerConfig) -> Result<Self> {
        let mut datacenters = Vec::with_capacity(sections.len());

        for section in sections {
            let analysis = if section.entries.is_empty() {
                debug!(datacenter = %section.name, "Skipping datacenter without tokens");
                None
            } else {
                Some(RingAnalysis::analyze_datacenter(
                    section.name.clone(),
                    section.entries.clone(),
                    config,
                )?)
            };
            datacenters.push(DatacenterAnalysis {
                name: section.name,
                entries: section.entries,
                analysis,
            });
        }

        info!(
            datacenters = datacenters.len(),
            analyzed = datacenters.iter().filter(|d| d.analysis.is_some()).count(),
            "Analyzed datacenters"
        );
        Ok(Self { datacenters })
    }

    /// Look up a datacenter by name.
    pub fn datacenter(&self, name: &str) -> Option<&DatacenterAnalysis> {
        self.datacenters.iter().find(|d| d.name == name)
    }

    /// Datacenters that had tokens, with their analyses.
    pub fn analyzed(&self) -> impl Iterator<Item = (&str, &RingAnalysis)> {
        self.datacenters
            .iter()
            .filter_map(|d| d.analysis.as_ref().map(|a| (d.name.as_str(), a)))
    }

    /// Tokens across all datacenters.
    pub fn total_tokens(&self) -> usize {
        self.datacenters.iter().map(|d| d.token_count()).sum()
    }

    /// Aggregate token counts per node, in first-seen order.
    pub fn node_totals(&self) -> Vec<NodeTotal> {
        let mut totals: Vec<NodeTotal> = Vec::new();
        for dc in &self.datacenters {
            for entry in &dc.entries {
                match totals.iter_mut().find(|t| t.node == entry.node) {
                    Some(total) => {
                        total.token_count += 1;
                        if !total.datacenters.contains(&dc.name) {
                            total.datacenters.push(dc.name.clone());
                        }
                    }
                    None => totals.push(NodeTotal {
                        node: entry.node.clone(),
                        token_count: 1,
                        load: entry.load.clone(),
                        datacenters: vec![dc.name.clone()],
                    }),
                }
            }
        }
        totals
    }
}
