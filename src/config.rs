//! Configuration for the ring analyzer.
//!
//! Every heuristic constant used by gap detection, balance classification,
//! and the rebalancing cost model lives here so callers can tune them in one
//! place. Defaults reproduce the stock thresholds.
//!
//! ```toml
//! gap_threshold_multiplier = 2.0
//! balanced_threshold = 0.9
//!
//! [deviation_bands]
//! balanced_pct = 5.0
//! slightly_imbalanced_pct = 10.0
//! imbalanced_pct = 20.0
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for ring analysis and rebalancing advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// A range larger than this multiple of the average range size is a
    /// gap candidate.
    pub gap_threshold_multiplier: f64,

    /// Balance score at or above which the ring needs no recommendations.
    pub balanced_threshold: f64,

    /// Per-node deviation bands (percent of ideal token count).
    pub deviation_bands: DeviationBands,

    /// Deviation thresholds for recommendation priority.
    pub priority_bands: PriorityBands,

    /// Balance score bands for the overall severity label.
    pub severity_bands: SeverityBands,

    /// Cost model for token movements.
    pub cost: CostModel,

    /// Weight of the moved token's range size in the impact score.
    pub impact_range_weight: f64,

    /// Movement suggestions produced when the caller does not say.
    pub default_max_movements: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            gap_threshold_multiplier: 2.0,
            balanced_threshold: 0.9,
            deviation_bands: DeviationBands::default(),
            priority_bands: PriorityBands::default(),
            severity_bands: SeverityBands::default(),
            cost: CostModel::default(),
            impact_range_weight: 10.0,
            default_max_movements: 10,
        }
    }
}

impl AnalyzerConfig {
    /// Create a configuration with stock thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Set the gap threshold multiplier.
    pub fn with_gap_threshold_multiplier(mut self, multiplier: f64) -> Self {
        self.gap_threshold_multiplier = multiplier;
        self
    }

    /// Set the balanced threshold.
    pub fn with_balanced_threshold(mut self, threshold: f64) -> Self {
        self.balanced_threshold = threshold;
        self
    }

    /// Set the per-node deviation bands.
    pub fn with_deviation_bands(mut self, bands: DeviationBands) -> Self {
        self.deviation_bands = bands;
        self
    }

    /// Set the priority bands.
    pub fn with_priority_bands(mut self, bands: PriorityBands) -> Self {
        self.priority_bands = bands;
        self
    }

    /// Set the severity bands.
    pub fn with_severity_bands(mut self, bands: SeverityBands) -> Self {
        self.severity_bands = bands;
        self
    }

    /// Set the cost model.
    pub fn with_cost_model(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    /// Set the impact range weight.
    pub fn with_impact_range_weight(mut self, weight: f64) -> Self {
        self.impact_range_weight = weight;
        self
    }

    /// Set the default number of movement suggestions.
    pub fn with_default_max_movements(mut self, max: usize) -> Self {
        self.default_max_movements = max;
        self
    }

    /// Check that all thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.gap_threshold_multiplier > 0.0) {
            return Err(Error::Config(format!(
                "gap_threshold_multiplier must be positive, got {}",
                self.gap_threshold_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.balanced_threshold) {
            return Err(Error::Config(format!(
                "balanced_threshold must be within [0, 1], got {}",
                self.balanced_threshold
            )));
        }
        if self.impact_range_weight < 0.0 {
            return Err(Error::Config(format!(
                "impact_range_weight must not be negative, got {}",
                self.impact_range_weight
            )));
        }
        self.deviation_bands.validate()?;
        self.priority_bands.validate()?;
        self.severity_bands.validate()?;
        self.cost.validate()
    }
}

/// Absolute deviation bands, in percent of the ideal token count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviationBands {
    /// Up to this deviation a node is balanced.
    pub balanced_pct: f64,
    /// Up to this deviation a node is slightly imbalanced.
    pub slightly_imbalanced_pct: f64,
    /// Up to this deviation a node is imbalanced; beyond it, severely.
    pub imbalanced_pct: f64,
}

impl Default for DeviationBands {
    fn default() -> Self {
        Self {
            balanced_pct: 5.0,
            slightly_imbalanced_pct: 10.0,
            imbalanced_pct: 20.0,
        }
    }
}

impl DeviationBands {
    fn validate(&self) -> Result<()> {
        if self.balanced_pct < 0.0
            || self.balanced_pct > self.slightly_imbalanced_pct
            || self.slightly_imbalanced_pct > self.imbalanced_pct
        {
            return Err(Error::Config(format!(
                "deviation bands must be non-negative and ascending: {} / {} / {}",
                self.balanced_pct, self.slightly_imbalanced_pct, self.imbalanced_pct
            )));
        }
        Ok(())
    }
}

/// Deviation thresholds (percent) above which a recommendation is raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityBands {
    /// Deviation strictly above this is high priority.
    pub high_pct: f64,
    /// Deviation strictly above this is medium priority; otherwise low.
    pub medium_pct: f64,
}

impl Default for PriorityBands {
    fn default() -> Self {
        Self {
            high_pct: 20.0,
            medium_pct: 10.0,
        }
    }
}

impl PriorityBands {
    fn validate(&self) -> Result<()> {
        if self.medium_pct < 0.0 || self.medium_pct > self.high_pct {
            return Err(Error::Config(format!(
                "priority bands must be non-negative with medium <= high: {} / {}",
                self.medium_pct, self.high_pct
            )));
        }
        Ok(())
    }
}

/// Minimum balance scores for each severity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityBands {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            excellent: 0.95,
            good: 0.9,
            fair: 0.8,
            poor: 0.7,
        }
    }
}

impl SeverityBands {
    fn validate(&self) -> Result<()> {
        let ordered = self.excellent >= self.good && self.good >= self.fair && self.fair >= self.poor;
        if !ordered || self.poor < 0.0 || self.excellent > 1.0 {
            return Err(Error::Config(format!(
                "severity bands must descend within [0, 1]: {} / {} / {} / {}",
                self.excellent, self.good, self.fair, self.poor
            )));
        }
        Ok(())
    }
}

/// Fixed proportionality constants behind the rebalancing cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Data volume (GB) assumed to correspond to the whole ring.
    pub data_gb_per_ring: f64,
    /// Assumed streaming rate in MB/s.
    pub transfer_rate_mb_per_sec: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            data_gb_per_ring: 1000.0,
            transfer_rate_mb_per_sec: 100.0,
        }
    }
}

impl CostModel {
    /// Estimated minutes to stream `data_gb` at the configured rate.
    ///
    /// With the stock rate of 100 MB/s this is `data_gb / 100 * 60 / 1000`.
    pub fn transfer_minutes(&self, data_gb: f64) -> f64 {
        (data_gb / self.transfer_rate_mb_per_sec) * 60.0 / 1000.0
    }

    fn validate(&self) -> Result<()> {
        if self.data_gb_per_ring < 0.0 || !(self.transfer_rate_mb_per_sec > 0.0) {
            return Err(Error::Config(format!(
                "cost model needs data_gb_per_ring >= 0 and a positive transfer rate: {} / {}",
                self.data_gb_per_ring, self.transfer_rate_mb_per_sec
            )));
        }
        Ok(())
    }
}
