//! # Analysis Configuration
//!
//! The tunable constants of the peak search and power aggregation. All
//! fields have defaults, so a JSON document only needs to name the values
//! it changes.

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, MetricsResult};

/// Default half-width of the peak search window, in bins.
pub const DEFAULT_SEARCH_RADIUS: usize = 2;

/// Default bound on how far a lobe walk may travel on each side of a peak.
pub const DEFAULT_MAX_LOBE_BINS: usize = 1000;

/// Upper bound accepted for `search_radius`.
pub const MAX_SEARCH_RADIUS: usize = 64;

/// How many bins a located peak accounts for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakExtent {
    /// Only the maximum bin of the search window.
    #[default]
    Bin,
    /// The maximum bin plus every bin of its main lobe, walking outwards
    /// while the magnitude does not increase.
    Lobe,
}

/// Settings shared by SNR and SINAD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Peak search half-width around the nominal bin of each harmonic.
    pub search_radius: usize,
    pub peak_extent: PeakExtent,
    /// Per-side limit of a lobe walk (only used with [`PeakExtent::Lobe`]).
    pub max_lobe_bins: usize,
    /// Leave the DC bin out of both the total energy and the peak search.
    pub exclude_dc: bool,
    /// SNR only: count the fundamental alone as signal while still keeping
    /// the selected harmonics out of the noise.
    pub harmonics_excluded: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            search_radius: DEFAULT_SEARCH_RADIUS,
            peak_extent: PeakExtent::Bin,
            max_lobe_bins: DEFAULT_MAX_LOBE_BINS,
            exclude_dc: false,
            harmonics_excluded: false,
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json(json: &str) -> MetricsResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> MetricsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the values can be used for an analysis.
    pub fn validate(&self) -> MetricsResult<()> {
        if self.search_radius >= MAX_SEARCH_RADIUS {
            return Err(MetricsError::InvalidConfig(format!(
                "search_radius must be below {MAX_SEARCH_RADIUS} bins, got {}",
                self.search_radius
            )));
        }
        if self.max_lobe_bins == 0 {
            return Err(MetricsError::InvalidConfig(
                "max_lobe_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// First bin that takes part in the analysis.
    pub(crate) fn first_bin(&self) -> usize {
        usize::from(self.exclude_dc)
    }
}
