//! # Power Aggregation Module
//!
//! Splits the energy of a magnitude spectrum into the part carried by the
//! fundamental, the part carried by each selected harmonic, and the total.
//! The metrics are ratios built on top of this breakdown.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};

use crate::config::{AnalysisConfig, PeakExtent};
use crate::error::{MetricsError, MetricsResult};
use crate::peak::{self, bin_energy};

/// Itemized energy of one spectrum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerBreakdown {
    /// Sum of the squared magnitudes of every analysed bin.
    pub total_energy: f64,
    /// Energy attributed to the fundamental (multiplier 1).
    pub fundamental_energy: f64,
    /// Energy attributed to each harmonic multiplier other than 1.
    pub harmonic_energies: BTreeMap<u32, f64>,
    /// Energy of the analysed bins no multiplier claimed.
    pub residual_energy: f64,
    /// Bins claimed by each multiplier, the fundamental included.
    pub bins: BTreeMap<u32, Vec<usize>>,
}

impl PowerBreakdown {
    /// Combined energy of the selected harmonics, excluding the fundamental.
    pub fn harmonic_energy(&self) -> f64 {
        self.harmonic_energies.values().sum()
    }

    /// Fundamental plus harmonics.
    pub fn signal_energy(&self) -> f64 {
        self.fundamental_energy + self.harmonic_energy()
    }

    /// Every bin claimed by the fundamental or a harmonic.
    pub fn claimed_bins(&self) -> BTreeSet<usize> {
        self.bins.values().flatten().copied().collect()
    }
}

/// Rejects inputs for which no bin can be located.
pub(crate) fn check_inputs(bins: usize, sample_rate: f64, fundamental: f64) -> MetricsResult<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(MetricsError::InvalidSampleRate(sample_rate));
    }
    let nyquist = sample_rate / 2.0;
    if !fundamental.is_finite() || fundamental <= 0.0 || fundamental >= nyquist {
        return Err(MetricsError::FundamentalOutOfRange { fundamental, nyquist });
    }
    if bins < 2 {
        return Err(MetricsError::SpectrumTooShort(bins));
    }
    Ok(())
}

/// Aggregates a spectrum with the default [`AnalysisConfig`].
pub fn aggregate(
    spectrum: &[f32],
    sample_rate: f64,
    fundamental: f64,
    multipliers: &[u32],
) -> MetricsResult<PowerBreakdown> {
    let config = AnalysisConfig::default();
    aggregate_with_config(spectrum, sample_rate, fundamental, multipliers, &config)
}

/// Computes the [`PowerBreakdown`] of `spectrum`.
///
/// The fundamental is always located, whether or not `multipliers` holds 1.
/// Multipliers are processed in ascending order. Each one is located with
/// the peak search, and a bin already claimed by a lower multiplier adds
/// nothing to a later one, so the signal never exceeds the total. A
/// multiplier whose frequency reaches Nyquist is skipped and contributes
/// nothing. The residual is summed over the unclaimed bins themselves, so
/// it is exactly zero when the signal claims every bin carrying energy.
///
/// # Errors
/// * [`MetricsError::InvalidSampleRate`], [`MetricsError::FundamentalOutOfRange`]
///   or [`MetricsError::SpectrumTooShort`] for unusable inputs.
/// * [`MetricsError::InvalidConfig`] if `config` does not validate.
pub fn aggregate_with_config(
    spectrum: &[f32],
    sample_rate: f64,
    fundamental: f64,
    multipliers: &[u32],
    config: &AnalysisConfig,
) -> MetricsResult<PowerBreakdown> {
    check_inputs(spectrum.len(), sample_rate, fundamental)?;
    config.validate()?;

    let first_bin = config.first_bin();
    let nyquist = sample_rate / 2.0;
    let bin_width = peak::bin_width(spectrum.len(), sample_rate);

    if config.search_radius as f64 >= fundamental / bin_width / 2.0 {
        warn!(
            search_radius = config.search_radius,
            harmonic_spacing_bins = fundamental / bin_width,
            "peak search windows of neighbouring harmonics overlap"
        );
    }

    let mut breakdown = PowerBreakdown::default();
    let ordered: BTreeSet<u32> = std::iter::once(1)
        .chain(multipliers.iter().copied())
        .filter(|&m| m >= 1)
        .collect();
    let mut claimed = BTreeSet::new();

    for multiplier in ordered {
        let target = multiplier as f64 * fundamental;
        if target >= nyquist {
            trace!(multiplier, target, nyquist, "harmonic at or above Nyquist skipped");
            continue;
        }

        let nominal = peak::nominal_bin(spectrum.len(), sample_rate, target);
        let located = peak::locate_peak_from(spectrum, nominal, config.search_radius, first_bin);

        let candidates: Vec<usize> = match config.peak_extent {
            PeakExtent::Bin => vec![located.index],
            PeakExtent::Lobe => {
                peak::peak_lobe(spectrum, located.index, config.max_lobe_bins, first_bin).collect()
            }
        };
        let owned: Vec<usize> = candidates
            .into_iter()
            .filter(|&bin| claimed.insert(bin))
            .collect();
        let energy: f64 = owned.iter().map(|&bin| bin_energy(spectrum[bin])).sum();

        trace!(
            multiplier,
            nominal,
            peak = located.index,
            bins = owned.len(),
            energy,
            "located harmonic"
        );

        if multiplier == 1 {
            breakdown.fundamental_energy = energy;
        } else {
            breakdown.harmonic_energies.insert(multiplier, energy);
        }
        breakdown.bins.insert(multiplier, owned);
    }

    for (bin, &magnitude) in spectrum.iter().enumerate().skip(first_bin) {
        let energy = bin_energy(magnitude);
        breakdown.total_energy += energy;
        if !claimed.contains(&bin) {
            breakdown.residual_energy += energy;
        }
    }

    debug!(
        total = breakdown.total_energy,
        fundamental = breakdown.fundamental_energy,
        harmonics = breakdown.harmonic_energy(),
        residual = breakdown.residual_energy,
        "aggregated spectrum power"
    );
    Ok(breakdown)
}

/// Energy of `spectrum` not accounted for by the signal of a reference.
///
/// Each bin the reference breakdown `signal` claimed is credited with the
/// reference's own energy in that bin; every other analysed bin counts in
/// full. Identical spectra therefore leave exactly the reference residual,
/// and exactly zero when the reference is all signal. Clamped at zero.
pub fn energy_beyond_signal(
    spectrum: &[f32],
    reference: &[f32],
    signal: &PowerBreakdown,
    first_bin: usize,
) -> f64 {
    let claimed = signal.claimed_bins();
    let beyond: f64 = spectrum
        .iter()
        .zip(reference)
        .enumerate()
        .skip(first_bin)
        .map(|(bin, (&actual, &expected))| {
            if claimed.contains(&bin) {
                bin_energy(actual) - bin_energy(expected)
            } else {
                bin_energy(actual)
            }
        })
        .sum();
    beyond.max(0.0)
}
