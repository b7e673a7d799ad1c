//! # Metrics Module
//!
//! SNR and SINAD in decibels, built from one or two [`PowerBreakdown`]s.
//!
//! ## Zero noise
//! When the noise (or noise-and-distortion) energy is exactly zero the ratio
//! is reported as `f64::INFINITY`. A spectrum whose every bin is claimed by
//! the signal is a valid, perfect measurement rather than a usage error.
//! This also covers an all-zero spectrum.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{MetricsError, MetricsResult};
use crate::harmonics::{self, Harmonics};
use crate::power::{self, PowerBreakdown};

/// `10 * log10(numerator / denominator)`, or `+inf` when the denominator is 0.
pub fn ratio_db(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        debug!(numerator, "zero noise energy, reporting an infinite ratio");
        return f64::INFINITY;
    }
    10.0 * (numerator / denominator).log10()
}

/// SNR of an already aggregated spectrum.
///
/// The noise is everything not claimed by the fundamental or a selected
/// harmonic. With `harmonics_excluded` the harmonics are left out of the
/// signal as well, so only the fundamental is compared against the noise.
pub fn snr_from_breakdown(breakdown: &PowerBreakdown, harmonics_excluded: bool) -> f64 {
    let signal = if harmonics_excluded {
        breakdown.fundamental_energy
    } else {
        breakdown.signal_energy()
    };
    ratio_db(signal, breakdown.residual_energy)
}

/// Signal-to-noise ratio in dB, using the default [`AnalysisConfig`].
///
/// Returns `f64::INFINITY` when no noise energy is left.
///
/// # Arguments
/// * `magnitudes` - Single-sided magnitude spectrum (DC to Nyquist)
/// * `sample_rate` - Sample rate in Hz
/// * `fundamental` - Fundamental of the test tone in Hz
/// * `harmonics` - Harmonics counted as signal
pub fn snr(
    magnitudes: &[f32],
    sample_rate: f64,
    fundamental: f64,
    harmonics: &Harmonics,
) -> MetricsResult<f64> {
    let config = AnalysisConfig::default();
    snr_with_config(magnitudes, sample_rate, fundamental, harmonics, &config)
}

/// Signal-to-noise ratio in dB with an explicit configuration.
///
/// # Errors
/// * [`MetricsError::InvalidHarmonicSpec`] for explicit multipliers ≤ 2.
/// * [`MetricsError::FundamentalOutOfRange`], [`MetricsError::InvalidSampleRate`]
///   or [`MetricsError::SpectrumTooShort`] for unusable inputs.
pub fn snr_with_config(
    magnitudes: &[f32],
    sample_rate: f64,
    fundamental: f64,
    harmonics: &Harmonics,
    config: &AnalysisConfig,
) -> MetricsResult<f64> {
    power::check_inputs(magnitudes.len(), sample_rate, fundamental)?;
    let multipliers = harmonics::resolve(harmonics, sample_rate, fundamental, magnitudes.len())?;
    let breakdown =
        power::aggregate_with_config(magnitudes, sample_rate, fundamental, &multipliers, config)?;

    let snr = snr_from_breakdown(&breakdown, config.harmonics_excluded);
    debug!(snr, harmonics_excluded = config.harmonics_excluded, "computed SNR");
    Ok(snr)
}

/// Signal-to-noise-and-distortion ratio in dB, using the default
/// [`AnalysisConfig`].
///
/// Returns `f64::INFINITY` when the clean signal accounts for all of the
/// noisy capture's energy.
///
/// # Arguments
/// * `noisy_magnitudes` - Spectrum of the device output
/// * `clean_magnitudes` - Spectrum of the clean reference, same length
/// * `sample_rate` - Sample rate in Hz
/// * `fundamental` - Fundamental of the test tone in Hz
/// * `harmonics` - Harmonics counted as signal
pub fn sinad(
    noisy_magnitudes: &[f32],
    clean_magnitudes: &[f32],
    sample_rate: f64,
    fundamental: f64,
    harmonics: &Harmonics,
) -> MetricsResult<f64> {
    let config = AnalysisConfig::default();
    sinad_with_config(
        noisy_magnitudes,
        clean_magnitudes,
        sample_rate,
        fundamental,
        harmonics,
        &config,
    )
}

/// Signal-to-noise-and-distortion ratio in dB with an explicit configuration.
///
/// Both spectra are aggregated with the same resolved multipliers. The clean
/// reference decides which bins carry signal and how much; the noisy capture
/// supplies the total. `harmonics_excluded` has no effect here.
///
/// # Errors
/// * [`MetricsError::MismatchedSpectrumLength`] if the spectra differ in length.
/// * Any error [`snr_with_config`] can return.
pub fn sinad_with_config(
    noisy_magnitudes: &[f32],
    clean_magnitudes: &[f32],
    sample_rate: f64,
    fundamental: f64,
    harmonics: &Harmonics,
    config: &AnalysisConfig,
) -> MetricsResult<f64> {
    if noisy_magnitudes.len() != clean_magnitudes.len() {
        return Err(MetricsError::MismatchedSpectrumLength {
            noisy: noisy_magnitudes.len(),
            clean: clean_magnitudes.len(),
        });
    }
    let bins = noisy_magnitudes.len();
    power::check_inputs(bins, sample_rate, fundamental)?;

    let multipliers = harmonics::resolve(harmonics, sample_rate, fundamental, bins)?;
    let noisy = power::aggregate_with_config(
        noisy_magnitudes,
        sample_rate,
        fundamental,
        &multipliers,
        config,
    )?;
    let clean = power::aggregate_with_config(
        clean_magnitudes,
        sample_rate,
        fundamental,
        &multipliers,
        config,
    )?;

    // total - clean signal, summed bin by bin so a perfect capture leaves exactly 0
    let noise_and_distortion =
        power::energy_beyond_signal(noisy_magnitudes, clean_magnitudes, &clean, config.first_bin());
    let sinad = ratio_db(noisy.total_energy, noise_and_distortion);
    debug!(sinad, total = noisy.total_energy, noise_and_distortion, "computed SINAD");
    Ok(sinad)
}
