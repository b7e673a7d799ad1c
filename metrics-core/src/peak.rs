//! # Peak Location Module
//!
//! Maps a target frequency onto the single-sided magnitude spectrum and
//! finds the actual peak bin near it. A tone rarely lands on a bin center
//! after windowing, so instead of reading the nominal bin the locator takes
//! the strongest bin within a small window around it.

use std::ops::RangeInclusive;

/// A located spectral peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinPeak {
    /// Index of the peak bin in the spectrum.
    pub index: usize,
    /// Energy of the peak bin (squared magnitude).
    pub energy: f64,
}

/// Length of the FFT that produced a single-sided spectrum of `bins` bins.
pub fn fft_length(bins: usize) -> usize {
    2 * bins.saturating_sub(1)
}

/// Width of one bin in Hz.
pub fn bin_width(bins: usize, sample_rate: f64) -> f64 {
    sample_rate / fft_length(bins) as f64
}

/// Nearest bin to `frequency`, without any bounds clamping.
pub fn nominal_bin(bins: usize, sample_rate: f64, frequency: f64) -> usize {
    (frequency / bin_width(bins, sample_rate)).round() as usize
}

/// Energy carried by a magnitude bin.
#[inline]
pub fn bin_energy(magnitude: f32) -> f64 {
    let magnitude = magnitude as f64;
    magnitude * magnitude
}

/// Locates the peak nearest to `target_frequency`.
///
/// The nominal bin is `round(target / bin_width)`; the bins within
/// `search_radius` of it (clamped to the spectrum) are searched for the
/// largest magnitude. On equal magnitudes the bin closest to the nominal
/// one wins, then the lower index.
///
/// Returns `None` for a spectrum of fewer than two bins, which has no bin
/// width. A target at or above Nyquist searches around the last bin.
pub fn locate_peak(
    spectrum: &[f32],
    sample_rate: f64,
    target_frequency: f64,
    search_radius: usize,
) -> Option<BinPeak> {
    if spectrum.len() < 2 {
        return None;
    }
    let nominal = nominal_bin(spectrum.len(), sample_rate, target_frequency);
    Some(locate_peak_from(spectrum, nominal, search_radius, 0))
}

/// Searches around an already computed nominal bin, ignoring bins below
/// `first_bin`. The spectrum must not be empty.
pub(crate) fn locate_peak_from(
    spectrum: &[f32],
    nominal: usize,
    search_radius: usize,
    first_bin: usize,
) -> BinPeak {
    let last = spectrum.len().saturating_sub(1);
    let nominal = nominal.clamp(first_bin.min(last), last);
    let start = nominal.saturating_sub(search_radius).max(first_bin).min(nominal);
    let end = (nominal + search_radius).min(last);

    let mut best = nominal;
    for i in start..=end {
        let (current, candidate) = (spectrum[best], spectrum[i]);
        let closer = i.abs_diff(nominal) < best.abs_diff(nominal);
        if candidate > current || (candidate == current && closer) {
            best = i;
        }
    }

    BinPeak {
        index: best,
        energy: bin_energy(spectrum[best]),
    }
}

/// Bins making up the main lobe of the peak at `peak`.
///
/// Walks outwards on each side while the magnitude does not increase, for
/// at most `max_bins` steps per side and never below `first_bin`.
pub fn peak_lobe(
    spectrum: &[f32],
    peak: usize,
    max_bins: usize,
    first_bin: usize,
) -> RangeInclusive<usize> {
    let last = spectrum.len().saturating_sub(1);
    let peak = peak.min(last);

    let mut start = peak;
    while start > first_bin && peak - start < max_bins && spectrum[start - 1] <= spectrum[start] {
        start -= 1;
    }

    let mut end = peak;
    while end < last && end - peak < max_bins && spectrum[end + 1] <= spectrum[end] {
        end += 1;
    }

    start..=end
}
