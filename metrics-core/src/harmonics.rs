//! # Harmonic Selection Module
//!
//! Decides which integer multiples of the fundamental count as "signal".
//! A selection is either one of the symbolic modes (every harmonic, the odd
//! ones, the even ones) or an explicit list of multipliers chosen by the
//! caller. Resolution turns it into the concrete, ascending set of
//! multipliers that fit strictly below the Nyquist frequency.
//!
//! The fundamental itself is always signal: the power aggregation locates it
//! whether or not multiplier 1 is part of the resolved set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{MetricsError, MetricsResult};

/// Symbolic harmonic selection, expanded up to the Nyquist frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicMode {
    /// Every multiplier 1, 2, 3, ...
    All,
    /// Multipliers 1, 3, 5, ...
    Odd,
    /// Multipliers 2, 4, 6, ...
    Even,
}

/// Which harmonics of the fundamental belong to the signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Harmonics {
    /// A symbolic mode covering the whole band below Nyquist.
    Mode(HarmonicMode),
    /// Caller-chosen multipliers, each > 2. Multipliers 1 and 2 are always
    /// added on top of these.
    Explicit(Vec<u32>),
}

impl Harmonics {
    pub const ALL: Harmonics = Harmonics::Mode(HarmonicMode::All);
    pub const ODD: Harmonics = Harmonics::Mode(HarmonicMode::Odd);
    pub const EVEN: Harmonics = Harmonics::Mode(HarmonicMode::Even);
}

impl Default for Harmonics {
    /// No extra harmonics: the signal is the fundamental and the 2nd harmonic.
    fn default() -> Self {
        Harmonics::Explicit(Vec::new())
    }
}

impl From<HarmonicMode> for Harmonics {
    fn from(mode: HarmonicMode) -> Self {
        Harmonics::Mode(mode)
    }
}

impl From<Vec<u32>> for Harmonics {
    fn from(multipliers: Vec<u32>) -> Self {
        Harmonics::Explicit(multipliers)
    }
}

impl From<&[u32]> for Harmonics {
    fn from(multipliers: &[u32]) -> Self {
        Harmonics::Explicit(multipliers.to_vec())
    }
}

/// Largest multiplier `m` such that `m * fundamental < sample_rate / 2`,
/// limited to the number of bins above DC in a spectrum of `bins` bins.
///
/// Past that limit several multipliers share a bin and cannot be told
/// apart. Returns 0 when not even the fundamental fits.
pub fn top_multiplier(sample_rate: f64, fundamental: f64, bins: usize) -> u32 {
    let nyquist = sample_rate / 2.0;
    if fundamental.is_nan() || nyquist.is_nan() || fundamental <= 0.0 || fundamental >= nyquist {
        return 0;
    }
    let last_bin = bins.saturating_sub(1).min(u32::MAX as usize) as f64;
    let mut top = (nyquist / fundamental).floor().min(last_bin) as u32;
    // floor() lands on an exact multiple of the fundamental when nyquist is one
    while top > 0 && top as f64 * fundamental >= nyquist {
        top -= 1;
    }
    top
}

/// Resolves a harmonic selection into ascending, distinct multipliers ≥ 1.
///
/// `bins` is the length of the spectrum the multipliers will be located in.
/// Multipliers whose frequency reaches or exceeds Nyquist are dropped
/// silently, so the result may be just `[1]`, or empty for [`Harmonics::EVEN`].
///
/// # Errors
/// * [`MetricsError::InvalidHarmonicSpec`] if an explicit multiplier is ≤ 2.
pub fn resolve(
    harmonics: &Harmonics,
    sample_rate: f64,
    fundamental: f64,
    bins: usize,
) -> MetricsResult<Vec<u32>> {
    let top = top_multiplier(sample_rate, fundamental, bins);

    let multipliers: Vec<u32> = match harmonics {
        Harmonics::Mode(mode) => (1..=top)
            .filter(|&m| match mode {
                HarmonicMode::All => true,
                HarmonicMode::Odd => m % 2 == 1,
                HarmonicMode::Even => m % 2 == 0,
            })
            .collect(),
        Harmonics::Explicit(selected) => {
            if let Some(&multiplier) = selected.iter().find(|&&m| m <= 2) {
                return Err(MetricsError::InvalidHarmonicSpec { multiplier });
            }
            [1, 2]
                .iter()
                .chain(selected.iter())
                .copied()
                .filter(|&m| m <= top)
                .collect::<BTreeSet<u32>>()
                .into_iter()
                .collect()
        }
    };

    debug!(
        ?harmonics,
        sample_rate,
        fundamental,
        top,
        count = multipliers.len(),
        "resolved harmonic multipliers"
    );
    Ok(multipliers)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bins of a 1024-point FFT.
    const BINS: usize = 513;

    #[test]
    fn top_multiplier_is_strictly_below_nyquist() {
        assert_eq!(top_multiplier(44100.0, 440.0, BINS), 50);
        // 22050 / 2205 == 10 exactly, so 10 sits on Nyquist and is excluded
        assert_eq!(top_multiplier(44100.0, 2205.0, BINS), 9);
        assert_eq!(top_multiplier(48000.0, 1000.0, BINS), 23);
        assert_eq!(top_multiplier(44100.0, 22050.0, BINS), 0);
        assert_eq!(top_multiplier(44100.0, 0.0, BINS), 0);
    }

    #[test]
    fn top_multiplier_is_bounded_by_the_spectrum() {
        assert_eq!(top_multiplier(44100.0, 1e-5, BINS), 512);
        assert_eq!(top_multiplier(44100.0, 10.0, 65), 64);
        assert_eq!(top_multiplier(44100.0, 440.0, 1), 0);
    }

    #[test]
    fn tiny_fundamental_resolves_to_at_most_one_multiplier_per_bin() {
        let resolved = resolve(&Harmonics::ALL, 44100.0, 1e-5, BINS).unwrap();
        assert_eq!(resolved.len(), 512);
        assert_eq!(resolved.last(), Some(&512));

        let resolved = resolve(&Harmonics::Explicit(vec![3, 4_000_000]), 44100.0, 1e-5, BINS);
        assert_eq!(resolved.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn all_mode_covers_every_multiplier_below_nyquist() {
        let resolved = resolve(&Harmonics::ALL, 44100.0, 440.0, BINS).unwrap();
        assert_eq!(resolved, (1..=50).collect::<Vec<u32>>());
    }

    #[test]
    fn odd_and_even_modes_filter_by_parity() {
        let odd = resolve(&Harmonics::ODD, 44100.0, 2000.0, BINS).unwrap();
        assert_eq!(odd, vec![1, 3, 5, 7, 9, 11]);

        let even = resolve(&Harmonics::EVEN, 44100.0, 2000.0, BINS).unwrap();
        assert_eq!(even, vec![2, 4, 6, 8, 10]);

        let all = resolve(&Harmonics::ALL, 44100.0, 2000.0, BINS).unwrap();
        let split: BTreeSet<u32> = odd.into_iter().chain(even).collect();
        assert_eq!(split.into_iter().collect::<Vec<_>>(), all);
    }

    #[test]
    fn even_mode_is_empty_when_no_even_harmonic_fits() {
        let even = resolve(&Harmonics::EVEN, 44100.0, 15000.0, BINS).unwrap();
        assert!(even.is_empty());
    }

    #[test]
    fn explicit_list_always_contains_fundamental_and_second() {
        let resolved = resolve(&Harmonics::Explicit(vec![5, 3, 5]), 44100.0, 1000.0, BINS).unwrap();
        assert_eq!(resolved, vec![1, 2, 3, 5]);

        let resolved = resolve(&Harmonics::default(), 44100.0, 1000.0, BINS).unwrap();
        assert_eq!(resolved, vec![1, 2]);
    }

    #[test]
    fn explicit_multipliers_above_nyquist_are_dropped() {
        let resolved = resolve(&vec![3, 7, 40].into(), 44100.0, 3000.0, BINS).unwrap();
        assert_eq!(resolved, vec![1, 2, 3, 7]);

        // Only the fundamental fits below Nyquist
        let resolved = resolve(&vec![3].into(), 44100.0, 15000.0, BINS).unwrap();
        assert_eq!(resolved, vec![1]);
    }

    #[test]
    fn explicit_multiplier_two_or_less_is_rejected() {
        for bad in [vec![2], vec![3, 1], vec![0]] {
            let err = resolve(&Harmonics::Explicit(bad), 44100.0, 440.0, BINS).unwrap_err();
            assert!(matches!(err, MetricsError::InvalidHarmonicSpec { .. }));
        }
    }

    #[test]
    fn harmonics_deserialize_from_json() {
        let mode: Harmonics = serde_json::from_str(r#"{"mode":"odd"}"#).unwrap();
        assert_eq!(mode, Harmonics::ODD);

        let list: Harmonics = serde_json::from_str(r#"{"explicit":[3,4]}"#).unwrap();
        assert_eq!(list, Harmonics::Explicit(vec![3, 4]));
    }
}
