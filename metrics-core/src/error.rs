//! Error types returned by the measurement functions.

use thiserror::Error;

/// Convenience type alias for results that may contain a [`MetricsError`].
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors that can occur while resolving harmonics or computing a metric.
///
/// Every error is fatal to the call that raised it; no partial result is
/// produced.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// An explicit harmonic multiplier was 1 or 2.
    ///
    /// The fundamental and the second harmonic always belong to the signal
    /// and cannot be selected by the caller.
    #[error("Invalid harmonic spec: explicit multipliers must be > 2, got {multiplier}")]
    InvalidHarmonicSpec { multiplier: u32 },

    /// The fundamental is not strictly between 0 Hz and the Nyquist frequency.
    #[error("Fundamental out of range: {fundamental} Hz must lie in (0, {nyquist}) Hz")]
    FundamentalOutOfRange { fundamental: f64, nyquist: f64 },

    /// The sample rate is zero, negative or not finite.
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    /// The noisy and clean spectra given to SINAD differ in length.
    #[error("Mismatched spectrum length: noisy has {noisy} bins, clean has {clean}")]
    MismatchedSpectrumLength { noisy: usize, clean: usize },

    /// The spectrum has fewer than two bins, so no bin width can be derived.
    #[error("Spectrum too short: {0} bins, at least 2 are required")]
    SpectrumTooShort(usize),

    /// An analysis configuration was parsed but holds unusable values.
    #[error("Invalid analysis config: {0}")]
    InvalidConfig(String),

    /// An analysis configuration could not be parsed.
    #[error("Analysis config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
