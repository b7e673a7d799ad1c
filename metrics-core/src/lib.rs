// metrics-core/src/lib.rs

//! Aliasing and distortion metrics for audio test tones.
//! This crate computes the signal-to-noise ratio (SNR) and the
//! signal-to-noise-and-distortion ratio (SINAD) of a periodic test tone
//! from precomputed single-sided magnitude spectra. It does no FFT, no
//! windowing and no I/O: callers hand in the spectrum, the sample rate and
//! the fundamental, and get a ratio in dB back.
//!
//! ```
//! use metrics_core::{snr, Harmonics};
//!
//! let mut spectrum = vec![0.0_f32; 513]; // 1024-point FFT
//! spectrum[10] = 1.0; // 440 Hz at 44.1 kHz
//! spectrum[100] = 0.001; // noise
//! let db = snr(&spectrum, 44100.0, 440.0, &Harmonics::default()).unwrap();
//! assert!((db - 60.0).abs() < 1e-3);
//! ```

pub mod config;
pub mod error;
pub mod harmonics;
pub mod metrics;
pub mod peak;
pub mod power;

pub use config::{AnalysisConfig, PeakExtent};
pub use error::{MetricsError, MetricsResult};
pub use harmonics::{HarmonicMode, Harmonics};
pub use metrics::{sinad, sinad_with_config, snr, snr_with_config};
pub use power::PowerBreakdown;
