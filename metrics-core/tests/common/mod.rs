//! Spectrum synthesis for the integration tests: a periodic Hann window, a
//! forward FFT and the single-sided magnitudes, DC to Nyquist.

#![allow(dead_code)]

use rand::{rngs::StdRng, Rng, SeedableRng};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// Applies a periodic Hann window in place.
///
/// The periodic form puts a bin-centered tone into exactly three bins.
fn apply_hann_window(buffer: &mut [f64]) {
    let n = buffer.len() as f64;
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample *= 0.5 * (1.0 - (2.0 * PI * i as f64 / n).cos());
    }
}

/// Windowed single-sided magnitude spectrum of `signal` (`len / 2 + 1` bins).
pub fn magnitude_spectrum(signal: &[f64]) -> Vec<f32> {
    let mut windowed = signal.to_vec();
    apply_hann_window(&mut windowed);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(windowed.len());
    let mut buffer: Vec<Complex<f64>> = windowed
        .into_iter()
        .map(|sample| Complex { re: sample, im: 0.0 })
        .collect();
    fft.process(&mut buffer);

    buffer
        .iter()
        .take(signal.len() / 2 + 1)
        .map(|c| c.norm() as f32)
        .collect()
}

/// Frequency of bin `bin` for an FFT of `len` samples.
pub fn bin_frequency(bin: usize, sample_rate: f64, len: usize) -> f64 {
    bin as f64 * sample_rate / len as f64
}

/// Sum of sines `amplitude * sin(2 pi n f t)` for each `(n, amplitude)`.
pub fn partials(
    fundamental: f64,
    amplitudes: &[(u32, f64)],
    sample_rate: f64,
    len: usize,
) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            amplitudes
                .iter()
                .map(|&(n, a)| a * (2.0 * PI * n as f64 * fundamental * t).sin())
                .sum()
        })
        .collect()
}

pub fn sine(frequency: f64, amplitude: f64, sample_rate: f64, len: usize) -> Vec<f64> {
    partials(frequency, &[(1, amplitude)], sample_rate, len)
}

/// Band-limited saw: harmonics 1..=count with amplitude 1/n.
pub fn saw(fundamental: f64, count: u32, sample_rate: f64, len: usize) -> Vec<f64> {
    let amplitudes: Vec<(u32, f64)> = (1..=count).map(|n| (n, 1.0 / n as f64)).collect();
    partials(fundamental, &amplitudes, sample_rate, len)
}

/// Seeded uniform noise in `[-amplitude, amplitude]` (variance `amplitude^2 / 3`).
pub fn uniform_noise(amplitude: f64, len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-amplitude..=amplitude)).collect()
}

pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}
