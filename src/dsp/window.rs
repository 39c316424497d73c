//! # Windowed Frame Preprocessing
//!
//! Time-domain preparation applied to every frame before the FFT: remove the
//! DC offset, then taper the frame with a precomputed Hann window so spectral
//! leakage does not smear energy across bins.
//!
//! Also provides the frame-energy measurement the voice activity gate uses.
//! Energy is measured on the DC-centered samples *before* windowing, so the
//! taper does not bias the gate.

use std::f32::consts::TAU;

/// Small constant added to energies to keep them strictly positive.
const ENERGY_EPS: f32 = 1e-12;

/// Generate a Hann window of the given length.
///
/// ## Formula:
/// `w[i] = 0.5 - 0.5 * cos(2*pi*i / (len - 1))`
///
/// ## Edge case:
/// A length-1 window is `[1.0]` (the single sample passes through unchanged).
/// The formula would divide by zero there, so it is special-cased.
pub fn hann_window(len: usize) -> Vec<f32> {
    if len == 0 {
        return Vec::new();
    }
    if len == 1 {
        return vec![1.0];
    }

    let scale = TAU / (len - 1) as f32;
    (0..len).map(|i| 0.5 - 0.5 * (i as f32 * scale).cos()).collect()
}

/// Subtract the arithmetic mean from every sample (DC removal).
///
/// ## Why:
/// A DC offset shows up as a large bin-0 component and wastes headroom.
/// Centering the frame around zero removes it without touching the audio.
pub fn remove_dc(frame: &[f32]) -> Vec<f32> {
    if frame.is_empty() {
        return Vec::new();
    }

    let mean = frame.iter().sum::<f32>() / frame.len() as f32;
    frame.iter().map(|&s| s - mean).collect()
}

/// Multiply samples elementwise by the analysis window.
///
/// The two slices must be the same length; the session guarantees this by
/// construction (both are `frame_length` long).
pub fn apply_window(samples: &[f32], window: &[f32]) -> Vec<f32> {
    samples
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect()
}

/// Mean squared value of the frame, plus a small epsilon.
///
/// ## Returns:
/// Always strictly positive, so downstream ratios and comparisons never
/// divide by or compare against exact zero.
pub fn frame_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return ENERGY_EPS;
    }

    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    sum_sq / samples.len() as f32 + ENERGY_EPS
}
