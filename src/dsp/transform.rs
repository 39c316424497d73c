//! # Spectral Transform
//!
//! Wraps the FFT library behind the two operations the denoiser needs:
//! a forward real-input transform producing the non-redundant half spectrum,
//! and an inverse transform that rebuilds a real frame from a half spectrum.
//!
//! ## Conventions:
//! - The frame is zero-padded to `transform_length` before the forward FFT.
//! - The forward transform is unnormalized; the inverse is scaled by
//!   `1 / transform_length`, so forward-then-inverse is the identity.
//!   The voice activity gate's noise reference is computed from these
//!   unnormalized magnitudes, so the scaling is part of the tuned behavior.
//! - The half spectrum has `transform_length / 2 + 1` bins; the remaining
//!   bins are the complex conjugates of the kept ones and are reconstructed
//!   on the inverse path.
//!
//! Transform lengths are not restricted to powers of two - the planner
//! handles arbitrary sizes - but the session validates that the transform is
//! at least as long as the frame before one of these is ever built.

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward/inverse FFT pair for one fixed transform length.
///
/// Plans are computed once at session creation and reused for every frame.
pub struct SpectralTransform {
    transform_length: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl SpectralTransform {
    /// Plan forward and inverse transforms of the given length.
    pub fn new(transform_length: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(transform_length);
        let inverse = planner.plan_fft_inverse(transform_length);

        Self {
            transform_length,
            forward,
            inverse,
        }
    }

    /// The padded length every frame is transformed at.
    #[inline]
    pub fn transform_length(&self) -> usize {
        self.transform_length
    }

    /// Number of non-redundant spectrum bins (`transform_length / 2 + 1`).
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.transform_length / 2 + 1
    }

    /// Forward transform: real samples to half spectrum.
    ///
    /// ## Parameters:
    /// - **samples**: At most `transform_length` samples; shorter input is
    ///   zero-padded (the usual case - the frame is shorter than the FFT)
    ///
    /// ## Returns:
    /// The `num_bins()` non-redundant complex bins.
    pub fn forward(&self, samples: &[f32]) -> Vec<Complex32> {
        let mut buffer = vec![Complex32::new(0.0, 0.0); self.transform_length];
        for (slot, &sample) in buffer.iter_mut().zip(samples.iter()) {
            *slot = Complex32::new(sample, 0.0);
        }

        self.forward.process(&mut buffer);
        buffer.truncate(self.num_bins());
        buffer
    }

    /// Inverse transform: half spectrum back to a real frame.
    ///
    /// ## Process:
    /// 1. Mirror the half spectrum into a full conjugate-symmetric spectrum
    /// 2. Run the inverse FFT and scale by `1 / transform_length`
    /// 3. Keep the real part of the first `output_length` samples
    ///
    /// ## Parameters:
    /// - **spectrum**: Exactly `num_bins()` complex bins
    /// - **output_length**: How many leading samples to keep (the frame length)
    pub fn inverse(&self, spectrum: &[Complex32], output_length: usize) -> Vec<f32> {
        let n = self.transform_length;
        let mut buffer = vec![Complex32::new(0.0, 0.0); n];
        buffer[..spectrum.len()].copy_from_slice(spectrum);

        // Conjugate symmetry for the bins the half spectrum leaves implicit
        for k in spectrum.len()..n {
            buffer[k] = buffer[n - k].conj();
        }

        self.inverse.process(&mut buffer);

        let scale = 1.0 / n as f32;
        buffer
            .iter()
            .take(output_length)
            .map(|c| c.re * scale)
            .collect()
    }
}

/// Per-bin absolute values of a complex spectrum.
pub fn magnitudes(spectrum: &[Complex32]) -> Vec<f32> {
    spectrum.iter().map(|c| c.norm()).collect()
}

/// Per-bin arguments (phase angles) of a complex spectrum.
pub fn phases(spectrum: &[Complex32]) -> Vec<f32> {
    spectrum.iter().map(|c| c.arg()).collect()
}
