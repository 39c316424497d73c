//! # Spectral Subtractor
//!
//! Removes the estimated noise from a frame's magnitude spectrum and rebuilds
//! the complex half spectrum using the frame's original phase. No phase
//! estimation is attempted - for speech denoising, reusing the noisy phase is
//! the standard trade-off.
//!
//! ## Per bin:
//! ```text
//! clean = max(magnitude - subtraction_scale * noise_magnitude, noise_floor)
//! spectrum = clean * exp(i * phase)
//! ```
//!
//! The floor keeps every magnitude strictly positive; bins the subtraction
//! would zero out or drive negative land on the floor instead, which avoids
//! the worst musical-noise artifacts.

use num_complex::Complex32;

/// Subtract the noise estimate from a magnitude spectrum and recombine with
/// the original phase.
///
/// ## Parameters:
/// - **magnitude**, **phase**: The current frame's polar spectrum
/// - **noise_magnitude**: The noise estimate, or `None` if no frame has been
///   observed yet - in that case the magnitude passes through unchanged
/// - **subtraction_scale**: Subtraction strength (0 disables subtraction)
/// - **noise_floor**: Lower bound for every output magnitude
///
/// ## Returns:
/// The denoised complex half spectrum, ready for the inverse transform.
pub fn subtract_noise(
    magnitude: &[f32],
    phase: &[f32],
    noise_magnitude: Option<&[f32]>,
    subtraction_scale: f32,
    noise_floor: f32,
) -> Vec<Complex32> {
    match noise_magnitude {
        Some(noise) => magnitude
            .iter()
            .zip(noise.iter())
            .zip(phase.iter())
            .map(|((&m, &n), &p)| {
                let clean = (m - subtraction_scale * n).max(noise_floor);
                Complex32::from_polar(clean, p)
            })
            .collect(),
        None => magnitude
            .iter()
            .zip(phase.iter())
            .map(|(&m, &p)| Complex32::from_polar(m, p))
            .collect(),
    }
}
