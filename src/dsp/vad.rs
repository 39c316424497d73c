//! # Voice Activity Gate
//!
//! Classifies each frame as noise-like or speech-like from its time-domain
//! energy. The decision gates the noise estimator: only noise-like frames may
//! update the running noise magnitude, so speech does not bleed into the
//! estimate and get subtracted from itself.
//!
//! ## Decision rule:
//! ```text
//! threshold = max(noise_ref * vad_energy_ratio, reference_energy * 0.3)
//! noise_like = frame_energy <= threshold
//! ```
//!
//! `noise_ref` is the mean squared noise magnitude once an estimate exists,
//! and the session's reference energy before that. `reference_energy` is the
//! energy of the very first frame of the stream; the `0.3` factor keeps the
//! threshold from collapsing when the noise estimate decays toward silence.
//! If that first frame happens to contain speech, the baseline is biased
//! toward speech-level energy for the rest of the session - a known
//! limitation of the scheme, not something corrected later.

/// Weight of the first-frame reference in the threshold floor.
const REFERENCE_FLOOR_RATIO: f32 = 0.3;

/// Decide whether a frame is noise-like.
///
/// ## Parameters:
/// - **frame_energy**: Mean squared value of the DC-centered frame
/// - **noise_ref**: Current noise reference (mean squared noise magnitude,
///   or the reference energy while no estimate exists yet)
/// - **reference_energy**: Energy of the stream's first frame
/// - **vad_energy_ratio**: Configured multiplier on the noise reference
///
/// Pure function of its inputs; the session owns all state.
pub fn is_noise_like(
    frame_energy: f32,
    noise_ref: f32,
    reference_energy: f32,
    vad_energy_ratio: f32,
) -> bool {
    let threshold = (noise_ref * vad_energy_ratio).max(reference_energy * REFERENCE_FLOOR_RATIO);
    frame_energy <= threshold
}

/// Mean squared value of a magnitude spectrum.
///
/// This is the `noise_ref` fed to [`is_noise_like`] once a noise estimate
/// exists. The magnitudes come from the unnormalized forward transform, so
/// this value is on a different scale than the time-domain frame energy;
/// the configured energy ratio is tuned against exactly this pairing.
pub fn mean_square(magnitudes: &[f32]) -> f32 {
    if magnitudes.is_empty() {
        return 0.0;
    }
    magnitudes.iter().map(|&m| m * m).sum::<f32>() / magnitudes.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_energy_is_noise_like() {
        // Energy well below the scaled reference
        assert!(is_noise_like(0.001, 0.01, 0.01, 1.5));
    }

    #[test]
    fn test_high_energy_is_speech_like() {
        assert!(!is_noise_like(0.5, 0.01, 0.01, 1.5));
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // frame_energy == threshold counts as noise-like
        let noise_ref = 0.02;
        let threshold = noise_ref * 1.5;
        assert!(is_noise_like(threshold, noise_ref, 0.0, 1.5));
        assert!(!is_noise_like(threshold + 1e-6, noise_ref, 0.0, 1.5));
    }

    #[test]
    fn test_reference_floor_applies_when_noise_ref_collapses() {
        // Noise reference near zero: the first-frame floor keeps quiet frames
        // classified as noise-like
        let reference_energy = 0.1;
        assert!(is_noise_like(0.02, 1e-9, reference_energy, 1.5));
        // But a frame above 30% of the reference is speech-like
        assert!(!is_noise_like(0.05, 1e-9, reference_energy, 1.5));
    }

    #[test]
    fn test_mean_square() {
        assert_eq!(mean_square(&[]), 0.0);
        let ms = mean_square(&[1.0, 2.0, 3.0]);
        assert!((ms - 14.0 / 3.0).abs() < 1e-6);
    }
}
