//! # Denoiser Session
//!
//! One `DenoiserSession` per logical audio stream. The session owns the
//! precomputed analysis window and FFT plans, the adaptive noise estimate,
//! and the energy baseline taken from the stream's first frame. Each call to
//! `process_frame` consumes exactly one frame and returns one denoised frame
//! of the same length, synchronously, with no I/O.
//!
//! ## Session Lifecycle:
//! 1. **Uninitialized**: Created, no frame processed yet - no noise estimate,
//!    no reference energy
//! 2. **Tracking**: First frame processed; the noise estimate and reference
//!    energy exist and the session stays in this state until it is dropped
//!
//! The transition happens unconditionally on the first `process_frame` call
//! and is terminal. No state survives session teardown.
//!
//! ## Ordering inside one call:
//! The voice activity gate reads the noise reference *before* the estimator
//! updates, and the subtractor reads the estimate *after*. This is deliberate:
//! on the first frame the estimate is seeded from the frame itself, so the
//! first frame is always heavily attenuated regardless of its content. The
//! stream warms up from silence rather than passing one frame through raw.
//!
//! ## Concurrency:
//! A session assumes strictly sequential calls - one logical stream, one
//! writer. Run concurrent sessions freely; for shared ownership of a single
//! session, wrap it in a `Mutex` (the session manager does exactly this).

use crate::config::DenoiserConfig;
use crate::dsp::noise::NoiseEstimator;
use crate::dsp::subtraction::subtract_noise;
use crate::dsp::transform::{magnitudes, phases, SpectralTransform};
use crate::dsp::vad::is_noise_like;
use crate::dsp::window::{apply_window, frame_energy, hann_window, remove_dc};
use crate::error::{DenoiseError, DenoiseResult};
use tracing::{debug, trace};

/// Current lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No frame processed yet; no noise estimate or reference energy exists
    Uninitialized,
    /// At least one frame processed; terminal for the life of the session
    Tracking,
}

impl SessionState {
    /// Convert state to string for logs and status responses.
    pub fn as_str(&self) -> &str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Tracking => "tracking",
        }
    }
}

/// Streaming spectral-subtraction denoiser for one audio stream.
pub struct DenoiserSession {
    /// Sample rate in Hz; informational, carried for downstream consumers
    sample_rate: u32,

    /// Fixed number of samples per frame
    frame_length: usize,

    /// Precomputed Hann window, immutable for the session
    analysis_window: Vec<f32>,

    /// FFT plans for the padded transform length
    transform: SpectralTransform,

    /// Running noise magnitude estimate (the pipeline's only mutable state
    /// besides the reference energy)
    noise: NoiseEstimator,

    /// Energy of the very first frame; set exactly once, never updated
    reference_energy: Option<f32>,

    /// Configuration scalars, fixed at creation
    noise_floor: f32,
    subtraction_scale: f32,
    vad_energy_ratio: f32,

    /// Frames processed so far (statistics only)
    frames_processed: u64,
}

impl DenoiserSession {
    /// Create a session from a validated configuration.
    ///
    /// ## Returns:
    /// - **Ok(session)**: Ready to process frames
    /// - **Err(Configuration)**: A parameter is outside its documented domain;
    ///   this is the only point where configuration errors can surface
    pub fn new(config: DenoiserConfig) -> DenoiseResult<Self> {
        config.validate()?;

        let transform_length = config.resolved_transform_length();
        debug!(
            sample_rate = config.sample_rate,
            frame_length = config.frame_length,
            transform_length,
            subtraction_scale = config.subtraction_scale,
            "creating denoiser session"
        );

        Ok(Self {
            sample_rate: config.sample_rate,
            frame_length: config.frame_length,
            analysis_window: hann_window(config.frame_length),
            transform: SpectralTransform::new(transform_length),
            noise: NoiseEstimator::new(config.noise_decay),
            reference_energy: None,
            noise_floor: config.noise_floor,
            subtraction_scale: config.subtraction_scale,
            vad_energy_ratio: config.vad_energy_ratio,
            frames_processed: 0,
        })
    }

    /// Denoise one frame.
    ///
    /// ## Parameters:
    /// - **frame**: Exactly `frame_length` samples, nominally in [-1.0, 1.0]
    ///
    /// ## Returns:
    /// - **Ok(samples)**: `frame_length` denoised samples, clamped to [-1.0, 1.0]
    /// - **Err(FrameLengthMismatch)**: Wrong input length; the session state
    ///   is untouched when this is returned
    ///
    /// Non-finite input samples are not special-cased: they propagate through
    /// the transform and the final clamp rather than raising.
    pub fn process_frame(&mut self, frame: &[f32]) -> DenoiseResult<Vec<f32>> {
        if frame.len() != self.frame_length {
            return Err(DenoiseError::FrameLengthMismatch {
                expected: self.frame_length,
                got: frame.len(),
            });
        }

        // Preprocess: DC removal, then the analysis window
        let centered = remove_dc(frame);
        let windowed = apply_window(&centered, &self.analysis_window);

        // Forward transform and polar split
        let spectrum = self.transform.forward(&windowed);
        let magnitude = magnitudes(&spectrum);
        let phase = phases(&spectrum);

        // Energy is measured before windowing so the taper does not bias the gate
        let energy = frame_energy(&centered);
        let reference_energy = *self.reference_energy.get_or_insert(energy);

        // Gate decision from the pre-update noise reference
        let noise_ref = self.noise.reference().unwrap_or(reference_energy);
        let noise_like = is_noise_like(energy, noise_ref, reference_energy, self.vad_energy_ratio);

        // Estimator update, then subtraction against the post-update estimate.
        // On the first frame this seeds the estimate from the frame itself.
        self.noise.observe(&magnitude, noise_like);
        let clean = subtract_noise(
            &magnitude,
            &phase,
            self.noise.magnitude(),
            self.subtraction_scale,
            self.noise_floor,
        );

        // Back to the time domain, truncated to the frame and clamped
        let mut output = self.transform.inverse(&clean, self.frame_length);
        for sample in &mut output {
            *sample = sample.clamp(-1.0, 1.0);
        }

        self.frames_processed += 1;
        trace!(
            frame = self.frames_processed,
            energy,
            noise_ref,
            noise_like,
            "processed frame"
        );

        Ok(output)
    }

    /// Sample rate this session was created with.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Fixed samples-per-frame for this session.
    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Padded FFT length.
    pub fn transform_length(&self) -> usize {
        self.transform.transform_length()
    }

    /// Lifecycle state, derived from whether a frame has been processed.
    pub fn state(&self) -> SessionState {
        if self.reference_energy.is_some() {
            SessionState::Tracking
        } else {
            SessionState::Uninitialized
        }
    }

    /// Current noise magnitude estimate (one value per spectrum bin).
    pub fn noise_magnitude(&self) -> Option<&[f32]> {
        self.noise.magnitude()
    }

    /// Energy baseline from the stream's first frame.
    pub fn reference_energy(&self) -> Option<f32> {
        self.reference_energy
    }

    /// Total frames processed by this session.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::transform::{magnitudes, SpectralTransform};
    use crate::dsp::window::{apply_window, hann_window, remove_dc};
    use std::f32::consts::TAU;

    /// Deterministic pseudo-random samples in [-amplitude, amplitude].
    ///
    /// A fixed linear congruential generator keeps every test reproducible
    /// without pulling in an RNG dependency.
    fn pseudo_noise(len: usize, amplitude: f32, seed: u64) -> Vec<f32> {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let unit = ((state >> 33) as f32) / ((1u64 << 30) as f32) - 1.0;
                unit * amplitude
            })
            .collect()
    }

    fn sine_frame(len: usize, cycles: f32, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * cycles * i as f32 / len as f32).sin() * amplitude)
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|&s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    fn default_session() -> DenoiserSession {
        DenoiserSession::new(DenoiserConfig::default()).unwrap()
    }

    /// Output always has the frame length and every sample stays in [-1, 1].
    #[test]
    fn test_shape_invariant() {
        let mut session = default_session();
        for seed in 0..10u64 {
            // Deliberately hot input (overlapping tone and noise near full scale)
            let mut frame = sine_frame(480, 11.0, 0.9);
            for (s, n) in frame.iter_mut().zip(pseudo_noise(480, 0.5, seed)) {
                *s += n;
            }

            let output = session.process_frame(&frame).unwrap();
            assert_eq!(output.len(), 480);
            for &sample in &output {
                assert!((-1.0..=1.0).contains(&sample));
            }
        }
    }

    /// The first frame is always heavily attenuated: the noise estimate is
    /// seeded from that same frame, so subtraction floors every bin.
    #[test]
    fn test_first_frame_suppression() {
        let mut session = default_session();
        let frame = sine_frame(480, 13.0, 0.5);
        assert!(rms(&frame) > 0.3);

        let output = session.process_frame(&frame).unwrap();
        assert!(
            rms(&output) < 1e-3,
            "first frame should be near-silent, rms was {}",
            rms(&output)
        );
        assert_eq!(session.state(), SessionState::Tracking);
    }

    /// With subtraction disabled, frames after the first come back as the
    /// DC-removed, windowed signal (modulo FFT round-trip error).
    #[test]
    fn test_pass_through_with_zero_scale() {
        let mut config = DenoiserConfig::default();
        config.subtraction_scale = 0.0;
        config.noise_floor = 1e-6;
        let mut session = DenoiserSession::new(config).unwrap();

        session.process_frame(&sine_frame(480, 5.0, 0.3)).unwrap();

        let frame = sine_frame(480, 9.0, 0.4);
        let output = session.process_frame(&frame).unwrap();

        let expected = apply_window(&remove_dc(&frame), &hann_window(480));
        for (got, want) in output.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-3, "{} vs {}", got, want);
        }
    }

    /// Feeding a constant noise-like frame closes the gap to its magnitude
    /// spectrum geometrically, by the decay factor per step.
    #[test]
    fn test_noise_estimate_converges_geometrically() {
        let decay = 0.95f32;
        let mut session = default_session();

        let first = pseudo_noise(480, 0.02, 7);
        let steady = pseudo_noise(480, 0.01, 42);
        session.process_frame(&first).unwrap();

        // Magnitude spectrum the estimate should converge to
        let transform = SpectralTransform::new(512);
        let windowed = apply_window(&remove_dc(&steady), &hann_window(480));
        let target = magnitudes(&transform.forward(&windowed));

        let gap = |noise: &[f32]| -> f32 {
            noise
                .iter()
                .zip(target.iter())
                .map(|(n, t)| (n - t) * (n - t))
                .sum::<f32>()
                .sqrt()
        };

        let initial_gap = gap(session.noise_magnitude().unwrap());
        assert!(initial_gap > 0.0);

        for step in 1..=40u32 {
            session.process_frame(&steady).unwrap();
            let expected = initial_gap * decay.powi(step as i32);
            let actual = gap(session.noise_magnitude().unwrap());
            assert!(
                (actual - expected).abs() < initial_gap * 1e-2,
                "step {}: gap {} expected {}",
                step,
                actual,
                expected
            );
        }
    }

    /// A loud frame after the estimate has stabilized is classified as speech
    /// and must leave the noise estimate bit-for-bit unchanged.
    #[test]
    fn test_speech_frame_does_not_corrupt_noise_estimate() {
        let mut session = default_session();
        for seed in 0..20u64 {
            session.process_frame(&pseudo_noise(480, 0.01, seed)).unwrap();
        }

        let before = session.noise_magnitude().unwrap().to_vec();
        session.process_frame(&sine_frame(480, 21.0, 1.0)).unwrap();
        let after = session.noise_magnitude().unwrap();
        assert_eq!(before.as_slice(), after);
    }

    /// Identical configuration and input produce identical output.
    #[test]
    fn test_determinism() {
        let frames: Vec<Vec<f32>> = (0..8)
            .map(|i| pseudo_noise(480, 0.1, 100 + i as u64))
            .collect();

        let mut a = default_session();
        let mut b = default_session();
        for frame in &frames {
            let out_a = a.process_frame(frame).unwrap();
            let out_b = b.process_frame(frame).unwrap();
            assert_eq!(out_a, out_b);
        }
    }

    /// A wrong-length frame errors without touching session state.
    #[test]
    fn test_length_mismatch_leaves_state_untouched() {
        let mut session = default_session();
        let err = session.process_frame(&[0.0; 100]).unwrap_err();
        assert_eq!(err, DenoiseError::FrameLengthMismatch { expected: 480, got: 100 });
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.noise_magnitude().is_none());

        session.process_frame(&pseudo_noise(480, 0.05, 3)).unwrap();
        let noise_before = session.noise_magnitude().unwrap().to_vec();
        assert!(session.process_frame(&[0.0; 481]).is_err());
        assert_eq!(session.noise_magnitude().unwrap(), noise_before.as_slice());
        assert_eq!(session.frames_processed(), 1);
    }

    /// Invalid configurations are rejected at creation, never mid-stream.
    #[test]
    fn test_creation_rejects_bad_config() {
        let mut config = DenoiserConfig::default();
        config.transform_length = Some(128);
        assert!(DenoiserSession::new(config).is_err());

        let mut config = DenoiserConfig::default();
        config.frame_length = 0;
        assert!(DenoiserSession::new(config).is_err());
    }

    /// Non-finite input is not special-cased: it propagates through the
    /// transform and the clamp rather than raising. Every output sample is
    /// either non-finite or inside [-1, 1], and the session keeps accepting
    /// frames afterwards.
    #[test]
    fn test_non_finite_input_does_not_raise() {
        let mut session = default_session();

        let mut frame = sine_frame(480, 5.0, 0.3);
        frame[17] = f32::NAN;
        frame[100] = f32::INFINITY;
        frame[250] = f32::NEG_INFINITY;

        let output = session.process_frame(&frame).unwrap();
        assert_eq!(output.len(), 480);
        for &sample in &output {
            assert!(!sample.is_finite() || (-1.0..=1.0).contains(&sample));
        }

        // The stream is not wedged: a well-formed frame still processes
        let output = session.process_frame(&sine_frame(480, 5.0, 0.3)).unwrap();
        assert_eq!(output.len(), 480);
        assert_eq!(session.frames_processed(), 2);
    }

    /// The reference energy is pinned to the first frame and never moves.
    #[test]
    fn test_reference_energy_is_set_once() {
        let mut session = default_session();
        session.process_frame(&pseudo_noise(480, 0.02, 1)).unwrap();
        let reference = session.reference_energy().unwrap();

        session.process_frame(&sine_frame(480, 4.0, 0.8)).unwrap();
        session.process_frame(&pseudo_noise(480, 0.001, 2)).unwrap();
        assert_eq!(session.reference_energy().unwrap(), reference);
    }

    /// End-to-end scenario: 100 frames of a 440Hz tone in broadband noise.
    /// The first frame is swallowed by the warm-up, later frames pass audio.
    /// Runs with tracing wired up so the per-frame logging path is exercised
    /// (set RUST_LOG=trace to watch the gate decisions).
    #[test]
    fn test_streaming_scenario() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "denoise_core=debug".into()),
            )
            .try_init();

        let mut session = default_session();
        let sample_rate = 16000.0f32;
        let mut frame_rms = Vec::new();

        for frame_idx in 0..100usize {
            let noise = pseudo_noise(480, 0.2, 1000 + frame_idx as u64);
            let frame: Vec<f32> = (0..480)
                .map(|i| {
                    let t = (frame_idx * 480 + i) as f32 / sample_rate;
                    0.2 * (TAU * 440.0 * t).sin() + noise[i]
                })
                .collect();

            let output = session.process_frame(&frame).unwrap();
            assert_eq!(output.len(), 480);
            for &s in &output {
                assert!((-1.0..=1.0).contains(&s));
            }
            frame_rms.push(rms(&output));
        }

        // First-frame warm-up: near silence
        assert!(frame_rms[0] < 1e-3);

        // The stream recovers: the back half carries real signal energy
        let late_avg: f32 = frame_rms[50..].iter().sum::<f32>() / 50.0;
        assert!(late_avg > frame_rms[0] * 10.0);

        // The noise estimate stays finite and positive throughout
        let noise_mag = session.noise_magnitude().unwrap();
        assert!(noise_mag.iter().all(|m| m.is_finite() && *m >= 0.0));
        assert_eq!(session.frames_processed(), 100);
    }
}
