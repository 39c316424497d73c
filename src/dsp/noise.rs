//! # Noise Magnitude Estimator
//!
//! Maintains the running per-bin estimate of the noise magnitude spectrum.
//! This is the only stateful component in the pipeline; everything else is a
//! pure function of the current frame.
//!
//! ## Update Policy:
//! - **First observation**: copy the frame's magnitude unconditionally,
//!   whatever the voice activity gate decided. The estimator must leave its
//!   empty state on the first frame so subtraction always has an estimate
//!   from then on.
//! - **Noise-like frame**: exponential moving average,
//!   `noise = decay * noise + (1 - decay) * magnitude`
//! - **Speech-like frame**: no change
//!
//! Once set, the estimate is only ever replaced by such a convex combination;
//! it never reverts to the empty state for the life of the session.

use crate::dsp::vad;

/// Gated EMA over spectral magnitudes.
pub struct NoiseEstimator {
    magnitude: Option<Vec<f32>>,
    decay: f32,
}

impl NoiseEstimator {
    /// Create an estimator with the given EMA decay (in [0, 1]).
    pub fn new(decay: f32) -> Self {
        Self {
            magnitude: None,
            decay,
        }
    }

    /// The current noise magnitude spectrum, if any frame has been observed.
    pub fn magnitude(&self) -> Option<&[f32]> {
        self.magnitude.as_deref()
    }

    /// Mean squared noise magnitude, the spectral noise reference for the
    /// voice activity gate. `None` until the first observation.
    pub fn reference(&self) -> Option<f32> {
        self.magnitude.as_deref().map(vad::mean_square)
    }

    /// Fold one frame's magnitude spectrum into the estimate.
    ///
    /// ## Ordering contract:
    /// The caller must compute its gate decision from the *pre-update*
    /// reference (see [`reference`](Self::reference)) before calling this,
    /// and must read the estimate for subtraction only *after* this returns.
    /// On the first frame that ordering means subtraction sees an estimate
    /// built from the very frame being processed.
    pub fn observe(&mut self, magnitude: &[f32], noise_like: bool) {
        match self.magnitude.as_mut() {
            None => {
                self.magnitude = Some(magnitude.to_vec());
            }
            Some(noise) if noise_like => {
                let d = self.decay;
                for (n, &m) in noise.iter_mut().zip(magnitude.iter()) {
                    *n = d * *n + (1.0 - d) * m;
                }
            }
            Some(_) => {} // speech-like: leave the estimate untouched
        }
    }
}
