//! # Spectral Processing Building Blocks
//!
//! The numeric components the denoiser session is assembled from. Each one is
//! small and independently testable; only the noise estimator holds state.
//!
//! ## Components:
//! - **window**: Hann window, DC removal, frame energy
//! - **transform**: Forward/inverse real FFT over the padded frame
//! - **vad**: Energy-based noise-like vs. speech-like decision
//! - **noise**: Gated exponential moving average of spectral magnitude
//! - **subtraction**: Floored magnitude subtraction with phase reuse

pub mod window;       // Analysis window and time-domain preprocessing
pub mod transform;    // FFT wrapper (zero-padding, half spectrum, truncation)
pub mod vad;          // Voice activity gate
pub mod noise;        // Adaptive noise magnitude estimator
pub mod subtraction;  // Spectral subtractor
