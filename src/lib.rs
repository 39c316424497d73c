//! # Denoise Core - Streaming Spectral Subtraction Library
//!
//! This crate implements a real-time, single-channel audio denoiser for voice
//! pipelines. One `DenoiserSession` is created per audio stream; each call to
//! `process_frame` consumes one fixed-length block of Float32 PCM samples and
//! synchronously returns a denoised block of the same length.
//!
//! ## Processing Pipeline (per frame):
//! 1. **Preprocess**: remove DC offset, apply the Hann analysis window
//! 2. **Transform**: forward FFT over the zero-padded frame (half spectrum)
//! 3. **Voice activity gate**: compare frame energy against an adaptive threshold
//! 4. **Noise estimation**: exponential moving average of spectral magnitude,
//!    updated only for noise-like frames
//! 5. **Spectral subtraction**: floored magnitude subtraction, phase-preserving
//!    reconstruction, inverse FFT, truncate and clamp to [-1.0, 1.0]
//!
//! ## Crate Layout:
//! - **config**: Session configuration (defaults, file/env loading, validation)
//! - **error**: Custom error types returned to embedding code
//! - **frame**: Binary frame codec (little-endian Float32 PCM bytes)
//! - **dsp**: The numeric building blocks (window, transform, VAD, noise, subtraction)
//! - **session**: The per-stream denoiser state machine
//! - **manager**: Tracking and lifecycle for many concurrent sessions
//!
//! ## Audio Format Requirements:
//! - **Channels**: Mono (1 channel)
//! - **Encoding**: 32-bit float samples, nominally in [-1.0, 1.0]
//! - **Frame size**: Fixed per session (typically 10-50ms of audio)
//!
//! Transport framing (WebSocket/HTTP), transcription, and status mapping are
//! owned by the embedding application, not by this crate.

pub mod config;   // Configuration management (config.rs)
pub mod error;    // Error handling types (error.rs)
pub mod frame;    // PCM frame encoding/decoding (frame.rs)
pub mod dsp;      // Spectral building blocks (dsp/ directory)
pub mod session;  // Per-stream denoiser sessions (session.rs)
pub mod manager;  // Concurrent session tracking (manager.rs)

pub use config::DenoiserConfig;
pub use error::{DenoiseError, DenoiseResult};
pub use manager::SessionManager;
pub use session::{DenoiserSession, SessionState};
