//! # Configuration Management
//!
//! This module handles loading and managing denoiser configuration from
//! multiple sources:
//! - TOML configuration files (denoise.toml)
//! - Environment variables (with DENOISE_ prefix)
//! - Default values (built into the code)
//! - Partial JSON updates (the per-stream handshake object)
//!
//! ## Key Rust Concepts Used:
//! - **Serde**: Converts between Rust structs and TOML/JSON data
//! - **derive macros**: Automatically generate Debug, Clone, Serialize, Deserialize
//! - **Result<T, E>**: Error handling that forces you to handle failures
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Environment variables (DENOISE_FRAME_LENGTH, DENOISE_NOISE_DECAY, ...)
//! 2. Configuration file (denoise.toml)
//! 3. Default values (defined in the Default impl)

use crate::error::{DenoiseError, DenoiseResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for one denoiser session, fixed at session creation.
///
/// ## Fields:
/// - `sample_rate`: Sample rate in Hz. Informational - carried for downstream
///   consumers (e.g. transcription), it does not change the algorithm.
/// - `frame_length`: Number of samples per frame. Every `process_frame` call
///   must supply exactly this many samples for the session's lifetime.
/// - `transform_length`: FFT length. `None` selects the smallest power of two
///   that is >= `frame_length`. Must be >= `frame_length` when set explicitly.
/// - `noise_decay`: EMA decay for the noise magnitude estimate, in [0, 1].
///   Higher values adapt more slowly but are more stable.
/// - `noise_floor`: Lower bound applied to subtracted magnitudes, > 0.
///   Prevents zero/negative magnitudes and the musical-noise artifacts they cause.
/// - `subtraction_scale`: Strength of the spectral subtraction, >= 0.
///   0 disables subtraction entirely; larger values are cleaner but distort more.
/// - `vad_energy_ratio`: Multiplier on the noise reference when deciding
///   whether a frame is noise-like, > 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenoiserConfig {
    pub sample_rate: u32,
    pub frame_length: usize,
    pub transform_length: Option<usize>,
    pub noise_decay: f32,
    pub noise_floor: f32,
    pub subtraction_scale: f32,
    pub vad_energy_ratio: f32,
}

/// Provides default configuration values.
///
/// ## Why these defaults:
/// 16kHz mono with 480-sample frames is 30ms per frame - the format the
/// upstream voice pipeline produces. The remaining scalars are the tuning
/// that shipped with the streaming denoiser.
impl Default for DenoiserConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,      // 16kHz - standard for speech pipelines
            frame_length: 480,       // 30ms frames at 16kHz
            transform_length: None,  // Next power of two (512 for 480 samples)
            noise_decay: 0.95,
            noise_floor: 1e-4,
            subtraction_scale: 1.0,
            vad_energy_ratio: 1.5,
        }
    }
}

impl DenoiserConfig {
    /// Load configuration from multiple sources in priority order.
    ///
    /// ## Configuration Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from denoise.toml (if it exists)
    /// 3. Override with environment variables prefixed with DENOISE_
    ///
    /// ## Environment Variable Examples:
    /// - `DENOISE_FRAME_LENGTH=320`: Override frame length
    /// - `DENOISE_SUBTRACTION_SCALE=1.5`: Override subtraction strength
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            // 1. Start with defaults - converts our Default impl to config format
            .add_source(config::Config::try_from(&DenoiserConfig::default())?)
            // 2. Load from denoise.toml (if it exists) - required(false) means "don't error if missing"
            .add_source(config::File::with_name("denoise").required(false))
            // 3. Load from environment variables with DENOISE_ prefix
            .add_source(config::Environment::with_prefix("DENOISE"));

        let config: DenoiserConfig = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// The FFT length this configuration resolves to.
    ///
    /// ## Logic:
    /// An explicit `transform_length` wins; otherwise use the smallest power
    /// of two that fits the frame (480 -> 512, 1024 -> 1024).
    pub fn resolved_transform_length(&self) -> usize {
        self.transform_length
            .unwrap_or_else(|| self.frame_length.next_power_of_two())
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Frame length is not 0 (a session must process actual samples)
    /// - Transform length is at least the frame length (frames are zero-padded,
    ///   never cut, before the FFT)
    /// - Each scalar is inside its documented domain
    ///
    /// ## Why validate:
    /// Every check here is a session-creation error. Catching bad parameters
    /// up front means `process_frame` never has to re-check them mid-stream.
    pub fn validate(&self) -> DenoiseResult<()> {
        if self.sample_rate == 0 {
            return Err(DenoiseError::Configuration(
                "sample_rate cannot be 0".to_string(),
            ));
        }

        if self.frame_length == 0 {
            return Err(DenoiseError::Configuration(
                "frame_length cannot be 0".to_string(),
            ));
        }

        if self.resolved_transform_length() < self.frame_length {
            return Err(DenoiseError::Configuration(format!(
                "transform_length {} is shorter than frame_length {}",
                self.resolved_transform_length(),
                self.frame_length
            )));
        }

        if !(0.0..=1.0).contains(&self.noise_decay) {
            return Err(DenoiseError::Configuration(format!(
                "noise_decay {} must be in [0, 1]",
                self.noise_decay
            )));
        }

        if !(self.noise_floor > 0.0) {
            return Err(DenoiseError::Configuration(format!(
                "noise_floor {} must be positive",
                self.noise_floor
            )));
        }

        if !(self.subtraction_scale >= 0.0) {
            return Err(DenoiseError::Configuration(format!(
                "subtraction_scale {} must be non-negative",
                self.subtraction_scale
            )));
        }

        if !(self.vad_energy_ratio > 0.0) {
            return Err(DenoiseError::Configuration(format!(
                "vad_energy_ratio {} must be positive",
                self.vad_energy_ratio
            )));
        }

        Ok(())
    }

    /// Update configuration from a JSON object (the stream handshake).
    ///
    /// ## Protocol:
    /// Before sending audio, a client sends one JSON configuration object.
    /// Both the short wire names and the full field names are accepted:
    ///
    /// ```json
    /// {"sr": 16000, "frame_samples": 480, "subtract_scale": 1.0}
    /// ```
    ///
    /// ## Partial updates:
    /// Only the fields present in the JSON are changed; everything else keeps
    /// its current value. The updated configuration is re-validated before
    /// this method returns.
    pub fn update_from_json(&mut self, json_str: &str) -> DenoiseResult<()> {
        let partial: serde_json::Value = serde_json::from_str(json_str)?;

        if let Some(sr) = read_u64(&partial, &["sr", "sample_rate"]) {
            self.sample_rate = sr as u32;
        }
        if let Some(frame) = read_u64(&partial, &["frame_samples", "frame_length"]) {
            self.frame_length = frame as usize;
        }
        if let Some(fft) = read_u64(&partial, &["fft_size", "transform_length"]) {
            self.transform_length = Some(fft as usize);
        }
        if let Some(decay) = read_f64(&partial, &["noise_ema_decay", "noise_decay"]) {
            self.noise_decay = decay as f32;
        }
        if let Some(floor) = read_f64(&partial, &["noise_floor"]) {
            self.noise_floor = floor as f32;
        }
        if let Some(scale) = read_f64(&partial, &["subtract_scale", "subtraction_scale"]) {
            self.subtraction_scale = scale as f32;
        }
        if let Some(ratio) = read_f64(&partial, &["vad_energy_ratio"]) {
            self.vad_energy_ratio = ratio as f32;
        }

        // Validate the updated configuration to ensure it's still usable
        self.validate()
    }
}

/// Read the first of several alternative keys as an unsigned integer.
fn read_u64(value: &serde_json::Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| value.get(k).and_then(|v| v.as_u64()))
}

/// Read the first of several alternative keys as a float.
fn read_f64(value: &serde_json::Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| value.get(k).and_then(|v| v.as_f64()))
}
