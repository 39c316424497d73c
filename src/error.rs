//! # Error Handling
//!
//! This module defines the error types the denoiser core returns to embedding
//! code (WebSocket handlers, HTTP endpoints, CLI tools).
//!
//! ## Error Philosophy:
//! The core has exactly two failure categories, and both are caller-facing:
//! - **Configuration**: Bad session parameters. Raised once, at session
//!   creation, never mid-stream.
//! - **FrameLengthMismatch**: The caller supplied a frame of the wrong length.
//!   Raised by `process_frame` before any session state is touched.
//!
//! There are no retries inside the core - it performs no I/O. How these map to
//! user-visible behavior (HTTP status codes, connection teardown) is decided
//! by the embedding application.
//!
//! ## Key Rust Concepts for Error Handling:
//! - **Result<T, E>**: Forces you to handle both success and failure cases
//! - **Enums for error types**: Each variant is a different kind of failure
//! - **From trait**: Automatically converts between error types with `?`

use std::fmt;

/// Errors produced by the denoiser core.
///
/// ## Error Categories:
/// - **Configuration**: Session parameters outside their documented domain
///   (zero frame length, transform shorter than the frame, negative floor, ...)
/// - **FrameLengthMismatch**: A frame whose sample count does not equal the
///   session's fixed `frame_length`
///
/// ## Usage Example:
/// ```rust,ignore
/// return Err(DenoiseError::Configuration("frame_length cannot be 0".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DenoiseError {
    /// Session parameters are invalid; raised at creation time only
    Configuration(String),

    /// Caller supplied a frame whose length differs from the session's
    /// fixed frame length
    FrameLengthMismatch { expected: usize, got: usize },
}

/// Human-readable formatting for error messages and logs.
impl fmt::Display for DenoiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenoiseError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            DenoiseError::FrameLengthMismatch { expected, got } => {
                write!(f, "Frame length mismatch: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for DenoiseError {}

/// Automatic conversion from configuration-loading errors.
///
/// ## When this happens:
/// - denoise.toml has invalid syntax
/// - An environment variable holds a value of the wrong type
/// - Deserialization into `DenoiserConfig` fails
impl From<config::ConfigError> for DenoiseError {
    fn from(err: config::ConfigError) -> Self {
        DenoiseError::Configuration(err.to_string())
    }
}

/// Automatic conversion from JSON parsing errors.
///
/// ## Why Configuration:
/// JSON only enters the core through partial configuration updates (the
/// stream handshake object), so a malformed document is a configuration
/// problem, not a processing one.
impl From<serde_json::Error> for DenoiseError {
    fn from(err: serde_json::Error) -> Self {
        DenoiseError::Configuration(format!("JSON parsing error: {}", err))
    }
}

/// Shorthand for `Result<T, DenoiseError>`.
///
/// ## Usage Example:
/// ```rust,ignore
/// fn process_frame(&mut self, frame: &[f32]) -> DenoiseResult<Vec<f32>> { ... }
/// ```
pub type DenoiseResult<T> = Result<T, DenoiseError>;
