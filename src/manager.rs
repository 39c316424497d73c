//! # Session Management
//!
//! Tracks the denoiser sessions of many concurrent audio streams. Each stream
//! gets exactly one session; streams are fully independent and share no noise
//! state. The manager enforces a concurrency limit, hands out per-session
//! handles, and cleans up sessions whose streams have gone away.
//!
//! ## Thread Safety:
//! The session map sits behind an `RwLock` so lookups from many connections
//! can proceed in parallel while creation/removal takes the write lock. Each
//! session's mutable denoiser state is guarded by its own `Mutex` - frame
//! processing for one stream is strictly sequential, but different streams
//! never contend with each other.

use crate::config::DenoiserConfig;
use crate::error::DenoiseResult;
use crate::session::{DenoiserSession, SessionState};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// A denoiser session plus the bookkeeping the manager needs.
///
/// ## Locking:
/// `process_frame` takes the session mutex for the duration of one frame.
/// The computation is CPU-bound and bounded (no I/O, no suspension), so the
/// lock is held briefly; callers on async runtimes should still dispatch the
/// call to a worker thread rather than an I/O event loop.
pub struct ManagedSession {
    /// Unique identifier for this session
    pub session_id: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// The denoiser state, single-writer by construction
    denoiser: Mutex<DenoiserSession>,

    /// Total samples accepted across all processed frames
    samples_processed: Mutex<u64>,

    /// Number of frame-processing errors observed
    error_count: Mutex<u32>,
}

impl ManagedSession {
    /// Denoise one frame under this session's lock.
    ///
    /// Error counting is statistics only - the error itself is always
    /// propagated to the caller unchanged.
    pub fn process_frame(&self, frame: &[f32]) -> DenoiseResult<Vec<f32>> {
        let result = self.denoiser.lock().unwrap().process_frame(frame);
        match &result {
            Ok(_) => *self.samples_processed.lock().unwrap() += frame.len() as u64,
            Err(_) => *self.error_count.lock().unwrap() += 1,
        }
        result
    }

    /// Lifecycle state of the underlying denoiser.
    pub fn state(&self) -> SessionState {
        self.denoiser.lock().unwrap().state()
    }

    /// Frames processed so far.
    pub fn frames_processed(&self) -> u64 {
        self.denoiser.lock().unwrap().frames_processed()
    }

    /// Total samples accepted so far (frames times the frame length).
    pub fn samples_processed(&self) -> u64 {
        *self.samples_processed.lock().unwrap()
    }

    /// Frame-processing errors observed so far.
    pub fn error_count(&self) -> u32 {
        *self.error_count.lock().unwrap()
    }

    /// Session age in seconds.
    pub fn age_seconds(&self) -> i64 {
        Utc::now().signed_duration_since(self.created_at).num_seconds()
    }
}

/// Manages multiple concurrent denoiser sessions.
pub struct SessionManager {
    /// Active sessions mapped by session ID
    sessions: RwLock<HashMap<String, Arc<ManagedSession>>>,

    /// Maximum number of concurrent sessions allowed
    max_concurrent_sessions: usize,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(max_concurrent_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_concurrent_sessions,
        }
    }

    /// Create a new denoiser session.
    ///
    /// ## Parameters:
    /// - **session_id**: Optional session ID. If None, a UUID is generated
    /// - **config**: Denoiser parameters for this stream, validated here
    ///
    /// ## Returns:
    /// - **Ok(session_id)**: Session created and registered
    /// - **Err(message)**: Session limit reached, duplicate ID, or invalid
    ///   configuration
    pub fn create_session(
        &self,
        session_id: Option<String>,
        config: DenoiserConfig,
    ) -> Result<String, String> {
        let denoiser = DenoiserSession::new(config).map_err(|e| e.to_string())?;

        let mut sessions = self.sessions.write().unwrap();

        if sessions.len() >= self.max_concurrent_sessions {
            warn!(
                limit = self.max_concurrent_sessions,
                "session limit reached, rejecting new stream"
            );
            return Err(format!(
                "Maximum concurrent sessions ({}) reached",
                self.max_concurrent_sessions
            ));
        }

        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if sessions.contains_key(&session_id) {
            return Err(format!("Session ID '{}' already exists", session_id));
        }

        let session = Arc::new(ManagedSession {
            session_id: session_id.clone(),
            created_at: Utc::now(),
            denoiser: Mutex::new(denoiser),
            samples_processed: Mutex::new(0),
            error_count: Mutex::new(0),
        });
        sessions.insert(session_id.clone(), session);

        info!(session_id = %session_id, "denoiser session created");
        Ok(session_id)
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: &str) -> Option<Arc<ManagedSession>> {
        self.sessions.read().unwrap().get(session_id).cloned()
    }

    /// Remove a session when its stream ends. No noise state survives this.
    pub fn remove_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().unwrap().remove(session_id).is_some();
        if removed {
            info!(session_id = %session_id, "denoiser session removed");
        }
        removed
    }

    /// Number of active sessions.
    pub fn active_session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// IDs of all active sessions.
    pub fn active_session_ids(&self) -> Vec<String> {
        self.sessions.read().unwrap().keys().cloned().collect()
    }

    /// Remove sessions older than the given age.
    ///
    /// ## Usage:
    /// Streams normally remove their own session on teardown; this catches
    /// sessions orphaned by connections that died without cleanup.
    pub fn cleanup_old_sessions(&self, max_age_seconds: i64) -> usize {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, session| session.age_seconds() <= max_age_seconds);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, "cleaned up orphaned denoiser sessions");
        }
        removed
    }

    /// Aggregate view over all active sessions.
    pub fn summary(&self) -> SessionManagerSummary {
        let sessions = self.sessions.read().unwrap();

        let mut total_frames = 0u64;
        let mut total_samples = 0u64;
        let mut total_errors = 0u32;
        let mut tracking = 0usize;
        for session in sessions.values() {
            total_frames += session.frames_processed();
            total_samples += session.samples_processed();
            total_errors += session.error_count();
            if session.state() == SessionState::Tracking {
                tracking += 1;
            }
        }

        SessionManagerSummary {
            total_sessions: sessions.len(),
            max_sessions: self.max_concurrent_sessions,
            tracking_sessions: tracking,
            total_frames_processed: total_frames,
            total_samples_processed: total_samples,
            total_errors,
        }
    }
}

/// Summary of session manager state.
#[derive(Debug)]
pub struct SessionManagerSummary {
    pub total_sessions: usize,
    pub max_sessions: usize,
    pub tracking_sessions: usize,
    pub total_frames_processed: u64,
    pub total_samples_processed: u64,
    pub total_errors: u32,
}
