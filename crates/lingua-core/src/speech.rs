//! Speech-recognition session state.
//!
//! The recognition engine itself is external; it reports lifecycle and
//! result events which are fed into [`SpeechSession::apply`]. The session
//! owns the state machine and the stitched transcript, and notifies an
//! optional callback on every state transition.
//!
//! ```text
//!   Idle ──Started──▶ Listening ──Ended──▶ Stopped
//!                        │                   ▲
//!                      Failed                │
//!                        ▼                   │
//!                     Errored ───Ended───────┘
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

pub const STATUS_LISTENING: &str = "Listening...";
pub const STATUS_STOPPED: &str = "Stopped listening";
pub const STATUS_ERROR: &str = "Speech recognition error";
pub const STATUS_UNAVAILABLE: &str = "Speech recognition not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    Idle,
    Listening,
    Stopped,
    Errored,
}

/// One recognition hypothesis as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechResult {
    pub transcript: String,
    pub is_final: bool,
}

impl SpeechResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn finished(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Started,
    Ended,
    Failed(String),
    /// The full result list for the session; `index` is the first entry
    /// that changed since the previous event.
    Results {
        index: usize,
        results: Vec<SpeechResult>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech recognition not available")]
    Unavailable,
    #[error("already listening")]
    AlreadyListening,
    #[error("not listening")]
    NotListening,
}

/// Invoked with the new state and its status message.
pub type TransitionCallback = Arc<dyn Fn(RecognitionState, &'static str) + Send + Sync>;

pub struct SpeechSession {
    state: RecognitionState,
    available: bool,
    transcript: String,
    on_transition: Option<TransitionCallback>,
}

impl SpeechSession {
    /// `available` reports whether a recognition engine exists at all.
    pub fn new(available: bool) -> Self {
        Self {
            state: RecognitionState::Idle,
            available,
            transcript: String::new(),
            on_transition: None,
        }
    }

    pub fn with_callback(mut self, callback: TransitionCallback) -> Self {
        self.on_transition = Some(callback);
        self
    }

    pub fn state(&self) -> RecognitionState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == RecognitionState::Listening
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Check whether the engine may be started. The engine confirms with
    /// a `Started` event.
    pub fn start(&self) -> Result<(), SpeechError> {
        if !self.available {
            if let Some(cb) = &self.on_transition {
                cb(self.state, STATUS_UNAVAILABLE);
            }
            return Err(SpeechError::Unavailable);
        }
        if self.is_listening() {
            return Err(SpeechError::AlreadyListening);
        }
        Ok(())
    }

    /// Check whether the engine may be stopped. The engine confirms with
    /// an `Ended` event.
    pub fn stop(&self) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Unavailable);
        }
        if !self.is_listening() {
            return Err(SpeechError::NotListening);
        }
        Ok(())
    }

    /// Apply an engine event. Returns the new state.
    pub fn apply(&mut self, event: RecognitionEvent) -> RecognitionState {
        match event {
            RecognitionEvent::Started => {
                self.transcript.clear();
                self.transition(RecognitionState::Listening, STATUS_LISTENING);
            }
            RecognitionEvent::Ended => {
                if self.state != RecognitionState::Idle {
                    self.transition(RecognitionState::Stopped, STATUS_STOPPED);
                }
            }
            RecognitionEvent::Failed(reason) => {
                warn!(%reason, "speech recognition failed");
                self.transition(RecognitionState::Errored, STATUS_ERROR);
            }
            RecognitionEvent::Results { index, results } => {
                if self.is_listening() {
                    self.transcript = stitch(index, &results);
                } else {
                    debug!(state = ?self.state, "ignoring results outside a listening session");
                }
            }
        }
        self.state
    }

    fn transition(&mut self, next: RecognitionState, status: &'static str) {
        debug!(from = ?self.state, to = ?next, "speech state transition");
        self.state = next;
        if let Some(cb) = &self.on_transition {
            cb(next, status);
        }
    }
}

/// Join every final result, then the interim results from `index` on.
fn stitch(index: usize, results: &[SpeechResult]) -> String {
    let finals: String = results
        .iter()
        .filter(|r| r.is_final)
        .map(|r| r.transcript.as_str())
        .collect();
    let interim: String = results
        .iter()
        .skip(index)
        .filter(|r| !r.is_final)
        .map(|r| r.transcript.as_str())
        .collect();

    match (finals.is_empty(), interim.is_empty()) {
        (_, true) => finals,
        (true, false) => interim,
        (false, false) => format!("{finals} {interim}"),
    }
}
