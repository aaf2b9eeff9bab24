//! Scan workflow state machine
//!
//! A scan session progresses through:
//! IDLE → SCANNING → {SUCCESS, ERROR, CANCELLED}
//!
//! CANCELLED is reachable only from SCANNING and immediately returns the
//! session to IDLE with no result or error. SUCCESS and ERROR are terminal
//! until a new scan begins, which clears the prior result/error.

use crate::models::ScanResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scan workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanState {
    /// No scan in flight, no result displayed
    Idle,
    /// Pipeline running (inference and/or enrichment in flight)
    Scanning,
    /// Merged result available
    Success,
    /// Scan failed with a reportable error
    Error,
    /// Scan abandoned by the user; no result, no error
    Cancelled,
}

impl ScanState {
    /// Terminal states hold until the caller starts a new scan
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Success | ScanState::Error)
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub old_state: ScanState,
    pub new_state: ScanState,
    pub transitioned_at: DateTime<Utc>,
}

/// In-memory scan session, the orchestrator-visible state for presenters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSession {
    pub state: ScanState,

    /// Merged result, present only in SUCCESS
    pub result: Option<ScanResult>,

    /// Display message, present only in ERROR
    pub error: Option<String>,

    /// Start time of the current or most recent scan
    pub started_at: Option<DateTime<Utc>>,

    /// End time of the most recent scan (if terminal)
    pub ended_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            result: None,
            error: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// Transition to a new state
    pub fn transition_to(&mut self, new_state: ScanState) -> StateTransition {
        let transition = StateTransition {
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        transition
    }

    /// Begin a new scan, clearing any prior result or error
    ///
    /// Valid from any state: starting a scan from a terminal state implicitly
    /// resets the display.
    pub fn begin(&mut self) -> StateTransition {
        self.result = None;
        self.error = None;
        self.started_at = Some(Utc::now());
        self.ended_at = None;
        self.transition_to(ScanState::Scanning)
    }

    /// Record a successful scan
    pub fn complete(&mut self, result: ScanResult) -> StateTransition {
        self.result = Some(result);
        self.error = None;
        self.ended_at = Some(Utc::now());
        self.transition_to(ScanState::Success)
    }

    /// Record a failed scan with a display message
    pub fn fail(&mut self, message: String) -> StateTransition {
        self.result = None;
        self.error = Some(message);
        self.ended_at = Some(Utc::now());
        self.transition_to(ScanState::Error)
    }

    /// Return to IDLE, clearing result and error
    pub fn reset(&mut self) -> StateTransition {
        self.result = None;
        self.error = None;
        self.ended_at = Some(Utc::now());
        self.transition_to(ScanState::Idle)
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreedGuess, BreedReference};

    fn sample_result() -> ScanResult {
        ScanResult {
            is_dog: true,
            breeds: vec![BreedGuess {
                name: "Samoyed".to_string(),
                confidence: 88.0,
            }],
            fact: "Samoyeds were bred to herd reindeer.".to_string(),
            reference: BreedReference::default(),
        }
    }

    #[test]
    fn new_session_is_idle() {
        let session = ScanSession::new();
        assert_eq!(session.state, ScanState::Idle);
        assert!(session.result.is_none());
        assert!(session.error.is_none());
    }

    #[test]
    fn begin_transitions_to_scanning() {
        let mut session = ScanSession::new();
        let transition = session.begin();
        assert_eq!(transition.old_state, ScanState::Idle);
        assert_eq!(transition.new_state, ScanState::Scanning);
        assert_eq!(session.state, ScanState::Scanning);
        assert!(session.started_at.is_some());
    }

    #[test]
    fn complete_reaches_terminal_success() {
        let mut session = ScanSession::new();
        session.begin();
        session.complete(sample_result());
        assert_eq!(session.state, ScanState::Success);
        assert!(session.state.is_terminal());
        assert!(session.result.is_some());
        assert!(session.error.is_none());
        assert!(session.ended_at.is_some());
    }

    #[test]
    fn fail_reaches_terminal_error_with_message() {
        let mut session = ScanSession::new();
        session.begin();
        session.fail("no dog detected".to_string());
        assert_eq!(session.state, ScanState::Error);
        assert!(session.state.is_terminal());
        assert_eq!(session.error.as_deref(), Some("no dog detected"));
        assert!(session.result.is_none());
    }

    #[test]
    fn cancelled_returns_to_idle_with_no_residue() {
        let mut session = ScanSession::new();
        session.begin();
        session.transition_to(ScanState::Cancelled);
        session.reset();
        assert_eq!(session.state, ScanState::Idle);
        assert!(session.result.is_none());
        assert!(session.error.is_none());
    }

    #[test]
    fn begin_from_terminal_state_clears_prior_display() {
        let mut session = ScanSession::new();
        session.begin();
        session.fail("transient failure".to_string());

        let transition = session.begin();
        assert_eq!(transition.old_state, ScanState::Error);
        assert_eq!(session.state, ScanState::Scanning);
        assert!(session.error.is_none());
        assert!(session.result.is_none());
    }
}
