//! Scan orchestration
//!
//! Drives a single scan attempt through the sequential two-stage pipeline:
//! vision inference, then best-effort reference enrichment, then merge and
//! history commit. Cancellation is cooperative: the token is checked
//! immediately after each suspend point resumes, and once it is set the
//! pipeline discards its work without touching shared state. An
//! already-dispatched network request runs to completion in the background
//! and its result is simply thrown away.
//!
//! One scan in flight per orchestrator: starting a new scan cancels the
//! previous token before installing its own.

use crate::models::{HistoryEntry, ScanResult, ScanSession, ScanState};
use crate::services::HistoryStore;
use crate::types::{BreedLookup, VisionInference};
use crate::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of a scan attempt that did not error
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Pipeline ran to completion; result is merged and committed to history
    Completed(ScanResult),
    /// Scan was abandoned; nothing was committed or surfaced
    Cancelled,
}

struct ActiveScan {
    token: CancellationToken,
    generation: u64,
}

/// Sequences the two clients, merges results, manages cancellation and history
pub struct ScanOrchestrator {
    vision: Arc<dyn VisionInference>,
    reference: Arc<dyn BreedLookup>,
    history: Arc<HistoryStore>,
    session: RwLock<ScanSession>,
    active: RwLock<Option<ActiveScan>>,
    next_generation: AtomicU64,
}

impl ScanOrchestrator {
    pub fn new(
        vision: Arc<dyn VisionInference>,
        reference: Arc<dyn BreedLookup>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            vision,
            reference,
            history,
            session: RwLock::new(ScanSession::new()),
            active: RwLock::new(None),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Snapshot of the presenter-visible session
    pub async fn session(&self) -> ScanSession {
        self.session.read().await.clone()
    }

    /// Current workflow state
    pub async fn state(&self) -> ScanState {
        self.session.read().await.state
    }

    /// Request cooperative cancellation of the in-flight scan, if any
    pub async fn cancel(&self) {
        if let Some(active) = self.active.read().await.as_ref() {
            active.token.cancel();
        }
    }

    /// Run one scan attempt from image bytes to a merged result
    ///
    /// `image_ref` is the opaque display handle committed to history
    /// alongside the result.
    pub async fn start_scan(&self, image: Vec<u8>, image_ref: String) -> Result<ScanOutcome> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();

        {
            let mut active = self.active.write().await;
            if let Some(previous) = active.replace(ActiveScan {
                token: token.clone(),
                generation,
            }) {
                previous.token.cancel();
            }
        }

        self.session.write().await.begin();

        let outcome = self.run_pipeline(&image, &image_ref, &token).await;

        match outcome {
            Ok(ScanOutcome::Completed(result)) => {
                if self.is_current(generation).await {
                    self.session.write().await.complete(result.clone());
                    self.clear_active(generation).await;
                }
                Ok(ScanOutcome::Completed(result))
            }
            Ok(ScanOutcome::Cancelled) => {
                // Pretend nothing happened: back to IDLE, no result, no error.
                // A superseded scan leaves the session to its successor.
                if self.is_current(generation).await {
                    let mut session = self.session.write().await;
                    session.transition_to(ScanState::Cancelled);
                    session.reset();
                    drop(session);
                    self.clear_active(generation).await;
                }
                info!("Scan cancelled, no state committed");
                Ok(ScanOutcome::Cancelled)
            }
            Err(e) => {
                if token.is_cancelled() {
                    // Cancellation raced the failure; stay silent either way
                    if self.is_current(generation).await {
                        let mut session = self.session.write().await;
                        session.transition_to(ScanState::Cancelled);
                        session.reset();
                        drop(session);
                        self.clear_active(generation).await;
                    }
                    return Ok(ScanOutcome::Cancelled);
                }
                if self.is_current(generation).await {
                    self.session.write().await.fail(e.user_message());
                    self.clear_active(generation).await;
                }
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        image: &[u8],
        image_ref: &str,
        token: &CancellationToken,
    ) -> Result<ScanOutcome> {
        // Step 1: vision inference
        let inference = self.vision.identify(image).await;
        if token.is_cancelled() {
            return Ok(ScanOutcome::Cancelled);
        }
        let analysis = inference?;

        if !analysis.is_dog || analysis.breeds.is_empty() {
            return Err(crate::ScanError::NoDogDetected);
        }

        // Step 2: best-effort enrichment of the primary breed
        let primary = analysis.breeds[0].name.clone();
        debug!(breed = %primary, "Enriching primary breed");
        let reference = self.reference.lookup(&primary).await;
        if token.is_cancelled() {
            return Ok(ScanOutcome::Cancelled);
        }

        let result = ScanResult {
            is_dog: true,
            breeds: analysis.breeds,
            fact: analysis.interesting_fact,
            reference,
        };

        let entry = HistoryEntry::new(image_ref.to_string(), result.clone());
        if let Err(e) = self.history.append(entry).await {
            // Durable state is whole either way; the scan still succeeds
            warn!(error = %e, "History persistence failed");
        }

        info!(
            breed = %primary,
            confidence = result.breeds[0].confidence,
            "Scan completed"
        );

        Ok(ScanOutcome::Completed(result))
    }

    async fn is_current(&self, generation: u64) -> bool {
        self.active
            .read()
            .await
            .as_ref()
            .map(|a| a.generation == generation)
            .unwrap_or(false)
    }

    async fn clear_active(&self, generation: u64) {
        let mut active = self.active.write().await;
        if active.as_ref().map(|a| a.generation) == Some(generation) {
            *active = None;
        }
    }
}
