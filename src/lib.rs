//! breedscan - dog breed identification pipeline
//!
//! A two-stage enrichment pipeline: a vision model identifies the breed(s)
//! in a photo, then a reference service supplies static facts about the top
//! match. The merged result lands in a small, durable, newest-first history.
//!
//! The capture surface (camera/file picker) and presentation layer are
//! external collaborators; this crate is the orchestration core plus a thin
//! CLI driver.

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod types;

pub use crate::error::{Result, ScanError};
pub use crate::models::{
    BreedGuess, BreedReference, HistoryEntry, ReferenceField, ScanResult, ScanSession, ScanState,
};
pub use crate::orchestrator::{ScanOrchestrator, ScanOutcome};
pub use crate::services::{BreedInfoClient, HistoryStore, VisionClient, HISTORY_CAPACITY};
pub use crate::types::{BreedLookup, InferenceError, VisionAnalysis, VisionInference};
