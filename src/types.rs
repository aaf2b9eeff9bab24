//! Client trait seams for the scan pipeline
//!
//! The orchestrator depends on these traits rather than the concrete HTTP
//! clients, so the pipeline can be exercised against scripted
//! implementations in tests.

use crate::models::{BreedGuess, BreedReference};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vision inference client errors
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Structured output of a vision inference call
///
/// Field names match the JSON schema the model is constrained to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysis {
    pub is_dog: bool,
    pub breeds: Vec<BreedGuess>,
    pub interesting_fact: String,
}

/// Vision inference over raw image bytes
#[async_trait::async_trait]
pub trait VisionInference: Send + Sync {
    /// Identify the dog in `image` (JPEG bytes)
    ///
    /// Implementations return breeds sorted descending by confidence; the
    /// primary breed is always index 0. A malformed breed entry invalidates
    /// the whole call.
    async fn identify(&self, image: &[u8]) -> std::result::Result<VisionAnalysis, InferenceError>;
}

/// Best-effort breed reference lookup
#[async_trait::async_trait]
pub trait BreedLookup: Send + Sync {
    /// Look up static reference facts for a breed name
    ///
    /// Never fails: any internal error collapses to the empty reference.
    async fn lookup(&self, breed_name: &str) -> BreedReference;
}
