//! Error taxonomy for scan operations
//!
//! Three classes matter to presenters: user-correctable errors (wrong input,
//! shown directly), transient service errors (shown with a retry invitation,
//! never auto-retried), and everything else. Reference-lookup failures never
//! appear here; that client degrades silently to the empty reference.

use crate::types::InferenceError;
use thiserror::Error;

/// Common result type for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The image did not contain a recognizable dog
    #[error("no dog detected in the image")]
    NoDogDetected,

    /// The selected image could not be read
    #[error("failed to read the image file: {0}")]
    ImageRead(#[from] std::io::Error),

    /// The vision inference call failed
    #[error("image analysis failed: {0}")]
    Analysis(#[from] InferenceError),

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable history storage error
    #[error("storage error: {0}")]
    Storage(String),
}

impl ScanError {
    /// User-correctable errors are the user's input, not a system fault
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, ScanError::NoDogDetected | ScanError::ImageRead(_))
    }

    /// Message suitable for direct display
    pub fn user_message(&self) -> String {
        match self {
            ScanError::NoDogDetected => {
                "The image doesn't appear to contain a dog. Please try another photo.".to_string()
            }
            ScanError::ImageRead(_) => "Failed to read the image file.".to_string(),
            ScanError::Analysis(_) => {
                "Failed to analyze the image. The AI may be busy, or an error occurred. \
                 Please try again."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}
