//! Core data model for scans and history

pub mod scan_result;
pub mod scan_session;

pub use scan_result::{BreedGuess, BreedReference, HistoryEntry, ReferenceField, ScanResult};
pub use scan_session::{ScanSession, ScanState, StateTransition};
