//! Service clients and durable storage for the scan pipeline

pub mod breed_info_client;
pub mod history_store;
pub mod vision_client;

pub use breed_info_client::BreedInfoClient;
pub use history_store::{HistoryStore, HISTORY_CAPACITY};
pub use vision_client::VisionClient;
