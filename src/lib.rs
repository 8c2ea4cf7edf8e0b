// Library crate for the arcade high-score service
// This file exposes the public API for integration tests

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod leaderboard;
pub mod routes;
pub mod scores;
pub mod seed;
pub mod shared;
pub mod store;

// Re-export commonly used types for easier access in tests
pub use bootstrap::init_state;
pub use config::Config;
pub use routes::build_router;
pub use scores::admission::{admit, AdmissionOutcome, RejectReason, ScoreCandidate};
pub use scores::models::{IdentityKey, IndexEntry, Submission};
pub use shared::{AppError, AppState};
pub use store::{CollectionStore, InMemoryCollectionStore};
