// Public API - what other modules can use
pub use handlers::{
    delete_submission, list_highscores, list_submissions, rebuild_index, resync,
    scores_method_not_allowed, submit_score,
};

// Internal modules
pub mod admission;
pub mod handlers;
pub mod index;
pub mod log;
pub mod models;
pub mod service;
pub mod types;
