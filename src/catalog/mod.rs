// Public API - what other modules can use
pub use handlers::{
    add_game, add_location, add_mode, list_games, list_locations, remove_game, remove_location,
    remove_mode,
};

// Internal modules
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
