// Public API - what other modules can use
pub use client::{GameApi, RiotClient, RiotClientConfig};
pub use errors::ApiError;
pub use models::*;

// Internal modules
mod client;
mod errors;
pub mod models;
