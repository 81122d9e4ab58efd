//! # People API - relational people, interests and links over HTTP
//!
//! A thin transport-and-persistence service:
//! - Entity records for people, their interests and the links of each interest
//! - SQLite-backed storage with foreign keys between the three tables
//! - A per-request persistence context with atomic `save_changes`
//! - axum endpoints for CRUD plus three composed read models

pub mod model;
pub mod storage;
pub mod server;
pub mod config;

// Re-exports for convenient access
pub use model::{Interest, Link, Person};
pub use storage::{DbContext, SqliteStore};

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for service operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Background query failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Lookup miss; the message is returned to the caller verbatim.
    #[error("{0}")]
    NotFound(String),
}

impl Error {
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }
}
