//! Error types for the league store.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] and [`serde_json`] errors with context about which collection
//! and key were involved.

/// Errors that can occur in the league store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A record could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `add` was called with a key that is already present.
    #[error("Duplicate key in {store}: {key}")]
    DuplicateKey {
        /// Collection name.
        store: &'static str,
        /// Debug rendering of the key.
        key: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
