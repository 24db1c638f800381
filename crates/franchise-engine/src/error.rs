//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and auto play.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: franchise_core::config::ConfigError,
    },

    /// The durable store failed.
    #[error("store error: {source}")]
    Db {
        /// The underlying store error.
        #[from]
        source: franchise_db::DbError,
    },

    /// Opening the league failed.
    #[error("league error: {source}")]
    League {
        /// The underlying league error.
        #[from]
        source: franchise_core::league::LeagueError,
    },

    /// Auto play failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: franchise_core::runner::RunnerError,
    },

    /// The account client could not be built.
    #[error("account error: {source}")]
    Account {
        /// The underlying account error.
        #[from]
        source: franchise_core::account::AccountError,
    },

    /// League seeding failed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
