//! League store for the Franchise league simulation.
//!
//! Records live in two layers: an in-memory [`Cache`] holding the active
//! season's records, and a durable [`LeagueStore`] holding the full
//! history. League logic reads and writes the cache; accessors merge both
//! layers; [`flush`] pushes cached writes down at the end of an operation.
//!
//! # Architecture
//!
//! ```text
//! League operation
//!     |
//!     +-- Read/write active records --> Cache (CacheStore per collection)
//!     |
//!     +-- get_copies / get_copy -------> merge_by_pk(durable, cache)
//!     |
//!     +-- End of operation flush -----> LeagueStore
//!         |-- MemoryLeagueStore   (tests, offline runs)
//!         +-- PostgresLeagueStore (league_records JSONB table)
//! ```
//!
//! # Modules
//!
//! - [`record`] -- Collections, raw keys, and the [`Record`] trait
//! - [`cache`] -- In-memory collections with dirty tracking
//! - [`store`] -- The [`LeagueStore`] trait and the in-memory implementation
//! - [`postgres`] -- `PostgreSQL` implementation of [`LeagueStore`]
//! - [`merge`] -- Cache-over-durable overlay by primary key
//! - [`get_copies`] -- Multi-record accessors
//! - [`get_copy`] -- Single-record accessors
//! - [`flush`] -- Cache to durable store persistence
//! - [`error`] -- Shared error types

pub mod cache;
pub mod error;
pub mod flush;
pub mod get_copies;
pub mod get_copy;
pub mod merge;
pub mod postgres;
pub mod record;
pub mod store;

// Re-export primary types for convenience.
pub use cache::{Cache, CacheStore, Changes};
pub use error::DbError;
pub use flush::{FlushStats, flush};
pub use get_copies::{Copies, MessagesQuery, PlayersQuery, TeamSeasonsQuery};
pub use merge::{GetCopyType, merge_by_pk};
pub use postgres::{PostgresConfig, PostgresLeagueStore};
pub use record::{Attribute, KeyPart, RawKey, Record, Store, StoreKey};
pub use store::{LeagueStore, MemoryLeagueStore};
