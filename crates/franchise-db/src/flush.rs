//! End-of-operation persistence of cached writes to the durable store.
//!
//! Called after each phase transition or view-changing operation so the
//! durable store reflects everything the cache holds.
//!
//! ```text
//! flush(cache, store)
//!   |
//!   +-- per collection: clear (if cleared) --> delete keys --> upsert dirty
//! ```

use crate::cache::{Cache, CacheStore};
use crate::error::DbError;
use crate::record::{Record, StoreKey};
use crate::store::LeagueStore;

/// Counts of records written by a flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Collections cleared.
    pub cleared: usize,
    /// Records inserted or replaced.
    pub upserted: usize,
    /// Records deleted.
    pub deleted: usize,
}

impl FlushStats {
    fn absorb(&mut self, other: Self) {
        self.cleared = self.cleared.saturating_add(other.cleared);
        self.upserted = self.upserted.saturating_add(other.upserted);
        self.deleted = self.deleted.saturating_add(other.deleted);
    }
}

async fn flush_store<R: Record, S: LeagueStore>(
    cached: &mut CacheStore<R>,
    store: &S,
) -> Result<FlushStats, DbError> {
    let changes = cached.take_changes();
    if changes.is_empty() {
        return Ok(FlushStats::default());
    }

    if changes.cleared {
        store.clear::<R>().await?;
    }
    if !changes.deletes.is_empty() {
        let keys = changes.deletes.iter().map(StoreKey::to_raw).collect();
        store.delete_values(R::STORE, keys).await?;
    }
    store.put_many(&changes.upserts).await?;

    tracing::debug!(
        store = R::STORE.as_str(),
        cleared = changes.cleared,
        upserted = changes.upserts.len(),
        deleted = changes.deletes.len(),
        "Flushed collection"
    );

    Ok(FlushStats {
        cleared: usize::from(changes.cleared),
        upserted: changes.upserts.len(),
        deleted: changes.deletes.len(),
    })
}

/// Write every pending cache change to the durable store.
///
/// # Errors
///
/// Returns the first [`DbError`] hit. Collections flushed before the error
/// stay flushed; the failing collection's changes are lost from the
/// pending set and the cache should be refilled.
pub async fn flush<S: LeagueStore>(cache: &mut Cache, store: &S) -> Result<FlushStats, DbError> {
    let mut stats = FlushStats::default();
    stats.absorb(flush_store(&mut cache.teams, store).await?);
    stats.absorb(flush_store(&mut cache.team_seasons, store).await?);
    stats.absorb(flush_store(&mut cache.team_stats, store).await?);
    stats.absorb(flush_store(&mut cache.players, store).await?);
    stats.absorb(flush_store(&mut cache.schedule, store).await?);
    stats.absorb(flush_store(&mut cache.games, store).await?);
    stats.absorb(flush_store(&mut cache.messages, store).await?);
    stats.absorb(flush_store(&mut cache.head_to_heads, store).await?);
    stats.absorb(flush_store(&mut cache.awards, store).await?);
    stats.absorb(flush_store(&mut cache.draft_lottery_results, store).await?);
    stats.absorb(flush_store(&mut cache.playoff_series, store).await?);
    stats.absorb(flush_store(&mut cache.events, store).await?);
    stats.absorb(flush_store(&mut cache.achievements, store).await?);
    stats.absorb(flush_store(&mut cache.attributes, store).await?);

    tracing::info!(
        cleared = stats.cleared,
        upserted = stats.upserted,
        deleted = stats.deleted,
        "Flushed league cache"
    );

    Ok(stats)
}
