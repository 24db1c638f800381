//! Durable league store.
//!
//! [`LeagueStore`] is the seam between the league logic and whatever keeps
//! records across runs. Implementations only deal in JSON values under raw
//! keys; the typed methods on the trait handle (de)serialization.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryLeagueStore`] -- a process-local store for tests and offline runs
//! - [`crate::postgres::PostgresLeagueStore`] -- one JSONB table in `PostgreSQL`

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::record::{RawKey, Record, Store, StoreKey};

/// Durable storage for league records.
pub trait LeagueStore: Send + Sync {
    /// Read one value.
    fn get_value(
        &self,
        store: Store,
        key: &RawKey,
    ) -> impl Future<Output = Result<Option<Value>, DbError>> + Send;

    /// Read every value of a collection in key order.
    fn all_values(&self, store: Store) -> impl Future<Output = Result<Vec<Value>, DbError>> + Send;

    /// Read values with `from <= key <= to` in key order.
    fn range_values(
        &self,
        store: Store,
        from: &RawKey,
        to: &RawKey,
    ) -> impl Future<Output = Result<Vec<Value>, DbError>> + Send;

    /// Read the last `n` values by key, returned in ascending key order.
    ///
    /// Implementations iterate in reverse and stop after `n` records.
    fn last_values(
        &self,
        store: Store,
        n: usize,
    ) -> impl Future<Output = Result<Vec<Value>, DbError>> + Send;

    /// Insert or replace values.
    fn put_values(
        &self,
        store: Store,
        rows: Vec<(RawKey, Value)>,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Delete values by key. Missing keys are ignored.
    fn delete_values(
        &self,
        store: Store,
        keys: Vec<RawKey>,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Delete every value of a collection.
    fn clear_store(&self, store: Store) -> impl Future<Output = Result<(), DbError>> + Send;

    // -----------------------------------------------------------------------
    // Typed access
    // -----------------------------------------------------------------------

    /// Read one record.
    fn get<R: Record>(&self, key: &R::Key) -> impl Future<Output = Result<Option<R>, DbError>> + Send {
        let raw = key.to_raw();
        async move {
            match self.get_value(R::STORE, &raw).await? {
                Some(value) => Ok(Some(serde_json::from_value(value)?)),
                None => Ok(None),
            }
        }
    }

    /// Read every record of a collection in key order.
    fn get_all<R: Record>(&self) -> impl Future<Output = Result<Vec<R>, DbError>> + Send {
        async move { decode_all(self.all_values(R::STORE).await?) }
    }

    /// Read records with `from <= key <= to` in key order.
    fn get_range<R: Record>(
        &self,
        from: &R::Key,
        to: &R::Key,
    ) -> impl Future<Output = Result<Vec<R>, DbError>> + Send {
        let from = from.to_raw();
        let to = to.to_raw();
        async move { decode_all(self.range_values(R::STORE, &from, &to).await?) }
    }

    /// Read the last `n` records by key, oldest first.
    fn last_n<R: Record>(&self, n: usize) -> impl Future<Output = Result<Vec<R>, DbError>> + Send {
        async move { decode_all(self.last_values(R::STORE, n).await?) }
    }

    /// Insert or replace one record.
    fn put<R: Record>(&self, record: &R) -> impl Future<Output = Result<(), DbError>> + Send {
        let row = encode(record);
        async move { self.put_values(R::STORE, vec![row?]).await }
    }

    /// Insert or replace many records.
    fn put_many<R: Record>(&self, records: &[R]) -> impl Future<Output = Result<(), DbError>> + Send {
        let rows: Result<Vec<_>, DbError> = records.iter().map(encode).collect();
        async move {
            let rows = rows?;
            if rows.is_empty() {
                return Ok(());
            }
            self.put_values(R::STORE, rows).await
        }
    }

    /// Delete one record.
    fn delete<R: Record>(&self, key: &R::Key) -> impl Future<Output = Result<(), DbError>> + Send {
        let raw = key.to_raw();
        async move { self.delete_values(R::STORE, vec![raw]).await }
    }

    /// Delete every record of a collection.
    fn clear<R: Record>(&self) -> impl Future<Output = Result<(), DbError>> + Send {
        self.clear_store(R::STORE)
    }
}

fn encode<R: Record>(record: &R) -> Result<(RawKey, Value), DbError> {
    Ok((record.key().to_raw(), serde_json::to_value(record)?))
}

fn decode_all<R: Record>(values: Vec<Value>) -> Result<Vec<R>, DbError> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(DbError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Process-local [`LeagueStore`].
#[derive(Debug, Default)]
pub struct MemoryLeagueStore {
    data: RwLock<BTreeMap<Store, BTreeMap<RawKey, Value>>>,
}

impl MemoryLeagueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub async fn count(&self, store: Store) -> usize {
        self.data.read().await.get(&store).map_or(0, BTreeMap::len)
    }
}

impl LeagueStore for MemoryLeagueStore {
    async fn get_value(&self, store: Store, key: &RawKey) -> Result<Option<Value>, DbError> {
        let data = self.data.read().await;
        Ok(data.get(&store).and_then(|rows| rows.get(key)).cloned())
    }

    async fn all_values(&self, store: Store) -> Result<Vec<Value>, DbError> {
        let data = self.data.read().await;
        Ok(data
            .get(&store)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn range_values(
        &self,
        store: Store,
        from: &RawKey,
        to: &RawKey,
    ) -> Result<Vec<Value>, DbError> {
        if from > to {
            return Ok(Vec::new());
        }
        let data = self.data.read().await;
        Ok(data
            .get(&store)
            .map(|rows| rows.range(from.clone()..=to.clone()).map(|(_, v)| v.clone()).collect())
            .unwrap_or_default())
    }

    async fn last_values(&self, store: Store, n: usize) -> Result<Vec<Value>, DbError> {
        let data = self.data.read().await;
        let mut out: Vec<Value> = data
            .get(&store)
            .map(|rows| rows.values().rev().take(n).cloned().collect())
            .unwrap_or_default();
        out.reverse();
        Ok(out)
    }

    async fn put_values(&self, store: Store, rows: Vec<(RawKey, Value)>) -> Result<(), DbError> {
        let mut data = self.data.write().await;
        data.entry(store).or_default().extend(rows);
        Ok(())
    }

    async fn delete_values(&self, store: Store, keys: Vec<RawKey>) -> Result<(), DbError> {
        let mut data = self.data.write().await;
        if let Some(rows) = data.get_mut(&store) {
            for key in &keys {
                rows.remove(key);
            }
        }
        Ok(())
    }

    async fn clear_store(&self, store: Store) -> Result<(), DbError> {
        self.data.write().await.remove(&store);
        Ok(())
    }
}
