//! In-memory cache of active league records.
//!
//! The cache holds the records the current season works with (teams,
//! non-retired players, recent team seasons, the schedule, ...). Writes go
//! to the cache only and are tracked per collection; [`crate::flush`]
//! pushes them to the durable store at the end of an operation.
//!
//! The whole [`Cache`] is `Clone` so a multi-step operation can run against
//! a staged copy and be committed in one assignment.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeBounds;

use franchise_types::{
    Achievement, Affiliation, Awards, DraftLotteryResult, Game, HeadToHead, LogEvent, Message,
    Player, PlayoffSeries, ScheduleGame, Team, TeamSeason, TeamStats, Tid,
};

use crate::error::DbError;
use crate::record::{Attribute, Record};
use crate::store::LeagueStore;

// ---------------------------------------------------------------------------
// CacheStore
// ---------------------------------------------------------------------------

/// Pending writes for one collection, drained by a flush.
#[derive(Debug)]
pub struct Changes<R: Record> {
    /// Whether the collection was cleared since the last flush.
    pub cleared: bool,
    /// Records added or replaced.
    pub upserts: Vec<R>,
    /// Keys deleted.
    pub deletes: Vec<R::Key>,
}

impl<R: Record> Changes<R> {
    /// Whether there is anything to write.
    pub fn is_empty(&self) -> bool {
        !self.cleared && self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// One cached collection with dirty tracking.
#[derive(Debug, Clone)]
pub struct CacheStore<R: Record> {
    records: BTreeMap<R::Key, R>,
    dirty: BTreeSet<R::Key>,
    deleted: BTreeSet<R::Key>,
    cleared: bool,
}

impl<R: Record> Default for CacheStore<R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            dirty: BTreeSet::new(),
            deleted: BTreeSet::new(),
            cleared: false,
        }
    }
}

impl<R: Record> CacheStore<R> {
    /// Look up a record by key.
    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.records.get(key)
    }

    /// Mutable lookup. The record is marked dirty.
    pub fn get_mut(&mut self, key: &R::Key) -> Option<&mut R> {
        let record = self.records.get_mut(key)?;
        self.dirty.insert(key.clone());
        Some(record)
    }

    /// Insert or replace a record.
    pub fn put(&mut self, record: R) {
        let key = record.key();
        self.deleted.remove(&key);
        self.dirty.insert(key.clone());
        self.records.insert(key, record);
    }

    /// Insert a record whose key must not exist yet.
    pub fn add(&mut self, record: R) -> Result<(), DbError> {
        let key = record.key();
        if self.records.contains_key(&key) {
            return Err(DbError::DuplicateKey {
                store: R::STORE.as_str(),
                key: format!("{key:?}"),
            });
        }
        self.put(record);
        Ok(())
    }

    /// Remove a record.
    pub fn delete(&mut self, key: &R::Key) -> Option<R> {
        let removed = self.records.remove(key);
        self.dirty.remove(key);
        self.deleted.insert(key.clone());
        removed
    }

    /// Remove every record, here and (on flush) in the durable store.
    pub fn clear(&mut self) {
        self.records.clear();
        self.dirty.clear();
        self.deleted.clear();
        self.cleared = true;
    }

    /// All records in key order.
    pub fn get_all(&self) -> Vec<&R> {
        self.records.values().collect()
    }

    /// Iterate records in key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &R> {
        self.records.values()
    }

    /// Iterate mutably; every record is marked dirty.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut R> {
        self.dirty.extend(self.records.keys().cloned());
        self.records.values_mut()
    }

    /// Records with keys inside `range`, in key order.
    pub fn range<B: RangeBounds<R::Key>>(&self, range: B) -> impl DoubleEndedIterator<Item = &R> {
        self.records.range(range).map(|(_, r)| r)
    }

    /// Whether a key is cached.
    pub fn contains(&self, key: &R::Key) -> bool {
        self.records.contains_key(key)
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load a record read from the durable store without marking it dirty.
    pub fn hydrate(&mut self, record: R) {
        self.records.insert(record.key(), record);
    }

    /// Drain pending writes.
    pub fn take_changes(&mut self) -> Changes<R> {
        let upserts = core::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|k| self.records.get(&k).cloned())
            .collect();
        let deletes = core::mem::take(&mut self.deleted).into_iter().collect();
        let cleared = core::mem::replace(&mut self.cleared, false);
        Changes {
            cleared,
            upserts,
            deletes,
        }
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// All cached collections of one league.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    /// Teams.
    pub teams: CacheStore<Team>,
    /// Team seasons, keyed by `(tid, season)`.
    pub team_seasons: CacheStore<TeamSeason>,
    /// Team stats rows, keyed by `(tid, season, playoffs)`.
    pub team_stats: CacheStore<TeamStats>,
    /// Players.
    pub players: CacheStore<Player>,
    /// Scheduled games.
    pub schedule: CacheStore<ScheduleGame>,
    /// Completed games.
    pub games: CacheStore<Game>,
    /// Owner messages.
    pub messages: CacheStore<Message>,
    /// Head-to-head records.
    pub head_to_heads: CacheStore<HeadToHead>,
    /// Season awards.
    pub awards: CacheStore<Awards>,
    /// Draft lottery results.
    pub draft_lottery_results: CacheStore<DraftLotteryResult>,
    /// Playoff brackets.
    pub playoff_series: CacheStore<PlayoffSeries>,
    /// Narrative events.
    pub events: CacheStore<LogEvent>,
    /// Locally earned achievements.
    pub achievements: CacheStore<Achievement>,
    /// League-wide attributes.
    pub attributes: CacheStore<Attribute>,
}

impl Cache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the cache with the records active in `season` from the durable
    /// store: all teams, non-retired players, the last three seasons of
    /// team rows, this season's schedule, games, and playoff bracket.
    pub async fn fill<S: LeagueStore>(store: &S, season: i32) -> Result<Self, DbError> {
        let mut cache = Self::new();

        for t in store.get_all::<Team>().await? {
            cache.teams.hydrate(t);
        }
        for p in store.get_all::<Player>().await? {
            if p.affiliation.is_in_league() || p.affiliation == Affiliation::Undrafted {
                cache.players.hydrate(p);
            }
        }
        let first_season = season.saturating_sub(2);
        for ts in store.get_all::<TeamSeason>().await? {
            if ts.season >= first_season {
                cache.team_seasons.hydrate(ts);
            }
        }
        for ts in store.get_all::<TeamStats>().await? {
            if ts.season == season {
                cache.team_stats.hydrate(ts);
            }
        }
        for g in store.get_all::<ScheduleGame>().await? {
            cache.schedule.hydrate(g);
        }
        for g in store.get_all::<Game>().await? {
            if g.season == season {
                cache.games.hydrate(g);
            }
        }
        if let Some(ps) = store.get::<PlayoffSeries>(&season).await? {
            cache.playoff_series.hydrate(ps);
        }
        for a in store.get_all::<Attribute>().await? {
            cache.attributes.hydrate(a);
        }

        tracing::debug!(
            season,
            teams = cache.teams.len(),
            players = cache.players.len(),
            "Filled league cache"
        );

        Ok(cache)
    }

    /// Players on a team or in free agency, ordered by pid.
    pub fn players_in_league(&self) -> Vec<&Player> {
        self.players
            .values()
            .filter(|p| p.affiliation.is_in_league())
            .collect()
    }

    /// Players currently on the roster of `tid`.
    pub fn players_on_team(&self, tid: Tid) -> Vec<&Player> {
        self.players
            .values()
            .filter(|p| p.affiliation == Affiliation::Team(tid))
            .collect()
    }

    /// Team season rows of `tid` with `from <= season <= to`, oldest first.
    pub fn team_seasons_for(&self, tid: Tid, from: i32, to: i32) -> Vec<&TeamSeason> {
        if from > to {
            return Vec::new();
        }
        self.team_seasons.range((tid, from)..=(tid, to)).collect()
    }
}
