//! Multi-record accessors over cache and durable store.
//!
//! Every accessor reads both layers and merges them with
//! [`merge_by_pk`]: cached records win over durable records with the same
//! key, and [`GetCopyType`] decides whether cached records are cloned or
//! borrowed.

use std::borrow::Cow;

use franchise_types::{
    Affiliation, Awards, DraftLotteryResult, HeadToHead, Message, Mid, Pid, Player, Team,
    TeamSeason, Tid,
};

use crate::cache::{Cache, CacheStore};
use crate::error::DbError;
use crate::merge::{GetCopyType, last_entries, merge_by_pk};
use crate::record::Record;
use crate::store::LeagueStore;

/// Records of one collection, cached ones possibly borrowed.
pub type Copies<'a, R> = Vec<Cow<'a, R>>;

/// Read one record by key, or the whole collection.
async fn by_key<'a, R: Record, S: LeagueStore>(
    cached: &'a CacheStore<R>,
    store: &S,
    key: Option<&R::Key>,
    copy: GetCopyType,
) -> Result<Copies<'a, R>, DbError> {
    match key {
        Some(key) => {
            if let Some(r) = cached.get(key) {
                return Ok(merge_by_pk(Vec::new(), [r], copy));
            }
            Ok(store.get::<R>(key).await?.map(Cow::Owned).into_iter().collect())
        }
        None => Ok(merge_by_pk(store.get_all::<R>().await?, cached.values(), copy)),
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Teams, optionally a single one.
pub async fn teams<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    tid: Option<Tid>,
    copy: GetCopyType,
) -> Result<Copies<'a, Team>, DbError> {
    by_key(&cache.teams, store, tid.as_ref(), copy).await
}

/// Which team seasons to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSeasonsQuery {
    /// One team, optionally limited to an inclusive season range.
    Team {
        /// Team ID.
        tid: Tid,
        /// Inclusive `(first, last)` seasons.
        seasons: Option<(i32, i32)>,
    },
    /// Every team's row for one season.
    Season(i32),
    /// Everything.
    All,
}

/// Team season rows, ordered by `(tid, season)`.
pub async fn team_seasons<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    query: TeamSeasonsQuery,
    copy: GetCopyType,
) -> Result<Copies<'a, TeamSeason>, DbError> {
    match query {
        TeamSeasonsQuery::Team { tid, seasons } => {
            let (from, to) = seasons.unwrap_or((i32::MIN, i32::MAX));
            if from > to {
                return Ok(Vec::new());
            }
            let from_db = store.get_range::<TeamSeason>(&(tid, from), &(tid, to)).await?;
            let from_cache = cache.team_seasons.range((tid, from)..=(tid, to));
            Ok(merge_by_pk(from_db, from_cache, copy))
        }
        TeamSeasonsQuery::Season(season) => {
            let from_db: Vec<TeamSeason> = store
                .get_all::<TeamSeason>()
                .await?
                .into_iter()
                .filter(|ts| ts.season == season)
                .collect();
            let from_cache = cache.team_seasons.values().filter(|ts| ts.season == season);
            Ok(merge_by_pk(from_db, from_cache, copy))
        }
        TeamSeasonsQuery::All => Ok(merge_by_pk(
            store.get_all::<TeamSeason>().await?,
            cache.team_seasons.values(),
            copy,
        )),
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Which players to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayersQuery {
    /// Everyone, retired included.
    All,
    /// A single player.
    Pid(Pid),
    /// Players who retired after the given season.
    RetiredYear(i32),
    /// Players drafted by a team.
    DraftTid(Tid),
    /// Players with the given affiliation.
    Affiliation(Affiliation),
}

impl PlayersQuery {
    fn matches(self, p: &Player) -> bool {
        match self {
            Self::All => true,
            Self::Pid(pid) => p.pid == pid,
            Self::RetiredYear(season) => {
                p.affiliation == Affiliation::Retired && p.retired_year == Some(season)
            }
            Self::DraftTid(tid) => p.draft.tid == Some(tid),
            Self::Affiliation(affiliation) => p.affiliation == affiliation,
        }
    }
}

/// Players matching `query`, ordered by pid.
pub async fn players<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    query: PlayersQuery,
    copy: GetCopyType,
) -> Result<Copies<'a, Player>, DbError> {
    if let PlayersQuery::Pid(pid) = query {
        return by_key(&cache.players, store, Some(&pid), copy).await;
    }

    let from_db: Vec<Player> = store
        .get_all::<Player>()
        .await?
        .into_iter()
        .filter(|p| query.matches(p))
        .collect();
    // A cached player that no longer matches still shadows its stale
    // durable copy.
    let mut merged = merge_by_pk(from_db, cache.players.values(), copy);
    merged.retain(|p| query.matches(p));
    Ok(merged)
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Which messages to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessagesQuery {
    /// Only the newest `limit` messages.
    pub limit: Option<usize>,
    /// A single message.
    pub mid: Option<Mid>,
}

/// Owner messages, oldest first.
///
/// With a limit of N, the newest N are taken from each layer (durable
/// store by reverse iteration), merged, and trimmed back to N since the
/// two layers' newest entries need not coincide.
pub async fn messages<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    query: MessagesQuery,
    copy: GetCopyType,
) -> Result<Copies<'a, Message>, DbError> {
    if let Some(mid) = query.mid {
        return by_key(&cache.messages, store, Some(&mid), copy).await;
    }

    if let Some(limit) = query.limit {
        let from_db = store.last_n::<Message>(limit).await?;
        let from_cache = last_entries(cache.messages.get_all(), limit);
        let merged = merge_by_pk(from_db, from_cache, copy);
        return Ok(last_entries(merged, limit));
    }

    by_key(&cache.messages, store, None, copy).await
}

// ---------------------------------------------------------------------------
// Season-keyed collections
// ---------------------------------------------------------------------------

/// Head-to-head records, optionally for one season.
pub async fn head_to_heads<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    season: Option<i32>,
    copy: GetCopyType,
) -> Result<Copies<'a, HeadToHead>, DbError> {
    by_key(&cache.head_to_heads, store, season.as_ref(), copy).await
}

/// Awards, optionally for one season.
pub async fn awards<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    season: Option<i32>,
    copy: GetCopyType,
) -> Result<Copies<'a, Awards>, DbError> {
    by_key(&cache.awards, store, season.as_ref(), copy).await
}

/// Draft lottery results, optionally for one season.
pub async fn draft_lottery_results<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    season: Option<i32>,
    copy: GetCopyType,
) -> Result<Copies<'a, DraftLotteryResult>, DbError> {
    by_key(&cache.draft_lottery_results, store, season.as_ref(), copy).await
}
