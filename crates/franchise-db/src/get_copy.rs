//! Single-record accessors: the first match of the corresponding
//! [`crate::get_copies`] accessor, or `None`.

use std::borrow::Cow;

use franchise_types::{
    Awards, DraftLotteryResult, HeadToHead, Message, Mid, Pid, Player, Team, TeamSeason, Tid,
};

use crate::cache::Cache;
use crate::error::DbError;
use crate::get_copies::{self, MessagesQuery, PlayersQuery, TeamSeasonsQuery};
use crate::merge::GetCopyType;
use crate::store::LeagueStore;

/// One team.
pub async fn team<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    tid: Tid,
    copy: GetCopyType,
) -> Result<Option<Cow<'a, Team>>, DbError> {
    Ok(get_copies::teams(cache, store, Some(tid), copy).await?.into_iter().next())
}

/// One team's row for one season.
pub async fn team_season<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    tid: Tid,
    season: i32,
    copy: GetCopyType,
) -> Result<Option<Cow<'a, TeamSeason>>, DbError> {
    let query = TeamSeasonsQuery::Team {
        tid,
        seasons: Some((season, season)),
    };
    Ok(get_copies::team_seasons(cache, store, query, copy).await?.into_iter().next())
}

/// One player.
pub async fn player<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    pid: Pid,
    copy: GetCopyType,
) -> Result<Option<Cow<'a, Player>>, DbError> {
    Ok(get_copies::players(cache, store, PlayersQuery::Pid(pid), copy)
        .await?
        .into_iter()
        .next())
}

/// One message.
pub async fn message<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    mid: Mid,
    copy: GetCopyType,
) -> Result<Option<Cow<'a, Message>>, DbError> {
    let query = MessagesQuery {
        limit: None,
        mid: Some(mid),
    };
    Ok(get_copies::messages(cache, store, query, copy).await?.into_iter().next())
}

/// Head-to-head records for one season.
pub async fn head_to_head<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    season: i32,
    copy: GetCopyType,
) -> Result<Option<Cow<'a, HeadToHead>>, DbError> {
    Ok(get_copies::head_to_heads(cache, store, Some(season), copy)
        .await?
        .into_iter()
        .next())
}

/// Awards for one season.
pub async fn awards<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    season: i32,
    copy: GetCopyType,
) -> Result<Option<Cow<'a, Awards>>, DbError> {
    Ok(get_copies::awards(cache, store, Some(season), copy).await?.into_iter().next())
}

/// Draft lottery result for one season.
pub async fn draft_lottery_result<'a, S: LeagueStore>(
    cache: &'a Cache,
    store: &S,
    season: i32,
    copy: GetCopyType,
) -> Result<Option<Cow<'a, DraftLotteryResult>>, DbError> {
    Ok(get_copies::draft_lottery_results(cache, store, Some(season), copy)
        .await?
        .into_iter()
        .next())
}
