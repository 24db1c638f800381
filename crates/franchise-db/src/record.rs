//! Record collections and their primary keys.
//!
//! Every persisted type implements [`Record`], naming its collection and
//! extracting its primary key. Keys are lowered to a [`RawKey`] (a short
//! list of integers or strings) so both the in-memory store and the
//! `PostgreSQL` JSONB column order records the same way.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use franchise_types::{
    Achievement, Awards, DraftLotteryResult, EventId, Game, Gid, HeadToHead, LogEvent, Message,
    Mid, Pid, Player, PlayoffSeries, ScheduleGame, Team, TeamSeason, TeamStats, Tid,
};

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// A named record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Store {
    /// [`Team`] records.
    Teams,
    /// [`TeamSeason`] records.
    TeamSeasons,
    /// [`TeamStats`] records.
    TeamStats,
    /// [`Player`] records.
    Players,
    /// [`ScheduleGame`] records.
    Schedule,
    /// [`Game`] records.
    Games,
    /// [`Message`] records.
    Messages,
    /// [`HeadToHead`] records.
    HeadToHeads,
    /// [`Awards`] records.
    Awards,
    /// [`DraftLotteryResult`] records.
    DraftLotteryResults,
    /// [`PlayoffSeries`] records.
    PlayoffSeries,
    /// [`LogEvent`] records.
    Events,
    /// [`Achievement`] meta records.
    Achievements,
    /// [`Attribute`] meta records.
    Attributes,
}

impl Store {
    /// Collection name used as the `store` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Teams => "teams",
            Self::TeamSeasons => "teamSeasons",
            Self::TeamStats => "teamStats",
            Self::Players => "players",
            Self::Schedule => "schedule",
            Self::Games => "games",
            Self::Messages => "messages",
            Self::HeadToHeads => "headToHeads",
            Self::Awards => "awards",
            Self::DraftLotteryResults => "draftLotteryResults",
            Self::PlayoffSeries => "playoffSeries",
            Self::Events => "events",
            Self::Achievements => "achievements",
            Self::Attributes => "attributes",
        }
    }
}

impl core::fmt::Display for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// One component of a raw key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    /// Integer component.
    Int(i64),
    /// String component.
    Text(String),
}

/// Storage-level key: compared component by component.
pub type RawKey = Vec<KeyPart>;

/// A primary key that can be lowered to a [`RawKey`].
pub trait StoreKey: Debug + Clone + Ord + Send + Sync + 'static {
    /// Lower the key to its storage form.
    fn to_raw(&self) -> RawKey;
}

macro_rules! int_id_key {
    ($($id:ty),*) => {
        $(
            impl StoreKey for $id {
                fn to_raw(&self) -> RawKey {
                    vec![KeyPart::Int(i64::from(self.get()))]
                }
            }
        )*
    };
}

int_id_key!(Tid, Pid, Gid, Mid);

impl StoreKey for i32 {
    fn to_raw(&self) -> RawKey {
        vec![KeyPart::Int(i64::from(*self))]
    }
}

impl StoreKey for u32 {
    fn to_raw(&self) -> RawKey {
        vec![KeyPart::Int(i64::from(*self))]
    }
}

impl StoreKey for String {
    fn to_raw(&self) -> RawKey {
        vec![KeyPart::Text(self.clone())]
    }
}

impl StoreKey for EventId {
    fn to_raw(&self) -> RawKey {
        // UUID v7 strings sort by creation time.
        vec![KeyPart::Text(self.to_string())]
    }
}

impl StoreKey for (Tid, i32) {
    fn to_raw(&self) -> RawKey {
        vec![
            KeyPart::Int(i64::from(self.0.get())),
            KeyPart::Int(i64::from(self.1)),
        ]
    }
}

impl StoreKey for (Tid, i32, bool) {
    fn to_raw(&self) -> RawKey {
        vec![
            KeyPart::Int(i64::from(self.0.get())),
            KeyPart::Int(i64::from(self.1)),
            KeyPart::Int(i64::from(self.2)),
        ]
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A persisted record.
pub trait Record: Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type.
    type Key: StoreKey;

    /// Collection the record lives in.
    const STORE: Store;

    /// Extract the primary key.
    fn key(&self) -> Self::Key;
}

/// A named league-wide value in the `attributes` meta collection, such as
/// game attributes or real team info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub key: String,
    /// Attribute value.
    pub value: serde_json::Value,
}

macro_rules! record {
    ($ty:ty, $store:expr, $key:ty, |$r:ident| $body:expr) => {
        impl Record for $ty {
            type Key = $key;
            const STORE: Store = $store;

            fn key(&self) -> Self::Key {
                let $r = self;
                $body
            }
        }
    };
}

record!(Team, Store::Teams, Tid, |t| t.tid);
record!(TeamSeason, Store::TeamSeasons, (Tid, i32), |ts| (ts.tid, ts.season));
record!(TeamStats, Store::TeamStats, (Tid, i32, bool), |ts| (
    ts.tid,
    ts.season,
    ts.playoffs
));
record!(Player, Store::Players, Pid, |p| p.pid);
record!(ScheduleGame, Store::Schedule, Gid, |g| g.gid);
record!(Game, Store::Games, Gid, |g| g.gid);
record!(Message, Store::Messages, Mid, |m| m.mid);
record!(HeadToHead, Store::HeadToHeads, i32, |h| h.season);
record!(Awards, Store::Awards, i32, |a| a.season);
record!(DraftLotteryResult, Store::DraftLotteryResults, i32, |d| d.season);
record!(PlayoffSeries, Store::PlayoffSeries, i32, |ps| ps.season);
record!(LogEvent, Store::Events, EventId, |e| e.id);
record!(Achievement, Store::Achievements, u32, |a| a.aid);
record!(Attribute, Store::Attributes, String, |a| a.key.clone());

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn raw_keys_order_like_typed_keys() {
        let a = (Tid::new(1), 2024).to_raw();
        let b = (Tid::new(1), 2025).to_raw();
        let c = (Tid::new(2), 2019).to_raw();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn raw_keys_serialize_as_plain_arrays() {
        let raw = (Tid::new(3), 2025, true).to_raw();
        let json = serde_json::to_value(&raw).unwrap();
        assert_eq!(json, serde_json::json!([3, 2025, 1]));
        let back: RawKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn store_names_match_collections() {
        assert_eq!(<TeamSeason as Record>::STORE.as_str(), "teamSeasons");
        assert_eq!(Store::DraftLotteryResults.to_string(), "draftLotteryResults");
    }
}
