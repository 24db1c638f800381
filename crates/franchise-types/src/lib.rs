//! Shared type definitions for the Franchise league simulation.
//!
//! This crate is the single source of truth for all records persisted by the
//! league store and all payloads sent to the UI. Types flow downstream to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Typed integer IDs for teams, players, games, messages; UUID v7 event IDs
//! - [`enums`] -- Phases, affiliations, budget items, event kinds, league flavor
//! - [`structs`] -- League records (teams, seasons, players, schedule, meta)
//! - [`views`] -- View payloads and local state updates for the UI

pub mod enums;
pub mod ids;
pub mod structs;
pub mod views;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Affiliation, BudgetItem, EventKind, Gender, Phase, RepeatSeasonKind, Sport, TransactionKind,
    UpdateEvent,
};
pub use ids::{EventId, Gid, Mid, Pid, Tid};
pub use structs::{
    Achievement, AllLeagueTeam, AutoPlayUntil, AwardPlayer, AwardTeam, Awards, BirthInfo, Budget,
    Contract, DraftInfo, DraftLotteryEntry, DraftLotteryResult, ExpenseLevels, Game, HeadToHead,
    HeadToHeadRecord, Injury, InjuryRecord, LogEvent, Message, PlayThroughInjuries, Player,
    PlayerAward, PlayoffMatchup, PlayoffSeed, PlayoffSeries, RatingsRow, RealTeamEntry,
    RealTeamInfo, RepeatPlayerInfo, RepeatSeason, SalaryEntry, ScheduleGame, StatsRow, Team,
    TeamIdentity, TeamInfoCacheEntry, TeamSeason, TeamStats, Transaction,
};
pub use views::{
    Conf, DraftHistoryPlayer, DraftTeamHistoryView, GodModeView, HistoryTeam, HistoryView,
    InjuriesView, InjuryRow, LocalUpdate, MultiTeamModeView, PartialTopMenu, PlayoffStanding,
    RetiredPlayer, RosterContinuityView, SeasonSelector, TeamName, UpcomingGame, UpcomingTeam,
};
