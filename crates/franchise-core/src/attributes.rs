//! League-wide game attributes (`g`).
//!
//! A handful of attributes change over a league's life (the user's team,
//! conferences, playoff format). Those are stored as [`SeasonScoped`]
//! values so views of past seasons read the value that applied then.

use std::collections::BTreeMap;

use franchise_db::{Attribute, Cache, DbError};
use franchise_types::{Conf, Gender, Phase, RepeatSeason, Sport, TeamInfoCacheEntry, Tid};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LeagueConfig;

/// Attribute key the game attributes are persisted under.
pub const GAME_ATTRIBUTES_KEY: &str = "gameAttributes";

/// Attribute key of the real team info table.
pub const REAL_TEAM_INFO_KEY: &str = "realTeamInfo";

/// Regular season length every scale factor is relative to.
const DEFAULT_NUM_GAMES: f64 = 82.0;

/// A value that may change from a given season onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonScoped<T> {
    initial: T,
    changes: BTreeMap<i32, T>,
}

impl<T> SeasonScoped<T> {
    /// A value that never changed.
    pub const fn new(initial: T) -> Self {
        Self {
            initial,
            changes: BTreeMap::new(),
        }
    }

    /// Value in effect during `season`.
    pub fn at(&self, season: i32) -> &T {
        self.changes
            .range(..=season)
            .next_back()
            .map_or(&self.initial, |(_, v)| v)
    }

    /// Most recent value.
    pub fn latest(&self) -> &T {
        self.changes.values().next_back().unwrap_or(&self.initial)
    }

    /// Set the value from `season` onward, dropping later changes.
    pub fn set_from(&mut self, season: i32, value: T) {
        self.changes.retain(|&s, _| s < season);
        self.changes.insert(season, value);
    }
}

/// Game attributes of one league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAttributes {
    /// League ID.
    pub lid: i32,
    /// Sport being simulated.
    pub sport: Sport,
    /// Player gender for generated text.
    pub gender: Gender,
    /// Current season.
    pub season: i32,
    /// First season of the league.
    pub starting_season: i32,
    /// Current phase.
    pub phase: Phase,
    /// The user's team.
    pub user_tid: SeasonScoped<Tid>,
    /// Every user-controlled team (multi team mode).
    pub user_tids: Vec<Tid>,
    /// Conferences.
    pub confs: SeasonScoped<Vec<Conf>>,
    /// Regular season games per team.
    pub num_games: u32,
    /// Games per playoff series, one entry per round.
    pub num_games_playoff_series: SeasonScoped<Vec<u32>>,
    /// Keep every region at the same population.
    pub equalize_regions: bool,
    /// Active replay, if any.
    pub repeat_season: Option<RepeatSeason>,
    /// The user controls no team.
    pub spectator: bool,
    /// God mode enabled.
    pub god_mode: bool,
    /// The user was fired.
    pub game_over: bool,
    /// Hide ratings from the user.
    pub challenge_no_ratings: bool,
    /// Hall of fame threshold multiplier.
    pub hof_factor: f64,
    /// Soft salary cap, thousands of dollars.
    pub salary_cap: Decimal,
    /// Minimum contract, thousands of dollars.
    pub min_contract: Decimal,
    /// Maximum contract, thousands of dollars.
    pub max_contract: Decimal,
    /// Roster size limit for free agent signings.
    pub max_roster_size: u32,
    /// Draft lottery format.
    pub draft_type: String,
    /// Cached display info per team, indexed by tid.
    pub team_info_cache: Vec<TeamInfoCacheEntry>,
}

impl GameAttributes {
    /// Fresh attributes for a new league.
    pub fn new(config: &LeagueConfig, lid: i32) -> Self {
        let league = &config.league;
        let economics = &config.economics;
        Self {
            lid,
            sport: league.sport,
            gender: league.gender,
            season: league.starting_season,
            starting_season: league.starting_season,
            phase: Phase::Preseason,
            user_tid: SeasonScoped::new(Tid::new(0)),
            user_tids: vec![Tid::new(0)],
            confs: SeasonScoped::new(vec![
                Conf {
                    cid: 0,
                    name: "Eastern Conference".to_owned(),
                },
                Conf {
                    cid: 1,
                    name: "Western Conference".to_owned(),
                },
            ]),
            num_games: league.num_games,
            num_games_playoff_series: SeasonScoped::new(league.num_games_playoff_series.clone()),
            equalize_regions: league.equalize_regions,
            repeat_season: None,
            spectator: false,
            god_mode: false,
            game_over: false,
            challenge_no_ratings: false,
            hof_factor: league.hof_factor,
            salary_cap: Decimal::from(economics.salary_cap),
            min_contract: Decimal::from(economics.min_contract),
            max_contract: Decimal::from(economics.max_contract),
            max_roster_size: economics.max_roster_size,
            draft_type: "nba2019".to_owned(),
            team_info_cache: Vec::new(),
        }
    }

    /// The user's team this season.
    pub fn user_tid(&self) -> Tid {
        *self.user_tid.at(self.season)
    }

    /// Number of playoff rounds in `season`.
    pub fn num_playoff_rounds(&self, season: i32) -> usize {
        self.num_games_playoff_series.at(season).len()
    }

    /// Number of teams that are not disabled.
    pub fn num_active_teams(&self) -> usize {
        self.team_info_cache.iter().filter(|t| !t.disabled).count()
    }

    /// Season length relative to a standard 82 game season.
    pub fn season_length_scale(&self) -> f64 {
        f64::from(self.num_games) / DEFAULT_NUM_GAMES
    }

    /// Salary cap relative to the standard cap, for scaling money.
    pub fn salary_cap_scale(&self) -> Decimal {
        self.salary_cap
            .checked_div(Decimal::from(140_000_u32))
            .unwrap_or(Decimal::ONE)
    }

    /// Read the persisted attributes from the cache, if present.
    pub fn load(cache: &Cache) -> Result<Option<Self>, DbError> {
        cache
            .attributes
            .get(&GAME_ATTRIBUTES_KEY.to_owned())
            .map(|a| serde_json::from_value(a.value.clone()))
            .transpose()
            .map_err(DbError::from)
    }

    /// Write the attributes into the cache.
    pub fn save(&self, cache: &mut Cache) -> Result<(), DbError> {
        cache.attributes.put(Attribute {
            key: GAME_ATTRIBUTES_KEY.to_owned(),
            value: serde_json::to_value(self)?,
        });
        Ok(())
    }
}
