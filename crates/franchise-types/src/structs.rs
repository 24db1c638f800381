//! League record structs.
//!
//! Every record persisted by the league store lives here: teams and their
//! per-season rows, players with their rating and stat histories, the
//! schedule, completed games, owner messages, head-to-head tallies, awards,
//! draft lottery results, playoff series, narrative events, and the meta
//! records (achievements, real team info).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Affiliation, BudgetItem, EventKind, Phase, RepeatSeasonKind, TransactionKind};
use crate::ids::{EventId, Gid, Mid, Pid, Tid};

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// A team's current budget: ticket price plus one level per expense item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Budget {
    /// Price of a single ticket.
    #[ts(as = "String")]
    pub ticket_price: Decimal,
    /// Scouting level.
    pub scouting: u32,
    /// Coaching level.
    pub coaching: u32,
    /// Health level.
    pub health: u32,
    /// Facilities level.
    pub facilities: u32,
}

impl Budget {
    /// The level currently set for a budget item.
    pub const fn level(&self, item: BudgetItem) -> u32 {
        match item {
            BudgetItem::Scouting => self.scouting,
            BudgetItem::Coaching => self.coaching,
            BudgetItem::Health => self.health,
            BudgetItem::Facilities => self.facilities,
        }
    }

    /// Overwrite the level of a budget item.
    pub const fn set_level(&mut self, item: BudgetItem, level: u32) {
        match item {
            BudgetItem::Scouting => self.scouting = level,
            BudgetItem::Coaching => self.coaching = level,
            BudgetItem::Health => self.health = level,
            BudgetItem::Facilities => self.facilities = level,
        }
    }
}

/// Injury severity (in games remaining) a team will still play through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayThroughInjuries {
    /// Threshold during the regular season.
    pub regular_season: u32,
    /// Threshold during the playoffs.
    pub playoffs: u32,
}

impl Default for PlayThroughInjuries {
    fn default() -> Self {
        Self {
            regular_season: 0,
            playoffs: 4,
        }
    }
}

/// A franchise and its current settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Team {
    /// Team ID.
    pub tid: Tid,
    /// Conference index.
    pub cid: u32,
    /// Division index.
    pub did: u32,
    /// Home region, e.g. "Boston".
    pub region: String,
    /// Team name, e.g. "Hawks".
    pub name: String,
    /// Short abbreviation shown in tables.
    pub abbrev: String,
    /// External reference ID linking to real team history.
    pub sr_id: Option<String>,
    /// Logo URL.
    pub img_url: Option<String>,
    /// Small logo URL.
    pub img_url_small: Option<String>,
    /// Region population in millions. Filled from the season row when absent.
    pub pop: Option<f64>,
    /// Stadium capacity. Filled from the season row when absent.
    pub stadium_capacity: Option<u32>,
    /// Current budget.
    pub budget: Budget,
    /// Disabled teams keep their history but play no games.
    pub disabled: bool,
    /// Whether budget amounts follow salary cap inflation.
    pub adjust_for_inflation: bool,
    /// Whether the ticket price is set automatically.
    pub auto_ticket_price: bool,
    /// Whether the AI keeps the roster sorted.
    pub keep_roster_sorted: bool,
    /// Injury play-through policy.
    pub play_through_injuries: PlayThroughInjuries,
    /// Jersey numbers retired by this team.
    pub retired_jersey_numbers: Vec<String>,
}

/// Summed budget levels over the games of one season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExpenseLevels {
    /// Scouting level summed over games played.
    pub scouting: u64,
    /// Coaching level summed over games played.
    pub coaching: u64,
    /// Health level summed over games played.
    pub health: u64,
    /// Facilities level summed over games played.
    pub facilities: u64,
}

impl ExpenseLevels {
    /// Summed level for a budget item.
    pub const fn get(&self, item: BudgetItem) -> u64 {
        match item {
            BudgetItem::Scouting => self.scouting,
            BudgetItem::Coaching => self.coaching,
            BudgetItem::Health => self.health,
            BudgetItem::Facilities => self.facilities,
        }
    }
}

/// One team's record for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamSeason {
    /// Team ID.
    pub tid: Tid,
    /// Season year.
    pub season: i32,
    /// Conference index at the time.
    pub cid: u32,
    /// Division index at the time.
    pub did: u32,
    /// Region at the time.
    pub region: String,
    /// Name at the time.
    pub name: String,
    /// Abbreviation at the time.
    pub abbrev: String,
    /// Logo at the time.
    pub img_url: Option<String>,
    /// Region population in millions.
    pub pop: f64,
    /// Stadium capacity.
    pub stadium_capacity: u32,
    /// Games played.
    pub gp: u32,
    /// Home games played.
    pub gp_home: u32,
    /// Wins.
    pub won: u32,
    /// Losses.
    pub lost: u32,
    /// Ties.
    pub tied: u32,
    /// Overtime losses.
    pub otl: u32,
    /// Playoff rounds won; `-1` means the team missed the playoffs.
    pub playoff_rounds_won: i32,
    /// Fan enthusiasm in `[0, 1]`.
    pub hype: f64,
    /// Budget levels summed over games played.
    pub expense_levels: ExpenseLevels,
    /// Total revenue.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Total expenses.
    #[ts(as = "String")]
    pub expenses: Decimal,
}

/// Aggregate team stats for one season (regular season or playoffs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamStats {
    /// Team ID.
    pub tid: Tid,
    /// Season year.
    pub season: i32,
    /// Whether this row covers playoff games.
    pub playoffs: bool,
    /// Games played.
    pub gp: u32,
    /// Sport-specific counting stats, keyed by stat name.
    pub counting: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Birth year and place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BirthInfo {
    /// Birth year.
    pub year: i32,
    /// Birth place.
    pub loc: String,
}

/// How a player entered the league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DraftInfo {
    /// Draft year.
    pub year: i32,
    /// Round, `0` if undrafted.
    pub round: u32,
    /// Pick within the round, `0` if undrafted.
    pub pick: u32,
    /// Drafting team.
    pub tid: Option<Tid>,
    /// Team that originally owned the pick.
    pub original_tid: Option<Tid>,
}

/// Ratings snapshot for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RatingsRow {
    /// Season these ratings apply to.
    pub season: i32,
    /// Overall rating.
    pub ovr: u8,
    /// Potential rating.
    pub pot: u8,
    /// Scouting noise applied to displayed ratings.
    pub fuzz: f64,
    /// Position.
    pub pos: String,
    /// Skill labels.
    pub skills: Vec<String>,
    /// Component ratings keyed by attribute name.
    pub attrs: BTreeMap<String, u8>,
    /// Index into `injuries` if this row was added by an injury.
    pub injury_index: Option<u32>,
}

/// Stat line for one team stint within one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatsRow {
    /// Season year.
    pub season: i32,
    /// Team for this stint.
    pub tid: Tid,
    /// Whether this row covers playoff games.
    pub playoffs: bool,
    /// Games played.
    pub gp: u32,
    /// Games started.
    pub gs: u32,
    /// Minutes played.
    pub min: f64,
    /// Jersey number worn during the stint.
    pub jersey_number: Option<String>,
    /// Sport-specific counting stats, keyed by stat name.
    pub counting: BTreeMap<String, f64>,
}

impl StatsRow {
    /// Read a counting stat, treating missing entries as zero.
    pub fn stat(&self, key: &str) -> f64 {
        self.counting.get(key).copied().unwrap_or_default()
    }
}

/// Contract terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Contract {
    /// Annual salary in thousands.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Season the contract expires after.
    pub exp: i32,
    /// Whether this is a rookie-scale contract.
    pub rookie: bool,
}

/// One season of salary paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SalaryEntry {
    /// Season year.
    pub season: i32,
    /// Amount paid, in thousands.
    #[ts(as = "String")]
    pub amount: Decimal,
}

/// A player's current injury. `games_remaining == 0` means healthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Injury {
    /// Injury description.
    pub kind: String,
    /// Games until the player is healthy.
    pub games_remaining: u32,
}

impl Injury {
    /// A healthy player.
    pub fn healthy() -> Self {
        Self {
            kind: "Healthy".to_owned(),
            games_remaining: 0,
        }
    }
}

/// A past injury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InjuryRecord {
    /// Season the injury happened.
    pub season: i32,
    /// Injury description.
    pub kind: String,
    /// Games missed.
    pub games: u32,
    /// Overall rating lost.
    pub ovr_drop: Option<u8>,
    /// Potential rating lost.
    pub pot_drop: Option<u8>,
}

/// A roster transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Transaction {
    /// Season of the transaction.
    pub season: i32,
    /// Phase of the transaction.
    pub phase: Phase,
    /// Team involved.
    pub tid: Tid,
    /// What happened.
    pub kind: TransactionKind,
}

/// An award won by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerAward {
    /// Season of the award.
    pub season: i32,
    /// Award name.
    pub kind: String,
}

/// A player record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Player ID.
    pub pid: Pid,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Birth info.
    pub born: BirthInfo,
    /// Current team, free agency, draft prospect, or retired.
    pub affiliation: Affiliation,
    /// Draft info.
    pub draft: DraftInfo,
    /// Ratings history, one row per season, oldest first.
    pub ratings: Vec<RatingsRow>,
    /// Stats history, one row per team stint, oldest first.
    pub stats: Vec<StatsRow>,
    /// Current contract (or contract demand for free agents).
    pub contract: Contract,
    /// Salary ledger.
    pub salaries: Vec<SalaryEntry>,
    /// Current injury.
    pub injury: Injury,
    /// Injury history.
    pub injuries: Vec<InjuryRecord>,
    /// Transaction history.
    pub transactions: Vec<Transaction>,
    /// Trade value combining current ability and potential.
    pub value: f64,
    /// Trade value ignoring potential.
    pub value_no_pot: f64,
    /// Consecutive games started in goal (hockey only).
    pub num_consecutive_games_g: Option<u32>,
    /// Season the player retired.
    pub retired_year: Option<i32>,
    /// Hall of fame member.
    pub hof: bool,
    /// On the user's watch list.
    pub watch: bool,
    /// Awards won.
    pub awards: Vec<PlayerAward>,
}

impl Player {
    /// Team ID if on a roster.
    pub const fn tid(&self) -> Option<Tid> {
        self.affiliation.tid()
    }

    /// Age during the given season.
    pub const fn age(&self, season: i32) -> i32 {
        season.saturating_sub(self.born.year)
    }

    /// Full display name.
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Jersey number from the most recent stats row.
    pub fn jersey_number(&self) -> Option<&str> {
        self.stats.last().and_then(|ps| ps.jersey_number.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Schedule and games
// ---------------------------------------------------------------------------

/// A game that has not been played yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScheduleGame {
    /// Game ID.
    pub gid: Gid,
    /// Day index within the season.
    pub day: u32,
    /// Home team.
    pub home_tid: Tid,
    /// Away team.
    pub away_tid: Tid,
    /// Team forced to win by god mode.
    pub force_win: Option<Tid>,
    /// Whether this is a championship round game.
    pub finals: bool,
}

/// A completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Game {
    /// Game ID.
    pub gid: Gid,
    /// Day index within the season.
    pub day: u32,
    /// Season year.
    pub season: i32,
    /// Whether this was a playoff game.
    pub playoffs: bool,
    /// Home team.
    pub home_tid: Tid,
    /// Away team.
    pub away_tid: Tid,
    /// Home team points.
    pub home_pts: u32,
    /// Away team points.
    pub away_pts: u32,
}

// ---------------------------------------------------------------------------
// Messages, head-to-heads, awards, lottery, playoffs
// ---------------------------------------------------------------------------

/// A message from the owner to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Message {
    /// Message ID; increases with time.
    pub mid: Mid,
    /// Sender.
    pub from: String,
    /// Season the message was sent.
    pub season: i32,
    /// HTML body.
    pub text: String,
    /// Whether the user has read it.
    pub read: bool,
    /// Optional subject line.
    pub subject: Option<String>,
}

/// Season results between one team and one opponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeadToHeadRecord {
    /// Wins.
    pub won: u32,
    /// Losses.
    pub lost: u32,
    /// Ties.
    pub tied: u32,
    /// Overtime losses.
    pub otl: u32,
    /// Points scored.
    pub pts: u32,
    /// Points allowed.
    pub opp_pts: u32,
    /// Playoff series won.
    pub series_won: u32,
    /// Playoff series lost.
    pub series_lost: u32,
}

/// All head-to-head records for one season.
///
/// `regular_season[tid][opp]` is stored once per pair with `tid < opp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeadToHead {
    /// Season year.
    pub season: i32,
    /// Records keyed by lower team ID, then opponent.
    pub regular_season: BTreeMap<Tid, BTreeMap<Tid, HeadToHeadRecord>>,
    /// Playoff records, same layout.
    pub playoffs: BTreeMap<Tid, BTreeMap<Tid, HeadToHeadRecord>>,
}

/// A player named for an award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AwardPlayer {
    /// Player ID.
    pub pid: Pid,
    /// Player name.
    pub name: String,
    /// Team at the time.
    pub tid: Tid,
    /// Team abbreviation, filled in by views.
    pub abbrev: Option<String>,
}

/// A team named for an award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AwardTeam {
    /// Team ID.
    pub tid: Tid,
    /// Team abbreviation, filled in by views.
    pub abbrev: Option<String>,
    /// Wins.
    pub won: u32,
    /// Losses.
    pub lost: u32,
}

/// An all-league team (first team, second team, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllLeagueTeam {
    /// Title, e.g. "First Team".
    pub title: String,
    /// Members.
    pub players: Vec<AwardPlayer>,
}

/// Season awards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Awards {
    /// Season year.
    pub season: i32,
    /// Most valuable player.
    pub mvp: Option<AwardPlayer>,
    /// Rookie of the year.
    pub roy: Option<AwardPlayer>,
    /// Defensive player of the year.
    pub dpoy: Option<AwardPlayer>,
    /// Finals most valuable player.
    pub finals_mvp: Option<AwardPlayer>,
    /// Best regular season record.
    pub best_record: Option<AwardTeam>,
    /// Best record per conference.
    pub best_record_confs: Vec<AwardTeam>,
    /// All-league teams.
    pub all_league: Vec<AllLeagueTeam>,
    /// All-rookie team.
    pub all_rookie: Vec<AwardPlayer>,
}

/// One team's row in a draft lottery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DraftLotteryEntry {
    /// Team that received the pick.
    pub tid: Tid,
    /// Team that originally owned the pick.
    pub original_tid: Tid,
    /// Resulting pick number, 1-based.
    pub pick: Option<u32>,
    /// Lottery chances.
    pub chances: u32,
    /// Wins in the lottery season.
    pub won: u32,
    /// Losses in the lottery season.
    pub lost: u32,
}

/// Results of one season's draft lottery, ordered by pre-lottery rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DraftLotteryResult {
    /// Draft year.
    pub season: i32,
    /// Lottery format name.
    pub draft_type: Option<String>,
    /// One row per lottery team.
    pub result: Vec<DraftLotteryEntry>,
    /// `probs[rank][pick]`, stored when the lottery was run.
    pub probs: Option<Vec<Vec<f64>>>,
}

/// A seeded team within a playoff matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayoffSeed {
    /// Team ID.
    pub tid: Tid,
    /// Seed, 1-based.
    pub seed: u32,
    /// Games won in the current series.
    pub won: u32,
}

/// One series in a playoff round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayoffMatchup {
    /// Higher seed, hosts game one.
    pub home: PlayoffSeed,
    /// Lower seed; `None` for a bye.
    pub away: Option<PlayoffSeed>,
}

/// Playoff bracket for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayoffSeries {
    /// Season year.
    pub season: i32,
    /// Index of the round in progress; `-1` during play-in.
    pub current_round: i32,
    /// Matchups per round.
    pub series: Vec<Vec<PlayoffMatchup>>,
}

// ---------------------------------------------------------------------------
// Narrative events
// ---------------------------------------------------------------------------

/// A narrative event shown in the news feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEvent {
    /// Unique, time-ordered ID.
    pub id: EventId,
    /// Category tag.
    pub kind: EventKind,
    /// HTML body.
    pub text: String,
    /// Teams involved.
    pub tids: Vec<Tid>,
    /// Players involved.
    pub pids: Vec<Pid>,
    /// Season the event happened.
    pub season: i32,
    /// Importance used to rank the feed.
    pub score: u32,
    /// Whether to surface a notification.
    pub show_notification: bool,
    /// Whether the notification stays until dismissed.
    pub persistent: bool,
    /// Whether the event is written to the events store.
    pub save_to_db: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Meta records
// ---------------------------------------------------------------------------

/// A locally earned achievement awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Achievement {
    /// Local row ID.
    pub aid: u32,
    /// Achievement slug.
    pub slug: String,
    /// Difficulty the achievement was earned on.
    pub difficulty: Option<String>,
}

/// Identity fields that real team info can override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamIdentity {
    /// Region.
    pub region: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Abbreviation.
    pub abbrev: Option<String>,
    /// Logo URL.
    pub img_url: Option<String>,
    /// Small logo URL.
    pub img_url_small: Option<String>,
}

/// Real-world history for one franchise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RealTeamEntry {
    /// Current identity.
    pub current: TeamIdentity,
    /// Identity overrides keyed by season.
    pub seasons: BTreeMap<i32, TeamIdentity>,
}

/// Real team info, keyed by external reference ID.
pub type RealTeamInfo = BTreeMap<String, RealTeamEntry>;

/// Cached team identity used for fast lookups by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamInfoCacheEntry {
    /// Abbreviation.
    pub abbrev: String,
    /// Whether the team is disabled.
    pub disabled: bool,
    /// Logo URL.
    pub img_url: Option<String>,
    /// Small logo URL.
    pub img_url_small: Option<String>,
    /// Name.
    pub name: String,
    /// Region.
    pub region: String,
}

impl From<&Team> for TeamInfoCacheEntry {
    fn from(t: &Team) -> Self {
        Self {
            abbrev: t.abbrev.clone(),
            disabled: t.disabled,
            img_url: t.img_url.clone(),
            img_url_small: t.img_url_small.clone(),
            name: t.name.clone(),
            region: t.region.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Replay and auto play
// ---------------------------------------------------------------------------

/// Recorded roster state of one player for a replayed season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RepeatPlayerInfo {
    /// Team at the start of the recorded season.
    pub tid: Tid,
    /// Contract at the start of the recorded season.
    pub contract: Contract,
    /// Injury at the start of the recorded season.
    pub injury: Injury,
}

/// Replay descriptor: which season is repeated and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RepeatSeason {
    /// Replay mode.
    pub kind: RepeatSeasonKind,
    /// Season being repeated.
    pub starting_season: i32,
    /// Recorded roster state keyed by player.
    pub players: BTreeMap<Pid, RepeatPlayerInfo>,
}

/// Target of a multi-season auto play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AutoPlayUntil {
    /// Season to stop in.
    pub season: i32,
    /// Phase to stop at.
    pub phase: Phase,
    /// When auto play started.
    pub start: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn budget_levels_by_item() {
        let mut budget = Budget {
            ticket_price: Decimal::new(2500, 2),
            scouting: 1,
            coaching: 2,
            health: 3,
            facilities: 4,
        };
        assert_eq!(budget.level(BudgetItem::Health), 3);
        budget.set_level(BudgetItem::Coaching, 7);
        assert_eq!(budget.coaching, 7);
    }

    #[test]
    fn player_json_uses_typed_affiliation() {
        let p = Player {
            pid: Pid::new(5),
            first_name: "Ada".to_owned(),
            last_name: "Lane".to_owned(),
            born: BirthInfo {
                year: 2000,
                loc: "Ohio".to_owned(),
            },
            affiliation: Affiliation::Team(Tid::new(2)),
            draft: DraftInfo {
                year: 2019,
                round: 1,
                pick: 4,
                tid: Some(Tid::new(2)),
                original_tid: Some(Tid::new(2)),
            },
            ratings: Vec::new(),
            stats: Vec::new(),
            contract: Contract {
                amount: Decimal::new(1500, 0),
                exp: 2026,
                rookie: false,
            },
            salaries: Vec::new(),
            injury: Injury::healthy(),
            injuries: Vec::new(),
            transactions: Vec::new(),
            value: 50.0,
            value_no_pot: 48.0,
            num_consecutive_games_g: None,
            retired_year: None,
            hof: false,
            watch: false,
            awards: Vec::new(),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["affiliation"], serde_json::json!({ "Team": 2 }));
        assert_eq!(json["contract"]["amount"], serde_json::json!("1500"));
        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back.tid(), Some(Tid::new(2)));
        assert_eq!(back.age(2025), 25);
        assert_eq!(back.jersey_number(), None);
    }

    #[test]
    fn repeat_season_players_keyed_by_pid() {
        let mut players = BTreeMap::new();
        players.insert(
            Pid::new(9),
            RepeatPlayerInfo {
                tid: Tid::new(1),
                contract: Contract {
                    amount: Decimal::new(750, 0),
                    exp: 2024,
                    rookie: true,
                },
                injury: Injury::healthy(),
            },
        );
        let rs = RepeatSeason {
            kind: RepeatSeasonKind::PlayersAndRosters,
            starting_season: 2023,
            players,
        };
        let json = serde_json::to_string(&rs).unwrap();
        let back: RepeatSeason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rs);
    }
}
