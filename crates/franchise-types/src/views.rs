//! Payloads sent to the UI: view data, local state updates, and the top
//! menu account summary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Phase;
use crate::ids::{Gid, Pid, Tid};
use crate::structs::{Awards, DraftInfo, PlayerAward};

// ---------------------------------------------------------------------------
// Local state and schedule projections
// ---------------------------------------------------------------------------

/// A team's current playoff standing, shown next to upcoming games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayoffStanding {
    /// Seed, 1-based.
    pub seed: u32,
    /// Wins in the current series.
    pub won: u32,
    /// Losses in the current series.
    pub lost: u32,
}

/// One side of an upcoming game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpcomingTeam {
    /// Team ID.
    pub tid: Tid,
    /// Team overall rating.
    pub ovr: u8,
    /// Playoff standing, during the playoffs only.
    pub playoffs: Option<PlayoffStanding>,
}

/// A trimmed scheduled game pushed to the top bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpcomingGame {
    /// Game ID.
    pub gid: Gid,
    /// Whether this is a championship round game.
    pub finals: bool,
    /// Home team then away team.
    pub teams: [UpcomingTeam; 2],
}

/// Partial update of the UI's local state. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocalUpdate {
    /// Replacement list of upcoming games.
    pub games: Option<Vec<UpcomingGame>>,
    /// Account email.
    pub email: Option<String>,
    /// Whether the account has an active subscription.
    pub gold: Option<bool>,
    /// Account username.
    pub username: Option<String>,
}

/// Account summary returned by the account check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartialTopMenu {
    /// Account email, empty when anonymous.
    pub email: String,
    /// Whether the subscription was cancelled.
    pub gold_cancelled: bool,
    /// Subscription expiry as a Unix timestamp.
    pub gold_until: i64,
    /// Account username, empty when anonymous.
    pub username: String,
    /// Whether the user is on the mailing list.
    pub mailing_list: bool,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// God mode toggle view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GodModeView {
    /// Whether god mode is on.
    pub god_mode: bool,
}

/// Team name row for team pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamName {
    /// Team ID.
    pub tid: Tid,
    /// Region.
    pub region: String,
    /// Name.
    pub name: String,
}

/// Multi team mode view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MultiTeamModeView {
    /// Whether god mode is on.
    pub god_mode: bool,
    /// Current phase.
    pub phase: Phase,
    /// Active teams.
    pub teams: Vec<TeamName>,
    /// Team currently being controlled.
    pub user_tid: Tid,
    /// All user-controlled teams.
    pub user_tids: Vec<Tid>,
}

/// A conference name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Conf {
    /// Conference index.
    pub cid: u32,
    /// Display name.
    pub name: String,
}

/// A team as it was during a historical season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HistoryTeam {
    /// Team ID.
    pub tid: Tid,
    /// Abbreviation that season.
    pub abbrev: String,
    /// Region that season.
    pub region: String,
    /// Name that season.
    pub name: String,
    /// Playoff rounds won that season.
    pub playoff_rounds_won: i32,
}

/// A player who retired after a historical season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RetiredPlayer {
    /// Player ID.
    pub pid: Pid,
    /// Full name.
    pub name: String,
    /// Age in the retirement season.
    pub age: i32,
    /// Hall of fame member.
    pub hof: bool,
    /// Position from the last ratings row.
    pub pos: String,
    /// Last team played for.
    pub tid: Option<Tid>,
    /// Abbreviation of the last team, or "FA".
    pub abbrev: String,
}

/// Season summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum HistoryView {
    /// No awards were recorded for the requested season.
    InvalidSeason {
        /// Requested season.
        season: i32,
    },
    /// Summary of a completed season.
    Season {
        /// Season awards with team abbreviations filled in.
        awards: Box<Awards>,
        /// The champion, if the playoffs finished.
        champ: Option<HistoryTeam>,
        /// Conferences that season.
        confs: Vec<Conf>,
        /// Players who retired after the season, oldest first.
        retired_players: Vec<RetiredPlayer>,
        /// Season year.
        season: i32,
        /// User's team.
        user_tid: Tid,
    },
}

/// Which season the injuries view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SeasonSelector {
    /// Current injuries.
    Current,
    /// Injuries recorded during a past season.
    Season(i32),
}

/// One injury row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InjuryRow {
    /// Player ID.
    pub pid: Pid,
    /// Full name.
    pub name: String,
    /// Position.
    pub pos: String,
    /// Team.
    pub tid: Option<Tid>,
    /// Overall rating.
    pub ovr: u8,
    /// Potential rating.
    pub pot: u8,
    /// Jersey number.
    pub jersey_number: Option<String>,
    /// Injury description.
    pub kind: String,
    /// Games remaining (current) or games missed (past).
    pub games: u32,
    /// Overall rating lost.
    pub ovr_drop: Option<u8>,
    /// Potential rating lost.
    pub pot_drop: Option<u8>,
}

/// Injuries view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InjuriesView {
    /// Team filter, or `None` for all teams.
    pub abbrev: Option<String>,
    /// Current season.
    pub current_season: i32,
    /// Season covered.
    pub season: SeasonSelector,
    /// Injury rows.
    pub injuries: Vec<InjuryRow>,
    /// User's team.
    pub user_tid: Tid,
}

/// One drafted player in the draft history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DraftHistoryPlayer {
    /// Player ID.
    pub pid: Pid,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Draft info.
    pub draft: DraftInfo,
    /// Current age.
    pub current_age: i32,
    /// Current team.
    pub current_tid: Option<Tid>,
    /// Current team abbreviation, or "FA" / "RET".
    pub current_abbrev: String,
    /// Hall of fame member.
    pub hof: bool,
    /// On the watch list.
    pub watch: bool,
    /// Most recent jersey number.
    pub jersey_number: Option<String>,
    /// Awards won.
    pub awards: Vec<PlayerAward>,
    /// Current overall, hidden for retired players.
    pub current_ovr: Option<u8>,
    /// Current potential, hidden for retired players.
    pub current_pot: Option<u8>,
    /// Current skills, empty for retired players.
    pub current_skills: Vec<String>,
    /// Current position.
    pub pos: String,
    /// Age at peak overall.
    pub peak_age: i32,
    /// Peak overall.
    pub peak_ovr: u8,
    /// Potential at peak.
    pub peak_pot: u8,
    /// Skills at peak.
    pub peak_skills: Vec<String>,
    /// Career regular season games played.
    pub career_gp: u32,
    /// Rank before the lottery, first round only.
    pub pre_lottery_rank: Option<u32>,
    /// Positions moved by the lottery (positive means moved up).
    pub lottery_change: Option<i64>,
    /// Probability of landing the actual pick, when stored.
    pub lottery_prob: Option<f64>,
}

/// Draft history view for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DraftTeamHistoryView {
    /// Team abbreviation requested.
    pub abbrev: String,
    /// Team, or `None` for "whichever team the user controlled".
    pub tid: Option<Tid>,
    /// Drafted players.
    pub players: Vec<DraftHistoryPlayer>,
    /// User's team abbreviation.
    pub user_abbrev: Option<String>,
}

/// Roster continuity view: share of minutes played by returning players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RosterContinuityView {
    /// Column headers, one per team.
    pub abbrevs: Vec<String>,
    /// Most recent season; row `i` is `season - i`.
    pub season: i32,
    /// `seasons[i][team]`, `None` where there is no prior season to compare.
    pub seasons: Vec<Vec<Option<f64>>>,
    /// User's team abbreviation.
    pub user_abbrev: String,
}
