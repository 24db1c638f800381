//! Enumeration types for the Franchise league simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::Tid;

// ---------------------------------------------------------------------------
// Season lifecycle
// ---------------------------------------------------------------------------

/// A named stage of the season lifecycle.
///
/// Variants are declared in calendar order so the derived [`Ord`] matches
/// the order phases occur within one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Expansion draft for newly added teams.
    ExpansionDraft,
    /// Fantasy draft where every roster is redrafted.
    FantasyDraft,
    /// Start of a new season; ratings progress and budgets reset.
    Preseason,
    /// Regular season games.
    RegularSeason,
    /// Regular season after the trade deadline has passed.
    AfterTradeDeadline,
    /// Playoff rounds.
    Playoffs,
    /// Draft lottery before the draft.
    DraftLottery,
    /// The draft itself.
    Draft,
    /// After the draft, before re-signing.
    AfterDraft,
    /// Teams re-sign their own players.
    ResignPlayers,
    /// Free agency, the last phase of a season.
    FreeAgency,
}

impl Phase {
    /// Numeric code used by saved leagues and the UI (`-2..=8`).
    pub const fn code(self) -> i8 {
        match self {
            Self::ExpansionDraft => -2,
            Self::FantasyDraft => -1,
            Self::Preseason => 0,
            Self::RegularSeason => 1,
            Self::AfterTradeDeadline => 2,
            Self::Playoffs => 3,
            Self::DraftLottery => 4,
            Self::Draft => 5,
            Self::AfterDraft => 6,
            Self::ResignPlayers => 7,
            Self::FreeAgency => 8,
        }
    }

    /// Parse a numeric phase code.
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -2 => Some(Self::ExpansionDraft),
            -1 => Some(Self::FantasyDraft),
            0 => Some(Self::Preseason),
            1 => Some(Self::RegularSeason),
            2 => Some(Self::AfterTradeDeadline),
            3 => Some(Self::Playoffs),
            4 => Some(Self::DraftLottery),
            5 => Some(Self::Draft),
            6 => Some(Self::AfterDraft),
            7 => Some(Self::ResignPlayers),
            8 => Some(Self::FreeAgency),
            _ => None,
        }
    }

    /// The phase that follows this one within the same season.
    ///
    /// Returns `None` for [`Phase::FreeAgency`]: the next phase is the
    /// preseason of the following season.
    pub const fn next_in_season(self) -> Option<Self> {
        match self {
            Self::ExpansionDraft | Self::FantasyDraft => Some(Self::RegularSeason),
            Self::Preseason => Some(Self::RegularSeason),
            Self::RegularSeason => Some(Self::AfterTradeDeadline),
            Self::AfterTradeDeadline => Some(Self::Playoffs),
            Self::Playoffs => Some(Self::DraftLottery),
            Self::DraftLottery => Some(Self::Draft),
            Self::Draft => Some(Self::AfterDraft),
            Self::AfterDraft => Some(Self::ResignPlayers),
            Self::ResignPlayers => Some(Self::FreeAgency),
            Self::FreeAgency => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Player affiliation
// ---------------------------------------------------------------------------

/// Where a player currently belongs.
///
/// Replaces the negative sentinel team IDs of saved leagues with an
/// explicit enum. `FreeAgent` and `Team` together form the set of
/// "non-retired" players processed at season boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Affiliation {
    /// On the roster of the given team.
    Team(Tid),
    /// Unsigned and available to any team.
    FreeAgent,
    /// A draft prospect not yet in the league.
    Undrafted,
    /// Retired from the league.
    Retired,
}

impl Affiliation {
    /// The team ID if the player is on a roster.
    pub const fn tid(self) -> Option<Tid> {
        match self {
            Self::Team(tid) => Some(tid),
            _ => None,
        }
    }

    /// Whether the player is a free agent or on a roster.
    pub const fn is_in_league(self) -> bool {
        matches!(self, Self::Team(_) | Self::FreeAgent)
    }
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

/// A budget expense category with an adjustable investment level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BudgetItem {
    /// Scouting; lowers rating fuzz for the user's team.
    Scouting,
    /// Coaching; improves player progression.
    Coaching,
    /// Health; speeds injury recovery.
    Health,
    /// Facilities; long-term attendance and hype.
    Facilities,
}

impl BudgetItem {
    /// All budget items in display order.
    pub const ALL: [Self; 4] = [Self::Scouting, Self::Coaching, Self::Health, Self::Facilities];
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Which parts of a recorded season are replayed by "repeat season" mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RepeatSeasonKind {
    /// Ratings are replayed, rosters move freely.
    Players,
    /// Ratings and rosters (team, contract, injury) are both replayed.
    PlayersAndRosters,
}

// ---------------------------------------------------------------------------
// Narrative events
// ---------------------------------------------------------------------------

/// Category tag of a narrative event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// A team moved to a new region.
    TeamRelocation,
    /// A team changed its name in the same region.
    TeamRename,
    /// A team changed its logo.
    TeamLogo,
    /// A player was revealed to be older than recorded.
    AgeFraud,
    /// A free agent signed with a team.
    FreeAgent,
    /// A user-facing error notice.
    Error,
}

/// Kind of roster transaction recorded on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TransactionKind {
    /// Selected in the draft.
    Draft,
    /// Signed as a free agent.
    FreeAgent,
    /// Re-signed by the same team.
    ReSigned,
    /// Moved in a trade.
    Trade,
    /// Released to free agency.
    Release,
}

// ---------------------------------------------------------------------------
// League flavor
// ---------------------------------------------------------------------------

/// The sport a league is simulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Sport {
    /// Baseball.
    Baseball,
    /// Basketball.
    #[default]
    Basketball,
    /// American football.
    Football,
    /// Ice hockey.
    Hockey,
}

impl Sport {
    /// Lowercase identifier sent to the account API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Baseball => "baseball",
            Self::Basketball => "basketball",
            Self::Football => "football",
            Self::Hockey => "hockey",
        }
    }
}

/// Gender of the simulated players, used for pronouns in generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Gender {
    /// Male league.
    #[default]
    Male,
    /// Female league.
    Female,
}

/// Which views need to refresh after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum UpdateEvent {
    /// The view is rendering for the first time.
    FirstRun,
    /// Game attributes changed.
    GameAttributes,
    /// The phase changed.
    NewPhase,
    /// Games were simulated.
    GameSim,
    /// Players changed teams, ratings, or contracts.
    PlayerMovement,
    /// Account status changed.
    Account,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_codes_round_trip() {
        for code in -2..=8 {
            let phase = Phase::from_code(code);
            assert!(phase.is_some(), "code {code} has no phase");
            assert_eq!(phase.map(Phase::code), Some(code));
        }
        assert_eq!(Phase::from_code(9), None);
    }

    #[test]
    fn phase_order_follows_calendar() {
        assert!(Phase::Preseason < Phase::RegularSeason);
        assert!(Phase::Playoffs < Phase::FreeAgency);
        assert_eq!(Phase::FreeAgency.next_in_season(), None);
        assert_eq!(Phase::Playoffs.next_in_season(), Some(Phase::DraftLottery));
    }

    #[test]
    fn affiliation_membership() {
        assert!(Affiliation::Team(Tid::new(3)).is_in_league());
        assert!(Affiliation::FreeAgent.is_in_league());
        assert!(!Affiliation::Retired.is_in_league());
        assert!(!Affiliation::Undrafted.is_in_league());
        assert_eq!(Affiliation::Team(Tid::new(3)).tid(), Some(Tid::new(3)));
        assert_eq!(Affiliation::FreeAgent.tid(), None);
    }
}
