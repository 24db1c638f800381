//! Read-side payloads the UI renders.
//!
//! Views only read league state. The one exception is [`history`], which
//! marks the season summary as viewed.

use std::collections::{BTreeMap, BTreeSet};

use franchise_db::{
    DbError, GetCopyType, LeagueStore, PlayersQuery, TeamSeasonsQuery, get_copies, get_copy,
};
use franchise_types::{
    Affiliation, AwardPlayer, AwardTeam, DraftHistoryPlayer, DraftLotteryResult,
    DraftTeamHistoryView, GodModeView, HistoryTeam, HistoryView, InjuriesView, InjuryRow,
    MultiTeamModeView, Pid, Player, RatingsRow, RetiredPlayer, RosterContinuityView,
    SeasonSelector, TeamName, Tid,
};
use tracing::debug;

use crate::attributes::GameAttributes;
use crate::league::League;

/// Abbreviation shown when a team cannot be found.
const UNKNOWN_ABBREV: &str = "???";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn abbrev_of(g: &GameAttributes, tid: Tid) -> Option<&str> {
    usize::try_from(tid.get())
        .ok()
        .and_then(|i| g.team_info_cache.get(i))
        .map(|t| t.abbrev.as_str())
}

fn tid_of(g: &GameAttributes, abbrev: &str) -> Option<Tid> {
    g.team_info_cache
        .iter()
        .position(|t| t.abbrev == abbrev)
        .and_then(|i| u32::try_from(i).ok())
        .map(Tid::new)
}

/// Abbreviation for where a player currently is.
fn affiliation_abbrev(g: &GameAttributes, affiliation: Affiliation) -> String {
    match affiliation {
        Affiliation::Team(tid) => abbrev_of(g, tid).unwrap_or(UNKNOWN_ABBREV).to_owned(),
        Affiliation::FreeAgent => "FA".to_owned(),
        Affiliation::Undrafted => "DP".to_owned(),
        Affiliation::Retired => "RET".to_owned(),
    }
}

/// The latest ratings row no later than `season`, or the first row.
fn ratings_at(p: &Player, season: i32) -> Option<&RatingsRow> {
    p.ratings
        .iter()
        .rev()
        .find(|r| r.season <= season)
        .or_else(|| p.ratings.first())
}

// ---------------------------------------------------------------------------
// Simple views
// ---------------------------------------------------------------------------

/// Whether god mode is on.
pub fn god_mode<S: LeagueStore>(league: &League<S>) -> GodModeView {
    GodModeView {
        god_mode: league.g().god_mode,
    }
}

/// Teams the user may take control of, sorted by region and name.
pub fn multi_team_mode<S: LeagueStore>(league: &League<S>) -> MultiTeamModeView {
    let g = league.g();
    let mut teams: Vec<TeamName> = league
        .cache()
        .teams
        .values()
        .filter(|t| !t.disabled)
        .map(|t| TeamName {
            tid: t.tid,
            region: t.region.clone(),
            name: t.name.clone(),
        })
        .collect();
    teams.sort_by(|a, b| a.region.cmp(&b.region).then_with(|| a.name.cmp(&b.name)));

    MultiTeamModeView {
        god_mode: g.god_mode,
        phase: g.phase,
        teams,
        user_tid: g.user_tid(),
        user_tids: g.user_tids.clone(),
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Season summary: awards, champion, and retirements.
///
/// Viewing any summary clears the unviewed season summary flag.
pub async fn history<S: LeagueStore>(
    league: &mut League<S>,
    season: i32,
) -> Result<HistoryView, DbError> {
    league.local_mut().unviewed_season_summary = false;

    let cache = league.cache();
    let store = league.store();
    let g = league.g();

    let Some(awards) = get_copy::awards(cache, store, season, GetCopyType::NoCopyCache).await? else {
        debug!(season, "No awards for season");
        return Ok(HistoryView::InvalidSeason { season });
    };
    let mut awards = awards.into_owned();

    let team_seasons =
        get_copies::team_seasons(cache, store, TeamSeasonsQuery::Season(season), GetCopyType::NoCopyCache)
            .await?;
    let abbrevs: BTreeMap<Tid, String> = team_seasons
        .iter()
        .map(|ts| (ts.tid, ts.abbrev.clone()))
        .collect();
    let lookup = |tid: Tid| {
        Some(
            abbrevs
                .get(&tid)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_ABBREV.to_owned()),
        )
    };
    let fill_player = |p: &mut AwardPlayer| p.abbrev = lookup(p.tid);
    let fill_team = |t: &mut AwardTeam| t.abbrev = lookup(t.tid);

    for p in [
        &mut awards.mvp,
        &mut awards.roy,
        &mut awards.dpoy,
        &mut awards.finals_mvp,
    ]
    .into_iter()
    .flatten()
    {
        fill_player(p);
    }
    awards.best_record.iter_mut().for_each(&fill_team);
    awards.best_record_confs.iter_mut().for_each(fill_team);
    awards
        .all_league
        .iter_mut()
        .flat_map(|team| team.players.iter_mut())
        .chain(awards.all_rookie.iter_mut())
        .for_each(fill_player);

    let rounds = i32::try_from(g.num_playoff_rounds(season)).unwrap_or(i32::MAX);
    let champ = team_seasons
        .iter()
        .find(|ts| ts.playoff_rounds_won == rounds)
        .map(|ts| HistoryTeam {
            tid: ts.tid,
            abbrev: ts.abbrev.clone(),
            region: ts.region.clone(),
            name: ts.name.clone(),
            playoff_rounds_won: ts.playoff_rounds_won,
        });

    let retired = get_copies::players(
        cache,
        store,
        PlayersQuery::RetiredYear(season),
        GetCopyType::NoCopyCache,
    )
    .await?;
    let mut retired_players: Vec<RetiredPlayer> = retired
        .iter()
        .map(|p| {
            let tid = p.stats.iter().rev().find(|s| s.season <= season).map(|s| s.tid);
            RetiredPlayer {
                pid: p.pid,
                name: p.name(),
                age: p.age(season),
                hof: p.hof,
                pos: ratings_at(p, season).map(|r| r.pos.clone()).unwrap_or_default(),
                tid,
                abbrev: tid
                    .and_then(|tid| abbrevs.get(&tid).cloned())
                    .unwrap_or_default(),
            }
        })
        .collect();
    retired_players.sort_by(|a, b| b.age.cmp(&a.age));

    Ok(HistoryView::Season {
        awards: Box::new(awards),
        champ,
        confs: g.confs.at(season).clone(),
        retired_players,
        season,
        user_tid: g.user_tid(),
    })
}

// ---------------------------------------------------------------------------
// Injuries
// ---------------------------------------------------------------------------

/// Injured players, league wide or for one team.
///
/// The current view lists players hurt right now; a past season lists
/// every injury recorded that season.
pub async fn injuries<S: LeagueStore>(
    league: &League<S>,
    abbrev: Option<&str>,
    season: SeasonSelector,
) -> Result<InjuriesView, DbError> {
    let g = league.g();
    let team_filter = abbrev.map(|a| tid_of(g, a));
    let target_season = match season {
        SeasonSelector::Current => g.season,
        SeasonSelector::Season(s) => s,
    };

    let players = get_copies::players(
        league.cache(),
        league.store(),
        PlayersQuery::All,
        GetCopyType::NoCopyCache,
    )
    .await?;

    let mut rows = Vec::new();
    for p in &players {
        let stats = p
            .stats
            .iter()
            .rev()
            .find(|s| s.season == target_season && !s.playoffs);
        let tid = match season {
            SeasonSelector::Current => p.tid(),
            SeasonSelector::Season(_) => stats.map(|s| s.tid),
        };
        if team_filter.is_some_and(|want| want.is_none() || want != tid) {
            continue;
        }
        let ratings = ratings_at(p, target_season);
        let row = |kind: &str, games: u32, ovr_drop: Option<u8>, pot_drop: Option<u8>| InjuryRow {
            pid: p.pid,
            name: p.name(),
            pos: ratings.map(|r| r.pos.clone()).unwrap_or_default(),
            tid,
            ovr: ratings.map_or(0, |r| r.ovr),
            pot: ratings.map_or(0, |r| r.pot),
            jersey_number: stats.and_then(|s| s.jersey_number.clone()),
            kind: kind.to_owned(),
            games,
            ovr_drop,
            pot_drop,
        };

        match season {
            SeasonSelector::Current => {
                if !p.affiliation.is_in_league() || p.injury.games_remaining == 0 {
                    continue;
                }
                let last = p.injuries.last();
                rows.push(row(
                    p.injury.kind.as_str(),
                    p.injury.games_remaining,
                    last.and_then(|i| i.ovr_drop),
                    last.and_then(|i| i.pot_drop),
                ));
            }
            SeasonSelector::Season(s) => {
                for injury in p.injuries.iter().filter(|i| i.season == s) {
                    rows.push(row(injury.kind.as_str(), injury.games, injury.ovr_drop, injury.pot_drop));
                }
            }
        }
    }

    Ok(InjuriesView {
        abbrev: abbrev.map(str::to_owned),
        current_season: g.season,
        season,
        injuries: rows,
        user_tid: g.user_tid(),
    })
}

// ---------------------------------------------------------------------------
// Draft history
// ---------------------------------------------------------------------------

/// Lottery rank, rank change, and pick probability of a first round pick.
fn lottery_outcome(
    p: &Player,
    result: Option<&DraftLotteryResult>,
) -> (Option<u32>, Option<i64>, Option<f64>) {
    let Some(result) = result else {
        return (None, None, None);
    };
    let Some(index) = result
        .result
        .iter()
        .position(|row| row.pick == Some(p.draft.pick))
    else {
        return (None, None, None);
    };
    let rank = u32::try_from(index).ok().map(|i| i.saturating_add(1));
    let change = rank.map(|r| i64::from(r).saturating_sub(i64::from(p.draft.pick)));
    let prob = result.probs.as_ref().and_then(|probs| {
        let pick = usize::try_from(p.draft.pick).ok()?.checked_sub(1)?;
        probs.get(index)?.get(pick).copied()
    });
    (rank, change, prob)
}

/// Every player a team drafted.
///
/// An unknown abbreviation shows the picks of whichever team the user
/// controlled in the season after each draft.
pub async fn draft_team_history<S: LeagueStore>(
    league: &League<S>,
    abbrev: &str,
) -> Result<DraftTeamHistoryView, DbError> {
    let g = league.g();
    let cache = league.cache();
    let store = league.store();
    let tid = tid_of(g, abbrev);

    let drafted = get_copies::players(cache, store, PlayersQuery::All, GetCopyType::NoCopyCache).await?;
    let mut players = Vec::new();
    for p in &drafted {
        let drafted_by = match tid {
            Some(tid) => Some(tid),
            None => Some(*g.user_tid.at(p.draft.year.saturating_add(1))),
        };
        if p.draft.tid.is_none() || p.draft.tid != drafted_by {
            continue;
        }

        let Some(current) = p.ratings.last() else {
            continue;
        };
        let Some(first) = p.ratings.first() else {
            continue;
        };
        // Earliest row with the career-high ovr.
        let peak = p
            .ratings
            .iter()
            .fold(first, |best, r| if r.ovr > best.ovr { r } else { best });
        let retired = p.affiliation == Affiliation::Retired;

        let (pre_lottery_rank, lottery_change, lottery_prob) = if p.draft.round == 1 {
            let result =
                get_copy::draft_lottery_result(cache, store, p.draft.year, GetCopyType::NoCopyCache)
                    .await?;
            lottery_outcome(p, result.as_deref())
        } else {
            (None, None, None)
        };

        players.push(DraftHistoryPlayer {
            pid: p.pid,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            draft: p.draft.clone(),
            current_age: p.age(g.season),
            current_tid: p.tid(),
            current_abbrev: affiliation_abbrev(g, p.affiliation),
            hof: p.hof,
            watch: p.watch,
            jersey_number: p.jersey_number().map(str::to_owned),
            awards: p.awards.clone(),
            current_ovr: (!retired).then_some(current.ovr),
            current_pot: (!retired).then_some(current.pot),
            current_skills: if retired { Vec::new() } else { current.skills.clone() },
            pos: current.pos.clone(),
            peak_age: peak.season.saturating_sub(p.born.year),
            peak_ovr: peak.ovr,
            peak_pot: peak.pot,
            peak_skills: peak.skills.clone(),
            career_gp: p
                .stats
                .iter()
                .filter(|s| !s.playoffs)
                .fold(0_u32, |gp, s| gp.saturating_add(s.gp)),
            pre_lottery_rank,
            lottery_change,
            lottery_prob,
        });
    }

    Ok(DraftTeamHistoryView {
        abbrev: abbrev.to_owned(),
        tid,
        players,
        user_abbrev: abbrev_of(g, g.user_tid()).map(str::to_owned),
    })
}

// ---------------------------------------------------------------------------
// Roster continuity
// ---------------------------------------------------------------------------

/// Share of each team's regular season minutes played by players who were
/// on the team the season before, for every season of the league.
///
/// Rows are seasons from the first season on; columns follow the team
/// info cache. The first season and seasons without minutes are `None`.
pub async fn roster_continuity<S: LeagueStore>(
    league: &League<S>,
) -> Result<RosterContinuityView, DbError> {
    let g = league.g();
    let players = get_copies::players(
        league.cache(),
        league.store(),
        PlayersQuery::All,
        GetCopyType::NoCopyCache,
    )
    .await?;

    // (tid, season) -> players who appeared, and minutes per player.
    let mut appeared: BTreeSet<(Tid, i32, Pid)> = BTreeSet::new();
    let mut minutes: BTreeMap<(Tid, i32), Vec<(Pid, f64)>> = BTreeMap::new();
    for p in &players {
        for s in p.stats.iter().filter(|s| !s.playoffs) {
            appeared.insert((s.tid, s.season, p.pid));
            minutes.entry((s.tid, s.season)).or_default().push((p.pid, s.min));
        }
    }

    let tids: Vec<Tid> = (0_u32..)
        .take(g.team_info_cache.len())
        .map(Tid::new)
        .collect();
    let mut seasons = Vec::new();
    let mut season = g.starting_season;
    while season <= g.season {
        let prev = season.saturating_sub(1);
        let row = tids
            .iter()
            .map(|&tid| {
                if season == g.starting_season {
                    return None;
                }
                let played = minutes.get(&(tid, season))?;
                let total: f64 = played.iter().map(|(_, min)| min).sum();
                if total <= 0.0 {
                    return None;
                }
                let returning: f64 = played
                    .iter()
                    .filter(|(pid, _)| appeared.contains(&(tid, prev, *pid)))
                    .map(|(_, min)| min)
                    .sum();
                Some(returning / total)
            })
            .collect();
        seasons.push(row);
        season = season.saturating_add(1);
    }

    Ok(RosterContinuityView {
        abbrevs: g.team_info_cache.iter().map(|t| t.abbrev.clone()).collect(),
        season: g.season,
        seasons,
        user_abbrev: abbrev_of(g, g.user_tid()).unwrap_or(UNKNOWN_ABBREV).to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use franchise_types::{Awards, DraftLotteryEntry, InjuryRecord, StatsRow};

    use super::*;
    use crate::testing;

    #[test]
    fn multi_team_mode_lists_active_teams_by_region() {
        let (mut league, _rx) = testing::league();
        league.cache_mut().teams.get_mut(&Tid::new(1)).unwrap().disabled = true;

        let view = multi_team_mode(&league);
        let regions: Vec<&str> = view.teams.iter().map(|t| t.region.as_str()).collect();
        assert_eq!(regions, vec!["Boston", "Golden State"]);
        assert_eq!(view.user_tid, Tid::new(0));
        assert!(!god_mode(&league).god_mode);
    }

    #[tokio::test]
    async fn history_without_awards_is_invalid() {
        let (mut league, _rx) = testing::league();
        league.local_mut().unviewed_season_summary = true;

        let view = history(&mut league, 2019).await.unwrap();
        assert_eq!(view, HistoryView::InvalidSeason { season: 2019 });
        assert!(!league.local().unviewed_season_summary);
    }

    #[tokio::test]
    async fn history_fills_abbrevs_and_champ() {
        let (mut league, _rx) = testing::league();
        let rounds = i32::try_from(league.g().num_playoff_rounds(2025)).unwrap();
        league
            .cache_mut()
            .team_seasons
            .get_mut(&(Tid::new(2), 2025))
            .unwrap()
            .playoff_rounds_won = rounds;
        league.cache_mut().awards.put(Awards {
            season: 2025,
            mvp: Some(AwardPlayer {
                pid: Pid::new(4),
                name: "Test Player4".to_owned(),
                tid: Tid::new(2),
                abbrev: None,
            }),
            roy: Some(AwardPlayer {
                pid: Pid::new(99),
                name: "Gone".to_owned(),
                tid: Tid::new(9),
                abbrev: None,
            }),
            dpoy: None,
            finals_mvp: None,
            best_record: None,
            best_record_confs: Vec::new(),
            all_league: Vec::new(),
            all_rookie: Vec::new(),
        });
        let retiree = league.cache_mut().players.get_mut(&Pid::new(5)).unwrap();
        retiree.affiliation = Affiliation::Retired;
        retiree.retired_year = Some(2025);

        let HistoryView::Season {
            awards,
            champ,
            retired_players,
            ..
        } = history(&mut league, 2025).await.unwrap()
        else {
            panic!("expected a season summary");
        };
        assert_eq!(awards.mvp.unwrap().abbrev.as_deref(), Some("T2"));
        assert_eq!(awards.roy.unwrap().abbrev.as_deref(), Some(UNKNOWN_ABBREV));
        assert_eq!(champ.map(|t| t.tid), Some(Tid::new(2)));
        assert_eq!(retired_players.len(), 1);
        assert_eq!(retired_players.first().unwrap().abbrev, "T2");
    }

    #[tokio::test]
    async fn injuries_current_and_past() {
        let (mut league, _rx) = testing::league();
        let hurt = league.cache_mut().players.get_mut(&Pid::new(2)).unwrap();
        hurt.injury.kind = "Sprained Ankle".to_owned();
        hurt.injury.games_remaining = 4;
        hurt.injuries.push(InjuryRecord {
            season: 2025,
            kind: "Sprained Ankle".to_owned(),
            games: 6,
            ovr_drop: Some(1),
            pot_drop: None,
        });
        let healed = league.cache_mut().players.get_mut(&Pid::new(0)).unwrap();
        healed.injuries.push(InjuryRecord {
            season: 2024,
            kind: "Bruised Knee".to_owned(),
            games: 2,
            ovr_drop: None,
            pot_drop: None,
        });

        let current = injuries(&league, None, SeasonSelector::Current).await.unwrap();
        assert_eq!(current.injuries.len(), 1);
        let row = current.injuries.first().unwrap();
        assert_eq!((row.games, row.ovr_drop), (4, Some(1)));
        assert_eq!(row.jersey_number.as_deref(), Some("3"));

        let other_team = injuries(&league, Some("T0"), SeasonSelector::Current).await.unwrap();
        assert!(other_team.injuries.is_empty());
        let unknown = injuries(&league, Some("XYZ"), SeasonSelector::Current).await.unwrap();
        assert!(unknown.injuries.is_empty());

        let past = injuries(&league, None, SeasonSelector::Season(2024)).await.unwrap();
        assert_eq!(past.injuries.len(), 1);
        assert_eq!(past.injuries.first().unwrap().kind, "Bruised Knee");
    }

    #[tokio::test]
    async fn draft_history_reports_lottery_movement() {
        let (mut league, _rx) = testing::league();
        // Player 1 was the second pick of the 2019 draft by team 0.
        league.cache_mut().draft_lottery_results.put(DraftLotteryResult {
            season: 2019,
            draft_type: None,
            result: vec![
                DraftLotteryEntry {
                    tid: Tid::new(0),
                    original_tid: Tid::new(0),
                    pick: Some(2),
                    chances: 140,
                    won: 20,
                    lost: 62,
                },
                DraftLotteryEntry {
                    tid: Tid::new(1),
                    original_tid: Tid::new(1),
                    pick: Some(1),
                    chances: 140,
                    won: 22,
                    lost: 60,
                },
            ],
            probs: Some(vec![vec![0.14, 0.134], vec![0.14, 0.134]]),
        });

        let view = draft_team_history(&league, "T0").await.unwrap();
        assert_eq!(view.tid, Some(Tid::new(0)));
        assert_eq!(view.players.len(), 2);
        let second = view.players.iter().find(|p| p.pid == Pid::new(1)).unwrap();
        assert_eq!(second.pre_lottery_rank, Some(1));
        assert_eq!(second.lottery_change, Some(-1));
        assert!((second.lottery_prob.unwrap() - 0.134).abs() < 1e-9);
        assert_eq!(second.career_gp, 82);

        let fallback = draft_team_history(&league, "???").await.unwrap();
        assert!(fallback.tid.is_none());
        assert_eq!(fallback.players.len(), 2);
    }

    #[tokio::test]
    async fn draft_history_peak_is_earliest_career_high() {
        let (mut league, _rx) = testing::league();
        let p = league.cache_mut().players.get_mut(&Pid::new(0)).unwrap();
        let mut early = p.ratings.first().unwrap().clone();
        early.season = 2020;
        early.pot = 60;
        p.ratings.insert(0, early);

        let view = draft_team_history(&league, "T0").await.unwrap();
        let drafted = view.players.iter().find(|p| p.pid == Pid::new(0)).unwrap();
        assert_eq!(drafted.peak_age, 20);
        assert_eq!(drafted.peak_ovr, 50);
        assert_eq!(drafted.peak_pot, 60);
        assert_eq!(drafted.current_pot, Some(55));
    }

    #[tokio::test]
    async fn roster_continuity_tracks_returning_minutes() {
        let (mut league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.season = 2026;
        league.commit(txn).unwrap();

        let row = |tid: u32, min: f64| StatsRow {
            season: 2026,
            tid: Tid::new(tid),
            playoffs: false,
            gp: 10,
            gs: 10,
            min,
            jersey_number: None,
            counting: BTreeMap::new(),
        };
        // Team 0 keeps player 0 and gains player 2; player 1 leaves.
        league.cache_mut().players.get_mut(&Pid::new(0)).unwrap().stats.push(row(0, 300.0));
        league.cache_mut().players.get_mut(&Pid::new(2)).unwrap().stats.push(row(0, 100.0));

        let view = roster_continuity(&league).await.unwrap();
        assert_eq!(view.seasons.len(), 2);
        assert!(view.seasons.first().unwrap().iter().all(Option::is_none));
        let latest = view.seasons.last().unwrap();
        assert!((latest.first().unwrap().unwrap() - 0.75).abs() < 1e-9);
        assert_eq!(latest.get(1), Some(&None));
        assert_eq!(view.user_abbrev, "T0");
    }
}
