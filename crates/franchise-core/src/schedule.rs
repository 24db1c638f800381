//! Schedule generation and the upcoming games shown in the top bar.

use std::collections::{BTreeMap, BTreeSet};

use franchise_db::{Cache, DbError};
use franchise_types::{
    Game, Gid, Phase, PlayoffStanding, ScheduleGame, Tid, UpcomingGame, UpcomingTeam,
};
use tracing::debug;

use crate::attributes::GameAttributes;
use crate::league::Txn;
use crate::team;
use crate::ui::UiMessage;

/// Errors raised while writing the schedule.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// A cache write failed.
    #[error("schedule store error: {source}")]
    Db {
        /// The underlying store error.
        #[from]
        source: DbError,
    },
}

/// Lay out `pairs` (home, away) over days.
///
/// Days continue after the last completed game and a new day starts
/// whenever a team would otherwise play twice in one day. Game IDs continue
/// after the highest completed game ID.
pub fn add_days_to_schedule(pairs: &[(Tid, Tid)], completed: &[&Game]) -> Vec<ScheduleGame> {
    let mut day = completed
        .iter()
        .map(|g| g.day)
        .max()
        .map_or(1, |d| d.saturating_add(1));
    let mut gid = completed
        .iter()
        .map(|g| g.gid.get())
        .max()
        .map_or(0, |g| g.saturating_add(1));

    let mut playing_today: BTreeSet<Tid> = BTreeSet::new();
    let mut games = Vec::with_capacity(pairs.len());
    for &(home_tid, away_tid) in pairs {
        if playing_today.contains(&home_tid) || playing_today.contains(&away_tid) {
            day = day.saturating_add(1);
            playing_today.clear();
        }
        playing_today.insert(home_tid);
        playing_today.insert(away_tid);

        games.push(ScheduleGame {
            gid: Gid::new(gid),
            day,
            home_tid,
            away_tid,
            force_win: None,
            finals: false,
        });
        gid = gid.saturating_add(1);
    }
    games
}

/// Whether the playoff round in progress is the last one.
pub fn is_finals(cache: &Cache, g: &GameAttributes) -> bool {
    if g.phase != Phase::Playoffs {
        return false;
    }
    let Some(series) = cache.playoff_series.get(&g.season) else {
        return false;
    };
    let last_round = g.num_playoff_rounds(g.season).saturating_sub(1);
    i32::try_from(last_round).is_ok_and(|last| series.current_round == last)
}

/// Replace the schedule with `pairs` and push the user's upcoming games.
///
/// During the playoffs, games that survive regeneration (same home and
/// away team) keep their day, game ID, and forced winner, and every game
/// is tagged as finals when the last round is in progress.
///
/// # Errors
///
/// Returns [`ScheduleError`] if a game cannot be added to the cache.
pub fn set_schedule(txn: &mut Txn, pairs: &[(Tid, Tid)]) -> Result<(), ScheduleError> {
    let playoffs = txn.g.phase == Phase::Playoffs;

    let old_games: BTreeMap<(Tid, Tid), ScheduleGame> = if playoffs {
        txn.cache
            .schedule
            .values()
            .map(|game| ((game.home_tid, game.away_tid), game.clone()))
            .collect()
    } else {
        BTreeMap::new()
    };

    txn.cache.schedule.clear();
    let finals = playoffs && is_finals(&txn.cache, &txn.g);

    let completed = txn.cache.games.get_all();
    let mut schedule = add_days_to_schedule(pairs, &completed);

    if playoffs {
        let restored: BTreeSet<Gid> = schedule
            .iter()
            .filter_map(|game| old_games.get(&(game.home_tid, game.away_tid)))
            .map(|old| old.gid)
            .collect();
        let mut next_gid = schedule
            .iter()
            .map(|game| game.gid)
            .chain(restored.iter().copied())
            .map(Gid::get)
            .max()
            .map_or(0, |g| g.saturating_add(1));
        let mut used: BTreeSet<Gid> = BTreeSet::new();

        for game in &mut schedule {
            let old = old_games
                .get(&(game.home_tid, game.away_tid))
                .filter(|old| !used.contains(&old.gid));
            if let Some(old) = old {
                used.insert(old.gid);
                game.day = old.day;
                game.gid = old.gid;
                game.force_win = old.force_win;
                game.finals = finals;
                continue;
            }
            if restored.contains(&game.gid) || used.contains(&game.gid) {
                game.gid = Gid::new(next_gid);
                next_gid = next_gid.saturating_add(1);
            }
            used.insert(game.gid);
            game.finals = finals;
        }
    }

    let num_games = schedule.len();
    for game in schedule {
        txn.cache.schedule.add(game)?;
    }

    let games = get_upcoming(&txn.cache, &txn.g, txn.g.user_tid());
    debug!(games = num_games, playoffs, finals, "Schedule set");
    txn.send(UiMessage::MergeGames(games));
    Ok(())
}

/// A team's seed and series record in the playoff round in progress.
fn playoff_standing(cache: &Cache, g: &GameAttributes, tid: Tid) -> Option<PlayoffStanding> {
    if g.phase != Phase::Playoffs {
        return None;
    }
    let series = cache.playoff_series.get(&g.season)?;
    let round = usize::try_from(series.current_round).ok()?;
    series.series.get(round)?.iter().find_map(|matchup| {
        let away = matchup.away?;
        if matchup.home.tid == tid {
            Some(PlayoffStanding {
                seed: matchup.home.seed,
                won: matchup.home.won,
                lost: away.won,
            })
        } else if away.tid == tid {
            Some(PlayoffStanding {
                seed: away.seed,
                won: away.won,
                lost: matchup.home.won,
            })
        } else {
            None
        }
    })
}

/// Scheduled games of `tid` in play order.
pub fn get_upcoming(cache: &Cache, g: &GameAttributes, tid: Tid) -> Vec<UpcomingGame> {
    let mut games: Vec<&ScheduleGame> = cache
        .schedule
        .values()
        .filter(|game| game.home_tid == tid || game.away_tid == tid)
        .collect();
    games.sort_by_key(|game| (game.day, game.gid));

    let mut ovrs: BTreeMap<Tid, u8> = BTreeMap::new();
    let mut side = |tid: Tid| UpcomingTeam {
        tid,
        ovr: *ovrs
            .entry(tid)
            .or_insert_with(|| team::roster_ovr(&cache.players_on_team(tid))),
        playoffs: playoff_standing(cache, g, tid),
    };

    games
        .into_iter()
        .map(|game| UpcomingGame {
            gid: game.gid,
            finals: game.finals,
            teams: [side(game.home_tid), side(game.away_tid)],
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use franchise_types::{PlayoffMatchup, PlayoffSeed, PlayoffSeries};

    use super::*;
    use crate::testing;

    fn tid(n: u32) -> Tid {
        Tid::new(n)
    }

    fn completed(gid: u32, day: u32) -> Game {
        Game {
            gid: Gid::new(gid),
            day,
            season: 2025,
            playoffs: false,
            home_tid: tid(0),
            away_tid: tid(1),
            home_pts: 100,
            away_pts: 90,
        }
    }

    #[test]
    fn days_continue_after_completed_games() {
        let done = completed(41, 7);
        let pairs = [(tid(0), tid(1)), (tid(2), tid(3)), (tid(1), tid(2))];
        let games = add_days_to_schedule(&pairs, &[&done]);
        let days: Vec<u32> = games.iter().map(|g| g.day).collect();
        let gids: Vec<u32> = games.iter().map(|g| g.gid.get()).collect();
        assert_eq!(days, vec![8, 8, 9]);
        assert_eq!(gids, vec![42, 43, 44]);
    }

    #[test]
    fn empty_history_starts_on_day_one() {
        let games = add_days_to_schedule(&[(tid(0), tid(1))], &[]);
        assert_eq!(games.first().map(|g| (g.day, g.gid.get())), Some((1, 0)));
    }

    fn playoffs_txn(current_round: i32) -> Txn {
        let (league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.phase = Phase::Playoffs;
        txn.g.num_games_playoff_series.set_from(txn.g.season, vec![7, 7]);
        let seed = |t: u32, seed: u32| PlayoffSeed {
            tid: tid(t),
            seed,
            won: 1,
        };
        txn.cache.playoff_series.put(PlayoffSeries {
            season: txn.g.season,
            current_round,
            series: vec![
                vec![PlayoffMatchup {
                    home: seed(0, 1),
                    away: Some(seed(1, 2)),
                }],
                vec![PlayoffMatchup {
                    home: seed(0, 1),
                    away: Some(seed(2, 2)),
                }],
            ],
        });
        txn
    }

    #[test]
    fn playoff_regeneration_keeps_day_gid_and_force_win() {
        let mut txn = playoffs_txn(0);
        txn.cache.schedule.put(ScheduleGame {
            gid: Gid::new(17),
            day: 30,
            home_tid: tid(0),
            away_tid: tid(1),
            force_win: Some(tid(1)),
            finals: false,
        });

        set_schedule(&mut txn, &[(tid(0), tid(1))]).unwrap();

        let games = txn.cache.schedule.get_all();
        assert_eq!(games.len(), 1);
        let game = games.first().unwrap();
        assert_eq!(game.gid, Gid::new(17));
        assert_eq!(game.day, 30);
        assert_eq!(game.force_win, Some(tid(1)));
        assert!(!game.finals);

        let Some(UiMessage::MergeGames(upcoming)) = txn.outbox().last() else {
            panic!("expected upcoming games");
        };
        let [home, away] = upcoming.first().unwrap().teams;
        assert_eq!(home.playoffs.map(|s| (s.seed, s.won, s.lost)), Some((1, 1, 1)));
        assert_eq!(away.tid, tid(1));
    }

    #[test]
    fn new_playoff_games_avoid_restored_gids() {
        let mut txn = playoffs_txn(1);
        txn.cache.schedule.put(ScheduleGame {
            gid: Gid::new(0),
            day: 3,
            home_tid: tid(2),
            away_tid: tid(0),
            force_win: None,
            finals: false,
        });

        set_schedule(&mut txn, &[(tid(0), tid(2)), (tid(2), tid(0))]).unwrap();

        let games = txn.cache.schedule.get_all();
        assert_eq!(games.len(), 2);
        let gids: BTreeSet<Gid> = games.iter().map(|g| g.gid).collect();
        assert_eq!(gids.len(), 2);
        assert!(games.iter().all(|g| g.finals));
        let kept = games.iter().find(|g| g.home_tid == tid(2)).unwrap();
        assert_eq!((kept.gid, kept.day), (Gid::new(0), 3));
    }

    #[test]
    fn regular_season_schedule_starts_fresh() {
        let (league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.phase = Phase::RegularSeason;
        set_schedule(&mut txn, &[(tid(0), tid(1)), (tid(2), tid(0))]).unwrap();

        let games = txn.cache.schedule.get_all();
        assert_eq!(games.len(), 2);
        assert!(games.iter().all(|g| !g.finals && g.force_win.is_none()));

        let Some(UiMessage::MergeGames(upcoming)) = txn.outbox().last() else {
            panic!("expected upcoming games");
        };
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming.iter().all(|g| g.teams.iter().all(|t| t.playoffs.is_none())));
    }
}
