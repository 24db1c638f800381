//! Season phase transitions.
//!
//! Every transition runs against a staged [`Txn`]: an error drops the
//! staged state and nothing the transition did becomes visible.
//!
//! The preseason transition is the heavy one. Its steps run in a fixed
//! order because later steps read what earlier ones wrote: scouting is
//! measured before new season rows exist, coaching after, and jersey
//! conflicts are settled only once every player has a new stats row.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use franchise_db::{DbError, GetCopyType, LeagueStore, TeamSeasonsQuery, get_copies};
use franchise_types::{
    Affiliation, BudgetItem, EventKind, Gender, LocalUpdate, Phase, Pid, Player,
    PlayThroughInjuries, PlayoffMatchup, PlayoffSeed, PlayoffSeries, RealTeamInfo,
    RepeatSeasonKind, SalaryEntry, Sport, Team, TeamSeason, Tid, UpdateEvent,
};
use tracing::{debug, info};

use crate::attributes::REAL_TEAM_INFO_KEY;
use crate::config::LeagueConfig;
use crate::events::{EventInput, log_event};
use crate::finances::{self, DEFAULT_LEVEL};
use crate::free_agents;
use crate::league::Txn;
use crate::player;
use crate::random;
use crate::schedule::{self, ScheduleError};
use crate::team;
use crate::ui::{Conditions, UiMessage};

/// Probability that a preseason uncovers a player lying about their age.
const AGE_FRAUD_CHANCE: f64 = 0.01;

/// Population drift bounds per season.
const POP_JITTER: (f64, f64) = (0.98, 1.02);

/// Feed score of team identity and age fraud events.
const EVENT_SCORE: u32 = 20;

/// Errors raised by phase transitions.
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    /// The user's team produced no scouting level.
    #[error("scouting level missing for user team {tid}")]
    MissingScoutingLevel {
        /// The user's team.
        tid: Tid,
    },

    /// The requested phase does not follow the current one.
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current phase.
        from: Phase,
        /// Requested phase.
        to: Phase,
    },

    /// A store operation failed.
    #[error("phase store error: {source}")]
    Db {
        /// The underlying store error.
        #[from]
        source: DbError,
    },

    /// Writing the schedule failed.
    #[error("phase schedule error: {source}")]
    Schedule {
        /// The underlying schedule error.
        #[from]
        source: ScheduleError,
    },
}

/// What changed, so views know to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReturn {
    /// Update events to broadcast.
    pub update_events: Vec<UpdateEvent>,
}

/// Season and phase that follow `(season, phase)`.
pub const fn next_phase(season: i32, phase: Phase) -> (i32, Phase) {
    match phase.next_in_season() {
        Some(next) => (season, next),
        None => (season.saturating_add(1), Phase::Preseason),
    }
}

// ---------------------------------------------------------------------------
// Population smoothing
// ---------------------------------------------------------------------------

/// Population drawn for a market this preseason.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopChange {
    /// Population before the draw.
    pub old: f64,
    /// Population after the draw.
    pub new: f64,
}

/// Drift a team's population, keeping teams that share a market in sync.
///
/// If another team in the same non-empty market already drew this
/// preseason and started from the same population, this team takes the
/// same result; otherwise `jitter` supplies a fresh multiplier.
#[allow(clippy::float_cmp)]
pub fn smooth_population(
    pop: f64,
    market: &str,
    seen: &mut BTreeMap<String, PopChange>,
    jitter: impl FnOnce() -> f64,
) -> f64 {
    if !market.is_empty() {
        if let Some(change) = seen.get(market) {
            if change.old == pop {
                return change.new;
            }
        }
    }
    let new = pop * jitter();
    seen.insert(market.to_owned(), PopChange { old: pop, new });
    new
}

// ---------------------------------------------------------------------------
// Age fraud
// ---------------------------------------------------------------------------

struct Pronouns {
    he: &'static str,
    his: &'static str,
    he_title: &'static str,
}

const fn pronouns(gender: Gender) -> Pronouns {
    match gender {
        Gender::Male => Pronouns {
            he: "he",
            his: "his",
            he_title: "He",
        },
        Gender::Female => Pronouns {
            he: "she",
            his: "her",
            he_title: "She",
        },
    }
}

const fn fan_forum(sport: Sport) -> &'static str {
    match sport {
        Sport::Baseball => "baseball",
        Sport::Basketball => "nba",
        Sport::Football => "nfl",
        Sport::Hockey => "hockey",
    }
}

/// Lead-ins for the age fraud announcement; each ends where "is actually
/// N years old" continues the sentence.
fn age_fraud_reasons(name: &str, gender: Gender, sport: Sport) -> Vec<String> {
    let Pronouns { he, his, he_title } = pronouns(gender);
    vec![
        format!("A newly surfaced birth certificate shows that {name}"),
        format!(
            "At a press conference, the parents of {name} admitted to faking {his} age as a \
             child so {he} would face younger competition. {he_title}"
        ),
        format!("Fans on /r/{} found evidence that {name}", fan_forum(sport)),
        format!("Social media sleuths found evidence that {name}"),
        format!("In a televised interview, {name} admitted that {he}"),
        format!("During a locker room interview, {name} let slip that {he}"),
        format!("In an online Q&A, {name} confirmed that {he}"),
        format!("A leaked report revealed that {name}"),
        format!("An ID card found in the lost luggage of {name} showed {he}"),
    ]
}

/// Maybe reveal that one player is older than recorded.
fn age_fraud(txn: &mut Txn, players: &mut [Player], conditions: Conditions) {
    if !random::chance(&mut txn.rng, AGE_FRAUD_CHANCE) {
        return;
    }
    let season = txn.g.season;
    let candidates = {
        let refs: Vec<&Player> = players.iter().collect();
        player::fake_age_candidates(&refs, season)
    };
    let Some(&index) = random::choice(&mut txn.rng, &candidates) else {
        return;
    };
    let years = random::rand_int(&mut txn.rng, 1, 4);
    let Some(p) = players.get_mut(index) else {
        return;
    };

    let age_before = p.age(season);
    p.born.year = p.born.year.saturating_sub(years);
    let age_after = p.age(season);

    let reasons = age_fraud_reasons(&p.name(), txn.g.gender, txn.g.sport);
    let reason = random::choice(&mut txn.rng, &reasons).cloned().unwrap_or_default();

    let mut input = EventInput::new(
        EventKind::AgeFraud,
        format!(
            "{reason} is actually {age_after} years old, not {age_before} as was previously thought."
        ),
    );
    input.show_notification = p.tid() == Some(txn.g.user_tid());
    input.pids = vec![p.pid];
    input.tids = p.tid().into_iter().collect();
    input.persistent = true;
    input.score = EVENT_SCORE;
    let pid = p.pid;
    log_event(txn, input, conditions);

    info!(%pid, years, "Age fraud revealed");
}

// ---------------------------------------------------------------------------
// Preseason
// ---------------------------------------------------------------------------

/// Log the relocation, rename, or logo change of a team whose identity was
/// just updated. Only the most significant change is announced.
fn log_identity_change(txn: &mut Txn, t: &Team, old: &Team, conditions: Conditions) {
    let text = if t.region != old.region {
        (
            EventKind::TeamRelocation,
            format!(
                "The {} {} are now the {} {}.",
                old.region, old.name, t.region, t.name
            ),
        )
    } else if t.name != old.name {
        (
            EventKind::TeamRename,
            format!(
                "The {} {} are now the {} {}.",
                old.region, old.name, t.region, t.name
            ),
        )
    } else if t.img_url.is_some() && t.img_url != old.img_url {
        (
            EventKind::TeamLogo,
            format!("The {} {} got a new logo.", t.region, t.name),
        )
    } else {
        return;
    };

    let mut input = EventInput::new(text.0, text.1);
    input.tids = vec![t.tid];
    input.show_notification = false;
    input.score = EVENT_SCORE;
    log_event(txn, input, conditions);
}

/// A team's season rows from the three seasons before the current one,
/// oldest first.
async fn last_three_seasons<S: LeagueStore>(
    txn: &Txn,
    store: &S,
    tid: Tid,
) -> Result<Vec<TeamSeason>, DbError> {
    let season = txn.g.season;
    let query = TeamSeasonsQuery::Team {
        tid,
        seasons: Some((season.saturating_sub(3), season.saturating_sub(1))),
    };
    let rows = get_copies::team_seasons(&txn.cache, store, query, GetCopyType::NoCopyCache).await?;
    Ok(rows.into_iter().map(Cow::into_owned).collect())
}

/// Trailing three-season level of a budget item.
fn level_last_three(txn: &Txn, t: &Team, rows: &[TeamSeason], item: BudgetItem) -> u32 {
    let rows: Vec<&TeamSeason> = rows.iter().collect();
    finances::get_level_last_three(item, t, &rows, txn.g.num_games)
}

/// Give players who share a jersey number on one roster distinct numbers,
/// then number anyone still without one.
fn resolve_jersey_conflicts(txn: &mut Txn) {
    let mut rosters: BTreeMap<Tid, Vec<Pid>> = BTreeMap::new();
    for p in txn.cache.players.values() {
        if let Some(tid) = p.tid() {
            if !p.stats.is_empty() {
                rosters.entry(tid).or_default().push(p.pid);
            }
        }
    }

    for (tid, roster) in rosters {
        let retired: Vec<String> = txn
            .cache
            .teams
            .get(&tid)
            .map(|t| t.retired_jersey_numbers.clone())
            .unwrap_or_default();

        let mut holders: BTreeMap<String, Vec<Pid>> = BTreeMap::new();
        for pid in &roster {
            if let Some(number) = txn.cache.players.get(pid).and_then(Player::jersey_number) {
                holders.entry(number.to_owned()).or_default().push(*pid);
            }
        }

        for (number, conflicts) in holders {
            if conflicts.len() < 2 {
                continue;
            }
            let returning: Vec<Pid> = conflicts
                .iter()
                .copied()
                .filter(|pid| {
                    txn.cache.players.get(pid).is_some_and(|p| {
                        p.stats
                            .len()
                            .checked_sub(2)
                            .and_then(|i| p.stats.get(i))
                            .is_some_and(|prev| prev.tid == tid)
                    })
                })
                .collect();
            let keeper = match returning.as_slice() {
                [only] => Some(*only),
                _ => random::choice(&mut txn.rng, &conflicts).copied(),
            };

            for pid in conflicts.iter().copied().filter(|pid| Some(*pid) != keeper) {
                let fresh = assign_jersey_number(txn, &roster, pid, &retired);
                debug!(%pid, %tid, old = %number, new = ?fresh, "Jersey number conflict");
            }
        }

        for pid in &roster {
            let missing = txn
                .cache
                .players
                .get(pid)
                .is_some_and(|p| p.jersey_number().is_none());
            if missing {
                assign_jersey_number(txn, &roster, *pid, &retired);
            }
        }
    }
}

/// Give `pid` a number no teammate wears. Returns the new number.
fn assign_jersey_number(
    txn: &mut Txn,
    roster: &[Pid],
    pid: Pid,
    retired: &[String],
) -> Option<String> {
    let taken: BTreeSet<String> = roster
        .iter()
        .filter(|&&other| other != pid)
        .filter_map(|other| txn.cache.players.get(other))
        .filter_map(|p| p.jersey_number().map(str::to_owned))
        .collect();
    let number = {
        let p = txn.cache.players.get(&pid)?;
        player::gen_jersey_number(p, &taken, retired, &mut txn.rng)
    };
    let row = txn.cache.players.get_mut(&pid)?.stats.last_mut()?;
    row.jersey_number.clone_from(&number);
    number
}

/// Start a new season.
///
/// Teams get new season and stats rows, populations drift, AI budgets
/// reset, and every player in the league ages a year: new ratings and
/// development normally, or a replay of the recorded season when one is
/// active.
///
/// # Errors
///
/// Returns [`PhaseError::MissingScoutingLevel`] if the user's team is
/// missing or disabled, or a store error.
#[allow(clippy::too_many_lines)]
pub async fn new_phase_preseason<S: LeagueStore>(
    txn: &mut Txn,
    store: &S,
    config: &LeagueConfig,
    conditions: Conditions,
) -> Result<PhaseReturn, PhaseError> {
    txn.cache.schedule.clear();

    let repeat = txn.g.repeat_season.clone();
    let fixed_rosters = repeat
        .as_ref()
        .is_some_and(|r| r.kind == RepeatSeasonKind::PlayersAndRosters);
    if !fixed_rosters {
        free_agents::auto_sign(txn);
    }

    txn.g.season = txn.g.season.saturating_add(1);
    let season = txn.g.season;
    txn.send(UiMessage::UpdateLocal(LocalUpdate {
        games: Some(Vec::new()),
        ..LocalUpdate::default()
    }));

    let real_team_info: Option<RealTeamInfo> = txn
        .cache
        .attributes
        .get(&REAL_TEAM_INFO_KEY.to_owned())
        .map(|a| serde_json::from_value(a.value.clone()))
        .transpose()
        .map_err(DbError::from)?;

    let mut teams: Vec<Team> = txn.cache.teams.values().cloned().collect();
    let user_tid = txn.g.user_tid();
    let mut updated_teams = false;
    let mut scouting_level = None;
    let mut pop_changes: BTreeMap<String, PopChange> = BTreeMap::new();

    for t in &mut teams {
        if let Some(info) = &real_team_info {
            let old = t.clone();
            if team::apply_real_team_info(t, info, season) {
                updated_teams = true;
                log_identity_change(txn, t, &old, conditions);
            }
        }

        if t.disabled {
            continue;
        }

        // The user's team falls back to its latest row of the last three
        // seasons; other teams need last season's row.
        let prev = if t.tid == user_tid {
            let rows = last_three_seasons(txn, store, t.tid).await?;
            scouting_level = Some(level_last_three(txn, t, &rows, BudgetItem::Scouting));
            rows.last().cloned()
        } else {
            txn.cache
                .team_seasons
                .get(&(t.tid, season.saturating_sub(1)))
                .cloned()
        };
        let mut row = team::gen_season_row(t, prev.as_ref(), season);

        let pop = *t.pop.get_or_insert(row.pop);
        t.stadium_capacity = Some(t.stadium_capacity.unwrap_or(row.stadium_capacity));

        if !txn.g.equalize_regions {
            let market = config.regions.market(&t.region);
            let rng = &mut txn.rng;
            let new_pop = smooth_population(pop, market, &mut pop_changes, || {
                random::uniform(rng, POP_JITTER.0, POP_JITTER.1)
            });
            t.pop = Some(new_pop);
        }
        row.pop = t.pop.unwrap_or(pop);

        txn.cache.team_seasons.add(row)?;
        txn.cache.team_stats.add(team::gen_stats_row(t.tid, season, false))?;
    }

    let active: Vec<usize> = (0..teams.len())
        .filter(|&i| teams.get(i).is_some_and(|t| !t.disabled))
        .collect();
    let pop_ranks = {
        let refs: Vec<&Team> = active.iter().filter_map(|&i| teams.get(i)).collect();
        team::pop_ranks(&refs)
    };
    let num_active = active.len();
    let cap_scale = txn.g.salary_cap_scale();
    let reset_all = txn.local.auto_playing() || txn.g.spectator;
    for (&i, &rank) in active.iter().zip(&pop_ranks) {
        let Some(t) = teams.get_mut(i) else {
            continue;
        };
        if txn.g.user_tids.contains(&t.tid) && !reset_all {
            continue;
        }
        team::reset_ticket_price(t, rank, num_active, cap_scale);
        for item in BudgetItem::ALL {
            if random::chance(&mut txn.rng, 0.5) {
                t.budget
                    .set_level(item, finances::default_budget_level(rank, num_active));
            }
        }
        t.adjust_for_inflation = true;
        t.auto_ticket_price = true;
        t.keep_roster_sorted = true;
        t.play_through_injuries = PlayThroughInjuries::default();
    }

    for t in &teams {
        txn.cache.teams.put(t.clone());
    }
    if updated_teams {
        txn.g.team_info_cache = teams.iter().map(Into::into).collect();
    }

    let scouting_level = scouting_level.ok_or(PhaseError::MissingScoutingLevel { tid: user_tid })?;

    let mut coaching_levels: BTreeMap<Tid, u32> = BTreeMap::new();
    for t in &teams {
        let rows = last_three_seasons(txn, store, t.tid).await?;
        coaching_levels.insert(t.tid, level_last_three(txn, t, &rows, BudgetItem::Coaching));
    }

    let mut players: Vec<Player> = txn
        .cache
        .players
        .values()
        .filter(|p| p.affiliation.is_in_league())
        .cloned()
        .collect();

    if repeat.is_none() {
        age_fraud(txn, &mut players, conditions);
    }

    let hockey = txn.g.sport == Sport::Hockey;
    for p in &mut players {
        if hockey && p.num_consecutive_games_g.is_some() {
            p.num_consecutive_games_g = Some(0);
        }

        if let Some(repeat) = &repeat {
            if repeat.kind == RepeatSeasonKind::PlayersAndRosters {
                if let Some(recorded) = repeat.players.get(&p.pid) {
                    p.affiliation = Affiliation::Team(recorded.tid);
                    p.injury = recorded.injury.clone();
                    p.contract = recorded.contract.clone();
                    p.contract.exp = p
                        .contract
                        .exp
                        .saturating_add(season.saturating_sub(repeat.starting_season));
                    p.salaries.push(SalaryEntry {
                        season: p.contract.exp,
                        amount: p.contract.amount,
                    });
                } else {
                    p.affiliation = Affiliation::FreeAgent;
                }
            }

            // The first row of last season, before any injury rows.
            let last_season = season.saturating_sub(1);
            if let Some(mut row) = p.ratings.iter().find(|r| r.season == last_season).cloned() {
                row.season = row.season.saturating_add(1);
                p.ratings.push(row);
            }
            p.transactions.clear();
            p.born.year = p.born.year.saturating_add(1);
        } else {
            player::add_ratings_row(p, season, scouting_level, &mut txn.rng);
            let coaching = p
                .tid()
                .and_then(|tid| coaching_levels.get(&tid).copied())
                .unwrap_or(DEFAULT_LEVEL);
            player::develop(p, 1, coaching, &mut txn.rng);
        }

        if let Some(tid) = p.tid() {
            player::add_stats_row(p, tid, season, false);
        }
    }

    txn.local.player_ovr_mean_std_stale = true;
    for mut p in players {
        if repeat.is_none() {
            player::update_values(&mut p);
        }
        txn.cache.players.put(p);
    }

    if !fixed_rosters {
        free_agents::normalize_contract_demands(txn);
    }
    txn.local.min_fraction_diffs = None;

    resolve_jersey_conflicts(txn);

    if config.logging.enable_logging && !txn.local.auto_playing() {
        txn.send(UiMessage::ShowModal { conditions });
    }
    txn.g.phase = Phase::Preseason;

    info!(
        season,
        teams = teams.len(),
        players = txn.cache.players_in_league().len(),
        replay = ?repeat.as_ref().map(|r| r.kind),
        "New preseason"
    );

    Ok(PhaseReturn {
        update_events: vec![UpdateEvent::PlayerMovement],
    })
}

// ---------------------------------------------------------------------------
// Other phases
// ---------------------------------------------------------------------------

/// Home and away pairs for a round robin repeated until every team has
/// played about `num_games` games. Home and away swap every cycle.
fn round_robin(tids: &[Tid], num_games: u32) -> Vec<(Tid, Tid)> {
    let mut slots: Vec<Option<Tid>> = tids.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }
    let rounds = n.saturating_sub(1);
    let per_cycle = u32::try_from(rounds).unwrap_or(u32::MAX).max(1);
    let cycles = num_games.checked_div(per_cycle).unwrap_or(0).max(1);

    let mut pairs = Vec::new();
    for cycle in 0..cycles {
        let mut order = slots.clone();
        for _ in 0..rounds {
            let half = n / 2;
            for (a, b) in order.iter().take(half).zip(order.iter().rev().take(half)) {
                if let (Some(a), Some(b)) = (a, b) {
                    pairs.push(if cycle % 2 == 0 { (*a, *b) } else { (*b, *a) });
                }
            }
            // Circle method: the first slot stays put, the rest rotate.
            if let Some(rest) = order.get_mut(1..) {
                rest.rotate_right(1);
            }
        }
    }
    pairs
}

/// Seed the playoff bracket from regular season records and schedule the
/// first round. Returns the number of playoff teams.
fn start_playoffs(txn: &mut Txn) -> Result<usize, PhaseError> {
    let season = txn.g.season;
    let mut standings: Vec<(Tid, u32, u32)> = txn
        .cache
        .teams
        .values()
        .filter(|t| !t.disabled)
        .map(|t| {
            let record = txn.cache.team_seasons.get(&(t.tid, season));
            (t.tid, record.map_or(0, |r| r.won), record.map_or(0, |r| r.lost))
        })
        .collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));

    let rounds = u32::try_from(txn.g.num_playoff_rounds(season)).unwrap_or(0);
    let limit = 2_usize
        .checked_pow(rounds)
        .unwrap_or(usize::MAX)
        .min(standings.len());
    let mut size = 1_usize;
    while size.saturating_mul(2) <= limit {
        size = size.saturating_mul(2);
    }
    if size < 2 {
        return Ok(0);
    }

    let seeds: Vec<PlayoffSeed> = (1_u32..)
        .zip(standings.iter().take(size))
        .map(|(seed, &(tid, _, _))| PlayoffSeed { tid, seed, won: 0 })
        .collect();
    let matchups: Vec<PlayoffMatchup> = seeds
        .iter()
        .zip(seeds.iter().rev())
        .take(size / 2)
        .map(|(&home, &away)| PlayoffMatchup {
            home,
            away: Some(away),
        })
        .collect();

    for seed in &seeds {
        if let Some(row) = txn.cache.team_seasons.get_mut(&(seed.tid, season)) {
            row.playoff_rounds_won = 0;
        }
    }
    let pairs: Vec<(Tid, Tid)> = matchups
        .iter()
        .filter_map(|m| m.away.map(|away| (m.home.tid, away.tid)))
        .collect();
    txn.cache.schedule.clear();
    txn.cache.playoff_series.put(PlayoffSeries {
        season,
        current_round: 0,
        series: vec![matchups],
    });
    schedule::set_schedule(txn, &pairs)?;
    Ok(size)
}

/// Move the league to `phase`, which must follow the current phase.
///
/// # Errors
///
/// Returns [`PhaseError::InvalidTransition`] for an out-of-order phase,
/// or whatever the phase's own work fails with.
pub async fn new_phase<S: LeagueStore>(
    txn: &mut Txn,
    store: &S,
    config: &LeagueConfig,
    phase: Phase,
    conditions: Conditions,
) -> Result<PhaseReturn, PhaseError> {
    let from = txn.g.phase;
    let (_, expected) = next_phase(txn.g.season, from);
    if phase != expected {
        return Err(PhaseError::InvalidTransition { from, to: phase });
    }

    let mut update_events = Vec::new();
    match phase {
        Phase::Preseason => {
            update_events = new_phase_preseason(txn, store, config, conditions)
                .await?
                .update_events;
            txn.g.phase = phase;
        }
        Phase::RegularSeason => {
            txn.g.phase = phase;
            let tids: Vec<Tid> = txn
                .cache
                .teams
                .values()
                .filter(|t| !t.disabled)
                .map(|t| t.tid)
                .collect();
            let pairs = round_robin(&tids, txn.g.num_games);
            schedule::set_schedule(txn, &pairs)?;
        }
        Phase::Playoffs => {
            txn.g.phase = phase;
            let teams = start_playoffs(txn)?;
            debug!(teams, "Playoffs seeded");
        }
        Phase::DraftLottery => {
            txn.g.phase = phase;
            txn.cache.schedule.clear();
            txn.local.unviewed_season_summary = true;
        }
        _ => {
            txn.g.phase = phase;
        }
    }
    update_events.push(UpdateEvent::NewPhase);

    info!(season = txn.g.season, from = ?from, to = ?phase, "New phase");
    Ok(PhaseReturn { update_events })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use franchise_db::Attribute;
    use franchise_types::{
        AutoPlayUntil, Contract, Injury, RealTeamEntry, RepeatPlayerInfo, RepeatSeason,
        TeamIdentity, Transaction, TransactionKind,
    };
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing;

    #[test]
    fn shared_markets_draw_once() {
        let mut seen = BTreeMap::new();
        let a = smooth_population(10.0, "San Francisco", &mut seen, || 1.01);
        let b = smooth_population(10.0, "San Francisco", &mut seen, || 0.5);
        assert!((a - 10.1).abs() < 1e-9);
        assert!((b - 10.1).abs() < 1e-9);
    }

    #[test]
    fn different_start_or_blank_market_draws_again() {
        let mut seen = BTreeMap::new();
        smooth_population(10.0, "New York", &mut seen, || 1.01);
        let other = smooth_population(8.0, "New York", &mut seen, || 1.02);
        assert!((other - 8.16).abs() < 1e-9);

        smooth_population(5.0, "", &mut seen, || 1.01);
        let blank = smooth_population(5.0, "", &mut seen, || 0.98);
        assert!((blank - 4.9).abs() < 1e-9);
    }

    #[test]
    fn free_agency_rolls_into_next_preseason() {
        assert_eq!(next_phase(2025, Phase::FreeAgency), (2026, Phase::Preseason));
        assert_eq!(next_phase(2025, Phase::Playoffs), (2025, Phase::DraftLottery));
    }

    #[test]
    fn round_robin_pairs_everyone() {
        let tids: Vec<Tid> = (0..4).map(Tid::new).collect();
        let pairs = round_robin(&tids, 6);
        assert_eq!(pairs.len(), 12);
        for tid in &tids {
            let games = pairs.iter().filter(|(h, a)| h == tid || a == tid).count();
            assert_eq!(games, 6);
        }

        let odd: Vec<Tid> = (0..3).map(Tid::new).collect();
        assert_eq!(round_robin(&odd, 2).len(), 3);
    }

    #[tokio::test]
    async fn preseason_ages_every_player_and_keeps_markets_in_sync() {
        let (mut league, _rx) = testing::league();
        let result = league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();
        assert_eq!(
            result.update_events,
            vec![UpdateEvent::PlayerMovement, UpdateEvent::NewPhase]
        );

        let g = league.g();
        assert_eq!((g.season, g.phase), (2026, Phase::Preseason));

        let cache = league.cache();
        for tid in (0..3).map(Tid::new) {
            assert!(cache.team_seasons.contains(&(tid, 2026)));
            assert!(cache.team_stats.contains(&(tid, 2026, false)));
        }
        let pop = |tid: u32| cache.teams.get(&Tid::new(tid)).unwrap().pop.unwrap();
        assert!((pop(1) - pop(2)).abs() < f64::EPSILON);
        let row_pop = cache.team_seasons.get(&(Tid::new(1), 2026)).unwrap().pop;
        assert!((row_pop - pop(1)).abs() < f64::EPSILON);

        for p in cache.players.values() {
            assert_eq!(p.ratings.len(), 2);
            assert_eq!(p.ratings.last().unwrap().season, 2026);
            assert_eq!(p.stats.last().unwrap().season, 2026);
            assert!(p.jersey_number().is_some());
        }
        assert!(league.local().player_ovr_mean_std_stale);
    }

    #[tokio::test]
    async fn fixed_roster_replay_restores_recorded_rosters() {
        let (mut league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.repeat_season = Some(RepeatSeason {
            kind: RepeatSeasonKind::PlayersAndRosters,
            starting_season: 2024,
            players: BTreeMap::from([(
                Pid::new(0),
                RepeatPlayerInfo {
                    tid: Tid::new(1),
                    contract: Contract {
                        amount: Decimal::new(3_000, 0),
                        exp: 2025,
                        rookie: false,
                    },
                    injury: Injury::healthy(),
                },
            )]),
        });
        league.commit(txn).unwrap();

        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();

        let cache = league.cache();
        let replayed = cache.players.get(&Pid::new(0)).unwrap();
        assert_eq!(replayed.affiliation, Affiliation::Team(Tid::new(1)));
        assert_eq!(replayed.contract.exp, 2027);
        assert_eq!(
            replayed.salaries.last(),
            Some(&SalaryEntry {
                season: 2027,
                amount: Decimal::new(3_000, 0),
            })
        );
        assert_eq!(replayed.born.year, 2001);
        assert_eq!(replayed.ratings.last().unwrap().season, 2026);
        assert_eq!(replayed.stats.last().unwrap().tid, Tid::new(1));

        let unrecorded = cache.players.get(&Pid::new(1)).unwrap();
        assert_eq!(unrecorded.affiliation, Affiliation::FreeAgent);
        assert_eq!(unrecorded.stats.len(), 1);
    }

    #[tokio::test]
    async fn returning_player_keeps_contested_jersey() {
        let (mut league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.cache.players.get_mut(&Pid::new(0)).unwrap().affiliation =
            Affiliation::Team(Tid::new(1));
        let returning = txn.cache.players.get_mut(&Pid::new(2)).unwrap();
        returning.stats.last_mut().unwrap().jersey_number = Some("1".to_owned());
        league.commit(txn).unwrap();

        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();

        let jersey = |pid: u32| {
            league
                .cache()
                .players
                .get(&Pid::new(pid))
                .unwrap()
                .jersey_number()
                .map(str::to_owned)
        };
        assert_eq!(jersey(2).as_deref(), Some("1"));
        let moved = jersey(0).unwrap();
        assert_ne!(moved, "1");
        assert_ne!(Some(moved), jersey(3));
    }

    #[tokio::test]
    async fn failed_preseason_changes_nothing() {
        let (mut league, mut rx) = testing::league();
        let mut txn = league.begin();
        txn.cache.teams.get_mut(&Tid::new(0)).unwrap().disabled = true;
        league.commit(txn).unwrap();
        let before = league.g().clone();

        let err = league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseError::MissingScoutingLevel { .. }));
        assert_eq!(league.g(), &before);
        assert!(!league.cache().team_seasons.contains(&(Tid::new(1), 2026)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn out_of_order_phase_is_rejected() {
        let (mut league, _rx) = testing::league();
        let err = league
            .new_phase(Phase::Playoffs, Conditions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PhaseError::InvalidTransition {
                from: Phase::FreeAgency,
                to: Phase::Playoffs,
            }
        ));
    }

    #[tokio::test]
    async fn regular_season_then_playoffs() {
        let (mut league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.phase = Phase::Preseason;
        league.commit(txn).unwrap();

        league
            .new_phase(Phase::RegularSeason, Conditions::default())
            .await
            .unwrap();
        let schedule = league.cache().schedule.get_all();
        assert!(!schedule.is_empty());
        for tid in (0..3).map(Tid::new) {
            assert!(schedule.iter().any(|g| g.home_tid == tid || g.away_tid == tid));
        }

        let mut txn = league.begin();
        txn.g.phase = Phase::AfterTradeDeadline;
        for (tid, won) in [(0, 30), (1, 50), (2, 40)] {
            txn.cache.team_seasons.get_mut(&(Tid::new(tid), 2025)).unwrap().won = won;
        }
        league.commit(txn).unwrap();

        league
            .new_phase(Phase::Playoffs, Conditions::default())
            .await
            .unwrap();
        let series = league.cache().playoff_series.get(&2025).unwrap();
        let first = series.series.first().unwrap();
        assert_eq!(first.len(), 1);
        let matchup = first.first().unwrap();
        assert_eq!(matchup.home.tid, Tid::new(1));
        assert_eq!(matchup.away.map(|s| s.tid), Some(Tid::new(2)));

        let schedule = league.cache().schedule.get_all();
        assert_eq!(schedule.len(), 1);
        assert_eq!(
            schedule.first().map(|g| (g.home_tid, g.away_tid)),
            Some((Tid::new(1), Tid::new(2)))
        );
        let rounds_won = league
            .cache()
            .team_seasons
            .get(&(Tid::new(0), 2025))
            .unwrap()
            .playoff_rounds_won;
        assert_eq!(rounds_won, -1);
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<UiMessage>) -> Vec<UiMessage> {
        let mut msgs = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    #[tokio::test]
    async fn identity_updates_announce_one_change_and_refresh_team_cache() {
        let (mut league, _rx) = testing::league();
        let identity = |season_identity: TeamIdentity| RealTeamEntry {
            current: TeamIdentity::default(),
            seasons: BTreeMap::from([(2026, season_identity)]),
        };
        let info: RealTeamInfo = BTreeMap::from([
            (
                "BOS".to_owned(),
                identity(TeamIdentity {
                    name: Some("Pilgrims".to_owned()),
                    ..TeamIdentity::default()
                }),
            ),
            (
                "SJ".to_owned(),
                identity(TeamIdentity {
                    region: Some("Oakland".to_owned()),
                    name: Some("Blue".to_owned()),
                    abbrev: Some("OAK".to_owned()),
                    img_url: Some("oak.png".to_owned()),
                    img_url_small: None,
                }),
            ),
            (
                "GS".to_owned(),
                identity(TeamIdentity {
                    img_url: Some("gs.png".to_owned()),
                    ..TeamIdentity::default()
                }),
            ),
        ]);

        let mut txn = league.begin();
        for (tid, sr_id) in [(0, "BOS"), (1, "SJ"), (2, "GS")] {
            txn.cache.teams.get_mut(&Tid::new(tid)).unwrap().sr_id = Some(sr_id.to_owned());
        }
        txn.cache.attributes.put(Attribute {
            key: REAL_TEAM_INFO_KEY.to_owned(),
            value: serde_json::to_value(&info).unwrap(),
        });
        league.commit(txn).unwrap();

        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();

        let mut identity_events: Vec<(EventKind, Vec<Tid>, String)> = league
            .cache()
            .events
            .values()
            .filter(|e| {
                matches!(
                    e.kind,
                    EventKind::TeamRelocation | EventKind::TeamRename | EventKind::TeamLogo
                )
            })
            .map(|e| {
                assert!(!e.show_notification);
                assert_eq!(e.score, EVENT_SCORE);
                (e.kind, e.tids.clone(), e.text.clone())
            })
            .collect();
        identity_events.sort_by_key(|(_, tids, _)| tids.clone());
        assert_eq!(
            identity_events,
            vec![
                (
                    EventKind::TeamRename,
                    vec![Tid::new(0)],
                    "The Boston Team 0 are now the Boston Pilgrims.".to_owned(),
                ),
                (
                    EventKind::TeamRelocation,
                    vec![Tid::new(1)],
                    "The San Jose Team 1 are now the Oakland Blue.".to_owned(),
                ),
                (
                    EventKind::TeamLogo,
                    vec![Tid::new(2)],
                    "The Golden State Team 2 got a new logo.".to_owned(),
                ),
            ]
        );

        let cached = league.g().team_info_cache.get(1).unwrap();
        assert_eq!(cached.abbrev, "OAK");
        assert_eq!(cached.region, "Oakland");
        assert_eq!(
            league.g().team_info_cache.get(2).unwrap().img_url.as_deref(),
            Some("gs.png")
        );
        let row = league.cache().team_seasons.get(&(Tid::new(1), 2026)).unwrap();
        assert_eq!(row.abbrev, "OAK");
    }

    #[tokio::test]
    async fn ai_teams_reset_to_market_defaults_user_team_kept() {
        let (mut league, _rx) = testing::league();
        let user_before = league.cache().teams.get(&Tid::new(0)).unwrap().clone();

        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();

        let cache = league.cache();
        let user = cache.teams.get(&Tid::new(0)).unwrap();
        assert_eq!(user.budget, user_before.budget);
        assert!(!user.auto_ticket_price);
        assert!(!user.keep_roster_sorted);
        assert!(!user.adjust_for_inflation);

        // Teams 1 and 2 share a market, so they rank 2 and 3 in tid order.
        let scale = league.g().salary_cap_scale();
        for (tid, rank) in [(1, 2), (2, 3)] {
            let t = cache.teams.get(&Tid::new(tid)).unwrap();
            assert!(t.auto_ticket_price);
            assert!(t.keep_roster_sorted);
            assert!(t.adjust_for_inflation);
            assert_eq!(t.play_through_injuries, PlayThroughInjuries::default());
            assert_eq!(
                t.budget.ticket_price,
                finances::default_ticket_price(rank, 3, scale)
            );
            let default_level = finances::default_budget_level(rank, 3);
            for item in BudgetItem::ALL {
                let level = t.budget.level(item);
                assert!(level == 25 || level == default_level);
            }
        }
    }

    #[tokio::test]
    async fn auto_play_resets_user_team_and_skips_support_modal() {
        let (mut league, mut rx) = testing::league();
        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();
        assert!(
            drain(&mut rx)
                .iter()
                .any(|m| matches!(m, UiMessage::ShowModal { .. }))
        );

        let (mut league, mut rx) = testing::league();
        league.local_mut().auto_play_until = Some(AutoPlayUntil {
            season: 2030,
            phase: Phase::Preseason,
            start: Utc::now(),
        });
        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();
        let msgs = drain(&mut rx);
        assert!(
            msgs.iter()
                .any(|m| matches!(m, UiMessage::UpdateLocal(LocalUpdate { games: Some(g), .. }) if g.is_empty()))
        );
        assert!(!msgs.iter().any(|m| matches!(m, UiMessage::ShowModal { .. })));

        let user = league.cache().teams.get(&Tid::new(0)).unwrap();
        assert!(user.auto_ticket_price);
        assert!(user.keep_roster_sorted);
    }

    #[tokio::test]
    async fn equalized_regions_keep_populations() {
        let (mut league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.equalize_regions = true;
        league.commit(txn).unwrap();

        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();

        let cache = league.cache();
        for (tid, expected) in [(0, 4.5), (1, 3.0), (2, 3.0)] {
            let pop = cache.teams.get(&Tid::new(tid)).unwrap().pop.unwrap();
            assert!((pop - expected).abs() < f64::EPSILON);
            let row_pop = cache.team_seasons.get(&(Tid::new(tid), 2026)).unwrap().pop;
            assert!((row_pop - expected).abs() < f64::EPSILON);
        }
    }

    #[tokio::test]
    async fn free_roster_replay_copies_ratings_and_keeps_teams() {
        let (mut league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.repeat_season = Some(RepeatSeason {
            kind: RepeatSeasonKind::Players,
            starting_season: 2025,
            players: BTreeMap::new(),
        });
        txn.cache
            .players
            .get_mut(&Pid::new(0))
            .unwrap()
            .transactions
            .push(Transaction {
                season: 2025,
                phase: Phase::FreeAgency,
                tid: Tid::new(0),
                kind: TransactionKind::FreeAgent,
            });
        league.commit(txn).unwrap();
        let before: BTreeMap<Pid, Player> = league
            .cache()
            .players
            .values()
            .map(|p| (p.pid, p.clone()))
            .collect();

        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();

        for p in league.cache().players.values() {
            let old = before.get(&p.pid).unwrap();
            assert_eq!(p.affiliation, old.affiliation);
            assert_eq!(p.born.year, old.born.year + 1);
            assert!(p.transactions.is_empty());
            assert_eq!(p.ratings.len(), 2);

            let mut copied = old.ratings.last().unwrap().clone();
            copied.season = 2026;
            assert_eq!(p.ratings.last(), Some(&copied));
            assert_eq!(p.stats.last().unwrap().tid, old.tid().unwrap());
        }
    }

    #[tokio::test]
    async fn user_team_season_row_falls_back_to_older_history() {
        let (mut league, _rx) = testing::league();
        let cache = league.cache_mut();
        for tid in [Tid::new(0), Tid::new(1)] {
            cache.team_seasons.delete(&(tid, 2025));
            let t = cache.teams.get(&tid).unwrap().clone();
            let mut old = team::gen_season_row(&t, None, 2024);
            old.hype = 0.9;
            cache.team_seasons.put(old);
        }

        league
            .new_phase(Phase::Preseason, Conditions::default())
            .await
            .unwrap();

        let hype = |tid: u32| {
            league
                .cache()
                .team_seasons
                .get(&(Tid::new(tid), 2026))
                .unwrap()
                .hype
        };
        // Only the user's team reaches back past a missing season.
        assert!((hype(0) - 0.9).abs() < 1e-9);
        assert!((hype(1) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn age_fraud_text_uses_gendered_pronouns() {
        let reasons = age_fraud_reasons("Ana Ruiz", Gender::Female, Sport::Hockey);
        assert_eq!(reasons.len(), 9);
        assert!(reasons.iter().any(|r| r.contains("/r/hockey")));
        assert!(reasons.iter().any(|r| r.ends_with("confirmed that she")));
    }
}
