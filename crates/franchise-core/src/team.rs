//! Team rules: new season rows, market ranks, ticket prices, team rating.

use std::collections::BTreeMap;

use franchise_types::{
    ExpenseLevels, Player, RealTeamInfo, Team, TeamIdentity, TeamSeason, TeamStats, Tid,
};
use rust_decimal::Decimal;

use crate::finances;

/// Stadium capacity of a team that never set one.
pub const DEFAULT_STADIUM_CAPACITY: u32 = 25_000;

/// Population, in millions, of a team that never set one.
pub const DEFAULT_POP: f64 = 1.0;

/// Hype of a team without history.
const DEFAULT_HYPE: f64 = 0.5;

/// Rating assumed for empty roster spots when rating a team.
const REPLACEMENT_OVR: f64 = 20.0;

/// Roster spots that count toward the team rating.
const OVR_DEPTH: usize = 10;

/// New season row for `t`, carrying hype, population, and stadium
/// capacity over from `prev` when there is one.
pub fn gen_season_row(t: &Team, prev: Option<&TeamSeason>, season: i32) -> TeamSeason {
    TeamSeason {
        tid: t.tid,
        season,
        cid: t.cid,
        did: t.did,
        region: t.region.clone(),
        name: t.name.clone(),
        abbrev: t.abbrev.clone(),
        img_url: t.img_url.clone(),
        pop: prev.map(|ps| ps.pop).or(t.pop).unwrap_or(DEFAULT_POP),
        stadium_capacity: prev
            .map(|ps| ps.stadium_capacity)
            .or(t.stadium_capacity)
            .unwrap_or(DEFAULT_STADIUM_CAPACITY),
        gp: 0,
        gp_home: 0,
        won: 0,
        lost: 0,
        tied: 0,
        otl: 0,
        playoff_rounds_won: -1,
        hype: prev.map_or(DEFAULT_HYPE, |ps| ps.hype),
        expense_levels: ExpenseLevels::default(),
        revenue: Decimal::ZERO,
        expenses: Decimal::ZERO,
    }
}

/// Zeroed stats row.
pub const fn gen_stats_row(tid: Tid, season: i32, playoffs: bool) -> TeamStats {
    TeamStats {
        tid,
        season,
        playoffs,
        gp: 0,
        counting: BTreeMap::new(),
    }
}

/// Population rank of each team, 1 for the largest market. Ties keep
/// input order.
pub fn pop_ranks(teams: &[&Team]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..teams.len()).collect();
    order.sort_by(|&a, &b| {
        let pop = |i: usize| teams.get(i).and_then(|t| t.pop).unwrap_or(DEFAULT_POP);
        pop(b).total_cmp(&pop(a))
    });

    let mut ranks = vec![0_u32; teams.len()];
    for (rank, i) in (1_u32..).zip(order) {
        if let Some(slot) = ranks.get_mut(i) {
            *slot = rank;
        }
    }
    ranks
}

/// Reset the ticket price to the default for the team's market.
pub fn reset_ticket_price(
    t: &mut Team,
    pop_rank: u32,
    num_active_teams: usize,
    salary_cap_scale: Decimal,
) {
    t.budget.ticket_price =
        finances::default_ticket_price(pop_rank, num_active_teams, salary_cap_scale);
}

/// Apply the real-world identity `t` had in exactly `season`, if known.
///
/// Returns whether any field changed.
pub fn apply_real_team_info(t: &mut Team, info: &RealTeamInfo, season: i32) -> bool {
    let Some(identity) = t
        .sr_id
        .as_ref()
        .and_then(|id| info.get(id))
        .and_then(|entry| entry.seasons.get(&season))
    else {
        return false;
    };
    let TeamIdentity {
        region,
        name,
        abbrev,
        img_url,
        img_url_small,
    } = identity.clone();

    let before = (
        t.region.clone(),
        t.name.clone(),
        t.abbrev.clone(),
        t.img_url.clone(),
        t.img_url_small.clone(),
    );
    if let Some(region) = region {
        t.region = region;
    }
    if let Some(name) = name {
        t.name = name;
    }
    if let Some(abbrev) = abbrev {
        t.abbrev = abbrev;
    }
    if img_url.is_some() {
        t.img_url = img_url;
    }
    if img_url_small.is_some() {
        t.img_url_small = img_url_small;
    }
    before
        != (
            t.region.clone(),
            t.name.clone(),
            t.abbrev.clone(),
            t.img_url.clone(),
            t.img_url_small.clone(),
        )
}

/// Team rating from its players' ratings, 0 to 100.
///
/// The best [`OVR_DEPTH`] players count, with exponentially decaying
/// weight down the depth chart.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn ovr(ratings: &[u8]) -> u8 {
    let mut sorted: Vec<f64> = ratings.iter().map(|&r| f64::from(r)).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut weighted = 0.0;
    for i in 0..OVR_DEPTH {
        let rating = sorted.get(i).copied().unwrap_or(REPLACEMENT_OVR);
        weighted += 0.4417 * (-0.1905 * i as f64).exp() * rating;
    }
    let predicted_mov = -124.13 + weighted;
    let ovr = (predicted_mov * 50.0) / 15.0 + 50.0;
    ovr.round().clamp(0.0, 100.0) as u8
}

/// Rating of the team whose roster is `players`.
pub fn roster_ovr(players: &[&Player]) -> u8 {
    let ratings: Vec<u8> = players
        .iter()
        .filter_map(|p| p.ratings.last().map(|r| r.ovr))
        .collect();
    ovr(&ratings)
}
