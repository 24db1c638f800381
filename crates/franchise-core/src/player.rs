//! Player rules: yearly ratings, development, value, stats rows, jersey
//! numbers, and the hall of fame test.

use std::collections::BTreeSet;

use franchise_types::{Player, StatsRow, Tid};
use rand::Rng;

use crate::finances::level_to_effect;
use crate::random;

/// Highest jersey number handed out.
const MAX_JERSEY_NUMBER: u32 = 99;

/// Age at which potential stops mattering.
pub const PEAK_AGE: i32 = 29;

/// Youngest and oldest players whose age can be revealed as fraudulent.
const FAKE_AGE_RANGE: core::ops::RangeInclusive<i32> = 19..=30;

/// Rating fuzz for a given scouting level. Better scouting, less fuzz.
pub fn gen_fuzz<R: Rng + ?Sized>(scouting_level: u32, rng: &mut R) -> f64 {
    let badness = (1.0 - level_to_effect(scouting_level)) / 2.0;
    let cutoff = 2.0 + 8.0 * badness;
    let sigma = 1.0 + 2.0 * badness;
    random::gauss(rng, 0.0, sigma, cutoff)
}

/// Append a ratings row for `season`, copied from the latest one with
/// fresh fuzz. Players without ratings are left alone.
pub fn add_ratings_row<R: Rng + ?Sized>(p: &mut Player, season: i32, scouting_level: u32, rng: &mut R) {
    let Some(last) = p.ratings.last() else {
        return;
    };
    let mut row = last.clone();
    row.season = season;
    row.fuzz = (row.fuzz + gen_fuzz(scouting_level, rng)) / 2.0;
    row.injury_index = None;
    p.ratings.push(row);
}

/// Average yearly rating change at a given age, before coaching and noise.
const fn base_change(age: i32) -> f64 {
    match age {
        ..=21 => 2.0,
        22..=25 => 1.0,
        26..=27 => 0.0,
        28..=29 => -1.0,
        30..=31 => -2.0,
        _ => -3.0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_rating(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Overall rating from individual attributes.
#[allow(clippy::cast_precision_loss)]
pub fn ovr_from_attrs(attrs: &std::collections::BTreeMap<String, u8>) -> Option<u8> {
    if attrs.is_empty() {
        return None;
    }
    let sum: f64 = attrs.values().map(|&v| f64::from(v)).sum();
    Some(to_rating(sum / attrs.len() as f64))
}

/// Develop the latest ratings row by `years` years.
///
/// Young players improve and old players decline; coaching shifts every
/// step by up to one point either way.
pub fn develop<R: Rng + ?Sized>(p: &mut Player, years: u32, coaching_level: u32, rng: &mut R) {
    let born = p.born.year;
    let Some(row) = p.ratings.last_mut() else {
        return;
    };
    let coaching = level_to_effect(coaching_level);

    for year in 0..years {
        // Oldest development step last.
        let offset = i32::try_from(years.saturating_sub(year).saturating_sub(1)).unwrap_or(0);
        let age = row.season.saturating_sub(born).saturating_sub(offset);
        let change = base_change(age) + coaching;

        if row.attrs.is_empty() {
            row.ovr = to_rating(f64::from(row.ovr) + change + random::gauss(rng, 0.0, 2.0, 6.0));
        } else {
            for value in row.attrs.values_mut() {
                *value = to_rating(f64::from(*value) + change + random::gauss(rng, 0.0, 2.0, 6.0));
            }
            if let Some(ovr) = ovr_from_attrs(&row.attrs) {
                row.ovr = ovr;
            }
        }

        row.pot = if age >= PEAK_AGE {
            row.ovr
        } else {
            row.pot.max(row.ovr)
        };
    }
}

/// Recompute trade value from the latest ratings.
pub fn update_values(p: &mut Player) {
    let Some(row) = p.ratings.last() else {
        return;
    };
    let ovr = f64::from(row.ovr);
    let pot = f64::from(row.pot);
    let age = p.age(row.season);
    let pot_weight = (f64::from(PEAK_AGE.saturating_sub(age)) / 10.0).clamp(0.0, 1.0) * 0.5;
    p.value = ovr * (1.0 - pot_weight) + pot * pot_weight;
    p.value_no_pot = ovr;
}

/// Append a zeroed stats row with the player's previous jersey number.
///
/// Jersey conflicts with new teammates are left for the caller.
pub fn add_stats_row(p: &mut Player, tid: Tid, season: i32, playoffs: bool) {
    let jersey_number = p.jersey_number().map(str::to_owned);
    p.stats.push(StatsRow {
        season,
        tid,
        playoffs,
        gp: 0,
        gs: 0,
        min: 0.0,
        jersey_number,
        counting: std::collections::BTreeMap::new(),
    });
}

/// Pick a jersey number not in `taken` and not retired by the team.
///
/// The player's own previous numbers are preferred, most recent first.
/// Returns `None` when every number is in use.
pub fn gen_jersey_number<R: Rng + ?Sized>(
    p: &Player,
    taken: &BTreeSet<String>,
    retired: &[String],
    rng: &mut R,
) -> Option<String> {
    let free = |n: &str| !taken.contains(n) && !retired.iter().any(|r| r == n);

    let previous = p
        .stats
        .iter()
        .rev()
        .filter_map(|ps| ps.jersey_number.as_deref())
        .find(|n| free(n));
    if let Some(n) = previous {
        return Some(n.to_owned());
    }

    let available: Vec<String> = (0..=MAX_JERSEY_NUMBER)
        .map(|n| n.to_string())
        .filter(|n| free(n))
        .collect();
    random::choice(rng, &available).cloned()
}

/// Indices of players whose age could plausibly be revealed as fake.
pub fn fake_age_candidates(players: &[&Player], season: i32) -> Vec<usize> {
    players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.affiliation.is_in_league() && FAKE_AGE_RANGE.contains(&p.age(season)))
        .map(|(i, _)| i)
        .collect()
}

/// Stat keys the hockey hall of fame score reads.
mod hockey_stats {
    pub const EV_G: &str = "ev_g";
    pub const PP_G: &str = "pp_g";
    pub const SH_G: &str = "sh_g";
    pub const EV_A: &str = "ev_a";
    pub const PP_A: &str = "pp_a";
    pub const SH_A: &str = "sh_a";
    pub const OPS: &str = "ops";
    pub const DPS: &str = "dps";
    pub const GPS: &str = "gps";
}

/// Hockey hall of fame test.
///
/// Career score sums points over 25 plus offensive, defensive, and goalie
/// point shares per stats row. Players whose careers began before the
/// league's first season get their first-row score credited for each
/// missing season beyond five after the draft. `scale` is the season
/// length scale factor.
pub fn made_hof_hockey(p: &Player, starting_season: i32, scale: f64, hof_factor: f64) -> bool {
    use hockey_stats::{DPS, EV_A, EV_G, GPS, OPS, PP_A, PP_G, SH_A, SH_G};

    let mut earliest_season = i32::MAX;
    let mut score = 0.0;
    let mut score_first_season = None;
    for ps in &p.stats {
        let goals = ps.stat(EV_G) + ps.stat(PP_G) + ps.stat(SH_G);
        let assists = ps.stat(EV_A) + ps.stat(PP_A) + ps.stat(SH_A);
        score += (goals + assists) / 25.0 + ps.stat(OPS) + ps.stat(DPS) + 0.775 * ps.stat(GPS);
        if score_first_season.is_none() {
            score_first_season = Some(score);
        }
        earliest_season = earliest_season.min(ps.season);
    }

    let Some(first) = score_first_season else {
        return false;
    };

    let fudge_seasons = earliest_season
        .min(starting_season)
        .saturating_sub(p.draft.year)
        .saturating_sub(5);
    if fudge_seasons > 0 {
        score += first * f64::from(fudge_seasons);
    }

    score > 100.0 * scale * hof_factor
}
