//! League spawner for seeding a fresh league.
//!
//! When the store holds no league yet, the spawner creates one: teams
//! spread over a pool of markets (shared markets included), rosters of
//! generated players with jersey numbers and contracts, and a pool of
//! free agents. Everything is drawn from an RNG seeded by the engine
//! config so a seed always produces the same league.

use std::collections::{BTreeMap, BTreeSet};

use franchise_core::attributes::GameAttributes;
use franchise_core::config::LeagueConfig;
use franchise_core::{finances, player, random, team};
use franchise_db::Cache;
use franchise_types::{
    Affiliation, BirthInfo, Budget, BudgetItem, Contract, DraftInfo, Injury, Pid,
    PlayThroughInjuries, Player, RatingsRow, Team, Tid,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Pools
// -----------------------------------------------------------------------

/// Markets teams are placed in: region, team name, abbreviation,
/// population in millions. Some regions share a market.
const TEAM_POOL: &[(&str, &str, &str, f64)] = &[
    ("New York", "Knights", "NYK", 20.1),
    ("Brooklyn", "Bridges", "BKN", 20.1),
    ("San Francisco", "Fog", "SF", 6.5),
    ("San Jose", "Sharks", "SJ", 6.5),
    ("Golden State", "Gold", "GS", 6.5),
    ("Chicago", "Whirlwind", "CHI", 9.1),
    ("Boston", "Harbor", "BOS", 4.9),
    ("Denver", "Peaks", "DEN", 2.9),
    ("Seattle", "Sound", "SEA", 4.0),
    ("Miami", "Heatwave", "MIA", 6.1),
    ("Toronto", "Northmen", "TOR", 6.2),
    ("Phoenix", "Flames", "PHX", 4.8),
];

const FIRST_NAMES: &[&str] = &[
    "Aaron", "Ben", "Carlos", "Dmitri", "Eli", "Felix", "Gus", "Hugo", "Isaac", "Jalen",
    "Kofi", "Luka", "Marcus", "Nate", "Omar", "Pau", "Quentin", "Rudy", "Sam", "Tariq",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Brooks", "Castillo", "Diallo", "Evans", "Fournier", "Green", "Holm", "Ibaka",
    "Jensen", "Kowalski", "Lopez", "Mensah", "Novak", "Okafor", "Petrov", "Reyes", "Silva",
    "Tanaka", "Vidal",
];

const POSITIONS: &[&str] = &["PG", "SG", "SF", "PF", "C"];

const ATTRS: &[&str] = &["hgt", "stre", "spd", "jmp", "endu", "ins", "dnk", "ft", "tp", "oiq", "diq"];

// -----------------------------------------------------------------------
// Result
// -----------------------------------------------------------------------

/// A freshly seeded league, ready to wrap in a `League`.
#[derive(Debug)]
pub struct SeededLeague {
    /// Game attributes.
    pub g: GameAttributes,
    /// Cache holding every seeded record, all marked for the first flush.
    pub cache: Cache,
}

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

fn gen_team(tid: Tid, entry: (&str, &str, &str, f64)) -> Team {
    let (region, name, abbrev, pop) = entry;
    Team {
        tid,
        cid: tid.get() % 2,
        did: tid.get() % 2,
        region: region.to_owned(),
        name: name.to_owned(),
        abbrev: abbrev.to_owned(),
        sr_id: None,
        img_url: None,
        img_url_small: None,
        pop: Some(pop),
        stadium_capacity: Some(25_000),
        budget: Budget {
            ticket_price: Decimal::new(2_500, 2),
            scouting: finances::DEFAULT_LEVEL,
            coaching: finances::DEFAULT_LEVEL,
            health: finances::DEFAULT_LEVEL,
            facilities: finances::DEFAULT_LEVEL,
        },
        disabled: false,
        adjust_for_inflation: true,
        auto_ticket_price: true,
        keep_roster_sorted: true,
        play_through_injuries: PlayThroughInjuries::default(),
        retired_jersey_numbers: Vec::new(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn gen_player(
    rng: &mut StdRng,
    pid: Pid,
    affiliation: Affiliation,
    season: i32,
    economics: (Decimal, Decimal),
) -> Player {
    let age = random::rand_int(rng, 19, 33);
    let attrs: BTreeMap<String, u8> = ATTRS
        .iter()
        .map(|&attr| {
            let value = random::gauss(rng, 47.0, 10.0, 30.0).round().clamp(0.0, 100.0) as u8;
            (attr.to_owned(), value)
        })
        .collect();
    let ovr = player::ovr_from_attrs(&attrs).unwrap_or(40);
    let headroom = if age < player::PEAK_AGE {
        random::uniform(rng, 0.0, 15.0)
    } else {
        0.0
    };
    let pot = (f64::from(ovr) + headroom).round().clamp(0.0, 100.0) as u8;
    let draft_year = season.saturating_sub(age).saturating_add(19);

    let (min_contract, max_contract) = economics;
    let mut p = Player {
        pid,
        first_name: random::choice(rng, FIRST_NAMES).copied().unwrap_or("Pat").to_owned(),
        last_name: random::choice(rng, LAST_NAMES).copied().unwrap_or("Doe").to_owned(),
        born: BirthInfo {
            year: season.saturating_sub(age),
            loc: String::new(),
        },
        affiliation,
        draft: DraftInfo {
            year: draft_year,
            round: 0,
            pick: 0,
            tid: None,
            original_tid: None,
        },
        ratings: vec![RatingsRow {
            season,
            ovr,
            pot,
            fuzz: 0.0,
            pos: random::choice(rng, POSITIONS).copied().unwrap_or("F").to_owned(),
            skills: Vec::new(),
            attrs,
            injury_index: None,
        }],
        stats: Vec::new(),
        contract: Contract {
            amount: min_contract,
            exp: season.saturating_add(random::rand_int(rng, 0, 3)),
            rookie: false,
        },
        salaries: Vec::new(),
        injury: Injury::healthy(),
        injuries: Vec::new(),
        transactions: Vec::new(),
        value: 0.0,
        value_no_pot: 0.0,
        num_consecutive_games_g: None,
        retired_year: None,
        hof: false,
        watch: false,
        awards: Vec::new(),
    };
    player::update_values(&mut p);

    let fraction = ((p.value - 40.0) / 40.0).clamp(0.0, 1.0);
    let spread = max_contract.checked_sub(min_contract).unwrap_or(Decimal::ZERO);
    let extra = Decimal::from_f64_retain(fraction * fraction)
        .and_then(|f| spread.checked_mul(f))
        .unwrap_or(Decimal::ZERO)
        .round_dp(0);
    p.contract.amount = min_contract.checked_add(extra).unwrap_or(min_contract);
    p
}

/// Seed a new league from `config`.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if more teams are requested than the
/// market pool holds, or [`EngineError::Db`] if a record collides.
pub fn seed_league(config: &LeagueConfig) -> Result<SeededLeague, EngineError> {
    let engine = &config.engine;
    let pool_len = u32::try_from(TEAM_POOL.len()).unwrap_or(u32::MAX);
    if engine.num_teams > pool_len || engine.num_teams < 2 {
        return Err(EngineError::Spawner {
            message: format!(
                "requested {} teams but the market pool holds 2 to {pool_len}",
                engine.num_teams
            ),
        });
    }

    let mut rng = StdRng::seed_from_u64(engine.seed);
    let mut g = GameAttributes::new(config, config.infrastructure.lid);
    let season = g.season;
    let economics = (g.min_contract, g.max_contract);

    let mut cache = Cache::new();
    let mut teams: Vec<Team> = (0_u32..)
        .zip(TEAM_POOL.iter().copied())
        .take(usize::try_from(engine.num_teams).unwrap_or(usize::MAX))
        .map(|(tid, entry)| gen_team(Tid::new(tid), entry))
        .collect();

    let ranks = {
        let refs: Vec<&Team> = teams.iter().collect();
        team::pop_ranks(&refs)
    };
    let num_teams = teams.len();
    let cap_scale = g.salary_cap_scale();
    for (t, &rank) in teams.iter_mut().zip(&ranks) {
        team::reset_ticket_price(t, rank, num_teams, cap_scale);
        for item in BudgetItem::ALL {
            t.budget
                .set_level(item, finances::default_budget_level(rank, num_teams));
        }
    }
    g.team_info_cache = teams.iter().map(Into::into).collect();

    let mut next_pid = 0_u32;
    for t in &teams {
        cache.team_seasons.add(team::gen_season_row(t, None, season))?;
        cache.team_stats.add(team::gen_stats_row(t.tid, season, false))?;

        let mut taken: BTreeSet<String> = BTreeSet::new();
        for _ in 0..engine.players_per_team {
            let mut p = gen_player(
                &mut rng,
                Pid::new(next_pid),
                Affiliation::Team(t.tid),
                season,
                economics,
            );
            next_pid = next_pid.saturating_add(1);
            p.draft.tid = Some(t.tid);
            p.draft.original_tid = Some(t.tid);
            player::add_stats_row(&mut p, t.tid, season, false);
            let number = player::gen_jersey_number(&p, &taken, &t.retired_jersey_numbers, &mut rng);
            if let Some(number) = &number {
                taken.insert(number.clone());
            }
            if let Some(row) = p.stats.last_mut() {
                row.jersey_number = number;
            }
            cache.players.add(p)?;
        }
    }
    for _ in 0..engine.free_agents {
        let p = gen_player(
            &mut rng,
            Pid::new(next_pid),
            Affiliation::FreeAgent,
            season,
            economics,
        );
        next_pid = next_pid.saturating_add(1);
        cache.players.add(p)?;
    }
    for t in teams {
        cache.teams.add(t)?;
    }
    g.save(&mut cache)?;

    info!(
        teams = num_teams,
        players = next_pid,
        season,
        seed = engine.seed,
        "League seeded"
    );

    Ok(SeededLeague { g, cache })
}
