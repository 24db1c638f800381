//! Small league fixtures shared by unit tests.

use std::collections::BTreeMap;

use franchise_db::{Cache, MemoryLeagueStore};
use franchise_types::{
    Affiliation, BirthInfo, Budget, Contract, DraftInfo, Injury, Phase, Pid,
    PlayThroughInjuries, Player, RatingsRow, StatsRow, Team, Tid,
};
use rust_decimal::Decimal;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::attributes::GameAttributes;
use crate::config::LeagueConfig;
use crate::league::League;
use crate::team;
use crate::ui::{UiBridge, UiMessage};

pub const SEASON: i32 = 2025;

const REGIONS: [(&str, f64); 3] = [("Boston", 4.5), ("San Jose", 3.0), ("Golden State", 3.0)];

pub fn team(tid: u32, region: &str, pop: f64) -> Team {
    Team {
        tid: Tid::new(tid),
        cid: 0,
        did: 0,
        region: region.to_owned(),
        name: format!("Team {tid}"),
        abbrev: format!("T{tid}"),
        sr_id: None,
        img_url: None,
        img_url_small: None,
        pop: Some(pop),
        stadium_capacity: Some(25_000),
        budget: Budget {
            ticket_price: Decimal::new(2500, 2),
            scouting: 25,
            coaching: 25,
            health: 25,
            facilities: 25,
        },
        disabled: false,
        adjust_for_inflation: false,
        auto_ticket_price: false,
        keep_roster_sorted: false,
        play_through_injuries: PlayThroughInjuries::default(),
        retired_jersey_numbers: Vec::new(),
    }
}

pub fn player(pid: u32, affiliation: Affiliation) -> Player {
    let tid = affiliation.tid();
    Player {
        pid: Pid::new(pid),
        first_name: "Test".to_owned(),
        last_name: format!("Player{pid}"),
        born: BirthInfo {
            year: 2000,
            loc: "Nowhere".to_owned(),
        },
        affiliation,
        draft: DraftInfo {
            year: 2019,
            round: 1,
            pick: pid.saturating_add(1),
            tid,
            original_tid: tid,
        },
        ratings: vec![RatingsRow {
            season: SEASON,
            ovr: 50,
            pot: 55,
            fuzz: 0.0,
            pos: "F".to_owned(),
            skills: Vec::new(),
            attrs: BTreeMap::from([("hgt".to_owned(), 50), ("spd".to_owned(), 50)]),
            injury_index: None,
        }],
        stats: tid
            .map(|tid| StatsRow {
                season: SEASON,
                tid,
                playoffs: false,
                gp: 82,
                gs: 40,
                min: 1800.0,
                jersey_number: Some(pid.saturating_add(1).to_string()),
                counting: BTreeMap::new(),
            })
            .into_iter()
            .collect(),
        contract: Contract {
            amount: Decimal::new(5_000, 0),
            exp: 2027,
            rookie: false,
        },
        salaries: Vec::new(),
        injury: Injury::healthy(),
        injuries: Vec::new(),
        transactions: Vec::new(),
        value: 50.0,
        value_no_pot: 50.0,
        num_consecutive_games_g: None,
        retired_year: None,
        hof: false,
        watch: false,
        awards: Vec::new(),
    }
}

/// Three teams with two players each, in free agency of 2025, with the
/// user on team 0. Teams 1 and 2 share a market.
pub fn league() -> (League<MemoryLeagueStore>, UnboundedReceiver<UiMessage>) {
    let config = LeagueConfig::default();
    let mut g = GameAttributes::new(&config, 1);
    g.season = SEASON;
    g.phase = Phase::FreeAgency;

    let mut cache = Cache::new();
    let teams: Vec<Team> = (0_u32..)
        .zip(REGIONS)
        .map(|(tid, (region, pop))| team(tid, region, pop))
        .collect();
    g.team_info_cache = teams.iter().map(Into::into).collect();

    for t in teams {
        cache.team_seasons.put(team::gen_season_row(&t, None, SEASON));
        for offset in 0..2_u32 {
            let pid = t.tid.get().saturating_mul(2).saturating_add(offset);
            cache.players.put(player(pid, Affiliation::Team(t.tid)));
        }
        cache.teams.put(t);
    }
    g.save(&mut cache).unwrap();

    let (ui, rx) = UiBridge::channel();
    let league = League::new(config, MemoryLeagueStore::new(), ui, g, cache);
    (league, rx)
}

/// Add a free agent with the given value and asking amount.
pub fn add_free_agent(cache: &mut Cache, pid: u32, value: f64, amount: Decimal) {
    let mut p = player(pid, Affiliation::FreeAgent);
    p.value = value;
    p.value_no_pot = value;
    p.contract.amount = amount;
    cache.players.put(p);
}
