//! Free agency: AI signings and contract demands.

use std::collections::BTreeMap;

use franchise_types::{Affiliation, EventKind, Pid, Tid, Transaction, TransactionKind};
use rand::seq::SliceRandom;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::events::{EventInput, log_event};
use crate::league::Txn;
use crate::ui::Conditions;

/// Value at which a free agent asks for the minimum contract.
const MIN_VALUE: f64 = 40.0;

/// Value at which a free agent asks for the maximum contract.
const MAX_VALUE: f64 = 80.0;

/// Have each AI team sign at most one free agent.
///
/// Teams go in random order and take the most valuable free agent who
/// fits under the salary cap, or any minimum-contract player. User teams
/// only sign during auto play or in spectator mode.
pub fn auto_sign(txn: &mut Txn) -> Vec<Pid> {
    let mut pool: Vec<(Pid, f64, Decimal)> = txn
        .cache
        .players
        .values()
        .filter(|p| p.affiliation == Affiliation::FreeAgent)
        .map(|p| (p.pid, p.value, p.contract.amount))
        .collect();
    if pool.is_empty() {
        return Vec::new();
    }
    pool.sort_by(|a, b| b.1.total_cmp(&a.1));

    let ai_only = !txn.local.auto_playing() && !txn.g.spectator;
    let mut tids: Vec<Tid> = txn
        .cache
        .teams
        .values()
        .filter(|t| !t.disabled)
        .filter(|t| !(ai_only && txn.g.user_tids.contains(&t.tid)))
        .map(|t| t.tid)
        .collect();
    tids.shuffle(&mut txn.rng);

    let mut signed = Vec::new();
    for tid in tids {
        let roster = txn.cache.players_on_team(tid);
        let roster_size = u32::try_from(roster.len()).unwrap_or(u32::MAX);
        if roster_size >= txn.g.max_roster_size {
            continue;
        }
        let payroll: Decimal = roster.iter().map(|p| p.contract.amount).sum();

        let pick = pool.iter().position(|&(_, _, amount)| {
            amount <= txn.g.min_contract
                || payroll
                    .checked_add(amount)
                    .is_some_and(|total| total <= txn.g.salary_cap)
        });
        let Some(index) = pick else {
            continue;
        };
        let (pid, _, amount) = pool.remove(index);

        let season = txn.g.season;
        let phase = txn.g.phase;
        let Some(p) = txn.cache.players.get_mut(&pid) else {
            continue;
        };
        p.affiliation = Affiliation::Team(tid);
        p.transactions.push(Transaction {
            season,
            phase,
            tid,
            kind: TransactionKind::FreeAgent,
        });
        let name = p.name();
        let exp = p.contract.exp;

        let team_name = txn
            .cache
            .teams
            .get(&tid)
            .map_or_else(String::new, |t| format!("{} {}", t.region, t.name));
        let mut input = EventInput::new(
            EventKind::FreeAgent,
            format!("The {team_name} signed {name} for ${amount}k/year through {exp}."),
        );
        input.tids = vec![tid];
        input.pids = vec![pid];
        input.show_notification = false;
        log_event(txn, input, Conditions::default());

        signed.push(pid);
        if pool.is_empty() {
            break;
        }
    }

    debug!(signed = signed.len(), "Free agents auto signed");
    signed
}

/// Contract years a free agent asks for, by value.
const fn demand_years(value: f64) -> i32 {
    if value >= 60.0 {
        3
    } else if value >= 50.0 {
        2
    } else {
        1
    }
}

/// Reset every free agent's contract demand for the current season.
///
/// The amount scales with value between the minimum and maximum contract,
/// rounded to the nearest thousand; the contract runs through the current
/// season plus any extra years the player asks for.
pub fn normalize_contract_demands(txn: &mut Txn) -> BTreeMap<Pid, Decimal> {
    let season = txn.g.season;
    let min = txn.g.min_contract;
    let spread = txn.g.max_contract.checked_sub(min).unwrap_or(Decimal::ZERO);

    let free_agents: Vec<Pid> = txn
        .cache
        .players
        .values()
        .filter(|p| p.affiliation == Affiliation::FreeAgent)
        .map(|p| p.pid)
        .collect();

    let mut demands = BTreeMap::new();
    for pid in free_agents {
        let Some(p) = txn.cache.players.get_mut(&pid) else {
            continue;
        };
        let fraction = ((p.value - MIN_VALUE) / (MAX_VALUE - MIN_VALUE)).clamp(0.0, 1.0);
        let fraction = Decimal::from_f64_retain(fraction * fraction).unwrap_or(Decimal::ZERO);
        let amount = spread
            .checked_mul(fraction)
            .and_then(|extra| min.checked_add(extra))
            .unwrap_or(min)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        p.contract.amount = amount;
        p.contract.exp = season.saturating_add(demand_years(p.value)).saturating_sub(1);
        p.contract.rookie = false;
        demands.insert(p.pid, amount);
    }
    demands
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn ai_teams_sign_best_affordable_free_agents() {
        let (league, _rx) = testing::league();
        let mut txn = league.begin();
        testing::add_free_agent(&mut txn.cache, 100, 70.0, Decimal::new(5_000, 0));
        testing::add_free_agent(&mut txn.cache, 101, 45.0, Decimal::new(1_250, 0));

        let signed = auto_sign(&mut txn);
        assert_eq!(signed.len(), 2);

        // The user's team (tid 0) is skipped outside auto play.
        for pid in signed {
            let p = txn.cache.players.get(&pid).unwrap();
            let tid = p.tid().unwrap();
            assert_ne!(tid, Tid::new(0));
            assert_eq!(p.transactions.last().unwrap().kind, TransactionKind::FreeAgent);
        }
        assert_eq!(txn.cache.events.len(), 2);
        assert!(txn.outbox().is_empty());
    }

    #[test]
    fn full_rosters_do_not_sign() {
        let (league, _rx) = testing::league();
        let mut txn = league.begin();
        txn.g.max_roster_size = 2;
        testing::add_free_agent(&mut txn.cache, 100, 70.0, Decimal::new(5_000, 0));

        assert!(auto_sign(&mut txn).is_empty());
        assert_eq!(
            txn.cache.players.get(&Pid::new(100)).unwrap().affiliation,
            Affiliation::FreeAgent
        );
    }

    #[test]
    fn demands_scale_with_value() {
        let (league, _rx) = testing::league();
        let mut txn = league.begin();
        testing::add_free_agent(&mut txn.cache, 100, 80.0, Decimal::ZERO);
        testing::add_free_agent(&mut txn.cache, 101, 30.0, Decimal::ZERO);

        let demands = normalize_contract_demands(&mut txn);
        assert_eq!(demands.get(&Pid::new(100)), Some(&txn.g.max_contract));
        assert_eq!(demands.get(&Pid::new(101)), Some(&txn.g.min_contract));

        let star = txn.cache.players.get(&Pid::new(100)).unwrap();
        assert_eq!(star.contract.exp, txn.g.season + 2);
        let scrub = txn.cache.players.get(&Pid::new(101)).unwrap();
        assert_eq!(scrub.contract.exp, txn.g.season);
    }

    #[test]
    fn demands_leave_rostered_players_clean() {
        let (mut league, _rx) = testing::league();
        let _ = league.cache_mut().players.take_changes();
        let mut txn = league.begin();
        testing::add_free_agent(&mut txn.cache, 100, 60.0, Decimal::ZERO);
        let _ = txn.cache.players.take_changes();

        normalize_contract_demands(&mut txn);

        let written: Vec<Pid> = txn
            .cache
            .players
            .take_changes()
            .upserts
            .iter()
            .map(|p| p.pid)
            .collect();
        assert_eq!(written, vec![Pid::new(100)]);
    }
}
