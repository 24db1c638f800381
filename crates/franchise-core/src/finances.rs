//! Budget levels and their effects.
//!
//! A budget item's level runs from 1 to [`MAX_LEVEL`]; [`DEFAULT_LEVEL`] is
//! league average. What a team actually gets out of an item is the level
//! implied by its spending over the last three seasons.

use franchise_types::{BudgetItem, Team, TeamSeason};
use rust_decimal::{Decimal, RoundingStrategy};

/// Highest budget level.
pub const MAX_LEVEL: u32 = 75;

/// League-average budget level.
pub const DEFAULT_LEVEL: u32 = 25;

/// Base ticket price at the standard salary cap, dollars.
const BASE_TICKET_PRICE: Decimal = Decimal::from_parts(2500, 0, 0, false, 2);

/// Fraction of a rank-based value the most populous team gets above average.
const POP_RANK_SPREAD: f64 = 0.25;

/// Position of `pop_rank` among `num_active_teams`, from 0.0 (largest
/// market) to 1.0 (smallest).
#[allow(clippy::cast_precision_loss)]
fn rank_fraction(pop_rank: u32, num_active_teams: usize) -> f64 {
    if num_active_teams <= 1 {
        return 0.5;
    }
    let last = num_active_teams.saturating_sub(1) as f64;
    (f64::from(pop_rank.saturating_sub(1)) / last).clamp(0.0, 1.0)
}

/// Default level of every budget item for a team with the given population
/// rank (1 = largest market).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn default_budget_level(pop_rank: u32, num_active_teams: usize) -> u32 {
    let scale = 1.0 + POP_RANK_SPREAD * (1.0 - 2.0 * rank_fraction(pop_rank, num_active_teams));
    let level = (f64::from(DEFAULT_LEVEL) * scale).round();
    (level as u32).clamp(1, MAX_LEVEL)
}

/// Default ticket price for a team with the given population rank.
pub fn default_ticket_price(
    pop_rank: u32,
    num_active_teams: usize,
    salary_cap_scale: Decimal,
) -> Decimal {
    let scale = 1.0 + POP_RANK_SPREAD * (1.0 - 2.0 * rank_fraction(pop_rank, num_active_teams));
    let scale = Decimal::from_f64_retain(scale).unwrap_or(Decimal::ONE);
    BASE_TICKET_PRICE
        .checked_mul(scale)
        .and_then(|p| p.checked_mul(salary_cap_scale))
        .unwrap_or(BASE_TICKET_PRICE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Effect of a budget level, from -1.0 at level 1 through 0.0 at
/// [`DEFAULT_LEVEL`] to 1.0 at [`MAX_LEVEL`].
pub fn level_to_effect(level: u32) -> f64 {
    let level = f64::from(level.clamp(1, MAX_LEVEL));
    let default = f64::from(DEFAULT_LEVEL);
    if level >= default {
        (level - default) / (f64::from(MAX_LEVEL) - default)
    } else {
        (level - default) / (default - 1.0)
    }
}

/// Budget level implied by a team's spending over its previous seasons.
///
/// `team_seasons` are the team's rows for up to the three seasons before
/// the current one. Expense levels are summed per game, so a season with
/// fewer than a full slate of games is topped up at the team's current
/// level. With no history at all the current level is the answer.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn get_level_last_three(
    item: BudgetItem,
    t: &Team,
    team_seasons: &[&TeamSeason],
    num_games: u32,
) -> u32 {
    let current = t.budget.level(item);
    let recent: Vec<&&TeamSeason> = team_seasons.iter().rev().take(3).collect();
    if recent.is_empty() || num_games == 0 {
        return current;
    }

    let mut level_sum = 0.0;
    let mut games = 0_u64;
    for ts in &recent {
        level_sum += ts.expense_levels.get(item) as f64;
        games = games.saturating_add(u64::from(ts.gp));
    }

    let expected = u64::from(num_games).saturating_mul(recent.len() as u64);
    let missing = expected.saturating_sub(games);
    level_sum += f64::from(current) * missing as f64;
    let total_games = games.saturating_add(missing);
    if total_games == 0 {
        return current;
    }

    let level = (level_sum / total_games as f64).round();
    (level as u32).clamp(1, MAX_LEVEL)
}
