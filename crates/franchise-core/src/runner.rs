//! Auto play loop.
//!
//! This module provides [`run_auto_play`], which advances a league phase by
//! phase until the armed auto play target is reached:
//!
//! - **Bounded**: stops after `max_phases` transitions even if the target
//!   is further away
//! - **Durable**: cached writes are flushed after every phase
//! - **Clean finish**: the target is disarmed once reached
//!
//! Arm a target first with [`crate::auto_play::init_auto_play`] or by
//! setting `auto_play_until` directly.

use franchise_db::{DbError, LeagueStore};
use tracing::{info, warn};

use crate::league::League;
use crate::phase::{self, PhaseError};
use crate::ui::Conditions;

/// Errors that can occur during auto play.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A phase transition failed.
    #[error("phase error: {source}")]
    Phase {
        /// The underlying phase error.
        #[from]
        source: PhaseError,
    },

    /// Flushing to the durable store failed.
    #[error("flush error: {source}")]
    Db {
        /// The underlying store error.
        #[from]
        source: DbError,
    },
}

/// Why auto play stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlayEndReason {
    /// The league reached the target season and phase.
    ReachedTarget,
    /// The phase limit was hit first.
    MaxPhases,
    /// No target was armed.
    NotRequested,
}

/// Result of an auto play run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlayResult {
    /// The reason auto play ended.
    pub end_reason: AutoPlayEndReason,
    /// Phase transitions executed.
    pub phases: u32,
    /// Season when auto play ended.
    pub season: i32,
}

/// Advance the league until the auto play target is reached.
///
/// A `max_phases` of zero means no limit.
///
/// # Errors
///
/// Returns [`RunnerError`] if a transition or flush fails. The failed
/// transition leaves the league in its previous phase.
pub async fn run_auto_play<S: LeagueStore>(
    league: &mut League<S>,
    conditions: Conditions,
    max_phases: u32,
) -> Result<AutoPlayResult, RunnerError> {
    let mut phases = 0_u32;

    let Some(target) = league.local().auto_play_until else {
        return Ok(AutoPlayResult {
            end_reason: AutoPlayEndReason::NotRequested,
            phases,
            season: league.g().season,
        });
    };

    info!(
        season = league.g().season,
        phase = ?league.g().phase,
        target_season = target.season,
        target_phase = ?target.phase,
        max_phases,
        "Auto play starting"
    );

    loop {
        let g = league.g();
        if (g.season, g.phase) >= (target.season, target.phase) {
            league.local_mut().auto_play_until = None;
            return Ok(AutoPlayResult {
                end_reason: AutoPlayEndReason::ReachedTarget,
                phases,
                season: league.g().season,
            });
        }

        if max_phases > 0 && phases >= max_phases {
            info!(phases, "Phase limit reached");
            return Ok(AutoPlayResult {
                end_reason: AutoPlayEndReason::MaxPhases,
                phases,
                season: g.season,
            });
        }

        let (_, next) = phase::next_phase(g.season, g.phase);
        league.new_phase(next, conditions).await?;
        let stats = league.flush().await?;
        phases = phases.saturating_add(1);

        info!(
            season = league.g().season,
            phase = ?next,
            upserted = stats.upserted,
            deleted = stats.deleted,
            "Phase complete"
        );
    }
}

/// Log how auto play ended.
pub fn log_auto_play_end(result: &AutoPlayResult) {
    info!(
        reason = ?result.end_reason,
        phases = result.phases,
        season = result.season,
        "Auto play ended"
    );
    if result.phases == 0 {
        warn!("Auto play ended with no phases executed");
    }
}
