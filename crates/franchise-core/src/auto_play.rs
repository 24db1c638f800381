//! Starting a multi-season auto play.

use chrono::Utc;
use franchise_db::{DbError, LeagueStore};
use franchise_types::{AutoPlayUntil, EventKind};
use tracing::info;

use crate::events::{EventInput, log_event};
use crate::league::League;
use crate::ui::Conditions;

/// Ask the user how far to auto play and arm the target.
///
/// A fired user gets an error notification instead of the dialog. Returns
/// whether auto play was armed; a cancelled dialog or a target that is not
/// after the current season and phase arms nothing.
///
/// # Errors
///
/// Returns [`DbError`] if the error notification cannot be committed.
pub async fn init_auto_play<S: LeagueStore>(
    league: &mut League<S>,
    conditions: Conditions,
) -> Result<bool, DbError> {
    if league.g().game_over {
        let mut txn = league.begin();
        let mut input = EventInput::new(EventKind::Error, "You can't auto play while you're fired!");
        input.persistent = true;
        input.save_to_db = false;
        log_event(&mut txn, input, conditions);
        league.commit(txn)?;
        return Ok(false);
    }

    let g = league.g();
    let repeat = g.repeat_season.as_ref().map(|r| r.kind);
    let Some(target) = league
        .ui()
        .auto_play_dialog(g.season, repeat, conditions)
        .await
    else {
        return Ok(false);
    };

    let current = (league.g().season, league.g().phase);
    if (target.season, target.phase) <= current {
        info!(season = target.season, phase = ?target.phase, "Auto play target already reached");
        return Ok(false);
    }

    league.local_mut().auto_play_until = Some(AutoPlayUntil {
        season: target.season,
        phase: target.phase,
        start: Utc::now(),
    });
    info!(season = target.season, phase = ?target.phase, "Auto play armed");
    Ok(true)
}
