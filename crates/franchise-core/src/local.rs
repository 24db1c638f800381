//! Per-session state that is never persisted.

use std::collections::BTreeMap;

use franchise_types::{AutoPlayUntil, Pid};

/// Session state shared by the league's operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState {
    /// Target of a multi-season auto play, while one is running.
    pub auto_play_until: Option<AutoPlayUntil>,
    /// Player value normalization must be recomputed.
    pub player_ovr_mean_std_stale: bool,
    /// Cached contract-demand fractions per free agent.
    pub min_fraction_diffs: Option<BTreeMap<Pid, f64>>,
    /// A finished season summary has not been viewed yet.
    pub unviewed_season_summary: bool,
    /// Subscription end, unix seconds, from the last account check.
    pub gold_until: Option<i64>,
    /// Subscribed to the mailing list.
    pub mailing_list: bool,
    /// Account email when logged in.
    pub email: Option<String>,
    /// Account username when logged in.
    pub username: Option<String>,
}

impl LocalState {
    /// Whether a multi-season auto play is running.
    pub const fn auto_playing(&self) -> bool {
        self.auto_play_until.is_some()
    }
}
