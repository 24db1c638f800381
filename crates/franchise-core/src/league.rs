//! League state and staged operations.
//!
//! [`League`] owns everything one running league needs: game attributes,
//! session state, the record cache, the RNG, the durable store, and the
//! UI bridge. Multi-step operations run against a [`Txn`], a staged copy
//! of the mutable state with its own UI outbox. [`League::commit`] swaps
//! the staged state in and delivers the outbox; dropping a `Txn` instead
//! discards every change and every queued message.

use franchise_db::{Cache, DbError, FlushStats, LeagueStore, flush};
use franchise_types::Phase;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::attributes::{GAME_ATTRIBUTES_KEY, GameAttributes};
use crate::config::LeagueConfig;
use crate::local::LocalState;
use crate::phase::{self, PhaseError, PhaseReturn};
use crate::ui::{Conditions, UiBridge, UiMessage};

/// Errors raised while opening a league.
#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    /// The store holds no game attributes.
    #[error("league {lid} has no {key} attribute")]
    NotInitialized {
        /// League ID.
        lid: i32,
        /// Missing attribute key.
        key: &'static str,
    },

    /// A store operation failed.
    #[error("league store error: {source}")]
    Db {
        /// The underlying store error.
        #[from]
        source: DbError,
    },
}

/// Mutable state of one league.
#[derive(Debug, Clone)]
pub struct LeagueState {
    /// Game attributes.
    pub g: GameAttributes,
    /// Session state.
    pub local: LocalState,
    /// Cached records.
    pub cache: Cache,
}

/// A staged operation on a league.
#[derive(Debug)]
pub struct Txn {
    /// Staged game attributes.
    pub g: GameAttributes,
    /// Staged session state.
    pub local: LocalState,
    /// Staged record cache.
    pub cache: Cache,
    /// RNG, committed with the rest so a failed operation does not consume
    /// randomness.
    pub rng: StdRng,
    outbox: Vec<UiMessage>,
}

impl Txn {
    /// Queue a UI message for delivery on commit.
    pub fn send(&mut self, msg: UiMessage) {
        self.outbox.push(msg);
    }

    /// Messages queued so far.
    pub fn outbox(&self) -> &[UiMessage] {
        &self.outbox
    }
}

/// A running league.
#[derive(Debug)]
pub struct League<S: LeagueStore> {
    state: LeagueState,
    rng: StdRng,
    store: S,
    ui: UiBridge,
    config: LeagueConfig,
}

impl<S: LeagueStore> League<S> {
    /// Wrap freshly created league state.
    pub fn new(config: LeagueConfig, store: S, ui: UiBridge, g: GameAttributes, cache: Cache) -> Self {
        let rng = StdRng::seed_from_u64(config.engine.seed);
        Self {
            state: LeagueState {
                g,
                local: LocalState::default(),
                cache,
            },
            rng,
            store,
            ui,
            config,
        }
    }

    /// Open a league that already exists in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`LeagueError::NotInitialized`] if the store has no game
    /// attributes, or [`LeagueError::Db`] if reading fails.
    pub async fn load(config: LeagueConfig, store: S, ui: UiBridge) -> Result<Self, LeagueError> {
        let lid = config.infrastructure.lid;
        let attribute = store
            .get::<franchise_db::Attribute>(&GAME_ATTRIBUTES_KEY.to_owned())
            .await?
            .ok_or(LeagueError::NotInitialized {
                lid,
                key: GAME_ATTRIBUTES_KEY,
            })?;
        let g: GameAttributes =
            serde_json::from_value(attribute.value).map_err(DbError::from)?;
        let cache = Cache::fill(&store, g.season).await?;

        info!(lid, season = g.season, phase = ?g.phase, "Loaded league");

        Ok(Self::new(config, store, ui, g, cache))
    }

    /// Game attributes.
    pub const fn g(&self) -> &GameAttributes {
        &self.state.g
    }

    /// Session state.
    pub const fn local(&self) -> &LocalState {
        &self.state.local
    }

    /// Mutable session state.
    pub const fn local_mut(&mut self) -> &mut LocalState {
        &mut self.state.local
    }

    /// Cached records.
    pub const fn cache(&self) -> &Cache {
        &self.state.cache
    }

    /// Mutable cached records.
    pub const fn cache_mut(&mut self) -> &mut Cache {
        &mut self.state.cache
    }

    /// Durable store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// UI bridge.
    pub const fn ui(&self) -> &UiBridge {
        &self.ui
    }

    /// League configuration.
    pub const fn config(&self) -> &LeagueConfig {
        &self.config
    }

    /// Stage an operation.
    pub fn begin(&self) -> Txn {
        Txn {
            g: self.state.g.clone(),
            local: self.state.local.clone(),
            cache: self.state.cache.clone(),
            rng: self.rng.clone(),
            outbox: Vec::new(),
        }
    }

    /// Apply a staged operation and deliver its UI messages.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the game attributes cannot be serialized; the
    /// league is left unchanged in that case.
    pub fn commit(&mut self, txn: Txn) -> Result<(), DbError> {
        let Txn {
            g,
            local,
            mut cache,
            rng,
            outbox,
        } = txn;
        g.save(&mut cache)?;

        self.state = LeagueState { g, local, cache };
        self.rng = rng;

        debug!(messages = outbox.len(), "Committed league operation");
        for msg in outbox {
            self.ui.send(msg);
        }
        Ok(())
    }

    /// Run the preseason transition and commit it.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] if the transition fails; nothing is changed.
    pub async fn new_phase_preseason(
        &mut self,
        conditions: Conditions,
    ) -> Result<PhaseReturn, PhaseError> {
        let mut txn = self.begin();
        let result =
            phase::new_phase_preseason(&mut txn, &self.store, &self.config, conditions).await?;
        self.commit(txn)?;
        Ok(result)
    }

    /// Move to `phase` and commit.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] if the transition fails; nothing is changed.
    pub async fn new_phase(
        &mut self,
        phase: Phase,
        conditions: Conditions,
    ) -> Result<PhaseReturn, PhaseError> {
        let mut txn = self.begin();
        let result =
            phase::new_phase(&mut txn, &self.store, &self.config, phase, conditions).await?;
        self.commit(txn)?;
        Ok(result)
    }

    /// Persist cached writes to the durable store.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a write fails.
    pub async fn flush(&mut self) -> Result<FlushStats, DbError> {
        flush(&mut self.state.cache, &self.store).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use franchise_db::MemoryLeagueStore;
    use franchise_types::LocalUpdate;

    use super::*;
    use crate::testing;

    #[test]
    fn dropped_txn_changes_nothing() {
        let (league, mut rx) = testing::league();
        let before = league.g().clone();

        let mut txn = league.begin();
        txn.g.season = 2099;
        txn.cache.schedule.clear();
        txn.send(UiMessage::UpdateLocal(LocalUpdate::default()));
        drop(txn);

        assert_eq!(league.g(), &before);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn commit_applies_state_and_delivers_outbox() {
        let (mut league, mut rx) = testing::league();

        let mut txn = league.begin();
        txn.g.season = 2030;
        txn.local.unviewed_season_summary = true;
        txn.send(UiMessage::UpdateLocal(LocalUpdate::default()));
        league.commit(txn).unwrap();

        assert_eq!(league.g().season, 2030);
        assert!(league.local().unviewed_season_summary);
        assert!(matches!(rx.try_recv(), Ok(UiMessage::UpdateLocal(_))));

        let saved = GameAttributes::load(league.cache()).unwrap().unwrap();
        assert_eq!(saved.season, 2030);
    }

    #[tokio::test]
    async fn load_round_trips_through_store() {
        let (mut league, _rx) = testing::league();
        league.flush().await.unwrap();

        let store = MemoryLeagueStore::new();
        let (ui, _rx2) = UiBridge::channel();
        let err = League::load(LeagueConfig::default(), store, ui).await;
        assert!(matches!(err, Err(LeagueError::NotInitialized { .. })));

        let (ui, _rx3) = UiBridge::channel();
        let store = league.store;
        let loaded = League::load(LeagueConfig::default(), store, ui).await.unwrap();
        assert_eq!(loaded.g().season, 2025);
        assert_eq!(loaded.cache().teams.len(), 3);
        assert_eq!(loaded.cache().players.len(), 6);
    }
}
