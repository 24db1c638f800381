//! Headless engine for the Franchise league simulation.
//!
//! This is the main entry point that wires together the league store, the
//! spawner, the account check, and the auto play loop. It loads
//! configuration, opens or seeds a league, and auto plays it forward a
//! configured number of seasons.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `franchise-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the durable store (`PostgreSQL` when configured, memory otherwise)
//! 4. Load the league, or seed a fresh one
//! 5. Check the account status (optional)
//! 6. Arm auto play for the configured number of seasons
//! 7. Run auto play
//! 8. Log the result

mod error;
mod spawner;

use std::path::Path;

use chrono::Utc;
use franchise_core::account::AccountClient;
use franchise_core::attributes::GAME_ATTRIBUTES_KEY;
use franchise_core::config::LeagueConfig;
use franchise_core::league::League;
use franchise_core::runner;
use franchise_core::ui::{Conditions, UiBridge, UiMessage};
use franchise_db::{
    Attribute, LeagueStore, MemoryLeagueStore, PostgresConfig, PostgresLeagueStore,
};
use franchise_types::{AutoPlayUntil, Phase};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const CONFIG_PATH: &str = "franchise-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or auto play fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("franchise-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        sport = ?config.league.sport,
        starting_season = config.league.starting_season,
        seed = config.engine.seed,
        num_seasons = config.engine.num_seasons,
        max_phases = config.engine.max_phases,
        "Configuration loaded"
    );

    // 3. Open the durable store, then run against it.
    match config.infrastructure.postgres_url.clone() {
        Some(url) => {
            let pg_config = PostgresConfig::new(&url, config.infrastructure.lid);
            let store = PostgresLeagueStore::connect(&pg_config)
                .await
                .map_err(EngineError::from)?;
            store.run_migrations().await.map_err(EngineError::from)?;
            info!(lid = config.infrastructure.lid, "PostgreSQL store ready");
            Box::pin(run(config, store)).await?;
        }
        None => {
            info!("No database configured, league lives in memory");
            Box::pin(run(config, MemoryLeagueStore::new())).await?;
        }
    }

    info!("franchise-engine stopped");
    Ok(())
}

/// Open or seed the league in `store` and auto play it.
async fn run<S: LeagueStore>(config: LeagueConfig, store: S) -> Result<(), EngineError> {
    let (ui, rx) = UiBridge::channel();
    let ui_logger = spawn_ui_logger(rx);
    let conditions = Conditions::default();

    // 4. Load the league, or seed a fresh one.
    let existing = store
        .get::<Attribute>(&GAME_ATTRIBUTES_KEY.to_owned())
        .await?
        .is_some();
    let mut league = if existing {
        League::load(config.clone(), store, ui).await?
    } else {
        let seeded = spawner::seed_league(&config)?;
        let mut league = League::new(config.clone(), store, ui, seeded.g, seeded.cache);
        let stats = league.flush().await?;
        info!(upserted = stats.upserted, "Seeded league saved");
        league
    };
    info!(
        season = league.g().season,
        phase = ?league.g().phase,
        teams = league.g().num_active_teams(),
        "League ready"
    );

    // 5. Check the account status.
    if config.account.check_on_startup {
        let client = AccountClient::new(&config.account, league.g().sport)?;
        let top_menu = client.check_account(&mut league, conditions).await;
        let username = if top_menu.username.is_empty() {
            "anonymous"
        } else {
            top_menu.username.as_str()
        };
        info!(username, gold_until = top_menu.gold_until, "Account checked");
    }

    // 6. Arm auto play.
    let seasons = i32::try_from(config.engine.num_seasons).unwrap_or(i32::MAX);
    let target_season = league.g().season.saturating_add(seasons);
    league.local_mut().auto_play_until = Some(AutoPlayUntil {
        season: target_season,
        phase: Phase::Preseason,
        start: Utc::now(),
    });

    // 7. Run auto play.
    let result = runner::run_auto_play(&mut league, conditions, config.engine.max_phases).await?;

    // 8. Log the result.
    runner::log_auto_play_end(&result);

    drop(league);
    if let Err(e) = ui_logger.await {
        debug!(error = %e, "UI logger task ended abnormally");
    }
    Ok(())
}

/// Drain UI messages into the log. Dialogs are cancelled; a headless run
/// has nobody to answer them.
fn spawn_ui_logger(mut rx: UnboundedReceiver<UiMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                UiMessage::UpdateLocal(update) => debug!(?update, "UI local update"),
                UiMessage::MergeGames(games) => debug!(games = games.len(), "UI games merged"),
                UiMessage::ShowModal { .. } => debug!("UI modal requested"),
                UiMessage::AutoPlayDialog { reply, .. } => {
                    let _ = reply.send(None);
                }
                UiMessage::Notification { event, .. } => {
                    info!(kind = ?event.kind, season = event.season, "{}", event.text);
                }
            }
        }
    })
}

/// Load configuration from `franchise-config.yaml`.
///
/// Falls back to defaults (with environment overrides applied) when the
/// file does not exist. The flag reports whether the file was read.
fn load_config() -> Result<(LeagueConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((LeagueConfig::from_file(config_path)?, true))
    } else {
        Ok((LeagueConfig::parse("")?, false))
    }
}
