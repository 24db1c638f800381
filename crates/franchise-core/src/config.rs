//! Configuration loading and typed config structures for a league.
//!
//! The canonical configuration lives in `franchise-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads the file and applies
//! environment overrides.

use std::collections::BTreeMap;
use std::path::Path;

use franchise_types::{Gender, Sport};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level league configuration.
///
/// Mirrors the structure of `franchise-config.yaml`. Every section is
/// optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeagueConfig {
    /// League shape: sport, season length, starting season.
    #[serde(default)]
    pub league: LeagueSection,

    /// Salary cap and contract bounds.
    #[serde(default)]
    pub economics: EconomicsConfig,

    /// Region aliasing for population smoothing.
    #[serde(default)]
    pub regions: RegionsConfig,

    /// Account service settings.
    #[serde(default)]
    pub account: AccountConfig,

    /// Infrastructure connection strings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Headless engine run parameters.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl LeagueConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DATABASE_URL` overrides `infrastructure.postgres_url`
    /// - `ACCOUNT_API_URL` overrides `account.api_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.infrastructure.apply_env_overrides();
        config.account.apply_env_overrides();
        Ok(config)
    }
}

/// League shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueSection {
    /// Sport being simulated.
    #[serde(default)]
    pub sport: Sport,

    /// Gender used for generated text.
    #[serde(default)]
    pub gender: Gender,

    /// First season of the league.
    #[serde(default = "default_starting_season")]
    pub starting_season: i32,

    /// Regular season games per team.
    #[serde(default = "default_num_games")]
    pub num_games: u32,

    /// Games per playoff series, one entry per round.
    #[serde(default = "default_num_games_playoff_series")]
    pub num_games_playoff_series: Vec<u32>,

    /// Hall of fame threshold multiplier.
    #[serde(default = "default_hof_factor")]
    pub hof_factor: f64,

    /// Keep every region at the same population.
    #[serde(default)]
    pub equalize_regions: bool,
}

impl Default for LeagueSection {
    fn default() -> Self {
        Self {
            sport: Sport::default(),
            gender: Gender::default(),
            starting_season: default_starting_season(),
            num_games: default_num_games(),
            num_games_playoff_series: default_num_games_playoff_series(),
            hof_factor: default_hof_factor(),
            equalize_regions: false,
        }
    }
}

/// Salary cap and contract bounds, in thousands of dollars.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomicsConfig {
    /// Soft salary cap.
    #[serde(default = "default_salary_cap")]
    pub salary_cap: u32,

    /// Minimum contract amount.
    #[serde(default = "default_min_contract")]
    pub min_contract: u32,

    /// Maximum contract amount.
    #[serde(default = "default_max_contract")]
    pub max_contract: u32,

    /// Roster size limit for free agent signings.
    #[serde(default = "default_max_roster_size")]
    pub max_roster_size: u32,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            salary_cap: default_salary_cap(),
            min_contract: default_min_contract(),
            max_contract: default_max_contract(),
            max_roster_size: default_max_roster_size(),
        }
    }
}

/// Region aliasing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionsConfig {
    /// Regions that share a market with another region, mapped to the
    /// canonical region name.
    #[serde(default = "default_same_region_overrides")]
    pub same_region_overrides: BTreeMap<String, String>,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            same_region_overrides: default_same_region_overrides(),
        }
    }
}

impl RegionsConfig {
    /// Canonical market for `region`.
    pub fn market<'a>(&'a self, region: &'a str) -> &'a str {
        self.same_region_overrides
            .get(region)
            .map_or(region, String::as_str)
    }
}

/// Account service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountConfig {
    /// Base URL of the account API.
    #[serde(default = "default_account_api_url")]
    pub api_url: String,

    /// Seconds a lapsed subscription still counts as active.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: i64,

    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Whether the engine checks the account at startup.
    #[serde(default)]
    pub check_on_startup: bool,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            api_url: default_account_api_url(),
            grace_period_secs: default_grace_period_secs(),
            request_timeout_ms: default_request_timeout_ms(),
            check_on_startup: false,
        }
    }
}

impl AccountConfig {
    /// Override the API URL with `ACCOUNT_API_URL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ACCOUNT_API_URL") {
            self.api_url = val;
        }
    }
}

/// Infrastructure connection strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` connection string. Without one the league lives in
    /// memory only.
    #[serde(default)]
    pub postgres_url: Option<String>,

    /// League ID rows are stored under.
    #[serde(default = "default_lid")]
    pub lid: i32,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            postgres_url: None,
            lid: default_lid(),
        }
    }
}

impl InfrastructureConfig {
    /// Override the database URL with `DATABASE_URL` when set.
    ///
    /// This allows Docker Compose (or any deployment) to set connection
    /// strings via env vars without modifying the YAML config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.postgres_url = Some(val);
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Show UI prompts (the preseason support modal among them).
    #[serde(default = "default_true")]
    pub enable_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_logging: true,
        }
    }
}

/// Headless engine run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of teams in a freshly seeded league.
    #[serde(default = "default_num_teams")]
    pub num_teams: u32,

    /// Players per roster in a freshly seeded league.
    #[serde(default = "default_players_per_team")]
    pub players_per_team: u32,

    /// Unsigned players in a freshly seeded league.
    #[serde(default = "default_free_agents")]
    pub free_agents: u32,

    /// Seasons to auto play before exiting.
    #[serde(default = "default_num_seasons")]
    pub num_seasons: u32,

    /// Upper bound on phase transitions in one run.
    #[serde(default = "default_max_phases")]
    pub max_phases: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            num_teams: default_num_teams(),
            players_per_team: default_players_per_team(),
            free_agents: default_free_agents(),
            num_seasons: default_num_seasons(),
            max_phases: default_max_phases(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_starting_season() -> i32 {
    2025
}

const fn default_num_games() -> u32 {
    82
}

fn default_num_games_playoff_series() -> Vec<u32> {
    vec![7, 7, 7, 7]
}

const fn default_hof_factor() -> f64 {
    1.0
}

const fn default_salary_cap() -> u32 {
    140_000
}

const fn default_min_contract() -> u32 {
    1_250
}

const fn default_max_contract() -> u32 {
    47_000
}

const fn default_max_roster_size() -> u32 {
    15
}

fn default_same_region_overrides() -> BTreeMap<String, String> {
    [
        ("San Jose", "San Francisco"),
        ("Golden State", "San Francisco"),
        ("Brooklyn", "New York"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_owned(), to.to_owned()))
    .collect()
}

fn default_account_api_url() -> String {
    String::from("https://account.zengm.com")
}

/// Three days.
const fn default_grace_period_secs() -> i64 {
    259_200
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_lid() -> i32 {
    1
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_seed() -> u64 {
    42
}

const fn default_num_teams() -> u32 {
    6
}

const fn default_players_per_team() -> u32 {
    13
}

const fn default_free_agents() -> u32 {
    20
}

const fn default_num_seasons() -> u32 {
    3
}

const fn default_max_phases() -> u32 {
    200
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LeagueConfig::default();
        assert_eq!(config.league.num_games, 82);
        assert_eq!(config.league.num_games_playoff_series.len(), 4);
        assert_eq!(config.economics.salary_cap, 140_000);
        assert!(config.logging.enable_logging);
        assert_eq!(config.engine.seed, 42);
    }

    #[test]
    fn default_regions_alias_shared_markets() {
        let regions = RegionsConfig::default();
        assert_eq!(regions.market("San Jose"), "San Francisco");
        assert_eq!(regions.market("Golden State"), "San Francisco");
        assert_eq!(regions.market("Brooklyn"), "New York");
        assert_eq!(regions.market("Denver"), "Denver");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
league:
  sport: hockey
  gender: female
  starting_season: 2030
  num_games: 60
  num_games_playoff_series: [5, 7]
  hof_factor: 1.5
  equalize_regions: true

economics:
  salary_cap: 90000
  min_contract: 750
  max_contract: 30000
  max_roster_size: 13

regions:
  same_region_overrides:
    Anaheim: "Los Angeles"

account:
  grace_period_secs: 0
  request_timeout_ms: 500
  check_on_startup: true

infrastructure:
  lid: 7

logging:
  level: "debug"
  enable_logging: false

engine:
  seed: 123
  num_teams: 4
  players_per_team: 10
  free_agents: 5
  num_seasons: 2
  max_phases: 50
"#;

        let config = LeagueConfig::parse(yaml).unwrap();

        assert_eq!(config.league.sport, Sport::Hockey);
        assert_eq!(config.league.gender, Gender::Female);
        assert_eq!(config.league.starting_season, 2030);
        assert_eq!(config.league.num_games_playoff_series, vec![5, 7]);
        assert!(config.league.equalize_regions);
        assert_eq!(config.economics.max_roster_size, 13);
        assert_eq!(config.regions.market("Anaheim"), "Los Angeles");
        // Replacing the map drops the built-in aliases.
        assert_eq!(config.regions.market("Brooklyn"), "Brooklyn");
        assert_eq!(config.account.grace_period_secs, 0);
        assert!(config.account.check_on_startup);
        assert_eq!(config.infrastructure.lid, 7);
        assert!(!config.logging.enable_logging);
        assert_eq!(config.engine.seed, 123);
        assert_eq!(config.engine.max_phases, 50);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = LeagueConfig::parse("engine:\n  seed: 7\n").unwrap();

        // Seed is overridden
        assert_eq!(config.engine.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.league.starting_season, 2025);
        assert_eq!(config.economics.min_contract, 1_250);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(LeagueConfig::parse("").is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("franchise-config.yaml");
        if path.exists() {
            let config = LeagueConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
