//! Account status check and achievement upload.
//!
//! Failures never reach the caller: a network or decode error is logged
//! and the anonymous status is returned, so a league runs the same with or
//! without the account service.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use franchise_db::LeagueStore;
use franchise_types::{Achievement, LocalUpdate, PartialTopMenu, Sport};
use serde::{Deserialize, Deserializer};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::AccountConfig;
use crate::league::League;
use crate::ui::{Conditions, UiMessage};

/// Difficulty recorded for achievements saved before difficulties existed.
const DEFAULT_DIFFICULTY: &str = "normal";

/// Errors talking to the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The request failed or the body did not decode.
    #[error("account request failed: {source}")]
    Http {
        /// The underlying client error.
        #[from]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("account service returned {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

/// Accept `0`/`1`, booleans, strings, or null where a flag is expected.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty() && s != "0",
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    gold_until: i64,
    #[serde(default, deserialize_with = "truthy")]
    gold_cancelled: bool,
    #[serde(default, deserialize_with = "truthy")]
    mailing_list: bool,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
}

/// Status reported when the account cannot be checked.
pub const fn anonymous() -> PartialTopMenu {
    PartialTopMenu {
        email: String::new(),
        gold_cancelled: false,
        gold_until: i64::MAX,
        username: String::new(),
        mailing_list: false,
    }
}

/// Client for the account service.
#[derive(Debug, Clone)]
pub struct AccountClient {
    http: reqwest::Client,
    api_url: String,
    sport: Sport,
    grace_period_secs: i64,
    uploading: Arc<Mutex<()>>,
}

impl AccountClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &AccountConfig, sport: Sport) -> Result<Self, AccountError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            sport,
            grace_period_secs: config.grace_period_secs,
            uploading: Arc::new(Mutex::new(())),
        })
    }

    async fn user_info(&self) -> Result<UserInfo, AccountError> {
        let url = format!("{}/user_info.php", self.api_url);
        let response = self
            .http
            .get(&url)
            .query(&[("sport", self.sport.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AccountError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn upload(&self, slugs: &[String], difficulty: &str) -> Result<(), AccountError> {
        let url = format!("{}/achievements.php", self.api_url);
        let body = serde_json::json!({
            "slugs": slugs,
            "sport": self.sport.as_str(),
            "difficulty": difficulty,
        });
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AccountError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Check the account, refresh session state, and upload achievements
    /// earned while logged out.
    ///
    /// Returns the anonymous status if the service cannot be reached.
    pub async fn check_account<S: LeagueStore>(
        &self,
        league: &mut League<S>,
        conditions: Conditions,
    ) -> PartialTopMenu {
        let info = match self.user_info().await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "Account check failed");
                return anonymous();
            }
        };

        let logged_in = !info.username.is_empty();
        let local = league.local_mut();
        local.gold_until = Some(info.gold_until);
        local.mailing_list = info.mailing_list;
        local.email = logged_in.then(|| info.email.clone());
        local.username = logged_in.then(|| info.username.clone());

        let now = Utc::now().timestamp().saturating_sub(self.grace_period_secs);
        let gold = now <= info.gold_until;
        league.ui().send(UiMessage::UpdateLocal(LocalUpdate {
            games: None,
            email: league.local().email.clone(),
            gold: Some(gold),
            username: league.local().username.clone(),
        }));
        info!(logged_in, gold, "Account checked");

        if logged_in {
            self.upload_achievements(league, conditions).await;
        }

        PartialTopMenu {
            email: info.email,
            gold_cancelled: info.gold_cancelled,
            gold_until: info.gold_until,
            username: info.username,
            mailing_list: info.mailing_list,
        }
    }

    /// Upload locally saved achievements, grouped by difficulty.
    ///
    /// Only one upload runs at a time per client; a concurrent call skips.
    /// Achievements that fail to upload are kept for the next check.
    async fn upload_achievements<S: LeagueStore>(
        &self,
        league: &mut League<S>,
        conditions: Conditions,
    ) {
        let Ok(_guard) = self.uploading.try_lock() else {
            debug!("Achievement upload already running");
            return;
        };

        let achievements: Vec<Achievement> =
            league.cache().achievements.values().cloned().collect();
        if achievements.is_empty() {
            return;
        }
        league.cache_mut().achievements.clear();

        let mut by_difficulty: BTreeMap<String, Vec<Achievement>> = BTreeMap::new();
        for a in achievements {
            let difficulty = a
                .difficulty
                .clone()
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_owned());
            by_difficulty.entry(difficulty).or_default().push(a);
        }

        for (difficulty, rows) in by_difficulty {
            let slugs: Vec<String> = rows.iter().map(|a| a.slug.clone()).collect();
            match self.upload(&slugs, &difficulty).await {
                Ok(()) => info!(
                    count = slugs.len(),
                    %difficulty,
                    client = ?conditions.client_id,
                    "Achievements uploaded"
                ),
                Err(e) => {
                    warn!(error = %e, %difficulty, "Achievement upload failed, keeping locally");
                    for a in rows {
                        league.cache_mut().achievements.put(a);
                    }
                }
            }
        }
    }
}
