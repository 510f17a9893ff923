use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::model::SourceKind;
use crate::rank::WeightConfig;

pub mod defaults {
    pub const RACE_URL: &str = "https://www.espn.com/f1/results/_/id/600052045";
    pub const QUALIFYING_URL: &str = "https://www.espn.com/f1/results/_/id/600052045/type/qualifying";
    pub const PRACTICE_URL: &str = "https://www.espn.com/f1/results/_/id/600052045/type/practice1";

    pub const SOURCE_EVENT: &str = "Australian GP";
    pub const TARGET_EVENT: &str = "China GP";

    pub const DELAY_MS: u64 = 1000;
    pub const USER_AGENT: &str = concat!("grid_predict/", env!("CARGO_PKG_VERSION"), " (results table scraper)");

    pub const CACHE_DIR: &str = "cache";
    pub const ROSTER_API: &str = "https://api.jolpi.ca/ergast/f1";
}

const ENV_PREFIX: &str = "PREDICT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub race_url: String,
    pub qualifying_url: String,
    pub practice_url: String,
    pub source_event: String,
    pub target_event: String,
    pub delay_ms: u64,
    pub user_agent: String,
    pub race_weight: f64,
    pub qualifying_weight: f64,
    pub practice_weight: f64,
    pub cache_dir: PathBuf,
    pub roster_api: String,
}

impl Default for Settings {
    fn default() -> Self {
        let weights = WeightConfig::default();
        Settings {
            race_url: defaults::RACE_URL.into(),
            qualifying_url: defaults::QUALIFYING_URL.into(),
            practice_url: defaults::PRACTICE_URL.into(),
            source_event: defaults::SOURCE_EVENT.into(),
            target_event: defaults::TARGET_EVENT.into(),
            delay_ms: defaults::DELAY_MS,
            user_agent: defaults::USER_AGENT.into(),
            race_weight: weights.race,
            qualifying_weight: weights.qualifying,
            practice_weight: weights.practice,
            cache_dir: PathBuf::from(defaults::CACHE_DIR),
            roster_api: defaults::ROSTER_API.into(),
        }
    }
}

impl Settings {
    /// Built-in defaults overlaid with `PREDICT_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::builder(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn builder(env: Environment) -> Result<Self> {
        let defaults = Config::try_from(&Settings::default()).context("invalid default settings")?;
        Config::builder()
            .add_source(defaults)
            .add_source(env)
            .build()
            .context("failed to read PREDICT_* environment")?
            .try_deserialize()
            .context("invalid PREDICT_* setting")
    }

    pub fn url_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Race => &self.race_url,
            SourceKind::Qualifying => &self.qualifying_url,
            SourceKind::Practice => &self.practice_url,
        }
    }

    pub fn weights(&self) -> WeightConfig {
        WeightConfig {
            race: self.race_weight,
            qualifying: self.qualifying_weight,
            practice: self.practice_weight,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Environment::with_prefix(ENV_PREFIX).try_parsing(true).source(Some(source))
    }

    #[test]
    fn defaults_survive_empty_environment() {
        let settings = Settings::builder(env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.weights(), WeightConfig::default());
        assert_eq!(settings.delay(), Duration::from_secs(1));
    }

    #[test]
    fn environment_overrides() {
        let settings = Settings::builder(env(&[
            ("PREDICT_RACE_URL", "http://localhost/race"),
            ("PREDICT_DELAY_MS", "0"),
            ("PREDICT_RACE_WEIGHT", "1.5"),
        ]))
        .unwrap();
        assert_eq!(settings.url_for(SourceKind::Race), "http://localhost/race");
        assert_eq!(settings.url_for(SourceKind::Practice), defaults::PRACTICE_URL);
        assert_eq!(settings.delay_ms, 0);
        assert_eq!(settings.weights().race, 1.5);
        assert_eq!(settings.weights().qualifying, 0.3);
    }

    #[test]
    fn bad_number_is_an_error() {
        assert!(Settings::builder(env(&[("PREDICT_DELAY_MS", "soon")])).is_err());
    }
}
