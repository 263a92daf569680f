//! Engine configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `leadmap.toml` + `leadmap.<env>.toml`
//! + `LEADMAP_*` env vars. `expand_path` expands `~` and `${VAR}` in
//! user-supplied paths.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;
use crate::types::Position;

/// What a failed search does to the results that are already on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    KeepPrevious,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub page_size: usize,
    pub default_center: Position,
    pub default_zoom: u8,
    pub first_result_zoom: u8,
    pub list_focus_zoom: u8,
    pub scroll_threshold_px: f64,
    pub focus_first_result: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            // Gyeonggi provincial office
            default_center: Position::new(37.2750, 127.0095),
            default_zoom: 10,
            first_result_zoom: 13,
            list_focus_zoom: 16,
            scroll_threshold_px: 100.0,
            focus_first_result: true,
            failure_policy: FailurePolicy::KeepPrevious,
        }
    }
}

impl EngineConfig {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default())).merge(Toml::file("leadmap.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("leadmap.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("leadmap.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("leadmap.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("LEADMAP_").split("__"));

        let config: EngineConfig = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load engine config for '{}': {}", env_name, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig("page_size must be at least 1".to_string()));
        }
        if !self.default_center.is_valid() {
            return Err(Error::InvalidConfig(format!("default_center out of range: {:?}", self.default_center)));
        }
        if !(self.scroll_threshold_px >= 0.0) {
            return Err(Error::InvalidConfig("scroll_threshold_px must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
