//! Runtime configuration: a JSON file plus a small set of environment
//! overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use applypilot_core_types::{ApplicantProfile, ApplicationConfig};
use applypilot_session::SessionConfig;

/// Environment variables recognized on top of the config file.
pub const ENV_HEADLESS: &str = "APPLYPILOT_HEADLESS";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "APPLYPILOT_MODEL";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,
    #[serde(default)]
    pub executable: Option<String>,
}

fn default_headless() -> bool {
    true
}

fn default_nav_timeout() -> u64 {
    30
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            nav_timeout_secs: default_nav_timeout(),
            executable: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapperSettings {
    #[serde(default = "default_model")]
    pub model: String,
    /// Never read from the file; the key only comes from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub profile: ApplicantProfile,
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub cover_letter_text: String,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub mapper: MapperSettings,
    #[serde(default = "default_outcomes_path")]
    pub outcomes_path: PathBuf,
    #[serde(default = "default_inter_attempt")]
    pub inter_attempt_delay_secs: u64,
}

fn default_outcomes_path() -> PathBuf {
    PathBuf::from("outcomes.jsonl")
}

fn default_inter_attempt() -> u64 {
    10
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Environment wins over the file for the few knobs it covers.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = env(ENV_HEADLESS) {
            self.browser.headless = !matches!(raw.trim(), "0" | "false" | "no");
        }
        if let Some(model) = env(ENV_MODEL) {
            if !model.trim().is_empty() {
                self.mapper.model = model.trim().to_string();
            }
        }
        self.mapper.api_key = env(ENV_API_KEY).filter(|key| !key.trim().is_empty());
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            headless: self.browser.headless,
            nav_timeout: Duration::from_secs(self.browser.nav_timeout_secs),
            executable: self.browser.executable.clone(),
            ..SessionConfig::default()
        }
    }

    pub fn application_config(&self) -> ApplicationConfig {
        ApplicationConfig {
            resume_path: self.resume_path.clone(),
            cover_letter_text: self.cover_letter_text.clone(),
            applicant_profile: self.profile.clone(),
        }
    }
}
