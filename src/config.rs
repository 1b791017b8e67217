//! Stored Jira credentials and their file-backed manager.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents the credentials persisted on disk: site domain, account email
/// and API token. Environment variables override every field at run time.
#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub domain: String,
    pub email: String,
    pub api_token: String,
}

impl Settings {
    /// True when every field needed to authenticate is present.
    pub fn is_complete(&self) -> bool {
        !self.domain.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.api_token.trim().is_empty()
    }

    /// Applies non-empty overrides on top of the stored values.
    pub fn with_overrides(
        mut self,
        domain: Option<String>,
        email: Option<String>,
        api_token: Option<String>,
    ) -> Self {
        if let Some(domain) = domain.filter(|value| !value.trim().is_empty()) {
            self.domain = domain;
        }
        if let Some(email) = email.filter(|value| !value.trim().is_empty()) {
            self.email = email;
        }
        if let Some(api_token) = api_token.filter(|value| !value.trim().is_empty()) {
            self.api_token = api_token;
        }
        self
    }
}

/// Manages loading and saving of credentials to a JSON file in the
/// platform-specific config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager bound to the config path, honouring the
    /// `JIRALOG_CONFIG` path override.
    pub fn new() -> Self {
        let path = env::var("JIRALOG_CONFIG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let dirs = directories::ProjectDirs::from("dev", "jiralog", "jiralog")
                    .expect("Could not determine config directory");
                dirs.config_dir().join("config.json")
            });
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings from disk, falling back to defaults on read/parse
    /// errors.
    pub fn load(&self) -> Settings {
        if self.path.exists() {
            let content = fs::read_to_string(&self.path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            Settings::default()
        }
    }

    /// Persists settings to disk, creating parent directories when needed.
    pub fn save(&self, settings: &Settings) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Stored settings with `JIRA_DOMAIN` / `JIRA_EMAIL` / `JIRA_API_TOKEN`
    /// environment overrides applied.
    pub fn resolve(&self) -> Settings {
        self.load().with_overrides(
            env::var("JIRA_DOMAIN").ok(),
            env::var("JIRA_EMAIL").ok(),
            env::var("JIRA_API_TOKEN").ok(),
        )
    }
}
