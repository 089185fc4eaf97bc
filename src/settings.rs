//! Persisted operator settings (a flat YAML record).
//!
//! Loading never fails: a missing file yields defaults and a corrupt one is
//! logged and replaced by defaults on the next save.

use std::path::{Path, PathBuf};

use agent_core::{SessionConfig, DEFAULT_MODEL};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Every Anthropic console key carries this prefix.
pub const API_KEY_PREFIX: &str = "sk-ant-";

pub const SETTING_KEYS: &[&str] = &["api_key", "model", "target_app", "max_steps", "step_delay_ms"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub target_app: String,
    pub max_steps: u32,
    pub step_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            target_app: session.target_context,
            max_steps: session.max_steps,
            step_delay_ms: session.step_delay_ms,
        }
    }
}

impl Settings {
    /// Fills an empty key from `ANTHROPIC_API_KEY`.
    pub fn apply_env(&mut self) {
        if self.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.api_key = key.trim().to_string();
            }
        }
    }

    /// Updates one field from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api_key" => self.api_key = value.to_string(),
            "model" => self.model = value.to_string(),
            "target_app" => self.target_app = value.to_string(),
            "max_steps" => {
                let steps: u32 = value
                    .parse()
                    .with_context(|| format!("max_steps must be a positive integer, got '{value}'"))?;
                if steps == 0 {
                    bail!("max_steps must be at least 1");
                }
                self.max_steps = steps;
            }
            "step_delay_ms" => {
                self.step_delay_ms = value.parse().with_context(|| {
                    format!("step_delay_ms must be a whole number of milliseconds, got '{value}'")
                })?
            }
            other => bail!(
                "unknown setting '{other}' (expected one of: {})",
                SETTING_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// The key with all but its prefix and last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let key = self.api_key.trim();
        if key.is_empty() {
            return "(not set)".to_string();
        }
        let chars: Vec<char> = key.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .model(self.model.clone())
            .target_context(self.target_app.clone())
            .max_steps(self.max_steps)
            .step_delay_ms(self.step_delay_ms)
    }
}

/// Checks the key shape before anything touches the network.
pub fn validate_api_key(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        bail!("API key is required: run `deskpilot settings set api_key <key>` or set {API_KEY_ENV}");
    }
    if !key.starts_with(API_KEY_PREFIX) {
        bail!("API key should start with \"{API_KEY_PREFIX}\", please check it");
    }
    Ok(())
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/deskpilot/settings.yaml`, or the given override.
    pub fn resolve(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => path.to_path_buf(),
            None => {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("deskpilot");
                path.push("settings.yaml");
                path
            }
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Settings {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "settings not readable, using defaults");
                return Settings::default();
            }
        };
        match serde_yaml::from_str::<Option<Settings>>(&content) {
            Ok(settings) => {
                debug!(path = %self.path.display(), "settings loaded");
                settings.unwrap_or_default()
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "settings file is corrupt, using defaults");
                Settings::default()
            }
        }
    }

    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let yaml = serde_yaml::to_string(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
