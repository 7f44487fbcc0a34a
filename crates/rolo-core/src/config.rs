use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lifecycle::{DEFAULT_MAX_COMPANY_RECORDS, EngineConfig};
use crate::model::StatusOption;
use crate::model::status::{default_contact_statuses, default_lead_statuses};

/// Workspace directory created by `rolo init`.
pub const ROLO_DIR: &str = ".rolo";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub statuses: StatusConfig,
}

impl ProjectConfig {
    /// Engine tunables derived from this config.
    #[must_use]
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_company_records: self.dedup.max_company_records,
            contact_statuses: self.statuses.contact.clone(),
            lead_statuses: self.statuses.lead.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file; relative paths are resolved against the project root.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn resolved_path(&self, project_root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            project_root.join(&self.path)
        }
    }

    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Refuse duplicate scans of companies holding more records than this.
    #[serde(default = "default_max_company_records")]
    pub max_company_records: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            max_company_records: default_max_company_records(),
        }
    }
}

/// Vocabularies for companies that have not configured their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_contact_statuses")]
    pub contact: Vec<StatusOption>,
    #[serde(default = "default_lead_statuses")]
    pub lead: Vec<StatusOption>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            contact: default_contact_statuses(),
            lead: default_lead_statuses(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    /// Acting user when neither `--as` nor `ROLO_USER` is given.
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Path of the project config file under `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(ROLO_DIR).join("config.toml")
}

/// Read `.rolo/config.toml`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read `~/.config/rolo/config.toml` (platform config dir); missing is fine.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("rolo/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load both config layers and settle the output mode.
///
/// # Errors
///
/// Returns an error if either config file is unreadable or malformed.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// `--json` beats `FORMAT`, which beats the user config, which beats TTY
/// detection.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(ROLO_DIR).join("rolo.sqlite3")
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

const fn default_max_company_records() -> usize {
    DEFAULT_MAX_COMPANY_RECORDS
}
