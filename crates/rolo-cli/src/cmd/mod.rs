//! Subcommand handlers.
//!
//! Handlers share a [`Context`]: the project root, the effective config,
//! the output mode and the `--as` flag. Engine failures are rendered as
//! structured errors before they are returned to `main`.

pub mod check;
pub mod create;
pub mod delete;
pub mod history;
pub mod init;
pub mod log;
pub mod show;
pub mod status;
pub mod update;
pub mod user;
pub mod vocab;

use anyhow::Result;
use rolo_core::config::{EffectiveConfig, ROLO_DIR};
use rolo_core::db::SqliteStore;
use rolo_core::model::PersonId;
use rolo_core::phone::PhoneInput;
use rolo_core::{EngineConfig, ErrorCode, LifecycleEngine, LifecycleError, LifecycleResult};
use std::path::{Path, PathBuf};

use crate::actor;
use crate::output::{CliError, OutputMode, render_error};

/// Everything a handler needs besides its own arguments.
pub struct Context {
    pub project_root: PathBuf,
    pub config: EffectiveConfig,
    pub output: OutputMode,
    pub as_user: Option<String>,
}

impl Context {
    /// Open the project database; fails with `E1001` before `rolo init`.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let path = self.config.project.store.resolved_path(&self.project_root);
        if !path.exists() {
            let err = CliError::from_code(
                ErrorCode::NotInitialized,
                format!("no rolo database at {}", path.display()),
            );
            render_error(self.output, &err)?;
            anyhow::bail!("{}", err.message);
        }
        SqliteStore::open(&path, self.config.project.store.busy_timeout())
    }

    pub fn engine_config(&self) -> EngineConfig {
        self.config.project.engine()
    }

    pub fn engine<'a>(&self, store: &'a SqliteStore) -> LifecycleEngine<'a, SqliteStore> {
        LifecycleEngine::new(store, self.engine_config())
    }

    /// The acting user, rendering `missing_actor` when none resolves.
    pub fn actor(&self) -> Result<String> {
        match actor::require_actor(self.as_user.as_deref(), self.config.user.user.as_deref()) {
            Ok(user) => Ok(user),
            Err(e) => {
                render_error(
                    self.output,
                    &CliError::with_details(&e.message, "Pass --as or set ROLO_USER", e.code),
                )?;
                anyhow::bail!("{}", e.message);
            }
        }
    }

    /// Unwrap an engine result, rendering the failure when there is one.
    pub fn check<T>(&self, result: LifecycleResult<T>) -> Result<T> {
        result.or_else(|err| self.fail(&err))
    }

    pub fn fail<T>(&self, err: &LifecycleError) -> Result<T> {
        render_error(self.output, &CliError::from(err))?;
        anyhow::bail!("{} {err}", err.code())
    }

    /// Render a usage problem as `InvalidInput`.
    pub fn invalid<T>(&self, message: impl Into<String>) -> Result<T> {
        let err = CliError::from_code(ErrorCode::InvalidInput, message);
        render_error(self.output, &err)?;
        anyhow::bail!("{}", err.message)
    }

    /// Parse a person id argument, rendering `InvalidInput` on failure.
    pub fn person_id(&self, raw: &str) -> Result<PersonId> {
        PersonId::parse(raw.trim()).or_else(|e| self.invalid(e.to_string()))
    }
}

/// Walk up from `start` to the nearest directory holding `.rolo/`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(ROLO_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// `CC:NUMBER` becomes a split phone; anything else is parsed whole.
pub fn parse_phone(raw: &str) -> PhoneInput {
    match raw.split_once(':') {
        Some((cc, number)) => PhoneInput::split(cc.trim(), number.trim()),
        None => PhoneInput::combined(raw.trim()),
    }
}

/// Read a JSON document from a file, or stdin for `-`.
pub fn read_json_input<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    use anyhow::Context as _;

    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Local-time rendering of a microsecond timestamp.
pub fn micros_to_local(us: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_micros(us).map_or_else(
        || us.to_string(),
        |ts| {
            ts.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}
