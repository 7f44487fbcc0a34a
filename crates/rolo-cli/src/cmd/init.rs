use anyhow::{Context as _, Result};
use clap::Args;
use rolo_core::config::{ProjectConfig, ROLO_DIR, project_config_path};
use rolo_core::db::SqliteStore;
use rolo_core::db::migrations::current_schema_version;
use serde::Serialize;
use std::path::Path;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `.rolo/config.toml` even if `.rolo/` already exists.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "*.sqlite3\n*.sqlite3-wal\n*.sqlite3-shm\n";

#[derive(Debug, Serialize)]
struct InitSummary {
    root: String,
    config: String,
    store: String,
    schema_version: u32,
}

/// Execute `rolo init`. Creates the workspace:
///
/// ```text
/// .rolo/
///   config.toml     (store, dedup ceiling, default status vocabularies)
///   rolo.sqlite3    (migrated store)
///   .gitignore      (database files)
/// ```
///
/// # Errors
///
/// Returns an error if `.rolo/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let rolo_dir = project_root.join(ROLO_DIR);
    if rolo_dir.exists() && !args.force {
        anyhow::bail!(".rolo/ already exists. Use `rolo init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&rolo_dir)
        .with_context(|| format!("Failed to create {}", rolo_dir.display()))?;

    let config = ProjectConfig::default();
    let config_path = project_config_path(project_root);
    let rendered = toml::to_string_pretty(&config).context("Failed to render default config")?;
    std::fs::write(&config_path, rendered)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = rolo_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let store_path = config.store.resolved_path(project_root);
    let store = SqliteStore::open(&store_path, config.store.busy_timeout())?;
    let schema_version = current_schema_version(store.connection())?;

    let summary = InitSummary {
        root: project_root.display().to_string(),
        config: config_path.display().to_string(),
        store: store_path.display().to_string(),
        schema_version,
    };
    render(output, &summary, |s, w| {
        writeln!(w, "✓ Initialized .rolo/ (schema v{})", s.schema_version)?;
        writeln!(w)?;
        writeln!(w, "  Config: {}", s.config)?;
        writeln!(w, "  Store:  {}", s.store)?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  rolo user add admin --name \"Ada Admin\" --role company-admin")?;
        writeln!(w, "  rolo user add u1 --name \"Jane Doe\" --created-by admin")?;
        writeln!(w, "  export ROLO_USER=u1")
    })
}
