#![forbid(unsafe_code)]

mod actor;
mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use rolo_core::ErrorCode;
use rolo_core::config::resolve_config;
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "rolo",
    author,
    version,
    about = "rolo: duplicate-safe contacts and leads for multi-tenant CRMs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user (overrides ROLO_USER and the user config).
    #[arg(long = "as", value_name = "USER_ID", global = true)]
    as_user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a rolo workspace",
        long_about = "Create .rolo/ with a default config and a migrated database.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    rolo init\n\n    # Emit machine-readable output\n    rolo init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(next_help_heading = "Setup", about = "Provision and list users")]
    User {
        #[command(subcommand)]
        command: cmd::user::UserCommand,
    },

    #[command(next_help_heading = "Setup", about = "Show or replace status vocabularies")]
    Vocab {
        #[command(subcommand)]
        command: cmd::vocab::VocabCommand,
    },

    #[command(
        next_help_heading = "Lifecycle",
        about = "Create a contact or lead",
        long_about = "Create a contact or lead owned by the acting user. Fails if any phone or email is already held inside the company.",
        after_help = "EXAMPLES:\n    # Create a contact\n    rolo --as u1 create --first-name Jane -p +971501234567\n\n    # Create a lead\n    rolo --as u1 create -c lead --first-name Bob -e bob@x.com"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Update a contact or lead",
        after_help = "EXAMPLES:\n    # Replace emails\n    rolo update ps-0123456789ab -e new@x.com\n\n    # Convert a lead back to a contact\n    rolo update ps-0123456789ab -c contact"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Change status",
        long_about = "Change a record's status. `interested` promotes a contact to a lead; every lead transition is recorded in its pipeline.",
        after_help = "EXAMPLES:\n    # Promote a contact\n    rolo status ps-0123456789ab interested --note \"asked for pricing\""
    )]
    Status(cmd::status::StatusArgs),

    #[command(next_help_heading = "Lifecycle", about = "Delete a contact or lead")]
    Delete(cmd::delete::DeleteArgs),

    #[command(next_help_heading = "Read", about = "Show one contact or lead")]
    Show(cmd::show::ShowArgs),

    #[command(next_help_heading = "Read", about = "Show a lead's pipeline history")]
    History(cmd::history::HistoryArgs),

    #[command(next_help_heading = "Read", about = "Show a record's activity log")]
    Log(cmd::log::LogArgs),

    #[command(
        next_help_heading = "Read",
        about = "Check phones and emails for duplicates",
        after_help = "EXAMPLES:\n    # Pre-flight before creating\n    rolo check -p 501234567 -e jane@x.com"
    )]
    Check(cmd::check::CheckArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ROLO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "rolo=debug,rolo_core=debug,info"
        } else {
            "rolo=info,warn"
        })
    });

    let format = env::var("ROLO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = env::current_dir()?;
    let project_root = match cli.command {
        Commands::Init(_) => cwd,
        _ => cmd::find_project_root(&cwd).unwrap_or(cwd),
    };

    let config = match resolve_config(&project_root, cli.json) {
        Ok(config) => config,
        Err(err) => {
            let mode = if cli.json { OutputMode::Json } else { OutputMode::Text };
            render_error(mode, &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")))?;
            return Err(err);
        }
    };
    let output = OutputMode::from_resolved(&config.resolved_output);
    debug!(root = %project_root.display(), ?output, "resolved workspace");

    let ctx = cmd::Context {
        project_root,
        config,
        output,
        as_user: cli.as_user,
    };

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx.project_root, ctx.output),
        Commands::User { command } => cmd::user::run_user(command, &ctx),
        Commands::Vocab { command } => cmd::vocab::run_vocab(command, &ctx),
        Commands::Create(args) => cmd::create::run_create(args, &ctx),
        Commands::Update(args) => cmd::update::run_update(args, &ctx),
        Commands::Status(args) => cmd::status::run_status(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, &ctx),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::History(args) => cmd::history::run_history(args, &ctx),
        Commands::Log(args) => cmd::log::run_log(args, &ctx),
        Commands::Check(args) => cmd::check::run_check(args, &ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["rolo", "--json", "show", "ps-1"]);
        assert!(cli.json);
        let cli = Cli::parse_from(["rolo", "show", "ps-1", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn as_flag_is_global() {
        let cli = Cli::parse_from(["rolo", "status", "ps-1", "win", "--as", "u1"]);
        assert_eq!(cli.as_user.as_deref(), Some("u1"));
        let cli = Cli::parse_from(["rolo", "--as", "u2", "delete", "ps-1"]);
        assert_eq!(cli.as_user.as_deref(), Some("u2"));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["rolo", "init"],
            vec!["rolo", "user", "add", "u1", "--name", "Jane", "--created-by", "admin"],
            vec!["rolo", "user", "list"],
            vec!["rolo", "vocab", "show"],
            vec!["rolo", "vocab", "set", "-c", "lead", "-o", "hot:Hot:open"],
            vec!["rolo", "create", "--first-name", "Jane"],
            vec!["rolo", "update", "ps-1", "--last-name", "Doe"],
            vec!["rolo", "status", "ps-1", "interested"],
            vec!["rolo", "delete", "ps-1"],
            vec!["rolo", "show", "ps-1"],
            vec!["rolo", "history", "ps-1"],
            vec!["rolo", "log", "ps-1"],
            vec!["rolo", "check", "-e", "a@b.com"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn role_values_are_kebab_case() {
        let cli = Cli::parse_from(["rolo", "user", "add", "admin", "-n", "Ada", "-r", "company-admin"]);
        let Commands::User {
            command: cmd::user::UserCommand::Add(args),
        } = cli.command
        else {
            panic!("expected user add");
        };
        assert_eq!(args.role, cmd::user::RoleArg::CompanyAdmin);
    }

    #[test]
    fn vocab_set_requires_an_option() {
        assert!(Cli::try_parse_from(["rolo", "vocab", "set", "-c", "lead"]).is_err());
    }
}
