pub mod commands;

use clap::{Parser, Subcommand};
use maintflow_core::config::{AppConfig, LoadOptions, LogFormat};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "maintflow",
    about = "Maintflow operator CLI",
    long_about = "Inspect configuration, check backend readiness, browse records and drive maintenance workflows.",
    after_help = "Examples:\n  maintflow doctor --json\n  maintflow list piece --page 2 --limit 5\n  maintflow actions commande \"En attente\" --role magasinier\n  maintflow transition commande c-1 valider --role magasinier"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, token readiness, and backend reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Fetch one page of a resource collection")]
    List(commands::list::ListArgs),
    #[command(about = "Show the actions a role may apply to an entity in a given status")]
    Actions(commands::actions::ActionsArgs),
    #[command(about = "Apply a workflow action to a record")]
    Transition(commands::transition::TransitionArgs),
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::List(args) => commands::list::run(&args),
        Command::Actions(args) => commands::actions::run(&args),
        Command::Transition(args) => commands::transition::run(&args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays a single JSON document.
fn init_logging() {
    use tracing::Level;

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        tracing::warn!(
            event_name = "cli.logging.init_skipped",
            error = %error,
            "a global subscriber is already installed; keeping it"
        );
    }
}
