pub mod bootstrap;
pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "crmpilot",
    about = "Natural-language dispatcher for CRM and email operations",
    long_about = "Translate a plain-English request into exactly one HubSpot or Gmail \
operation, or inspect configuration and capability readiness.",
    after_help = "Examples:\n  crmpilot ask \"add John Doe, john@example.com, to the CRM\"\n  crmpilot capabilities\n  crmpilot doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Dispatch one free-text request and print the result envelope")]
    Ask {
        #[arg(help = "The request, e.g. \"create a deal called Acme expansion for 5000\"")]
        text: String,
    },
    #[command(about = "List registered capabilities with their parameter schemas")]
    Capabilities,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and collaborator credential readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { text } => commands::ask::run(&text),
        Command::Capabilities => commands::capabilities::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
