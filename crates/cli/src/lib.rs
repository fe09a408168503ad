pub mod commands;

use clap::{Parser, Subcommand};
use cardscope_core::FilterSet;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cardscope",
    about = "Cardscope operator CLI",
    long_about = "Inspect Cardscope configuration, check catalog and outlook readiness, and preview catalog queries.",
    after_help = "Examples:\n  cardscope doctor --json\n  cardscope config\n  cardscope query --name Pikachu --type Lightning"
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
    #[command(about = "Validate config, catalog key readiness, and outlook readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the catalog query string built from the given filters")]
    Query {
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "set-name")]
        set_name: Option<String>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        rarity: Option<String>,
        #[arg(long = "type")]
        card_type: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Query { name, set_name, number, rarity, card_type } => {
            commands::query::run(&FilterSet { name, set_name, number, rarity, card_type })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
