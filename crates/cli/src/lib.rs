pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "blockbot",
    about = "Blockbot operator CLI",
    long_about = "Inspect and maintain the blockbot block store and configuration.",
    after_help = "Examples:\n  blockbot migrate\n  blockbot status\n  blockbot totals U123456"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending block store migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Show the active block, if any, with time elapsed")]
    Status,
    #[command(about = "Show cumulative blocked/blocking time for a user")]
    Totals {
        #[arg(help = "Slack user id, e.g. U123456")]
        user_id: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Status => commands::status::run(),
        Command::Totals { user_id } => commands::totals::run(&user_id),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
