use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "keizoku-cli", version, about = "Keizoku CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activity entry recording and status
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Hotsure pool replenishment
    Replenish {
        #[command(subcommand)]
        action: commands::replenish::ReplenishAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Entry { action } => commands::entry::run(action),
        Commands::Replenish { action } => commands::replenish::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
