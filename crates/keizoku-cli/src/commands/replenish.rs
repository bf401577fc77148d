use clap::Subcommand;
use keizoku_core::{replenish, Clock, Config, QueryService, SystemClock};

use crate::common::open_store;

#[derive(Subcommand)]
pub enum ReplenishAction {
    /// Replenish the hotsure pool for every stored user whose week window
    /// has rolled over (intended for a scheduled job)
    Sweep,
    /// Show a user's hotsure pool for the current week
    Status {
        /// User identifier
        user: String,
    },
}

pub fn run(action: ReplenishAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = open_store(&config)?;

    match action {
        ReplenishAction::Sweep => {
            let summary = replenish::run_sweep(&store, SystemClock.today())?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        ReplenishAction::Status { user } => {
            let query = QueryService::new(store, SystemClock);
            let pool = query.pool(&user)?;
            println!("{}", serde_json::to_string_pretty(&pool)?);
        }
    }
    Ok(())
}
