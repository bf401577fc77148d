use chrono::Utc;
use clap::Subcommand;
use keizoku_core::daykey::parse_instant;
use keizoku_core::{Config, QueryService, StreakService, SystemClock};

use crate::common::open_store;

#[derive(Subcommand)]
pub enum EntryAction {
    /// Record an activity entry for a user
    Record {
        /// User identifier
        user: String,
        /// RFC 3339 timestamp of the activity (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show the continuity projection for a user
    Status {
        /// User identifier
        user: String,
    },
}

pub fn run(action: EntryAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = open_store(&config)?;

    match action {
        EntryAction::Record { user, at } => {
            let occurred_at = match at {
                Some(s) => parse_instant(&s)?,
                None => Utc::now(),
            };
            let service = StreakService::with_retries(store, config.engine.max_save_retries);
            let result = service.record_entry(&user, occurred_at)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        EntryAction::Status { user } => {
            let query = QueryService::new(store, SystemClock);
            let projection = query.get(&user)?;
            println!("{}", serde_json::to_string_pretty(&projection)?);
        }
    }
    Ok(())
}
