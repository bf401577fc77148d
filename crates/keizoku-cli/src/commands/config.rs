use clap::Subcommand;
use keizoku_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Set the save-retry budget for contended records
    SetRetries {
        /// Save attempts per entry before giving up
        retries: u32,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::SetRetries { retries } => {
            let mut config = Config::load()?;
            config.engine.max_save_retries = retries;
            config.save()?;
            println!("max_save_retries = {retries}");
        }
    }
    Ok(())
}
