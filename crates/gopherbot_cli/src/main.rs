//! Line-oriented driver for the gopher bot.
//!
//! # Responsibility
//! - Load configuration, open the registry store and start logging.
//! - Feed each stdin line to the dispatcher and print one reply per
//!   addressed line. The chat transport plugs in at the same seam.
//! - Exit non-zero when the store fails; the dispatcher never retries.

use clap::Parser;
use gopherbot_core::db::open_db;
use gopherbot_core::{
    init_logging, BotConfig, Dispatcher, RegistryService, SqliteRegistryRepository,
};
use log::{error, info};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "gopherbot", version, about = "Resource/tag registry chat bot")]
struct Cli {
    /// JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// SQLite database file; overrides `database_path`.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Log level; overrides `log_level`.
    #[arg(long)]
    log_level: Option<String>,
    /// Absolute log directory; overrides `log_dir`.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Bot username accepted in `/gopher@<bot>`; overrides `bot_name`.
    #[arg(long)]
    bot_name: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<BotConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => BotConfig::load(path)?,
            None => BotConfig::default(),
        };
        if let Some(db) = self.db {
            config.database_path = db;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(log_dir) = self.log_dir {
            config.log_dir = Some(log_dir);
        }
        if let Some(bot_name) = self.bot_name {
            config.bot_name = Some(bot_name);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=app_exit module=cli status=error error={err}");
            eprintln!("gopherbot: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.into_config()?;

    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir
            .to_str()
            .ok_or("log_dir must be valid UTF-8")?;
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.database_path)?;
    let registry = RegistryService::new(SqliteRegistryRepository::try_new(conn)?);
    let mut dispatcher = Dispatcher::new(registry);
    if let Some(bot_name) = &config.bot_name {
        dispatcher = dispatcher.with_bot_name(bot_name.as_str());
    }
    info!(
        "event=app_ready module=cli status=ok version={}",
        gopherbot_core::core_version()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if let Some(reply) = dispatcher.handle_text(&line)? {
            writeln!(stdout, "{reply}")?;
            stdout.flush()?;
        }
    }

    dispatcher.into_registry().into_repo().close()?;
    info!("event=app_exit module=cli status=ok");
    Ok(())
}
