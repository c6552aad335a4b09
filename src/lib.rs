//! healthlog library root.
//! Exposes CLI parser, high-level run() function, and internal modules.

pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`warn` when unset).
pub const LOG_ENV: &str = "HEALTHLOG_LOG";

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use cli::commands as c;

    match &cli.command {
        Commands::Init => c::init::handle(cli),
        Commands::Config { .. } => c::config::handle(&cli.command, cfg),
        Commands::Db { .. } => c::db::handle(&cli.command, cfg),
        Commands::Auth { .. } => c::auth::handle(cli, cfg),
        Commands::Category { .. } => c::category::handle(cli, cfg),
        Commands::Type { .. } => c::event_type::handle(cli, cfg),
        Commands::Seed => c::seed::handle(cli, cfg),
        Commands::Add { .. } => c::add::handle(cli, cfg),
        Commands::Edit { .. } => c::edit::handle(cli, cfg),
        Commands::Del { .. } => c::del::handle(cli, cfg),
        Commands::Day { .. } => c::day::handle(cli, cfg),
        Commands::Week { .. } => c::week::handle(cli, cfg),
        Commands::Month { .. } => c::month::handle(cli, cfg),
        Commands::List { .. } => c::list::handle(cli, cfg),
        Commands::Note { .. } => c::note::handle(&cli.command, cfg),
        Commands::Sync => c::sync::handle(cli, cfg),
        Commands::Watch { .. } => c::watch::handle(cli, cfg),
        Commands::Export { .. } => c::export::handle(cli, cfg),
        Commands::Import { .. } => c::import::handle(cli, cfg),
        Commands::Log { .. } => c::log::handle(&cli.command, cfg),
    }
}

/// Diagnostics go to stderr so they never mix with command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    init_tracing();

    // 1️⃣ parse CLI
    let cli = Cli::parse();

    // 2️⃣ load config once
    let mut cfg = Config::load()?;

    // 3️⃣ command-line DB override
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
