//! `referral`: drive the referral engine from the command line.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod command;
mod runtime;

use command::Command;
use referral_core::ReferralConfig;
use referral_service::ReferralGraphService;
use referral_store::{CachingReferralRepository, MemoryCache, SqliteGraphStore};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match command::parse(&args) {
        Ok(Command::Help) => {
            command::print_help();
            return Ok(());
        }
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{}", usage);
            std::process::exit(1);
        }
    };

    runtime::block_on_detached(run(command))?
}

async fn run(command: Command) -> anyhow::Result<()> {
    let data_dir = command::resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = ReferralConfig::from_env(&data_dir)?;
    let store = Arc::new(
        SqliteGraphStore::open(config.db_path())
            .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?,
    );
    let repo = Arc::new(CachingReferralRepository::with_ttl(
        store.clone(),
        MemoryCache::new(config.cache_capacity),
        config.cache_ttl,
    ));
    let service = ReferralGraphService::with_config(repo, &config);

    match command {
        Command::Add {
            customer_id,
            referrer_id,
        } => print_json(&service.add_referral(&customer_id, referrer_id.as_deref())?),
        Command::Referrals { customer_id } => {
            print_json(&service.get_direct_referrals(&customer_id)?)
        }
        Command::Summary { customer_id } => {
            print_json(&service.get_referral_summary(&customer_id)?)
        }
        Command::Leaderboard => print_json(&service.get_top5_leaderboard().await?),
        Command::Stats => print_json(&serde_json::json!({
            "edges": store.count_edges()?,
            "roots": store.count_roots()?,
            "dbPath": store.db_path().display().to_string(),
        })),
        Command::Help => {
            command::print_help();
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
