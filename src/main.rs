//! MONARCH entrypoint: wiring and the poll loop.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use monarch::chain::ChainClient;
use monarch::config::AppConfig;
use monarch::engine::executor::SwapEncoder;
use monarch::engine::guild::GuildRunner;
use monarch::engine::Engine;
use monarch::ledger::LedgerClient;
use monarch::oracle::{PriceOracle, QuoteRouter};
use monarch::storage::StateStore;
use monarch::types::{ExecutionMode, PositionState, PriceSource};

const BANNER: &str = r#"
 __  __   ___   _  _     _     ___   ___  _  _
|  \/  | / _ \ | \| |   /_\   | _ \ / __|| || |
| |\/| || (_) || .` |  / _ \  |   /| (__ | __ |
|_|  |_| \___/ |_|\_| /_/ \_\ |_|_\ \___||_||_|
"#;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("MONARCH_LOG_JSON").is_ok() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();
    println!("{BANNER}");

    let session = uuid::Uuid::new_v4();
    let config = AppConfig::load("config.toml")?;
    info!(
        session = %session,
        mode = %config.bot.mode,
        source = ?config.bot.price_source,
        strategy = ?config.bot.scan_strategy,
        "Configuration loaded"
    );

    // Transport-backed chain clients are wired by deployments implementing
    // the `ChainClient` seam; this binary ships with the offline backends.
    let chain: Option<Arc<dyn ChainClient>> = None;
    if config.bot.mode == ExecutionMode::Live {
        anyhow::bail!("Live mode requires a chain transport; none is wired in this build");
    }
    if config.bot.price_source == PriceSource::Live {
        anyhow::bail!("Live quotes require a chain transport; none is wired in this build");
    }

    let oracle: Arc<dyn PriceOracle> = Arc::new(QuoteRouter::new(
        config.bot.price_source,
        chain.clone(),
        config.network.curve.clone(),
    ));

    let ledger = if config.ledger.enabled {
        Some(LedgerClient::new(config.ledger.base_url.clone()))
    } else {
        None
    };

    let mut guilds = if config.guilds.enabled {
        match chain.clone() {
            Some(guild_chain) => {
                let registry = config.registry();
                let encoder = SwapEncoder::new(
                    config.network.uniswap_router,
                    config.network.settlement,
                    config.network.curve.clone(),
                );
                Some(GuildRunner::new(
                    config.guilds.clone(),
                    config.bot.mode,
                    config.graph(&registry)?,
                    oracle.clone(),
                    guild_chain,
                    encoder,
                    ledger.clone(),
                ))
            }
            None => {
                warn!("Guilds enabled but no chain transport; guild cycles disabled");
                None
            }
        }
    } else {
        None
    };

    let registry = config.registry();
    let default_token = config.default_token_address(&registry)?;
    let store = StateStore::new(config.bot.state_file.clone());
    let state = store
        .load()?
        .unwrap_or_else(|| PositionState::new(default_token));

    let poll_interval = std::time::Duration::from_secs(config.bot.poll_interval_secs);
    let mut engine = Engine::new(config, oracle, chain, store, state)?;

    engine.initialize_capital().await?;
    info!(interval_secs = poll_interval.as_secs(), "Entering poll loop");

    let mut interval = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = engine.run_tick().await {
                    error!(error = %e, "Tick failed");
                }
                if let Some(runner) = guilds.as_mut() {
                    runner.run_cycle().await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("MONARCH stopped");
    Ok(())
}
