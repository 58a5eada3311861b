use anyhow::{Context, Result};
use futures_terminal::config::load_config;
use futures_terminal::logging::init_logging;
use futures_terminal::menu::{Session, GOODBYE};
use futures_terminal::prompt::TerminalConsole;
use futures_terminal::BinanceFutures;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let outcome = runtime.block_on(run());
    // A pending stdin read cannot be cancelled; don't wait for it on Ctrl+C.
    runtime.shutdown_background();
    outcome
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = load_config()?;
    init_logging(&cfg.log_file)?;
    info!(
        testnet = cfg.binance.testnet,
        base = %cfg.binance.base_url(),
        "MAIN: starting futures terminal"
    );

    let mut exchange = BinanceFutures::new(&cfg.binance).context("failed to create exchange client")?;
    if let Err(err) = exchange.sync_server_time().await {
        warn!(error = %err, "MAIN: server time sync failed, using local clock");
    }

    println!(
        "Binance Futures Trading CLI ({})",
        if cfg.binance.testnet { "Testnet" } else { "MAINNET" }
    );

    let mut console = TerminalConsole::new();
    let mut session = Session::new(
        &exchange,
        &mut console,
        cfg.order_rules(),
        cfg.order.recent_orders_limit,
    );

    tokio::select! {
        res = session.run() => {
            if let Err(err) = res {
                error!(error = %err, "MAIN: console failure");
                return Err(anyhow::Error::new(err).context("console failure"));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("MAIN: Received shutdown signal (Ctrl+C)");
            println!();
            println!("{GOODBYE}");
        }
    }

    info!("MAIN: Shutting down...");
    Ok(())
}
