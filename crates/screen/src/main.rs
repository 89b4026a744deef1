//! `stockpos` terminal entry point.

use anyhow::Context;
use tokio::io::BufReader;

use stockpos_infra::StoreConfig;
use stockpos_screen::{InventoryScreen, terminal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockpos_observability::init();

    let config = StoreConfig::from_env().context("reading store configuration")?;
    let store = stockpos_infra::store::open(&config).context("opening inventory store")?;
    tracing::info!(concurrency = ?config.concurrency, "inventory screen starting");

    let screen = InventoryScreen::with_concurrency(store, config.concurrency);
    screen.mount().await;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    terminal::run(&screen, stdin, &mut stdout).await?;

    tracing::info!("inventory screen closed");
    Ok(())
}
