use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod client;
mod constants;
mod domain;
mod render;
mod state;
#[cfg(test)]
mod test_utils;

use crate::{
    client::{TransactionSource, WalletClient},
    constants::FIRST_PAGE,
    domain::{Wallet, WalletError, find_wallet},
    render::{render_history, render_summary, render_wallet_card},
    state::{AppConfig, TransactionStore},
};

/// walletview - wallet balances and transaction history from the command line
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Wallet API base URL (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token for the wallet API (overrides the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Transactions requested per page (overrides the config file)
    #[arg(long, global = true)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a wallet's transactions grouped by day
    History {
        /// Wallet to show
        wallet_id: String,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// JSON file with the user's wallets, used to label rows
        #[arg(long)]
        wallets: Option<PathBuf>,
        /// Treat the wallet as an aggregated view
        #[arg(long)]
        aggregated: bool,
        /// Replace cached data with a fresh first page
        #[arg(long)]
        refresh: bool,
    },
    /// Show a wallet's balance and money in/out summary
    Summary {
        /// Wallet to summarize
        wallet_id: String,
        /// JSON file with the user's wallets
        #[arg(long)]
        wallets: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config {
        /// Write the effective configuration back to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().with_overrides(cli.base_url, cli.token, cli.page_size);

    match cli.command {
        Commands::History {
            wallet_id,
            pages,
            wallets,
            aggregated,
            refresh,
        } => {
            let wallets = load_wallets(wallets.as_deref())?;
            let store = build_store(&config)?;
            show_history(&store, &wallet_id, pages, &wallets, aggregated, refresh).await
        }
        Commands::Summary { wallet_id, wallets } => {
            let wallets = load_wallets(wallets.as_deref())?;
            let store = build_store(&config)?;
            show_summary(&store, &wallet_id, &wallets).await
        }
        Commands::Config { save } => show_config(&config, save),
    }
}

fn build_store(config: &AppConfig) -> Result<TransactionStore<WalletClient>> {
    let client = WalletClient::from_config(config).map_err(WalletError::into_report)?;
    tracing::debug!(
        "Using wallet API at {} (page size {})",
        client.base_url(),
        client.page_size()
    );
    Ok(TransactionStore::new(client))
}

fn load_wallets(path: Option<&Path>) -> Result<Vec<Wallet>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)?;
    let wallets: Vec<Wallet> = serde_json::from_str(&content)
        .map_err(|e| WalletError::parse(format!("{}: {e}", path.display())).into_report())?;
    Ok(wallets)
}

/// Turn the store's last error into a command failure, dismissing it.
async fn take_error<S: TransactionSource>(store: &TransactionStore<S>) -> Result<()> {
    match store.transaction_error().await {
        Some(err) => {
            store.clear_transaction_error().await;
            Err(eyre!("{err}"))
        }
        None => Ok(()),
    }
}

async fn show_history<S: TransactionSource>(
    store: &TransactionStore<S>,
    wallet_id: &str,
    pages: u32,
    wallets: &[Wallet],
    aggregated: bool,
    refresh: bool,
) -> Result<()> {
    let wallet = Some(wallet_id);
    if refresh {
        store.refresh_transactions(wallet).await;
    } else {
        store.fetch_transactions(wallet, Some(FIRST_PAGE)).await;
    }
    take_error(store).await?;

    for _ in 1..pages {
        if !store.fetch_next_page(wallet).await {
            break;
        }
        take_error(store).await?;
    }

    let is_aggregated =
        aggregated || find_wallet(wallets, wallet_id).is_some_and(|w| w.is_aggregated);
    let sections = store.group_transactions(wallet).await;
    print!("{}", render_history(&sections, wallets, is_aggregated));

    if let Some(next) = store
        .transaction_paging(wallet)
        .await
        .and_then(|paging| paging.next_page())
    {
        println!("\nMore transactions available (page {next}), use --pages to load more.");
    }
    Ok(())
}

async fn show_summary<S: TransactionSource>(
    store: &TransactionStore<S>,
    wallet_id: &str,
    wallets: &[Wallet],
) -> Result<()> {
    let wallet = Some(wallet_id);
    store.ensure_transactions(wallet).await;
    take_error(store).await?;

    let summary = store.transaction_summary(wallet).await;
    match find_wallet(wallets, wallet_id) {
        Some(found) => print!("{}", render_wallet_card(found, summary.as_ref())),
        None => {
            let currency = store
                .wallet_transactions()
                .await
                .into_iter()
                .find(|record| record.wallet_id == wallet_id)
                .and_then(|record| record.data.first().map(|t| t.amount.currency.clone()))
                .unwrap_or_default();
            print!("{}", render_summary(summary.as_ref(), &currency));
        }
    }
    Ok(())
}

fn show_config(config: &AppConfig, save: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        config.save()?;
        println!("Saved.");
    }
    Ok(())
}
