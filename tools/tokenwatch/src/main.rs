mod config;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chain_eth::Amount;
use clap::Parser;
use eth_rpc::{HttpTransport, Transport, TransportConfig};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use watch_core::{
    eth_balance, latest_transfers, latest_transfers_to, recent_transfers, token_balance,
    token_balance_scaled, QueryError, TransferRecord,
};

use crate::config::{DecimalsMode, Settings, TransferMode};

#[derive(Debug, Parser)]
#[command(
    name = "tokenwatch",
    version,
    about = "Recent ERC-20 transfers plus ETH and token balances over Ethereum JSON-RPC"
)]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/tokenwatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// Wallet address whose balances are queried
    #[arg(long)]
    wallet: Option<String>,

    /// ERC-20 token contract address
    #[arg(long)]
    token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// List the newest N transfers instead of only the latest block
    #[arg(long, value_name = "N")]
    recent: Option<usize>,

    /// Only list transfers sent to the wallet
    #[arg(long)]
    incoming: bool,

    /// Scale the token balance by the contract's decimals() instead of 18
    #[arg(long)]
    query_decimals: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        let mut config = config::load(self.config.as_deref())?;

        if let Some(rpc) = &self.rpc {
            config.rpc_url = rpc.clone();
        }
        if let Some(wallet) = &self.wallet {
            config.wallet = Some(wallet.clone());
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(limit) = self.recent {
            config.transfers.mode = TransferMode::Recent;
            config.transfers.limit = limit;
        }
        if self.incoming {
            config.transfers.incoming_only = true;
        }
        if self.query_decimals {
            config.token_decimals = DecimalsMode::Query;
        }

        config.into_settings()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let settings = args.settings()?;

    let transport = HttpTransport::with_config(
        &TransportConfig::new(&settings.rpc_url).timeout(settings.timeout),
    )
    .context("failed to set up RPC transport")?;

    info!(rpc = transport.url(), wallet = %settings.wallet, token = %settings.token, "querying");

    let report = query(&transport, &settings).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print!("{report}");
    }

    let failed = report.failures();
    if failed > 0 {
        warn!(failed, "some queries failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Outcome of the three independent queries. One failing never hides the others.
struct Report {
    transfers: Result<Vec<TransferRecord>, QueryError>,
    eth_balance: Result<Amount, QueryError>,
    token_balance: Result<Amount, QueryError>,
}

impl Report {
    fn failures(&self) -> usize {
        [
            self.transfers.is_err(),
            self.eth_balance.is_err(),
            self.token_balance.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }

    fn to_json(&self) -> Value {
        let transfers: Value = match &self.transfers {
            Ok(records) => records.iter().map(transfer_json).collect(),
            Err(e) => json!({ "error": e.to_string() }),
        };

        json!({
            "transfers": transfers,
            "eth_balance": amount_json(&self.eth_balance),
            "token_balance": amount_json(&self.token_balance),
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.transfers {
            Ok(records) => {
                writeln!(f, "Transfers ({}):", records.len())?;
                for record in records {
                    writeln!(f, "  from {} to {} value {}", record.from, record.to, record.value)?;
                }
            }
            Err(e) => writeln!(f, "Transfers: unavailable ({e})")?,
        }

        match &self.eth_balance {
            Ok(amount) => writeln!(f, "ETH balance: {amount}")?,
            Err(e) => writeln!(f, "ETH balance: unavailable ({e})")?,
        }

        match &self.token_balance {
            Ok(amount) => writeln!(f, "Token balance: {amount}"),
            Err(e) => writeln!(f, "Token balance: unavailable ({e})"),
        }
    }
}

fn transfer_json(record: &TransferRecord) -> Value {
    json!({
        "from": record.from,
        "to": record.to,
        "value": record.value.to_string(),
        "block_number": record.block_number,
        "log_index": record.log_index,
        "transaction_hash": record.transaction_hash,
    })
}

fn amount_json(result: &Result<Amount, QueryError>) -> Value {
    match result {
        Ok(amount) => json!({
            "value": amount.to_string(),
            "raw": amount.raw.to_string(),
            "decimals": amount.decimals,
        }),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

/// Runs the transfer, ETH balance and token balance queries concurrently.
async fn query<T: Transport + ?Sized>(transport: &T, settings: &Settings) -> Report {
    let token = async {
        match settings.token_decimals {
            DecimalsMode::Fixed => {
                token_balance(transport, &settings.token, &settings.wallet).await
            }
            DecimalsMode::Query => {
                token_balance_scaled(transport, &settings.token, &settings.wallet).await
            }
        }
    };

    let (transfers, eth_balance, token_balance) = tokio::join!(
        transfers(transport, settings),
        eth_balance(transport, &settings.wallet),
        token
    );

    Report {
        transfers,
        eth_balance,
        token_balance,
    }
}

async fn transfers<T: Transport + ?Sized>(
    transport: &T,
    settings: &Settings,
) -> Result<Vec<TransferRecord>, QueryError> {
    let token = &settings.token;
    let query = &settings.transfer_query;

    match (settings.transfer_mode, &query.recipient) {
        (TransferMode::Latest, None) => latest_transfers(transport, token).await,
        (TransferMode::Latest, Some(to)) => latest_transfers_to(transport, token, to).await,
        (TransferMode::Recent, _) => recent_transfers(transport, token, query).await,
    }
}
