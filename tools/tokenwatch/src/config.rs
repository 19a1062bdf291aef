use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chain_eth::Address;
use serde::Deserialize;
use watch_core::TransferQuery;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TOKENWATCH_CONFIG";

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// How token balances are scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalsMode {
    /// Always divide by 10^18.
    #[default]
    Fixed,
    /// Ask the contract for `decimals()` first.
    Query,
}

/// Which window the transfer listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Only the latest block.
    #[default]
    Latest,
    /// The newest `limit` transfers, widening the block range as needed.
    Recent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransfersConfig {
    pub mode: TransferMode,
    pub limit: usize,
    pub initial_window: u64,
    pub max_window: u64,
    pub incoming_only: bool,
}

impl Default for TransfersConfig {
    fn default() -> Self {
        let query = TransferQuery::default();
        TransfersConfig {
            mode: TransferMode::default(),
            limit: query.limit,
            initial_window: query.initial_window,
            max_window: query.max_window,
            incoming_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rpc_url: String,
    pub wallet: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub token_decimals: DecimalsMode,
    pub transfers: TransfersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            wallet: None,
            token: None,
            timeout_secs: eth_rpc::DEFAULT_TIMEOUT.as_secs(),
            token_decimals: DecimalsMode::default(),
            transfers: TransfersConfig::default(),
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rpc_url: String,
    pub wallet: Address,
    pub token: Address,
    pub timeout: Duration,
    pub token_decimals: DecimalsMode,
    pub transfer_mode: TransferMode,
    pub transfer_query: TransferQuery,
}

impl Config {
    pub fn into_settings(self) -> Result<Settings> {
        let Some(wallet) = self.wallet else {
            bail!("no wallet address configured (set `wallet` or pass --wallet)");
        };
        let Some(token) = self.token else {
            bail!("no token contract configured (set `token` or pass --token)");
        };
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be positive");
        }

        let wallet = Address::parse(&wallet).with_context(|| format!("invalid wallet {wallet:?}"))?;
        let token = Address::parse(&token).with_context(|| format!("invalid token {token:?}"))?;

        let transfers = self.transfers;
        Ok(Settings {
            rpc_url: self.rpc_url,
            wallet,
            token,
            timeout: Duration::from_secs(self.timeout_secs),
            token_decimals: self.token_decimals,
            transfer_mode: transfers.mode,
            transfer_query: TransferQuery {
                limit: transfers.limit,
                initial_window: transfers.initial_window,
                max_window: transfers.max_window,
                recipient: transfers.incoming_only.then_some(wallet),
            },
        })
    }
}

/// Loads the config file.
///
/// An explicit path (argument or `TOKENWATCH_CONFIG`) must exist; the
/// default location falls back to built-in defaults when absent.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    if let Some(path) = explicit {
        return read(&path);
    }

    match config_path() {
        Some(path) if path.is_file() => read(&path),
        _ => Ok(Config::default()),
    }
}

fn read(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&content).with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn config_path() -> Option<PathBuf> {
    config_path_from(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
}

/// Default config location: `$XDG_CONFIG_HOME`, then `$HOME/.config`, then
/// the platform config directory. Empty variables are ignored.
fn config_path_from(xdg: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg) = xdg.filter(|v| !v.is_empty()).map(PathBuf::from) {
        return Some(xdg.join("tokenwatch").join("config.toml"));
    }
    if let Some(home) = home.filter(|v| !v.is_empty()).map(PathBuf::from) {
        return Some(home.join(".config").join("tokenwatch").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "tokenwatch", "tokenwatch")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
