// Configuration structures and loading logic
// Secrets come from the environment (.env supported); everything else from an optional YAML file

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use crate::order::OrderRules;

pub const TESTNET_FUTURES_BASE: &str = "https://testnet.binancefuture.com";
pub const MAINNET_FUTURES_BASE: &str = "https://fapi.binance.com";

// ============================================================================
// Configuration Structures
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct BinanceCfg {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
    /// Route every request to the futures test network.
    #[serde(default = "default_testnet")]
    pub testnet: bool,
    /// Explicit REST base, overrides the testnet/mainnet choice.
    #[serde(default)]
    pub futures_base: Option<String>,
    /// Tolerance for residual clock drift on signed requests (Binance max: 60000)
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for BinanceCfg {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            testnet: default_testnet(),
            futures_base: None,
            recv_window_ms: default_recv_window(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl BinanceCfg {
    pub fn base_url(&self) -> String {
        match &self.futures_base {
            Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
            _ if self.testnet => TESTNET_FUTURES_BASE.to_string(),
            _ => MAINNET_FUTURES_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrderCfg {
    /// Local pre-check, mirrors the exchange's MIN_NOTIONAL filter
    #[serde(default = "default_min_notional")]
    pub min_notional: Decimal,
    /// Asset whose available balance backs the margin check
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    /// Used by the margin check when the account reports no leverage for a symbol
    #[serde(default = "default_leverage")]
    pub default_leverage: u32,
    #[serde(default = "default_recent_orders_limit")]
    pub recent_orders_limit: u32,
}

impl Default for OrderCfg {
    fn default() -> Self {
        Self {
            min_notional: default_min_notional(),
            quote_asset: default_quote_asset(),
            default_leverage: default_leverage(),
            recent_orders_limit: default_recent_orders_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppCfg {
    #[serde(default)]
    pub binance: BinanceCfg,
    #[serde(default)]
    pub order: OrderCfg,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            binance: BinanceCfg::default(),
            order: OrderCfg::default(),
            log_file: default_log_file(),
        }
    }
}

impl AppCfg {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("invalid YAML configuration")
    }

    /// Overlay credentials and network selection from the process environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("BINANCE_API_KEY") {
            self.binance.api_key = key.trim().to_string();
        }
        if let Some(secret) = lookup("BINANCE_SECRET_KEY") {
            self.binance.secret_key = secret.trim().to_string();
        }
        if let Some(raw) = lookup("BINANCE_TESTNET") {
            self.binance.testnet = parse_bool(&raw)
                .ok_or_else(|| anyhow!("BINANCE_TESTNET must be true/false, got '{}'", raw))?;
        }
        if let Some(base) = lookup("BINANCE_FUTURES_BASE") {
            self.binance.futures_base = Some(base.trim().to_string());
        }
        if let Some(path) = lookup("BOT_LOG_FILE") {
            self.log_file = path;
        }
        Ok(())
    }

    pub fn order_rules(&self) -> OrderRules {
        OrderRules {
            min_notional: self.order.min_notional,
            quote_asset: self.order.quote_asset.to_uppercase(),
            default_leverage: self.order.default_leverage,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_testnet() -> bool {
    true
}
fn default_recv_window() -> u64 {
    10_000
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_min_notional() -> Decimal {
    Decimal::ONE_HUNDRED
}
fn default_quote_asset() -> String {
    "USDT".to_string()
}
fn default_leverage() -> u32 {
    20
}
fn default_recent_orders_limit() -> u32 {
    5
}
fn default_log_file() -> String {
    "bot.log".to_string()
}

// ============================================================================
// Configuration Loading
// ============================================================================

/// Load configuration: optional YAML (`--config <path>`, default `./config.yaml`),
/// then environment overrides, then validation.
///
/// A missing default file is not an error; a missing explicit `--config` file is.
pub fn load_config() -> Result<AppCfg> {
    let args: Vec<String> = std::env::args().collect();
    let explicit = args.windows(2).find_map(|w| {
        if w[0] == "--config" {
            Some(w[1].clone())
        } else {
            None
        }
    });

    let mut cfg = match explicit {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {}", path))?;
            AppCfg::from_yaml_str(&content)?
        }
        None if Path::new("./config.yaml").exists() => {
            let content = std::fs::read_to_string("./config.yaml")
                .context("failed to read ./config.yaml")?;
            AppCfg::from_yaml_str(&content)?
        }
        None => AppCfg::default(),
    };

    cfg.apply_env(|key| std::env::var(key).ok())?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Validate configuration values
pub fn validate_config(cfg: &AppCfg) -> Result<()> {
    if cfg.binance.api_key.trim().is_empty() {
        return Err(anyhow!(
            "BINANCE_API_KEY is required but is empty. Set it in the environment or .env"
        ));
    }
    if cfg.binance.secret_key.trim().is_empty() {
        return Err(anyhow!(
            "BINANCE_SECRET_KEY is required but is empty. Set it in the environment or .env"
        ));
    }
    if cfg.binance.recv_window_ms == 0 || cfg.binance.recv_window_ms > 60_000 {
        return Err(anyhow!(
            "binance.recv_window_ms must be within 1..=60000, got {}",
            cfg.binance.recv_window_ms
        ));
    }
    if cfg.binance.http_timeout_secs == 0 {
        return Err(anyhow!("binance.http_timeout_secs must be greater than 0"));
    }
    if cfg.order.min_notional <= Decimal::ZERO {
        return Err(anyhow!("order.min_notional must be greater than 0"));
    }
    if cfg.order.quote_asset.trim().is_empty() {
        return Err(anyhow!("order.quote_asset must not be empty"));
    }
    if cfg.order.default_leverage == 0 {
        return Err(anyhow!("order.default_leverage must be greater than 0"));
    }
    if cfg.order.recent_orders_limit == 0 || cfg.order.recent_orders_limit > 1000 {
        return Err(anyhow!(
            "order.recent_orders_limit must be within 1..=1000, got {}",
            cfg.order.recent_orders_limit
        ));
    }
    Ok(())
}
