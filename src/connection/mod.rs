pub mod rest;

use crate::config::BinanceCfg;
use crate::error::ExchangeError;
use crate::exec::Exchange;
use crate::types::{Balance, OrderAck, OrderRecord, OrderRequest, Position, TradableSymbol};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::info;

/// Authenticated USDT-M futures REST client.
///
/// Credentials, recvWindow and the clock offset are fixed once the session starts.
pub struct BinanceFutures {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
    pub(crate) recv_window_ms: u64,
    pub(crate) server_time_offset: i64,
}

impl BinanceFutures {
    pub fn new(cfg: &BinanceCfg) -> Result<Self> {
        let http = Client::builder()
            .user_agent("futures-terminal/0.1")
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url(),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.secret_key.clone(),
            recv_window_ms: cfg.recv_window_ms,
            server_time_offset: 0,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn server_time_offset(&self) -> i64 {
        self.server_time_offset
    }

    /// Measure the exchange clock once; signed requests apply the offset afterwards.
    pub async fn sync_server_time(&mut self) -> Result<i64, ExchangeError> {
        let offset = rest::fetch_server_time_offset(self).await?;
        self.server_time_offset = offset;
        info!(
            offset_ms = offset,
            "server time synced (server {} client)",
            if offset >= 0 { "ahead of" } else { "behind" }
        );
        Ok(offset)
    }
}

#[async_trait]
impl Exchange for BinanceFutures {
    async fn exchange_symbols(&self) -> Result<Vec<TradableSymbol>, ExchangeError> {
        rest::fetch_exchange_symbols(self).await
    }

    async fn mark_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        rest::fetch_mark_price(self, symbol).await
    }

    async fn balances(&self) -> Result<Vec<Balance>, ExchangeError> {
        rest::fetch_balances(self).await
    }

    async fn positions(&self) -> Result<Vec<Position>, ExchangeError> {
        rest::fetch_positions(self).await
    }

    async fn open_orders(&self, symbol: &str) -> Result<Vec<OrderRecord>, ExchangeError> {
        rest::fetch_open_orders(self, symbol).await
    }

    async fn recent_orders(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<OrderRecord>, ExchangeError> {
        rest::fetch_recent_orders(self, symbol, limit).await
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderAck, ExchangeError> {
        rest::create_order(self, order).await
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<(), ExchangeError> {
        rest::cancel_order(self, symbol, order_id).await
    }

    async fn cancel_all_orders(&self, symbol: &str) -> Result<(), ExchangeError> {
        rest::cancel_all_orders(self, symbol).await
    }
}
