use crate::error::ExchangeError;
use crate::types::{Balance, OrderAck, OrderRecord, OrderRequest, Position, TradableSymbol};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Capabilities the terminal needs from a derivatives exchange.
///
/// `connection::BinanceFutures` is the live implementation; tests plug in doubles.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn exchange_symbols(&self) -> Result<Vec<TradableSymbol>, ExchangeError>;
    async fn mark_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;
    async fn balances(&self) -> Result<Vec<Balance>, ExchangeError>;
    /// Every position slot the account reports, including flat ones.
    async fn positions(&self) -> Result<Vec<Position>, ExchangeError>;
    async fn open_orders(&self, symbol: &str) -> Result<Vec<OrderRecord>, ExchangeError>;
    async fn recent_orders(&self, symbol: &str, limit: u32)
        -> Result<Vec<OrderRecord>, ExchangeError>;
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderAck, ExchangeError>;
    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<(), ExchangeError>;
    async fn cancel_all_orders(&self, symbol: &str) -> Result<(), ExchangeError>;

    async fn available_balance(&self, asset: &str) -> Result<Decimal, ExchangeError> {
        let balances = self.balances().await?;
        Ok(balances
            .into_iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
            .map(|b| b.available)
            .unwrap_or(Decimal::ZERO))
    }

    async fn symbol_leverage(&self, symbol: &str) -> Result<Option<u32>, ExchangeError> {
        let positions = self.positions().await?;
        Ok(positions
            .into_iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
            .map(|p| p.leverage)
            .filter(|lev| *lev > 0))
    }
}
