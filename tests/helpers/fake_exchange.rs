// In-memory exchange double: canned account state, scripted failures and a call log.

use async_trait::async_trait;
use futures_terminal::error::ExchangeError;
use futures_terminal::exec::Exchange;
use futures_terminal::types::{
    Balance, OrderAck, OrderRecord, OrderRequest, Position, TradableSymbol,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Failure a faked call answers with.
#[derive(Debug, Clone, Copy)]
pub enum Fail {
    Api(i64),
    Http(u16),
    Transport,
}

impl Fail {
    fn to_error(self) -> ExchangeError {
        match self {
            Fail::Api(code) => ExchangeError::Api {
                status: 400,
                code,
                message: format!("simulated rejection {code}"),
            },
            Fail::Http(status) => ExchangeError::Http {
                status,
                body: String::new(),
            },
            Fail::Transport => ExchangeError::Transport("connection refused".to_string()),
        }
    }
}

pub struct FakeExchange {
    pub symbols: Vec<TradableSymbol>,
    pub mark: Decimal,
    pub balances: Vec<Balance>,
    pub positions: Vec<Position>,
    pub open: Vec<OrderRecord>,
    pub recent: Vec<OrderRecord>,
    failures: HashMap<&'static str, Fail>,
    next_order_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    created: Mutex<Vec<OrderRequest>>,
}

impl FakeExchange {
    /// BTCUSDT and ETHUSDT trading at 60000, 1000 USDT available, flat account.
    pub fn new() -> Self {
        Self {
            symbols: vec![
                symbol("BTCUSDT", "TRADING"),
                symbol("ETHUSDT", "TRADING"),
                symbol("OLDUSDT", "SETTLING"),
            ],
            mark: dec!(60000),
            balances: vec![Balance {
                asset: "USDT".to_string(),
                balance: dec!(1000),
                available: dec!(1000),
            }],
            positions: Vec::new(),
            open: Vec::new(),
            recent: Vec::new(),
            failures: HashMap::new(),
            next_order_id: AtomicU64::new(1000),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Make every call to `op` (a trait method name) fail.
    pub fn failing(mut self, op: &'static str, fail: Fail) -> Self {
        self.failures.insert(op, fail);
        self
    }

    pub fn with_mark(mut self, mark: Decimal) -> Self {
        self.mark = mark;
        self
    }

    pub fn with_available(mut self, available: Decimal) -> Self {
        self.balances = vec![Balance {
            asset: "USDT".to_string(),
            balance: available,
            available,
        }];
        self
    }

    pub fn with_leverage(mut self, symbol: &str, leverage: u32) -> Self {
        self.positions.push(Position {
            symbol: symbol.to_string(),
            amount: Decimal::ZERO,
            entry_price: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            leverage,
        });
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    pub fn with_open_orders(mut self, orders: Vec<OrderRecord>) -> Self {
        self.open = orders;
        self
    }

    pub fn with_recent_orders(mut self, orders: Vec<OrderRecord>) -> Self {
        self.recent = orders;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    pub fn created(&self) -> Vec<OrderRequest> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, call: String) -> Result<(), ExchangeError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.get(op) {
            Some(fail) => Err(fail.to_error()),
            None => Ok(()),
        }
    }
}

pub fn symbol(name: &str, status: &str) -> TradableSymbol {
    TradableSymbol {
        symbol: name.to_string(),
        status: status.to_string(),
    }
}

pub fn order_record(order_id: u64, symbol: &str, status: &str) -> OrderRecord {
    OrderRecord {
        order_id,
        symbol: symbol.to_string(),
        side: "BUY".to_string(),
        order_type: "LIMIT".to_string(),
        quantity: dec!(0.01),
        price: dec!(59000),
        status: status.to_string(),
        time: None,
    }
}

#[async_trait]
impl Exchange for FakeExchange {
    async fn exchange_symbols(&self) -> Result<Vec<TradableSymbol>, ExchangeError> {
        self.record("exchange_symbols", "exchange_symbols".to_string())?;
        Ok(self.symbols.clone())
    }

    async fn mark_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        self.record("mark_price", format!("mark_price {symbol}"))?;
        Ok(self.mark)
    }

    async fn balances(&self) -> Result<Vec<Balance>, ExchangeError> {
        self.record("balances", "balances".to_string())?;
        Ok(self.balances.clone())
    }

    async fn positions(&self) -> Result<Vec<Position>, ExchangeError> {
        self.record("positions", "positions".to_string())?;
        Ok(self.positions.clone())
    }

    async fn open_orders(&self, symbol: &str) -> Result<Vec<OrderRecord>, ExchangeError> {
        self.record("open_orders", format!("open_orders {symbol}"))?;
        Ok(self.open.clone())
    }

    async fn recent_orders(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<OrderRecord>, ExchangeError> {
        self.record("recent_orders", format!("recent_orders {symbol} {limit}"))?;
        Ok(self.recent.clone())
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderAck, ExchangeError> {
        self.record("create_order", format!("create_order {}", order.symbol))?;
        self.created.lock().unwrap().push(order.clone());
        Ok(OrderAck {
            order_id: self.next_order_id.fetch_add(1, Ordering::SeqCst),
            status: "NEW".to_string(),
        })
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<(), ExchangeError> {
        self.record("cancel_order", format!("cancel_order {symbol} {order_id}"))
    }

    async fn cancel_all_orders(&self, symbol: &str) -> Result<(), ExchangeError> {
        self.record("cancel_all_orders", format!("cancel_all_orders {symbol}"))
    }
}
