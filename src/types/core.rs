use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn to_binance_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    /// Case-insensitive parse of "BUY" / "SELL".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(OrderSide::Buy),
            "SELL" => Some(OrderSide::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_binance_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn to_binance_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_binance_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInForce {
    Gtc,
}

impl TimeInForce {
    pub fn to_binance_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
        }
    }
}

/// One entry of the exchange's instrument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradableSymbol {
    pub symbol: String,
    pub status: String,
}

impl TradableSymbol {
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }
}

/// A normalized order, ready for submission.
///
/// `price` and `time_in_force` are set for LIMIT orders only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
}

impl OrderRequest {
    /// `quantity * effective_price`, or `None` when the product does not fit a `Decimal`.
    pub fn notional(&self, effective_price: Decimal) -> Option<Decimal> {
        self.quantity.checked_mul(effective_price)
    }
}

/// Exchange acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
    pub order_id: u64,
    pub status: String,
}

/// Open or historical order as reported by the exchange. Read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: u64,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub status: String,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub asset: String,
    pub balance: Decimal,
    pub available: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub amount: Decimal,
    pub entry_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub leverage: u32,
}

impl Position {
    pub fn is_open(&self) -> bool {
        !self.amount.is_zero()
    }

    pub fn side_label(&self) -> &'static str {
        if self.amount > Decimal::ZERO {
            "LONG"
        } else {
            "SHORT"
        }
    }
}
