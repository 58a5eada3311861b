pub mod api;
pub mod core;

pub use self::core::{
    Balance, OrderAck, OrderRecord, OrderRequest, OrderSide, OrderType, Position, TimeInForce,
    TradableSymbol,
};
