// Library crate for the terminal binary and integration tests

pub mod config;
pub mod connection;
pub mod error;
pub mod exec;
pub mod logging;
pub mod menu;
pub mod order;
pub mod ordering;
pub mod prompt;
pub mod report;
pub mod symbols;
pub mod types;

pub use connection::BinanceFutures;
pub use exec::Exchange;
