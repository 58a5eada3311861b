pub mod fake_exchange;
pub mod log_capture;

pub use fake_exchange::{Fail, FakeExchange};
pub use log_capture::{capture_logs, LogCapture};
