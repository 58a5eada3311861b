// Error taxonomy: exchange/transport failures, local rejections, prompt I/O.

use rust_decimal::Decimal;
use thiserror::Error;

pub const CODE_INVALID_SIGNATURE: i64 = -1022;
pub const CODE_INVALID_SYMBOL: i64 = -1121;
pub const CODE_REJECTED_MBX_KEY: i64 = -2014;
pub const CODE_INVALID_API_KEY: i64 = -2015;
pub const CODE_MARGIN_INSUFFICIENT: i64 = -2019;
pub const CODE_MIN_NOTIONAL: i64 = -4164;

/// Raw failure of a call to the exchange, before classification.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The exchange answered with an error document.
    #[error("binance api error {code} (http {status}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },
    /// Non-success HTTP status without a parseable error document.
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    /// No response: connect failure, timeout, reset.
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("{0}")]
    Credentials(&'static str),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_builder() {
            ExchangeError::Decode(err.to_string())
        } else {
            ExchangeError::Transport(err.to_string())
        }
    }
}

/// Local validation failure. Never reaches the exchange.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectionReason {
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("invalid side '{0}', expected BUY or SELL")]
    InvalidSide(String),
    #[error("invalid {field} '{value}': must be a positive number")]
    InvalidNumericInput { field: &'static str, value: String },
    #[error("mark price unavailable for {symbol}: {detail}")]
    PriceUnavailable { symbol: String, detail: String },
    #[error("order notional {actual} below minimum {minimum}")]
    NotionalTooSmall { actual: Decimal, minimum: Decimal },
    #[error("order notional of {quantity} x {price} is out of range")]
    NotionalOverflow { quantity: Decimal, price: Decimal },
    #[error("insufficient margin: requires {required}, available {available}")]
    InsufficientMargin { required: Decimal, available: Decimal },
}

impl RejectionReason {
    pub fn guidance(&self) -> String {
        match self {
            RejectionReason::EmptySymbol => "Symbol is required (e.g. BTCUSDT).".to_string(),
            RejectionReason::InvalidSide(_) => "Invalid side. Type BUY or SELL.".to_string(),
            RejectionReason::InvalidNumericInput { field, value } => {
                format!("Invalid {field} '{value}'. Must be a positive number.")
            }
            RejectionReason::PriceUnavailable { symbol, .. } => format!(
                "Could not fetch the mark price for {symbol}; order not sent. Check the symbol and your connection."
            ),
            RejectionReason::NotionalTooSmall { actual, minimum } => format!(
                "Order value too small (${:.2}). Must be >= ${}.",
                actual,
                minimum.normalize()
            ),
            RejectionReason::NotionalOverflow { .. } => {
                "Order value is too large to compute. Reduce the quantity or price.".to_string()
            }
            RejectionReason::InsufficientMargin {
                required,
                available,
            } => format!(
                "Insufficient margin: order needs ~${:.2} but only ${:.2} is available. Reduce size or add testnet funds.",
                required, available
            ),
        }
    }
}

/// Classified failure of an exchange operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFailure {
    #[error("invalid symbol")]
    InvalidSymbol,
    #[error("order notional below exchange minimum")]
    NotionalTooSmall,
    #[error("insufficient margin")]
    InsufficientMargin,
    #[error("unauthorized")]
    Unauthorized,
    #[error("api error {code}: {message}")]
    ApiError { code: i64, message: String },
    #[error("network unavailable: {detail}")]
    NetworkUnavailable { detail: String },
    #[error("unexpected error: {detail}")]
    UnexpectedError { detail: String },
}

impl OrderFailure {
    pub fn classify(err: &ExchangeError) -> Self {
        match err {
            ExchangeError::Api { code, message, .. } => match *code {
                CODE_INVALID_SYMBOL => OrderFailure::InvalidSymbol,
                CODE_MIN_NOTIONAL => OrderFailure::NotionalTooSmall,
                CODE_MARGIN_INSUFFICIENT => OrderFailure::InsufficientMargin,
                CODE_INVALID_API_KEY | CODE_REJECTED_MBX_KEY | CODE_INVALID_SIGNATURE => {
                    OrderFailure::Unauthorized
                }
                code => OrderFailure::ApiError {
                    code,
                    message: message.clone(),
                },
            },
            ExchangeError::Http { status, .. } if *status == 401 || *status == 403 => {
                OrderFailure::Unauthorized
            }
            ExchangeError::Http { status, body } => OrderFailure::UnexpectedError {
                detail: format!("http {status}: {body}"),
            },
            ExchangeError::Transport(detail) => OrderFailure::NetworkUnavailable {
                detail: detail.clone(),
            },
            ExchangeError::Decode(detail) => OrderFailure::UnexpectedError {
                detail: detail.clone(),
            },
            ExchangeError::Credentials(_) => OrderFailure::Unauthorized,
        }
    }

    pub fn guidance(&self) -> String {
        match self {
            OrderFailure::InvalidSymbol => {
                "Error: Invalid symbol. Check the available trading pairs.".to_string()
            }
            OrderFailure::NotionalTooSmall => {
                "Error: Order's notional must be >= $100. Increase quantity or adjust price."
                    .to_string()
            }
            OrderFailure::InsufficientMargin => {
                "Error: Insufficient margin. Add more funds to your testnet wallet.".to_string()
            }
            OrderFailure::Unauthorized => {
                "Error: Invalid API key or permissions. Check your .env and API settings."
                    .to_string()
            }
            OrderFailure::ApiError { code, message } => {
                format!("Binance API Error ({code}): {message}")
            }
            OrderFailure::NetworkUnavailable { .. } => {
                "Network issue: Binance server unreachable. The request's outcome is unknown; check open orders before retrying."
                    .to_string()
            }
            OrderFailure::UnexpectedError { detail } => format!("Unexpected error: {detail}"),
        }
    }
}

impl From<ExchangeError> for OrderFailure {
    fn from(err: ExchangeError) -> Self {
        OrderFailure::classify(&err)
    }
}

/// Outcome of a read-side or cancel operation that can fail locally or remotely.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error(transparent)]
    Rejected(#[from] RejectionReason),
    #[error(transparent)]
    Failed(#[from] OrderFailure),
}

impl OperationError {
    pub fn guidance(&self) -> String {
        match self {
            OperationError::Rejected(reason) => reason.guidance(),
            OperationError::Failed(failure) => failure.guidance(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed")]
    InputClosed,
    #[error("console i/o: {0}")]
    Io(#[from] std::io::Error),
}
