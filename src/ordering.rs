use crate::error::{ExchangeError, OperationError, OrderFailure, RejectionReason};
use crate::exec::Exchange;
use crate::types::{Balance, OrderAck, OrderRecord, OrderRequest, Position};
use tracing::{error, info};

pub type OrderResult = Result<OrderAck, OrderFailure>;

/// Send a validated order. Failures are classified and logged, never retried.
pub async fn submit<E>(exchange: &E, order: &OrderRequest) -> OrderResult
where
    E: Exchange + ?Sized,
{
    info!(
        symbol = %order.symbol,
        side = %order.side,
        order_type = %order.order_type,
        quantity = %order.quantity,
        price = ?order.price,
        "ORDERING: submitting order"
    );
    match exchange.create_order(order).await {
        Ok(ack) => {
            info!(
                symbol = %order.symbol,
                order_id = ack.order_id,
                status = %ack.status,
                "ORDERING: order accepted"
            );
            Ok(ack)
        }
        Err(err) => Err(failed("submit order", &order.symbol, err)),
    }
}

/// What a cancel token names: every open order, or one order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelTarget {
    All,
    Order(u64),
}

impl CancelTarget {
    pub fn parse(token: &str) -> Result<Self, RejectionReason> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("ALL") {
            return Ok(CancelTarget::All);
        }
        token
            .parse::<u64>()
            .map(CancelTarget::Order)
            .map_err(|_| RejectionReason::InvalidNumericInput {
                field: "order id",
                value: token.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    AllCancelled { symbol: String },
    Cancelled { symbol: String, order_id: u64 },
}

impl CancelOutcome {
    pub fn message(&self) -> String {
        match self {
            CancelOutcome::AllCancelled { symbol } => {
                format!("All open orders for {symbol} cancelled.")
            }
            CancelOutcome::Cancelled { symbol, order_id } => {
                format!("Order {order_id} on {symbol} cancelled.")
            }
        }
    }
}

/// Cancel one order by id, or all open orders when the token is "ALL".
/// Token and symbol are validated before any call.
pub async fn cancel<E>(
    exchange: &E,
    symbol: &str,
    token: &str,
) -> Result<CancelOutcome, OperationError>
where
    E: Exchange + ?Sized,
{
    let symbol = required_symbol(symbol)?;
    let target = CancelTarget::parse(token)?;
    info!(%symbol, ?target, "ORDERING: cancelling");
    let outcome = match target {
        CancelTarget::All => exchange
            .cancel_all_orders(&symbol)
            .await
            .map(|_| CancelOutcome::AllCancelled {
                symbol: symbol.clone(),
            }),
        CancelTarget::Order(order_id) => exchange
            .cancel_order(&symbol, order_id)
            .await
            .map(|_| CancelOutcome::Cancelled {
                symbol: symbol.clone(),
                order_id,
            }),
    };
    let outcome = outcome.map_err(|err| failed("cancel", &symbol, err))?;
    info!(%symbol, ?outcome, "ORDERING: cancel acknowledged");
    Ok(outcome)
}

pub async fn list_open_orders<E>(
    exchange: &E,
    symbol: &str,
) -> Result<Vec<OrderRecord>, OperationError>
where
    E: Exchange + ?Sized,
{
    let symbol = required_symbol(symbol)?;
    let orders = exchange
        .open_orders(&symbol)
        .await
        .map_err(|err| failed("list open orders", &symbol, err))?;
    info!(%symbol, count = orders.len(), "ORDERING: open orders fetched");
    Ok(orders)
}

/// Most recent orders for `symbol`, newest last as the exchange returns them.
pub async fn list_recent_orders<E>(
    exchange: &E,
    symbol: &str,
    limit: u32,
) -> Result<Vec<OrderRecord>, OperationError>
where
    E: Exchange + ?Sized,
{
    let symbol = required_symbol(symbol)?;
    let orders = exchange
        .recent_orders(&symbol, limit)
        .await
        .map_err(|err| failed("list recent orders", &symbol, err))?;
    info!(%symbol, count = orders.len(), "ORDERING: recent orders fetched");
    Ok(orders)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub balances: Vec<Balance>,
    pub positions: Vec<Position>,
}

pub async fn fetch_account<E>(exchange: &E) -> Result<AccountSnapshot, OrderFailure>
where
    E: Exchange + ?Sized,
{
    let balances = exchange
        .balances()
        .await
        .map_err(|err| failed("fetch balances", "-", err))?;
    let positions = exchange
        .positions()
        .await
        .map_err(|err| failed("fetch positions", "-", err))?;
    info!(
        balances = balances.len(),
        positions = positions.iter().filter(|p| p.is_open()).count(),
        "ORDERING: account fetched"
    );
    Ok(AccountSnapshot {
        balances,
        positions,
    })
}

fn required_symbol(symbol: &str) -> Result<String, RejectionReason> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        Err(RejectionReason::EmptySymbol)
    } else {
        Ok(symbol)
    }
}

fn failed(operation: &str, symbol: &str, err: ExchangeError) -> OrderFailure {
    let failure = OrderFailure::classify(&err);
    error!(operation, symbol, error = %err, ?failure, "ORDERING: exchange call failed");
    failure
}
