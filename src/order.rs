// ORDER: builds a normalized order request from raw console input and
// applies the pre-submission checks (minimum notional, margin).

use crate::error::RejectionReason;
use crate::exec::Exchange;
use crate::prompt::parse_positive_decimal;
use crate::types::{OrderRequest, OrderSide, OrderType, TimeInForce};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Business rules applied before anything is sent to the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRules {
    pub min_notional: Decimal,
    pub quote_asset: String,
    pub default_leverage: u32,
}

impl Default for OrderRules {
    fn default() -> Self {
        Self {
            min_notional: Decimal::ONE_HUNDRED,
            quote_asset: "USDT".to_string(),
            default_leverage: 20,
        }
    }
}

/// A validated request together with the price its notional was checked at.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedOrder {
    pub request: OrderRequest,
    /// Limit price, or the mark price seen at build time for MARKET orders.
    pub effective_price: Decimal,
    notional: Decimal,
}

impl PreparedOrder {
    pub fn notional(&self) -> Decimal {
        self.notional
    }
}

fn checked_notional(quantity: Decimal, price: Decimal) -> Result<Decimal, RejectionReason> {
    quantity
        .checked_mul(price)
        .ok_or(RejectionReason::NotionalOverflow { quantity, price })
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarginCheck {
    Sufficient { required: Decimal, available: Decimal },
    /// Account data was unavailable; the exchange still checks on submission.
    Skipped,
}

/// Validate raw input and assemble an [`OrderRequest`].
pub async fn build_order<E>(
    exchange: &E,
    rules: &OrderRules,
    symbol: &str,
    side: &str,
    order_type: OrderType,
    quantity: &str,
    price: Option<&str>,
) -> Result<OrderRequest, RejectionReason>
where
    E: Exchange + ?Sized,
{
    prepare_order(exchange, rules, symbol, side, order_type, quantity, price)
        .await
        .map(|prepared| prepared.request)
}

/// [`build_order`], keeping the effective price for the margin check.
///
/// Only the MARKET path touches the network (mark price). A LIMIT order whose
/// notional is too small is rejected without any call.
pub async fn prepare_order<E>(
    exchange: &E,
    rules: &OrderRules,
    symbol: &str,
    side: &str,
    order_type: OrderType,
    quantity: &str,
    price: Option<&str>,
) -> Result<PreparedOrder, RejectionReason>
where
    E: Exchange + ?Sized,
{
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(RejectionReason::EmptySymbol);
    }
    let side = OrderSide::parse(side)
        .ok_or_else(|| RejectionReason::InvalidSide(side.trim().to_string()))?;

    let quantity = parse_positive_decimal(quantity).ok_or_else(|| {
        RejectionReason::InvalidNumericInput {
            field: "quantity",
            value: quantity.trim().to_string(),
        }
    })?;

    let limit_price = match order_type {
        OrderType::Limit => {
            let raw = price.unwrap_or_default();
            let parsed = parse_positive_decimal(raw).ok_or_else(|| {
                RejectionReason::InvalidNumericInput {
                    field: "price",
                    value: raw.trim().to_string(),
                }
            })?;
            Some(parsed)
        }
        OrderType::Market => None,
    };

    let effective_price = match limit_price {
        Some(p) => p,
        None => exchange.mark_price(&symbol).await.map_err(|err| {
            warn!(%symbol, error = %err, "ORDER: mark price lookup failed");
            RejectionReason::PriceUnavailable {
                symbol: symbol.clone(),
                detail: err.to_string(),
            }
        })?,
    };

    let notional = checked_notional(quantity, effective_price)?;
    if notional < rules.min_notional {
        return Err(RejectionReason::NotionalTooSmall {
            actual: notional,
            minimum: rules.min_notional,
        });
    }

    let request = OrderRequest {
        symbol,
        side,
        order_type,
        quantity,
        price: limit_price,
        time_in_force: limit_price.map(|_| TimeInForce::Gtc),
    };
    debug!(?request, %effective_price, %notional, "ORDER: request built");
    Ok(PreparedOrder {
        request,
        effective_price,
        notional,
    })
}

/// Advisory margin check: `notional / leverage` against the available quote balance.
///
/// Leverage comes from the account's position slot for the symbol, or
/// `rules.default_leverage` when the account reports none.
pub async fn check_margin<E>(
    exchange: &E,
    rules: &OrderRules,
    request: &OrderRequest,
    effective_price: Decimal,
) -> Result<MarginCheck, RejectionReason>
where
    E: Exchange + ?Sized,
{
    let notional = checked_notional(request.quantity, effective_price)?;
    let leverage = match exchange.symbol_leverage(&request.symbol).await {
        Ok(Some(lev)) => lev,
        Ok(None) => rules.default_leverage,
        Err(err) => {
            warn!(symbol = %request.symbol, error = %err, "ORDER: leverage lookup failed, assuming default");
            rules.default_leverage
        }
    };
    let available = match exchange.available_balance(&rules.quote_asset).await {
        Ok(available) => available,
        Err(err) => {
            warn!(asset = %rules.quote_asset, error = %err, "ORDER: balance unavailable, margin check skipped");
            return Ok(MarginCheck::Skipped);
        }
    };

    let required = notional / Decimal::from(leverage.max(1));
    debug!(%required, %available, leverage, "ORDER: margin check");
    if available < required {
        return Err(RejectionReason::InsufficientMargin {
            required,
            available,
        });
    }
    Ok(MarginCheck::Sufficient {
        required,
        available,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_rules() {
        let rules = OrderRules::default();
        assert_eq!(rules.min_notional, dec!(100));
        assert_eq!(rules.quote_asset, "USDT");
        assert_eq!(rules.default_leverage, 20);
    }
}
