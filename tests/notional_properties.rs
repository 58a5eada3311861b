// Minimum-notional rule over generated quantities and prices, up to the Decimal range

mod helpers;

use futures_terminal::error::RejectionReason;
use futures_terminal::order::{build_order, OrderRules};
use futures_terminal::types::{OrderRequest, OrderType, TimeInForce};
use helpers::FakeExchange;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(fut)
}

/// Positive decimals from dust to `Decimal::MAX`.
fn positive_decimal() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..=10_000_000, 0u32..=8).prop_map(|(m, scale)| Decimal::new(m, scale)),
        (1i64..=i64::MAX, 0u32..=2).prop_map(|(m, scale)| Decimal::new(m, scale)),
        // full 96-bit mantissa
        (1u64..=u64::MAX, any::<u32>())
            .prop_map(|(hi, lo)| Decimal::from_i128_with_scale(((hi as i128) << 32) | lo as i128, 0)),
        Just(Decimal::MAX),
        Just(Decimal::MAX - Decimal::ONE),
    ]
}

fn check(
    result: Result<OrderRequest, RejectionReason>,
    quantity: Decimal,
    price: Decimal,
    min: Decimal,
) -> Result<Option<OrderRequest>, TestCaseError> {
    match quantity.checked_mul(price) {
        None => {
            prop_assert_eq!(
                result,
                Err(RejectionReason::NotionalOverflow { quantity, price })
            );
            Ok(None)
        }
        Some(notional) if notional < min => {
            prop_assert_eq!(
                result,
                Err(RejectionReason::NotionalTooSmall {
                    actual: notional,
                    minimum: min,
                })
            );
            Ok(None)
        }
        Some(_) => {
            let order = result.map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
            prop_assert_eq!(order.symbol.as_str(), "BTCUSDT");
            prop_assert_eq!(order.quantity, quantity);
            Ok(Some(order))
        }
    }
}

proptest! {
    #[test]
    fn limit_orders_follow_the_minimum_notional(
        quantity in positive_decimal(),
        price in positive_decimal(),
    ) {
        let rules = OrderRules::default();
        let exchange = FakeExchange::new();
        let (qty, px) = (quantity.to_string(), price.to_string());
        let result = block_on(build_order(
            &exchange, &rules, "btcusdt", "buy", OrderType::Limit, &qty, Some(&px),
        ));

        if let Some(order) = check(result, quantity, price, rules.min_notional)? {
            prop_assert_eq!(order.price, Some(price));
            prop_assert_eq!(order.time_in_force, Some(TimeInForce::Gtc));
        }
        prop_assert!(exchange.calls().is_empty());
    }

    #[test]
    fn market_orders_follow_the_minimum_notional_at_mark(
        quantity in positive_decimal(),
        mark in positive_decimal(),
    ) {
        let rules = OrderRules::default();
        let exchange = FakeExchange::new().with_mark(mark);
        let qty = quantity.to_string();
        let result = block_on(build_order(
            &exchange, &rules, "btcusdt", "sell", OrderType::Market, &qty, None,
        ));

        if let Some(order) = check(result, quantity, mark, rules.min_notional)? {
            prop_assert_eq!(order.price, None);
            prop_assert_eq!(order.time_in_force, None);
        }
        prop_assert_eq!(exchange.calls(), vec!["mark_price BTCUSDT".to_string()]);
    }
}
