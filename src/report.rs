// Display formatting for account and order views. No I/O here.

use crate::types::{Balance, OrderRecord, Position};
use rust_decimal::Decimal;

pub fn format_balances(balances: &[Balance]) -> Vec<String> {
    let mut lines = vec!["Balances:".to_string()];
    let funded: Vec<&Balance> = balances
        .iter()
        .filter(|b| b.balance > Decimal::ZERO)
        .collect();
    if funded.is_empty() {
        lines.push("  No funded assets.".to_string());
    }
    for b in funded {
        lines.push(format!(
            "  {}: {} (available {})",
            b.asset,
            b.balance.normalize(),
            b.available.normalize()
        ));
    }
    lines
}

pub fn format_positions(positions: &[Position]) -> Vec<String> {
    let mut lines = vec!["Positions:".to_string()];
    let open: Vec<&Position> = positions.iter().filter(|p| p.is_open()).collect();
    if open.is_empty() {
        lines.push("  No open positions.".to_string());
    }
    for p in open {
        lines.push(format!(
            "  {} | {} {} @ {} | PnL {} | {}x",
            p.symbol,
            p.side_label(),
            p.amount.abs().normalize(),
            p.entry_price.normalize(),
            p.unrealized_pnl.normalize(),
            p.leverage
        ));
    }
    lines
}

pub fn format_open_orders(symbol: &str, orders: &[OrderRecord]) -> Vec<String> {
    let mut lines = vec![format!("Open orders for {symbol}:")];
    if orders.is_empty() {
        lines.push("  No open orders.".to_string());
    }
    lines.extend(orders.iter().map(|o| format!("  {}", order_line(o))));
    lines
}

/// The last `limit` entries of `orders`.
pub fn format_recent_orders(symbol: &str, orders: &[OrderRecord], limit: usize) -> Vec<String> {
    let mut lines = vec![format!("Recent orders for {symbol}:")];
    if orders.is_empty() {
        lines.push("  No recent orders.".to_string());
    }
    let skip = orders.len().saturating_sub(limit);
    for o in &orders[skip..] {
        let when = o
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!("  {} | {}", when, order_line(o)));
    }
    lines
}

fn order_line(o: &OrderRecord) -> String {
    format!(
        "#{} | {} {} {} @ {} | {}",
        o.order_id,
        o.side,
        o.order_type,
        o.quantity.normalize(),
        o.price.normalize(),
        o.status
    )
}
