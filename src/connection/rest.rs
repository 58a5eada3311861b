use crate::connection::BinanceFutures;
use crate::error::ExchangeError;
use crate::types::{
    api::{
        AccountResponse, ApiErrorBody, ExchangeInfoResponse, FutOrder, FutPlacedOrder,
        FuturesBalance, PremiumIndex, ServerTimeResponse,
    },
    Balance, OrderAck, OrderRecord, OrderRequest, Position, TradableSymbol,
};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Method, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::str::FromStr;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub(crate) async fn fetch_exchange_symbols(
    conn: &BinanceFutures,
) -> Result<Vec<TradableSymbol>, ExchangeError> {
    let url = format!("{}/fapi/v1/exchangeInfo", conn.base_url);
    let info: ExchangeInfoResponse = send_json(conn.http.get(url)).await?;
    Ok(info
        .symbols
        .into_iter()
        .map(|s| TradableSymbol {
            symbol: s.symbol,
            status: s.status,
        })
        .collect())
}

pub(crate) async fn fetch_mark_price(
    conn: &BinanceFutures,
    symbol: &str,
) -> Result<Decimal, ExchangeError> {
    let url = format!("{}/fapi/v1/premiumIndex", conn.base_url);
    let premium: PremiumIndex = send_json(conn.http.get(url).query(&[("symbol", symbol)])).await?;
    let mark = str_dec("markPrice", &premium.mark_price)?;
    if mark <= Decimal::ZERO {
        return Err(ExchangeError::Decode(format!(
            "non-positive mark price {} for {}",
            mark, symbol
        )));
    }
    Ok(mark)
}

pub(crate) async fn fetch_balances(conn: &BinanceFutures) -> Result<Vec<Balance>, ExchangeError> {
    let records: Vec<FuturesBalance> =
        send_json(signed(conn, Method::GET, "/fapi/v2/balance", Vec::new())?).await?;
    records
        .into_iter()
        .map(|b| {
            Ok(Balance {
                balance: str_dec("balance", &b.balance)?,
                available: str_dec("availableBalance", &b.available_balance)?,
                asset: b.asset,
            })
        })
        .collect()
}

pub(crate) async fn fetch_positions(
    conn: &BinanceFutures,
) -> Result<Vec<Position>, ExchangeError> {
    let account: AccountResponse =
        send_json(signed(conn, Method::GET, "/fapi/v2/account", Vec::new())?).await?;
    account
        .positions
        .into_iter()
        .map(|p| {
            Ok(Position {
                amount: str_dec("positionAmt", &p.position_amt)?,
                entry_price: opt_dec("entryPrice", p.entry_price.as_deref())?,
                unrealized_pnl: opt_dec("unrealizedProfit", p.unrealized_profit.as_deref())?,
                leverage: p
                    .leverage
                    .as_deref()
                    .and_then(|lev| lev.parse::<u32>().ok())
                    .unwrap_or(0),
                symbol: p.symbol,
            })
        })
        .collect()
}

pub(crate) async fn fetch_open_orders(
    conn: &BinanceFutures,
    symbol: &str,
) -> Result<Vec<OrderRecord>, ExchangeError> {
    let params = vec![("symbol".to_string(), symbol.to_string())];
    let orders: Vec<FutOrder> =
        send_json(signed(conn, Method::GET, "/fapi/v1/openOrders", params)?).await?;
    orders.into_iter().map(order_record).collect()
}

pub(crate) async fn fetch_recent_orders(
    conn: &BinanceFutures,
    symbol: &str,
    limit: u32,
) -> Result<Vec<OrderRecord>, ExchangeError> {
    let params = vec![
        ("symbol".to_string(), symbol.to_string()),
        ("limit".to_string(), limit.to_string()),
    ];
    let orders: Vec<FutOrder> =
        send_json(signed(conn, Method::GET, "/fapi/v1/allOrders", params)?).await?;
    orders.into_iter().map(order_record).collect()
}

pub(crate) async fn create_order(
    conn: &BinanceFutures,
    order: &OrderRequest,
) -> Result<OrderAck, ExchangeError> {
    let mut params = vec![
        ("symbol".to_string(), order.symbol.clone()),
        ("side".to_string(), order.side.to_binance_str().to_string()),
        ("type".to_string(), order.order_type.to_binance_str().to_string()),
        ("quantity".to_string(), order.quantity.normalize().to_string()),
    ];
    if let Some(price) = order.price {
        params.push(("price".to_string(), price.normalize().to_string()));
    }
    if let Some(tif) = order.time_in_force {
        params.push(("timeInForce".to_string(), tif.to_binance_str().to_string()));
    }
    params.push(("newOrderRespType".to_string(), "RESULT".to_string()));

    let placed: FutPlacedOrder =
        send_json(signed(conn, Method::POST, "/fapi/v1/order", params)?).await?;
    Ok(OrderAck {
        order_id: placed.order_id,
        status: placed.status.unwrap_or_else(|| "NEW".to_string()),
    })
}

pub(crate) async fn cancel_order(
    conn: &BinanceFutures,
    symbol: &str,
    order_id: u64,
) -> Result<(), ExchangeError> {
    let params = vec![
        ("symbol".to_string(), symbol.to_string()),
        ("orderId".to_string(), order_id.to_string()),
    ];
    send_void(signed(conn, Method::DELETE, "/fapi/v1/order", params)?).await
}

pub(crate) async fn cancel_all_orders(
    conn: &BinanceFutures,
    symbol: &str,
) -> Result<(), ExchangeError> {
    let params = vec![("symbol".to_string(), symbol.to_string())];
    send_void(signed(conn, Method::DELETE, "/fapi/v1/allOpenOrders", params)?).await
}

/// Server-minus-local clock offset in ms, measured against the request midpoint.
pub(crate) async fn fetch_server_time_offset(conn: &BinanceFutures) -> Result<i64, ExchangeError> {
    let url = format!("{}/fapi/v1/time", conn.base_url);
    let client_time_before = Utc::now().timestamp_millis();
    let resp: ServerTimeResponse = send_json(conn.http.get(url)).await?;
    let client_time_after = Utc::now().timestamp_millis();
    let client_time_midpoint = (client_time_before + client_time_after) / 2;
    Ok(resp.server_time - client_time_midpoint)
}

// ---- helpers ----

fn order_record(o: FutOrder) -> Result<OrderRecord, ExchangeError> {
    Ok(OrderRecord {
        quantity: str_dec("origQty", &o.orig_qty)?,
        price: str_dec("price", &o.price)?,
        time: o.time.and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        order_id: o.order_id,
        symbol: o.symbol,
        side: o.side,
        order_type: o.order_type,
        status: o.status,
    })
}

fn str_dec(field: &str, raw: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(raw.trim())
        .map_err(|err| ExchangeError::Decode(format!("field {field}: '{raw}' is not a decimal: {err}")))
}

fn opt_dec(field: &str, raw: Option<&str>) -> Result<Decimal, ExchangeError> {
    match raw {
        Some(v) if !v.trim().is_empty() => str_dec(field, v),
        _ => Ok(Decimal::ZERO),
    }
}

fn synced_timestamp(conn: &BinanceFutures) -> i64 {
    Utc::now().timestamp_millis() + conn.server_time_offset
}

pub(crate) fn ensure_credentials(conn: &BinanceFutures) -> Result<(), ExchangeError> {
    if conn.api_key.is_empty() || conn.api_secret.is_empty() {
        Err(ExchangeError::Credentials("Binance API key/secret required"))
    } else {
        Ok(())
    }
}

/// Hex HMAC-SHA256 of `payload` under `secret`.
pub(crate) fn signature(secret: &str, payload: &str) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ExchangeError::Credentials("failed to init request signer"))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub(crate) fn sign_params(
    conn: &BinanceFutures,
    mut params: Vec<(String, String)>,
) -> Result<String, ExchangeError> {
    params.push(("timestamp".into(), synced_timestamp(conn).to_string()));
    if conn.recv_window_ms > 0 {
        params.push(("recvWindow".into(), conn.recv_window_ms.to_string()));
    }
    let query = serde_urlencoded::to_string(&params)
        .map_err(|err| ExchangeError::Decode(format!("failed to encode query: {err}")))?;
    let sig = signature(&conn.api_secret, &query)?;
    Ok(format!("{query}&signature={sig}"))
}

fn signed(
    conn: &BinanceFutures,
    method: Method,
    path: &str,
    params: Vec<(String, String)>,
) -> Result<RequestBuilder, ExchangeError> {
    ensure_credentials(conn)?;
    let query = sign_params(conn, params)?;
    let url = format!("{}{}?{}", conn.base_url, path, query);
    debug!(%method, path, "signed request");
    Ok(conn
        .http
        .request(method, url)
        .header("X-MBX-APIKEY", &conn.api_key))
}

async fn ensure_success(resp: Response) -> Result<Response, ExchangeError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    debug!(%status, %body, "binance api error");
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(err) => Err(ExchangeError::Api {
            status: status.as_u16(),
            code: err.code,
            message: err.msg,
        }),
        Err(_) => Err(ExchangeError::Http {
            status: status.as_u16(),
            body,
        }),
    }
}

async fn send_json<T>(builder: RequestBuilder) -> Result<T, ExchangeError>
where
    T: DeserializeOwned,
{
    let resp = builder.send().await?;
    let resp = ensure_success(resp).await?;
    let body = resp.text().await?;
    serde_json::from_str(&body)
        .map_err(|err| ExchangeError::Decode(format!("{err}; body: {body}")))
}

async fn send_void(builder: RequestBuilder) -> Result<(), ExchangeError> {
    let resp = builder.send().await?;
    ensure_success(resp).await?;
    Ok(())
}
