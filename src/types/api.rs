use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ExchangeInfoResponse {
    pub symbols: Vec<ExchangeSymbol>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExchangeSymbol {
    pub symbol: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PremiumIndex {
    #[serde(rename = "markPrice")]
    pub mark_price: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerTimeResponse {
    #[serde(rename = "serverTime")]
    pub server_time: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FuturesBalance {
    pub asset: String,
    pub balance: String,
    #[serde(rename = "availableBalance")]
    pub available_balance: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountResponse {
    #[serde(default)]
    pub positions: Vec<AccountPosition>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountPosition {
    pub symbol: String,
    #[serde(rename = "positionAmt")]
    pub position_amt: String,
    #[serde(rename = "entryPrice", default)]
    pub entry_price: Option<String>,
    #[serde(rename = "unrealizedProfit", default)]
    pub unrealized_profit: Option<String>,
    #[serde(default)]
    pub leverage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FutOrder {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    pub symbol: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(rename = "origQty")]
    pub orig_qty: String,
    pub price: String,
    pub status: String,
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FutPlacedOrder {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of every rejected Binance request: `{"code":-2019,"msg":"Margin is insufficient."}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}
