//! Payload shapes returned by the nExt API.
//!
//! Every field defaults when absent so that partially populated responses, and
//! the zero values the proxy server builds before a call, decode cleanly.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of `POST login`.
///
/// `Debug` redacts the session key, which authenticates every later call.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Login {
    pub session_key: String,
    pub environment: String,
    /// Seconds of inactivity before the session expires.
    pub expires_in: i64,
    pub private_feed: Feed,
    pub public_feed: Feed,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("session_key", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("expires_in", &self.expires_in)
            .field("private_feed", &self.private_feed)
            .field("public_feed", &self.public_feed)
            .finish()
    }
}

/// Connection info for the realtime feed handed out at login.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Feed {
    pub hostname: String,
    pub port: i64,
    pub encrypted: bool,
}

/// Result of touch (`PUT login`) and logout (`DELETE login`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct LoggedInStatus {
    pub logged_in: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct SystemStatus {
    pub timestamp: i64,
    pub valid_version: bool,
    pub system_running: bool,
    pub skip_phrase: bool,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Amount {
    pub value: Decimal,
    pub currency: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Account {
    pub accno: i64,
    #[serde(rename = "type")]
    pub account_type: String,
    pub default: bool,
    pub alias: String,
    pub blocked: bool,
    pub blocked_reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct AccountInfo {
    pub accno: i64,
    pub account_currency: String,
    pub account_credit: Amount,
    pub account_sum: Amount,
    pub collateral: Amount,
    pub credit_account_sum: Amount,
    pub forward_sum: Amount,
    pub future_sum: Amount,
    pub unrealized_future_profit_loss: Amount,
    pub full_marketvalue: Amount,
    pub interest: Amount,
    pub intraday_credit: Amount,
    pub loan_limit: Amount,
    pub own_capital: Amount,
    pub own_capital_morning: Amount,
    pub pawn_value: Amount,
    pub trading_power: Amount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Ledger {
    pub currency: String,
    pub account_sum: Amount,
    pub account_sum_acc: Amount,
    pub acc_int_deb: Amount,
    pub acc_int_cred: Amount,
    pub exchange_rate: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct LedgerInformation {
    pub total: Amount,
    pub total_acc_int_deb: Amount,
    pub total_acc_int_cred: Amount,
    pub ledgers: Vec<Ledger>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct TradableId {
    pub identifier: String,
    pub market_id: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Tradable {
    pub market_id: i64,
    pub tick_size_id: i64,
    pub lot_size: Decimal,
    pub display_order: i64,
    pub identifier: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct UnderlyingInfo {
    pub instrument_id: i64,
    pub symbol: String,
    pub isin_code: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Instrument {
    pub instrument_id: i64,
    pub tradables: Vec<Tradable>,
    pub currency: String,
    pub instrument_group_type: String,
    pub instrument_type: String,
    pub multiplier: Decimal,
    pub symbol: String,
    pub isin_code: String,
    pub market_view: String,
    pub strike_price: Decimal,
    pub pawn_percentage: Decimal,
    pub number_of_securities: i64,
    pub prospectus_url: String,
    pub name: String,
    pub expiration_date: String,
    pub sector: String,
    pub sector_group: String,
    pub underlyings: Vec<UnderlyingInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct InstrumentType {
    pub instrument_type: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Position {
    pub accno: i64,
    pub instrument: Instrument,
    pub qty: Decimal,
    pub pawn_percent: Decimal,
    pub market_value_acc: Amount,
    pub market_value: Amount,
    pub acq_price_acc: Amount,
    pub acq_price: Amount,
    pub morning_price: Amount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ActivationCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub trailing_value: Decimal,
    pub trigger_value: Decimal,
    pub trigger_condition: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Validity {
    #[serde(rename = "type")]
    pub validity_type: String,
    pub valid_until: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Order {
    pub accno: i64,
    pub order_id: i64,
    pub price: Amount,
    pub volume: Decimal,
    pub tradable: TradableId,
    pub open_volume: Decimal,
    pub traded_volume: Decimal,
    pub side: String,
    pub modified: i64,
    pub reference: String,
    pub activation_condition: ActivationCondition,
    pub price_condition: String,
    pub volume_condition: String,
    pub validity: Validity,
    pub action_state: String,
    pub order_type: String,
    pub order_state: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct OrderReply {
    pub order_id: i64,
    pub result_code: String,
    pub order_state: String,
    pub action_state: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct OrderType {
    #[serde(rename = "type")]
    pub order_type: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Trade {
    pub accno: i64,
    pub order_id: i64,
    pub trade_id: String,
    pub tradable: TradableId,
    pub price: Amount,
    pub volume: Decimal,
    pub side: String,
    pub counterparty: String,
    pub tradetime: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Country {
    pub country: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Indicator {
    pub name: String,
    pub src: String,
    pub identifier: String,
    pub delayed: i64,
    pub region: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Market {
    pub market_id: i64,
    pub country: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct List {
    pub list_id: i64,
    pub display_name: String,
    pub country: String,
    pub region: String,
    pub display_order: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Sector {
    pub sector_id: String,
    pub group: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Issuer {
    pub issuer_id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct LeverageFilter {
    pub issuers: Vec<Issuer>,
    pub market_view: String,
    pub expiration_dates: Vec<String>,
    pub instrument_group_types: Vec<String>,
    pub instrument_types: Vec<String>,
    pub no_of_instruments: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct OptionPair {
    pub strike_price: Decimal,
    pub expiration_date: String,
    pub call: Instrument,
    pub put: Instrument,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct OptionPairFilter {
    pub expiration_dates: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct NewsSource {
    pub source_id: i64,
    pub name: String,
    pub level: String,
    pub countries: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct NewsPreview {
    pub news_id: i64,
    pub source_id: i64,
    pub headline: String,
    pub instruments: Vec<i64>,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub news_type: String,
    pub lang: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct NewsItem {
    pub news_id: i64,
    pub source_id: i64,
    pub headline: String,
    pub preamble: String,
    pub body: String,
    pub instruments: Vec<i64>,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub news_type: String,
    pub lang: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct RealtimeAccess {
    pub market_id: i64,
    pub level: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct TickSizeInterval {
    pub decimals: i64,
    pub from_price: Decimal,
    pub to_price: Decimal,
    pub tick: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct TicksizeTable {
    pub tick_size_id: i64,
    pub ticks: Vec<TickSizeInterval>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct CalendarDay {
    pub date: String,
    pub open: i64,
    pub close: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct TradableInfo {
    pub market_id: i64,
    pub identifier: String,
    pub iceberg: bool,
    pub calendar: Vec<CalendarDay>,
    pub order_types: Vec<OrderType>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct IntradayTick {
    pub timestamp: i64,
    pub last: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub volume: Decimal,
    pub no_of_trades: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct IntradayGraph {
    pub market_id: i64,
    pub identifier: String,
    pub ticks: Vec<IntradayTick>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct PublicTrade {
    pub broker_buying: String,
    pub broker_selling: String,
    pub volume: Decimal,
    pub price: Decimal,
    pub trade_id: String,
    pub trade_timestamp: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct PublicTrades {
    pub market_id: i64,
    pub identifier: String,
    pub trades: Vec<PublicTrade>,
}
