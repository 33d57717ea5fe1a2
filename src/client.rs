//! Typed calls for the nExt REST resources.
//!
//! Every method is a thin wrapper over [`TransportExt::call`], so the same
//! [`Client`] works against a local [`HttpTransport`](crate::transport::HttpTransport)
//! or a [`ProxyClient`](crate::proxy::ProxyClient).

use reqwest::Method;

use crate::Result;
use crate::models::{
    Account, AccountInfo, Country, Indicator, Instrument, InstrumentType, IntradayGraph,
    LedgerInformation, LeverageFilter, List, LoggedInStatus, Login, Market, NewsItem,
    NewsPreview, NewsSource, OptionPair, OptionPairFilter, Order, OrderReply, Position,
    PublicTrades, RealtimeAccess, Sector, SystemStatus, TicksizeTable, Trade, TradableInfo,
};
use crate::registry::Payload;
use crate::transport::{LOGIN_PATH, Transport, TransportExt as _};
use crate::types::Params;

#[derive(Clone, Debug)]
pub struct Client<T> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    async fn get<R: Payload + Default>(
        &self,
        path: &str,
        params: Option<&Params>,
    ) -> Result<R> {
        self.transport.call(Method::GET, path, params).await
    }

    // Session

    /// Whether the system is up. Does not need a session.
    pub async fn system_status(&self) -> Result<SystemStatus> {
        self.get("", None).await
    }

    /// Logs in, or reuses the live session if the transport keeps one.
    pub async fn login(&self) -> Result<Login> {
        self.transport.call(Method::POST, LOGIN_PATH, None).await
    }

    pub async fn logout(&self) -> Result<LoggedInStatus> {
        self.transport.call(Method::DELETE, LOGIN_PATH, None).await
    }

    pub async fn touch(&self) -> Result<LoggedInStatus> {
        self.transport.call(Method::PUT, LOGIN_PATH, None).await
    }

    // Accounts

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.get("accounts", None).await
    }

    pub async fn account(&self, accno: i64) -> Result<AccountInfo> {
        self.get(&format!("accounts/{accno}"), None).await
    }

    pub async fn account_ledgers(&self, accno: i64) -> Result<LedgerInformation> {
        self.get(&format!("accounts/{accno}/ledgers"), None).await
    }

    pub async fn account_orders(&self, accno: i64, params: Option<&Params>) -> Result<Vec<Order>> {
        self.get(&format!("accounts/{accno}/orders"), params).await
    }

    /// Places an order. `params` carries the order fields as the API names them,
    /// e.g. `identifier`, `market_id`, `price`, `volume` and `side`.
    pub async fn create_order(&self, accno: i64, params: &Params) -> Result<OrderReply> {
        self.transport
            .call(Method::POST, &format!("accounts/{accno}/orders"), Some(params))
            .await
    }

    pub async fn update_order(
        &self,
        accno: i64,
        order_id: i64,
        params: &Params,
    ) -> Result<OrderReply> {
        self.transport
            .call(
                Method::PUT,
                &format!("accounts/{accno}/orders/{order_id}"),
                Some(params),
            )
            .await
    }

    /// Activates an inactive order.
    pub async fn activate_order(&self, accno: i64, order_id: i64) -> Result<OrderReply> {
        self.transport
            .call(
                Method::PUT,
                &format!("accounts/{accno}/orders/{order_id}/activate"),
                None,
            )
            .await
    }

    pub async fn delete_order(&self, accno: i64, order_id: i64) -> Result<OrderReply> {
        self.transport
            .call(
                Method::DELETE,
                &format!("accounts/{accno}/orders/{order_id}"),
                None,
            )
            .await
    }

    pub async fn account_positions(&self, accno: i64) -> Result<Vec<Position>> {
        self.get(&format!("accounts/{accno}/positions"), None).await
    }

    pub async fn account_trades(&self, accno: i64, params: Option<&Params>) -> Result<Vec<Trade>> {
        self.get(&format!("accounts/{accno}/trades"), params).await
    }

    // Reference data

    pub async fn countries(&self) -> Result<Vec<Country>> {
        self.get("countries", None).await
    }

    /// `countries` is a comma separated list of country codes.
    pub async fn lookup_countries(&self, countries: &str) -> Result<Vec<Country>> {
        self.get(&format!("countries/{countries}"), None).await
    }

    pub async fn indicators(&self) -> Result<Vec<Indicator>> {
        self.get("indicators", None).await
    }

    /// `indicators` is a comma separated list of `src:identifier` pairs.
    pub async fn lookup_indicators(&self, indicators: &str) -> Result<Vec<Indicator>> {
        self.get(&format!("indicators/{indicators}"), None).await
    }

    pub async fn markets(&self) -> Result<Vec<Market>> {
        self.get("markets", None).await
    }

    pub async fn market(&self, market_ids: &str) -> Result<Vec<Market>> {
        self.get(&format!("markets/{market_ids}"), None).await
    }

    pub async fn lists(&self) -> Result<Vec<List>> {
        self.get("lists", None).await
    }

    /// Instruments on the list.
    pub async fn list(&self, list_id: i64) -> Result<Vec<Instrument>> {
        self.get(&format!("lists/{list_id}"), None).await
    }

    pub async fn tick_sizes(&self) -> Result<Vec<TicksizeTable>> {
        self.get("tick_sizes", None).await
    }

    pub async fn tick_size(&self, tick_size_ids: &str) -> Result<Vec<TicksizeTable>> {
        self.get(&format!("tick_sizes/{tick_size_ids}"), None).await
    }

    // Instruments

    pub async fn search_instruments(&self, params: &Params) -> Result<Vec<Instrument>> {
        self.get("instruments", Some(params)).await
    }

    /// `instrument_ids` is a comma separated list.
    pub async fn instruments(&self, instrument_ids: &str) -> Result<Vec<Instrument>> {
        self.get(&format!("instruments/{instrument_ids}"), None).await
    }

    pub async fn instrument_leverages(
        &self,
        instrument_id: i64,
        params: Option<&Params>,
    ) -> Result<Vec<Instrument>> {
        self.get(&format!("instruments/{instrument_id}/leverages"), params)
            .await
    }

    pub async fn instrument_leverage_filters(
        &self,
        instrument_id: i64,
        params: Option<&Params>,
    ) -> Result<LeverageFilter> {
        self.get(
            &format!("instruments/{instrument_id}/leverages/filters"),
            params,
        )
        .await
    }

    pub async fn instrument_option_pairs(
        &self,
        instrument_id: i64,
        params: Option<&Params>,
    ) -> Result<Vec<OptionPair>> {
        self.get(&format!("instruments/{instrument_id}/option_pairs"), params)
            .await
    }

    pub async fn instrument_option_pair_filters(
        &self,
        instrument_id: i64,
        params: Option<&Params>,
    ) -> Result<OptionPairFilter> {
        self.get(
            &format!("instruments/{instrument_id}/option_pairs/filters"),
            params,
        )
        .await
    }

    /// Looks instruments up by e.g. `market_id_identifier` and `11:101`.
    pub async fn instrument_lookup(
        &self,
        lookup_type: &str,
        lookup: &str,
    ) -> Result<Vec<Instrument>> {
        self.get(&format!("instruments/lookup/{lookup_type}/{lookup}"), None)
            .await
    }

    pub async fn instrument_sectors(&self, params: Option<&Params>) -> Result<Vec<Sector>> {
        self.get("instruments/sectors", params).await
    }

    pub async fn instrument_sector(&self, sectors: &str) -> Result<Vec<Sector>> {
        self.get(&format!("instruments/sectors/{sectors}"), None).await
    }

    pub async fn instrument_types(&self) -> Result<Vec<InstrumentType>> {
        self.get("instruments/types", None).await
    }

    pub async fn instrument_type(&self, instrument_type: &str) -> Result<Vec<InstrumentType>> {
        self.get(&format!("instruments/types/{instrument_type}"), None)
            .await
    }

    pub async fn instrument_underlyings(
        &self,
        derivative_type: &str,
        currency: &str,
    ) -> Result<Vec<Instrument>> {
        self.get(
            &format!("instruments/underlyings/{derivative_type}/{currency}"),
            None,
        )
        .await
    }

    // News

    pub async fn search_news(&self, params: &Params) -> Result<Vec<NewsPreview>> {
        self.get("news", Some(params)).await
    }

    pub async fn news(&self, news_ids: &str) -> Result<Vec<NewsItem>> {
        self.get(&format!("news/{news_ids}"), None).await
    }

    pub async fn news_sources(&self) -> Result<Vec<NewsSource>> {
        self.get("news_sources", None).await
    }

    pub async fn realtime_access(&self) -> Result<Vec<RealtimeAccess>> {
        self.get("realtime_access", None).await
    }

    // Tradables

    /// `tradables` is a comma separated list of `market_id:identifier` pairs.
    pub async fn tradable_info(&self, tradables: &str) -> Result<Vec<TradableInfo>> {
        self.get(&format!("tradables/info/{tradables}"), None).await
    }

    pub async fn tradable_intraday(&self, tradables: &str) -> Result<Vec<IntradayGraph>> {
        self.get(&format!("tradables/intraday/{tradables}"), None)
            .await
    }

    pub async fn tradable_trades(&self, tradables: &str) -> Result<Vec<PublicTrades>> {
        self.get(&format!("tradables/trades/{tradables}"), None).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::ResultType;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(Method, String, Option<Params>, ResultType)>>,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn perform(
            &self,
            method: Method,
            path: &str,
            params: Option<&Params>,
            result: &mut dyn Payload,
        ) -> Result<()> {
            self.calls.lock().unwrap().push((
                method,
                path.to_owned(),
                params.cloned(),
                result.result_type(),
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn endpoints_should_map_to_paths_and_result_types() -> Result<()> {
        let client = Client::new(Recording::default());
        let order = Params::from([("volume", "10"), ("side", "BUY")]);

        client.accounts().await?;
        client.create_order(42, &order).await?;
        client.activate_order(42, 7).await?;
        client.instrument_lookup("market_id_identifier", "11:101").await?;
        client.login().await?;

        let calls = client.transport().calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (Method::GET, "accounts".to_owned(), None, ResultType::sequence("Account")),
                (
                    Method::POST,
                    "accounts/42/orders".to_owned(),
                    Some(order),
                    ResultType::single("OrderReply")
                ),
                (
                    Method::PUT,
                    "accounts/42/orders/7/activate".to_owned(),
                    None,
                    ResultType::single("OrderReply")
                ),
                (
                    Method::GET,
                    "instruments/lookup/market_id_identifier/11:101".to_owned(),
                    None,
                    ResultType::sequence("Instrument")
                ),
                (Method::POST, "login".to_owned(), None, ResultType::single("Login")),
            ]
        );
        Ok(())
    }
}
