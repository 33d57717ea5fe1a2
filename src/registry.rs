//! Static table of result containers the proxy can rebuild from a wire name.
//!
//! The proxy server never sees the caller's static type. It receives a
//! [`ResultType`] and asks [`new_instance`] for a fresh, zero-valued container
//! of the same shape, which the wrapped transport then fills in.

use std::any::Any;
use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::error::Error;
use crate::models::{
    Account, AccountInfo, ActivationCondition, Amount, CalendarDay, Country, Feed, Indicator,
    Instrument, InstrumentType, IntradayGraph, IntradayTick, Issuer, Ledger, LedgerInformation,
    LeverageFilter, List, LoggedInStatus, Login, Market, NewsItem, NewsPreview, NewsSource,
    OptionPair, OptionPairFilter, Order, OrderReply, OrderType, Position, PublicTrade,
    PublicTrades, RealtimeAccess, Sector, SystemStatus, TickSizeInterval, TicksizeTable, Tradable,
    TradableId, TradableInfo, Trade, UnderlyingInfo, Validity,
};
use crate::serde_helpers;
use crate::types::{ResultType, Shape};

/// A caller-owned container a transport decodes a response into.
///
/// Implemented for every registered model and for `Vec` of every registered
/// model; nothing else can cross the proxy.
pub trait Payload: Any + Send + Sync + Debug {
    fn result_type(&self) -> ResultType;

    /// Replaces the contents of the container with the decoded `json`.
    fn decode(&mut self, json: &[u8]) -> serde_json::Result<()>;

    fn encode(&self) -> serde_json::Result<Vec<u8>>;
}

/// A payload shape with a stable name known to both ends of the proxy.
pub trait Model:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + Debug + 'static
{
    const NAME: &'static str;
}

fn decode_into<T: DeserializeOwned>(slot: &mut T, json: &[u8]) -> serde_json::Result<()> {
    *slot = serde_helpers::from_slice(json)?;
    Ok(())
}

macro_rules! register_models {
    ($($model:ident),+ $(,)?) => {
        /// Names of every registered model.
        pub const MODEL_NAMES: &[&str] = &[$(stringify!($model)),+];

        $(
            impl Model for $model {
                const NAME: &'static str = stringify!($model);
            }

            impl Payload for $model {
                fn result_type(&self) -> ResultType {
                    ResultType::single(<$model as Model>::NAME)
                }

                fn decode(&mut self, json: &[u8]) -> serde_json::Result<()> {
                    decode_into(self, json)
                }

                fn encode(&self) -> serde_json::Result<Vec<u8>> {
                    serde_json::to_vec(self)
                }
            }

            impl Payload for Vec<$model> {
                fn result_type(&self) -> ResultType {
                    ResultType::sequence(<$model as Model>::NAME)
                }

                fn decode(&mut self, json: &[u8]) -> serde_json::Result<()> {
                    decode_into(self, json)
                }

                fn encode(&self) -> serde_json::Result<Vec<u8>> {
                    serde_json::to_vec(self)
                }
            }
        )+
    };
}

register_models!(
    Account,
    AccountInfo,
    ActivationCondition,
    Amount,
    CalendarDay,
    Country,
    Feed,
    Indicator,
    Instrument,
    InstrumentType,
    IntradayGraph,
    IntradayTick,
    Issuer,
    Ledger,
    LedgerInformation,
    LeverageFilter,
    List,
    LoggedInStatus,
    Login,
    Market,
    NewsItem,
    NewsPreview,
    NewsSource,
    OptionPair,
    OptionPairFilter,
    Order,
    OrderReply,
    OrderType,
    Position,
    PublicTrade,
    PublicTrades,
    RealtimeAccess,
    Sector,
    SystemStatus,
    TickSizeInterval,
    TicksizeTable,
    Tradable,
    TradableId,
    TradableInfo,
    Trade,
    UnderlyingInfo,
    Validity,
);

struct Constructors {
    single: fn() -> Box<dyn Payload>,
    sequence: fn() -> Box<dyn Payload>,
}

fn new_single<T: Model + Payload>() -> Box<dyn Payload> {
    Box::new(T::default())
}

fn new_sequence<T: Model>() -> Box<dyn Payload>
where
    Vec<T>: Payload,
{
    Box::new(Vec::<T>::new())
}

macro_rules! constructors {
    ($model:ty) => {
        Constructors {
            single: new_single::<$model>,
            sequence: new_sequence::<$model>,
        }
    };
}

static REGISTRY: phf::Map<&'static str, Constructors> = phf::phf_map! {
    "Account" => constructors!(Account),
    "AccountInfo" => constructors!(AccountInfo),
    "ActivationCondition" => constructors!(ActivationCondition),
    "Amount" => constructors!(Amount),
    "CalendarDay" => constructors!(CalendarDay),
    "Country" => constructors!(Country),
    "Feed" => constructors!(Feed),
    "Indicator" => constructors!(Indicator),
    "Instrument" => constructors!(Instrument),
    "InstrumentType" => constructors!(InstrumentType),
    "IntradayGraph" => constructors!(IntradayGraph),
    "IntradayTick" => constructors!(IntradayTick),
    "Issuer" => constructors!(Issuer),
    "Ledger" => constructors!(Ledger),
    "LedgerInformation" => constructors!(LedgerInformation),
    "LeverageFilter" => constructors!(LeverageFilter),
    "List" => constructors!(List),
    "LoggedInStatus" => constructors!(LoggedInStatus),
    "Login" => constructors!(Login),
    "Market" => constructors!(Market),
    "NewsItem" => constructors!(NewsItem),
    "NewsPreview" => constructors!(NewsPreview),
    "NewsSource" => constructors!(NewsSource),
    "OptionPair" => constructors!(OptionPair),
    "OptionPairFilter" => constructors!(OptionPairFilter),
    "Order" => constructors!(Order),
    "OrderReply" => constructors!(OrderReply),
    "OrderType" => constructors!(OrderType),
    "Position" => constructors!(Position),
    "PublicTrade" => constructors!(PublicTrade),
    "PublicTrades" => constructors!(PublicTrades),
    "RealtimeAccess" => constructors!(RealtimeAccess),
    "Sector" => constructors!(Sector),
    "SystemStatus" => constructors!(SystemStatus),
    "TickSizeInterval" => constructors!(TickSizeInterval),
    "TicksizeTable" => constructors!(TicksizeTable),
    "Tradable" => constructors!(Tradable),
    "TradableId" => constructors!(TradableId),
    "TradableInfo" => constructors!(TradableInfo),
    "Trade" => constructors!(Trade),
    "UnderlyingInfo" => constructors!(UnderlyingInfo),
    "Validity" => constructors!(Validity),
};

/// Builds a fresh, zero-valued container for `result_type`.
///
/// Sequences start out empty. Names that are not registered fail with
/// [`Kind::UnknownResultType`](crate::error::Kind::UnknownResultType).
pub fn new_instance(result_type: &ResultType) -> Result<Box<dyn Payload>> {
    let constructors = REGISTRY
        .get(result_type.model.as_str())
        .ok_or_else(|| Error::unknown_result_type(result_type.to_string()))?;

    Ok(match result_type.shape {
        Shape::Single => (constructors.single)(),
        Shape::Sequence => (constructors.sequence)(),
    })
}

#[must_use]
pub fn is_registered(model: &str) -> bool {
    REGISTRY.contains_key(model)
}
