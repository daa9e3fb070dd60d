// 6.0: everything the ledger reacts to arrives as an event. the EventPayload enum lists them.
// market events (bar, tick, settlement) are broadcast to every account. order and trade
// events name the account they belong to and are routed only there. see router/.

use crate::order::{Order, Trade};
use crate::types::{AccountId, InstrumentId, Price, Timestamp};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Market data, broadcast
    Bar(BarEvent),
    Tick(TickEvent),
    Settlement(SettlementEvent),

    // Order lifecycle, routed by account
    OrderPendingNew(OrderEvent),
    OrderCreationReject(OrderEvent),
    OrderCancellationPass(OrderEvent),
    OrderUnsolicitedUpdate(OrderEvent),

    // Fills, routed by account
    Trade(TradeEvent),
}

impl EventPayload {
    /// Owning account for routed events, `None` for broadcasts.
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            EventPayload::Bar(_) | EventPayload::Tick(_) | EventPayload::Settlement(_) => None,
            EventPayload::OrderPendingNew(e)
            | EventPayload::OrderCreationReject(e)
            | EventPayload::OrderCancellationPass(e)
            | EventPayload::OrderUnsolicitedUpdate(e) => Some(e.account_id),
            EventPayload::Trade(e) => Some(e.account_id),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::Bar(_) => "bar",
            EventPayload::Tick(_) => "tick",
            EventPayload::Settlement(_) => "settlement",
            EventPayload::OrderPendingNew(_) => "order_pending_new",
            EventPayload::OrderCreationReject(_) => "order_creation_reject",
            EventPayload::OrderCancellationPass(_) => "order_cancellation_pass",
            EventPayload::OrderUnsolicitedUpdate(_) => "order_unsolicited_update",
            EventPayload::Trade(_) => "trade",
        }
    }
}

/// OHLC snapshot for one instrument over one period. A bar whose close is
/// missing (suspended instrument, no prints) carries `close: None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub instrument_id: InstrumentId,
    pub open: Option<Price>,
    pub high: Option<Price>,
    pub low: Option<Price>,
    pub close: Option<Price>,
    pub volume: Decimal,
}

impl Bar {
    pub fn new(
        instrument_id: InstrumentId,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            instrument_id,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume,
        }
    }

    /// Flat bar where every price equals `close`.
    pub fn at_close(instrument_id: InstrumentId, close: Price) -> Self {
        Self::new(instrument_id, close, close, close, close, Decimal::ZERO)
    }

    pub fn missing(instrument_id: InstrumentId) -> Self {
        Self {
            instrument_id,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: Decimal::ZERO,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.close.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarEvent {
    pub bars: HashMap<InstrumentId, Bar>,
}

impl BarEvent {
    pub fn new(bars: impl IntoIterator<Item = Bar>) -> Self {
        Self {
            bars: bars.into_iter().map(|b| (b.instrument_id.clone(), b)).collect(),
        }
    }

    pub fn get(&self, instrument_id: &InstrumentId) -> Option<&Bar> {
        self.bars.get(instrument_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub instrument_id: InstrumentId,
    pub last: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickEvent {
    pub tick: Tick,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementEvent {
    /// Trading date being closed. de-listing is judged against it
    pub trading_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub account_id: AccountId,
    pub order: Order,
}

impl OrderEvent {
    pub fn new(order: Order) -> Self {
        Self {
            account_id: order.account_id,
            order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub account_id: AccountId,
    pub order: Order,
    pub trade: Trade,
}

impl TradeEvent {
    pub fn new(order: Order, trade: Trade) -> Self {
        Self {
            account_id: trade.account_id,
            order,
            trade,
        }
    }
}
