//! Orders and trade fills as the ledger sees them.
//!
//! Matching happens elsewhere. The ledger only needs the price an order was
//! frozen at, how much of it is still unfilled, and for each fill how many
//! contracts it covered.

use crate::types::{
    AccountId, InstrumentId, OrderId, PositionEffect, Price, Quote, Side, Timestamp, TradeId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created locally, not yet acknowledged.
    Created,
    /// Accepted into the pending state. Cash is reserved here.
    PendingNew,
    /// Working at the broker, possibly partially filled.
    Active,
    /// Fully filled.
    Filled,
    /// Refused at creation.
    Rejected,
    /// Cancelled on request.
    Cancelled,
    /// Closed by the broker without a request, e.g. expiry at end of day.
    Expired,
}

impl OrderStatus {
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled
                | OrderStatus::Rejected
                | OrderStatus::Cancelled
                | OrderStatus::Expired
        )
    }
}

/// A futures order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account_id: AccountId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub position_effect: PositionEffect,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    /// Price used to size the cash reservation. Limit price for limit orders,
    /// last price at submission for market orders.
    pub frozen_price: Price,
    pub status: OrderStatus,
    pub created_at: Timestamp,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        account_id: AccountId,
        instrument_id: InstrumentId,
        side: Side,
        position_effect: PositionEffect,
        quantity: Decimal,
        frozen_price: Price,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            account_id,
            instrument_id,
            side,
            position_effect,
            quantity,
            filled_quantity: Decimal::ZERO,
            frozen_price,
            status: OrderStatus::Created,
            created_at: timestamp,
        }
    }

    pub fn unfilled_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.unfilled_quantity().is_zero()
    }

    pub fn mark_pending_new(&mut self) {
        debug_assert_eq!(self.status, OrderStatus::Created);
        self.status = OrderStatus::PendingNew;
    }

    pub fn mark_active(&mut self) {
        if !self.status.is_final() {
            self.status = OrderStatus::Active;
        }
    }

    pub fn reject(&mut self) {
        self.status = OrderStatus::Rejected;
    }

    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }

    pub fn expire(&mut self) {
        self.status = OrderStatus::Expired;
    }

    /// Records a fill and builds the matching trade. The order keeps its
    /// working status until nothing is left unfilled.
    pub fn fill(
        &mut self,
        trade_id: TradeId,
        price: Price,
        quantity: Decimal,
        transaction_cost: Quote,
        timestamp: Timestamp,
    ) -> Trade {
        debug_assert!(quantity <= self.unfilled_quantity(), "cannot fill more than unfilled");
        self.filled_quantity += quantity;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::Active
        };

        Trade {
            id: trade_id,
            order_id: self.id,
            account_id: self.account_id,
            instrument_id: self.instrument_id.clone(),
            side: self.side,
            position_effect: self.position_effect,
            last_price: price,
            last_quantity: quantity,
            transaction_cost,
            timestamp,
        }
    }
}

/// A single execution against an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub position_effect: PositionEffect,
    pub last_price: Price,
    /// Contracts covered by this fill
    pub last_quantity: Decimal,
    /// Commission plus tax charged on this fill
    pub transaction_cost: Quote,
    pub timestamp: Timestamp,
}
