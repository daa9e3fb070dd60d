//! Futures account ledger.
//!
//! The account stores only what events change: frozen cash, the NAV baseline
//! from the last settlement and the positions. Cash, total value, margin and
//! daily pnl are derived from those on every call and never cached, so they
//! cannot drift out of step with each other:
//!
//! ```text
//! daily_pnl   = daily_realized_pnl + daily_holding_pnl - transaction_cost
//! total_value = static_unit_net_value * units + daily_pnl
//! cash        = total_value - margin - daily_holding_pnl - frozen_cash
//! ```
//!
//! Order and trade handlers assume the event already belongs to this account.
//! Routing by account identity lives in [`crate::router`].

use crate::config::{AccountConfig, ConfigError};
use crate::events::{BarEvent, Tick};
use crate::instrument::{ReferenceData, ReferenceDataError};
use crate::margin::{fill_release, frozen_cash_for};
use crate::order::{Order, Trade};
use crate::position::{FuturePosition, PositionError};
use crate::types::{AccountId, InstrumentId, Quote};
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FutureAccount {
    pub id: AccountId,
    units: Decimal,
    static_unit_net_value: Decimal,
    frozen_cash: Quote,
    margin_multiplier: Decimal,
    positions: HashMap<InstrumentId, FuturePosition>,
}

impl FutureAccount {
    pub fn new(id: AccountId, config: &AccountConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self {
            id,
            units: config.units,
            static_unit_net_value: config.initial_unit_net_value(),
            frozen_cash: Quote::zero(),
            margin_multiplier: config.margin_multiplier,
            positions: HashMap::new(),
        })
    }

    pub fn units(&self) -> Decimal {
        self.units
    }

    pub fn static_unit_net_value(&self) -> Decimal {
        self.static_unit_net_value
    }

    pub fn frozen_cash(&self) -> Quote {
        self.frozen_cash
    }

    pub fn margin_multiplier(&self) -> Decimal {
        self.margin_multiplier
    }

    pub fn positions(&self) -> &HashMap<InstrumentId, FuturePosition> {
        &self.positions
    }

    pub fn position(&self, instrument_id: &InstrumentId) -> Option<&FuturePosition> {
        self.positions.get(instrument_id)
    }

    // derived quantities

    /// Cash available for new orders.
    pub fn cash(&self) -> Quote {
        self.total_value()
            .sub(self.margin())
            .sub(self.daily_holding_pnl())
            .sub(self.frozen_cash)
    }

    pub fn total_value(&self) -> Quote {
        Quote::new(self.static_unit_net_value * self.units).add(self.daily_pnl())
    }

    pub fn unit_net_value(&self) -> Decimal {
        self.total_value().value() / self.units
    }

    pub fn margin(&self) -> Quote {
        self.positions.values().map(|p| p.margin()).sum()
    }

    pub fn buy_margin(&self) -> Quote {
        self.positions.values().map(|p| p.buy_margin()).sum()
    }

    pub fn sell_margin(&self) -> Quote {
        self.positions.values().map(|p| p.sell_margin()).sum()
    }

    pub fn daily_pnl(&self) -> Quote {
        self.daily_realized_pnl()
            .add(self.daily_holding_pnl())
            .sub(self.transaction_cost())
    }

    pub fn daily_holding_pnl(&self) -> Quote {
        self.positions.values().map(|p| p.daily_holding_pnl()).sum()
    }

    pub fn daily_realized_pnl(&self) -> Quote {
        self.positions.values().map(|p| p.daily_realized_pnl()).sum()
    }

    pub fn transaction_cost(&self) -> Quote {
        self.positions.values().map(|p| p.transaction_cost()).sum()
    }

    /// Net signed exposure across positions.
    pub fn market_value(&self) -> Quote {
        self.positions.values().map(|p| p.market_value()).sum()
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            account_id: self.id,
            cash: self.cash(),
            total_value: self.total_value(),
            unit_net_value: self.unit_net_value(),
            static_unit_net_value: self.static_unit_net_value,
            frozen_cash: self.frozen_cash,
            margin: self.margin(),
            buy_margin: self.buy_margin(),
            sell_margin: self.sell_margin(),
            daily_pnl: self.daily_pnl(),
            daily_holding_pnl: self.daily_holding_pnl(),
            daily_realized_pnl: self.daily_realized_pnl(),
            transaction_cost: self.transaction_cost(),
            market_value: self.market_value(),
            position_count: self.positions.len(),
        }
    }

    // market events

    /// Marks every held position to its bar close. Positions whose bar is
    /// absent or has no close keep their previous price for this period.
    pub fn on_bar(&mut self, event: &BarEvent) {
        for (instrument_id, position) in self.positions.iter_mut() {
            match event.get(instrument_id).and_then(|bar| bar.close) {
                Some(close) => position.set_last_price(close),
                None => debug!(
                    "no close for {instrument_id}, keeping last price {}",
                    position.last_price
                ),
            }
        }
    }

    pub fn on_tick(&mut self, tick: &Tick) {
        if let Some(position) = self.positions.get_mut(&tick.instrument_id) {
            position.set_last_price(tick.last);
        }
    }

    /// Closes the period. De-listed positions are dropped with a warning,
    /// empty ones are dropped silently, the rest roll into the next period.
    ///
    /// NAV per unit is evaluated at the boundary, before the roll resets each
    /// position's daily counters, and becomes the next period's baseline.
    pub fn on_settlement(&mut self, trading_date: NaiveDate) -> SettlementReport {
        let unit_net_value = self.unit_net_value();

        let mut de_listed = Vec::new();
        let mut closed = Vec::new();
        let mut settled = 0;

        for (instrument_id, position) in self.positions.iter_mut() {
            if position.is_de_listed(trading_date) {
                warn!("{instrument_id} is expired, close all positions by system");
                de_listed.push(instrument_id.clone());
            } else if position.quantity().is_zero() {
                closed.push(instrument_id.clone());
            } else {
                position.apply_settlement();
                settled += 1;
            }
        }

        for instrument_id in de_listed.iter().chain(closed.iter()) {
            self.positions.remove(instrument_id);
        }

        self.static_unit_net_value = unit_net_value;

        de_listed.sort();
        closed.sort();
        SettlementReport {
            account_id: self.id,
            trading_date,
            de_listed,
            closed,
            settled,
            static_unit_net_value: unit_net_value,
        }
    }

    // order lifecycle

    pub fn on_order_pending_new<R: ReferenceData + ?Sized>(
        &mut self,
        order: &Order,
        reference: &R,
    ) -> Result<(), LedgerError> {
        let amount = frozen_cash_for(reference, self.margin_multiplier, [order])?;
        self.frozen_cash = self.frozen_cash.add(amount);
        debug!("order {:?} froze {amount}, frozen cash {}", order.id, self.frozen_cash);
        Ok(())
    }

    pub fn on_order_creation_reject<R: ReferenceData + ?Sized>(
        &mut self,
        order: &Order,
        reference: &R,
    ) -> Result<(), LedgerError> {
        self.release_order(order, reference)
    }

    pub fn on_order_cancellation_pass<R: ReferenceData + ?Sized>(
        &mut self,
        order: &Order,
        reference: &R,
    ) -> Result<(), LedgerError> {
        self.release_order(order, reference)
    }

    pub fn on_order_unsolicited_update<R: ReferenceData + ?Sized>(
        &mut self,
        order: &Order,
        reference: &R,
    ) -> Result<(), LedgerError> {
        self.release_order(order, reference)
    }

    fn release_order<R: ReferenceData + ?Sized>(
        &mut self,
        order: &Order,
        reference: &R,
    ) -> Result<(), LedgerError> {
        let amount = frozen_cash_for(reference, self.margin_multiplier, [order])?;
        self.frozen_cash = self.frozen_cash.sub(amount);
        debug!("order {:?} released {amount}, frozen cash {}", order.id, self.frozen_cash);
        Ok(())
    }

    /// Releases the fill's raw notional at the order's frozen price and books
    /// the trade on the order's position, opening one if none is held.
    /// A failed lookup or an invalid trade leaves the account untouched.
    pub fn on_trade<R: ReferenceData + ?Sized>(
        &mut self,
        order: &Order,
        trade: &Trade,
        reference: &R,
    ) -> Result<(), LedgerError> {
        let release = fill_release(reference, order, trade)?;

        match self.positions.get_mut(&order.instrument_id) {
            Some(position) => position.apply_trade(trade)?,
            None => {
                let instrument = reference.instrument(&order.instrument_id)?;
                let margin_rate =
                    reference.future_margin_rate(&order.instrument_id)? * self.margin_multiplier;
                let mut position = FuturePosition::new(instrument, margin_rate, trade.last_price);
                position.apply_trade(trade)?;
                self.positions.insert(order.instrument_id.clone(), position);
            }
        }

        self.frozen_cash = self.frozen_cash.sub(release);
        debug!("trade {:?} released {release}, frozen cash {}", trade.id, self.frozen_cash);
        Ok(())
    }
}

/// Every derived figure of an account at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub cash: Quote,
    pub total_value: Quote,
    pub unit_net_value: Decimal,
    pub static_unit_net_value: Decimal,
    pub frozen_cash: Quote,
    pub margin: Quote,
    pub buy_margin: Quote,
    pub sell_margin: Quote,
    pub daily_pnl: Quote,
    pub daily_holding_pnl: Quote,
    pub daily_realized_pnl: Quote,
    pub transaction_cost: Quote,
    pub market_value: Quote,
    pub position_count: usize,
}

/// What a settlement did to one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub account_id: AccountId,
    pub trading_date: NaiveDate,
    /// Positions force-closed because their instrument expired
    pub de_listed: Vec<InstrumentId>,
    /// Positions dropped because nothing was held
    pub closed: Vec<InstrumentId>,
    /// Positions rolled into the next period
    pub settled: usize,
    pub static_unit_net_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Reference data error: {0}")]
    ReferenceData(#[from] ReferenceDataError),

    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
