// 4.0: futures position per instrument. two books, buy (long) and sell (short), held at once.
// margin and holding pnl are marked to last_price.
// 4.1 has open/close at the bottom of the book impl.
// 4.2 is the daily roll: holding price resets to last price, today's contracts become old ones.

use crate::instrument::Instrument;
use crate::order::Trade;
use crate::types::{InstrumentId, PositionEffect, Price, Quote, Side};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One direction of a futures position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionBook {
    /// Contracts carried over from previous periods
    pub old_quantity: Decimal,
    /// Contracts opened this period
    pub today_quantity: Decimal,
    /// Cost basis per contract unit. settlement resets it to the last price
    pub avg_holding_price: Decimal,
    pub daily_realized_pnl: Quote,
    pub transaction_cost: Quote,
}

impl PositionBook {
    pub fn quantity(&self) -> Decimal {
        self.old_quantity + self.today_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.quantity().is_zero()
    }

    // 4.1: weighted average holding price
    fn open(&mut self, price: Decimal, quantity: Decimal) {
        let held = self.quantity();
        let total = held + quantity;
        if !total.is_zero() {
            self.avg_holding_price = (held * self.avg_holding_price + quantity * price) / total;
        }
        self.today_quantity += quantity;
    }

    // old contracts go first. caller checks quantity <= self.quantity()
    fn close(&mut self, quantity: Decimal) {
        let from_old = quantity.min(self.old_quantity);
        self.old_quantity -= from_old;
        self.today_quantity -= quantity - from_old;
        if self.is_empty() {
            self.avg_holding_price = Decimal::ZERO;
        }
    }

    // 4.2
    fn roll(&mut self, settle_price: Decimal) {
        self.old_quantity += self.today_quantity;
        self.today_quantity = Decimal::ZERO;
        self.avg_holding_price = if self.is_empty() {
            Decimal::ZERO
        } else {
            settle_price
        };
        self.daily_realized_pnl = Quote::zero();
        self.transaction_cost = Quote::zero();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturePosition {
    pub instrument_id: InstrumentId,
    pub contract_multiplier: Decimal,
    /// Exchange margin rate already scaled by the session margin multiplier
    pub margin_rate: Decimal,
    pub de_listed_date: Option<NaiveDate>,
    pub last_price: Price,
    pub buy: PositionBook,
    pub sell: PositionBook,
}

impl FuturePosition {
    /// `margin_rate` is the effective rate: the reference margin rate already
    /// scaled by the session margin multiplier.
    pub fn new(instrument: &Instrument, margin_rate: Decimal, last_price: Price) -> Self {
        Self {
            instrument_id: instrument.id.clone(),
            contract_multiplier: instrument.contract_multiplier,
            margin_rate,
            de_listed_date: instrument.de_listed_date,
            last_price,
            buy: PositionBook::default(),
            sell: PositionBook::default(),
        }
    }

    pub fn buy_quantity(&self) -> Decimal {
        self.buy.quantity()
    }

    pub fn sell_quantity(&self) -> Decimal {
        self.sell.quantity()
    }

    /// Open contracts across both books. Zero means nothing is held either way.
    pub fn quantity(&self) -> Decimal {
        self.buy.quantity() + self.sell.quantity()
    }

    pub fn is_de_listed(&self, trading_date: NaiveDate) -> bool {
        self.de_listed_date.is_some_and(|d| d <= trading_date)
    }

    pub fn set_last_price(&mut self, price: Price) {
        self.last_price = price;
    }

    fn book_margin(&self, book: &PositionBook) -> Quote {
        Quote::new(
            book.quantity() * self.last_price.value() * self.contract_multiplier * self.margin_rate,
        )
    }

    pub fn buy_margin(&self) -> Quote {
        self.book_margin(&self.buy)
    }

    pub fn sell_margin(&self) -> Quote {
        self.book_margin(&self.sell)
    }

    pub fn margin(&self) -> Quote {
        self.buy_margin().add(self.sell_margin())
    }

    // long gains when price rises above holding price, short gains when it falls
    pub fn buy_daily_holding_pnl(&self) -> Quote {
        Quote::new(
            (self.last_price.value() - self.buy.avg_holding_price)
                * self.buy.quantity()
                * self.contract_multiplier,
        )
    }

    pub fn sell_daily_holding_pnl(&self) -> Quote {
        Quote::new(
            (self.sell.avg_holding_price - self.last_price.value())
                * self.sell.quantity()
                * self.contract_multiplier,
        )
    }

    pub fn daily_holding_pnl(&self) -> Quote {
        self.buy_daily_holding_pnl().add(self.sell_daily_holding_pnl())
    }

    pub fn daily_realized_pnl(&self) -> Quote {
        self.buy.daily_realized_pnl.add(self.sell.daily_realized_pnl)
    }

    pub fn transaction_cost(&self) -> Quote {
        self.buy.transaction_cost.add(self.sell.transaction_cost)
    }

    /// Signed exposure: longs minus shorts at the last price.
    pub fn market_value(&self) -> Quote {
        Quote::new(
            (self.buy.quantity() - self.sell.quantity())
                * self.last_price.value()
                * self.contract_multiplier,
        )
    }

    /// Applies a fill. Open trades add to the book on the trade's side, close
    /// trades take contracts off the opposite book and realize pnl against its
    /// holding price. Nothing changes when the trade is invalid.
    pub fn apply_trade(&mut self, trade: &Trade) -> Result<(), PositionError> {
        if trade.instrument_id != self.instrument_id {
            return Err(PositionError::InstrumentMismatch {
                expected: self.instrument_id.clone(),
                actual: trade.instrument_id.clone(),
            });
        }

        let price = trade.last_price.value();
        let quantity = trade.last_quantity;
        let multiplier = self.contract_multiplier;

        match (trade.position_effect, trade.side) {
            (PositionEffect::Open, Side::Buy) => {
                self.buy.open(price, quantity);
                self.buy.transaction_cost = self.buy.transaction_cost.add(trade.transaction_cost);
            }
            (PositionEffect::Open, Side::Sell) => {
                self.sell.open(price, quantity);
                self.sell.transaction_cost = self.sell.transaction_cost.add(trade.transaction_cost);
            }
            (PositionEffect::Close, Side::Sell) => {
                self.check_close(&self.buy, Side::Buy, quantity)?;
                let realized = (price - self.buy.avg_holding_price) * quantity * multiplier;
                self.buy.close(quantity);
                self.buy.daily_realized_pnl = self.buy.daily_realized_pnl.add(Quote::new(realized));
                self.buy.transaction_cost = self.buy.transaction_cost.add(trade.transaction_cost);
            }
            (PositionEffect::Close, Side::Buy) => {
                self.check_close(&self.sell, Side::Sell, quantity)?;
                let realized = (self.sell.avg_holding_price - price) * quantity * multiplier;
                self.sell.close(quantity);
                self.sell.daily_realized_pnl =
                    self.sell.daily_realized_pnl.add(Quote::new(realized));
                self.sell.transaction_cost = self.sell.transaction_cost.add(trade.transaction_cost);
            }
        }

        self.last_price = trade.last_price;
        Ok(())
    }

    fn check_close(
        &self,
        book: &PositionBook,
        book_side: Side,
        quantity: Decimal,
    ) -> Result<(), PositionError> {
        if quantity > book.quantity() {
            return Err(PositionError::CloseExceedsHolding {
                instrument_id: self.instrument_id.clone(),
                side: book_side,
                requested: quantity,
                available: book.quantity(),
            });
        }
        Ok(())
    }

    /// End of period roll. Realized pnl and costs were already counted in the
    /// period's NAV, so they reset; holding pnl restarts from the last price.
    pub fn apply_settlement(&mut self) {
        let settle_price = self.last_price.value();
        self.buy.roll(settle_price);
        self.sell.roll(settle_price);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Cannot close {requested} {side:?} {instrument_id} contracts, {available} held")]
    CloseExceedsHolding {
        instrument_id: InstrumentId,
        side: Side,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Trade for {actual} applied to position in {expected}")]
    InstrumentMismatch {
        expected: InstrumentId,
        actual: InstrumentId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, OrderId, Timestamp, TradeId};
    use rust_decimal_macros::dec;

    fn instrument() -> Instrument {
        Instrument::new("TEST", dec!(10), dec!(0.1))
    }

    fn position() -> FuturePosition {
        FuturePosition::new(&instrument(), dec!(0.1), Price::new_unchecked(dec!(100)))
    }

    fn trade(side: Side, effect: PositionEffect, price: Decimal, quantity: Decimal) -> Trade {
        Trade {
            id: TradeId(1),
            order_id: OrderId(1),
            account_id: AccountId(1),
            instrument_id: "TEST".into(),
            side,
            position_effect: effect,
            last_price: Price::new_unchecked(price),
            last_quantity: quantity,
            transaction_cost: Quote::new(dec!(1)),
            timestamp: Timestamp::from_millis(0),
        }
    }

    #[test]
    fn open_long_margin_and_pnl() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(2))).unwrap();

        assert_eq!(pos.buy_quantity(), dec!(2));
        assert_eq!(pos.quantity(), dec!(2));
        // 2 * 100 * 10 * 0.1
        assert_eq!(pos.buy_margin().value(), dec!(200));
        assert_eq!(pos.sell_margin(), Quote::zero());
        assert_eq!(pos.daily_holding_pnl(), Quote::zero());
        assert_eq!(pos.transaction_cost().value(), dec!(1));

        pos.set_last_price(Price::new_unchecked(dec!(105)));
        // (105 - 100) * 2 * 10
        assert_eq!(pos.daily_holding_pnl().value(), dec!(100));
        assert_eq!(pos.margin().value(), dec!(210));
        assert_eq!(pos.market_value().value(), dec!(2100));
    }

    #[test]
    fn short_profits_when_price_falls() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Sell, PositionEffect::Open, dec!(100), dec!(1))).unwrap();
        pos.set_last_price(Price::new_unchecked(dec!(90)));

        assert_eq!(pos.sell_daily_holding_pnl().value(), dec!(100));
        assert_eq!(pos.market_value().value(), dec!(-900));
    }

    #[test]
    fn open_averages_holding_price() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(1))).unwrap();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(110), dec!(1))).unwrap();

        assert_eq!(pos.buy.avg_holding_price, dec!(105));
        assert_eq!(pos.last_price.value(), dec!(110));
    }

    #[test]
    fn close_long_realizes_pnl() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(2))).unwrap();
        pos.apply_trade(&trade(Side::Sell, PositionEffect::Close, dec!(104), dec!(1))).unwrap();

        // (104 - 100) * 1 * 10
        assert_eq!(pos.daily_realized_pnl().value(), dec!(40));
        assert_eq!(pos.buy_quantity(), dec!(1));
        assert_eq!(pos.transaction_cost().value(), dec!(2));
    }

    #[test]
    fn cover_short_realizes_pnl() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Sell, PositionEffect::Open, dec!(100), dec!(1))).unwrap();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Close, dec!(97), dec!(1))).unwrap();

        assert_eq!(pos.daily_realized_pnl().value(), dec!(30));
        assert!(pos.sell.is_empty());
        assert_eq!(pos.quantity(), Decimal::ZERO);
    }

    #[test]
    fn close_consumes_old_contracts_first() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(2))).unwrap();
        pos.apply_settlement();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(1))).unwrap();
        pos.apply_trade(&trade(Side::Sell, PositionEffect::Close, dec!(100), dec!(2))).unwrap();

        assert_eq!(pos.buy.old_quantity, Decimal::ZERO);
        assert_eq!(pos.buy.today_quantity, dec!(1));
    }

    #[test]
    fn over_close_rejected_without_change() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(1))).unwrap();
        let before = pos.buy.clone();

        let result = pos.apply_trade(&trade(Side::Sell, PositionEffect::Close, dec!(100), dec!(3)));
        assert!(matches!(result, Err(PositionError::CloseExceedsHolding { .. })));
        assert_eq!(pos.buy, before);
    }

    #[test]
    fn wrong_instrument_rejected() {
        let mut pos = position();
        let mut t = trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(1));
        t.instrument_id = "OTHER".into();

        assert!(matches!(
            pos.apply_trade(&t),
            Err(PositionError::InstrumentMismatch { .. })
        ));
        assert_eq!(pos.quantity(), Decimal::ZERO);
    }

    #[test]
    fn settlement_rolls_books() {
        let mut pos = position();
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(3))).unwrap();
        pos.apply_trade(&trade(Side::Sell, PositionEffect::Close, dec!(102), dec!(1))).unwrap();
        pos.set_last_price(Price::new_unchecked(dec!(103)));
        assert!(pos.daily_holding_pnl().value() > Decimal::ZERO);

        pos.apply_settlement();

        assert_eq!(pos.buy.old_quantity, dec!(2));
        assert_eq!(pos.buy.today_quantity, Decimal::ZERO);
        assert_eq!(pos.buy.avg_holding_price, dec!(103));
        assert_eq!(pos.daily_holding_pnl(), Quote::zero());
        assert_eq!(pos.daily_realized_pnl(), Quote::zero());
        assert_eq!(pos.transaction_cost(), Quote::zero());
        // margin still follows the open contracts
        assert_eq!(pos.margin().value(), dec!(206));
    }

    #[test]
    fn margin_uses_given_rate() {
        let mut pos =
            FuturePosition::new(&instrument(), dec!(0.2), Price::new_unchecked(dec!(100)));
        pos.apply_trade(&trade(Side::Buy, PositionEffect::Open, dec!(100), dec!(1))).unwrap();
        assert_eq!(pos.margin().value(), dec!(200));
    }

    #[test]
    fn de_listed_check() {
        let inst = instrument().with_de_listed_date(NaiveDate::from_ymd_opt(2017, 3, 17).unwrap());
        let pos = FuturePosition::new(&inst, dec!(0.1), Price::new_unchecked(dec!(100)));

        assert!(!pos.is_de_listed(NaiveDate::from_ymd_opt(2017, 3, 16).unwrap()));
        assert!(pos.is_de_listed(NaiveDate::from_ymd_opt(2017, 3, 17).unwrap()));
    }
}
