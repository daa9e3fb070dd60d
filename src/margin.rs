//! Margin sizing for futures orders.
//!
//! Margin is notional times the instrument's exchange margin rate times the
//! session margin multiplier. Notional for an order is frozen price times
//! unfilled quantity times contract multiplier.
//!
//! Everything here is pure. Reservation (pending new) and full release
//! (reject, cancel, unsolicited update) both go through [`frozen_cash_for`].
//! Release on fill goes through [`fill_release`], which deliberately uses raw
//! notional without the margin rate. The two paths do not net to zero.

use crate::instrument::{ReferenceData, ReferenceDataError};
use crate::order::{Order, Trade};
use crate::types::{InstrumentId, Price, Quote};
use rust_decimal::Decimal;

/// price * quantity * contract multiplier
pub fn notional_value(price: Price, quantity: Decimal, contract_multiplier: Decimal) -> Quote {
    Quote::new(price.value() * quantity * contract_multiplier)
}

/// Cash needed to carry `notional` of `instrument_id`.
pub fn margin_requirement<R: ReferenceData + ?Sized>(
    reference: &R,
    margin_multiplier: Decimal,
    instrument_id: &InstrumentId,
    notional: Quote,
) -> Result<Quote, ReferenceDataError> {
    let margin_rate = reference.future_margin_rate(instrument_id)?;
    Ok(notional.mul(margin_rate * margin_multiplier))
}

/// Margin-adjusted cash to reserve against the unfilled part of each order.
pub fn frozen_cash_for<'a, R, I>(
    reference: &R,
    margin_multiplier: Decimal,
    orders: I,
) -> Result<Quote, ReferenceDataError>
where
    R: ReferenceData + ?Sized,
    I: IntoIterator<Item = &'a Order>,
{
    let mut frozen = Quote::zero();
    for order in orders {
        let instrument = reference.instrument(&order.instrument_id)?;
        let notional = notional_value(
            order.frozen_price,
            order.unfilled_quantity(),
            instrument.contract_multiplier,
        );
        frozen = frozen.add(margin_requirement(
            reference,
            margin_multiplier,
            &order.instrument_id,
            notional,
        )?);
    }
    Ok(frozen)
}

/// Cash released when `trade` fills part of `order`: the order's frozen price
/// times filled contracts times multiplier, with no margin rate applied.
pub fn fill_release<R: ReferenceData + ?Sized>(
    reference: &R,
    order: &Order,
    trade: &Trade,
) -> Result<Quote, ReferenceDataError> {
    let instrument = reference.instrument(&order.instrument_id)?;
    Ok(notional_value(
        order.frozen_price,
        trade.last_quantity,
        instrument.contract_multiplier,
    ))
}
