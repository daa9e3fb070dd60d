//! Instrument reference data.
//!
//! The ledger never hardcodes contract terms. Contract multipliers, margin rates
//! and de-listing dates come through the [`ReferenceData`] trait so a session can
//! plug in whatever source it has. [`InstrumentCatalog`] is the in-memory one.

use crate::types::InstrumentId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static contract terms for one futures instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    /// Underlying units per contract (e.g. 300 for IF index futures)
    pub contract_multiplier: Decimal,
    /// Exchange margin rate as a fraction of notional
    pub margin_rate: Decimal,
    /// Last trading date. `None` for instruments without a known expiry
    pub de_listed_date: Option<NaiveDate>,
}

impl Instrument {
    pub fn new(
        id: impl Into<InstrumentId>,
        contract_multiplier: Decimal,
        margin_rate: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            contract_multiplier,
            margin_rate,
            de_listed_date: None,
        }
    }

    pub fn with_de_listed_date(mut self, date: NaiveDate) -> Self {
        self.de_listed_date = Some(date);
        self
    }

    /// An instrument is de-listed once the trading date reaches its last trading date.
    pub fn is_de_listed(&self, trading_date: NaiveDate) -> bool {
        self.de_listed_date.is_some_and(|d| d <= trading_date)
    }
}

/// Lookup seam for contract terms.
pub trait ReferenceData {
    fn instrument(&self, id: &InstrumentId) -> Result<&Instrument, ReferenceDataError>;

    fn future_margin_rate(&self, id: &InstrumentId) -> Result<Decimal, ReferenceDataError> {
        self.instrument(id).map(|i| i.margin_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("Unknown instrument {0}")]
    UnknownInstrument(InstrumentId),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentCatalog {
    instruments: HashMap<InstrumentId, Instrument>,
}

impl InstrumentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instrument: Instrument) {
        self.instruments.insert(instrument.id.clone(), instrument);
    }

    pub fn with(mut self, instrument: Instrument) -> Self {
        self.insert(instrument);
        self
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl ReferenceData for InstrumentCatalog {
    fn instrument(&self, id: &InstrumentId) -> Result<&Instrument, ReferenceDataError> {
        self.instruments
            .get(id)
            .ok_or_else(|| ReferenceDataError::UnknownInstrument(id.clone()))
    }
}
