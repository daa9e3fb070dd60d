//! Event dispatch.

use super::core::AccountRouter;
use super::results::{DispatchOutcome, RouterError};
use crate::account::{FutureAccount, LedgerError};
use crate::events::{EventId, EventPayload};
use crate::instrument::ReferenceData;
use crate::types::AccountId;
use log::{debug, info};

impl AccountRouter {
    /// Deliver one event. Returns once every affected account has fully
    /// applied it. A failing account leaves its own state untouched and the
    /// event is not journaled.
    pub fn dispatch<R: ReferenceData + ?Sized>(
        &mut self,
        payload: EventPayload,
        reference: &R,
    ) -> Result<DispatchOutcome, RouterError> {
        let event_id = self.next_event_id();
        let kind = payload.kind();

        let outcome = match &payload {
            EventPayload::Bar(event) => {
                for account in self.accounts.values_mut() {
                    account.on_bar(event);
                }
                DispatchOutcome::Broadcast {
                    event_id,
                    accounts: self.accounts.len(),
                }
            }
            EventPayload::Tick(event) => {
                for account in self.accounts.values_mut() {
                    account.on_tick(&event.tick);
                }
                DispatchOutcome::Broadcast {
                    event_id,
                    accounts: self.accounts.len(),
                }
            }
            EventPayload::Settlement(event) => {
                let reports: Vec<_> = self
                    .accounts
                    .values_mut()
                    .map(|account| account.on_settlement(event.trading_date))
                    .collect();
                for report in &reports {
                    info!(
                        "settled account {:?} for {}: {} rolled, {} de-listed, {} closed, \
                         unit nav {}",
                        report.account_id,
                        report.trading_date,
                        report.settled,
                        report.de_listed.len(),
                        report.closed.len(),
                        report.static_unit_net_value,
                    );
                }
                DispatchOutcome::Settled { event_id, reports }
            }
            EventPayload::OrderPendingNew(event) => {
                self.route(event_id, event.account_id, kind, |account| {
                    account.on_order_pending_new(&event.order, reference)
                })?
            }
            EventPayload::OrderCreationReject(event) => {
                self.route(event_id, event.account_id, kind, |account| {
                    account.on_order_creation_reject(&event.order, reference)
                })?
            }
            EventPayload::OrderCancellationPass(event) => {
                self.route(event_id, event.account_id, kind, |account| {
                    account.on_order_cancellation_pass(&event.order, reference)
                })?
            }
            EventPayload::OrderUnsolicitedUpdate(event) => {
                self.route(event_id, event.account_id, kind, |account| {
                    account.on_order_unsolicited_update(&event.order, reference)
                })?
            }
            EventPayload::Trade(event) => {
                self.route(event_id, event.account_id, kind, |account| {
                    account.on_trade(&event.order, &event.trade, reference)
                })?
            }
        };

        self.record_event(event_id, payload);
        Ok(outcome)
    }

    fn route<F>(
        &mut self,
        event_id: EventId,
        account_id: AccountId,
        kind: &'static str,
        handler: F,
    ) -> Result<DispatchOutcome, RouterError>
    where
        F: FnOnce(&mut FutureAccount) -> Result<(), LedgerError>,
    {
        let Some(account) = self.accounts.get_mut(&account_id) else {
            debug!("{kind} for unregistered account {account_id:?} ignored");
            return Ok(DispatchOutcome::Ignored { event_id, account_id });
        };

        handler(account).map_err(|source| RouterError::Ledger {
            account_id,
            kind,
            source,
        })?;

        Ok(DispatchOutcome::Applied { event_id, account_id })
    }
}
