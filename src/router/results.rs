// 7.0.2: outcome and error types for dispatch.

use crate::account::{LedgerError, SettlementReport};
use crate::events::EventId;
use crate::types::AccountId;

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Routed event applied to its account.
    Applied { event_id: EventId, account_id: AccountId },
    /// Routed event named an account this router does not hold. Nothing changed.
    Ignored { event_id: EventId, account_id: AccountId },
    /// Bar or tick delivered to every account.
    Broadcast { event_id: EventId, accounts: usize },
    /// Settlement delivered to every account, one report each.
    Settled { event_id: EventId, reports: Vec<SettlementReport> },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("Account {0:?} already registered")]
    DuplicateAccount(AccountId),

    #[error("Account {account_id:?} failed to apply {kind}: {source}")]
    Ledger {
        account_id: AccountId,
        kind: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("Account setup failed: {0}")]
    Setup(#[from] LedgerError),
}
