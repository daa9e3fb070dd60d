// 7.0 router/core.rs: holds every account of the session and the journal of dispatched events.

use super::config::RouterConfig;
use super::results::RouterError;
use crate::account::FutureAccount;
use crate::config::AccountConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::types::{AccountId, Timestamp};
use std::collections::BTreeMap;

/** 7.1: router struct. accounts are kept in id order so broadcasts are deterministic */
#[derive(Debug)]
pub struct AccountRouter {
    pub(super) config: RouterConfig,
    pub(super) accounts: BTreeMap<AccountId, FutureAccount>,
    pub(super) journal: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl AccountRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            accounts: BTreeMap::new(),
            journal: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn add_account(&mut self, account: FutureAccount) -> Result<AccountId, RouterError> {
        let id = account.id;
        if self.accounts.contains_key(&id) {
            return Err(RouterError::DuplicateAccount(id));
        }
        self.accounts.insert(id, account);
        Ok(id)
    }

    /// Builds an account from `config` under the next free id.
    pub fn open_account(&mut self, config: &AccountConfig) -> Result<AccountId, RouterError> {
        let id = AccountId(self.accounts.keys().last().map_or(1, |last| last.0 + 1));
        let account = FutureAccount::new(id, config)?;
        self.add_account(account)
    }

    pub fn account(&self, account_id: AccountId) -> Option<&FutureAccount> {
        self.accounts.get(&account_id)
    }

    pub fn account_mut(&mut self, account_id: AccountId) -> Option<&mut FutureAccount> {
        self.accounts.get_mut(&account_id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &FutureAccount> {
        self.accounts.values()
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.journal.len().saturating_sub(count);
        &self.journal[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.journal
    }

    pub(super) fn next_event_id(&mut self) -> EventId {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub(super) fn record_event(&mut self, id: EventId, payload: EventPayload) {
        if self.config.max_events == 0 {
            return;
        }

        self.journal.push(Event::new(id, self.current_time, payload));

        if self.journal.len() > self.config.max_events {
            let drain_count = self.journal.len() - self.config.max_events;
            self.journal.drain(0..drain_count);
        }
    }
}
