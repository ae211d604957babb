// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Account registry.
//!
//! The [`Bank`] opens accounts, routes money movements to them by account
//! number, and journals every record those movements produce.
//!
//! # Thread Safety
//!
//! Accounts live in a [`DashMap`] and lock their own state, so operations on
//! different accounts run in parallel. Transfers lock both accounts in a fixed
//! order (see [`Ledger::transfer`](crate::account::Ledger::transfer)).

use crate::account::{Account, IndividualAccount, JointAccount, TransferReceipt};
use crate::base::AccountNumber;
use crate::journal::Journal;
use crate::transaction::Transaction;
use crate::LedgerError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Registry of accounts keyed by account number.
///
/// # Invariants
///
/// - Account numbers are unique within a bank.
/// - Every record appended to any account through the bank is also in the
///   journal.
/// - A record is journaled while its account is still locked, so one
///   account's journal entries follow the order they were applied in.
pub struct Bank {
    accounts: DashMap<AccountNumber, Arc<dyn Account>>,
    journal: Journal,
}

impl Bank {
    pub fn new() -> Self {
        Bank {
            accounts: DashMap::new(),
            journal: Journal::new(),
        }
    }

    /// Opens an individual account.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidFormat`] - `number` is not ten digits.
    /// - [`LedgerError::DuplicateEntity`] - `number` is already open.
    pub fn open_individual(&self, number: &str) -> Result<Arc<dyn Account>, LedgerError> {
        let number = AccountNumber::parse(number)?;
        self.register(Arc::new(IndividualAccount::with_number(number)))
    }

    /// Opens a joint account owned by `owners`.
    pub fn open_joint<I, S>(&self, number: &str, owners: I) -> Result<Arc<dyn Account>, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let number = AccountNumber::parse(number)?;
        self.register(Arc::new(JointAccount::with_number(number, owners)?))
    }

    /// Adds an account created elsewhere.
    pub fn register(&self, account: Arc<dyn Account>) -> Result<Arc<dyn Account>, LedgerError> {
        match self.accounts.entry(account.number().clone()) {
            Entry::Occupied(entry) => Err(LedgerError::DuplicateEntity(format!(
                "account {}",
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                tracing::debug!(account = %account.number(), kind = %account.kind(), "account opened");
                entry.insert(Arc::clone(&account));
                Ok(account)
            }
        }
    }

    pub fn deposit(&self, number: &str, amount: Decimal) -> Result<Transaction, LedgerError> {
        let account = self.find(number)?;
        account
            .ledger()
            .deposit_journaled(amount, Some(&self.journal))
    }

    pub fn withdraw(
        &self,
        number: &str,
        amount: Decimal,
        actor: Option<&str>,
    ) -> Result<Transaction, LedgerError> {
        let account = self.find(number)?;
        account.authorize(actor)?;
        account
            .ledger()
            .withdraw_journaled(amount, Some(&self.journal))
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] - either account is unknown.
    /// - [`LedgerError::Unauthorized`] - `actor` may not debit `from`.
    /// - [`LedgerError::InsufficientFunds`] - `from` cannot cover `amount`.
    /// - [`LedgerError::SameAccount`] - `from` and `to` are the same account.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        actor: Option<&str>,
    ) -> Result<TransferReceipt, LedgerError> {
        let source = self.find(from)?;
        let target = self.find(to)?;
        source.authorize(actor)?;
        source
            .ledger()
            .transfer_journaled(target.ledger(), amount, Some(&self.journal))
    }

    /// Looks up an account by number.
    ///
    /// The returned handle is detached from the map, so holding it does not
    /// block other registry operations.
    pub fn find(&self, number: &str) -> Result<Arc<dyn Account>, LedgerError> {
        self.accounts
            .get(number)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::NotFound(format!("account {number}")))
    }

    /// Retrieves an account by its parsed number.
    pub fn get_account(&self, number: &AccountNumber) -> Option<Arc<dyn Account>> {
        self.accounts.get(number).map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot of all accounts, sorted by account number.
    pub fn accounts(&self) -> Vec<Arc<dyn Account>> {
        let mut accounts: Vec<_> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by(|a, b| a.number().cmp(b.number()));
        accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}
