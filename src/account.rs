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

//! Bank accounts.
//!
//! Every account type wraps a [`Ledger`]: a balance and its transaction log
//! guarded by one mutex, so a balance change and its record are always
//! applied together. The [`Account`] trait names the operations all account
//! types share; concrete types only decide who may move money out.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use solid_ledger::{Account, IndividualAccount};
//!
//! let account = IndividualAccount::new("1238764590").unwrap();
//! account.deposit(dec!(1000)).unwrap();
//! account.withdraw(dec!(500), None).unwrap();
//! assert_eq!(account.balance(), dec!(500));
//! ```

use crate::base::AccountNumber;
use crate::journal::Journal;
use crate::transaction::Transaction;
use crate::validator::{self, AMOUNT_PRECISION};
use crate::LedgerError;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug)]
struct AccountData {
    balance: Decimal,
    /// Chronological, append-only.
    transactions: Vec<Transaction>,
}

impl AccountData {
    fn new() -> Self {
        Self {
            balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance went negative: {}",
            self.balance
        );
    }

    /// Balance after crediting `amount`, without applying it.
    fn credited(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        validator::validate_amount(amount)?;
        self.balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)
    }

    /// Balance after debiting `amount`, without applying it.
    fn debited(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        validator::validate_amount(amount)?;
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        self.balance
            .checked_sub(amount)
            .ok_or(LedgerError::InvalidAmount)
    }

    fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
        self.assert_invariants();
    }

    /// Increases the balance.
    fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let balance = self.credited(amount)?;
        self.set_balance(balance);
        Ok(())
    }

    /// Decreases the balance.
    fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let balance = self.debited(amount)?;
        self.set_balance(balance);
        Ok(())
    }

    fn record(&mut self, transaction: Transaction) -> Transaction {
        self.transactions.push(transaction.clone());
        transaction
    }

    fn last(&self, limit: usize) -> Vec<Transaction> {
        let start = self.transactions.len().saturating_sub(limit);
        self.transactions[start..].to_vec()
    }
}

/// Records produced by a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Debit appended to the source.
    pub debit: Transaction,
    /// Credit appended to the target.
    pub credit: Transaction,
    /// Transfer record appended to the source.
    pub transfer: Transaction,
}

impl TransferReceipt {
    pub fn into_records(self) -> [Transaction; 3] {
        [self.debit, self.credit, self.transfer]
    }
}

/// Balance plus transaction log of one account.
#[derive(Debug)]
pub struct Ledger {
    number: AccountNumber,
    inner: Mutex<AccountData>,
}

impl Ledger {
    pub fn new(number: AccountNumber) -> Self {
        Self {
            number,
            inner: Mutex::new(AccountData::new()),
        }
    }

    pub fn number(&self) -> &AccountNumber {
        &self.number
    }

    pub fn balance(&self) -> Decimal {
        self.inner.lock().balance
    }

    pub fn transaction_count(&self) -> usize {
        self.inner.lock().transactions.len()
    }

    /// Full log, oldest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().transactions.clone()
    }

    /// The most recent `limit` records, oldest first.
    pub fn history(&self, limit: usize) -> Vec<Transaction> {
        self.inner.lock().last(limit)
    }

    pub fn deposit(&self, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.deposit_journaled(amount, None)
    }

    pub fn withdraw(&self, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.withdraw_journaled(amount, None)
    }

    /// Moves `amount` from this ledger to `target`.
    ///
    /// Both locks are held for the whole operation, so no reader observes the
    /// debit without the credit. If either side rejects the amount nothing
    /// changes on either side.
    pub fn transfer(&self, target: &Ledger, amount: Decimal) -> Result<TransferReceipt, LedgerError> {
        self.transfer_journaled(target, amount, None)
    }

    /// Records are pushed to `journal` before the lock is released, so the
    /// journal order of one account's records matches the order they were
    /// applied in.
    pub(crate) fn deposit_journaled(
        &self,
        amount: Decimal,
        journal: Option<&Journal>,
    ) -> Result<Transaction, LedgerError> {
        let mut data = self.inner.lock();
        data.credit(amount)?;
        tracing::debug!(account = %self.number, %amount, "credit applied");
        let record = data.record(Transaction::credit(self.number.clone(), amount));
        if let Some(journal) = journal {
            journal.push(record.clone());
        }
        Ok(record)
    }

    pub(crate) fn withdraw_journaled(
        &self,
        amount: Decimal,
        journal: Option<&Journal>,
    ) -> Result<Transaction, LedgerError> {
        let mut data = self.inner.lock();
        data.debit(amount)?;
        tracing::debug!(account = %self.number, %amount, "debit applied");
        let record = data.record(Transaction::debit(self.number.clone(), amount));
        if let Some(journal) = journal {
            journal.push(record.clone());
        }
        Ok(record)
    }

    pub(crate) fn transfer_journaled(
        &self,
        target: &Ledger,
        amount: Decimal,
        journal: Option<&Journal>,
    ) -> Result<TransferReceipt, LedgerError> {
        if std::ptr::eq(self, target) {
            return Err(LedgerError::SameAccount);
        }
        let (mut source, mut dest) = self.lock_pair(target);

        let source_balance = source.debited(amount)?;
        let dest_balance = dest.credited(amount)?;
        source.set_balance(source_balance);
        dest.set_balance(dest_balance);

        let receipt = TransferReceipt {
            debit: source.record(Transaction::debit(self.number.clone(), amount)),
            credit: dest.record(Transaction::credit(target.number.clone(), amount)),
            transfer: source.record(Transaction::transfer(
                self.number.clone(),
                target.number.clone(),
                amount,
            )),
        };
        tracing::debug!(from = %self.number, to = %target.number, %amount, "transfer applied");

        if let Some(journal) = journal {
            for record in receipt.clone().into_records() {
                journal.push(record);
            }
        }
        Ok(receipt)
    }

    /// Locks `self` and `other` in global order (account number, then
    /// address) and returns the guards as `(self, other)`.
    fn lock_pair<'a>(
        &'a self,
        other: &'a Ledger,
    ) -> (MutexGuard<'a, AccountData>, MutexGuard<'a, AccountData>) {
        let self_key = (&self.number, self as *const Ledger as usize);
        let other_key = (&other.number, other as *const Ledger as usize);
        if self_key < other_key {
            let first = self.inner.lock();
            let second = other.inner.lock();
            (first, second)
        } else {
            let first = other.inner.lock();
            let second = self.inner.lock();
            (second, first)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Individual,
    Joint,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => f.write_str("individual"),
            Self::Joint => f.write_str("joint"),
        }
    }
}

/// Operations shared by every account type.
///
/// Implementors provide their [`Ledger`] and an authorization rule; the
/// money-moving operations are built on top of those two.
pub trait Account: fmt::Debug + Send + Sync {
    fn ledger(&self) -> &Ledger;

    fn kind(&self) -> AccountKind;

    /// Checks that `actor` may withdraw from or transfer out of this account.
    fn authorize(&self, actor: Option<&str>) -> Result<(), LedgerError>;

    fn number(&self) -> &AccountNumber {
        self.ledger().number()
    }

    fn balance(&self) -> Decimal {
        self.ledger().balance()
    }

    fn deposit(&self, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.ledger().deposit(amount)
    }

    /// Authorization is checked before the amount, so an outsider is told
    /// `Unauthorized` whatever they ask for.
    fn withdraw(&self, amount: Decimal, actor: Option<&str>) -> Result<Transaction, LedgerError> {
        self.authorize(actor)?;
        self.ledger().withdraw(amount)
    }

    fn transfer(
        &self,
        target: &dyn Account,
        amount: Decimal,
        actor: Option<&str>,
    ) -> Result<TransferReceipt, LedgerError> {
        self.authorize(actor)?;
        self.ledger().transfer(target.ledger(), amount)
    }

    fn history(&self, limit: usize) -> Vec<Transaction> {
        self.ledger().history(limit)
    }

    fn transactions(&self) -> Vec<Transaction> {
        self.ledger().transactions()
    }
}

/// Account with a single holder; anyone holding a reference may withdraw.
#[derive(Debug)]
pub struct IndividualAccount {
    ledger: Ledger,
}

impl IndividualAccount {
    pub fn new(number: &str) -> Result<Self, LedgerError> {
        Ok(Self::with_number(AccountNumber::parse(number)?))
    }

    pub fn with_number(number: AccountNumber) -> Self {
        Self {
            ledger: Ledger::new(number),
        }
    }
}

impl Account for IndividualAccount {
    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn kind(&self) -> AccountKind {
        AccountKind::Individual
    }

    fn authorize(&self, _actor: Option<&str>) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Account shared by several owners; only they may move money out.
#[derive(Debug)]
pub struct JointAccount {
    ledger: Ledger,
    owners: BTreeSet<String>,
}

impl JointAccount {
    pub fn new<I, S>(number: &str, owners: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_number(AccountNumber::parse(number)?, owners)
    }

    pub fn with_number<I, S>(number: AccountNumber, owners: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owners = owners
            .into_iter()
            .map(Into::into)
            .map(|owner: String| validator::validate_name(&owner).map(|_| owner))
            .collect::<Result<BTreeSet<_>, _>>()?;
        if owners.is_empty() {
            return Err(LedgerError::InvalidFormat { field: "owners" });
        }
        Ok(Self {
            ledger: Ledger::new(number),
            owners,
        })
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.owners.iter().map(String::as_str)
    }

    pub fn is_owner(&self, name: &str) -> bool {
        self.owners.contains(name)
    }
}

impl Account for JointAccount {
    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn kind(&self) -> AccountKind {
        AccountKind::Joint
    }

    fn authorize(&self, actor: Option<&str>) -> Result<(), LedgerError> {
        match actor {
            Some(name) if self.is_owner(name) => Ok(()),
            _ => Err(LedgerError::Unauthorized),
        }
    }
}

impl Serialize for dyn Account + '_ {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ledger = self.ledger();
        let data = ledger.inner.lock();
        let mut state = serializer.serialize_struct("Account", 4)?;
        state.serialize_field("account", ledger.number())?;
        state.serialize_field("type", &self.kind().to_string())?;
        state.serialize_field("balance", &data.balance.round_dp(AMOUNT_PRECISION))?;
        state.serialize_field("transactions", &data.transactions.len())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionKind;
    use rust_decimal_macros::dec;

    fn number(raw: &str) -> AccountNumber {
        AccountNumber::parse(raw).unwrap()
    }

    // === AccountData Internal Tests ===

    #[test]
    fn account_data_credit_and_debit() {
        let mut data = AccountData::new();
        data.credit(dec!(100.00)).unwrap();
        data.debit(dec!(30.00)).unwrap();
        assert_eq!(data.balance, dec!(70.00));
    }

    #[test]
    fn account_data_debit_insufficient_returns_error() {
        let mut data = AccountData::new();
        data.credit(dec!(50.00)).unwrap();
        assert_eq!(data.debit(dec!(100.00)), Err(LedgerError::InsufficientFunds));
        assert_eq!(data.balance, dec!(50.00));
    }

    #[test]
    fn account_data_last_slices_the_tail() {
        let ledger = Ledger::new(number("1238764590"));
        for amount in [dec!(1), dec!(2), dec!(3)] {
            ledger.deposit(amount).unwrap();
        }
        let data = ledger.inner.lock();
        let amounts: Vec<_> = data.last(2).iter().map(Transaction::amount).collect();
        assert_eq!(amounts, vec![dec!(2), dec!(3)]);
        assert_eq!(data.last(10).len(), 3);
        assert!(data.last(0).is_empty());
    }

    #[test]
    fn account_data_credit_overflow_is_rejected() {
        let mut data = AccountData::new();
        data.credit(Decimal::MAX).unwrap();
        assert_eq!(data.credit(dec!(1)), Err(LedgerError::InvalidAmount));
        assert_eq!(data.balance, Decimal::MAX);
    }

    #[test]
    fn deposit_overflow_appends_no_record() {
        let ledger = Ledger::new(number("1238764590"));
        ledger.deposit(Decimal::MAX).unwrap();
        assert_eq!(ledger.deposit(dec!(0.0001)), Err(LedgerError::InvalidAmount));
        assert_eq!(ledger.balance(), Decimal::MAX);
        assert_eq!(ledger.transaction_count(), 1);
    }

    // === Locking ===

    #[test]
    fn transfer_to_same_ledger_is_rejected() {
        let ledger = Ledger::new(number("1238764590"));
        ledger.deposit(dec!(10)).unwrap();
        assert_eq!(
            ledger.transfer(&ledger, dec!(5)),
            Err(LedgerError::SameAccount)
        );
        assert_eq!(ledger.balance(), dec!(10));
    }

    #[test]
    fn transfer_between_ledgers_sharing_a_number() {
        // Distinct ledgers with equal numbers still lock in a stable order.
        let a = Ledger::new(number("1238764590"));
        let b = Ledger::new(number("1238764590"));
        a.deposit(dec!(10)).unwrap();
        a.transfer(&b, dec!(4)).unwrap();
        b.transfer(&a, dec!(1)).unwrap();
        assert_eq!(a.balance(), dec!(7));
        assert_eq!(b.balance(), dec!(3));
    }

    #[test]
    fn transfer_receipt_lists_records_in_order() {
        let source = Ledger::new(number("1111008887"));
        let target = Ledger::new(number("1238764590"));
        source.deposit(dec!(100)).unwrap();

        let receipt = source.transfer(&target, dec!(40)).unwrap();
        let kinds: Vec<_> = receipt
            .into_records()
            .iter()
            .map(Transaction::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::Debit,
                TransactionKind::Credit,
                TransactionKind::Transfer
            ]
        );
    }

    #[test]
    fn transfer_overflowing_target_changes_neither_side() {
        let source = Ledger::new(number("1111008887"));
        let target = Ledger::new(number("1238764590"));
        source.deposit(dec!(10)).unwrap();
        target.deposit(Decimal::MAX).unwrap();

        assert_eq!(
            source.transfer(&target, dec!(1)),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(source.balance(), dec!(10));
        assert_eq!(target.balance(), Decimal::MAX);
        assert_eq!(source.transaction_count(), 1);
        assert_eq!(target.transaction_count(), 1);
    }

    #[test]
    fn journaled_transfer_pushes_all_three_records() {
        let journal = Journal::new();
        let source = Ledger::new(number("1111008887"));
        let target = Ledger::new(number("1238764590"));
        source.deposit_journaled(dec!(100), Some(&journal)).unwrap();
        source
            .transfer_journaled(&target, dec!(40), Some(&journal))
            .unwrap();
        assert!(source.transfer_journaled(&target, dec!(500), Some(&journal)).is_err());

        let sequences: Vec<_> = journal.drain().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);
    }

    // === Serialization Tests ===

    #[test]
    fn serializer_rounds_to_four_decimal_places() {
        let account = IndividualAccount::new("1238764590").unwrap();
        {
            let mut data = account.ledger.inner.lock();
            data.balance = dec!(123.456789);
        }

        let json = serde_json::to_string(&account as &dyn Account).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["account"], "1238764590");
        assert_eq!(parsed["type"], "individual");
        assert_eq!(parsed["balance"].as_str().unwrap(), "123.4568");
        assert_eq!(parsed["transactions"], 0);
    }

    #[test]
    fn serializer_reports_joint_kind_and_record_count() {
        let account = JointAccount::new("1111008887", ["Annet", "Bob"]).unwrap();
        account.deposit(dec!(20000)).unwrap();
        account.withdraw(dec!(15000), Some("Annet")).unwrap();

        let json = serde_json::to_string(&account as &dyn Account).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["type"], "joint");
        assert_eq!(parsed["balance"].as_str().unwrap(), "5000");
        assert_eq!(parsed["transactions"], 2);
    }

    #[test]
    fn joint_account_requires_owners() {
        let empty: [&str; 0] = [];
        assert_eq!(
            JointAccount::new("1111008887", empty).unwrap_err(),
            LedgerError::InvalidFormat { field: "owners" }
        );
        assert_eq!(
            JointAccount::new("1111008887", ["Annet", " "]).unwrap_err(),
            LedgerError::InvalidFormat { field: "name" }
        );
    }
}
