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

//! Customers and the ledger entities they own.
//!
//! A [`Customer`] carries a validated identity and an ordered list of
//! entities (bank accounts, restaurant orders) implementing [`LedgerEntity`].
//! Name and contact are validated on every assignment; a rejected value never
//! replaces the current one.

use crate::account::Account;
use crate::base::AccountNumber;
use crate::transaction::Transaction;
use crate::validator;
use crate::LedgerError;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Something a customer can own: an identified entity with a record history.
pub trait LedgerEntity {
    type Id: PartialEq + fmt::Display;
    type Record;

    /// Used in error messages, e.g. `"account"`.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// The most recent `limit` records, oldest first.
    fn history(&self, limit: usize) -> Vec<Self::Record>;
}

impl LedgerEntity for Arc<dyn Account> {
    type Id = AccountNumber;
    type Record = Transaction;

    const KIND: &'static str = "account";

    fn id(&self) -> &AccountNumber {
        self.number()
    }

    fn history(&self, limit: usize) -> Vec<Transaction> {
        Account::history(self.as_ref(), limit)
    }
}

#[derive(Debug, Clone)]
pub struct Customer<E> {
    name: String,
    contact: String,
    entities: Vec<E>,
}

impl<E: LedgerEntity> Customer<E> {
    /// # Errors
    ///
    /// [`LedgerError::InvalidFormat`] when the name is blank or the contact is
    /// neither an email address nor a local phone number.
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let contact = contact.into();
        validator::validate_name(&name)?;
        validator::validate_contact(&contact)?;
        Ok(Self {
            name,
            contact,
            entities: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), LedgerError> {
        let name = name.into();
        validator::validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_contact(&mut self, contact: impl Into<String>) -> Result<(), LedgerError> {
        let contact = contact.into();
        validator::validate_contact(&contact)?;
        self.contact = contact;
        Ok(())
    }

    /// Appends `entity` to the owned list.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateEntity`] if an entity with the same id is
    /// already attached.
    pub fn attach(&mut self, entity: E) -> Result<(), LedgerError> {
        if self.entities.iter().any(|owned| owned.id() == entity.id()) {
            return Err(LedgerError::DuplicateEntity(format!(
                "{} {}",
                E::KIND,
                entity.id()
            )));
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Owned entities in attachment order.
    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn find<Q>(&self, id: &Q) -> Result<&E, LedgerError>
    where
        Q: fmt::Display + ?Sized,
        E::Id: PartialEq<Q>,
    {
        self.entities
            .iter()
            .find(|entity| entity.id() == id)
            .ok_or_else(|| LedgerError::NotFound(format!("{} {id}", E::KIND)))
    }

    pub fn find_mut<Q>(&mut self, id: &Q) -> Result<&mut E, LedgerError>
    where
        Q: fmt::Display + ?Sized,
        E::Id: PartialEq<Q>,
    {
        self.entities
            .iter_mut()
            .find(|entity| entity.id() == id)
            .ok_or_else(|| LedgerError::NotFound(format!("{} {id}", E::KIND)))
    }

    /// History of the entity identified by `id`.
    pub fn history<Q>(&self, id: &Q, limit: usize) -> Result<Vec<E::Record>, LedgerError>
    where
        Q: fmt::Display + ?Sized,
        E::Id: PartialEq<Q>,
    {
        Ok(self.find(id)?.history(limit))
    }
}

impl Customer<Arc<dyn Account>> {
    /// Sum of the balances of every owned account.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAmount`] when the sum does not fit in a
    /// `Decimal`.
    pub fn total_balance(&self) -> Result<Decimal, LedgerError> {
        self.entities
            .iter()
            .try_fold(Decimal::ZERO, |sum, account| {
                sum.checked_add(account.balance())
            })
            .ok_or(LedgerError::InvalidAmount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndividualAccount;
    use rust_decimal_macros::dec;

    type BankCustomer = Customer<Arc<dyn Account>>;

    #[test]
    fn rejected_contact_keeps_previous_value() {
        let mut customer = BankCustomer::new("Bob", "smith1999@mail.com").unwrap();
        assert_eq!(
            customer.set_contact("not-a-contact"),
            Err(LedgerError::InvalidFormat {
                field: "contact info"
            })
        );
        assert_eq!(customer.contact(), "smith1999@mail.com");

        customer.set_contact("094786543").unwrap();
        assert_eq!(customer.contact(), "094786543");
    }

    #[test]
    fn rejected_name_keeps_previous_value() {
        let mut customer = BankCustomer::new("Bob", "smith1999@mail.com").unwrap();
        assert!(customer.set_name("").is_err());
        assert_eq!(customer.name(), "Bob");
    }

    #[test]
    fn total_balance_sums_accounts() {
        let mut customer = BankCustomer::new("Bob", "smith1999@mail.com").unwrap();
        let first = Arc::new(IndividualAccount::new("1238764590").unwrap());
        let second = Arc::new(IndividualAccount::new("1238764591").unwrap());
        first.deposit(dec!(10)).unwrap();
        second.deposit(dec!(5.5)).unwrap();
        customer.attach(first).unwrap();
        customer.attach(second).unwrap();
        assert_eq!(customer.total_balance(), Ok(dec!(15.5)));
    }
}
