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

//! # Solid Ledger
//!
//! In-memory domain ledgers built from validated entities: every mutation
//! checks its inputs first, then changes a numeric balance or total and
//! appends an immutable record. A failed operation changes nothing.
//!
//! ## Core Components
//!
//! - [`Account`]: bank account contract, implemented by [`IndividualAccount`]
//!   and [`JointAccount`]
//! - [`Transaction`]: record left by each deposit, withdrawal or transfer
//! - [`Customer`]: validated owner of accounts or orders
//! - [`Bank`]: account registry that journals every record it produces
//! - [`Menu`] / [`Order`]: restaurant menus and orders
//! - [`RentalDesk`] / [`Fleet`]: car rentals with pluggable pricing
//! - [`Conversation`]: chat history between [`User`]s
//! - [`Shape`] / [`ShapeCollection`]: validated plane shapes and their totals
//! - [`validator`]: input checks shared by all of the above
//!
//! ## Example
//!
//! ```
//! use solid_ledger::{Account, Customer, IndividualAccount, JointAccount};
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let savings = Arc::new(IndividualAccount::new("1238764590").unwrap());
//! let shared = Arc::new(JointAccount::new("1111008887", ["Annet", "Bob"]).unwrap());
//!
//! let mut bob: Customer<Arc<dyn Account>> = Customer::new("Bob", "smith1999@mail.com").unwrap();
//! bob.attach(savings.clone()).unwrap();
//! bob.attach(shared.clone()).unwrap();
//!
//! shared.deposit(dec!(20000)).unwrap();
//! shared.transfer(&*savings, dec!(2000), Some("Bob")).unwrap();
//!
//! assert_eq!(savings.balance(), dec!(2000));
//! assert_eq!(bob.history("1111008887", 10).unwrap().len(), 3);
//! ```
//!
//! ## Thread Safety
//!
//! Accounts lock their own balance and log, and transfers lock both sides in
//! a fixed order, so accounts can be shared across threads. The other
//! entities are plain values mutated through `&mut self`.

pub mod account;
mod bank;
mod base;
mod customer;
pub mod error;
mod journal;
mod menu;
mod messaging;
mod order;
mod rental;
mod shape;
mod transaction;
pub mod validator;

pub use account::{Account, AccountKind, IndividualAccount, JointAccount, Ledger, TransferReceipt};
pub use bank::Bank;
pub use base::{AccountNumber, IdSequence, MessageId, OrderId, RentalId};
pub use customer::{Customer, LedgerEntity};
pub use error::LedgerError;
pub use journal::{Journal, JournalEntry};
pub use menu::{Course, Dish, Menu};
pub use messaging::{Conversation, TextMessage, User};
pub use order::{Order, OrderLine};
pub use rental::{
    Car, CarClass, EconomyPricing, Fleet, LuxuryPricing, PricingPolicy, Quote, RentalDesk,
    RentalRecord, Renter, SearchFilter, Season,
};
pub use shape::{Rectangle, Shape, ShapeCollection, Square, Triangle};
pub use transaction::{Transaction, TransactionKind};
