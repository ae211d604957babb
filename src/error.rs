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

//! Error types for ledger operations.

use thiserror::Error;

/// Errors raised by entity constructors and mutating operations.
///
/// Every failing operation leaves the entity exactly as it was before the
/// call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is zero, negative or finer than the supported precision
    #[error("invalid amount (must be positive, at most 4 decimal places)")]
    InvalidAmount,

    /// Withdrawal would exceed the balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Actor is not an owner of the account
    #[error("unauthorized owner")]
    Unauthorized,

    /// Malformed identifier, name or contact string
    #[error("invalid {field}")]
    InvalidFormat { field: &'static str },

    /// Lookup by identifier found nothing
    #[error("{0} not found")]
    NotFound(String),

    /// Identifier is already registered
    #[error("{0} already exists")]
    DuplicateEntity(String),

    /// Source and target of a transfer are the same account
    #[error("cannot transfer to the same account")]
    SameAccount,

    /// Percentage outside the accepted range
    #[error("invalid percentage")]
    InvalidPercent,

    /// Car is already rented out
    #[error("{0} not available")]
    CarNotAvailable(String),

    /// Car was returned while not rented
    #[error("{0} already available")]
    CarAlreadyAvailable(String),

    /// Rental duration is zero days
    #[error("invalid rental duration")]
    InvalidRentalDuration,

    /// Message body is empty or too long
    #[error("invalid message")]
    InvalidMessage,

    /// Shape size is zero, negative or not finite
    #[error("{0} sizes must be positive numbers")]
    InvalidSize(&'static str),
}
