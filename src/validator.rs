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

//! Input validation.
//!
//! Stateless checks used by constructors and setters. Each function accepts
//! raw input and either returns `Ok(())` or the [`LedgerError`] the caller
//! should surface unchanged.

use crate::error::LedgerError;
use ::validator::ValidateEmail;
use rust_decimal::Decimal;

/// Number of decimal places an amount may carry.
pub const AMOUNT_PRECISION: u32 = 4;

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_LEN: usize = 250;

/// Exactly ten ASCII digits.
pub fn validate_account_number(value: &str) -> Result<(), LedgerError> {
    if value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(LedgerError::InvalidFormat {
            field: "account number",
        })
    }
}

/// Non-blank display name.
pub fn validate_name(value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidFormat { field: "name" });
    }
    Ok(())
}

/// Email address or local phone number (`0` followed by eight digits).
pub fn validate_contact(value: &str) -> Result<(), LedgerError> {
    if is_email(value) || is_local_phone(value) {
        Ok(())
    } else {
        Err(LedgerError::InvalidFormat {
            field: "contact info",
        })
    }
}

pub fn validate_email(value: &str) -> Result<(), LedgerError> {
    if is_email(value) {
        Ok(())
    } else {
        Err(LedgerError::InvalidFormat {
            field: "contact info",
        })
    }
}

/// Chat user name: a letter followed by one to ten more characters.
pub fn validate_username(value: &str) -> Result<(), LedgerError> {
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest = chars.count();
    if starts_with_letter && (1..=10).contains(&rest) && !value.contains(['\n', '\r']) {
        Ok(())
    } else {
        Err(LedgerError::InvalidFormat { field: "user name" })
    }
}

/// Email address or international phone number (`+` optional, eight to
/// fifteen digits, no leading zero).
pub fn validate_international_contact(value: &str) -> Result<(), LedgerError> {
    if is_email(value) || is_international_phone(value) {
        Ok(())
    } else {
        Err(LedgerError::InvalidFormat {
            field: "contact info",
        })
    }
}

/// Strictly positive with at most [`AMOUNT_PRECISION`] decimal places.
///
/// Zero is rejected for both credits and debits.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO || amount.normalize().scale() > AMOUNT_PRECISION {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

pub fn validate_percent(percent: Decimal) -> Result<(), LedgerError> {
    if percent <= Decimal::ZERO {
        return Err(LedgerError::InvalidPercent);
    }
    Ok(())
}

pub fn validate_message_body(body: &str) -> Result<(), LedgerError> {
    let len = body.chars().count();
    if len == 0 || len > MAX_MESSAGE_LEN {
        return Err(LedgerError::InvalidMessage);
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    value.validate_email()
}

fn is_local_phone(value: &str) -> bool {
    value.len() == 9 && value.starts_with('0') && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_international_phone(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (8..=15).contains(&digits.len())
        && !digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit())
}
