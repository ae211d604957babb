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

//! Transaction records.
//!
//! A [`Transaction`] is the immutable fact left behind by one completed
//! balance change. Records are created by the account that applied the change
//! and never edited afterwards.

use crate::base::AccountNumber;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    account: AccountNumber,
    kind: TransactionKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    from: Option<AccountNumber>,
    to: Option<AccountNumber>,
}

impl Transaction {
    pub(crate) fn credit(account: AccountNumber, amount: Decimal) -> Self {
        Self::build(account, TransactionKind::Credit, amount, None, None)
    }

    pub(crate) fn debit(account: AccountNumber, amount: Decimal) -> Self {
        Self::build(account, TransactionKind::Debit, amount, None, None)
    }

    /// Transfer record kept on the source side.
    pub(crate) fn transfer(from: AccountNumber, to: AccountNumber, amount: Decimal) -> Self {
        Self::build(
            from.clone(),
            TransactionKind::Transfer,
            amount,
            Some(from),
            Some(to),
        )
    }

    fn build(
        account: AccountNumber,
        kind: TransactionKind,
        amount: Decimal,
        from: Option<AccountNumber>,
        to: Option<AccountNumber>,
    ) -> Self {
        Self {
            account,
            kind,
            amount,
            timestamp: Utc::now(),
            from,
            to,
        }
    }

    /// Account that owns this record.
    pub fn account(&self) -> &AccountNumber {
        &self.account
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn from(&self) -> Option<&AccountNumber> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&AccountNumber> {
        self.to.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn number(raw: &str) -> AccountNumber {
        AccountNumber::parse(raw).unwrap()
    }

    #[test]
    fn credit_and_debit_have_no_counterparties() {
        let credit = Transaction::credit(number("1238764590"), dec!(1000));
        assert_eq!(credit.kind(), TransactionKind::Credit);
        assert_eq!(credit.amount(), dec!(1000));
        assert!(credit.from().is_none());
        assert!(credit.to().is_none());

        let debit = Transaction::debit(number("1238764590"), dec!(500));
        assert_eq!(debit.kind(), TransactionKind::Debit);
    }

    #[test]
    fn transfer_records_both_endpoints_on_the_source() {
        let record = Transaction::transfer(number("1111008887"), number("1238764590"), dec!(2000));
        assert_eq!(record.account(), &number("1111008887"));
        assert_eq!(record.from(), Some(&number("1111008887")));
        assert_eq!(record.to(), Some(&number("1238764590")));
        assert_eq!(record.kind().to_string(), "transfer");
    }

    #[test]
    fn timestamps_are_non_decreasing() {
        let first = Transaction::credit(number("1238764590"), dec!(1));
        let second = Transaction::credit(number("1238764590"), dec!(1));
        assert!(second.timestamp() >= first.timestamp());
    }
}
