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

//! Bank registry integration tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use solid_ledger::{AccountKind, Bank, LedgerError, TransactionKind};
use std::sync::Arc;
use std::thread;

// === Helper Functions ===

fn make_bank() -> Bank {
    let bank = Bank::new();
    bank.open_individual("1238764590").unwrap();
    bank.open_joint("1111008887", ["Annet", "Bob"]).unwrap();
    bank
}

// === Opening Accounts ===

#[test]
fn opened_accounts_are_listed_in_number_order() {
    let bank = make_bank();
    let numbers: Vec<_> = bank
        .accounts()
        .iter()
        .map(|account| account.number().to_string())
        .collect();
    assert_eq!(numbers, vec!["1111008887", "1238764590"]);
    assert_eq!(bank.len(), 2);
    assert!(!bank.is_empty());
}

#[test]
fn duplicate_number_is_rejected() {
    let bank = make_bank();
    let err = bank.open_joint("1238764590", ["Carol"]).unwrap_err();
    assert_eq!(
        err,
        LedgerError::DuplicateEntity("account 1238764590".to_string())
    );
    assert_eq!(bank.find("1238764590").unwrap().kind(), AccountKind::Individual);
    assert_eq!(bank.len(), 2);
}

#[test]
fn invalid_number_is_rejected_on_open() {
    let bank = Bank::new();
    assert!(matches!(
        bank.open_individual("12-4"),
        Err(LedgerError::InvalidFormat { .. })
    ));
    assert!(bank.is_empty());
}

#[test]
fn unknown_account_is_not_found() {
    let bank = make_bank();
    assert_eq!(
        bank.deposit("9999999999", dec!(1)),
        Err(LedgerError::NotFound("account 9999999999".to_string()))
    );
    assert!(bank.find("9999999999").is_err());
    assert!(bank.transfer("1238764590", "9999999999", dec!(1), None).is_err());
    assert!(bank.journal().is_empty());
}

// === Routing ===

#[test]
fn deposit_and_withdraw_route_to_account() {
    let bank = make_bank();
    bank.deposit("1111008887", dec!(20000)).unwrap();
    bank.withdraw("1111008887", dec!(15000), Some("Annet")).unwrap();

    let account = bank.find("1111008887").unwrap();
    assert_eq!(account.balance(), dec!(5000));
    assert_eq!(bank.find("1238764590").unwrap().balance(), Decimal::ZERO);
}

#[test]
fn joint_withdraw_checks_actor() {
    let bank = make_bank();
    bank.deposit("1111008887", dec!(100)).unwrap();
    assert_eq!(
        bank.withdraw("1111008887", dec!(10), Some("Eve")),
        Err(LedgerError::Unauthorized)
    );
    assert_eq!(bank.journal().len(), 1);
}

#[test]
fn transfer_through_bank() {
    let bank = make_bank();
    bank.deposit("1111008887", dec!(5000)).unwrap();
    let receipt = bank
        .transfer("1111008887", "1238764590", dec!(2000), Some("Bob"))
        .unwrap();

    assert_eq!(receipt.credit.account(), "1238764590");
    assert_eq!(bank.find("1111008887").unwrap().balance(), dec!(3000));
    assert_eq!(bank.find("1238764590").unwrap().balance(), dec!(2000));
}

#[test]
fn transfer_to_same_number_is_rejected() {
    let bank = make_bank();
    bank.deposit("1238764590", dec!(50)).unwrap();
    assert_eq!(
        bank.transfer("1238764590", "1238764590", dec!(5), None),
        Err(LedgerError::SameAccount)
    );
}

// === Journal ===

#[test]
fn journal_records_successful_operations_in_order() {
    let bank = make_bank();
    bank.deposit("1238764590", dec!(100)).unwrap();
    let _ = bank.withdraw("1238764590", dec!(1000), None);
    bank.transfer("1238764590", "1111008887", dec!(40), None)
        .unwrap();

    let entries = bank.journal().drain();
    let kinds: Vec<_> = entries.iter().map(|e| e.transaction.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Credit,
            TransactionKind::Debit,
            TransactionKind::Credit,
            TransactionKind::Transfer,
        ]
    );
    assert!(entries.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert!(bank.journal().is_empty());
    assert_eq!(bank.journal().appended(), 4);
}

// === Concurrency ===

#[test]
fn concurrent_deposits_across_accounts() {
    let bank = Arc::new(Bank::new());
    for i in 0..10u64 {
        bank.open_individual(&format!("{:010}", 1_000_000_000 + i))
            .unwrap();
    }

    let handles: Vec<_> = (0..10u64)
        .map(|i| {
            let bank = Arc::clone(&bank);
            thread::spawn(move || {
                let number = format!("{:010}", 1_000_000_000 + i);
                for _ in 0..50 {
                    bank.deposit(&number, dec!(2)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for account in bank.accounts() {
        assert_eq!(account.balance(), dec!(100));
    }
    assert_eq!(bank.journal().len(), 500);
}

#[test]
fn journal_replay_follows_apply_order_per_account() {
    let bank = Arc::new(Bank::new());
    bank.open_individual("1238764590").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let bank = Arc::clone(&bank);
            thread::spawn(move || {
                for _ in 0..200 {
                    if t % 2 == 0 {
                        bank.deposit("1238764590", dec!(1)).unwrap();
                    } else {
                        let _ = bank.withdraw("1238764590", dec!(1), None);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Replaying in sequence order never dips below zero and lands on the
    // final balance.
    let mut balance = Decimal::ZERO;
    for entry in bank.journal().drain() {
        match entry.transaction.kind() {
            TransactionKind::Credit => balance += entry.transaction.amount(),
            TransactionKind::Debit => balance -= entry.transaction.amount(),
            TransactionKind::Transfer => {}
        }
        assert!(balance >= Decimal::ZERO, "replay went negative at {}", entry.sequence);
    }
    assert_eq!(balance, bank.find("1238764590").unwrap().balance());
}

#[test]
fn overflowing_deposit_is_rejected_and_not_journaled() {
    let bank = make_bank();
    bank.deposit("1238764590", Decimal::MAX).unwrap();
    assert_eq!(
        bank.deposit("1238764590", dec!(1)),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(bank.find("1238764590").unwrap().balance(), Decimal::MAX);
    assert_eq!(bank.journal().len(), 1);
}

#[test]
fn concurrent_opens_of_same_number_admit_one() {
    let bank = Arc::new(Bank::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bank = Arc::clone(&bank);
            thread::spawn(move || bank.open_individual("5555555555").is_ok())
        })
        .collect();
    let opened = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(opened, 1);
    assert_eq!(bank.len(), 1);
}
