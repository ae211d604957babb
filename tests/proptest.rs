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

//! Property-based tests for accounts, the bank and orders.
//!
//! These tests verify invariants that should hold for any sequence of
//! operations, successful or not.

use proptest::prelude::*;
use rust_decimal::Decimal;
use solid_ledger::{
    Account, Bank, Course, Dish, IdSequence, IndividualAccount, LedgerError, Menu, Order,
    TransactionKind,
};

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate a positive amount (0.0001 to 1000 with 4 decimal places).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

#[derive(Debug, Clone)]
enum Op {
    Deposit(Decimal),
    Withdraw(Decimal),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_amount().prop_map(Op::Deposit),
        arb_amount().prop_map(Op::Withdraw),
    ]
}

fn make_account() -> IndividualAccount {
    IndividualAccount::new("1238764590").unwrap()
}

// =============================================================================
// Account Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Balance is never negative after any operation sequence.
    #[test]
    fn balance_never_negative(ops in prop::collection::vec(arb_op(), 0..40)) {
        let account = make_account();
        for op in ops {
            let _ = match op {
                Op::Deposit(amount) => account.deposit(amount),
                Op::Withdraw(amount) => account.withdraw(amount, None),
            };
            prop_assert!(account.balance() >= Decimal::ZERO);
        }
    }

    /// Balance equals credits minus debits in the recorded history.
    #[test]
    fn balance_matches_history(ops in prop::collection::vec(arb_op(), 0..40)) {
        let account = make_account();
        for op in ops {
            let _ = match op {
                Op::Deposit(amount) => account.deposit(amount),
                Op::Withdraw(amount) => account.withdraw(amount, None),
            };
        }

        let replayed: Decimal = account
            .transactions()
            .iter()
            .map(|tx| match tx.kind() {
                TransactionKind::Credit => tx.amount(),
                TransactionKind::Debit => -tx.amount(),
                TransactionKind::Transfer => Decimal::ZERO,
            })
            .sum();
        prop_assert_eq!(account.balance(), replayed);
    }

    /// Deposits always sum up.
    #[test]
    fn deposits_sum(deposits in prop::collection::vec(arb_amount(), 1..30)) {
        let account = make_account();
        let expected: Decimal = deposits.iter().sum();
        for amount in deposits {
            account.deposit(amount).unwrap();
        }
        prop_assert_eq!(account.balance(), expected);
    }

    /// Withdrawing more than the balance fails and changes nothing.
    #[test]
    fn cannot_overdraw(deposit in arb_amount(), extra in arb_amount()) {
        let account = make_account();
        account.deposit(deposit).unwrap();
        let result = account.withdraw(deposit + extra, None);
        prop_assert_eq!(result, Err(LedgerError::InsufficientFunds));
        prop_assert_eq!(account.balance(), deposit);
        prop_assert_eq!(account.transactions().len(), 1);
    }

    /// Non-positive amounts are always rejected.
    #[test]
    fn non_positive_amounts_rejected(units in -10_000_000i64..=0) {
        let account = make_account();
        let amount = Decimal::new(units, 4);
        prop_assert_eq!(account.deposit(amount), Err(LedgerError::InvalidAmount));
        prop_assert!(account.transactions().is_empty());
    }

    /// `history(n)` returns the last `min(n, len)` records in order.
    #[test]
    fn history_is_suffix_of_transactions(
        deposits in prop::collection::vec(arb_amount(), 0..30),
        limit in 0usize..40,
    ) {
        let account = make_account();
        for amount in &deposits {
            account.deposit(*amount).unwrap();
        }
        let all = account.transactions();
        let history = account.history(limit);
        prop_assert_eq!(history.len(), limit.min(all.len()));
        prop_assert_eq!(&history[..], &all[all.len() - history.len()..]);
    }
}

// =============================================================================
// Transfer Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Transfers conserve the total across all accounts.
    #[test]
    fn transfers_conserve_total(
        openings in prop::collection::vec(arb_amount(), 2..6),
        moves in prop::collection::vec((0usize..6, 0usize..6, arb_amount()), 0..40),
    ) {
        let bank = Bank::new();
        let numbers: Vec<String> = (0..openings.len())
            .map(|i| format!("{:010}", 3_000_000_000usize + i))
            .collect();
        for (number, opening) in numbers.iter().zip(&openings) {
            bank.open_individual(number).unwrap();
            bank.deposit(number, *opening).unwrap();
        }
        let expected: Decimal = openings.iter().sum();

        for (from, to, amount) in moves {
            let from = &numbers[from % numbers.len()];
            let to = &numbers[to % numbers.len()];
            let _ = bank.transfer(from, to, amount, None);
        }

        let total: Decimal = bank.accounts().iter().map(|a| a.balance()).sum();
        prop_assert_eq!(total, expected);
        prop_assert!(bank.accounts().iter().all(|a| a.balance() >= Decimal::ZERO));
    }

    /// A failed transfer appends nothing to the journal.
    #[test]
    fn journal_grows_by_three_per_transfer(
        opening in arb_amount(),
        amounts in prop::collection::vec(arb_amount(), 0..20),
    ) {
        let bank = Bank::new();
        bank.open_individual("1000000001").unwrap();
        bank.open_individual("1000000002").unwrap();
        bank.deposit("1000000001", opening).unwrap();

        let mut succeeded = 0usize;
        for amount in amounts {
            if bank.transfer("1000000001", "1000000002", amount, None).is_ok() {
                succeeded += 1;
            }
        }
        prop_assert_eq!(bank.journal().len(), 1 + 3 * succeeded);
    }
}

// =============================================================================
// Order Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Order total always equals the sum of its line prices.
    #[test]
    fn order_total_is_sum_of_lines(
        prices in prop::collection::vec(arb_amount(), 1..8),
        picks in prop::collection::vec(0usize..8, 0..20),
        removals in prop::collection::vec(0u32..20, 0..10),
    ) {
        let mut menu = Menu::new(Course::Entree);
        for (i, price) in prices.iter().enumerate() {
            menu.add_dish(Dish::entree(format!("Dish {i}"), *price).unwrap()).unwrap();
        }

        let mut order = Order::new(&IdSequence::new());
        for pick in picks {
            let name = format!("Dish {}", pick % prices.len());
            order.add_dish(&name, &[&menu]).unwrap();
        }
        for line in removals {
            let _ = order.remove_line(line);
        }

        let sum: Decimal = order.lines().iter().map(|line| line.price()).sum();
        prop_assert_eq!(order.total(), sum);
        prop_assert!(order.total() >= Decimal::ZERO);
    }
}
