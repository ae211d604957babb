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

//! Bank-wide journal of transaction records.
//!
//! Collects every record the [`Bank`](crate::Bank) produces, across all
//! accounts, in the order they were appended. Records are pushed while the
//! producing account is locked, so for any one account the sequence order is
//! the order the mutations were applied in.

use crate::transaction::Transaction;
use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// One journal entry: a record and its position in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub sequence: u64,
    pub transaction: Transaction,
}

/// A thread-safe, append-only record journal.
///
/// Entries are pushed onto a [`SegQueue`]; the sequence counter numbers them
/// so that consumers can tell the global append order even after draining.
#[derive(Debug)]
pub struct Journal {
    entries: SegQueue<JournalEntry>,
    sequence: AtomicU64,
}

impl Journal {
    pub fn new() -> Self {
        Self {
            entries: SegQueue::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Appends a record and returns its sequence number.
    pub fn push(&self, transaction: Transaction) -> u64 {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.entries.push(JournalEntry {
            sequence,
            transaction,
        });
        sequence
    }

    /// Entries currently waiting in the journal.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of records ever appended, drained or not.
    pub fn appended(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Removes and returns every pending entry, ordered by sequence.
    pub fn drain(&self) -> Vec<JournalEntry> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop() {
            drained.push(entry);
        }
        // Concurrent pushers may enqueue slightly out of sequence order.
        drained.sort_by_key(|entry| entry.sequence);
        drained
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}
