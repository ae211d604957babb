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

//! Restaurant orders.
//!
//! An [`Order`] is a ledger of dishes: every added dish appends an
//! [`OrderLine`] carrying the price at the time it was ordered, and the total
//! moves with the lines. Later menu repricing does not touch existing lines.

use crate::base::{IdSequence, OrderId};
use crate::customer::{Customer, LedgerEntity};
use crate::menu::{Course, Menu};
use crate::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderLine {
    order: OrderId,
    line: u32,
    dish: String,
    course: Course,
    price: Decimal,
    timestamp: DateTime<Utc>,
}

impl OrderLine {
    pub fn order(&self) -> OrderId {
        self.order
    }

    /// Line number, unique within the order.
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn dish(&self) -> &str {
        &self.dish
    }

    pub fn course(&self) -> Course {
        self.course
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    lines: Vec<OrderLine>,
    total: Decimal,
    next_line: u32,
}

impl Order {
    /// Creates an empty order with the next id from `ids`.
    pub fn new(ids: &IdSequence) -> Self {
        Self::with_id(ids.next_order_id())
    }

    pub fn with_id(id: OrderId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            total: Decimal::ZERO,
            next_line: 1,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Adds the first dish named `name` found across `menus`, searched in
    /// order.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] - no menu lists the dish.
    /// - [`LedgerError::InvalidAmount`] - the new total does not fit in a
    ///   `Decimal`.
    pub fn add_dish(&mut self, name: &str, menus: &[&Menu]) -> Result<&OrderLine, LedgerError> {
        let dish = menus
            .iter()
            .find_map(|menu| menu.get(name))
            .ok_or_else(|| LedgerError::NotFound(format!("dish {name}")))?;
        let total = self
            .total
            .checked_add(dish.price())
            .ok_or(LedgerError::InvalidAmount)?;

        let line = OrderLine {
            order: self.id,
            line: self.next_line,
            dish: dish.name().to_owned(),
            course: dish.course(),
            price: dish.price(),
            timestamp: Utc::now(),
        };
        self.next_line += 1;
        self.total = total;
        tracing::debug!(order = %self.id, dish = %line.dish, price = %line.price, "dish added");
        self.lines.push(line);
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Removes the line numbered `line` and takes its price off the total.
    pub fn remove_line(&mut self, line: u32) -> Result<OrderLine, LedgerError> {
        let index = self
            .lines
            .iter()
            .position(|entry| entry.line == line)
            .ok_or_else(|| LedgerError::NotFound(format!("order line {line}")))?;
        let removed = self.lines.remove(index);
        self.total -= removed.price;
        debug_assert!(self.total >= Decimal::ZERO);
        Ok(removed)
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// One `"<dish> : $<price>"` line per ordered dish.
    pub fn summary(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| format!("{} : ${}", line.dish, line.price.normalize()))
            .collect()
    }
}

impl LedgerEntity for Order {
    type Id = OrderId;
    type Record = OrderLine;

    const KIND: &'static str = "order";

    fn id(&self) -> &OrderId {
        &self.id
    }

    fn history(&self, limit: usize) -> Vec<OrderLine> {
        let start = self.lines.len().saturating_sub(limit);
        self.lines[start..].to_vec()
    }
}

impl Customer<Order> {
    /// Places `order` on this customer's history.
    pub fn place_order(&mut self, order: Order) -> Result<(), LedgerError> {
        self.attach(order)
    }

    /// One `"<customer> : <total>"` line per placed order.
    pub fn order_history(&self) -> Vec<String> {
        self.entities()
            .iter()
            .map(|order| format!("{} : {}", self.name(), order.total().normalize()))
            .collect()
    }
}
