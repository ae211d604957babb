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

//! Restaurant menus.
//!
//! A [`Menu`] holds the dishes of one course in the order they were added.
//! Dish prices only change through the percentage adjustments below, which
//! never let a price drop to zero.

use crate::validator;
use crate::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Course {
    Appetizer,
    Entree,
    Dessert,
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Appetizer => "Appetizers",
            Self::Entree => "Entrees",
            Self::Dessert => "Desserts",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Dish {
    name: String,
    price: Decimal,
    course: Course,
}

impl Dish {
    pub fn new(name: impl Into<String>, price: Decimal, course: Course) -> Result<Self, LedgerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidFormat { field: "dish name" });
        }
        if price <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(Self {
            name,
            price,
            course,
        })
    }

    pub fn appetizer(name: impl Into<String>, price: Decimal) -> Result<Self, LedgerError> {
        Self::new(name, price, Course::Appetizer)
    }

    pub fn entree(name: impl Into<String>, price: Decimal) -> Result<Self, LedgerError> {
        Self::new(name, price, Course::Entree)
    }

    pub fn dessert(name: impl Into<String>, price: Decimal) -> Result<Self, LedgerError> {
        Self::new(name, price, Course::Dessert)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn course(&self) -> Course {
        self.course
    }
}

/// Dishes of a single course.
#[derive(Debug, Clone)]
pub struct Menu {
    course: Course,
    dishes: Vec<Dish>,
}

impl Menu {
    pub fn new(course: Course) -> Self {
        Self {
            course,
            dishes: Vec::new(),
        }
    }

    pub fn course(&self) -> Course {
        self.course
    }

    /// # Errors
    ///
    /// - [`LedgerError::InvalidFormat`] - the dish belongs to another course.
    /// - [`LedgerError::DuplicateEntity`] - a dish with that name is listed.
    pub fn add_dish(&mut self, dish: Dish) -> Result<(), LedgerError> {
        if dish.course != self.course {
            return Err(LedgerError::InvalidFormat { field: "dish course" });
        }
        if self.get(&dish.name).is_some() {
            return Err(LedgerError::DuplicateEntity(dish.name));
        }
        self.dishes.push(dish);
        Ok(())
    }

    pub fn remove_dish(&mut self, name: &str) -> Result<Dish, LedgerError> {
        let index = self.position(name)?;
        Ok(self.dishes.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Dish> {
        self.dishes.iter().find(|dish| dish.name == name)
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    /// One `"<name>: $<price>"` line per dish.
    pub fn view(&self) -> Vec<String> {
        self.dishes
            .iter()
            .map(|dish| format!("{}: ${}", dish.name, dish.price.normalize()))
            .collect()
    }

    /// Raises the price of `name` by `percent` percent.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAmount`] when the raised price does not fit in a
    /// `Decimal`; the price is left unchanged.
    pub fn increase_price(&mut self, name: &str, percent: Decimal) -> Result<Decimal, LedgerError> {
        validator::validate_percent(percent)?;
        let index = self.position(name)?;
        let dish = &mut self.dishes[index];
        dish.price = raised(dish.price, percent)?;
        Ok(dish.price)
    }

    /// Lowers the price of `name` by `percent` percent.
    ///
    /// `percent` must be below 100 so the price stays positive.
    pub fn decrease_price(&mut self, name: &str, percent: Decimal) -> Result<Decimal, LedgerError> {
        validator::validate_percent(percent)?;
        if percent >= Decimal::ONE_HUNDRED {
            return Err(LedgerError::InvalidPercent);
        }
        let index = self.position(name)?;
        let dish = &mut self.dishes[index];
        dish.price = dish
            .price
            .checked_sub(percent_of(dish.price, percent)?)
            .ok_or(LedgerError::InvalidAmount)?;
        Ok(dish.price)
    }

    /// Raises every listed dish by `percent`; names not on this menu are
    /// skipped. Returns how many dishes were repriced.
    ///
    /// Either every listed dish is repriced or, on error, none is.
    pub fn apply_demand_pricing<'a, I>(&mut self, names: I, percent: Decimal) -> Result<usize, LedgerError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        validator::validate_percent(percent)?;
        let mut updates = Vec::new();
        for name in names {
            if let Ok(index) = self.position(name) {
                updates.push((index, raised(self.dishes[index].price, percent)?));
            }
        }
        for &(index, price) in &updates {
            self.dishes[index].price = price;
        }
        Ok(updates.len())
    }

    fn position(&self, name: &str) -> Result<usize, LedgerError> {
        self.dishes
            .iter()
            .position(|dish| dish.name == name)
            .ok_or_else(|| LedgerError::NotFound(format!("dish {name}")))
    }
}

fn percent_of(price: Decimal, percent: Decimal) -> Result<Decimal, LedgerError> {
    price
        .checked_mul(percent)
        .map(|scaled| scaled / Decimal::ONE_HUNDRED)
        .ok_or(LedgerError::InvalidAmount)
}

fn raised(price: Decimal, percent: Decimal) -> Result<Decimal, LedgerError> {
    price
        .checked_add(percent_of(price, percent)?)
        .ok_or(LedgerError::InvalidAmount)
}
