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

//! Car rentals.
//!
//! Cars carry an availability flag that only flips through
//! [`Car::mark_rented`] and [`Car::mark_available`]. A [`RentalDesk`] owns the
//! rental id sequence and the demand counter, prices each rental with a
//! [`PricingPolicy`] and appends the result to the renter's history.

use crate::base::{IdSequence, RentalId};
use crate::validator;
use crate::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum CarClass {
    Economy,
    Luxury,
}

#[derive(Debug)]
pub struct Car {
    make: String,
    model: String,
    price_per_day: Decimal,
    class: CarClass,
    available: AtomicBool,
}

impl Car {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        price_per_day: Decimal,
        class: CarClass,
    ) -> Result<Self, LedgerError> {
        let make = make.into();
        let model = model.into();
        if make.trim().is_empty() {
            return Err(LedgerError::InvalidFormat { field: "make" });
        }
        if model.trim().is_empty() {
            return Err(LedgerError::InvalidFormat { field: "model" });
        }
        if price_per_day <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(Self {
            make,
            model,
            price_per_day,
            class,
            available: AtomicBool::new(true),
        })
    }

    pub fn economy(
        make: impl Into<String>,
        model: impl Into<String>,
        price_per_day: Decimal,
    ) -> Result<Self, LedgerError> {
        Self::new(make, model, price_per_day, CarClass::Economy)
    }

    pub fn luxury(
        make: impl Into<String>,
        model: impl Into<String>,
        price_per_day: Decimal,
    ) -> Result<Self, LedgerError> {
        Self::new(make, model, price_per_day, CarClass::Luxury)
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn price_per_day(&self) -> Decimal {
        self.price_per_day
    }

    pub fn class(&self) -> CarClass {
        self.class
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn mark_rented(&self) -> Result<(), LedgerError> {
        self.available
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| LedgerError::CarNotAvailable(self.to_string()))
    }

    pub fn mark_available(&self) -> Result<(), LedgerError> {
        self.available
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| LedgerError::CarAlreadyAvailable(self.to_string()))
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.make, self.model)
    }
}

/// Criteria for [`Fleet::search`]. Unset fields match every car.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub make: Option<String>,
    pub model: Option<String>,
    pub max_price_per_day: Option<Decimal>,
}

impl SearchFilter {
    fn matches(&self, car: &Car) -> bool {
        self.make.as_deref().is_none_or(|make| make == car.make)
            && self.model.as_deref().is_none_or(|model| model == car.model)
            && self
                .max_price_per_day
                .is_none_or(|max| car.price_per_day <= max)
    }
}

#[derive(Debug, Default)]
pub struct Fleet {
    cars: Vec<Arc<Car>>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, car: Car) -> Arc<Car> {
        let car = Arc::new(car);
        self.cars.push(Arc::clone(&car));
        car
    }

    pub fn cars(&self) -> &[Arc<Car>] {
        &self.cars
    }

    /// Cars matching `filter`, in fleet order.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] when nothing matches.
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<Arc<Car>>, LedgerError> {
        let found: Vec<_> = self
            .cars
            .iter()
            .filter(|car| filter.matches(car))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(LedgerError::NotFound("car".into()));
        }
        Ok(found)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Price multiplier applied by seasonal pricing.
    pub fn factor(self) -> Decimal {
        match self {
            Self::Spring | Self::Autumn => Decimal::ONE,
            Self::Winter => dec!(1.2),
            Self::Summer => dec!(1.5),
        }
    }
}

impl FromStr for Season {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "autumn" => Ok(Self::Autumn),
            "winter" => Ok(Self::Winter),
            _ => Err(LedgerError::InvalidFormat { field: "season" }),
        }
    }
}

/// Inputs to a rental price.
#[derive(Debug, Clone, Copy)]
pub struct Quote {
    pub price_per_day: Decimal,
    pub days: u32,
    pub season: Season,
    /// Position of this rental in the desk's demand count, starting at 1.
    pub demand: u32,
}

impl Quote {
    fn base(&self) -> Result<Decimal, LedgerError> {
        scale(self.price_per_day, Decimal::from(self.days))
    }
}

fn scale(total: Decimal, factor: Decimal) -> Result<Decimal, LedgerError> {
    total.checked_mul(factor).ok_or(LedgerError::InvalidAmount)
}

pub trait PricingPolicy {
    fn name(&self) -> &'static str;

    /// Total price of the rental described by `quote`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAmount`] when the price does not fit in a
    /// `Decimal`.
    fn price(&self, quote: &Quote) -> Result<Decimal, LedgerError>;
}

/// 20% off for five days or more, 20% surcharge past 50 rentals of demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct EconomyPricing;

impl PricingPolicy for EconomyPricing {
    fn name(&self) -> &'static str {
        "economy"
    }

    fn price(&self, quote: &Quote) -> Result<Decimal, LedgerError> {
        let mut total = quote.base()?;
        if quote.days >= 5 {
            total = scale(total, dec!(0.8))?;
        }
        if quote.demand > 50 {
            total = scale(total, dec!(1.2))?;
        }
        Ok(total)
    }
}

/// 10% off for five days or more, seasonal factor, 50% surcharge past 10
/// rentals of demand, then a 0.7 premium-service factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuxuryPricing;

impl PricingPolicy for LuxuryPricing {
    fn name(&self) -> &'static str {
        "luxury"
    }

    fn price(&self, quote: &Quote) -> Result<Decimal, LedgerError> {
        let mut total = quote.base()?;
        if quote.days >= 5 {
            total = scale(total, dec!(0.9))?;
        }
        total = scale(total, quote.season.factor())?;
        if quote.demand > 10 {
            total = scale(total, dec!(1.5))?;
        }
        scale(total, dec!(0.7))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RentalRecord {
    pub rental_id: RentalId,
    pub make: String,
    pub model: String,
    pub days: u32,
    pub season: Season,
    pub policy: &'static str,
    pub total_price: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Renter {
    name: String,
    email: String,
    history: Vec<RentalRecord>,
}

impl Renter {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let email = email.into();
        validator::validate_name(&name)?;
        validator::validate_email(&email)?;
        Ok(Self {
            name,
            email,
            history: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), LedgerError> {
        let email = email.into();
        validator::validate_email(&email)?;
        self.email = email;
        Ok(())
    }

    /// Rentals, oldest first.
    pub fn history(&self) -> &[RentalRecord] {
        &self.history
    }

    /// One human-readable line per rental.
    pub fn rental_history(&self) -> Vec<String> {
        self.history
            .iter()
            .map(|rental| {
                format!(
                    "Rental Id: {}, Car: {} {}, Rental Duration: {}, Total Price: ${}",
                    rental.rental_id,
                    rental.make,
                    rental.model,
                    rental.days,
                    rental.total_price.normalize()
                )
            })
            .collect()
    }
}

/// Issues rentals.
#[derive(Debug, Default)]
pub struct RentalDesk {
    ids: IdSequence,
    demand: IdSequence,
}

impl RentalDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequences(ids: IdSequence, demand: IdSequence) -> Self {
        Self { ids, demand }
    }

    /// Rents `car` to `renter` for `days` days.
    ///
    /// Ids and demand are only consumed by successful rentals. The price uses
    /// the demand position the rental will take; concurrent rentals on one
    /// desk may be priced with the same position.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidRentalDuration`] - `days` is zero.
    /// - [`LedgerError::CarNotAvailable`] - the car is already rented.
    /// - [`LedgerError::InvalidAmount`] - the price does not fit in a
    ///   `Decimal`.
    pub fn rent(
        &self,
        renter: &mut Renter,
        car: &Car,
        policy: &dyn PricingPolicy,
        days: u32,
        season: Season,
    ) -> Result<RentalRecord, LedgerError> {
        if days == 0 {
            return Err(LedgerError::InvalidRentalDuration);
        }
        let quote = Quote {
            price_per_day: car.price_per_day(),
            days,
            season,
            demand: self.demand.peek(),
        };
        let total_price = policy.price(&quote)?;
        car.mark_rented()?;

        self.demand.next();
        let record = RentalRecord {
            rental_id: self.ids.next_rental_id(),
            make: car.make().to_owned(),
            model: car.model().to_owned(),
            days,
            season,
            policy: policy.name(),
            total_price,
            timestamp: Utc::now(),
        };
        tracing::debug!(rental = %record.rental_id, car = %car, price = %record.total_price, "car rented");
        renter.history.push(record.clone());
        Ok(record)
    }

    pub fn return_car(&self, car: &Car) -> Result<(), LedgerError> {
        car.mark_available()?;
        tracing::debug!(car = %car, "car returned");
        Ok(())
    }

    /// Restarts both the id sequence and the demand counter.
    pub fn reset(&self) {
        self.ids.reset();
        self.demand.reset();
    }
}
