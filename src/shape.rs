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

//! Plane shapes.
//!
//! Every shape validates its sizes on construction and answers area and
//! perimeter through the [`Shape`] trait, so a [`ShapeCollection`] can total
//! any mix of them.

use crate::LedgerError;
use std::fmt;

/// Geometry shared by every shape.
pub trait Shape: fmt::Display + fmt::Debug + Send + Sync {
    fn area(&self) -> f64;

    fn perimeter(&self) -> f64;
}

/// Every size must be a finite number greater than zero.
fn validate_sizes(shape: &'static str, sizes: &[f64]) -> Result<(), LedgerError> {
    if sizes.iter().all(|size| size.is_finite() && *size > 0.0) {
        Ok(())
    } else {
        Err(LedgerError::InvalidSize(shape))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    width: f64,
    height: f64,
}

impl Rectangle {
    pub fn new(width: f64, height: f64) -> Result<Self, LedgerError> {
        validate_sizes("rectangle", &[width, height])?;
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

impl Shape for Rectangle {
    fn area(&self) -> f64 {
        self.width * self.height
    }

    fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.height)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rectangle: width = {}, height = {}, area = {}, perimeter = {}",
            self.width,
            self.height,
            self.area(),
            self.perimeter()
        )
    }
}

/// Isosceles triangle given by its base and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    base: f64,
    height: f64,
}

impl Triangle {
    pub fn new(base: f64, height: f64) -> Result<Self, LedgerError> {
        validate_sizes("triangle", &[base, height])?;
        Ok(Self { base, height })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Length of each of the two equal sides.
    pub fn side(&self) -> f64 {
        (self.base / 2.0).hypot(self.height)
    }
}

impl Shape for Triangle {
    fn area(&self) -> f64 {
        self.base * self.height / 2.0
    }

    fn perimeter(&self) -> f64 {
        self.base + 2.0 * self.side()
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Triangle: base = {}, height = {}, area = {}, perimeter = {}",
            self.base,
            self.height,
            self.area(),
            self.perimeter()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square {
    side: f64,
}

impl Square {
    pub fn new(side: f64) -> Result<Self, LedgerError> {
        validate_sizes("square", &[side])?;
        Ok(Self { side })
    }

    pub fn side(&self) -> f64 {
        self.side
    }
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }

    fn perimeter(&self) -> f64 {
        4.0 * self.side
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Square: side = {}, area = {}, perimeter = {}",
            self.side,
            self.area(),
            self.perimeter()
        )
    }
}

/// Any mix of shapes, in insertion order.
#[derive(Debug, Default)]
pub struct ShapeCollection {
    shapes: Vec<Box<dyn Shape>>,
}

impl ShapeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Shape + 'static>(&mut self, shape: S) {
        tracing::debug!(shape = %shape, "shape added");
        self.shapes.push(Box::new(shape));
    }

    pub fn shapes(&self) -> &[Box<dyn Shape>] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn total_area(&self) -> f64 {
        self.shapes.iter().map(|shape| shape.area()).sum()
    }

    pub fn total_perimeter(&self) -> f64 {
        self.shapes.iter().map(|shape| shape.perimeter()).sum()
    }
}
