/*
This file is part of the GIS Address Server
Copyright (C) 2023 Novel-T

The GIS Address Server is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::grid::HasCenter;
use crate::model::street_key_from_components;

/// A postal address point.
///
/// `address_1` is the house number as the source spells it. It is only
/// parsed as an integer during street association; a non numeric value
/// skips association and keeps the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub idx: i64,
    pub region: String,
    pub building_type: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub predirective: Option<String>,
    pub postdirective: Option<String>,
    pub street_name: Option<String>,
    pub post_type: Option<String>,
    pub unit_type: Option<String>,
    pub unit_identifier: Option<String>,
    /// Display form, concatenated by the source
    pub full_address: String,
    pub coord: Coord<f64>,
    pub bucket_idx: Option<i64>,
    pub building_idx: Option<i64>,
    pub street_idx: Option<i64>,
}

impl Address {
    pub fn center(&self) -> Coord<f64> {
        self.coord
    }

    pub fn full_address_with_region(&self) -> String {
        format!("{}, {}", self.full_address, self.region)
    }

    /// Uppercased street matching key; empty when the address has no street
    /// components at all.
    pub fn street_key(&self) -> String {
        street_key_from_components(&[
            self.predirective.as_deref(),
            self.street_name.as_deref(),
            self.post_type.as_deref(),
            self.postdirective.as_deref(),
        ])
    }

    /// House number parsed as an integer, when it is one
    pub fn house_number(&self) -> Option<i64> {
        self.address_1.as_deref()?.trim().parse().ok()
    }
}

impl HasCenter for Address {
    fn center(&self) -> Coord<f64> {
        Address::center(self)
    }
}
