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

use crate::model::street_key_from_components;

/// One street centerline segment with its left/right house number ranges.
/// The range pairs are either both present or both absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Street {
    pub idx: i64,
    pub region: String,
    pub l_min_addr: Option<i64>,
    pub l_max_addr: Option<i64>,
    pub r_min_addr: Option<i64>,
    pub r_max_addr: Option<i64>,
    pub prefix: Option<String>,
    pub name: String,
    pub street_type: Option<String>,
    pub suffix: Option<String>,
    pub full_name: String,
    pub coords: Vec<Coord<f64>>,
}

impl Street {
    /// Uppercased matching key built from the segment's own components,
    /// mirroring [crate::model::Address::street_key]
    pub fn street_key(&self) -> String {
        street_key_from_components(&[
            self.prefix.as_deref(),
            Some(&self.name),
            self.street_type.as_deref(),
            self.suffix.as_deref(),
        ])
    }

    /// Inclusive house number range covered by either side of the segment,
    /// None when a side is unknown
    pub fn address_range(&self) -> Option<(i64, i64)> {
        let min_range = self.l_min_addr.min(self.r_min_addr)?;
        let max_range = self.l_max_addr.max(self.r_max_addr)?;
        Some((min_range, max_range))
    }
}
