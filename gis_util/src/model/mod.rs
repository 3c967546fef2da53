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
/// Record types for a region: buildings, addressed locations, street
/// centerlines and the grid bucket metadata

mod address;
mod bucket;
mod building;
mod street;

pub use address::*;
pub use bucket::*;
pub use building::*;
pub use street::*;

/// Joins the non empty components with spaces, uppercased. Shared shape of
/// the street matching key on both the address and the street side.
pub(crate) fn street_key_from_components(components: &[Option<&str>]) -> String {
    components
        .iter()
        .filter_map(|c| *c)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
