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
/// 2D kernel over lon/lat coordinates: rays, minimum bounding rectangles,
/// polar ordering and great circle lengths

mod ray;
mod rect;

#[cfg(test)]
mod geometry_test;

pub use ray::*;
pub use rect::*;

use geo::{Coord, HaversineDistance, Point};

/// Rough conversion for displaying a ray parameter as meters.
/// Real distances go through [length_in_meters].
pub const LAT_LON_TO_M: f64 = 111_139.0;

pub const FT_TO_M: f64 = 0.3048;

/// Great circle distance between two lon/lat points, in meters
pub fn length_in_meters(v1: Coord<f64>, v2: Coord<f64>) -> f64 {
    Point::from(v1).haversine_distance(&Point::from(v2))
}
