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
use geo::{Coord, HaversineDestination, Point};

use crate::geometry::length_in_meters;

/// A hit of a ray against one line segment.
#[derive(Debug, Clone)]
pub struct LineIntersection {
    /// Ray parameter of the hit, in lon/lat units
    pub t: f64,
    /// Midpoint of the struck segment
    pub midpoint: Coord<f64>,
    /// Unit (L1) normal of the face, oriented against the ray
    pub normal: Coord<f64>,
    /// Great circle length of the segment in meters
    pub face_length: f64,
}

/// Ray anchored at the viewer with a direction derived from a compass
/// heading (0 = north, 90 = east, clockwise).
///
/// The direction is taken from a real geodesic destination 1 km out, so it
/// carries the correct local bearing against polygon edges that are
/// themselves in lon/lat space.
pub struct Ray {
    pub ro: Coord<f64>,
    pub rd: Coord<f64>,
}

impl Ray {
    pub fn new(loc: Coord<f64>, heading: f64) -> Self {
        let start = Point::from(loc);
        let dest = start.haversine_destination(heading, 1_000.0);

        let rd = Coord {
            x: dest.x() - loc.x,
            y: dest.y() - loc.y,
        };
        let magnitude = (rd.x * rd.x + rd.y * rd.y).sqrt();

        Ray {
            ro: loc,
            rd: Coord {
                x: rd.x / magnitude,
                y: rd.y / magnitude,
            },
        }
    }

    /// Coordinate at `t` along the ray
    pub fn point_at(&self, t: f64) -> Coord<f64> {
        Coord {
            x: self.ro.x + t * self.rd.x,
            y: self.ro.y + t * self.rd.y,
        }
    }

    /// Intersection test between self and the segment `(l1, l2)`.
    ///
    /// Hit iff t1 >= 0 along the ray and the segment parameter t2 lands in
    /// [0, 1]. Parallel segments never hit.
    pub fn line_intersection(&self, line: &(Coord<f64>, Coord<f64>)) -> Option<LineIntersection> {
        let (l1, l2) = *line;

        let v1 = Coord {
            x: self.ro.x - l1.x,
            y: self.ro.y - l1.y,
        };
        let v2 = Coord {
            x: l2.x - l1.x,
            y: l2.y - l1.y,
        };
        let v3 = Coord {
            x: -self.rd.y,
            y: self.rd.x,
        };

        let denom = v2.x * v3.x + v2.y * v3.y;
        if denom == 0.0 {
            return None;
        }

        let t1 = (v2.x * v1.y - v2.y * v1.x) / denom;
        let t2 = (v1.x * v3.x + v1.y * v3.y) / denom;

        if t1 < 0.0 || t2 < 0.0 || t2 > 1.0 {
            return None;
        }

        //Left hand perpendicular of the face, flipped if it faces along the ray
        let mut norm = Coord { x: -v2.y, y: v2.x };
        if norm.x * self.rd.x + norm.y * self.rd.y > 0.0 {
            norm = Coord { x: v2.y, y: -v2.x };
        }

        let length = norm.x.abs() + norm.y.abs();
        let normalized = if length != 0.0 {
            Coord {
                x: norm.x / length,
                y: norm.y / length,
            }
        } else if norm.x >= norm.y {
            //Degenerate face, fall back to the dominant axis
            Coord { x: 1.0, y: 0.0 }
        } else {
            Coord { x: 0.0, y: 1.0 }
        };

        let midpoint = Coord {
            x: (l1.x + l2.x) / 2.0,
            y: (l1.y + l2.y) / 2.0,
        };

        Some(LineIntersection {
            t: t1,
            midpoint,
            normal: normalized,
            face_length: length_in_meters(l2, l1),
        })
    }
}
