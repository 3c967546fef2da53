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
use std::f64::consts::FRAC_PI_2;

use geo::Coord;

/// Smallest area enclosing rectangle for points that are already in convex
/// hull order. Returns the four corners, or None when there are not enough
/// points to form one.
///
/// Rectangles are invariant under quarter turns, so only the edge angles
/// reduced mod pi/2 need to be tried.
pub fn minimum_bounding_rectangle(points: &[Coord<f64>]) -> Option<[Coord<f64>; 4]> {
    if points.len() < 3 {
        return None;
    }

    let mut angles: Vec<f64> = points
        .windows(2)
        .map(|w| {
            let edge = Coord {
                x: w[1].x - w[0].x,
                y: w[1].y - w[0].y,
            };
            edge.y.atan2(edge.x).rem_euclid(FRAC_PI_2).abs()
        })
        .collect();

    angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
    angles.dedup();

    let mut best: Option<(f64, [f64; 4], [[f64; 2]; 2])> = None;

    for theta in angles {
        //Row major rotation matrix for this candidate angle
        let r = [
            [theta.cos(), (theta - FRAC_PI_2).cos()],
            [(theta + FRAC_PI_2).cos(), theta.cos()],
        ];

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in points {
            let x = r[0][0] * p.x + r[0][1] * p.y;
            let y = r[1][0] * p.x + r[1][1] * p.y;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        let area = (max_x - min_x) * (max_y - min_y);
        let better = match &best {
            Some((best_area, _, _)) => area < *best_area,
            None => true,
        };
        if better {
            best = Some((area, [min_x, max_x, min_y, max_y], r));
        }
    }

    let (_, [min_x, max_x, min_y, max_y], r) = best?;

    //Corners in the rotated frame, rotated back by the transpose
    let unrotate = |x: f64, y: f64| Coord {
        x: x * r[0][0] + y * r[1][0],
        y: x * r[0][1] + y * r[1][1],
    };

    Some([
        unrotate(min_x, max_y),
        unrotate(min_x, min_y),
        unrotate(max_x, min_y),
        unrotate(max_x, max_y),
    ])
}

/// Sorts `points` by polar angle about `origin`.
///
/// The key is atan2(dx, dy) + pi, x over y. That starts the sweep at south
/// and runs clockwise, which is what the rectangle edge ordering expects.
pub fn sorted_points_by_polar_angle(points: &[Coord<f64>], origin: Coord<f64>) -> Vec<Coord<f64>> {
    let angle = |p: &Coord<f64>| (p.x - origin.x).atan2(p.y - origin.y) + std::f64::consts::PI;

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| angle(a).partial_cmp(&angle(b)).unwrap());
    sorted
}
