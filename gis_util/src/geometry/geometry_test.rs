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
use float_cmp::approx_eq;
use geo::Coord;

use crate::geometry::{
    length_in_meters, minimum_bounding_rectangle, sorted_points_by_polar_angle, Ray,
};

fn east_ray() -> Ray {
    Ray {
        ro: Coord { x: 0.0, y: 0.0 },
        rd: Coord { x: 1.0, y: 0.0 },
    }
}

#[test]
fn test_ray_direction_follows_heading() {
    let origin = Coord { x: -105.0, y: 39.0 };

    let north = Ray::new(origin, 0.0);
    assert!(north.rd.y > 0.99);
    assert!(north.rd.x.abs() < 0.01);

    let east = Ray::new(origin, 90.0);
    assert!(east.rd.x > 0.99);
    assert!(east.rd.y.abs() < 0.01);

    let south = Ray::new(origin, 180.0);
    assert!(south.rd.y < -0.99);
}

#[test]
fn test_ray_direction_is_unit_length() {
    let ray = Ray::new(Coord { x: -105.0, y: 39.0 }, 37.0);
    let magnitude = (ray.rd.x * ray.rd.x + ray.rd.y * ray.rd.y).sqrt();
    assert!(approx_eq!(f64, magnitude, 1.0, epsilon = 1e-12));
}

#[test]
fn test_point_at_is_collinear() {
    let ray = Ray::new(Coord { x: -105.0, y: 39.0 }, 123.0);

    for t in [0.25, 1.0, 3.5] {
        let p = ray.point_at(t);
        let dx = p.x - ray.ro.x;
        let dy = p.y - ray.ro.y;
        // distance from the origin equals |t| in lon/lat space
        assert!(approx_eq!(f64, (dx * dx + dy * dy).sqrt(), t, epsilon = 1e-12));
        // and the offset is parallel to the direction
        assert!(approx_eq!(f64, dx * ray.rd.y - dy * ray.rd.x, 0.0, epsilon = 1e-12));
    }
}

#[test]
fn test_intersection_with_crossing_segment() {
    let hit = east_ray()
        .line_intersection(&(Coord { x: 1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 }))
        .unwrap();

    assert!(approx_eq!(f64, hit.t, 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, hit.midpoint.x, 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, hit.midpoint.y, 0.0, epsilon = 1e-12));
    // the normal faces back at the viewer, L1 normalized
    assert!(approx_eq!(f64, hit.normal.x, -1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, hit.normal.y, 0.0, epsilon = 1e-12));
    assert!(hit.face_length > 0.0);
}

#[test]
fn test_normal_flips_against_the_ray() {
    let west_ray = Ray {
        ro: Coord { x: 2.0, y: 0.0 },
        rd: Coord { x: -1.0, y: 0.0 },
    };
    let hit = west_ray
        .line_intersection(&(Coord { x: 1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 }))
        .unwrap();
    assert!(approx_eq!(f64, hit.normal.x, 1.0, epsilon = 1e-12));
}

#[test]
fn test_parallel_segment_never_hits() {
    let result = east_ray()
        .line_intersection(&(Coord { x: 0.0, y: 1.0 }, Coord { x: 5.0, y: 1.0 }));
    assert!(result.is_none());
}

#[test]
fn test_segment_behind_the_ray() {
    let result = east_ray()
        .line_intersection(&(Coord { x: -1.0, y: -1.0 }, Coord { x: -1.0, y: 1.0 }));
    assert!(result.is_none());
}

#[test]
fn test_segment_off_to_the_side() {
    let result = east_ray()
        .line_intersection(&(Coord { x: 1.0, y: 1.0 }, Coord { x: 1.0, y: 3.0 }));
    assert!(result.is_none());
}

#[test]
fn test_endpoint_hits_are_inclusive() {
    // the ray passes exactly through the segment's lower endpoint
    let hit = east_ray()
        .line_intersection(&(Coord { x: 1.0, y: 0.0 }, Coord { x: 1.0, y: 2.0 }));
    assert!(hit.is_some());
}

fn rect_contains(corners: &[Coord<f64>], points: &[Coord<f64>], tolerance: f64) -> bool {
    // express each point in the rectangle's edge frame and check the
    // projections stay within the side lengths
    let u = Coord {
        x: corners[1].x - corners[0].x,
        y: corners[1].y - corners[0].y,
    };
    let v = Coord {
        x: corners[3].x - corners[0].x,
        y: corners[3].y - corners[0].y,
    };
    let u_len2 = u.x * u.x + u.y * u.y;
    let v_len2 = v.x * v.x + v.y * v.y;

    points.iter().all(|p| {
        let d = Coord {
            x: p.x - corners[0].x,
            y: p.y - corners[0].y,
        };
        let pu = (d.x * u.x + d.y * u.y) / u_len2;
        let pv = (d.x * v.x + d.y * v.y) / v_len2;
        pu >= -tolerance && pu <= 1.0 + tolerance && pv >= -tolerance && pv <= 1.0 + tolerance
    })
}

#[test]
fn test_mbr_of_axis_aligned_rectangle() {
    let points = vec![
        Coord { x: 0.0, y: 0.0 },
        Coord { x: 0.0, y: 2.0 },
        Coord { x: 3.0, y: 2.0 },
        Coord { x: 3.0, y: 0.0 },
        Coord { x: 0.0, y: 0.0 },
    ];
    let corners = minimum_bounding_rectangle(&points).unwrap();

    // the rectangle is its own minimum bounding rectangle
    for expected in [
        Coord { x: 0.0, y: 0.0 },
        Coord { x: 0.0, y: 2.0 },
        Coord { x: 3.0, y: 2.0 },
        Coord { x: 3.0, y: 0.0 },
    ] {
        assert!(corners.iter().any(|c| {
            approx_eq!(f64, c.x, expected.x, epsilon = 1e-9)
                && approx_eq!(f64, c.y, expected.y, epsilon = 1e-9)
        }));
    }
    assert!(rect_contains(&corners, &points, 1e-9));
}

#[test]
fn test_mbr_of_tilted_hull() {
    // a diamond: the minimum rectangle is rotated 45 degrees and has half
    // the area of the axis aligned bbox
    let points = vec![
        Coord { x: 1.0, y: 0.0 },
        Coord { x: 2.0, y: 1.0 },
        Coord { x: 1.0, y: 2.0 },
        Coord { x: 0.0, y: 1.0 },
        Coord { x: 1.0, y: 0.0 },
    ];
    let corners = minimum_bounding_rectangle(&points).unwrap();

    assert!(rect_contains(&corners, &points, 1e-9));

    let u = ((corners[1].x - corners[0].x).powi(2) + (corners[1].y - corners[0].y).powi(2)).sqrt();
    let v = ((corners[3].x - corners[0].x).powi(2) + (corners[3].y - corners[0].y).powi(2)).sqrt();
    assert!(approx_eq!(f64, u * v, 2.0, epsilon = 1e-9));
}

#[test]
fn test_mbr_sides_are_perpendicular() {
    let points = vec![
        Coord { x: 0.0, y: 0.0 },
        Coord { x: 1.0, y: 3.0 },
        Coord { x: 4.0, y: 4.0 },
        Coord { x: 5.0, y: 1.0 },
        Coord { x: 0.0, y: 0.0 },
    ];
    let corners = minimum_bounding_rectangle(&points).unwrap();

    let u = Coord {
        x: corners[1].x - corners[0].x,
        y: corners[1].y - corners[0].y,
    };
    let v = Coord {
        x: corners[3].x - corners[0].x,
        y: corners[3].y - corners[0].y,
    };
    assert!(approx_eq!(f64, u.x * v.x + u.y * v.y, 0.0, epsilon = 1e-9));
    assert!(rect_contains(&corners, &points, 1e-9));
}

#[test]
fn test_mbr_needs_three_points() {
    assert!(minimum_bounding_rectangle(&[]).is_none());
    assert!(minimum_bounding_rectangle(&[
        Coord { x: 0.0, y: 0.0 },
        Coord { x: 1.0, y: 1.0 }
    ])
    .is_none());
}

#[test]
fn test_polar_sort_sweeps_clockwise_from_south() {
    let origin = Coord { x: 0.0, y: 0.0 };
    let east = Coord { x: 1.0, y: 0.0 };
    let north = Coord { x: 0.0, y: 1.0 };
    let west = Coord { x: -1.0, y: 0.0 };
    let south = Coord { x: 0.0, y: -1.0 };

    let sorted = sorted_points_by_polar_angle(&[east, north, west, south], origin);
    assert_eq!(sorted, vec![west, north, east, south]);
}

#[test]
fn test_length_in_meters() {
    // one degree of latitude is about 111 km
    let a = Coord { x: -105.0, y: 39.0 };
    let b = Coord { x: -105.0, y: 40.0 };
    let d = length_in_meters(a, b);
    assert!(d > 110_000.0 && d < 112_000.0);

    assert!(approx_eq!(f64, length_in_meters(a, a), 0.0, epsilon = 1e-9));
}
