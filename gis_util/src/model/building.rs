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
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::geometry::{length_in_meters, minimum_bounding_rectangle, sorted_points_by_polar_angle};
use crate::grid::HasCenter;

/// A building footprint. The polygon ring is implicitly closed, in insertion
/// order.
///
/// Created by ingestion, mutated only by consolidation (`bucket_idx`,
/// `address_idxs`), read only at query time. The derived geometry is
/// computed on first access and memoized for the lifetime of the instance,
/// never persisted. Recomputing is cheap and sidesteps invalidation if the
/// polygon points ever migrate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub idx: i64,
    pub region: String,
    /// Height in feet, where the source provides one
    pub height: Option<f64>,
    /// Ground elevation in feet
    pub ground_elevation: Option<f64>,
    pub building_type: String,
    pub polygon_points: Vec<Coord<f64>>,
    pub bucket_idx: Option<i64>,
    pub address_idxs: Vec<i64>,

    #[serde(skip)]
    cache: BuildingCache,
}

#[derive(Debug, Clone, Default)]
struct BuildingCache {
    bbox: OnceCell<(f64, f64, f64, f64)>,
    mbr: OnceCell<Option<Vec<Coord<f64>>>>,
    lines: OnceCell<Option<Vec<(Coord<f64>, Coord<f64>)>>>,
    xy_extent: OnceCell<(f64, f64)>,
    local_points: OnceCell<Vec<Coord<f64>>>,
}

impl Building {
    pub fn new(
        idx: i64,
        region: String,
        height: Option<f64>,
        ground_elevation: Option<f64>,
        building_type: String,
        polygon_points: Vec<Coord<f64>>,
    ) -> Self {
        Building {
            idx,
            region,
            height,
            ground_elevation,
            building_type,
            polygon_points,
            bucket_idx: None,
            address_idxs: Vec::new(),
            cache: BuildingCache::default(),
        }
    }

    /// (min_x, min_y, max_x, max_y) over the polygon vertices
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        *self.cache.bbox.get_or_init(|| {
            let (mut min_x, mut min_y) = (100_000.0_f64, 100_000.0_f64);
            let (mut max_x, mut max_y) = (-100_000.0_f64, -100_000.0_f64);
            for point in &self.polygon_points {
                min_x = min_x.min(point.x);
                max_x = max_x.max(point.x);
                min_y = min_y.min(point.y);
                max_y = max_y.max(point.y);
            }
            (min_x, min_y, max_x, max_y)
        })
    }

    /// Bbox midpoint
    pub fn center(&self) -> Coord<f64> {
        let (min_x, min_y, max_x, max_y) = self.bbox();
        Coord {
            x: (min_x + max_x) / 2.0,
            y: (min_y + max_y) / 2.0,
        }
    }

    /// Minimum area enclosing rectangle of the footprint, corners ordered by
    /// polar angle about the center. None for a degenerate polygon.
    pub fn min_bounding_rect(&self) -> Option<&[Coord<f64>]> {
        self.cache
            .mbr
            .get_or_init(|| {
                minimum_bounding_rectangle(&self.polygon_points)
                    .map(|corners| sorted_points_by_polar_angle(&corners, self.center()))
            })
            .as_deref()
    }

    /// The four directed edges of the minimum bounding rectangle. These are
    /// the segments rays get tested against.
    pub fn lines_for_shape(&self) -> Option<&[(Coord<f64>, Coord<f64>)]> {
        self.cache
            .lines
            .get_or_init(|| {
                self.min_bounding_rect().map(|corners| {
                    (0..corners.len())
                        .map(|i| (corners[i], corners[(i + 1) % corners.len()]))
                        .collect()
                })
            })
            .as_deref()
    }

    /// Great circle spans of the bbox: SW corner to SE, and SW to NW, in
    /// meters. Only meaningful for small footprints, this is not a
    /// projection.
    pub fn xy_extent_in_meters(&self) -> (f64, f64) {
        *self.cache.xy_extent.get_or_init(|| {
            let (min_x, min_y, max_x, max_y) = self.bbox();
            let origin = Coord { x: min_x, y: min_y };
            let x_distance = length_in_meters(origin, Coord { x: max_x, y: min_y });
            let y_distance = length_in_meters(origin, Coord { x: min_x, y: max_y });
            (x_distance, y_distance)
        })
    }

    /// Bbox SW corner
    pub fn origin(&self) -> Coord<f64> {
        let (min_x, min_y, _, _) = self.bbox();
        Coord { x: min_x, y: min_y }
    }

    /// Polygon vertices normalized into the unit square by the bbox, scaled
    /// by the meter extent
    pub fn points_in_local_coords(&self) -> &[Coord<f64>] {
        self.cache.local_points.get_or_init(|| {
            let (min_x, min_y, max_x, max_y) = self.bbox();
            let (x_meters, y_meters) = self.xy_extent_in_meters();
            self.polygon_points
                .iter()
                .map(|p| Coord {
                    x: (p.x - min_x) / (max_x - min_x) * x_meters,
                    y: (p.y - min_y) / (max_y - min_y) * y_meters,
                })
                .collect()
        })
    }
}

impl HasCenter for Building {
    fn center(&self) -> Coord<f64> {
        Building::center(self)
    }
}
