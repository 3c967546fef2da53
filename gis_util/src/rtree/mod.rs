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
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use geo::Coord;
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

pub type GridCoord = f64;

/// Inflation applied around a point payload so it carries a non degenerate
/// rectangle, in degrees
pub const POINT_EPSILON: f64 = 1e-6;

/// One persisted index entry: the record's bounding rectangle and its id.
/// The index never owns the record, the store stays the source of truth.
#[derive(Serialize, Deserialize, Clone)]
pub struct RTreeIndexObject {
    pub idx: i64,
    pub envelope: AABB<[GridCoord; 2]>,
}

impl RTreeIndexObject {
    pub fn for_rect(idx: i64, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        RTreeIndexObject {
            idx,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        }
    }

    /// Entry for a point record, inflated by [POINT_EPSILON]
    pub fn for_point(idx: i64, coord: Coord<f64>) -> Self {
        RTreeIndexObject {
            idx,
            envelope: AABB::from_corners(
                [coord.x - POINT_EPSILON, coord.y - POINT_EPSILON],
                [coord.x + POINT_EPSILON, coord.y + POINT_EPSILON],
            ),
        }
    }
}

/// Implement this to support nearest neighbor calculations
impl PointDistance for RTreeIndexObject {
    /// For speed, use the distance of the center of the envelope to the point
    fn distance_2(&self, rhs: &[GridCoord; 2]) -> GridCoord {
        let center = self.envelope.center();

        // Vector distance in lat/lon
        center.distance_2(rhs)
    }

    // This implementation is not required but more efficient since it
    // omits the calculation of a square root
    fn contains_point(&self, point: &[GridCoord; 2]) -> bool {
        self.envelope.contains_point(point)
    }
}

/// Rstar requires this implementation to know how to index it
impl RTreeObject for RTreeIndexObject {
    type Envelope = AABB<[GridCoord; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PartialEq for RTreeIndexObject {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}
impl Eq for RTreeIndexObject {}

pub fn build_rtree(entries: Vec<RTreeIndexObject>) -> RTree<RTreeIndexObject> {
    RTree::bulk_load(entries)
}

/// Persist the tree, building the file beside the target and renaming it
/// into place so readers never see a half written index
pub fn save_rtree(rtree: &RTree<RTreeIndexObject>, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut writer = BufWriter::new(
            File::create(&tmp_path)
                .with_context(|| format!("Creating rtree file {:?}", &tmp_path))?,
        );
        bincode::serialize_into(&mut writer, rtree)?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// A tree that fails to deserialize is corrupt; that is fatal to the caller,
/// there is no auto repair
pub fn load_rtree(path: &Path) -> Result<RTree<RTreeIndexObject>> {
    let mut reader =
        BufReader::new(File::open(path).with_context(|| format!("Opening rtree {:?}", path))?);
    let rtree = bincode::deserialize_from(&mut reader)
        .with_context(|| format!("Corrupt rtree index {:?}", path))?;
    Ok(rtree)
}

/// The `k` entry ids nearest to `coord`, by center distance in lon/lat
pub fn nearest_idxs(rtree: &RTree<RTreeIndexObject>, coord: Coord<f64>, k: usize) -> Vec<i64> {
    rtree
        .nearest_neighbor_iter(&[coord.x, coord.y])
        .take(k)
        .map(|entry| entry.idx)
        .collect()
}
