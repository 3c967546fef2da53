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
/// The two end to end queries: proximity lookups and the ray/building
/// intersection sweep. Everything here is read only; instances of the
/// engine are shared across requests.


use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use geo::Coord;
use log::warn;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{LineIntersection, Ray, FT_TO_M};
use crate::model::Building;
use crate::paths::{rtree_path, RtreeKind};
use crate::rtree::{load_rtree, nearest_idxs, RTreeIndexObject};
use crate::store::RecordStore;

/// Candidate set size for the k nearest neighbor path
pub const NEAREST_CANDIDATES: usize = 50;

/// How many addresses get attached to an intersection hit on the R-tree path
const NEAREST_ADDRESSES: usize = 3;

/// Stand in face height when a building has no usable height, in meters
const DEFAULT_FACE_HEIGHT_M: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Grid,
    Rtree,
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(IndexKind::Grid),
            "rtree" => Ok(IndexKind::Rtree),
            other => Err(format!("unknown index kind '{}', expected grid or rtree", other)),
        }
    }
}

/// Errors the HTTP layer can tell apart: bad input is the caller's fault,
/// everything else is ours
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateOut {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coord<f64>> for CoordinateOut {
    fn from(coord: Coord<f64>) -> Self {
        CoordinateOut {
            latitude: coord.y,
            longitude: coord.x,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOut {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coord: Option<CoordinateOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon_coords: Option<Vec<CoordinateOut>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressOut {
    pub count: usize,
    pub result: Vec<AddressResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionResult {
    pub idx: i64,
    pub t: f64,
    pub addresses: Vec<String>,
    pub point: CoordinateOut,
    pub normal: PointOut,
    pub face_length: f64,
    pub face_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionOut {
    pub count: usize,
    pub result: Vec<IntersectionResult>,
}

pub struct QueryEngine {
    store: RecordStore,
    index_kind: IndexKind,
    building_trees: HashMap<String, RTree<RTreeIndexObject>>,
    address_trees: HashMap<String, RTree<RTreeIndexObject>>,
}

impl QueryEngine {
    /// Opens the engine over an already opened store. On the R-tree path
    /// every persisted index is loaded up front; a corrupt index file is
    /// fatal here, there is no auto repair.
    pub fn open(store: RecordStore, data_dir: &Path, index_kind: IndexKind) -> Result<Self> {
        let mut building_trees = HashMap::new();
        let mut address_trees = HashMap::new();

        if index_kind == IndexKind::Rtree {
            for region in store.regions()? {
                let buildings =
                    load_rtree(&rtree_path(data_dir, RtreeKind::Buildings, &region))?;
                let addresses =
                    load_rtree(&rtree_path(data_dir, RtreeKind::Addresses, &region))?;
                building_trees.insert(region.clone(), buildings);
                address_trees.insert(region, addresses);
            }
        }

        Ok(QueryEngine {
            store,
            index_kind,
            building_trees,
            address_trees,
        })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    fn surrounding_indices(&self, region: &str, coord: Coord<f64>) -> Result<Vec<i64>, QueryError> {
        let bucket = self
            .store
            .bucket(region)?
            .ok_or_else(|| QueryError::UnknownRegion(region.to_string()))?;
        Ok(bucket.indices_surrounding_coordinate(coord))
    }

    fn tree(&self, kind: RtreeKind, region: &str) -> Result<&RTree<RTreeIndexObject>, QueryError> {
        let trees = match kind {
            RtreeKind::Buildings => &self.building_trees,
            RtreeKind::Addresses => &self.address_trees,
        };
        trees
            .get(region)
            .ok_or_else(|| QueryError::UnknownRegion(region.to_string()))
    }

    /// Nearby addresses, projected to the response shape
    pub fn addresses_near(
        &self,
        region: &str,
        lon: f64,
        lat: f64,
    ) -> Result<AddressOut, QueryError> {
        let coord = Coord { x: lon, y: lat };
        let addresses = match self.index_kind {
            IndexKind::Grid => {
                let indices = self.surrounding_indices(region, coord)?;
                self.store.addresses_in_buckets(region, &indices)?
            }
            IndexKind::Rtree => {
                let tree = self.tree(RtreeKind::Addresses, region)?;
                let mut addresses = Vec::new();
                for idx in nearest_idxs(tree, coord, NEAREST_CANDIDATES) {
                    if let Some(address) = self.store.address(region, idx)? {
                        addresses.push(address);
                    }
                }
                addresses
            }
        };

        let result: Vec<AddressResult> = addresses
            .into_iter()
            .map(|address| AddressResult {
                coord: Some(address.center().into()),
                address: Some(address.full_address),
                polygon_coords: None,
            })
            .collect();

        Ok(AddressOut {
            count: result.len(),
            result,
        })
    }

    /// Nearby buildings with their bounding rectangles
    pub fn buildings_near(
        &self,
        region: &str,
        lon: f64,
        lat: f64,
    ) -> Result<AddressOut, QueryError> {
        let coord = Coord { x: lon, y: lat };
        let buildings = self.candidate_buildings(region, coord)?;

        let mut result = Vec::with_capacity(buildings.len());
        for building in &buildings {
            let polygon_coords = building
                .min_bounding_rect()
                .map(|corners| corners.iter().map(|c| (*c).into()).collect());

            // the grid path has the back references to hand; on the R-tree
            // path the field is omitted
            let address = match building.address_idxs.first() {
                Some(address_idx) => self
                    .store
                    .address(region, *address_idx)?
                    .map(|a| a.full_address),
                None => None,
            };

            result.push(AddressResult {
                address,
                coord: Some(building.center().into()),
                polygon_coords,
            });
        }

        Ok(AddressOut {
            count: result.len(),
            result,
        })
    }

    fn candidate_buildings(
        &self,
        region: &str,
        coord: Coord<f64>,
    ) -> Result<Vec<Building>, QueryError> {
        match self.index_kind {
            IndexKind::Grid => {
                let indices = self.surrounding_indices(region, coord)?;
                Ok(self.store.buildings_in_buckets(region, &indices)?)
            }
            IndexKind::Rtree => {
                let tree = self.tree(RtreeKind::Buildings, region)?;
                let mut buildings = Vec::new();
                for idx in nearest_idxs(tree, coord, NEAREST_CANDIDATES) {
                    if let Some(building) = self.store.building(region, idx)? {
                        buildings.push(building);
                    }
                }
                Ok(buildings)
            }
        }
    }

    /// Ordered list of building faces struck by a ray cast from the viewer
    /// along `heading`.
    ///
    /// A building counts only when the ray crosses at least two of its
    /// rectangle edges; a single crossing is a graze and gets dropped. The
    /// reported point is the midpoint of the struck face.
    pub fn intersect(
        &self,
        region: &str,
        lon: f64,
        lat: f64,
        heading: f64,
    ) -> Result<IntersectionOut, QueryError> {
        let coord = Coord { x: lon, y: lat };
        let buildings = self.candidate_buildings(region, coord)?;
        let ray = Ray::new(coord, heading);

        let mut hits: Vec<(&Building, LineIntersection)> = Vec::new();
        for building in &buildings {
            let lines = match building.lines_for_shape() {
                Some(lines) => lines,
                None => {
                    warn!(
                        "Skipping building {} with a degenerate footprint",
                        building.idx
                    );
                    continue;
                }
            };

            let isects: Vec<LineIntersection> = lines
                .iter()
                .filter_map(|line| ray.line_intersection(line))
                .collect();
            if isects.len() < 2 {
                continue;
            }
            let best = isects
                .into_iter()
                .min_by(|a, b| a.t.partial_cmp(&b.t).unwrap())
                .unwrap();
            hits.push((building, best));
        }

        // stable, so equal t keeps candidate order
        hits.sort_by(|a, b| a.1.t.partial_cmp(&b.1.t).unwrap());

        let mut result = Vec::with_capacity(hits.len());
        for (building, hit) in hits {
            let addresses = self.addresses_for_hit(region, building, hit.midpoint)?;
            let face_height = match building.height {
                Some(height) if height != 0.0 => height * FT_TO_M,
                _ => DEFAULT_FACE_HEIGHT_M,
            };

            result.push(IntersectionResult {
                idx: building.idx,
                t: hit.t,
                addresses,
                point: hit.midpoint.into(),
                normal: PointOut {
                    x: hit.normal.x,
                    y: hit.normal.y,
                },
                face_length: hit.face_length,
                face_height,
            });
        }

        Ok(IntersectionOut {
            count: result.len(),
            result,
        })
    }

    fn addresses_for_hit(
        &self,
        region: &str,
        building: &Building,
        point: Coord<f64>,
    ) -> Result<Vec<String>, QueryError> {
        match self.index_kind {
            IndexKind::Grid => {
                let mut addresses = Vec::with_capacity(building.address_idxs.len());
                for address_idx in &building.address_idxs {
                    if let Some(address) = self.store.address(region, *address_idx)? {
                        addresses.push(address.full_address);
                    }
                }
                Ok(addresses)
            }
            IndexKind::Rtree => {
                let tree = self.tree(RtreeKind::Addresses, region)?;
                let mut addresses = Vec::with_capacity(NEAREST_ADDRESSES);
                for idx in nearest_idxs(tree, point, NEAREST_ADDRESSES) {
                    if let Some(address) = self.store.address(region, idx)? {
                        addresses.push(address.full_address_with_region());
                    }
                }
                Ok(addresses)
            }
        }
    }
}
