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
use std::path::{Path, PathBuf};

use crate::io::get_sub_dir;

/// Working directory holding the shapefiles, the record store and the
/// persisted indexes
pub const PATH_GIS_DATA: &str = "gis_data";

pub const FILE_NAME_DATABASE: &str = "database.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtreeKind {
    Buildings,
    Addresses,
}

impl RtreeKind {
    fn as_str(&self) -> &'static str {
        match self {
            RtreeKind::Buildings => "buildings",
            RtreeKind::Addresses => "addresses",
        }
    }
}

pub fn database_path(data_dir: &Path) -> PathBuf {
    get_sub_dir(data_dir, FILE_NAME_DATABASE)
}

/// `<region>.shp` holds the building footprints
pub fn building_shapefile_path(data_dir: &Path, region: &str) -> PathBuf {
    get_sub_dir(data_dir, format!("{}.shp", region))
}

pub fn address_shapefile_path(data_dir: &Path, region: &str) -> PathBuf {
    get_sub_dir(data_dir, format!("{}_addresses.shp", region))
}

pub fn street_shapefile_path(data_dir: &Path, region: &str) -> PathBuf {
    get_sub_dir(data_dir, format!("{}_streets.shp", region))
}

pub fn rtree_path(data_dir: &Path, kind: RtreeKind, region: &str) -> PathBuf {
    get_sub_dir(data_dir, format!("{}_{}_rtree", kind.as_str(), region))
}
