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
use std::path::PathBuf;

use anyhow::Result;
use log::info;
use structopt::StructOpt;

use gis_util::paths::{database_path, rtree_path, RtreeKind};
use gis_util::rtree::{self, RTreeIndexObject};
use gis_util::store::RecordStore;
use gis_util::util::Timer;

#[derive(StructOpt)]
pub struct BuildRtreeArgs {
    #[structopt(long)]
    pub region: String,

    #[structopt(long, parse(from_os_str), default_value = "gis_data")]
    pub data_dir: PathBuf,
}

pub fn build_rtree(args: &BuildRtreeArgs) -> Result<()> {
    let store = RecordStore::open(&database_path(&args.data_dir))?;

    {
        let _t = Timer::new("Generating index from buildings");
        let buildings = store.buildings_for_region(&args.region)?;
        let entries: Vec<RTreeIndexObject> = buildings
            .iter()
            .filter(|b| !b.polygon_points.is_empty())
            .map(|b| {
                let (min_x, min_y, max_x, max_y) = b.bbox();
                RTreeIndexObject::for_rect(b.idx, min_x, min_y, max_x, max_y)
            })
            .collect();
        info!("Indexing {} buildings", entries.len());
        let tree = rtree::build_rtree(entries);
        rtree::save_rtree(
            &tree,
            &rtree_path(&args.data_dir, RtreeKind::Buildings, &args.region),
        )?;
    }

    {
        let _t = Timer::new("Generating index from addresses");
        let addresses = store.addresses_for_region(&args.region)?;
        let entries: Vec<RTreeIndexObject> = addresses
            .iter()
            .map(|a| RTreeIndexObject::for_point(a.idx, a.coord))
            .collect();
        info!("Indexing {} addresses", entries.len());
        let tree = rtree::build_rtree(entries);
        rtree::save_rtree(
            &tree,
            &rtree_path(&args.data_dir, RtreeKind::Addresses, &args.region),
        )?;
    }

    Ok(())
}
