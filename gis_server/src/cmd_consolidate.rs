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

use anyhow::{ensure, Context, Result};
use log::info;
use structopt::StructOpt;

use gis_util::consolidate::{Consolidator, DEFAULT_N_GRID};
use gis_util::paths::database_path;
use gis_util::store::RecordStore;
use gis_util::util::Timer;

#[derive(StructOpt)]
pub struct ConsolidateArgs {
    #[structopt(long)]
    pub region: String,

    #[structopt(long, default_value = "200")]
    pub n_grid: usize,

    #[structopt(long, parse(from_os_str), default_value = "gis_data")]
    pub data_dir: PathBuf,
}

pub fn consolidate(args: &ConsolidateArgs) -> Result<()> {
    let store = RecordStore::open(&database_path(&args.data_dir))?;

    let (buildings, addresses) = {
        let _t = Timer::new("Reading buildings and addresses from the store");
        (
            store.buildings_for_region(&args.region)?,
            store.addresses_for_region(&args.region)?,
        )
    };
    ensure!(
        !buildings.is_empty(),
        "no buildings loaded for region '{}'",
        args.region
    );

    let n_grid = if args.n_grid >= 1 { args.n_grid } else { DEFAULT_N_GRID };
    let mut consolidator = Consolidator::new(buildings, addresses, n_grid);
    {
        let _t = Timer::new("Consolidating buildings and addresses");
        consolidator.consolidate();
    }

    {
        let _t = Timer::new("Updating buildings in the store");
        store.bulk_update_buildings(&args.region, &consolidator.buildings)?;
    }
    {
        let _t = Timer::new("Updating addresses in the store");
        store.bulk_update_addresses(&args.region, &consolidator.addresses)?;
    }

    let bucket = consolidator
        .bucket_record(&args.region)
        .context("consolidation produced no extent")?;
    store.put_bucket(&bucket)?;
    store.flush()?;
    info!(
        "Created '{}' which spans {:?} to {:?}",
        args.region,
        (bucket.extent[0].x, bucket.extent[0].y),
        (bucket.extent[1].x, bucket.extent[1].y)
    );

    Ok(())
}
