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

use gis_util::consolidate;
use gis_util::paths::database_path;
use gis_util::store::RecordStore;
use gis_util::util::Timer;

#[derive(StructOpt)]
pub struct AssociateStreetsArgs {
    #[structopt(long)]
    pub region: String,

    #[structopt(long, parse(from_os_str), default_value = "gis_data")]
    pub data_dir: PathBuf,
}

pub fn associate_streets(args: &AssociateStreetsArgs) -> Result<()> {
    let store = RecordStore::open(&database_path(&args.data_dir))?;

    let street_dict = {
        let _t = Timer::new("Creating street dict");
        consolidate::street_map(store.streets_for_region(&args.region)?)
    };

    let mut addresses = {
        let _t = Timer::new("Getting addresses");
        store.addresses_for_region(&args.region)?
    };

    let associated = {
        let _t = Timer::new("Associating streets");
        consolidate::associate_streets(&street_dict, &mut addresses)
    };
    info!("{} addresses associated.", associated);

    {
        let _t = Timer::new("Updating address table");
        store.bulk_update_addresses(&args.region, &addresses)?;
    }
    store.flush()?;

    Ok(())
}
