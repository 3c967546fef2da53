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

use gis_util::consolidate::uniquify;
use gis_util::paths::database_path;
use gis_util::store::RecordStore;
use gis_util::util::Timer;

#[derive(StructOpt)]
pub struct CleanAddressesArgs {
    #[structopt(long)]
    pub region: String,

    #[structopt(long, parse(from_os_str), default_value = "gis_data")]
    pub data_dir: PathBuf,
}

pub fn clean_addresses(args: &CleanAddressesArgs) -> Result<()> {
    let store = RecordStore::open(&database_path(&args.data_dir))?;

    let addresses = {
        let _t = Timer::new("Reading addresses");
        store.addresses_for_region(&args.region)?
    };

    let outcome = {
        let _t = Timer::new("Uniquifying");
        uniquify(&addresses)
    };

    {
        let _t = Timer::new("Applying updates and deletes");
        store.bulk_update_addresses(&args.region, &outcome.updated)?;
        store.delete_addresses(&args.region, &outcome.deleted_idxs)?;
    }
    store.flush()?;
    info!(
        "Cleaned '{}': {} survivors updated, {} duplicates deleted",
        args.region,
        outcome.updated.len(),
        outcome.deleted_idxs.len()
    );

    Ok(())
}
