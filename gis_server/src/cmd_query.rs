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
use structopt::StructOpt;

use gis_util::geometry::LAT_LON_TO_M;
use gis_util::paths::database_path;
use gis_util::query::{IndexKind, QueryEngine};
use gis_util::store::RecordStore;
use gis_util::util::Timer;
use log::info;

#[derive(StructOpt)]
pub struct QueryArgs {
    #[structopt(long, parse(from_os_str), default_value = "gis_data")]
    pub data_dir: PathBuf,

    #[structopt(long, default_value = "grid")]
    pub index: IndexKind,

    #[structopt(subcommand)]
    pub target: QueryTarget,
}

#[derive(StructOpt)]
pub enum QueryTarget {
    #[structopt(help="Addresses near a coordinate")]
    Addresses {
        #[structopt(long)]
        region: String,
        #[structopt(long)]
        lat: f64,
        #[structopt(long)]
        lon: f64,
    },

    #[structopt(help="Buildings near a coordinate")]
    Buildings {
        #[structopt(long)]
        region: String,
        #[structopt(long)]
        lat: f64,
        #[structopt(long)]
        lon: f64,
    },

    #[structopt(help="Building faces struck by a ray from the viewer")]
    Intersect {
        #[structopt(long)]
        region: String,
        #[structopt(long)]
        lat: f64,
        #[structopt(long)]
        lon: f64,
        #[structopt(long)]
        heading: f64,
    },
}

pub fn query(args: &QueryArgs) -> Result<()> {
    let store = RecordStore::open(&database_path(&args.data_dir))?;
    let engine = QueryEngine::open(store, &args.data_dir, args.index)?;

    let body = {
        let _t = Timer::new("Running query");
        match &args.target {
            QueryTarget::Addresses { region, lat, lon } => {
                serde_json::to_string_pretty(&engine.addresses_near(region, *lon, *lat)?)?
            }
            QueryTarget::Buildings { region, lat, lon } => {
                serde_json::to_string_pretty(&engine.buildings_near(region, *lon, *lat)?)?
            }
            QueryTarget::Intersect {
                region,
                lat,
                lon,
                heading,
            } => {
                let out = engine.intersect(region, *lon, *lat, *heading)?;
                if let Some(first) = out.result.first() {
                    // coarse conversion, just for the log line
                    info!(
                        "{} faces struck, nearest roughly {:.0} m out",
                        out.count,
                        first.t * LAT_LON_TO_M
                    );
                }
                serde_json::to_string_pretty(&out)?
            }
        }
    };

    println!("{}", body);
    Ok(())
}
