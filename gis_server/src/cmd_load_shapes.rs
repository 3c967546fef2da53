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
use std::time::Instant;

use anyhow::Result;
use log::{info, warn};
use structopt::StructOpt;

use gis_util::factory::{AddressedLocationFactory, BuildingShapeFactory, StreetShapeFactory};
use gis_util::io::read_shapefile;
use gis_util::paths::{
    address_shapefile_path, building_shapefile_path, database_path, street_shapefile_path,
};
use gis_util::store::RecordStore;
use gis_util::util::{print_remaining_time, Timer};
use shapefile::dbase::Record;
use shapefile::Shape;

#[derive(StructOpt)]
pub struct LoadShapesArgs {
    #[structopt(long)]
    pub region: String,

    #[structopt(long, parse(from_os_str), default_value = "gis_data")]
    pub data_dir: PathBuf,
}

/// Runs the raw features through an adapter. Filtered features drop
/// silently, unreadable ones get logged and skipped.
fn parse_features<T>(
    features: Vec<Result<(Shape, Record)>>,
    mut create: impl FnMut(&Shape, &Record, i64) -> Result<Option<T>>,
) -> Vec<T> {
    let now = Instant::now();
    let total = features.len();
    let mut last_output = Instant::now();

    let mut items = Vec::new();
    let mut skipped = 0;
    for (idx, feature) in features.into_iter().enumerate() {
        if last_output.elapsed().as_secs() >= 3 {
            last_output = Instant::now();
            print_remaining_time(&now, idx as _, total as _);
        }

        match feature.and_then(|(shape, record)| create(&shape, &record, idx as i64)) {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping unreadable feature {}: {:#}", idx, e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} unreadable features", skipped);
    }
    items
}

pub fn load_shapes(args: &LoadShapesArgs) -> Result<()> {
    let store = RecordStore::open(&database_path(&args.data_dir))?;

    let buildings = {
        let _t = Timer::new("Reading and parsing building shapes");
        let factory = BuildingShapeFactory::new(&args.region);
        let features = read_shapefile(&building_shapefile_path(&args.data_dir, &args.region))?;
        parse_features(features, |shape, record, idx| factory.create(shape, record, idx))
    };
    info!("Parsed {} buildings", buildings.len());

    let addresses = {
        let _t = Timer::new("Reading and parsing address shapes");
        let factory = AddressedLocationFactory::new(&args.region);
        let features = read_shapefile(&address_shapefile_path(&args.data_dir, &args.region))?;
        parse_features(features, |shape, record, idx| factory.create(shape, record, idx))
    };
    info!("Parsed {} addresses", addresses.len());

    // streets are optional source data; association just finds nothing
    // without them
    let street_path = street_shapefile_path(&args.data_dir, &args.region);
    let streets = if street_path.exists() {
        let _t = Timer::new("Reading and parsing street shapes");
        let factory = StreetShapeFactory::new(&args.region);
        let features = read_shapefile(&street_path)?;
        parse_features(features, |shape, record, idx| factory.create(shape, record, idx))
    } else {
        info!("No street shapefile for '{}', skipping", args.region);
        Vec::new()
    };

    {
        let _t = Timer::new("Inserting records");
        store.bulk_create_buildings(&args.region, &buildings)?;
        store.bulk_create_addresses(&args.region, &addresses)?;
        store.bulk_create_streets(&args.region, &streets)?;
    }
    store.flush()?;

    Ok(())
}
