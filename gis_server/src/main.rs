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

mod cmd_associate_streets;
mod cmd_build_rtree;
mod cmd_clean_addresses;
mod cmd_consolidate;
mod cmd_load_shapes;
mod cmd_query;
mod cmd_serve;

use anyhow::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use structopt::StructOpt;

use crate::cmd_associate_streets::{associate_streets, AssociateStreetsArgs};
use crate::cmd_build_rtree::{build_rtree, BuildRtreeArgs};
use crate::cmd_clean_addresses::{clean_addresses, CleanAddressesArgs};
use crate::cmd_consolidate::{consolidate, ConsolidateArgs};
use crate::cmd_load_shapes::{load_shapes, LoadShapesArgs};
use crate::cmd_query::{query, QueryArgs};
use crate::cmd_serve::{serve, ServeArgs};

#[derive(StructOpt)]
struct Cli {

    #[structopt(long, default_value = "Info")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    cmd: Command
}

#[derive(StructOpt)]
enum Command {

    #[structopt(help="Loads a region's shapefiles into the record store")]
    LoadShapes(LoadShapesArgs),

    #[structopt(help="Assigns grid cells and pairs addresses with buildings")]
    Consolidate(ConsolidateArgs),

    #[structopt(help="Matches addresses to street segments by house number")]
    AssociateStreets(AssociateStreetsArgs),

    #[structopt(help="Collapses duplicate addresses")]
    CleanAddresses(CleanAddressesArgs),

    #[structopt(help="Builds the persisted rtree indexes for a region")]
    BuildRtree(BuildRtreeArgs),

    #[structopt(help="Runs one query and prints the response body")]
    Query(QueryArgs),

    #[structopt(help="Serves the query endpoints over http")]
    Serve(ServeArgs),
}

fn run() -> Result<()> {

    let args = Cli::from_args();

    SimpleLogger::new().with_level(args.log_level).init()?;

    match &args.cmd {

        Command::LoadShapes(r) => {
            load_shapes(r)?;
        }
        Command::Consolidate(r) => {
            consolidate(r)?;
        }
        Command::AssociateStreets(r) => {
            associate_streets(r)?;
        }
        Command::CleanAddresses(r) => {
            clean_addresses(r)?;
        }
        Command::BuildRtree(r) => {
            build_rtree(r)?;
        }
        Command::Query(r) => {
            query(r)?;
        }
        Command::Serve(r) => {
            serve(r)?;
        }
    }

    Ok(())
}

fn main() {
    run().unwrap();
}
