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

use anyhow::{Context, Result};
use shapefile::dbase::Record;
use shapefile::{Reader, Shape};

pub fn get_sub_dir<D, S>(directory_name: D, sub_dir: S) -> PathBuf
where
    D: AsRef<Path>,
    S: AsRef<str> + AsRef<Path>,
{
    let mut d = directory_name.as_ref().to_path_buf();
    d.push(sub_dir);
    d
}

/// Reads all shapes + attribute records from a given `.shp` file path.
/// A missing or unopenable file aborts the batch; per feature read errors
/// are the caller's call.
pub fn read_shapefile(path: &Path) -> Result<Vec<Result<(Shape, Record)>>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        items.push(result.context("Error reading shape+record"));
    }
    Ok(items)
}
