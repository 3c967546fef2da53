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
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::grid::{index_for_coordinate, linspace, search_sorted};

/// Grid metadata for a region: the SW/NE corners of the partitioned extent
/// and the grid dimension. Defines an n_grid x n_grid regular partition
/// whose cell ids are `col + n_grid * row`, starting at 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub region: String,
    pub extent: [Coord<f64>; 2],
    pub n_grid: usize,
}

impl Bucket {
    fn cols(&self) -> Vec<f64> {
        linspace(self.extent[0].x, self.extent[1].x, self.n_grid)
    }

    fn rows(&self) -> Vec<f64> {
        linspace(self.extent[0].y, self.extent[1].y, self.n_grid)
    }

    pub fn index_for_coordinate(&self, coord: Coord<f64>) -> Option<i64> {
        let idx = index_for_coordinate(&self.cols(), &self.rows(), self.n_grid, coord);
        if idx < 0 {
            None
        } else {
            Some(idx)
        }
    }

    /// The 3x3 neighborhood of cell ids around the coordinate, negative ids
    /// filtered out. This is the safety margin the proximity queries rely
    /// on, since the nearest record does not always share the query's cell.
    pub fn indices_surrounding_coordinate(&self, coord: Coord<f64>) -> Vec<i64> {
        let col = search_sorted(&self.cols(), coord.x) as i64;
        let row = search_sorted(&self.rows(), coord.y) as i64;
        let n = self.n_grid as i64;

        let mut indices = Vec::with_capacity(9);
        for r in row - 1..=row + 1 {
            for c in col - 1..=col + 1 {
                indices.push(c + n * r);
            }
        }
        indices.retain(|idx| *idx >= 0);
        indices
    }
}
