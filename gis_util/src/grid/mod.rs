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
use std::collections::HashMap;

use geo::Coord;

/// Anything with a 2D center can be gridded
pub trait HasCenter {
    fn center(&self) -> Coord<f64>;
}

/// `num` evenly spaced values over [start, stop], endpoints included
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    if num < 2 {
        return vec![start];
    }
    let step = (stop - start) / (num - 1) as f64;
    (0..num).map(|i| start + step * i as f64).collect()
}

/// Left insertion point of `value` in the sorted slice `xs`
pub fn search_sorted(xs: &[f64], value: f64) -> usize {
    xs.partition_point(|x| *x < value)
}

pub fn index_for_coordinate(cols: &[f64], rows: &[f64], n_grid: usize, coord: Coord<f64>) -> i64 {
    let col = search_sorted(cols, coord.x) as i64;
    let row = search_sorted(rows, coord.y) as i64;
    col + n_grid as i64 * row
}

/// Uniform n x n partition over the extent of the item centers.
///
/// The grid does not guarantee that the geographically nearest item shares
/// a coordinate's cell; callers query the 3x3 neighborhood instead. Points
/// outside the extent land in a degenerate cell and just come back empty.
pub struct GridPartition {
    pub n_grid: usize,
    /// (min_x, max_x, min_y, max_y) of the partitioned extent
    pub extent: (f64, f64, f64, f64),
    cols: Vec<f64>,
    rows: Vec<f64>,
    /// Cell id per input item, parallel to the input slice
    pub item_buckets: Vec<i64>,
    /// Input item positions grouped by cell id
    pub buckets: HashMap<i64, Vec<usize>>,
}

impl GridPartition {
    /// Partition `items` over their own extent, expanded by 0.5% in each
    /// dimension so boundary centers stay interior.
    pub fn new<T: HasCenter>(n_grid: usize, items: &[T]) -> Self {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for item in items {
            let c = item.center();
            min_x = min_x.min(c.x);
            max_x = max_x.max(c.x);
            min_y = min_y.min(c.y);
            max_y = max_y.max(c.y);
        }

        let x_margin = (max_x - min_x) * 0.005;
        let y_margin = (max_y - min_y) * 0.005;
        let extent = (
            min_x - x_margin,
            max_x + x_margin,
            min_y - y_margin,
            max_y + y_margin,
        );

        Self::with_extent(n_grid, items, extent)
    }

    /// Partition `items` over a caller supplied extent. Used to put the
    /// address grid in the building grid's coordinate system so the cell
    /// ids are comparable.
    pub fn with_extent<T: HasCenter>(
        n_grid: usize,
        items: &[T],
        extent: (f64, f64, f64, f64),
    ) -> Self {
        let (min_x, max_x, min_y, max_y) = extent;
        let cols = linspace(min_x, max_x, n_grid);
        let rows = linspace(min_y, max_y, n_grid);

        let mut item_buckets = Vec::with_capacity(items.len());
        let mut buckets: HashMap<i64, Vec<usize>> = HashMap::new();

        for (pos, item) in items.iter().enumerate() {
            let idx = index_for_coordinate(&cols, &rows, n_grid, item.center());
            item_buckets.push(idx);
            buckets.entry(idx).or_default().push(pos);
        }

        GridPartition {
            n_grid,
            extent,
            cols,
            rows,
            item_buckets,
            buckets,
        }
    }

    pub fn index_for_coordinate(&self, coord: Coord<f64>) -> Option<i64> {
        let idx = index_for_coordinate(&self.cols, &self.rows, self.n_grid, coord);
        if idx < 0 {
            None
        } else {
            Some(idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Centered(f64, f64);

    impl HasCenter for Centered {
        fn center(&self) -> Coord<f64> {
            Coord {
                x: self.0,
                y: self.1,
            }
        }
    }

    #[test]
    fn test_linspace() {
        let xs = linspace(0.0, 1.0, 5);
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
    }

    #[test]
    fn test_search_sorted() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(search_sorted(&xs, -0.5), 0);
        assert_eq!(search_sorted(&xs, 0.0), 0);
        assert_eq!(search_sorted(&xs, 0.5), 1);
        assert_eq!(search_sorted(&xs, 3.0), 3);
        assert_eq!(search_sorted(&xs, 9.0), 4);
    }

    #[test]
    fn test_partition_groups_items() {
        let items = vec![
            Centered(0.0, 0.0),
            Centered(0.0, 0.1),
            Centered(10.0, 10.0),
        ];
        let grid = GridPartition::new(10, &items);

        assert_eq!(grid.item_buckets.len(), 3);
        // the two near-origin items land together, the far one elsewhere
        assert_eq!(grid.item_buckets[0], grid.item_buckets[1]);
        assert_ne!(grid.item_buckets[0], grid.item_buckets[2]);

        let total: usize = grid.buckets.values().map(|v| v.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_extent_is_expanded() {
        let items = vec![Centered(0.0, 0.0), Centered(1.0, 2.0)];
        let grid = GridPartition::new(4, &items);
        let (min_x, max_x, min_y, max_y) = grid.extent;
        assert!(min_x < 0.0 && max_x > 1.0);
        assert!(min_y < 0.0 && max_y > 2.0);
        // extremes are interior, so their cells are live
        assert!(grid.index_for_coordinate(Coord { x: 0.0, y: 0.0 }).is_some());
    }

    #[test]
    fn test_shared_extent_gives_comparable_indices() {
        let buildings = vec![Centered(0.0, 0.0), Centered(1.0, 1.0)];
        let addresses = vec![Centered(0.001, 0.001)];

        let b_grid = GridPartition::new(50, &buildings);
        let a_grid = GridPartition::with_extent(50, &addresses, b_grid.extent);

        assert_eq!(a_grid.item_buckets[0], b_grid.item_buckets[0]);
    }
}
