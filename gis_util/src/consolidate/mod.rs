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
use itertools::Itertools;
use log::info;
use rayon::prelude::*;

use crate::grid::{GridPartition, HasCenter};
use crate::model::{Address, Bucket, Building, Street};

pub const DEFAULT_N_GRID: usize = 200;

/// Squared Euclidean distance in lon/lat. Within one grid cell the latitude
/// span is small enough that this orders the same as true distance; do not
/// swap in great circle math without rethinking the cell sizing.
fn dist2(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Pairs every address with the nearest building sharing its grid cell and
/// writes the foreign keys back on both sides.
pub struct Consolidator {
    pub buildings: Vec<Building>,
    pub addresses: Vec<Address>,
    n_grid: usize,
    extent: Option<(f64, f64, f64, f64)>,
}

impl Consolidator {
    pub fn new(buildings: Vec<Building>, addresses: Vec<Address>, n_grid: usize) -> Self {
        Consolidator {
            buildings,
            addresses,
            n_grid,
            extent: None,
        }
    }

    pub fn consolidate(&mut self) {
        let building_grid = GridPartition::new(self.n_grid, &self.buildings);
        for (pos, bucket_idx) in building_grid.item_buckets.iter().enumerate() {
            self.buildings[pos].bucket_idx = Some(*bucket_idx);
        }

        //The address grid reuses the building extent so cell ids line up
        let address_grid =
            GridPartition::with_extent(self.n_grid, &self.addresses, building_grid.extent);
        for (pos, bucket_idx) in address_grid.item_buckets.iter().enumerate() {
            self.addresses[pos].bucket_idx = Some(*bucket_idx);
        }

        let buildings = &self.buildings;
        let addresses = &self.addresses;

        let assignments: Vec<(usize, usize)> = building_grid
            .buckets
            .par_iter()
            .filter_map(|(bucket_idx, building_positions)| {
                address_grid
                    .buckets
                    .get(bucket_idx)
                    .map(|address_positions| (building_positions, address_positions))
            })
            .flat_map_iter(|(building_positions, address_positions)| {
                address_positions.iter().map(move |&address_pos| {
                    let center = addresses[address_pos].center();
                    let nearest = building_positions
                        .iter()
                        .copied()
                        .min_by(|&i, &j| {
                            let di = dist2(buildings[i].center(), center);
                            let dj = dist2(buildings[j].center(), center);
                            di.partial_cmp(&dj).unwrap()
                        })
                        .unwrap();
                    (address_pos, nearest)
                })
            })
            .collect();

        for (address_pos, building_pos) in assignments {
            let building_idx = self.buildings[building_pos].idx;
            let address_idx = self.addresses[address_pos].idx;
            self.addresses[address_pos].building_idx = Some(building_idx);
            self.buildings[building_pos].address_idxs.push(address_idx);
        }
        for building in &mut self.buildings {
            building.address_idxs.sort_unstable();
        }

        self.extent = Some(building_grid.extent);
        info!(
            "Consolidated {} buildings / {} addresses into a {}x{} grid",
            self.buildings.len(),
            self.addresses.len(),
            self.n_grid,
            self.n_grid
        );
    }

    /// Grid metadata row for the region, available once [consolidate] ran
    pub fn bucket_record(&self, region: &str) -> Option<Bucket> {
        let (min_x, max_x, min_y, max_y) = self.extent?;
        Some(Bucket {
            region: region.to_string(),
            extent: [
                Coord { x: min_x, y: min_y },
                Coord { x: max_x, y: max_y },
            ],
            n_grid: self.n_grid,
        })
    }
}

/// Streets grouped under their matching key; segments without any street
/// components are unreachable and dropped here
pub fn street_map(streets: Vec<Street>) -> HashMap<String, Vec<Street>> {
    let mut map: HashMap<String, Vec<Street>> = HashMap::new();
    for street in streets {
        let key = street.street_key();
        if key.is_empty() {
            continue;
        }
        map.entry(key).or_default().push(street);
    }
    map
}

/// Picks a street segment for every address whose house number falls in a
/// segment's inclusive range. Returns how many addresses got associated.
///
/// A non integer house number skips association and keeps the record.
pub fn associate_streets(
    street_map: &HashMap<String, Vec<Street>>,
    addresses: &mut [Address],
) -> usize {
    let mut associated = 0;
    for address in addresses.iter_mut() {
        let key = address.street_key();
        if key.is_empty() {
            continue;
        }
        let streets = match street_map.get(&key) {
            Some(streets) => streets,
            None => continue,
        };
        let house_number = match address.house_number() {
            Some(n) => n,
            None => continue,
        };

        let known_segments = streets
            .iter()
            .filter_map(|s| s.address_range().map(|(min, max)| (s.idx, min, max)))
            .sorted_by_key(|&(_, min, max)| (min, max));

        for (idx, min_range, max_range) in known_segments {
            if min_range <= house_number && house_number <= max_range {
                address.street_idx = Some(idx);
                associated += 1;
                break;
            }
        }
    }
    associated
}

pub struct UniquifyOutcome {
    /// Group leaders with averaged coordinate and the group's dominant
    /// building
    pub updated: Vec<Address>,
    pub deleted_idxs: Vec<i64>,
    pub skipped: usize,
}

/// Collapses addresses sharing a display form. The survivor keeps the mean
/// coordinate of the group and the mode of the group's building links,
/// first occurrence winning ties.
pub fn uniquify(addresses: &[Address]) -> UniquifyOutcome {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, address) in addresses.iter().enumerate() {
        groups
            .entry(address.full_address_with_region())
            .or_default()
            .push(pos);
    }

    let mut updated = Vec::new();
    let mut deleted_idxs = Vec::new();
    let mut skipped = 0;

    for positions in groups.values() {
        if positions.len() == 1 {
            skipped += 1;
            continue;
        }

        let n = positions.len() as f64;
        let longitude: f64 = positions.iter().map(|&p| addresses[p].coord.x).sum::<f64>() / n;
        let latitude: f64 = positions.iter().map(|&p| addresses[p].coord.y).sum::<f64>() / n;

        //Mode of the building links, in first-seen order
        let mut counts: Vec<(i64, usize)> = Vec::new();
        for &pos in positions {
            if let Some(building_idx) = addresses[pos].building_idx {
                match counts.iter_mut().find(|(v, _)| *v == building_idx) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((building_idx, 1)),
                }
            }
        }
        let mut mode = None;
        let mut best = 0;
        for (building_idx, count) in &counts {
            if *count > best {
                best = *count;
                mode = Some(*building_idx);
            }
        }

        let mut leader = addresses[positions[0]].clone();
        leader.coord = Coord {
            x: longitude,
            y: latitude,
        };
        leader.building_idx = mode;
        updated.push(leader);
        deleted_idxs.extend(positions[1..].iter().map(|&p| addresses[p].idx));
    }

    info!(
        "Addresses: updated {}, deleted {}, skipped {}",
        updated.len(),
        deleted_idxs.len(),
        skipped
    );

    UniquifyOutcome {
        updated,
        deleted_idxs,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building_at(idx: i64, x: f64, y: f64) -> Building {
        let d = 0.0001;
        Building::new(
            idx,
            "test".to_string(),
            None,
            None,
            "Residential".to_string(),
            vec![
                Coord { x: x - d, y: y - d },
                Coord { x: x - d, y: y + d },
                Coord { x: x + d, y: y + d },
                Coord { x: x + d, y: y - d },
                Coord { x: x - d, y: y - d },
            ],
        )
    }

    fn address_at(idx: i64, x: f64, y: f64) -> Address {
        Address {
            idx,
            region: "test".to_string(),
            building_type: None,
            address_1: None,
            address_2: None,
            predirective: None,
            postdirective: None,
            street_name: None,
            post_type: None,
            unit_type: None,
            unit_identifier: None,
            full_address: format!("{} Somewhere", idx),
            coord: Coord { x, y },
            bucket_idx: None,
            building_idx: None,
            street_idx: None,
        }
    }

    fn street_segment(idx: i64, min: i64, max: i64) -> Street {
        Street {
            idx,
            region: "test".to_string(),
            l_min_addr: Some(min),
            l_max_addr: Some(max),
            r_min_addr: Some(min + 1),
            r_max_addr: Some(max - 1),
            prefix: None,
            name: "MAIN".to_string(),
            street_type: Some("ST".to_string()),
            suffix: None,
            full_name: "MAIN ST".to_string(),
            coords: vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }],
        }
    }

    #[test]
    fn test_addresses_go_to_nearest_building() {
        // two buildings, three addresses; the split is unambiguous
        let buildings = vec![
            building_at(1, -105.0000, 39.0),
            building_at(2, -104.9990, 39.0),
        ];
        let addresses = vec![
            address_at(10, -104.99995, 39.0),
            address_at(11, -104.99985, 39.0),
            address_at(12, -104.99905, 39.0),
        ];

        let mut consolidator = Consolidator::new(buildings, addresses, 2);
        consolidator.consolidate();

        let by_idx: HashMap<i64, &Address> = consolidator
            .addresses
            .iter()
            .map(|a| (a.idx, a))
            .collect();
        assert_eq!(by_idx[&10].building_idx, Some(1));
        assert_eq!(by_idx[&11].building_idx, Some(1));
        assert_eq!(by_idx[&12].building_idx, Some(2));

        let b1 = consolidator.buildings.iter().find(|b| b.idx == 1).unwrap();
        let b2 = consolidator.buildings.iter().find(|b| b.idx == 2).unwrap();
        assert_eq!(b1.address_idxs, vec![10, 11]);
        assert_eq!(b2.address_idxs, vec![12]);

        // every record got a cell and the bucket row reports the grid
        assert!(consolidator.buildings.iter().all(|b| b.bucket_idx.is_some()));
        assert!(consolidator.addresses.iter().all(|a| a.bucket_idx.is_some()));
        let bucket = consolidator.bucket_record("test").unwrap();
        assert_eq!(bucket.n_grid, 2);
        assert!(bucket.extent[0].x < -105.0 && bucket.extent[1].x > -104.999);
    }

    #[test]
    fn test_bucket_idx_matches_bucket_record() {
        let buildings = vec![
            building_at(1, -105.0, 39.0),
            building_at(2, -104.99, 39.01),
            building_at(3, -104.98, 39.02),
        ];
        let mut consolidator = Consolidator::new(buildings, vec![], 10);
        consolidator.consolidate();

        let bucket = consolidator.bucket_record("test").unwrap();
        for building in &consolidator.buildings {
            let expected = bucket.index_for_coordinate(building.center());
            assert_eq!(building.bucket_idx, expected);
        }
    }

    #[test]
    fn test_street_association_by_house_number() {
        let mut map = HashMap::new();
        map.insert("MAIN ST".to_string(), vec![street_segment(5, 1200, 1300)]);

        let mut matching = address_at(1, 0.0, 0.0);
        matching.address_1 = Some("1234".to_string());
        matching.street_name = Some("Main".to_string());
        matching.post_type = Some("St".to_string());

        let mut outside = address_at(2, 0.0, 0.0);
        outside.address_1 = Some("1400".to_string());
        outside.street_name = Some("Main".to_string());
        outside.post_type = Some("St".to_string());

        let mut non_numeric = address_at(3, 0.0, 0.0);
        non_numeric.address_1 = Some("12B".to_string());
        non_numeric.street_name = Some("Main".to_string());
        non_numeric.post_type = Some("St".to_string());

        let mut addresses = vec![matching, outside, non_numeric];
        let associated = associate_streets(&map, &mut addresses);

        assert_eq!(associated, 1);
        assert_eq!(addresses[0].street_idx, Some(5));
        assert_eq!(addresses[1].street_idx, None);
        assert_eq!(addresses[2].street_idx, None);
    }

    #[test]
    fn test_street_association_prefers_lowest_segment() {
        let mut map = HashMap::new();
        map.insert(
            "MAIN ST".to_string(),
            vec![street_segment(7, 1000, 2000), street_segment(6, 1200, 1300)],
        );

        let mut address = address_at(1, 0.0, 0.0);
        address.address_1 = Some("1250".to_string());
        address.street_name = Some("Main".to_string());
        address.post_type = Some("St".to_string());

        let mut addresses = vec![address];
        associate_streets(&map, &mut addresses);

        // segments sort by (min, max); the 1000..2000 one comes first
        assert_eq!(addresses[0].street_idx, Some(7));
    }

    #[test]
    fn test_uniquify_means_and_modes() {
        let mut a1 = address_at(1, 0.0, 0.0);
        let mut a2 = address_at(2, 2.0, 2.0);
        let mut a3 = address_at(3, 4.0, 4.0);
        for a in [&mut a1, &mut a2, &mut a3] {
            a.full_address = "500 BROADWAY".to_string();
        }
        a1.building_idx = Some(9);
        a2.building_idx = Some(8);
        a3.building_idx = Some(8);
        let solo = address_at(4, 9.0, 9.0);

        let outcome = uniquify(&[a1, a2, a3, solo]);

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.deleted_idxs, vec![2, 3]);
        assert_eq!(outcome.updated.len(), 1);
        let leader = &outcome.updated[0];
        assert_eq!(leader.idx, 1);
        assert_eq!(leader.coord, Coord { x: 2.0, y: 2.0 });
        assert_eq!(leader.building_idx, Some(8));
    }

    #[test]
    fn test_uniquify_mode_tie_breaks_on_first_seen() {
        let mut a1 = address_at(1, 0.0, 0.0);
        let mut a2 = address_at(2, 0.0, 0.0);
        for a in [&mut a1, &mut a2] {
            a.full_address = "1 SAME PLACE".to_string();
        }
        a1.building_idx = Some(3);
        a2.building_idx = Some(4);

        let outcome = uniquify(&[a1, a2]);
        assert_eq!(outcome.updated[0].building_idx, Some(3));
    }
}
