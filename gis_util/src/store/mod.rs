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
use std::path::Path;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{Address, Bucket, Building, Street};

/// Writes are grouped into atomic batches of this many rows
pub const BULK_BATCH_SIZE: usize = 100;

const TREE_BUCKETS: &str = "buckets";

/// Typed repository over one sled database file.
///
/// One tree per entity and region, rows bincode encoded under the big
/// endian record id so scans come back in id order. Buildings and
/// addresses additionally maintain a `<tree>_by_bucket` secondary tree
/// keyed `(bucket_idx, idx)` so bucket membership queries are an indexed
/// prefix scan instead of a full sweep.
///
/// Opened once per process; the store outlives any individual request.
pub struct RecordStore {
    db: sled::Db,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

fn idx_key(idx: i64) -> Vec<u8> {
    idx.to_be_bytes().to_vec()
}

fn bucket_prefix(bucket_idx: i64) -> Vec<u8> {
    bucket_idx.to_be_bytes().to_vec()
}

fn bucket_key(bucket_idx: i64, idx: i64) -> Vec<u8> {
    let mut key = bucket_prefix(bucket_idx);
    key.extend_from_slice(&idx.to_be_bytes());
    key
}

impl RecordStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(RecordStore {
            db: sled::open(path)?,
        })
    }

    /// In memory store for tests
    pub fn temporary() -> Result<Self> {
        Ok(RecordStore {
            db: sled::Config::new().temporary(true).open()?,
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn tree(&self, name: String) -> Result<sled::Tree> {
        Ok(self.db.open_tree(name.into_bytes())?)
    }

    /// Upsert `items`, refreshing the secondary bucket index when one is
    /// maintained for this tree
    fn put_records<T, I, B>(
        &self,
        tree: &sled::Tree,
        by_bucket: Option<&sled::Tree>,
        items: &[T],
        idx_of: I,
        bucket_of: B,
    ) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        I: Fn(&T) -> i64,
        B: Fn(&T) -> Option<i64>,
    {
        for chunk in items.chunks(BULK_BATCH_SIZE) {
            let mut batch = sled::Batch::default();
            let mut index_batch = sled::Batch::default();

            for item in chunk {
                let idx = idx_of(item);

                if let Some(index_tree) = by_bucket {
                    //A moved record must not linger under its old bucket
                    if let Some(old_bytes) = tree.get(idx_key(idx))? {
                        let old: T = decode(&old_bytes)?;
                        if let Some(old_bucket) = bucket_of(&old) {
                            if bucket_of(item) != Some(old_bucket) {
                                index_tree.remove(bucket_key(old_bucket, idx))?;
                            }
                        }
                    }
                    if let Some(bucket) = bucket_of(item) {
                        index_batch.insert(bucket_key(bucket, idx), idx_key(idx));
                    }
                }

                batch.insert(idx_key(idx), encode(item)?);
            }

            tree.apply_batch(batch)?;
            if let Some(index_tree) = by_bucket {
                index_tree.apply_batch(index_batch)?;
            }
        }
        Ok(())
    }

    fn all_records<T: DeserializeOwned>(&self, tree: &sled::Tree) -> Result<Vec<T>> {
        tree.iter()
            .map(|kv| {
                let (_key, value) = kv?;
                decode(&value)
            })
            .collect()
    }

    fn record<T: DeserializeOwned>(&self, tree: &sled::Tree, idx: i64) -> Result<Option<T>> {
        match tree.get(idx_key(idx))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn idxs_in_buckets(&self, index_tree: &sled::Tree, buckets: &[i64]) -> Result<Vec<i64>> {
        let mut idxs = Vec::new();
        for bucket in buckets {
            if *bucket < 0 {
                continue;
            }
            for kv in index_tree.scan_prefix(bucket_prefix(*bucket)) {
                let (_key, value) = kv?;
                let bytes: [u8; 8] = value.as_ref().try_into()?;
                idxs.push(i64::from_be_bytes(bytes));
            }
        }
        Ok(idxs)
    }

    // ---- buildings ----

    fn building_tree(&self, region: &str) -> Result<sled::Tree> {
        self.tree(format!("buildings_{}", region))
    }

    fn building_bucket_tree(&self, region: &str) -> Result<sled::Tree> {
        self.tree(format!("buildings_{}_by_bucket", region))
    }

    pub fn bulk_create_buildings(&self, region: &str, items: &[Building]) -> Result<()> {
        self.bulk_update_buildings(region, items)
    }

    pub fn bulk_update_buildings(&self, region: &str, items: &[Building]) -> Result<()> {
        let tree = self.building_tree(region)?;
        let by_bucket = self.building_bucket_tree(region)?;
        self.put_records(&tree, Some(&by_bucket), items, |b| b.idx, |b| b.bucket_idx)
    }

    pub fn building(&self, region: &str, idx: i64) -> Result<Option<Building>> {
        self.record(&self.building_tree(region)?, idx)
    }

    pub fn buildings_for_region(&self, region: &str) -> Result<Vec<Building>> {
        self.all_records(&self.building_tree(region)?)
    }

    pub fn buildings_in_buckets(&self, region: &str, buckets: &[i64]) -> Result<Vec<Building>> {
        let tree = self.building_tree(region)?;
        let idxs = self.idxs_in_buckets(&self.building_bucket_tree(region)?, buckets)?;
        let mut buildings = Vec::with_capacity(idxs.len());
        for idx in idxs {
            if let Some(building) = self.record(&tree, idx)? {
                buildings.push(building);
            }
        }
        Ok(buildings)
    }

    // ---- addresses ----

    fn address_tree(&self, region: &str) -> Result<sled::Tree> {
        self.tree(format!("addresses_{}", region))
    }

    fn address_bucket_tree(&self, region: &str) -> Result<sled::Tree> {
        self.tree(format!("addresses_{}_by_bucket", region))
    }

    pub fn bulk_create_addresses(&self, region: &str, items: &[Address]) -> Result<()> {
        self.bulk_update_addresses(region, items)
    }

    pub fn bulk_update_addresses(&self, region: &str, items: &[Address]) -> Result<()> {
        let tree = self.address_tree(region)?;
        let by_bucket = self.address_bucket_tree(region)?;
        self.put_records(&tree, Some(&by_bucket), items, |a| a.idx, |a| a.bucket_idx)
    }

    pub fn address(&self, region: &str, idx: i64) -> Result<Option<Address>> {
        self.record(&self.address_tree(region)?, idx)
    }

    pub fn addresses_for_region(&self, region: &str) -> Result<Vec<Address>> {
        self.all_records(&self.address_tree(region)?)
    }

    pub fn addresses_in_buckets(&self, region: &str, buckets: &[i64]) -> Result<Vec<Address>> {
        let tree = self.address_tree(region)?;
        let idxs = self.idxs_in_buckets(&self.address_bucket_tree(region)?, buckets)?;
        let mut addresses = Vec::with_capacity(idxs.len());
        for idx in idxs {
            if let Some(address) = self.record(&tree, idx)? {
                addresses.push(address);
            }
        }
        Ok(addresses)
    }

    pub fn delete_addresses(&self, region: &str, idxs: &[i64]) -> Result<()> {
        let tree = self.address_tree(region)?;
        let by_bucket = self.address_bucket_tree(region)?;
        for idx in idxs {
            if let Some(bytes) = tree.get(idx_key(*idx))? {
                let address: Address = decode(&bytes)?;
                if let Some(bucket) = address.bucket_idx {
                    by_bucket.remove(bucket_key(bucket, *idx))?;
                }
                tree.remove(idx_key(*idx))?;
            }
        }
        Ok(())
    }

    // ---- streets ----

    fn street_tree(&self, region: &str) -> Result<sled::Tree> {
        self.tree(format!("streets_{}", region))
    }

    pub fn bulk_create_streets(&self, region: &str, items: &[Street]) -> Result<()> {
        let tree = self.street_tree(region)?;
        self.put_records(&tree, None, items, |s| s.idx, |_| None)
    }

    pub fn streets_for_region(&self, region: &str) -> Result<Vec<Street>> {
        self.all_records(&self.street_tree(region)?)
    }

    pub fn street(&self, region: &str, idx: i64) -> Result<Option<Street>> {
        self.record(&self.street_tree(region)?, idx)
    }

    // ---- buckets ----

    pub fn put_bucket(&self, bucket: &Bucket) -> Result<()> {
        let tree = self.tree(TREE_BUCKETS.to_string())?;
        tree.insert(bucket.region.as_bytes(), encode(bucket)?)?;
        Ok(())
    }

    pub fn bucket(&self, region: &str) -> Result<Option<Bucket>> {
        let tree = self.tree(TREE_BUCKETS.to_string())?;
        match tree.get(region.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Regions with a consolidated grid, in key order
    pub fn regions(&self) -> Result<Vec<String>> {
        let tree = self.tree(TREE_BUCKETS.to_string())?;
        tree.iter()
            .map(|kv| {
                let (key, _value) = kv?;
                Ok(String::from_utf8(key.to_vec())?)
            })
            .collect()
    }
}
