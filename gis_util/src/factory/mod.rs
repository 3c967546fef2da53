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
// Per region adapters from raw shapefile features to record types.
//
// Each region's source data spells its attribute columns differently, so
// every entity gets one create_<region> mapping. A factory returning
// Ok(None) means the feature is filtered on purpose; Err means the feature
// is unreadable and the caller decides whether to skip it.
use anyhow::{bail, Context, Result};
use geo::Coord;
use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;

use crate::model::{Address, Building, Street};

const FILTERED_BUILDING_TYPE: &str = "Garage/Shed";

fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Some(FieldValue::Numeric(Some(n))) => Some(format!("{}", n)),
        Some(FieldValue::Integer(n)) => Some(format!("{}", n)),
        _ => None,
    }
}

fn numeric_field(record: &Record, field: &str) -> Option<f64> {
    match record.get(field) {
        Some(FieldValue::Numeric(Some(n))) => Some(*n),
        Some(FieldValue::Float(Some(n))) => Some(*n as f64),
        Some(FieldValue::Integer(n)) => Some(*n as f64),
        Some(FieldValue::Double(n)) => Some(*n),
        _ => None,
    }
}

fn integer_field(record: &Record, field: &str) -> Option<i64> {
    numeric_field(record, field).map(|n| n as i64)
}

/// First ring of a polygon shape as lon/lat coordinates
fn polygon_ring(shape: &Shape) -> Result<Vec<Coord<f64>>> {
    let polygon = match shape {
        Shape::Polygon(p) => p,
        other => bail!("expected a polygon, found {:?}", other.shapetype()),
    };
    let ring = polygon
        .rings()
        .first()
        .context("polygon feature with no rings")?;
    Ok(ring
        .points()
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect())
}

/// First part of a polyline shape as lon/lat coordinates
fn polyline_part(shape: &Shape) -> Result<Vec<Coord<f64>>> {
    let polyline = match shape {
        Shape::Polyline(p) => p,
        other => bail!("expected a polyline, found {:?}", other.shapetype()),
    };
    let part = polyline
        .parts()
        .first()
        .context("polyline feature with no parts")?;
    Ok(part.iter().map(|p| Coord { x: p.x, y: p.y }).collect())
}

pub struct BuildingShapeFactory {
    region: String,
}

impl BuildingShapeFactory {
    pub fn new(region: &str) -> Self {
        BuildingShapeFactory {
            region: region.to_string(),
        }
    }

    pub fn create(&self, shape: &Shape, record: &Record, idx: i64) -> Result<Option<Building>> {
        match self.region.as_str() {
            "denver" => self.create_denver(shape, record, idx),
            other => bail!("no building adapter for region '{}'", other),
        }
    }

    fn create_denver(&self, shape: &Shape, record: &Record, idx: i64) -> Result<Option<Building>> {
        let building_type =
            character_field(record, "BLDG_TYPE").context("building without BLDG_TYPE")?;
        if building_type == FILTERED_BUILDING_TYPE {
            return Ok(None);
        }

        Ok(Some(Building::new(
            idx,
            self.region.clone(),
            numeric_field(record, "BLDG_HEIGH"),
            numeric_field(record, "GROUND_ELE"),
            building_type,
            polygon_ring(shape)?,
        )))
    }
}

pub struct AddressedLocationFactory {
    region: String,
}

impl AddressedLocationFactory {
    pub fn new(region: &str) -> Self {
        AddressedLocationFactory {
            region: region.to_string(),
        }
    }

    pub fn create(&self, _shape: &Shape, record: &Record, idx: i64) -> Result<Option<Address>> {
        match self.region.as_str() {
            "denver" => self.create_denver(record, idx),
            other => bail!("no address adapter for region '{}'", other),
        }
    }

    fn create_denver(&self, record: &Record, idx: i64) -> Result<Option<Address>> {
        let building_type = character_field(record, "BUILDING_T");
        if building_type.as_deref() == Some(FILTERED_BUILDING_TYPE) {
            return Ok(None);
        }

        // the address layer carries its own coordinate columns, the point
        // geometry is not used
        let longitude = numeric_field(record, "LONGITUDE").context("address without LONGITUDE")?;
        let latitude = numeric_field(record, "LATITUDE").context("address without LATITUDE")?;

        Ok(Some(Address {
            idx,
            region: self.region.clone(),
            building_type,
            address_1: character_field(record, "ADDRESS__1"),
            address_2: character_field(record, "ADDRESS__2"),
            predirective: character_field(record, "PREDIRECTI"),
            postdirective: character_field(record, "POSTDIRECT"),
            street_name: character_field(record, "STREET_NAM"),
            post_type: character_field(record, "POSTTYPE"),
            unit_type: character_field(record, "UNIT_TYPE"),
            unit_identifier: character_field(record, "UNIT_IDENT"),
            full_address: character_field(record, "FULL_ADDRE").context("address without FULL_ADDRE")?,
            coord: Coord {
                x: longitude,
                y: latitude,
            },
            bucket_idx: None,
            building_idx: None,
            street_idx: None,
        }))
    }
}

pub struct StreetShapeFactory {
    region: String,
}

impl StreetShapeFactory {
    pub fn new(region: &str) -> Self {
        StreetShapeFactory {
            region: region.to_string(),
        }
    }

    pub fn create(&self, shape: &Shape, record: &Record, idx: i64) -> Result<Option<Street>> {
        match self.region.as_str() {
            "denver" => self.create_denver(shape, record, idx),
            other => bail!("no street adapter for region '{}'", other),
        }
    }

    fn create_denver(&self, shape: &Shape, record: &Record, idx: i64) -> Result<Option<Street>> {
        let name = character_field(record, "STREETNAME").context("street without STREETNAME")?;
        let full_name = character_field(record, "FULLNAME").unwrap_or_else(|| name.clone());

        Ok(Some(Street {
            idx,
            region: self.region.clone(),
            l_min_addr: integer_field(record, "L_F_ADD"),
            l_max_addr: integer_field(record, "L_T_ADD"),
            r_min_addr: integer_field(record, "R_F_ADD"),
            r_max_addr: integer_field(record, "R_T_ADD"),
            prefix: character_field(record, "PREDIR"),
            name,
            street_type: character_field(record, "POSTTYPE"),
            suffix: character_field(record, "POSTDIR"),
            full_name,
            coords: polyline_part(shape)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::{Point, Polygon, PolygonRing};

    fn denver_building_record(bldg_type: &str) -> Record {
        let mut record = Record::default();
        record.insert(
            "BLDG_TYPE".to_string(),
            FieldValue::Character(Some(bldg_type.to_string())),
        );
        record.insert("BLDG_HEIGH".to_string(), FieldValue::Numeric(Some(24.0)));
        record.insert("GROUND_ELE".to_string(), FieldValue::Numeric(Some(5280.0)));
        record
    }

    fn square_shape() -> Shape {
        Shape::Polygon(Polygon::with_rings(vec![PolygonRing::Outer(vec![
            Point::new(-105.0, 39.0),
            Point::new(-105.0, 39.001),
            Point::new(-104.999, 39.001),
            Point::new(-104.999, 39.0),
            Point::new(-105.0, 39.0),
        ])]))
    }

    #[test]
    fn test_denver_building() {
        let factory = BuildingShapeFactory::new("denver");
        let building = factory
            .create(&square_shape(), &denver_building_record("Commercial"), 3)
            .unwrap()
            .unwrap();

        assert_eq!(building.idx, 3);
        assert_eq!(building.height, Some(24.0));
        assert_eq!(building.polygon_points.len(), 5);
        assert_eq!(building.region, "denver");
    }

    #[test]
    fn test_garage_shed_is_filtered() {
        let factory = BuildingShapeFactory::new("denver");
        let result = factory
            .create(&square_shape(), &denver_building_record("Garage/Shed"), 0)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unknown_region_is_an_error() {
        let factory = BuildingShapeFactory::new("atlantis");
        assert!(factory
            .create(&square_shape(), &denver_building_record("Commercial"), 0)
            .is_err());
    }

    #[test]
    fn test_denver_address_reads_coordinate_columns() {
        let mut record = Record::default();
        record.insert(
            "BUILDING_T".to_string(),
            FieldValue::Character(Some("Residential".to_string())),
        );
        record.insert("LONGITUDE".to_string(), FieldValue::Numeric(Some(-104.98)));
        record.insert("LATITUDE".to_string(), FieldValue::Numeric(Some(39.74)));
        record.insert("ADDRESS__1".to_string(), FieldValue::Numeric(Some(1234.0)));
        record.insert(
            "STREET_NAM".to_string(),
            FieldValue::Character(Some("MAIN".to_string())),
        );
        record.insert(
            "POSTTYPE".to_string(),
            FieldValue::Character(Some("ST".to_string())),
        );
        record.insert(
            "FULL_ADDRE".to_string(),
            FieldValue::Character(Some("1234 MAIN ST".to_string())),
        );

        let factory = AddressedLocationFactory::new("denver");
        let address = factory
            .create(&square_shape(), &record, 9)
            .unwrap()
            .unwrap();

        assert_eq!(address.coord, Coord { x: -104.98, y: 39.74 });
        assert_eq!(address.address_1.as_deref(), Some("1234"));
        assert_eq!(address.house_number(), Some(1234));
        assert_eq!(address.street_key(), "MAIN ST");
    }
}
