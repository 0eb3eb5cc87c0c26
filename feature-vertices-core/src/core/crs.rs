//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Coordinate transformations between spatial reference systems

use std::f64::consts;
use std::fmt;

pub const WGS84_SRID: i32 = 4326;
pub const WEB_MERCATOR_SRID: i32 = 3857;

const EARTH_RADIUS: f64 = 6378137.0;
/// Latitude limit of the Spherical Mercator projection
const MAX_MERC_LAT: f64 = 85.0511287798066;

#[derive(Clone, PartialEq, Debug)]
pub enum TransformError {
    Unsupported { src: i32, dst: i32 },
    OutOfBounds { x: f64, y: f64 },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransformError::Unsupported { src, dst } => write!(
                f,
                "No transformation from EPSG:{} to EPSG:{} available",
                src, dst
            ),
            TransformError::OutOfBounds { x, y } => {
                write!(f, "Coordinate ({}, {}) outside of projection bounds", x, y)
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Transformation of planar coordinates from one reference system into another
pub trait CoordTransform {
    fn source_srid(&self) -> i32;
    fn dest_srid(&self) -> i32;
    fn transform_xy(&self, x: f64, y: f64) -> Result<(f64, f64), TransformError>;
}

/// Returns the Spherical Mercator (x, y) in meters
pub fn lonlat_to_merc(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * ((consts::PI * 0.25) + (0.5 * lat.to_radians())).tan().ln();
    (x, y)
}

/// Returns (lon, lat) in degrees of a Spherical Mercator position
pub fn merc_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - consts::PI * 0.5).to_degrees();
    (lon, lat)
}

/// Built-in transformations: identity, WGS84 <-> Web Mercator
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CrsTransform {
    src: i32,
    dst: i32,
}

impl CrsTransform {
    pub fn new(src: i32, dst: i32) -> Result<CrsTransform, TransformError> {
        match (src, dst) {
            (s, d) if s == d => Ok(CrsTransform { src, dst }),
            (WGS84_SRID, WEB_MERCATOR_SRID) | (WEB_MERCATOR_SRID, WGS84_SRID) => {
                Ok(CrsTransform { src, dst })
            }
            _ => Err(TransformError::Unsupported { src, dst }),
        }
    }
    pub fn is_identity(&self) -> bool {
        self.src == self.dst
    }
}

impl CoordTransform for CrsTransform {
    fn source_srid(&self) -> i32 {
        self.src
    }
    fn dest_srid(&self) -> i32 {
        self.dst
    }
    fn transform_xy(&self, x: f64, y: f64) -> Result<(f64, f64), TransformError> {
        if self.is_identity() {
            return Ok((x, y));
        }
        if self.src == WGS84_SRID {
            if y.abs() > MAX_MERC_LAT || x.abs() > 180.0 {
                return Err(TransformError::OutOfBounds { x, y });
            }
            Ok(lonlat_to_merc(x, y))
        } else {
            Ok(merc_to_lonlat(x, y))
        }
    }
}

#[cfg(test)]
fn assert_near(a: (f64, f64), b: (f64, f64)) {
    assert!((a.0 - b.0).abs() < 1e-6, "{:?} != {:?}", a, b);
    assert!((a.1 - b.1).abs() < 1e-6, "{:?} != {:?}", a, b);
}

#[test]
fn test_identity() {
    let t = CrsTransform::new(2056, 2056).unwrap();
    assert!(t.is_identity());
    assert_eq!(t.transform_xy(2600000.0, 1200000.0), Ok((2600000.0, 1200000.0)));
}

#[test]
fn test_wgs84_to_merc() {
    let t = CrsTransform::new(WGS84_SRID, WEB_MERCATOR_SRID).unwrap();
    assert_eq!(t.source_srid(), 4326);
    assert_eq!(t.dest_srid(), 3857);
    assert_near(t.transform_xy(0.0, 0.0).unwrap(), (0.0, 0.0));
    assert_near(
        t.transform_xy(180.0, 0.0).unwrap(),
        (20037508.342789244, 0.0),
    );
    assert_near(
        t.transform_xy(8.0, 47.0).unwrap(),
        (890555.9263461885, 5942074.072431108),
    );
    assert_eq!(
        t.transform_xy(8.0, 89.9),
        Err(TransformError::OutOfBounds { x: 8.0, y: 89.9 })
    );
}

#[test]
fn test_merc_roundtrip() {
    let t = CrsTransform::new(WEB_MERCATOR_SRID, WGS84_SRID).unwrap();
    let (x, y) = lonlat_to_merc(-6.25, 53.35);
    assert_near(t.transform_xy(x, y).unwrap(), (-6.25, 53.35));
}

#[test]
fn test_unsupported() {
    assert_eq!(
        CrsTransform::new(4326, 2180),
        Err(TransformError::Unsupported {
            src: 4326,
            dst: 2180
        })
    );
    assert_eq!(
        format!("{}", CrsTransform::new(2056, 3857).unwrap_err()),
        "No transformation from EPSG:2056 to EPSG:3857 available"
    );
}
