//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::GeometryCfg;
use crate::core::crs::{CoordTransform, TransformError};
use postgis::ewkb;
use postgis::ewkb::EwkbRead;

// Aliases for rust-postgis geometry types
pub type Point = ewkb::Point;
pub type PointZ = ewkb::PointZ;
pub type LineString = ewkb::LineString;
pub type LineStringZ = ewkb::LineStringZ;
pub type Polygon = ewkb::Polygon;
pub type PolygonZ = ewkb::PolygonZ;
pub type MultiPoint = ewkb::MultiPoint;
pub type MultiPointZ = ewkb::MultiPointZ;
pub type MultiLineString = ewkb::MultiLineString;
pub type MultiLineStringZ = ewkb::MultiLineStringZ;
pub type MultiPolygon = ewkb::MultiPolygon;
pub type MultiPolygonZ = ewkb::MultiPolygonZ;
pub type GeometryCollection = ewkb::GeometryCollection;

/// Generic Geometry Data Type
#[derive(Debug)]
pub enum GeometryType {
    Point(Point),
    PointZ(PointZ),
    LineString(LineString),
    LineStringZ(LineStringZ),
    Polygon(Polygon),
    PolygonZ(PolygonZ),
    MultiPoint(MultiPoint),
    MultiPointZ(MultiPointZ),
    MultiLineString(MultiLineString),
    MultiLineStringZ(MultiLineStringZ),
    MultiPolygon(MultiPolygon),
    MultiPolygonZ(MultiPolygonZ),
    GeometryCollection(GeometryCollection),
}

impl GeometryType {
    pub fn is_empty(&self) -> bool {
        match self {
            GeometryType::Point(p) => is_empty_point(p),
            GeometryType::PointZ(p) => is_empty_point(p),
            GeometryType::LineString(l) => l.points.is_empty(),
            GeometryType::LineStringZ(l) => l.points.is_empty(),
            GeometryType::Polygon(p) => p.rings.is_empty(),
            GeometryType::PolygonZ(p) => p.rings.is_empty(),
            GeometryType::MultiPoint(mp) => mp.points.iter().all(is_empty_point),
            GeometryType::MultiPointZ(mp) => mp.points.iter().all(is_empty_point),
            GeometryType::MultiLineString(ml) => ml.lines.is_empty(),
            GeometryType::MultiLineStringZ(ml) => ml.lines.is_empty(),
            GeometryType::MultiPolygon(mp) => mp.polygons.is_empty(),
            GeometryType::MultiPolygonZ(mp) => mp.polygons.is_empty(),
            GeometryType::GeometryCollection(gc) => gc.geometries.is_empty(),
        }
    }
    /// ISO WKB geometry type code (Z variants + 1000)
    pub fn wkb_type(&self) -> u32 {
        match self {
            GeometryType::Point(_) => 1,
            GeometryType::LineString(_) => 2,
            GeometryType::Polygon(_) => 3,
            GeometryType::MultiPoint(_) => 4,
            GeometryType::MultiLineString(_) => 5,
            GeometryType::MultiPolygon(_) => 6,
            GeometryType::GeometryCollection(_) => 7,
            GeometryType::PointZ(_) => 1001,
            GeometryType::LineStringZ(_) => 1002,
            GeometryType::PolygonZ(_) => 1003,
            GeometryType::MultiPointZ(_) => 1004,
            GeometryType::MultiLineStringZ(_) => 1005,
            GeometryType::MultiPolygonZ(_) => 1006,
        }
    }
    /// Return a copy of the geometry in the destination system of `trans`.
    pub fn reproject(&self, trans: &dyn CoordTransform) -> Result<GeometryType, TransformError> {
        let geom = match self {
            GeometryType::Point(g) => GeometryType::Point(g.reproject(trans)?),
            GeometryType::PointZ(g) => GeometryType::PointZ(g.reproject(trans)?),
            GeometryType::LineString(g) => GeometryType::LineString(g.reproject(trans)?),
            GeometryType::LineStringZ(g) => GeometryType::LineStringZ(g.reproject(trans)?),
            GeometryType::Polygon(g) => GeometryType::Polygon(g.reproject(trans)?),
            GeometryType::PolygonZ(g) => GeometryType::PolygonZ(g.reproject(trans)?),
            GeometryType::MultiPoint(g) => GeometryType::MultiPoint(g.reproject(trans)?),
            GeometryType::MultiPointZ(g) => GeometryType::MultiPointZ(g.reproject(trans)?),
            GeometryType::MultiLineString(g) => {
                GeometryType::MultiLineString(g.reproject(trans)?)
            }
            GeometryType::MultiLineStringZ(g) => {
                GeometryType::MultiLineStringZ(g.reproject(trans)?)
            }
            GeometryType::MultiPolygon(g) => GeometryType::MultiPolygon(g.reproject(trans)?),
            GeometryType::MultiPolygonZ(g) => GeometryType::MultiPolygonZ(g.reproject(trans)?),
            GeometryType::GeometryCollection(_) => {
                return Err(TransformError::Unsupported {
                    src: trans.source_srid(),
                    dst: trans.dest_srid(),
                })
            }
        };
        Ok(geom)
    }
}

/// `POINT EMPTY` is stored with NaN coordinates
pub fn is_empty_point<P: postgis::Point>(point: &P) -> bool {
    point.x().is_nan() || point.y().is_nan()
}

/// Coordinate transformation into a new geometry value
pub trait Reproject: Sized {
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError>;
}

impl Reproject for Point {
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError> {
        let (x, y) = trans.transform_xy(self.x, self.y)?;
        Ok(Point::new(x, y, Some(trans.dest_srid())))
    }
}

impl Reproject for PointZ {
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError> {
        let (x, y) = trans.transform_xy(self.x, self.y)?;
        Ok(PointZ::new(x, y, self.z, Some(trans.dest_srid())))
    }
}

fn reproject_all<T: Reproject>(items: &[T], trans: &dyn CoordTransform) -> Result<Vec<T>, TransformError> {
    items.iter().map(|item| item.reproject(trans)).collect()
}

impl<P> Reproject for ewkb::LineStringT<P>
where
    P: postgis::Point + EwkbRead + Reproject,
{
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError> {
        Ok(ewkb::LineStringT {
            points: reproject_all(&self.points, trans)?,
            srid: Some(trans.dest_srid()),
        })
    }
}

impl<P> Reproject for ewkb::PolygonT<P>
where
    P: postgis::Point + EwkbRead + Reproject,
{
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError> {
        Ok(ewkb::PolygonT {
            rings: reproject_all(&self.rings, trans)?,
            srid: Some(trans.dest_srid()),
        })
    }
}

impl<P> Reproject for ewkb::MultiPointT<P>
where
    P: postgis::Point + EwkbRead + Reproject,
{
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError> {
        Ok(ewkb::MultiPointT {
            points: reproject_all(&self.points, trans)?,
            srid: Some(trans.dest_srid()),
        })
    }
}

impl<P> Reproject for ewkb::MultiLineStringT<P>
where
    P: postgis::Point + EwkbRead + Reproject,
{
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError> {
        Ok(ewkb::MultiLineStringT {
            lines: reproject_all(&self.lines, trans)?,
            srid: Some(trans.dest_srid()),
        })
    }
}

impl<P> Reproject for ewkb::MultiPolygonT<P>
where
    P: postgis::Point + EwkbRead + Reproject,
{
    fn reproject(&self, trans: &dyn CoordTransform) -> Result<Self, TransformError> {
        Ok(ewkb::MultiPolygonT {
            polygons: reproject_all(&self.polygons, trans)?,
            srid: Some(trans.dest_srid()),
        })
    }
}

// --- Construction from GeoJSON like configuration

/// Point types which can be built from a coordinate array
trait FromCoords: Sized {
    fn from_coords(coords: &[f64], srid: Option<i32>) -> Result<Self, String>;
}

impl FromCoords for Point {
    fn from_coords(coords: &[f64], srid: Option<i32>) -> Result<Self, String> {
        match coords {
            [x, y] => Ok(Point::new(*x, *y, srid)),
            _ => Err(format!("Expected 2 coordinates, got {:?}", coords)),
        }
    }
}

impl FromCoords for PointZ {
    fn from_coords(coords: &[f64], srid: Option<i32>) -> Result<Self, String> {
        match coords {
            [x, y, z] => Ok(PointZ::new(*x, *y, *z, srid)),
            _ => Err(format!("Expected 3 coordinates, got {:?}", coords)),
        }
    }
}

fn points_from_coords<P: FromCoords>(coords: &[Vec<f64>], srid: Option<i32>) -> Result<Vec<P>, String> {
    coords.iter().map(|c| P::from_coords(c, srid)).collect()
}

fn line_from_coords<P>(coords: &[Vec<f64>], srid: Option<i32>) -> Result<ewkb::LineStringT<P>, String>
where
    P: postgis::Point + EwkbRead + FromCoords,
{
    Ok(ewkb::LineStringT {
        points: points_from_coords(coords, srid)?,
        srid,
    })
}

fn polygon_from_coords<P>(coords: &[Vec<Vec<f64>>], srid: Option<i32>) -> Result<ewkb::PolygonT<P>, String>
where
    P: postgis::Point + EwkbRead + FromCoords,
{
    let rings = coords
        .iter()
        .map(|ring| line_from_coords(ring, srid))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ewkb::PolygonT { rings, srid })
}

fn multilinestring_from_coords<P>(
    coords: &[Vec<Vec<f64>>],
    srid: Option<i32>,
) -> Result<ewkb::MultiLineStringT<P>, String>
where
    P: postgis::Point + EwkbRead + FromCoords,
{
    let lines = coords
        .iter()
        .map(|line| line_from_coords(line, srid))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ewkb::MultiLineStringT { lines, srid })
}

fn multipolygon_from_coords<P>(
    coords: &[Vec<Vec<Vec<f64>>>],
    srid: Option<i32>,
) -> Result<ewkb::MultiPolygonT<P>, String>
where
    P: postgis::Point + EwkbRead + FromCoords,
{
    let polygons = coords
        .iter()
        .map(|poly| polygon_from_coords(poly, srid))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ewkb::MultiPolygonT { polygons, srid })
}

impl GeometryType {
    /// Build geometry from configuration. The dimension is taken from the first coordinate.
    pub fn from_geometry_cfg(cfg: &GeometryCfg, srid: Option<i32>) -> Result<GeometryType, String> {
        let has_z = cfg.first_coord().map(|c| c.len() == 3).unwrap_or(false);
        let geom = match cfg {
            GeometryCfg::Point(c) if has_z => GeometryType::PointZ(PointZ::from_coords(c, srid)?),
            GeometryCfg::Point(c) => GeometryType::Point(Point::from_coords(c, srid)?),
            GeometryCfg::MultiPoint(c) if has_z => GeometryType::MultiPointZ(ewkb::MultiPointT {
                points: points_from_coords(c, srid)?,
                srid,
            }),
            GeometryCfg::MultiPoint(c) => GeometryType::MultiPoint(ewkb::MultiPointT {
                points: points_from_coords(c, srid)?,
                srid,
            }),
            GeometryCfg::LineString(c) if has_z => {
                GeometryType::LineStringZ(line_from_coords(c, srid)?)
            }
            GeometryCfg::LineString(c) => GeometryType::LineString(line_from_coords(c, srid)?),
            GeometryCfg::MultiLineString(c) if has_z => {
                GeometryType::MultiLineStringZ(multilinestring_from_coords(c, srid)?)
            }
            GeometryCfg::MultiLineString(c) => {
                GeometryType::MultiLineString(multilinestring_from_coords(c, srid)?)
            }
            GeometryCfg::Polygon(c) if has_z => GeometryType::PolygonZ(polygon_from_coords(c, srid)?),
            GeometryCfg::Polygon(c) => GeometryType::Polygon(polygon_from_coords(c, srid)?),
            GeometryCfg::MultiPolygon(c) if has_z => {
                GeometryType::MultiPolygonZ(multipolygon_from_coords(c, srid)?)
            }
            GeometryCfg::MultiPolygon(c) => {
                GeometryType::MultiPolygon(multipolygon_from_coords(c, srid)?)
            }
        };
        Ok(geom)
    }
}

impl GeometryCfg {
    fn first_coord(&self) -> Option<&Vec<f64>> {
        match self {
            GeometryCfg::Point(c) => Some(c),
            GeometryCfg::MultiPoint(c) | GeometryCfg::LineString(c) => c.first(),
            GeometryCfg::MultiLineString(c) | GeometryCfg::Polygon(c) => {
                c.iter().flat_map(|l| l.first()).next()
            }
            GeometryCfg::MultiPolygon(c) => c
                .iter()
                .flat_map(|p| p.iter())
                .flat_map(|l| l.first())
                .next(),
        }
    }
}
