//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::ExtractorCfg;
use crate::core::crs::TransformError;
use crate::core::feature::{Feature, FeatureAttrValType};
use crate::core::geom::{is_empty_point, GeometryType};
use crate::core::Config;
use crate::extract::metadata::{self, ConfidencePoint};
use crate::extract::vertex::{ExtractionResult, VertexRecord};
use crate::project::Project;
use postgis::ewkb;
use postgis::ewkb::EwkbRead;
use std::fmt;

#[derive(Clone, PartialEq, Debug)]
pub enum ExtractError {
    LayerNotFound(String),
    FeatureNotFound(u64),
    EmptyGeometry(u64),
    UnrecognizedGeometryType(u32),
    Transform(TransformError),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExtractError::LayerNotFound(id) => write!(f, "Layer '{}' not found in project", id),
            ExtractError::FeatureNotFound(fid) => write!(f, "Feature {} not found in layer", fid),
            ExtractError::EmptyGeometry(fid) => write!(f, "Feature {} has no geometry", fid),
            ExtractError::UnrecognizedGeometryType(t) => {
                write!(f, "Unrecognized geometry type {}", t)
            }
            ExtractError::Transform(e) => write!(f, "Transformation failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<TransformError> for ExtractError {
    fn from(e: TransformError) -> Self {
        ExtractError::Transform(e)
    }
}

/// Vertex collector for one extraction call
struct VertexCollector<'a> {
    confidence_points: &'a [ConfidencePoint],
    tolerance: f64,
}

impl<'a> VertexCollector<'a> {
    fn vertex<P: postgis::Point>(&self, point: &P, id: u64) -> VertexRecord {
        let (x, y) = (point.x(), point.y());
        VertexRecord {
            id,
            x,
            y,
            z: point.opt_z(),
            confidence: metadata::match_confidence(self.confidence_points, x, y, self.tolerance),
        }
    }

    /// Vertices of a line or ring, numbered from `start_id`.
    /// A last vertex repeating the first one is dropped.
    /// Returns the vertices and the id following the last kept one.
    fn line<P: postgis::Point>(&self, points: &[P], start_id: u64) -> (Vec<VertexRecord>, u64) {
        let mut vertices = points
            .iter()
            .zip(start_id..)
            .map(|(point, id)| self.vertex(point, id))
            .collect::<Vec<_>>();
        if vertices.len() > 1 {
            let (first, last) = (&vertices[0], &vertices[vertices.len() - 1]);
            if first.x == last.x && first.y == last.y {
                vertices.pop();
            }
        }
        let next_id = start_id + vertices.len() as u64;
        (vertices, next_id)
    }

    fn lines<P>(
        &self,
        lines: &[ewkb::LineStringT<P>],
        start_id: u64,
    ) -> (Vec<Vec<VertexRecord>>, u64)
    where
        P: postgis::Point + EwkbRead,
    {
        let mut next_id = start_id;
        let parts = lines
            .iter()
            .map(|line| {
                let (vertices, id) = self.line(&line.points, next_id);
                next_id = id;
                vertices
            })
            .collect::<Vec<_>>();
        (parts, next_id)
    }

    fn polygon<P>(
        &self,
        polygon: &ewkb::PolygonT<P>,
        start_id: u64,
    ) -> (Vec<Vec<VertexRecord>>, u64)
    where
        P: postgis::Point + EwkbRead,
    {
        // exterior ring first
        self.lines(&polygon.rings, start_id)
    }

    fn multi_point<P: postgis::Point>(&self, points: &[P]) -> Vec<Vec<VertexRecord>> {
        points
            .iter()
            .filter(|point| !is_empty_point(*point))
            .zip(1..)
            .map(|(point, id)| vec![self.vertex(point, id)])
            .collect()
    }

    fn multi_polygon<P>(&self, polygons: &[ewkb::PolygonT<P>]) -> Vec<Vec<Vec<VertexRecord>>>
    where
        P: postgis::Point + EwkbRead,
    {
        let mut next_id = 1;
        polygons
            .iter()
            .map(|polygon| {
                let (rings, id) = self.polygon(polygon, next_id);
                next_id = id;
                rings
            })
            .collect()
    }

    fn geometry(&self, geom: &GeometryType) -> Result<ExtractionResult, ExtractError> {
        let result = match geom {
            GeometryType::Point(p) => ExtractionResult::Point(vec![self.vertex(p, 1)]),
            GeometryType::PointZ(p) => ExtractionResult::Point(vec![self.vertex(p, 1)]),
            GeometryType::MultiPoint(mp) => ExtractionResult::MultiPoint(self.multi_point(&mp.points)),
            GeometryType::MultiPointZ(mp) => {
                ExtractionResult::MultiPoint(self.multi_point(&mp.points))
            }
            GeometryType::LineString(l) => ExtractionResult::LineString(self.line(&l.points, 1).0),
            GeometryType::LineStringZ(l) => {
                ExtractionResult::LineString(self.line(&l.points, 1).0)
            }
            GeometryType::MultiLineString(ml) => {
                ExtractionResult::MultiLineString(self.lines(&ml.lines, 1).0)
            }
            GeometryType::MultiLineStringZ(ml) => {
                ExtractionResult::MultiLineString(self.lines(&ml.lines, 1).0)
            }
            GeometryType::Polygon(p) => ExtractionResult::Polygon(self.polygon(p, 1).0),
            GeometryType::PolygonZ(p) => ExtractionResult::Polygon(self.polygon(p, 1).0),
            GeometryType::MultiPolygon(mp) => {
                ExtractionResult::MultiPolygon(self.multi_polygon(&mp.polygons))
            }
            GeometryType::MultiPolygonZ(mp) => {
                ExtractionResult::MultiPolygon(self.multi_polygon(&mp.polygons))
            }
            GeometryType::GeometryCollection(_) => {
                return Err(ExtractError::UnrecognizedGeometryType(geom.wkb_type()))
            }
        };
        Ok(result)
    }
}

/// Extracts the vertices of a feature geometry in project coordinates,
/// annotated with the accuracy of surveyed points found in the feature metadata.
pub struct VertexExtractor {
    pub config: ExtractorCfg,
}

impl VertexExtractor {
    pub fn new() -> VertexExtractor {
        VertexExtractor {
            config: ExtractorCfg::default(),
        }
    }

    /// Vertices of feature `fid` in layer `layer_id`, or `None` if
    /// layer, feature or geometry are missing or not supported.
    pub fn extract_vertices(
        &self,
        project: &dyn Project,
        layer_id: &str,
        fid: u64,
    ) -> Option<ExtractionResult> {
        match self.extract(project, layer_id, fid) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Layer '{}' feature {}: {}", layer_id, fid, e);
                None
            }
        }
    }

    pub fn extract(
        &self,
        project: &dyn Project,
        layer_id: &str,
        fid: u64,
    ) -> Result<ExtractionResult, ExtractError> {
        let layer = project
            .map_layer(layer_id)
            .ok_or_else(|| ExtractError::LayerNotFound(layer_id.to_string()))?;
        let feature = layer
            .get_feature(fid)
            .filter(|f| f.is_valid())
            .ok_or(ExtractError::FeatureNotFound(fid))?;
        let geometry = feature
            .geometry()
            .filter(|g| !g.is_empty())
            .ok_or(ExtractError::EmptyGeometry(fid))?;
        if let GeometryType::GeometryCollection(_) = geometry {
            return Err(ExtractError::UnrecognizedGeometryType(geometry.wkb_type()));
        }

        let project_srid = project.srid();
        let reprojected;
        let geometry = if layer.srid() != project_srid {
            debug!(
                "Transforming feature {} from EPSG:{} to EPSG:{}",
                fid,
                layer.srid(),
                project_srid
            );
            let trans = project.coord_transform(layer.srid(), project_srid)?;
            reprojected = geometry.reproject(trans.as_ref())?;
            &reprojected
        } else {
            geometry
        };

        let confidence_points = self.confidence_points(project, feature);
        let collector = VertexCollector {
            confidence_points: &confidence_points,
            tolerance: self.config.tolerance,
        };
        collector.geometry(geometry)
    }

    /// Surveyed points of the feature in project coordinates
    fn confidence_points(&self, project: &dyn Project, feature: &dyn Feature) -> Vec<ConfidencePoint> {
        let text = match feature.attribute(&self.config.metadata_field) {
            Some(FeatureAttrValType::String(s)) => Some(s),
            Some(FeatureAttrValType::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let surveyed = match metadata::parse_metadata(text.as_ref().map(|s| s.as_str())) {
            Ok(points) => {
                info!("metadata is valid JSON ({} surveyed points)", points.len());
                points
            }
            Err(e) => {
                info!("{}", e);
                return Vec::new();
            }
        };
        if surveyed.is_empty() {
            return Vec::new();
        }
        match project.coord_transform(self.config.metadata_srid, project.srid()) {
            Ok(trans) => metadata::confidence_points(&surveyed, trans.as_ref()),
            Err(e) => {
                warn!("Ignoring metadata: {}", e);
                Vec::new()
            }
        }
    }
}

impl<'a> Config<'a, ExtractorCfg> for VertexExtractor {
    fn from_config(extractor_cfg: &ExtractorCfg) -> Result<Self, String> {
        if !(extractor_cfg.tolerance >= 0.0) {
            return Err(format!(
                "Invalid tolerance {} - must not be negative",
                extractor_cfg.tolerance
            ));
        }
        Ok(VertexExtractor {
            config: extractor_cfg.clone(),
        })
    }

    fn gen_config() -> String {
        let toml = r#"
[extractor]
# Max. distance between vertex and surveyed point in project units
tolerance = 0.02
# Attribute with JSON array of surveyed points ([{"lat": .., "lon": .., "accuracy": ..}])
#metadata_field = "metadata"
# Reference system of surveyed points
#metadata_srid = 4326
"#;
        toml.to_string()
    }

    fn gen_runtime_config(&self) -> String {
        let mut lines = vec!["[extractor]".to_string()];
        lines.push(format!("tolerance = {}", self.config.tolerance));
        lines.push(format!(r#"metadata_field = "{}""#, self.config.metadata_field));
        lines.push(format!("metadata_srid = {}", self.config.metadata_srid));
        lines.join("\n") + "\n"
    }
}
