//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::ExtractorCfg;
use crate::core::crs::{lonlat_to_merc, TransformError};
use crate::core::feature::{FeatureAttr, FeatureAttrValType, FeatureStruct};
use crate::core::geom::*;
use crate::core::layer::MemoryLayer;
use crate::core::Config;
use crate::extract::{ExtractError, ExtractionResult, VertexExtractor};
use crate::project::MemoryProject;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y, None)
}

fn line(coords: &[(f64, f64)]) -> LineString {
    LineString {
        points: coords.iter().map(|&(x, y)| pt(x, y)).collect(),
        srid: None,
    }
}

fn feature(fid: u64, geometry: GeometryType, metadata: Option<&str>) -> FeatureStruct {
    let mut attributes = vec![FeatureAttr {
        key: "name".to_string(),
        value: FeatureAttrValType::String("benchmark".to_string()),
    }];
    if let Some(json) = metadata {
        attributes.push(FeatureAttr {
            key: "metadata".to_string(),
            value: FeatureAttrValType::String(json.to_string()),
        });
    }
    FeatureStruct {
        fid: Some(fid),
        attributes,
        geometry: Some(geometry),
    }
}

fn project(srid: i32, layer_srid: i32, features: Vec<FeatureStruct>) -> MemoryProject {
    let mut layer = MemoryLayer::new("survey_8f3a", layer_srid);
    for f in features {
        layer.add_feature(f);
    }
    let mut project = MemoryProject::new(srid);
    project.add_layer(layer);
    project
}

fn extract(project: &MemoryProject, fid: u64) -> Option<ExtractionResult> {
    VertexExtractor::new().extract_vertices(project, "survey_8f3a", fid)
}

fn ids(result: &ExtractionResult) -> Vec<u64> {
    result.vertices().iter().map(|v| v.id).collect()
}

#[test]
fn test_point_z() {
    let geom = GeometryType::PointZ(PointZ::new(10.0, 20.0, 5.0, None));
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(
        result.to_json(),
        json!([{"id": 1, "x": 10.0, "y": 20.0, "z": 5.0, "confidence": null}])
    );
}

#[test]
fn test_point_confidence() {
    let geom = GeometryType::PointZ(PointZ::new(10.0, 20.0, 5.0, None));
    let metadata = r#"[{"lat": 20.0, "lon": 10.0, "accuracy": 0.95}]"#;
    let project = project(4326, 4326, vec![feature(1, geom, Some(metadata))]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(
        result.to_json(),
        json!([{"id": 1, "x": 10.0, "y": 20.0, "z": 5.0, "confidence": 0.95}])
    );
}

#[test]
fn test_point_2d() {
    let project = project(4326, 4326, vec![feature(1, GeometryType::Point(pt(1.5, 2.5)), None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(
        result,
        ExtractionResult::Point(vec![crate::extract::VertexRecord {
            id: 1,
            x: 1.5,
            y: 2.5,
            z: None,
            confidence: None,
        }])
    );
}

#[test]
fn test_multipoint() {
    let geom = GeometryType::MultiPoint(MultiPoint {
        points: vec![pt(0.0, 0.0), pt(1.0, 1.0), pt(0.0, 0.0)],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    match result {
        ExtractionResult::MultiPoint(ref parts) => {
            assert_eq!(parts.len(), 3);
            assert!(parts.iter().all(|p| p.len() == 1));
        }
        _ => panic!("MultiPoint expected"),
    }
    assert_eq!(ids(&result), vec![1, 2, 3]);
    assert_eq!(result.to_json()[2][0]["x"], json!(0.0));
}

#[test]
fn test_linestring() {
    let geom = GeometryType::LineString(line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 1.0)]));
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(ids(&result), vec![1, 2, 3]);
    assert_eq!(result.to_json()[2]["y"], json!(1.0));
}

#[test]
fn test_closed_linestring() {
    // lines are treated like rings
    let geom = GeometryType::LineString(line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]));
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(ids(&result), vec![1, 2, 3]);

    // single vertex line is kept
    let geom = GeometryType::LineString(line(&[(3.0, 3.0)]));
    let project = self::project(4326, 4326, vec![feature(2, geom, None)]);
    assert_eq!(ids(&extract(&project, 2).unwrap()), vec![1]);
}

#[test]
fn test_closure_ignores_z() {
    let geom = GeometryType::LineStringZ(LineStringZ {
        points: vec![
            PointZ::new(0.0, 0.0, 1.0, None),
            PointZ::new(1.0, 0.0, 1.0, None),
            PointZ::new(0.0, 0.0, 9.0, None),
        ],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(
        result.to_json(),
        json!([
            {"id": 1, "x": 0.0, "y": 0.0, "z": 1.0, "confidence": null},
            {"id": 2, "x": 1.0, "y": 0.0, "z": 1.0, "confidence": null}
        ])
    );
}

#[test]
fn test_multilinestring() {
    let geom = GeometryType::MultiLineString(MultiLineString {
        lines: vec![
            line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            line(&[(5.0, 5.0), (6.0, 6.0)]),
        ],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    match result {
        ExtractionResult::MultiLineString(ref lines) => {
            assert_eq!(lines[0].iter().map(|v| v.id).collect::<Vec<_>>(), vec![1, 2, 3]);
            assert_eq!(lines[1].iter().map(|v| v.id).collect::<Vec<_>>(), vec![4, 5]);
        }
        _ => panic!("MultiLineString expected"),
    }
}

#[test]
fn test_polygon() {
    let geom = GeometryType::Polygon(Polygon {
        rings: vec![line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(
        result.to_json(),
        json!([[
            {"id": 1, "x": 0.0, "y": 0.0, "z": null, "confidence": null},
            {"id": 2, "x": 1.0, "y": 0.0, "z": null, "confidence": null},
            {"id": 3, "x": 1.0, "y": 1.0, "z": null, "confidence": null}
        ]])
    );
}

#[test]
fn test_polygon_with_hole() {
    let geom = GeometryType::Polygon(Polygon {
        rings: vec![
            line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            line(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 2.0)]),
            line(&[(6.0, 6.0), (8.0, 6.0), (8.0, 8.0), (6.0, 6.0)]),
        ],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    match result {
        ExtractionResult::Polygon(ref rings) => {
            assert_eq!(rings.len(), 3);
            assert_eq!(rings[0].len(), 4);
            assert_eq!(rings[1][0].id, 5);
            assert_eq!(rings[1][0].x, 2.0);
            assert_eq!(rings[2][0].id, 8);
        }
        _ => panic!("Polygon expected"),
    }
    assert_eq!(ids(&result), (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_multipolygon() {
    let square = |x0: f64| Polygon {
        rings: vec![line(&[
            (x0, 0.0),
            (x0 + 1.0, 0.0),
            (x0 + 1.0, 1.0),
            (x0, 1.0),
            (x0, 0.0),
        ])],
        srid: None,
    };
    let geom = GeometryType::MultiPolygon(MultiPolygon {
        polygons: vec![square(0.0), square(5.0), square(10.0)],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    match result {
        ExtractionResult::MultiPolygon(ref polygons) => {
            assert_eq!(polygons.len(), 3);
            assert_eq!(polygons[1][0][0].id, 5);
            assert_eq!(polygons[1][0][0].x, 5.0);
            assert_eq!(polygons[2][0][3].id, 12);
        }
        _ => panic!("MultiPolygon expected"),
    }
    assert_eq!(ids(&result), (1..=12).collect::<Vec<_>>());
}

#[test]
fn test_multipolygon_z() {
    let ring = LineStringZ {
        points: vec![
            PointZ::new(0.0, 0.0, 3.0, None),
            PointZ::new(1.0, 0.0, 3.0, None),
            PointZ::new(0.0, 1.0, 3.0, None),
            PointZ::new(0.0, 0.0, 3.0, None),
        ],
        srid: None,
    };
    let geom = GeometryType::MultiPolygonZ(MultiPolygonZ {
        polygons: vec![PolygonZ {
            rings: vec![ring],
            srid: None,
        }],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(ids(&result), vec![1, 2, 3]);
    assert!(result.vertices().iter().all(|v| v.z == Some(3.0)));
}

#[test]
fn test_first_confidence_match() {
    let geom = GeometryType::LineString(line(&[(10.0, 20.0), (11.0, 21.0)]));
    let metadata = r#"[
        {"lat": 20.015, "lon": 10.0, "accuracy": 0.5},
        {"lat": 20.0, "lon": 10.0, "accuracy": 0.9},
        {"lat": 21.0, "lon": 11.0},
        {"lat": 21.01, "lon": 11.0, "accuracy": 0.7}
    ]"#;
    let project = project(4326, 4326, vec![feature(1, geom, Some(metadata))]);
    let result = extract(&project, 1).unwrap();
    let confidences: Vec<_> = result.vertices().iter().map(|v| v.confidence).collect();
    assert_eq!(confidences, vec![Some(0.5), Some(0.7)]);
}

#[test]
fn test_malformed_metadata() {
    let geom = GeometryType::LineString(line(&[(10.0, 20.0), (11.0, 21.0)]));
    let metadata = r#"[{"lat": 20.0, "lon": 10.0, "accu"#;
    let project = project(4326, 4326, vec![feature(1, geom, Some(metadata))]);
    let result = extract(&project, 1).unwrap();
    assert!(result.vertices().iter().all(|v| v.confidence.is_none()));
    assert_eq!(ids(&result), vec![1, 2]);
}

#[test]
fn test_null_metadata() {
    let mut f = feature(1, GeometryType::Point(pt(10.0, 20.0)), None);
    f.attributes.push(FeatureAttr {
        key: "metadata".to_string(),
        value: FeatureAttrValType::Null,
    });
    let project = project(4326, 4326, vec![f]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(result.vertices()[0].confidence, None);
}

#[test]
fn test_metadata_field_config() {
    let geom = GeometryType::Point(pt(10.0, 20.0));
    let mut f = feature(1, geom, None);
    f.attributes.push(FeatureAttr {
        key: "gnss".to_string(),
        value: FeatureAttrValType::String(
            r#"[{"lat": 20.05, "lon": 10.0, "accuracy": 0.3}]"#.to_string(),
        ),
    });
    let project = project(4326, 4326, vec![f]);
    let cfg = ExtractorCfg {
        tolerance: 0.1,
        metadata_field: "gnss".to_string(),
        metadata_srid: 4326,
    };
    let extractor = VertexExtractor::from_config(&cfg).unwrap();
    let result = extractor.extract(&project, "survey_8f3a", 1).unwrap();
    assert_eq!(result.vertices()[0].confidence, Some(0.3));

    // default settings neither find the attribute nor match within 0.02
    let result = VertexExtractor::new().extract(&project, "survey_8f3a", 1).unwrap();
    assert_eq!(result.vertices()[0].confidence, None);
}

#[test]
fn test_reprojection() {
    let geom = GeometryType::Point(Point::new(10.0, 20.0, Some(4326)));
    let metadata = r#"[{"lat": 20.0, "lon": 10.0, "accuracy": 0.95}]"#;
    let project = project(3857, 4326, vec![feature(1, geom, Some(metadata))]);
    let result = extract(&project, 1).unwrap();
    let vertex = result.vertices()[0].clone();
    let (x, y) = lonlat_to_merc(10.0, 20.0);
    assert_eq!((vertex.x, vertex.y), (x, y));
    assert_eq!(vertex.confidence, Some(0.95));

    // stored geometry is unchanged
    let layer = &project.layers[0];
    match layer.features[0].geometry {
        Some(GeometryType::Point(ref p)) => {
            assert_eq!((p.x, p.y), (10.0, 20.0));
            assert_eq!(p.srid, Some(4326));
        }
        _ => panic!("Point expected"),
    }
}

#[test]
fn test_metadata_in_projected_project() {
    // Web Mercator project with Web Mercator layer
    let (x, y) = lonlat_to_merc(8.5, 47.4);
    let geom = GeometryType::LineString(line(&[(x, y), (x + 100.0, y)]));
    let metadata = r#"[{"lat": 47.4, "lon": 8.5, "accuracy": 0.02}]"#;
    let project = project(3857, 3857, vec![feature(1, geom, Some(metadata))]);
    let result = extract(&project, 1).unwrap();
    let confidences: Vec<_> = result.vertices().iter().map(|v| v.confidence).collect();
    assert_eq!(confidences, vec![Some(0.02), None]);
}

#[test]
fn test_metadata_without_transformation() {
    // no WGS84 transformation into the Swiss project system
    let geom = GeometryType::Point(pt(2600000.0, 1200000.0));
    let metadata = r#"[{"lat": 46.95, "lon": 7.44, "accuracy": 0.5}]"#;
    let project = project(2056, 2056, vec![feature(1, geom, Some(metadata))]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(result.vertices()[0].confidence, None);
}

#[test]
fn test_unsupported_layer_transformation() {
    let geom = GeometryType::Point(pt(2600000.0, 1200000.0));
    let project = project(3857, 2056, vec![feature(1, geom, None)]);
    assert_eq!(
        VertexExtractor::new().extract(&project, "survey_8f3a", 1),
        Err(ExtractError::Transform(TransformError::Unsupported {
            src: 2056,
            dst: 3857
        }))
    );
    assert_eq!(extract(&project, 1), None);
}

#[test]
fn test_unknown_layer() {
    let project = project(4326, 4326, vec![feature(1, GeometryType::Point(pt(0.0, 0.0)), None)]);
    let extractor = VertexExtractor::new();
    assert_eq!(extractor.extract_vertices(&project, "missing", 1), None);
    assert_eq!(
        extractor.extract(&project, "missing", 1),
        Err(ExtractError::LayerNotFound("missing".to_string()))
    );
}

#[test]
fn test_unknown_feature() {
    let project = project(4326, 4326, vec![feature(1, GeometryType::Point(pt(0.0, 0.0)), None)]);
    assert!(extract(&project, 1).is_some());
    assert_eq!(extract(&project, 99), None);
    assert_eq!(
        VertexExtractor::new().extract(&project, "survey_8f3a", 99),
        Err(ExtractError::FeatureNotFound(99))
    );
}

#[test]
fn test_empty_geometry() {
    let mut no_geom = feature(1, GeometryType::Point(pt(0.0, 0.0)), None);
    no_geom.geometry = None;
    let empty = feature(
        2,
        GeometryType::Polygon(Polygon {
            rings: vec![],
            srid: None,
        }),
        None,
    );
    let project = project(4326, 4326, vec![no_geom, empty]);
    let extractor = VertexExtractor::new();
    assert_eq!(
        extractor.extract(&project, "survey_8f3a", 1),
        Err(ExtractError::EmptyGeometry(1))
    );
    assert_eq!(
        extractor.extract(&project, "survey_8f3a", 2),
        Err(ExtractError::EmptyGeometry(2))
    );
    assert_eq!(extract(&project, 2), None);
}

#[test]
fn test_empty_point() {
    let empty_point = feature(1, GeometryType::Point(pt(f64::NAN, f64::NAN)), None);
    let empty_point_z = feature(
        2,
        GeometryType::PointZ(PointZ::new(f64::NAN, f64::NAN, f64::NAN, None)),
        None,
    );
    let empty_multipoint = feature(
        3,
        GeometryType::MultiPoint(MultiPoint {
            points: vec![pt(f64::NAN, f64::NAN)],
            srid: None,
        }),
        None,
    );
    let project = project(4326, 4326, vec![empty_point, empty_point_z, empty_multipoint]);
    let extractor = VertexExtractor::new();
    for fid in 1..=3 {
        assert_eq!(
            extractor.extract(&project, "survey_8f3a", fid),
            Err(ExtractError::EmptyGeometry(fid))
        );
        assert_eq!(extract(&project, fid), None);
    }
}

#[test]
fn test_multipoint_with_empty_member() {
    let geom = GeometryType::MultiPoint(MultiPoint {
        points: vec![pt(0.0, 0.0), pt(f64::NAN, f64::NAN), pt(1.0, 1.0)],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    let result = extract(&project, 1).unwrap();
    assert_eq!(ids(&result), vec![1, 2]);
    assert_eq!(
        result.to_json(),
        json!([
            [{"id": 1, "x": 0.0, "y": 0.0, "z": null, "confidence": null}],
            [{"id": 2, "x": 1.0, "y": 1.0, "z": null, "confidence": null}]
        ])
    );
}

#[test]
fn test_unrecognized_geometry() {
    let geom = GeometryType::GeometryCollection(GeometryCollection {
        geometries: vec![postgis::ewkb::Geometry::Point(pt(0.0, 0.0))],
        srid: None,
    });
    let project = project(4326, 4326, vec![feature(1, geom, None)]);
    assert_eq!(
        VertexExtractor::new().extract(&project, "survey_8f3a", 1),
        Err(ExtractError::UnrecognizedGeometryType(7))
    );
    assert_eq!(extract(&project, 1), None);
}

#[test]
fn test_extractor_config() {
    let cfg = ExtractorCfg {
        tolerance: -1.0,
        ..Default::default()
    };
    assert_eq!(
        VertexExtractor::from_config(&cfg).err(),
        Some("Invalid tolerance -1 - must not be negative".to_string())
    );
    let extractor = VertexExtractor::from_config(&ExtractorCfg::default()).unwrap();
    assert_eq!(
        extractor.gen_runtime_config(),
        "[extractor]\ntolerance = 0.02\nmetadata_field = \"metadata\"\nmetadata_srid = 4326\n"
    );
}
