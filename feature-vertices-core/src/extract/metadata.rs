//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Surveyed points delivered as JSON in a feature attribute

use crate::core::crs::CoordTransform;
use serde_json::Value;
use std::fmt;

/// Surveyed position in project coordinates with its accuracy
#[derive(Clone, PartialEq, Debug)]
pub struct ConfidencePoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl ConfidencePoint {
    pub fn matches(&self, x: f64, y: f64, tolerance: f64) -> bool {
        (self.x - x).abs() <= tolerance && (self.y - y).abs() <= tolerance
    }
}

/// Reasons for ignoring the metadata of a feature
#[derive(Clone, PartialEq, Debug)]
pub enum MetadataError {
    Missing,
    InvalidJson(String),
    NotAnArray,
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetadataError::Missing => write!(f, "metadata missing"),
            MetadataError::InvalidJson(e) => write!(f, "metadata is not valid JSON: {}", e),
            MetadataError::NotAnArray => write!(f, "metadata is not a JSON array"),
        }
    }
}

impl std::error::Error for MetadataError {}

/// Surveyed point in WGS84 as found in the metadata
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct SurveyedPoint {
    pub lon: f64,
    pub lat: f64,
    pub accuracy: f64,
}

/// Parse a JSON array of objects with `lat`, `lon` and `accuracy` keys.
/// Entries lacking one of the keys are skipped.
pub(crate) fn parse_metadata(text: Option<&str>) -> Result<Vec<SurveyedPoint>, MetadataError> {
    let text = text.ok_or(MetadataError::Missing)?;
    let json: Value =
        serde_json::from_str(text).map_err(|e| MetadataError::InvalidJson(e.to_string()))?;
    let entries = json.as_array().ok_or(MetadataError::NotAnArray)?;
    let points = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let point = surveyed_point(entry);
            if point.is_none() {
                debug!("Skipping metadata entry #{}: {}", idx, entry);
            }
            point
        })
        .collect();
    Ok(points)
}

fn surveyed_point(entry: &Value) -> Option<SurveyedPoint> {
    let obj = entry.as_object()?;
    Some(SurveyedPoint {
        lat: obj.get("lat")?.as_f64()?,
        lon: obj.get("lon")?.as_f64()?,
        accuracy: obj.get("accuracy")?.as_f64()?,
    })
}

/// Project surveyed points into the project reference system.
/// Points the transformation can't handle are dropped.
pub(crate) fn confidence_points(
    points: &[SurveyedPoint],
    trans: &dyn CoordTransform,
) -> Vec<ConfidencePoint> {
    points
        .iter()
        // x = lon, y = lat: surveyed points share the vertex axis order
        .filter_map(|pt| match trans.transform_xy(pt.lon, pt.lat) {
            Ok((x, y)) => Some(ConfidencePoint {
                x,
                y,
                confidence: pt.accuracy,
            }),
            Err(e) => {
                debug!("Skipping surveyed point: {}", e);
                None
            }
        })
        .collect()
}

/// Accuracy of the first surveyed point within `tolerance` of (x, y)
pub(crate) fn match_confidence(
    points: &[ConfidencePoint],
    x: f64,
    y: f64,
    tolerance: f64,
) -> Option<f64> {
    points
        .iter()
        .find(|pt| pt.matches(x, y, tolerance))
        .map(|pt| pt.confidence)
}

#[cfg(test)]
use crate::core::crs::CrsTransform;

#[test]
fn test_parse_metadata() {
    let points = parse_metadata(Some(
        r#"[{"lat": 47.1, "lon": 8.2, "accuracy": 0.5},
            {"lat": 47.2, "lon": 8.3},
            {"lat": 47.3, "lon": 8.4, "accuracy": 1, "source": "gnss"},
            "47.4,8.5",
            {"lat": "47.5", "lon": 8.6, "accuracy": 0.1}]"#,
    ))
    .unwrap();
    assert_eq!(
        points,
        vec![
            SurveyedPoint {
                lon: 8.2,
                lat: 47.1,
                accuracy: 0.5
            },
            SurveyedPoint {
                lon: 8.4,
                lat: 47.3,
                accuracy: 1.0
            },
        ]
    );
}

#[test]
fn test_parse_metadata_errors() {
    assert_eq!(parse_metadata(None), Err(MetadataError::Missing));
    assert_eq!(parse_metadata(Some("[]")), Ok(vec![]));
    assert_eq!(
        parse_metadata(Some(r#"{"lat": 1.0, "lon": 2.0, "accuracy": 3.0}"#)),
        Err(MetadataError::NotAnArray)
    );
    match parse_metadata(Some(r#"[{"lat": 20.0, "lon": 10"#)) {
        Err(MetadataError::InvalidJson(_)) => {}
        other => panic!("unexpected result {:?}", other),
    }
    match parse_metadata(Some("NULL")) {
        Err(MetadataError::InvalidJson(_)) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_confidence_points() {
    let surveyed = vec![
        SurveyedPoint {
            lon: 10.0,
            lat: 20.0,
            accuracy: 0.95,
        },
        SurveyedPoint {
            lon: 10.0,
            lat: 89.0,
            accuracy: 0.5,
        },
    ];
    let trans = CrsTransform::new(4326, 3857).unwrap();
    let points = confidence_points(&surveyed, &trans);
    assert_eq!(points.len(), 1);
    assert!((points[0].x - 1113194.9079327357).abs() < 1e-6);
    assert!((points[0].y - 2273030.926987689).abs() < 1e-6);
    assert_eq!(points[0].confidence, 0.95);
}

#[test]
fn test_match_confidence() {
    let points = vec![
        ConfidencePoint {
            x: 1.015,
            y: 1.0,
            confidence: 0.1,
        },
        ConfidencePoint {
            x: 1.0,
            y: 1.0,
            confidence: 0.2,
        },
    ];
    // first match wins, even if a later point is closer
    assert_eq!(match_confidence(&points, 1.0, 1.0, 0.02), Some(0.1));
    assert_eq!(match_confidence(&points, 0.99, 1.0, 0.02), Some(0.2));
    assert_eq!(match_confidence(&points, 1.0, 1.03, 0.02), None);
    assert_eq!(match_confidence(&[], 1.0, 1.0, 0.02), None);
}
