//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

/// Vertex with sequence number and matched accuracy
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct VertexRecord {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub confidence: Option<f64>,
}

/// Vertices grouped like the parts and rings of the source geometry
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(untagged)]
pub enum ExtractionResult {
    Point(Vec<VertexRecord>),
    /// One single-element group per member point
    MultiPoint(Vec<Vec<VertexRecord>>),
    LineString(Vec<VertexRecord>),
    MultiLineString(Vec<Vec<VertexRecord>>),
    /// Exterior ring followed by interior rings
    Polygon(Vec<Vec<VertexRecord>>),
    MultiPolygon(Vec<Vec<Vec<VertexRecord>>>),
}

impl ExtractionResult {
    /// All vertices in traversal order
    pub fn vertices(&self) -> Vec<&VertexRecord> {
        match self {
            ExtractionResult::Point(v) | ExtractionResult::LineString(v) => v.iter().collect(),
            ExtractionResult::MultiPoint(parts)
            | ExtractionResult::MultiLineString(parts)
            | ExtractionResult::Polygon(parts) => parts.iter().flatten().collect(),
            ExtractionResult::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().collect()
            }
        }
    }
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
