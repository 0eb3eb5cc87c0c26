//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::FeatureCfg;
use crate::core::geom::GeometryType;
use std::fmt;
use toml::Value;

/// Supported feature attribute value types
#[derive(Clone, PartialEq, Debug)]
pub enum FeatureAttrValType {
    String(String),
    Double(f64),
    Int(i64),
    Bool(bool),
    Null,
}

impl fmt::Display for FeatureAttrValType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureAttrValType::String(v) => write!(f, "{}", v),
            FeatureAttrValType::Double(v) => write!(f, "{}", v),
            FeatureAttrValType::Int(v) => write!(f, "{}", v),
            FeatureAttrValType::Bool(v) => write!(f, "{}", v),
            FeatureAttrValType::Null => write!(f, "NULL"),
        }
    }
}

impl From<&Value> for FeatureAttrValType {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(v) => FeatureAttrValType::String(v.clone()),
            Value::Float(v) => FeatureAttrValType::Double(*v),
            Value::Integer(v) => FeatureAttrValType::Int(*v),
            Value::Boolean(v) => FeatureAttrValType::Bool(*v),
            // Dates, arrays and tables are kept in their TOML notation
            other => FeatureAttrValType::String(other.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FeatureAttr {
    pub key: String,
    pub value: FeatureAttrValType,
}

/// Feature access of the host application
pub trait Feature {
    /// Invalid features are returned by hosts for unknown ids
    fn is_valid(&self) -> bool {
        true
    }
    fn geometry(&self) -> Option<&GeometryType>;
    fn attribute(&self, key: &str) -> Option<FeatureAttrValType>;
}

/// Basic Feature implementation
#[derive(Debug)]
pub struct FeatureStruct {
    pub fid: Option<u64>,
    pub attributes: Vec<FeatureAttr>,
    pub geometry: Option<GeometryType>,
}

impl Feature for FeatureStruct {
    fn is_valid(&self) -> bool {
        self.fid.is_some()
    }
    fn geometry(&self) -> Option<&GeometryType> {
        self.geometry.as_ref()
    }
    fn attribute(&self, key: &str) -> Option<FeatureAttrValType> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.clone())
    }
}

impl FeatureStruct {
    /// Build feature with geometry in reference system `srid`
    pub fn from_feature_cfg(cfg: &FeatureCfg, srid: i32) -> Result<Self, String> {
        let geometry = match cfg.geometry {
            Some(ref geom) => Some(
                GeometryType::from_geometry_cfg(geom, Some(srid))
                    .map_err(|e| format!("Feature {}: {}", cfg.fid, e))?,
            ),
            None => None,
        };
        Ok(FeatureStruct {
            fid: Some(cfg.fid),
            attributes: cfg
                .attributes
                .iter()
                .map(|(key, value)| FeatureAttr {
                    key: key.clone(),
                    value: FeatureAttrValType::from(value),
                })
                .collect(),
            geometry,
        })
    }
}
