//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use regex::Regex;
use serde::Deserialize;
use std;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use tera::{Context, Tera};
use toml::Value;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self, String>;
    /// Generate configuration template
    fn gen_config() -> String;
    /// Generate configuration template with runtime information
    fn gen_runtime_config(&self) -> String {
        Self::gen_config()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationCfg {
    #[serde(default)]
    pub extractor: ExtractorCfg,
    pub project: ProjectCfg,
    #[serde(rename = "layer", default)]
    pub layers: Vec<LayerCfg>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ExtractorCfg {
    /// Max. distance in project units between a vertex and a surveyed point
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Attribute holding the JSON array with surveyed points
    #[serde(default = "default_metadata_field")]
    pub metadata_field: String,
    /// Spatial reference system of the surveyed points
    #[serde(default = "default_metadata_srid")]
    pub metadata_srid: i32,
}

pub const DEFAULT_TOLERANCE: f64 = 0.02;

pub fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

pub fn default_metadata_field() -> String {
    "metadata".to_string()
}

pub fn default_metadata_srid() -> i32 {
    4326
}

impl Default for ExtractorCfg {
    fn default() -> Self {
        ExtractorCfg {
            tolerance: default_tolerance(),
            metadata_field: default_metadata_field(),
            metadata_srid: default_metadata_srid(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ProjectCfg {
    /// Working reference system (PostGIS SRID)
    pub srid: i32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LayerCfg {
    pub id: String,
    pub name: Option<String>,
    /// Native reference system of the stored geometries (PostGIS SRID)
    pub srid: i32,
    #[serde(rename = "feature", default)]
    pub features: Vec<FeatureCfg>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FeatureCfg {
    pub fid: u64,
    pub geometry: Option<GeometryCfg>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

/// GeoJSON like geometry definition.
/// Coordinates with three values are read as 3D geometries.
#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type", content = "coordinates")]
pub enum GeometryCfg {
    Point(Vec<f64>),
    MultiPoint(Vec<Vec<f64>>),
    LineString(Vec<Vec<f64>>),
    MultiLineString(Vec<Vec<Vec<f64>>>),
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

pub const DEFAULT_CONFIG: &'static str = r#"
[project]
# Working reference system (PostGIS SRID)
srid = 4326
"#;

/// Load and parse the config file into an config struct.
pub fn read_config<'a, T: Deserialize<'a>>(path: &str) -> Result<T, String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return Err("Could not find config file!".to_string());
        }
    };
    let mut config_toml = String::new();
    if let Err(err) = file.read_to_string(&mut config_toml) {
        return Err(format!("Error while reading config: [{}]", err));
    };

    parse_config(config_toml, path)
}

/// Parse the configuration into an config struct.
pub fn parse_config<'a, T: Deserialize<'a>>(config_toml: String, path: &str) -> Result<T, String> {
    // Check for old ${var} expressions
    let re = Regex::new(r"\$\{([[:alnum:]]+)\}").map_err(|e| e.to_string())?;
    if re.is_match(&config_toml) {
        return Err(
            "Replace old environment variable syntax ${VARNAME} with `{{env.VARNAME}}`".to_string(),
        );
    }

    // Parse template
    let mut tera = Tera::default();
    tera.add_raw_template(path, &config_toml)
        .map_err(|e| format!("Template error: {}", e))?;
    let mut context = Context::new();
    let mut env = HashMap::new();
    for (key, value) in env::vars() {
        env.insert(key, value);
    }
    context.insert("env", &env);
    let toml = tera.render(path, &context).map_err(|e| match e.source() {
        Some(source) => format!("Template error: {}", source),
        None => format!("Template error: {}", e),
    })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
