//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{Config, LayerCfg};
use crate::core::feature::{Feature, FeatureStruct};

/// Vector layer of the host application
pub trait Layer {
    fn id(&self) -> &str;
    /// Spatial reference system (PostGIS SRID)
    fn srid(&self) -> i32;
    fn get_feature(&self, fid: u64) -> Option<&dyn Feature>;
    fn feature_ids(&self) -> Vec<u64>;
}

/// Layer holding its features in memory
#[derive(Default, Debug)]
pub struct MemoryLayer {
    pub id: String,
    pub name: Option<String>,
    pub srid: i32,
    pub features: Vec<FeatureStruct>,
}

impl MemoryLayer {
    pub fn new(id: &str, srid: i32) -> MemoryLayer {
        MemoryLayer {
            id: String::from(id),
            srid,
            ..Default::default()
        }
    }
    pub fn add_feature(&mut self, feature: FeatureStruct) {
        self.features.push(feature);
    }
}

impl Layer for MemoryLayer {
    fn id(&self) -> &str {
        &self.id
    }
    fn srid(&self) -> i32 {
        self.srid
    }
    fn get_feature(&self, fid: u64) -> Option<&dyn Feature> {
        self.features
            .iter()
            .find(|f| f.fid == Some(fid))
            .map(|f| f as &dyn Feature)
    }
    fn feature_ids(&self) -> Vec<u64> {
        self.features.iter().filter_map(|f| f.fid).collect()
    }
}

impl<'a> Config<'a, LayerCfg> for MemoryLayer {
    fn from_config(layer_cfg: &LayerCfg) -> Result<Self, String> {
        let features = layer_cfg
            .features
            .iter()
            .map(|feature_cfg| FeatureStruct::from_feature_cfg(feature_cfg, layer_cfg.srid))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("Layer '{}': {}", layer_cfg.id, e))?;
        Ok(MemoryLayer {
            id: layer_cfg.id.clone(),
            name: layer_cfg.name.clone(),
            srid: layer_cfg.srid,
            features,
        })
    }

    fn gen_config() -> String {
        let toml = r#"
[[layer]]
id = "points_2f1c"
name = "points"
srid = 4326

[[layer.feature]]
fid = 1
geometry = { type = "Point", coordinates = [10.0, 20.0, 5.0] }
[layer.feature.attributes]
metadata = '[{"lat": 20.0, "lon": 10.0, "accuracy": 0.95}]'
"#;
        toml.to_string()
    }

    fn gen_runtime_config(&self) -> String {
        let mut lines = vec!["[[layer]]".to_string()];
        lines.push(format!(r#"id = "{}""#, self.id));
        match self.name {
            Some(ref name) => lines.push(format!(r#"name = "{}""#, name)),
            _ => lines.push(r#"#name = "points""#.to_string()),
        }
        lines.push(format!("srid = {}", self.srid));
        lines.push(format!("# {} features", self.features.len()));
        lines.join("\n") + "\n"
    }
}
