//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{ApplicationCfg, ProjectCfg, DEFAULT_CONFIG};
use crate::core::crs::{CoordTransform, CrsTransform, TransformError};
use crate::core::layer::{Layer, MemoryLayer};
use crate::core::Config;

/// Project registry of the host application
pub trait Project {
    /// Working reference system (PostGIS SRID)
    fn srid(&self) -> i32;
    fn map_layer(&self, layer_id: &str) -> Option<&dyn Layer>;
    fn coord_transform(&self, src: i32, dst: i32)
        -> Result<Box<dyn CoordTransform>, TransformError>;
}

/// Project with in-memory layers and built-in transformations
#[derive(Debug)]
pub struct MemoryProject {
    pub srid: i32,
    pub layers: Vec<MemoryLayer>,
}

impl MemoryProject {
    pub fn new(srid: i32) -> MemoryProject {
        MemoryProject {
            srid,
            layers: Vec::new(),
        }
    }
    pub fn add_layer(&mut self, layer: MemoryLayer) {
        self.layers.push(layer);
    }
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }
}

impl Project for MemoryProject {
    fn srid(&self) -> i32 {
        self.srid
    }
    fn map_layer(&self, layer_id: &str) -> Option<&dyn Layer> {
        self.layers
            .iter()
            .find(|l| l.id == layer_id)
            .map(|l| l as &dyn Layer)
    }
    fn coord_transform(
        &self,
        src: i32,
        dst: i32,
    ) -> Result<Box<dyn CoordTransform>, TransformError> {
        let trans = CrsTransform::new(src, dst)?;
        Ok(Box::new(trans))
    }
}

impl<'a> Config<'a, ApplicationCfg> for MemoryProject {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let mut project = <MemoryProject as Config<ProjectCfg>>::from_config(&config.project)?;
        for layer_cfg in &config.layers {
            if project.map_layer(&layer_cfg.id).is_some() {
                return Err(format!("Duplicate layer id '{}'", layer_cfg.id));
            }
            let layer = MemoryLayer::from_config(layer_cfg)?;
            info!(
                "Layer '{}': {} features (EPSG:{})",
                layer.id,
                layer.features.len(),
                layer.srid
            );
            project.add_layer(layer);
        }
        Ok(project)
    }
    fn gen_config() -> String {
        let mut config = String::new();
        config.push_str(&<MemoryProject as Config<ProjectCfg>>::gen_config());
        config.push_str(&MemoryLayer::gen_config());
        config
    }
    fn gen_runtime_config(&self) -> String {
        let mut config = <MemoryProject as Config<ProjectCfg>>::gen_runtime_config(self);
        for layer in &self.layers {
            config.push_str("\n");
            config.push_str(&layer.gen_runtime_config());
        }
        config
    }
}

impl<'a> Config<'a, ProjectCfg> for MemoryProject {
    fn from_config(project_cfg: &ProjectCfg) -> Result<Self, String> {
        Ok(MemoryProject::new(project_cfg.srid))
    }
    fn gen_config() -> String {
        DEFAULT_CONFIG.to_string()
    }
    fn gen_runtime_config(&self) -> String {
        format!("[project]\nsrid = {}\n", self.srid)
    }
}
