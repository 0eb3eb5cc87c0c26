//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{read_config, ApplicationCfg, GeometryCfg};
use crate::core::parse_config;

#[test]
fn test_load_config() {
    let config = read_config("src/test/example.toml");
    println!("{:#?}", config);
    let config: ApplicationCfg = config.expect("load_config returned Err");
    assert_eq!(config.extractor.tolerance, 0.05);
    assert_eq!(config.extractor.metadata_field, "metadata");
    assert_eq!(config.extractor.metadata_srid, 4326);
    assert_eq!(config.project.srid, 3857);
    assert_eq!(config.layers.len(), 2);
    assert_eq!(config.layers[0].id, "parcels_20240611_1a2b");
    assert_eq!(config.layers[0].name, Some("parcels".to_string()));
    assert_eq!(config.layers[0].features.len(), 3);
    assert_eq!(config.layers[0].features[2].fid, 3);
    assert!(config.layers[0].features[2].geometry.is_none());
    assert!(config.layers[0].features[0].attributes.contains_key("metadata"));
    match config.layers[1].features[0].geometry {
        Some(GeometryCfg::MultiLineString(ref lines)) => {
            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0][2], vec![200.0, 50.0]);
        }
        _ => panic!("MultiLineString expected"),
    }
}

#[test]
fn test_parse_error() {
    let config: Result<ApplicationCfg, _> = read_config("src/core/mod.rs");
    assert!(config
        .err()
        .unwrap()
        .starts_with("src/core/mod.rs - unexpected character found: `/` at line 1"));

    let config: Result<ApplicationCfg, _> = read_config("wrongfile");
    assert_eq!("Could not find config file!", config.err().unwrap());
}

#[test]
fn test_defaults() {
    let toml = r#"
        [project]
        srid = 2056
        "#;
    let config: ApplicationCfg = parse_config(toml.to_string(), "").unwrap();
    assert_eq!(config.extractor.tolerance, 0.02);
    assert_eq!(config.extractor.metadata_field, "metadata");
    assert_eq!(config.extractor.metadata_srid, 4326);
    assert_eq!(config.project.srid, 2056);
    assert!(config.layers.is_empty());
}

#[test]
fn test_config_errors() {
    let config: Result<ApplicationCfg, _> = parse_config("".to_string(), "");
    assert_eq!(" - missing field `project`", config.err().unwrap());

    let toml = r#"
        [project]
        srid = 3857

        [[layer]]
        id = "l1"
        "#;
    let config: Result<ApplicationCfg, _> = parse_config(toml.to_string(), "");
    assert!(config.err().unwrap().contains("missing field `srid`"));

    let toml = r#"
        [project]
        srid = "${SRID}"
        "#;
    let config: Result<ApplicationCfg, _> = parse_config(toml.to_string(), "");
    assert_eq!(
        "Replace old environment variable syntax ${VARNAME} with `{{env.VARNAME}}`",
        config.err().unwrap()
    );
}

#[test]
fn test_env_template() {
    std::env::set_var("FEATURE_VERTICES_TEST_SRID", "31287");
    let toml = r#"
        [project]
        srid = {{env.FEATURE_VERTICES_TEST_SRID}}
        "#;
    let config: ApplicationCfg = parse_config(toml.to_string(), "").unwrap();
    assert_eq!(config.project.srid, 31287);
}

#[test]
fn test_geometry_cfg() {
    let toml = r#"
        [project]
        srid = 4326

        [[layer]]
        id = "l1"
        srid = 4326

        [[layer.feature]]
        fid = 7
        geometry = { type = "Polygon", coordinates = [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] }
        "#;
    let config: ApplicationCfg = parse_config(toml.to_string(), "").unwrap();
    match config.layers[0].features[0].geometry {
        Some(GeometryCfg::Polygon(ref rings)) => assert_eq!(rings[0].len(), 4),
        _ => panic!("Polygon expected"),
    }

    let toml = r#"
        [project]
        srid = 4326

        [[layer]]
        id = "l1"
        srid = 4326

        [[layer.feature]]
        fid = 7
        geometry = { type = "Circle", coordinates = [0.0, 0.0] }
        "#;
    let config: Result<ApplicationCfg, _> = parse_config(toml.to_string(), "");
    assert!(config.is_err());
}
