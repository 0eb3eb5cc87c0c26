//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, AppSettings, ArgMatches, SubCommand};
use dotenv::dotenv;
use env_logger::Builder;
use feature_vertices_core::core::config::ExtractorCfg;
use feature_vertices_core::core::{read_config, ApplicationCfg, Config};
use feature_vertices_core::extract::VertexExtractor;
use feature_vertices_core::project::{MemoryProject, Project};
use log::Record;
use serde_json::Value;
use std::env;
use std::io::Write;
use std::process;
use time;

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default(),
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log = match (args.value_of("loglevel"), env::var("RUST_LOG")) {
        (None, Ok(rust_log_env)) => rust_log_env,
        (loglevel, _) => loglevel.unwrap_or("info").to_string(),
    };
    builder.parse_filters(&rust_log);

    builder.init();
}

fn config_from_args(args: &ArgMatches<'_>) -> ApplicationCfg {
    let cfgpath = args.value_of("config").unwrap_or("feature_vertices.toml");
    info!("Reading configuration from '{}'", cfgpath);
    read_config(cfgpath).unwrap_or_else(|err| {
        println!("Error reading configuration - {} ", err);
        process::exit(1)
    })
}

fn setup_from_config(config: &ApplicationCfg) -> (MemoryProject, VertexExtractor) {
    let project = <MemoryProject as Config<ApplicationCfg>>::from_config(config)
        .unwrap_or_else(|err| {
            println!("Error reading configuration - {} ", err);
            process::exit(1)
        });
    let extractor = VertexExtractor::from_config(&config.extractor).unwrap_or_else(|err| {
        println!("Error reading configuration - {} ", err);
        process::exit(1)
    });
    (project, extractor)
}

fn extract(args: &ArgMatches<'_>) {
    let config = config_from_args(args);
    let (project, extractor) = setup_from_config(&config);
    let layer_id = args.value_of("layer").unwrap_or_default();
    let pretty = args.value_of("pretty").map_or(false, |s| {
        s.parse::<bool>()
            .expect("Error parsing 'pretty' as boolean value")
    });
    let extract_json = |fid: u64| {
        extractor
            .extract_vertices(&project, layer_id, fid)
            .map(|result| result.to_json())
            .unwrap_or(Value::Null)
    };

    let json = match args.value_of("feature") {
        Some(fid) => extract_json(
            fid.parse::<u64>()
                .expect("Error parsing 'feature' as integer value"),
        ),
        None => {
            let fids = match project.map_layer(layer_id) {
                Some(layer) => layer.feature_ids(),
                None => {
                    error!(
                        "Layer '{}' not found in project. Available layers: {}",
                        layer_id,
                        project.layer_ids().join(", ")
                    );
                    Vec::new()
                }
            };
            info!("Extracting {} features of layer '{}'", fids.len(), layer_id);
            let features = fids
                .into_iter()
                .map(|fid| (fid.to_string(), extract_json(fid)))
                .collect::<serde_json::Map<_, _>>();
            Value::Object(features)
        }
    };

    let output = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    match output {
        Ok(s) => println!("{}", s),
        Err(e) => error!("Error writing JSON: {}", e),
    }
}

fn gen_config(args: &ArgMatches<'_>) -> String {
    if args.value_of("config").is_some() {
        let config = config_from_args(args);
        let (project, extractor) = setup_from_config(&config);
        format!(
            "{}\n{}",
            extractor.gen_runtime_config(),
            <MemoryProject as Config<ApplicationCfg>>::gen_runtime_config(&project)
        )
    } else {
        let mut toml = <VertexExtractor as Config<ExtractorCfg>>::gen_config();
        toml.push_str(&<MemoryProject as Config<ApplicationCfg>>::gen_config());
        toml
    }
}

fn main() {
    dotenv().ok();
    // http://kbknapp.github.io/clap-rs/clap/
    let mut app = App::new("feature_vertices")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("extract feature vertices annotated with surveyed accuracy as JSON")
        .subcommand(SubCommand::with_name("extract")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=<FILE> 'Load from custom config file'
                                              --layer=<ID> 'Layer id'
                                              --feature=[FID] 'Feature id (Default: all features of layer)'
                                              --pretty=[true|false] 'Pretty print JSON output'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Extract vertices of layer features"))
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("-c, --config=[FILE] 'Generate runtime configuration from config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Generate configuration template"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => match matches.subcommand() {
            ("extract", Some(sub_m)) => {
                init_logger(sub_m);
                extract(sub_m);
            }
            ("genconfig", Some(sub_m)) => {
                init_logger(sub_m);
                println!("{}", gen_config(sub_m));
            }
            _ => {
                let _ = app.print_help();
                println!("");
            }
        },
    }
}
