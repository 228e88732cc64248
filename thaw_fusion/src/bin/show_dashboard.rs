/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “thaw” permafrost fusion software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use thaw_common::config::load_config_path;
use thaw_fusion::{load_config, dashboard::Dashboard, FusionConfig};

/// run one aggregation pass over all Arctic regions (or a single one) and print the result as JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = "print permafrost risk zones from live temperature and methane data")]
pub struct Args {
    /// explicit config file path (default is to look up thaw_fusion.ron)
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// pretty print JSON output
    #[arg(short,long)]
    pub pretty: bool,

    /// only compute the zone of the given region id
    #[arg(short,long)]
    pub region: Option<String>,
}

fn print_json<T: serde::Serialize> (value: &T, pretty: bool)->Result<()> {
    let json = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let config: FusionConfig = match &args.config {
        Some(path) => load_config_path( path)?,
        None => load_config("thaw_fusion.ron")?
    };
    let dashboard = Dashboard::from_config( &config)?;

    if let Some(region_id) = &args.region {
        let zone = dashboard.region_zone( region_id).await?;
        print_json( &zone, args.pretty)
    } else {
        let response = dashboard.aggregate().await;
        print_json( &response, args.pretty)
    }
}
