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

use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use thaw_common::config::load_config_path;
use thaw_fusion::{load_config, dashboard::Dashboard, dashboard_service, FusionConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "serve permafrost risk zones at /api/permafrost")]
pub struct Args {
    /// explicit config file path (default is to look up thaw_fusion.ron)
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// socket address to listen on, overriding the configured one
    #[arg(short,long)]
    pub addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let config: FusionConfig = match &args.config {
        Some(path) => load_config_path( path)?,
        None => load_config("thaw_fusion.ron")?
    };
    let sock_addr = args.addr.unwrap_or( config.server.sock_addr);
    let dashboard = Arc::new( Dashboard::from_config( &config)?);

    dashboard_service::serve( dashboard, sock_addr).await?;
    Ok(())
}
