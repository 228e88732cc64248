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

//! fusion of Arctic temperature and methane signals into per-region permafrost risk zones.
//! Each region goes through temperature provider -> resolver -> methane provider -> resolver ->
//! risk scorer -> zone assembler, the dashboard runs all regions concurrently

use std::{net::SocketAddr, sync::Arc, time::Duration};
use serde::{Serialize,Deserialize};
use reqwest::Client;

use thaw_common::{define_load_config, datetime::{deserialize_duration, serialize_duration}};

pub mod errors;
use errors::{Result, op_failed};

pub mod provenance;
pub mod region;
pub mod temperature;
pub mod methane;
pub mod resolver;
pub mod risk;
pub mod zone;
pub mod dashboard;
pub mod dashboard_service;

use crate::{
    dashboard::Dashboard,
    methane::{CmrGranuleSource, HotspotCatalog, MethaneProvider},
    region::RegionRegistry,
    temperature::{NasaPowerSource, TemperatureProvider},
};

define_load_config! {}

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct ServerConfig {
    pub sock_addr: SocketAddr,
}

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct FusionConfig {
    pub power_url: String,  // NASA POWER daily point endpoint
    pub cmr_url: String,    // CMR granule search endpoint (json)
    pub collection: String, // CMR short_name of the methane product

    /// per provider call
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub request_timeout: Duration,

    /// granule search windows in days, tried in order until one yields methane values
    #[serde(default="default_lookback_days")]
    pub lookback_days: Vec<u32>,

    pub max_granules: usize,

    /// optional RON file with a region id -> hotspot sites table replacing the built-in catalog
    #[serde(default)]
    pub hotspot_catalog: Option<String>,

    pub server: ServerConfig,
}

fn default_lookback_days ()->Vec<u32> { vec![7, 30] }

impl FusionConfig {
    pub fn validate (&self)->Result<()> {
        if self.request_timeout.is_zero() {
            return Err( op_failed!("request_timeout has to be positive"))
        }
        if self.lookback_days.is_empty() || self.lookback_days.contains(&0) {
            return Err( op_failed!("lookback_days has to be a non-empty list of positive day counts: {:?}", self.lookback_days))
        }
        if !self.lookback_days.windows(2).all( |w| w[0] < w[1]) {
            return Err( op_failed!("lookback_days have to be increasing: {:?}", self.lookback_days))
        }
        if self.max_granules == 0 {
            return Err( op_failed!("max_granules has to be positive"))
        }
        Ok(())
    }
}

impl Dashboard {
    /// create a dashboard for the built-in Arctic regions that uses NASA POWER and CMR as configured
    pub fn from_config (config: &FusionConfig)->Result<Dashboard> {
        config.validate()?;

        let client = Client::builder()
            .user_agent( concat!( env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let catalog = match &config.hotspot_catalog {
            Some(path) => HotspotCatalog::from_path( path)?,
            None => HotspotCatalog::arctic()
        };

        let temperature = TemperatureProvider::new( Arc::new( NasaPowerSource::new( client.clone(), &config.power_url)));
        let granules = CmrGranuleSource::new( client, &config.cmr_url, &config.collection, config.max_granules);
        let methane = MethaneProvider::new( Arc::new( granules), catalog, config.lookback_days.clone());

        Ok( Dashboard::new( RegionRegistry::arctic().clone(), temperature, methane, config.request_timeout) )
    }
}
