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

use serde::Serialize;
use lazy_static::lazy_static;
use thaw_common::geo::{GeoPoint,GeoRect};

use crate::temperature::ARCTIC_BASELINE_C;

/// the validated static temperature values we fall back to if live data is not trustworthy.
/// `current` is derived from the anomaly once at construction time
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct TemperatureBaseline {
    pub current: f64,
    pub anomaly: f64,
    pub max: f64,
    pub min: f64,
}

impl TemperatureBaseline {
    pub fn from_anomaly (anomaly: f64, max: f64, min: f64)->Self {
        TemperatureBaseline { current: ARCTIC_BASELINE_C + anomaly, anomaly, max, min }
    }
}

/// a monitored region. Immutable after the registry is created
#[derive(Serialize,Debug,Clone)]
#[serde(rename_all="camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    pub center: GeoPoint,
    pub bbox: GeoRect,

    /// live anomalies below this are considered noise for this region (°C)
    pub min_trusted_anomaly: f64,

    /// region has known permafrost-gas infrastructure
    pub geographic_risk: bool,

    pub baseline: TemperatureBaseline,
}

impl Region {
    pub fn new (id: &str, name: &str, lat: f64, lon: f64, wsen: [f64;4], min_trusted_anomaly: f64, geographic_risk: bool, baseline: TemperatureBaseline)->Self {
        Region {
            id: id.to_string(),
            name: name.to_string(),
            center: GeoPoint::from_lat_lon_degrees( lat, lon),
            bbox: GeoRect::from_wsen_degrees( wsen[0], wsen[1], wsen[2], wsen[3]),
            min_trusted_anomaly,
            geographic_risk,
            baseline
        }
    }
}

#[derive(Debug,Clone)]
pub struct RegionRegistry {
    regions: Vec<Region>
}

impl RegionRegistry {
    pub fn new (regions: Vec<Region>)->Self { RegionRegistry { regions } }

    /// the static table of monitored Arctic regions
    pub fn arctic ()->&'static RegionRegistry { &ARCTIC_REGIONS }

    pub fn get (&self, id: &str)->Option<&Region> {
        self.regions.iter().find( |r| r.id == id)
    }

    pub fn iter (&self)->impl Iterator<Item=&Region> { self.regions.iter() }

    pub fn len (&self)->usize { self.regions.len() }
    pub fn is_empty (&self)->bool { self.regions.is_empty() }
}

lazy_static! {
    static ref ARCTIC_REGIONS: RegionRegistry = RegionRegistry::new( vec![
        Region::new( "alaska", "Alaska North Slope", 70.2, -148.5, [-156.0, 68.0, -141.0, 71.5],
                     7.0, true, TemperatureBaseline::from_anomaly( 13.2, 18.6, -41.2)),
        Region::new( "siberia", "Yamal Peninsula", 70.0, 70.0, [66.0, 66.0, 74.0, 73.5],
                     8.0, true, TemperatureBaseline::from_anomaly( 14.5, 21.3, -45.8)),
        Region::new( "canada", "Mackenzie River Delta", 68.5, -134.5, [-138.0, 67.0, -131.0, 70.0],
                     6.0, false, TemperatureBaseline::from_anomaly( 9.8, 22.1, -43.5)),
        Region::new( "greenland", "Western Greenland", 67.0, -50.7, [-54.0, 64.0, -48.0, 70.0],
                     5.0, false, TemperatureBaseline::from_anomaly( 6.4, 17.9, -36.2)),
        Region::new( "scandinavia", "Northern Scandinavia", 68.35, 18.8, [14.0, 67.0, 24.0, 70.0],
                     4.0, false, TemperatureBaseline::from_anomaly( 4.6, 24.8, -32.7)),
    ]);
}
