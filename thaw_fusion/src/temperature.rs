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

//! the temperature signal provider. This retrieves daily 2m air temperature (T2M) time series from
//! NASA's Prediction Of Worldwide Energy Resources (POWER) API and reduces them to current/anomaly/max/min
//! see https://power.larc.nasa.gov/docs/services/api/temporal/daily/

use std::{collections::{BTreeMap,HashMap}, sync::Arc};
use chrono::NaiveDate;
use serde::Deserialize;
use reqwest::Client;
use async_trait::async_trait;
use tracing::{debug,error};

use thaw_common::{MinMaxAvg, datetime::yyyymmdd, geo::GeoPoint, net::{self, ThawNetError}};
use crate::{
    provenance::{with_timeout, Acquisition, AcquisitionContext, FailureCause},
    region::Region,
};

/// the fixed historical reference temperature anomalies are computed against (°C)
pub const ARCTIC_BASELINE_C: f64 = -20.0;

/// fewer valid daily samples than this and the provider reports low confidence
pub const MIN_VALID_SAMPLES: usize = 30;

/// POWER uses this for missing values
pub const POWER_FILL_VALUE: f64 = -999.0;

pub const POWER_PARAMETER: &str = "T2M";

/// the fixed multi-year window we request
pub fn temperature_window ()->(NaiveDate,NaiveDate) {
    (NaiveDate::from_ymd_opt( 2020, 1, 1).unwrap_or_default(), NaiveDate::from_ymd_opt( 2024, 12, 31).unwrap_or_default())
}

/// the reduced temperature time series of a region as reported by a ClimateSource
#[derive(Debug,Clone,PartialEq)]
pub struct TemperatureReading {
    pub current: f64, // mean over window
    pub anomaly: f64, // current - ARCTIC_BASELINE_C
    pub max: f64,
    pub min: f64,
    pub n_samples: usize,

    pub provenance: String,
    pub latency: String,
}

/// reduce raw daily samples, ignoring fill values and non-finite entries. Returns None if
/// there is not a single valid sample
pub fn reduce_samples (samples: &[f64])->Option<(MinMaxAvg,f64)> {
    let acc: MinMaxAvg = samples.iter()
        .copied()
        .filter( |v| v.is_finite() && *v != POWER_FILL_VALUE)
        .collect();

    if acc.is_empty() {
        None
    } else {
        let anomaly = acc.avg - ARCTIC_BASELINE_C;
        Some( (acc, anomaly) )
    }
}

/// turn raw samples into a self-reported acquisition result
pub fn classify_samples (samples: &[f64], provenance: &str, latency: &str)->Acquisition<TemperatureReading> {
    match reduce_samples( samples) {
        None => {
            Acquisition::unavailable( FailureCause::NoData, format!("{provenance} returned no valid samples"))
        }
        Some((acc,anomaly)) => {
            let reading = TemperatureReading {
                current: acc.avg,
                anomaly,
                max: acc.max,
                min: acc.min,
                n_samples: acc.n,
                provenance: provenance.to_string(),
                latency: latency.to_string()
            };

            if !anomaly.is_finite() {
                Acquisition::LowConfidence( reading, format!("{provenance} anomaly is not a finite number"))
            } else if acc.n < MIN_VALID_SAMPLES {
                let reason = format!("{provenance} returned only {} valid samples (minimum {})", acc.n, MIN_VALID_SAMPLES);
                Acquisition::LowConfidence( reading, reason)
            } else {
                Acquisition::Live( reading)
            }
        }
    }
}

/// abstraction for where we get daily temperature samples from
#[async_trait]
pub trait ClimateSource: Send + Sync {
    fn provenance (&self)->&str;
    fn latency (&self)->&str;

    async fn daily_temperatures (&self, location: &GeoPoint, start: NaiveDate, end: NaiveDate)->Result<Vec<f64>,ThawNetError>;
}

/* #region NASA POWER *********************************************************************************************/

#[derive(Deserialize,Debug)]
pub struct PowerResponse {
    pub properties: PowerProperties
}

#[derive(Deserialize,Debug)]
pub struct PowerProperties {
    pub parameter: HashMap<String,BTreeMap<String,f64>> // parameter -> YYYYMMDD -> value
}

impl PowerResponse {
    /// the samples of the given parameter in date order
    pub fn samples (&self, parameter: &str)->Result<Vec<f64>,ThawNetError> {
        self.properties.parameter.get( parameter)
            .map( |series| series.values().copied().collect())
            .ok_or_else( || ThawNetError::ParseError( format!("no {parameter} parameter in POWER response")))
    }
}

pub struct NasaPowerSource {
    client: Client,
    base_url: String,
}

impl NasaPowerSource {
    pub fn new (client: Client, base_url: impl ToString)->Self {
        NasaPowerSource { client, base_url: base_url.to_string() }
    }
}

#[async_trait]
impl ClimateSource for NasaPowerSource {
    fn provenance (&self)->&str { "NASA POWER daily T2M" }
    fn latency (&self)->&str { "daily, 2-3 day processing latency" }

    async fn daily_temperatures (&self, location: &GeoPoint, start: NaiveDate, end: NaiveDate)->Result<Vec<f64>,ThawNetError> {
        let query = [
            ("parameters", POWER_PARAMETER.to_string()),
            ("community", "RE".to_string()),
            ("longitude", format!("{:.4}", location.longitude_degrees())),
            ("latitude", format!("{:.4}", location.latitude_degrees())),
            ("start", yyyymmdd(&start)),
            ("end", yyyymmdd(&end)),
            ("format", "JSON".to_string()),
        ];
        let response: PowerResponse = net::get_json( &self.client, &self.base_url, &query).await?;
        response.samples( POWER_PARAMETER)
    }
}

/* #endregion NASA POWER */

pub struct TemperatureProvider {
    source: Arc<dyn ClimateSource>,
}

impl TemperatureProvider {
    pub fn new (source: Arc<dyn ClimateSource>)->Self {
        TemperatureProvider { source }
    }

    /// get the temperature signal for a region. This never fails - transport, timeout and format problems
    /// are reported as `Acquisition::Unavailable` with respective cause
    pub async fn acquire (&self, region: &Region, ctx: &AcquisitionContext)->Acquisition<TemperatureReading> {
        let (start,end) = temperature_window();
        let what = format!("temperature request for {}", region.id);

        with_timeout( ctx, &what, async {
            debug!("{what}: {} from {start} to {end}", region.center);
            match self.source.daily_temperatures( &region.center, start, end).await {
                Ok(samples) => classify_samples( &samples, self.source.provenance(), self.source.latency()),
                Err(e) => {
                    if e.is_contract_violation() {
                        error!("{what} returned malformed data: {e}");
                    } else {
                        debug!("{what} failed: {e}");
                    }
                    Acquisition::from_net_error( &e)
                }
            }
        }).await
    }
}
