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

//! the methane signal provider. Candidate hotspots come from a static catalog of known permafrost
//! methane sites whose concentrations are estimated from the (resolved) temperature anomaly. Real
//! measurements come from Sentinel-5P TROPOMI CH4 granules found through the NASA Earthdata
//! Common Metadata Repository (CMR), see https://cmr.earthdata.nasa.gov/search/site/docs/search/api.html

use std::{cmp::Ordering, collections::HashMap, path::Path, sync::Arc};
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};
use reqwest::Client;
use async_trait::async_trait;
use lazy_static::lazy_static;
use tracing::{debug,error};

use thaw_common::{
    config::load_config_path,
    datetime::{days_before, is_between_inclusive, ser_short_rfc3339, short_utc_datetime_string},
    geo::{GeoPoint,GeoRect},
    net::{self, ThawNetError},
    round_to,
};
use crate::{
    errors::Result,
    provenance::{
        with_timeout, Acquisition, AcquisitionContext, DataSource, FailureCause, SourceKind,
        CALCULATED_METHANE_CONFIDENCE, REAL_METHANE_CONFIDENCE
    },
    region::Region,
};

pub const BACKGROUND_PPB: f64 = 1850.0;
pub const ELEVATED_PPB: f64 = 1950.0;
pub const HIGH_PPB: f64 = 2050.0;

/// estimates are never reported below this
pub const FLOOR_PPB: f64 = 1750.0;

/// empirical sensitivity of permafrost methane release to temperature anomaly
pub const PPB_PER_DEGREE: f64 = 12.0;

pub const METHANE_UNIT: &str = "ppb";

pub const MODEL_PROVENANCE: &str = "Temperature-driven methane model (1850 ppb background + 12 ppb/°C anomaly + site factor)";

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord)]
#[serde(rename_all="lowercase")]
pub enum MethaneRiskTier { Low, Medium, High }

/// the single place where concentrations are mapped to risk tiers
pub fn methane_risk_tier (ppb: f64)->MethaneRiskTier {
    if ppb > ELEVATED_PPB {
        MethaneRiskTier::High
    } else if ppb > BACKGROUND_PPB {
        MethaneRiskTier::Medium
    } else {
        MethaneRiskTier::Low
    }
}

pub fn estimate_concentration (anomaly: f64, site_multiplier: f64)->f64 {
    let ppb = BACKGROUND_PPB + anomaly * PPB_PER_DEGREE + (site_multiplier - 1.0) * 100.0;
    round_to( ppb.max( FLOOR_PPB), 1)
}

/* #region observations *******************************************************************************************/

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct GranuleMetadata {
    pub granule_id: String,
    pub title: String,
    pub collection: String,
    #[serde(serialize_with="ser_short_rfc3339")]
    pub time_start: DateTime<Utc>,
}

/// a candidate methane hotspot. The risk tier is derived from the concentration on construction
/// and cannot be set independently
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct MethaneObservation {
    pub id: String,
    pub region_id: String,
    pub name: String,
    pub coordinates: GeoPoint,
    concentration: f64,
    risk_tier: MethaneRiskTier,
    pub data_source: DataSource,
    pub confidence: u8,

    #[serde(skip_serializing_if="thaw_common::is_none")]
    pub bbox: Option<GeoRect>,
    #[serde(skip_serializing_if="thaw_common::is_none")]
    pub granule: Option<GranuleMetadata>,
}

impl MethaneObservation {
    pub fn new (id: impl ToString, region_id: impl ToString, name: impl ToString, coordinates: GeoPoint, concentration: f64, data_source: DataSource)->Self {
        MethaneObservation {
            id: id.to_string(),
            region_id: region_id.to_string(),
            name: name.to_string(),
            coordinates,
            concentration,
            risk_tier: methane_risk_tier( concentration),
            confidence: data_source.confidence,
            data_source,
            bbox: None,
            granule: None,
        }
    }

    pub fn with_granule (mut self, bbox: Option<GeoRect>, granule: GranuleMetadata)->Self {
        self.bbox = bbox;
        self.granule = Some(granule);
        self
    }

    #[inline] pub fn concentration (&self)->f64 { self.concentration }
    #[inline] pub fn risk_tier (&self)->MethaneRiskTier { self.risk_tier }
    #[inline] pub fn is_real (&self)->bool { self.data_source.is_real() }
}

/// highest concentration first. Ties are broken by id so that ordering is reproducible
pub fn sort_by_concentration (obs: &mut Vec<MethaneObservation>) {
    obs.sort_by( |a,b| {
        b.concentration.partial_cmp( &a.concentration).unwrap_or( Ordering::Equal).then_with( || a.id.cmp( &b.id))
    });
}

/* #endregion observations */

/* #region hotspot catalog ****************************************************************************************/

/// a known geological methane site. The multiplier scales the site contribution relative to background
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct HotspotSite {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    pub multiplier: f64,
}

impl HotspotSite {
    fn new (id: &str, name: &str, lat: f64, lon: f64, multiplier: f64)->Self {
        HotspotSite { id: id.to_string(), name: name.to_string(), location: GeoPoint::from_lat_lon_degrees(lat,lon), multiplier }
    }
}

/// static region id -> sites table. This stands in for a detection feed and can be replaced by
/// loading a different table without touching scorer or assembler
#[derive(Serialize,Deserialize,Debug,Clone,Default)]
pub struct HotspotCatalog {
    sites: HashMap<String,Vec<HotspotSite>>
}

impl HotspotCatalog {
    pub fn new (sites: HashMap<String,Vec<HotspotSite>>)->Self { HotspotCatalog { sites } }

    pub fn arctic ()->HotspotCatalog { (*ARCTIC_HOTSPOTS).clone() }

    pub fn from_path<P: AsRef<Path>> (path: P)->Result<HotspotCatalog> {
        Ok( load_config_path( path)? )
    }

    pub fn sites_for (&self, region_id: &str)->&[HotspotSite] {
        self.sites.get( region_id).map( |v| v.as_slice()).unwrap_or( &[])
    }
}

lazy_static! {
    static ref ARCTIC_HOTSPOTS: HotspotCatalog = HotspotCatalog::new( HashMap::from([
        ("alaska".to_string(), vec![
            HotspotSite::new( "alaska-prudhoe", "Prudhoe Bay Thermokarst", 70.25, -148.34, 1.35),
            HotspotSite::new( "alaska-teshekpuk", "Teshekpuk Lake Seeps", 70.60, -153.00, 1.15),
            HotspotSite::new( "alaska-colville", "Colville River Delta", 70.40, -150.70, 0.95),
        ]),
        ("siberia".to_string(), vec![
            HotspotSite::new( "siberia-craters", "Yamal Crater Field", 69.97, 68.37, 1.60),
            HotspotSite::new( "siberia-bovanenkovo", "Bovanenkovo Gas Field", 70.37, 68.40, 1.45),
            HotspotSite::new( "siberia-sabetta", "Sabetta Lowlands", 71.27, 72.05, 1.05),
        ]),
        ("canada".to_string(), vec![
            HotspotSite::new( "canada-pingos", "Mackenzie Delta Pingos", 69.40, -133.00, 1.25),
            HotspotSite::new( "canada-inuvik", "Inuvik Uplands", 68.36, -133.72, 0.90),
        ]),
        ("greenland".to_string(), vec![
            HotspotSite::new( "greenland-disko", "Disko Bay Seeps", 69.25, -53.50, 1.20),
            HotspotSite::new( "greenland-kangerlussuaq", "Kangerlussuaq Ice Margin", 67.01, -50.69, 1.05),
        ]),
        ("scandinavia".to_string(), vec![
            HotspotSite::new( "scandinavia-stordalen", "Stordalen Mire", 68.35, 19.05, 1.10),
            HotspotSite::new( "scandinavia-tornetrask", "Torneträsk Palsa Fields", 68.40, 18.90, 0.85),
        ]),
    ]));
}

/// estimate concentrations for all catalog sites of a region from the given temperature anomaly.
/// Result is sorted by concentration. If there are medium/high tier sites only those are returned,
/// otherwise all sites (we never hand out an empty list when the catalog has sites)
pub fn calculated_observations (region: &Region, sites: &[HotspotSite], anomaly: f64, now: DateTime<Utc>)->Vec<MethaneObservation> {
    let mut obs: Vec<MethaneObservation> = sites.iter().map( |site| {
        let ppb = estimate_concentration( anomaly, site.multiplier);
        let ds = DataSource::new( SourceKind::Calculated, MODEL_PROVENANCE, CALCULATED_METHANE_CONFIDENCE, now, "computed per request");
        MethaneObservation::new( &site.id, &region.id, &site.name, site.location, ppb, ds)
    }).collect();

    sort_by_concentration( &mut obs);

    if obs.iter().any( |o| o.risk_tier() > MethaneRiskTier::Low) {
        obs.retain( |o| o.risk_tier() > MethaneRiskTier::Low);
    }
    obs
}

/* #endregion hotspot catalog */

/* #region granule search *****************************************************************************************/

/// a satellite data product covering (part of) a region
#[derive(Debug,Clone,PartialEq)]
pub struct Granule {
    pub id: String,
    pub title: String,
    pub collection: String,
    pub time_start: DateTime<Utc>,
    pub bbox: Option<GeoRect>,
    pub methane_ppb: Option<f64>,
}

#[async_trait]
pub trait GranuleSource: Send + Sync {
    fn provenance (&self)->&str;
    fn latency (&self)->&str;

    async fn search (&self, bbox: &GeoRect, start: DateTime<Utc>, end: DateTime<Utc>)->std::result::Result<Vec<Granule>,ThawNetError>;
}

#[derive(Deserialize,Debug)]
pub struct CmrResponse {
    pub feed: CmrFeed
}

#[derive(Deserialize,Debug)]
pub struct CmrFeed {
    #[serde(default)]
    pub entry: Vec<CmrEntry>
}

#[derive(Deserialize,Debug)]
pub struct CmrEntry {
    pub id: String,
    pub title: String,
    pub time_start: String,
    #[serde(default)]
    pub boxes: Vec<String>, // "S W N E"

    /// column averaged CH4 mixing ratio if the granule record carries one (only summary products do)
    #[serde(default, alias="xch4")]
    pub methane_mixing_ratio_ppb: Option<f64>,
}

impl CmrResponse {
    pub fn into_granules (self, collection: &str)->std::result::Result<Vec<Granule>,ThawNetError> {
        let mut granules = Vec::with_capacity( self.feed.entry.len());
        for e in self.feed.entry {
            let time_start = DateTime::parse_from_rfc3339( &e.time_start)
                .map_err( |err| ThawNetError::ParseError( format!("invalid time_start '{}' of granule {}: {}", e.time_start, e.id, err)))?
                .to_utc();
            let bbox = e.boxes.first().and_then( |b| GeoRect::from_snwe_str(b));

            granules.push( Granule {
                id: e.id,
                title: e.title,
                collection: collection.to_string(),
                time_start,
                bbox,
                methane_ppb: e.methane_mixing_ratio_ppb.filter( |v| v.is_finite() && *v > 0.0)
            });
        }
        Ok(granules)
    }
}

pub struct CmrGranuleSource {
    client: Client,
    base_url: String,
    collection: String,
    page_size: usize,
}

impl CmrGranuleSource {
    pub fn new (client: Client, base_url: impl ToString, collection: impl ToString, page_size: usize)->Self {
        CmrGranuleSource { client, base_url: base_url.to_string(), collection: collection.to_string(), page_size }
    }
}

#[async_trait]
impl GranuleSource for CmrGranuleSource {
    fn provenance (&self)->&str { "Sentinel-5P TROPOMI CH4 (NASA Earthdata CMR)" }
    fn latency (&self)->&str { "per overpass, ~3h near-real-time" }

    async fn search (&self, bbox: &GeoRect, start: DateTime<Utc>, end: DateTime<Utc>)->std::result::Result<Vec<Granule>,ThawNetError> {
        let query = [
            ("short_name", self.collection.clone()),
            ("bounding_box", bbox.to_wsen_string()),
            ("temporal", format!("{},{}", short_utc_datetime_string(&start), short_utc_datetime_string(&end))),
            ("sort_key", "-start_date".to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        let response: CmrResponse = net::get_json( &self.client, &self.base_url, &query).await?;
        response.into_granules( &self.collection)
    }
}

/* #endregion granule search */

/// what the methane provider hands to the resolver
#[derive(Debug,Clone)]
pub struct MethaneAcquisition {
    /// catalog based estimates, always present if the catalog has sites for the region
    pub calculated: Vec<MethaneObservation>,

    /// satellite backed observations
    pub measured: Acquisition<Vec<MethaneObservation>>,

    /// the lookback window (days) that produced `measured` values
    pub lookback_days: Option<u32>,
}

pub struct MethaneProvider {
    source: Arc<dyn GranuleSource>,
    catalog: HotspotCatalog,
    lookback_days: Vec<u32>, // primary first, then retries
}

impl MethaneProvider {
    pub fn new (source: Arc<dyn GranuleSource>, catalog: HotspotCatalog, lookback_days: Vec<u32>)->Self {
        MethaneProvider { source, catalog, lookback_days }
    }

    /// get catalog estimates for the given (already resolved) temperature anomaly and look for real
    /// granule measurements. Each lookback window is bounded by the context timeout
    pub async fn acquire (&self, region: &Region, anomaly: f64, ctx: &AcquisitionContext)->MethaneAcquisition {
        let calculated = calculated_observations( region, self.catalog.sites_for( &region.id), anomaly, ctx.now);
        let mut n_without_values = 0;
        let mut n_responses = 0;
        let mut last_failure: Option<(FailureCause,String)> = None;

        for days in &self.lookback_days {
            let days = *days;
            let what = format!("granule search for {} ({} days)", region.id, days);
            let start = days_before( &ctx.now, days);

            let measured = with_timeout( ctx, &what, async {
                debug!("{what}: {}", region.bbox.to_wsen_string());
                match self.source.search( &region.bbox, start, ctx.now).await {
                    Ok(granules) => Acquisition::Live( granules),
                    Err(e) => {
                        if e.is_contract_violation() {
                            error!("{what} returned malformed data: {e}");
                        } else {
                            debug!("{what} failed: {e}");
                        }
                        Acquisition::from_net_error( &e)
                    }
                }
            }).await;

            match measured {
                Acquisition::Live(granules) | Acquisition::LowConfidence(granules,_) => {
                    let in_window: Vec<&Granule> = granules.iter()
                        .filter( |g| is_between_inclusive( &g.time_start, &start, &ctx.now))
                        .collect();
                    let obs = self.granule_observations( region, &in_window);
                    if !obs.is_empty() {
                        return MethaneAcquisition { calculated, measured: Acquisition::Live(obs), lookback_days: Some(days) }
                    }
                    n_responses += 1;
                    n_without_values = in_window.len();
                    // nothing usable in this window - try the next one
                }
                Acquisition::Unavailable{cause: FailureCause::Contract, reason} => {
                    // a malformed response does not get better with a longer window
                    return MethaneAcquisition { calculated, measured: Acquisition::unavailable( FailureCause::Contract, reason), lookback_days: None }
                }
                Acquisition::Unavailable{cause,reason} => {
                    last_failure = Some((cause,reason));
                }
            }
        }

        if n_responses == 0 {
            if let Some((cause,reason)) = last_failure {
                return MethaneAcquisition { calculated, measured: Acquisition::Unavailable{cause,reason}, lookback_days: None }
            }
        }

        let max_days = self.lookback_days.iter().max().copied().unwrap_or(0);
        let reason = if n_without_values > 0 {
            format!("{} granules in last {} days carry no methane values", n_without_values, max_days)
        } else {
            format!("no satellite granule in last {} days", max_days)
        };
        MethaneAcquisition { calculated, measured: Acquisition::unavailable( FailureCause::NoData, reason), lookback_days: None }
    }

    fn granule_observations (&self, region: &Region, granules: &[&Granule])->Vec<MethaneObservation> {
        let mut obs: Vec<MethaneObservation> = granules.iter().filter_map( |g| {
            g.methane_ppb.map( |ppb| {
                let footprint = g.bbox.and_then( |b| b.intersection( &region.bbox));
                let location = footprint.map( |b| b.center()).unwrap_or( region.center);
                let ds = DataSource::new( SourceKind::RealMeasurement, self.source.provenance(), REAL_METHANE_CONFIDENCE, g.time_start, self.source.latency());
                let name = format!("Sentinel-5P overpass {}", short_utc_datetime_string( &g.time_start));
                let meta = GranuleMetadata {
                    granule_id: g.id.clone(),
                    title: g.title.clone(),
                    collection: g.collection.clone(),
                    time_start: g.time_start
                };

                MethaneObservation::new( &g.id, &region.id, name, location, round_to(ppb, 1), ds).with_granule( footprint, meta)
            })
        }).collect();

        sort_by_concentration( &mut obs);
        obs
    }
}
