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

#![allow(unused)]

use std::{collections::HashMap, sync::Arc, time::Duration};
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use chrono::{DateTime,NaiveDate,TimeDelta,Utc};
use http::{header, Request, StatusCode};
use tower::ServiceExt;
use thaw_common::{geo::{GeoPoint,GeoRect}, net::ThawNetError};
use thaw_fusion::{
    dashboard::Dashboard,
    dashboard_service::router,
    errors::ThawFusionError,
    methane::{Granule, GranuleSource, HotspotCatalog, MethaneProvider},
    provenance::{FailureCause, SourceKind},
    region::{Region, RegionRegistry},
    risk::RiskLevel,
    temperature::{ClimateSource, TemperatureProvider},
};

fn now ()->DateTime<Utc> { "2025-06-15T00:00:00Z".parse().unwrap() }

#[derive(Clone)]
enum Reply { Samples(Vec<f64>), Granules(Vec<Granule>), Transport, Malformed, Hang }

impl Reply {
    async fn get<T> (&self, f: impl FnOnce(&Reply)->Option<T>)->Result<T,ThawNetError> {
        match self {
            Reply::Transport => Err( ThawNetError::NotFoundError("service unavailable".to_string())),
            Reply::Malformed => Err( ThawNetError::ParseError("unexpected response format".to_string())),
            Reply::Hang => {
                tokio::time::sleep( Duration::from_secs(30)).await;
                Err( ThawNetError::NotFoundError("late".to_string()))
            }
            other => f(other).ok_or_else( || ThawNetError::ParseError("wrong mock reply".to_string()))
        }
    }
}

/// canned per-region replies, looked up by region center (temperature) or bbox (granules)
struct MockSource {
    replies: HashMap<String,Reply>,
    default: Reply,
}

impl MockSource {
    fn new (default: Reply)->Self { MockSource { replies: HashMap::new(), default } }

    fn with (mut self, region_id: &str, reply: Reply)->Self {
        self.replies.insert( region_id.to_string(), reply);
        self
    }

    fn reply_for (&self, pred: impl Fn(&Region)->bool)->&Reply {
        RegionRegistry::arctic().iter()
            .find( |r| pred(r))
            .and_then( |r| self.replies.get( &r.id))
            .unwrap_or( &self.default)
    }
}

#[async_trait]
impl ClimateSource for MockSource {
    fn provenance (&self)->&str { "mock POWER" }
    fn latency (&self)->&str { "none" }

    async fn daily_temperatures (&self, location: &GeoPoint, _start: NaiveDate, _end: NaiveDate)->Result<Vec<f64>,ThawNetError> {
        self.reply_for( |r| r.center == *location).get( |r| if let Reply::Samples(v) = r { Some(v.clone()) } else { None }).await
    }
}

#[async_trait]
impl GranuleSource for MockSource {
    fn provenance (&self)->&str { "mock CMR" }
    fn latency (&self)->&str { "none" }

    async fn search (&self, bbox: &GeoRect, _start: DateTime<Utc>, _end: DateTime<Utc>)->Result<Vec<Granule>,ThawNetError> {
        self.reply_for( |r| r.bbox == *bbox).get( |r| if let Reply::Granules(v) = r { Some(v.clone()) } else { None }).await
    }
}

fn dashboard (climate: MockSource, granules: MockSource)->Dashboard {
    Dashboard::new(
        RegionRegistry::arctic().clone(),
        TemperatureProvider::new( Arc::new(climate)),
        MethaneProvider::new( Arc::new(granules), HotspotCatalog::arctic(), vec![7, 30]),
        Duration::from_millis(200)
    )
}

fn alaska_granule (ppb: f64)->Granule {
    Granule {
        id: "G3151234567-GES_DISC".to_string(),
        title: "S5P_OFFL_L2__CH4____20250614".to_string(),
        collection: "S5P_L2__CH4____HiR".to_string(),
        time_start: now() - TimeDelta::days(1),
        bbox: GeoRect::from_snwe_str("69 -152 72 -145"),
        methane_ppb: Some(ppb),
    }
}

fn live_dashboard ()->Dashboard {
    // all regions at anomaly 12°C, only alaska has a satellite measurement
    dashboard(
        MockSource::new( Reply::Samples( vec![-8.0; 365])),
        MockSource::new( Reply::Granules( vec![])).with( "alaska", Reply::Granules( vec![ alaska_granule( 2100.0)]))
    )
}

// run with "cargo test test_live_aggregation -- --nocapture"

#[tokio::test]
async fn test_live_aggregation() {
    let response = live_dashboard().aggregate_at( now()).await;
    println!("{}", serde_json::to_string_pretty(&response).unwrap());

    let summary = &response.summary;
    assert_eq!( response.zones.len(), 5);
    assert_eq!( summary.coverage.total_regions, 5);
    assert_eq!( summary.coverage.regions_with_real_temperature, 5);
    assert_eq!( summary.coverage.regions_with_real_methane, 1);
    assert_eq!( summary.coverage.fallback_regions, 4);
    assert_eq!( summary.coverage.regions_with_real_methane + summary.coverage.fallback_regions, summary.coverage.total_regions);

    assert_eq!( summary.confidence.temperature, 95);
    assert_eq!( summary.confidence.methane, 90);
    assert_eq!( summary.confidence.risk_level, 80);
    assert_eq!( summary.confidence.overall, 88);

    // alaska 2100 ppb, siberia Yamal Crater Field 2054 ppb
    assert_eq!( summary.severe_observations, 2);
    assert!( response.diagnostics.is_empty());
    assert_eq!( response.timestamp, now());

    let alaska = response.zones.iter().find( |z| z.region_id == "alaska").unwrap();
    assert_eq!( alaska.methane.data_source.kind, SourceKind::RealMeasurement);
    assert_eq!( alaska.risk_score, 95);
    assert_eq!( alaska.risk_level, RiskLevel::Critical);
    assert_eq!( alaska.coordinates, GeoPoint::from_lon_lat_degrees( -148.5, 70.25));

    // per-region lists follow the zones
    assert_eq!( response.temperature.len(), 5);
    assert_eq!( response.methane.len(), 5);
    assert_eq!( response.risk_zones.zones.len(), 5);
    for (i,zone) in response.zones.iter().enumerate() {
        assert_eq!( response.temperature[i].region_id, zone.region_id);
        assert_eq!( response.temperature[i].temperature, zone.temperature);
        assert_eq!( response.methane[i].region_id, zone.region_id);
        assert_eq!( response.methane[i].methane, zone.methane);
        assert_eq!( response.risk_zones.zones[i].region_id, zone.region_id);
        assert_eq!( response.risk_zones.zones[i].zone.risk_score, zone.risk_score);
        assert_eq!( response.risk_zones.zones[i].zone.risk_level, zone.risk_level);
    }

    let n = &response.risk_zones.counts;
    assert_eq!( n.critical + n.high + n.medium + n.low, 5);
    let n_critical = response.zones.iter().filter( |z| z.risk_level == RiskLevel::Critical).count();
    assert_eq!( n.critical, n_critical);

    let json = serde_json::to_value( &response).unwrap();
    for key in ["zones", "temperature", "methane", "riskZones", "summary", "diagnostics", "timestamp"] {
        assert!( json.get(key).is_some(), "missing {key}");
    }
    assert_eq!( json["riskZones"]["zones"].as_array().unwrap().len(), 5);
    assert!( json["riskZones"]["counts"]["critical"].is_u64());
    let alaska_methane = json["methane"].as_array().unwrap().iter().find( |m| m["regionId"] == "alaska").unwrap();
    assert_eq!( alaska_methane["methane"]["dataSource"]["type"], "REAL_MEASUREMENT");
    let alaska_risk = json["riskZones"]["zones"].as_array().unwrap().iter().find( |z| z["regionId"] == "alaska").unwrap();
    assert_eq!( alaska_risk["riskScore"], 95);
    assert!( summary.data_transparency.real_sources.contains( &"mock CMR".to_string()));
    assert!( summary.data_transparency.real_sources.contains( &"mock POWER".to_string()));
}

#[tokio::test]
async fn test_idempotent_aggregation() {
    let dashboard = live_dashboard();
    let a = serde_json::to_string( &dashboard.aggregate_at( now()).await).unwrap();
    let b = serde_json::to_string( &dashboard.aggregate_at( now()).await).unwrap();
    assert_eq!( a, b);
}

#[tokio::test]
async fn test_provider_failures() {
    let dashboard = dashboard(
        MockSource::new( Reply::Transport).with( "canada", Reply::Malformed).with( "greenland", Reply::Hang),
        MockSource::new( Reply::Transport).with( "siberia", Reply::Malformed).with( "scandinavia", Reply::Hang)
    );
    let response = dashboard.aggregate_at( now()).await;
    println!("{}", serde_json::to_string_pretty(&response).unwrap());

    assert_eq!( response.zones.len(), 5);
    for zone in &response.zones {
        assert!( zone.using_fallback);
        assert!( !zone.rationale.is_empty());
        assert_eq!( zone.temperature.data_source.kind, SourceKind::Estimated);
        assert_eq!( zone.methane.data_source.kind, SourceKind::Calculated);
    }

    let coverage = &response.summary.coverage;
    assert_eq!( coverage.regions_with_real_temperature, 0);
    assert_eq!( coverage.regions_with_real_methane, 0);
    assert_eq!( coverage.fallback_regions, 5);
    assert_eq!( response.summary.confidence.temperature, 70);
    assert_eq!( response.summary.confidence.methane, 75);
    assert_eq!( response.summary.confidence.overall, 75);

    // contract failures are surfaced, transport failures and timeouts are not
    assert_eq!( response.diagnostics.len(), 2);
    assert!( response.diagnostics.iter().any( |d| d.region_id == "canada" && d.signal == "temperature"));
    assert!( response.diagnostics.iter().any( |d| d.region_id == "siberia" && d.signal == "methane"));
    assert!( response.diagnostics.iter().all( |d| d.cause == FailureCause::Contract));

    let greenland = response.zones.iter().find( |z| z.region_id == "greenland").unwrap();
    assert!( greenland.rationale.contains("timeout"));

    for summary in &response.methane {
        assert_eq!( summary.methane.data_source.kind, SourceKind::Calculated);
        assert!( summary.methane.based_on.is_some());
    }
}

#[tokio::test]
async fn test_region_zone() {
    let dashboard = live_dashboard();

    let zone = dashboard.region_zone_at( "canada", now()).await.unwrap();
    assert_eq!( zone.region_name, "Mackenzie River Delta");

    let res = dashboard.region_zone_at( "atlantis", now()).await;
    assert!( matches!( res, Err(ThawFusionError::UnknownRegion(_))));
}

#[tokio::test]
async fn test_dashboard_routes() {
    let app = router( Arc::new( live_dashboard()));

    let request = Request::builder().uri("/api/permafrost").body( Body::empty()).unwrap();
    let response = app.clone().oneshot( request).await.unwrap();
    assert_eq!( response.status(), StatusCode::OK);
    assert_eq!( response.headers().get( header::CACHE_CONTROL).unwrap(), "no-store");
    let bytes = to_bytes( response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice( &bytes).unwrap();
    assert_eq!( json["zones"].as_array().unwrap().len(), 5);
    assert_eq!( json["summary"]["coverage"]["totalRegions"], 5);

    let request = Request::builder().uri("/api/permafrost/siberia").body( Body::empty()).unwrap();
    let response = app.clone().oneshot( request).await.unwrap();
    assert_eq!( response.status(), StatusCode::OK);
    let bytes = to_bytes( response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice( &bytes).unwrap();
    assert_eq!( json["regionId"], "siberia");

    let request = Request::builder().uri("/api/permafrost/atlantis").body( Body::empty()).unwrap();
    let response = app.oneshot( request).await.unwrap();
    assert_eq!( response.status(), StatusCode::NOT_FOUND);
    let bytes = to_bytes( response.into_body(), usize::MAX).await.unwrap();
    println!("unknown region: {}", String::from_utf8_lossy( &bytes));
}
