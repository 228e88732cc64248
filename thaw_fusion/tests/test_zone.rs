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

use chrono::{DateTime,Utc};
use thaw_common::geo::GeoPoint;
use thaw_fusion::{
    methane::{calculated_observations, HotspotCatalog, MethaneAcquisition, MethaneObservation, MethaneRiskTier},
    provenance::{Acquisition, DataSource, FailureCause, SourceKind},
    region::{Region, RegionRegistry},
    resolver::{resolve_methane, resolve_temperature},
    risk::{score_region, RiskLevel},
    temperature::{TemperatureReading, ARCTIC_BASELINE_C},
    zone::*,
};

fn now ()->DateTime<Utc> { "2025-06-15T00:00:00Z".parse().unwrap() }

fn zone_for (region: &Region, temp: Acquisition<TemperatureReading>, measured: Acquisition<Vec<MethaneObservation>>)->PrecisionZone {
    let temperature = resolve_temperature( region, &temp, now());
    let catalog = HotspotCatalog::arctic();
    let acq = MethaneAcquisition {
        calculated: calculated_observations( region, catalog.sites_for( &region.id), temperature.anomaly, now()),
        measured,
        lookback_days: Some(7)
    };
    let methane = resolve_methane( region, &acq, &temperature, now());
    let risk = score_region( region, &temperature, &methane, now());
    assemble_zone( region, &temperature, &methane, &risk)
}

// run with "cargo test test_all_providers_down -- --nocapture"

#[test]
fn test_all_providers_down() {
    for region in RegionRegistry::arctic().iter() {
        let zone = zone_for( region,
            Acquisition::unavailable( FailureCause::Transport, "connection refused"),
            Acquisition::unavailable( FailureCause::Timeout, "timed out after 15s"));
        println!("{:>12}: {} {} - {}", zone.region_id, zone.risk_level, zone.risk_score, zone.rationale);

        assert_eq!( zone.region_id, region.id);
        assert!( zone.using_fallback);
        assert!( !zone.rationale.is_empty());
        assert_eq!( zone.rationale.split("; ").count(), 2);
        assert_eq!( zone.temperature.data_source.kind, SourceKind::Estimated);
        assert_eq!( zone.methane.data_source.kind, SourceKind::Calculated);
        assert!( zone.methane.based_on.is_some());
        assert_eq!( zone.temperature.anomaly, region.baseline.anomaly);
    }
}

#[test]
fn test_alaska_fallback_zone() {
    let alaska = RegionRegistry::arctic().get("alaska").unwrap();
    let zone = zone_for( alaska,
        Acquisition::unavailable( FailureCause::Transport, "connection refused"),
        Acquisition::unavailable( FailureCause::NoData, "no satellite granule in last 30 days"));
    println!("{}", serde_json::to_string_pretty(&zone).unwrap());

    // baseline 13.2°C -> Prudhoe Bay at 2043.4 ppb, geo risk -> 40 + 40 + 15
    assert_eq!( zone.risk_score, 95);
    assert_eq!( zone.risk_level, RiskLevel::Critical);
    assert_eq!( zone.methane.concentration, 2043.4);
    assert_eq!( zone.methane.concentration, zone.risk.factors.methane_ppb);
    assert_eq!( zone.methane.risk_tier, MethaneRiskTier::High);
    assert_eq!( zone.methane.unit, "ppb");
    assert_eq!( zone.coordinates, GeoPoint::from_lat_lon_degrees( 70.25, -148.34));
    assert_eq!( zone.observation.as_ref().map( |o| o.name.as_str()), Some("Prudhoe Bay Thermokarst"));

    let json = serde_json::to_value(&zone).unwrap();
    assert_eq!( json["methane"]["dataSource"]["type"], "CALCULATED");
    assert_eq!( json["methane"]["basedOn"]["temperatureAnomaly"], 13.2);
    assert_eq!( json["usingFallback"], true);
}

#[test]
fn test_live_zone() {
    let alaska = RegionRegistry::arctic().get("alaska").unwrap();
    let reading = TemperatureReading {
        current: ARCTIC_BASELINE_C + 11.0, anomaly: 11.0, max: 16.0, min: -40.0, n_samples: 1827,
        provenance: "NASA POWER daily T2M".to_string(), latency: "daily".to_string()
    };
    let ds = DataSource::new( SourceKind::RealMeasurement, "Sentinel-5P TROPOMI CH4", 90, now(), "3h");
    let loc = GeoPoint::from_lat_lon_degrees( 70.4, -149.0);
    let obs = MethaneObservation::new( "G42", "alaska", "overpass", loc, 2100.0, ds);

    let zone = zone_for( alaska, Acquisition::Live(reading), Acquisition::Live( vec![obs]));
    println!("{}", serde_json::to_string_pretty(&zone).unwrap());

    assert!( !zone.using_fallback);
    assert!( zone.has_real_temperature());
    assert!( zone.has_real_methane());
    assert_eq!( zone.coordinates, loc);
    assert_eq!( zone.methane.concentration, 2100.0);
    assert_eq!( zone.risk_score, 95);
    assert_eq!( zone.risk_level, RiskLevel::Critical);
    assert!( zone.methane.based_on.is_none());
}
