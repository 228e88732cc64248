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
use thaw_fusion::{
    provenance::{Acquisition, SourceKind},
    region::RegionRegistry,
    resolver::{resolve_methane, resolve_temperature},
    methane::{calculated_observations, HotspotCatalog, MethaneAcquisition},
    risk::*,
    temperature::TemperatureReading,
};

// run with "cargo test test_score_bands -- --nocapture"

#[test]
fn test_score_bands() {
    // strict greater-than at every band boundary
    assert_eq!( temperature_points( 10.0), 25);
    assert_eq!( temperature_points( 10.01), 40);
    assert_eq!( temperature_points( 5.0), 15);
    assert_eq!( temperature_points( 2.0), 0);
    assert_eq!( temperature_points( -3.0), 0);
    assert_eq!( temperature_points( f64::NAN), 0);

    assert_eq!( methane_points( 2000.0), 25);
    assert_eq!( methane_points( 2000.1), 40);
    assert_eq!( methane_points( 1900.0), 15);
    assert_eq!( methane_points( 1850.0), 0);
    assert_eq!( methane_points( 1850.1), 15);

    assert_eq!( geographic_points( true), 15);
    assert_eq!( geographic_points( false), 0);
}

#[test]
fn test_risk_levels() {
    let score = risk_score( 11.0, 2100.0, true);
    println!("11°C, 2100 ppb, geo risk -> {score}");
    assert_eq!( score, 95);
    assert_eq!( RiskLevel::from_score( score), RiskLevel::Critical);

    assert_eq!( RiskLevel::from_score( 70), RiskLevel::Critical);
    assert_eq!( RiskLevel::from_score( 69), RiskLevel::High);
    assert_eq!( RiskLevel::from_score( 50), RiskLevel::High);
    assert_eq!( RiskLevel::from_score( 49), RiskLevel::Medium);
    assert_eq!( RiskLevel::from_score( 30), RiskLevel::Medium);
    assert_eq!( RiskLevel::from_score( 29), RiskLevel::Low);
    assert_eq!( RiskLevel::from_score( 0), RiskLevel::Low);

    assert_eq!( risk_score( 0.0, 1800.0, false), 0);
    assert_eq!( risk_score( 3.0, 1860.0, false), 30);

    // same inputs, same outputs
    assert_eq!( risk_score( 6.3, 1933.2, true), risk_score( 6.3, 1933.2, true));

    assert_eq!( serde_json::to_string( &RiskLevel::Critical).unwrap(), "\"CRITICAL\"");
}

#[test]
fn test_score_region() {
    let now: DateTime<Utc> = "2025-06-15T00:00:00Z".parse().unwrap();
    let region = RegionRegistry::arctic().get("siberia").unwrap();

    let reading = TemperatureReading {
        current: -9.0, anomaly: 11.0, max: 19.0, min: -40.0, n_samples: 1800,
        provenance: "test".to_string(), latency: "none".to_string()
    };
    let temperature = resolve_temperature( region, &Acquisition::Live(reading), now);
    assert!( temperature.is_real());

    let catalog = HotspotCatalog::arctic();
    let acq = MethaneAcquisition {
        calculated: calculated_observations( region, catalog.sites_for( &region.id), temperature.anomaly, now),
        measured: Acquisition::Live( vec![]),
        lookback_days: None
    };
    let methane = resolve_methane( region, &acq, &temperature, now);

    let zone = score_region( region, &temperature, &methane, now);
    println!("{}", serde_json::to_string_pretty(&zone).unwrap());

    assert_eq!( zone.factors.methane_ppb, methane.headline().concentration());
    assert_eq!( zone.factors.temperature_anomaly, 11.0);
    assert!( zone.factors.geographic_risk);
    assert_eq!( zone.risk_score, 95); // 1850 + 132 + 60 = 2042 ppb
    assert_eq!( zone.risk_level, RiskLevel::Critical);
    assert_eq!( zone.data_source.kind, SourceKind::Algorithmic);
    assert_eq!( zone.data_source.confidence, 80);
}

#[test]
fn test_geographic_flag_crosses_levels() {
    // (anomaly, ppb, score without flag, score with flag)
    let cases = [
        (11.0, 1860.0, 55, 70),
        (6.0, 1800.0, 25, 40),
        (3.0, 1860.0, 30, 45),
    ];
    for (anomaly, ppb, without, with) in cases {
        let s0 = risk_score( anomaly, ppb, false);
        let s1 = risk_score( anomaly, ppb, true);
        println!("{anomaly}°C, {ppb} ppb: {s0} ({}) -> {s1} ({})", RiskLevel::from_score(s0), RiskLevel::from_score(s1));
        assert_eq!( s0, without);
        assert_eq!( s1, with);
    }

    assert_eq!( RiskLevel::from_score( risk_score( 11.0, 1860.0, false)), RiskLevel::High);
    assert_eq!( RiskLevel::from_score( risk_score( 11.0, 1860.0, true)), RiskLevel::Critical);
    assert_eq!( RiskLevel::from_score( risk_score( 6.0, 1800.0, false)), RiskLevel::Low);
    assert_eq!( RiskLevel::from_score( risk_score( 6.0, 1800.0, true)), RiskLevel::Medium);
    assert_eq!( RiskLevel::from_score( risk_score( 3.0, 1860.0, true)), RiskLevel::Medium);
}

#[test]
fn test_score_region_geographic_flag() {
    let now: DateTime<Utc> = "2025-06-15T00:00:00Z".parse().unwrap();
    let flagged = RegionRegistry::arctic().get("siberia").unwrap().clone();
    assert!( flagged.geographic_risk);
    let mut unflagged = flagged.clone();
    unflagged.geographic_risk = false;

    let reading = TemperatureReading {
        current: -9.0, anomaly: 11.0, max: 19.0, min: -40.0, n_samples: 1800,
        provenance: "test".to_string(), latency: "none".to_string()
    };
    let temperature = resolve_temperature( &flagged, &Acquisition::Live(reading), now);

    let catalog = HotspotCatalog::arctic();
    let acq = MethaneAcquisition {
        calculated: calculated_observations( &flagged, catalog.sites_for( &flagged.id), temperature.anomaly, now),
        measured: Acquisition::Live( vec![]),
        lookback_days: None
    };
    let methane = resolve_methane( &flagged, &acq, &temperature, now);

    let with_flag = score_region( &flagged, &temperature, &methane, now);
    let without_flag = score_region( &unflagged, &temperature, &methane, now);
    println!("siberia: {} with geographic risk, {} without", with_flag.risk_score, without_flag.risk_score);

    assert!( !without_flag.factors.geographic_risk);
    assert_eq!( with_flag.factors.methane_ppb, without_flag.factors.methane_ppb);
    assert_eq!( with_flag.risk_score, without_flag.risk_score + 15);
    assert_eq!( without_flag.risk_score, 80);
    assert_eq!( without_flag.risk_level, RiskLevel::Critical);
}
