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

use std::fmt;
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};
use thaw_common::geo::GeoPoint;

use crate::{
    provenance::{DataSource, SourceKind, RISK_CONFIDENCE},
    region::Region,
    resolver::{ResolvedMethane, TemperatureSignal},
};

pub const RISK_MODEL_PROVENANCE: &str = "Multi-factor permafrost risk model (temperature, methane, geography)";

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[serde(rename_all="UPPERCASE")]
pub enum RiskLevel { Low, Medium, High, Critical }

impl RiskLevel {
    pub fn from_score (score: u8)->RiskLevel {
        if score >= 70 {
            RiskLevel::Critical
        } else if score >= 50 {
            RiskLevel::High
        } else if score >= 30 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

// all bands use strict greater-than. NaN input yields 0 points

pub fn temperature_points (anomaly: f64)->u8 {
    if anomaly > 10.0 { 40 } else if anomaly > 5.0 { 25 } else if anomaly > 2.0 { 15 } else { 0 }
}

pub fn methane_points (ppb: f64)->u8 {
    if ppb > 2000.0 { 40 } else if ppb > 1900.0 { 25 } else if ppb > 1850.0 { 15 } else { 0 }
}

pub fn geographic_points (geographic_risk: bool)->u8 {
    if geographic_risk { 15 } else { 0 }
}

pub fn risk_score (anomaly: f64, ppb: f64, geographic_risk: bool)->u8 {
    let sum = temperature_points(anomaly) as u32 + methane_points(ppb) as u32 + geographic_points(geographic_risk) as u32;
    sum.min(100) as u8
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct RiskFactors {
    pub temperature_anomaly: f64,
    pub methane_ppb: f64,
    pub geographic_risk: bool,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct RiskZone {
    pub coordinates: GeoPoint,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub factors: RiskFactors,
    pub data_source: DataSource,
}

/// score a region from its resolved signals. The methane number is the resolver's headline so that
/// score and displayed concentration cannot diverge
pub fn score_region (region: &Region, temperature: &TemperatureSignal, methane: &ResolvedMethane, now: DateTime<Utc>)->RiskZone {
    let headline = methane.headline();
    let factors = RiskFactors {
        temperature_anomaly: temperature.anomaly,
        methane_ppb: headline.concentration(),
        geographic_risk: region.geographic_risk,
    };
    let risk_score = risk_score( factors.temperature_anomaly, factors.methane_ppb, factors.geographic_risk);

    RiskZone {
        coordinates: headline.coordinates,
        risk_level: RiskLevel::from_score( risk_score),
        risk_score,
        factors,
        data_source: DataSource::new( SourceKind::Algorithmic, RISK_MODEL_PROVENANCE, RISK_CONFIDENCE, now, "computed per request")
    }
}
