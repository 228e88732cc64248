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

use chrono::{DateTime,Utc};
use serde::Serialize;
use thaw_common::{datetime::ser_short_rfc3339, geo::GeoPoint};

use crate::{
    methane::{MethaneObservation, MethaneRiskTier, METHANE_UNIT},
    provenance::DataSource,
    region::Region,
    resolver::{MethaneBasis, ResolvedMethane, TemperatureSignal},
    risk::{RiskLevel, RiskZone},
};

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct MethaneSummary {
    pub concentration: f64,
    pub unit: &'static str,
    pub data_source: DataSource,
    pub risk_tier: MethaneRiskTier,
    #[serde(serialize_with="ser_short_rfc3339")]
    pub last_observation: DateTime<Utc>,

    #[serde(skip_serializing_if="thaw_common::is_none")]
    pub based_on: Option<MethaneBasis>,
}

/// the fused per-region record we hand out. Built fresh on each pass and never modified afterwards
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct PrecisionZone {
    pub zone_id: String,
    pub region_id: String,
    pub region_name: String,
    pub label: String,
    pub coordinates: GeoPoint,
    pub temperature: TemperatureSignal,
    pub methane: MethaneSummary,

    #[serde(skip_serializing_if="thaw_common::is_none")]
    pub observation: Option<MethaneObservation>,

    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub risk: RiskZone,
    pub using_fallback: bool,
    pub rationale: String,
}

impl PrecisionZone {
    pub fn has_real_temperature (&self)->bool { self.temperature.is_real() }
    pub fn has_real_methane (&self)->bool { self.methane.data_source.is_real() }
}

pub fn assemble_zone (region: &Region, temperature: &TemperatureSignal, methane: &ResolvedMethane, risk: &RiskZone)->PrecisionZone {
    let headline = methane.headline();

    let observation = if methane.is_regional_estimate() { None } else { Some( headline.clone()) };
    let coordinates = observation.as_ref().map( |o| o.coordinates).unwrap_or( region.center);

    let summary = MethaneSummary {
        concentration: headline.concentration(),
        unit: METHANE_UNIT,
        data_source: headline.data_source.clone(),
        risk_tier: headline.risk_tier(),
        last_observation: headline.data_source.last_update,
        based_on: methane.based_on().cloned(),
    };

    let using_fallback = temperature.using_fallback() || methane.using_fallback();
    let rationale = if using_fallback {
        let mut parts: Vec<&str> = Vec::with_capacity(2);
        if temperature.using_fallback() { parts.push( temperature.rationale()) }
        if methane.using_fallback() { parts.push( methane.rationale()) }
        parts.join("; ")
    } else {
        format!("{}; {}", temperature.rationale(), methane.rationale())
    };

    PrecisionZone {
        zone_id: format!("pz-{}", region.id),
        region_id: region.id.clone(),
        region_name: region.name.clone(),
        label: format!("{} ({} risk)", region.name, risk.risk_level),
        coordinates,
        temperature: temperature.clone(),
        methane: summary,
        observation,
        risk_level: risk.risk_level,
        risk_score: risk.risk_score,
        risk: risk.clone(),
        using_fallback,
        rationale,
    }
}
