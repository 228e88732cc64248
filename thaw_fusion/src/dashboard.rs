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

//! the dashboard aggregator. This runs the per-region pipeline (temperature, methane, score,
//! assemble) for all registered regions concurrently and summarizes the resulting zones

use std::{collections::BTreeSet, time::Duration};
use chrono::{DateTime,Utc};
use serde::Serialize;
use futures::future::join_all;
use tracing::{debug,error,info};
use thaw_common::datetime::{ser_short_rfc3339, utc_now};

use crate::{
    errors::{Result, ThawFusionError},
    methane::{MethaneProvider, HIGH_PPB},
    provenance::{
        Acquisition, AcquisitionContext, FailureCause, SourceKind,
        BASELINE_TEMPERATURE_CONFIDENCE, CALCULATED_METHANE_CONFIDENCE, LIVE_TEMPERATURE_CONFIDENCE,
        REAL_METHANE_CONFIDENCE, RISK_CONFIDENCE
    },
    region::{Region, RegionRegistry},
    resolver::{resolve_methane, resolve_temperature, TemperatureSignal},
    risk::{score_region, RiskLevel, RiskZone, RISK_MODEL_PROVENANCE},
    temperature::TemperatureProvider,
    zone::{assemble_zone, MethaneSummary, PrecisionZone},
};

/// a contract-class provider failure we surface instead of silently falling back
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct Diagnostic {
    pub region_id: String,
    pub signal: String,
    pub cause: FailureCause,
    pub reason: String,
}

#[derive(Serialize,Debug,Clone,Default,PartialEq)]
pub struct RiskCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct RegionTemperature {
    pub region_id: String,
    pub region_name: String,
    pub temperature: TemperatureSignal,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct RegionMethaneSummary {
    pub region_id: String,
    pub region_name: String,
    pub methane: MethaneSummary,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct RegionRiskZone {
    pub region_id: String,
    pub region_name: String,
    #[serde(flatten)]
    pub zone: RiskZone,
}

/// all scored regions of a pass together with their per-level counts
#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct RiskZones {
    pub zones: Vec<RegionRiskZone>,
    pub counts: RiskCounts,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct Coverage {
    pub total_regions: usize,
    pub regions_with_real_temperature: usize,
    pub regions_with_real_methane: usize,
    pub fallback_regions: usize, // regions without real methane
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct ConfidenceSummary {
    pub temperature: u8,
    pub methane: u8,
    pub risk_level: u8,
    pub overall: u8,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct DataTransparency {
    pub real_sources: Vec<String>,
    pub calculated_sources: Vec<String>,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct DashboardSummary {
    pub coverage: Coverage,
    pub confidence: ConfidenceSummary,
    pub data_transparency: DataTransparency,
    pub severe_observations: usize,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct DashboardResponse {
    pub zones: Vec<PrecisionZone>,
    pub temperature: Vec<RegionTemperature>,
    pub methane: Vec<RegionMethaneSummary>,
    pub risk_zones: RiskZones,
    pub summary: DashboardSummary,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(serialize_with="ser_short_rfc3339")]
    pub timestamp: DateTime<Utc>,
}

/// the per-region result of one pass
#[derive(Debug,Clone)]
pub struct RegionOutcome {
    pub zone: PrecisionZone,
    pub severe_observations: usize,
    pub diagnostics: Vec<Diagnostic>,
}

fn diagnostic<T> (region: &Region, signal: &str, acquisition: &Acquisition<T>)->Option<Diagnostic> {
    match acquisition {
        Acquisition::Unavailable{cause: FailureCause::Contract, reason} => {
            error!("contract failure for {} {}: {}", region.id, signal, reason);
            Some( Diagnostic { region_id: region.id.clone(), signal: signal.to_string(), cause: FailureCause::Contract, reason: reason.clone() })
        }
        _ => None
    }
}

pub struct Dashboard {
    registry: RegionRegistry,
    temperature: TemperatureProvider,
    methane: MethaneProvider,
    timeout: Duration,
}

impl Dashboard {
    pub fn new (registry: RegionRegistry, temperature: TemperatureProvider, methane: MethaneProvider, timeout: Duration)->Self {
        Dashboard { registry, temperature, methane, timeout }
    }

    pub fn registry (&self)->&RegionRegistry { &self.registry }

    /// run the full pipeline for a single region. This never fails, provider problems end up as
    /// fallback values with rationale (and diagnostics for contract failures)
    pub async fn region_outcome (&self, region: &Region, ctx: &AcquisitionContext)->RegionOutcome {
        let temp_acq = self.temperature.acquire( region, ctx).await;
        let temperature = resolve_temperature( region, &temp_acq, ctx.now);

        let methane_acq = self.methane.acquire( region, temperature.anomaly, ctx).await;
        let methane = resolve_methane( region, &methane_acq, &temperature, ctx.now);

        let risk = score_region( region, &temperature, &methane, ctx.now);
        let zone = assemble_zone( region, &temperature, &methane, &risk);
        debug!("{}: {} ({}), fallback={}", region.id, zone.risk_level, zone.risk_score, zone.using_fallback);

        let severe_observations = methane.observations().iter().filter( |o| o.concentration() >= HIGH_PPB).count();
        let diagnostics: Vec<Diagnostic> = [
            diagnostic( region, "temperature", &temp_acq),
            diagnostic( region, "methane", &methane_acq.measured)
        ].into_iter().flatten().collect();

        RegionOutcome { zone, severe_observations, diagnostics }
    }

    /// the zone of a single registered region
    pub async fn region_zone_at (&self, region_id: &str, now: DateTime<Utc>)->Result<PrecisionZone> {
        let region = self.registry.get( region_id).ok_or_else( || ThawFusionError::UnknownRegion( region_id.to_string()))?;
        let ctx = AcquisitionContext::new( now, self.timeout);
        Ok( self.region_outcome( region, &ctx).await.zone )
    }

    pub async fn region_zone (&self, region_id: &str)->Result<PrecisionZone> {
        self.region_zone_at( region_id, utc_now()).await
    }

    /// one aggregation pass over all registered regions with the given pass timestamp.
    /// Identical provider responses and `now` produce identical results
    pub async fn aggregate_at (&self, now: DateTime<Utc>)->DashboardResponse {
        let ctx = AcquisitionContext::new( now, self.timeout);
        let outcomes = join_all( self.registry.iter().map( |region| self.region_outcome( region, &ctx))).await;

        let response = summarize( outcomes, now);
        info!("aggregated {} regions: {} critical, {} with fallback methane, {} diagnostics",
              response.summary.coverage.total_regions, response.risk_zones.counts.critical,
              response.summary.coverage.fallback_regions, response.diagnostics.len());
        response
    }

    pub async fn aggregate (&self)->DashboardResponse {
        self.aggregate_at( utc_now()).await
    }
}

pub fn summarize (outcomes: Vec<RegionOutcome>, now: DateTime<Utc>)->DashboardResponse {
    let mut counts = RiskCounts::default();
    let mut n_real_temperature = 0;
    let mut n_real_methane = 0;
    let mut severe_observations = 0;
    let mut real_sources: BTreeSet<String> = BTreeSet::new();
    let mut calculated_sources: BTreeSet<String> = BTreeSet::new();
    let mut zones = Vec::with_capacity( outcomes.len());
    let mut temperatures = Vec::with_capacity( outcomes.len());
    let mut methanes = Vec::with_capacity( outcomes.len());
    let mut risk_zones = Vec::with_capacity( outcomes.len());
    let mut diagnostics = Vec::new();

    for outcome in outcomes {
        let zone = outcome.zone;

        match zone.risk_level {
            RiskLevel::Critical => counts.critical += 1,
            RiskLevel::High => counts.high += 1,
            RiskLevel::Medium => counts.medium += 1,
            RiskLevel::Low => counts.low += 1,
        }
        if zone.has_real_temperature() { n_real_temperature += 1 }
        if zone.has_real_methane() { n_real_methane += 1 }
        severe_observations += outcome.severe_observations;

        for ds in [&zone.temperature.data_source, &zone.methane.data_source] {
            if ds.kind == SourceKind::RealMeasurement {
                real_sources.insert( ds.provenance.clone());
            } else {
                calculated_sources.insert( ds.provenance.clone());
            }
        }

        let region_id = zone.region_id.clone();
        let region_name = zone.region_name.clone();
        temperatures.push( RegionTemperature { region_id: region_id.clone(), region_name: region_name.clone(), temperature: zone.temperature.clone() });
        methanes.push( RegionMethaneSummary { region_id: region_id.clone(), region_name: region_name.clone(), methane: zone.methane.clone() });
        risk_zones.push( RegionRiskZone { region_id, region_name, zone: zone.risk.clone() });

        diagnostics.extend( outcome.diagnostics);
        zones.push( zone);
    }
    if !zones.is_empty() {
        calculated_sources.insert( RISK_MODEL_PROVENANCE.to_string());
    }

    let total_regions = zones.len();
    let temperature = if n_real_temperature > 0 { LIVE_TEMPERATURE_CONFIDENCE } else { BASELINE_TEMPERATURE_CONFIDENCE };
    let methane = if n_real_methane > 0 { REAL_METHANE_CONFIDENCE } else { CALCULATED_METHANE_CONFIDENCE };
    let overall = ((temperature as f64 + methane as f64 + RISK_CONFIDENCE as f64) / 3.0).round() as u8;

    DashboardResponse {
        zones,
        temperature: temperatures,
        methane: methanes,
        risk_zones: RiskZones { zones: risk_zones, counts },
        summary: DashboardSummary {
            coverage: Coverage {
                total_regions,
                regions_with_real_temperature: n_real_temperature,
                regions_with_real_methane: n_real_methane,
                fallback_regions: total_regions - n_real_methane,
            },
            confidence: ConfidenceSummary { temperature, methane, risk_level: RISK_CONFIDENCE, overall },
            data_transparency: DataTransparency {
                real_sources: real_sources.into_iter().collect(),
                calculated_sources: calculated_sources.into_iter().collect(),
            },
            severe_observations,
        },
        diagnostics,
        timestamp: now,
    }
}
