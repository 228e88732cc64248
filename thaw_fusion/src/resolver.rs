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

//! decide per signal and region whether to use live or fallback values. Everything in here is a
//! pure function of provider results, region parameters and the pass timestamp

use std::cmp::Ordering;
use chrono::{DateTime,Utc};
use serde::Serialize;
use tracing::warn;

use crate::{
    methane::{estimate_concentration, MethaneAcquisition, MethaneObservation, MODEL_PROVENANCE},
    provenance::{
        Acquisition, DataSource, SourceKind,
        BASELINE_TEMPERATURE_CONFIDENCE, CALCULATED_METHANE_CONFIDENCE, LIVE_TEMPERATURE_CONFIDENCE
    },
    region::Region,
    temperature::TemperatureReading,
};

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct DataIntegrity {
    pub using_fallback: bool,
    pub rationale: String,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct TemperatureSignal {
    pub current: f64,
    pub anomaly: f64,
    pub max: f64,
    pub min: f64,
    pub data_source: DataSource,
    pub data_integrity: DataIntegrity,
}

impl TemperatureSignal {
    pub fn is_real (&self)->bool { self.data_source.is_real() }
    pub fn using_fallback (&self)->bool { self.data_integrity.using_fallback }
    pub fn rationale (&self)->&str { &self.data_integrity.rationale }
}

fn baseline_signal (region: &Region, reason: String, now: DateTime<Utc>)->TemperatureSignal {
    warn!("using temperature baseline for {}: {}", region.id, reason);

    let b = &region.baseline;
    let provenance = format!("validated regional baseline ({})", region.name);
    let rationale = format!("{reason}, using validated baseline anomaly {:.1}°C", b.anomaly);

    TemperatureSignal {
        current: b.current,
        anomaly: b.anomaly,
        max: b.max,
        min: b.min,
        data_source: DataSource::new( SourceKind::Estimated, provenance, BASELINE_TEMPERATURE_CONFIDENCE, now, "static"),
        data_integrity: DataIntegrity { using_fallback: true, rationale }
    }
}

/// pick the live temperature reading if it is trustworthy for this region, otherwise the region baseline.
/// A live anomaly equal to the region threshold is trusted
pub fn resolve_temperature (region: &Region, acquisition: &Acquisition<TemperatureReading>, now: DateTime<Utc>)->TemperatureSignal {
    match acquisition {
        Acquisition::Live(r) => {
            if !r.anomaly.is_finite() {
                baseline_signal( region, format!("live anomaly of {} is not a finite number", r.provenance), now)

            } else if r.anomaly < region.min_trusted_anomaly {
                let reason = format!("live anomaly {:.1}°C below trusted minimum {:.1}°C", r.anomaly, region.min_trusted_anomaly);
                baseline_signal( region, reason, now)

            } else {
                let rationale = format!("live {} anomaly {:.1}°C from {} daily samples", r.provenance, r.anomaly, r.n_samples);
                TemperatureSignal {
                    current: r.current,
                    anomaly: r.anomaly,
                    max: r.max,
                    min: r.min,
                    data_source: DataSource::new( SourceKind::RealMeasurement, &r.provenance, LIVE_TEMPERATURE_CONFIDENCE, now, &r.latency),
                    data_integrity: DataIntegrity { using_fallback: false, rationale }
                }
            }
        }
        Acquisition::LowConfidence(_,reason) => baseline_signal( region, format!("low confidence live temperature ({reason})"), now),
        Acquisition::Unavailable{cause,reason} => baseline_signal( region, format!("temperature source unavailable ({cause}: {reason})"), now),
    }
}

/// what a methane estimate was derived from
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct MethaneBasis {
    pub temperature_anomaly: f64,
    pub temperature_source: SourceKind,
    pub description: String,
}

impl MethaneBasis {
    pub fn from_signal (temperature: &TemperatureSignal)->Self {
        let kind = temperature.data_source.kind;
        MethaneBasis {
            temperature_anomaly: temperature.anomaly,
            temperature_source: kind,
            description: format!("temperature anomaly {:.1}°C ({kind})", temperature.anomaly)
        }
    }
}

/// the resolved methane signal of a region. This always holds at least one observation
#[derive(Debug,Clone,PartialEq)]
pub struct ResolvedMethane {
    observations: Vec<MethaneObservation>,
    headline_idx: usize,
    regional_estimate: bool,
    based_on: Option<MethaneBasis>,
    using_fallback: bool,
    rationale: String,
}

impl ResolvedMethane {
    fn new (observations: Vec<MethaneObservation>, regional_estimate: bool, based_on: Option<MethaneBasis>, using_fallback: bool, rationale: String)->Self {
        let headline_idx = headline_index( &observations);
        ResolvedMethane { observations, headline_idx, regional_estimate, based_on, using_fallback, rationale }
    }

    /// the observation that determines the region's methane number. Real measurements win over
    /// estimates, then the highest concentration
    pub fn headline (&self)->&MethaneObservation { &self.observations[self.headline_idx] }

    pub fn observations (&self)->&[MethaneObservation] { &self.observations }

    /// true if the headline is a synthetic region wide estimate and not a site or granule observation
    pub fn is_regional_estimate (&self)->bool { self.regional_estimate }

    pub fn based_on (&self)->Option<&MethaneBasis> { self.based_on.as_ref() }
    pub fn using_fallback (&self)->bool { self.using_fallback }
    pub fn rationale (&self)->&str { &self.rationale }
    pub fn is_real (&self)->bool { self.headline().is_real() }
}

fn headline_index (obs: &[MethaneObservation])->usize {
    let mut best = 0;
    for (i,o) in obs.iter().enumerate().skip(1) {
        let b = &obs[best];
        let better = match (o.is_real(), b.is_real()) {
            (true,false) => true,
            (false,true) => false,
            _ => o.concentration().partial_cmp( &b.concentration()) == Some(Ordering::Greater)
        };
        if better { best = i }
    }
    best
}

fn regional_estimate (region: &Region, anomaly: f64, now: DateTime<Utc>)->MethaneObservation {
    let ppb = estimate_concentration( anomaly, 1.0);
    let ds = DataSource::new( SourceKind::Calculated, MODEL_PROVENANCE, CALCULATED_METHANE_CONFIDENCE, now, "computed per request");
    MethaneObservation::new( format!("{}-regional", region.id), &region.id, format!("{} regional estimate", region.name), region.center, ppb, ds)
}

/// use real granule observations if there are any, otherwise the temperature driven estimates.
/// The temperature signal has to be the already resolved one so that `basedOn` names what was used
pub fn resolve_methane (region: &Region, acquisition: &MethaneAcquisition, temperature: &TemperatureSignal, now: DateTime<Utc>)->ResolvedMethane {
    let fallback_reason = match &acquisition.measured {
        Acquisition::Live(obs) if !obs.is_empty() => {
            let real: Vec<MethaneObservation> = obs.iter().filter( |o| o.is_real()).cloned().collect();
            if !real.is_empty() {
                let rationale = match acquisition.lookback_days {
                    Some(days) => format!("{} satellite methane observations within last {} days", real.len(), days),
                    None => format!("{} satellite methane observations", real.len())
                };
                return ResolvedMethane::new( real, false, None, false, rationale)
            }
            "satellite observations carry no measured values".to_string()
        }
        Acquisition::Live(_) => "no satellite observations".to_string(),
        Acquisition::LowConfidence(_,reason) => format!("low confidence satellite observations ({reason})"),
        Acquisition::Unavailable{cause,reason} => format!("no real methane measurement ({cause}: {reason})"),
    };

    warn!("using calculated methane for {}: {}", region.id, fallback_reason);

    let basis = MethaneBasis::from_signal( temperature);
    let rationale = format!("{fallback_reason}, estimated from {}", basis.description);

    if acquisition.calculated.is_empty() {
        let obs = regional_estimate( region, temperature.anomaly, now);
        ResolvedMethane::new( vec![obs], true, Some(basis), true, rationale)
    } else {
        ResolvedMethane::new( acquisition.calculated.clone(), false, Some(basis), true, rationale)
    }
}
