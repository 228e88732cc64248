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

//! provenance tags that travel with every value we expose, and the tagged acquisition result
//! signal providers report back to the resolver

use std::{fmt, future::Future, time::Duration};
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};
use tracing::warn;
use thaw_common::{datetime::ser_short_rfc3339, net::ThawNetError};

pub const LIVE_TEMPERATURE_CONFIDENCE: u8 = 95;
pub const BASELINE_TEMPERATURE_CONFIDENCE: u8 = 70;
pub const REAL_METHANE_CONFIDENCE: u8 = 90;
pub const CALCULATED_METHANE_CONFIDENCE: u8 = 75;
pub const RISK_CONFIDENCE: u8 = 80;

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash)]
#[serde(rename_all="SCREAMING_SNAKE_CASE")]
pub enum SourceKind { RealMeasurement, Calculated, Estimated, Algorithmic }

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::RealMeasurement => "REAL_MEASUREMENT",
            SourceKind::Calculated => "CALCULATED",
            SourceKind::Estimated => "ESTIMATED",
            SourceKind::Algorithmic => "ALGORITHMIC",
        };
        write!(f, "{s}")
    }
}

/// the provenance record attached to each numeric value
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct DataSource {
    #[serde(rename="type")]
    pub kind: SourceKind,
    pub provenance: String,
    pub confidence: u8, // percent
    #[serde(serialize_with="ser_short_rfc3339")]
    pub last_update: DateTime<Utc>,
    pub latency: String,
}

impl DataSource {
    pub fn new (kind: SourceKind, provenance: impl ToString, confidence: u8, last_update: DateTime<Utc>, latency: impl ToString)->Self {
        DataSource {
            kind,
            provenance: provenance.to_string(),
            confidence: confidence.min(100),
            last_update,
            latency: latency.to_string()
        }
    }

    pub fn is_real (&self)->bool { self.kind == SourceKind::RealMeasurement }
}

/// why a provider could not deliver a value at all
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
#[serde(rename_all="camelCase")]
pub enum FailureCause {
    Transport, // network or server side problem - expected data availability gap
    Timeout,   // provider did not respond within the caller supplied timeout
    NoData,    // provider responded but without any usable values
    Contract,  // response did not have the expected format - a configuration or API bug
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureCause::Transport => "transport",
            FailureCause::Timeout => "timeout",
            FailureCause::NoData => "no data",
            FailureCause::Contract => "contract",
        };
        write!(f, "{s}")
    }
}

/// what a signal provider hands to the resolver. Providers self-report confidence, the resolver
/// never has to guess it from the magnitude of a value
#[derive(Debug,Clone,PartialEq)]
pub enum Acquisition<T> {
    Live(T),
    LowConfidence(T, String),
    Unavailable { cause: FailureCause, reason: String },
}

impl<T> Acquisition<T> {
    pub fn unavailable (cause: FailureCause, reason: impl ToString)->Self {
        Acquisition::Unavailable { cause, reason: reason.to_string() }
    }

    pub fn from_net_error (e: &ThawNetError)->Self {
        let cause = if e.is_contract_violation() { FailureCause::Contract } else { FailureCause::Transport };
        Acquisition::Unavailable { cause, reason: e.to_string() }
    }

    pub fn is_live (&self)->bool { matches!( self, Acquisition::Live(_)) }

    pub fn failure_cause (&self)->Option<FailureCause> {
        match self {
            Acquisition::Unavailable{cause,..} => Some(*cause),
            _ => None
        }
    }
}

/// per-pass parameters for provider calls. `now` is passed in (instead of read from the clock
/// inside providers) so that a pass over identical provider responses is reproducible
#[derive(Debug,Clone,Copy)]
pub struct AcquisitionContext {
    pub now: DateTime<Utc>,
    pub timeout: Duration,
}

impl AcquisitionContext {
    pub fn new (now: DateTime<Utc>, timeout: Duration)->Self {
        AcquisitionContext { now, timeout }
    }
}

/// bound a provider call by the context timeout. On timeout we report `Unavailable` instead of
/// hanging the whole aggregation
pub async fn with_timeout<T,F> (ctx: &AcquisitionContext, what: &str, fut: F)->Acquisition<T> where F: Future<Output=Acquisition<T>> {
    match tokio::time::timeout( ctx.timeout, fut).await {
        Ok(acquisition) => acquisition,
        Err(_) => {
            warn!("{what} timed out after {:?}", ctx.timeout);
            Acquisition::unavailable( FailureCause::Timeout, format!("{what} timed out after {:?}", ctx.timeout))
        }
    }
}
