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

//! HTTP access to the dashboard. Each request runs a fresh aggregation pass, responses are never cached

use std::{net::SocketAddr, sync::Arc};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info,warn};

use crate::{dashboard::Dashboard, errors::{Result, ThawFusionError}};

pub const DASHBOARD_ROUTE: &str = "/api/permafrost";

fn no_store ()->HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert( header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers
}

fn error_response (status: StatusCode, msg: String)->Response {
    (status, no_store(), Json( json!({ "error": msg }))).into_response()
}

async fn get_dashboard (State(dashboard): State<Arc<Dashboard>>)->Response {
    let response = dashboard.aggregate().await;
    (StatusCode::OK, no_store(), Json(response)).into_response()
}

async fn get_region_zone (State(dashboard): State<Arc<Dashboard>>, Path(region_id): Path<String>)->Response {
    match dashboard.region_zone( &region_id).await {
        Ok(zone) => (StatusCode::OK, no_store(), Json(zone)).into_response(),
        Err(e @ ThawFusionError::UnknownRegion(_)) => {
            warn!("request for {e}");
            error_response( StatusCode::NOT_FOUND, e.to_string())
        }
        Err(e) => error_response( StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

pub fn router (dashboard: Arc<Dashboard>)->Router {
    Router::new()
        .route( DASHBOARD_ROUTE, get(get_dashboard))
        .route( &format!("{DASHBOARD_ROUTE}/{{region}}"), get(get_region_zone))
        .with_state( dashboard)
}

pub async fn serve (dashboard: Arc<Dashboard>, sock_addr: SocketAddr)->Result<()> {
    let listener = TcpListener::bind( sock_addr).await?;
    info!("serving {DASHBOARD_ROUTE} on http://{sock_addr}");
    axum::serve( listener, router( dashboard)).await?;
    Ok(())
}
