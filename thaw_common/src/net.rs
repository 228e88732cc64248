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

//! common utility functions for network operations

use reqwest::{header::{HeaderValue,ACCEPT}, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Error,Debug)]
pub enum ThawNetError {
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("not found {0}")]
    NotFoundError(String),

    #[error("response status {0}")]
    StatusError(StatusCode),

    #[error("parse error: {0}")]
    ParseError(String),
}

impl ThawNetError {
    /// did the server respond with something we could not understand (as opposed to not responding at all)
    pub fn is_contract_violation (&self)->bool {
        matches!( self, ThawNetError::ParseError(_))
    }
}

pub type Result<T> = std::result::Result<T, ThawNetError>;

/// send a GET request with given query parameters and parse a JSON response body
pub async fn get_json<T> (client: &Client, url: &str, query: &[(&str,String)]) -> Result<T> where T: DeserializeOwned {
    debug!("GET {url} {query:?}");

    let response = client.get(url)
        .header( ACCEPT, HeaderValue::from_static("application/json"))
        .query( query)
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => {
            from_json( response).await
        }
        StatusCode::NOT_FOUND => {
            Err( ThawNetError::NotFoundError(format!("{url}")))
        }
        other => {
            Err( ThawNetError::StatusError(other))
        }
    }
}

pub async fn from_json<T> (response: Response)->Result<T> where T: DeserializeOwned {
    let bytes = response.bytes().await?;
    serde_json::from_slice( &bytes).map_err(|e| ThawNetError::ParseError(e.to_string()))
}
