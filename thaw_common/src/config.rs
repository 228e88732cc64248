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

//! RON based configuration loading.
//!
//! Config files are looked up in this order:
//!   1. `$THAW_HOME/configs/<crate>/<filename>`
//!   2. `$HOME/.thaw/configs/<crate>/<filename>`
//!   3. `<crate-dir>/configs/<filename>` (the defaults that are kept in the source repo)

use std::{env, fs, path::{Path,PathBuf}};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error,Debug)]
pub enum ThawConfigError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config RON error {0}")]
    RonError( #[from] ron::error::SpannedError),

    #[error("config not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ThawConfigError>;

/// load config from explicit path
pub fn load_config_path<C,P> (path: P) -> Result<C> where C: DeserializeOwned, P: AsRef<Path> {
    let data = fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/// locate a config file for given crate and filename. This is usually called through the
/// crate specific `load_config(..)` wrapper that supplies `crate_name` and `crate_dir` via `env!`
pub fn find_config_file (crate_name: &str, crate_dir: &str, filename: &str) -> Option<PathBuf> {
    if let Ok(thaw_home) = env::var("THAW_HOME") {
        let path = Path::new( &thaw_home).join("configs").join(crate_name).join(filename);
        if path.is_file() { return Some(path) }
    }

    if let Ok(usr_home) = env::var("HOME") {
        let path = Path::new( &usr_home).join(".thaw").join("configs").join(crate_name).join(filename);
        if path.is_file() { return Some(path) }
    }

    let path = Path::new( crate_dir).join("configs").join(filename);
    if path.is_file() { Some(path) } else { None }
}

pub fn load_crate_config<C> (crate_name: &str, crate_dir: &str, filename: &str) -> Result<C> where C: DeserializeOwned {
    let path = find_config_file( crate_name, crate_dir, filename)
        .ok_or_else( || ThawConfigError::NotFound( format!("{crate_name}/{filename}")))?;
    load_config_path( path)
}

/// define a `load_config(filename)` function for the calling crate
#[macro_export]
macro_rules! define_load_config {
    () => {
        pub fn load_config<C: serde::de::DeserializeOwned> (filename: &str) -> thaw_common::config::Result<C> {
            thaw_common::config::load_crate_config( env!("CARGO_PKG_NAME"), env!("CARGO_MANIFEST_DIR"), filename)
        }
    }
}
