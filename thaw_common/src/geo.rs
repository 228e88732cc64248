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

//! geodetic point and rectangle types for region and hotspot locations.
//! We use the [new type](https://doc.rust-lang.org/rust-by-example/generics/new_types.html) pattern over
//! [geo](https://docs.rs/geo/latest/geo/index.html) types so that we keep degree semantics (lon = x, lat = y)
//! and control how locations are serialized for dashboard clients

use std::fmt;
use serde::{Serialize,Deserialize};
use serde::ser::{Serializer, SerializeStruct};
use serde::de::Deserializer;
use geo::{Coord, Point, Rect};

/* #region GeoPoint ***********************************************************************************************/

/// a wrapper for geo::Point that uses geodetic degrees stored as f64
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GeoPoint(Point);

impl GeoPoint {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint( Point::new( normalize_180(lon), lat.clamp(-90.0, 90.0)))
    }

    /// most of our static tables list coordinates in (lat,lon) order
    pub fn from_lat_lon_degrees (lat: f64, lon: f64) -> Self {
        Self::from_lon_lat_degrees( lon, lat)
    }

    #[inline] pub fn longitude_degrees(&self) -> f64 { self.0.x() }
    #[inline] pub fn latitude_degrees(&self) -> f64 { self.0.y() }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4},{:.4}]", self.0.y(), self.0.x())
    }
}

impl Serialize for GeoPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("GeoPoint", 2)?;
        state.serialize_field("lat", &self.latitude_degrees())?;
        state.serialize_field("lon", &self.longitude_degrees())?;
        state.end()
    }
}

#[derive(Deserialize)]
struct RawGeoPoint {
    #[serde(alias="latitude", alias="y")]
    lat: f64,
    #[serde(alias="longitude", alias="lng", alias="x")]
    lon: f64,
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let raw = RawGeoPoint::deserialize(deserializer)?;
        Ok( GeoPoint::from_lon_lat_degrees( raw.lon, raw.lat) )
    }
}

/* #endregion GeoPoint */

/* #region GeoRect ************************************************************************************************/

/// an axis aligned lon/lat rectangle. We do not support antimeridian crossing (west > east) since none
/// of our monitored regions requires it
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GeoRect(Rect);

impl GeoRect {
    pub fn from_wsen_degrees (west: f64, south: f64, east: f64, north: f64) -> Self {
        GeoRect( Rect::new( Coord{ x: west, y: south }, Coord{ x: east, y: north }))
    }

    /// parse a CMR "box" string, which uses "S W N E" order (space separated degrees)
    pub fn from_snwe_str (s: &str) -> Option<Self> {
        let vs: Vec<f64> = s.split_whitespace().map( |t| t.parse::<f64>().ok()).collect::<Option<Vec<f64>>>()?;
        if vs.len() == 4 {
            Some( Self::from_wsen_degrees( vs[1], vs[0], vs[3], vs[2]))
        } else {
            None
        }
    }

    #[inline] pub fn west(&self)->f64 { self.0.min().x }
    #[inline] pub fn east(&self)->f64 { self.0.max().x }
    #[inline] pub fn south(&self)->f64 { self.0.min().y }
    #[inline] pub fn north(&self)->f64 { self.0.max().y }

    pub fn center (&self) -> GeoPoint {
        let c = self.0.center();
        GeoPoint::from_lon_lat_degrees( c.x, c.y)
    }

    /// note this includes the boundary
    pub fn contains (&self, p: &GeoPoint) -> bool {
        let lon = p.longitude_degrees();
        let lat = p.latitude_degrees();
        lon >= self.west() && lon <= self.east() && lat >= self.south() && lat <= self.north()
    }

    pub fn intersection (&self, other: &GeoRect) -> Option<GeoRect> {
        let west = self.west().max( other.west());
        let east = self.east().min( other.east());
        let south = self.south().max( other.south());
        let north = self.north().min( other.north());

        if west <= east && south <= north {
            Some( GeoRect::from_wsen_degrees( west, south, east, north))
        } else {
            None
        }
    }

    /// the "W,S,E,N" format used by bounding_box query parameters
    pub fn to_wsen_string (&self) -> String {
        format!("{},{},{},{}", self.west(), self.south(), self.east(), self.north())
    }
}

impl Serialize for GeoRect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("GeoRect", 4)?;
        state.serialize_field("west", &self.west())?;
        state.serialize_field("south", &self.south())?;
        state.serialize_field("east", &self.east())?;
        state.serialize_field("north", &self.north())?;
        state.end()
    }
}

#[derive(Deserialize)]
struct RawGeoRect { west: f64, south: f64, east: f64, north: f64 }

impl<'de> Deserialize<'de> for GeoRect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let raw = RawGeoRect::deserialize(deserializer)?;
        Ok( GeoRect::from_wsen_degrees( raw.west, raw.south, raw.east, raw.north) )
    }
}

/* #endregion GeoRect */

pub fn normalize_180 (lon: f64) -> f64 {
    if lon > 180.0 || lon < -180.0 {
        let l = (lon + 180.0).rem_euclid( 360.0) - 180.0;
        if l == -180.0 && lon > 0.0 { 180.0 } else { l }
    } else {
        lon
    }
}
