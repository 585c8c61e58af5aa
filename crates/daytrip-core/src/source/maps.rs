//! Geocoding and directions adapters for Google-style maps endpoints, plus
//! the encoded-polyline decoder.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::geo::{GeoPoint, TravelMode};
use crate::source::{DirectionsSource, GeocodingSource};

const GEOCODE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DIRECTIONS_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP adapter for the geocoding provider.
pub struct GeocodingApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeocodingApi {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build geocoding client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: GEOCODE_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl GeocodingSource for GeocodingApi {
    async fn lookup(&self, query: &str) -> Result<Option<GeoPoint>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("geocoding request failed")?;

        let body: serde_json::Value = response
            .json()
            .await
            .context("geocoding returned non-JSON body")?;
        Ok(parse_geocode_response(&body))
    }
}

/// Extract the first result's location from a geocode payload. Any status
/// other than `OK` (ZERO_RESULTS, quota errors, ...) is "not found".
fn parse_geocode_response(body: &serde_json::Value) -> Option<GeoPoint> {
    if body.get("status").and_then(|s| s.as_str()) != Some("OK") {
        return None;
    }
    let location = body
        .get("results")?
        .get(0)?
        .get("geometry")?
        .get("location")?;
    Some(GeoPoint {
        lat: location.get("lat")?.as_f64()?,
        lng: location.get("lng")?.as_f64()?,
    })
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// HTTP adapter for the directions provider.
pub struct DirectionsApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DirectionsApi {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build directions client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DIRECTIONS_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl DirectionsSource for DirectionsApi {
    async fn route(&self, stops: &[GeoPoint], mode: TravelMode) -> Result<Option<Vec<GeoPoint>>> {
        let Some((origin, rest)) = stops.split_first() else {
            return Ok(None);
        };
        let Some((destination, waypoints)) = rest.split_last() else {
            return Ok(None);
        };

        let mut query = vec![
            ("origin", format!("{},{}", origin.lat, origin.lng)),
            (
                "destination",
                format!("{},{}", destination.lat, destination.lng),
            ),
            ("mode", mode.to_string()),
            ("key", self.api_key.clone()),
        ];
        if !waypoints.is_empty() {
            let joined = waypoints
                .iter()
                .map(|p| format!("{},{}", p.lat, p.lng))
                .collect::<Vec<_>>()
                .join("|");
            query.push(("waypoints", joined));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .context("directions request failed")?;

        let body: serde_json::Value = response
            .json()
            .await
            .context("directions returned non-JSON body")?;
        Ok(parse_directions_response(&body))
    }
}

/// Extract and decode the overview polyline of the first route.
fn parse_directions_response(body: &serde_json::Value) -> Option<Vec<GeoPoint>> {
    if body.get("status").and_then(|s| s.as_str()) != Some("OK") {
        return None;
    }
    let encoded = body
        .get("routes")?
        .get(0)?
        .get("overview_polyline")?
        .get("points")?
        .as_str()?;
    Some(decode_polyline(encoded))
}

/// Decode a Google encoded polyline into coordinates.
///
/// Stops at the first malformed component rather than erroring; a truncated
/// tail yields a truncated route, which the map can still draw.
pub fn decode_polyline(encoded: &str) -> Vec<GeoPoint> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while index < bytes.len() {
        let Some((dlat, next)) = decode_component(bytes, index) else {
            break;
        };
        lat += dlat;
        let Some((dlng, next)) = decode_component(bytes, next) else {
            break;
        };
        lng += dlng;
        index = next;
        points.push(GeoPoint {
            lat: lat as f64 / 1e5,
            lng: lng as f64 / 1e5,
        });
    }
    points
}

/// Decode one varint-style delta starting at `index`. Returns the delta and
/// the index past it, or `None` on truncated/invalid input.
fn decode_component(bytes: &[u8], mut index: usize) -> Option<(i64, usize)> {
    let mut shift = 0u32;
    let mut result = 0i64;
    loop {
        let b = i64::from(*bytes.get(index)?) - 63;
        if b < 0 {
            return None;
        }
        index += 1;
        result |= (b & 0x1f) << shift;
        shift += 5;
        if b < 0x20 {
            break;
        }
    }
    let delta = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Some((delta, index))
}
