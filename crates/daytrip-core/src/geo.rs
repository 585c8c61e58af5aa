//! Location resolution, geocoding consistency checks, and routing.
//!
//! Geocoding providers happily resolve "Jazz Club" to the wrong state, so
//! every lookup is validated against a fixed table of city bounding boxes.
//! An out-of-bounds hit earns exactly one retry with a more explicit query;
//! after that, an out-of-bounds point beats no point at all. The map-display
//! path never fails outright: it degrades through the itinerary's resolved
//! points, then the city itself, then a fixed default coordinate.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::plan::ItineraryItem;
use crate::source::{DirectionsSource, GeocodingSource};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Fallback map center when nothing at all resolves (geographic center of
/// the contiguous US).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 39.8283,
    lng: -98.5795,
};

// ---------------------------------------------------------------------------
// Travel mode
// ---------------------------------------------------------------------------

/// Travel mode accepted by the directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
    Bicycling,
    Transit,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Walking => "walking",
            Self::Driving => "driving",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        };
        f.write_str(s)
    }
}

impl FromStr for TravelMode {
    type Err = TravelModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking" => Ok(Self::Walking),
            "driving" => Ok(Self::Driving),
            "bicycling" => Ok(Self::Bicycling),
            "transit" => Ok(Self::Transit),
            other => Err(TravelModeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TravelMode`] string.
#[derive(Debug, Clone)]
pub struct TravelModeParseError(pub String);

impl fmt::Display for TravelModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid travel mode: {:?}", self.0)
    }
}

impl std::error::Error for TravelModeParseError {}

// ---------------------------------------------------------------------------
// City bounding boxes
// ---------------------------------------------------------------------------

/// A generous bounding box around a major city.
#[derive(Debug, Clone, Copy)]
pub struct CityBounds {
    pub city: &'static str,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl CityBounds {
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

/// Known-city table used by the consistency check. Cities not listed here
/// skip the check entirely.
const CITY_BOUNDS: &[CityBounds] = &[
    CityBounds { city: "new york", min_lat: 40.45, max_lat: 40.95, min_lng: -74.30, max_lng: -73.65 },
    CityBounds { city: "los angeles", min_lat: 33.60, max_lat: 34.35, min_lng: -118.70, max_lng: -117.90 },
    CityBounds { city: "chicago", min_lat: 41.60, max_lat: 42.10, min_lng: -87.95, max_lng: -87.45 },
    CityBounds { city: "houston", min_lat: 29.50, max_lat: 30.15, min_lng: -95.80, max_lng: -95.00 },
    CityBounds { city: "austin", min_lat: 30.05, max_lat: 30.55, min_lng: -98.05, max_lng: -97.50 },
    CityBounds { city: "san francisco", min_lat: 37.60, max_lat: 37.85, min_lng: -122.55, max_lng: -122.30 },
    CityBounds { city: "seattle", min_lat: 47.45, max_lat: 47.75, min_lng: -122.45, max_lng: -122.20 },
    CityBounds { city: "boston", min_lat: 42.20, max_lat: 42.45, min_lng: -71.20, max_lng: -70.95 },
    CityBounds { city: "miami", min_lat: 25.60, max_lat: 25.95, min_lng: -80.45, max_lng: -80.10 },
    CityBounds { city: "denver", min_lat: 39.55, max_lat: 39.95, min_lng: -105.15, max_lng: -104.70 },
    CityBounds { city: "portland", min_lat: 45.40, max_lat: 45.65, min_lng: -122.85, max_lng: -122.45 },
    CityBounds { city: "washington", min_lat: 38.80, max_lat: 39.00, min_lng: -77.15, max_lng: -76.90 },
    CityBounds { city: "philadelphia", min_lat: 39.85, max_lat: 40.15, min_lng: -75.30, max_lng: -74.95 },
    CityBounds { city: "new orleans", min_lat: 29.85, max_lat: 30.10, min_lng: -90.15, max_lng: -89.90 },
    CityBounds { city: "nashville", min_lat: 36.00, max_lat: 36.30, min_lng: -86.95, max_lng: -86.60 },
];

/// Look up the bounding box for a city, case-insensitively.
pub fn bounds_for(city: &str) -> Option<&'static CityBounds> {
    let needle = city.trim().to_lowercase();
    CITY_BOUNDS.iter().find(|b| b.city == needle)
}

/// Arithmetic mean of a set of points. `None` when empty.
pub fn center_of(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    Some(GeoPoint {
        lat: points.iter().map(|p| p.lat).sum::<f64>() / n,
        lng: points.iter().map(|p| p.lng).sum::<f64>() / n,
    })
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Geocodes itinerary locations with the bounding-box consistency check.
pub struct LocationResolver {
    geocoder: Arc<dyn GeocodingSource>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn GeocodingSource>) -> Self {
        Self { geocoder }
    }

    /// Resolve one location string to a coordinate.
    ///
    /// The query is disambiguated with ", {city}, {state}" unless the city
    /// name already appears in the text. An out-of-bounds result gets one
    /// retry with an explicit ", {city}, USA" query; if the retry is also
    /// out of bounds (or fails), the original point is kept rather than
    /// discarded. `None` only when no lookup produced anything.
    pub async fn resolve(&self, location: &str, city: &str, state: &str) -> Option<GeoPoint> {
        let query = if location.to_lowercase().contains(&city.to_lowercase()) {
            location.to_string()
        } else {
            format!("{location}, {city}, {state}")
        };

        let first = match self.geocoder.lookup(&query).await {
            Ok(point) => point,
            Err(err) => {
                tracing::warn!(query, error = %err, "geocoding lookup failed");
                None
            }
        };
        let point = first?;

        let Some(bounds) = bounds_for(city) else {
            return Some(point);
        };
        if bounds.contains(point) {
            return Some(point);
        }

        tracing::warn!(
            query,
            lat = point.lat,
            lng = point.lng,
            city,
            "geocoded point outside city bounds; retrying with explicit query"
        );
        let retry_query = format!("{location}, {city}, USA");
        match self.geocoder.lookup(&retry_query).await {
            Ok(Some(retry)) if bounds.contains(retry) => Some(retry),
            Ok(_) => Some(point),
            Err(err) => {
                tracing::warn!(retry_query, error = %err, "geocoding retry failed");
                Some(point)
            }
        }
    }

    /// Resolve every itinerary item's location. Lookups run concurrently;
    /// the result preserves item order, with `None` for unresolved stops.
    pub async fn resolve_items(
        &self,
        items: &[ItineraryItem],
        city: &str,
        state: &str,
    ) -> Vec<Option<GeoPoint>> {
        let lookups = items
            .iter()
            .map(|item| self.resolve(&item.location, city, state));
        join_all(lookups).await
    }

    /// Aggregate center for map display.
    ///
    /// Mean of the resolved points; with nothing resolved, falls back to
    /// geocoding the city itself, then to [`DEFAULT_CENTER`]. Never fails.
    pub async fn center_for(
        &self,
        resolved: &[Option<GeoPoint>],
        city: &str,
        state: &str,
    ) -> GeoPoint {
        let points: Vec<GeoPoint> = resolved.iter().flatten().copied().collect();
        if let Some(center) = center_of(&points) {
            return center;
        }

        let city_query = format!("{city}, {state}");
        match self.geocoder.lookup(&city_query).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                tracing::warn!(city_query, "city itself did not geocode; using default center");
                DEFAULT_CENTER
            }
            Err(err) => {
                tracing::warn!(city_query, error = %err, "city geocode failed; using default center");
                DEFAULT_CENTER
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Builds route polylines between resolved itinerary stops.
pub struct RoutePlanner {
    directions: Arc<dyn DirectionsSource>,
}

impl RoutePlanner {
    pub fn new(directions: Arc<dyn DirectionsSource>) -> Self {
        Self { directions }
    }

    /// Route through the given stops in order.
    ///
    /// Fewer than two stops is a caller error; a provider failure degrades
    /// to the straight-line stop sequence so the map still draws something.
    pub async fn route_between(
        &self,
        stops: &[GeoPoint],
        mode: TravelMode,
    ) -> Result<Vec<GeoPoint>, PlanError> {
        if stops.len() < 2 {
            return Err(PlanError::InsufficientRoutePoints {
                resolved: stops.len(),
            });
        }
        match self.directions.route(stops, mode).await {
            Ok(Some(points)) if !points.is_empty() => Ok(points),
            Ok(_) => {
                tracing::warn!(%mode, stops = stops.len(), "directions unavailable; using straight-line path");
                Ok(stops.to_vec())
            }
            Err(err) => {
                tracing::warn!(%mode, error = %err, "directions request failed; using straight-line path");
                Ok(stops.to_vec())
            }
        }
    }
}
