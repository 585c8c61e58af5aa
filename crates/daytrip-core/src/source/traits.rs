//! Adapter traits for the four external data sources.
//!
//! All four are intentionally object-safe so they can be stored as
//! `Arc<dyn ...>` in the planner and resolver. Error contracts follow the
//! pipeline's degradation rules: "no results" is a successful empty/`None`
//! return; `Err` means transport failure, which callers absorb rather than
//! propagate (the generation stage being the one deliberate exception).

use anyhow::Result;
use async_trait::async_trait;

use crate::event::CandidateEvent;
use crate::geo::{GeoPoint, TravelMode};
use crate::plan::SearchParams;

/// Searches the external events provider for candidate events.
///
/// Implementations must not error for "no results" -- only for transport
/// failure, which the pipeline treats identically to an empty result.
#[async_trait]
pub trait EventsSource: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<Vec<CandidateEvent>>;
}

/// Produces a plan from a structured prompt.
///
/// Returns the raw response text; structural validation happens in the plan
/// parser, which collapses every non-well-formed response into a single
/// error kind.
#[async_trait]
pub trait GenerationSource: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Resolves a location query to a coordinate. `Ok(None)` means "not found".
#[async_trait]
pub trait GeocodingSource: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<GeoPoint>>;
}

/// Produces a route polyline through ordered stops. `Ok(None)` means the
/// provider had no route ("unavailable").
#[async_trait]
pub trait DirectionsSource: Send + Sync {
    async fn route(&self, stops: &[GeoPoint], mode: TravelMode) -> Result<Option<Vec<GeoPoint>>>;
}

// Compile-time assertions: all four traits must stay object-safe.
const _: () = {
    fn _assert_object_safe(
        _: &dyn EventsSource,
        _: &dyn GenerationSource,
        _: &dyn GeocodingSource,
        _: &dyn DirectionsSource,
    ) {
    }
};
