//! User-visible error taxonomy for the planning pipeline.
//!
//! Transport failures from external sources are absorbed at the call site and
//! degraded into the fallback paths (empty candidate list, unresolved point,
//! straight-line route); only the four kinds below ever surface to a caller.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the planning, storage, and routing operations.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Every candidate, including the synthetic fallback set, was excluded.
    /// Unreachable unless the caller's exclusion list covers the fallback
    /// titles, since fallback substitution otherwise guarantees candidates.
    #[error("no candidate events available for {city}")]
    NoCandidateEvents { city: String },

    /// The generation source returned something that does not parse as a
    /// structured plan. Surfaced to the caller, never retried.
    #[error("generation output malformed: {reason}")]
    GenerationMalformed { reason: String },

    /// Unknown itinerary identifier.
    #[error("itinerary {0} not found")]
    ItineraryNotFound(Uuid),

    /// A route needs at least two resolvable stops.
    #[error("route requires at least two resolvable locations, got {resolved}")]
    InsufficientRoutePoints { resolved: usize },
}
