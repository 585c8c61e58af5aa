//! Core library for daytrip: event discovery, budget-constrained itinerary
//! assembly, and map placement.
//!
//! The pipeline turns an unreliable, variable-shape list of candidate events
//! into a deterministic, schedulable, cost-bounded multi-day plan:
//!
//! 1. [`source::EventsSource`] yields raw [`event::CandidateEvent`]s.
//! 2. [`normalize`] deduplicates, budget-filters (with progressive
//!    relaxation), applies exclusions, and substitutes synthetic fallback
//!    events so downstream stages never see an empty candidate set.
//! 3. [`plan`] builds a generation request with explicit numeric budget
//!    ceilings, hands it to a [`source::GenerationSource`], and structurally
//!    validates the result into [`plan::ItineraryItem`]s.
//! 4. [`store::ItineraryStore`] keeps every generated version in a
//!    process-scoped, insert-only registry; recalculation derives a new
//!    version from a stored one's search parameters.
//! 5. [`geo`] geocodes itinerary items, validates results against known city
//!    bounding boxes, and produces route polylines between stops.

pub mod budget;
pub mod cost;
pub mod error;
pub mod event;
pub mod geo;
pub mod normalize;
pub mod plan;
pub mod source;
pub mod store;

pub use error::PlanError;
