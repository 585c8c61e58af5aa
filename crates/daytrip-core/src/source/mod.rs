//! External collaborator boundary.
//!
//! Each data provider (events search, plan generation, geocoding,
//! directions) sits behind an object-safe async trait so the pipeline can be
//! exercised against fakes and swapped between providers. Concrete
//! HTTP-backed adapters live alongside the traits; every adapter bounds its
//! requests with a client-level timeout.

mod events_api;
mod llm;
mod maps;
mod traits;

pub use events_api::EventSearchApi;
pub use llm::GenerativeLanguageApi;
pub use maps::{DirectionsApi, GeocodingApi, decode_polyline};
pub use traits::{DirectionsSource, EventsSource, GenerationSource, GeocodingSource};
