//! Itinerary planning: request construction, structural validation of the
//! generation output, and the service that ties the pipeline together.

mod parser;
mod prompt;
mod service;
mod types;

pub use parser::parse_generated_plan;
pub use prompt::build_plan_prompt;
pub use service::Planner;
pub use types::{Itinerary, ItineraryItem, SearchParams};
