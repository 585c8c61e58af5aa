//! Planner service: the full generate/recalculate pipeline.
//!
//! Wires the events source, normalizer, prompt builder, generation source,
//! parser, and store together. Events-source failures degrade into the
//! fallback candidate path; generation failures surface as
//! [`PlanError::GenerationMalformed`].

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::budget::limits_for;
use crate::error::PlanError;
use crate::normalize::normalize;
use crate::plan::{Itinerary, SearchParams, build_plan_prompt, parse_generated_plan};
use crate::source::{EventsSource, GenerationSource};
use crate::store::ItineraryStore;

/// Orchestrates itinerary generation and recalculation.
pub struct Planner {
    events: Arc<dyn EventsSource>,
    generator: Arc<dyn GenerationSource>,
    store: ItineraryStore,
}

impl Planner {
    pub fn new(
        events: Arc<dyn EventsSource>,
        generator: Arc<dyn GenerationSource>,
        store: ItineraryStore,
    ) -> Self {
        Self {
            events,
            generator,
            store,
        }
    }

    /// The registry this planner writes versions into.
    pub fn store(&self) -> &ItineraryStore {
        &self.store
    }

    /// Run the full pipeline for one set of trip parameters and store the
    /// resulting itinerary as a new version.
    pub async fn generate(&self, params: SearchParams) -> Result<Itinerary, PlanError> {
        let raw = match self.events.search(&params).await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(
                    city = %params.city,
                    error = %err,
                    "events source failed; continuing with fallback candidates"
                );
                Vec::new()
            }
        };

        let normalized = normalize(raw, &params);
        if normalized.events.is_empty() {
            return Err(PlanError::NoCandidateEvents {
                city: params.city.clone(),
            });
        }

        let limits = limits_for(&params.budget);
        let prompt = build_plan_prompt(&normalized.events, &params, &limits);
        let raw_plan = self.generator.generate(&prompt).await.map_err(|err| {
            PlanError::GenerationMalformed {
                reason: format!("generation request failed: {err:#}"),
            }
        })?;

        let items = parse_generated_plan(&raw_plan, &params.dates)?;

        // The total ceiling is advisory to the generation step; overruns are
        // logged, not corrected.
        let total: f64 = items.iter().map(|i| i.estimated_cost).sum();
        if total > limits.total_max {
            tracing::warn!(
                total,
                ceiling = limits.total_max,
                tier = %params.budget,
                "generated plan exceeds the advisory budget ceiling"
            );
        }

        let itinerary = Itinerary {
            id: Uuid::new_v4(),
            city: params.city.clone(),
            state: params.state.clone(),
            dates: params.dates.clone(),
            budget: params.budget.clone(),
            preferences: params.preferences.clone(),
            excluded_events: params.excluded_events.clone(),
            summary: summary_text(&params.city, normalized.curated),
            curated: normalized.curated,
            items,
            created_at: Utc::now(),
        };
        tracing::info!(
            itinerary_id = %itinerary.id,
            items = itinerary.items.len(),
            curated = itinerary.curated,
            "stored new itinerary version"
        );
        self.store.insert(itinerary.clone(), params);
        Ok(itinerary)
    }

    /// Derive a new itinerary version from a stored one's parameters.
    ///
    /// Merges `extra_preferences` into the original preference text and
    /// unions the exclusion lists, then re-runs the full pipeline. The
    /// original entry is never touched; an unknown id fails with
    /// [`PlanError::ItineraryNotFound`] without creating anything.
    pub async fn recalculate(
        &self,
        id: Uuid,
        extra_preferences: &str,
        exclusions: &[String],
    ) -> Result<Itinerary, PlanError> {
        let original = self
            .store
            .params(id)
            .ok_or(PlanError::ItineraryNotFound(id))?;
        let params = merge_params(original, extra_preferences, exclusions);
        tracing::info!(from = %id, "recalculating itinerary with merged parameters");
        self.generate(params).await
    }
}

/// Merge recalculation deltas into the original search parameters.
fn merge_params(
    mut params: SearchParams,
    extra_preferences: &str,
    exclusions: &[String],
) -> SearchParams {
    let extra = extra_preferences.trim();
    if !extra.is_empty() {
        if params.preferences.is_empty() {
            params.preferences = extra.to_string();
        } else {
            params.preferences = format!("{}; {}", params.preferences, extra);
        }
    }
    for exclusion in exclusions {
        if !params.excluded_events.iter().any(|e| e == exclusion) {
            params.excluded_events.push(exclusion.clone());
        }
    }
    params
}

fn summary_text(city: &str, curated: bool) -> String {
    if curated {
        format!("Curated suggestions for your {city} trip")
    } else {
        format!("Your {city} adventure")
    }
}
