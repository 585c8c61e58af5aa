//! Itinerary data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trip parameters supplied by the caller and retained with every stored
/// itinerary version so recalculation can replay them with deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub city: String,
    pub state: String,
    /// Requested dates, `YYYY-MM-DD`, in trip order.
    pub dates: Vec<String>,
    /// Raw budget tier label, e.g. `"$1-$50"`. Unknown labels get the
    /// conservative default ceilings.
    pub budget: String,
    /// Free-text interests, e.g. "live music, outdoor food".
    #[serde(default)]
    pub preferences: String,
    /// Exact titles to drop from the candidate set.
    #[serde(default)]
    pub excluded_events: Vec<String>,
}

/// One scheduled stop in an itinerary.
///
/// `end_time` is expected to come after `start_time` but this is not
/// enforced; consumers tolerate violations rather than crash. `date` is
/// filled with the trip's first date when the generation output omits it,
/// but readers still treat `None` defensively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM`, 24-hour.
    pub start_time: String,
    /// `HH:MM`, 24-hour.
    pub end_time: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub ticket_info: String,
    #[serde(default)]
    pub estimated_cost: f64,
}

/// An immutable itinerary version. Created by generation or recalculation,
/// never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub id: Uuid,
    pub city: String,
    pub state: String,
    pub dates: Vec<String>,
    pub budget: String,
    pub preferences: String,
    pub excluded_events: Vec<String>,
    pub summary: String,
    /// Set when the plan was assembled from the synthetic fallback set
    /// rather than live event data.
    pub curated: bool,
    pub items: Vec<ItineraryItem>,
    pub created_at: DateTime<Utc>,
}

impl Itinerary {
    /// Sum of item cost estimates. A best-effort figure: the budget ceiling
    /// is advisory to the generation step and is not re-enforced here.
    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(|item| item.estimated_cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(cost: f64) -> ItineraryItem {
        ItineraryItem {
            title: "Stop".to_string(),
            date: None,
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            location: "Somewhere".to_string(),
            description: String::new(),
            ticket_info: String::new(),
            estimated_cost: cost,
        }
    }

    #[test]
    fn total_cost_sums_items() {
        let itinerary = Itinerary {
            id: Uuid::new_v4(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            dates: vec!["2025-06-01".to_string()],
            budget: "$1-$50".to_string(),
            preferences: String::new(),
            excluded_events: Vec::new(),
            summary: String::new(),
            curated: false,
            items: vec![item(10.0), item(15.5), item(0.0)],
            created_at: Utc::now(),
        };
        assert!((itinerary.total_cost() - 25.5).abs() < f64::EPSILON);
    }

    #[test]
    fn search_params_defaults_optional_fields() {
        let json = r#"{
            "city": "Austin",
            "state": "TX",
            "dates": ["2025-06-01"],
            "budget": "$0"
        }"#;
        let params: SearchParams = serde_json::from_str(json).expect("should parse");
        assert!(params.preferences.is_empty());
        assert!(params.excluded_events.is_empty());
    }

    #[test]
    fn item_omits_absent_date_when_serialized() {
        let serialized = serde_json::to_string(&item(0.0)).expect("should serialize");
        assert!(!serialized.contains("\"date\""));
    }
}
