//! HTTP API for itinerary generation, recalculation, export, and map data.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use daytrip_core::PlanError;
use daytrip_core::geo::{GeoPoint, LocationResolver, RoutePlanner, TravelMode};
use daytrip_core::plan::{Itinerary, ItineraryItem, Planner, SearchParams};

use crate::ics;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared request state: the planner (owning the itinerary registry), the
/// location resolver, and the route planner.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<Planner>,
    pub resolver: Arc<LocationResolver>,
    pub routes: Arc<RoutePlanner>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        let status = match &err {
            PlanError::ItineraryNotFound(_) | PlanError::NoCandidateEvents { .. } => {
                StatusCode::NOT_FOUND
            }
            PlanError::GenerationMalformed { .. } => StatusCode::BAD_GATEWAY,
            PlanError::InsufficientRoutePoints { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RecalculateRequest {
    #[serde(default)]
    pub extra_preferences: String,
    #[serde(default)]
    pub excluded_events: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub itinerary_id: Uuid,
    pub city: String,
    pub state: String,
    pub dates: Vec<String>,
    pub budget: String,
    pub summary: String,
    pub curated: bool,
    pub total_cost: f64,
    pub events: Vec<ItineraryItem>,
}

impl From<Itinerary> for ItineraryResponse {
    fn from(itinerary: Itinerary) -> Self {
        Self {
            itinerary_id: itinerary.id,
            total_cost: itinerary.total_cost(),
            city: itinerary.city,
            state: itinerary.state,
            dates: itinerary.dates,
            budget: itinerary.budget,
            summary: itinerary.summary,
            curated: itinerary.curated,
            events: itinerary.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StopLocation {
    pub title: String,
    pub location: String,
    pub point: Option<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub center: GeoPoint,
    pub stops: Vec<StopLocation>,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub mode: String,
    pub points: Vec<GeoPoint>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/itineraries", post(generate_itinerary))
        .route("/api/itineraries/{id}", get(get_itinerary))
        .route("/api/itineraries/{id}/recalculate", post(recalculate_itinerary))
        .route("/api/itineraries/{id}/locations", get(get_locations))
        .route("/api/itineraries/{id}/route", get(get_route))
        .route("/api/itineraries/{id}/calendar.ics", get(export_calendar))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("daytrip serving on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("daytrip shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn generate_itinerary(
    State(state): State<AppState>,
    Json(params): Json<SearchParams>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let itinerary = state.planner.generate(params).await?;
    Ok(Json(itinerary.into()))
}

async fn get_itinerary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let itinerary = state
        .planner
        .store()
        .get(id)
        .ok_or(PlanError::ItineraryNotFound(id))?;
    Ok(Json(itinerary.into()))
}

async fn recalculate_itinerary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecalculateRequest>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let itinerary = state
        .planner
        .recalculate(id, &request.extra_preferences, &request.excluded_events)
        .await?;
    Ok(Json(itinerary.into()))
}

async fn get_locations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LocationsResponse>, AppError> {
    let itinerary = state
        .planner
        .store()
        .get(id)
        .ok_or(PlanError::ItineraryNotFound(id))?;

    let resolved = state
        .resolver
        .resolve_items(&itinerary.items, &itinerary.city, &itinerary.state)
        .await;
    let center = state
        .resolver
        .center_for(&resolved, &itinerary.city, &itinerary.state)
        .await;

    let stops = itinerary
        .items
        .into_iter()
        .zip(resolved)
        .map(|(item, point)| StopLocation {
            title: item.title,
            location: item.location,
            point,
        })
        .collect();

    Ok(Json(LocationsResponse { center, stops }))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let mode: TravelMode = match query.mode.as_deref() {
        Some(raw) => raw
            .parse()
            .map_err(|e: daytrip_core::geo::TravelModeParseError| {
                AppError::bad_request(e.to_string())
            })?,
        None => TravelMode::default(),
    };

    let itinerary = state
        .planner
        .store()
        .get(id)
        .ok_or(PlanError::ItineraryNotFound(id))?;

    let resolved = state
        .resolver
        .resolve_items(&itinerary.items, &itinerary.city, &itinerary.state)
        .await;
    let stops: Vec<GeoPoint> = resolved.into_iter().flatten().collect();

    let points = state.routes.route_between(&stops, mode).await?;
    Ok(Json(RouteResponse {
        mode: mode.to_string(),
        points,
    }))
}

async fn export_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let itinerary = state
        .planner
        .store()
        .get(id)
        .ok_or(PlanError::ItineraryNotFound(id))?;

    let filename = format!(
        "daytrip_{}_{}.ics",
        itinerary.city.replace(' ', "_"),
        itinerary.dates.first().map(String::as_str).unwrap_or("trip"),
    );
    let content = ics::render(&itinerary);

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        content,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
