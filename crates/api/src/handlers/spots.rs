//! Handlers for the `spots` collection.
//!
//! The collection is append-only: list, list-visible and create. There is no
//! update or delete endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quietfinder_core::expiry::{expires_at, is_visible, minutes_remaining};
use quietfinder_core::spot::{NewSpot, Spot};
use quietfinder_core::store::SpotStore;
use quietfinder_core::types::EpochMillis;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A visible spot annotated with its remaining lifetime.
#[derive(Debug, Serialize)]
pub struct ActiveSpot {
    #[serde(flatten)]
    pub spot: Spot,
    pub minutes_remaining: i64,
    pub expires_at: EpochMillis,
}

/// GET /api/v1/spots
///
/// The full collection, newest first, including expired spots.
pub async fn list_spots(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.store.snapshot();

    Ok(Json(DataResponse {
        data: snapshot.as_ref().clone(),
    }))
}

/// GET /api/v1/spots/active
///
/// Only the spots still inside the expiry window at server time.
pub async fn list_active_spots(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let now = state.clock.now();
    let active: Vec<ActiveSpot> = state
        .store
        .snapshot()
        .iter()
        .filter(|spot| is_visible(spot, now))
        .map(|spot| ActiveSpot {
            spot: spot.clone(),
            minutes_remaining: minutes_remaining(spot, now),
            expires_at: expires_at(spot),
        })
        .collect();

    Ok(Json(DataResponse { data: active }))
}

/// POST /api/v1/spots
///
/// Append a spot. The request body is the document without an `id`.
pub async fn create_spot(
    State(state): State<AppState>,
    payload: Result<Json<NewSpot>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let spot = state.store.add(input).await?;

    tracing::info!(spot_id = %spot.id, name = %spot.name, "Spot created via API");

    Ok((StatusCode::CREATED, Json(DataResponse { data: spot })))
}
