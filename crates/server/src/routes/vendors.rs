use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use service::vendors::{Vendor, VendorInput};

use crate::errors::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Vendor>>, ApiError> {
    Ok(Json(state.vendors.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<VendorInput>,
) -> Result<Json<Value>, ApiError> {
    state.vendors.create(input).await?;
    refreshed(&state).await
}

pub async fn update(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(input): Json<VendorInput>,
) -> Result<Json<Value>, ApiError> {
    state.vendors.update(index, input).await?;
    refreshed(&state).await
}

pub async fn remove(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Value>, ApiError> {
    state.vendors.delete(index).await?;
    refreshed(&state).await
}

/// Mutations answer with the canonical post-write state.
async fn refreshed(state: &AppState) -> Result<Json<Value>, ApiError> {
    let vendors = state.vendors.list().await?;
    Ok(Json(json!({"success": true, "vendors": vendors})))
}
