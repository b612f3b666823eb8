use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use service::meals::{Meal, MealInput};

use crate::errors::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Meal>>, ApiError> {
    Ok(Json(state.meals.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<MealInput>,
) -> Result<Json<Value>, ApiError> {
    state.meals.create(input).await?;
    refreshed(&state).await
}

pub async fn update(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(input): Json<MealInput>,
) -> Result<Json<Value>, ApiError> {
    state.meals.update(index, input).await?;
    refreshed(&state).await
}

pub async fn remove(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Value>, ApiError> {
    state.meals.delete(index).await?;
    refreshed(&state).await
}

/// Mutations answer with the canonical post-write (sorted) state.
async fn refreshed(state: &AppState) -> Result<Json<Value>, ApiError> {
    let meals = state.meals.list().await?;
    Ok(Json(json!({"success": true, "meals": meals})))
}
