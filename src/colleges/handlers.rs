use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    colleges::{
        dto::CollegeListItem,
        repo::{College, CollegeStats},
    },
    error::ApiError,
    experiences::{dto::ExperienceWithUser, repo::Experience},
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/colleges", get(list_colleges))
        .route("/colleges/:id/stats", get(college_stats))
        .route("/colleges/:id/experiences", get(college_experiences))
}

#[instrument(skip(state))]
pub async fn list_colleges(
    State(state): State<AppState>,
) -> Result<Json<Vec<CollegeListItem>>, ApiError> {
    let colleges = College::list(&state.db).await?;
    Ok(Json(colleges.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn college_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CollegeStats>, ApiError> {
    College::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("College not found"))?;
    let stats = College::stats(&state.db, id).await?;
    Ok(Json(stats))
}

#[instrument(skip(state))]
pub async fn college_experiences(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ExperienceWithUser>>, ApiError> {
    College::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("College not found"))?;
    let rows = Experience::list_verified_by_college(&state.db, id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
