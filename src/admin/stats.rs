use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    admin::dto::StatsResponse, auth::extractors::AdminUser, error::ApiError, state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/stats", get(get_stats))
}

#[instrument(skip(state, _admin))]
pub async fn get_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let (total_experiences, total_colleges, total_verified_experiences): (i64, i64, i64) =
        sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM interview_experiences),
                    (SELECT COUNT(*) FROM colleges),
                    (SELECT COUNT(*) FROM interview_experiences WHERE is_verified = TRUE)",
        )
        .fetch_one(&state.db)
        .await?;

    Ok(Json(StatsResponse {
        total_experiences,
        total_colleges,
        total_verified_experiences,
        pending_experiences: total_experiences - total_verified_experiences,
    }))
}
