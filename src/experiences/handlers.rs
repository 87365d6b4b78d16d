use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    experiences::{
        dto::{
            ExperienceFilter, ExperienceWithUser, HelpfulResponse, ListQuery,
            SubmitExperienceRequest,
        },
        repo::{Experience, NewExperience, SearchParams},
        services,
    },
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/experiences", get(list_experiences).post(search_experiences))
        .route("/experiences/:id", get(get_experience))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/experiences/submit", post(submit_experience))
        .route("/experiences/user/me", get(my_experiences))
        .route("/experiences/:id/helpful", post(toggle_helpful))
}

#[instrument(skip(state))]
pub async fn list_experiences(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ExperienceWithUser>>, ApiError> {
    let rows = Experience::list_with_users(&state.db, q.user_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, filter))]
pub async fn search_experiences(
    State(state): State<AppState>,
    Json(filter): Json<ExperienceFilter>,
) -> Result<Json<Vec<ExperienceWithUser>>, ApiError> {
    let params = SearchParams {
        college: filter.college,
        year: filter.year,
        background: filter.background,
        min_percentile: services::min_percentile(filter.percentile_range.as_deref()),
        limit: filter.limit,
        offset: filter.offset,
    };
    let rows = Experience::search(&state.db, &params).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, user, payload))]
pub async fn submit_experience(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    Json(payload): Json<SubmitExperienceRequest>,
) -> Result<(StatusCode, Json<Experience>), ApiError> {
    if payload.pi_questions.is_empty() {
        return Err(ApiError::Validation(
            "At least one PI question is required".into(),
        ));
    }

    let experience = Experience::create(
        &state.db,
        NewExperience {
            user_id: user.id,
            college_id: payload.college_id,
            year: payload.year,
            profile: payload.profile,
            wat_summary: payload.wat_summary,
            pi_questions: payload.pi_questions,
            final_remarks: payload.final_remarks,
            is_anonymous: payload.is_anonymous,
            // user submissions wait for moderation
            is_verified: false,
        },
    )
    .await?;

    info!(user_id = %user.id, experience_id = %experience.id, "experience submitted");
    Ok((StatusCode::CREATED, Json(experience)))
}

#[instrument(skip(state, user))]
pub async fn my_experiences(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
) -> Result<Json<Vec<ExperienceWithUser>>, ApiError> {
    let rows = Experience::list_with_users(&state.db, Some(user.id)).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_experience(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExperienceWithUser>, ApiError> {
    let row = Experience::fetch_and_bump_views(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Experience not found"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, user))]
pub async fn toggle_helpful(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<HelpfulResponse>, ApiError> {
    // lock the row so concurrent toggles by the same user cannot double-count
    let mut tx = state.db.begin().await?;
    let (_, mut upvoted_by) = Experience::lock_votes_tx(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound("Experience not found"))?;

    let is_helpful = services::apply_vote(&mut upvoted_by, user.id);
    let upvotes = upvoted_by.len() as i32;
    Experience::set_votes_tx(&mut tx, id, upvotes, &upvoted_by).await?;
    tx.commit().await?;

    info!(user_id = %user.id, experience_id = %id, is_helpful, "helpful vote toggled");

    Ok(Json(HelpfulResponse {
        is_helpful,
        upvotes,
    }))
}
