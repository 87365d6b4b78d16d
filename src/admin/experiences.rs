use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    admin::dto::{
        CreateExperienceRequest, DeletedResponse, UpdateExperienceRequest, VerifiedResponse,
    },
    auth::{extractors::AdminUser, repo::User},
    colleges::repo::College,
    error::ApiError,
    experiences::{
        dto::ExperienceDetails,
        repo::{Experience, ExperienceChanges, NewExperience},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/experiences",
            get(list_experiences).post(create_experience),
        )
        .route("/admin/experiences/pending", get(pending_experiences))
        .route("/admin/experiences/verified", get(verified_experiences))
        .route(
            "/admin/experiences/:id",
            get(get_experience)
                .put(update_experience)
                .delete(delete_experience),
        )
        .route("/admin/experiences/:id/verify", put(verify_experience))
        .route("/admin/experiences/:id/reject", put(reject_experience))
}

#[instrument(skip(state, _admin))]
pub async fn list_experiences(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<ExperienceDetails>>, ApiError> {
    let rows = Experience::list_detailed(&state.db, None).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _admin))]
pub async fn pending_experiences(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<ExperienceDetails>>, ApiError> {
    let rows = Experience::list_detailed(&state.db, Some(false)).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _admin))]
pub async fn verified_experiences(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<ExperienceDetails>>, ApiError> {
    let rows = Experience::list_detailed(&state.db, Some(true)).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _admin))]
pub async fn get_experience(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExperienceDetails>, ApiError> {
    let row = Experience::find_detailed(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Experience not found"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, _admin))]
pub async fn verify_experience(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    if !Experience::set_verified(&state.db, id).await? {
        return Err(ApiError::NotFound("Experience not found"));
    }

    info!(experience_id = %id, "experience verified");
    Ok(Json(VerifiedResponse {
        message: "Experience verified successfully",
        id,
        is_verified: true,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn reject_experience(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !Experience::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Experience not found"));
    }

    info!(experience_id = %id, "experience rejected");
    Ok(Json(DeletedResponse {
        message: "Experience rejected and deleted successfully",
        id,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn delete_experience(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if !Experience::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Experience not found"));
    }

    info!(experience_id = %id, "experience deleted");
    Ok(Json(DeletedResponse {
        message: "Experience deleted successfully",
        id,
    }))
}

#[instrument(skip(state, _admin, payload))]
pub async fn create_experience(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateExperienceRequest>,
) -> Result<(StatusCode, Json<ExperienceDetails>), ApiError> {
    College::find_by_id(&state.db, payload.college_id)
        .await?
        .ok_or(ApiError::NotFound("College not found"))?;
    User::find_by_id(&state.db, payload.user_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let experience = Experience::create(
        &state.db,
        NewExperience {
            user_id: payload.user_id,
            college_id: payload.college_id,
            year: payload.year,
            profile: payload.profile,
            wat_summary: payload.wat_summary,
            pi_questions: payload.pi_questions,
            final_remarks: payload.final_remarks,
            is_anonymous: payload.is_anonymous,
            // admin-created records skip moderation
            is_verified: true,
        },
    )
    .await?;

    let row = Experience::find_detailed(&state.db, experience.id)
        .await?
        .ok_or(ApiError::NotFound("Experience not found"))?;

    info!(experience_id = %experience.id, "experience created by admin");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_experience(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExperienceRequest>,
) -> Result<Json<ExperienceDetails>, ApiError> {
    if let Some(college_id) = payload.college_id {
        College::find_by_id(&state.db, college_id)
            .await?
            .ok_or(ApiError::NotFound("College not found"))?;
    }

    let changes = ExperienceChanges {
        college_id: payload.college_id,
        year: payload.year,
        profile: payload.profile,
        wat_summary: payload.wat_summary,
        pi_questions: payload.pi_questions,
        final_remarks: payload.final_remarks,
        is_verified: payload.is_verified,
    };

    Experience::update_admin(&state.db, id, changes)
        .await?
        .ok_or(ApiError::NotFound("Experience not found"))?;

    let row = Experience::find_detailed(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Experience not found"))?;

    info!(experience_id = %id, "experience updated by admin");
    Ok(Json(row.into()))
}
