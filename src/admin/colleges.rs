use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::dto::{CreateCollegeRequest, DeletedResponse, UpdateCollegeRequest},
    auth::extractors::AdminUser,
    colleges::{
        repo::{College, CollegeStatus},
        services::slugify,
    },
    error::ApiError,
    experiences::repo::Experience,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/colleges", get(list_colleges).post(create_college))
        .route(
            "/admin/colleges/:id",
            get(get_college).put(update_college).delete(delete_college),
        )
}

#[instrument(skip(state, _admin))]
pub async fn list_colleges(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<College>>, ApiError> {
    Ok(Json(College::list(&state.db).await?))
}

#[instrument(skip(state, _admin))]
pub async fn get_college(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<College>, ApiError> {
    let college = College::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("College not found"))?;
    Ok(Json(college))
}

#[instrument(skip(state, _admin, payload))]
pub async fn create_college(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateCollegeRequest>,
) -> Result<(StatusCode, Json<College>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("College name is required".into()));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ApiError::Validation(
            "College name must contain letters or digits".into(),
        ));
    }

    if College::name_or_slug_taken(&state.db, name, &slug, None).await? {
        warn!(%name, %slug, "duplicate college");
        return Err(ApiError::DuplicateCollege);
    }

    let status = payload.status.unwrap_or(CollegeStatus::Active);
    let college = College::create(&state.db, name, &slug, status).await?;

    info!(college_id = %college.id, %slug, "college created");
    Ok((StatusCode::CREATED, Json(college)))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_college(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCollegeRequest>,
) -> Result<Json<College>, ApiError> {
    let college = College::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("College not found"))?;

    let (name, slug) = match payload.name {
        Some(ref new_name) if new_name.trim() != college.name => {
            let new_name = new_name.trim();
            let new_slug = slugify(new_name);
            if new_slug.is_empty() {
                return Err(ApiError::Validation(
                    "College name must contain letters or digits".into(),
                ));
            }
            // renames re-derive the slug, so both must stay unique
            if College::name_or_slug_taken(&state.db, new_name, &new_slug, Some(id)).await? {
                return Err(ApiError::DuplicateCollege);
            }
            (new_name.to_string(), new_slug)
        }
        _ => (college.name.clone(), college.slug.clone()),
    };
    let status = payload.status.unwrap_or(college.status);

    let updated = College::update(&state.db, id, &name, &slug, status)
        .await?
        .ok_or(ApiError::NotFound("College not found"))?;

    info!(college_id = %updated.id, "college updated");
    Ok(Json(updated))
}

#[instrument(skip(state, _admin))]
pub async fn delete_college(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    // lock + count + delete must be atomic for the dependent guard to hold
    let mut tx = state.db.begin().await?;
    let college = College::lock_by_id_tx(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound("College not found"))?;

    let dependents = Experience::count_by_college_tx(&mut tx, college.id).await?;
    if dependents > 0 {
        warn!(college_id = %college.id, dependents, "delete blocked by experiences");
        return Err(ApiError::HasDependents {
            entity: "college",
            count: dependents,
        });
    }

    College::delete_tx(&mut tx, college.id).await?;
    tx.commit().await?;

    info!(college_id = %id, "college deleted");
    Ok(Json(DeletedResponse {
        message: "College deleted successfully",
        id,
    }))
}
