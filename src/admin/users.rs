use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::dto::{
        DeletedResponse, Pagination, UpdateUserRequest, UserDetail, UserExperiencesQuery,
        UsersListQuery, UsersListResponse,
    },
    auth::{
        claims::Role,
        extractors::AdminUser,
        repo::{User, UserSummary},
    },
    error::ApiError,
    experiences::repo::{Experience, ExperienceSummary},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route(
            "/admin/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/admin/users/:id/experiences", get(user_experiences))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(q): Query<UsersListQuery>,
) -> Result<Json<UsersListResponse>, ApiError> {
    let page = q.page.max(1);
    let limit = q.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let users = User::search_page(&state.db, &q.search, limit, offset).await?;
    let total = User::count_search(&state.db, &q.search).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(UsersListResponse {
        users,
        pagination: Pagination {
            total,
            total_pages,
            current_page: page,
            has_next: page < total_pages,
            has_previous: page > 1,
        },
    }))
}

#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetail>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    let experiences = Experience::summaries_by_user(&state.db, id, None).await?;

    Ok(Json(UserDetail {
        user: UserSummary::from(&user),
        experiences,
    }))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let (name, email, role) = match (payload.name, payload.email, payload.role) {
        (Some(n), Some(e), Some(r)) if !n.is_empty() && !e.is_empty() => (n, e, r),
        _ => {
            return Err(ApiError::Validation(
                "Name, email, and role are required".into(),
            ))
        }
    };
    let role = match role.as_str() {
        "user" => Role::User,
        "admin" => Role::Admin,
        _ => return Err(ApiError::Validation("Invalid role".into())),
    };

    let mut tx = state.db.begin().await?;
    let user = User::lock_by_id_tx(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    if email != user.email && User::email_taken_by_other_tx(&mut tx, &email, user.id).await? {
        warn!(user_id = %user.id, "email already in use");
        return Err(ApiError::DuplicateEmail);
    }

    let updated = User::update_admin_tx(&mut tx, user.id, &name, &email, role).await?;
    tx.commit().await?;

    info!(user_id = %updated.id, "user updated");
    Ok(Json(updated))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if admin.user.id == id {
        return Err(ApiError::SelfDeleteForbidden);
    }

    let mut tx = state.db.begin().await?;
    let user = User::lock_by_id_tx(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let dependents = Experience::count_by_user_tx(&mut tx, user.id).await?;
    if dependents > 0 {
        warn!(user_id = %user.id, dependents, "delete blocked by experiences");
        return Err(ApiError::HasDependents {
            entity: "user",
            count: dependents,
        });
    }

    User::soft_delete_tx(&mut tx, user.id).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "user deleted");
    Ok(Json(DeletedResponse {
        message: "User deleted successfully",
        id,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn user_experiences(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Query(q): Query<UserExperiencesQuery>,
) -> Result<Json<Vec<ExperienceSummary>>, ApiError> {
    let verified = match q.status.as_deref() {
        Some("verified") => Some(true),
        Some("pending") => Some(false),
        _ => None,
    };
    let experiences = Experience::summaries_by_user(&state.db, id, verified).await?;
    Ok(Json(experiences))
}
