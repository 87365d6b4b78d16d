use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Domain failures, translated at the handler boundary into the
/// `{error, details?}` JSON envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Password must be at least 6 characters long")]
    WeakPassword,
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,
    #[error("Email already registered")]
    DuplicateAccount,
    #[error("Email is already in use")]
    DuplicateEmail,
    #[error("College with this name or similar name already exists")]
    DuplicateCollege,
    #[error("Account not verified. Please verify your email first.")]
    NotVerified,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No token provided")]
    Unauthenticated,
    #[error("Invalid token")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
    #[error("Access denied")]
    Forbidden,
    #[error("Cannot delete your own account")]
    SelfDeleteForbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Cannot delete {entity} with interview experiences")]
    HasDependents { entity: &'static str, count: i64 },
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::WeakPassword
            | ApiError::InvalidOrExpiredOtp
            | ApiError::HasDependents { .. } => StatusCode::BAD_REQUEST,
            ApiError::DuplicateAccount
            | ApiError::DuplicateEmail
            | ApiError::DuplicateCollege => StatusCode::CONFLICT,
            ApiError::NotVerified
            | ApiError::InvalidCredentials
            | ApiError::Unauthenticated
            | ApiError::InvalidToken
            | ApiError::UserNotFound => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden | ApiError::SelfDeleteForbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::HasDependents { entity, count } => Some(format!(
                "There are {count} interview experiences associated with this {entity}."
            )),
            // internals stay opaque outside debug builds
            ApiError::Internal(e) if cfg!(debug_assertions) => Some(e.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            error!(error = %e, "internal error");
        }
        let mut body = json!({ "error": self.to_string() });
        if let Some(details) = self.details() {
            body["details"] = json!(details);
        }
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::WeakPassword.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicateAccount.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotVerified.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::SelfDeleteForbidden.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("Experience not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::HasDependents {
                entity: "college",
                count: 3
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn dependent_count_lands_in_details() {
        let err = ApiError::HasDependents {
            entity: "college",
            count: 7,
        };
        let details = err.details().expect("details");
        assert!(details.contains('7'));
        assert!(details.contains("college"));
    }

    #[test]
    fn not_found_carries_its_message() {
        let err = ApiError::NotFound("College not found");
        assert_eq!(err.to_string(), "College not found");
    }
}
