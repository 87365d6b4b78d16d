use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::JwtKeys,
        dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, OtpSentResponse,
            PublicUser, RegisterRequest, ResendOtpRequest, ResetPasswordRequest, VerifyOtpRequest,
        },
        otp,
        password::{hash_password, verify_password},
        repo::User,
        services::is_valid_email,
    },
    email,
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/resend-otp", post(resend_otp))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

/// Generate a fresh verification code, persist it, and send the email.
/// A send failure propagates; resend-otp is the recovery path.
async fn send_verification_otp(state: &AppState, to: &str) -> Result<(), ApiError> {
    let code = otp::generate();
    let expires = otp::expiry_time(otp::OTP_TTL_MINUTES);
    User::store_otp(&state.db, to, &code, expires).await?;

    let (subject, html) = email::verification_email(&code);
    state.mailer.send(to, &subject, &html).await?;
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<OtpSentResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim();

    if name.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Missing required fields".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    match User::find_by_email(&state.db, &payload.email).await? {
        Some(existing) if existing.is_verified => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::DuplicateAccount);
        }
        // unverified re-registration overwrites the pending account
        Some(existing) => {
            let hash = hash_password(&payload.password)?;
            User::update_unverified_profile(&state.db, existing.id, name, &hash).await?;
        }
        None => {
            let hash = hash_password(&payload.password)?;
            User::create_unverified(&state.db, name, &payload.email, &hash).await?;
        }
    }

    send_verification_otp(&state, &payload.email).await?;

    info!(email = %payload.email, "registration pending verification");
    Ok(Json(OtpSentResponse {
        message: "Verification OTP sent to your email",
        email: payload.email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(mut payload): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() || payload.otp.is_empty() {
        return Err(ApiError::Validation("Email and OTP are required".into()));
    }

    // Check-and-clear under a row lock so a code cannot be redeemed twice.
    let mut tx = state.db.begin().await?;
    let user = User::lock_by_email_tx(&mut tx, &payload.email)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    if user.otp.as_deref() != Some(payload.otp.as_str()) || otp::is_expired(user.otp_expires) {
        warn!(user_id = %user.id, "otp mismatch or expired");
        return Err(ApiError::InvalidOrExpiredOtp);
    }

    User::mark_verified_tx(&mut tx, user.id).await?;
    tx.commit().await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, "email verified");
    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
        token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(mut payload): Json<ResendOtpRequest>,
) -> Result<Json<OtpSentResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    send_verification_otp(&state, &user.email).await?;

    Ok(Json(OtpSentResponse {
        message: "New OTP sent to your email",
        email: payload.email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Missing required fields".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) if u.is_verified => u,
        _ => {
            warn!(email = %payload.email, "login for missing or unverified account");
            return Err(ApiError::NotVerified);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    User::touch_last_login(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
        token,
    }))
}

/// Always answers with the same message so callers cannot probe which
/// addresses are registered.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }

    if let Some(user) = User::find_by_email(&state.db, &payload.email).await? {
        let code = otp::generate();
        let expires = otp::expiry_time(otp::OTP_TTL_MINUTES);
        User::store_reset_otp(&state.db, user.id, &code, expires).await?;

        let (subject, html) = email::reset_email(&code);
        state.mailer.send(&user.email, &subject, &html).await?;
        info!(user_id = %user.id, "password reset otp sent");
    }

    Ok(Json(MessageResponse {
        message: "If your email is registered, you will receive an OTP",
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() || payload.otp.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::Validation(
            "Email, OTP and new password are required".into(),
        ));
    }
    if payload.new_password.len() < 6 {
        return Err(ApiError::WeakPassword);
    }

    let mut tx = state.db.begin().await?;
    let user = User::lock_for_reset_tx(&mut tx, &payload.email, &payload.otp)
        .await?
        .ok_or(ApiError::InvalidOrExpiredOtp)?;

    let hash = hash_password(&payload.new_password)?;
    User::set_password_tx(&mut tx, user.id, &hash).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse {
        message: "Password has been reset successfully",
    }))
}
