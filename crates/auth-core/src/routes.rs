// ============================
// crates/auth-core/src/routes.rs
// ============================
//! HTTP surface: the four authentication operations plus sign-out.
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AuthError;
use crate::store::UserStore;
use crate::validation::ValidationError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Optional confirmation copy of the password. When present it must
    /// match; the check lives here because the upstream client-side
    /// version of it never actually ran.
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub redirect_base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Session payload returned from sign-up and sign-in
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Generic acknowledgment for forgot/reset
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Create the authentication router
pub fn create_router<S: UserStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/auth/sign-up", post(sign_up::<S>))
        .route("/auth/sign-in", post(sign_in::<S>))
        .route("/auth/sign-out", post(sign_out::<S>))
        .route("/auth/forgot-password", post(forgot_password::<S>))
        .route("/auth/reset-password", post(reset_password::<S>))
        .with_state(state)
}

async fn sign_up<S: UserStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    if let Some(confirm) = &req.confirm_password {
        if *confirm != req.password {
            return Err(ValidationError::PasswordMismatch.into());
        }
    }

    let (user, session) = state
        .service
        .sign_up(&req.name, &req.email, req.password)
        .await?;

    Ok(Json(SessionResponse {
        token: session.token,
        user_id: user.id,
        expires_at: session.expires_at,
    }))
}

async fn sign_in<S: UserStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    let session = state.service.sign_in(&req.email, req.password).await?;

    Ok(Json(SessionResponse {
        token: session.token,
        user_id: session.user_id,
        expires_at: session.expires_at,
    }))
}

async fn sign_out<S: UserStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<AckResponse>, AuthError> {
    let token = bearer_token(&headers).ok_or(AuthError::InvalidToken)?;
    state.service.sign_out(token).await?;
    Ok(Json(AckResponse { ok: true }))
}

async fn forgot_password<S: UserStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<AckResponse>, AuthError> {
    state
        .service
        .forgot_password(&req.email, &req.redirect_base_url)
        .await?;
    // identical acknowledgment whether or not the account exists
    Ok(Json(AckResponse { ok: true }))
}

async fn reset_password<S: UserStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<AckResponse>, AuthError> {
    state
        .service
        .reset_password(&req.token, req.new_password)
        .await?;
    Ok(Json(AckResponse { ok: true }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
