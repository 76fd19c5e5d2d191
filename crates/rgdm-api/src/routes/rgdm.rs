//! # Web App Routes
//!
//! Session lifecycle, profile read, and presentation verification for the
//! rgdm web app. Everything except `GET /rgdm`, `POST /rgdm/session`, and
//! `POST /rgdm/logout` requires a session.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::SignedCookieJar;
use rgdm_core::Presentation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{verify_presentation, StatusMessage};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::session::{self, CurrentUser};
use crate::state::AppState;

/// Body of `POST /rgdm/session`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SessionRequest {
    /// The key the login token was issued under.
    pub key: String,
}

impl Validate for SessionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("key must not be empty".to_string());
        }
        Ok(())
    }
}

/// The caller's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    /// Profile fields registered through WIDE, by type.
    pub attributes: BTreeMap<String, String>,
}

/// Body of `POST /rgdm/verify`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyRequest {
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub verified: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hello))
        .route("/session", post(create_session))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
        .route("/verify", post(verify))
        .merge(super::raids::router())
}

/// GET /rgdm: Liveness greeting for the web app.
#[utoipa::path(
    get,
    path = "/rgdm",
    responses((status = 200, description = "Greeting", body = StatusMessage)),
    tag = "rgdm"
)]
pub(crate) async fn hello() -> Json<StatusMessage> {
    Json(StatusMessage::ok("Hello World"))
}

/// POST /rgdm/session: Exchange a login token for a session cookie.
#[utoipa::path(
    post,
    path = "/rgdm/session",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session established", body = StatusMessage),
        (status = 401, description = "Token unknown or expired", body = crate::error::ErrorBody),
    ),
    tag = "rgdm"
)]
pub(crate) async fn create_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    body: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<StatusMessage>), AppError> {
    let req = extract_validated_json(body)?;
    let token = state
        .store
        .take(&state.keys.login_token(&req.key))
        .await?
        .ok_or_else(|| AppError::Unauthorized("login token is invalid or expired".into()))?;
    let user_id: String = serde_json::from_str(&token)
        .map_err(|e| AppError::Internal(format!("stored login token is malformed: {e}")))?;

    let jar = session::start(&state, jar, &user_id).await?;
    Ok((jar, Json(StatusMessage::ok("Session established."))))
}

/// POST /rgdm/logout: Destroy the session and clear its cookie.
#[utoipa::path(
    post,
    path = "/rgdm/logout",
    responses((status = 200, description = "Logged out", body = StatusMessage)),
    tag = "rgdm"
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<StatusMessage>), AppError> {
    let jar = session::end(&state, jar).await?;
    Ok((jar, Json(StatusMessage::ok("Logged out."))))
}

/// GET /rgdm/profile: The caller's registered profile fields.
#[utoipa::path(
    get,
    path = "/rgdm/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorBody),
    ),
    tag = "rgdm"
)]
pub(crate) async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let fields = state.store.hash_get_all(&state.keys.user(&user.user_id)).await?;
    Ok(Json(ProfileResponse {
        user_id: user.user_id,
        attributes: fields.into_iter().collect(),
    }))
}

/// POST /rgdm/verify: Check a presentation against the registry.
#[utoipa::path(
    post,
    path = "/rgdm/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorBody),
        (status = 403, description = "Verification could not complete", body = crate::error::ErrorBody),
    ),
    tag = "rgdm"
)]
pub(crate) async fn verify(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let req = extract_json(body)?;
    let presentation = Presentation::from_value(req.data)?;
    let verified = verify_presentation(&state, &presentation).await?;
    tracing::info!(user_id = %user.user_id, verified, "presentation checked");
    Ok(Json(VerifyResponse { verified }))
}
