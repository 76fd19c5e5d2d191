//! # WIDE Intake Routes
//!
//! Endpoints the WIDE wallet service calls with presentations:
//!
//! - `POST /wide/uploadData` stores a presentation under a caller-chosen key.
//! - `POST /wide/registerProfileData/{type}` verifies a presentation and
//!   records its first credential value in the owner's profile.
//! - `POST /wide/login` matches a presentation against an earlier upload and
//!   issues a short-lived login token the web app exchanges for a session.

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use rgdm_core::Presentation;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{value_to_field, verify_presentation, DataRequest, StatusMessage};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;
use crate::store::{get_json, set_json};

/// Lifetime of a login token.
pub const LOGIN_TOKEN_TTL: Duration = Duration::from_secs(30);

const UPLOADED: &str = "Data uploaded successfully";

/// Body of `uploadData`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Storage key, usually the user id.
    pub key: String,
    /// Arbitrary JSON to store.
    #[schema(value_type = Object)]
    pub data: Value,
}

impl Validate for UploadRequest {
    fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("key must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploadData", post(upload_data))
        .route("/registerProfileData/{type}", post(register_profile_data))
        .route("/login", post(login))
}

/// POST /wide/uploadData: Store a presentation.
#[utoipa::path(
    post,
    path = "/wide/uploadData",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Stored", body = String),
        (status = 422, description = "Empty key", body = crate::error::ErrorBody),
    ),
    tag = "wide"
)]
pub(crate) async fn upload_data(
    State(state): State<AppState>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<&'static str>, AppError> {
    let req = extract_validated_json(body)?;
    let key = state.keys.upload(&req.key);
    set_json(state.store.as_ref(), &key, &req.data, None).await?;
    tracing::info!(key = %key, "presentation uploaded");
    Ok(Json(UPLOADED))
}

/// POST /wide/registerProfileData/{type}: Verify a presentation and record
/// its first credential value as profile field `type`.
#[utoipa::path(
    post,
    path = "/wide/registerProfileData/{type}",
    params(("type" = String, Path, description = "Profile field to set")),
    request_body = DataRequest,
    responses(
        (status = 200, description = "Profile updated", body = String),
        (status = 403, description = "Not verified or verification failed", body = crate::error::ErrorBody),
        (status = 404, description = "No user registered for the wallet", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed presentation", body = crate::error::ErrorBody),
    ),
    tag = "wide"
)]
pub(crate) async fn register_profile_data(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Result<Json<DataRequest>, JsonRejection>,
) -> Result<Json<&'static str>, AppError> {
    let req = extract_json(body)?;
    // Wallets may wrap their domains in a group; the first flattened domain
    // is the signed one.
    let presentation = Presentation::from_value(req.data)?.flattened();

    if !verify_presentation(&state, &presentation).await? {
        tracing::warn!(field = %kind, subject = %presentation.subject_id(), "profile data not verified");
        return Err(AppError::NotVerified);
    }

    let value = presentation
        .first_domain()
        .and_then(|domain| domain.attributes())
        .and_then(|attrs| attrs.first())
        .map(|attr| value_to_field(&attr.value))
        .ok_or_else(|| AppError::Validation("presentation carries no credential value".into()))?;

    let wallet_key = state.keys.user_wallet(presentation.subject_id());
    let user_id = state
        .store
        .get(&wallet_key)
        .await?
        .ok_or_else(|| AppError::NotFound("no user registered for this wallet".into()))?;

    state
        .store
        .hash_set(&state.keys.user(&user_id), &[(kind.clone(), value)])
        .await?;
    tracing::info!(user_id = %user_id, field = %kind, "profile field registered");
    Ok(Json(UPLOADED))
}

/// POST /wide/login: Match a presentation with the upload stored under its
/// `id` credential and issue a login token under the request's `key`.
#[utoipa::path(
    post,
    path = "/wide/login",
    request_body = DataRequest,
    responses(
        (status = 200, description = "Authenticated", body = StatusMessage),
        (status = 404, description = "Authentication failed", body = StatusMessage),
    ),
    tag = "wide"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<DataRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StatusMessage>), AppError> {
    let req = extract_json(body)?;
    let token_key = req
        .key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AppError::Validation("key must not be empty".into()))?;
    let presentation = Presentation::from_value(req.data)?;

    let Some(user_id) = presentation.find_attribute("id").map(value_to_field) else {
        tracing::warn!(subject = %presentation.subject_id(), "login presentation has no id credential");
        return Ok(failed());
    };

    let registered: Option<Value> =
        get_json(state.store.as_ref(), &state.keys.upload(&user_id)).await?;
    let registered_subject = registered
        .as_ref()
        .and_then(|v| v.pointer("/credentialSubject/id"))
        .and_then(Value::as_str);

    if registered_subject != Some(presentation.subject_id()) {
        tracing::warn!(user_id = %user_id, "login presentation does not match upload");
        return Ok(failed());
    }

    set_json(
        state.store.as_ref(),
        &state.keys.login_token(&token_key),
        &user_id,
        Some(LOGIN_TOKEN_TTL),
    )
    .await?;
    tracing::info!(user_id = %user_id, "login token issued");
    Ok((
        StatusCode::OK,
        Json(StatusMessage::ok("Authentication successful.")),
    ))
}

fn failed() -> (StatusCode, Json<StatusMessage>) {
    (
        StatusCode::NOT_FOUND,
        Json(StatusMessage::failed("Authentication failed.")),
    )
}
