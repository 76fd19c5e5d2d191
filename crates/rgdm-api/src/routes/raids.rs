//! # Raids
//!
//! Session-gated raid records. A raid is stored as JSON under
//! `{prefix}:raid:{id}` and indexed by the set `{prefix}:raids`. The creator
//! is the first member; joining is idempotent.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::session::CurrentUser;
use crate::state::AppState;
use crate::store::{get_json, set_json};

const MAX_TITLE_LEN: usize = 200;

/// A stored raid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaidRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User id of the creator.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// User ids, in join order.
    pub members: Vec<String>,
}

/// Body of `POST /rgdm/raids`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRaidRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CreateRaidRequest {
    fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("title must not be empty".to_string());
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("title must be at most {MAX_TITLE_LEN} characters"));
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/raids", post(create_raid).get(list_raids))
        .route("/raids/{id}", get(get_raid))
        .route("/raids/{id}/join", post(join_raid))
}

async fn load_raid(state: &AppState, id: &Uuid) -> Result<RaidRecord, AppError> {
    get_json(state.store.as_ref(), &state.keys.raid(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("raid {id} not found")))
}

/// POST /rgdm/raids: Create a raid.
#[utoipa::path(
    post,
    path = "/rgdm/raids",
    request_body = CreateRaidRequest,
    responses(
        (status = 201, description = "Raid created", body = RaidRecord),
        (status = 401, description = "No valid session", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid title", body = crate::error::ErrorBody),
    ),
    tag = "raids"
)]
pub(crate) async fn create_raid(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateRaidRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RaidRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let record = RaidRecord {
        id: Uuid::new_v4(),
        title: req.title.trim().to_string(),
        description: req.description.filter(|d| !d.trim().is_empty()),
        created_by: user.user_id.clone(),
        created_at: Utc::now(),
        members: vec![user.user_id],
    };

    set_json(state.store.as_ref(), &state.keys.raid(&record.id), &record, None).await?;
    state
        .store
        .set_add(&state.keys.raids(), &record.id.to_string())
        .await?;
    tracing::info!(raid_id = %record.id, created_by = %record.created_by, "raid created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /rgdm/raids: All raids, oldest first.
#[utoipa::path(
    get,
    path = "/rgdm/raids",
    responses(
        (status = 200, description = "Raids", body = Vec<RaidRecord>),
        (status = 401, description = "No valid session", body = crate::error::ErrorBody),
    ),
    tag = "raids"
)]
pub(crate) async fn list_raids(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<RaidRecord>>, AppError> {
    let ids = state.store.set_members(&state.keys.raids()).await?;
    let mut raids = Vec::with_capacity(ids.len());
    for id in ids {
        let Ok(id) = id.parse::<Uuid>() else {
            tracing::warn!(raid_id = %id, "skipping malformed raid index entry");
            continue;
        };
        // Index entries can outlive their record.
        if let Some(raid) = get_json::<RaidRecord>(state.store.as_ref(), &state.keys.raid(&id)).await? {
            raids.push(raid);
        }
    }
    raids.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(Json(raids))
}

/// GET /rgdm/raids/{id}: One raid.
#[utoipa::path(
    get,
    path = "/rgdm/raids/{id}",
    params(("id" = Uuid, Path, description = "Raid ID")),
    responses(
        (status = 200, description = "Raid found", body = RaidRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "raids"
)]
pub(crate) async fn get_raid(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RaidRecord>, AppError> {
    Ok(Json(load_raid(&state, &id).await?))
}

/// POST /rgdm/raids/{id}/join: Add the caller to a raid.
#[utoipa::path(
    post,
    path = "/rgdm/raids/{id}/join",
    params(("id" = Uuid, Path, description = "Raid ID")),
    responses(
        (status = 200, description = "Joined", body = RaidRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "raids"
)]
pub(crate) async fn join_raid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RaidRecord>, AppError> {
    let mut raid = load_raid(&state, &id).await?;
    if !raid.members.contains(&user.user_id) {
        raid.members.push(user.user_id.clone());
        set_json(state.store.as_ref(), &state.keys.raid(&id), &raid, None).await?;
        tracing::info!(raid_id = %id, user_id = %user.user_id, "raid joined");
    }
    Ok(Json(raid))
}
