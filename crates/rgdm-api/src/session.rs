//! # Sessions
//!
//! Server-side sessions stored as `rgdm-session-{sid}` with a TTL equal to
//! the cookie lifetime. The browser holds only the session id, in the signed
//! cookie `rgdm.sid`; a cookie whose signature does not check out is
//! treated as absent.
//!
//! Handlers that need a logged-in caller take [`CurrentUser`].

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CookieConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{get_json, set_json};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "rgdm.sid";

/// What the store keeps per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Create a session for `user_id` and add its cookie to `jar`.
pub async fn start(
    state: &AppState,
    jar: SignedCookieJar,
    user_id: &str,
) -> Result<SignedCookieJar, AppError> {
    let sid = Uuid::new_v4().simple().to_string();
    let data = SessionData {
        user_id: user_id.to_string(),
        created_at: Utc::now(),
    };
    let ttl = Duration::from_millis(state.config.cookie.max_age_ms);
    set_json(state.store.as_ref(), &state.keys.session(&sid), &data, Some(ttl)).await?;
    tracing::info!(user_id = %user_id, "session started");
    Ok(jar.add(session_cookie(&state.config.cookie, sid)))
}

/// Load the session named by the cookie in `jar`, if any.
pub async fn load(
    state: &AppState,
    jar: &SignedCookieJar,
) -> Result<Option<(String, SessionData)>, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let sid = cookie.value().to_string();
    let data: Option<SessionData> =
        get_json(state.store.as_ref(), &state.keys.session(&sid)).await?;
    Ok(data.map(|d| (sid, d)))
}

/// Delete the session named by the cookie and clear the cookie.
pub async fn end(state: &AppState, jar: SignedCookieJar) -> Result<SignedCookieJar, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.store.delete(&state.keys.session(cookie.value())).await?;
        tracing::info!("session ended");
    }
    Ok(jar.remove(session_cookie(&state.config.cookie, String::new())))
}

fn session_cookie(config: &CookieConfig, sid: String) -> Cookie<'static> {
    let max_age = i64::try_from(config.max_age_ms).unwrap_or(i64::MAX);
    let mut builder = Cookie::build((SESSION_COOKIE, sid))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(time::Duration::milliseconds(max_age));
    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// The caller behind a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub session_id: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key().clone());
        match load(state, &jar).await? {
            Some((session_id, data)) => Ok(Self {
                user_id: data.user_id,
                session_id,
            }),
            None => {
                tracing::error!("Unauthorized: No valid session");
                Err(AppError::Unauthorized("No valid session".to_string()))
            }
        }
    }
}
