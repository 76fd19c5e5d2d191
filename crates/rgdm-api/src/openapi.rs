//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// OpenAPI document for the whole service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rgdm API",
        version = "0.1.0",
        description = "WIDE presentation intake, sessions, profiles, raids, and presentation verification.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // WIDE
        crate::routes::wide::upload_data,
        crate::routes::wide::register_profile_data,
        crate::routes::wide::login,
        // Web app
        crate::routes::rgdm::hello,
        crate::routes::rgdm::create_session,
        crate::routes::rgdm::logout,
        crate::routes::rgdm::profile,
        crate::routes::rgdm::verify,
        // Raids
        crate::routes::raids::create_raid,
        crate::routes::raids::list_raids,
        crate::routes::raids::get_raid,
        crate::routes::raids::join_raid,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::StatusMessage,
        crate::routes::DataRequest,
        crate::routes::wide::UploadRequest,
        crate::routes::rgdm::SessionRequest,
        crate::routes::rgdm::ProfileResponse,
        crate::routes::rgdm::VerifyRequest,
        crate::routes::rgdm::VerifyResponse,
        crate::routes::raids::RaidRecord,
        crate::routes::raids::CreateRaidRequest,
    )),
    tags(
        (name = "wide", description = "Presentation intake from the WIDE wallet service"),
        (name = "rgdm", description = "Sessions, profile, and verification for the web app"),
        (name = "raids", description = "Raid records"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/wide/uploadData",
            "/wide/registerProfileData/{type}",
            "/wide/login",
            "/rgdm",
            "/rgdm/session",
            "/rgdm/logout",
            "/rgdm/profile",
            "/rgdm/verify",
            "/rgdm/raids",
            "/rgdm/raids/{id}",
            "/rgdm/raids/{id}/join",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
