//! # rgdm-api: HTTP Service for the rgdm Backend
//!
//! Accepts credential presentations from the WIDE wallet service, turns a
//! matched presentation into a browser session, and serves the session-gated
//! web app routes. Presentations are checked with
//! [`rgdm_verifier::PresentationVerifier`].
//!
//! ## API Surface
//!
//! | Prefix          | Module             | CORS origin   |
//! |-----------------|--------------------|---------------|
//! | `/wide/*`       | [`routes::wide`]   | `WIDE_DOMAIN` |
//! | `/rgdm/*`       | [`routes::rgdm`]   | `WEB_DOMAIN`  |
//! | `/rgdm/raids*`  | [`routes::raids`]  | `WEB_DOMAIN`  |
//! | `/health/*`     | this module        | none          |
//! | `/openapi.json` | [`openapi`]        | none          |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer (per prefix) → CurrentUser extractor (gated routes) → Handler
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::middleware::cors::{self, InvalidOrigin};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Fails only when a configured CORS origin is not a valid header value.
pub fn app(state: AppState) -> Result<Router, InvalidOrigin> {
    let wide = routes::wide::router().layer(cors::layer(state.config.wide_domain.as_deref())?);
    let web_cors = cors::layer(state.config.web_domain.as_deref())?;
    let rgdm = routes::rgdm::router().layer(web_cors.clone());
    // Nesting only answers `/rgdm`; the web app also calls `/rgdm/`.
    let rgdm_slash = Router::new()
        .route("/rgdm/", get(routes::rgdm::hello))
        .layer(web_cors);

    let health = Router::new()
        .route("/", get(root))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Ok(Router::new()
        .merge(health)
        .merge(openapi::router())
        .nest("/wide", wide)
        .nest("/rgdm", rgdm)
        .merge(rgdm_slash)
        .layer(middleware::tracing_layer::layer())
        .with_state(state))
}

async fn root() -> &'static str {
    "Hello World!"
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 when the store answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}
