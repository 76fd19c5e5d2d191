//! # CORS
//!
//! `/wide` and `/rgdm` each admit one browser origin (`WIDE_DOMAIN` and
//! `WEB_DOMAIN`) with credentials. Other origins get no
//! `Access-Control-Allow-Origin` header; an unset origin admits nobody.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Errors building a CORS policy.
#[derive(Debug, thiserror::Error)]
#[error("invalid CORS origin {origin:?}")]
pub struct InvalidOrigin {
    pub origin: String,
}

/// CORS policy admitting `origin`, or nobody when `None`.
pub fn layer(origin: Option<&str>) -> Result<CorsLayer, InvalidOrigin> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    match origin {
        Some(origin) => {
            let value = HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|_| {
                InvalidOrigin {
                    origin: origin.to_string(),
                }
            })?;
            Ok(layer.allow_origin(AllowOrigin::list([value])))
        }
        None => Ok(layer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_and_without_origin() {
        assert!(layer(Some("https://app.example.com")).is_ok());
        assert!(layer(None).is_ok());
    }

    #[test]
    fn rejects_unrepresentable_origin() {
        let err = layer(Some("https://bad\norigin")).unwrap_err();
        assert_eq!(err.origin, "https://bad\norigin");
    }
}
