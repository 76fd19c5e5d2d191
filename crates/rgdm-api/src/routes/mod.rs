//! # Route Modules
//!
//! | Prefix         | Module        | Caller                     |
//! |----------------|---------------|----------------------------|
//! | `/wide/*`      | [`wide`]      | WIDE wallet service        |
//! | `/rgdm/*`      | [`rgdm`]      | rgdm web app (session)     |
//! | `/rgdm/raids*` | [`raids`]     | rgdm web app (session)     |

pub mod raids;
pub mod rgdm;
pub mod wide;

use rgdm_core::Presentation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// `{success, message}` reply used by the login and session routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

impl StatusMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Envelope the WIDE service posts presentations in.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DataRequest {
    /// Caller-chosen key; required by `uploadData`, informational elsewhere.
    #[serde(default)]
    pub key: Option<String>,
    /// The presentation.
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Run the configured verifier over `presentation`.
///
/// A missing verifier counts as a verification failure.
pub(crate) async fn verify_presentation(
    state: &AppState,
    presentation: &Presentation,
) -> Result<bool, AppError> {
    let Some(verifier) = state.verifier.as_ref() else {
        tracing::error!("verification requested but no verifier is configured");
        return Err(AppError::VerificationFailed);
    };
    Ok(verifier.verify(presentation).await?)
}

/// Render an attribute value the way it is stored in a profile hash.
pub(crate) fn value_to_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
