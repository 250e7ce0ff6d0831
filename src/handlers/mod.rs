// handlers/mod.rs - Request handlers grouped by resource
//
// Access tiers are enforced by route layers in `routes.rs`, not here:
// anonymous (reads), self-or-admin (/users/:username), admin (writes).

pub mod auth;
pub mod companies;
pub mod jobs;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Convert a raw JSON body into a typed request, reporting shape errors as 400.
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::invalid_json(format!("Invalid request body: {}", e)))
}
