use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use super::parse_body;
use crate::auth::create_token;
use crate::database::models::{Credentials, NewUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

/// POST /auth/token - exchange username/password for a JWT
pub async fn token(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Value> {
    let creds: Credentials = parse_body(body)?;

    let user = User::authenticate(&state.pool, &creds.username, &creds.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Failed login for {}", creds.username);
            ApiError::unauthorized("Invalid username/password")
        })?;

    let token = create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register - self sign-up; never grants admin
pub async fn register(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Value> {
    let data: NewUser = parse_body(body)?;
    if data.is_admin {
        return Err(ApiError::bad_request("isAdmin cannot be set on self registration"));
    }
    data.validate().map_err(ApiError::bad_request)?;

    let user = User::register(&state.pool, &data).await?;
    let token = create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::created(json!({ "token": token })))
}

/// GET /auth/whoami - any logged-in user
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
