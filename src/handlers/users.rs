use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use super::parse_body;
use crate::auth::create_token;
use crate::database::models::{NewUser, User, UserDetail, UserUpdate};
use crate::error::ApiError;
use crate::filter::UpdatePayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;

/// POST /users - admin only; unlike /auth/register this may create admins
pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Value> {
    let data: NewUser = parse_body(body)?;
    data.validate().map_err(ApiError::bad_request)?;

    let user = User::register(&state.pool, &data).await?;
    let token = create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users - admin only
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = User::find_all(&state.pool).await?;
    Ok(ApiResponse::success(users))
}

/// GET /users/:username - admin or self
pub async fn get(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<UserDetail> {
    let user = User::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /users/:username - admin or self
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<User> {
    let update: UserUpdate = parse_body(body)?;
    update.validate().map_err(ApiError::bad_request)?;

    let payload = UpdatePayload::try_from(update)?;
    let user = User::update(&state.pool, &username, &payload).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:username - admin or self
pub async fn delete(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    User::remove(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id - admin or self
pub async fn apply(
    State(state): State<AppState>,
    Path((username, job_id)): Path<(String, i32)>,
) -> ApiResult<Value> {
    User::apply_to_job(&state.pool, &username, job_id).await?;
    Ok(ApiResponse::created(json!({ "applied": job_id })))
}
